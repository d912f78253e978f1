use indexmap::IndexSet;
use sqlplan_error::{DbError, DbErrorKind, Result};
use tracing::debug;

use crate::arrays::datatype::DataType;
use crate::expr::column_expr::ColumnExpr;
use crate::expr::{cast, col_ref, Expression};
use crate::logical::binder::bind_table_function::{BoundTableArgument, BoundTableFunction};
use crate::logical::binder::table_list::TableList;
use crate::logical::logical_project::LogicalProject;
use crate::logical::logical_row_number::LogicalRowNumber;
use crate::logical::logical_table_function::{
    LogicalTableFunction,
    PartitioningSpec,
    TableArgumentProps,
};
use crate::logical::operator::{LogicalOperator, Node};

/// Plans a bound table function invocation into a logical operator.
///
/// Responsible for coercing copartitioned partition keys to a common type,
/// injecting row numbers where inputs need re-alignment after filtering, and
/// assembling the function node itself.
#[derive(Debug)]
pub struct TableFunctionPlanner<'a> {
    pub table_list: &'a mut TableList,
}

impl<'a> TableFunctionPlanner<'a> {
    pub fn new(table_list: &'a mut TableList) -> Self {
        TableFunctionPlanner { table_list }
    }

    pub fn plan(&mut self, mut bound: BoundTableFunction) -> Result<LogicalOperator> {
        self.coerce_copartition_keys(&mut bound)?;
        self.inject_alignment_row_numbers(&mut bound)?;

        let (output_types, output_names): (Vec<_>, Vec<_>) = bound
            .signature
            .proper_outputs
            .iter()
            .map(|field| (field.datatype, field.name.clone()))
            .unzip();
        let output_ref = self.table_list.push_table(output_types, output_names)?;

        let mut children = Vec::with_capacity(bound.table_arguments.len());
        let mut table_arguments = Vec::with_capacity(bound.table_arguments.len());

        for arg in bound.table_arguments {
            let props = self.argument_props(&arg)?;
            children.push(arg.plan);
            table_arguments.push(props);
        }

        debug!(function = %bound.signature.name, %output_ref, "planned table function");

        Ok(LogicalOperator::TableFunction(Node {
            node: LogicalTableFunction {
                name: bound.signature.name,
                output_ref,
                scalar_arguments: bound.scalar_arguments,
                descriptor_arguments: bound.descriptor_arguments,
                table_arguments,
                handle: bound.signature.handle,
            },
            children,
        }))
    }

    /// For each copartition group, find the common type of each partition key
    /// ordinal and wrap mismatched inputs in a casting projection.
    fn coerce_copartition_keys(&mut self, bound: &mut BoundTableFunction) -> Result<()> {
        for group in &bound.copartition {
            let arity = bound.table_arguments[group[0]].partition_by.len();

            for key_idx in 0..arity {
                let mut common = DataType::Null;
                for &member in group {
                    let col = bound.table_arguments[member].partition_by[key_idx];
                    let datatype = col.datatype(self.table_list)?;

                    common = crate::functions::implicit::common_supertype(common, datatype)
                        .ok_or_else(|| {
                            DbError::with_kind(
                                DbErrorKind::IncoercibleCopartitionType,
                                "Copartitioning columns have incompatible types",
                            )
                            .with_fields([
                                ("argument", bound.table_arguments[member].name.clone()),
                                ("type", datatype.to_string()),
                                ("common", common.to_string()),
                            ])
                        })?;
                }

                for &member in group {
                    let arg = &mut bound.table_arguments[member];
                    let col = arg.partition_by[key_idx];
                    if col.datatype(self.table_list)? != common {
                        Self::coerce_partition_key(self.table_list, arg, key_idx, common)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Wrap `arg`'s plan in a projection that forwards every input column and
    /// appends a cast of partition key `key_idx` to `target`.
    ///
    /// All of the argument's column references move to the projection's
    /// table, keeping their ordinals. The coerced key points at the appended
    /// cast column, named after the source column with a `_coerced` suffix.
    fn coerce_partition_key(
        table_list: &mut TableList,
        arg: &mut BoundTableArgument,
        key_idx: usize,
        target: DataType,
    ) -> Result<()> {
        let source_ref = arg.table_ref;
        let source = table_list.get(source_ref)?;
        let num_columns = source.num_columns();
        let key = arg.partition_by[key_idx];

        let mut types: Vec<_> = source.column_types.clone();
        let mut names: Vec<_> = source.column_names.clone();
        types.push(target);
        names.push(format!("{}_coerced", source.column_names[key.column]));

        let proj_ref = table_list.push_table(types, names)?;

        let mut projections: Vec<Expression> = (0..num_columns)
            .map(|idx| col_ref(source_ref, idx))
            .collect();
        projections.push(cast(col_ref(source_ref, key.column), target));

        let plan = arg.plan.take();
        arg.plan = LogicalOperator::Project(Node {
            node: LogicalProject {
                projections,
                projection_table: proj_ref,
            },
            children: vec![plan],
        });

        // Rebase the argument onto the projection.
        let rebase = |col: &mut ColumnExpr| {
            if col.table_scope == source_ref {
                col.table_scope = proj_ref;
            }
        };
        arg.table_ref = proj_ref;
        arg.partition_by.iter_mut().for_each(rebase);
        arg.order_by.iter_mut().for_each(|key| rebase(&mut key.column));

        // The coerced key reads the appended cast column.
        arg.partition_by[key_idx] = ColumnExpr::new(proj_ref, num_columns);

        debug!(argument = %arg.name, %proj_ref, %target, "coerced copartition key");

        Ok(())
    }

    /// Wrap kept-when-empty inputs in a row number when a sibling input may
    /// be pruned.
    ///
    /// Pruning a sibling can filter this input's partitions. The row number
    /// lets execution restore the original per-partition row order when the
    /// outputs are recombined.
    fn inject_alignment_row_numbers(&mut self, bound: &mut BoundTableFunction) -> Result<()> {
        let any_prunes = bound
            .table_arguments
            .iter()
            .any(|arg| arg.prune_when_empty);

        if !any_prunes {
            return Ok(());
        }

        for (idx, arg) in bound.table_arguments.iter_mut().enumerate() {
            if arg.prune_when_empty {
                continue;
            }

            let row_number_ref = self.table_list.push_table(
                vec![DataType::Int64],
                vec![format!("input_{}_row_number", idx + 1)],
            )?;

            let plan = arg.plan.take();
            arg.plan = LogicalOperator::RowNumber(Node {
                node: LogicalRowNumber {
                    row_number_table: row_number_ref,
                    partition_by: arg.partition_by.clone(),
                },
                children: vec![plan],
            });

            arg.required_columns_extra
                .push(ColumnExpr::new(row_number_ref, 0));

            debug!(argument = %arg.name, %row_number_ref, "injected alignment row number");
        }

        Ok(())
    }

    /// Compute the execution properties for a single table argument.
    ///
    /// Pass-through is every input column when the argument declares
    /// pass-through, otherwise just the partition keys. Required is the
    /// declared read set plus partitioning and ordering keys.
    fn argument_props(&self, arg: &BoundTableArgument) -> Result<TableArgumentProps> {
        let num_columns = self.table_list.get(arg.table_ref)?.num_columns();

        let pass_through: Vec<_> = if arg.pass_through_columns {
            (0..num_columns)
                .map(|idx| ColumnExpr::new(arg.table_ref, idx))
                .collect()
        } else {
            arg.partition_by.clone()
        };

        let mut required: IndexSet<ColumnExpr> = IndexSet::new();
        required.extend(
            arg.required_columns
                .iter()
                .map(|&col| ColumnExpr::new(arg.table_ref, col)),
        );
        required.extend(arg.partition_by.iter().copied());
        required.extend(arg.order_by.iter().map(|key| key.column));
        required.extend(arg.required_columns_extra.iter().copied());

        Ok(TableArgumentProps {
            name: arg.name.clone(),
            partitioning: PartitioningSpec {
                partition_by: arg.partition_by.clone(),
                order_by: arg.order_by.clone(),
            },
            pass_through,
            required: required.into_iter().collect(),
            prune_when_empty: arg.prune_when_empty,
            row_semantics: arg.row_semantics,
        })
    }
}
