use std::collections::HashMap;
use std::fmt;

use sqlplan_error::{DbError, Result};

use crate::arrays::scalar::ScalarValue;
use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::expr::Expression;
use crate::expr::column_expr::ColumnExpr;
use crate::functions::table::{DescriptorValue, TableFunctionHandle};
use crate::logical::binder::table_list::{TableList, TableRef};
use crate::logical::operator::{LogicalNode, Node};

/// A single ordering key over a table argument's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundOrderBy {
    pub column: ColumnExpr,
    pub desc: bool,
    pub nulls_first: bool,
}

impl fmt::Display for BoundOrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.column,
            if self.desc { "DESC" } else { "ASC" },
            if self.nulls_first {
                "NULLS FIRST"
            } else {
                "NULLS LAST"
            }
        )
    }
}

/// Partitioning and ordering applied to a set semantics table argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitioningSpec {
    pub partition_by: Vec<ColumnExpr>,
    pub order_by: Vec<BoundOrderBy>,
}

impl PartitioningSpec {
    pub fn is_partitioned(&self) -> bool {
        !self.partition_by.is_empty()
    }
}

/// Per-argument execution properties carried by a table function node.
///
/// The argument at position `i` corresponds to the node's child `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableArgumentProps {
    pub name: String,
    pub partitioning: PartitioningSpec,
    /// Input columns forwarded to the output unchanged.
    pub pass_through: Vec<ColumnExpr>,
    /// Input columns the function itself reads.
    pub required: Vec<ColumnExpr>,
    pub prune_when_empty: bool,
    pub row_semantics: bool,
}

/// Planned invocation of a table function.
///
/// Children are the plans for the table arguments, in argument declaration
/// order. Output is the proper columns (owned by `output_ref`) followed by
/// each argument's pass-through columns.
#[derive(Debug, Clone)]
pub struct LogicalTableFunction {
    pub name: String,
    /// Table ref for the function's proper output columns.
    pub output_ref: TableRef,
    pub scalar_arguments: Vec<(String, ScalarValue)>,
    pub descriptor_arguments: Vec<(String, DescriptorValue)>,
    pub table_arguments: Vec<TableArgumentProps>,
    pub handle: Option<Box<dyn TableFunctionHandle>>,
}

impl LogicalTableFunction {
    /// Rewrite every column expression in this node with `remap`.
    ///
    /// Used after input columns move, for instance when a source below is
    /// pruned.
    pub fn remap_columns(&mut self, remap: &HashMap<ColumnExpr, ColumnExpr>) -> Result<()> {
        let map_col = |col: &mut ColumnExpr| -> Result<()> {
            if let Some(new) = remap.get(col) {
                *col = *new;
            }
            Ok(())
        };

        for arg in &mut self.table_arguments {
            for col in arg
                .partitioning
                .partition_by
                .iter_mut()
                .chain(arg.pass_through.iter_mut())
                .chain(arg.required.iter_mut())
            {
                map_col(col)?;
            }
            for order in &mut arg.partitioning.order_by {
                map_col(&mut order.column)?;
            }
        }

        Ok(())
    }

    pub fn handle(&self) -> Result<&dyn TableFunctionHandle> {
        self.handle
            .as_deref()
            .ok_or_else(|| DbError::internal(format!("No handle for function '{}'", self.name)))
    }
}

impl PartialEq for LogicalTableFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.output_ref == other.output_ref
            && self.scalar_arguments == other.scalar_arguments
            && self.descriptor_arguments == other.descriptor_arguments
            && self.table_arguments == other.table_arguments
            && match (&self.handle, &other.handle) {
                (Some(a), Some(b)) => a.as_ref() == b.as_ref(),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Explainable for LogicalTableFunction {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let mut ent = ExplainEntry::new("TableFunction")
            .with_value("function", &self.name)
            .with_value("table_ref", self.output_ref);

        if conf.verbose {
            for arg in &self.table_arguments {
                ent = ent
                    .with_values(format!("{}.pass_through", arg.name), &arg.pass_through)
                    .with_values(format!("{}.required", arg.name), &arg.required)
                    .with_values(
                        format!("{}.partition_by", arg.name),
                        &arg.partitioning.partition_by,
                    );
            }
        }

        ent
    }
}

impl LogicalNode for Node<LogicalTableFunction> {
    fn name(&self) -> &'static str {
        "TableFunction"
    }

    fn get_output_table_refs(&self, _table_list: &TableList) -> Vec<TableRef> {
        let mut refs = vec![self.node.output_ref];
        for arg in &self.node.table_arguments {
            for col in &arg.pass_through {
                if !refs.contains(&col.table_scope) {
                    refs.push(col.table_scope);
                }
            }
        }
        refs
    }

    fn for_each_expr<F>(&self, _func: &mut F) -> Result<()>
    where
        F: FnMut(&Expression) -> Result<()>,
    {
        Ok(())
    }

    fn for_each_expr_mut<F>(&mut self, _func: &mut F) -> Result<()>
    where
        F: FnMut(&mut Expression) -> Result<()>,
    {
        Ok(())
    }
}
