use std::collections::{HashMap, HashSet};

use sqlplan_error::Result;
use tracing::debug;

use crate::expr::column_expr::ColumnExpr;
use crate::logical::binder::table_list::TableList;
use crate::logical::operator::{LogicalNode, LogicalOperator};
use crate::optimizer::OptimizeRule;

/// Removes columns nothing above needs.
///
/// Walks top-down carrying the set of demanded columns. Table function
/// pass-through lists narrow to the demanded subset, and inline expression
/// lists drop undemanded columns entirely. Dropping columns from a source
/// shifts ordinals, so shrinks are recorded and every column reference in the
/// plan is rewritten in a final pass.
#[derive(Debug, Default)]
pub struct ColumnPrune {
    remap: HashMap<ColumnExpr, ColumnExpr>,
}

impl OptimizeRule for ColumnPrune {
    fn optimize(
        &mut self,
        table_list: &mut TableList,
        plan: LogicalOperator,
    ) -> Result<LogicalOperator> {
        // Everything the root exposes is demanded.
        let mut root_demand = HashSet::new();
        for table_ref in plan.get_output_table_refs(table_list) {
            let num_columns = table_list.get(table_ref)?.num_columns();
            root_demand.extend((0..num_columns).map(|col| ColumnExpr::new(table_ref, col)));
        }

        let mut plan = self.prune(table_list, plan, &root_demand)?;

        if !self.remap.is_empty() {
            debug!(num_remapped = self.remap.len(), "rewriting pruned column references");
            Self::apply_remap(&mut plan, &self.remap)?;
        }

        Ok(plan)
    }
}

impl ColumnPrune {
    fn prune(
        &mut self,
        table_list: &mut TableList,
        mut plan: LogicalOperator,
        demand: &HashSet<ColumnExpr>,
    ) -> Result<LogicalOperator> {
        match &mut plan {
            LogicalOperator::Project(node) => {
                let mut child_demand = HashSet::new();
                for expr in &node.node.projections {
                    expr.collect_columns(&mut child_demand);
                }
                self.prune_children(table_list, plan, child_demand)
            }
            LogicalOperator::Filter(node) => {
                let mut child_demand = demand.clone();
                node.node.filter.collect_columns(&mut child_demand);
                self.prune_children(table_list, plan, child_demand)
            }
            LogicalOperator::RowNumber(node) => {
                let own_table = node.node.row_number_table;
                let mut child_demand: HashSet<_> = demand
                    .iter()
                    .copied()
                    .filter(|col| col.table_scope != own_table)
                    .collect();
                child_demand.extend(node.node.partition_by.iter().copied());
                self.prune_children(table_list, plan, child_demand)
            }
            LogicalOperator::TableFunction(node) => {
                let mut child_demand = HashSet::new();
                for arg in &mut node.node.table_arguments {
                    // Narrow pass-through to what's demanded, preserving
                    // declaration order. Required columns are always read by
                    // the function itself.
                    arg.pass_through.retain(|col| demand.contains(col));
                    child_demand.extend(arg.pass_through.iter().copied());
                    child_demand.extend(arg.required.iter().copied());
                    child_demand.extend(arg.partitioning.partition_by.iter().copied());
                    child_demand.extend(arg.partitioning.order_by.iter().map(|key| key.column));
                }
                self.prune_children(table_list, plan, child_demand)
            }
            LogicalOperator::ExpressionList(node) => {
                let table_ref = node.node.table_ref;
                let num_columns = table_list.get(table_ref)?.num_columns();
                let keep: Vec<usize> = (0..num_columns)
                    .filter(|&col| demand.contains(&ColumnExpr::new(table_ref, col)))
                    .collect();

                if keep.len() == num_columns {
                    return Ok(plan);
                }

                debug!(%table_ref, kept = keep.len(), total = num_columns, "shrinking expression list");

                for (new, &old) in keep.iter().enumerate() {
                    self.remap.insert(
                        ColumnExpr::new(table_ref, old),
                        ColumnExpr::new(table_ref, new),
                    );
                }

                for row in &mut node.node.rows {
                    let mut kept_row = Vec::with_capacity(keep.len());
                    for &col in &keep {
                        kept_row.push(row[col].clone());
                    }
                    *row = kept_row;
                }

                let table = table_list.get_mut(table_ref)?;
                table.column_types = keep.iter().map(|&col| table.column_types[col]).collect();
                table.column_names = keep
                    .iter()
                    .map(|&col| table.column_names[col].clone())
                    .collect();

                Ok(plan)
            }
            LogicalOperator::Scan(_) | LogicalOperator::NoRows(_) => Ok(plan),
        }
    }

    fn prune_children(
        &mut self,
        table_list: &mut TableList,
        mut plan: LogicalOperator,
        child_demand: HashSet<ColumnExpr>,
    ) -> Result<LogicalOperator> {
        for child in plan.children_mut().iter_mut() {
            let taken = child.take();
            *child = self.prune(table_list, taken, &child_demand)?;
        }
        Ok(plan)
    }

    /// Rewrite every column reference in the plan with `remap`.
    fn apply_remap(
        plan: &mut LogicalOperator,
        remap: &HashMap<ColumnExpr, ColumnExpr>,
    ) -> Result<()> {
        plan.for_each_expr_mut(&mut |expr| {
            expr.for_each_column_mut(&mut |col| {
                if let Some(new) = remap.get(col) {
                    *col = *new;
                }
                Ok(())
            })
        })?;

        match plan {
            LogicalOperator::TableFunction(node) => node.node.remap_columns(remap)?,
            LogicalOperator::RowNumber(node) => {
                for col in &mut node.node.partition_by {
                    if let Some(new) = remap.get(col) {
                        *col = *new;
                    }
                }
            }
            _ => (),
        }

        for child in plan.children_mut().iter_mut() {
            Self::apply_remap(child, remap)?;
        }

        Ok(())
    }
}
