use sqlplan_error::Result;

use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::expr::Expression;
use crate::logical::binder::table_list::{TableList, TableRef};
use crate::logical::operator::{LogicalNode, Node};

/// Inline rows of literal expressions, a VALUES clause.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpressionList {
    pub table_ref: TableRef,
    /// Rows of expressions. All rows have the same width.
    pub rows: Vec<Vec<Expression>>,
}

impl Explainable for LogicalExpressionList {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("ExpressionList")
            .with_value("table_ref", self.table_ref)
            .with_value("num_rows", self.rows.len())
    }
}

impl LogicalNode for Node<LogicalExpressionList> {
    fn name(&self) -> &'static str {
        "ExpressionList"
    }

    fn get_output_table_refs(&self, _table_list: &TableList) -> Vec<TableRef> {
        vec![self.node.table_ref]
    }

    fn for_each_expr<F>(&self, func: &mut F) -> Result<()>
    where
        F: FnMut(&Expression) -> Result<()>,
    {
        for row in &self.node.rows {
            for expr in row {
                func(expr)?;
            }
        }
        Ok(())
    }

    fn for_each_expr_mut<F>(&mut self, func: &mut F) -> Result<()>
    where
        F: FnMut(&mut Expression) -> Result<()>,
    {
        for row in &mut self.node.rows {
            for expr in row {
                func(expr)?;
            }
        }
        Ok(())
    }
}
