use sqlplan_error::Result;

use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::expr::Expression;
use crate::logical::binder::table_list::{TableList, TableRef};
use crate::logical::operator::{LogicalNode, Node};

/// Produces zero rows with a known output schema.
///
/// Replaces subtrees that are statically known to be empty. Keeps the table
/// refs of whatever it replaced so expressions above it stay valid.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalNoRows {
    pub table_refs: Vec<TableRef>,
}

impl Explainable for LogicalNoRows {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("NoRows").with_values("table_refs", &self.table_refs)
    }
}

impl LogicalNode for Node<LogicalNoRows> {
    fn name(&self) -> &'static str {
        "NoRows"
    }

    fn get_output_table_refs(&self, _table_list: &TableList) -> Vec<TableRef> {
        self.node.table_refs.clone()
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
