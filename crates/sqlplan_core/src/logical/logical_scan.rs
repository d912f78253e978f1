use sqlplan_error::Result;

use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::expr::Expression;
use crate::functions::table::ScanHandle;
use crate::logical::binder::table_list::{TableList, TableRef};
use crate::logical::operator::{LogicalNode, Node};

/// Direct scan of a data source.
///
/// Produced by pushdown when a source absorbs a table function invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalScan {
    pub table_ref: TableRef,
    pub handle: ScanHandle,
    /// For each output column, the source column that backs it.
    pub projection: Vec<usize>,
}

impl Explainable for LogicalScan {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        let mut ent = ExplainEntry::new("Scan")
            .with_value("source", &self.handle.name)
            .with_value("table_ref", self.table_ref);
        if conf.verbose {
            ent = ent.with_values("projection", &self.projection);
        }
        ent
    }
}

impl LogicalNode for Node<LogicalScan> {
    fn name(&self) -> &'static str {
        "Scan"
    }

    fn get_output_table_refs(&self, _table_list: &TableList) -> Vec<TableRef> {
        vec![self.node.table_ref]
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
