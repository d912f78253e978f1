use sqlplan_error::Result;

use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::expr::Expression;
use crate::expr::column_expr::ColumnExpr;
use crate::logical::binder::table_list::{TableList, TableRef};
use crate::logical::operator::{LogicalNode, Node};

/// Numbers the rows of its input, optionally per partition.
///
/// Output is all input columns plus a single Int64 column owned by
/// `row_number_table`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalRowNumber {
    /// Table ref for the generated row number column.
    pub row_number_table: TableRef,
    /// Numbering restarts for each distinct combination of these columns.
    /// Empty means a single global numbering.
    pub partition_by: Vec<ColumnExpr>,
}

impl Explainable for LogicalRowNumber {
    fn explain_entry(&self, _conf: ExplainConfig) -> ExplainEntry {
        ExplainEntry::new("RowNumber")
            .with_value("table_ref", self.row_number_table)
            .with_values("partition_by", &self.partition_by)
    }
}

impl LogicalNode for Node<LogicalRowNumber> {
    fn name(&self) -> &'static str {
        "RowNumber"
    }

    fn get_output_table_refs(&self, table_list: &TableList) -> Vec<TableRef> {
        let mut refs = self.get_children_table_refs(table_list);
        refs.push(self.node.row_number_table);
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
