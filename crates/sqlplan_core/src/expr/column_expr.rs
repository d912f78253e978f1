use std::fmt;

use sqlplan_error::{DbError, Result};

use crate::arrays::datatype::DataType;
use crate::logical::binder::table_list::{TableList, TableRef};

/// Reference to a column in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnExpr {
    /// Table this column is part of.
    pub table_scope: TableRef,
    /// Column index within the table.
    pub column: usize,
}

impl ColumnExpr {
    pub fn new(table: impl Into<TableRef>, column: usize) -> Self {
        ColumnExpr {
            table_scope: table.into(),
            column,
        }
    }

    pub fn datatype(&self, table_list: &TableList) -> Result<DataType> {
        let table = table_list.get(self.table_scope)?;
        table
            .column_types
            .get(self.column)
            .copied()
            .ok_or_else(|| DbError::internal(format!("Missing column in table list: {self}")))
    }
}

impl fmt::Display for ColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table_scope, self.column)
    }
}
