use std::fmt;

use sqlplan_error::{DbError, Result};

use crate::arrays::datatype::DataType;

/// Reference to a table in a table list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableRef {
    pub table_idx: usize,
}

impl From<usize> for TableRef {
    fn from(value: usize) -> Self {
        TableRef { table_idx: value }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.table_idx)
    }
}

/// A "table" scope in a query.
///
/// Every logical operator that produces columns owns one of these. Column
/// expressions reference a table and a column ordinal within it.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub reference: TableRef,
    pub column_types: Vec<DataType>,
    pub column_names: Vec<String>,
}

impl Table {
    pub fn num_columns(&self) -> usize {
        self.column_types.len()
    }
}

/// List of tables in a query.
///
/// Shared between binding, planning, and optimization. Tables are never
/// removed, only added, so references remain stable for the lifetime of a
/// plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableList {
    pub(crate) tables: Vec<Table>,
}

impl TableList {
    pub const fn empty() -> Self {
        TableList { tables: Vec::new() }
    }

    pub fn get(&self, table_ref: TableRef) -> Result<&Table> {
        self.tables
            .get(table_ref.table_idx)
            .ok_or_else(|| DbError::internal(format!("Missing table in table list: {table_ref}")))
    }

    pub fn get_mut(&mut self, table_ref: TableRef) -> Result<&mut Table> {
        self.tables
            .get_mut(table_ref.table_idx)
            .ok_or_else(|| DbError::internal(format!("Missing table in table list: {table_ref}")))
    }

    /// Push a table with the given types and names, returning the reference
    /// for the new table.
    pub fn push_table(
        &mut self,
        column_types: Vec<DataType>,
        column_names: Vec<String>,
    ) -> Result<TableRef> {
        if column_types.len() != column_names.len() {
            return Err(DbError::internal(
                "Column types and names have different lengths",
            )
            .with_fields([
                ("types", column_types.len().to_string()),
                ("names", column_names.len().to_string()),
            ]));
        }

        let reference = TableRef {
            table_idx: self.tables.len(),
        };

        self.tables.push(Table {
            reference,
            column_types,
            column_names,
        });

        Ok(reference)
    }

    /// Get the type and name for a column.
    pub fn get_column(&self, table_ref: TableRef, column: usize) -> Result<(&str, DataType)> {
        let table = self.get(table_ref)?;

        let name = table.column_names.get(column).ok_or_else(|| {
            DbError::internal(format!("Missing column {column} in table {table_ref}"))
        })?;
        let datatype = table.column_types[column];

        Ok((name.as_str(), datatype))
    }

    /// Find the ordinal of a column by name within a table.
    ///
    /// Comparison is case-insensitive, matching how column identifiers are
    /// resolved during binding.
    pub fn find_column(&self, table_ref: TableRef, name: &str) -> Result<Option<usize>> {
        let table = self.get(table_ref)?;
        Ok(table
            .column_names
            .iter()
            .position(|col| col.eq_ignore_ascii_case(name)))
    }
}
