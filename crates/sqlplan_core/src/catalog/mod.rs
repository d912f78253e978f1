use std::collections::HashMap;
use std::fmt::Debug;

use sqlplan_error::{DbError, DbErrorKind, Result};

use crate::functions::table::TableFunctionSignature;

/// Resolves table function names to their signatures.
pub trait FunctionResolver: Debug {
    /// Look up a table function by its qualified name.
    ///
    /// Errors with [`DbErrorKind::FunctionNotFound`] if no function with that
    /// name exists.
    fn resolve_signature(
        &self,
        catalog: &str,
        schema: &str,
        name: &str,
    ) -> Result<&TableFunctionSignature>;
}

/// In-memory function registry.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    /// Keyed by lowercased (catalog, schema, function name).
    functions: HashMap<(String, String, String), TableFunctionSignature>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function(
        mut self,
        catalog: &str,
        schema: &str,
        signature: TableFunctionSignature,
    ) -> Self {
        let key = (
            catalog.to_ascii_lowercase(),
            schema.to_ascii_lowercase(),
            signature.name.to_ascii_lowercase(),
        );
        self.functions.insert(key, signature);
        self
    }
}

impl FunctionResolver for MemoryCatalog {
    fn resolve_signature(
        &self,
        catalog: &str,
        schema: &str,
        name: &str,
    ) -> Result<&TableFunctionSignature> {
        let key = (
            catalog.to_ascii_lowercase(),
            schema.to_ascii_lowercase(),
            name.to_ascii_lowercase(),
        );
        self.functions.get(&key).ok_or_else(|| {
            DbError::with_kind(
                DbErrorKind::FunctionNotFound,
                format!("Table function '{catalog}.{schema}.{name}' does not exist"),
            )
        })
    }
}
