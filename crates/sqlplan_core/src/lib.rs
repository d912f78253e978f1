//! Planning core for polymorphic table function invocations.
//!
//! Turns a structurally-represented call like
//! `TABLE(func(input => TABLE(...) PARTITION BY ... ORDER BY ...))` into a
//! logical processor node, then rewrites that node under optimizer rules
//! (column pruning, empty-input elimination, native pushdown).

pub mod arrays;
pub mod catalog;
pub mod explain;
pub mod expr;
pub mod functions;
pub mod logical;
pub mod optimizer;

#[cfg(test)]
pub(crate) mod testutil;
