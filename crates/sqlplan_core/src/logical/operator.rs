use std::fmt;

use sqlplan_error::{DbError, Result};

use crate::explain::explainable::{ExplainConfig, ExplainEntry, Explainable};
use crate::expr::Expression;
use crate::logical::binder::table_list::{TableList, TableRef};
use crate::logical::logical_expression_list::LogicalExpressionList;
use crate::logical::logical_filter::LogicalFilter;
use crate::logical::logical_no_rows::LogicalNoRows;
use crate::logical::logical_project::LogicalProject;
use crate::logical::logical_row_number::LogicalRowNumber;
use crate::logical::logical_scan::LogicalScan;
use crate::logical::logical_table_function::LogicalTableFunction;

/// Wrapper around a logical node and its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<N> {
    /// Inner node with the operator-specific state.
    pub node: N,
    /// Children of this node. Order is semantically meaningful.
    pub children: Vec<LogicalOperator>,
}

impl<N> Node<N> {
    pub fn into_inner(self) -> N {
        self.node
    }

    /// Takes the node's single child, erroring if it has a different number
    /// of children.
    pub fn take_one_child_exact(&mut self) -> Result<LogicalOperator> {
        if self.children.len() != 1 {
            return Err(DbError::internal(format!(
                "Expected 1 child, have {}",
                self.children.len()
            )));
        }
        Ok(self.children.remove(0))
    }

    pub fn get_nth_child(&self, n: usize) -> Result<&LogicalOperator> {
        self.children
            .get(n)
            .ok_or_else(|| DbError::internal(format!("Missing child at position {n}")))
    }

    pub fn get_nth_child_mut(&mut self, n: usize) -> Result<&mut LogicalOperator> {
        self.children
            .get_mut(n)
            .ok_or_else(|| DbError::internal(format!("Missing child at position {n}")))
    }

    /// Table refs produced by this node's children.
    pub fn get_children_table_refs(&self, table_list: &TableList) -> Vec<TableRef> {
        self.children.iter().fold(Vec::new(), |mut refs, child| {
            refs.append(&mut child.get_output_table_refs(table_list));
            refs
        })
    }
}

impl<N> AsRef<N> for Node<N> {
    fn as_ref(&self) -> &N {
        &self.node
    }
}

impl<N> AsMut<N> for Node<N> {
    fn as_mut(&mut self) -> &mut N {
        &mut self.node
    }
}

/// Behavior common to all logical nodes.
pub trait LogicalNode {
    /// Name for display and plan comparison.
    fn name(&self) -> &'static str;

    /// Table refs this node exposes to its parent.
    fn get_output_table_refs(&self, table_list: &TableList) -> Vec<TableRef>;

    /// Apply `func` to every expression this node holds. Does not recurse
    /// into children.
    fn for_each_expr<F>(&self, func: &mut F) -> Result<()>
    where
        F: FnMut(&Expression) -> Result<()>;

    fn for_each_expr_mut<F>(&mut self, func: &mut F) -> Result<()>
    where
        F: FnMut(&mut Expression) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalOperator {
    Project(Node<LogicalProject>),
    Filter(Node<LogicalFilter>),
    ExpressionList(Node<LogicalExpressionList>),
    NoRows(Node<LogicalNoRows>),
    RowNumber(Node<LogicalRowNumber>),
    Scan(Node<LogicalScan>),
    TableFunction(Node<LogicalTableFunction>),
}

impl LogicalOperator {
    pub(crate) const NO_ROWS: LogicalOperator = LogicalOperator::NoRows(Node {
        node: LogicalNoRows {
            table_refs: Vec::new(),
        },
        children: Vec::new(),
    });

    /// Replace self with a placeholder, returning the original operator.
    pub fn take(&mut self) -> LogicalOperator {
        std::mem::replace(self, Self::NO_ROWS)
    }

    pub fn children(&self) -> &[LogicalOperator] {
        match self {
            Self::Project(n) => &n.children,
            Self::Filter(n) => &n.children,
            Self::ExpressionList(n) => &n.children,
            Self::NoRows(n) => &n.children,
            Self::RowNumber(n) => &n.children,
            Self::Scan(n) => &n.children,
            Self::TableFunction(n) => &n.children,
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<LogicalOperator> {
        match self {
            Self::Project(n) => &mut n.children,
            Self::Filter(n) => &mut n.children,
            Self::ExpressionList(n) => &mut n.children,
            Self::NoRows(n) => &mut n.children,
            Self::RowNumber(n) => &mut n.children,
            Self::Scan(n) => &mut n.children,
            Self::TableFunction(n) => &mut n.children,
        }
    }

    /// Replace each child with the result of `modify`.
    pub fn modify_replace_children<F>(&mut self, modify: &mut F) -> Result<()>
    where
        F: FnMut(LogicalOperator) -> Result<LogicalOperator>,
    {
        let children = self.children_mut();
        for child in children.iter_mut() {
            let taken = child.take();
            *child = modify(taken)?;
        }
        Ok(())
    }

    /// Walk the plan bottom-up, applying `modify` to every node.
    pub fn walk_modify_post<F>(self, modify: &mut F) -> Result<LogicalOperator>
    where
        F: FnMut(LogicalOperator) -> Result<LogicalOperator>,
    {
        let mut op = self;
        op.modify_replace_children(&mut |child| child.walk_modify_post(modify))?;
        modify(op)
    }

}

impl LogicalNode for LogicalOperator {
    fn name(&self) -> &'static str {
        match self {
            Self::Project(n) => n.name(),
            Self::Filter(n) => n.name(),
            Self::ExpressionList(n) => n.name(),
            Self::NoRows(n) => n.name(),
            Self::RowNumber(n) => n.name(),
            Self::Scan(n) => n.name(),
            Self::TableFunction(n) => n.name(),
        }
    }

    fn get_output_table_refs(&self, table_list: &TableList) -> Vec<TableRef> {
        match self {
            Self::Project(n) => n.get_output_table_refs(table_list),
            Self::Filter(n) => n.get_output_table_refs(table_list),
            Self::ExpressionList(n) => n.get_output_table_refs(table_list),
            Self::NoRows(n) => n.get_output_table_refs(table_list),
            Self::RowNumber(n) => n.get_output_table_refs(table_list),
            Self::Scan(n) => n.get_output_table_refs(table_list),
            Self::TableFunction(n) => n.get_output_table_refs(table_list),
        }
    }

    fn for_each_expr<F>(&self, func: &mut F) -> Result<()>
    where
        F: FnMut(&Expression) -> Result<()>,
    {
        match self {
            Self::Project(n) => n.for_each_expr(func),
            Self::Filter(n) => n.for_each_expr(func),
            Self::ExpressionList(n) => n.for_each_expr(func),
            Self::NoRows(n) => n.for_each_expr(func),
            Self::RowNumber(n) => n.for_each_expr(func),
            Self::Scan(n) => n.for_each_expr(func),
            Self::TableFunction(n) => n.for_each_expr(func),
        }
    }

    fn for_each_expr_mut<F>(&mut self, func: &mut F) -> Result<()>
    where
        F: FnMut(&mut Expression) -> Result<()>,
    {
        match self {
            Self::Project(n) => n.for_each_expr_mut(func),
            Self::Filter(n) => n.for_each_expr_mut(func),
            Self::ExpressionList(n) => n.for_each_expr_mut(func),
            Self::NoRows(n) => n.for_each_expr_mut(func),
            Self::RowNumber(n) => n.for_each_expr_mut(func),
            Self::Scan(n) => n.for_each_expr_mut(func),
            Self::TableFunction(n) => n.for_each_expr_mut(func),
        }
    }
}

impl Explainable for LogicalOperator {
    fn explain_entry(&self, conf: ExplainConfig) -> ExplainEntry {
        match self {
            Self::Project(n) => n.node.explain_entry(conf),
            Self::Filter(n) => n.node.explain_entry(conf),
            Self::ExpressionList(n) => n.node.explain_entry(conf),
            Self::NoRows(n) => n.node.explain_entry(conf),
            Self::RowNumber(n) => n.node.explain_entry(conf),
            Self::Scan(n) => n.node.explain_entry(conf),
            Self::TableFunction(n) => n.node.explain_entry(conf),
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_op(
            op: &LogicalOperator,
            indent: usize,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            writeln!(
                f,
                "{:indent$}{}",
                "",
                op.explain_entry(ExplainConfig::default()),
                indent = indent
            )?;
            for child in op.children() {
                write_op(child, indent + 2, f)?;
            }
            Ok(())
        }

        write_op(self, 0, f)
    }
}
