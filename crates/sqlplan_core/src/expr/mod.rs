pub mod cast_expr;
pub mod column_expr;
pub mod literal_expr;

use std::collections::HashSet;
use std::fmt;

use cast_expr::CastExpr;
use column_expr::ColumnExpr;
use literal_expr::LiteralExpr;
use sqlplan_error::Result;

use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;
use crate::logical::binder::table_list::{TableList, TableRef};

/// An expression that can exist in a logical plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Column(ColumnExpr),
    Literal(LiteralExpr),
    Cast(CastExpr),
}

impl Expression {
    /// Get the output data type of this expression.
    pub fn datatype(&self, table_list: &TableList) -> Result<DataType> {
        Ok(match self {
            Self::Column(col) => col.datatype(table_list)?,
            Self::Literal(lit) => lit.literal.datatype(),
            Self::Cast(cast) => cast.to,
        })
    }

    pub fn for_each_child<F>(&self, func: &mut F) -> Result<()>
    where
        F: FnMut(&Expression) -> Result<()>,
    {
        match self {
            Self::Column(_) | Self::Literal(_) => (),
            Self::Cast(cast) => func(&cast.expr)?,
        }
        Ok(())
    }

    pub fn for_each_child_mut<F>(&mut self, func: &mut F) -> Result<()>
    where
        F: FnMut(&mut Expression) -> Result<()>,
    {
        match self {
            Self::Column(_) | Self::Literal(_) => (),
            Self::Cast(cast) => func(&mut cast.expr)?,
        }
        Ok(())
    }

    /// Walk the expression, applying `func` to every column reference.
    pub fn for_each_column_mut<F>(&mut self, func: &mut F) -> Result<()>
    where
        F: FnMut(&mut ColumnExpr) -> Result<()>,
    {
        match self {
            Self::Column(col) => func(col)?,
            Self::Literal(_) => (),
            Self::Cast(cast) => cast.expr.for_each_column_mut(func)?,
        }
        Ok(())
    }

    /// Collect all column references in this expression into `refs`.
    pub fn collect_columns(&self, refs: &mut HashSet<ColumnExpr>) {
        match self {
            Self::Column(col) => {
                refs.insert(*col);
            }
            Self::Literal(_) => (),
            Self::Cast(cast) => cast.expr.collect_columns(refs),
        }
    }

    /// Check if this expression can never evaluate to true.
    ///
    /// Holds for a literal `false` and for a literal null (filters treat an
    /// unknown predicate result as not passing).
    pub fn is_always_false(&self) -> bool {
        match self {
            Self::Literal(LiteralExpr {
                literal: ScalarValue::Boolean(false),
            }) => true,
            Self::Literal(LiteralExpr {
                literal: ScalarValue::Null,
            }) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(v) => write!(f, "{v}"),
            Self::Literal(v) => write!(f, "{v}"),
            Self::Cast(v) => write!(f, "{v}"),
        }
    }
}

pub fn lit(value: impl Into<ScalarValue>) -> Expression {
    Expression::Literal(LiteralExpr {
        literal: value.into(),
    })
}

pub fn col_ref(table: impl Into<TableRef>, column: usize) -> Expression {
    Expression::Column(ColumnExpr::new(table, column))
}

pub fn cast(expr: Expression, to: DataType) -> Expression {
    Expression::Cast(CastExpr {
        to,
        expr: Box::new(expr),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_false() {
        assert!(lit(false).is_always_false());
        assert!(lit(ScalarValue::Null).is_always_false());
        assert!(!lit(true).is_always_false());
        assert!(!col_ref(0, 0).is_always_false());
    }

    #[test]
    fn collect_columns_through_cast() {
        let expr = cast(col_ref(1, 2), DataType::Int64);
        let mut refs = HashSet::new();
        expr.collect_columns(&mut refs);
        assert_eq!(1, refs.len());
        assert!(refs.contains(&ColumnExpr::new(1, 2)));
    }
}
