use indexmap::IndexSet;
use sqlplan_error::{DbError, DbErrorKind, Result};
use tracing::debug;

use crate::arrays::scalar::ScalarValue;
use crate::catalog::FunctionResolver;
use crate::expr::column_expr::ColumnExpr;
use crate::functions::implicit::implicit_cast_score;
use crate::functions::table::{
    ArgumentSpec,
    DescriptorValue,
    TableArgumentSemantics,
    TableFunctionSignature,
};
use crate::logical::binder::table_list::{TableList, TableRef};
use crate::logical::logical_table_function::BoundOrderBy;
use crate::logical::operator::LogicalOperator;

/// Whether an empty input should empty the function output, as written at the
/// call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyBehavior {
    Keep,
    Prune,
}

/// An ORDER BY key as written, prior to column resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByInput {
    pub column: String,
    pub desc: bool,
    pub nulls_first: bool,
}

impl OrderByInput {
    pub fn asc(column: impl Into<String>) -> Self {
        OrderByInput {
            column: column.into(),
            desc: false,
            nulls_first: false,
        }
    }
}

/// A relation passed as a table argument.
#[derive(Debug, Clone, PartialEq)]
pub struct TableArgumentInput {
    /// Already-planned input relation.
    pub plan: LogicalOperator,
    /// Table ref exposing the relation's columns.
    pub table_ref: TableRef,
    pub partition_by: Vec<String>,
    pub order_by: Vec<OrderByInput>,
    /// KEEP/PRUNE WHEN EMPTY written at the call site, if any.
    pub empty_behavior: Option<EmptyBehavior>,
}

impl TableArgumentInput {
    pub fn new(plan: LogicalOperator, table_ref: TableRef) -> Self {
        TableArgumentInput {
            plan,
            table_ref,
            partition_by: Vec::new(),
            order_by: Vec::new(),
            empty_behavior: None,
        }
    }

    pub fn with_partition_by<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.partition_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_order_by(mut self, keys: impl IntoIterator<Item = OrderByInput>) -> Self {
        self.order_by = keys.into_iter().collect();
        self
    }

    pub fn with_empty_behavior(mut self, behavior: EmptyBehavior) -> Self {
        self.empty_behavior = Some(behavior);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Scalar(ScalarValue),
    Descriptor(DescriptorValue),
    Table(TableArgumentInput),
}

impl ArgumentValue {
    fn kind_str(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Descriptor(_) => "descriptor",
            Self::Table(_) => "table",
        }
    }
}

/// A single argument as written in the invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationArgument {
    /// Name if passed by name, None if positional.
    pub name: Option<String>,
    pub value: ArgumentValue,
}

impl InvocationArgument {
    pub fn positional(value: ArgumentValue) -> Self {
        InvocationArgument { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: ArgumentValue) -> Self {
        InvocationArgument {
            name: Some(name.into()),
            value,
        }
    }
}

/// A table function invocation as written in the query.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFunctionInvocation {
    pub catalog: String,
    pub schema: String,
    pub name: String,
    pub arguments: Vec<InvocationArgument>,
    /// COPARTITION groups, each a list of table argument names.
    pub copartition: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundTableArgument {
    pub name: String,
    pub plan: LogicalOperator,
    pub table_ref: TableRef,
    pub partition_by: Vec<ColumnExpr>,
    pub order_by: Vec<BoundOrderBy>,
    pub prune_when_empty: bool,
    pub row_semantics: bool,
    pub pass_through_columns: bool,
    /// Ordinals of input columns the function reads.
    pub required_columns: Vec<usize>,
    /// Extra required columns added during planning, for instance injected
    /// row numbers. Empty after binding.
    pub required_columns_extra: Vec<ColumnExpr>,
}

/// A fully bound invocation, ready for planning.
#[derive(Debug, Clone)]
pub struct BoundTableFunction {
    pub signature: TableFunctionSignature,
    pub scalar_arguments: Vec<(String, ScalarValue)>,
    pub descriptor_arguments: Vec<(String, DescriptorValue)>,
    pub table_arguments: Vec<BoundTableArgument>,
    /// COPARTITION groups as indices into `table_arguments`.
    pub copartition: Vec<Vec<usize>>,
}

#[derive(Debug)]
pub struct TableFunctionBinder<'a> {
    pub resolver: &'a dyn FunctionResolver,
    pub table_list: &'a mut TableList,
}

impl<'a> TableFunctionBinder<'a> {
    pub fn new(resolver: &'a dyn FunctionResolver, table_list: &'a mut TableList) -> Self {
        TableFunctionBinder {
            resolver,
            table_list,
        }
    }

    pub fn bind(&mut self, invocation: TableFunctionInvocation) -> Result<BoundTableFunction> {
        let signature = self
            .resolver
            .resolve_signature(&invocation.catalog, &invocation.schema, &invocation.name)?
            .clone();

        debug!(function = %signature.name, "binding table function invocation");

        // Values matched up with declared argument positions.
        let mut matched: Vec<Option<ArgumentValue>> = vec![None; signature.arguments.len()];

        for (pos, arg) in invocation.arguments.into_iter().enumerate() {
            let decl_idx = match &arg.name {
                Some(name) => signature
                    .arguments
                    .iter()
                    .position(|spec| spec.name().eq_ignore_ascii_case(name))
                    .ok_or_else(|| {
                        DbError::with_kind(
                            DbErrorKind::UnknownArgument,
                            format!(
                                "Unknown argument '{name}' for function '{}'",
                                signature.name
                            ),
                        )
                    })?,
                None => {
                    if pos >= signature.arguments.len() {
                        return Err(DbError::new(format!(
                            "Too many arguments for function '{}', expected at most {}",
                            signature.name,
                            signature.arguments.len()
                        )));
                    }
                    pos
                }
            };

            if matched[decl_idx].is_some() {
                return Err(DbError::new(format!(
                    "Argument '{}' provided more than once",
                    signature.arguments[decl_idx].name()
                )));
            }
            matched[decl_idx] = Some(arg.value);
        }

        let mut scalar_arguments = Vec::new();
        let mut descriptor_arguments = Vec::new();
        let mut table_arguments = Vec::new();

        for (spec, value) in signature.arguments.iter().zip(matched) {
            match (spec, value) {
                (ArgumentSpec::Scalar(spec), value) => {
                    let value = match value {
                        Some(ArgumentValue::Scalar(value)) => value,
                        Some(other) => return Err(Self::kind_mismatch(spec.name.as_str(), "scalar", &other)),
                        None => spec.default.clone().ok_or_else(|| {
                            Self::missing_required(&signature.name, &spec.name)
                        })?,
                    };

                    // A null literal binds to any scalar type, matching a
                    // defaulted null. Anything else is stored widened to the
                    // declared type.
                    let value = if value.is_null() {
                        value
                    } else {
                        let have = value.datatype();
                        if have != spec.datatype
                            && implicit_cast_score(have, spec.datatype).is_none()
                        {
                            return Err(DbError::new(format!(
                                "Invalid value for argument '{}', expected {}, got {have}",
                                spec.name, spec.datatype
                            )));
                        }
                        value.cast_to(spec.datatype)?
                    };

                    scalar_arguments.push((spec.name.clone(), value));
                }
                (ArgumentSpec::Descriptor(spec), value) => {
                    let value = match value {
                        Some(ArgumentValue::Descriptor(value)) => value,
                        Some(other) => {
                            return Err(Self::kind_mismatch(spec.name.as_str(), "descriptor", &other))
                        }
                        None => spec.default.clone().ok_or_else(|| {
                            Self::missing_required(&signature.name, &spec.name)
                        })?,
                    };

                    descriptor_arguments.push((spec.name.clone(), value));
                }
                (ArgumentSpec::Table(spec), value) => {
                    let input = match value {
                        Some(ArgumentValue::Table(input)) => input,
                        Some(other) => return Err(Self::kind_mismatch(spec.name.as_str(), "table", &other)),
                        None => {
                            return Err(Self::missing_required(&signature.name, &spec.name))
                        }
                    };

                    table_arguments.push(self.bind_table_argument(spec.name.clone(), spec, input)?);
                }
            }
        }

        let copartition = self.bind_copartition(invocation.copartition, &table_arguments)?;

        Ok(BoundTableFunction {
            signature,
            scalar_arguments,
            descriptor_arguments,
            table_arguments,
            copartition,
        })
    }

    fn bind_table_argument(
        &mut self,
        name: String,
        spec: &crate::functions::table::TableArgumentSpec,
        input: TableArgumentInput,
    ) -> Result<BoundTableArgument> {
        let row_semantics = spec.semantics == TableArgumentSemantics::Row;

        if row_semantics && (!input.partition_by.is_empty() || !input.order_by.is_empty()) {
            return Err(DbError::new(format!(
                "Table argument '{name}' has row semantics and cannot be partitioned or ordered"
            )));
        }
        if row_semantics && input.empty_behavior.is_some() {
            return Err(DbError::new(format!(
                "Table argument '{name}' has row semantics, KEEP or PRUNE WHEN EMPTY cannot be specified"
            )));
        }

        // Duplicate partition keys are harmless, keep the first occurrence.
        let mut partition_cols: IndexSet<usize> = IndexSet::new();
        for col_name in &input.partition_by {
            let col = self.resolve_column(input.table_ref, col_name)?;
            partition_cols.insert(col);
        }
        let partition_by: Vec<_> = partition_cols
            .into_iter()
            .map(|col| ColumnExpr::new(input.table_ref, col))
            .collect();

        let mut order_by = Vec::with_capacity(input.order_by.len());
        for key in &input.order_by {
            let col = self.resolve_column(input.table_ref, &key.column)?;
            order_by.push(BoundOrderBy {
                column: ColumnExpr::new(input.table_ref, col),
                desc: key.desc,
                nulls_first: key.nulls_first,
            });
        }

        let prune_when_empty = match input.empty_behavior {
            Some(EmptyBehavior::Prune) => true,
            Some(EmptyBehavior::Keep) => false,
            None => spec.prunes_when_empty(),
        };

        let num_columns = self.table_list.get(input.table_ref)?.num_columns();
        for &col in &spec.required_columns {
            if col >= num_columns {
                return Err(DbError::internal(format!(
                    "Required column {col} out of range for table argument '{name}'"
                )));
            }
        }

        Ok(BoundTableArgument {
            name,
            plan: input.plan,
            table_ref: input.table_ref,
            partition_by,
            order_by,
            prune_when_empty,
            row_semantics,
            pass_through_columns: spec.pass_through_columns,
            required_columns: spec.required_columns.clone(),
            required_columns_extra: Vec::new(),
        })
    }

    fn bind_copartition(
        &self,
        groups: Vec<Vec<String>>,
        table_arguments: &[BoundTableArgument],
    ) -> Result<Vec<Vec<usize>>> {
        let mut bound_groups = Vec::with_capacity(groups.len());

        for group in groups {
            if group.len() < 2 {
                return Err(DbError::new(
                    "COPARTITION requires at least two table arguments",
                ));
            }

            let mut members = Vec::with_capacity(group.len());
            for member_name in &group {
                let idx = table_arguments
                    .iter()
                    .position(|arg| arg.name.eq_ignore_ascii_case(member_name))
                    .ok_or_else(|| {
                        DbError::new(format!(
                            "COPARTITION references unknown table argument '{member_name}'"
                        ))
                    })?;

                if table_arguments[idx].partition_by.is_empty() {
                    return Err(DbError::new(format!(
                        "Copartitioned table argument '{member_name}' must specify PARTITION BY"
                    )));
                }

                members.push(idx);
            }

            let arity = table_arguments[members[0]].partition_by.len();
            for &idx in &members[1..] {
                let other = table_arguments[idx].partition_by.len();
                if other != arity {
                    return Err(DbError::with_kind(
                        DbErrorKind::IncompatibleCopartitionArity,
                        "Copartitioned table arguments have different numbers of partitioning columns",
                    )
                    .with_fields([
                        (
                            "first",
                            format!("{} ({arity})", table_arguments[members[0]].name),
                        ),
                        ("second", format!("{} ({other})", table_arguments[idx].name)),
                    ]));
                }
            }

            bound_groups.push(members);
        }

        Ok(bound_groups)
    }

    fn resolve_column(&self, table_ref: TableRef, name: &str) -> Result<usize> {
        self.table_list
            .find_column(table_ref, name)?
            .ok_or_else(|| DbError::new(format!("Column '{name}' not found in table argument")))
    }

    fn missing_required(function: &str, argument: &str) -> DbError {
        DbError::with_kind(
            DbErrorKind::MissingRequiredArgument,
            format!("Missing required argument '{argument}' for function '{function}'"),
        )
    }

    fn kind_mismatch(argument: &str, expected: &str, got: &ArgumentValue) -> DbError {
        DbError::new(format!(
            "Argument '{argument}' expects a {expected} value, got a {} value",
            got.kind_str()
        ))
    }
}
