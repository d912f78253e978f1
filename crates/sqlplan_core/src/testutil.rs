//! Fixtures shared across planner and optimizer tests.

use std::any::Any;

use crate::arrays::datatype::DataType;
use crate::arrays::field::Field;
use crate::arrays::scalar::ScalarValue;
use crate::catalog::MemoryCatalog;
use crate::expr::lit;
use crate::functions::table::{
    ArgumentSpec,
    DescriptorArgumentSpec,
    DescriptorValue,
    ScalarArgumentSpec,
    TableArgumentSemantics,
    TableArgumentSpec,
    TableFunctionHandle,
    TableFunctionSignature,
};
use crate::logical::binder::table_list::{TableList, TableRef};
use crate::logical::logical_expression_list::LogicalExpressionList;
use crate::logical::operator::{LogicalOperator, Node};

pub const TEST_CATALOG: &str = "system";
pub const TEST_SCHEMA: &str = "table_functions";

#[derive(Debug, Clone)]
pub struct TestFunctionHandle {
    pub name: String,
}

impl TestFunctionHandle {
    pub fn boxed(name: &str) -> Box<dyn TableFunctionHandle> {
        Box::new(TestFunctionHandle {
            name: name.to_string(),
        })
    }
}

impl TableFunctionHandle for TestFunctionHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Required TEXT scalar and a defaulted NUMBER scalar, no table inputs.
pub fn two_arguments_function() -> TableFunctionSignature {
    TableFunctionSignature {
        name: "two_arguments_function".to_string(),
        arguments: vec![
            ArgumentSpec::Scalar(ScalarArgumentSpec {
                name: "TEXT".to_string(),
                datatype: DataType::Utf8,
                default: None,
            }),
            ArgumentSpec::Scalar(ScalarArgumentSpec {
                name: "NUMBER".to_string(),
                datatype: DataType::Int64,
                default: Some(ScalarValue::Null),
            }),
        ],
        proper_outputs: vec![Field::new("boolean_column", DataType::Boolean)],
        handle: Some(TestFunctionHandle::boxed("two_arguments_function")),
    }
}

/// Single SCHEMA descriptor argument defaulting to null.
pub fn descriptor_argument_function() -> TableFunctionSignature {
    TableFunctionSignature {
        name: "descriptor_argument_function".to_string(),
        arguments: vec![ArgumentSpec::Descriptor(DescriptorArgumentSpec {
            name: "SCHEMA".to_string(),
            default: Some(DescriptorValue::Null),
        })],
        proper_outputs: vec![Field::new("boolean_column", DataType::Boolean)],
        handle: Some(TestFunctionHandle::boxed("descriptor_argument_function")),
    }
}

/// Two set semantics table arguments, both pruned when empty by default.
pub fn two_table_arguments_function() -> TableFunctionSignature {
    let table_arg = |name: &str| {
        ArgumentSpec::Table(TableArgumentSpec {
            name: name.to_string(),
            semantics: TableArgumentSemantics::Set,
            prune_when_empty: true,
            pass_through_columns: false,
            required_columns: Vec::new(),
        })
    };

    TableFunctionSignature {
        name: "two_table_arguments_function".to_string(),
        arguments: vec![table_arg("INPUT1"), table_arg("INPUT2")],
        proper_outputs: vec![Field::new("boolean_column", DataType::Boolean)],
        handle: Some(TestFunctionHandle::boxed("two_table_arguments_function")),
    }
}

/// Set semantics input with pass-through columns, kept when empty unless the
/// call site overrides, reading only column 0.
pub fn pass_through_function() -> TableFunctionSignature {
    TableFunctionSignature {
        name: "pass_through_function".to_string(),
        arguments: vec![ArgumentSpec::Table(TableArgumentSpec {
            name: "INPUT".to_string(),
            semantics: TableArgumentSemantics::Set,
            prune_when_empty: false,
            pass_through_columns: true,
            required_columns: vec![0],
        })],
        proper_outputs: vec![Field::new("x", DataType::Boolean)],
        handle: Some(TestFunctionHandle::boxed("pass_through_function")),
    }
}

/// One argument of every flavor: a defaulted descriptor, set semantics
/// inputs with and without pass-through, a row semantics input, and a
/// defaulted scalar.
pub fn different_arguments_function() -> TableFunctionSignature {
    TableFunctionSignature {
        name: "different_arguments_function".to_string(),
        arguments: vec![
            ArgumentSpec::Descriptor(DescriptorArgumentSpec {
                name: "LAYOUT".to_string(),
                default: Some(DescriptorValue::Null),
            }),
            ArgumentSpec::Table(TableArgumentSpec {
                name: "INPUT1".to_string(),
                semantics: TableArgumentSemantics::Set,
                prune_when_empty: true,
                pass_through_columns: false,
                required_columns: Vec::new(),
            }),
            ArgumentSpec::Table(TableArgumentSpec {
                name: "INPUT2".to_string(),
                semantics: TableArgumentSemantics::Set,
                prune_when_empty: true,
                pass_through_columns: true,
                required_columns: vec![0],
            }),
            ArgumentSpec::Table(TableArgumentSpec {
                name: "INPUT3".to_string(),
                semantics: TableArgumentSemantics::Row,
                prune_when_empty: false,
                pass_through_columns: false,
                required_columns: Vec::new(),
            }),
            ArgumentSpec::Scalar(ScalarArgumentSpec {
                name: "ID".to_string(),
                datatype: DataType::Int64,
                default: Some(ScalarValue::Int64(0)),
            }),
        ],
        proper_outputs: vec![Field::new("output", DataType::Boolean)],
        handle: Some(TestFunctionHandle::boxed("different_arguments_function")),
    }
}

#[derive(Debug)]
pub struct TestCatalog {
    pub catalog: MemoryCatalog,
}

impl TestCatalog {
    pub fn standard() -> Self {
        let catalog = MemoryCatalog::new()
            .with_function(TEST_CATALOG, TEST_SCHEMA, two_arguments_function())
            .with_function(TEST_CATALOG, TEST_SCHEMA, descriptor_argument_function())
            .with_function(TEST_CATALOG, TEST_SCHEMA, two_table_arguments_function())
            .with_function(TEST_CATALOG, TEST_SCHEMA, pass_through_function())
            .with_function(TEST_CATALOG, TEST_SCHEMA, different_arguments_function());
        TestCatalog { catalog }
    }
}

/// Build an inline values relation with Int64 columns of the given names.
pub fn values_input(
    table_list: &mut TableList,
    columns: &[&str],
    num_rows: usize,
) -> (LogicalOperator, TableRef) {
    typed_values_input(
        table_list,
        &columns
            .iter()
            .map(|name| (*name, DataType::Int64))
            .collect::<Vec<_>>(),
        num_rows,
    )
}

/// Build an inline values relation with explicitly typed columns.
pub fn typed_values_input(
    table_list: &mut TableList,
    columns: &[(&str, DataType)],
    num_rows: usize,
) -> (LogicalOperator, TableRef) {
    let types: Vec<_> = columns.iter().map(|(_, datatype)| *datatype).collect();
    let names: Vec<_> = columns.iter().map(|(name, _)| name.to_string()).collect();

    let table_ref = table_list
        .push_table(types.clone(), names)
        .expect("types and names have the same length");

    let rows = (0..num_rows)
        .map(|_| {
            types
                .iter()
                .map(|datatype| match datatype {
                    DataType::Int16 => lit(1_i16),
                    DataType::Int32 => lit(1_i32),
                    DataType::Utf8 => lit("v"),
                    DataType::Boolean => lit(true),
                    _ => lit(1_i64),
                })
                .collect()
        })
        .collect();

    let plan = LogicalOperator::ExpressionList(Node {
        node: LogicalExpressionList { table_ref, rows },
        children: Vec::new(),
    });

    (plan, table_ref)
}
