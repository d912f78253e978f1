use sqlplan_error::{DbError, DbErrorKind, Result};
use tracing::debug;

use crate::functions::table::{ScanApplication, TableFunctionApplyHook};
use crate::logical::binder::table_list::TableList;
use crate::logical::logical_scan::LogicalScan;
use crate::logical::operator::{LogicalOperator, Node};
use crate::optimizer::OptimizeRule;

/// Offers leaf table functions to a source-provided hook, replacing accepted
/// ones with direct scans.
///
/// Only functions with a handle and no table arguments are offered. The scan
/// adopts the function's output table ref, so nothing above the node needs
/// rewriting.
#[derive(Debug)]
pub struct TableFunctionPushdown<'a> {
    hook: &'a dyn TableFunctionApplyHook,
}

impl<'a> TableFunctionPushdown<'a> {
    pub fn new(hook: &'a dyn TableFunctionApplyHook) -> Self {
        TableFunctionPushdown { hook }
    }
}

impl OptimizeRule for TableFunctionPushdown<'_> {
    fn optimize(
        &mut self,
        table_list: &mut TableList,
        plan: LogicalOperator,
    ) -> Result<LogicalOperator> {
        plan.walk_modify_post(&mut |op| self.push_down(table_list, op))
    }
}

impl TableFunctionPushdown<'_> {
    fn push_down(&self, table_list: &TableList, op: LogicalOperator) -> Result<LogicalOperator> {
        let node = match &op {
            LogicalOperator::TableFunction(node)
                if node.node.handle.is_some() && node.node.table_arguments.is_empty() =>
            {
                node
            }
            _ => return Ok(op),
        };

        let handle = node.node.handle()?;
        let applied = match self.hook.apply_table_function(handle)? {
            Some(applied) => applied,
            None => return Ok(op),
        };

        let application = applied
            .as_any()
            .downcast_ref::<ScanApplication>()
            .ok_or_else(|| {
                DbError::with_kind(
                    DbErrorKind::UnsupportedArgumentHandle,
                    format!(
                        "Source returned an unsupported application for function '{}'",
                        node.node.name
                    ),
                )
            })?;

        let output_ref = node.node.output_ref;
        let num_outputs = table_list.get(output_ref)?.num_columns();
        if application.column_mapping.len() != num_outputs {
            return Err(DbError::internal(format!(
                "Scan application maps {} columns, function '{}' outputs {num_outputs}",
                application.column_mapping.len(),
                node.node.name
            )));
        }
        for &col in &application.column_mapping {
            if col >= application.handle.column_types.len() {
                return Err(DbError::internal(format!(
                    "Scan application references column {col} past the source schema"
                )));
            }
        }

        debug!(function = %node.node.name, source = %application.handle.name, "pushed table function into scan");

        Ok(LogicalOperator::Scan(Node {
            node: LogicalScan {
                table_ref: output_ref,
                handle: application.handle.clone(),
                projection: application.column_mapping.clone(),
            },
            children: Vec::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;

    use crate::arrays::datatype::DataType;
    use crate::functions::table::{AppliedTableFunction, ScanHandle, TableFunctionHandle};
    use crate::logical::binder::bind_table_function::{
        ArgumentValue,
        InvocationArgument,
        TableFunctionBinder,
        TableFunctionInvocation,
    };
    use crate::logical::operator::LogicalNode;
    use crate::logical::planner::plan_table_function::TableFunctionPlanner;
    use crate::testutil::{TestCatalog, TEST_CATALOG, TEST_SCHEMA};

    /// two_arguments_function invocation with no table inputs.
    fn leaf_function_plan(table_list: &mut TableList) -> LogicalOperator {
        let catalog = TestCatalog::standard();
        let invocation = TableFunctionInvocation {
            catalog: TEST_CATALOG.to_string(),
            schema: TEST_SCHEMA.to_string(),
            name: "two_arguments_function".to_string(),
            arguments: vec![InvocationArgument::named(
                "text",
                ArgumentValue::Scalar("foo".into()),
            )],
            copartition: Vec::new(),
        };

        let bound = TableFunctionBinder::new(&catalog.catalog, table_list)
            .bind(invocation)
            .unwrap();
        TableFunctionPlanner::new(table_list).plan(bound).unwrap()
    }

    fn scan_handle() -> ScanHandle {
        ScanHandle {
            name: "system_table".to_string(),
            column_names: vec!["ignored".to_string(), "boolean_column".to_string()],
            column_types: vec![DataType::Int64, DataType::Boolean],
        }
    }

    #[derive(Debug)]
    struct AcceptingHook;

    impl TableFunctionApplyHook for AcceptingHook {
        fn apply_table_function(
            &self,
            _handle: &dyn TableFunctionHandle,
        ) -> Result<Option<Box<dyn AppliedTableFunction>>> {
            Ok(Some(Box::new(ScanApplication {
                handle: scan_handle(),
                column_mapping: vec![1],
            })))
        }
    }

    #[derive(Debug)]
    struct DecliningHook;

    impl TableFunctionApplyHook for DecliningHook {
        fn apply_table_function(
            &self,
            _handle: &dyn TableFunctionHandle,
        ) -> Result<Option<Box<dyn AppliedTableFunction>>> {
            Ok(None)
        }
    }

    #[derive(Debug)]
    struct OpaqueApplication;

    impl AppliedTableFunction for OpaqueApplication {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct OpaqueHook;

    impl TableFunctionApplyHook for OpaqueHook {
        fn apply_table_function(
            &self,
            _handle: &dyn TableFunctionHandle,
        ) -> Result<Option<Box<dyn AppliedTableFunction>>> {
            Ok(Some(Box::new(OpaqueApplication)))
        }
    }

    #[test]
    fn accepted_function_becomes_scan() {
        let mut table_list = TableList::empty();
        let plan = leaf_function_plan(&mut table_list);
        let output_ref = plan.get_output_table_refs(&table_list)[0];

        let optimized = TableFunctionPushdown::new(&AcceptingHook)
            .optimize(&mut table_list, plan)
            .unwrap();

        let scan = match &optimized {
            LogicalOperator::Scan(scan) => scan,
            other => panic!("expected scan, got {}", other.name()),
        };
        assert_eq!(output_ref, scan.node.table_ref);
        assert_eq!("system_table", scan.node.handle.name);
        assert_eq!(vec![1], scan.node.projection);
    }

    #[test]
    fn declined_function_unchanged() {
        let mut table_list = TableList::empty();
        let plan = leaf_function_plan(&mut table_list);
        let expected = plan.clone();

        let optimized = TableFunctionPushdown::new(&DecliningHook)
            .optimize(&mut table_list, plan)
            .unwrap();

        assert_eq!(expected, optimized);
    }

    #[test]
    fn unsupported_application_errors() {
        let mut table_list = TableList::empty();
        let plan = leaf_function_plan(&mut table_list);

        let err = TableFunctionPushdown::new(&OpaqueHook)
            .optimize(&mut table_list, plan)
            .unwrap_err();

        assert_eq!(DbErrorKind::UnsupportedArgumentHandle, err.kind());
    }
}
