pub mod column_prune;
pub mod empty_elimination;
pub mod table_function_pushdown;

use std::sync::Arc;

use sqlplan_error::{DbError, Result};
use tracing::debug;

use crate::functions::table::TableFunctionApplyHook;
use crate::logical::binder::table_list::TableList;
use crate::logical::operator::LogicalOperator;
use column_prune::ColumnPrune;
use empty_elimination::EmptyElimination;
use table_function_pushdown::TableFunctionPushdown;

/// A logical plan rewrite.
///
/// Rules must be no-ops on plans they don't apply to, the optimizer runs them
/// until the plan stops changing.
pub trait OptimizeRule {
    fn optimize(
        &mut self,
        table_list: &mut TableList,
        plan: LogicalOperator,
    ) -> Result<LogicalOperator>;
}

#[derive(Debug, Default)]
pub struct Optimizer {
    /// Hook for absorbing table functions into source scans.
    pub apply_hook: Option<Arc<dyn TableFunctionApplyHook>>,
}

impl Optimizer {
    /// Number of whole-plan passes before we assume rules are fighting each
    /// other.
    const MAX_PASSES: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_apply_hook(mut self, hook: Arc<dyn TableFunctionApplyHook>) -> Self {
        self.apply_hook = Some(hook);
        self
    }

    /// Run all rules to a fixpoint.
    pub fn optimize(
        &self,
        table_list: &mut TableList,
        mut plan: LogicalOperator,
    ) -> Result<LogicalOperator> {
        for pass in 0..Self::MAX_PASSES {
            let before = plan.clone();

            let mut rule = EmptyElimination;
            plan = rule.optimize(table_list, plan)?;

            let mut rule = ColumnPrune::default();
            plan = rule.optimize(table_list, plan)?;

            if let Some(hook) = &self.apply_hook {
                let mut rule = TableFunctionPushdown::new(hook.as_ref());
                plan = rule.optimize(table_list, plan)?;
            }

            if plan == before {
                debug!(pass, "plan reached fixpoint");
                return Ok(plan);
            }
        }

        Err(DbError::internal(format!(
            "Plan did not converge after {} passes",
            Self::MAX_PASSES
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::logical::binder::bind_table_function::{
        ArgumentValue,
        InvocationArgument,
        TableArgumentInput,
        TableFunctionBinder,
        TableFunctionInvocation,
    };
    use crate::logical::operator::LogicalNode;
    use crate::logical::planner::plan_table_function::TableFunctionPlanner;
    use crate::testutil::{values_input, TestCatalog, TEST_CATALOG, TEST_SCHEMA};

    #[test]
    fn empty_pruned_input_collapses_whole_plan() {
        let catalog = TestCatalog::standard();
        let mut table_list = TableList::empty();
        let (plan1, ref1) = values_input(&mut table_list, &["a"], 2);
        let (plan2, ref2) = values_input(&mut table_list, &["c"], 0);

        let invocation = TableFunctionInvocation {
            catalog: TEST_CATALOG.to_string(),
            schema: TEST_SCHEMA.to_string(),
            name: "two_table_arguments_function".to_string(),
            arguments: vec![
                InvocationArgument::named(
                    "input1",
                    ArgumentValue::Table(TableArgumentInput::new(plan1, ref1)),
                ),
                InvocationArgument::named(
                    "input2",
                    ArgumentValue::Table(TableArgumentInput::new(plan2, ref2)),
                ),
            ],
            copartition: Vec::new(),
        };

        let bound = TableFunctionBinder::new(&catalog.catalog, &mut table_list)
            .bind(invocation)
            .unwrap();
        let plan = TableFunctionPlanner::new(&mut table_list)
            .plan(bound)
            .unwrap();

        let optimized = Optimizer::new().optimize(&mut table_list, plan).unwrap();

        match optimized {
            LogicalOperator::NoRows(_) => (),
            other => panic!("expected no rows, got {}", other.name()),
        }
    }
}
