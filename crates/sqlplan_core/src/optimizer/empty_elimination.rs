use sqlplan_error::Result;
use tracing::debug;

use crate::logical::binder::table_list::TableList;
use crate::logical::logical_no_rows::LogicalNoRows;
use crate::logical::operator::{LogicalNode, LogicalOperator, Node};
use crate::optimizer::OptimizeRule;

/// Replaces statically empty subtrees with a zero-row operator.
///
/// An input is statically empty if it's an expression list with no rows, a
/// filter whose predicate can never pass, or anything stacked on top of an
/// empty input. A table function goes empty when any of its prune-when-empty
/// inputs is empty. Kept-when-empty inputs don't propagate emptiness, the
/// function still runs for them.
#[derive(Debug, Default)]
pub struct EmptyElimination;

impl OptimizeRule for EmptyElimination {
    fn optimize(
        &mut self,
        table_list: &mut TableList,
        plan: LogicalOperator,
    ) -> Result<LogicalOperator> {
        plan.walk_modify_post(&mut |op| Self::eliminate(table_list, op))
    }
}

impl EmptyElimination {
    /// Children have already been rewritten, so emptiness below shows up as
    /// a NoRows child.
    fn eliminate(table_list: &TableList, op: LogicalOperator) -> Result<LogicalOperator> {
        let empty = match &op {
            LogicalOperator::ExpressionList(node) => node.node.rows.is_empty(),
            LogicalOperator::Filter(node) => {
                node.node.filter.is_always_false() || is_no_rows(node.get_nth_child(0)?)
            }
            LogicalOperator::Project(node) => is_no_rows(node.get_nth_child(0)?),
            LogicalOperator::RowNumber(node) => is_no_rows(node.get_nth_child(0)?),
            LogicalOperator::TableFunction(node) => node
                .node
                .table_arguments
                .iter()
                .zip(&node.children)
                .any(|(arg, child)| arg.prune_when_empty && is_no_rows(child)),
            LogicalOperator::Scan(_) | LogicalOperator::NoRows(_) => false,
        };

        if !empty {
            return Ok(op);
        }

        let table_refs = op.get_output_table_refs(table_list);
        debug!(node = op.name(), "replacing statically empty subtree");

        Ok(LogicalOperator::NoRows(Node {
            node: LogicalNoRows { table_refs },
            children: Vec::new(),
        }))
    }
}

fn is_no_rows(op: &LogicalOperator) -> bool {
    matches!(op, LogicalOperator::NoRows(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::expr::lit;
    use crate::logical::binder::bind_table_function::{
        ArgumentValue,
        EmptyBehavior,
        InvocationArgument,
        TableArgumentInput,
        TableFunctionBinder,
        TableFunctionInvocation,
    };
    use crate::logical::logical_filter::LogicalFilter;
    use crate::logical::planner::plan_table_function::TableFunctionPlanner;
    use crate::testutil::{values_input, TestCatalog, TEST_CATALOG, TEST_SCHEMA};

    fn two_table_plan(
        table_list: &mut TableList,
        rows1: usize,
        rows2: usize,
        keep: bool,
    ) -> LogicalOperator {
        let catalog = TestCatalog::standard();
        let (plan1, ref1) = values_input(table_list, &["a"], rows1);
        let (plan2, ref2) = values_input(table_list, &["c"], rows2);

        let mut input1 = TableArgumentInput::new(plan1, ref1);
        let mut input2 = TableArgumentInput::new(plan2, ref2);
        if keep {
            input1 = input1.with_empty_behavior(EmptyBehavior::Keep);
            input2 = input2.with_empty_behavior(EmptyBehavior::Keep);
        }

        let invocation = TableFunctionInvocation {
            catalog: TEST_CATALOG.to_string(),
            schema: TEST_SCHEMA.to_string(),
            name: "two_table_arguments_function".to_string(),
            arguments: vec![
                InvocationArgument::named("input1", ArgumentValue::Table(input1)),
                InvocationArgument::named("input2", ArgumentValue::Table(input2)),
            ],
            copartition: Vec::new(),
        };

        let bound = TableFunctionBinder::new(&catalog.catalog, table_list)
            .bind(invocation)
            .unwrap();
        TableFunctionPlanner::new(table_list).plan(bound).unwrap()
    }

    #[test]
    fn pruned_empty_input_empties_function() {
        let mut table_list = TableList::empty();
        let plan = two_table_plan(&mut table_list, 2, 0, false);
        let expected_refs = plan.get_output_table_refs(&table_list);

        let optimized = EmptyElimination
            .optimize(&mut table_list, plan)
            .unwrap();

        match optimized {
            LogicalOperator::NoRows(node) => {
                assert_eq!(expected_refs, node.node.table_refs);
            }
            other => panic!("expected no rows, got {}", other.name()),
        }
    }

    #[test]
    fn kept_empty_input_leaves_function() {
        let mut table_list = TableList::empty();
        let plan = two_table_plan(&mut table_list, 2, 0, true);

        let optimized = EmptyElimination
            .optimize(&mut table_list, plan)
            .unwrap();

        let node = match &optimized {
            LogicalOperator::TableFunction(node) => node,
            other => panic!("expected table function, got {}", other.name()),
        };

        // The empty input itself still collapses, the function does not.
        assert!(matches!(node.children[0], LogicalOperator::ExpressionList(_)));
        assert!(matches!(node.children[1], LogicalOperator::NoRows(_)));
    }

    #[test]
    fn nonempty_inputs_unchanged() {
        let mut table_list = TableList::empty();
        let plan = two_table_plan(&mut table_list, 2, 2, false);
        let expected = plan.clone();

        let optimized = EmptyElimination
            .optimize(&mut table_list, plan)
            .unwrap();

        assert_eq!(expected, optimized);
    }

    #[test]
    fn false_filter_collapses() {
        let mut table_list = TableList::empty();
        let (input, input_ref) = values_input(&mut table_list, &["a"], 3);

        let plan = LogicalOperator::Filter(Node {
            node: LogicalFilter { filter: lit(false) },
            children: vec![input],
        });

        let optimized = EmptyElimination
            .optimize(&mut table_list, plan)
            .unwrap();

        match optimized {
            LogicalOperator::NoRows(node) => {
                assert_eq!(vec![input_ref], node.node.table_refs);
            }
            other => panic!("expected no rows, got {}", other.name()),
        }
    }

    fn pass_through_plan(
        table_list: &mut TableList,
        num_rows: usize,
        empty_behavior: Option<EmptyBehavior>,
    ) -> LogicalOperator {
        let catalog = TestCatalog::standard();
        let (input, input_ref) = values_input(table_list, &["a", "b"], num_rows);

        let mut input = TableArgumentInput::new(input, input_ref);
        if let Some(behavior) = empty_behavior {
            input = input.with_empty_behavior(behavior);
        }

        let invocation = TableFunctionInvocation {
            catalog: TEST_CATALOG.to_string(),
            schema: TEST_SCHEMA.to_string(),
            name: "pass_through_function".to_string(),
            arguments: vec![InvocationArgument::named(
                "input",
                ArgumentValue::Table(input),
            )],
            copartition: Vec::new(),
        };

        let bound = TableFunctionBinder::new(&catalog.catalog, table_list)
            .bind(invocation)
            .unwrap();
        TableFunctionPlanner::new(table_list).plan(bound).unwrap()
    }

    #[test]
    fn prune_override_collapses_single_input() {
        let mut table_list = TableList::empty();
        let plan = pass_through_plan(&mut table_list, 0, Some(EmptyBehavior::Prune));
        let expected_refs = plan.get_output_table_refs(&table_list);

        let optimized = EmptyElimination
            .optimize(&mut table_list, plan)
            .unwrap();

        match optimized {
            LogicalOperator::NoRows(node) => {
                // Proper output and the pass-through input both disappear.
                assert_eq!(expected_refs, node.node.table_refs);
            }
            other => panic!("expected no rows, got {}", other.name()),
        }
    }

    #[test]
    fn kept_by_default_survives_empty_input() {
        let mut table_list = TableList::empty();
        let plan = pass_through_plan(&mut table_list, 0, None);

        let optimized = EmptyElimination
            .optimize(&mut table_list, plan)
            .unwrap();

        let node = match &optimized {
            LogicalOperator::TableFunction(node) => node,
            other => panic!("expected table function, got {}", other.name()),
        };
        assert!(matches!(node.children[0], LogicalOperator::NoRows(_)));
    }

    #[test]
    fn all_inputs_empty_collapses() {
        let mut table_list = TableList::empty();
        let plan = two_table_plan(&mut table_list, 0, 0, false);

        let optimized = EmptyElimination
            .optimize(&mut table_list, plan)
            .unwrap();
        assert!(matches!(optimized, LogicalOperator::NoRows(_)));
    }
}
