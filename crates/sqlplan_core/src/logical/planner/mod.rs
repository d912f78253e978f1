pub mod plan_table_function;
