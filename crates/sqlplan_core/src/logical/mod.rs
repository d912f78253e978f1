pub mod binder;
pub mod logical_expression_list;
pub mod logical_filter;
pub mod logical_no_rows;
pub mod logical_project;
pub mod logical_row_number;
pub mod logical_scan;
pub mod logical_table_function;
pub mod operator;
pub mod planner;
