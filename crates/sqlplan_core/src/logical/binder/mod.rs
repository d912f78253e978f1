pub mod bind_table_function;
pub mod table_list;
