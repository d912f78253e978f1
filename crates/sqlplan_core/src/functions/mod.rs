pub mod implicit;
pub mod table;
