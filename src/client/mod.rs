pub mod authorized;
pub mod lectures;
