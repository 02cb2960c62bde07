pub(crate) mod descriptor;
pub mod error;
pub(crate) mod groups;
pub mod hive;
pub mod parser;
pub(crate) mod users;
