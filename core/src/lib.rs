pub mod artifacts;
pub mod core;
pub mod error;
pub mod structs;

pub(crate) mod filesystem;
pub(crate) mod output;
pub(crate) mod utils;
