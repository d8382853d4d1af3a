pub mod args;
pub mod env;
