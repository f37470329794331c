//! Command implementations

pub mod run;
pub mod validate;
