//! CLI command modules.

pub mod audit;
pub mod catalog;
pub mod config;
pub mod context;
pub mod machine;
pub mod output;
pub mod scan;
pub mod start_day;
pub mod submit;
