pub mod auth_cmd;
pub mod categories;
pub mod common;
pub mod completions;
pub mod config;
pub mod notes;
pub mod tasks;
