//! CLI command implementations

pub mod config;
pub mod history;
pub mod insights;
pub mod load;
pub mod remind;
pub mod submit;
pub mod subscriptions;
pub mod track;
