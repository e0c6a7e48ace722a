//! Habit Core - domain types for the daily habit form
//!
//! This crate provides:
//! - Calendar date keys and their backend wire form
//! - The configurable field schema (binary habits, numbers, text)
//! - The in-memory field store for the day being edited
//! - Save requests, day snapshots and the fixed-column day row
//! - Day score formatting

pub mod date;
pub mod error;
pub mod field;
pub mod request;
pub mod row;
pub mod score;
pub mod store;

// Re-export main types for convenience
pub use date::DateKey;
pub use error::FieldError;
pub use field::{parse_assignment, FieldKind, FieldSet, FieldSpec};
pub use request::{DaySnapshot, SaveKind, SaveReason, SaveRequest, DATE_PARAM};
pub use row::{DayRow, HABIT_COLUMNS};
pub use store::FieldStore;
