//! Form - the daily habit form and its save/load orchestration
//!
//! This crate provides:
//! - Debounced autosave with at most one save in flight per target
//! - A load guard that drops responses for dates the user already left
//! - [`FormSession`], which wires both to a [`sync::RemoteSync`] backend
//! - Status lines for whatever front end renders the form

pub mod debounce;
pub mod guard;
pub mod session;
pub mod status;
pub mod timer;

// Re-export main types for convenience
pub use debounce::{AutosaveController, SaveDecision, DEFAULT_DEBOUNCE};
pub use guard::{LoadGuard, LoadTicket};
pub use session::{FormSession, LoadOutcome, SaveOutcome, SessionOptions};
pub use status::{Status, StatusSlot, Tone};
pub use timer::{Timer, TokioTimer};
