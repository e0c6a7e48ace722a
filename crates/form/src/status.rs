//! Status lines surfaced by the form session

use habit_core::{SaveKind, SaveReason};

/// Which part of the form a status line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSlot {
    /// Habit-subset saves
    Habits,
    /// Full-day submits
    Day,
    /// Date loads
    Load,
}

impl From<SaveKind> for StatusSlot {
    fn from(kind: SaveKind) -> Self {
        match kind {
            SaveKind::Habits => StatusSlot::Habits,
            SaveKind::FullDay => StatusSlot::Day,
        }
    }
}

/// Severity of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Progress,
    Done,
    Warning,
    Error,
}

/// Latest status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub slot: StatusSlot,
    pub tone: Tone,
    pub text: String,
}

impl Status {
    pub fn new(slot: StatusSlot, tone: Tone, text: impl Into<String>) -> Self {
        Self {
            slot,
            tone,
            text: text.into(),
        }
    }

    /// Blank status shown before anything happened
    pub fn idle() -> Self {
        Self::new(StatusSlot::Habits, Tone::Done, "")
    }
}

pub(crate) fn saving_text(reason: SaveReason) -> &'static str {
    match reason {
        SaveReason::Autosave => "Auto-saving habits...",
        SaveReason::Button => "Saving habits...",
        SaveReason::Submit => "Saving...",
    }
}

pub(crate) fn saved_text(reason: SaveReason) -> &'static str {
    match reason {
        SaveReason::Autosave => "Habits auto-saved.",
        SaveReason::Button => "Habits saved.",
        SaveReason::Submit => "Sent. Confirm in the sheet.",
    }
}
