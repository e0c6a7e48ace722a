//! Date-scoped load guard
//!
//! Each load takes a ticket carrying the next sequence number. When the
//! response arrives it is only applied if its ticket is still the newest
//! one; anything older belongs to a date the user already left.

use habit_core::DateKey;

/// Issued when a load starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    /// Sequence number of this load
    pub seq: u64,
    /// Date being loaded
    pub date: DateKey,
}

/// Monotonic load counter
#[derive(Debug, Default)]
pub struct LoadGuard {
    latest: u64,
}

impl LoadGuard {
    /// Fresh guard, no loads issued
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load, superseding every earlier ticket
    pub fn begin(&mut self, date: DateKey) -> LoadTicket {
        self.latest += 1;
        LoadTicket {
            seq: self.latest,
            date,
        }
    }

    /// Whether `ticket` is still the newest load
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.seq == self.latest
    }

    /// Sequence number of the newest load (0 before any)
    pub fn latest(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let mut guard = LoadGuard::new();
        let a = guard.begin(DateKey::from_ymd(2026, 10, 18).unwrap());
        let b = guard.begin(DateKey::from_ymd(2026, 10, 19).unwrap());

        assert!(b.seq > a.seq);
        assert!(!guard.is_current(&a));
        assert!(guard.is_current(&b));
        assert_eq!(guard.latest(), b.seq);
    }

    #[test]
    fn test_same_date_reload_still_supersedes() {
        let mut guard = LoadGuard::new();
        let date = DateKey::from_ymd(2026, 10, 19).unwrap();
        let first = guard.begin(date);
        let second = guard.begin(date);
        assert!(!guard.is_current(&first));
        assert!(guard.is_current(&second));
    }
}
