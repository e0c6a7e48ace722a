//! Debounced autosave controller
//!
//! Coalesces rapid edits into one save and keeps saves for one target
//! strictly serialized:
//! - every edit re-arms the quiet-period timer (older timers go stale)
//! - a save requested while one is in flight only sets `pending`
//! - when the in-flight save completes, a pending save is re-armed
//!
//! This type holds no clock and performs no I/O. The form session spawns
//! the timers and sends the requests, and reports back here.

use std::time::Duration;

/// Quiet period after the last edit before an autosave fires
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(450);

/// Answer to a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    /// Nothing in flight: the caller now owns the in-flight slot
    Start,
    /// Another save is in flight: recorded as pending
    Queued,
}

/// In-flight / pending state for one save target
#[derive(Debug, Clone)]
pub struct AutosaveController {
    quiet_period: Duration,
    /// Bumped on every arm/disarm; only the newest timer may fire
    generation: u64,
    armed: bool,
    in_flight: bool,
    pending: bool,
}

impl AutosaveController {
    /// Controller with the given quiet period
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            generation: 0,
            armed: false,
            in_flight: false,
            pending: false,
        }
    }

    /// Delay the driver must wait before reporting a timer expiry
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// A field changed: cancel any armed timer and arm a fresh one
    ///
    /// Returns the generation the new timer must report back with.
    pub fn field_changed(&mut self) -> u64 {
        self.generation += 1;
        self.armed = true;
        self.generation
    }

    /// A timer expired
    ///
    /// Returns true only for the newest armed timer, meaning a save should be
    /// requested now. Superseded timers are ignored.
    pub fn timer_fired(&mut self, generation: u64) -> bool {
        if !self.armed || generation != self.generation {
            return false;
        }
        self.armed = false;
        true
    }

    /// Cancel the armed timer, if any
    ///
    /// Returns whether a timer was armed, i.e. whether there were edits that
    /// had not been handed to a save yet.
    pub fn disarm(&mut self) -> bool {
        let was_armed = self.armed;
        self.armed = false;
        self.generation += 1;
        was_armed
    }

    /// Ask to save now
    pub fn request_save(&mut self) -> SaveDecision {
        if self.in_flight {
            self.pending = true;
            SaveDecision::Queued
        } else {
            self.in_flight = true;
            SaveDecision::Start
        }
    }

    /// A started save never reached the network (validation or config)
    ///
    /// Releases the in-flight slot without touching `pending`.
    pub fn abandon(&mut self) {
        self.in_flight = false;
    }

    /// Withdraw a queued follow-up save
    ///
    /// Returns whether one was pending. The in-flight save keeps its slot;
    /// its completion then re-arms nothing.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// The in-flight save finished, successfully or not
    ///
    /// When a save was requested meanwhile, the pending flag is cleared and a
    /// new timer is armed; its generation is returned.
    pub fn save_completed(&mut self) -> Option<u64> {
        self.in_flight = false;
        if self.pending {
            self.pending = false;
            Some(self.field_changed())
        } else {
            None
        }
    }

    /// A debounce timer is waiting to fire
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// A save is outstanding
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// A save was requested during the outstanding one
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

impl Default for AutosaveController {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
