//! Form session: one form instance wired to the backend
//!
//! Owns the field store, one autosave controller per save target and the
//! load guard. Timer expiries and save completions run as spawned tokio
//! tasks; all of them go through the single state mutex, which is never
//! held across an `.await`.

use habit_core::{DateKey, FieldError, FieldSet, FieldStore, SaveKind, SaveReason, SaveRequest};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use sync::{FetchOutcome, RemoteSync, SyncError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::debounce::{AutosaveController, SaveDecision, DEFAULT_DEBOUNCE};
use crate::guard::LoadGuard;
use crate::status::{saved_text, saving_text, Status, StatusSlot, Tone};
use crate::timer::Timer;

/// Buffered successful saves per subscriber
const SAVED_CHANNEL_CAPACITY: usize = 64;

/// Result of a save request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Backend accepted the request
    Saved,
    /// Another save is in flight; a follow-up will run after it
    Queued,
    /// Stopped before the network (nothing to save, no backend configured)
    Rejected(String),
    /// Request reached for the backend and failed
    Failed(SyncError),
}

/// Result of loading a date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Saved values replaced the form contents
    Applied(usize),
    /// Nothing saved for the date; the form is now empty
    Empty,
    /// A newer load superseded this one; response discarded
    Stale,
    /// Backend request failed; the form was left as it was
    Failed(SyncError),
}

/// Construction parameters for a [`FormSession`]
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub fields: Arc<FieldSet>,
    /// Initially selected day
    pub date: DateKey,
    /// Quiet period before an autosave
    pub debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            fields: Arc::new(FieldSet::daily()),
            date: DateKey::today(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Handle to one form instance; clones share the same form
///
/// Methods that arm timers spawn tokio tasks and must be called from
/// within a tokio runtime.
#[derive(Clone)]
pub struct FormSession {
    inner: Arc<Inner>,
}

struct Inner {
    sync: Arc<dyn RemoteSync>,
    timer: Arc<dyn Timer>,
    state: Mutex<State>,
    status: watch::Sender<Status>,
    saved: broadcast::Sender<SaveRequest>,
}

struct State {
    date: DateKey,
    store: FieldStore,
    habits: AutosaveController,
    day: AutosaveController,
    loads: LoadGuard,
    /// Unsaved edits of dates the user navigated away from, sent after the
    /// in-flight save of the same kind
    handoffs: VecDeque<SaveRequest>,
}

impl State {
    fn controller(&mut self, kind: SaveKind) -> &mut AutosaveController {
        match kind {
            SaveKind::Habits => &mut self.habits,
            SaveKind::FullDay => &mut self.day,
        }
    }

    /// Cancel armed timers and queued follow-ups of `kind`
    ///
    /// Returns whether any edits were still waiting to be sent.
    fn withdraw(&mut self, kind: SaveKind) -> bool {
        let controller = self.controller(kind);
        let armed = controller.disarm();
        let pending = controller.take_pending();
        armed || pending
    }

    /// Next handed-off request of `kind`, oldest first
    fn next_handoff(&mut self, kind: SaveKind) -> Option<SaveRequest> {
        let index = self.handoffs.iter().position(|r| r.kind == kind)?;
        self.handoffs.remove(index)
    }
}

const SAVE_KINDS: [SaveKind; 2] = [SaveKind::Habits, SaveKind::FullDay];

fn reason_for(kind: SaveKind) -> SaveReason {
    match kind {
        SaveKind::Habits => SaveReason::Autosave,
        SaveKind::FullDay => SaveReason::Submit,
    }
}

enum Begin {
    Send(SaveRequest),
    Queued,
    Rejected(String),
}

enum AfterSend {
    Next(SaveRequest),
    Finished(Option<(u64, Duration)>),
}

impl FormSession {
    /// New session with an empty form
    pub fn new(options: SessionOptions, sync: Arc<dyn RemoteSync>, timer: Arc<dyn Timer>) -> Self {
        let (status, _) = watch::channel(Status::idle());
        let (saved, _) = broadcast::channel(SAVED_CHANNEL_CAPACITY);

        let state = State {
            date: options.date,
            store: FieldStore::new(options.fields),
            habits: AutosaveController::new(options.debounce),
            day: AutosaveController::new(options.debounce),
            loads: LoadGuard::new(),
            handoffs: VecDeque::new(),
        };

        Self {
            inner: Arc::new(Inner {
                sync,
                timer,
                state: Mutex::new(state),
                status,
                saved,
            }),
        }
    }

    /// Currently selected day
    pub fn date(&self) -> DateKey {
        self.inner.state.lock().date
    }

    /// Set fields of the current form
    pub fn values(&self) -> BTreeMap<String, String> {
        self.inner.state.lock().store.values().clone()
    }

    /// Value of one field, empty when unset
    pub fn get(&self, name: &str) -> String {
        self.inner.state.lock().store.get(name).to_string()
    }

    /// Day score from the last applied load
    pub fn score(&self) -> Option<String> {
        self.inner.state.lock().store.score().map(str::to_string)
    }

    /// Field definitions of this form
    pub fn field_set(&self) -> FieldSet {
        self.inner.state.lock().store.field_set().clone()
    }

    /// Habit edits are waiting for the debounce timer
    pub fn has_unsaved_edits(&self) -> bool {
        self.inner.state.lock().habits.is_armed()
    }

    /// Any save is outstanding
    pub fn is_saving(&self) -> bool {
        let state = self.inner.state.lock();
        state.habits.is_in_flight() || state.day.is_in_flight()
    }

    /// Watch the latest status line
    pub fn status(&self) -> watch::Receiver<Status> {
        self.inner.status.subscribe()
    }

    /// Receive every request the backend accepted
    pub fn subscribe_saved(&self) -> broadcast::Receiver<SaveRequest> {
        self.inner.saved.subscribe()
    }

    /// Apply a user edit
    ///
    /// Changing a core habit field (re)arms the autosave timer. Returns
    /// whether the value changed.
    pub fn set_field(&self, name: &str, value: &str) -> Result<bool, FieldError> {
        let armed = {
            let mut state = self.inner.state.lock();
            let changed = state.store.set(name, value)?;
            if !changed {
                return Ok(false);
            }
            if state.store.field_set().is_core(name) {
                let generation = state.habits.field_changed();
                Some((generation, state.habits.quiet_period()))
            } else {
                None
            }
        };

        if let Some((generation, delay)) = armed {
            arm_timer(&self.inner, SaveKind::Habits, generation, delay);
        }
        Ok(true)
    }

    /// Save immediately, bypassing the debounce window
    ///
    /// `Submit` sends the full day; other reasons send the habit subset.
    pub async fn trigger_save(&self, reason: SaveReason) -> SaveOutcome {
        let kind = match reason {
            SaveReason::Submit => SaveKind::FullDay,
            SaveReason::Autosave | SaveReason::Button => SaveKind::Habits,
        };
        run_save(&self.inner, kind, reason).await
    }

    /// Select `date` and load its saved values
    ///
    /// The response is applied only if no newer load started meanwhile.
    /// Applying clears the form first, then fills in the loaded values.
    pub async fn load_for_date(&self, date: DateKey) -> LoadOutcome {
        let ticket = {
            let mut state = self.inner.state.lock();
            state.date = date;
            state.loads.begin(date)
        };
        debug!("Loading {} (seq {})", date, ticket.seq);

        let result = self.inner.sync.fetch(date).await;

        let outcome = {
            let mut state = self.inner.state.lock();
            if !state.loads.is_current(&ticket) {
                debug!(
                    "Discarding stale load for {} (seq {}, latest {})",
                    date,
                    ticket.seq,
                    state.loads.latest()
                );
                return LoadOutcome::Stale;
            }

            match result {
                Ok(FetchOutcome::Found(snapshot)) => {
                    // Edits made before the response are gone; so are their saves.
                    for kind in SAVE_KINDS {
                        state.withdraw(kind);
                    }
                    LoadOutcome::Applied(state.store.apply(&snapshot))
                }
                Ok(FetchOutcome::NotFound) => {
                    for kind in SAVE_KINDS {
                        state.withdraw(kind);
                    }
                    state.store.clear();
                    LoadOutcome::Empty
                }
                Err(err) => LoadOutcome::Failed(err),
            }
        };

        match &outcome {
            LoadOutcome::Applied(count) => {
                info!("Loaded {} saved fields for {}", count, date);
                self.inner.publish(StatusSlot::Load, Tone::Done, format!("Loaded saved values for {}.", date.display_long()));
            }
            LoadOutcome::Empty => {
                self.inner.publish(StatusSlot::Load, Tone::Done, format!("Nothing saved yet for {}.", date.display_long()));
            }
            LoadOutcome::Failed(SyncError::NotConfigured) => {
                self.inner.publish(StatusSlot::Load, Tone::Warning, SyncError::NotConfigured.hint());
            }
            LoadOutcome::Failed(err) => {
                warn!("Failed to load {}: {}", date, err);
                self.inner.publish(StatusSlot::Load, Tone::Error, format!("Load failed: {}", err.hint()));
            }
            LoadOutcome::Stale => {}
        }

        outcome
    }

    /// Navigate to `date`
    ///
    /// Edits still waiting for the debounce timer, or queued behind the
    /// save in flight, are saved for the day being left. The form is
    /// cleared until the new day's load lands.
    pub async fn go_to(&self, date: DateKey) -> LoadOutcome {
        let mut flushes = Vec::new();
        {
            let mut state = self.inner.state.lock();
            let leaving = state.date;
            if leaving != date {
                for kind in SAVE_KINDS {
                    if !state.withdraw(kind) {
                        continue;
                    }
                    let Ok(request) = state.store.build_request(leaving, kind) else {
                        continue;
                    };
                    if state.controller(kind).is_in_flight() {
                        debug!("Handing off {:?} edits for {} to the save in flight", kind, leaving);
                        state.handoffs.push_back(request);
                    } else {
                        state.controller(kind).request_save();
                        flushes.push(request);
                    }
                }
                state.store.clear();
            }
        }

        for request in flushes {
            debug!("Flushing unsaved {:?} edits for {} before navigating", request.kind, request.date);
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let kind = request.kind;
                drive_save(&inner, kind, reason_for(kind), request).await;
            });
        }

        self.load_for_date(date).await
    }

    /// Move the selection by whole days and load it
    pub async fn navigate(&self, days: i64) -> LoadOutcome {
        let target = self.date().shift(days);
        self.go_to(target).await
    }

    /// Load the selected day again
    pub async fn reload(&self) -> LoadOutcome {
        let date = self.date();
        self.load_for_date(date).await
    }
}

impl Inner {
    fn publish(&self, slot: StatusSlot, tone: Tone, text: impl Into<String>) {
        self.status.send_replace(Status::new(slot, tone, text));
    }
}

fn arm_timer(inner: &Arc<Inner>, kind: SaveKind, generation: u64, delay: Duration) {
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        inner.timer.sleep(delay).await;

        let fire = inner.state.lock().controller(kind).timer_fired(generation);
        if fire {
            run_save(&inner, kind, reason_for(kind)).await;
        }
    });
}

fn begin_save(inner: &Inner, kind: SaveKind, reason: SaveReason) -> Begin {
    let mut state = inner.state.lock();

    // An explicit save carries the latest values; the armed timer is moot.
    if reason != SaveReason::Autosave {
        state.controller(kind).disarm();
    }

    if state.controller(kind).request_save() == SaveDecision::Queued {
        return Begin::Queued;
    }

    let date = state.date;
    match state.store.build_request(date, kind) {
        Ok(request) => Begin::Send(request),
        Err(err) => {
            state.controller(kind).abandon();
            Begin::Rejected(err.to_string())
        }
    }
}

async fn run_save(inner: &Arc<Inner>, kind: SaveKind, reason: SaveReason) -> SaveOutcome {
    let slot = StatusSlot::from(kind);
    match begin_save(inner, kind, reason) {
        Begin::Send(request) => drive_save(inner, kind, reason, request).await,
        Begin::Queued => {
            debug!("{:?} save queued behind the one in flight", kind);
            if reason != SaveReason::Autosave {
                inner.publish(slot, Tone::Progress, "Save queued behind the one in flight.");
            }
            SaveOutcome::Queued
        }
        Begin::Rejected(message) => {
            if reason == SaveReason::Autosave {
                debug!("Autosave skipped: {}", message);
            } else {
                inner.publish(slot, Tone::Warning, message.clone());
            }
            SaveOutcome::Rejected(message)
        }
    }
}

/// Send `first`, then any handoffs, then release the in-flight slot
///
/// The caller must hold the in-flight slot of `kind`.
async fn drive_save(
    inner: &Arc<Inner>,
    kind: SaveKind,
    reason: SaveReason,
    first: SaveRequest,
) -> SaveOutcome {
    let slot = StatusSlot::from(kind);
    let mut request = first;
    let mut reason = reason;
    let mut first_outcome = None;

    loop {
        inner.publish(slot, Tone::Progress, saving_text(reason));

        let outcome = match inner.sync.send(&request).await {
            Ok(()) => {
                info!(
                    "Saved {} fields for {} ({:?})",
                    request.payload.len(),
                    request.date,
                    reason
                );
                let _ = inner.saved.send(request.clone());
                inner.publish(slot, Tone::Done, saved_text(reason));
                SaveOutcome::Saved
            }
            Err(SyncError::NotConfigured) => {
                let hint = SyncError::NotConfigured.hint();
                inner.publish(slot, Tone::Warning, hint);
                SaveOutcome::Rejected(hint.to_string())
            }
            Err(err) => {
                warn!("Save for {} failed: {}", request.date, err);
                inner.publish(slot, Tone::Error, format!("Save failed: {}", err.hint()));
                SaveOutcome::Failed(err)
            }
        };
        first_outcome.get_or_insert(outcome);

        let after = {
            let mut state = inner.state.lock();
            match state.next_handoff(kind) {
                Some(next) => AfterSend::Next(next),
                None => {
                    let controller = state.controller(kind);
                    let quiet = controller.quiet_period();
                    AfterSend::Finished(controller.save_completed().map(|generation| (generation, quiet)))
                }
            }
        };

        match after {
            AfterSend::Next(next) => {
                request = next;
                reason = reason_for(kind);
            }
            AfterSend::Finished(rearm) => {
                if let Some((generation, delay)) = rearm {
                    debug!("Re-arming {:?} save requested during the last one", kind);
                    arm_timer(inner, kind, generation, delay);
                }
                break;
            }
        }
    }

    first_outcome.unwrap_or(SaveOutcome::Saved)
}
