//! Append-only submission ledger using sled
//!
//! Every save the backend accepted is recorded as a [`DayRow`]. Entries are
//! keyed by a big-endian sequence number, so sled's key order is append
//! order.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use habit_core::{DateKey, DayRow, SaveKind, SaveRequest};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use ulid::Ulid;

/// One recorded submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique ID (ULID: timestamp + randomness)
    pub id: Ulid,
    /// Habit subset or full day
    pub kind: SaveKind,
    /// Row as the backend appended it
    pub row: DayRow,
}

impl LedgerEntry {
    /// Build an entry for an accepted request
    pub fn from_request(request: &SaveRequest, at: DateTime<Utc>) -> Self {
        Self {
            id: Ulid::new(),
            kind: request.kind,
            row: DayRow::from_payload(request.date, &request.payload, at),
        }
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).context("Failed to encode ledger entry")
    }

    fn deserialize(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).context("Failed to decode ledger entry")
    }
}

/// Append-only ledger of submissions
pub struct Ledger {
    /// Sled database
    db: Db,
    /// In-memory index: entry id -> sequence number
    index: RwLock<BTreeMap<Ulid, u64>>,
    /// Monotonic sequence counter
    seq_counter: AtomicU64,
}

impl Ledger {
    /// Open or create a ledger in the given directory
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join("ledger.db");
        let db = sled::open(&path)
            .with_context(|| format!("Failed to open ledger at {}", path.display()))?;

        // Build in-memory index on startup
        let mut index = BTreeMap::new();
        let mut max_seq = 0u64;

        for item in db.iter() {
            let (key, value) = item?;
            let seq = decode_seq(&key)?;
            let entry = LedgerEntry::deserialize(&value)?;
            index.insert(entry.id, seq);
            max_seq = max_seq.max(seq);
        }

        debug!("Opened ledger with {} entries", index.len());

        Ok(Self {
            db,
            index: RwLock::new(index),
            seq_counter: AtomicU64::new(max_seq + 1),
        })
    }

    /// Append an entry, returning its sequence number
    pub fn append(&self, entry: &LedgerEntry) -> Result<u64> {
        let seq = self.seq_counter.fetch_add(1, Ordering::SeqCst);
        let value = entry.serialize()?;

        self.db.insert(seq.to_be_bytes(), value)?;
        self.index.write().insert(entry.id, seq);

        // Flush to ensure durability
        self.db.flush()?;

        Ok(seq)
    }

    /// Record an accepted request as of now
    pub fn record(&self, request: &SaveRequest) -> Result<LedgerEntry> {
        let entry = LedgerEntry::from_request(request, Utc::now());
        self.append(&entry)?;
        Ok(entry)
    }

    /// Get an entry by ID
    pub fn get(&self, id: &Ulid) -> Result<Option<LedgerEntry>> {
        let seq = match self.index.read().get(id) {
            Some(&seq) => seq,
            None => return Ok(None),
        };
        self.read_seq(seq)
    }

    /// Most recent entry
    pub fn latest(&self) -> Result<Option<LedgerEntry>> {
        match self.db.last()? {
            Some((_, value)) => Ok(Some(LedgerEntry::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    /// Last `count` entries, oldest first
    pub fn last_n(&self, count: usize) -> Result<Vec<LedgerEntry>> {
        let mut entries = self
            .db
            .iter()
            .rev()
            .take(count)
            .map(|item| {
                let (_, value) = item?;
                LedgerEntry::deserialize(&value)
            })
            .collect::<Result<Vec<_>>>()?;
        entries.reverse();
        Ok(entries)
    }

    /// Every entry recorded for one day, oldest first
    pub fn for_date(&self, date: DateKey) -> Result<Vec<LedgerEntry>> {
        let mut entries = Vec::new();
        for item in self.db.iter() {
            let (_, value) = item?;
            let entry = LedgerEntry::deserialize(&value)?;
            if entry.row.date == date {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Total number of entries
    pub fn count(&self) -> usize {
        self.index.read().len()
    }

    fn read_seq(&self, seq: u64) -> Result<Option<LedgerEntry>> {
        match self.db.get(seq.to_be_bytes())? {
            Some(value) => Ok(Some(LedgerEntry::deserialize(&value)?)),
            None => Ok(None),
        }
    }
}

fn decode_seq(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key.try_into().context("Corrupt ledger key")?;
    Ok(u64::from_be_bytes(bytes))
}
