//! In-memory values of the day currently shown in the form

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::date::DateKey;
use crate::error::FieldError;
use crate::field::{FieldKind, FieldSet};
use crate::request::{DaySnapshot, SaveKind, SaveRequest};

/// Current form values, keyed by field name
///
/// Only names from the field set are ever stored, and stored values are
/// always normalized (binary fields hold "0" or "1"). An unset field has no
/// entry at all.
#[derive(Debug, Clone)]
pub struct FieldStore {
    fields: Arc<FieldSet>,
    values: BTreeMap<String, String>,
    score: Option<String>,
}

impl FieldStore {
    /// Empty store over the given field set
    pub fn new(fields: Arc<FieldSet>) -> Self {
        Self {
            fields,
            values: BTreeMap::new(),
            score: None,
        }
    }

    /// Field definitions backing this store
    pub fn field_set(&self) -> &FieldSet {
        &self.fields
    }

    /// Set a field from user input
    ///
    /// Returns whether the stored value changed. Setting the empty string
    /// unsets the field.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<bool, FieldError> {
        let spec = self
            .fields
            .get(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;
        let value = spec.normalize(raw)?;

        let previous = if value.is_empty() {
            self.values.remove(name)
        } else {
            self.values.insert(name.to_string(), value.clone())
        };

        Ok(previous.unwrap_or_default() != value)
    }

    /// Current value of a field, empty when unset
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Derived day score from the last applied snapshot
    pub fn score(&self) -> Option<&str> {
        self.score.as_deref()
    }

    /// Set fields in name order
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Unset every field and forget the score
    pub fn clear(&mut self) {
        self.values.clear();
        self.score = None;
    }

    /// Replace the store contents with a loaded snapshot
    ///
    /// The store is cleared first, so fields absent from the snapshot end up
    /// unset. Unknown names and values that fail validation are skipped.
    /// Returns the number of fields applied.
    pub fn apply(&mut self, snapshot: &DaySnapshot) -> usize {
        self.clear();

        let mut applied = 0;
        for spec in self.fields.iter() {
            let Some(raw) = snapshot.values.get(&spec.name) else {
                continue;
            };
            // Loaded binary values must already be exact; no coercion.
            if spec.kind == FieldKind::Binary && !matches!(raw.trim(), "0" | "1") {
                continue;
            }
            if let Ok(value) = spec.normalize(raw) {
                if !value.is_empty() {
                    self.values.insert(spec.name.clone(), value);
                    applied += 1;
                }
            }
        }

        self.score = snapshot
            .score
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        applied
    }

    /// Non-empty values belonging to a save kind
    pub fn payload(&self, kind: SaveKind) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter(|(name, _)| match kind {
                SaveKind::Habits => self.fields.is_core(name),
                SaveKind::FullDay => true,
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Build a save request, rejecting an empty payload
    pub fn build_request(&self, date: DateKey, kind: SaveKind) -> Result<SaveRequest, FieldError> {
        let payload = self.payload(kind);
        if payload.is_empty() {
            return Err(FieldError::NothingToSave(kind.empty_message()));
        }
        Ok(SaveRequest {
            date,
            kind,
            payload,
        })
    }
}
