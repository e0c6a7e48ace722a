//! Field schema for the daily habit form
//!
//! One configurable [`FieldSet`] describes every field the form knows about.
//! Earlier form variants each carried their own field list; they all reduce
//! to a choice of field set here.

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// How a field's value is constrained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Done / not done ("1" / "0")
    Binary,
    /// Any finite number
    Number,
    /// Free text
    Text,
}

/// Definition of one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Wire name, unique within a set
    pub name: String,
    /// Human label
    pub label: String,
    /// Value constraint
    pub kind: FieldKind,
    /// Part of the habit subset that is autosaved
    #[serde(default)]
    pub core: bool,
}

impl FieldSpec {
    fn binary(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Binary,
            core: true,
        }
    }

    fn other(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            core: false,
        }
    }

    /// Normalize and validate a raw value for this field
    ///
    /// Values are trimmed; the empty string always means "unset".
    pub fn normalize(&self, raw: &str) -> Result<String, FieldError> {
        let value = raw.trim();
        if value.is_empty() {
            return Ok(String::new());
        }

        match self.kind {
            FieldKind::Binary => match value {
                "0" | "1" => Ok(value.to_string()),
                _ => Err(FieldError::NotBinary {
                    field: self.name.clone(),
                    value: value.to_string(),
                }),
            },
            FieldKind::Number => match value.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(value.to_string()),
                _ => Err(FieldError::NotNumeric {
                    field: self.name.clone(),
                    value: value.to_string(),
                }),
            },
            FieldKind::Text => Ok(value.to_string()),
        }
    }
}

/// Ordered collection of field definitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    fields: Vec<FieldSpec>,
}

impl FieldSet {
    /// Build from explicit specs, rejecting duplicate names
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, FieldError> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(FieldError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// Current daily form: ten binary habits plus the evening review fields
    pub fn daily() -> Self {
        let fields = vec![
            FieldSpec::binary("wakeUpAt8", "Wake up at 8"),
            FieldSpec::binary("sleep75Hours", "Sleep 7.5 hours"),
            FieldSpec::binary("meditate", "Meditate"),
            FieldSpec::binary("workout", "Workout"),
            FieldSpec::binary("workOnStudio", "Work on studio"),
            FieldSpec::binary("consumeDrugs", "Consume drugs"),
            FieldSpec::binary("socialLimits", "Social limits"),
            FieldSpec::binary("stretch", "Stretch"),
            FieldSpec::binary("hairCare", "Hair care"),
            FieldSpec::binary("gratitudePrayer", "Gratitude prayer"),
            FieldSpec::other("wellbeing", "Well-being (0-10)", FieldKind::Number),
            FieldSpec::other("notes", "Notes", FieldKind::Text),
            FieldSpec::other("activities", "Activities", FieldKind::Text),
            FieldSpec::other("stomachFeel", "Stomach feel", FieldKind::Text),
            FieldSpec::other("weight", "Weight", FieldKind::Number),
        ];
        Self { fields }
    }

    /// Look up a field by wire name
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    /// Only the autosaved habit fields
    pub fn core_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.core)
    }

    /// Is `name` one of the autosaved habit fields
    pub fn is_core(&self, name: &str) -> bool {
        self.get(name).map(|f| f.core).unwrap_or(false)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields are defined
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::daily()
    }
}

/// Parse a `name=value` assignment as typed on the command line
pub fn parse_assignment(raw: &str) -> Result<(String, String), FieldError> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| FieldError::InvalidAssignment(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(FieldError::InvalidAssignment(raw.to_string()));
    }
    Ok((name.to_string(), value.to_string()))
}
