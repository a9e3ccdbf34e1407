//! Medication aggregate and related value types.
//!
//! A medication pairs display fields (name, dosage, colour tag, free-text
//! notes) with a schedule: a list of (time of day, weekday set) entries.
//! Identifiers are assigned by the store at creation and never change;
//! updates replace every other field wholesale, last writer wins.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::schedule::{TimeOfDay, WeekdaySet};

/// Validation errors for medication fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MedicationValidationError {
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// Dosage was missing or blank once trimmed.
    EmptyDosage,
    /// Colour tag does not match the `#rrggbb` shape.
    InvalidColor,
    /// Identifier is not a valid UUID.
    InvalidId,
}

impl fmt::Display for MedicationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "medication name must not be empty"),
            Self::EmptyDosage => write!(f, "dosage must not be empty"),
            Self::InvalidColor => write!(f, "colour must use the #rrggbb form"),
            Self::InvalidId => write!(f, "medication id must be a valid UUID"),
        }
    }
}

impl std::error::Error for MedicationValidationError {}

/// Opaque medication identifier, assigned at creation and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MedicationId(Uuid);

impl MedicationId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MedicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MedicationId {
    type Err = MedicationValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| MedicationValidationError::InvalidId)
    }
}

impl From<MedicationId> for String {
    fn from(value: MedicationId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for MedicationId {
    type Error = MedicationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Display colours offered for new medications.
pub const COLOR_PALETTE: [&str; 8] = [
    "#3b82f6", // blue
    "#10b981", // green
    "#f59e0b", // amber
    "#ef4444", // red
    "#8b5cf6", // violet
    "#ec4899", // pink
    "#06b6d4", // cyan
    "#f97316", // orange
];

/// Display colour tag in the `#rrggbb` form.
///
/// # Examples
/// ```
/// use backend::domain::Color;
///
/// let blue = Color::new("#3b82f6").unwrap();
/// assert_eq!(blue.as_ref(), "#3b82f6");
/// assert!(Color::new("blue").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Validate and construct a colour tag.
    pub fn new(color: impl Into<String>) -> Result<Self, MedicationValidationError> {
        let raw = color.into().to_ascii_lowercase();
        let hex_digits = raw
            .strip_prefix('#')
            .ok_or(MedicationValidationError::InvalidColor)?;
        if hex_digits.len() != 6 || !hex_digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MedicationValidationError::InvalidColor);
        }
        Ok(Self(raw))
    }

    /// Pick a random palette colour for a draft that did not name one.
    pub fn random(rng: &mut impl Rng) -> Self {
        let index = rng.gen_range(0..COLOR_PALETTE.len());
        Self(COLOR_PALETTE[index].to_owned())
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.0
    }
}

impl TryFrom<String> for Color {
    type Error = MedicationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One (time of day, weekday set) pair within a medication's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct ScheduleEntry {
    /// Wall-clock dose time.
    #[schema(value_type = String, example = "08:00")]
    pub time: TimeOfDay,
    /// Weekdays the dose applies to.
    #[schema(value_type = Vec<u8>, example = json!([1, 3, 5]))]
    pub days: WeekdaySet,
}

impl ScheduleEntry {
    /// Pair a time with a weekday set.
    pub fn new(time: TimeOfDay, days: WeekdaySet) -> Self {
        Self { time, days }
    }
}

/// Everything a medication carries except its identifier.
///
/// Drafts are what the form boundary produces: the HTTP adapter validates
/// raw payloads into drafts, and stores combine a draft with an assigned or
/// existing identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct MedicationDraft {
    /// Display name, non-empty.
    pub name: String,
    /// Dosage text, non-empty.
    pub dosage: String,
    /// Schedule entries in insertion order; the order carries no meaning.
    pub schedule: Vec<ScheduleEntry>,
    /// Display colour tag.
    pub color: Color,
    /// Optional free-text notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MedicationDraft {
    /// Validate display fields and assemble a draft.
    ///
    /// Schedule entries arrive already validated: `TimeOfDay` and
    /// `WeekdaySet` cannot be constructed out of range or empty.
    pub fn try_new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        schedule: Vec<ScheduleEntry>,
        color: Color,
        notes: Option<String>,
    ) -> Result<Self, MedicationValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MedicationValidationError::EmptyName);
        }
        let dosage = dosage.into();
        if dosage.trim().is_empty() {
            return Err(MedicationValidationError::EmptyDosage);
        }
        Ok(Self {
            name,
            dosage,
            schedule,
            color,
            notes: notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// A registered medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Medication {
    /// Store-assigned identifier, immutable for the record's lifetime.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: MedicationId,
    /// Display name.
    pub name: String,
    /// Dosage text, for example "10mg".
    pub dosage: String,
    /// Schedule entries in insertion order.
    pub schedule: Vec<ScheduleEntry>,
    /// Display colour tag.
    #[schema(value_type = String, example = "#3b82f6")]
    pub color: Color,
    /// Optional free-text notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Medication {
    /// Combine an identifier with a draft's fields.
    pub fn from_draft(id: MedicationId, draft: MedicationDraft) -> Self {
        let MedicationDraft {
            name,
            dosage,
            schedule,
            color,
            notes,
        } = draft;
        Self {
            id,
            name,
            dosage,
            schedule,
            color,
            notes,
        }
    }
}

/// Starter medications seeded into a fresh guest account.
pub fn sample_medications() -> Result<Vec<MedicationDraft>, serde_json::Error> {
    serde_json::from_value(json!([
        {
            "name": "Lisinopril",
            "dosage": "10mg",
            "schedule": [{ "time": "08:00", "days": [1, 2, 3, 4, 5, 6, 7] }],
            "color": "#3b82f6",
            "notes": "Take with food in the morning"
        },
        {
            "name": "Vitamin D",
            "dosage": "2000 IU",
            "schedule": [{ "time": "09:00", "days": [1, 3, 5] }],
            "color": "#f59e0b",
            "notes": "Take with breakfast"
        },
        {
            "name": "Ibuprofen",
            "dosage": "400mg",
            "schedule": [
                { "time": "13:00", "days": [2, 4, 6] },
                { "time": "21:00", "days": [2, 4, 6] }
            ],
            "color": "#ef4444",
            "notes": "Take with food to avoid stomach irritation"
        }
    ]))
}
