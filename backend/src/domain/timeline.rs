//! Schedule projection onto daily and weekly timelines.
//!
//! [`project`] is a pure function: given a medication list, a view mode, and
//! a reference instant it derives the distinct dose times in use and which
//! medications fall into each (time, day) slot. Callers supply "now" from a
//! clock; nothing here reads the wall clock, so a fixed reference yields a
//! fixed projection.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use super::medication::Medication;
use super::schedule::{TimeOfDay, week_dates, weekday_number};

/// Which span of the calendar a projection covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// A single day: the reference date.
    Daily,
    /// The full Monday-start week containing the reference date.
    Weekly,
}

/// Error returned when parsing an unknown view mode string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseViewModeError {
    /// The unrecognised input value.
    pub input: String,
}

impl fmt::Display for ParseViewModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown view mode: {}", self.input)
    }
}

impl std::error::Error for ParseViewModeError {}

impl std::str::FromStr for ViewMode {
    type Err = ParseViewModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            _ => Err(ParseViewModeError {
                input: s.to_owned(),
            }),
        }
    }
}

impl ViewMode {
    /// The query-string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a daily slot lies before or after the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// The slot's time on the reference date is earlier than the reference.
    Past,
    /// The slot is still to come (or is exactly now).
    Upcoming,
}

/// One time slot in a daily projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySlot {
    /// The dose time shared by every medication in the slot.
    pub time: TimeOfDay,
    /// Past or upcoming relative to the reference instant.
    pub status: SlotStatus,
    /// Medications due at this time, in input order.
    pub medications: Vec<Medication>,
}

/// One row of a weekly projection: a time across the seven week days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyRow {
    /// The dose time this row covers.
    pub time: TimeOfDay,
    /// Medications due per weekday, Monday first.
    pub cells: [Vec<Medication>; 7],
}

/// Result of projecting a medication list onto the calendar.
///
/// An empty `slots`/`rows` vector is the explicit "nothing scheduled"
/// outcome; callers distinguish it from failures, which surface as errors
/// long before a `Timeline` exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timeline {
    /// Deduplicated, time-sorted slots for one day.
    Daily {
        /// The projected calendar date.
        date: NaiveDate,
        /// Monday-start weekday number of `date`, 1 to 7.
        weekday: u8,
        /// Time slots in ascending time order.
        slots: Vec<DailySlot>,
    },
    /// A 7 x N grid covering the reference week.
    Weekly {
        /// Calendar dates of the week, Monday first.
        days: [NaiveDate; 7],
        /// Rows in ascending time order.
        rows: Vec<WeeklyRow>,
    },
}

impl Timeline {
    /// Whether the projection contains no slots at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Daily { slots, .. } => slots.is_empty(),
            Self::Weekly { rows, .. } => rows.is_empty(),
        }
    }
}

/// Project `medications` onto a daily or weekly timeline.
///
/// # Examples
/// ```
/// use backend::domain::{project, Timeline, ViewMode};
/// use chrono::NaiveDate;
///
/// let reference = NaiveDate::from_ymd_opt(2026, 8, 5)
///     .unwrap()
///     .and_hms_opt(12, 0, 0)
///     .unwrap();
/// let timeline = project(&[], ViewMode::Daily, reference);
/// assert!(timeline.is_empty());
/// ```
pub fn project(medications: &[Medication], view: ViewMode, reference: NaiveDateTime) -> Timeline {
    match view {
        ViewMode::Daily => project_daily(medications, reference),
        ViewMode::Weekly => project_weekly(medications, reference.date()),
    }
}

fn project_daily(medications: &[Medication], reference: NaiveDateTime) -> Timeline {
    let date = reference.date();
    let weekday = weekday_number(date);

    // BTreeSet gives the sorted, deduplicated slot times in one pass.
    let times: BTreeSet<TimeOfDay> = medications
        .iter()
        .flat_map(|med| med.schedule.iter())
        .filter(|entry| entry.days.contains(weekday))
        .map(|entry| entry.time)
        .collect();

    let slots = times
        .into_iter()
        .map(|time| DailySlot {
            time,
            status: if time.on(date) < reference {
                SlotStatus::Past
            } else {
                SlotStatus::Upcoming
            },
            medications: medications_for(medications, time, weekday),
        })
        .collect();

    Timeline::Daily {
        date,
        weekday,
        slots,
    }
}

fn project_weekly(medications: &[Medication], reference: NaiveDate) -> Timeline {
    let times: BTreeSet<TimeOfDay> = medications
        .iter()
        .flat_map(|med| med.schedule.iter())
        .map(|entry| entry.time)
        .collect();

    let rows = times
        .into_iter()
        .map(|time| WeeklyRow {
            time,
            cells: std::array::from_fn(|index| {
                // Cell index 0 is Monday, matching weekday number 1.
                medications_for(medications, time, (index + 1) as u8)
            }),
        })
        .collect();

    Timeline::Weekly {
        days: week_dates(reference),
        rows,
    }
}

fn medications_for(medications: &[Medication], time: TimeOfDay, day: u8) -> Vec<Medication> {
    medications
        .iter()
        .filter(|med| {
            med.schedule
                .iter()
                .any(|entry| entry.time == time && entry.days.contains(day))
        })
        .cloned()
        .collect()
}
