//! Wall-clock schedule primitives.
//!
//! Doses are anchored to a time of day and a set of weekdays rather than to
//! absolute instants. Weekdays are numbered 1 to 7 starting on Monday, and
//! weeks always begin on Monday. Times carry no seconds and no timezone; the
//! caller composes them with a date when an instant is needed.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Validation errors for schedule primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleValidationError {
    /// Time string does not match the `HH:MM` shape.
    InvalidTime,
    /// Hour outside 0 to 23 or minute outside 0 to 59.
    TimeOutOfRange,
    /// A schedule entry must name at least one weekday.
    EmptyDays,
    /// Weekday outside 1 (Monday) to 7 (Sunday).
    DayOutOfRange { day: u8 },
}

impl fmt::Display for ScheduleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTime => write!(f, "time must use the 24-hour HH:MM form"),
            Self::TimeOutOfRange => write!(f, "time must be between 00:00 and 23:59"),
            Self::EmptyDays => write!(f, "at least one weekday is required"),
            Self::DayOutOfRange { day } => {
                write!(f, "weekday {day} is outside 1 (Monday) to 7 (Sunday)")
            }
        }
    }
}

impl std::error::Error for ScheduleValidationError {}

/// A wall-clock time of day in the 24-hour `HH:MM` form.
///
/// The canonical display form is zero padded, so lexicographic order on the
/// rendered string matches chronological order.
///
/// # Examples
/// ```
/// use backend::domain::TimeOfDay;
///
/// let time: TimeOfDay = "08:00".parse().unwrap();
/// assert_eq!(time.to_string(), "08:00");
/// assert_eq!(time.format_12h(), "8:00 AM");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Construct a time of day, rejecting out-of-range components.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ScheduleValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleValidationError::TimeOutOfRange);
        }
        Ok(Self { hour, minute })
    }

    /// Hour component, 0 to 23.
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute component, 0 to 59.
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Compose the time with a calendar date to form a local instant.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        let time = NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN);
        date.and_time(time)
    }

    /// Render the 12-hour display form used in notification payloads.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::TimeOfDay;
    ///
    /// let evening: TimeOfDay = "21:05".parse().unwrap();
    /// assert_eq!(evening.format_12h(), "9:05 PM");
    /// let midnight: TimeOfDay = "00:30".parse().unwrap();
    /// assert_eq!(midnight.format_12h(), "12:30 AM");
    /// ```
    pub fn format_12h(&self) -> String {
        let meridiem = if self.hour >= 12 { "PM" } else { "AM" };
        let hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{hour}:{:02} {meridiem}", self.minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = ScheduleValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hours, minutes) = s
            .split_once(':')
            .ok_or(ScheduleValidationError::InvalidTime)?;
        if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
            return Err(ScheduleValidationError::InvalidTime);
        }
        let hour: u8 = hours
            .parse()
            .map_err(|_| ScheduleValidationError::InvalidTime)?;
        let minute: u8 = minutes
            .parse()
            .map_err(|_| ScheduleValidationError::InvalidTime)?;
        Self::new(hour, minute)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ScheduleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Non-empty set of weekday numbers, 1 (Monday) to 7 (Sunday).
///
/// Duplicates collapse and iteration order is ascending, which keeps the
/// serialised form sorted.
///
/// # Examples
/// ```
/// use backend::domain::WeekdaySet;
///
/// let days = WeekdaySet::try_from_days([5, 1, 3, 1]).unwrap();
/// assert_eq!(days.iter().collect::<Vec<_>>(), vec![1, 3, 5]);
/// assert!(days.contains(3));
/// assert!(!days.contains(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct WeekdaySet(BTreeSet<u8>);

impl WeekdaySet {
    /// Build a set from weekday numbers, rejecting empty and out-of-range
    /// input.
    pub fn try_from_days(
        days: impl IntoIterator<Item = u8>,
    ) -> Result<Self, ScheduleValidationError> {
        let mut set = BTreeSet::new();
        for day in days {
            if !(1..=7).contains(&day) {
                return Err(ScheduleValidationError::DayOutOfRange { day });
            }
            set.insert(day);
        }
        if set.is_empty() {
            return Err(ScheduleValidationError::EmptyDays);
        }
        Ok(Self(set))
    }

    /// The set covering every day of the week.
    pub fn full_week() -> Self {
        Self((1..=7).collect())
    }

    /// Whether the set contains the given weekday number.
    pub fn contains(&self, day: u8) -> bool {
        self.0.contains(&day)
    }

    /// Ascending iterator over the contained weekday numbers.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    /// Number of distinct weekdays in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; emptiness is rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<WeekdaySet> for Vec<u8> {
    fn from(value: WeekdaySet) -> Self {
        value.0.into_iter().collect()
    }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
    type Error = ScheduleValidationError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from_days(value)
    }
}

/// Monday-start weekday number of a date, 1 to 7.
///
/// # Examples
/// ```
/// use backend::domain::weekday_number;
/// use chrono::NaiveDate;
///
/// let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
/// assert_eq!(weekday_number(monday), 1);
/// let sunday = NaiveDate::from_ymd_opt(2026, 8, 9).unwrap();
/// assert_eq!(weekday_number(sunday), 7);
/// ```
pub fn weekday_number(date: NaiveDate) -> u8 {
    // number_from_monday is always 1 to 7.
    date.weekday().number_from_monday() as u8
}

/// Calendar dates of the Monday-start week containing `reference`.
pub fn week_dates(reference: NaiveDate) -> [NaiveDate; 7] {
    let offset = i64::from(weekday_number(reference)) - 1;
    let monday = reference - Duration::days(offset);
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// Full English name of a weekday number, if in range.
pub fn day_name(day: u8) -> Option<&'static str> {
    const NAMES: [&str; 7] = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    NAMES.get(usize::from(day).checked_sub(1)?).copied()
}

/// Three-letter abbreviation of a weekday number, if in range.
pub fn day_abbrev(day: u8) -> Option<&'static str> {
    const NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    NAMES.get(usize::from(day).checked_sub(1)?).copied()
}
