//! Shared validation helpers for inbound HTTP payloads.
//!
//! The form boundary lives here: raw request DTOs become validated domain
//! drafts, and every rejection names the offending field in `details` so
//! clients can attach messages to inputs.

use serde_json::json;

use crate::domain::medication::{Color, MedicationDraft, ScheduleEntry};
use crate::domain::schedule::{ScheduleValidationError, TimeOfDay, WeekdaySet};
use crate::domain::{Error, MedicationValidationError};

use super::medications::{MedicationRequest, ScheduleEntryRequest};

pub(crate) fn missing_field_error(field: &str) -> Error {
    Error::invalid_request(format!("{field} is required")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

fn invalid_field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn parse_time(raw: &str, field: &str) -> Result<TimeOfDay, Error> {
    raw.parse()
        .map_err(|err: ScheduleValidationError| invalid_field_error(field, "invalid_time", err.to_string()))
}

fn parse_days(days: Vec<u8>, field: &str) -> Result<WeekdaySet, Error> {
    WeekdaySet::try_from_days(days).map_err(|err| {
        let code = match err {
            ScheduleValidationError::EmptyDays => "empty_days",
            _ => "invalid_days",
        };
        invalid_field_error(field, code, err.to_string())
    })
}

fn parse_schedule(entries: Vec<ScheduleEntryRequest>) -> Result<Vec<ScheduleEntry>, Error> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let time_field = format!("schedule[{index}].time");
            let days_field = format!("schedule[{index}].days");
            let time = entry
                .time
                .ok_or_else(|| missing_field_error(&time_field))?;
            let days = entry
                .days
                .ok_or_else(|| missing_field_error(&days_field))?;
            Ok(ScheduleEntry::new(
                parse_time(&time, &time_field)?,
                parse_days(days, &days_field)?,
            ))
        })
        .collect()
}

fn parse_color(color: Option<String>) -> Result<Color, Error> {
    match color {
        Some(raw) => Color::new(raw.clone()).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "color",
                "code": "invalid_color",
                "value": raw,
            }))
        }),
        // The form lets users skip the colour; pick one like the palette
        // button would.
        None => Ok(Color::random(&mut rand::thread_rng())),
    }
}

/// Validate a raw medication payload into a domain draft.
pub(crate) fn parse_medication_request(
    payload: MedicationRequest,
) -> Result<MedicationDraft, Error> {
    let name = payload.name.ok_or_else(|| missing_field_error("name"))?;
    let dosage = payload
        .dosage
        .ok_or_else(|| missing_field_error("dosage"))?;
    let schedule = parse_schedule(
        payload
            .schedule
            .ok_or_else(|| missing_field_error("schedule"))?,
    )?;
    let color = parse_color(payload.color)?;

    MedicationDraft::try_new(name, dosage, schedule, color, payload.notes).map_err(|err| {
        let (field, code) = match err {
            MedicationValidationError::EmptyName => ("name", "empty_name"),
            MedicationValidationError::EmptyDosage => ("dosage", "empty_dosage"),
            MedicationValidationError::InvalidColor => ("color", "invalid_color"),
            MedicationValidationError::InvalidId => ("id", "invalid_id"),
        };
        invalid_field_error(field, code, err.to_string())
    })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::Value;

    fn request(body: Value) -> MedicationRequest {
        serde_json::from_value(body).expect("request shape")
    }

    fn detail(err: &Error, key: &str) -> Option<String> {
        err.details()
            .and_then(Value::as_object)
            .and_then(|details| details.get(key))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    #[rstest]
    fn accepts_a_complete_payload() {
        let draft = parse_medication_request(request(json!({
            "name": "Lisinopril",
            "dosage": "10mg",
            "schedule": [{ "time": "08:00", "days": [1, 2, 3] }],
            "color": "#3b82f6",
            "notes": "With food"
        })))
        .expect("valid payload");
        assert_eq!(draft.name, "Lisinopril");
        assert_eq!(draft.schedule.len(), 1);
        assert_eq!(draft.notes.as_deref(), Some("With food"));
    }

    #[rstest]
    fn picks_a_palette_colour_when_none_is_given() {
        let draft = parse_medication_request(request(json!({
            "name": "Lisinopril",
            "dosage": "10mg",
            "schedule": []
        })))
        .expect("valid payload");
        assert!(crate::domain::COLOR_PALETTE.contains(&draft.color.as_ref()));
    }

    #[rstest]
    #[case(json!({ "dosage": "10mg", "schedule": [] }), "name")]
    #[case(json!({ "name": "X", "schedule": [] }), "dosage")]
    #[case(json!({ "name": "X", "dosage": "10mg" }), "schedule")]
    fn rejects_missing_fields(#[case] body: Value, #[case] field: &str) {
        let err = parse_medication_request(request(body)).expect_err("missing field");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(detail(&err, "field").as_deref(), Some(field));
        assert_eq!(detail(&err, "code").as_deref(), Some("missing_field"));
    }

    #[rstest]
    fn rejects_empty_day_sets_with_the_entry_index() {
        let err = parse_medication_request(request(json!({
            "name": "X",
            "dosage": "10mg",
            "schedule": [{ "time": "08:00", "days": [] }]
        })))
        .expect_err("empty days");
        assert_eq!(detail(&err, "field").as_deref(), Some("schedule[0].days"));
        assert_eq!(detail(&err, "code").as_deref(), Some("empty_days"));
    }

    #[rstest]
    fn rejects_out_of_range_days() {
        let err = parse_medication_request(request(json!({
            "name": "X",
            "dosage": "10mg",
            "schedule": [{ "time": "08:00", "days": [8] }]
        })))
        .expect_err("day out of range");
        assert_eq!(detail(&err, "code").as_deref(), Some("invalid_days"));
    }

    #[rstest]
    #[case("8 o'clock")]
    #[case("25:00")]
    fn rejects_unparseable_times(#[case] time: &str) {
        let err = parse_medication_request(request(json!({
            "name": "X",
            "dosage": "10mg",
            "schedule": [{ "time": time, "days": [1] }]
        })))
        .expect_err("bad time");
        assert_eq!(detail(&err, "field").as_deref(), Some("schedule[0].time"));
        assert_eq!(detail(&err, "code").as_deref(), Some("invalid_time"));
    }

    #[rstest]
    fn rejects_blank_names_after_trimming() {
        let err = parse_medication_request(request(json!({
            "name": "   ",
            "dosage": "10mg",
            "schedule": []
        })))
        .expect_err("blank name");
        assert_eq!(detail(&err, "code").as_deref(), Some("empty_name"));
    }

    #[rstest]
    fn rejects_malformed_colours() {
        let err = parse_medication_request(request(json!({
            "name": "X",
            "dosage": "10mg",
            "schedule": [],
            "color": "blue"
        })))
        .expect_err("bad colour");
        assert_eq!(detail(&err, "code").as_deref(), Some("invalid_color"));
        assert_eq!(detail(&err, "value").as_deref(), Some("blue"));
    }
}
