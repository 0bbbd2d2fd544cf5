//! Form orchestrator: owns the raw field values and every error, derives the
//! birth date and the elapsed time, and hands the presentation layer an
//! immutable [`FormSnapshot`] after each event.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use crate::age::{CalendarDate, DateDifference, difference_ymd};
use crate::clock::ClockReading;
use crate::validate::{parse_number, validate_all, validate_field};

/// Shown in the result rows while there is nothing to show.
pub const PLACEHOLDER: &str = "--";

/// Stands in for the name when both name fields are blank.
pub const ANONYMOUS: &str = "A pessoa";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Day,
    Month,
    Year,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Day,
        Field::Month,
        Field::Year,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Day => "day",
            Field::Month => "month",
            Field::Year => "year",
        }
    }

    /// Label used by the form ("NOME", "DIA", ...).
    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "NOME",
            Field::LastName => "SOBRENOME",
            Field::Email => "EMAIL",
            Field::Day => "DIA",
            Field::Month => "MÊS",
            Field::Year => "ANO",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s) || f.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Raw field contents, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub day: String,
    pub month: String,
    pub year: String,
}

impl FormValues {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Day => &self.day,
            Field::Month => &self.month,
            Field::Year => &self.year,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Email => &mut self.email,
            Field::Day => &mut self.day,
            Field::Month => &mut self.month,
            Field::Year => &mut self.year,
        }
    }

    /// Birth date assembled from day/month/year, if they form a real date.
    pub fn birth_date(&self) -> Option<CalendarDate> {
        let day = parse_number(&self.day)?;
        let month = parse_number(&self.month)?;
        let year = parse_number(&self.year)?;
        CalendarDate::new(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?).ok()
    }

    /// "First Last", trimmed, or [`ANONYMOUS`].
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            ANONYMOUS.to_string()
        } else {
            name.to_string()
        }
    }
}

/// Form-wide error raised by a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RootError {
    InvalidDate,
    FutureDate,
}

impl RootError {
    pub fn message(self) -> &'static str {
        match self {
            RootError::InvalidDate => "Data inválida.",
            RootError::FutureDate => "A data deve ser no passado.",
        }
    }
}

impl fmt::Display for RootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every field valid and the birth date is not in the future.
    Accepted(DateDifference),
    /// The date checks passed but at least one field is still invalid.
    FieldErrors(usize),
    Rejected(RootError),
}

/// What the presentation layer gets to see after an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub values: FormValues,
    pub field_errors: BTreeMap<Field, String>,
    pub root_error: Option<String>,
    pub result: Option<DateDifference>,
    pub success_message: Option<String>,
    pub clock: ClockReading,
}

impl FormSnapshot {
    pub fn error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    /// Years, months and days as display strings, or the placeholder.
    pub fn result_cells(&self) -> [String; 3] {
        match self.result {
            Some(diff) => [
                diff.years.to_string(),
                diff.months.to_string(),
                diff.days.to_string(),
            ],
            None => [PLACEHOLDER.to_string(), PLACEHOLDER.to_string(), PLACEHOLDER.to_string()],
        }
    }
}

#[derive(Debug, Default)]
pub struct Form {
    values: FormValues,
    field_errors: BTreeMap<Field, String>,
    root_error: Option<RootError>,
    submitted: bool,
    submit_ok: bool,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn root_error(&self) -> Option<RootError> {
        self.root_error
    }

    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    pub fn is_submit_successful(&self) -> bool {
        self.submit_ok
    }

    /// Store a keystroke's worth of input. Fields are only re-validated on
    /// change once a submit has been attempted.
    pub fn change(&mut self, field: Field, value: impl Into<String>, now: &ClockReading) {
        *self.values.slot(field) = value.into();
        if self.submitted {
            self.revalidate(field, now);
        }
    }

    /// The field lost focus: validate it.
    pub fn blur(&mut self, field: Field, now: &ClockReading) {
        self.revalidate(field, now);
    }

    pub fn submit(&mut self, now: &ClockReading) -> SubmitOutcome {
        self.root_error = None;
        self.submitted = true;
        self.submit_ok = false;

        self.field_errors = validate_all(&self.values, now.date.year())
            .into_iter()
            .map(|e| (e.field, e.message))
            .collect();

        let outcome = match self.values.birth_date() {
            None => SubmitOutcome::Rejected(RootError::InvalidDate),
            Some(birth) if birth > now.date => SubmitOutcome::Rejected(RootError::FutureDate),
            Some(birth) if self.field_errors.is_empty() => match difference_ymd(birth, now.date) {
                Ok(diff) => SubmitOutcome::Accepted(diff),
                Err(_) => SubmitOutcome::Rejected(RootError::FutureDate),
            },
            Some(_) => SubmitOutcome::FieldErrors(self.field_errors.len()),
        };

        match outcome {
            SubmitOutcome::Accepted(diff) => {
                self.submit_ok = true;
                info!(age = %diff, "submit accepted");
            }
            SubmitOutcome::Rejected(err) => {
                self.root_error = Some(err);
                debug!(error = ?err, "submit rejected");
            }
            SubmitOutcome::FieldErrors(count) => {
                debug!(count, "submit blocked by field errors");
            }
        }
        outcome
    }

    /// Back to an empty, error-free form.
    pub fn reset(&mut self) {
        *self = Self::default();
        debug!("form reset");
    }

    pub fn birth_date(&self) -> Option<CalendarDate> {
        self.values.birth_date()
    }

    /// Elapsed time, derived from the current values whether or not a
    /// submit happened. `None` for a missing, invalid or future birth date.
    pub fn result(&self, now: &ClockReading) -> Option<DateDifference> {
        let birth = self.birth_date()?;
        difference_ymd(birth, now.date).ok()
    }

    pub fn full_name(&self) -> String {
        self.values.full_name()
    }

    pub fn success_message(&self, now: &ClockReading) -> Option<String> {
        if !self.submit_ok {
            return None;
        }
        let diff = self.result(now)?;
        Some(format!(
            "{} tem {} anos, {} meses e {} dias.",
            self.full_name(),
            diff.years,
            diff.months,
            diff.days
        ))
    }

    pub fn snapshot(&self, now: &ClockReading) -> FormSnapshot {
        FormSnapshot {
            values: self.values.clone(),
            field_errors: self.field_errors.clone(),
            root_error: self.root_error.map(|e| e.message().to_string()),
            result: self.result(now),
            success_message: self.success_message(now),
            clock: *now,
        }
    }

    fn revalidate(&mut self, field: Field, now: &ClockReading) {
        match validate_field(field, &self.values, now.date.year()) {
            Some(err) => {
                self.field_errors.insert(field, err.message);
            }
            None => {
                self.field_errors.remove(&field);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> ClockReading {
        ClockReading {
            date: CalendarDate::new(2024, 5, 15).unwrap(),
            hour: 14,
            minute: 30,
        }
    }

    fn filled(day: &str, month: &str, year: &str) -> Form {
        let now = now();
        let mut form = Form::new();
        form.change(Field::FirstName, "Ana", &now);
        form.change(Field::LastName, "Souza", &now);
        form.change(Field::Email, "ana@mail.com", &now);
        form.change(Field::Day, day, &now);
        form.change(Field::Month, month, &now);
        form.change(Field::Year, year, &now);
        form
    }

    #[test]
    fn test_field_parses_names_and_labels() {
        assert_eq!("firstName".parse::<Field>(), Ok(Field::FirstName));
        assert_eq!("DIA".parse::<Field>(), Ok(Field::Day));
        assert_eq!("mês".parse::<Field>(), Err(UnknownField("mês".to_string())));
        assert_eq!("MÊS".parse::<Field>(), Ok(Field::Month));
        assert!("age".parse::<Field>().is_err());
    }

    #[test]
    fn test_change_does_not_validate_before_submit() {
        let mut form = Form::new();
        form.change(Field::Day, "99", &now());
        assert_eq!(form.field_error(Field::Day), None);

        form.blur(Field::Day, &now());
        assert_eq!(form.field_error(Field::Day), Some("Dia inválido"));
    }

    #[test]
    fn test_blur_clears_stale_error() {
        let mut form = Form::new();
        form.blur(Field::Month, &now());
        assert_eq!(form.field_error(Field::Month), Some("Informe o mês"));

        form.change(Field::Month, "5", &now());
        form.blur(Field::Month, &now());
        assert_eq!(form.field_error(Field::Month), None);
    }

    #[test]
    fn test_change_revalidates_after_submit() {
        let mut form = filled("15", "5", "1990");
        form.change(Field::Email, "nope", &now());
        form.submit(&now());
        assert_eq!(form.field_error(Field::Email), Some("Email inválido"));

        form.change(Field::Email, "ana@mail.com", &now());
        assert_eq!(form.field_error(Field::Email), None);
    }

    #[test]
    fn test_submit_accepts_valid_birth_date() {
        let mut form = filled("15", "5", "1990");
        let outcome = form.submit(&now());
        assert_eq!(outcome, SubmitOutcome::Accepted(DateDifference::new(34, 0, 0)));
        assert!(form.is_submit_successful());
        assert_eq!(form.root_error(), None);
        assert_eq!(
            form.success_message(&now()).as_deref(),
            Some("Ana Souza tem 34 anos, 0 meses e 0 dias.")
        );
    }

    #[test]
    fn test_submit_rejects_impossible_date() {
        let mut form = filled("31", "4", "2020");
        let outcome = form.submit(&now());
        assert_eq!(outcome, SubmitOutcome::Rejected(RootError::InvalidDate));
        assert_eq!(form.root_error(), Some(RootError::InvalidDate));
        assert_eq!(form.field_error(Field::Day), Some("Máx: 30 dias"));

        let snapshot = form.snapshot(&now());
        assert_eq!(snapshot.root_error.as_deref(), Some("Data inválida."));
        assert_eq!(snapshot.result, None);
        assert_eq!(snapshot.success_message, None);
        assert_eq!(snapshot.result_cells(), ["--", "--", "--"]);
    }

    #[test]
    fn test_submit_rejects_future_date() {
        let mut form = filled("16", "5", "2024");
        assert_eq!(form.submit(&now()), SubmitOutcome::Rejected(RootError::FutureDate));
        assert_eq!(form.result(&now()), None);
        assert_eq!(
            form.snapshot(&now()).root_error.as_deref(),
            Some("A data deve ser no passado.")
        );
    }

    #[test]
    fn test_birth_date_equal_to_today_is_zero() {
        let mut form = filled("15", "5", "2024");
        assert_eq!(form.submit(&now()), SubmitOutcome::Accepted(DateDifference::default()));
        assert_eq!(form.result(&now()), Some(DateDifference::default()));
    }

    #[test]
    fn test_submit_clears_previous_root_error() {
        let mut form = filled("31", "4", "2020");
        form.submit(&now());
        assert!(form.root_error().is_some());

        form.change(Field::Day, "30", &now());
        assert!(matches!(form.submit(&now()), SubmitOutcome::Accepted(_)));
        assert_eq!(form.root_error(), None);
    }

    #[test]
    fn test_submit_blocked_by_field_errors_has_no_success() {
        let mut form = filled("15", "5", "1990");
        form.change(Field::FirstName, "A", &now());
        assert_eq!(form.submit(&now()), SubmitOutcome::FieldErrors(1));
        assert!(!form.is_submit_successful());
        assert_eq!(form.success_message(&now()), None);
        // The result itself is still derived from the date fields.
        assert_eq!(form.result(&now()), Some(DateDifference::new(34, 0, 0)));
    }

    #[test]
    fn test_result_is_derived_without_submit() {
        let form = filled("20", "5", "1990");
        assert_eq!(form.result(&now()), Some(DateDifference::new(33, 11, 25)));
        assert_eq!(form.snapshot(&now()).success_message, None);
    }

    #[test]
    fn test_full_name_falls_back_when_blank() {
        let mut form = Form::new();
        assert_eq!(form.full_name(), "A pessoa");
        form.change(Field::FirstName, "  Ana ", &now());
        assert_eq!(form.full_name(), "Ana");
        form.change(Field::LastName, " Souza", &now());
        assert_eq!(form.full_name(), "Ana Souza");
        form.change(Field::FirstName, "  ", &now());
        assert_eq!(form.full_name(), "Souza");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut form = filled("15", "5", "1990");
        form.submit(&now());
        form.reset();

        let snapshot = form.snapshot(&now());
        assert_eq!(snapshot.values, FormValues::default());
        assert!(snapshot.field_errors.is_empty());
        assert_eq!(snapshot.root_error, None);
        assert_eq!(snapshot.result, None);
        assert_eq!(snapshot.success_message, None);
        assert!(!form.is_submit_successful());

        // Back to blur-only validation.
        form.change(Field::Day, "99", &now());
        assert_eq!(form.field_error(Field::Day), None);
    }

    #[test]
    fn test_snapshot_serializes_with_field_names() {
        let mut form = Form::new();
        form.blur(Field::FirstName, &now());
        let json = serde_json::to_value(form.snapshot(&now())).unwrap();
        assert_eq!(json["fieldErrors"]["firstName"], "Informe o nome");
        assert_eq!(json["values"]["lastName"], "");
        assert_eq!(json["result"], serde_json::Value::Null);
        assert_eq!(json["clock"]["hour"], 14);
    }
}
