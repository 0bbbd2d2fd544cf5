//! Per-field validation rules.
//!
//! Each validator receives the whole [`FormValues`] so cross-field rules (the
//! day limit depends on month and year) need no shared state. The first rule
//! that fails wins; a field has at most one error.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::age::max_days_in_month;
use crate::form::{Field, FormValues};

/// Oldest accepted birth year.
pub const MIN_YEAR: i32 = 1900;

/// Minimum length of first and last name, in characters, after trimming.
pub const MIN_NAME_CHARS: usize = 2;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));
static DAY_MONTH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,2}$").expect("Invalid regex"));
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("Invalid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Classify the current value of `field`. Never mutates anything.
///
/// `current_year` is the year of "now" in the reference timezone; birth
/// years after it are rejected.
pub fn validate_field(field: Field, values: &FormValues, current_year: i32) -> Option<FieldError> {
    let message = match field {
        Field::FirstName => check_name(&values.first_name, "Informe o nome"),
        Field::LastName => check_name(&values.last_name, "Informe o sobrenome"),
        Field::Email => check_email(&values.email),
        Field::Day => check_day(values),
        Field::Month => check_month(&values.month),
        Field::Year => check_year(&values.year, current_year),
    };
    message.map(|m| FieldError::new(field, m))
}

/// Run every field's rules, in field order.
pub fn validate_all(values: &FormValues, current_year: i32) -> Vec<FieldError> {
    Field::ALL
        .iter()
        .filter_map(|&field| validate_field(field, values, current_year))
        .collect()
}

/// Strict decimal parse; anything else (empty, signs, letters) is "no value".
pub fn parse_number(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn check_name(value: &str, required: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(required.to_string());
    }
    if trimmed.chars().count() < MIN_NAME_CHARS {
        return Some(format!("Mínimo {MIN_NAME_CHARS} letras"));
    }
    None
}

fn check_email(value: &str) -> Option<String> {
    if value.is_empty() {
        return Some("Informe o email".to_string());
    }
    if !EMAIL_PATTERN.is_match(value) {
        return Some("Email inválido".to_string());
    }
    None
}

fn check_day(values: &FormValues) -> Option<String> {
    let raw = values.day.as_str();
    if raw.is_empty() {
        return Some("Informe o dia".to_string());
    }
    if !DAY_MONTH_PATTERN.is_match(raw) {
        return Some("Somente números".to_string());
    }
    let day = parse_number(raw)?;
    if !(1..=31).contains(&day) {
        return Some("Dia inválido".to_string());
    }

    // Only tighten the limit once month and year are both usable.
    let month = parse_number(&values.month).filter(|m| (1..=12).contains(m));
    let year = parse_number(&values.year);
    if let (Some(month), Some(year)) = (month, year) {
        let max = max_days_in_month(month as u32, year);
        if day as u32 > max {
            return Some(format!("Máx: {max} dias"));
        }
    }
    None
}

fn check_month(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return Some("Informe o mês".to_string());
    }
    if !DAY_MONTH_PATTERN.is_match(raw) {
        return Some("Somente números".to_string());
    }
    match parse_number(raw) {
        Some(month) if (1..=12).contains(&month) => None,
        _ => Some("Mês inválido".to_string()),
    }
}

fn check_year(raw: &str, current_year: i32) -> Option<String> {
    if raw.is_empty() {
        return Some("Informe o ano".to_string());
    }
    if !YEAR_PATTERN.is_match(raw) {
        return Some("Use 4 dígitos".to_string());
    }
    let year = parse_number(raw)?;
    if year < MIN_YEAR {
        return Some("Ano muito antigo".to_string());
    }
    if year > current_year {
        return Some("Futuro não permitido".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const THIS_YEAR: i32 = 2025;

    fn date_values(day: &str, month: &str, year: &str) -> FormValues {
        FormValues {
            day: day.to_string(),
            month: month.to_string(),
            year: year.to_string(),
            ..FormValues::default()
        }
    }

    fn message(field: Field, values: &FormValues) -> Option<String> {
        validate_field(field, values, THIS_YEAR).map(|e| e.message)
    }

    #[test]
    fn test_names_required_and_trimmed() {
        let mut values = FormValues::default();
        assert_eq!(message(Field::FirstName, &values).as_deref(), Some("Informe o nome"));
        assert_eq!(message(Field::LastName, &values).as_deref(), Some("Informe o sobrenome"));

        values.first_name = "   ".to_string();
        assert_eq!(message(Field::FirstName, &values).as_deref(), Some("Informe o nome"));

        values.first_name = " A ".to_string();
        assert_eq!(message(Field::FirstName, &values).as_deref(), Some("Mínimo 2 letras"));

        values.first_name = " Zé ".to_string();
        assert_eq!(message(Field::FirstName, &values), None);
    }

    #[test]
    fn test_email_shape() {
        let mut values = FormValues::default();
        assert_eq!(message(Field::Email, &values).as_deref(), Some("Informe o email"));

        for bad in ["ana", "ana@", "ana@mail", "a b@mail.com", "ana@@mail.com", "@mail.com"] {
            values.email = bad.to_string();
            assert_eq!(message(Field::Email, &values).as_deref(), Some("Email inválido"), "{bad}");
        }

        for good in ["ana@mail.com", "a.b+c@sub.example.com.br"] {
            values.email = good.to_string();
            assert_eq!(message(Field::Email, &values), None, "{good}");
        }
    }

    #[test]
    fn test_day_rules() {
        assert_eq!(message(Field::Day, &date_values("", "", "")).as_deref(), Some("Informe o dia"));
        assert_eq!(message(Field::Day, &date_values("1a", "", "")).as_deref(), Some("Somente números"));
        assert_eq!(message(Field::Day, &date_values("123", "", "")).as_deref(), Some("Somente números"));
        assert_eq!(message(Field::Day, &date_values("0", "", "")).as_deref(), Some("Dia inválido"));
        assert_eq!(message(Field::Day, &date_values("32", "1", "2024")).as_deref(), Some("Dia inválido"));
        assert_eq!(message(Field::Day, &date_values("32", "", "")).as_deref(), Some("Dia inválido"));
        assert_eq!(message(Field::Day, &date_values("07", "", "")), None);
    }

    #[test]
    fn test_day_limited_by_month_and_year() {
        assert_eq!(
            message(Field::Day, &date_values("29", "2", "2023")).as_deref(),
            Some("Máx: 28 dias")
        );
        assert_eq!(message(Field::Day, &date_values("29", "2", "2024")), None);
        assert_eq!(
            message(Field::Day, &date_values("31", "04", "2020")).as_deref(),
            Some("Máx: 30 dias")
        );
        // Without a usable month or year only the 1-31 range applies.
        assert_eq!(message(Field::Day, &date_values("31", "4", "")), None);
        assert_eq!(message(Field::Day, &date_values("31", "x", "2020")), None);
        assert_eq!(message(Field::Day, &date_values("31", "13", "2020")), None);
    }

    #[test]
    fn test_month_rules() {
        let check = |raw: &str| message(Field::Month, &date_values("", raw, ""));
        assert_eq!(check("").as_deref(), Some("Informe o mês"));
        assert_eq!(check("-1").as_deref(), Some("Somente números"));
        assert_eq!(check("0").as_deref(), Some("Mês inválido"));
        assert_eq!(check("13").as_deref(), Some("Mês inválido"));
        assert_eq!(check("12"), None);
        assert_eq!(check("01"), None);
    }

    #[test]
    fn test_year_rules() {
        let check = |raw: &str| message(Field::Year, &date_values("", "", raw));
        assert_eq!(check("").as_deref(), Some("Informe o ano"));
        assert_eq!(check("99").as_deref(), Some("Use 4 dígitos"));
        assert_eq!(check("20x4").as_deref(), Some("Use 4 dígitos"));
        assert_eq!(check("1899").as_deref(), Some("Ano muito antigo"));
        assert_eq!(check("1900"), None);
        assert_eq!(check(&THIS_YEAR.to_string()), None);
        assert_eq!(check(&(THIS_YEAR + 1).to_string()).as_deref(), Some("Futuro não permitido"));
    }

    #[test]
    fn test_validate_all_reports_each_field_once() {
        let errors = validate_all(&FormValues::default(), THIS_YEAR);
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, Field::ALL.to_vec());

        let values = FormValues {
            first_name: "Ana".to_string(),
            last_name: "Souza".to_string(),
            email: "ana@mail.com".to_string(),
            day: "15".to_string(),
            month: "5".to_string(),
            year: "1990".to_string(),
        };
        assert!(validate_all(&values, THIS_YEAR).is_empty());
    }

    #[test]
    fn test_parse_number_treats_garbage_as_absent() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("+1"), None);
        assert_eq!(parse_number(" 1"), None);
        assert_eq!(parse_number("1.5"), None);
        assert_eq!(parse_number("99999999999"), None);
        assert_eq!(parse_number("007"), Some(7));
    }
}
