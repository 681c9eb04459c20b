use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::util::text::is_blank;

use super::classify::{classify, DateKind, QuestionKind, TextKind};
use super::date::parse_date;
use super::form::FormValue;
use super::height::HeightWeight;
use super::types::{Answer, FieldKind, MultiInputField, Question};

pub const REQUIRED_MESSAGE: &str = "This field is required";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_step(
    kind: &QuestionKind,
    authoritative: &Question,
    form: &FormValue,
    previous: Option<&Answer>,
) -> Result<(), Vec<FieldError>> {
    let key = authoritative.id.as_str();

    if form.is_empty() {
        if !authoritative.required {
            return Ok(());
        }
        let has_previous = previous.and_then(|a| a.answer.as_ref()).is_some();
        if *kind == QuestionKind::FileUpload && has_previous {
            return Ok(());
        }
        return Err(vec![FieldError::new(key, REQUIRED_MESSAGE)]);
    }

    let mut errors = Vec::new();
    match (kind, form) {
        (QuestionKind::SingleSelect(options), FormValue::Choice { selected, .. }) => {
            check_choice(key, options, selected, &mut errors);
            check_other(options, std::slice::from_ref(selected), form, &mut errors);
        }
        (QuestionKind::MultiSelect(options), FormValue::Choices { selected, .. }) => {
            for item in selected {
                check_choice(key, options, item, &mut errors);
            }
            check_other(options, selected, form, &mut errors);
        }
        (QuestionKind::Text(text_kind), FormValue::Text(value)) => {
            if let Some(message) = check_text(*text_kind, value) {
                errors.push(FieldError::new(key, message));
            }
        }
        (QuestionKind::Text(TextKind::Date(date_kind)), FormValue::Date(date)) => {
            if let Some(message) = check_date(*date_kind, *date) {
                errors.push(FieldError::new(key, message));
            }
        }
        (QuestionKind::Text(_), FormValue::Date(_)) => {}
        (QuestionKind::Height, FormValue::Text(value)) => match HeightWeight::parse(value) {
            Some(hw) => {
                if let Some(message) = hw.problem() {
                    errors.push(FieldError::new(key, message));
                }
            }
            None => errors.push(FieldError::new(
                key,
                "Enter height as feet-inches and weight",
            )),
        },
        (QuestionKind::MultiInput(fields), FormValue::Fields(values)) => {
            for field in fields {
                let value = values.get(&field.name).map(String::as_str).unwrap_or("");
                if let Some(message) = check_sub_field(field, value) {
                    errors.push(FieldError::new(field.name.clone(), message));
                }
            }
        }
        (QuestionKind::Address, FormValue::Address(_)) => {}
        (QuestionKind::FileUpload, FormValue::File(file)) => {
            if !file.is_accepted() {
                errors.push(FieldError::new(
                    key,
                    "Only JPEG, PNG, GIF, HEIC, HEIF or PDF files are accepted",
                ));
            }
        }
        (QuestionKind::Unsupported(_), _) => {}
        _ => errors.push(FieldError::new(key, "Unexpected answer for this question")),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// Remote text hints, options and fields override the ones classified at load.
pub fn effective_kind(kind: &QuestionKind, authoritative: &Question) -> QuestionKind {
    let remote = classify(authoritative);
    match (kind, remote) {
        (QuestionKind::Text(_), remote @ QuestionKind::Text(_)) => remote,
        (QuestionKind::SingleSelect(_), QuestionKind::SingleSelect(options)) if !options.is_empty() => {
            QuestionKind::SingleSelect(options)
        }
        (QuestionKind::MultiSelect(_), QuestionKind::MultiSelect(options)) if !options.is_empty() => {
            QuestionKind::MultiSelect(options)
        }
        (QuestionKind::MultiInput(_), QuestionKind::MultiInput(fields)) if !fields.is_empty() => {
            QuestionKind::MultiInput(fields)
        }
        (local, _) => local.clone(),
    }
}

fn is_other_option(option: &str) -> bool {
    option.to_lowercase().contains("other")
}

fn check_choice(key: &str, options: &[String], selected: &str, errors: &mut Vec<FieldError>) {
    if options.is_empty() {
        return;
    }
    let known = options
        .iter()
        .any(|o| o.trim().eq_ignore_ascii_case(selected.trim()));
    if !known {
        errors.push(FieldError::new(key, "Select one of the available options"));
    }
}

fn check_other(options: &[String], selected: &[String], form: &FormValue, errors: &mut Vec<FieldError>) {
    let picked_other = selected.iter().any(|s| {
        is_other_option(s)
            && (options.is_empty() || options.iter().any(|o| o.trim().eq_ignore_ascii_case(s.trim())))
    });
    if picked_other && form.other_text().is_none() {
        errors.push(FieldError::new("otherText", "Please specify"));
    }
}

fn check_text(kind: TextKind, value: &str) -> Option<&'static str> {
    let value = value.trim();
    match kind {
        TextKind::Plain => None,
        TextKind::Email => {
            let re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("regex");
            (!re.is_match(value)).then_some("Enter a valid email address")
        }
        TextKind::Phone => (!is_phone(value)).then_some("Enter a valid phone number"),
        TextKind::Number => value
            .parse::<f64>()
            .is_err()
            .then_some("Enter a valid number"),
        TextKind::Tags => (!value.split(',').any(|t| !is_blank(t))).then_some("Enter at least one entry"),
        // unparseable dates are left for downstream checks
        TextKind::Date(date_kind) => parse_date(value).and_then(|d| check_date(date_kind, d)),
    }
}

fn is_phone(value: &str) -> bool {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || " ()-.+".contains(c));
    let digits = value.chars().filter(char::is_ascii_digit).collect::<String>();
    allowed && (digits.len() == 10 || (digits.len() == 11 && digits.starts_with('1')))
}

fn check_date(kind: DateKind, date: NaiveDate) -> Option<&'static str> {
    let today = Utc::now().date_naive();
    match kind {
        DateKind::Birth if date > today => Some("Date of birth cannot be in the future"),
        DateKind::Birth if date < NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(date) => {
            Some("Enter a valid date of birth")
        }
        DateKind::Injection if date > today => Some("Injection date cannot be in the future"),
        _ => None,
    }
}

fn check_sub_field(field: &MultiInputField, value: &str) -> Option<String> {
    if is_blank(value) {
        let label = if field.label.is_empty() { &field.name } else { &field.label };
        return Some(format!("{label} is required"));
    }
    let text_kind = match field.kind {
        FieldKind::Email => TextKind::Email,
        FieldKind::Phone => TextKind::Phone,
        FieldKind::Number => TextKind::Number,
        FieldKind::Date => TextKind::Date(DateKind::Generic),
        FieldKind::Text | FieldKind::Other => TextKind::Plain,
    };
    check_text(text_kind, value).map(str::to_string)
}
