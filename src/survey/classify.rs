use serde::Serialize;

use crate::util::text::{clean_label, compact_lower, contains_any};

use super::types::{MultiInputField, Question, QuestionType, ValidationHint};

const ADDRESS_PHRASES: &[&str] = &[
    "update your new address",
    "update your address",
    "update your shipping address",
    "new shipping address",
];

const BIRTH_DATE_PHRASES: &[&str] = &["date of birth", "birth date", "birthdate", "birthday"];

const INJECTION_DATE_TEXT: &str = "whatwasthedateofyourlastinjection?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DateKind {
    Birth,
    Injection,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextKind {
    Plain,
    Email,
    Phone,
    Number,
    Tags,
    Date(DateKind),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "strategy", content = "detail")]
pub enum QuestionKind {
    Height,
    Address,
    MultiInput(Vec<MultiInputField>),
    MultiSelect(Vec<String>),
    SingleSelect(Vec<String>),
    Text(TextKind),
    FileUpload,
    Unsupported(String),
}

impl QuestionKind {
    pub fn is_single_select(&self) -> bool {
        matches!(self, Self::SingleSelect(_))
    }

    pub fn date_kind(&self) -> Option<DateKind> {
        match self {
            Self::Text(TextKind::Date(kind)) => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuestion {
    pub question: Question,
    pub kind: QuestionKind,
}

impl ResolvedQuestion {
    pub fn new(question: Question) -> Self {
        let kind = classify(&question);
        Self { question, kind }
    }

    pub fn id(&self) -> &str {
        &self.question.id
    }
}

pub fn classify(question: &Question) -> QuestionKind {
    let text = clean_label(&question.text);
    let qt = &question.question_type;

    if *qt == QuestionType::Height || contains_any(&text, &["height"]) {
        return QuestionKind::Height;
    }
    if *qt == QuestionType::Address || contains_any(&text, ADDRESS_PHRASES) {
        return QuestionKind::Address;
    }

    match qt {
        QuestionType::MultiInbox => QuestionKind::MultiInput(question.multi_inputs.clone()),
        QuestionType::MultipleChoice => QuestionKind::MultiSelect(question.options.clone()),
        QuestionType::Checkboxes | QuestionType::Dropdown => {
            QuestionKind::SingleSelect(question.options.clone())
        }
        QuestionType::InputBox => QuestionKind::Text(text_kind(&text, question.validation)),
        QuestionType::FileUpload => QuestionKind::FileUpload,
        QuestionType::Height => QuestionKind::Height,
        QuestionType::Address => QuestionKind::Address,
        QuestionType::Unknown(raw) => QuestionKind::Unsupported(raw.clone()),
    }
}

fn text_kind(text: &str, hint: Option<ValidationHint>) -> TextKind {
    if contains_any(text, BIRTH_DATE_PHRASES) {
        return TextKind::Date(DateKind::Birth);
    }
    if compact_lower(text) == INJECTION_DATE_TEXT {
        return TextKind::Date(DateKind::Injection);
    }
    match hint {
        Some(ValidationHint::Email) => TextKind::Email,
        Some(ValidationHint::Phone) => TextKind::Phone,
        Some(ValidationHint::Number) => TextKind::Number,
        Some(ValidationHint::Date) => TextKind::Date(DateKind::Generic),
        Some(ValidationHint::Tags) => TextKind::Tags,
        Some(ValidationHint::Unrecognized) | None => TextKind::Plain,
    }
}
