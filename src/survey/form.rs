use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::util::text::is_blank;

use super::address::AddressForm;
use super::classify::QuestionKind;
use super::types::{Answer, AnswerValue, FileHandle};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    rename_all_fields = "camelCase",
    tag = "kind",
    content = "value"
)]
pub enum FormValue {
    #[default]
    Empty,
    Text(String),
    Date(NaiveDate),
    Choice {
        selected: String,
        #[serde(default)]
        other_text: Option<String>,
    },
    Choices {
        selected: Vec<String>,
        #[serde(default)]
        other_text: Option<String>,
    },
    Fields(BTreeMap<String, String>),
    Address(AddressForm),
    File(FileHandle),
}

impl FormValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn choice(selected: impl Into<String>) -> Self {
        Self::Choice {
            selected: selected.into(),
            other_text: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(value) => is_blank(value),
            Self::Date(_) => false,
            Self::Choice { selected, .. } => is_blank(selected),
            Self::Choices { selected, .. } => selected.is_empty(),
            Self::Fields(fields) => fields.values().all(|v| is_blank(v)),
            Self::Address(form) => form.gate.is_none(),
            Self::File(_) => false,
        }
    }

    pub fn other_text(&self) -> Option<&str> {
        match self {
            Self::Choice { other_text, .. } | Self::Choices { other_text, .. } => {
                other_text.as_deref().filter(|t| !is_blank(t))
            }
            _ => None,
        }
    }

    pub fn from_answer(kind: &QuestionKind, answer: Option<&Answer>) -> Self {
        let Some(answer) = answer else {
            return Self::Empty;
        };
        let other_text = answer.other_text.clone();
        match (kind, answer.answer.as_ref()) {
            (_, None) => Self::Empty,
            (QuestionKind::Address, Some(AnswerValue::Text(raw))) => {
                Self::Address(AddressForm::from_stored(raw))
            }
            (QuestionKind::MultiInput(_), Some(AnswerValue::Text(raw))) => {
                serde_json::from_str::<BTreeMap<String, String>>(raw)
                    .map(Self::Fields)
                    .unwrap_or_default()
            }
            (QuestionKind::MultiSelect(_), Some(AnswerValue::List(items))) => Self::Choices {
                selected: items.clone(),
                other_text,
            },
            (QuestionKind::MultiSelect(_), Some(AnswerValue::Text(single))) => Self::Choices {
                selected: vec![single.clone()],
                other_text,
            },
            (QuestionKind::SingleSelect(_), Some(AnswerValue::Text(selected))) => Self::Choice {
                selected: selected.clone(),
                other_text,
            },
            // a stored upload stays on the answer; the renderer shows it as existing
            (QuestionKind::FileUpload, Some(AnswerValue::Text(_))) => Self::Empty,
            (_, Some(AnswerValue::File(file))) => Self::File(file.clone()),
            (_, Some(AnswerValue::Text(value))) => Self::Text(value.clone()),
            (_, Some(AnswerValue::List(items))) => Self::Text(items.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FormValue;
    use crate::survey::address::Gate;
    use crate::survey::classify::QuestionKind;
    use crate::survey::types::{Answer, AnswerValue};

    #[test]
    fn rehydrates_choices_and_other_text() {
        let answer = Answer {
            question_id: "q".to_string(),
            answer: Some(AnswerValue::List(vec!["Other".to_string()])),
            other_text: Some("Peanuts".to_string()),
        };
        let form = FormValue::from_answer(&QuestionKind::MultiSelect(vec![]), Some(&answer));
        assert_eq!(form.other_text(), Some("Peanuts"));
    }

    #[test]
    fn rehydrates_address_gate_no() {
        let answer = Answer::text("q", "No");
        match FormValue::from_answer(&QuestionKind::Address, Some(&answer)) {
            FormValue::Address(form) => assert_eq!(form.gate, Some(Gate::No)),
            other => panic!("unexpected form {other:?}"),
        }
    }

    #[test]
    fn malformed_multi_input_json_starts_empty() {
        let answer = Answer::text("q", "{broken");
        let form = FormValue::from_answer(&QuestionKind::MultiInput(vec![]), Some(&answer));
        assert_eq!(form, FormValue::Empty);
    }

    #[test]
    fn script_shape_deserializes() {
        let form: FormValue =
            serde_json::from_str(r#"{"kind":"choice","value":{"selected":"Female"}}"#).expect("parse");
        assert_eq!(form, FormValue::choice("Female"));
    }
}
