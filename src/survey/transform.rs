use super::address::{Gate, GATE_NO};
use super::classify::QuestionKind;
use super::date::{canonical, normalize_date_str, to_iso_timestamp};
use super::form::FormValue;
use super::types::{Answer, AnswerValue};
use super::validate::FieldError;

pub fn to_answer(
    kind: &QuestionKind,
    question_id: &str,
    form: &FormValue,
    previous: Option<&Answer>,
) -> Result<Answer, Vec<FieldError>> {
    let value = match (kind, form) {
        (QuestionKind::Address, FormValue::Address(address)) => match address.gate {
            Some(Gate::No) => Some(AnswerValue::Text(GATE_NO.to_string())),
            Some(Gate::Yes) => Some(AnswerValue::Text(address.serialize()?)),
            None => None,
        },
        (QuestionKind::FileUpload, FormValue::Empty) => previous.and_then(|a| a.answer.clone()),
        (kind, FormValue::Text(raw)) if kind.date_kind().is_some() => {
            Some(AnswerValue::Text(normalize_date_str(raw)))
        }
        (kind, FormValue::Date(date)) if kind.date_kind().is_some() => {
            Some(AnswerValue::Text(canonical(*date)))
        }
        (_, form) => passthrough(form)?,
    };

    Ok(Answer {
        question_id: question_id.to_string(),
        answer: value,
        other_text: form.other_text().map(str::to_string),
    })
}

fn passthrough(form: &FormValue) -> Result<Option<AnswerValue>, Vec<FieldError>> {
    let value = match form {
        FormValue::Empty => None,
        FormValue::Text(value) => Some(AnswerValue::Text(value.clone())),
        FormValue::Date(date) => Some(AnswerValue::Text(to_iso_timestamp(*date))),
        FormValue::Choice { selected, .. } => Some(AnswerValue::Text(selected.clone())),
        FormValue::Choices { selected, .. } => Some(AnswerValue::List(selected.clone())),
        FormValue::Fields(fields) => {
            let json = serde_json::to_string(fields)
                .map_err(|e| vec![FieldError::new("fields", format!("Unable to save answer: {e}"))])?;
            Some(AnswerValue::Text(json))
        }
        FormValue::Address(address) => Some(AnswerValue::Text(address.serialize()?)),
        FormValue::File(file) => Some(AnswerValue::File(file.clone())),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::to_answer;
    use crate::survey::address::{AddressForm, AddressPayload, AddressRecord, Gate};
    use crate::survey::classify::{DateKind, QuestionKind, TextKind};
    use crate::survey::form::FormValue;
    use crate::survey::types::{Answer, AnswerValue};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn text_of(answer: &Answer) -> &str {
        answer.answer.as_ref().and_then(|v| v.as_text()).expect("text answer")
    }

    #[test]
    fn dates_normalize_for_date_kinds_only() {
        let dob = QuestionKind::Text(TextKind::Date(DateKind::Birth));
        let a = to_answer(&dob, "q", &FormValue::text("11/01/2025"), None).expect("answer");
        assert_eq!(text_of(&a), "2025-11-01");

        let native = NaiveDate::from_ymd_opt(2025, 11, 1).expect("date");
        let b = to_answer(&dob, "q", &FormValue::Date(native), None).expect("answer");
        assert_eq!(text_of(&b), "2025-11-01");

        let plain = QuestionKind::Text(TextKind::Plain);
        let c = to_answer(&plain, "q", &FormValue::Date(native), None).expect("answer");
        assert_eq!(text_of(&c), "2025-11-01T00:00:00.000Z");
        let d = to_answer(&plain, "q", &FormValue::text("11/01/2025"), None).expect("answer");
        assert_eq!(text_of(&d), "11/01/2025");
    }

    #[test]
    fn height_passes_unchanged_and_fields_serialize() {
        let a = to_answer(&QuestionKind::Height, "h", &FormValue::text("5-10,180"), None).expect("answer");
        assert_eq!(text_of(&a), "5-10,180");

        let fields = BTreeMap::from([("name".to_string(), "Ann".to_string())]);
        let b = to_answer(&QuestionKind::MultiInput(vec![]), "m", &FormValue::Fields(fields), None)
            .expect("answer");
        assert_eq!(text_of(&b), r#"{"name":"Ann"}"#);
    }

    #[test]
    fn address_gate_no_is_literal_and_yes_collapses_shipping() {
        let no = AddressForm { gate: Some(Gate::No), ..AddressForm::default() };
        let a = to_answer(&QuestionKind::Address, "addr", &FormValue::Address(no), None).expect("answer");
        assert_eq!(text_of(&a), "No");

        let billing = AddressRecord {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            street: "1 Main St".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            zip: "73301".to_string(),
            ..AddressRecord::default()
        };
        let stale = AddressRecord { city: "Stale".to_string(), ..AddressRecord::default() };
        let yes = AddressForm {
            gate: Some(Gate::Yes),
            billing: billing.clone(),
            shipping: stale,
            same_as_billing: true,
        };
        let b = to_answer(&QuestionKind::Address, "addr", &FormValue::Address(yes), None).expect("answer");
        let payload: AddressPayload = serde_json::from_str(text_of(&b)).expect("json");
        assert_eq!(payload.shipping_address, billing);
    }

    #[test]
    fn empty_file_step_keeps_previous_upload() {
        let previous = Answer::text("f", "https://files.example/a.png");
        let a = to_answer(&QuestionKind::FileUpload, "f", &FormValue::Empty, Some(&previous)).expect("answer");
        assert_eq!(a.answer, Some(AnswerValue::Text("https://files.example/a.png".to_string())));
    }

    #[test]
    fn choices_carry_other_text() {
        let form = FormValue::Choices {
            selected: vec!["Other".to_string()],
            other_text: Some("Shellfish".to_string()),
        };
        let a = to_answer(&QuestionKind::MultiSelect(vec![]), "c", &form, None).expect("answer");
        assert_eq!(a.answer, Some(AnswerValue::List(vec!["Other".to_string()])));
        assert_eq!(a.other_text.as_deref(), Some("Shellfish"));
    }
}
