use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::SurveyError;
use crate::util::text::normalize_token;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    MultipleChoice,
    Checkboxes,
    Dropdown,
    #[default]
    InputBox,
    FileUpload,
    MultiInbox,
    Height,
    Address,
    Unknown(String),
}

impl QuestionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MultipleChoice => "MULTIPLE_CHOICE",
            Self::Checkboxes => "CHECKBOXES",
            Self::Dropdown => "DROPDOWN",
            Self::InputBox => "INPUT_BOX",
            Self::FileUpload => "FILE_UPLOAD",
            Self::MultiInbox => "MULTI_INBOX",
            Self::Height => "HEIGHT",
            Self::Address => "ADDRESS",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for QuestionType {
    fn from(raw: String) -> Self {
        match normalize_token(&raw).as_str() {
            "multiple_choice" => Self::MultipleChoice,
            "checkboxes" | "checkbox" | "single_choice" => Self::Checkboxes,
            "dropdown" => Self::Dropdown,
            "input_box" | "text" | "free_text" => Self::InputBox,
            "file_upload" => Self::FileUpload,
            "multi_inbox" | "multi_input" => Self::MultiInbox,
            "height" => Self::Height,
            "address" => Self::Address,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<QuestionType> for String {
    fn from(value: QuestionType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationHint {
    Email,
    Phone,
    Number,
    Date,
    Tags,
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Phone,
    Number,
    Date,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiInputField {
    #[serde(alias = "fieldName")]
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub validation: Option<ValidationHint>,
    #[serde(default)]
    pub multi_inputs: Vec<MultiInputField>,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl Question {
    pub fn new(id: impl Into<String>, text: impl Into<String>, question_type: QuestionType) -> Self {
        Self {
            id: id.into(),
            position: None,
            text: text.into(),
            question_type,
            options: Vec::new(),
            validation: None,
            multi_inputs: Vec::new(),
            required: true,
        }
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }
}

const ACCEPTED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/heic",
    "image/heif",
    "application/pdf",
];

const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "heic", "heif", "pdf"];

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    pub name: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl FileHandle {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, SurveyError> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = content_type_for(&name).to_string();
        Ok(Self::new(name, content_type, bytes))
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    pub fn is_accepted(&self) -> bool {
        let mime = self.content_type.to_lowercase();
        if ACCEPTED_MIME_TYPES.iter().any(|m| *m == mime) {
            return true;
        }
        self.extension()
            .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    List(Vec<String>),
    File(FileHandle),
}

impl AnswerValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    #[serde(default)]
    pub answer: Option<AnswerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_text: Option<String>,
}

impl Answer {
    pub fn text(question_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: Some(AnswerValue::Text(value.into())),
            other_text: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyContext {
    #[serde(default)]
    pub survey_id: Option<String>,
    #[serde(default)]
    pub survey_type: Option<String>,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Answer, AnswerValue, FileHandle, Question, QuestionType, ValidationHint};

    #[test]
    fn parses_question_with_aliases_and_defaults() {
        let raw = r#"{"id":"q7","text":"Email","type":"input_box","validation":"email"}"#;
        let q: Question = serde_json::from_str(raw).expect("parse question");
        assert_eq!(q.question_type, QuestionType::InputBox);
        assert_eq!(q.validation, Some(ValidationHint::Email));
        assert!(q.required);
        assert!(q.position.is_none());
    }

    #[test]
    fn unknown_type_survives_round_trip() {
        let q: Question =
            serde_json::from_str(r#"{"id":"q1","type":"SLIDER"}"#).expect("parse question");
        assert_eq!(q.question_type, QuestionType::Unknown("SLIDER".to_string()));
        let out = serde_json::to_value(&q).expect("serialize");
        assert_eq!(out["type"], "SLIDER");
    }

    #[test]
    fn answer_payloads_are_untagged() {
        let answers: Vec<Answer> = serde_json::from_str(
            r#"[{"questionId":"a","answer":"Jane"},{"questionId":"b","answer":["x","y"]},{"questionId":"c"}]"#,
        )
        .expect("parse answers");
        assert_eq!(answers[0].answer, Some(AnswerValue::Text("Jane".to_string())));
        assert_eq!(
            answers[1].answer,
            Some(AnswerValue::List(vec!["x".to_string(), "y".to_string()]))
        );
        assert!(answers[2].answer.is_none());
    }

    #[test]
    fn accepts_images_and_pdf_only() {
        assert!(FileHandle::new("id.PNG", "", vec![]).is_accepted());
        assert!(FileHandle::new("scan", "application/pdf", vec![]).is_accepted());
        assert!(!FileHandle::new("notes.txt", "text/plain", vec![]).is_accepted());
    }
}
