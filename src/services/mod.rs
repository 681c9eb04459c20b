pub mod http;
pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::SurveyError;
use crate::survey::types::{Answer, FileHandle, Question};

#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch_question(
        &self,
        question_id: &str,
        survey_type: Option<&str>,
        patient_id: Option<&str>,
    ) -> Result<Question, SurveyError>;
}

#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub survey_id: &'a str,
    pub product_id: &'a str,
    pub patient_id: &'a str,
    pub file: &'a FileHandle,
}

#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(&self, request: UploadRequest<'_>) -> Result<String, SurveyError>;
}

#[async_trait]
pub trait SubmissionHandler: Send + Sync {
    async fn submit(&self, answers: Vec<Answer>) -> Result<(), SurveyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

#[derive(Clone)]
pub struct Capabilities {
    pub questions: Arc<dyn QuestionSource>,
    pub uploader: Arc<dyn FileUploader>,
    pub submitter: Arc<dyn SubmissionHandler>,
    pub notifier: Arc<dyn Notifier>,
}
