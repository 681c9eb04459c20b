use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("Question {0} not found")]
    NotFound(String),

    #[error("Unable to load question {question_id}: {reason}")]
    Fetch { question_id: String, reason: String },

    #[error("Upload of {file_name} failed: {reason}")]
    Upload { file_name: String, reason: String },

    #[error("Submission failed: {0}")]
    Submit(String),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Invalid survey script: {0}")]
    Script(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl SurveyError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SurveyError::NotFound(_))
    }
}
