use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::SurveyError;
use crate::survey::types::Question;

use super::{FileUploader, QuestionSource, UploadRequest};

const AGENT: &str = "intake-survey/0.1";

fn http_client(timeout: Duration) -> Result<Client, SurveyError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

fn parse_base(base_url: &str) -> Result<Url, SurveyError> {
    let url = Url::parse(base_url.trim_end_matches('/'))
        .map_err(|e| SurveyError::Settings(format!("invalid base URL {base_url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(SurveyError::Settings(format!("{base_url} cannot be used as a base URL")));
    }
    Ok(url)
}

// Each segment is percent-encoded, so ids containing `/`, `?` or `#` stay one segment.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

fn with_auth(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    let request = request
        .header(USER_AGENT, AGENT)
        .header(ACCEPT, "application/json");
    match token {
        Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
        None => request,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionEnvelope {
    Wrapped { data: Question },
    Bare(Question),
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

#[derive(Debug, Clone)]
pub struct RestQuestionSource {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl RestQuestionSource {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, SurveyError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: parse_base(base_url)?,
            token,
        })
    }
}

#[async_trait]
impl QuestionSource for RestQuestionSource {
    async fn fetch_question(
        &self,
        question_id: &str,
        survey_type: Option<&str>,
        patient_id: Option<&str>,
    ) -> Result<Question, SurveyError> {
        let url = endpoint(&self.base_url, &["questions", question_id]);
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(survey_type) = survey_type {
            query.push(("surveyType", survey_type));
        }
        if let Some(patient_id) = patient_id {
            query.push(("patientId", patient_id));
        }
        debug!("Fetching question metadata from {url}");

        let fetch_err = |reason: String| SurveyError::Fetch {
            question_id: question_id.to_string(),
            reason,
        };
        let response = with_auth(self.client.get(url).query(&query), self.token.as_deref())
            .send()
            .await
            .map_err(|e| fetch_err(format!("request failed: {e}")))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(SurveyError::NotFound(question_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(fetch_err(format!(
                "request failed with status {}",
                response.status()
            )));
        }
        let envelope = response
            .json::<QuestionEnvelope>()
            .await
            .map_err(|e| fetch_err(format!("unable to parse response: {e}")))?;
        Ok(match envelope {
            QuestionEnvelope::Wrapped { data } => data,
            QuestionEnvelope::Bare(question) => question,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RestFileUploader {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl RestFileUploader {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, SurveyError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: parse_base(base_url)?,
            token,
        })
    }
}

#[async_trait]
impl FileUploader for RestFileUploader {
    async fn upload(&self, request: UploadRequest<'_>) -> Result<String, SurveyError> {
        let file = request.file;
        let upload_err = |reason: String| SurveyError::Upload {
            file_name: file.name.clone(),
            reason,
        };
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| upload_err(format!("invalid content type: {e}")))?;
        let form = Form::new()
            .text("productId", request.product_id.to_string())
            .text("patientId", request.patient_id.to_string())
            .part("file", part);

        let url = endpoint(&self.base_url, &["surveys", request.survey_id, "files"]);
        let response = with_auth(self.client.post(url).multipart(form), self.token.as_deref())
            .send()
            .await
            .map_err(|e| upload_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(upload_err(format!(
                "upload rejected with status {}",
                response.status()
            )));
        }
        let body = response
            .json::<UploadResponse>()
            .await
            .map_err(|e| upload_err(format!("unable to parse response: {e}")))?;
        Ok(body.url)
    }
}
