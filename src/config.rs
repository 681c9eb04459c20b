use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::SurveyError;
use crate::services::http::{RestFileUploader, RestQuestionSource};
use crate::services::local::LocalObjectStore;
use crate::services::{FileUploader, QuestionSource};

pub const TOKEN_ENV: &str = "SURVEY_API_TOKEN";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub upload_base_url: Option<String>,
    pub upload_dir: String,
    #[serde(default)]
    pub public_url_base: Option<String>,
    pub request_timeout_secs: u64,
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            upload_base_url: None,
            upload_dir: std::env::temp_dir()
                .join("intake-survey")
                .join("uploads")
                .to_string_lossy()
                .to_string(),
            public_url_base: None,
            request_timeout_secs: 30,
            api_token: None,
        }
    }
}

fn env_token() -> Option<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

impl EngineSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(token) = env_token() {
            self.api_token = Some(token);
        }
        self
    }

    pub fn question_source(
        &self,
        fallback: Arc<dyn QuestionSource>,
    ) -> Result<Arc<dyn QuestionSource>, SurveyError> {
        match non_empty(&self.api_base_url) {
            Some(base) => {
                info!("Using question metadata service at {base}");
                Ok(Arc::new(RestQuestionSource::new(
                    base,
                    self.api_token.clone(),
                    self.request_timeout(),
                )?))
            }
            None => Ok(fallback),
        }
    }

    pub fn uploader(&self) -> Result<Arc<dyn FileUploader>, SurveyError> {
        match non_empty(&self.upload_base_url) {
            Some(base) => {
                info!("Using upload service at {base}");
                Ok(Arc::new(RestFileUploader::new(
                    base,
                    self.api_token.clone(),
                    self.request_timeout(),
                )?))
            }
            None => {
                if self.upload_dir.trim().is_empty() {
                    return Err(SurveyError::Settings("uploadDir must not be empty".to_string()));
                }
                Ok(Arc::new(LocalObjectStore::new(
                    PathBuf::from(&self.upload_dir),
                    self.public_url_base.clone(),
                )))
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn load_settings(path: &Path) -> Result<EngineSettings, SurveyError> {
    if !path.exists() {
        let defaults = EngineSettings::default();
        save_settings(path, &defaults)?;
        return Ok(defaults.with_env_overrides());
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| SurveyError::Settings(format!("Unable to read {}: {e}", path.display())))?;
    if raw.trim().is_empty() {
        let defaults = EngineSettings::default();
        save_settings(path, &defaults)?;
        return Ok(defaults.with_env_overrides());
    }
    let settings: EngineSettings = serde_json::from_str(&raw)
        .map_err(|e| SurveyError::Settings(format!("Invalid settings JSON: {e}")))?;
    Ok(settings.with_env_overrides())
}

pub fn save_settings(path: &Path, settings: &EngineSettings) -> Result<(), SurveyError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_string_pretty(settings)?;
    fs::write(path, payload)
        .map_err(|e| SurveyError::Settings(format!("Unable to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::{load_settings, save_settings, EngineSettings};
    use std::fs;
    use uuid::Uuid;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let temp = std::env::temp_dir().join(format!("survey-settings-{}", Uuid::new_v4()));
        let path = temp.join("settings.json");
        let loaded = load_settings(&path).expect("load");
        assert_eq!(loaded.request_timeout_secs, 30);
        assert!(path.exists());
        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    fn saved_settings_round_trip_without_token() {
        let temp = std::env::temp_dir().join(format!("survey-settings-{}", Uuid::new_v4()));
        let path = temp.join("settings.json");
        let settings = EngineSettings {
            api_base_url: Some("https://api.example".to_string()),
            api_token: Some("secret".to_string()),
            ..EngineSettings::default()
        };
        save_settings(&path, &settings).expect("save");
        let raw = fs::read_to_string(&path).expect("read");
        assert!(!raw.contains("secret"));
        let parsed: EngineSettings = serde_json::from_str(&raw).expect("parse");
        assert_eq!(parsed.api_base_url.as_deref(), Some("https://api.example"));
        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    fn invalid_json_is_reported() {
        let temp = std::env::temp_dir().join(format!("survey-settings-{}", Uuid::new_v4()));
        fs::create_dir_all(&temp).expect("mkdir");
        let path = temp.join("settings.json");
        fs::write(&path, "{not json").expect("write");
        let err = load_settings(&path).expect_err("should fail");
        assert!(err.to_string().contains("Invalid settings JSON"));
        let _ = fs::remove_dir_all(temp);
    }
}
