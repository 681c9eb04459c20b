use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::SurveyError;
use crate::survey::types::{Answer, Question};
use crate::util::hash::sha256_hex;

use super::{FileUploader, Notice, NoticeLevel, Notifier, QuestionSource, SubmissionHandler, UploadRequest};

#[derive(Debug, Default)]
pub struct StaticQuestionSource {
    questions: HashMap<String, Question>,
}

impl StaticQuestionSource {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions: questions.into_iter().map(|q| (q.id.clone(), q)).collect(),
        }
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    async fn fetch_question(
        &self,
        question_id: &str,
        _survey_type: Option<&str>,
        _patient_id: Option<&str>,
    ) -> Result<Question, SurveyError> {
        self.questions
            .get(question_id)
            .cloned()
            .ok_or_else(|| SurveyError::NotFound(question_id.to_string()))
    }
}

// <root>/<survey>/<patient>/<product>/<sha256>.<ext>
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base: Option<String>,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base: Option<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.filter(|b| !b.trim().is_empty()),
        }
    }

    fn object_key(request: &UploadRequest<'_>) -> Result<String, SurveyError> {
        let mut segments = Vec::new();
        for id in [request.survey_id, request.patient_id, request.product_id] {
            if !is_safe_segment(id) {
                return Err(SurveyError::Upload {
                    file_name: request.file.name.clone(),
                    reason: format!("identifier {id:?} cannot be used as a storage path"),
                });
            }
            segments.push(id);
        }
        let digest = sha256_hex(&request.file.bytes);
        let name = match request
            .file
            .extension()
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            Some(ext) => format!("{digest}.{ext}"),
            None => digest,
        };
        Ok(format!("{}/{name}", segments.join("/")))
    }

    fn url_for(&self, key: &str, path: &Path) -> String {
        match &self.public_base {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!("file://{}", path.display()),
        }
    }
}

fn is_safe_segment(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(|c: char| matches!(c, '/' | '\\' | ':' | '\0'))
}

#[async_trait]
impl FileUploader for LocalObjectStore {
    async fn upload(&self, request: UploadRequest<'_>) -> Result<String, SurveyError> {
        let key = Self::object_key(&request)?;
        let path = self.root.join(&key);
        let upload_err = |e: std::io::Error| SurveyError::Upload {
            file_name: request.file.name.clone(),
            reason: format!("Unable to write {}: {e}", path.display()),
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(upload_err)?;
        }
        tokio::fs::write(&path, &request.file.bytes)
            .await
            .map_err(upload_err)?;
        info!("Stored {} as {key}", request.file.name);
        Ok(self.url_for(&key, &path))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => error!("{}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => info!("{}", notice.message),
        }
    }
}

#[derive(Debug, Default)]
pub struct QueuedNotifier {
    queue: Mutex<Vec<Notice>>,
}

impl QueuedNotifier {
    pub fn drain(&self) -> Vec<Notice> {
        match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&self, notice: Notice) {
        match self.queue.lock() {
            Ok(mut queue) => queue.push(notice),
            Err(_) => warn!("Notice queue poisoned, dropping: {}", notice.message),
        }
    }
}

#[derive(Debug, Default)]
pub struct CollectingSubmitter {
    last: Mutex<Option<Vec<Answer>>>,
}

impl CollectingSubmitter {
    pub fn last(&self) -> Option<Vec<Answer>> {
        self.last.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl SubmissionHandler for CollectingSubmitter {
    async fn submit(&self, answers: Vec<Answer>) -> Result<(), SurveyError> {
        let mut guard = self
            .last
            .lock()
            .map_err(|_| SurveyError::Submit("submission buffer poisoned".to_string()))?;
        *guard = Some(answers);
        Ok(())
    }
}
