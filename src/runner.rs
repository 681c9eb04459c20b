use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EngineSettings;
use crate::error::SurveyError;
use crate::services::local::{CollectingSubmitter, StaticQuestionSource};
use crate::services::{Capabilities, Notifier};
use crate::survey::engine::{StepOutcome, SurveyEngine};
use crate::survey::form::FormValue;
use crate::survey::types::{Answer, FileHandle, Question, SurveyContext};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyScript {
    #[serde(default)]
    pub context: SurveyContext,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub initial_answers: Vec<Answer>,
    #[serde(default)]
    pub responses: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScriptAction {
    File { path: PathBuf },
    Back,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Action(ScriptAction),
    Form(FormValue),
}

impl SurveyScript {
    pub fn from_path(path: &Path) -> Result<Self, SurveyError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SurveyError::Script(format!("Unable to read {}: {e}", path.display())))?;
        let mut script: SurveyScript = serde_json::from_str(&raw)
            .map_err(|e| SurveyError::Script(format!("Invalid script JSON: {e}")))?;
        if let Some(base) = path.parent() {
            script.resolve_paths(base);
        }
        Ok(script)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for step in &mut self.responses {
            if let ScriptStep::Action(ScriptAction::File { path }) = step {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }
}

pub async fn run_script(
    script: SurveyScript,
    settings: &EngineSettings,
    notifier: Arc<dyn Notifier>,
) -> Result<Vec<Answer>, SurveyError> {
    let local_source = Arc::new(StaticQuestionSource::new(script.questions.clone()));
    let submitter = Arc::new(CollectingSubmitter::default());
    let caps = Capabilities {
        questions: settings.question_source(local_source)?,
        uploader: settings.uploader()?,
        submitter: submitter.clone(),
        notifier,
    };
    let mut engine = SurveyEngine::new(
        script.questions,
        script.context,
        caps,
        script.initial_answers,
    );
    info!("Running survey with {} steps", engine.total_steps());

    for step in script.responses {
        let form = match step {
            ScriptStep::Action(ScriptAction::Back) => {
                engine.back();
                continue;
            }
            ScriptStep::Action(ScriptAction::File { path }) => {
                let file = FileHandle::from_path(&path).await?;
                let mut form = engine.form_for_current();
                if !engine.drop_files(&mut form, vec![file]) {
                    return Err(SurveyError::Script(format!(
                        "{} is not an accepted file type",
                        path.display()
                    )));
                }
                form
            }
            ScriptStep::Form(form) => form,
        };

        let question_id = engine
            .current_question()
            .map(|q| q.id().to_string())
            .unwrap_or_default();
        match engine.advance(form).await {
            StepOutcome::NoQuestions => {
                warn!("Survey has no questions");
                return Ok(Vec::new());
            }
            StepOutcome::Blocked(failure) => {
                return Err(SurveyError::Script(format!(
                    "Step {question_id} blocked: {}",
                    failure.messages().join("; ")
                )));
            }
            StepOutcome::Advanced { step } => info!("Advanced to step {}", step + 1),
            StepOutcome::Submitted(answers) => return Ok(answers),
        }
    }

    if engine.total_steps() == 0 {
        return Ok(Vec::new());
    }
    submitter.last().ok_or_else(|| {
        SurveyError::Script(format!(
            "Script ended at step {} of {} without submitting",
            engine.current_step() + 1,
            engine.total_steps()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::{run_script, SurveyScript};
    use crate::config::EngineSettings;
    use crate::services::local::QueuedNotifier;
    use crate::survey::types::{Answer, AnswerValue};
    use std::fs;
    use std::sync::Arc;
    use uuid::Uuid;

    fn script_json(file: &str) -> String {
        format!(
            r#"{{
      "context": {{"surveyId": "s1", "patientId": "p1", "productId": "prod1"}},
      "questions": [
        {{"id": "q3", "position": 3, "text": "ID Photo", "type": "FILE_UPLOAD"}},
        {{"id": "q1", "text": "First Name", "type": "INPUT_BOX"}},
        {{"id": "q2", "position": 2, "text": "Date of birth", "type": "INPUT_BOX"}}
      ],
      "responses": [
        {{"kind": "text", "value": "Jane"}},
        {{"kind": "text", "value": "01/02/1990"}},
        {{"kind": "file", "path": "{file}"}}
      ]
    }}"#
        )
    }

    #[tokio::test]
    async fn runs_script_against_local_backends() {
        let temp = std::env::temp_dir().join(format!("survey-run-{}", Uuid::new_v4()));
        fs::create_dir_all(&temp).expect("mkdir");
        fs::write(temp.join("id.png"), b"png-bytes").expect("write");
        let script_path = temp.join("script.json");
        fs::write(&script_path, script_json("id.png")).expect("write script");

        let script = SurveyScript::from_path(&script_path).expect("script");
        let settings = EngineSettings {
            upload_dir: temp.join("uploads").to_string_lossy().to_string(),
            public_url_base: Some("https://cdn.example".to_string()),
            ..EngineSettings::default()
        };
        let answers = run_script(script, &settings, Arc::new(QueuedNotifier::default()))
            .await
            .expect("run");

        assert_eq!(answers[0], Answer::text("q1", "Jane"));
        assert_eq!(answers[1], Answer::text("q2", "1990-01-02"));
        match &answers[2].answer {
            Some(AnswerValue::Text(url)) => assert!(url.starts_with("https://cdn.example/s1/p1/prod1/")),
            other => panic!("unexpected answer {other:?}"),
        }
        let _ = fs::remove_dir_all(temp);
    }

    #[tokio::test]
    async fn demo_script_submits_every_step() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/intake.json");
        let temp = std::env::temp_dir().join(format!("survey-demo-{}", Uuid::new_v4()));
        let settings = EngineSettings {
            upload_dir: temp.to_string_lossy().to_string(),
            ..EngineSettings::default()
        };
        let script = SurveyScript::from_path(&path).expect("script");
        let answers = run_script(script, &settings, Arc::new(QueuedNotifier::default()))
            .await
            .expect("run");

        assert_eq!(answers.len(), 8);
        assert_eq!(answers[2], Answer::text("q3", "1988-04-12"));
        assert_eq!(answers[3], Answer::text("q4", "5-6,172"));
        assert_eq!(answers[4].other_text.as_deref(), Some("Sleep apnea"));
        assert!(matches!(&answers[7].answer, Some(AnswerValue::Text(url)) if url.starts_with("file://")));
        let _ = fs::remove_dir_all(temp);
    }

    #[tokio::test]
    async fn blocked_step_is_reported() {
        let raw = r#"{
      "questions": [{"id": "q1", "text": "Email", "type": "INPUT_BOX", "validation": "email"}],
      "responses": [{"kind": "text", "value": "not-an-email"}]
    }"#;
        let script: SurveyScript = serde_json::from_str(raw).expect("script");
        let err = run_script(script, &EngineSettings::default(), Arc::new(QueuedNotifier::default()))
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("Enter a valid email address"));
    }
}
