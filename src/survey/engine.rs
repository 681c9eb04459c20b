use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, error, info, warn};

use crate::services::{Capabilities, Notice, UploadRequest};

use super::address::{AddressForm, AddressPayload, Gate, GATE_NO};
use super::classify::{QuestionKind, ResolvedQuestion};
use super::form::FormValue;
use super::sequencer::Sequencer;
use super::store::AnswerStore;
use super::transform::to_answer;
use super::types::{Answer, AnswerValue, FileHandle, Question, SurveyContext};
use super::validate::{effective_kind, validate_step, FieldError};

pub const MISSING_UPLOAD_CONTEXT: &str = "Cannot upload files: missing required information";

#[derive(Debug, Clone, PartialEq)]
pub enum StepFailure {
    Fetch(String),
    Validation(Vec<FieldError>),
    MissingUploadContext,
    Upload(Vec<String>),
    Submit(String),
}

impl StepFailure {
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Fetch(message) | Self::Submit(message) => vec![message.clone()],
            Self::Validation(errors) => errors.iter().take(1).map(|e| e.message.clone()).collect(),
            Self::MissingUploadContext => vec![MISSING_UPLOAD_CONTEXT.to_string()],
            Self::Upload(messages) => messages.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    NoQuestions,
    Blocked(StepFailure),
    Advanced { step: usize },
    Submitted(Vec<Answer>),
}

pub struct SurveyEngine {
    sequencer: Sequencer,
    store: AnswerStore,
    context: SurveyContext,
    caps: Capabilities,
    seed: Vec<Answer>,
    address_cache: HashMap<String, String>,
    field_errors: BTreeMap<String, String>,
    touched: BTreeSet<String>,
}

impl SurveyEngine {
    pub fn new(
        questions: Vec<Question>,
        context: SurveyContext,
        caps: Capabilities,
        initial_answers: Vec<Answer>,
    ) -> Self {
        let mut engine = Self {
            sequencer: Sequencer::new(questions),
            store: AnswerStore::default(),
            context,
            caps,
            seed: Vec::new(),
            address_cache: HashMap::new(),
            field_errors: BTreeMap::new(),
            touched: BTreeSet::new(),
        };
        engine.seed_from(initial_answers);
        engine
    }

    fn seed_from(&mut self, answers: Vec<Answer>) {
        self.store = AnswerStore::seeded(&answers);
        self.seed = answers;
        let addresses = self
            .sequencer
            .steps()
            .iter()
            .filter(|s| s.kind == QuestionKind::Address)
            .filter_map(|s| {
                let raw = self.store.value(s.id())?.as_text()?;
                serde_json::from_str::<AddressPayload>(raw).ok()?;
                Some((s.id().to_string(), raw.to_string()))
            })
            .collect::<Vec<(String, String)>>();
        self.address_cache.extend(addresses);
    }

    pub fn reseed_if_changed(&mut self, answers: &[Answer]) -> bool {
        if self.seed.len() == answers.len() && self.seed == answers {
            return false;
        }
        debug!("Re-seeding answer store with {} answers", answers.len());
        self.seed_from(answers.to_vec());
        true
    }

    pub fn current_question(&self) -> Option<&ResolvedQuestion> {
        self.sequencer.current()
    }

    pub fn current_step(&self) -> usize {
        self.sequencer.current_step()
    }

    pub fn total_steps(&self) -> usize {
        self.sequencer.total()
    }

    pub fn is_last_step(&self) -> bool {
        self.sequencer.is_last_step()
    }

    pub fn answers(&self) -> &[Answer] {
        self.store.answers()
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    pub fn touch(&mut self, field: impl Into<String>) {
        self.touched.insert(field.into());
    }

    pub fn touched(&self) -> &BTreeSet<String> {
        &self.touched
    }

    pub fn back(&mut self) {
        self.sequencer.previous();
    }

    // suppressed right after navigating back
    pub fn should_auto_advance(&self) -> bool {
        self.current_question()
            .map(|q| q.kind.is_single_select())
            .unwrap_or(false)
            && !self.sequencer.is_navigating_back()
    }

    pub fn form_for_current(&self) -> FormValue {
        match self.current_question() {
            Some(step) => FormValue::from_answer(&step.kind, self.store.get(step.id())),
            None => FormValue::Empty,
        }
    }

    pub fn switch_address_gate(&self, form: &mut AddressForm, gate: Gate) {
        let cached = self
            .current_question()
            .and_then(|q| self.address_cache.get(q.id()))
            .map(String::as_str);
        form.switch_gate(gate, cached);
    }

    pub fn drop_files(&self, form: &mut FormValue, files: Vec<FileHandle>) -> bool {
        match files.into_iter().find(FileHandle::is_accepted) {
            Some(file) => {
                *form = FormValue::File(file);
                true
            }
            None => {
                self.caps.notifier.notify(Notice::error(
                    "Only JPEG, PNG, GIF, HEIC, HEIF or PDF files are accepted",
                ));
                false
            }
        }
    }

    // Takes `&mut self`, so a second advance cannot start while one is in flight.
    pub async fn advance(&mut self, form: FormValue) -> StepOutcome {
        self.touched.clear();
        self.field_errors.clear();

        let Some(step) = self.sequencer.current().cloned() else {
            return StepOutcome::NoQuestions;
        };

        let authoritative = match self.fetch_authoritative(&step.question).await {
            Ok(question) => question,
            Err(failure) => return self.block(failure),
        };

        let kind = effective_kind(&step.kind, &authoritative);
        let previous = self.store.get(step.id()).cloned();
        if let Err(errors) = validate_step(&kind, &authoritative, &form, previous.as_ref()) {
            return self.block(StepFailure::Validation(errors));
        }

        let answer = match to_answer(&kind, step.id(), &form, previous.as_ref()) {
            Ok(answer) => answer,
            Err(errors) => return self.block(StepFailure::Validation(errors)),
        };

        if kind == QuestionKind::Address {
            if let Some(raw) = answer.answer.as_ref().and_then(AnswerValue::as_text) {
                if raw != GATE_NO {
                    self.address_cache.insert(step.id().to_string(), raw.to_string());
                }
            }
        }
        self.store.upsert(answer);
        info!(
            "Committed answer for {} (step {}/{})",
            step.id(),
            self.sequencer.current_step() + 1,
            self.sequencer.total()
        );

        if self.sequencer.is_last_step() {
            return self.finalize().await;
        }
        self.sequencer.next();
        StepOutcome::Advanced {
            step: self.sequencer.current_step(),
        }
    }

    async fn fetch_authoritative(&self, local: &Question) -> Result<Question, StepFailure> {
        let fetched = self
            .caps
            .questions
            .fetch_question(
                &local.id,
                self.context.survey_type.as_deref(),
                self.context.patient_id.as_deref(),
            )
            .await;
        match fetched {
            Ok(question) => Ok(question),
            Err(err) if err.is_not_found() => {
                warn!("Question {} unknown to metadata service, using local definition", local.id);
                Ok(local.clone())
            }
            Err(err) => {
                error!("Question metadata fetch failed for {}: {err}", local.id);
                Err(StepFailure::Fetch(err.to_string()))
            }
        }
    }

    async fn finalize(&mut self) -> StepOutcome {
        if let Err(failure) = self.upload_files().await {
            return self.block(failure);
        }
        let answers = self.store.answers().to_vec();
        match self.caps.submitter.submit(answers.clone()).await {
            Ok(()) => {
                info!("Submitted {} answers", answers.len());
                self.caps.notifier.notify(Notice::success("Survey submitted"));
                StepOutcome::Submitted(answers)
            }
            Err(err) => {
                error!("Submission failed: {err}");
                self.block(StepFailure::Submit(err.to_string()))
            }
        }
    }

    async fn upload_files(&mut self) -> Result<(), StepFailure> {
        let pending = self
            .store
            .answers()
            .iter()
            .filter_map(|a| match &a.answer {
                Some(AnswerValue::File(file)) => Some((a.question_id.clone(), file.clone())),
                _ => None,
            })
            .collect::<Vec<(String, FileHandle)>>();
        if pending.is_empty() {
            return Ok(());
        }

        let (Some(survey_id), Some(product_id), Some(patient_id)) = (
            self.context.survey_id.as_deref(),
            self.context.product_id.as_deref(),
            self.context.patient_id.as_deref(),
        ) else {
            error!("{} file answers pending without survey/product/patient ids", pending.len());
            return Err(StepFailure::MissingUploadContext);
        };

        let uploader = self.caps.uploader.clone();
        let results = join_all(pending.iter().map(|(_, file)| {
            uploader.upload(UploadRequest {
                survey_id,
                product_id,
                patient_id,
                file,
            })
        }))
        .await;

        let mut urls = Vec::new();
        let mut failures = Vec::new();
        for ((question_id, file), result) in pending.iter().zip(results) {
            match result {
                Ok(url) => urls.push((question_id.clone(), url)),
                Err(err) => {
                    error!("Upload of {} for {question_id} failed: {err}", file.name);
                    failures.push(format!("Failed to upload {}: {err}", file.name));
                }
            }
        }
        if !failures.is_empty() {
            return Err(StepFailure::Upload(failures));
        }

        for (question_id, url) in urls {
            self.store.set_value(&question_id, AnswerValue::Text(url));
        }
        Ok(())
    }

    fn block(&mut self, failure: StepFailure) -> StepOutcome {
        if let StepFailure::Validation(errors) = &failure {
            for e in errors {
                self.field_errors
                    .entry(e.field.clone())
                    .or_insert_with(|| e.message.clone());
            }
        }
        for message in failure.messages() {
            self.caps.notifier.notify(Notice::error(message));
        }
        StepOutcome::Blocked(failure)
    }
}
