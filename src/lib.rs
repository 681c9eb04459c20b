pub mod config;
pub mod error;
pub mod runner;
pub mod services;
pub mod survey;
pub mod util;

pub use error::SurveyError;
pub use survey::classify::{classify, QuestionKind};
pub use survey::engine::{StepFailure, StepOutcome, SurveyEngine};
pub use survey::form::FormValue;
pub use survey::types::{Answer, AnswerValue, FileHandle, Question, QuestionType, SurveyContext};
