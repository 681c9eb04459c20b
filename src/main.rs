use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake_survey::config::{load_settings, save_settings, EngineSettings};
use intake_survey::runner::{run_script, SurveyScript};
use intake_survey::services::local::TracingNotifier;

#[derive(Parser, Debug)]
#[command(name = "survey-runner", about = "Play intake survey scripts against the survey engine")]
struct Args {
    /// Engine settings file; created with defaults when missing.
    #[arg(long, env = "SURVEY_SETTINGS", default_value = "survey-settings.json")]
    settings: PathBuf,

    #[arg(long, env = "SURVEY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a survey script and print the submitted answers.
    Run { script: PathBuf },
    /// Write a default settings file.
    InitSettings { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("intake_survey={},survey_runner={}", args.log_level, args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::InitSettings { path } => {
            save_settings(&path, &EngineSettings::default())
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote default settings to {}", path.display());
        }
        Command::Run { script } => {
            let settings = load_settings(&args.settings)
                .with_context(|| format!("loading {}", args.settings.display()))?;
            let survey = SurveyScript::from_path(&script)?;
            let answers = run_script(survey, &settings, Arc::new(TracingNotifier)).await?;
            println!("{}", serde_json::to_string_pretty(&answers)?);
        }
    }
    Ok(())
}
