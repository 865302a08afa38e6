//! The `lingbot run` command: complete today's drill session.

use std::path::PathBuf;

use anyhow::{Context, Result};

use lingbot_core::progress::WordProgressStore;
use lingbot_core::traits::{LearningService, ThreadRandom};
use lingbot_core::{run_session, DecisionEngine, SessionSummary, WrongAnswerGenerator};
use lingbot_services::config::load_settings_from;
use lingbot_services::{DatamuseClient, InstalingClient};

use crate::commands::report::print_report;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let settings = load_settings_from(config_path.as_deref())?;
    let schedule = settings.schedule_table()?;

    let store = WordProgressStore::load(&settings.data_dir)
        .context("failed to load word progress")?;
    tracing::info!(words = store.tracked_words(), "loaded word progress");

    let mut client = InstalingClient::new(
        &settings.login,
        &settings.password,
        settings.answer_marketing_questions,
        settings.service_url.clone(),
    );
    client.login().await.context("login failed")?;

    match client.is_new_session().await {
        Ok(true) => eprintln!("Starting today's session."),
        Ok(false) => eprintln!("Warning: today's session was already started elsewhere."),
        Err(e) => tracing::warn!("could not probe session state: {e}"),
    }

    let mut engine = DecisionEngine::new(schedule, store, Box::new(ThreadRandom));
    let mut generator = WrongAnswerGenerator::new(
        Box::new(DatamuseClient::new(settings.synonym_url.clone())),
        settings.allow_typo,
        settings.allow_synonym,
        Box::new(ThreadRandom),
    );

    let summary = run_session(
        &mut engine,
        &mut generator,
        &client,
        Some(settings.sleep_range()),
    )
    .await?;

    print_summary(&summary);

    // Losing progress silently would corrupt future sessions, so a failed
    // save fails the run.
    engine
        .finalize_session(&settings.data_dir)
        .context("failed to persist session progress")?;
    eprintln!("Progress saved to {}", settings.data_dir.display());

    match client.fetch_report().await {
        Ok(report) => print_report(&report),
        Err(e) => tracing::warn!("could not fetch grade report: {e:#}"),
    }

    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    use comfy_table::Table;

    let mut table = Table::new();
    table.set_header(vec!["Answered", "Correct", "Deliberate mistakes", "Grading mismatches"]);
    table.add_row(vec![
        summary.answered.to_string(),
        summary.correct.to_string(),
        summary.mistakes.to_string(),
        summary.rejected.to_string(),
    ]);

    eprintln!("\n{table}");
}
