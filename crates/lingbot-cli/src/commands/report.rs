//! The `lingbot report` command: fetch and display the grade report.

use std::path::PathBuf;

use anyhow::{Context, Result};

use lingbot_core::traits::{GradeReport, LearningService};
use lingbot_services::config::load_settings_from;
use lingbot_services::InstalingClient;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let settings = load_settings_from(config_path.as_deref())?;

    let mut client = InstalingClient::new(
        &settings.login,
        &settings.password,
        settings.answer_marketing_questions,
        settings.service_url.clone(),
    );
    client.login().await.context("login failed")?;

    let report = client
        .fetch_report()
        .await
        .context("failed to fetch grade report")?;
    print_report(&report);

    Ok(())
}

pub fn print_report(report: &GradeReport) {
    use comfy_table::Table;

    let mut table = Table::new();
    table.set_header(vec!["", "Value"]);
    if let Some(prev) = &report.previous_mark {
        table.add_row(vec!["Previous mark", prev.as_str()]);
    }
    table.add_row(vec!["Current mark", report.current_mark.as_str()]);
    table.add_row(vec!["Days of work", report.days_of_work.as_str()]);
    table.add_row(vec!["Teacher words", report.teacher_words.as_str()]);
    table.add_row(vec!["Parent words", report.parent_words.as_str()]);
    table.add_row(vec!["Extra parent words", report.extra_parent_words.as_str()]);
    table.add_row(vec![
        "Days remaining this week",
        report.week_remaining_days.as_str(),
    ]);

    eprintln!("\n{table}");
}
