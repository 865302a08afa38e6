//! The `lingbot validate` command: check the configuration loads cleanly.

use std::path::PathBuf;

use anyhow::Result;

use lingbot_services::config::load_settings_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let settings = load_settings_from(config_path.as_deref())?;
    let schedule = settings.schedule_table()?;

    println!(
        "Configuration valid: {} schedule rows, typo strategy {}, synonym strategy {}",
        schedule.row_count(),
        enabled(settings.allow_typo),
        enabled(settings.allow_synonym),
    );
    if schedule.row_count() == 0 {
        println!("Note: the schedule is empty; every word will be answered correctly.");
    }

    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}
