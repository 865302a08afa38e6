//! lingbot settings.
//!
//! Note: Custom Debug impl masks the password to prevent accidental
//! exposure in logs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lingbot_core::model::{ScheduleCell, ScheduleTable};

/// Settings loaded from `lingbot.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Account email. `${ENV_VAR}` references are resolved at load time.
    pub login: String,
    /// Account password, same `${ENV_VAR}` handling.
    pub password: String,
    /// Inclusive range slept before each submitted answer, in milliseconds.
    #[serde(default = "default_min_sleep")]
    pub min_sleep_ms: u64,
    #[serde(default = "default_max_sleep")]
    pub max_sleep_ms: u64,
    /// The mistake schedule: one row per session index, one column per
    /// attempt index. `max_mistakes = -1` means unbounded.
    #[serde(default)]
    pub mistake_schedule: Vec<Vec<ScheduleCell>>,
    /// Allow the typographic-slip wrong-answer strategy.
    #[serde(default = "default_true")]
    pub allow_typo: bool,
    /// Allow the synonym-substitution wrong-answer strategy.
    #[serde(default = "default_true")]
    pub allow_synonym: bool,
    /// Answer the service's marketing questions instead of skipping them.
    #[serde(default)]
    pub answer_marketing_questions: bool,
    /// Directory holding the durable progress files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Learning service base URL override (tests, mirrors).
    #[serde(default)]
    pub service_url: Option<String>,
    /// Synonym API base URL override.
    #[serde(default)]
    pub synonym_url: Option<String>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("login", &self.login)
            .field("password", &"***")
            .field("min_sleep_ms", &self.min_sleep_ms)
            .field("max_sleep_ms", &self.max_sleep_ms)
            .field("mistake_schedule", &self.mistake_schedule)
            .field("allow_typo", &self.allow_typo)
            .field("allow_synonym", &self.allow_synonym)
            .field("answer_marketing_questions", &self.answer_marketing_questions)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

fn default_min_sleep() -> u64 {
    2_000
}
fn default_max_sleep() -> u64 {
    6_000
}
fn default_true() -> bool {
    true
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./lingbot-data")
}

impl Settings {
    /// Validate and build the schedule table. The engine never runs with
    /// an unusable schedule; this fails the whole load.
    pub fn schedule_table(&self) -> Result<ScheduleTable> {
        ScheduleTable::from_rows(self.mistake_schedule.clone())
            .context("invalid mistake schedule in configuration")
    }

    pub fn sleep_range(&self) -> (u64, u64) {
        (self.min_sleep_ms, self.max_sleep_ms)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load settings from well-known paths.
///
/// Search order:
/// 1. `lingbot.toml` in the current directory
/// 2. `~/.config/lingbot/config.toml`
pub fn load_settings() -> Result<Settings> {
    load_settings_from(None)
}

/// Load settings from an explicit path, or search the default locations.
pub fn load_settings_from(path: Option<&Path>) -> Result<Settings> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            p.to_path_buf()
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("lingbot.toml");
        if local.exists() {
            local
        } else if let Some(global) = dirs_path().map(|d| d.join("config.toml")) {
            if global.exists() {
                global
            } else {
                anyhow::bail!("no configuration found; run `lingbot init` to create one");
            }
        } else {
            anyhow::bail!("no configuration found; run `lingbot init` to create one");
        }
    };

    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read config: {}", config_path.display()))?;
    let mut settings: Settings = toml::from_str(&content)
        .with_context(|| format!("failed to parse config: {}", config_path.display()))?;

    settings.login = resolve_env_vars(&settings.login);
    settings.password = resolve_env_vars(&settings.password);

    anyhow::ensure!(
        settings.min_sleep_ms <= settings.max_sleep_ms,
        "min_sleep_ms ({}) must not exceed max_sleep_ms ({})",
        settings.min_sleep_ms,
        settings.max_sleep_ms
    );
    settings.schedule_table()?;

    Ok(settings)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lingbot"))
}
