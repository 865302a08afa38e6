//! The `lingbot init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("lingbot.toml").exists() {
        println!("lingbot.toml already exists, skipping.");
    } else {
        std::fs::write("lingbot.toml", SAMPLE_CONFIG)?;
        println!("Created lingbot.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set LINGBOT_LOGIN and LINGBOT_PASSWORD (or edit lingbot.toml)");
    println!("  2. Run: lingbot validate");
    println!("  3. Run: lingbot run");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# lingbot configuration

login = "${LINGBOT_LOGIN}"
password = "${LINGBOT_PASSWORD}"

# Milliseconds slept before each submitted answer.
min_sleep_ms = 2000
max_sleep_ms = 6000

# Wrong-answer strategies.
allow_typo = true
allow_synonym = true

# Answer the service's marketing questions instead of skipping them.
answer_marketing_questions = false

# Where word progress is stored between sessions.
data_dir = "./lingbot-data"

# The mistake schedule: one row per session a word has been seen in, one
# column per mistake already made this session. risk_percentage is the
# chance of a deliberate mistake; max_mistakes caps how many mistakes the
# whole run may make at that cell (-1 = no cap).
mistake_schedule = [
    [
        { risk_percentage = 90, max_mistakes = -1 },
        { risk_percentage = 75, max_mistakes = 2 },
        { risk_percentage = 50, max_mistakes = 1 },
    ],
    [
        { risk_percentage = 60, max_mistakes = 2 },
        { risk_percentage = 40, max_mistakes = 1 },
    ],
    [
        { risk_percentage = 20, max_mistakes = 1 },
    ],
]
"#;
