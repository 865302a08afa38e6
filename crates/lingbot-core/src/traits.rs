//! Capability traits the engine depends on.
//!
//! The remote learning service and the synonym lookup are async traits
//! implemented by `lingbot-services`; randomness is a sync trait so tests
//! can script exact draw sequences and assert exact outcomes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

/// Source of the engine's probabilistic draws.
pub trait RandomSource: Send {
    /// Uniform integer in 1–100.
    fn percent(&mut self) -> u8;

    /// Uniform index in `0..n`. `n` must be non-zero.
    fn pick(&mut self, n: usize) -> usize;
}

/// Production randomness backed by the thread-local generator.
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn percent(&mut self) -> u8 {
        rand::Rng::gen_range(&mut rand::thread_rng(), 1..=100)
    }

    fn pick(&mut self, n: usize) -> usize {
        rand::Rng::gen_range(&mut rand::thread_rng(), 0..n)
    }
}

/// Deterministic randomness for tests: replays scripted values in order.
///
/// `percent()` consumes from the percent script, `pick()` from the pick
/// script. Running past the end of a script panics, which keeps tests
/// honest about how many draws an operation makes.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    percents: Vec<u8>,
    picks: Vec<usize>,
    percent_cursor: usize,
    pick_cursor: usize,
}

impl ScriptedRandom {
    pub fn new(percents: Vec<u8>, picks: Vec<usize>) -> Self {
        Self {
            percents,
            picks,
            percent_cursor: 0,
            pick_cursor: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn percent(&mut self) -> u8 {
        let value = self.percents[self.percent_cursor];
        self.percent_cursor += 1;
        value
    }

    fn pick(&mut self, _n: usize) -> usize {
        let value = self.picks[self.pick_cursor];
        self.pick_cursor += 1;
        value
    }
}

// ---------------------------------------------------------------------------
// Synonym lookup
// ---------------------------------------------------------------------------

/// External synonym lookup capability.
#[async_trait]
pub trait SynonymLookup: Send + Sync {
    /// Candidate substitutes for `word`, ordered by relevance. An empty
    /// list is a normal outcome, not an error.
    async fn synonyms(&self, word: &str) -> anyhow::Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// Remote learning service
// ---------------------------------------------------------------------------

/// A vocabulary item the service wants answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Service-side identifier for the word.
    pub word_id: String,
    /// The vocabulary string itself (the expected correct answer).
    pub word: String,
    /// Translation text shown alongside the question.
    pub translation: String,
}

/// Result of asking the service for the next vocabulary item.
#[derive(Debug, Clone)]
pub enum Fetched {
    Word(Presentation),
    /// The session has no more words today.
    SessionComplete,
}

/// An answer about to be (or just) submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub word_id: String,
    /// The correct answer, kept so grading can be cross-checked.
    pub word: String,
    /// What is actually submitted; empty means the answer was withheld.
    pub answer_text: String,
}

/// End-of-session grade report. Field values come back as opaque strings;
/// missing fields stay empty rather than failing the whole report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeReport {
    pub previous_mark: Option<String>,
    pub current_mark: String,
    pub days_of_work: String,
    pub teacher_words: String,
    pub parent_words: String,
    pub extra_parent_words: String,
    pub week_remaining_days: String,
}

/// The remote spaced-repetition service, reduced to the three calls the
/// session loop needs. Login and session setup are concrete-client concerns.
#[async_trait]
pub trait LearningService: Send + Sync {
    /// Fetch the next vocabulary item, or learn that the session is done.
    async fn fetch_next(&self) -> anyhow::Result<Fetched>;

    /// Submit an answer. Returns whether the service graded it the way the
    /// answer intended (correct accepted as correct, wrong marked wrong).
    async fn submit_answer(&self, answer: &Answer) -> anyhow::Result<bool>;

    /// Fetch the learner's grade report.
    async fn fetch_report(&self) -> anyhow::Result<GradeReport>;
}
