//! lingbot-core — Adaptive answer-decision and mistake-generation engine.
//!
//! This crate holds the behavioral heart of lingbot: per-word progress
//! tracking across sessions, probabilistic correct/incorrect decisions
//! under a configurable risk schedule, and plausible wrong-answer
//! synthesis. All I/O lives behind the traits in [`traits`].

pub mod answer;
pub mod engine;
pub mod error;
pub mod model;
pub mod progress;
pub mod session;
pub mod traits;

pub use answer::WrongAnswerGenerator;
pub use engine::DecisionEngine;
pub use error::{ProgressError, ScheduleError, ServiceError};
pub use model::{
    AttemptIndex, Decision, MistakeCeiling, MistakeLedger, ScheduleCell, ScheduleTable,
    SessionIndex, WordProgress,
};
pub use progress::WordProgressStore;
pub use session::{run_session, SessionSummary};
pub use traits::{
    Answer, Fetched, GradeReport, LearningService, Presentation, RandomSource, ScriptedRandom,
    SynonymLookup, ThreadRandom,
};
