//! The answer-decision engine.
//!
//! One `DecisionEngine` value holds all mutable state of a run: the
//! schedule, the run-scoped mistake ledger, the word progress store, and
//! the injected randomness. Runs for different users get independent
//! engine values; nothing here is ambient or shared.

use std::path::Path;

use crate::error::ProgressError;
use crate::model::{
    AttemptIndex, Decision, MistakeLedger, ScheduleTable, SessionIndex,
};
use crate::progress::WordProgressStore;
use crate::traits::RandomSource;

pub struct DecisionEngine {
    schedule: ScheduleTable,
    ledger: MistakeLedger,
    store: WordProgressStore,
    rng: Box<dyn RandomSource>,
}

impl DecisionEngine {
    pub fn new(
        schedule: ScheduleTable,
        store: WordProgressStore,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let ledger = MistakeLedger::new(&schedule);
        Self {
            schedule,
            ledger,
            store,
            rng,
        }
    }

    /// Decide whether this presentation of `word_id` is answered correctly,
    /// updating progress and the ledger.
    ///
    /// Correct is forced when the word is mastered, already resolved this
    /// session, past its configured schedule, or its cell's mistake ceiling
    /// is spent. Otherwise the cell's risk percentage decides.
    pub fn decide(&mut self, word_id: &str) -> Decision {
        let progress = self.store.get(word_id);

        let mut mistake_cell = None;
        if let (SessionIndex::Active(row), AttemptIndex::Active(col)) =
            (progress.session, progress.attempt)
        {
            if let Some(cell) = self.schedule.cell_at(row, col) {
                if self.ledger.has_capacity(row, col, cell.max_mistakes)
                    && self.rng.percent() <= cell.risk_percentage
                {
                    mistake_cell = Some((row, col));
                }
            }
        }

        match mistake_cell {
            Some((row, col)) => {
                self.ledger.record(row, col);
                self.store.record_mistake(word_id);
                tracing::debug!(word_id, row, col, "deliberate mistake");
                Decision::Incorrect
            }
            None => {
                // A correct answer on the very first attempt of a session
                // masters the word for good.
                if progress.attempt == AttemptIndex::Active(0) {
                    self.store.record_mastery(word_id);
                }
                self.store.record_session_done(word_id);
                tracing::debug!(word_id, "answering correctly");
                Decision::Correct
            }
        }
    }

    /// Remember a word's translation the first time it is seen.
    pub fn record_translation(&mut self, word: &str, translation: &str) {
        self.store.record_translation(word, translation);
    }

    /// Advance every still-active word into the next session and persist
    /// the store. Persistence failure is fatal for the run.
    pub fn finalize_session(&mut self, dir: &Path) -> Result<(), ProgressError> {
        self.store.advance_all_for_next_session();
        self.store.save(dir)
    }

    pub fn store(&self) -> &WordProgressStore {
        &self.store
    }

    pub fn ledger(&self) -> &MistakeLedger {
        &self.ledger
    }
}
