//! Per-word progress tracking and its durable form.
//!
//! The store owns two maps: word id → progress, and word text → translation.
//! Only session indices and translations are persisted; attempt state and
//! the mistake ledger are run-scoped and die with the process.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::ProgressError;
use crate::model::{AttemptIndex, SessionIndex, WordProgress};

const HISTORY_FILE: &str = "wordsHistory.json";
const DICTIONARY_FILE: &str = "wordsDictionary.json";

/// Mastered words are encoded as `-1` in the durable history file, keeping
/// progress files from earlier versions of the bot readable.
const MASTERED_SENTINEL: i64 = -1;

#[derive(Debug, Default)]
pub struct WordProgressStore {
    words: HashMap<String, WordProgress>,
    translations: BTreeMap<String, String>,
}

impl WordProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current progress for a word, creating fresh default progress the
    /// first time an id is seen.
    pub fn get(&mut self, word_id: &str) -> WordProgress {
        *self
            .words
            .entry(word_id.to_string())
            .or_insert_with(WordProgress::new)
    }

    /// Progress without auto-creation.
    pub fn progress_of(&self, word_id: &str) -> Option<&WordProgress> {
        self.words.get(word_id)
    }

    /// The word accrued one more deliberate mistake this session.
    pub fn record_mistake(&mut self, word_id: &str) {
        let progress = self.words.entry(word_id.to_string()).or_default();
        if let AttemptIndex::Active(n) = progress.attempt {
            progress.attempt = AttemptIndex::Active(n + 1);
        }
    }

    /// The word permanently exits the schedule.
    pub fn record_mastery(&mut self, word_id: &str) {
        self.words.entry(word_id.to_string()).or_default().session = SessionIndex::Mastered;
    }

    /// The word is resolved for the current session.
    pub fn record_session_done(&mut self, word_id: &str) {
        self.words.entry(word_id.to_string()).or_default().attempt = AttemptIndex::DoneForSession;
    }

    /// Remember a word's translation. First seen wins; later sightings
    /// never overwrite.
    pub fn record_translation(&mut self, word: &str, translation: &str) {
        self.translations
            .entry(word.to_string())
            .or_insert_with(|| translation.to_string());
    }

    pub fn translation(&self, word: &str) -> Option<&str> {
        self.translations.get(word).map(String::as_str)
    }

    pub fn tracked_words(&self) -> usize {
        self.words.len()
    }

    /// Move every non-mastered word to the next session row and clear the
    /// per-session attempt state.
    pub fn advance_all_for_next_session(&mut self) {
        for progress in self.words.values_mut() {
            if let SessionIndex::Active(n) = progress.session {
                progress.session = SessionIndex::Active(n + 1);
            }
            progress.attempt = AttemptIndex::Active(0);
        }
    }

    /// Write session indices and the translation dictionary to `dir`.
    ///
    /// Attempt state is deliberately not persisted; it restarts at zero
    /// next run.
    pub fn save(&self, dir: &Path) -> Result<(), ProgressError> {
        std::fs::create_dir_all(dir).map_err(|source| ProgressError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let history: BTreeMap<&str, i64> = self
            .words
            .iter()
            .map(|(id, progress)| {
                let encoded = match progress.session {
                    SessionIndex::Mastered => MASTERED_SENTINEL,
                    SessionIndex::Active(n) => i64::from(n),
                };
                (id.as_str(), encoded)
            })
            .collect();

        write_json(&dir.join(HISTORY_FILE), &history)?;
        write_json(&dir.join(DICTIONARY_FILE), &self.translations)?;
        Ok(())
    }

    /// Load a store from `dir`. Missing files mean a first run and yield an
    /// empty store; unreadable files are errors.
    pub fn load(dir: &Path) -> Result<Self, ProgressError> {
        let history: BTreeMap<String, i64> =
            read_json_or_default(&dir.join(HISTORY_FILE))?;
        let translations: BTreeMap<String, String> =
            read_json_or_default(&dir.join(DICTIONARY_FILE))?;

        let words = history
            .into_iter()
            .map(|(id, encoded)| {
                let session = if encoded < 0 {
                    SessionIndex::Mastered
                } else {
                    SessionIndex::Active(encoded as u32)
                };
                (
                    id,
                    WordProgress {
                        session,
                        attempt: AttemptIndex::Active(0),
                    },
                )
            })
            .collect();

        Ok(Self {
            words,
            translations,
        })
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ProgressError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| ProgressError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| ProgressError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json_or_default<T>(path: &Path) -> Result<T, ProgressError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ProgressError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ProgressError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn get_creates_fresh_progress() {
        let mut store = WordProgressStore::new();
        let progress = store.get("w1");
        assert_eq!(progress.session, SessionIndex::Active(0));
        assert_eq!(progress.attempt, AttemptIndex::Active(0));
        assert_eq!(store.tracked_words(), 1);
    }

    #[test]
    fn mistake_and_resolution_transitions() {
        let mut store = WordProgressStore::new();

        store.record_mistake("w1");
        store.record_mistake("w1");
        assert_eq!(store.get("w1").attempt, AttemptIndex::Active(2));

        store.record_session_done("w1");
        assert_eq!(store.get("w1").attempt, AttemptIndex::DoneForSession);
        // Resolved words accrue no further attempts
        store.record_mistake("w1");
        assert_eq!(store.get("w1").attempt, AttemptIndex::DoneForSession);

        store.record_mastery("w1");
        assert_eq!(store.get("w1").session, SessionIndex::Mastered);
    }

    #[test]
    fn translations_are_first_seen_wins() {
        let mut store = WordProgressStore::new();
        store.record_translation("dog", "pies");
        store.record_translation("dog", "suka");
        assert_eq!(store.translation("dog"), Some("pies"));
        assert_eq!(store.translation("cat"), None);
    }

    #[test]
    fn advance_skips_mastered_and_resets_attempts() {
        let mut store = WordProgressStore::new();
        store.get("active");
        store.record_mistake("active");
        store.record_mastery("mastered");
        store.record_session_done("resolved");

        store.advance_all_for_next_session();

        assert_eq!(store.get("active").session, SessionIndex::Active(1));
        assert_eq!(store.get("active").attempt, AttemptIndex::Active(0));
        assert_eq!(store.get("mastered").session, SessionIndex::Mastered);
        assert_eq!(store.get("resolved").session, SessionIndex::Active(1));
        assert_eq!(store.get("resolved").attempt, AttemptIndex::Active(0));

        store.advance_all_for_next_session();
        assert_eq!(store.get("active").session, SessionIndex::Active(2));
        assert_eq!(store.get("mastered").session, SessionIndex::Mastered);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = WordProgressStore::new();
        store.get("fresh");
        store.record_mastery("done");
        store.record_mistake("struggling");
        store.advance_all_for_next_session();
        store.record_translation("dog", "pies");
        store.record_translation("cat", "kot");

        store.save(dir.path()).unwrap();
        let loaded = WordProgressStore::load(dir.path()).unwrap();

        assert_eq!(
            loaded.progress_of("fresh").unwrap().session,
            SessionIndex::Active(1)
        );
        assert_eq!(
            loaded.progress_of("done").unwrap().session,
            SessionIndex::Mastered
        );
        assert_eq!(
            loaded.progress_of("struggling").unwrap().session,
            SessionIndex::Active(1)
        );
        assert_eq!(loaded.translation("dog"), Some("pies"));
        assert_eq!(loaded.translation("cat"), Some("kot"));
    }

    #[test]
    fn mastered_words_encode_as_minus_one() {
        let dir = TempDir::new().unwrap();
        let mut store = WordProgressStore::new();
        store.record_mastery("done");
        store.save(dir.path()).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("wordsHistory.json")).unwrap();
        let history: BTreeMap<String, i64> = serde_json::from_str(&raw).unwrap();
        assert_eq!(history.get("done"), Some(&-1));
    }

    #[test]
    fn load_from_empty_dir_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = WordProgressStore::load(dir.path()).unwrap();
        assert_eq!(store.tracked_words(), 0);
    }

    #[test]
    fn load_surfaces_corrupt_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("wordsHistory.json"), "not json").unwrap();
        let err = WordProgressStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, ProgressError::Parse { .. }));
    }
}
