//! In-memory service doubles for testing the session loop without a
//! network.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use lingbot_core::traits::{
    Answer, Fetched, GradeReport, LearningService, Presentation, SynonymLookup,
};

/// A scripted learning service: hands out a fixed list of presentations,
/// then reports the session complete. Accepts every answer and records
/// what was submitted.
pub struct MockLearningService {
    queue: Mutex<Vec<Fetched>>,
    submitted: Mutex<Vec<Answer>>,
    report: GradeReport,
    fetch_count: AtomicU32,
}

impl MockLearningService {
    pub fn new(presentations: Vec<Presentation>) -> Self {
        let mut queue: Vec<Fetched> = presentations.into_iter().map(Fetched::Word).collect();
        queue.push(Fetched::SessionComplete);
        queue.reverse();
        Self {
            queue: Mutex::new(queue),
            submitted: Mutex::new(Vec::new()),
            report: GradeReport::default(),
            fetch_count: AtomicU32::new(0),
        }
    }

    pub fn with_report(mut self, report: GradeReport) -> Self {
        self.report = report;
        self
    }

    /// Answers submitted so far, in order.
    pub fn submitted(&self) -> Vec<Answer> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LearningService for MockLearningService {
    async fn fetch_next(&self) -> anyhow::Result<Fetched> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .queue
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Fetched::SessionComplete))
    }

    async fn submit_answer(&self, answer: &Answer) -> anyhow::Result<bool> {
        self.submitted.lock().unwrap().push(answer.clone());
        Ok(true)
    }

    async fn fetch_report(&self) -> anyhow::Result<GradeReport> {
        Ok(self.report.clone())
    }
}

/// A synonym source that returns the same candidate list for every word.
pub struct CannedSynonyms {
    candidates: Vec<String>,
}

impl CannedSynonyms {
    pub fn new(candidates: &[&str]) -> Self {
        Self {
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl SynonymLookup for CannedSynonyms {
    async fn synonyms(&self, _word: &str) -> anyhow::Result<Vec<String>> {
        Ok(self.candidates.clone())
    }
}
