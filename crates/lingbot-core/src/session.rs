//! The sequential session loop.
//!
//! Words are fetched, decided, and answered strictly one at a time: the
//! service only reveals the next word after the previous answer lands.
//! Aborting between presentations is safe because nothing is persisted
//! until `DecisionEngine::finalize_session` runs.

use std::time::Duration;

use crate::answer::WrongAnswerGenerator;
use crate::engine::DecisionEngine;
use crate::model::Decision;
use crate::traits::{Answer, Fetched, LearningService};

/// Counters for one completed session run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Words answered in total.
    pub answered: u32,
    /// Words answered correctly (including forced-correct).
    pub correct: u32,
    /// Deliberate mistakes submitted.
    pub mistakes: u32,
    /// Submissions the service graded differently than intended.
    pub rejected: u32,
}

/// Drive one session to completion: fetch, decide, synthesize, submit,
/// until the service reports the session done.
///
/// `delay_ms` is an optional inclusive range slept before each submission
/// so the pacing resembles a human typing.
pub async fn run_session<S>(
    engine: &mut DecisionEngine,
    generator: &mut WrongAnswerGenerator,
    service: &S,
    delay_ms: Option<(u64, u64)>,
) -> anyhow::Result<SessionSummary>
where
    S: LearningService + ?Sized,
{
    let mut summary = SessionSummary::default();

    loop {
        let presentation = match service.fetch_next().await? {
            Fetched::SessionComplete => break,
            Fetched::Word(presentation) => presentation,
        };
        engine.record_translation(&presentation.word, &presentation.translation);

        let decision = engine.decide(&presentation.word_id);
        let answer_text = match decision {
            Decision::Correct => presentation.word.clone(),
            Decision::Incorrect => generator.generate(&presentation.word).await,
        };

        if let Some((min, max)) = delay_ms {
            let wait = rand::Rng::gen_range(&mut rand::thread_rng(), min..=max.max(min));
            tokio::time::sleep(Duration::from_millis(wait)).await;
        }

        let answer = Answer {
            word_id: presentation.word_id,
            word: presentation.word,
            answer_text,
        };
        let accepted = service.submit_answer(&answer).await?;

        summary.answered += 1;
        match decision {
            Decision::Correct => summary.correct += 1,
            Decision::Incorrect => summary.mistakes += 1,
        }
        if !accepted {
            summary.rejected += 1;
            tracing::warn!(
                word_id = %answer.word_id,
                "service graded the answer differently than intended"
            );
        }
    }

    Ok(summary)
}
