//! Wrong-answer synthesis.
//!
//! When the engine decides to answer incorrectly, the generator picks one
//! of three strategies with equal probability: withhold the answer, slip a
//! typo, or substitute a synonym. Every strategy degrades to an empty
//! (withheld) answer when it cannot produce anything plausible.

use crate::traits::{RandomSource, SynonymLookup};

/// Synonym candidates beyond this rank are never selected, however many
/// the lookup returns.
const SYNONYM_POOL_CAP: usize = 3;

const STRATEGY_COUNT: usize = 3;

pub struct WrongAnswerGenerator {
    lookup: Box<dyn SynonymLookup>,
    allow_typo: bool,
    allow_synonym: bool,
    rng: Box<dyn RandomSource>,
}

impl WrongAnswerGenerator {
    pub fn new(
        lookup: Box<dyn SynonymLookup>,
        allow_typo: bool,
        allow_synonym: bool,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            lookup,
            allow_typo,
            allow_synonym,
            rng,
        }
    }

    /// Produce the text to submit for a deliberately wrong answer. An empty
    /// string means the answer is withheld.
    pub async fn generate(&mut self, word: &str) -> String {
        match self.rng.pick(STRATEGY_COUNT) {
            0 => String::new(),
            1 if !self.allow_typo => String::new(),
            1 => drop_doubled_letter(word).unwrap_or_default(),
            _ => {
                if !self.allow_synonym {
                    return String::new();
                }
                self.pick_synonym(word).await
            }
        }
    }

    async fn pick_synonym(&mut self, word: &str) -> String {
        let candidates = match self.lookup.synonyms(word).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(word, "synonym lookup failed: {e:#}");
                return String::new();
            }
        };
        match candidates.len() {
            0 => String::new(),
            1 => candidates.into_iter().next().unwrap_or_default(),
            n => {
                let pool = n.min(SYNONYM_POOL_CAP);
                candidates[self.rng.pick(pool)].clone()
            }
        }
    }
}

/// Remove the first doubled letter, if any: "letter" becomes "leter".
/// Words without a doubled letter yield nothing; no substitution fallback
/// is attempted.
fn drop_doubled_letter(word: &str) -> Option<String> {
    let chars: Vec<char> = word.chars().collect();
    let i = chars.windows(2).position(|pair| pair[0] == pair[1])?;
    let mut out = String::with_capacity(word.len());
    out.extend(&chars[..i]);
    out.extend(&chars[i + 1..]);
    Some(out)
}
