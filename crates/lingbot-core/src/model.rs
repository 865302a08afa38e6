//! Core data model types for lingbot.
//!
//! The mistake schedule, the per-run mistake ledger, and the per-word
//! progress state that the decision engine operates on.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScheduleError;

/// Ceiling on deliberate mistakes at a single schedule cell.
///
/// Encoded as `-1` (unbounded) or a non-negative count in configuration,
/// matching the durable format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MistakeCeiling {
    Unbounded,
    AtMost(u32),
}

impl Serialize for MistakeCeiling {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MistakeCeiling::Unbounded => serializer.serialize_i64(-1),
            MistakeCeiling::AtMost(n) => serializer.serialize_i64(i64::from(*n)),
        }
    }
}

impl<'de> Deserialize<'de> for MistakeCeiling {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match i64::deserialize(deserializer)? {
            -1 => Ok(MistakeCeiling::Unbounded),
            n if (0..=i64::from(u32::MAX)).contains(&n) => Ok(MistakeCeiling::AtMost(n as u32)),
            n => Err(D::Error::custom(format!("invalid mistake ceiling: {n}"))),
        }
    }
}

/// One cell of the mistake schedule: the chance a presentation at this cell
/// is answered incorrectly, and how many deliberate mistakes the run may
/// spend here in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleCell {
    /// Percent chance (1–100) of a deliberate mistake.
    pub risk_percentage: u8,
    /// Run-wide ceiling on mistakes at this cell.
    pub max_mistakes: MistakeCeiling,
}

/// The mistake schedule: one row per session index, one column per attempt
/// index. Immutable once validated; indices that fall outside the table mean
/// the word has graduated past its configured schedule.
#[derive(Debug, Clone)]
pub struct ScheduleTable {
    rows: Vec<Vec<ScheduleCell>>,
}

impl ScheduleTable {
    /// Validate and build a schedule. Every cell's risk must be in 1–100.
    pub fn from_rows(rows: Vec<Vec<ScheduleCell>>) -> Result<Self, ScheduleError> {
        for (row, cells) in rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if !(1..=100).contains(&cell.risk_percentage) {
                    return Err(ScheduleError::RiskOutOfRange {
                        row,
                        col,
                        risk: cell.risk_percentage,
                    });
                }
            }
        }
        Ok(Self { rows })
    }

    /// Look up the cell for a (session, attempt) pair. `None` is graduation,
    /// not an error.
    pub fn cell_at(&self, row: u32, col: u32) -> Option<&ScheduleCell> {
        self.rows.get(row as usize)?.get(col as usize)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }
}

/// Run-scoped counters of deliberate mistakes, one per schedule cell.
///
/// The ledger is shared across every word of a run: ceilings throttle the
/// total deception volume per cell, not per word. It is created fresh from
/// the schedule's shape at startup and never persisted.
#[derive(Debug, Clone)]
pub struct MistakeLedger {
    counts: Vec<Vec<u32>>,
}

impl MistakeLedger {
    pub fn new(schedule: &ScheduleTable) -> Self {
        let counts = (0..schedule.row_count())
            .map(|row| vec![0; schedule.row_len(row)])
            .collect();
        Self { counts }
    }

    pub fn count(&self, row: u32, col: u32) -> u32 {
        self.counts
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Whether another deliberate mistake fits under the cell's ceiling.
    pub fn has_capacity(&self, row: u32, col: u32, ceiling: MistakeCeiling) -> bool {
        match ceiling {
            MistakeCeiling::Unbounded => true,
            MistakeCeiling::AtMost(max) => self.count(row, col) < max,
        }
    }

    pub fn record(&mut self, row: u32, col: u32) {
        self.counts[row as usize][col as usize] += 1;
    }
}

/// Which schedule row a word sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionIndex {
    /// Number of completed sessions the word has appeared in.
    Active(u32),
    /// The word permanently exited the schedule; it is never again
    /// deliberately answered incorrectly.
    Mastered,
}

/// Which schedule column a word sits on within the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptIndex {
    /// Number of incorrect responses already given this session.
    Active(u32),
    /// The word was resolved for this session; forces correct until the
    /// next session advances it.
    DoneForSession,
}

/// Per-word learning progress. The two fields are independently
/// sentinel-able: a word can be mastered regardless of its attempt state
/// and done-for-session regardless of its session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordProgress {
    pub session: SessionIndex,
    pub attempt: AttemptIndex,
}

impl WordProgress {
    /// Fresh progress for a word seen for the first time.
    pub fn new() -> Self {
        Self {
            session: SessionIndex::Active(0),
            attempt: AttemptIndex::Active(0),
        }
    }
}

impl Default for WordProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a single answer decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Correct,
    Incorrect,
}
