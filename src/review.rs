use chrono::NaiveDate;

use crate::store::WordRecord;

/// Consecutive correct days needed before a word counts as mastered.
pub const MASTERY_STREAK: u32 = 5;

/// The fixed once-per-day review gate and mastery threshold. The
/// threshold is carried here rather than read at call sites so tests can
/// exercise the state machine with a small one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewRules {
    pub mastery_streak: u32,
}

impl Default for ReviewRules {
    fn default() -> Self {
        Self {
            mastery_streak: MASTERY_STREAK,
        }
    }
}

impl ReviewRules {
    /// A word is due when it is not mastered and has not been reviewed
    /// today. A `last_reviewed` in the future (clock moved backwards)
    /// also reads as not due: a free extra review is never granted.
    pub fn is_due(&self, record: &WordRecord, today: NaiveDate) -> bool {
        !record.mastered && record.last_reviewed.map_or(true, |last| last < today)
    }

    /// Outcome of one review attempt, as a new record value. The caller
    /// persists it; nothing is mutated here.
    pub fn apply_outcome(&self, record: &WordRecord, today: NaiveDate, correct: bool) -> WordRecord {
        let streak = if correct {
            record.streak.saturating_add(1)
        } else {
            0
        };
        WordRecord {
            streak,
            last_reviewed: Some(today),
            mastered: streak >= self.mastery_streak,
            ..record.clone()
        }
    }

    /// Indices of the due records, in file order.
    pub fn due_indices(&self, records: &[WordRecord], today: NaiveDate) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.is_due(r, today))
            .map(|(i, _)| i)
            .collect()
    }
}
