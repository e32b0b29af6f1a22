use std::io;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::review::ReviewRules;
use crate::store::{FileStore, StoreError, WordRecord};

/// Typing this instead of an answer re-presents the prompt; it does not
/// count as an attempt.
pub const REPLAY_TOKEN: &str = "?";
/// Typing this ends the session; the current word stays untouched.
pub const QUIT_TOKEN: &str = "exitnow";

/// One line of learner input, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Typed(String),
    Replay,
    Quit,
}

impl Answer {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed == REPLAY_TOKEN {
            Answer::Replay
        } else if trimmed.eq_ignore_ascii_case(QUIT_TOKEN) {
            Answer::Quit
        } else {
            Answer::Typed(trimmed.to_string())
        }
    }
}

/// Where the learner is in the queue; positions are 1-based for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

/// The console (and speech) side of a review session. The driver calls
/// `ask` once per due word and reports each verdict back; swapping this
/// out keeps the loop testable without a terminal.
pub trait SessionIo {
    /// Present the prompt for `record` and return the learner's answer.
    /// Called again after a replay request.
    fn ask(&mut self, record: &WordRecord, progress: Progress) -> io::Result<Answer>;
    /// `record` is the post-outcome state (streak already advanced).
    fn report_correct(&mut self, record: &WordRecord, rules: &ReviewRules);
    fn report_incorrect(&mut self, record: &WordRecord, rules: &ReviewRules);
    /// The answer was applied in memory but could not be persisted.
    fn report_save_failed(&mut self, record: &WordRecord, err: &StoreError);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Present the due words in random order, the way the interactive
    /// review command does. Off in tests for reproducible sessions.
    pub shuffle: bool,
    /// Review at most this many words.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub answered: usize,
    pub correct: usize,
    pub newly_mastered: usize,
    pub quit_early: bool,
}

/// Run one review pass over the due subset of `records`.
///
/// Every answered word is persisted before the next prompt, so quitting
/// (or crashing) between words loses nothing. The answer comparison is
/// whitespace-trimmed and case-sensitive; correct capitalization is part
/// of the drill.
pub fn run_review<IO: SessionIo>(
    records: &mut Vec<WordRecord>,
    today: NaiveDate,
    rules: ReviewRules,
    store: &FileStore,
    io: &mut IO,
    options: SessionOptions,
) -> Result<SessionSummary, StoreError> {
    let mut queue = rules.due_indices(records, today);
    if options.shuffle {
        queue.shuffle(&mut thread_rng());
    }
    if let Some(limit) = options.limit {
        queue.truncate(limit);
    }

    let total = queue.len();
    let mut summary = SessionSummary::default();

    for (position, &idx) in queue.iter().enumerate() {
        let progress = Progress {
            position: position + 1,
            total,
        };

        let typed = loop {
            match io.ask(&records[idx], progress)? {
                Answer::Replay => continue,
                Answer::Quit => {
                    summary.quit_early = true;
                    return Ok(summary);
                }
                Answer::Typed(text) => break text,
            }
        };

        let correct = typed.trim() == records[idx].word;
        let was_mastered = records[idx].mastered;
        let updated = rules.apply_outcome(&records[idx], today, correct);

        if let Err(err) = store.upsert_and_save(records, updated.clone()) {
            io.report_save_failed(&updated, &err);
            return Err(err);
        }

        summary.answered += 1;
        if correct {
            summary.correct += 1;
            if updated.mastered && !was_mastered {
                summary.newly_mastered += 1;
            }
            io.report_correct(&updated, &rules);
        } else {
            io.report_incorrect(&updated, &rules);
        }
    }

    Ok(summary)
}

/// The example phrase with every occurrence of the word blanked out, so
/// the on-screen hint never gives the spelling away. Returns `None` for
/// an empty phrase. Matching ignores case but not word boundaries.
pub fn mask_word(phrase: &str, word: &str) -> Option<String> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return None;
    }
    if word.is_empty() {
        return Some(phrase.to_string());
    }

    let hay: Vec<char> = phrase.chars().collect();
    let needle: Vec<char> = word.chars().collect();
    let blank = "_".repeat(needle.len());

    let mut out = String::with_capacity(phrase.len());
    let mut i = 0;
    while i < hay.len() {
        let matches = i + needle.len() <= hay.len()
            && hay[i..i + needle.len()]
                .iter()
                .zip(&needle)
                .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()));
        if matches {
            out.push_str(&blank);
            i += needle.len();
        } else {
            out.push(hay[i]);
            i += 1;
        }
    }
    Some(out)
}
