use chrono::NaiveDate;
use itertools::Itertools;

use crate::review::ReviewRules;
use crate::store::WordRecord;

/// One row of the list-mode report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordOverview {
    pub word: String,
    pub streak: u32,
    pub last_reviewed: Option<NaiveDate>,
    pub reviewed_today: bool,
}

impl WordOverview {
    fn of(record: &WordRecord, today: NaiveDate) -> Self {
        Self {
            word: record.word.clone(),
            streak: record.streak,
            last_reviewed: record.last_reviewed,
            reviewed_today: record.reviewed_on(today),
        }
    }
}

/// Everything list mode prints: words still in training (those waiting
/// for today's review first, alphabetical within each group), mastered
/// words alphabetically, and the due count for the banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overview {
    pub in_progress: Vec<WordOverview>,
    pub mastered: Vec<WordOverview>,
    pub due_count: usize,
}

pub fn overview(records: &[WordRecord], today: NaiveDate, rules: &ReviewRules) -> Overview {
    let in_progress = records
        .iter()
        .filter(|r| !r.mastered)
        .map(|r| WordOverview::of(r, today))
        .sorted_by_key(|o| (o.reviewed_today, o.word.to_lowercase()))
        .collect();
    let mastered = records
        .iter()
        .filter(|r| r.mastered)
        .map(|r| WordOverview::of(r, today))
        .sorted_by_key(|o| o.word.to_lowercase())
        .collect();
    let due_count = records.iter().filter(|r| rules.is_due(r, today)).count();

    Overview {
        in_progress,
        mastered,
        due_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(word: &str, streak: u32, last: Option<NaiveDate>, mastered: bool) -> WordRecord {
        WordRecord {
            streak,
            last_reviewed: last,
            mastered,
            ..WordRecord::new(word, "")
        }
    }

    #[test]
    fn partitions_in_progress_and_mastered() {
        let today = date(2026, 8, 7);
        let records = vec![
            record("open", 1, Some(date(2026, 8, 6)), false),
            record("won", 5, Some(date(2026, 8, 1)), true),
        ];

        let overview = overview(&records, today, &ReviewRules::default());
        assert_eq!(overview.in_progress.len(), 1);
        assert_eq!(overview.in_progress[0].word, "open");
        assert_eq!(overview.mastered.len(), 1);
        assert_eq!(overview.mastered[0].word, "won");
        assert_eq!(overview.due_count, 1);
    }

    #[test]
    fn words_waiting_today_come_before_finished_ones() {
        let today = date(2026, 8, 7);
        let records = vec![
            record("aaa", 2, Some(today), false),
            record("zzz", 0, None, false),
            record("mmm", 1, Some(date(2026, 8, 6)), false),
        ];

        let overview = overview(&records, today, &ReviewRules::default());
        let words: Vec<&str> = overview.in_progress.iter().map(|o| o.word.as_str()).collect();
        // Still-due words alphabetically, then the one already done today.
        assert_eq!(words, vec!["mmm", "zzz", "aaa"]);
        assert!(overview.in_progress[2].reviewed_today);
        assert_eq!(overview.due_count, 2);
    }

    #[test]
    fn mastered_words_sort_alphabetically_ignoring_case() {
        let today = date(2026, 8, 7);
        let records = vec![
            record("Zug", 5, Some(date(2026, 8, 1)), true),
            record("apfel", 5, Some(date(2026, 8, 2)), true),
        ];

        let overview = overview(&records, today, &ReviewRules::default());
        let words: Vec<&str> = overview.mastered.iter().map(|o| o.word.as_str()).collect();
        assert_eq!(words, vec!["apfel", "Zug"]);
        assert_eq!(overview.due_count, 0);
    }
}
