use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use log::warn;
use thiserror::Error;

/// Wire format for calendar dates in the store file.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Known columns, in fixed order. Anything after these is carried along
/// untouched so hand-edited files keep their extra columns.
const COLUMNS: [&str; 5] = ["word", "phrase", "streak", "last_reviewed", "mastered"];

/// One word being learned, as persisted in a user's CSV file.
///
/// `mastered` is a cached value derived from the streak; only
/// [`crate::review::ReviewRules::apply_outcome`] ever flips it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub word: String,
    pub phrase: String,
    pub streak: u32,
    pub last_reviewed: Option<NaiveDate>,
    pub mastered: bool,
    /// Unknown columns found in the file, as (header, value) pairs.
    pub extras: Vec<(String, String)>,
}

impl WordRecord {
    pub fn new(word: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            phrase: phrase.into(),
            streak: 0,
            last_reviewed: None,
            mastered: false,
            extras: Vec::new(),
        }
    }

    pub fn reviewed_on(&self, date: NaiveDate) -> bool {
        self.last_reviewed == Some(date)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),
    #[error("store format error: {0}")]
    Csv(#[from] csv::Error),
}

/// A row that could not be turned into a [`WordRecord`]. These are
/// skipped on load, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct CorruptRow {
    pub line: u64,
    pub reason: String,
}

/// What a load produced: the usable records in file order, plus the rows
/// that had to be skipped so the caller can warn the user.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub records: Vec<WordRecord>,
    pub skipped: Vec<CorruptRow>,
}

/// CSV-backed store for one user's words.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing file is a first run, not an error.
    /// Malformed rows are skipped and reported in the outcome.
    pub fn load(&self) -> Result<LoadOutcome, StoreError> {
        if !self.path.exists() {
            return Ok(LoadOutcome::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();

        let mut outcome = LoadOutcome::default();
        for row in reader.records() {
            match row {
                Ok(record) => {
                    let line = record.position().map(|p| p.line()).unwrap_or(0);
                    match parse_row(&headers, &record) {
                        Ok(parsed) => outcome.records.push(parsed),
                        Err(reason) => outcome.skipped.push(CorruptRow { line, reason }),
                    }
                }
                Err(err) => outcome.skipped.push(CorruptRow {
                    line: err.position().map(|p| p.line()).unwrap_or(0),
                    reason: err.to_string(),
                }),
            }
        }

        for skipped in &outcome.skipped {
            warn!("{}: skipping row, {}", self.path.display(), skipped);
        }
        Ok(outcome)
    }

    /// Write the full ordered sequence, atomically: the new contents go
    /// to a temp file in the same directory which is then renamed over
    /// the store, so a crash mid-write never corrupts existing progress.
    pub fn save(&self, records: &[WordRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("csv.tmp");

        let extra_headers = extra_headers(records);
        let mut writer = csv::Writer::from_path(&tmp)?;

        let mut header: Vec<&str> = COLUMNS.to_vec();
        header.extend(extra_headers.iter().map(String::as_str));
        writer.write_record(&header)?;

        for record in records {
            let mut row = vec![
                record.word.clone(),
                record.phrase.clone(),
                record.streak.to_string(),
                record
                    .last_reviewed
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                record.mastered.to_string(),
            ];
            for name in &extra_headers {
                let value = record
                    .extras
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default();
                row.push(value);
            }
            writer.write_record(&row)?;
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Replace the matching record (by word) in `records`, or append it,
    /// then save. Called after every answered word so progress survives
    /// an interruption right after the answer.
    pub fn upsert_and_save(
        &self,
        records: &mut Vec<WordRecord>,
        record: WordRecord,
    ) -> Result<(), StoreError> {
        match records.iter_mut().find(|r| r.word == record.word) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.save(records)
    }
}

/// Add-mode helper: create a record for `word`, or update the phrase of
/// an existing one. Review progress is deliberately left alone so that
/// editing a phrase never un-masters a word. Returns true when a new
/// record was created.
pub fn upsert_word(records: &mut Vec<WordRecord>, word: &str, phrase: &str) -> bool {
    let word = word.trim();
    let phrase = phrase.trim();
    match records.iter_mut().find(|r| r.word == word) {
        Some(existing) => {
            existing.phrase = phrase.to_string();
            false
        }
        None => {
            records.push(WordRecord::new(word, phrase));
            true
        }
    }
}

fn parse_row(headers: &StringRecord, row: &StringRecord) -> Result<WordRecord, String> {
    if row.len() < COLUMNS.len() {
        return Err(format!(
            "expected at least {} columns, found {}",
            COLUMNS.len(),
            row.len()
        ));
    }

    let word = row[0].trim().to_string();
    if word.is_empty() {
        return Err("empty word".to_string());
    }

    let streak: u32 = row[2]
        .trim()
        .parse()
        .map_err(|_| format!("invalid streak {:?}", &row[2]))?;

    let last_reviewed = match row[3].trim() {
        "" => None,
        s => Some(
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|_| format!("invalid date {s:?}"))?,
        ),
    };

    let mastered = match row[4].trim() {
        "true" => true,
        "false" => false,
        other => return Err(format!("invalid mastered flag {other:?}")),
    };

    let extras = (COLUMNS.len()..row.len())
        .map(|i| {
            (
                headers.get(i).unwrap_or_default().to_string(),
                row[i].to_string(),
            )
        })
        .collect();

    Ok(WordRecord {
        word,
        phrase: row[1].to_string(),
        streak,
        last_reviewed,
        mastered,
        extras,
    })
}

fn extra_headers(records: &[WordRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for record in records {
        for (name, _) in &record.extras {
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }
        }
    }
    names
}
