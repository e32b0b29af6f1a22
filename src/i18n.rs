use std::collections::HashMap;
use std::path::Path;

use include_dir::{include_dir, Dir};
use serde::Deserialize;

static LOCALE_DIR: Dir = include_dir!("src/locales");

/// UI language of the drill. The store file itself is language-neutral;
/// this only selects prompt and feedback text (and the TTS voice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiLanguage {
    #[default]
    English,
    German,
}

impl UiLanguage {
    /// Primary language tag, as handed to the speech engine.
    pub fn tag(&self) -> &'static str {
        match self {
            UiLanguage::English => "en",
            UiLanguage::German => "de",
        }
    }

    /// Unknown tags fall back to English rather than failing; bad CLI
    /// values are already rejected at parse time.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "de" => UiLanguage::German,
            _ => UiLanguage::English,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LocaleRow {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "English")]
    english: String,
    #[serde(rename = "German")]
    german: String,
}

/// UI strings for one language, looked up by semantic key.
#[derive(Debug, Clone)]
pub struct Catalog {
    language: UiLanguage,
    table: HashMap<String, (String, String)>,
}

impl Catalog {
    /// The compiled-in translation table.
    pub fn builtin(language: UiLanguage) -> Self {
        let file = LOCALE_DIR
            .get_file("locales.csv")
            .expect("locale table not found");
        let contents = file
            .contents_utf8()
            .expect("unable to interpret locale table as a string");
        Self::from_reader(language, contents.as_bytes()).expect("unable to parse locale table")
    }

    /// A translation table from an external `Key,English,German` CSV,
    /// for users who want to adjust or extend the wording.
    pub fn from_csv_path<P: AsRef<Path>>(language: UiLanguage, path: P) -> Result<Self, csv::Error> {
        let contents = std::fs::read(path.as_ref()).map_err(csv::Error::from)?;
        Self::from_reader(language, contents.as_slice())
    }

    fn from_reader(language: UiLanguage, reader: impl std::io::Read) -> Result<Self, csv::Error> {
        let mut table = HashMap::new();
        for row in csv::Reader::from_reader(reader).deserialize::<LocaleRow>() {
            let row = row?;
            table.insert(row.key, (row.english, row.german));
        }
        Ok(Self { language, table })
    }

    pub fn language(&self) -> UiLanguage {
        self.language
    }

    /// Display text for `key`. A missing key renders the key itself,
    /// which makes gaps obvious during development; a missing cell
    /// falls back to English.
    pub fn t(&self, key: &str) -> String {
        match self.table.get(key) {
            Some((english, german)) => {
                let text = match self.language {
                    UiLanguage::English => english,
                    UiLanguage::German => german,
                };
                if text.is_empty() {
                    english.clone()
                } else {
                    text.clone()
                }
            }
            None => key.to_string(),
        }
    }

    /// `t`, with `{name}` placeholders substituted. Placeholders without
    /// a matching variable are left in place rather than panicking.
    pub fn t_with(&self, key: &str, vars: &[(&str, String)]) -> String {
        let mut text = self.t(key);
        for (name, value) in vars {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn builtin_lookup_in_both_languages() {
        let en = Catalog::builtin(UiLanguage::English);
        let de = Catalog::builtin(UiLanguage::German);
        assert_eq!(en.t("correct"), "Correct!");
        assert_eq!(de.t("correct"), "Richtig!");
    }

    #[test]
    fn unknown_key_renders_the_key() {
        let catalog = Catalog::builtin(UiLanguage::English);
        assert_eq!(catalog.t("no_such_key"), "no_such_key");
    }

    #[test]
    fn missing_translation_falls_back_to_english() {
        let csv = "Key,English,German\nhalf_done,Only English,\n";
        let catalog = Catalog::from_reader(UiLanguage::German, csv.as_bytes()).unwrap();
        assert_eq!(catalog.t("half_done"), "Only English");
    }

    #[test]
    fn placeholders_are_substituted() {
        let catalog = Catalog::builtin(UiLanguage::English);
        let text = catalog.t_with(
            "correct_streak",
            &[("streak", "3".to_string()), ("target", "5".to_string())],
        );
        assert_eq!(text, "Correct! Streak 3 of 5.");
    }

    #[test]
    fn missing_variables_leave_placeholders_visible() {
        let catalog = Catalog::builtin(UiLanguage::English);
        let text = catalog.t_with("correct_streak", &[("streak", "3".to_string())]);
        assert!(text.contains("{target}"));
    }

    #[test]
    fn override_file_replaces_builtin_wording() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.csv");
        fs::write(&path, "Key,English,German\ncorrect,Nice!,Super!\n").unwrap();

        let catalog = Catalog::from_csv_path(UiLanguage::German, &path).unwrap();
        assert_eq!(catalog.t("correct"), "Super!");
    }

    #[test]
    fn language_tags_for_speech() {
        assert_eq!(UiLanguage::English.tag(), "en");
        assert_eq!(UiLanguage::German.tag(), "de");
    }

    #[test]
    fn tags_round_trip_and_unknown_falls_back() {
        assert_eq!(UiLanguage::from_tag("de"), UiLanguage::German);
        assert_eq!(UiLanguage::from_tag("en"), UiLanguage::English);
        assert_eq!(UiLanguage::from_tag("fr"), UiLanguage::English);
    }

    #[test]
    fn builtin_table_covers_the_session_keys() {
        let catalog = Catalog::builtin(UiLanguage::English);
        for key in [
            "no_words_due",
            "all_done_today",
            "review_start",
            "progress",
            "type_word",
            "wrong",
            "expected",
            "done",
            "skipped_rows",
            "save_failed",
        ] {
            assert_ne!(catalog.t(key), key, "missing locale key {key}");
        }
    }
}
