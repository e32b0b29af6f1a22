use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::style::Stylize;

use stava::app_dirs::{self, AppDirs};
use stava::config::{FileSettingsStore, Settings, SettingsStore};
use stava::i18n::{Catalog, UiLanguage};
use stava::listing;
use stava::review::ReviewRules;
use stava::session::{self, Answer, Progress, SessionIo, SessionOptions};
use stava::speech::{Speaker, APT_INSTALL_CMD};
use stava::store::{upsert_word, FileStore, StoreError, WordRecord};

/// csv-backed spelling trainer with spoken prompts and daily streaks
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A spelling trainer for kids: words are drilled once per day, five correct days in a row master a word. Progress lives in one CSV file per user."
)]
struct Cli {
    /// profile name selecting the word file (e.g. a child's name)
    #[clap(short, long, global = true)]
    user: Option<String>,

    /// directory for the per-user word files
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    /// word file path override (bypasses --user / --data-dir)
    #[clap(long, global = true)]
    file: Option<PathBuf>,

    /// UI language
    #[clap(short, long, value_enum, global = true)]
    language: Option<LanguageArg>,

    /// read prompts aloud through the system TTS engine
    #[clap(short, long, global = true)]
    speak: bool,

    /// translation table override (Key,English,German csv)
    #[clap(long, global = true)]
    i18n_file: Option<PathBuf>,

    /// remember user/language/speak as defaults for the next run
    #[clap(long, global = true)]
    remember: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// add words interactively (type exitnow to stop)
    Add,
    /// run a review session over today's due words
    Review {
        /// review at most N words today
        #[clap(long)]
        limit: Option<usize>,
    },
    /// show words in training and mastered words
    List,
    /// help install a speech engine (Ubuntu/Debian)
    SetupTts {
        /// actually run apt-get (uses sudo)
        #[clap(long)]
        install: bool,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
enum LanguageArg {
    En,
    De,
}

impl LanguageArg {
    fn as_ui_language(&self) -> UiLanguage {
        UiLanguage::from_tag(&self.to_string().to_lowercase())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let settings_store = FileSettingsStore::new();
    let settings = settings_store.load();

    let language = cli
        .language
        .map(|l| l.as_ui_language())
        .unwrap_or_else(|| UiLanguage::from_tag(&settings.language));
    let user = cli.user.clone().or_else(|| settings.user.clone());
    let speak = cli.speak || settings.speak;

    if cli.remember {
        settings_store.save(&Settings {
            user: user.clone(),
            language: language.tag().to_string(),
            speak,
        })?;
    }

    let catalog = match &cli.i18n_file {
        Some(path) => Catalog::from_csv_path(language, path)?,
        None => Catalog::builtin(language),
    };

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(AppDirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("data"));
    let store = FileStore::new(app_dirs::resolve_store_path(
        cli.file.as_deref(),
        user.as_deref(),
        &data_dir,
    ));

    let mut speaker = Speaker::new(speak, language.tag());

    let outcome = store.load()?;
    let mut records = outcome.records;
    if !outcome.skipped.is_empty() {
        eprintln!(
            "{}",
            catalog
                .t_with(
                    "skipped_rows",
                    &[
                        ("count", outcome.skipped.len().to_string()),
                        ("path", store.path().display().to_string()),
                    ],
                )
                .yellow()
        );
    }

    let today = Local::now().date_naive();

    match cli.command {
        Command::Add => run_add(&store, &mut records, &catalog)?,
        Command::List => run_list(&records, today, &catalog, user.as_deref(), &store),
        Command::Review { limit } => run_review_mode(
            &store,
            &mut records,
            today,
            limit,
            &catalog,
            &mut speaker,
            user.as_deref(),
        )?,
        Command::SetupTts { install } => run_setup_tts(install, &catalog),
    }

    Ok(())
}

/// Print a prompt and read one stdin line. `None` means end of input.
fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt} ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn run_add(
    store: &FileStore,
    records: &mut Vec<WordRecord>,
    catalog: &Catalog,
) -> Result<(), Box<dyn Error>> {
    println!("{}\n", catalog.t("add_title").bold());

    loop {
        let Some(word) = read_line(&catalog.t("word_prompt"))? else {
            break;
        };
        let word = word.trim().to_string();
        if word.is_empty() {
            continue;
        }
        // Only the word prompt honors the quit token; phrases may contain it.
        if word.eq_ignore_ascii_case(session::QUIT_TOKEN) {
            break;
        }

        let Some(phrase) = read_line(&catalog.t("phrase_prompt"))? else {
            break;
        };
        upsert_word(records, &word, &phrase);
        store.save(records)?;
        println!("{} {}\n", catalog.t("saved").green(), word.bold());
    }

    println!("{}", catalog.t("leaving_add"));
    println!(
        "{}",
        catalog.t_with("data_file", &[("path", store.path().display().to_string())])
    );
    Ok(())
}

fn run_list(
    records: &[WordRecord],
    today: NaiveDate,
    catalog: &Catalog,
    user: Option<&str>,
    store: &FileStore,
) {
    let rules = ReviewRules::default();
    let overview = listing::overview(records, today, &rules);

    if let Some(user) = user {
        println!("{}", catalog.t_with("user", &[("user", user.to_string())]));
    }
    println!(
        "{}",
        catalog.t_with("data_file", &[("path", store.path().display().to_string())])
    );
    println!(
        "{}\n",
        catalog.t_with("today", &[("today", today.to_string())])
    );

    println!("{}", catalog.t("in_progress_title").bold());
    if overview.in_progress.is_empty() {
        println!("  {}", catalog.t("none"));
    }
    for row in &overview.in_progress {
        let flag = if row.reviewed_today {
            catalog.t("today_flag")
        } else {
            String::new()
        };
        println!(
            "  [{flag:>6}] {:<20} {}  {}",
            row.word,
            streak_label(catalog, row.streak, &rules),
            last_label(catalog, row.last_reviewed),
        );
    }

    println!("\n{}", catalog.t("mastered_title").bold());
    if overview.mastered.is_empty() {
        println!("  {}", catalog.t("none"));
    }
    for row in &overview.mastered {
        println!(
            "  {:<20} {}  {}",
            row.word.as_str().green(),
            streak_label(catalog, row.streak, &rules),
            last_label(catalog, row.last_reviewed),
        );
    }

    println!(
        "\n{}",
        catalog.t_with("due_count", &[("count", overview.due_count.to_string())])
    );
}

fn streak_label(catalog: &Catalog, streak: u32, rules: &ReviewRules) -> String {
    catalog.t_with(
        "streak",
        &[
            ("streak", streak.to_string()),
            ("target", rules.mastery_streak.to_string()),
        ],
    )
}

fn last_label(catalog: &Catalog, last_reviewed: Option<NaiveDate>) -> String {
    let date = last_reviewed.map_or_else(|| "-".to_string(), |d| d.to_string());
    catalog.t_with("last_reviewed", &[("date", date)])
}

fn run_review_mode(
    store: &FileStore,
    records: &mut Vec<WordRecord>,
    today: NaiveDate,
    limit: Option<usize>,
    catalog: &Catalog,
    speaker: &mut Speaker,
    user: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let rules = ReviewRules::default();
    let due = rules.due_indices(records, today).len();

    if due == 0 {
        let reviewed_today = records.iter().any(|r| !r.mastered && r.reviewed_on(today));
        if reviewed_today {
            println!("{}", catalog.t("all_done_today").green());
        } else {
            println!("{}", catalog.t("no_words_due"));
        }
        return Ok(());
    }

    if speaker.enabled() {
        if let Some(user) = user {
            speaker.speak_and_wait(&format!(
                "{} {}. {}",
                catalog.t("welcome"),
                user,
                catalog.t("lets_go")
            ));
        }
    } else {
        println!(
            "{}",
            catalog.t_with("today", &[("today", today.to_string())])
        );
        let already = records
            .iter()
            .filter(|r| !r.mastered && r.reviewed_on(today))
            .count();
        if already > 0 {
            println!(
                "{}",
                catalog.t_with("already_reviewed_today", &[("count", already.to_string())])
            );
        }
        let planned = limit.map_or(due, |l| due.min(l));
        println!(
            "{}",
            catalog.t_with(
                "review_start",
                &[
                    ("count", planned.to_string()),
                    ("target", rules.mastery_streak.to_string()),
                ],
            )
        );
        println!("{}\n", catalog.t("replay_hint"));
    }

    let mut console = ConsoleIo { catalog, speaker };
    let summary = session::run_review(
        records,
        today,
        rules,
        store,
        &mut console,
        SessionOptions {
            shuffle: true,
            limit,
        },
    )?;

    println!();
    if summary.quit_early {
        println!("{}", catalog.t("quit_early"));
    } else {
        println!("{}", catalog.t("done"));
    }
    println!(
        "{}",
        catalog.t_with(
            "session_summary",
            &[
                ("answered", summary.answered.to_string()),
                ("correct", summary.correct.to_string()),
                ("mastered", summary.newly_mastered.to_string()),
            ],
        )
    );
    Ok(())
}

fn run_setup_tts(install: bool, catalog: &Catalog) {
    if !install {
        println!("{}", catalog.t("tts_setup_instructions"));
        println!("  {APT_INSTALL_CMD}");
        return;
    }

    println!("{}", catalog.t("tts_setup_installing"));
    #[cfg(not(windows))]
    {
        let _ = std::process::Command::new("sh")
            .arg("-c")
            .arg(APT_INSTALL_CMD)
            .status();
    }
    #[cfg(windows)]
    println!("  {APT_INSTALL_CMD}");
}

/// Console + speech implementation of the session's I/O seam.
struct ConsoleIo<'a> {
    catalog: &'a Catalog,
    speaker: &'a mut Speaker,
}

impl SessionIo for ConsoleIo<'_> {
    fn ask(&mut self, record: &WordRecord, progress: Progress) -> io::Result<Answer> {
        let line = if self.speaker.enabled() {
            let cue = format!("{} {}", self.catalog.t("say_spell_now"), record.word);
            if record.phrase.trim().is_empty() {
                let intro = self.catalog.t("say_next_word");
                self.speaker.speak_parts(&[intro.as_str(), cue.as_str()]);
            } else {
                self.speaker
                    .speak_parts(&[record.phrase.as_str(), cue.as_str()]);
            }
            // Neutral prompt: the screen must not hint at the word.
            let line = read_line(">")?;
            self.speaker.stop();
            line
        } else {
            println!("{}", "=".repeat(50));
            println!(
                "{}",
                self.catalog
                    .t_with(
                        "progress",
                        &[
                            ("position", progress.position.to_string()),
                            ("total", progress.total.to_string()),
                            ("streak", record.streak.to_string()),
                            ("target", ReviewRules::default().mastery_streak.to_string()),
                        ],
                    )
                    .bold()
            );
            match session::mask_word(&record.phrase, &record.word) {
                Some(masked) => println!("  {masked}"),
                None => println!("  {}", self.catalog.t("no_phrase")),
            }
            read_line(&self.catalog.t("type_word"))?
        };

        Ok(line.map_or(Answer::Quit, |l| Answer::parse(&l)))
    }

    fn report_correct(&mut self, record: &WordRecord, rules: &ReviewRules) {
        self.speaker.speak(&self.catalog.t("correct"));
        if record.mastered {
            println!(
                "{}",
                self.catalog
                    .t_with("mastered_now", &[("streak", record.streak.to_string())])
                    .green()
                    .bold()
            );
        } else {
            println!(
                "{}",
                self.catalog
                    .t_with(
                        "correct_streak",
                        &[
                            ("streak", record.streak.to_string()),
                            ("target", rules.mastery_streak.to_string()),
                        ],
                    )
                    .green()
            );
        }
    }

    fn report_incorrect(&mut self, record: &WordRecord, rules: &ReviewRules) {
        self.speaker.speak(&self.catalog.t("wrong"));
        println!("{}", self.catalog.t("wrong").red().bold());
        println!(
            "{}",
            self.catalog
                .t_with("expected", &[("word", record.word.clone())])
                .red()
        );
        println!(
            "{}",
            self.catalog
                .t_with(
                    "reset_streak",
                    &[("target", rules.mastery_streak.to_string())],
                )
                .red()
        );
    }

    fn report_save_failed(&mut self, record: &WordRecord, err: &StoreError) {
        eprintln!(
            "{}",
            self.catalog
                .t_with(
                    "save_failed",
                    &[
                        ("word", record.word.clone()),
                        ("error", err.to_string()),
                    ],
                )
                .red()
                .bold()
        );
    }
}
