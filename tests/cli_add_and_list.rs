// Exercises the compiled binary's add and list modes over a temp data
// file, with stdin piped the way a scripted terminal would.

use assert_cmd::Command;
use tempfile::tempdir;

fn stava() -> Command {
    Command::cargo_bin("stava").unwrap()
}

#[test]
fn add_then_list_shows_the_new_word() {
    let dir = tempdir().unwrap();
    let words = dir.path().join("words.csv");

    let output = stava()
        .env("HOME", dir.path())
        .args(["--file", words.to_str().unwrap(), "-l", "en", "add"])
        .write_stdin("apfel\nIch esse einen Apfel\nexitnow\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("apfel"));

    let output = stava()
        .env("HOME", dir.path())
        .args(["--file", words.to_str().unwrap(), "-l", "en", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("apfel"));
    assert!(stdout.contains("0/5"));
    assert!(stdout.contains("1 words due today."));
}

#[test]
fn re_adding_a_word_keeps_its_progress() {
    let dir = tempdir().unwrap();
    let words = dir.path().join("words.csv");
    std::fs::write(
        &words,
        "word,phrase,streak,last_reviewed,mastered\n\
         apfel,Alter Satz,3,2026-08-01,false\n",
    )
    .unwrap();

    stava()
        .env("HOME", dir.path())
        .args(["--file", words.to_str().unwrap(), "-l", "en", "add"])
        .write_stdin("apfel\nNeuer Satz\nexitnow\n")
        .assert()
        .success();

    let contents = std::fs::read_to_string(&words).unwrap();
    assert!(contents.contains("Neuer Satz"));
    assert!(contents.contains(",3,2026-08-01,false"));
}

#[test]
fn unreadable_rows_are_reported_but_not_fatal() {
    let dir = tempdir().unwrap();
    let words = dir.path().join("words.csv");
    std::fs::write(
        &words,
        "word,phrase,streak,last_reviewed,mastered\n\
         ok,phrase,1,2026-08-01,false\n\
         broken,phrase,not-a-number,2026-08-01,false\n",
    )
    .unwrap();

    let output = stava()
        .env("HOME", dir.path())
        .args(["--file", words.to_str().unwrap(), "-l", "en", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("ok"));
    assert!(!stdout.contains("broken"));
    assert!(stderr.contains("1 unreadable rows"));
}

#[test]
fn german_ui_speaks_german() {
    let dir = tempdir().unwrap();
    let words = dir.path().join("words.csv");

    let output = stava()
        .env("HOME", dir.path())
        .args(["--file", words.to_str().unwrap(), "-l", "de", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Wörter im Training:"));
    assert!(stdout.contains("(keine)"));
}
