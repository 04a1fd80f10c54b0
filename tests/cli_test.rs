//! Pruebas del binario de línea de comandos

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn lesson_quiz() -> Command {
    Command::cargo_bin("lesson_quiz").unwrap()
}

#[test]
fn test_outline_embedded_lesson() {
    lesson_quiz()
        .args(["outline", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Component-Based View Templates"))
        .stdout(predicate::str::contains("Quiz: 1 block(s), 3 item(s), 4 point(s)"));
}

#[test]
fn test_check_reports_malformed_lesson() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.md");
    fs::write(&path, "# Title only\n").unwrap();

    lesson_quiz()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no sections"));
}

#[test]
fn test_grade_prints_rows_and_score() {
    let dir = tempfile::tempdir().unwrap();
    let answers = dir.path().join("answers.yml");
    fs::write(&answers, "partial-naming: 2\nexplicit-locals: 1\ncollection-rendering: 1\n").unwrap();

    lesson_quiz()
        .args(["grade", "-", answers.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. partial-naming ✅ (1/1)"))
        .stdout(predicate::str::contains("3. collection-rendering ❌ choice 1 (0/1)"))
        .stdout(predicate::str::contains("Score 3/4 (75%) ✅ passed"));
}

#[test]
fn test_grade_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let answers = dir.path().join("answers.yml");
    fs::write(&answers, "explicit-locals: 1\n").unwrap();

    let output = lesson_quiz()
        .args(["grade", "-", answers.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let eval: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(eval["score"], 2);
    assert_eq!(eval["items"][0]["verdict"], "unanswered");
    assert_eq!(eval["items"][1]["verdict"], "correct");
}

#[test]
fn test_grade_rejects_unknown_item() {
    let dir = tempfile::tempdir().unwrap();
    let answers = dir.path().join("answers.yml");
    fs::write(&answers, "qX: 1\n").unwrap();

    lesson_quiz()
        .args(["grade", "-", answers.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown quiz item 'qX'"));
}

#[test]
fn test_grade_reports_unknown_item_with_zero_answer() {
    let dir = tempfile::tempdir().unwrap();
    let answers = dir.path().join("answers.yml");
    fs::write(&answers, "qX: 0\n").unwrap();

    lesson_quiz()
        .args(["grade", "-", answers.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown quiz item 'qX'"))
        .stderr(predicate::str::contains("out of range").not());
}

#[test]
fn test_grade_reports_choice_number_as_written() {
    let dir = tempfile::tempdir().unwrap();
    let answers = dir.path().join("answers.yml");
    fs::write(&answers, "partial-naming: 5\n").unwrap();

    lesson_quiz()
        .args(["grade", "-", answers.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Choice 5 is out of range for quiz item 'partial-naming' (3 choices)",
        ));
}
