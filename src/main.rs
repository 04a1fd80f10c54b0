use clap::Parser;
use eyre::{Context, Result, eyre};
use log::info;
use std::collections::BTreeMap;
use std::path::Path;

use lesson_quiz::cli::{Cli, Command, EMBEDDED_LESSON};
use lesson_quiz::view_models::{ItemRow, Outline, ScoreInfo};
use lesson_quiz::{Config, Evaluator, LessonDocument, LessonLoader, QuizBlock, Submission};

fn setup_logging() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    Ok(())
}

fn open_lesson(loader: &LessonLoader, lesson: &str) -> Result<LessonDocument> {
    let doc = if lesson == EMBEDDED_LESSON {
        loader.load_embedded()
    } else {
        loader.load_file(lesson)
    };
    doc.context(format!("Failed to load lesson: {}", lesson))
}

fn read_answers(path: &Path, quiz: &QuizBlock) -> Result<Submission> {
    let content =
        std::fs::read_to_string(path).context(format!("Failed to read answers: {}", path.display()))?;
    let raw: BTreeMap<String, usize> = serde_yaml::from_str(&content).context("Failed to parse answers")?;
    Ok(Submission::from_one_based(quiz, raw)?)
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let loader = LessonLoader::new(&config);

    match cli.command {
        Command::Outline { lesson } => {
            let doc = open_lesson(&loader, &lesson)?;
            let outline = Outline::of(&doc);
            println!("{}", outline.title);
            for line in outline.lines() {
                println!("  {}", line);
            }
            println!(
                "Quiz: {} block(s), {} item(s), {} point(s)",
                outline.quiz_blocks, outline.quiz_items, outline.max_score
            );
        }
        Command::Check { lesson } => {
            let doc = open_lesson(&loader, &lesson)?;
            println!("✓ {} ({} sections, {} quiz items)", doc.title(), doc.sections().len(), doc.item_count());
        }
        Command::Grade {
            lesson,
            answers,
            block,
            json,
        } => {
            let doc = open_lesson(&loader, &lesson)?;
            let quiz = block
                .checked_sub(1)
                .and_then(|i| doc.quizzes().get(i))
                .ok_or_else(|| eyre!("Lesson has no quiz block {} ({} available)", block, doc.quizzes().len()))?;
            let submission = read_answers(&answers, quiz)?;
            let evaluator = Evaluator::new(&config)?;
            let eval = evaluator.evaluate(quiz, &submission)?;
            info!("Graded {} answers for '{}'", submission.len(), doc.title());

            if json {
                println!("{}", serde_json::to_string_pretty(&eval)?);
            } else {
                for row in ItemRow::from_evaluation(&eval) {
                    println!("{}", row.label());
                    if let Some(feedback) = row.feedback.filter(|f| !f.is_empty()) {
                        println!("   {}", feedback);
                    }
                }
                println!("{}", ScoreInfo::from_evaluation(&eval).label());
            }
        }
    }

    Ok(())
}
