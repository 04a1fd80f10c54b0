pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod view_models;

pub use config::Config;
pub use data::{LessonLoader, load_lesson, read_lesson_embedded, read_lesson_file};
pub use error::{LessonError, Result};
pub use evaluator::{Evaluation, Evaluator, ItemResult, Submission, Verdict, evaluate};
pub use model::{Block, Choice, LessonDocument, QuizBlock, QuizItem, Section};
