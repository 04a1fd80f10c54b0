// src/evaluator.rs

use crate::config::Config;
use crate::error::{LessonError, Result};
use crate::model::QuizBlock;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Respuestas de un alumno: id de pregunta -> índice 0-based de la opción
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission {
    answers: BTreeMap<String, usize>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, id: impl Into<String>, index: usize) -> Self {
        self.insert(id, index);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, index: usize) {
        self.answers.insert(id.into(), index);
    }

    /// Convierte números de opción desde 1, tal como los escribe el alumno.
    ///
    /// Comprueba contra el bloque en el mismo orden que `Evaluator::evaluate`
    /// y los errores de rango llevan el número escrito, no el índice.
    pub fn from_one_based(block: &QuizBlock, answers: BTreeMap<String, usize>) -> Result<Self> {
        if let Some(id) = answers.keys().find(|id| block.item(id.as_str()).is_none()) {
            return Err(LessonError::UnknownItem(id.clone()));
        }

        let mut submission = Self::new();
        for (id, number) in answers {
            let choices = block.item(&id).map_or(0, |q| q.choices().len());
            if number == 0 || number > choices {
                return Err(LessonError::InvalidChoice {
                    item: id,
                    index: number,
                    choices,
                });
            }
            submission.insert(id, number - 1);
        }
        Ok(submission)
    }

    pub fn get(&self, id: &str) -> Option<usize> {
        self.answers.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.answers.iter().map(|(id, index)| (id.as_str(), *index))
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for Submission {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().map(|(id, index)| (id.into(), index)).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub id: String,
    pub verdict: Verdict,
    pub chosen: Option<usize>,
    pub feedback: Option<String>,
    pub points_awarded: u32,
    pub points_possible: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub items: Vec<ItemResult>,
    pub score: u64,
    pub max_score: u64,
    pub passed: bool,
}

impl Evaluation {
    pub fn result(&self, id: &str) -> Option<&ItemResult> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.items.iter().filter(|r| r.verdict == verdict).count()
    }

    pub fn percentage(&self) -> f64 {
        if self.max_score == 0 {
            return 100.0;
        }
        self.score as f64 * 100.0 / self.max_score as f64
    }
}

/// Corrige envíos contra un bloque ya validado.
///
/// No guarda estado mutable, así que una misma instancia se puede compartir
/// entre hilos y cada llamada es independiente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    pass_percentage: u32,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            pass_percentage: Config::default().pass_percentage,
        }
    }
}

impl Evaluator {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pass_percentage: config.pass_percentage,
        })
    }

    pub fn pass_percentage(&self) -> u32 {
        self.pass_percentage
    }

    pub fn evaluate(&self, block: &QuizBlock, submission: &Submission) -> Result<Evaluation> {
        // Primero ids desconocidos, luego índices fuera de rango
        for (id, _) in submission.iter() {
            if block.item(id).is_none() {
                return Err(LessonError::UnknownItem(id.to_string()));
            }
        }
        for (id, index) in submission.iter() {
            if let Some(item) = block.item(id) {
                if index >= item.choices().len() {
                    return Err(LessonError::InvalidChoice {
                        item: id.to_string(),
                        index,
                        choices: item.choices().len(),
                    });
                }
            }
        }

        let mut score = 0u64;
        let items: Vec<ItemResult> = block
            .items()
            .iter()
            .map(|item| {
                let chosen = submission.get(item.id());
                let (verdict, feedback) = match chosen.and_then(|i| item.choice(i).map(|c| (i, c))) {
                    None => (Verdict::Unanswered, None),
                    Some((i, choice)) if i == item.correct_index() => {
                        (Verdict::Correct, Some(choice.feedback.clone()))
                    }
                    Some((_, choice)) => (Verdict::Incorrect, Some(choice.feedback.clone())),
                };
                let points_awarded = if verdict == Verdict::Correct { item.points() } else { 0 };
                score += u64::from(points_awarded);
                ItemResult {
                    id: item.id().to_string(),
                    verdict,
                    chosen,
                    feedback,
                    points_awarded,
                    points_possible: item.points(),
                }
            })
            .collect();

        let max_score = block.max_score();
        let passed = max_score == 0 || score * 100 >= u64::from(self.pass_percentage) * max_score;

        debug!(
            "Evaluated {} answers against {} items: {}/{} (passed: {})",
            submission.len(),
            block.len(),
            score,
            max_score,
            passed
        );

        Ok(Evaluation {
            items,
            score,
            max_score,
            passed,
        })
    }
}

/// Corrige con la configuración por defecto
pub fn evaluate(block: &QuizBlock, submission: &Submission) -> Result<Evaluation> {
    Evaluator::default().evaluate(block, submission)
}
