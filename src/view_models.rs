// src/view_models.rs

use crate::evaluator::{Evaluation, Verdict};
use crate::model::{LessonDocument, QuizBlock};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRow {
    pub position: usize, // 1-based, como lo ve el alumno
    pub id: String,
    pub verdict: Verdict,
    pub chosen_1based: Option<usize>,
    pub points_awarded: u32,
    pub points_possible: u32,
    pub feedback: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreInfo {
    pub score: u64,
    pub max_score: u64,
    pub percentage: f64,
    pub passed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionEntry {
    pub heading: String,
    pub level: u8,
    pub code_samples: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outline {
    pub title: String,
    pub sections: Vec<SectionEntry>,
    pub quiz_blocks: usize,
    pub quiz_items: usize,
    pub max_score: u64,
}

impl ItemRow {
    pub fn from_evaluation(eval: &Evaluation) -> Vec<ItemRow> {
        eval.items
            .iter()
            .enumerate()
            .map(|(i, r)| ItemRow {
                position: i + 1,
                id: r.id.clone(),
                verdict: r.verdict,
                chosen_1based: r.chosen.map(|c| c + 1),
                points_awarded: r.points_awarded,
                points_possible: r.points_possible,
                feedback: r.feedback.clone(),
            })
            .collect()
    }

    pub fn label(&self) -> String {
        match self.verdict {
            Verdict::Correct => format!(
                "{}. {} ✅ ({}/{})",
                self.position, self.id, self.points_awarded, self.points_possible
            ),
            Verdict::Incorrect => format!(
                "{}. {} ❌ choice {} ({}/{})",
                self.position,
                self.id,
                self.chosen_1based.unwrap_or_default(),
                self.points_awarded,
                self.points_possible
            ),
            Verdict::Unanswered => format!(
                "{}. {} ⬜ unanswered (0/{})",
                self.position, self.id, self.points_possible
            ),
        }
    }
}

impl ScoreInfo {
    pub fn from_evaluation(eval: &Evaluation) -> Self {
        Self {
            score: eval.score,
            max_score: eval.max_score,
            percentage: eval.percentage(),
            passed: eval.passed,
        }
    }

    pub fn label(&self) -> String {
        let mark = if self.passed { "✅ passed" } else { "❌ not passed" };
        format!(
            "Score {}/{} ({:.0}%) {}",
            self.score, self.max_score, self.percentage, mark
        )
    }
}

impl Outline {
    pub fn of(doc: &LessonDocument) -> Self {
        Self {
            title: doc.title().to_string(),
            sections: doc
                .sections()
                .iter()
                .map(|s| SectionEntry {
                    heading: s.heading().to_string(),
                    level: s.level(),
                    code_samples: s.code_samples().count(),
                })
                .collect(),
            quiz_blocks: doc.quizzes().len(),
            quiz_items: doc.item_count(),
            max_score: doc.quizzes().iter().map(QuizBlock::max_score).sum(),
        }
    }

    /// Una línea por sección, sangrada según el nivel del encabezado
    pub fn lines(&self) -> Vec<String> {
        self.sections
            .iter()
            .map(|s| {
                let indent = "  ".repeat(usize::from(s.level.saturating_sub(2)));
                if s.code_samples > 0 {
                    format!("{}{} ({} code)", indent, s.heading, s.code_samples)
                } else {
                    format!("{}{}", indent, s.heading)
                }
            })
            .collect()
    }
}
