// src/model.rs

use crate::error::{LessonError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Bloque de contenido dentro de una sección
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Prose {
        text: String,
    },
    Code {
        #[serde(default)]
        lang: Option<String>,
        source: String,
    },
}

impl Block {
    pub fn prose(text: impl Into<String>) -> Self {
        Block::Prose { text: text.into() }
    }

    pub fn code(lang: Option<&str>, source: impl Into<String>) -> Self {
        Block::Code {
            lang: lang.map(str::to_string),
            source: source.into(),
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, Block::Code { .. })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Section {
    heading: String,
    level: u8,
    body: Vec<Block>,
}

impl Section {
    pub fn new(heading: impl Into<String>, level: u8, body: Vec<Block>) -> Self {
        Self {
            heading: heading.into(),
            level: level.clamp(1, 6),
            body,
        }
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn body(&self) -> &[Block] {
        &self.body
    }

    pub fn code_samples(&self) -> impl Iterator<Item = &Block> {
        self.body.iter().filter(|b| b.is_code())
    }
}

/// Opción de respuesta con su retroalimentación
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub feedback: String,
}

impl Choice {
    pub fn new(text: impl Into<String>, feedback: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            feedback: feedback.into(),
        }
    }
}

/// Pregunta de opción múltiple con exactamente una opción correcta.
///
/// Solo se construye validada (`QuizItem::new`), así que el evaluador nunca
/// necesita volver a comprobar el índice correcto ni los puntos.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct QuizItem {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    prompt: String,
    choices: Vec<Choice>,
    correct: usize,
    points: u32,
}

impl QuizItem {
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        choices: Vec<Choice>,
        correct: usize,
        points: u32,
    ) -> Result<Self> {
        let id = id.into();
        let prompt = prompt.into();

        if id.trim().is_empty() {
            return Err(LessonError::malformed(id, "empty id"));
        }
        if prompt.trim().is_empty() {
            return Err(LessonError::malformed(id, "empty prompt"));
        }
        if choices.is_empty() {
            return Err(LessonError::malformed(id, "no choices"));
        }
        if correct >= choices.len() {
            return Err(LessonError::malformed(
                id,
                format!(
                    "correct choice {} is out of range ({} choices)",
                    correct,
                    choices.len()
                ),
            ));
        }
        if points == 0 {
            return Err(LessonError::malformed(id, "points must be positive"));
        }

        Ok(Self {
            id,
            title: None,
            prompt,
            choices,
            correct,
            points,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }

    pub fn correct_index(&self) -> usize {
        self.correct
    }

    pub fn correct_choice(&self) -> &Choice {
        &self.choices[self.correct]
    }

    pub fn points(&self) -> u32 {
        self.points
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    heading: Option<String>,
    items: Vec<QuizItem>,
}

impl QuizBlock {
    /// Falla si dos preguntas comparten id
    pub fn new(items: Vec<QuizItem>) -> Result<Self> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(LessonError::malformed(item.id(), "duplicate id in quiz block"));
            }
        }
        Ok(Self { heading: None, items })
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn heading(&self) -> Option<&str> {
        self.heading.as_deref()
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&QuizItem> {
        self.items.iter().find(|q| q.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max_score(&self) -> u64 {
        self.items.iter().map(|q| u64::from(q.points())).sum()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LessonDocument {
    title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    preamble: Vec<Block>,
    sections: Vec<Section>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    quizzes: Vec<QuizBlock>,
}

impl LessonDocument {
    pub fn new(
        title: impl Into<String>,
        preamble: Vec<Block>,
        sections: Vec<Section>,
        quizzes: Vec<QuizBlock>,
    ) -> Result<Self> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(LessonError::MissingTitle);
        }
        if sections.is_empty() {
            return Err(LessonError::EmptyDocument { title });
        }
        Ok(Self {
            title,
            preamble,
            sections,
            quizzes,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn preamble(&self) -> &[Block] {
        &self.preamble
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading() == heading)
    }

    pub fn quizzes(&self) -> &[QuizBlock] {
        &self.quizzes
    }

    /// Primer bloque de preguntas, el caso habitual de una lección
    pub fn quiz(&self) -> Option<&QuizBlock> {
        self.quizzes.first()
    }

    pub fn code_samples(&self) -> impl Iterator<Item = &Block> {
        self.preamble
            .iter()
            .filter(|b| b.is_code())
            .chain(self.sections.iter().flat_map(|s| s.code_samples()))
    }

    pub fn item_count(&self) -> usize {
        self.quizzes.iter().map(QuizBlock::len).sum()
    }
}
