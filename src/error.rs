//! Errores de carga y evaluación de lecciones

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LessonError>;

/// Errores al escribir, cargar o corregir una lección
#[derive(Debug, Error)]
pub enum LessonError {
    #[error("Malformed quiz item '{item}': {reason}")]
    MalformedItem { item: String, reason: String },

    #[error("Lesson '{title}' has no sections")]
    EmptyDocument { title: String },

    #[error("Lesson has no title heading")]
    MissingTitle,

    #[error("Submission references unknown quiz item '{0}'")]
    UnknownItem(String),

    #[error("Choice {index} is out of range for quiz item '{item}' ({choices} choices)")]
    InvalidChoice {
        item: String,
        index: usize,
        choices: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl LessonError {
    pub(crate) fn malformed(item: impl Into<String>, reason: impl Into<String>) -> Self {
        LessonError::MalformedItem {
            item: item.into(),
            reason: reason.into(),
        }
    }

    /// Defectos del contenido, detectados al cargar
    pub fn is_authoring_error(&self) -> bool {
        matches!(
            self,
            LessonError::MalformedItem { .. } | LessonError::EmptyDocument { .. } | LessonError::MissingTitle
        )
    }

    /// Defectos del envío del alumno, detectados al corregir
    pub fn is_submission_error(&self) -> bool {
        matches!(self, LessonError::UnknownItem(_) | LessonError::InvalidChoice { .. })
    }
}
