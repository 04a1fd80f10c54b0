//! Configuración de carga y evaluación

use crate::error::{LessonError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Archivo que se busca en el directorio de trabajo
pub const DEFAULT_CONFIG_FILE: &str = "lesson_quiz.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Porcentaje mínimo de la puntuación máxima para aprobar (0..=100)
    #[serde(default = "default_pass_percentage")]
    pub pass_percentage: u32,

    /// Por debajo de este número de opciones el cargador avisa
    #[serde(default = "default_min_choices")]
    pub min_choices: usize,
}

fn default_pass_percentage() -> u32 {
    70
}

fn default_min_choices() -> usize {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pass_percentage: default_pass_percentage(),
            min_choices: default_min_choices(),
        }
    }
}

impl Config {
    /// Carga la configuración del archivo o usa los valores por defecto
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::from_file(config_path);
        }

        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_file(&default_path);
        }

        Ok(Config::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pass_percentage > 100 {
            return Err(LessonError::Config(format!(
                "pass_percentage must be between 0 and 100, got {}",
                self.pass_percentage
            )));
        }
        Ok(())
    }

    /// Guarda la configuración en el archivo
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
