//! Argumentos de línea de comandos de lesson_quiz

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ruta que selecciona la lección embebida
pub const EMBEDDED_LESSON: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "lesson_quiz")]
#[command(author, version, about = "Validate lessons and grade their quizzes", long_about = None)]
pub struct Cli {
    /// Ruta al archivo de configuración
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Muestra las secciones y cuestionarios de una lección
    Outline {
        /// Archivo markdown de la lección ("-" para la lección embebida)
        #[arg(required = true)]
        lesson: String,
    },

    /// Valida una lección sin corregir nada
    Check {
        /// Archivo markdown de la lección ("-" para la lección embebida)
        #[arg(required = true)]
        lesson: String,
    },

    /// Corrige un archivo de respuestas contra el cuestionario
    Grade {
        /// Archivo markdown de la lección ("-" para la lección embebida)
        #[arg(required = true)]
        lesson: String,

        /// Mapa YAML de id de pregunta a número de opción (desde 1)
        #[arg(required = true)]
        answers: PathBuf,

        /// Bloque de preguntas a corregir, desde 1 (por defecto: 1)
        #[arg(short, long, default_value = "1")]
        block: usize,

        /// Imprime la corrección como JSON
        #[arg(long)]
        json: bool,
    },
}
