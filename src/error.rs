use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RimeBenchError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("No article files found under {0:?}")]
    MissingCorpus(PathBuf),

    #[error("Fixed code length {0} is not supported (single-keystroke codes carry no disambiguation signal)")]
    InvalidCodeLength(usize),

    #[error("No code mapping for character '{ch}' ({file}, line {line})")]
    EncodingMiss { ch: char, file: String, line: usize },

    #[error("'{label}': line counts diverge ({input} input, {output} output)")]
    LineCountMismatch {
        label: String,
        input: usize,
        output: usize,
    },

    #[error("Engine failure during '{label}': {detail}")]
    Engine { label: String, detail: String },
}

pub type RbResult<T> = Result<T, RimeBenchError>;
