use std::fmt::Display;

use thiserror::Error;

/// Netlist parse errors
///
/// Only stream failures are errors. Lines that do not match either grammar
/// are dropped and reported through [`crate::Parsed::skipped`].
#[derive(Error, Debug)]
pub enum ParseError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Ingestion and generation errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Netlist parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Embedding failed: {0}")]
    Embedding(String),
    #[error("Vector index failed: {0}")]
    VectorIndex(String),
    #[error("Generation failed: {0}")]
    Generation(String),
    #[error("Document extraction failed: {0}")]
    Document(String),
    #[error("No parsable text extracted")]
    NoContent,
}

impl Error {
    pub fn embedding(message: impl Display) -> Self {
        Self::Embedding(message.to_string())
    }

    pub fn vector_index(message: impl Display) -> Self {
        Self::VectorIndex(message.to_string())
    }

    pub fn generation(message: impl Display) -> Self {
        Self::Generation(message.to_string())
    }

    pub fn document(message: impl Display) -> Self {
        Self::Document(message.to_string())
    }
}
