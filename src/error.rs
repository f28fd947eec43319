use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while decoding NewGRF data.
///
/// Only [`Error::MissingFile`] and outer-stream I/O failures escape
/// [`crate::loader::Loader::load`]. Everything else is scoped to a single
/// pseudo-sprite: the dispatcher reports it and moves on to the next record.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A configured NewGRF could not be found. Aborts the whole load.
    #[error("NewGRF file '{}' is missing", .0.display())]
    MissingFile(PathBuf),

    /// The load configuration could not be parsed.
    #[error("invalid load configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A pseudo-sprite is shorter than its mandatory fields.
    #[error("{context}: record too short (expected {wanted} more bytes, {available} left)")]
    ShortRecord {
        context: &'static str,
        wanted: usize,
        available: usize,
    },

    /// A read ran off the end of a pseudo-sprite.
    #[error("tried to read past the end of pseudo-sprite data")]
    ReadBounds,

    /// The file does not start with a valid sprite-count record.
    #[error("invalid GRF container: {0}")]
    InvalidContainer(&'static str),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
