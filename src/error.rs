//! Error types for playlist generation.
//!
//! Library code returns [`GenerationError`]; the binary wraps it in
//! `anyhow` for context-rich reporting.

use thiserror::Error;

/// Everything that can stop a generation run.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Strategy tag is not one of the recognised values
    #[error("Invalid strategy: '{0}' (expected level, preference, artist, cross-genre, uniqueness or recency)")]
    InvalidStrategy(String),

    /// Out-of-range or missing generation parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No seed songs were supplied
    #[error("At least one seed song is required")]
    EmptySeeds,

    /// Replenishment budget exhausted before enough candidates qualified
    #[error("{strategy} strategy found only {found} of {needed} candidates after {rounds} replenishment rounds")]
    InsufficientCandidates {
        strategy: &'static str,
        found: usize,
        needed: usize,
        rounds: usize,
    },

    /// The strategy ran but produced nothing; the playlist must not be published
    #[error("{0} generation produced no candidates")]
    NoCandidates(&'static str),

    /// Genre lookup failed
    #[error("Genre not found: {0}")]
    UnknownGenre(String),

    /// Song lookup failed
    #[error("Song not found: {0}")]
    UnknownSong(String),

    /// Graph snapshot could not be read
    #[error("Snapshot I/O error: {0}")]
    SnapshotIo(#[from] std::io::Error),

    /// Graph snapshot could not be parsed
    #[error("Snapshot format error: {0}")]
    SnapshotFormat(#[from] serde_json::Error),
}

/// Convenience Result type using [`GenerationError`]
pub type Result<T> = std::result::Result<T, GenerationError>;
