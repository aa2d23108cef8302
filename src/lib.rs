//! # tunegraph
//!
//! Playlist generation over a two-level similarity graph: genres connected
//! to neighbouring genres, and inside each genre, songs connected to their
//! most similar songs by weighted edges.
//!
//! ## Architecture
//!
//! - `graph`: Graph model, snapshot loading, seed registration
//! - `algorithm`: Scoring primitives (dissimilarity, preference, genre distance)
//! - `strategy`: The six candidate-generation strategies and replenishment
//! - `playlist`: Request validation, strategy dispatch, playlist naming
//! - `config`: Engine tuning parameters and data directory management
//! - `error`: Library error type
//! - `cli`, `completion`: Command-line surface
//!
//! ## Strategies
//!
//! | Tag           | Behaviour                                                   |
//! |---------------|-------------------------------------------------------------|
//! | `level`       | Breadth-first expansion, nearest songs first                |
//! | `preference`  | Direct neighbours ranked by listener feature preferences    |
//! | `artist`      | Depth-first search for a song sharing an artist             |
//! | `cross-genre` | Songs from the genres closest to the seeds' genres          |
//! | `uniqueness`  | Greedy walk toward weakly connected songs                   |
//! | `recency`     | Neighbours released after every seed                        |
//!
//! ## Conventions
//!
//! Every score is a cost and sorts ascending. Edge weights are
//! dissimilarities. A generation call never returns a seed or the same
//! song twice.

pub mod algorithm;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod graph;
pub mod playlist;
pub mod strategy;

pub use error::{GenerationError, Result};
pub use graph::{GenreGraph, Song};
pub use playlist::{GeneratedPlaylist, GenerationRequest, PlaylistEngine};
pub use strategy::StrategyKind;
