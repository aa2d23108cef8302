//! # Generation Strategies
//!
//! Six independent ways of turning a seed list into candidates. Each one
//! takes the graph, the seed songs and its own parameters, and returns an
//! ordered candidate sequence (possibly empty).
//!
//! | Tag           | Strategy                     | Output cap          |
//! |---------------|------------------------------|---------------------|
//! | `level`       | [`LevelStrategy`]            | `per_seed` × seeds  |
//! | `preference`  | [`PreferenceStrategy`]       | `per_seed` × seeds  |
//! | `artist`      | [`ArtistStrategy`]           | one per seed        |
//! | `cross-genre` | [`CrossGenreStrategy`]       | `limit` (11)        |
//! | `uniqueness`  | [`UniquenessStrategy`]       | `target` (11)       |
//! | `recency`     | [`RecencyStrategy`]          | `target` (11)       |
//!
//! Uniqueness and recency mutate a private working copy of the seeds and
//! fall back to [`replenish`] when they stall; both give up with
//! [`GenerationError::InsufficientCandidates`] after a bounded number of
//! replenishment rounds.
//!
//! No strategy ever returns a seed song or the same song twice.

pub mod artist;
pub mod cross_genre;
pub mod level;
pub mod preference;
pub mod recency;
pub mod replenish;
pub mod uniqueness;

pub use artist::ArtistStrategy;
pub use cross_genre::CrossGenreStrategy;
pub use level::LevelStrategy;
pub use preference::PreferenceStrategy;
pub use recency::RecencyStrategy;
pub use replenish::replenish;
pub use uniqueness::UniquenessStrategy;

use crate::error::{GenerationError, Result};
use crate::graph::{GenreGraph, Song};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which strategy a caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Level,
    Preference,
    Artist,
    CrossGenre,
    Uniqueness,
    Recency,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Level,
        StrategyKind::Preference,
        StrategyKind::Artist,
        StrategyKind::CrossGenre,
        StrategyKind::Uniqueness,
        StrategyKind::Recency,
    ];

    /// Canonical command-line tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            StrategyKind::Level => "level",
            StrategyKind::Preference => "preference",
            StrategyKind::Artist => "artist",
            StrategyKind::CrossGenre => "cross-genre",
            StrategyKind::Uniqueness => "uniqueness",
            StrategyKind::Recency => "recency",
        }
    }

    /// Human-facing mode label, also the prefix of generated playlist names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            StrategyKind::Level => "level gen",
            StrategyKind::Preference => "custom gen",
            StrategyKind::Artist => "artist pref",
            StrategyKind::CrossGenre => "new genre",
            StrategyKind::Uniqueness => "unique songs",
            StrategyKind::Recency => "recent songs",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = GenerationError;

    /// Accepts the tag or the mode label, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == wanted || kind.label() == wanted)
            .ok_or_else(|| GenerationError::InvalidStrategy(s.to_string()))
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A candidate-generation algorithm over the genre graph.
pub trait GenerationStrategy {
    fn kind(&self) -> StrategyKind;

    /// Produce candidates for `seeds`, best first.
    ///
    /// `seeds` must be nodes of `graph`. `rng` is only consumed by
    /// strategies that replenish.
    ///
    /// # Errors
    ///
    /// [`GenerationError::EmptySeeds`] for an empty seed list; strategies
    /// with a fixed target may also return
    /// [`GenerationError::InsufficientCandidates`].
    fn generate<'g>(
        &self,
        graph: &'g GenreGraph,
        seeds: &[&'g Song],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<&'g Song>>;
}

fn ensure_seeds(seeds: &[&Song]) -> Result<()> {
    if seeds.is_empty() {
        return Err(GenerationError::EmptySeeds);
    }
    Ok(())
}
