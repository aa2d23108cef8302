//! # Playlist Engine
//!
//! Front door of the library: validates a [`GenerationRequest`], builds the
//! matching strategy from [`EngineConfig`], and packages the result as a
//! named [`GeneratedPlaylist`].
//!
//! ```text
//! request ──validate──▶ build_strategy ──▶ strategy.generate(graph, seeds)
//!                                               │
//!                         empty? ──▶ NoCandidates
//!                                               │
//!                                   name = "<mode label> <shuffled 0-9>"
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use tunegraph::config::EngineConfig;
//! use tunegraph::graph::GenreGraph;
//! use tunegraph::playlist::{GenerationRequest, PlaylistEngine};
//! use tunegraph::strategy::StrategyKind;
//!
//! let mut graph = GenreGraph::from_json_file("graph.json".as_ref())?;
//! let seed = graph.find_song("4uLU6hMCjMI75M1A2tKUQC").cloned().unwrap();
//! let engine = PlaylistEngine::new(EngineConfig::default());
//! let mut rng = engine.config().rng();
//! let playlist = engine.make_playlist(&mut graph, vec![seed], &GenerationRequest::new(StrategyKind::Level), &mut rng)?;
//! println!("{}: {:?}", playlist.name, playlist.track_ids());
//! # Ok::<(), tunegraph::error::GenerationError>(())
//! ```

use crate::algorithm::PreferenceWeights;
use crate::config::EngineConfig;
use crate::error::{GenerationError, Result};
use crate::graph::{GenreGraph, Song};
use crate::strategy::{
    ArtistStrategy, CrossGenreStrategy, GenerationStrategy, LevelStrategy, PreferenceStrategy, RecencyStrategy,
    StrategyKind, UniquenessStrategy,
};
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// One caller's ask: which strategy, plus its per-request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub strategy: StrategyKind,
    #[serde(default)]
    pub preferences: PreferenceWeights,
    /// Same-genre penalty for cross-genre, within `[0, 1]`
    #[serde(default)]
    pub bias: Option<f64>,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            preferences: PreferenceWeights::default(),
            bias: None,
        }
    }

    #[must_use]
    pub fn with_preferences(mut self, preferences: PreferenceWeights) -> Self {
        self.preferences = preferences;
        self
    }

    #[must_use]
    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = Some(bias);
        self
    }

    /// # Errors
    ///
    /// [`GenerationError::InvalidConfiguration`] for out-of-range
    /// preferences or bias, or a cross-genre request without a bias.
    pub fn validate(&self) -> Result<()> {
        self.preferences.validate()?;
        match (self.strategy, self.bias) {
            (_, Some(bias)) if !(0.0..=1.0).contains(&bias) => Err(GenerationError::InvalidConfiguration(format!(
                "bias must be within [0, 1], got {bias}"
            ))),
            (StrategyKind::CrossGenre, None) => Err(GenerationError::InvalidConfiguration(
                "cross-genre generation requires a bias".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// A finished playlist, detached from the graph.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPlaylist {
    pub name: String,
    pub strategy: StrategyKind,
    pub songs: Vec<Song>,
}

impl GeneratedPlaylist {
    /// Catalog ids in playlist order.
    #[must_use]
    pub fn track_ids(&self) -> Vec<&str> {
        self.songs.iter().map(|s| s.id.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// Dispatches requests to strategies configured from one [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PlaylistEngine {
    config: EngineConfig,
}

impl PlaylistEngine {
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate `request` and build its strategy.
    ///
    /// # Errors
    ///
    /// [`GenerationError::InvalidConfiguration`] for a bad request or
    /// engine configuration.
    pub fn build_strategy(&self, request: &GenerationRequest) -> Result<Box<dyn GenerationStrategy>> {
        request.validate()?;
        self.config.validate()?;
        let config = &self.config;
        let context = config.scoring_context(request.preferences);

        let strategy: Box<dyn GenerationStrategy> = match request.strategy {
            StrategyKind::Level => Box::new(LevelStrategy::new(config.per_seed_limit)),
            StrategyKind::Preference => Box::new(PreferenceStrategy::new(config.per_seed_limit, request.preferences)),
            StrategyKind::Artist => Box::new(ArtistStrategy::new(config.artist_depth_limit)),
            StrategyKind::CrossGenre => Box::new(CrossGenreStrategy::new(
                request.bias.unwrap_or_default(),
                config.cross_genre_spread,
                config.playlist_size,
                context,
            )?),
            StrategyKind::Uniqueness => Box::new(UniquenessStrategy::new(
                config.playlist_size,
                config.max_replenish_rounds,
                context,
            )),
            StrategyKind::Recency => Box::new(RecencyStrategy::new(
                config.playlist_size,
                config.max_replenish_rounds,
                config.property_weights,
            )),
        };
        Ok(strategy)
    }

    /// Run `request` over seeds that are already nodes of `graph`.
    ///
    /// The strategy works on its own copy of the seed list; the caller's
    /// slice is never modified. An empty result is returned as-is.
    ///
    /// # Errors
    ///
    /// [`GenerationError::EmptySeeds`], validation errors, or whatever the
    /// strategy reports.
    pub fn generate<'g>(
        &self,
        graph: &'g GenreGraph,
        seeds: &[&'g Song],
        request: &GenerationRequest,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<&'g Song>> {
        if seeds.is_empty() {
            return Err(GenerationError::EmptySeeds);
        }
        let strategy = self.build_strategy(request)?;
        let working = seeds.to_vec();
        log::info!("Generating {} playlist from {} seeds", strategy.kind(), working.len());
        strategy.generate(graph, &working, rng)
    }

    /// Register `seeds` in `graph`, generate, and name the result.
    ///
    /// Seeds unknown to the graph are inserted (with their neighbour edges
    /// mirrored) before generation.
    ///
    /// # Errors
    ///
    /// As [`PlaylistEngine::generate`], plus
    /// [`GenerationError::UnknownGenre`] for a seed whose genre is absent
    /// and [`GenerationError::NoCandidates`] when the strategy finds
    /// nothing.
    pub fn make_playlist(
        &self,
        graph: &mut GenreGraph,
        seeds: Vec<Song>,
        request: &GenerationRequest,
        rng: &mut dyn RngCore,
    ) -> Result<GeneratedPlaylist> {
        if seeds.is_empty() {
            return Err(GenerationError::EmptySeeds);
        }
        request.validate()?;

        let mut keys = Vec::with_capacity(seeds.len());
        for seed in seeds {
            if graph.insert_song(seed.clone())? {
                log::info!("Registered seed `{}' in genre `{}'", seed.id, seed.genre);
            }
            keys.push(seed);
        }

        let graph: &GenreGraph = graph;
        let resolved = keys
            .iter()
            .map(|seed| {
                graph
                    .get_song(seed)
                    .ok_or_else(|| GenerationError::UnknownSong(seed.id.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let candidates = self.generate(graph, &resolved, request, rng)?;
        if candidates.is_empty() {
            log::warn!("Playlist generation failed, check the input");
            return Err(GenerationError::NoCandidates(request.strategy.tag()));
        }

        let name = playlist_name(request.strategy, rng);
        log::info!("Generated `{name}' with {} songs", candidates.len());
        Ok(GeneratedPlaylist {
            name,
            strategy: request.strategy,
            songs: candidates.into_iter().cloned().collect(),
        })
    }
}

/// `"<mode label> <digits 0-9 in random order>"`, e.g. `"level gen 7302619548"`.
pub fn playlist_name(kind: StrategyKind, rng: &mut dyn RngCore) -> String {
    let mut digits: Vec<char> = ('0'..='9').collect();
    digits.shuffle(rng);
    format!("{} {}", kind.label(), digits.into_iter().collect::<String>())
}
