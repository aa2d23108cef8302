//! # Configuration Module
//!
//! Engine tuning parameters and platform-appropriate file locations.
//!
//! ## File Locations
//!
//! The graph snapshot lives in the platform data directory and the optional
//! tuning file in the platform config directory:
//! - Linux: `~/.local/share/tunegraph/graph.json`, `~/.config/tunegraph/config.json`
//! - macOS: `~/Library/Application Support/tunegraph/…` for both
//! - Windows: `%APPDATA%\tunegraph\…` for both
//!
//! ## Tuning File
//!
//! `config.json` is a JSON object; every field is optional and falls back
//! to the value in [`EngineConfig::default`]:
//!
//! ```json
//! {
//!   "per_seed_limit": 2,
//!   "artist_depth_limit": 250,
//!   "playlist_size": 11,
//!   "cross_genre_spread": 10,
//!   "max_replenish_rounds": 32,
//!   "property_weights": { "tempo": 0.005 },
//!   "rng_seed": 42
//! }
//! ```

use crate::algorithm::{PreferenceWeights, PropertyWeights, ScoringContext};
use crate::error::GenerationError;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "tunegraph";

/// Returns the platform-appropriate data directory for tunegraph,
/// creating it if needed.
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The tunegraph subdirectory cannot be created due to permissions
///
/// # Examples
///
/// ```no_run
/// use tunegraph::config::get_data_dir;
///
/// let dir = get_data_dir()?;
/// println!("Data lives in {}", dir.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let app_dir = data_dir.join(APP_DIR);
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create tunegraph data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Default location of the graph snapshot, `<data dir>/tunegraph/graph.json`.
///
/// # Errors
///
/// See [`get_data_dir`].
pub fn get_graph_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("graph.json"))
}

/// Default location of the tuning file, `<config dir>/tunegraph/config.json`.
/// The directory is not created; a missing file simply means defaults.
///
/// # Errors
///
/// Fails if the platform has no config directory.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine system config directory"))?;
    Ok(config_dir.join(APP_DIR).join("config.json"))
}

/// Tuning parameters shared by every generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Songs emitted per seed by the level and preference strategies
    pub per_seed_limit: usize,
    /// Depth at which the artist search returns whatever it reached
    pub artist_depth_limit: usize,
    /// Output size of cross-genre, uniqueness and recency
    pub playlist_size: usize,
    /// Neighbouring genres considered per cross-genre run, split across seed genres
    pub cross_genre_spread: usize,
    /// Replenishment budget before uniqueness and recency give up
    pub max_replenish_rounds: usize,
    pub property_weights: PropertyWeights,
    /// Fixed seed for reproducible playlists; fresh entropy when absent
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            per_seed_limit: 2,
            artist_depth_limit: 250,
            playlist_size: 11,
            cross_genre_spread: 10,
            max_replenish_rounds: 32,
            property_weights: PropertyWeights::default(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Read a tuning file.
    ///
    /// # Errors
    ///
    /// Unreadable file or malformed JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!("Loaded engine config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Load `path` if given, else the default tuning file if it exists,
    /// else defaults.
    ///
    /// # Errors
    ///
    /// An explicit `path` that cannot be loaded, or a default file that
    /// exists but is malformed.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match get_config_path() {
            Ok(default_path) if default_path.exists() => Self::load(&default_path),
            Ok(_) => Ok(Self::default()),
            Err(e) => {
                log::warn!("Using default engine config: {e}");
                Ok(Self::default())
            }
        }
    }

    /// # Errors
    ///
    /// [`GenerationError::InvalidConfiguration`] for zero-valued limits.
    pub fn validate(&self) -> crate::error::Result<()> {
        let limits = [
            ("per_seed_limit", self.per_seed_limit),
            ("artist_depth_limit", self.artist_depth_limit),
            ("playlist_size", self.playlist_size),
            ("cross_genre_spread", self.cross_genre_spread),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(GenerationError::InvalidConfiguration(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn scoring_context(&self, preferences: PreferenceWeights) -> ScoringContext {
        ScoringContext::new(self.property_weights, preferences)
    }

    /// Random source for one run, seeded from `rng_seed` when set.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Where the binary reads its inputs from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Path to the graph snapshot
    pub graph_path: PathBuf,
    pub engine: EngineConfig,
}

impl RuntimeConfig {
    /// Default snapshot location with the given engine settings.
    ///
    /// # Errors
    ///
    /// See [`get_graph_path`].
    pub fn new(engine: EngineConfig) -> Result<Self> {
        Ok(Self {
            graph_path: get_graph_path()?,
            engine,
        })
    }

    /// Explicit snapshot location
    #[must_use]
    pub fn with_graph_path(graph_path: PathBuf, engine: EngineConfig) -> Self {
        Self { graph_path, engine }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.per_seed_limit, 2);
        assert_eq!(config.artist_depth_limit, 250);
        assert_eq!(config.playlist_size, 11);
        assert_eq!(config.cross_genre_spread, 10);
        assert!(config.rng_seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"playlist_size": 20, "rng_seed": 9, "property_weights": {{"tempo": 0.5}}}}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.playlist_size, 20);
        assert_eq!(config.rng_seed, Some(9));
        assert_eq!(config.per_seed_limit, 2);
        assert!((config.property_weights.tempo - 0.5).abs() < f64::EPSILON);
        assert!((config.property_weights.energy - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(EngineConfig::load_or_default(Some(&missing)).is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = EngineConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = EngineConfig {
            playlist_size: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(GenerationError::InvalidConfiguration(msg)) if msg.contains("playlist_size")));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = EngineConfig {
            rng_seed: Some(42),
            ..EngineConfig::default()
        };
        assert_eq!(config.rng().next_u64(), config.rng().next_u64());
    }

    #[test]
    fn test_graph_path_structure() {
        if let Ok(path) = get_graph_path() {
            assert!(path.ends_with("tunegraph/graph.json"));
            assert!(path.parent().is_some_and(Path::is_dir));
        }
    }

    #[test]
    fn test_runtime_config_explicit_path() {
        let config = RuntimeConfig::with_graph_path(PathBuf::from("/tmp/g.json"), EngineConfig::default());
        assert_eq!(config.graph_path, PathBuf::from("/tmp/g.json"));
    }
}
