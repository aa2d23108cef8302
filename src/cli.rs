//! # Command-Line Interface Module
//!
//! Clap derive definitions for the `tunegraph` binary.
//!
//! ## Commands
//!
//! - `generate`: Build a playlist from seed songs with one of the six strategies
//! - `genres`: List the genres in the graph snapshot
//! - `search`: Find songs by name or artist
//! - `completion`: Print a shell completion script
//!
//! ## Examples
//!
//! ```bash
//! tunegraph generate level "Song A" "Song B"
//! tunegraph generate preference 4uLU6hMCjMI75M1A2tKUQC --energy 80 --danceability 40
//! tunegraph generate cross-genre "Song A" --bias 0.7 --format json
//! tunegraph --graph ./graph.json search "miles"
//! ```

use crate::algorithm::PreferenceWeights;
use crate::strategy::StrategyKind;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// How `generate` prints its playlist
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Numbered, human-readable list
    #[default]
    Text,
    /// Pretty-printed JSON object
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "tunegraph")]
#[command(about = "tunegraph: playlists from a genre-partitioned song similarity graph")]
#[command(version)]
pub struct Args {
    /// Graph snapshot to load (defaults to the platform data directory)
    #[arg(long, global = true, env = "TUNEGRAPH_GRAPH", value_hint = clap::ValueHint::FilePath)]
    pub graph: Option<PathBuf>,

    /// Engine tuning file (defaults to the platform config directory)
    #[arg(long, global = true, env = "TUNEGRAPH_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a playlist from one or more seed songs
    ///
    /// Seeds are looked up by catalog id first, then by display name.
    /// Songs not yet in the graph can be supplied as JSON with --seed-file;
    /// they are registered before generation.
    Generate {
        /// level, preference, artist, cross-genre, uniqueness or recency
        strategy: StrategyKind,

        /// Seed song ids or names
        #[arg(required_unless_present = "seed_file", value_hint = clap::ValueHint::Other)]
        seeds: Vec<String>,

        /// JSON array of full song records to use as additional seeds
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        seed_file: Option<PathBuf>,

        /// Same-genre penalty for cross-genre, within [0, 1]
        #[arg(long)]
        bias: Option<f64>,

        #[command(flatten)]
        preferences: PreferenceArgs,

        /// Fixed random seed, overriding the tuning file
        #[arg(long)]
        rng_seed: Option<u64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List genres with their song counts and adjacent genres
    Genres,

    /// Search songs by name or artist (case-insensitive)
    Search {
        query: String,
    },

    /// Generate shell completion scripts
    Completion {
        shell: Shell,
    },

    /// Print every song name, one per line, for completion scripts
    #[command(hide = true)]
    CompleteSongs,
}

/// Listener preference weights, each within 0..=100
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct PreferenceArgs {
    #[arg(long, default_value_t = 0.0)]
    pub acousticness: f64,
    #[arg(long, default_value_t = 0.0)]
    pub danceability: f64,
    #[arg(long, default_value_t = 0.0)]
    pub energy: f64,
    #[arg(long, default_value_t = 0.0)]
    pub instrumentalness: f64,
    #[arg(long, default_value_t = 0.0)]
    pub key: f64,
    #[arg(long, default_value_t = 0.0)]
    pub liveness: f64,
}

impl From<PreferenceArgs> for PreferenceWeights {
    fn from(args: PreferenceArgs) -> Self {
        Self {
            acousticness: args.acousticness,
            danceability: args.danceability,
            energy: args.energy,
            instrumentalness: args.instrumentalness,
            key: args.key,
            liveness: args.liveness,
        }
    }
}
