//! # tunegraph
//!
//! Command-line front end: loads a graph snapshot, resolves seed songs and
//! prints the generated playlist.
//!
//! ## Usage
//!
//! ```bash
//! tunegraph generate level "Song A"
//! tunegraph generate uniqueness "Song A" "Song B" --format json
//! tunegraph genres
//! tunegraph search "coltrane"
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tunegraph::cli::{self, OutputFormat};
use tunegraph::completion;
use tunegraph::config::{EngineConfig, RuntimeConfig};
use tunegraph::error::GenerationError;
use tunegraph::graph::{GenreGraph, Song};
use tunegraph::playlist::{GenerationRequest, GeneratedPlaylist, PlaylistEngine};

/// Main entry point.
///
/// Logging is controlled through `RUST_LOG`:
/// - `RUST_LOG=debug tunegraph generate level "Song A"` - engine decisions
/// - `RUST_LOG=tunegraph::strategy=trace tunegraph ...` - every candidate considered
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    match args.command {
        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(&shell), &mut cmd);
        }
        cli::Command::CompleteSongs => {
            let runtime = runtime_config(args.graph, args.config.as_deref())?;
            let graph = load_graph(&runtime.graph_path)?;
            completion::write_song_completions(&graph, &mut io::stdout().lock())?;
        }
        cli::Command::Genres => {
            let runtime = runtime_config(args.graph, args.config.as_deref())?;
            let graph = load_graph(&runtime.graph_path)?;
            for (name, genre) in &graph.genres {
                let adjacent: Vec<&str> = genre.neighbours.keys().map(String::as_str).collect();
                println!("{name} ({} songs) -> {}", genre.song_graph.len(), adjacent.join(", "));
            }
        }
        cli::Command::Search { query } => {
            let runtime = runtime_config(args.graph, args.config.as_deref())?;
            let graph = load_graph(&runtime.graph_path)?;
            let hits = graph.search(&query);
            if hits.is_empty() {
                println!("No songs match '{query}'");
            }
            for song in hits {
                println!("{}  {} - {} ({})", song.id, song.name, song.artists.join(", "), song.genre);
            }
        }
        cli::Command::Generate {
            strategy,
            seeds,
            seed_file,
            bias,
            preferences,
            rng_seed,
            format,
        } => {
            let mut runtime = runtime_config(args.graph, args.config.as_deref())?;
            if rng_seed.is_some() {
                runtime.engine.rng_seed = rng_seed;
            }
            let mut graph = load_graph(&runtime.graph_path)?;

            let mut seed_songs = resolve_seeds(&graph, &seeds)?;
            if let Some(path) = seed_file {
                seed_songs.extend(read_seed_file(&path)?);
            }

            let request = GenerationRequest {
                strategy,
                preferences: preferences.into(),
                bias,
            };

            let engine = PlaylistEngine::new(runtime.engine);
            let mut rng = engine.config().rng();
            let playlist = engine
                .make_playlist(&mut graph, seed_songs, &request, &mut rng)
                .with_context(|| format!("Failed to generate {strategy} playlist"))?;

            print_playlist(&playlist, format)?;
        }
    }

    Ok(())
}

fn runtime_config(graph: Option<PathBuf>, config: Option<&Path>) -> Result<RuntimeConfig> {
    let engine = EngineConfig::load_or_default(config)?;
    match graph {
        Some(path) => Ok(RuntimeConfig::with_graph_path(path, engine)),
        None => RuntimeConfig::new(engine),
    }
}

fn load_graph(path: &Path) -> Result<GenreGraph> {
    debug!("Loading graph snapshot from {}", path.display());
    GenreGraph::from_json_file(path).with_context(|| {
        format!(
            "Failed to load graph snapshot {}. Pass --graph or set TUNEGRAPH_GRAPH.",
            path.display()
        )
    })
}

/// Resolve every key to a copy of the graph's song.
fn resolve_seeds(graph: &GenreGraph, keys: &[String]) -> Result<Vec<Song>> {
    keys.iter()
        .map(|key| {
            graph
                .find_song(key)
                .cloned()
                .ok_or_else(|| GenerationError::UnknownSong(key.clone()).into())
        })
        .collect()
}

fn read_seed_file(path: &Path) -> Result<Vec<Song>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let songs: Vec<Song> =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse seed file {}", path.display()))?;
    debug!("Read {} seeds from {}", songs.len(), path.display());
    Ok(songs)
}

fn print_playlist(playlist: &GeneratedPlaylist, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", playlist.name);
            for (i, song) in playlist.songs.iter().enumerate() {
                println!(
                    "{:>3}. {} - {} ({}, {}) [{}]",
                    i + 1,
                    song.name,
                    song.artists.join(", "),
                    song.genre,
                    song.release_date,
                    song.id
                );
            }
        }
        OutputFormat::Json => {
            let tracks: Vec<serde_json::Value> = playlist
                .songs
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "id": s.id,
                        "name": s.name,
                        "artists": s.artists,
                        "genre": s.genre,
                        "release_date": s.release_date,
                    })
                })
                .collect();
            let body = serde_json::json!({
                "name": playlist.name,
                "strategy": playlist.strategy,
                "tracks": tracks,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }
    Ok(())
}
