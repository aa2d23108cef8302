//! # Integration Tests for tunegraph
//!
//! End-to-end checks over a synthetic three-genre graph: every strategy
//! through the public engine, snapshot loading from disk, and the binary's
//! command-line surface.

use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;
use tunegraph::algorithm::PreferenceWeights;
use tunegraph::graph::{AudioFeatures, GenreGraph, Property, Song};
use tunegraph::{GenerationError, GenerationRequest, PlaylistEngine, StrategyKind};

fn year(y: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, 3, 15).unwrap()
}

fn features(energy: f64, danceability: f64) -> AudioFeatures {
    AudioFeatures::default()
        .with(Property::Energy, energy)
        .with(Property::Danceability, danceability)
}

#[allow(clippy::cast_precision_loss)]
fn add_chain(graph: &mut GenreGraph, genre: &str, prefix: &str, n: usize, base_energy: f64, first_year: i32) {
    graph.add_genre(genre);
    for i in 0..n {
        let id = format!("{prefix}{i:02}");
        let song = Song::new(id.clone(), format!("{genre} song {i}"), genre, year(first_year + i as i32))
            .with_artists([format!("{genre} artist {}", i % 3)])
            .with_properties(features(base_energy + i as f64 / 100.0, (i % 5) as f64 / 5.0));
        graph.add_song(song).unwrap();
    }
    for i in 1..n {
        let weight = 0.2 + (i % 4) as f64 / 10.0;
        graph
            .connect_songs(genre, &format!("{prefix}{:02}", i - 1), &format!("{prefix}{i:02}"), weight)
            .unwrap();
    }
}

/// rock (hub + 30-song chain) -- jazz (20) -- pop (15)
fn create_test_graph() -> GenreGraph {
    let mut graph = GenreGraph::new();
    add_chain(&mut graph, "rock", "r", 30, 0.1, 1990);
    add_chain(&mut graph, "jazz", "j", 20, 0.45, 2000);
    add_chain(&mut graph, "pop", "p", 15, 0.8, 2005);

    graph
        .add_song(
            Song::new("rock-hub", "Rock Hub", "rock", year(1980))
                .with_artists(["House Band"])
                .with_properties(features(0.25, 0.5)),
        )
        .unwrap();
    for i in 0..30 {
        graph.connect_songs("rock", "rock-hub", &format!("r{i:02}"), 0.9).unwrap();
    }

    graph.connect_genres("rock", "jazz", 0.4).unwrap();
    graph.connect_genres("jazz", "pop", 0.6).unwrap();
    graph.refresh_averages();
    graph
}

/// Test helper to write a snapshot of the test graph to a temp directory
fn create_test_snapshot() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("graph.json");
    std::fs::write(&path, serde_json::to_string(&create_test_graph())?)?;
    Ok((temp_dir, path))
}

fn seeds(graph: &GenreGraph, ids: &[&str]) -> Vec<Song> {
    ids.iter().map(|id| graph.find_song(id).cloned().unwrap()).collect()
}

fn assert_no_seed_or_duplicate(songs: &[Song], seed_ids: &[&str]) {
    let mut seen: HashSet<&str> = seed_ids.iter().copied().collect();
    for song in songs {
        assert!(seen.insert(song.id.as_str()), "`{}' is a seed or repeated", song.id);
    }
}

fn rng() -> rand::rngs::StdRng {
    rand::SeedableRng::seed_from_u64(2024)
}

#[cfg(test)]
mod strategy_integration_tests {
    use super::*;

    #[test]
    fn test_level_caps_per_seed() -> Result<()> {
        let mut graph = create_test_graph();
        let ids = ["r05", "r20"];
        let seed_songs = seeds(&graph, &ids);
        let playlist = PlaylistEngine::default().make_playlist(
            &mut graph,
            seed_songs,
            &GenerationRequest::new(StrategyKind::Level),
            &mut rng(),
        )?;

        assert!(playlist.len() <= 2 * ids.len());
        assert!(playlist.name.starts_with("level gen "));
        assert_no_seed_or_duplicate(&playlist.songs, &ids);
        assert!(playlist.songs.iter().all(|s| s.genre == "rock"));
        Ok(())
    }

    #[test]
    fn test_preference_favours_weighted_feature() -> Result<()> {
        let mut graph = create_test_graph();
        let ids = ["rock-hub"];
        let request = GenerationRequest::new(StrategyKind::Preference).with_preferences(PreferenceWeights {
            energy: 100.0,
            ..PreferenceWeights::default()
        });
        let seed_songs = seeds(&graph, &ids);
        let playlist = PlaylistEngine::default().make_playlist(&mut graph, seed_songs, &request, &mut rng())?;

        // the two most energetic rock songs hang off the hub
        assert_eq!(playlist.track_ids(), vec!["r29", "r28"]);
        Ok(())
    }

    #[test]
    fn test_artist_one_per_seed() -> Result<()> {
        let mut graph = create_test_graph();
        let ids = ["r00", "r01", "j00"];
        let seed_songs = seeds(&graph, &ids);
        let playlist = PlaylistEngine::default().make_playlist(
            &mut graph,
            seed_songs,
            &GenerationRequest::new(StrategyKind::Artist),
            &mut rng(),
        )?;

        assert!(playlist.len() <= ids.len());
        assert_no_seed_or_duplicate(&playlist.songs, &ids);
        Ok(())
    }

    #[test]
    fn test_cross_genre_bias_moves_away_from_seed_genre() -> Result<()> {
        let graph = create_test_graph();
        let ids = ["r29"];
        let engine = PlaylistEngine::default();
        let foreign_count = |bias: f64| -> Result<usize> {
            let request = GenerationRequest::new(StrategyKind::CrossGenre).with_bias(bias);
            let playlist = engine.make_playlist(&mut graph.clone(), seeds(&graph, &ids), &request, &mut rng())?;
            assert!(playlist.len() <= 11);
            assert_no_seed_or_duplicate(&playlist.songs, &ids);
            Ok(playlist.songs.iter().filter(|s| s.genre != "rock").count())
        };

        assert!(foreign_count(1.0)? >= foreign_count(0.0)?);
        assert!(foreign_count(1.0)? > 0);
        Ok(())
    }

    #[test]
    fn test_uniqueness_returns_exactly_eleven() -> Result<()> {
        let mut graph = create_test_graph();
        let ids = ["r00"];
        let seed_songs = seeds(&graph, &ids);
        let playlist = PlaylistEngine::default().make_playlist(
            &mut graph,
            seed_songs,
            &GenerationRequest::new(StrategyKind::Uniqueness),
            &mut rng(),
        )?;

        assert_eq!(playlist.len(), 11);
        assert_no_seed_or_duplicate(&playlist.songs, &ids);
        Ok(())
    }

    #[test]
    fn test_recency_returns_exactly_eleven_newer_songs() -> Result<()> {
        let mut graph = create_test_graph();
        let ids = ["rock-hub"];
        let seed_songs = seeds(&graph, &ids);
        let playlist = PlaylistEngine::default().make_playlist(
            &mut graph,
            seed_songs,
            &GenerationRequest::new(StrategyKind::Recency),
            &mut rng(),
        )?;

        assert_eq!(playlist.len(), 11);
        assert!(playlist.songs.iter().all(|s| s.release_date > year(1980)));
        assert_no_seed_or_duplicate(&playlist.songs, &ids);
        Ok(())
    }

    #[test]
    fn test_tiny_graph_reports_insufficient_candidates() {
        let mut graph = GenreGraph::new();
        add_chain(&mut graph, "folk", "f", 3, 0.3, 2010);
        let engine = PlaylistEngine::default();

        for kind in [StrategyKind::Uniqueness, StrategyKind::Recency] {
            let seed_songs = seeds(&graph, &["f00"]);
            let err = engine
                .make_playlist(&mut graph, seed_songs, &GenerationRequest::new(kind), &mut rng())
                .unwrap_err();
            assert!(
                matches!(err, GenerationError::InsufficientCandidates { needed: 11, .. }),
                "{kind} should give up, got {err}"
            );
        }
    }

    #[test]
    fn test_new_seed_is_registered_symmetrically() -> Result<()> {
        let mut graph = create_test_graph();
        let mut newcomer = Song::new("fresh", "Fresh Track", "jazz", year(2030)).with_properties(features(0.5, 0.2));
        newcomer.neighbours.insert("j03".to_string(), 0.15);
        newcomer.neighbours.insert("missing".to_string(), 0.1);

        let playlist = PlaylistEngine::default().make_playlist(
            &mut graph,
            vec![newcomer],
            &GenerationRequest::new(StrategyKind::Level),
            &mut rng(),
        )?;

        assert_eq!(playlist.track_ids()[0], "j03");
        let fresh = graph.find_song("fresh").unwrap();
        assert!(!fresh.neighbours.contains_key("missing"));
        assert!(graph.find_song("j03").unwrap().neighbours.contains_key("fresh"));
        Ok(())
    }
}

#[cfg(test)]
mod snapshot_integration_tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip_from_disk() -> Result<()> {
        let (_dir, path) = create_test_snapshot()?;
        let graph = GenreGraph::from_json_file(&path)?;

        assert_eq!(graph.genres.len(), 3);
        assert_eq!(graph.song_count(), 66);
        let hub = graph.find_song("rock-hub").unwrap();
        assert_eq!(hub.degree(), 30);
        assert!(graph.genre("jazz").unwrap().neighbours.contains_key("pop"));
        Ok(())
    }

    #[test]
    fn test_malformed_snapshot_is_a_format_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"genres\": 7}")?;
        assert!(matches!(
            GenreGraph::from_json_file(&path),
            Err(GenerationError::SnapshotFormat(_))
        ));
        Ok(())
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn tunegraph() -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tunegraph"));
        cmd.env_remove("TUNEGRAPH_GRAPH").env_remove("TUNEGRAPH_CONFIG");
        cmd
    }

    #[test]
    fn test_cli_help_displays_correctly() {
        let output = tunegraph().arg("--help").output().expect("Failed to run help command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("tunegraph"));
        assert!(stdout.contains("generate"));
        assert!(stdout.contains("genres"));
        assert!(stdout.contains("search"));
        assert!(stdout.contains("completion"));
    }

    #[test]
    fn test_cli_version_flag() {
        let output = tunegraph().arg("--version").output().expect("Failed to run version command");

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("tunegraph"));
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_completion_generation() {
        let output = tunegraph()
            .args(["completion", "bash"])
            .output()
            .expect("Failed to run completion command");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("_tunegraph"));
        assert!(stdout.contains("complete"));
    }

    #[test]
    fn test_generate_json_output() -> Result<()> {
        let (_dir, path) = create_test_snapshot()?;
        let output = tunegraph()
            .arg("--graph")
            .arg(&path)
            .args(["generate", "level", "r05", "--rng-seed", "1", "--format", "json"])
            .output()?;

        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let body: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert!(body["name"].as_str().unwrap().starts_with("level gen "));
        assert_eq!(body["strategy"], "level");
        let tracks = body["tracks"].as_array().unwrap();
        assert!(!tracks.is_empty() && tracks.len() <= 2);
        assert!(tracks.iter().all(|t| t["id"] != "r05"));
        Ok(())
    }

    #[test]
    fn test_generate_by_song_name() -> Result<()> {
        let (_dir, path) = create_test_snapshot()?;
        let output = tunegraph()
            .arg("--graph")
            .arg(&path)
            .args(["generate", "recency", "Rock Hub", "--rng-seed", "9"])
            .output()?;

        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.starts_with("recent songs "));
        assert_eq!(stdout.lines().count(), 12);
        Ok(())
    }

    #[test]
    fn test_unknown_seed_fails() -> Result<()> {
        let (_dir, path) = create_test_snapshot()?;
        let output = tunegraph()
            .arg("--graph")
            .arg(&path)
            .args(["generate", "level", "no-such-song"])
            .output()?;

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Song not found"));
        Ok(())
    }

    #[test]
    fn test_cross_genre_without_bias_fails() -> Result<()> {
        let (_dir, path) = create_test_snapshot()?;
        let output = tunegraph()
            .arg("--graph")
            .arg(&path)
            .args(["generate", "cross-genre", "r05"])
            .output()?;

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("requires a bias"));
        Ok(())
    }

    #[test]
    fn test_search_and_genres() -> Result<()> {
        let (_dir, path) = create_test_snapshot()?;
        let search = tunegraph().arg("--graph").arg(&path).args(["search", "HUB"]).output()?;
        assert!(search.status.success());
        assert!(String::from_utf8_lossy(&search.stdout).contains("rock-hub"));

        let genres = tunegraph().arg("--graph").arg(&path).arg("genres").output()?;
        let stdout = String::from_utf8_lossy(&genres.stdout);
        assert!(stdout.contains("jazz (20 songs) -> pop, rock"));
        Ok(())
    }
}
