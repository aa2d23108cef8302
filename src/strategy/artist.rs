//! Depth-first search for a song sharing an artist with each seed.
//!
//! The walk keeps its own stack of frames rather than recursing, so a
//! depth limit in the hundreds cannot exhaust the thread stack.

use super::{ensure_seeds, GenerationStrategy, StrategyKind};
use crate::algorithm::compare_costs;
use crate::error::Result;
use crate::graph::{GenreGraph, Song, Visited};
use rand::RngCore;
use std::vec;

/// One song per seed: the first song reached that shares an artist with
/// the seed, or the song sitting at `depth_limit` if none turns up sooner.
///
/// Neighbours are explored heaviest edge first. Seeds whose component runs
/// dry before either condition holds contribute nothing.
#[derive(Debug, Clone)]
pub struct ArtistStrategy {
    depth_limit: usize,
}

struct Frame<'g> {
    depth: usize,
    pending: vec::IntoIter<&'g Song>,
}

impl ArtistStrategy {
    #[must_use]
    pub const fn new(depth_limit: usize) -> Self {
        Self { depth_limit }
    }

    fn search<'g>(&self, graph: &'g GenreGraph, seed: &'g Song, visited: &mut Visited) -> Option<&'g Song> {
        let mut stack = vec![Frame {
            depth: 0,
            pending: heaviest_first(graph, seed, visited),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(song) = frame.pending.next() else {
                stack.pop();
                continue;
            };
            let depth = frame.depth + 1;
            if visited.contains(song) {
                continue;
            }
            if depth >= self.depth_limit {
                log::trace!("Depth limit reached at `{}' from seed `{}'", song.name, seed.name);
                return Some(song);
            }
            if song.shares_artist(&seed.artists) {
                log::trace!("`{}' shares an artist with seed `{}' at depth {depth}", song.name, seed.name);
                return Some(song);
            }
            visited.mark(song);
            stack.push(Frame {
                depth,
                pending: heaviest_first(graph, song, visited),
            });
        }
        None
    }
}

impl GenerationStrategy for ArtistStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Artist
    }

    fn generate<'g>(
        &self,
        graph: &'g GenreGraph,
        seeds: &[&'g Song],
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<&'g Song>> {
        ensure_seeds(seeds)?;
        let mut visited = Visited::from_songs(seeds.iter().copied());
        let mut playlist = Vec::new();

        for &seed in seeds {
            match self.search(graph, seed, &mut visited) {
                Some(song) => {
                    visited.mark(song);
                    playlist.push(song);
                }
                None => log::debug!("No artist match reachable from `{}'", seed.name),
            }
        }

        Ok(playlist)
    }
}

fn heaviest_first<'g>(graph: &'g GenreGraph, song: &'g Song, visited: &Visited) -> vec::IntoIter<&'g Song> {
    let mut next: Vec<(&Song, f64)> = graph
        .neighbours(song)
        .filter(|(n, _)| !visited.contains(n))
        .collect();
    next.sort_by(|a, b| compare_costs(b.1, a.1));
    next.into_iter().map(|(n, _)| n).collect::<Vec<_>>().into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::{chain, date, ids, song};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn by(graph: &mut GenreGraph, id: &str, artist: &str) {
        graph.add_genre("indie");
        graph
            .add_song(Song::new(id, format!("{id} title"), "indie", date(2015)).with_artists([artist]))
            .unwrap();
    }

    #[test]
    fn test_finds_shared_artist_past_heavier_branch() {
        let mut graph = GenreGraph::new();
        by(&mut graph, "seed", "Alpha");
        by(&mut graph, "stranger", "Beta");
        by(&mut graph, "sibling", "Alpha");
        graph.connect_songs("indie", "seed", "stranger", 0.9).unwrap();
        graph.connect_songs("indie", "seed", "sibling", 0.1).unwrap();

        let seeds = [song(&graph, "seed")];
        let out = ArtistStrategy::new(250)
            .generate(&graph, &seeds, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(ids(&out), vec!["sibling"]);
    }

    #[test]
    fn test_descends_before_backtracking() {
        let mut graph = GenreGraph::new();
        by(&mut graph, "seed", "Alpha");
        by(&mut graph, "heavy", "Beta");
        by(&mut graph, "deep", "Alpha");
        by(&mut graph, "light", "Alpha");
        graph.connect_songs("indie", "seed", "heavy", 0.9).unwrap();
        graph.connect_songs("indie", "heavy", "deep", 0.5).unwrap();
        graph.connect_songs("indie", "seed", "light", 0.1).unwrap();

        let seeds = [song(&graph, "seed")];
        let out = ArtistStrategy::new(250)
            .generate(&graph, &seeds, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(ids(&out), vec!["deep"]);
    }

    #[test]
    fn test_depth_limit_returns_song_at_limit() {
        let mut graph = GenreGraph::new();
        chain(&mut graph, "drone", "p", 260);

        let seeds = [song(&graph, "p0")];
        let out = ArtistStrategy::new(250)
            .generate(&graph, &seeds, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(ids(&out), vec!["p250"]);
    }

    #[test]
    fn test_at_most_one_result_per_seed() {
        let mut graph = GenreGraph::new();
        by(&mut graph, "a", "Alpha");
        by(&mut graph, "b", "Beta");
        by(&mut graph, "a2", "Alpha");
        by(&mut graph, "a3", "Alpha");
        by(&mut graph, "b2", "Beta");
        graph.connect_songs("indie", "a", "a2", 0.5).unwrap();
        graph.connect_songs("indie", "a", "a3", 0.4).unwrap();
        graph.connect_songs("indie", "b", "b2", 0.5).unwrap();
        graph.connect_songs("indie", "a", "b", 0.1).unwrap();

        let seeds = [song(&graph, "a"), song(&graph, "b")];
        let out = ArtistStrategy::new(250)
            .generate(&graph, &seeds, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(ids(&out), vec!["a2", "b2"]);
    }

    #[test]
    fn test_exhausted_component_yields_nothing() {
        let mut graph = GenreGraph::new();
        by(&mut graph, "seed", "Alpha");
        by(&mut graph, "other", "Beta");
        graph.connect_songs("indie", "seed", "other", 0.5).unwrap();

        let seeds = [song(&graph, "seed")];
        let out = ArtistStrategy::new(250)
            .generate(&graph, &seeds, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(out.is_empty());
    }
}
