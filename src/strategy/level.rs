//! Level-order (breadth-first) expansion around each seed.

use super::{ensure_seeds, GenerationStrategy, StrategyKind};
use crate::algorithm::compare_costs;
use crate::error::Result;
use crate::graph::{GenreGraph, Song, Visited};
use rand::RngCore;
use std::collections::VecDeque;

/// Emits up to `per_seed` songs per seed, nearest levels first.
///
/// Expansion stays inside the seed's genre song graph and enqueues
/// neighbours in ascending edge weight, so the closest song of each level
/// is emitted first. One [`Visited`] set spans all seeds, so no candidate
/// repeats across seeds.
#[derive(Debug, Clone)]
pub struct LevelStrategy {
    per_seed: usize,
}

impl LevelStrategy {
    #[must_use]
    pub const fn new(per_seed: usize) -> Self {
        Self { per_seed }
    }
}

impl GenerationStrategy for LevelStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Level
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
            let emitted = expand_levels(graph, seed, self.per_seed, &mut visited, &mut playlist);
            log::trace!("Level expansion from `{}' emitted {emitted}", seed.name);
        }

        log::debug!("Level strategy produced {} candidates for {} seeds", playlist.len(), seeds.len());
        Ok(playlist)
    }
}

fn expand_levels<'g>(
    graph: &'g GenreGraph,
    seed: &'g Song,
    limit: usize,
    visited: &mut Visited,
    playlist: &mut Vec<&'g Song>,
) -> usize {
    if limit == 0 {
        return 0;
    }
    let mut emitted = 0;
    let mut queue = VecDeque::new();
    enqueue_closest(graph, seed, visited, &mut queue);

    while let Some(song) = queue.pop_front() {
        if visited.contains(song) {
            continue;
        }
        visited.mark(song);
        playlist.push(song);
        emitted += 1;
        if emitted >= limit {
            break;
        }
        enqueue_closest(graph, song, visited, &mut queue);
    }
    emitted
}

/// Push `song`'s unvisited neighbours, lowest edge weight first.
fn enqueue_closest<'g>(
    graph: &'g GenreGraph,
    song: &'g Song,
    visited: &Visited,
    queue: &mut VecDeque<&'g Song>,
) {
    let mut next: Vec<(&Song, f64)> = graph
        .neighbours(song)
        .filter(|(n, _)| !visited.contains(n))
        .collect();
    next.sort_by(|a, b| compare_costs(a.1, b.1));
    queue.extend(next.into_iter().map(|(n, _)| n));
}
