//! Selection of songs newer than every seed.

use super::{ensure_seeds, replenish, GenerationStrategy, StrategyKind};
use crate::algorithm::{compare_costs, dissimilarity_to_mean, PropertyWeights};
use crate::error::{GenerationError, Result};
use crate::graph::{GenreGraph, Song, Visited};
use rand::RngCore;

/// Returns `target` neighbours of the working list released strictly after
/// the earliest seed, closest to the working list's mean sound first.
///
/// If fewer than `target` qualify the working list is replenished and the
/// scan repeats, at most `max_rounds` times.
#[derive(Debug, Clone)]
pub struct RecencyStrategy {
    target: usize,
    max_rounds: usize,
    weights: PropertyWeights,
}

impl RecencyStrategy {
    #[must_use]
    pub const fn new(target: usize, max_rounds: usize, weights: PropertyWeights) -> Self {
        Self {
            target,
            max_rounds,
            weights,
        }
    }

    fn qualifying<'g>(
        &self,
        graph: &'g GenreGraph,
        working: &[&'g Song],
        seed_keys: &Visited,
        floor: chrono::NaiveDate,
    ) -> Vec<&'g Song> {
        let mut scored: Vec<(&Song, f64)> = working
            .iter()
            .flat_map(|&s| graph.neighbours(s))
            .map(|(n, _)| (n, dissimilarity_to_mean(n, working, &self.weights)))
            .collect();
        scored.sort_by(|a, b| compare_costs(a.1, b.1));

        let mut seen = Visited::new();
        let mut selected = Vec::new();
        for (song, _) in scored {
            if song.release_date > floor && !seen.contains(song) && !seed_keys.contains(song) {
                seen.mark(song);
                selected.push(song);
            }
        }
        selected
    }
}

impl GenerationStrategy for RecencyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Recency
    }

    fn generate<'g>(
        &self,
        graph: &'g GenreGraph,
        seeds: &[&'g Song],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<&'g Song>> {
        ensure_seeds(seeds)?;
        let floor = seeds
            .iter()
            .map(|s| s.release_date)
            .min()
            .ok_or(GenerationError::EmptySeeds)?;
        let seed_keys = Visited::from_songs(seeds.iter().copied());
        let mut working: Vec<&Song> = seeds.to_vec();
        let mut rounds = 0;

        loop {
            let mut selected = self.qualifying(graph, &working, &seed_keys, floor);
            if selected.len() >= self.target {
                selected.truncate(self.target);
                log::debug!("Recency strategy found {} songs newer than {floor} after {rounds} rounds", selected.len());
                return Ok(selected);
            }

            if rounds >= self.max_rounds {
                log::warn!(
                    "Recency strategy gave up with {} of {} songs newer than {floor}",
                    selected.len(),
                    self.target
                );
                return Err(GenerationError::InsufficientCandidates {
                    strategy: StrategyKind::Recency.tag(),
                    found: selected.len(),
                    needed: self.target,
                    rounds,
                });
            }
            rounds += 1;
            replenish(graph, &mut working, &self.weights, rng);
        }
    }
}
