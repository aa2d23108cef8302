//! Greedy selection of weakly connected songs.

use super::{ensure_seeds, replenish, GenerationStrategy, StrategyKind};
use crate::algorithm::{compare_costs, degree_score, ScoringContext};
use crate::error::{GenerationError, Result};
use crate::graph::{GenreGraph, Song, Visited};
use rand::RngCore;

/// Collects `target` songs, one per round, preferring low-degree songs.
///
/// Each round every slot of the working list offers its lowest-degree
/// eligible neighbour; the offer with the smallest [`degree_score`] against
/// its slot is accepted and takes that slot's place, so the walk moves
/// outward. When no slot has an offer the working list is replenished,
/// at most `max_rounds` times.
#[derive(Debug, Clone)]
pub struct UniquenessStrategy {
    target: usize,
    max_rounds: usize,
    context: ScoringContext,
}

impl UniquenessStrategy {
    #[must_use]
    pub const fn new(target: usize, max_rounds: usize, context: ScoringContext) -> Self {
        Self {
            target,
            max_rounds,
            context,
        }
    }

    /// Best `(slot, song, score)` offer for this round, if any.
    fn best_offer<'g>(
        &self,
        graph: &'g GenreGraph,
        working: &[&'g Song],
        excluded: &Visited,
    ) -> Option<(usize, &'g Song, f64)> {
        let in_working = Visited::from_songs(working.iter().copied());
        working
            .iter()
            .enumerate()
            .filter_map(|(slot, &reference)| {
                graph
                    .neighbours(reference)
                    .map(|(n, _)| n)
                    .filter(|n| !in_working.contains(n) && !excluded.contains(n))
                    .min_by_key(|n| n.degree())
                    .map(|n| (slot, n, degree_score(n, reference, &self.context)))
            })
            .min_by(|a, b| compare_costs(a.2, b.2))
    }
}

impl GenerationStrategy for UniquenessStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Uniqueness
    }

    fn generate<'g>(
        &self,
        graph: &'g GenreGraph,
        seeds: &[&'g Song],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<&'g Song>> {
        ensure_seeds(seeds)?;
        // seeds and accepted songs are never offered again
        let mut excluded = Visited::from_songs(seeds.iter().copied());
        let mut working: Vec<&Song> = seeds.to_vec();
        let mut accepted: Vec<&Song> = Vec::with_capacity(self.target);
        let mut rounds = 0;

        while accepted.len() < self.target {
            if let Some((slot, song, score)) = self.best_offer(graph, &working, &excluded) {
                log::trace!("Uniqueness accepts `{}' (degree {}, score {score:.4})", song.name, song.degree());
                excluded.mark(song);
                accepted.push(song);
                working[slot] = song;
                continue;
            }

            if rounds >= self.max_rounds {
                log::warn!(
                    "Uniqueness strategy gave up with {} of {} songs",
                    accepted.len(),
                    self.target
                );
                return Err(GenerationError::InsufficientCandidates {
                    strategy: StrategyKind::Uniqueness.tag(),
                    found: accepted.len(),
                    needed: self.target,
                    rounds,
                });
            }
            rounds += 1;
            replenish(graph, &mut working, &self.context.property_weights, rng);
        }

        log::debug!("Uniqueness strategy finished after {rounds} replenishment rounds");
        Ok(accepted)
    }
}
