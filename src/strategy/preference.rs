//! Single-hop selection ranked by the listener's feature preferences.

use super::{ensure_seeds, GenerationStrategy, StrategyKind};
use crate::algorithm::{compare_costs, preference_cost, PreferenceWeights};
use crate::error::Result;
use crate::graph::{GenreGraph, Song, Visited};
use rand::RngCore;

/// Picks, for every seed, the `per_seed` direct neighbours that best match
/// the preference weights.
///
/// Neighbours are ranked by [`preference_cost`] (lower is a better match),
/// ties broken by edge weight. A song scoring zero on every weighted feature
/// has infinite cost and sorts last.
#[derive(Debug, Clone)]
pub struct PreferenceStrategy {
    per_seed: usize,
    preferences: PreferenceWeights,
}

impl PreferenceStrategy {
    #[must_use]
    pub const fn new(per_seed: usize, preferences: PreferenceWeights) -> Self {
        Self { per_seed, preferences }
    }
}

impl GenerationStrategy for PreferenceStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Preference
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
            let mut ranked: Vec<(&Song, f64, f64)> = graph
                .neighbours(seed)
                .filter(|(n, _)| !visited.contains(n))
                .map(|(n, weight)| (n, preference_cost(n, &self.preferences), weight))
                .collect();
            ranked.sort_by(|a, b| compare_costs(a.1, b.1).then_with(|| compare_costs(a.2, b.2)));

            let mut taken = 0;
            for (song, cost, _) in ranked {
                if taken >= self.per_seed {
                    break;
                }
                if visited.contains(song) {
                    continue;
                }
                log::trace!("Preference pick `{}' (cost {cost:.4}) for seed `{}'", song.name, seed.name);
                visited.mark(song);
                playlist.push(song);
                taken += 1;
            }
        }

        log::debug!("Preference strategy produced {} candidates", playlist.len());
        Ok(playlist)
    }
}
