//! Exploration into genres adjacent (by average sound) to the seeds' genres.

use super::{ensure_seeds, GenerationStrategy, StrategyKind};
use crate::algorithm::{biased_score, compare_costs, genre_distance, ScoringContext};
use crate::error::{GenerationError, Result};
use crate::graph::{Genre, GenreGraph, Song, Visited};
use rand::RngCore;

/// Ranks songs from the seed genres and their nearest neighbouring genres.
///
/// Every genre is ordered by distance from the mean of the seed genres'
/// average vectors. Around each seed genre's position in that order, the
/// `spread / |seed genres|` closest non-seed genres on either side become
/// viable. Each song in a viable genre is scored by the mean
/// [`biased_score`] against the seeds; `bias` inflates same-genre scores,
/// so larger values push results away from the seeds' own genres.
#[derive(Debug, Clone)]
pub struct CrossGenreStrategy {
    bias: f64,
    spread: usize,
    limit: usize,
    context: ScoringContext,
}

impl CrossGenreStrategy {
    /// # Errors
    ///
    /// [`GenerationError::InvalidConfiguration`] unless `bias` is within `[0, 1]`.
    pub fn new(bias: f64, spread: usize, limit: usize, context: ScoringContext) -> Result<Self> {
        if !(0.0..=1.0).contains(&bias) {
            return Err(GenerationError::InvalidConfiguration(format!(
                "cross-genre bias must be within [0, 1], got {bias}"
            )));
        }
        Ok(Self {
            bias,
            spread,
            limit,
            context,
        })
    }

    /// Seed genres followed by the nearby genres worth drawing from.
    fn viable_genres<'g>(&self, graph: &'g GenreGraph, seed_genres: &[&'g Genre]) -> Vec<&'g Genre> {
        let mut ranked: Vec<(&Genre, f64)> = graph
            .genres
            .values()
            .map(|g| (g, genre_distance(g, seed_genres, &self.context.property_weights)))
            .collect();
        ranked.sort_by(|a, b| compare_costs(a.1, b.1));

        let is_seed_genre = |g: &Genre| seed_genres.iter().any(|s| s.name == g.name);
        let reach = (self.spread / seed_genres.len()).max(1);
        let mut viable: Vec<&Genre> = seed_genres.to_vec();

        for seed_genre in seed_genres {
            let Some(position) = ranked.iter().position(|(g, _)| g.name == seed_genre.name) else {
                continue;
            };
            for offset in 1..=reach {
                let before = position.checked_sub(offset).map(|i| ranked[i].0);
                let after = ranked.get(position + offset).map(|(g, _)| *g);
                for genre in before.into_iter().chain(after) {
                    if !is_seed_genre(genre) && !viable.iter().any(|v| v.name == genre.name) {
                        viable.push(genre);
                    }
                }
            }
        }
        viable
    }
}

impl GenerationStrategy for CrossGenreStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CrossGenre
    }

    fn generate<'g>(
        &self,
        graph: &'g GenreGraph,
        seeds: &[&'g Song],
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<&'g Song>> {
        ensure_seeds(seeds)?;

        let mut seed_genres: Vec<&Genre> = Vec::new();
        for seed in seeds {
            let genre = graph
                .genre(&seed.genre)
                .ok_or_else(|| GenerationError::UnknownGenre(seed.genre.clone()))?;
            if !seed_genres.iter().any(|g| g.name == genre.name) {
                seed_genres.push(genre);
            }
        }

        let viable = self.viable_genres(graph, &seed_genres);
        log::debug!(
            "Cross-genre viable set for {:?}: {:?}",
            seed_genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
            viable.iter().map(|g| g.name.as_str()).collect::<Vec<_>>()
        );

        let mut visited = Visited::from_songs(seeds.iter().copied());
        #[allow(clippy::cast_precision_loss)]
        let seed_count = seeds.len() as f64;
        let mut scored: Vec<(&Song, f64)> = viable
            .into_iter()
            .flat_map(|g| g.song_graph.songs.values())
            .filter(|s| !visited.contains(s))
            .map(|s| {
                let total: f64 = seeds
                    .iter()
                    .map(|seed| biased_score(s, seed, self.bias, &self.context))
                    .sum();
                (s, total / seed_count)
            })
            .collect();
        scored.sort_by(|a, b| compare_costs(a.1, b.1));

        let mut playlist = Vec::new();
        for (song, score) in scored {
            if playlist.len() >= self.limit {
                break;
            }
            if visited.contains(song) {
                continue;
            }
            log::trace!("Cross-genre pick `{}' from {} (score {score:.4})", song.name, song.genre);
            visited.mark(song);
            playlist.push(song);
        }
        Ok(playlist)
    }
}
