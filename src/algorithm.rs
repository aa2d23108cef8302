//! Scoring primitives shared by every generation strategy.
//!
//! All scores here are costs: **lower is a better match**, and every
//! strategy sorts ascending on them. Edge weights in the graph follow the
//! same convention (they are dissimilarities).
//!
//! ```text
//! dissimilarity(a, b)   = Σ_p |w_p| · |a_p − b_p|            (all 11 features)
//! preference(s)         = Σ_p (pref_p / 100) · s_p            (first 6 features)
//! pref_term(a, b)       = 1 / |mean(preference(a), preference(b))|   if both ≠ 0
//! composite(a, b)       = dissimilarity(a, b) + pref_term(a, b)
//! biased(a, b, bias)    = (bias + 1)·dissimilarity  (same genre) + pref_term
//! degree(a, b)          = √deg(a) · dissimilarity + pref_term
//! ```

use crate::error::{GenerationError, Result};
use crate::graph::{AudioFeatures, Genre, Property, Song};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Caller-supplied taste, one 0–100 weight per preference feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceWeights {
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub key: f64,
    pub liveness: f64,
}

impl PreferenceWeights {
    /// Weight for `property`; zero for features outside [`Property::PREFERENCE`].
    #[must_use]
    pub const fn get(&self, property: Property) -> f64 {
        match property {
            Property::Acousticness => self.acousticness,
            Property::Danceability => self.danceability,
            Property::Energy => self.energy,
            Property::Instrumentalness => self.instrumentalness,
            Property::Key => self.key,
            Property::Liveness => self.liveness,
            _ => 0.0,
        }
    }

    /// # Errors
    ///
    /// [`GenerationError::InvalidConfiguration`] if any weight is outside `0..=100`.
    pub fn validate(&self) -> Result<()> {
        for property in Property::PREFERENCE {
            let weight = self.get(property);
            if !(0.0..=100.0).contains(&weight) {
                return Err(GenerationError::InvalidConfiguration(format!(
                    "preference weight for {} must be within 0..=100, got {weight}",
                    property.name()
                )));
            }
        }
        Ok(())
    }
}

/// Absolute per-feature weights used by every dissimilarity.
///
/// Defaults bring `key` (0–11), `loudness` (about −60–0 dB) and `tempo`
/// (BPM) onto roughly the same unit scale as the ratio features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyWeights {
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub key: f64,
    pub liveness: f64,
    pub mode: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub tempo: f64,
    pub valence: f64,
}

impl Default for PropertyWeights {
    fn default() -> Self {
        Self {
            acousticness: 1.0,
            danceability: 1.0,
            energy: 1.0,
            instrumentalness: 1.0,
            key: 1.0 / 11.0,
            liveness: 1.0,
            mode: 1.0,
            loudness: 1.0 / 60.0,
            speechiness: 1.0,
            tempo: 1.0 / 200.0,
            valence: 1.0,
        }
    }
}

impl PropertyWeights {
    /// Every feature weighted 1.
    #[must_use]
    pub const fn uniform() -> Self {
        Self {
            acousticness: 1.0,
            danceability: 1.0,
            energy: 1.0,
            instrumentalness: 1.0,
            key: 1.0,
            liveness: 1.0,
            mode: 1.0,
            loudness: 1.0,
            speechiness: 1.0,
            tempo: 1.0,
            valence: 1.0,
        }
    }

    #[must_use]
    pub const fn get(&self, property: Property) -> f64 {
        match property {
            Property::Acousticness => self.acousticness,
            Property::Danceability => self.danceability,
            Property::Energy => self.energy,
            Property::Instrumentalness => self.instrumentalness,
            Property::Key => self.key,
            Property::Liveness => self.liveness,
            Property::Mode => self.mode,
            Property::Loudness => self.loudness,
            Property::Speechiness => self.speechiness,
            Property::Tempo => self.tempo,
            Property::Valence => self.valence,
        }
    }
}

/// Everything a composite score needs besides the two songs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringContext {
    pub property_weights: PropertyWeights,
    pub preferences: PreferenceWeights,
}

impl ScoringContext {
    #[must_use]
    pub const fn new(property_weights: PropertyWeights, preferences: PreferenceWeights) -> Self {
        Self {
            property_weights,
            preferences,
        }
    }
}

/// Weighted sum of the six preference features, each scaled by `weight / 100`.
#[must_use]
pub fn preference_score(song: &Song, preferences: &PreferenceWeights) -> f64 {
    Property::PREFERENCE
        .iter()
        .map(|&p| preferences.get(p) / 100.0 * song.properties.get(p))
        .sum()
}

/// Preference as a cost: `1 / preference_score`, infinite when the score is zero.
#[must_use]
pub fn preference_cost(song: &Song, preferences: &PreferenceWeights) -> f64 {
    let score = preference_score(song, preferences);
    if score == 0.0 {
        f64::INFINITY
    } else {
        1.0 / score.abs()
    }
}

/// Weighted L1 distance between two feature vectors.
#[must_use]
pub fn feature_distance(a: &AudioFeatures, b: &AudioFeatures, weights: &PropertyWeights) -> f64 {
    Property::ALL
        .iter()
        .map(|&p| weights.get(p).abs() * (a.get(p) - b.get(p)).abs())
        .sum()
}

/// Base distance between two songs.
#[must_use]
pub fn dissimilarity(song: &Song, target: &Song, weights: &PropertyWeights) -> f64 {
    feature_distance(&song.properties, &target.properties, weights)
}

/// Distance from `song` to the mean feature vector of `songs`.
/// Infinite for an empty list.
#[must_use]
pub fn dissimilarity_to_mean(song: &Song, songs: &[&Song], weights: &PropertyWeights) -> f64 {
    AudioFeatures::mean(songs.iter().map(|s| &s.properties))
        .map_or(f64::INFINITY, |mean| feature_distance(&song.properties, &mean, weights))
}

/// Distance from a genre's aggregate vector to the mean of `genres`.
/// Infinite for an empty set.
#[must_use]
pub fn genre_distance(genre: &Genre, genres: &[&Genre], weights: &PropertyWeights) -> f64 {
    AudioFeatures::mean(genres.iter().map(|g| &g.average_properties)).map_or(f64::INFINITY, |mean| {
        feature_distance(&genre.average_properties, &mean, weights)
    })
}

/// `1 / |mean preference|` of the pair, or zero unless both scores are non-zero.
#[must_use]
pub fn preference_term(a: &Song, b: &Song, preferences: &PreferenceWeights) -> f64 {
    let score_a = preference_score(a, preferences);
    let score_b = preference_score(b, preferences);
    if score_a != 0.0 && score_b != 0.0 {
        1.0 / ((score_a + score_b) / 2.0).abs()
    } else {
        0.0
    }
}

/// Plain similarity score: dissimilarity plus the preference term.
#[must_use]
pub fn composite_score(candidate: &Song, reference: &Song, context: &ScoringContext) -> f64 {
    dissimilarity(candidate, reference, &context.property_weights)
        + preference_term(candidate, reference, &context.preferences)
}

/// Composite score with same-genre pairs inflated by `bias + 1`.
#[must_use]
pub fn biased_score(candidate: &Song, reference: &Song, bias: f64, context: &ScoringContext) -> f64 {
    let base = dissimilarity(candidate, reference, &context.property_weights);
    let scaled = if candidate.genre == reference.genre {
        (bias + 1.0) * base
    } else {
        base
    };
    scaled + preference_term(candidate, reference, &context.preferences)
}

/// Composite score scaled by `√degree` of the candidate, favouring
/// weakly connected songs.
#[must_use]
pub fn degree_score(candidate: &Song, reference: &Song, context: &ScoringContext) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let factor = (candidate.degree() as f64).sqrt();
    factor * dissimilarity(candidate, reference, &context.property_weights)
        + preference_term(candidate, reference, &context.preferences)
}

/// Ascending comparison for costs; NaN compares equal.
#[must_use]
pub fn compare_costs(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn song(id: &str, genre: &str, features: AudioFeatures) -> Song {
        Song::new(id, id, genre, NaiveDate::from_ymd_opt(2001, 1, 1).unwrap()).with_properties(features)
    }

    fn features(energy: f64, key: f64, valence: f64) -> AudioFeatures {
        AudioFeatures::default()
            .with(Property::Energy, energy)
            .with(Property::Key, key)
            .with(Property::Valence, valence)
    }

    #[test]
    fn test_preference_score_ignores_trailing_features() {
        let prefs = PreferenceWeights {
            energy: 50.0,
            key: 100.0,
            ..PreferenceWeights::default()
        };
        let s = song("a", "rock", features(0.8, 3.0, 0.9));
        // valence is not a preference feature
        assert_relative_eq!(preference_score(&s, &prefs), 0.5 * 0.8 + 3.0);
    }

    #[test]
    fn test_preference_cost_inverts_score() {
        let prefs = PreferenceWeights {
            energy: 100.0,
            ..PreferenceWeights::default()
        };
        let strong = song("strong", "rock", features(0.8, 0.0, 0.0));
        let weak = song("weak", "rock", features(0.2, 0.0, 0.0));
        assert!(preference_cost(&strong, &prefs) < preference_cost(&weak, &prefs));
        assert!(preference_cost(&strong, &PreferenceWeights::default()).is_infinite());
    }

    #[test]
    fn test_dissimilarity_uses_absolute_weights() {
        let mut weights = PropertyWeights::uniform();
        weights.energy = -2.0;
        let a = song("a", "rock", features(0.1, 1.0, 0.5));
        let b = song("b", "rock", features(0.4, 3.0, 0.5));
        assert_relative_eq!(dissimilarity(&a, &b, &weights), 2.0 * 0.3 + 2.0, epsilon = 1e-12);
        assert_relative_eq!(dissimilarity(&a, &a, &weights), 0.0);
    }

    #[test]
    fn test_dissimilarity_to_mean() {
        let weights = PropertyWeights::uniform();
        let a = song("a", "rock", features(0.0, 0.0, 0.0));
        let b = song("b", "rock", features(1.0, 0.0, 0.0));
        let probe = song("c", "rock", features(0.5, 0.0, 0.0));
        assert_relative_eq!(dissimilarity_to_mean(&probe, &[&a, &b], &weights), 0.0);
        assert!(dissimilarity_to_mean(&probe, &[], &weights).is_infinite());
    }

    #[test]
    fn test_genre_distance_against_set() {
        let weights = PropertyWeights::uniform();
        let mut near = Genre::new("near");
        near.average_properties = features(0.5, 0.0, 0.0);
        let mut low = Genre::new("low");
        low.average_properties = features(0.2, 0.0, 0.0);
        let mut high = Genre::new("high");
        high.average_properties = features(0.8, 0.0, 0.0);

        assert_relative_eq!(genre_distance(&near, &[&low, &high], &weights), 0.0, epsilon = 1e-12);
        assert_relative_eq!(genre_distance(&low, &[&high], &weights), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_preference_term_requires_both_scores() {
        let prefs = PreferenceWeights {
            danceability: 100.0,
            ..PreferenceWeights::default()
        };
        let dancing = song("d", "pop", AudioFeatures::default().with(Property::Danceability, 0.5));
        let still = song("s", "pop", AudioFeatures::default());
        assert_eq!(preference_term(&dancing, &still, &prefs), 0.0);
        assert_relative_eq!(preference_term(&dancing, &dancing, &prefs), 2.0);
    }

    #[test]
    fn test_biased_score_inflates_same_genre_only() {
        let context = ScoringContext::new(PropertyWeights::uniform(), PreferenceWeights::default());
        let seed = song("seed", "rock", features(0.0, 0.0, 0.0));
        let same = song("same", "rock", features(0.3, 0.0, 0.0));
        let other = song("other", "jazz", features(0.3, 0.0, 0.0));

        assert_relative_eq!(biased_score(&same, &seed, 0.0, &context), 0.3, epsilon = 1e-12);
        assert_relative_eq!(biased_score(&same, &seed, 1.0, &context), 0.6, epsilon = 1e-12);
        assert_relative_eq!(biased_score(&other, &seed, 1.0, &context), 0.3, epsilon = 1e-12);
        assert_relative_eq!(
            biased_score(&same, &seed, 0.0, &context),
            composite_score(&same, &seed, &context),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_degree_score_prefers_low_degree() {
        let context = ScoringContext::new(PropertyWeights::uniform(), PreferenceWeights::default());
        let seed = song("seed", "rock", features(0.0, 0.0, 0.0));
        let mut hub = song("hub", "rock", features(0.5, 0.0, 0.0));
        let mut loner = song("loner", "rock", features(0.5, 0.0, 0.0));
        for i in 0..9 {
            hub.neighbours.insert(format!("n{i}"), 1.0);
        }
        loner.neighbours.insert("n0".to_string(), 1.0);

        assert_relative_eq!(degree_score(&hub, &seed, &context), 1.5, epsilon = 1e-12);
        assert_relative_eq!(degree_score(&loner, &seed, &context), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_preference_weight_validation() {
        assert!(PreferenceWeights::default().validate().is_ok());
        let bad = PreferenceWeights {
            liveness: 101.0,
            ..PreferenceWeights::default()
        };
        assert!(matches!(bad.validate(), Err(GenerationError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_compare_costs_handles_nan() {
        assert_eq!(compare_costs(1.0, 2.0), Ordering::Less);
        assert_eq!(compare_costs(f64::NAN, 2.0), Ordering::Equal);
    }
}
