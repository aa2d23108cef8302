//! # Genre/Song Graph Module
//!
//! The weighted two-level graph every generation strategy reads: a
//! [`GenreGraph`] owns one [`Genre`] per name, and each genre exclusively
//! owns a [`SongGraph`] of the songs filed under it.
//!
//! ## Ownership
//!
//! Songs and genres reference each other only through keys. A song's
//! `neighbours` map holds catalog ids of songs in the *same* genre's song
//! graph; a genre's `neighbours` map holds other genre names. Lookups go
//! through the owning stores, so the cyclic adjacency never turns into
//! mutual ownership.
//!
//! All stores are `BTreeMap`s: iteration order, and with it every tie-break
//! in the strategies, is a function of the graph alone.
//!
//! ## Lifecycle
//!
//! The graph is built (or imported from a JSON snapshot) before any
//! strategy runs. The only mutation generation performs is registering a
//! previously unseen seed through [`GenreGraph::insert_song`].

use crate::error::{GenerationError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// The fixed audio-feature schema, in canonical order.
///
/// The first six entries are the only ones preference weighting looks at
/// (see [`Property::PREFERENCE`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Acousticness,
    Danceability,
    Energy,
    Instrumentalness,
    Key,
    Liveness,
    Mode,
    Loudness,
    Speechiness,
    Tempo,
    Valence,
}

impl Property {
    /// Every feature, canonical order.
    pub const ALL: [Property; 11] = [
        Property::Acousticness,
        Property::Danceability,
        Property::Energy,
        Property::Instrumentalness,
        Property::Key,
        Property::Liveness,
        Property::Mode,
        Property::Loudness,
        Property::Speechiness,
        Property::Tempo,
        Property::Valence,
    ];

    /// The six features that carry user preference weights.
    pub const PREFERENCE: [Property; 6] = [
        Property::Acousticness,
        Property::Danceability,
        Property::Energy,
        Property::Instrumentalness,
        Property::Key,
        Property::Liveness,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Property::Acousticness => "acousticness",
            Property::Danceability => "danceability",
            Property::Energy => "energy",
            Property::Instrumentalness => "instrumentalness",
            Property::Key => "key",
            Property::Liveness => "liveness",
            Property::Mode => "mode",
            Property::Loudness => "loudness",
            Property::Speechiness => "speechiness",
            Property::Tempo => "tempo",
            Property::Valence => "valence",
        }
    }
}

/// Numeric audio features of a song, or the mean over a genre.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioFeatures {
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

impl AudioFeatures {
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

    fn get_mut(&mut self, property: Property) -> &mut f64 {
        match property {
            Property::Acousticness => &mut self.acousticness,
            Property::Danceability => &mut self.danceability,
            Property::Energy => &mut self.energy,
            Property::Instrumentalness => &mut self.instrumentalness,
            Property::Key => &mut self.key,
            Property::Liveness => &mut self.liveness,
            Property::Mode => &mut self.mode,
            Property::Loudness => &mut self.loudness,
            Property::Speechiness => &mut self.speechiness,
            Property::Tempo => &mut self.tempo,
            Property::Valence => &mut self.valence,
        }
    }

    /// Set one feature, builder style.
    #[must_use]
    pub fn with(mut self, property: Property, value: f64) -> Self {
        *self.get_mut(property) = value;
        self
    }

    /// Component-wise mean. `None` for an empty input.
    pub fn mean<'a, I>(features: I) -> Option<AudioFeatures>
    where
        I: IntoIterator<Item = &'a AudioFeatures>,
    {
        let mut sum = AudioFeatures::default();
        let mut count = 0usize;
        for f in features {
            for property in Property::ALL {
                *sum.get_mut(property) += f.get(property);
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = count as f64;
        for property in Property::ALL {
            *sum.get_mut(property) /= n;
        }
        Some(sum)
    }
}

/// A song vertex.
///
/// `neighbours` maps catalog ids of songs in the same genre to the
/// precomputed edge weight (a dissimilarity: lower is closer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub properties: AudioFeatures,
    pub genre: String,
    #[serde(default)]
    pub neighbours: BTreeMap<String, f64>,
}

impl Song {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        genre: impl Into<String>,
        release_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artists: Vec::new(),
            release_date,
            properties: AudioFeatures::default(),
            genre: genre.into(),
            neighbours: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artists = artists.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: AudioFeatures) -> Self {
        self.properties = properties;
        self
    }

    /// Number of adjacency entries.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.neighbours.len()
    }

    /// True if any of this song's artists appears in `artists`.
    #[must_use]
    pub fn shares_artist(&self, artists: &[String]) -> bool {
        self.artists.iter().any(|a| artists.contains(a))
    }
}

/// Songs of a single genre, keyed by catalog id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongGraph {
    #[serde(default)]
    pub songs: BTreeMap<String, Song>,
}

impl SongGraph {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Song> {
        self.songs.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// A genre vertex, owning its song graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
    #[serde(default)]
    pub average_properties: AudioFeatures,
    #[serde(default)]
    pub neighbours: BTreeMap<String, f64>,
    #[serde(default)]
    pub song_graph: SongGraph,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            average_properties: AudioFeatures::default(),
            neighbours: BTreeMap::new(),
            song_graph: SongGraph::default(),
        }
    }

    /// Recompute `average_properties` from the owned songs. A genre with
    /// no songs keeps whatever aggregate it was built with.
    pub fn refresh_average(&mut self) {
        if let Some(mean) = AudioFeatures::mean(self.song_graph.songs.values().map(|s| &s.properties)) {
            self.average_properties = mean;
        }
    }
}

/// Root of the two-level graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenreGraph {
    #[serde(default)]
    pub genres: BTreeMap<String, Genre>,
}

impl GenreGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the genre called `name`.
    pub fn add_genre(&mut self, name: impl Into<String>) -> &mut Genre {
        let name = name.into();
        self.genres
            .entry(name.clone())
            .or_insert_with(|| Genre::new(name))
    }

    /// File `song` under its genre, replacing any song with the same id.
    /// The song's neighbour map is stored as given.
    ///
    /// # Errors
    ///
    /// [`GenerationError::UnknownGenre`] if the song's genre is absent.
    pub fn add_song(&mut self, song: Song) -> Result<()> {
        let genre = self
            .genres
            .get_mut(&song.genre)
            .ok_or_else(|| GenerationError::UnknownGenre(song.genre.clone()))?;
        genre.song_graph.songs.insert(song.id.clone(), song);
        Ok(())
    }

    /// Add a symmetric edge between two songs of `genre`.
    ///
    /// # Errors
    ///
    /// Unknown genre or song id.
    pub fn connect_songs(&mut self, genre: &str, a: &str, b: &str, weight: f64) -> Result<()> {
        let songs = &mut self
            .genres
            .get_mut(genre)
            .ok_or_else(|| GenerationError::UnknownGenre(genre.to_string()))?
            .song_graph
            .songs;
        for id in [a, b] {
            if !songs.contains_key(id) {
                return Err(GenerationError::UnknownSong(id.to_string()));
            }
        }
        if let Some(song) = songs.get_mut(a) {
            song.neighbours.insert(b.to_string(), weight);
        }
        if let Some(song) = songs.get_mut(b) {
            song.neighbours.insert(a.to_string(), weight);
        }
        Ok(())
    }

    /// Add a symmetric edge between two genres.
    ///
    /// # Errors
    ///
    /// [`GenerationError::UnknownGenre`] if either side is absent.
    pub fn connect_genres(&mut self, a: &str, b: &str, weight: f64) -> Result<()> {
        for name in [a, b] {
            if !self.genres.contains_key(name) {
                return Err(GenerationError::UnknownGenre(name.to_string()));
            }
        }
        if let Some(genre) = self.genres.get_mut(a) {
            genre.neighbours.insert(b.to_string(), weight);
        }
        if let Some(genre) = self.genres.get_mut(b) {
            genre.neighbours.insert(a.to_string(), weight);
        }
        Ok(())
    }

    /// Recompute every genre's aggregate vector from its songs.
    pub fn refresh_averages(&mut self) {
        for genre in self.genres.values_mut() {
            genre.refresh_average();
        }
    }

    #[must_use]
    pub fn genre(&self, name: &str) -> Option<&Genre> {
        self.genres.get(name)
    }

    /// The graph's own node for `song`, looked up by id in its genre.
    #[must_use]
    pub fn get_song(&self, song: &Song) -> Option<&Song> {
        self.genres.get(&song.genre)?.song_graph.get(&song.id)
    }

    /// Register a song the graph has not seen yet.
    ///
    /// Idempotent: a song whose id is already present is left untouched and
    /// `Ok(false)` is returned. On insertion, neighbour ids that do not
    /// exist in the genre are dropped and every kept edge is mirrored onto
    /// the neighbour so adjacency stays symmetric.
    ///
    /// # Errors
    ///
    /// [`GenerationError::UnknownGenre`] if the song's genre is absent.
    pub fn insert_song(&mut self, mut song: Song) -> Result<bool> {
        let genre = self
            .genres
            .get_mut(&song.genre)
            .ok_or_else(|| GenerationError::UnknownGenre(song.genre.clone()))?;
        let songs = &mut genre.song_graph.songs;

        if songs.contains_key(&song.id) {
            log::trace!("Song `{}' already registered", song.id);
            return Ok(false);
        }

        song.neighbours.retain(|id, _| {
            let known = songs.contains_key(id);
            if !known {
                log::warn!("Dropping edge {} -> {}: neighbour not in genre `{}'", song.id, id, song.genre);
            }
            known
        });
        for (id, &weight) in &song.neighbours {
            if let Some(neighbour) = songs.get_mut(id) {
                neighbour.neighbours.insert(song.id.clone(), weight);
            }
        }

        log::debug!("Registered `{}' ({}) under `{}'", song.name, song.id, song.genre);
        songs.insert(song.id.clone(), song);
        Ok(true)
    }

    /// Find a song by catalog id, then by exact display name, then by
    /// case-insensitive display name.
    #[must_use]
    pub fn find_song(&self, key: &str) -> Option<&Song> {
        self.songs()
            .find(|s| s.id == key)
            .or_else(|| self.songs().find(|s| s.name == key))
            .or_else(|| self.songs().find(|s| s.name.eq_ignore_ascii_case(key)))
    }

    /// Case-insensitive substring search over song names and artists.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Song> {
        let needle = query.to_lowercase();
        let mut hits: Vec<&Song> = self
            .songs()
            .filter(|s| {
                s.name.to_lowercase().contains(&needle)
                    || s.artists.iter().any(|a| a.to_lowercase().contains(&needle))
            })
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        hits
    }

    /// Every song in the graph, genre by genre.
    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.genres
            .values()
            .flat_map(|g| g.song_graph.songs.values())
    }

    #[must_use]
    pub fn song_count(&self) -> usize {
        self.genres.values().map(|g| g.song_graph.len()).sum()
    }

    /// Resolve `song`'s adjacency inside its genre's song graph.
    /// Dangling ids are skipped.
    pub fn neighbours<'g>(&'g self, song: &'g Song) -> impl Iterator<Item = (&'g Song, f64)> + 'g {
        let song_graph = self.genres.get(&song.genre).map(|g| &g.song_graph);
        song.neighbours.iter().filter_map(move |(id, &weight)| {
            let neighbour = song_graph.and_then(|sg| sg.get(id));
            if neighbour.is_none() {
                log::trace!("Skipping dangling edge {} -> {}", song.id, id);
            }
            neighbour.map(|n| (n, weight))
        })
    }

    /// Parse a graph snapshot.
    ///
    /// # Errors
    ///
    /// [`GenerationError::SnapshotFormat`] on malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let graph: GenreGraph = serde_json::from_str(json)?;
        graph.log_integrity();
        Ok(graph)
    }

    /// Read a graph snapshot from disk.
    ///
    /// # Errors
    ///
    /// I/O or format errors.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let graph = Self::from_json_str(&content)?;
        log::info!(
            "Loaded graph snapshot {}: {} genres, {} songs",
            path.display(),
            graph.genres.len(),
            graph.song_count()
        );
        Ok(graph)
    }

    fn log_integrity(&self) {
        for (name, genre) in &self.genres {
            for song in genre.song_graph.songs.values() {
                if &song.genre != name {
                    log::warn!("Song `{}' labelled `{}' but filed under `{}'", song.id, song.genre, name);
                }
            }
            for other in genre.neighbours.keys() {
                if !self.genres.contains_key(other) {
                    log::warn!("Genre `{}' points at unknown genre `{}'", name, other);
                }
            }
        }
    }
}

/// Songs already seen during one generation call.
///
/// Display names and catalog ids are both recorded, since lookups mix the
/// two; a song counts as seen if either matches.
#[derive(Debug, Clone, Default)]
pub struct Visited {
    keys: HashSet<String>,
}

impl Visited {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_songs<'a, I>(songs: I) -> Self
    where
        I: IntoIterator<Item = &'a Song>,
    {
        let mut visited = Self::new();
        for song in songs {
            visited.mark(song);
        }
        visited
    }

    pub fn mark(&mut self, song: &Song) {
        self.keys.insert(song.name.clone());
        self.keys.insert(song.id.clone());
    }

    #[must_use]
    pub fn contains(&self, song: &Song) -> bool {
        self.keys.contains(&song.name) || self.keys.contains(&song.id)
    }
}
