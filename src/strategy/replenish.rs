//! Random injection of songs from neighbouring genres into a stalled
//! working list.

use crate::algorithm::{compare_costs, genre_distance, PropertyWeights};
use crate::graph::{Genre, GenreGraph, Song};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Overwrite random slots of `working` with songs from nearby genres.
///
/// Runs `max(len / 2, 1)` passes. Pass `i` looks at the genre of
/// `working[i]`, picks its adjacent genre with the closest average sound,
/// and writes a uniformly chosen song from that genre into a random slot.
/// Passes whose genre has no neighbours (or whose closest neighbour is
/// empty) change nothing.
///
/// Returns the number of slots overwritten.
pub fn replenish<'g>(
    graph: &'g GenreGraph,
    working: &mut [&'g Song],
    weights: &PropertyWeights,
    rng: &mut dyn RngCore,
) -> usize {
    if working.is_empty() {
        return 0;
    }
    let passes = (working.len() / 2).max(1);
    let mut replaced = 0;

    for i in 0..passes {
        let slot = rng.gen_range(0..working.len());
        let Some(source) = graph.genre(&working[i].genre) else {
            continue;
        };
        let Some(closest) = closest_neighbour(graph, source, weights) else {
            log::trace!("Genre `{}' has no neighbours to replenish from", source.name);
            continue;
        };
        let songs: Vec<&Song> = closest.song_graph.songs.values().collect();
        if let Some(&song) = songs.choose(rng) {
            log::trace!("Replenish slot {slot}: `{}' -> `{}' ({})", working[slot].name, song.name, closest.name);
            working[slot] = song;
            replaced += 1;
        }
    }

    log::warn!("Candidate pool exhausted; replenished {replaced} of {} slots", working.len());
    replaced
}

fn closest_neighbour<'g>(graph: &'g GenreGraph, source: &Genre, weights: &PropertyWeights) -> Option<&'g Genre> {
    source
        .neighbours
        .keys()
        .filter_map(|name| graph.genre(name))
        .map(|g| (g, genre_distance(source, &[g], weights)))
        .min_by(|a, b| compare_costs(a.1, b.1))
        .map(|(g, _)| g)
}
