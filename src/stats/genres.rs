use std::collections::HashMap;

use crate::types::{Artist, GenreCount};

pub const TOP_GENRE_LIMIT: usize = 8;

/// Counts genres across `artists`, case folded, most frequent first.
///
/// Ties keep the order in which the genres were first seen.
pub fn top_genres(artists: &[Artist], limit: usize) -> Vec<GenreCount> {
    let mut counts: Vec<GenreCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for genre in artists.iter().flat_map(|a| a.genres.iter()) {
        let key = genre.to_lowercase();
        match index.get(&key) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push(GenreCount {
                    genre: key,
                    count: 1,
                });
            }
        }
    }

    // stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}
