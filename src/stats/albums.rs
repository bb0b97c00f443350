use std::collections::HashMap;

use crate::{
    types::{AlbumStat, PlayHistory},
    utils,
};

pub const TOP_ALBUM_LIMIT: usize = 12;

struct AlbumGroup {
    id: String,
    name: String,
    image: Option<String>,
    play_count: u32,
    minutes: f64,
}

/// Groups plays by album id, most played first.
///
/// Plays without an album id are ignored. Minutes are summed unrounded and
/// rounded once per album. Ties keep first-seen order.
pub fn top_albums(plays: &[PlayHistory], limit: usize) -> Vec<AlbumStat> {
    let mut groups: Vec<AlbumGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for play in plays {
        let Some(track) = &play.track else { continue };
        let Some(album) = &track.album else { continue };
        let Some(id) = album.id.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };

        let slot = *index.entry(id).or_insert_with(|| {
            groups.push(AlbumGroup {
                id: id.to_string(),
                name: album.name.clone(),
                image: utils::cover_image(&album.images).map(str::to_string),
                play_count: 0,
                minutes: 0.0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.play_count += 1;
        group.minutes += track.duration_ms as f64 / 60_000.0;
    }

    groups.sort_by(|a, b| b.play_count.cmp(&a.play_count));
    groups
        .into_iter()
        .take(limit)
        .map(|g| AlbumStat {
            id: g.id,
            name: g.name,
            image: g.image,
            play_count: g.play_count,
            minutes: g.minutes.round() as u64,
        })
        .collect()
}
