use crate::types::{AudioFeatureSummary, AudioFeatures};

/// Averages tempo, energy and danceability over the entries that exist.
///
/// Missing entries are skipped, not counted as zero. With no usable entry
/// the result is `None`. Energy and danceability come back as integer
/// percentages, tempo as integer BPM.
pub fn audio_feature_summary(features: &[Option<AudioFeatures>]) -> Option<AudioFeatureSummary> {
    let usable: Vec<&AudioFeatures> = features.iter().flatten().collect();
    if usable.is_empty() {
        return None;
    }

    let count = usable.len() as f64;
    let mean = |pick: fn(&AudioFeatures) -> f64| usable.iter().map(|f| pick(f)).sum::<f64>() / count;

    Some(AudioFeatureSummary {
        avg_tempo: mean(|f| f.tempo).round() as i64,
        avg_energy: (mean(|f| f.energy) * 100.0).round() as i64,
        avg_danceability: (mean(|f| f.danceability) * 100.0).round() as i64,
    })
}
