use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike, Utc};

use crate::types::{DailyListening, PlayHistory};

const MS_PER_MINUTE: f64 = 60_000.0;
const DAYS_PER_YEAR: f64 = 365.0;

/// Lookback span used to filter recently played items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyWindow {
    /// The last `n` hours before `now`.
    Hours(u32),
    /// Since local midnight of `now`'s calendar day.
    Today,
    /// The last `n` whole days (rolling, `n * 24h`) before `now`.
    Days(u32),
}

impl RecencyWindow {
    /// Earliest instant inside the window.
    pub fn start(&self, now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
        match *self {
            RecencyWindow::Hours(hours) => now - Duration::hours(i64::from(hours)),
            RecencyWindow::Days(days) => now - Duration::days(i64::from(days)),
            RecencyWindow::Today => {
                let local = now.with_timezone(&offset);
                now - Duration::seconds(i64::from(local.num_seconds_from_midnight()))
                    - Duration::nanoseconds(i64::from(local.nanosecond()))
            }
        }
    }

    /// Plays are inside the window when they are no older than its start.
    pub fn contains(&self, played_at: DateTime<Utc>, now: DateTime<Utc>, offset: FixedOffset) -> bool {
        played_at >= self.start(now, offset)
    }

    /// Window length used to turn a window total into a daily average.
    pub fn length_days(&self) -> f64 {
        match *self {
            RecencyWindow::Hours(hours) => f64::from(hours) / 24.0,
            RecencyWindow::Days(days) => f64::from(days),
            RecencyWindow::Today => 1.0,
        }
    }
}

/// The subset of `plays` inside `window`, in input order.
pub fn window_plays<'a>(
    plays: &'a [PlayHistory],
    window: RecencyWindow,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<&'a PlayHistory> {
    let start = window.start(now, offset);
    plays.iter().filter(|p| p.played_at >= start).collect()
}

/// Total track duration in whole minutes.
pub fn total_minutes(plays: &[&PlayHistory]) -> u64 {
    let total_ms: u64 = plays.iter().map(|p| p.duration_ms()).sum();
    (total_ms as f64 / MS_PER_MINUTE).round() as u64
}

/// Counts listening sessions: a new session starts at the first play and
/// whenever the gap to the previous play exceeds `gap`.
///
/// Timestamps are sorted ascending here, whatever order the caller keeps
/// them in for display.
pub fn count_sessions(played_at: impl IntoIterator<Item = DateTime<Utc>>, gap: Duration) -> u32 {
    let mut timestamps: Vec<DateTime<Utc>> = played_at.into_iter().collect();
    timestamps.sort();

    let mut sessions = 0;
    let mut last: Option<DateTime<Utc>> = None;
    for ts in timestamps {
        if last.is_none_or(|prev| ts - prev > gap) {
            sessions += 1;
        }
        last = Some(ts);
    }
    sessions
}

/// Linear projection of a window total onto a year:
/// `minutes / window_days * 365`. `None` when nothing was played.
pub fn estimate_yearly_minutes(minutes: u64, window_days: f64) -> Option<u64> {
    if minutes == 0 || window_days <= 0.0 {
        return None;
    }
    let daily = minutes as f64 / window_days;
    Some((daily * DAYS_PER_YEAR).round() as u64)
}

/// Minutes per local hour of day.
pub fn hourly_listening(plays: &[&PlayHistory], offset: FixedOffset) -> [u64; 24] {
    let mut buckets = [0.0_f64; 24];
    for play in plays {
        let hour = play.played_at.with_timezone(&offset).hour() as usize;
        buckets[hour] += play.duration_ms() as f64 / MS_PER_MINUTE;
    }
    buckets.map(|minutes| minutes.round() as u64)
}

/// Minutes per local calendar date, keeping the `max_days` most recent
/// dates, oldest first.
pub fn daily_listening(
    plays: &[&PlayHistory],
    offset: FixedOffset,
    max_days: usize,
) -> Vec<DailyListening> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for play in plays {
        let date = play.played_at.with_timezone(&offset).date_naive();
        *by_date.entry(date).or_insert(0.0) += play.duration_ms() as f64 / MS_PER_MINUTE;
    }

    let skip = by_date.len().saturating_sub(max_days);
    by_date
        .into_iter()
        .skip(skip)
        .map(|(date, minutes)| DailyListening {
            date,
            minutes: minutes.round() as u64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, h, m, 0).unwrap()
    }

    #[test]
    fn today_starts_at_local_midnight() {
        let now = at(1, 30);
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(RecencyWindow::Today.start(now, utc), at(0, 0));

        // 01:30 UTC is 21:30 of the previous day at UTC-4
        let east_coast = FixedOffset::west_opt(4 * 3600).unwrap();
        assert_eq!(
            RecencyWindow::Today.start(now, east_coast),
            Utc.with_ymd_and_hms(2024, 5, 9, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn hours_window_boundary_is_inclusive() {
        let now = at(12, 0);
        let utc = FixedOffset::east_opt(0).unwrap();
        let window = RecencyWindow::Hours(2);
        assert!(window.contains(at(10, 0), now, utc));
        assert!(!window.contains(at(9, 59), now, utc));
    }

    #[test]
    fn session_gap_must_be_exceeded() {
        let gap = Duration::minutes(30);
        assert_eq!(count_sessions([at(10, 0), at(10, 30)], gap), 1);
        assert_eq!(count_sessions([at(10, 0), at(10, 31)], gap), 2);
        assert_eq!(count_sessions(Vec::new(), gap), 0);
    }

    #[test]
    fn yearly_estimate_needs_listening() {
        assert_eq!(estimate_yearly_minutes(0, 2.0), None);
        assert_eq!(estimate_yearly_minutes(120, 2.0), Some(21_900));
        assert_eq!(estimate_yearly_minutes(10, 0.0), None);
    }
}
