//! Score trend reconstruction
//!
//! Rebuilds a consistent multi-series time axis from sparse, independently
//! arriving per-user score events. Each user becomes one step-after series:
//! the score changes instantaneously at each recorded judging event and holds
//! flat until the next one, so no interpolation happens between points.
//!
//! Every series carries two explicit anchors: `(contest_start, 0)` at the
//! front (every user starts at zero) and a trailing point at
//! `min(now, contest_end)` holding the last known score. A chart consuming
//! sparse `(time, score)` pairs with step-after rendering therefore gets a
//! well-defined shared axis without any resampling onto a master time grid.

use chrono::{DateTime, Utc};

use crate::constants::{MIN_TREND_AXIS_MAX, TREND_AXIS_HEADROOM};
use crate::models::TrendEntry;

/// One point of a reconstructed series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    pub time: DateTime<Utc>,
    pub score: i64,
}

/// Step-after series for one user
#[derive(Debug, Clone)]
pub struct TrendSeries {
    pub user_id: String,
    /// Display label for the chart legend
    pub label: String,
    pub points: Vec<TrendPoint>,
}

/// Reconstructed chart data: per-user series plus derived axis markers
#[derive(Debug, Clone)]
pub struct TrendChart {
    pub series: Vec<TrendSeries>,
    /// Present only while the contest has not ended
    pub now_marker: Option<DateTime<Utc>>,
    pub end_marker: DateTime<Utc>,
    /// Upper bound for the vertical score axis
    pub axis_max: i64,
}

/// Reconstruct per-user step-function series over the contest window.
///
/// `now` is passed explicitly so the computation stays pure; callers use
/// `Utc::now()`.
pub fn reconstruct(
    contest_start: DateTime<Utc>,
    contest_end: DateTime<Utc>,
    now: DateTime<Utc>,
    entries: &[TrendEntry],
) -> TrendChart {
    let ended = now >= contest_end;
    let terminal = if ended { contest_end } else { now.min(contest_end) };

    let mut max_score = 0i64;
    let mut series = Vec::with_capacity(entries.len());

    for entry in entries {
        let mut history: Vec<_> = entry
            .history
            .iter()
            .map(|p| TrendPoint {
                time: p.time,
                score: p.score,
            })
            .collect();
        // The backend emits weakly increasing times per user; sort anyway so
        // a reordered payload cannot produce a series that walks backwards.
        history.sort_by_key(|p| p.time);

        let mut points = Vec::with_capacity(history.len() + 2);
        points.push(TrendPoint {
            time: contest_start,
            score: 0,
        });

        let mut last_score = 0i64;
        for point in history {
            max_score = max_score.max(point.score);
            last_score = point.score;
            points.push(point);
        }

        // Trailing anchor extends the series to the shared terminal
        // timestamp; skipped only when the last event already sits there.
        if points.last().map(|p| p.time) != Some(terminal) {
            points.push(TrendPoint {
                time: terminal,
                score: last_score,
            });
        }

        series.push(TrendSeries {
            user_id: entry.user_id.clone(),
            label: entry.nickname.clone(),
            points,
        });
    }

    TrendChart {
        series,
        now_marker: if ended { None } else { Some(now) },
        end_marker: contest_end,
        axis_max: axis_max(max_score),
    }
}

/// Score axis upper bound: at least 100, otherwise the next multiple of 100
/// above `1.1 ×` the maximum observed score.
fn axis_max(max_score: i64) -> i64 {
    let padded = (max_score as f64 * TREND_AXIS_HEADROOM / 100.0).ceil() as i64 * 100;
    padded.max(MIN_TREND_AXIS_MAX)
}
