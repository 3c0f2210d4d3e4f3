//! The seven feature signals. Each is a pure function of the input bundle.
//!
//! Windows always take the last `n` events of a chronological sequence and
//! walk them most-recent-first where recency weighting applies. Every signal
//! falls back to a fixed neutral value when it has no samples.

use crate::model::{DriverStanding, EventResult, QualifyingSession, TeamStanding};

/// Neutral value for qualifying, venue history, position gain and head-to-head.
pub const NEUTRAL: f64 = 0.5;
/// Neutral-low value when the driver's team is not in the team standings.
pub const TEAM_NOT_FOUND: f64 = 0.3;

const CHAMPIONSHIP_DECAY: f64 = 0.12;
const GRID_DECAY: f64 = 0.12;
const TEAM_DECAY: f64 = 0.18;
const FORM_RECENCY_DECAY: f64 = 0.25;
const VENUE_RECENCY_DECAY: f64 = 0.10;

const WIN_MULTIPLIER: f64 = 1.15;
const THREE_WINS_BONUS: f64 = 1.25;
const TWO_WINS_BONUS: f64 = 1.15;
const PODIUM_STREAK_BONUS: f64 = 1.10;

/// Championship points for positions 1..=10; a win is worth 25.
const POSITION_POINTS: [u32; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];

/// Championship points awarded for a finishing position (0 outside the top ten).
pub fn points_for(position: u32) -> u32 {
    match position {
        1..=10 => POSITION_POINTS[(position - 1) as usize],
        _ => 0,
    }
}

/// Per-event result score: points share of a win inside the top ten, a small
/// linearly decaying consolation outside it.
pub fn position_score(position: u32) -> f64 {
    if position <= 10 {
        f64::from(points_for(position)) / 25.0
    } else {
        (0.1 - f64::from(position - 10) * 0.008).max(0.0)
    }
}

fn rank_decay(rank: usize, rate: f64) -> f64 {
    (-rate * (rank as f64 - 1.0)).exp()
}

fn last_n<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Feature 1. `rank` is the 1-based index in the standings.
pub fn championship(rank: usize) -> f64 {
    rank_decay(rank, CHAMPIONSHIP_DECAY)
}

/// Feature 2. Recency-weighted position score over the last `window` events;
/// 0 when the driver appears in none of them.
pub fn recent_form(events: &[EventResult], driver_id: &str, window: usize) -> f64 {
    let mut total = 0.0;
    let mut weight_sum = 0.0;

    for (i, event) in last_n(events, window).iter().rev().enumerate() {
        if let Some(result) = event.result_for(driver_id) {
            let w = (-FORM_RECENCY_DECAY * i as f64).exp();
            total += position_score(result.position) * w;
            weight_sum += w;
        }
    }

    if weight_sum > 0.0 {
        total / weight_sum
    } else {
        0.0
    }
}

/// Feature 3. Grid-slot score averaged over the current qualifying (double
/// weight) and the grid slots of the last `window` events (weight 1 each).
pub fn qualifying(
    events: &[EventResult],
    driver_id: &str,
    current: Option<&QualifyingSession>,
    window: usize,
) -> f64 {
    let mut total = 0.0;
    let mut count = 0.0;

    if let Some(grid) = current.and_then(|q| q.grid_for(driver_id)) {
        total += rank_decay(grid as usize, GRID_DECAY) * 2.0;
        count += 2.0;
    }

    for event in last_n(events, window) {
        if let Some(grid) = event.result_for(driver_id).and_then(|r| r.grid_position()) {
            total += rank_decay(grid as usize, GRID_DECAY);
            count += 1.0;
        }
    }

    if count > 0.0 {
        total / count
    } else {
        NEUTRAL
    }
}

/// Feature 4. Recency-weighted venue score with a win multiplier per event,
/// then a win-count and podium-count bonus over the whole venue history,
/// clamped to 1.
pub fn venue_history(history: &[EventResult], driver_id: &str, window: usize) -> f64 {
    if history.is_empty() {
        return NEUTRAL;
    }

    let mut total = 0.0;
    let mut weight_sum = 0.0;

    for (i, event) in last_n(history, window).iter().rev().enumerate() {
        if let Some(result) = event.result_for(driver_id) {
            let w = (-VENUE_RECENCY_DECAY * i as f64).exp();
            let mut score = position_score(result.position);
            if result.position == 1 {
                score *= WIN_MULTIPLIER;
            }
            total += score * w;
            weight_sum += w;
        }
    }

    let mut score = if weight_sum > 0.0 {
        total / weight_sum
    } else {
        NEUTRAL
    };

    let (wins, podiums) = history
        .iter()
        .filter_map(|e| e.result_for(driver_id))
        .fold((0usize, 0usize), |(w, p), r| {
            (
                w + usize::from(r.position == 1),
                p + usize::from((1..=3).contains(&r.position)),
            )
        });

    if wins >= 3 {
        score *= THREE_WINS_BONUS;
    } else if wins >= 2 {
        score *= TWO_WINS_BONUS;
    }
    if podiums >= 4 {
        score *= PODIUM_STREAK_BONUS;
    }

    score.min(1.0)
}

/// Feature 5. Decay over the team's 1-based index in the team standings.
pub fn team_strength(team_standings: &[TeamStanding], team_id: Option<&str>) -> f64 {
    let rank = team_id.and_then(|id| {
        team_standings
            .iter()
            .position(|t| t.team.id == id)
            .map(|i| i + 1)
    });
    match rank {
        Some(r) => rank_decay(r, TEAM_DECAY),
        None => TEAM_NOT_FOUND,
    }
}

/// Feature 6. Mean (grid − finish) over the last `window` events, mapped so
/// that +10 places is 1.0 and −10 places is 0.0.
pub fn position_gain(events: &[EventResult], driver_id: &str, window: usize) -> f64 {
    let mut gains = 0i64;
    let mut count = 0i64;

    for event in last_n(events, window) {
        let Some(result) = event.result_for(driver_id) else {
            continue;
        };
        if let Some(grid) = result.grid_position() {
            if result.position > 0 {
                gains += i64::from(grid) - i64::from(result.position);
                count += 1;
            }
        }
    }

    if count == 0 {
        return NEUTRAL;
    }
    let avg = gains as f64 / count as f64;
    ((avg + 10.0) / 20.0).clamp(0.0, 1.0)
}

/// Feature 7. Share of pairwise finishes ahead of the top-`pool` drivers
/// (self excluded) across the last `window` events both took part in.
pub fn head_to_head(
    events: &[EventResult],
    standings: &[DriverStanding],
    driver_id: &str,
    pool: usize,
    window: usize,
) -> f64 {
    let opponents: Vec<&str> = standings
        .iter()
        .take(pool)
        .map(|s| s.driver.id.as_str())
        .filter(|id| *id != driver_id)
        .collect();

    let mut wins = 0usize;
    let mut total = 0usize;

    for event in last_n(events, window) {
        let Some(own) = event.result_for(driver_id) else {
            continue;
        };
        for opp in &opponents {
            if let Some(theirs) = event.result_for(opp) {
                if own.position < theirs.position {
                    wins += 1;
                }
                total += 1;
            }
        }
    }

    if total > 0 {
        wins as f64 / total as f64
    } else {
        NEUTRAL
    }
}
