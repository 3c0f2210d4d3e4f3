// tests/engine_scenarios.rs
//
// End-to-end behaviour of the scoring engine on hand-built bundles:
// single-driver runs, venue bonuses, tie handling, qualifying weighting and
// degenerate normalization.

use std::collections::BTreeMap;

use race_winner_predictor::model::{
    Driver, DriverStanding, EventResult, FinishRecord, InputBundle, QualifyingEntry,
    QualifyingSession, Team, TeamStanding,
};
use race_winner_predictor::{
    Confidence, FeatureKey, FeatureTable, ScoringEngine, ScoringError, Windows,
};

const EPS: f64 = 1e-9;

fn standing(id: &str, team: Option<&str>, position: u32) -> DriverStanding {
    DriverStanding {
        driver: Driver::new(id, "Given", id.to_uppercase()),
        team: team.map(|t| Team::new(t, t.to_uppercase())),
        position,
        points: 0.0,
    }
}

fn team(id: &str, position: u32) -> TeamStanding {
    TeamStanding {
        team: Team::new(id, id.to_uppercase()),
        position,
        points: 0.0,
    }
}

fn event(round: u32, results: Vec<FinishRecord>) -> EventResult {
    EventResult {
        results,
        ..EventResult::new("2024", round, format!("Round {round}"))
    }
}

fn weights(pairs: &[(FeatureKey, f64)]) -> FeatureTable {
    let mut w: BTreeMap<FeatureKey, f64> = FeatureKey::ALL.iter().map(|k| (*k, 0.0)).collect();
    for (k, v) in pairs {
        w.insert(*k, *v);
    }
    FeatureTable::with_weights(&w).expect("valid test weights")
}

#[test]
fn single_driver_without_history_uses_neutral_defaults() {
    let bundle = InputBundle {
        standings: vec![standing("solo", Some("ferrari"), 1)],
        team_standings: vec![team("mclaren", 1), team("ferrari", 2)],
        ..Default::default()
    };

    let preds = ScoringEngine::default().score_all(&bundle).unwrap();
    assert_eq!(preds.len(), 1);
    let p = &preds[0];
    let v = &p.feature_vector;

    assert!((v.get(FeatureKey::Championship) - 1.0).abs() < EPS);
    assert_eq!(v.get(FeatureKey::RecentForm), 0.0);
    assert_eq!(v.get(FeatureKey::VenueHistory), 0.5);
    assert_eq!(v.get(FeatureKey::Qualifying), 0.5);
    assert_eq!(v.get(FeatureKey::PositionGain), 0.5);
    assert_eq!(v.get(FeatureKey::HeadToHead), 0.5);
    assert!((v.get(FeatureKey::TeamStrength) - (-0.18f64).exp()).abs() < EPS);

    assert!((p.win_probability - 100.0).abs() < EPS);
}

#[test]
fn three_venue_wins_apply_the_big_bonus() {
    // Three wins, then two P10s (oldest first). The base stays low enough
    // that neither bonus tier reaches the clamp at 1.
    let history = vec![
        event(1, vec![FinishRecord::new("a", 1)]),
        event(2, vec![FinishRecord::new("a", 1)]),
        event(3, vec![FinishRecord::new("a", 1)]),
        event(4, vec![FinishRecord::new("a", 10)]),
        event(5, vec![FinishRecord::new("a", 10)]),
    ];
    let bundle = InputBundle {
        standings: vec![standing("a", None, 1)],
        venue_history: history,
        ..Default::default()
    };

    let w = |i: f64| (-0.1 * i).exp();
    let base = (0.04 * (w(0.0) + w(1.0)) + 1.15 * (w(2.0) + w(3.0) + w(4.0)))
        / (w(0.0) + w(1.0) + w(2.0) + w(3.0) + w(4.0));
    let expected = base * 1.25;
    assert!(expected < 1.0);

    let f = ScoringEngine::default().extract("a", &bundle).unwrap();
    let got = f.vector.get(FeatureKey::VenueHistory);
    assert!((got - expected).abs() < EPS);
    assert!((got - base * 1.15).abs() > 0.01);
}

#[test]
fn two_venue_wins_apply_the_smaller_bonus() {
    let history = vec![
        event(1, vec![FinishRecord::new("a", 1)]),
        event(2, vec![FinishRecord::new("a", 1)]),
        event(3, vec![FinishRecord::new("a", 10)]),
        event(4, vec![FinishRecord::new("a", 10)]),
        event(5, vec![FinishRecord::new("a", 10)]),
    ];
    let bundle = InputBundle {
        standings: vec![standing("a", None, 1)],
        venue_history: history,
        ..Default::default()
    };

    let w = |i: f64| (-0.1 * i).exp();
    let base = (0.04 * (w(0.0) + w(1.0) + w(2.0)) + 1.15 * (w(3.0) + w(4.0)))
        / (w(0.0) + w(1.0) + w(2.0) + w(3.0) + w(4.0));

    let f = ScoringEngine::default().extract("a", &bundle).unwrap();
    assert!((f.vector.get(FeatureKey::VenueHistory) - base * 1.15).abs() < EPS);
}

#[test]
fn venue_win_bonus_scales_a_low_base() {
    // Three old wins outside the 5-edition window, then five P8 finishes.
    let mut history: Vec<_> = (1..=3)
        .map(|r| event(r, vec![FinishRecord::new("a", 1)]))
        .collect();
    for r in 4..=8 {
        history.push(event(r, vec![FinishRecord::new("a", 8)]));
    }
    let bundle = InputBundle {
        standings: vec![standing("a", None, 1)],
        venue_history: history,
        ..Default::default()
    };

    let f = ScoringEngine::default().extract("a", &bundle).unwrap();
    assert!((f.vector.get(FeatureKey::VenueHistory) - 0.16 * 1.25).abs() < EPS);
}

#[test]
fn tied_scores_keep_standings_order() {
    // Championship carries no weight, so two drivers with no history tie.
    let table = weights(&[
        (FeatureKey::RecentForm, 0.35),
        (FeatureKey::Qualifying, 0.18),
        (FeatureKey::VenueHistory, 0.18),
        (FeatureKey::TeamStrength, 0.13),
        (FeatureKey::PositionGain, 0.08),
        (FeatureKey::HeadToHead, 0.08),
    ]);
    let engine = ScoringEngine::new(table, Windows::default());

    for order in [["zed", "amy"], ["amy", "zed"]] {
        let bundle = InputBundle {
            standings: vec![standing(order[0], None, 1), standing(order[1], None, 2)],
            ..Default::default()
        };
        let preds = engine.score_all(&bundle).unwrap();
        assert_eq!(preds[0].score, preds[1].score);
        assert_eq!(preds[0].driver.id, order[0]);
        assert_eq!(preds[1].driver.id, order[1]);
    }
}

#[test]
fn current_qualifying_counts_double() {
    let events: Vec<_> = (1..=4)
        .map(|r| event(r, vec![FinishRecord::new("x", 6).with_grid(5)]))
        .collect();
    let bundle = InputBundle {
        standings: vec![standing("x", None, 1)],
        recent_events: events,
        current_qualifying: Some(QualifyingSession {
            season: "2024".into(),
            round: 5,
            venue_id: None,
            results: vec![QualifyingEntry {
                driver_id: "x".into(),
                position: 1,
            }],
        }),
        ..Default::default()
    };

    let g5 = (-0.12f64 * 4.0).exp();
    let expected = (1.0 * 2.0 + 4.0 * g5) / 6.0;

    let f = ScoringEngine::default().extract("x", &bundle).unwrap();
    assert!((f.vector.get(FeatureKey::Qualifying) - expected).abs() < EPS);
}

#[test]
fn zero_pool_sum_is_degenerate() {
    let engine = ScoringEngine::new(
        weights(&[(FeatureKey::RecentForm, 1.0)]),
        Windows::default(),
    );
    let bundle = InputBundle {
        standings: vec![standing("a", None, 1), standing("b", None, 2)],
        ..Default::default()
    };

    let err = engine.score_all(&bundle).unwrap_err();
    assert_eq!(err, ScoringError::DegenerateNormalization { pool_size: 10 });
}

#[test]
fn empty_standings_fail_the_run() {
    let bundle = InputBundle {
        recent_events: vec![event(1, vec![FinishRecord::new("a", 1)])],
        ..Default::default()
    };
    assert_eq!(
        ScoringEngine::default().score_all(&bundle).unwrap_err(),
        ScoringError::EmptyStandings
    );
}

#[test]
fn missing_driver_has_no_features() {
    let bundle = InputBundle {
        standings: vec![standing("a", None, 1)],
        ..Default::default()
    };
    assert!(ScoringEngine::default().extract("nobody", &bundle).is_none());
}

#[test]
fn flat_features_give_high_confidence_even_when_ranked_low() {
    // No history: most features sit at their neutral defaults, so the spread is small.
    let table = weights(&[
        (FeatureKey::Qualifying, 0.5),
        (FeatureKey::PositionGain, 0.5),
    ]);
    let engine = ScoringEngine::new(table, Windows::default());
    let mut standings: Vec<_> = (1..=6)
        .map(|i| standing(&format!("d{i}"), None, i))
        .collect();
    standings.push(standing("flat", None, 7));
    let bundle = InputBundle {
        standings,
        ..Default::default()
    };

    let preds = engine.score_all(&bundle).unwrap();
    let flat = preds.iter().find(|p| p.driver.id == "flat").unwrap();
    // championship exp(-0.72) ≈ 0.487, recent form 0, team 0.3, rest 0.5
    assert_eq!(flat.confidence, Confidence::High);
}

#[test]
fn ranking_follows_form() {
    let events: Vec<_> = (1..=5)
        .map(|r| {
            event(
                r,
                vec![
                    FinishRecord::new("c", 1).with_grid(1),
                    FinishRecord::new("b", 2).with_grid(2),
                    FinishRecord::new("a", 3).with_grid(3),
                ],
            )
        })
        .collect();
    let bundle = InputBundle {
        // Standings order a, b, c; form says c, b, a.
        standings: vec![
            standing("a", Some("t1"), 1),
            standing("b", Some("t1"), 2),
            standing("c", Some("t1"), 3),
        ],
        team_standings: vec![team("t1", 1)],
        recent_events: events,
        ..Default::default()
    };

    let preds = ScoringEngine::default().score_all(&bundle).unwrap();
    let ids: Vec<_> = preds.iter().map(|p| p.driver.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
    assert!((preds[0].feature_vector.get(FeatureKey::HeadToHead) - 1.0).abs() < EPS);
    assert_eq!(preds[2].feature_vector.get(FeatureKey::HeadToHead), 0.0);
}
