// tests/invariants.rs
//
// Properties that must hold for any bundle: weight sum, feature ranges and
// defaults, idempotence, ordering, and the top-pool probability sum.
// Bundles are generated from fixed seeds so failures reproduce.

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use race_winner_predictor::model::{
    Driver, DriverStanding, EventResult, FinishRecord, InputBundle, QualifyingEntry,
    QualifyingSession, Team, TeamStanding,
};
use race_winner_predictor::{FeatureKey, FeatureTable, ScoringEngine};

const TEAMS: [&str; 5] = ["red_bull", "mclaren", "ferrari", "mercedes", "aston_martin"];

fn random_bundle(seed: u64) -> InputBundle {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_drivers: usize = rng.random_range(1..=22);
    let ids: Vec<String> = (0..n_drivers).map(|i| format!("driver_{i:02}")).collect();

    let standings = ids
        .iter()
        .enumerate()
        .map(|(i, id)| DriverStanding {
            driver: Driver::new(id.clone(), "Test", format!("Driver{i}")),
            team: rng
                .random_bool(0.9)
                .then(|| Team::new(TEAMS[i % TEAMS.len()], TEAMS[i % TEAMS.len()])),
            position: i as u32 + 1,
            points: (400 - 15 * i as i64).max(0) as f64,
        })
        .collect();

    let mut team_ids: Vec<&str> = TEAMS.to_vec();
    team_ids.shuffle(&mut rng);
    let team_standings = team_ids
        .iter()
        .take(rng.random_range(0..=TEAMS.len()))
        .enumerate()
        .map(|(i, t)| TeamStanding {
            team: Team::new(*t, *t),
            position: i as u32 + 1,
            points: 0.0,
        })
        .collect();

    let make_events = |rng: &mut StdRng, count: usize| -> Vec<EventResult> {
        (0..count)
            .map(|r| {
                let mut order = ids.clone();
                order.shuffle(rng);
                let starters = rng.random_range(0..=order.len());
                let results = order
                    .into_iter()
                    .take(starters)
                    .enumerate()
                    .map(|(pos, id)| {
                        let mut rec = FinishRecord::new(id, pos as u32 + 1);
                        if rng.random_bool(0.8) {
                            rec.grid = Some(rng.random_range(0..=22));
                        }
                        rec
                    })
                    .collect();
                EventResult {
                    results,
                    ..EventResult::new("2024", r as u32 + 1, format!("GP {r}"))
                }
            })
            .collect()
    };

    let n_recent = rng.random_range(0..=12);
    let recent_events = make_events(&mut rng, n_recent);
    let n_venue = rng.random_range(0..=7);
    let venue_history = make_events(&mut rng, n_venue);

    let current_qualifying = rng.random_bool(0.5).then(|| {
        let mut order = ids.clone();
        order.shuffle(&mut rng);
        QualifyingSession {
            season: "2024".into(),
            round: 99,
            venue_id: None,
            results: order
                .into_iter()
                .enumerate()
                .map(|(i, driver_id)| QualifyingEntry {
                    driver_id,
                    position: i as u32 + 1,
                })
                .collect(),
        }
    });

    InputBundle {
        standings,
        team_standings,
        recent_events,
        venue_history,
        current_qualifying,
    }
}

#[test]
fn default_weights_sum_to_one() {
    let sum: f64 = FeatureTable::default().iter().map(|s| s.weight).sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn breakdown_weights_sum_to_one_for_every_driver() {
    let engine = ScoringEngine::default();
    for seed in 0..20 {
        let preds = engine.score_all(&random_bundle(seed)).unwrap();
        for p in &preds {
            let sum: f64 = p.breakdown.iter().map(|(_, fs)| fs.weight).sum();
            assert!((sum - 1.0).abs() < 1e-9, "seed {seed}: weight sum {sum}");
        }
    }
}

#[test]
fn feature_ranges_hold() {
    let engine = ScoringEngine::default();
    for seed in 0..50 {
        let preds = engine.score_all(&random_bundle(seed)).unwrap();
        for p in &preds {
            let v = &p.feature_vector;
            for key in [
                FeatureKey::Championship,
                FeatureKey::TeamStrength,
                FeatureKey::RecentForm,
                FeatureKey::VenueHistory,
            ] {
                assert!(v.get(key) >= 0.0, "seed {seed}: {key:?} negative");
            }
            for key in FeatureKey::ALL {
                assert!(v.get(key) <= 1.0 + 1e-12, "seed {seed}: {key:?} above 1");
            }
        }
    }
}

#[test]
fn sample_free_features_default_to_half() {
    let bundle = InputBundle {
        standings: vec![DriverStanding {
            driver: Driver::new("rookie", "New", "Comer"),
            team: None,
            position: 1,
            points: 0.0,
        }],
        // Events exist, but the rookie is in none of them.
        recent_events: vec![EventResult::new("2024", 1, "GP")
            .with_result(FinishRecord::new("someone_else", 1).with_grid(1))],
        ..Default::default()
    };
    let f = ScoringEngine::default().extract("rookie", &bundle).unwrap();
    assert_eq!(f.vector.get(FeatureKey::Qualifying), 0.5);
    assert_eq!(f.vector.get(FeatureKey::PositionGain), 0.5);
    assert_eq!(f.vector.get(FeatureKey::HeadToHead), 0.5);
}

#[test]
fn scoring_is_idempotent() {
    let engine = ScoringEngine::default();
    for seed in 0..20 {
        let bundle = random_bundle(seed);
        let a = engine.score_all(&bundle).unwrap();
        let b = engine.score_all(&bundle).unwrap();
        assert_eq!(a, b, "seed {seed}");
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.score.to_bits(), y.score.to_bits());
            assert_eq!(x.win_probability.to_bits(), y.win_probability.to_bits());
        }
    }
}

#[test]
fn output_is_sorted_descending() {
    let engine = ScoringEngine::default();
    for seed in 0..50 {
        let preds = engine.score_all(&random_bundle(seed)).unwrap();
        for pair in preds.windows(2) {
            assert!(pair[0].score >= pair[1].score, "seed {seed}");
        }
    }
}

#[test]
fn top_pool_probabilities_sum_to_hundred() {
    let engine = ScoringEngine::default();
    for seed in 0..50 {
        let preds = engine.score_all(&random_bundle(seed)).unwrap();
        let sum: f64 = preds.iter().take(10).map(|p| p.win_probability).sum();
        assert!((sum - 100.0).abs() < 1e-9, "seed {seed}: sum {sum}");
    }
}

#[test]
fn score_is_weighted_sum_of_breakdown() {
    let engine = ScoringEngine::default();
    let table = engine.table();
    for seed in 0..10 {
        for p in engine.score_all(&random_bundle(seed)).unwrap() {
            let expected: f64 = FeatureKey::ALL
                .iter()
                .map(|k| p.feature_vector.get(*k) * table.weight(*k))
                .sum();
            assert!((p.score - expected).abs() < 1e-12);
        }
    }
}
