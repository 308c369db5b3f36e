//! # Invariant Properties
//!
//! Randomised tick streams checked against the detector's invariants.

use flapwatch_core::{DetectorBuilder, DetectorConfig, Observation};
use flapwatch_monitor::{EventLog, FlapDetector, FlapEventKind};
use proptest::prelude::*;

fn config(interval: usize, start: f64, stop: f64, low: f64, high: f64) -> DetectorConfig {
    DetectorBuilder::new()
        .interval(interval)
        .start_threshold(start)
        .stop_threshold(stop)
        .weights(low, high)
        .default_threshold(10.0)
        .build()
        .expect("generated config is valid")
}

fn tick(above: bool) -> Observation {
    Observation::new("series", 0.0, if above { 20.0 } else { 0.0 })
}

prop_compose! {
    fn settings()(
        interval in 1usize..16,
        start in 0.01f64..=1.0,
        stop in 0.0f64..=1.0,
        low in 0.0f64..=2.0,
        high in 0.0f64..=2.0,
    ) -> DetectorConfig {
        config(interval, start, stop, low, high)
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn single_slot_window_never_flaps(ticks in prop::collection::vec(any::<bool>(), 1..200)) {
        let mut detector = FlapDetector::from_config(config(1, 0.29, 0.49, 1.0, 1.0)).unwrap();
        for above in ticks {
            let event = detector.observe(&tick(above)).unwrap();
            prop_assert_eq!(detector.score("series"), Some(0.0));
            prop_assert!(!detector.is_flapping("series"));
            prop_assert!(event.map(|e| e.kind) != Some(FlapEventKind::FlappingStarted));
        }
    }

    #[test]
    fn score_stays_in_unit_range_and_window_bounded(
        config in settings(),
        ticks in prop::collection::vec(any::<bool>(), 1..200),
    ) {
        let capacity = config.flap.interval;
        let mut detector = FlapDetector::from_config(config).unwrap();
        for above in ticks {
            detector.observe(&tick(above)).unwrap();
            let score = detector.score("series").unwrap();
            prop_assert!((0.0..=1.0).contains(&score), "score {}", score);
            prop_assert!(detector.history("series").len() <= capacity);
        }
    }

    #[test]
    fn at_most_one_notification_per_tick(
        config in settings(),
        ticks in prop::collection::vec(any::<bool>(), 1..200),
    ) {
        let mut detector = FlapDetector::from_config(config).unwrap();
        let mut log = EventLog::new();
        for above in ticks {
            let before = log.len();
            let kind = detector.observe_with(&tick(above), &mut log).unwrap();
            prop_assert!(log.len() - before <= 1);
            prop_assert_eq!(kind.is_some(), log.len() - before == 1);
            prop_assert_eq!(kind, detector.last_event("series"));
        }
    }

    #[test]
    fn flag_changes_only_through_thresholds(
        config in settings(),
        ticks in prop::collection::vec(any::<bool>(), 1..200),
    ) {
        let start = config.flap.start_threshold;
        let stop = config.flap.stop_threshold;
        let mut detector = FlapDetector::from_config(config).unwrap();
        for above in ticks {
            let was = detector.is_flapping("series");
            let event = detector.observe(&tick(above)).unwrap().map(|e| e.kind);
            let now = detector.is_flapping("series");
            let score = detector.score("series").unwrap();

            match (was, now) {
                (false, true) => {
                    prop_assert!(score >= start);
                    prop_assert_eq!(event, Some(FlapEventKind::FlappingStarted));
                }
                (true, false) => {
                    prop_assert!(score <= stop);
                    let expected = if above {
                        FlapEventKind::AboveThresholdFlappingStopped
                    } else {
                        FlapEventKind::BelowThresholdFlappingStopped
                    };
                    prop_assert_eq!(event, Some(expected));
                }
                // Hysteresis: a flapping series stays flapping until the stop threshold.
                (true, true) => {
                    prop_assert!(score > stop);
                }
                (false, false) => {
                    prop_assert!(score < start);
                }
            }
        }
    }

    #[test]
    fn reset_is_idempotent(
        config in settings(),
        ticks in prop::collection::vec(any::<bool>(), 0..64),
    ) {
        let mut once = FlapDetector::from_config(config.clone()).unwrap();
        let mut twice = FlapDetector::from_config(config).unwrap();
        for &above in &ticks {
            once.observe(&tick(above)).unwrap();
            twice.observe(&tick(above)).unwrap();
        }
        once.reset();
        twice.reset();
        twice.reset();
        prop_assert_eq!(once.snapshots(), twice.snapshots());

        // Both replay identically afterwards.
        for &above in &ticks {
            let a = once.observe(&tick(above)).unwrap().map(|e| e.kind);
            let b = twice.observe(&tick(above)).unwrap().map(|e| e.kind);
            prop_assert_eq!(a, b);
        }
    }
}
