//! # Shared Detector Tests
//!
//! Per-name isolation when different names are driven from different
//! threads.

use flapwatch_core::{DetectorBuilder, Observation};
use flapwatch_monitor::{EventLog, FlapDetector, FlapEventKind, FlapState, SharedFlapDetector, TracingListener};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn pattern(i: usize, seed: usize) -> bool {
    (i * 7 + seed * 3) % 5 < 2
}

#[test]
fn test_threads_per_name_match_sequential_detector() {
    let t = Instant::now();

    let config = DetectorBuilder::new()
        .interval(8)
        .weights(0.5, 1.0)
        .default_threshold(10.0)
        .build()
        .unwrap();
    let shared = Arc::new(SharedFlapDetector::from_config(config.clone()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|seed| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let name = format!("metric_{}", seed);
                let mut kinds = Vec::new();
                for i in 0..500 {
                    let high = if pattern(i, seed) { 20.0 } else { 0.0 };
                    let event = shared.observe(&Observation::new(name.clone(), 0.0, high)).unwrap();
                    kinds.push(event.map(|e| e.kind));
                }
                (name, kinds)
            })
        })
        .collect();

    for handle in handles {
        let (name, kinds) = handle.join().unwrap();
        let seed: usize = name.trim_start_matches("metric_").parse().unwrap();

        // Same stream through a private single-threaded detector.
        let mut reference = FlapDetector::from_config(config.clone()).unwrap();
        let expected: Vec<Option<FlapEventKind>> = (0..500)
            .map(|i| {
                let high = if pattern(i, seed) { 20.0 } else { 0.0 };
                reference
                    .observe(&Observation::new(name.clone(), 0.0, high))
                    .unwrap()
                    .map(|e| e.kind)
            })
            .collect();

        assert_eq!(kinds, expected, "series {} diverged", name);
        assert_eq!(shared.score(&name), reference.score(&name));
        assert_eq!(shared.state(&name), reference.state(&name));
    }

    assert_eq!(shared.tracked_count(), 8);
    println!("test_threads_per_name_match_sequential_detector: Testing Overhead = {:?}", t.elapsed());
}

#[test]
fn test_shared_reset_and_queries() {
    let config = DetectorBuilder::new().default_threshold(10.0).build().unwrap();
    let shared = SharedFlapDetector::from_config(config).unwrap();
    let above = Observation::new("cpu", 0.0, 20.0);
    let below = Observation::new("cpu", 0.0, 0.0);

    for _ in 0..10 {
        shared.observe(&below).unwrap();
    }
    shared.observe(&above).unwrap();
    shared.observe(&below).unwrap();
    let event = shared.observe(&above).unwrap().unwrap();
    assert_eq!(event.kind, FlapEventKind::FlappingStarted);
    assert!(shared.is_flapping("cpu"));
    assert!(matches!(shared.state("cpu"), Some(FlapState::Flapping(_))));

    shared.reset();
    assert!(!shared.is_flapping("cpu"));
    assert_eq!(shared.snapshot("cpu").unwrap().history_len, 0);
    assert!(shared.reset_series("cpu"));
    assert!(!shared.reset_series("disk"));
    assert_eq!(shared.score("disk"), None);
}

#[test]
fn test_shared_missing_threshold_creates_no_state() {
    let config = DetectorBuilder::new().threshold("cpu", 1.0).build().unwrap();
    let shared = SharedFlapDetector::from_config(config).unwrap();

    assert!(shared.observe(&Observation::new("disk", 0.0, 1.0)).is_err());
    assert_eq!(shared.tracked_count(), 0);
}

#[test]
fn test_shared_observe_with_dispatches_to_listeners() {
    let config = DetectorBuilder::new().default_threshold(10.0).build().unwrap();
    let shared = SharedFlapDetector::from_config(config).unwrap();
    let above = Observation::new("cpu", 0.0, 20.0);
    let below = Observation::new("cpu", 0.0, 0.0);
    let mut log = EventLog::new();

    for _ in 0..10 {
        assert_eq!(shared.observe_with(&below, &mut log).unwrap(), None);
    }
    assert_eq!(
        shared.observe_with(&above, &mut log).unwrap(),
        Some(FlapEventKind::AboveThresholdNotFlapping)
    );
    shared.observe_with(&below, &mut log).unwrap();

    // The console sink sees the flap onset through a captured subscriber.
    let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
    let onset = tracing::subscriber::with_default(subscriber, || {
        shared.observe_with(&above, &mut TracingListener).unwrap()
    });
    assert_eq!(onset, Some(FlapEventKind::FlappingStarted));

    assert_eq!(
        log.kinds(),
        vec![
            FlapEventKind::AboveThresholdNotFlapping,
            FlapEventKind::BelowThresholdNotFlapping,
        ]
    );
    let entries = log.entries();
    assert_eq!(entries[0].1, above);
    assert_eq!(entries[1].1.high(), 0.0);

    // A missing threshold fails before any listener runs.
    let disk = Observation::new("disk", 0.0, 1.0);
    let strict = SharedFlapDetector::from_config(DetectorBuilder::new().build().unwrap()).unwrap();
    assert!(strict.observe_with(&disk, &mut log).is_err());
    assert_eq!(log.len(), 2);
}
