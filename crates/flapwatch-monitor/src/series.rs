//! Per-name flap state and the per-tick state machine.

use crate::listener::FlapEventKind;
use flapwatch_core::{Classification, FlapSettings};
use flapwatch_dsa::{FlapWindow, WeightProfile};
use serde::Serialize;

/// Externally visible condition of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "side")]
pub enum FlapState {
    StableAbove,
    StableBelow,
    /// Flapping, with the side of the most recent tick.
    Flapping(Classification),
}

/// Point-in-time view of one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSnapshot {
    pub name: String,
    pub state: Option<FlapState>,
    pub score: f64,
    pub flapping: bool,
    pub history_len: usize,
    pub capacity: usize,
    pub ticks: u64,
    pub last_event: Option<FlapEventKind>,
}

/// History, score and hysteresis flag for one metric name.
#[derive(Debug, Clone)]
pub(crate) struct SeriesState {
    window: FlapWindow<Classification>,
    weights: WeightProfile,
    start_threshold: f64,
    stop_threshold: f64,
    score: f64,
    flapping: bool,
    last: Option<Classification>,
    last_event: Option<FlapEventKind>,
    ticks: u64,
}

impl SeriesState {
    /// `settings` must already be validated.
    pub(crate) fn new(settings: &FlapSettings) -> Self {
        Self {
            window: FlapWindow::new(settings.interval),
            weights: WeightProfile::new(settings.low_weight, settings.high_weight, settings.interval),
            start_threshold: settings.start_threshold,
            stop_threshold: settings.stop_threshold,
            score: 0.0,
            flapping: false,
            last: None,
            last_event: None,
            ticks: 0,
        }
    }

    /// Advances one tick and returns the notification it fires, if any.
    ///
    /// Flap start, flap stop and plain crossing are checked in that order and
    /// are mutually exclusive, so a tick yields zero or one event.
    pub(crate) fn advance(&mut self, c: Classification) -> Option<FlapEventKind> {
        self.last_event = None;
        self.window.push(c);
        self.score = self.window.transition_score(&self.weights);
        self.ticks += 1;

        // Before the first tick a series counts as below its threshold.
        let previous = self.last.unwrap_or(Classification::Below);
        let was_flapping = self.flapping;

        let event = if !was_flapping && self.score >= self.start_threshold {
            self.flapping = true;
            Some(FlapEventKind::FlappingStarted)
        } else if was_flapping && self.score <= self.stop_threshold {
            self.flapping = false;
            Some(match c {
                Classification::Above => FlapEventKind::AboveThresholdFlappingStopped,
                Classification::Below => FlapEventKind::BelowThresholdFlappingStopped,
            })
        } else if !was_flapping && !self.flapping && c != previous {
            Some(match c {
                Classification::Above => FlapEventKind::AboveThresholdNotFlapping,
                Classification::Below => FlapEventKind::BelowThresholdNotFlapping,
            })
        } else {
            None
        };

        self.last = Some(c);
        self.last_event = event;
        event
    }

    /// Back to the pre-warm-up condition. Window geometry is kept.
    pub(crate) fn reset(&mut self) {
        self.window.clear();
        self.score = 0.0;
        self.flapping = false;
        self.last = None;
        self.last_event = None;
        self.ticks = 0;
    }

    pub(crate) fn score(&self) -> f64 {
        self.score
    }

    pub(crate) fn is_flapping(&self) -> bool {
        self.flapping
    }

    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(crate) fn last_event(&self) -> Option<FlapEventKind> {
        self.last_event
    }

    pub(crate) fn history(&self) -> impl Iterator<Item = Classification> + '_ {
        self.window.iter()
    }

    pub(crate) fn state(&self) -> Option<FlapState> {
        let side = self.last?;
        Some(match (self.flapping, side) {
            (true, side) => FlapState::Flapping(side),
            (false, Classification::Above) => FlapState::StableAbove,
            (false, Classification::Below) => FlapState::StableBelow,
        })
    }

    pub(crate) fn snapshot(&self, name: &str) -> SeriesSnapshot {
        SeriesSnapshot {
            name: name.to_string(),
            state: self.state(),
            score: self.score,
            flapping: self.flapping,
            history_len: self.window.len(),
            capacity: self.window.capacity(),
            ticks: self.ticks,
            last_event: self.last_event,
        }
    }
}
