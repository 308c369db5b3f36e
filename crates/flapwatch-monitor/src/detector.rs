use crate::listener::{FlapEvent, FlapEventKind, FlapListener};
use crate::series::{FlapState, SeriesSnapshot, SeriesState};
use flapwatch_core::{
    Classification, ConfigurationError, DetectorConfig, Observation, ThresholdEvaluator, ThresholdLookup,
};
use std::collections::HashMap;

/// Threshold flap detector over per-name observation streams.
///
/// Owns one [`SeriesState`] per metric name, created lazily on the first
/// observation and kept until [`FlapDetector::reset`]. Names never share
/// state.
///
/// ## Tick Contract
/// `observe` classifies, updates the window, recomputes the score, advances
/// the hysteresis flag and reports at most one event, all within the call.
pub struct FlapDetector<L = DetectorConfig> {
    config: DetectorConfig,
    evaluator: ThresholdEvaluator<L>,
    series: HashMap<String, SeriesState>,
}

impl FlapDetector<DetectorConfig> {
    /// Detector whose thresholds come from the configuration itself.
    pub fn from_config(config: DetectorConfig) -> Result<Self, ConfigurationError> {
        let lookup = config.clone();
        Self::new(config, lookup)
    }
}

impl<L: ThresholdLookup> FlapDetector<L> {
    /// Validates `config` up front; flap settings come from `config`,
    /// thresholds from `lookup`.
    pub fn new(config: DetectorConfig, lookup: L) -> Result<Self, ConfigurationError> {
        config.validate()?;
        tracing::debug!(
            "FlapDetector: configured [interval: {}, start: {}, stop: {}, weights: {}..{}]",
            config.flap.interval,
            config.flap.start_threshold,
            config.flap.stop_threshold,
            config.flap.low_weight,
            config.flap.high_weight
        );
        Ok(Self {
            config,
            evaluator: ThresholdEvaluator::new(lookup),
            series: HashMap::new(),
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &ThresholdEvaluator<L> {
        &self.evaluator
    }

    /// Delivers the next tick for `observation.name()`.
    ///
    /// Fails only when the name has no usable threshold; in that case no
    /// series state is created or touched.
    pub fn observe(&mut self, observation: &Observation) -> Result<Option<FlapEvent>, ConfigurationError> {
        let classification = self.evaluator.classify(observation)?;
        let config = &self.config;
        let series = self
            .series
            .entry(observation.name().to_string())
            .or_insert_with(|| {
                tracing::debug!("FlapDetector: tracking new series `{}`", observation.name());
                SeriesState::new(&config.settings_for(observation.name()))
            });

        let kind = series.advance(classification);
        Ok(kind.map(|kind| {
            let event = FlapEvent {
                kind,
                observation: observation.clone(),
                score: series.score(),
                tick: series.ticks(),
            };
            log_event(&event);
            event
        }))
    }

    /// [`observe`](Self::observe), then hands the event to `listener`.
    pub fn observe_with(
        &mut self,
        observation: &Observation,
        listener: &mut dyn FlapListener,
    ) -> Result<Option<FlapEventKind>, ConfigurationError> {
        let event = self.observe(observation)?;
        if let Some(event) = &event {
            event.dispatch(listener);
        }
        Ok(event.map(|e| e.kind))
    }

    /// Clears every series: history, score, flags and last classification.
    pub fn reset(&mut self) {
        for series in self.series.values_mut() {
            series.reset();
        }
        tracing::debug!("FlapDetector: reset {} series", self.series.len());
    }

    /// Clears one series. Returns `false` if the name was never observed.
    pub fn reset_series(&mut self, name: &str) -> bool {
        match self.series.get_mut(name) {
            Some(series) => {
                series.reset();
                tracing::debug!("FlapDetector: reset series `{}`", name);
                true
            }
            None => false,
        }
    }

    /// Drops all per-name state, including window geometry.
    pub fn clear(&mut self) {
        self.series.clear();
    }

    pub fn state(&self, name: &str) -> Option<FlapState> {
        self.series.get(name).and_then(SeriesState::state)
    }

    pub fn score(&self, name: &str) -> Option<f64> {
        self.series.get(name).map(SeriesState::score)
    }

    pub fn is_flapping(&self, name: &str) -> bool {
        self.series.get(name).is_some_and(SeriesState::is_flapping)
    }

    /// The notification fired by the most recent tick of `name`.
    pub fn last_event(&self, name: &str) -> Option<FlapEventKind> {
        self.series.get(name).and_then(SeriesState::last_event)
    }

    /// Retained classifications for `name`, oldest first.
    pub fn history(&self, name: &str) -> Vec<Classification> {
        self.series
            .get(name)
            .map(|s| s.history().collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self, name: &str) -> Option<SeriesSnapshot> {
        self.series.get(name).map(|s| s.snapshot(name))
    }

    /// Snapshots of every tracked series, sorted by name.
    pub fn snapshots(&self) -> Vec<SeriesSnapshot> {
        let mut all: Vec<_> = self.series.iter().map(|(name, s)| s.snapshot(name)).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn tracked_count(&self) -> usize {
        self.series.len()
    }
}

pub(crate) fn log_event(event: &FlapEvent) {
    tracing::debug!(
        "FLAP: `{}` {} [score: {:.3}, tick: {}]",
        event.observation.name(),
        event.kind.as_str(),
        event.score,
        event.tick
    );
}
