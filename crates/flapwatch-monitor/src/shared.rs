use crate::detector::log_event;
use crate::listener::{FlapEvent, FlapEventKind, FlapListener};
use crate::series::{FlapState, SeriesSnapshot, SeriesState};
use flapwatch_core::{ConfigurationError, DetectorConfig, Observation, ThresholdEvaluator, ThresholdLookup};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// A [`FlapDetector`](crate::FlapDetector) that takes `&self`, for callers
/// that drive different names from different threads.
///
/// ## Locking
/// The name map sits behind an `RwLock` that is only write-locked to insert a
/// new series; each series has its own `Mutex`. Two names never contend on a
/// series lock. Ticks for the same name are serialised by that name's lock,
/// but their relative order is whatever order the callers reach it in.
pub struct SharedFlapDetector<L = DetectorConfig> {
    config: DetectorConfig,
    evaluator: ThresholdEvaluator<L>,
    series: RwLock<HashMap<String, Arc<Mutex<SeriesState>>>>,
}

impl SharedFlapDetector<DetectorConfig> {
    pub fn from_config(config: DetectorConfig) -> Result<Self, ConfigurationError> {
        let lookup = config.clone();
        Self::new(config, lookup)
    }
}

impl<L: ThresholdLookup> SharedFlapDetector<L> {
    pub fn new(config: DetectorConfig, lookup: L) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            evaluator: ThresholdEvaluator::new(lookup),
            series: RwLock::new(HashMap::new()),
        })
    }

    pub fn observe(&self, observation: &Observation) -> Result<Option<FlapEvent>, ConfigurationError> {
        let classification = self.evaluator.classify(observation)?;
        let handle = self.series_handle(observation.name());

        // Series updates never leave a half-written state, so a poisoned lock
        // still guards consistent data.
        let mut series = handle.lock().unwrap_or_else(PoisonError::into_inner);
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

    /// [`observe`](Self::observe), then hands the event to `listener`. The
    /// series lock is released before the listener runs.
    pub fn observe_with(
        &self,
        observation: &Observation,
        listener: &mut dyn FlapListener,
    ) -> Result<Option<FlapEventKind>, ConfigurationError> {
        let event = self.observe(observation)?;
        if let Some(event) = &event {
            event.dispatch(listener);
        }
        Ok(event.map(|e| e.kind))
    }

    pub fn reset(&self) {
        let map = self.series.read().unwrap_or_else(PoisonError::into_inner);
        for handle in map.values() {
            handle.lock().unwrap_or_else(PoisonError::into_inner).reset();
        }
        tracing::debug!("SharedFlapDetector: reset {} series", map.len());
    }

    pub fn reset_series(&self, name: &str) -> bool {
        match self.existing(name) {
            Some(handle) => {
                handle.lock().unwrap_or_else(PoisonError::into_inner).reset();
                true
            }
            None => false,
        }
    }

    pub fn state(&self, name: &str) -> Option<FlapState> {
        self.with_series(name, SeriesState::state).flatten()
    }

    pub fn score(&self, name: &str) -> Option<f64> {
        self.with_series(name, SeriesState::score)
    }

    pub fn is_flapping(&self, name: &str) -> bool {
        self.with_series(name, SeriesState::is_flapping).unwrap_or(false)
    }

    pub fn snapshot(&self, name: &str) -> Option<SeriesSnapshot> {
        self.with_series(name, |s| s.snapshot(name))
    }

    pub fn tracked_count(&self) -> usize {
        self.series.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn with_series<T>(&self, name: &str, f: impl FnOnce(&SeriesState) -> T) -> Option<T> {
        let handle = self.existing(name)?;
        let series = handle.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&series))
    }

    fn existing(&self, name: &str) -> Option<Arc<Mutex<SeriesState>>> {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn series_handle(&self, name: &str) -> Arc<Mutex<SeriesState>> {
        if let Some(handle) = self.existing(name) {
            return handle;
        }
        let mut map = self.series.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!("SharedFlapDetector: tracking new series `{}`", name);
                Arc::new(Mutex::new(SeriesState::new(&self.config.settings_for(name))))
            })
            .clone()
    }
}
