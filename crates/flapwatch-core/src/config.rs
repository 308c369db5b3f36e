use crate::error::{ConfigurationError, FlapError};
use crate::threshold::ThresholdLookup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Largest accepted window capacity. Each tracked series holds one slot per
/// tick of its window.
pub const MAX_INTERVAL: usize = 1 << 16;

/// Flap window and hysteresis parameters.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct FlapSettings {
    /// Window capacity in ticks.
    pub interval: usize,
    /// Score at or above which a stable series starts flapping.
    pub start_threshold: f64,
    /// Score at or below which a flapping series stops flapping.
    pub stop_threshold: f64,
    /// Weight of the oldest window slot.
    pub low_weight: f64,
    /// Weight of the newest window slot.
    pub high_weight: f64,
}

impl Default for FlapSettings {
    fn default() -> Self {
        Self {
            interval: 10,
            start_threshold: 0.29,
            stop_threshold: 0.49,
            low_weight: 1.0,
            high_weight: 1.0,
        }
    }
}

impl FlapSettings {
    /// Rejects values that would break the score range or the state machine.
    ///
    /// Start and stop thresholds are checked independently; no ordering
    /// between them is required. Weights only need to be finite and
    /// non-negative: a ramp above 1.0 saturates the score at 1.0.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.interval == 0 || self.interval > MAX_INTERVAL {
            return Err(ConfigurationError::InvalidCapacity(self.interval));
        }
        let weight_ok = |w: f64| w.is_finite() && w >= 0.0;
        if !weight_ok(self.low_weight) || !weight_ok(self.high_weight) {
            return Err(ConfigurationError::InvalidWeights {
                low: self.low_weight,
                high: self.high_weight,
            });
        }
        // A zero start threshold would flag an empty window as flapping.
        if !(self.start_threshold > 0.0 && self.start_threshold <= 1.0) {
            return Err(ConfigurationError::InvalidScoreThreshold {
                which: "start",
                value: self.start_threshold,
            });
        }
        if !(0.0..=1.0).contains(&self.stop_threshold) {
            return Err(ConfigurationError::InvalidScoreThreshold {
                which: "stop",
                value: self.stop_threshold,
            });
        }
        Ok(())
    }
}

/// Per-metric overrides. Unset fields fall back to the detector defaults.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MetricConfig {
    pub threshold: Option<f64>,
    pub interval: Option<usize>,
    pub start_threshold: Option<f64>,
    pub stop_threshold: Option<f64>,
    pub low_weight: Option<f64>,
    pub high_weight: Option<f64>,
}

impl MetricConfig {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: Some(threshold),
            ..Self::default()
        }
    }

    /// Layers these overrides on top of `defaults`.
    pub fn resolve(&self, defaults: &FlapSettings) -> FlapSettings {
        FlapSettings {
            interval: self.interval.unwrap_or(defaults.interval),
            start_threshold: self.start_threshold.unwrap_or(defaults.start_threshold),
            stop_threshold: self.stop_threshold.unwrap_or(defaults.stop_threshold),
            low_weight: self.low_weight.unwrap_or(defaults.low_weight),
            high_weight: self.high_weight.unwrap_or(defaults.high_weight),
        }
    }
}

/// Detector configuration as read from TOML.
///
/// ```toml
/// default_threshold = 10
///
/// [flap]
/// interval = 10
/// start_threshold = 0.29
/// stop_threshold = 0.49
///
/// [metrics.heap_used]
/// threshold = 900
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub flap: FlapSettings,
    /// Boundary for metrics with no entry of their own. `None` makes an
    /// unlisted metric a configuration error.
    pub default_threshold: Option<f64>,
    pub metrics: BTreeMap<String, MetricConfig>,
}

impl DetectorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, FlapError> {
        let config: DetectorConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlapError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        tracing::debug!("Config: loaded {} ({} bytes)", path.display(), raw.len());
        Self::from_toml_str(&raw)
    }

    /// Checks the defaults, every override, and every configured threshold.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.flap.validate()?;
        if let Some(value) = self.default_threshold {
            check_threshold("<default>", value)?;
        }
        for (name, metric) in &self.metrics {
            metric.resolve(&self.flap).validate()?;
            if let Some(value) = metric.threshold {
                check_threshold(name, value)?;
            }
        }
        Ok(())
    }

    /// Effective flap settings for `name`.
    pub fn settings_for(&self, name: &str) -> FlapSettings {
        match self.metrics.get(name) {
            Some(metric) => metric.resolve(&self.flap),
            None => self.flap,
        }
    }

    pub fn threshold_for(&self, name: &str) -> Result<f64, ConfigurationError> {
        self.metrics
            .get(name)
            .and_then(|m| m.threshold)
            .or(self.default_threshold)
            .ok_or_else(|| ConfigurationError::MissingThreshold {
                name: name.to_string(),
            })
    }
}

impl ThresholdLookup for DetectorConfig {
    fn threshold(&self, name: &str) -> Result<f64, ConfigurationError> {
        self.threshold_for(name)
    }
}

fn check_threshold(name: &str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidThreshold {
            name: name.to_string(),
            value,
        })
    }
}
