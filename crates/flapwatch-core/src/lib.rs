pub mod config;
pub mod error;
pub mod observation;
pub mod threshold;

pub use config::{DetectorConfig, FlapSettings, MetricConfig, MAX_INTERVAL};
pub use error::{ConfigurationError, FlapError, Result};
pub use observation::Observation;
pub use threshold::{Classification, FixedThreshold, ThresholdEvaluator, ThresholdLookup};

/// Fluent builder for a validated [`DetectorConfig`].
///
/// ## Fail Fast
/// Nothing is checked while chaining; `build` validates the whole
/// configuration before any observation can reach a detector.
#[derive(Debug, Clone, Default)]
pub struct DetectorBuilder {
    pub config: DetectorConfig,
}

impl DetectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window capacity in ticks.
    pub fn interval(mut self, interval: usize) -> Self {
        self.config.flap.interval = interval;
        self
    }

    pub fn start_threshold(mut self, score: f64) -> Self {
        self.config.flap.start_threshold = score;
        self
    }

    pub fn stop_threshold(mut self, score: f64) -> Self {
        self.config.flap.stop_threshold = score;
        self
    }

    /// Oldest-slot and newest-slot weights.
    pub fn weights(mut self, low: f64, high: f64) -> Self {
        self.config.flap.low_weight = low;
        self.config.flap.high_weight = high;
        self
    }

    pub fn default_threshold(mut self, threshold: f64) -> Self {
        self.config.default_threshold = Some(threshold);
        self
    }

    /// Sets the threshold of one metric, keeping any other overrides it has.
    pub fn threshold(mut self, name: &str, threshold: f64) -> Self {
        self.config.metrics.entry(name.to_string()).or_default().threshold = Some(threshold);
        self
    }

    /// Replaces all overrides of one metric.
    pub fn metric(mut self, name: &str, metric: MetricConfig) -> Self {
        self.config.metrics.insert(name.to_string(), metric);
        self
    }

    /// Overrides the whole configuration.
    pub fn with_config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> std::result::Result<DetectorConfig, ConfigurationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
