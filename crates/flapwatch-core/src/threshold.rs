use crate::error::ConfigurationError;
use crate::observation::Observation;
use serde::{Deserialize, Serialize};

/// Which side of its threshold a tick landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Above,
    Below,
}

impl Classification {
    pub fn is_above(self) -> bool {
        self == Classification::Above
    }
}

/// Name-keyed threshold source.
///
/// A name with no threshold is a configuration error, not a silent default.
pub trait ThresholdLookup: Send + Sync {
    fn threshold(&self, name: &str) -> Result<f64, ConfigurationError>;
}

/// The same boundary for every metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedThreshold(pub f64);

impl ThresholdLookup for FixedThreshold {
    fn threshold(&self, _name: &str) -> Result<f64, ConfigurationError> {
        Ok(self.0)
    }
}

/// Closures map a name to an optional boundary; `None` means unconfigured.
impl<F> ThresholdLookup for F
where
    F: Fn(&str) -> Option<f64> + Send + Sync,
{
    fn threshold(&self, name: &str) -> Result<f64, ConfigurationError> {
        self(name).ok_or_else(|| ConfigurationError::MissingThreshold {
            name: name.to_string(),
        })
    }
}

/// Decides above/below for incoming observations.
#[derive(Debug, Clone)]
pub struct ThresholdEvaluator<L> {
    lookup: L,
}

impl<L: ThresholdLookup> ThresholdEvaluator<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// `Above` iff the observation's high sample is at or over the threshold.
    pub fn classify(&self, observation: &Observation) -> Result<Classification, ConfigurationError> {
        let threshold = self.lookup.threshold(observation.name())?;
        if !threshold.is_finite() {
            return Err(ConfigurationError::InvalidThreshold {
                name: observation.name().to_string(),
                value: threshold,
            });
        }
        Ok(if observation.high() >= threshold {
            Classification::Above
        } else {
            Classification::Below
        })
    }
}
