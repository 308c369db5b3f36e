use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One tick's samples for a named metric.
///
/// Metrics may report a range per tick; flap tracking classifies on `high`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    name: String,
    low: f64,
    high: f64,
}

impl Observation {
    pub fn new(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            low,
            high,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

/// Parses `name,low,high`. Whitespace is accepted as a separator too.
impl FromStr for Observation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty());

        let name = fields.next().ok_or_else(|| "missing metric name".to_string())?;
        let low = parse_sample(fields.next(), "low")?;
        let high = parse_sample(fields.next(), "high")?;
        if let Some(extra) = fields.next() {
            return Err(format!("unexpected trailing field `{}`", extra));
        }
        Ok(Self::new(name, low, high))
    }
}

fn parse_sample(field: Option<&str>, label: &str) -> Result<f64, String> {
    let raw = field.ok_or_else(|| format!("missing {} sample", label))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("{} sample `{}` is not a number", label, raw))?;
    if value.is_nan() {
        return Err(format!("{} sample is NaN", label));
    }
    Ok(value)
}
