//! # Replay: line-oriented observation logs
//!
//! One record per line:
//! - `name,low,high` (commas or whitespace) delivers a tick.
//! - `!reset` clears all series, as after a monitored application restart.
//! - Blank lines and `#` comments are skipped.

use crate::detector::FlapDetector;
use crate::listener::{FlapEvent, FlapEventKind};
use flapwatch_core::{FlapError, Observation, ThresholdLookup};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufRead;

pub const RESET_MARKER: &str = "!reset";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplayRecord {
    Observation(Observation),
    Reset,
}

/// Parses one line. `Ok(None)` for blank and comment lines.
pub fn parse_record(line: &str) -> Result<Option<ReplayRecord>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if line == RESET_MARKER {
        return Ok(Some(ReplayRecord::Reset));
    }
    line.parse::<Observation>().map(|obs| Some(ReplayRecord::Observation(obs)))
}

/// Totals for a replay run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub ticks: u64,
    pub resets: u64,
    pub events: BTreeMap<FlapEventKind, u64>,
}

impl ReplaySummary {
    pub fn count(&self, kind: FlapEventKind) -> u64 {
        self.events.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_events(&self) -> u64 {
        self.events.values().sum()
    }
}

/// Feeds every record of `reader` through `detector`, handing each event to
/// `on_event` as it fires.
///
/// Stops at the first malformed line or configuration error.
pub fn replay<R, L, F>(reader: R, detector: &mut FlapDetector<L>, mut on_event: F) -> Result<ReplaySummary, FlapError>
where
    R: BufRead,
    L: ThresholdLookup,
    F: FnMut(&FlapEvent),
{
    let mut summary = ReplaySummary::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let record = parse_record(&line).map_err(|reason| FlapError::MalformedRecord { line: idx + 1, reason })?;
        match record {
            None => continue,
            Some(ReplayRecord::Reset) => {
                detector.reset();
                summary.resets += 1;
            }
            Some(ReplayRecord::Observation(obs)) => {
                summary.ticks += 1;
                if let Some(event) = detector.observe(&obs)? {
                    *summary.events.entry(event.kind).or_insert(0) += 1;
                    on_event(&event);
                }
            }
        }
    }
    tracing::info!(
        "Replay: {} ticks, {} resets, {} events",
        summary.ticks,
        summary.resets,
        summary.total_events()
    );
    Ok(summary)
}
