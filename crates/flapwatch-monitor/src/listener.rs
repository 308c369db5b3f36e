use flapwatch_core::Observation;
use serde::Serialize;

/// The five externally meaningful outcomes of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlapEventKind {
    FlappingStarted,
    AboveThresholdFlappingStopped,
    BelowThresholdFlappingStopped,
    AboveThresholdNotFlapping,
    BelowThresholdNotFlapping,
}

impl FlapEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlapEventKind::FlappingStarted => "flapping_started",
            FlapEventKind::AboveThresholdFlappingStopped => "above_threshold_flapping_stopped",
            FlapEventKind::BelowThresholdFlappingStopped => "below_threshold_flapping_stopped",
            FlapEventKind::AboveThresholdNotFlapping => "above_threshold_not_flapping",
            FlapEventKind::BelowThresholdNotFlapping => "below_threshold_not_flapping",
        }
    }
}

/// A transition notification with the tick that caused it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlapEvent {
    pub kind: FlapEventKind,
    pub observation: Observation,
    /// Instability score after the tick.
    pub score: f64,
    /// 1-based tick index within the series since its last reset.
    pub tick: u64,
}

impl FlapEvent {
    /// Invokes the single listener callback matching this event.
    pub fn dispatch<L: FlapListener + ?Sized>(&self, listener: &mut L) {
        let obs = &self.observation;
        match self.kind {
            FlapEventKind::FlappingStarted => listener.flapping_started(obs),
            FlapEventKind::AboveThresholdFlappingStopped => listener.above_threshold_flapping_stopped(obs),
            FlapEventKind::BelowThresholdFlappingStopped => listener.below_threshold_flapping_stopped(obs),
            FlapEventKind::AboveThresholdNotFlapping => listener.above_threshold_not_flapping(obs),
            FlapEventKind::BelowThresholdNotFlapping => listener.below_threshold_not_flapping(obs),
        }
    }
}

/// Notification sink. Implement only the callbacks you care about.
///
/// The detector calls at most one of these per tick, synchronously, before
/// the delivering call returns.
pub trait FlapListener {
    fn flapping_started(&mut self, _observation: &Observation) {}

    fn above_threshold_flapping_stopped(&mut self, _observation: &Observation) {}

    fn below_threshold_flapping_stopped(&mut self, _observation: &Observation) {}

    fn above_threshold_not_flapping(&mut self, _observation: &Observation) {}

    fn below_threshold_not_flapping(&mut self, _observation: &Observation) {}
}

impl<F> FlapListener for F
where
    F: FnMut(FlapEventKind, &Observation),
{
    fn flapping_started(&mut self, observation: &Observation) {
        self(FlapEventKind::FlappingStarted, observation)
    }

    fn above_threshold_flapping_stopped(&mut self, observation: &Observation) {
        self(FlapEventKind::AboveThresholdFlappingStopped, observation)
    }

    fn below_threshold_flapping_stopped(&mut self, observation: &Observation) {
        self(FlapEventKind::BelowThresholdFlappingStopped, observation)
    }

    fn above_threshold_not_flapping(&mut self, observation: &Observation) {
        self(FlapEventKind::AboveThresholdNotFlapping, observation)
    }

    fn below_threshold_not_flapping(&mut self, observation: &Observation) {
        self(FlapEventKind::BelowThresholdNotFlapping, observation)
    }
}

/// Records every notification in delivery order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<(FlapEventKind, Observation)>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(FlapEventKind, Observation)] {
        &self.entries
    }

    pub fn kinds(&self) -> Vec<FlapEventKind> {
        self.entries.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn last(&self) -> Option<FlapEventKind> {
        self.entries.last().map(|(kind, _)| *kind)
    }

    pub fn count(&self, kind: FlapEventKind) -> usize {
        self.entries.iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn record(&mut self, kind: FlapEventKind, observation: &Observation) {
        self.entries.push((kind, observation.clone()));
    }
}

impl FlapListener for EventLog {
    fn flapping_started(&mut self, observation: &Observation) {
        self.record(FlapEventKind::FlappingStarted, observation);
    }

    fn above_threshold_flapping_stopped(&mut self, observation: &Observation) {
        self.record(FlapEventKind::AboveThresholdFlappingStopped, observation);
    }

    fn below_threshold_flapping_stopped(&mut self, observation: &Observation) {
        self.record(FlapEventKind::BelowThresholdFlappingStopped, observation);
    }

    fn above_threshold_not_flapping(&mut self, observation: &Observation) {
        self.record(FlapEventKind::AboveThresholdNotFlapping, observation);
    }

    fn below_threshold_not_flapping(&mut self, observation: &Observation) {
        self.record(FlapEventKind::BelowThresholdNotFlapping, observation);
    }
}

/// Console sink: logs each notification through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl FlapListener for TracingListener {
    fn flapping_started(&mut self, observation: &Observation) {
        tracing::warn!("{}: flapping around its threshold (high={})", observation.name(), observation.high());
    }

    fn above_threshold_flapping_stopped(&mut self, observation: &Observation) {
        tracing::warn!("{}: stopped flapping, settled above threshold (high={})", observation.name(), observation.high());
    }

    fn below_threshold_flapping_stopped(&mut self, observation: &Observation) {
        tracing::info!("{}: stopped flapping, settled below threshold (high={})", observation.name(), observation.high());
    }

    fn above_threshold_not_flapping(&mut self, observation: &Observation) {
        tracing::warn!("{}: crossed above threshold (high={})", observation.name(), observation.high());
    }

    fn below_threshold_not_flapping(&mut self, observation: &Observation) {
        tracing::info!("{}: back below threshold (high={})", observation.name(), observation.high());
    }
}
