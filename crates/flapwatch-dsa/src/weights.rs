/// Linear weight ramp across the slots of a flap window.
///
/// Position 0 is the oldest slot of a full window and carries `low`;
/// position `capacity - 1` is the newest slot and carries `high`.
/// Equal weights degenerate to an unweighted transition count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightProfile {
    low: f64,
    high: f64,
    capacity: usize,
}

impl WeightProfile {
    /// Builds a profile for a window of `capacity` slots.
    ///
    /// Range checks live with the configuration layer; the profile itself
    /// only requires a non-zero capacity.
    pub fn new(low: f64, high: f64, capacity: usize) -> Self {
        debug_assert!(capacity > 0, "WeightProfile: capacity must be non-zero");
        Self { low, high, capacity }
    }

    /// A profile with weight 1.0 in every slot.
    pub fn uniform(capacity: usize) -> Self {
        Self::new(1.0, 1.0, capacity)
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Weight of the slot at `position`, clamped to the newest slot.
    #[inline(always)]
    pub fn weight_at(&self, position: usize) -> f64 {
        if self.capacity <= 1 {
            return self.high;
        }
        let last = self.capacity - 1;
        let position = position.min(last);
        self.low + (self.high - self.low) * position as f64 / last as f64
    }
}
