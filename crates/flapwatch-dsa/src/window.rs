//! # flapwatch-dsa: Flap Window
//!
//! A fixed-capacity ring of per-tick classifications with a weighted
//! transition score.

use alloc::collections::VecDeque;
use crate::weights::WeightProfile;

/// Bounded, ordered history of the last `capacity` classifications.
///
/// ## Invariants
/// - `len() <= capacity()` at all times.
/// - Index 0 is the oldest retained slot; the back is the newest.
#[derive(Clone, Debug)]
pub struct FlapWindow<T> {
    slots: VecDeque<T>,
    capacity: usize,
}

static_assertions::assert_impl_all!(FlapWindow<bool>: Send, Sync);

impl<T: Copy + PartialEq> FlapWindow<T> {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "FlapWindow: capacity must be non-zero");
        Self {
            slots: VecDeque::new(),
            capacity,
        }
    }

    /// Appends the newest classification. Returns the evicted oldest slot
    /// once the window is full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.slots.len() == self.capacity {
            self.slots.pop_front()
        } else {
            None
        };
        self.slots.push_back(value);
        evicted
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the window holds `capacity` slots.
    pub fn is_warm(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub fn newest(&self) -> Option<T> {
        self.slots.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.slots.iter().copied()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of adjacent slot pairs that differ.
    pub fn transitions(&self) -> usize {
        self.slots
            .iter()
            .zip(self.slots.iter().skip(1))
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Weighted fraction of adjacent-slot changes, clamped to `[0, 1]`.
    ///
    /// Each differing pair contributes the weight of its later slot. Slots are
    /// aligned to the newest end, so during warm-up the newest slot still
    /// carries the profile's high weight. The sum is normalised by the pair
    /// count of a full window (`capacity - 1`), not by the pairs present.
    pub fn transition_score(&self, weights: &WeightProfile) -> f64 {
        if self.capacity <= 1 || self.slots.len() < 2 {
            return 0.0;
        }
        let offset = self.capacity - self.slots.len();
        let mut sum = 0.0;
        for (i, (prev, next)) in self.slots.iter().zip(self.slots.iter().skip(1)).enumerate() {
            if prev != next {
                sum += weights.weight_at(offset + i + 1);
            }
        }
        let score = sum / (self.capacity - 1) as f64;
        score.clamp(0.0, 1.0)
    }
}
