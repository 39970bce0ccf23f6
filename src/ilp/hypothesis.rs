//! Segment hypotheses

use std::fmt;

use serde::Serialize;

use crate::tree::{Interval, RegionKey};

/// Index of a hypothesis in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct HypothesisId(pub usize);

impl fmt::Display for HypothesisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// One candidate region at one time step, with its unary cost
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hypothesis {
    region: RegionKey,
    interval: Interval,
    size: usize,
    value: f64,
    cost: f64,
}

impl Hypothesis {
    /// Create a hypothesis for `region`
    pub fn new(region: RegionKey, interval: Interval, size: usize, value: f64, cost: f64) -> Self {
        Self {
            region,
            interval,
            size,
            value,
            cost,
        }
    }

    /// Time step
    #[inline]
    pub fn time(&self) -> usize {
        self.region.time
    }

    /// Region this hypothesis stands for
    #[inline]
    pub fn region(&self) -> RegionKey {
        self.region
    }

    /// Covered interval along the channel
    #[inline]
    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Number of covered positions
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Intensity value
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Unary segment cost
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }
}
