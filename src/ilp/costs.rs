//! Cost terms of the tracking objective
//!
//! All costs are minimized. Segment costs are negative for regions that sit
//! in a valley of the gap-separation signal (good cells) and zero for flat
//! signal; compatibility terms are non-negative penalties.

use nalgebra::DVector;

use super::hypothesis::Hypothesis;
use crate::tree::Interval;

/// Unary cost of segmenting `[a, b]` as one cell
///
/// `-0.5 * ((b - a) * max(g[a..=b]) - sum(g[a..=b]))`
///
/// Returns `None` if the interval reaches past the end of the signal.
pub fn segment_cost(gap_separation: &DVector<f64>, interval: Interval) -> Option<f64> {
    if interval.b >= gap_separation.len() {
        return None;
    }
    let window = gap_separation.rows(interval.a, interval.extent() + 1);
    let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum = window.sum();
    Some(-0.5 * (interval.extent() as f64 * max - sum))
}

/// True if a mapping or division from `from` into `to` is geometrically allowed
///
/// Cells only move down the channel, so `to` must not lie strictly below `from`.
#[inline]
pub fn is_compatible(from: &Hypothesis, to: &Hypothesis) -> bool {
    !to.interval().is_below(&from.interval())
}

/// Penalty for `from` continuing as `to`
///
/// Shrinking, intensity change and long segments are penalized.
pub fn mapping_compatibility(from: &Hypothesis, to: &Hypothesis) -> f64 {
    let shrink = from.size().saturating_sub(to.size()) as f64;
    let value_change = (from.value() - to.value()).abs();
    let extent = 0.5 * from.interval().extent() as f64 + 0.5 * to.interval().extent() as f64;
    shrink + value_change + extent
}

/// Full cost of a mapping: both unary costs plus compatibility
pub fn mapping_cost(from: &Hypothesis, to: &Hypothesis) -> f64 {
    from.cost() + to.cost() + mapping_compatibility(from, to)
}

/// Penalty for `from` dividing into `upper` and `lower`
pub fn division_compatibility(from: &Hypothesis, upper: &Hypothesis, lower: &Hypothesis) -> f64 {
    let shrink = from.size().saturating_sub(upper.size() + lower.size()) as f64;
    let value_change = (from.value() - 0.5 * (upper.value() + lower.value())).abs();
    let span = lower.interval().b.saturating_sub(upper.interval().a) as f64;
    let extent = 0.5 * from.interval().extent() as f64 + 0.5 * span;
    let asymmetry = upper.size().abs_diff(lower.size()) as f64;
    shrink + value_change + extent + asymmetry
}

/// Full cost of a division: the three unary costs plus compatibility
pub fn division_cost(from: &Hypothesis, upper: &Hypothesis, lower: &Hypothesis) -> f64 {
    from.cost() + upper.cost() + lower.cost() + division_compatibility(from, upper, lower)
}
