//! Solution audits
//!
//! Each check reads the solved model through the public query API and
//! panics with a descriptive message on the first violation.

use growthline_tracking::tree::utils::{ancestors_inclusive, leaves_in_order};
use growthline_tracking::{
    AssignmentId, GrowthLineFrame, GrowthLineTrackingIlp, IlpModel, RegionKey,
};

fn active_count<M: IlpModel>(ilp: &GrowthLineTrackingIlp<M>, set: impl IntoIterator<Item = AssignmentId>) -> usize {
    set.into_iter()
        .filter(|&id| ilp.is_assignment_active(id).expect("solution is queryable"))
        .count()
}

/// Every right set holds at most one active assignment
pub fn assert_right_sets_exclusive<M: IlpModel>(ilp: &GrowthLineTrackingIlp<M>) {
    for t in 0..ilp.time_steps() {
        for &h in ilp.ledger().hypotheses_at(t) {
            let active = active_count(ilp, ilp.neighborhoods().right(h).iter().copied());
            assert!(active <= 1, "t={} {}: {} active outgoing assignments", t, h, active);
        }
    }
}

/// Incoming equals outgoing at every interior hypothesis
pub fn assert_flow_conservation<M: IlpModel>(ilp: &GrowthLineTrackingIlp<M>) {
    for t in 1..ilp.time_steps().saturating_sub(1) {
        for &h in ilp.ledger().hypotheses_at(t) {
            let incoming = active_count(ilp, ilp.neighborhoods().left(h).iter().copied());
            let outgoing = active_count(ilp, ilp.neighborhoods().right(h).iter().copied());
            assert_eq!(incoming, outgoing, "t={} {}: flow not conserved", t, h);
        }
    }
}

/// At most one explained region per leaf-to-root chain
pub fn assert_path_blocking<M: IlpModel>(ilp: &GrowthLineTrackingIlp<M>, frames: &[GrowthLineFrame]) {
    let last = frames.len().saturating_sub(1);
    for (t, frame) in frames.iter().enumerate() {
        for leaf in leaves_in_order(frame.tree()) {
            let mut active = 0;
            for node in ancestors_inclusive(frame.tree(), leaf) {
                let h = ilp
                    .ledger()
                    .find_hypothesis(RegionKey::new(t, node))
                    .expect("every region has a hypothesis");
                let set = if t == last {
                    ilp.neighborhoods().left(h)
                } else {
                    ilp.neighborhoods().right(h)
                };
                active += active_count(ilp, set.iter().copied());
            }
            assert!(active <= 1, "t={} leaf {:?}: {} active on chain", t, leaf, active);
        }
    }
}

/// Chosen segments of every frame are pairwise disjoint
pub fn assert_segmentation_disjoint<M: IlpModel>(ilp: &GrowthLineTrackingIlp<M>) {
    for t in 0..ilp.time_steps() {
        let chosen = ilp.optimal_hypotheses(t).expect("solution is queryable");
        for (i, a) in chosen.iter().enumerate() {
            for b in &chosen[i + 1..] {
                assert!(
                    !a.interval().overlaps(&b.interval()),
                    "t={}: {:?} overlaps {:?}",
                    t,
                    a.interval(),
                    b.interval()
                );
            }
        }
    }
}

/// All checks above
pub fn audit_solution<M: IlpModel>(ilp: &GrowthLineTrackingIlp<M>, frames: &[GrowthLineFrame]) {
    assert_right_sets_exclusive(ilp);
    assert_flow_conservation(ilp);
    assert_path_blocking(ilp, frames);
    assert_segmentation_disjoint(ilp);
}
