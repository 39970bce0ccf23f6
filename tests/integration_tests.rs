//! Integration tests for building, solving and querying the tracking ILP
//!
//! Hand-built growth lines with known costs, ground-truth pins, and solution
//! properties checked on seeded synthetic growth lines.

mod helpers;

use nalgebra::DVector;

use growthline_tracking::ilp::costs::segment_cost;
use growthline_tracking::reporter::ConstraintFamily;
use growthline_tracking::synthetic::{generate_growth_lines, SyntheticConfig};
use growthline_tracking::{
    track_all, AssignmentEdge, AssignmentId, AssignmentKind, BranchAndBoundEnv, BranchAndBoundModel,
    ComponentTree, DebugReporter, GroundTruth, GrowthLine, GrowthLineFrame, GrowthLineTrackingIlp,
    IlpStatus, Interval, TrackingConfig, TrackingError,
};

use helpers::audit::audit_solution;
use helpers::fixtures::{
    build_ilp, dividing_cell, gap_with_borders, single_cell_frame, splittable_frame, two_cell_frame,
};

const ALL_COSTS: std::ops::RangeInclusive<f64> = f64::MIN..=f64::MAX;

fn of_kind(
    ilp: &GrowthLineTrackingIlp<BranchAndBoundModel>,
    t: usize,
    kind: AssignmentKind,
) -> Vec<AssignmentId> {
    ilp.assignments_at(t, Some(kind), ALL_COSTS).unwrap()
}

/// Three separate cells, `[0,4]`, `[6,10]` and `[12,16]`
fn three_cell_frame() -> GrowthLineFrame {
    let mut tree = ComponentTree::new();
    tree.add_root_interval(0, 4, 0.5);
    tree.add_root_interval(6, 10, 0.5);
    tree.add_root_interval(12, 16, 0.5);
    GrowthLineFrame::new(tree, gap_with_borders(17, &[0, 4, 5, 6, 10, 11, 12, 16]))
}

// =============================================================================
// Cost and construction scenarios
// =============================================================================

/// Flat signal over `[0,10]`: `-0.5 * (10 * 1 - 11)`
#[test]
fn test_flat_segment_cost() {
    let gap = DVector::from_element(11, 1.0);
    let cost = segment_cost(&gap, Interval::new(0, 10)).unwrap();
    assert!((cost - 0.5).abs() < 1e-12);
}

#[test]
fn test_two_frame_single_mapping() {
    let frames = vec![single_cell_frame(5), single_cell_frame(5)];
    let ilp = build_ilp(&frames, &TrackingConfig::default());

    let mappings = of_kind(&ilp, 0, AssignmentKind::Mapping);
    assert_eq!(mappings.len(), 1);
    let (from, to) = match ilp.assignment(mappings[0]).unwrap().edge() {
        AssignmentEdge::Mapping { from, to } => (*from, *to),
        other => panic!("expected mapping, got {:?}", other),
    };
    let unary = ilp.hypothesis(from).unwrap().cost() + ilp.hypothesis(to).unwrap().cost();
    // equal size and value, extent 4 on both sides
    let expected = unary + 0.5 * 4.0 + 0.5 * 4.0;
    assert!((ilp.assignment_cost(mappings[0]).unwrap() - expected).abs() < 1e-12);

    let exits = of_kind(&ilp, 0, AssignmentKind::Exit);
    assert_eq!(exits.len(), ilp.ledger().hypotheses_at(0).len());
    for exit in exits {
        assert_eq!(ilp.assignment_cost(exit).unwrap(), 0.0);
    }
}

#[test]
fn test_divisions_pair_adjacent_siblings() {
    let frames = vec![single_cell_frame(9), splittable_frame()];
    let ilp = build_ilp(&frames, &TrackingConfig::default());

    let divisions = of_kind(&ilp, 0, AssignmentKind::Division);
    assert_eq!(divisions.len(), 1);
    match ilp.assignment(divisions[0]).unwrap().edge() {
        AssignmentEdge::Division {
            to_upper, to_lower, ..
        } => {
            let upper = ilp.hypothesis(*to_upper).unwrap().interval();
            let lower = ilp.hypothesis(*to_lower).unwrap().interval();
            assert_eq!(upper, Interval::new(0, 3));
            assert_eq!(lower, Interval::new(5, 8));
        }
        other => panic!("expected division, got {:?}", other),
    }
}

#[test]
fn test_reporter_sees_every_family() {
    let frames = vec![three_cell_frame(), three_cell_frame(), three_cell_frame()];
    let mut line: GrowthLine = GrowthLine::with_frames(frames);
    let env = BranchAndBoundEnv::default();
    let mut reporter = DebugReporter::new();

    line.generate_ilp_with_reporter(&env, &TrackingConfig::default(), &mut reporter)
        .unwrap();
    line.run_ilp_with_reporter(&mut reporter).unwrap();

    let counts = line.ilp().unwrap().constraint_counts();
    assert_eq!(reporter.hypothesis_events().len(), 3);
    assert_eq!(reporter.constraints_of(ConstraintFamily::Exit), counts.exit);
    assert_eq!(
        reporter.constraints_of(ConstraintFamily::Continuity),
        counts.continuity
    );
    assert_eq!(reporter.solve_events().len(), 1);
    assert_eq!(reporter.solve_events()[0].0, IlpStatus::Optimal);
}

// =============================================================================
// Ground-truth pins
// =============================================================================

/// Lowest of three cells exits only if nothing above it continues
#[test]
fn test_exit_blocked_by_continuing_cell_above() {
    let frames = vec![three_cell_frame(), three_cell_frame()];
    let mut ilp = build_ilp(&frames, &TrackingConfig::default());

    let exits = of_kind(&ilp, 0, AssignmentKind::Exit);
    let lowest_exit = exits
        .iter()
        .copied()
        .find(|&id| match ilp.assignment(id).unwrap().edge() {
            AssignmentEdge::Exit { hup, .. } => hup.len() == 2,
            _ => false,
        })
        .expect("lowest cell has two cells above");

    let top_mapping = of_kind(&ilp, 0, AssignmentKind::Mapping)
        .into_iter()
        .find(|&id| match ilp.assignment(id).unwrap().edge() {
            AssignmentEdge::Mapping { from, to } => {
                ilp.hypothesis(*from).unwrap().interval() == Interval::new(0, 4)
                    && ilp.hypothesis(*to).unwrap().interval() == Interval::new(0, 4)
            }
            _ => false,
        })
        .expect("top cell maps onto itself");

    ilp.set_ground_truth(top_mapping).unwrap();
    assert!(ilp.resolve().unwrap().has_solution());
    assert!(ilp.is_assignment_active(top_mapping).unwrap());
    assert!(!ilp.is_assignment_active(lowest_exit).unwrap());

    // forcing the exit stops every cell above from continuing
    ilp.clear_ground_truth(top_mapping).unwrap();
    ilp.set_ground_truth(lowest_exit).unwrap();
    assert!(ilp.resolve().unwrap().has_solution());
    assert!(ilp.is_assignment_active(lowest_exit).unwrap());
    let segmentation = ilp.optimal_hypotheses(1).unwrap();
    assert!(segmentation.is_empty(), "no cell can reach the next frame");
}

#[test]
fn test_pin_inactive_assignment() {
    let frames = vec![two_cell_frame(), two_cell_frame()];
    let mut ilp = build_ilp(&frames, &TrackingConfig::default());
    assert_eq!(ilp.run().unwrap(), IlpStatus::Optimal);

    let inactive = of_kind(&ilp, 0, AssignmentKind::Mapping)
        .into_iter()
        .find(|&id| !ilp.is_assignment_active(id).unwrap())
        .expect("the upward mapping is not chosen");

    ilp.set_ground_truth(inactive).unwrap();
    assert_eq!(ilp.ground_truth(inactive).unwrap(), GroundTruth::ForcedTrue);
    let status = ilp.resolve().unwrap();
    if status.has_solution() {
        assert!(ilp.is_assignment_active(inactive).unwrap());
        audit_solution(&ilp, &frames);
    } else {
        assert_eq!(status, IlpStatus::Infeasible);
    }
}

#[test]
fn test_pin_removal_and_resolve() {
    let frames = vec![two_cell_frame(), two_cell_frame(), two_cell_frame()];
    let mut ilp = build_ilp(&frames, &TrackingConfig::default());
    assert_eq!(ilp.run().unwrap(), IlpStatus::Optimal);
    let baseline = ilp.objective_value().unwrap();

    let active = ilp.active_assignments_at(0).unwrap();
    for &id in &active {
        ilp.set_ground_untruth(id).unwrap();
    }
    assert!(matches!(ilp.objective_value(), Err(TrackingError::StaleSolution)));
    ilp.resolve().unwrap();

    for &id in &active {
        ilp.clear_ground_truth(id).unwrap();
    }
    assert_eq!(ilp.constraint_counts().pins, 0);
    assert_eq!(ilp.resolve().unwrap(), IlpStatus::Optimal);
    assert!((ilp.objective_value().unwrap() - baseline).abs() < 1e-9);
    audit_solution(&ilp, &frames);
}

// =============================================================================
// Solution properties
// =============================================================================

#[test]
fn test_run_twice_is_identical() {
    let frames = vec![splittable_frame(), splittable_frame(), splittable_frame()];
    let mut ilp = build_ilp(&frames, &TrackingConfig::default());

    let first = ilp.run().unwrap();
    let first_objective = ilp.objective_value().unwrap();
    let first_active: Vec<_> = (0..frames.len())
        .map(|t| ilp.active_assignments_at(t).unwrap())
        .collect();

    let second = ilp.run().unwrap();
    assert_eq!(first, second);
    assert_eq!(first_objective, ilp.objective_value().unwrap());
    let second_active: Vec<_> = (0..frames.len())
        .map(|t| ilp.active_assignments_at(t).unwrap())
        .collect();
    assert_eq!(first_active, second_active);
}

#[test]
fn test_hand_built_lines_satisfy_constraints() {
    let lines = vec![
        vec![single_cell_frame(9), splittable_frame(), splittable_frame()],
        vec![two_cell_frame(), two_cell_frame(), two_cell_frame()],
        vec![three_cell_frame(), three_cell_frame()],
    ];
    for frames in &lines {
        let mut ilp = build_ilp(frames, &TrackingConfig::default());
        assert_eq!(ilp.run().unwrap(), IlpStatus::Optimal);
        audit_solution(&ilp, frames);
    }
}

/// Three cells of length 6 growing by 3 per frame: every cell divides
/// between the second and the last frame
fn dividing_channel(seed: u64) -> SyntheticConfig {
    SyntheticConfig {
        growth_lines: 3,
        frames: 3,
        channel_length: 40,
        initial_cells: 3,
        min_cell_length: 6,
        max_cell_length: 6,
        growth_per_frame: 3,
        division_probability: 1.0,
        oversegmentation_probability: 0.0,
        ..SyntheticConfig::with_seed(seed)
    }
}

#[test]
fn test_synthetic_lines_satisfy_constraints() {
    let mut lines = generate_growth_lines(&dividing_channel(11)).unwrap();
    let config = TrackingConfig::default().with_node_limit(Some(500_000));
    let env = BranchAndBoundEnv::open(config.solver.clone());

    let results = track_all(&mut lines, &env, &config);
    assert_eq!(results.len(), 3);
    for (i, (line, result)) in lines.iter().zip(&results).enumerate() {
        assert_eq!(result.as_ref().unwrap(), &IlpStatus::Optimal, "growth line {}", i);

        let ilp = line.ilp().unwrap();
        // one merged pair plus a single cell, then three dividing pairs
        let hypotheses: Vec<usize> = (0..3).map(|t| ilp.ledger().hypotheses_at(t).len()).collect();
        assert_eq!(hypotheses, vec![4, 4, 9], "growth line {}", i);
        assert!(ilp.ledger().count_at(1, AssignmentKind::Division) > 0);

        audit_solution(ilp, line.frames());
        let counts = line.active_hypothesis_counts().unwrap();
        assert_eq!(counts.len(), 3);
        assert!(counts.iter().all(|&c| c >= 2), "growth line {}: {:?}", i, counts);
    }
    env.close();
}

/// The merged mapping wins until it is vetoed; then the cell divides
#[test]
fn test_division_after_vetoing_merged_mapping() {
    let frames = dividing_cell();
    let mut ilp = build_ilp(&frames, &TrackingConfig::default());
    assert_eq!(ilp.run().unwrap(), IlpStatus::Optimal);
    // [0,8] -> root (-37), root -> root (-22)
    assert!((ilp.objective_value().unwrap() + 59.0).abs() < 1e-9);

    let merged = of_kind(&ilp, 0, AssignmentKind::Mapping)
        .into_iter()
        .find(|&id| match ilp.assignment(id).unwrap().edge() {
            AssignmentEdge::Mapping { to, .. } => {
                ilp.hypothesis(*to).unwrap().interval() == Interval::new(0, 8)
            }
            _ => false,
        })
        .expect("cell maps onto the merged root");
    assert!(ilp.is_assignment_active(merged).unwrap());
    let division = of_kind(&ilp, 0, AssignmentKind::Division)[0];
    assert!(!ilp.is_assignment_active(division).unwrap());

    ilp.set_ground_untruth(merged).unwrap();
    assert_eq!(ilp.resolve().unwrap(), IlpStatus::Optimal);
    assert!(ilp.is_assignment_active(division).unwrap());
    // division (-31), then one half continues onto the root (-14.5)
    assert!((ilp.objective_value().unwrap() + 45.5).abs() < 1e-9);
    assert_eq!(ilp.optimal_segmentation(1).unwrap().len(), 2);
    assert_eq!(ilp.optimal_segmentation(2).unwrap().len(), 1);
    audit_solution(&ilp, &frames);
}

// =============================================================================
// Growth line lifecycle
// =============================================================================

#[test]
fn test_failed_build_leaves_no_ilp() {
    let mut tree = ComponentTree::new();
    tree.add_root_interval(0, 20, 0.5);
    let bad = GrowthLineFrame::new(tree, gap_with_borders(5, &[0, 4]));
    let mut line: GrowthLine = GrowthLine::with_frames(vec![single_cell_frame(5), bad]);
    let env = BranchAndBoundEnv::default();
    let mut reporter = DebugReporter::new();

    let err = line
        .generate_ilp_with_reporter(&env, &TrackingConfig::default(), &mut reporter)
        .unwrap_err();
    assert!(matches!(err, TrackingError::SignalTooShort { time: 1, .. }));
    assert!(line.ilp().is_none());
    assert_eq!(reporter.abort_events().len(), 1);
    assert!(matches!(line.run_ilp(), Err(TrackingError::IlpNotGenerated)));
}

#[test]
fn test_adding_frame_drops_ilp() {
    let mut line: GrowthLine = GrowthLine::with_frames(vec![single_cell_frame(5)]);
    let env = BranchAndBoundEnv::default();
    line.generate_ilp(&env, &TrackingConfig::default()).unwrap();
    assert!(line.ilp().is_some());

    line.add(single_cell_frame(5));
    assert!(line.ilp().is_none());
    line.generate_ilp(&env, &TrackingConfig::default()).unwrap();
    assert_eq!(line.run_ilp().unwrap(), IlpStatus::Optimal);
    assert_eq!(line.active_hypothesis_counts().unwrap(), vec![1, 1]);
}
