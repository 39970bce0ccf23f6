//! Hand-built frames with known costs
//!
//! Gap signals are zero inside cells and high on cell borders, so every
//! cell has a clearly negative unary cost.

use nalgebra::DVector;

use growthline_tracking::{
    BranchAndBoundEnv, BranchAndBoundModel, ComponentTree, GrowthLineFrame, GrowthLineTrackingIlp,
    NoOpReporter, TrackingConfig,
};

/// Border height used by all fixtures
pub const BORDER: f64 = 10.0;

/// Signal of length `len`, `BORDER` at the given positions, zero elsewhere
pub fn gap_with_borders(len: usize, borders: &[usize]) -> DVector<f64> {
    let mut gap = DVector::zeros(len);
    for &i in borders {
        gap[i] = BORDER;
    }
    gap
}

/// One cell spanning `[0, len-1]`
pub fn single_cell_frame(len: usize) -> GrowthLineFrame {
    let mut tree = ComponentTree::new();
    tree.add_root_interval(0, len - 1, 0.5);
    GrowthLineFrame::new(tree, gap_with_borders(len, &[0, len - 1]))
}

/// Two separate cells, `[0,4]` and `[6,10]`
pub fn two_cell_frame() -> GrowthLineFrame {
    let mut tree = ComponentTree::new();
    tree.add_root_interval(0, 4, 0.4);
    tree.add_root_interval(6, 10, 0.6);
    GrowthLineFrame::new(tree, gap_with_borders(11, &[0, 4, 5, 6, 10]))
}

/// One cell `[0,8]` that may be explained by two halves `[0,3]` and `[5,8]`
pub fn splittable_frame() -> GrowthLineFrame {
    let mut tree = ComponentTree::new();
    let root = tree.add_root_interval(0, 8, 0.5);
    tree.add_child_interval(root, 0, 3, 0.5);
    tree.add_child_interval(root, 5, 8, 0.5);
    GrowthLineFrame::new(tree, gap_with_borders(9, &[0, 3, 4, 5, 8]))
}

/// A cell `[0,8]` followed by two splittable frames
///
/// Dividing into `[0,3]` and `[5,8]` is the best choice once the mapping onto
/// the merged root is ruled out.
pub fn dividing_cell() -> Vec<GrowthLineFrame> {
    vec![single_cell_frame(9), splittable_frame(), splittable_frame()]
}

/// Build with the built-in back end
pub fn build_ilp(
    frames: &[GrowthLineFrame],
    config: &TrackingConfig,
) -> GrowthLineTrackingIlp<BranchAndBoundModel> {
    let env = BranchAndBoundEnv::open(config.solver.clone());
    GrowthLineTrackingIlp::build(&env, frames, config, &mut NoOpReporter)
        .expect("fixture builds")
}
