/*!
# Growth-line tracking

Cell lineage tracking in mother-machine growth lines with an integer linear
program.

Each frame of a channel offers a forest of nested candidate regions.
Tracking picks, jointly over all frames, a non-overlapping segmentation per
frame and the exit / mapping / division events connecting consecutive
frames, minimizing a cost that rewards well-separated segments and
penalizes implausible transitions.

## Modules

- [`tree`] - read-only region forests and traversals
- [`ilp`] - hypotheses, assignments, constraints, solving and queries
- [`solver`] - solver interface and the built-in branch-and-bound back end
- [`growth_line`] - frames of one channel, batch tracking
- [`config`] - tracking and solver settings, model snapshots
- [`reporter`] - build and solve callbacks
- [`scenario`], [`synthetic`], [`export`] - input and output

## Example

```rust
use growthline_tracking::{
    BranchAndBoundEnv, ComponentTree, GrowthLine, GrowthLineFrame, IlpStatus, TrackingConfig,
};
use nalgebra::DVector;

let config = TrackingConfig::default();
let env = BranchAndBoundEnv::open(config.solver.clone());

let mut line: GrowthLine = GrowthLine::new();
for _ in 0..3 {
    let mut tree = ComponentTree::new();
    tree.add_root_interval(0, 4, 0.5);
    let gap = DVector::from_vec(vec![5.0, 0.1, 0.0, 0.1, 5.0]);
    line.add(GrowthLineFrame::new(tree, gap));
}

line.generate_ilp(&env, &config)?;
assert_eq!(line.run_ilp()?, IlpStatus::Optimal);
assert_eq!(line.active_hypothesis_counts()?, vec![1, 1, 1]);

env.close();
# Ok::<(), growthline_tracking::TrackingError>(())
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Segmentation hypothesis forests
pub mod tree;

/// Tracking ILP construction, solving and queries
pub mod ilp;

/// Solver interface and built-in back end
pub mod solver;

/// Growth lines and batch tracking
pub mod growth_line;

/// Tracking and solver settings
pub mod config;

/// Error types
pub mod errors;

/// Build and solve callbacks
pub mod reporter;

// ============================================================================
// Input / output
// ============================================================================

/// JSON scenario files
pub mod scenario;

/// Seeded synthetic growth lines
pub mod synthetic;

/// CSV / JSON export of tracking results
pub mod export;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use growth_line::{track_all, GrowthLine, GrowthLineFrame};
pub use ilp::{
    Assignment, AssignmentEdge, AssignmentId, AssignmentKind, GroundTruth, GrowthLineTrackingIlp,
    Hypothesis, HypothesisId, IlpStatus,
};
pub use tree::{ComponentTree, Interval, NodeId, RegionKey, RegionTree};

// Configuration
pub use config::{ModelSnapshot, SolverConfig, TrackingConfig};

// Errors
pub use errors::{SolverError, TrackingError};

// Solver
pub use solver::{
    write_lp, BranchAndBoundEnv, BranchAndBoundModel, ConstraintRow, IlpModel, SolverEnvironment,
};

// Reporters
pub use reporter::{BuildReporter, DebugReporter, LoggingReporter, NoOpReporter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
