//! Growth lines: frame sequences of one channel and their tracking ILP
//!
//! A [`GrowthLine`] owns its frames (segmentation forest plus gap-separation
//! signal per time step) and, once generated, its
//! [`GrowthLineTrackingIlp`]. A failed build leaves the line without an ILP
//! rather than with a half-built one.

use nalgebra::DVector;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::TrackingConfig;
use crate::errors::TrackingError;
use crate::ilp::{GrowthLineTrackingIlp, IlpStatus};
use crate::reporter::{BuildReporter, NoOpReporter};
use crate::solver::{BranchAndBoundModel, IlpModel, SolverEnvironment};
use crate::tree::{ComponentTree, RegionTree};

/// One time step of a growth line
#[derive(Debug, Clone)]
pub struct GrowthLineFrame<T = ComponentTree> {
    tree: T,
    gap_separation: DVector<f64>,
}

impl<T: RegionTree> GrowthLineFrame<T> {
    /// Create a frame from its segmentation forest and gap-separation signal
    pub fn new(tree: T, gap_separation: DVector<f64>) -> Self {
        Self {
            tree,
            gap_separation,
        }
    }

    /// Candidate regions
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Gap-separation signal, one sample per position
    pub fn gap_separation(&self) -> &DVector<f64> {
        &self.gap_separation
    }
}

/// Frames of one channel and their tracking ILP
#[derive(Debug)]
pub struct GrowthLine<T = ComponentTree, M: IlpModel = BranchAndBoundModel> {
    frames: Vec<GrowthLineFrame<T>>,
    ilp: Option<GrowthLineTrackingIlp<M>>,
}

impl<T: RegionTree, M: IlpModel> Default for GrowthLine<T, M> {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            ilp: None,
        }
    }
}

impl<T: RegionTree, M: IlpModel> GrowthLine<T, M> {
    /// Empty growth line
    pub fn new() -> Self {
        Self::default()
    }

    /// Growth line with the given frames
    pub fn with_frames(frames: Vec<GrowthLineFrame<T>>) -> Self {
        Self { frames, ilp: None }
    }

    /// Append a frame
    ///
    /// An existing ILP no longer matches the frames and is dropped.
    pub fn add(&mut self, frame: GrowthLineFrame<T>) {
        self.invalidate_ilp();
        self.frames.push(frame);
    }

    /// Insert a frame before the first one
    pub fn prepend(&mut self, frame: GrowthLineFrame<T>) {
        self.invalidate_ilp();
        self.frames.insert(0, frame);
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if the line has no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at time `t`
    pub fn get(&self, t: usize) -> Option<&GrowthLineFrame<T>> {
        self.frames.get(t)
    }

    /// All frames in time order
    pub fn frames(&self) -> &[GrowthLineFrame<T>] {
        &self.frames
    }

    /// Build the tracking ILP
    pub fn generate_ilp<E>(&mut self, env: &E, config: &TrackingConfig) -> Result<(), TrackingError>
    where
        E: SolverEnvironment<Model = M>,
    {
        self.generate_ilp_with_reporter(env, config, &mut NoOpReporter)
    }

    /// Build the tracking ILP, reporting construction progress
    ///
    /// On failure the error is logged, the line keeps no ILP and the error
    /// is returned.
    pub fn generate_ilp_with_reporter<E, R>(
        &mut self,
        env: &E,
        config: &TrackingConfig,
        reporter: &mut R,
    ) -> Result<(), TrackingError>
    where
        E: SolverEnvironment<Model = M>,
        R: BuildReporter + ?Sized,
    {
        self.ilp = None;
        match GrowthLineTrackingIlp::build(env, &self.frames, config, reporter) {
            Ok(ilp) => {
                self.ilp = Some(ilp);
                Ok(())
            }
            Err(e) => {
                log::error!("Could not build tracking ILP: {}", e);
                reporter.on_build_aborted(&e);
                Err(e)
            }
        }
    }

    /// Solve the generated ILP
    pub fn run_ilp(&mut self) -> Result<IlpStatus, TrackingError> {
        self.run_ilp_with_reporter(&mut NoOpReporter)
    }

    /// Solve the generated ILP, reporting the outcome
    pub fn run_ilp_with_reporter<R>(&mut self, reporter: &mut R) -> Result<IlpStatus, TrackingError>
    where
        R: BuildReporter + ?Sized,
    {
        let ilp = self.ilp.as_mut().ok_or(TrackingError::IlpNotGenerated)?;
        let status = ilp.run()?;
        reporter.on_solve(status, ilp.objective_value().ok());
        Ok(status)
    }

    /// Tracking ILP, if generated
    pub fn ilp(&self) -> Option<&GrowthLineTrackingIlp<M>> {
        self.ilp.as_ref()
    }

    /// Mutable tracking ILP, for ground-truth edits
    pub fn ilp_mut(&mut self) -> Option<&mut GrowthLineTrackingIlp<M>> {
        self.ilp.as_mut()
    }

    /// Number of chosen hypotheses per time step
    pub fn active_hypothesis_counts(&self) -> Result<Vec<usize>, TrackingError> {
        let ilp = self.ilp.as_ref().ok_or(TrackingError::IlpNotGenerated)?;
        (0..ilp.time_steps())
            .map(|t| ilp.optimal_segmentation(t).map(|s| s.len()))
            .collect()
    }

    fn invalidate_ilp(&mut self) {
        if self.ilp.take().is_some() {
            log::debug!("Frames changed; dropping tracking ILP");
        }
    }
}

// ============================================================================
// Batch tracking
// ============================================================================

/// Build and solve every growth line
///
/// Lines are independent; with the `rayon` feature they are processed in
/// parallel, each with its own model from the shared environment. The result
/// for line `i` is at index `i`.
pub fn track_all<T, M, E>(
    lines: &mut [GrowthLine<T, M>],
    env: &E,
    config: &TrackingConfig,
) -> Vec<Result<IlpStatus, TrackingError>>
where
    T: RegionTree + Send,
    M: IlpModel + Send,
    E: SolverEnvironment<Model = M> + Sync,
{
    log::info!("Tracking {} growth lines", lines.len());

    #[cfg(feature = "rayon")]
    {
        lines
            .par_iter_mut()
            .map(|line| track_one(line, env, config))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    {
        lines
            .iter_mut()
            .map(|line| track_one(line, env, config))
            .collect()
    }
}

fn track_one<T, M, E>(
    line: &mut GrowthLine<T, M>,
    env: &E,
    config: &TrackingConfig,
) -> Result<IlpStatus, TrackingError>
where
    T: RegionTree,
    M: IlpModel,
    E: SolverEnvironment<Model = M>,
{
    line.generate_ilp(env, config)?;
    line.run_ilp()
}
