//! Configuration types for tracking ILPs
//!
//! - [`TrackingConfig`] - model construction settings plus solver settings,
//!   loadable from JSON and adjustable with `with_*` setters
//! - [`SolverConfig`] - limits and tolerance of the built-in back end
//! - [`ModelSnapshot`] - serializable summary of a built model for logs and
//!   comparisons between runs

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::TrackingError;

/// Settings of the built-in branch-and-bound back end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum number of search nodes (`None` = unlimited)
    pub node_limit: Option<u64>,
    /// Wall-clock limit in seconds (`None` = unlimited)
    pub time_limit_secs: Option<f64>,
    /// Feasibility and optimality tolerance
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            node_limit: Some(5_000_000),
            time_limit_secs: None,
            tolerance: 1e-9,
        }
    }
}

/// Settings used while building and solving a tracking ILP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrackingConfig {
    /// Mapping and division candidates costing more than this are not added
    pub cost_cutoff: Option<f64>,
    /// Back-end settings
    pub solver: SolverConfig,
}

impl TrackingConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON string; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, TrackingError> {
        let config: Self = serde_json::from_str(json).map_err(|e| TrackingError::Configuration {
            description: format!("invalid tracking config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TrackingError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TrackingError::Configuration {
            description: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&content)
    }

    /// Drop mapping and division candidates above `cutoff`
    pub fn with_cost_cutoff(mut self, cutoff: f64) -> Self {
        self.cost_cutoff = Some(cutoff);
        self
    }

    /// Keep every candidate regardless of cost
    pub fn without_cost_cutoff(mut self) -> Self {
        self.cost_cutoff = None;
        self
    }

    /// Limit the number of search nodes per solve
    pub fn with_node_limit(mut self, limit: Option<u64>) -> Self {
        self.solver.node_limit = limit;
        self
    }

    /// Limit the wall-clock time per solve
    pub fn with_time_limit(mut self, seconds: Option<f64>) -> Self {
        self.solver.time_limit_secs = seconds;
        self
    }

    /// Set the solver tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.solver.tolerance = tolerance;
        self
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), TrackingError> {
        if let Some(cutoff) = self.cost_cutoff {
            if cutoff.is_nan() {
                return Err(TrackingError::Configuration {
                    description: "cost_cutoff must not be NaN".to_string(),
                });
            }
        }
        if let Some(secs) = self.solver.time_limit_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(TrackingError::Configuration {
                    description: format!("time_limit_secs must be positive, got {}", secs),
                });
            }
        }
        if !self.solver.tolerance.is_finite() || self.solver.tolerance < 0.0 {
            return Err(TrackingError::Configuration {
                description: format!(
                    "tolerance must be non-negative, got {}",
                    self.solver.tolerance
                ),
            });
        }
        Ok(())
    }

    /// True if a candidate with this cost should be added
    #[inline]
    pub fn admits(&self, cost: f64) -> bool {
        self.cost_cutoff.map_or(true, |cutoff| cost <= cutoff)
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// Number of constraints per family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConstraintCounts {
    /// Exit constraints
    pub exit: usize,
    /// Path-blocking constraints
    pub path_blocking: usize,
    /// Explanation-continuity constraints
    pub continuity: usize,
    /// Active ground-truth pins
    pub pins: usize,
}

impl ConstraintCounts {
    /// Sum over all families
    pub fn total(&self) -> usize {
        self.exit + self.path_blocking + self.continuity + self.pins
    }
}

/// Per-time-step sizes of a tracking ILP
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeStepSnapshot {
    /// Time step
    pub time: usize,
    /// Hypotheses at this time
    pub hypotheses: usize,
    /// Exit assignments leaving this time
    pub exits: usize,
    /// Mapping assignments leaving this time
    pub mappings: usize,
    /// Division assignments leaving this time
    pub divisions: usize,
}

/// Summary of a built tracking ILP
///
/// # Example
///
/// ```rust,ignore
/// let snapshot = ilp.snapshot();
/// println!("{}", snapshot.to_json_pretty()?);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ModelSnapshot {
    /// Back-end name
    pub backend: String,
    /// Number of time steps
    pub time_steps: usize,
    /// Sizes per time step
    pub steps: Vec<TimeStepSnapshot>,
    /// Constraints per family
    pub constraints: ConstraintCounts,
    /// Binary variables in the model
    pub num_vars: usize,
    /// Status of the last solve
    pub status: String,
    /// Configuration the model was built with
    pub config: TrackingConfig,
}

impl ModelSnapshot {
    /// Total hypotheses over all time steps
    pub fn total_hypotheses(&self) -> usize {
        self.steps.iter().map(|s| s.hypotheses).sum()
    }

    /// Total assignments over all time steps
    pub fn total_assignments(&self) -> usize {
        self.steps
            .iter()
            .map(|s| s.exits + s.mappings + s.divisions)
            .sum()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackingConfig::default();
        assert_eq!(config.cost_cutoff, None);
        assert_eq!(config.solver.node_limit, Some(5_000_000));
        assert!(config.validate().is_ok());
        assert!(config.admits(1e12));
    }

    #[test]
    fn test_builder_setters() {
        let config = TrackingConfig::new()
            .with_cost_cutoff(2.5)
            .with_node_limit(None)
            .with_time_limit(Some(3.0))
            .with_tolerance(1e-6);
        assert_eq!(config.cost_cutoff, Some(2.5));
        assert!(config.admits(2.5));
        assert!(!config.admits(2.6));
        assert_eq!(config.solver.node_limit, None);
        assert_eq!(config.solver.time_limit_secs, Some(3.0));
        assert_eq!(config.without_cost_cutoff().cost_cutoff, None);
    }

    #[test]
    fn test_json_partial_fields() {
        let config = TrackingConfig::from_json_str(r#"{"cost_cutoff": 4.0}"#).unwrap();
        assert_eq!(config.cost_cutoff, Some(4.0));
        assert_eq!(config.solver, SolverConfig::default());

        let config =
            TrackingConfig::from_json_str(r#"{"solver": {"time_limit_secs": 1.5}}"#).unwrap();
        assert_eq!(config.solver.time_limit_secs, Some(1.5));
        assert_eq!(config.solver.tolerance, 1e-9);
    }

    #[test]
    fn test_json_rejects_bad_values() {
        assert!(matches!(
            TrackingConfig::from_json_str(r#"{"solver": {"time_limit_secs": -1.0}}"#),
            Err(TrackingError::Configuration { .. })
        ));
        assert!(TrackingConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_constraint_counts_total() {
        let counts = ConstraintCounts {
            exit: 1,
            path_blocking: 2,
            continuity: 3,
            pins: 4,
        };
        assert_eq!(counts.total(), 10);
    }
}
