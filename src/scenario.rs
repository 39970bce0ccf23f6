//! Scenario files: growth lines described as JSON
//!
//! ```json
//! {
//!   "growth_lines": [
//!     {
//!       "name": "gl0",
//!       "frames": [
//!         {
//!           "gap_separation": [1.0, 0.1, 0.1, 1.0],
//!           "roots": [{ "a": 0, "b": 3, "value": 0.5, "children": [] }]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Regions cover the contiguous range `[a, b]`. Children must lie inside
//! their parent and siblings must be listed top to bottom without overlap.

use std::fs;
use std::path::Path;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::errors::TrackingError;
use crate::growth_line::{GrowthLine, GrowthLineFrame};
use crate::tree::{ComponentTree, Interval, NodeId};

// =============================================================================
// JSON Schema for Scenario Files
// =============================================================================

/// Root structure for scenario JSON files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioJson {
    pub growth_lines: Vec<GrowthLineJson>,
}

/// One growth line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthLineJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub frames: Vec<FrameJson>,
}

/// One time step: signal plus region forest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameJson {
    pub gap_separation: Vec<f64>,
    pub roots: Vec<RegionJson>,
}

/// One region and its nested sub-regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionJson {
    pub a: usize,
    pub b: usize,
    #[serde(default)]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RegionJson>,
}

impl RegionJson {
    /// Leaf region
    pub fn leaf(a: usize, b: usize, value: f64) -> Self {
        Self {
            a,
            b,
            value,
            children: Vec::new(),
        }
    }
}

/// Load a scenario from a JSON file
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioJson, TrackingError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| TrackingError::Scenario {
        description: format!("failed to read {}: {}", path.display(), e),
    })?;
    parse_scenario(&content)
}

/// Parse a scenario from a JSON string
pub fn parse_scenario(json: &str) -> Result<ScenarioJson, TrackingError> {
    serde_json::from_str(json).map_err(|e| TrackingError::Scenario {
        description: format!("invalid scenario JSON: {}", e),
    })
}

impl ScenarioJson {
    /// Serialize to pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Build growth lines, validating every frame
    pub fn to_growth_lines(&self) -> Result<Vec<GrowthLine>, TrackingError> {
        self.growth_lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let frames = line
                    .frames
                    .iter()
                    .enumerate()
                    .map(|(t, frame)| {
                        frame.to_frame().map_err(|description| TrackingError::Scenario {
                            description: format!("growth line {}, frame {}: {}", i, t, description),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GrowthLine::with_frames(frames))
            })
            .collect()
    }
}

impl FrameJson {
    /// Convert into a frame, checking region nesting and order
    pub fn to_frame(&self) -> Result<GrowthLineFrame, String> {
        let mut tree = ComponentTree::new();
        check_siblings(&self.roots, None)?;
        for root in &self.roots {
            let id = tree.add_root_interval(root.a, root.b, root.value);
            add_children(&mut tree, id, root)?;
        }
        Ok(GrowthLineFrame::new(
            tree,
            DVector::from_vec(self.gap_separation.clone()),
        ))
    }
}

fn add_children(tree: &mut ComponentTree, parent: NodeId, region: &RegionJson) -> Result<(), String> {
    check_siblings(&region.children, Some(region))?;
    for child in &region.children {
        let id = tree.add_child_interval(parent, child.a, child.b, child.value);
        add_children(tree, id, child)?;
    }
    Ok(())
}

fn check_siblings(siblings: &[RegionJson], parent: Option<&RegionJson>) -> Result<(), String> {
    let mut previous: Option<Interval> = None;
    for region in siblings {
        if region.a > region.b {
            return Err(format!("region [{}, {}] is reversed", region.a, region.b));
        }
        let interval = Interval::new(region.a, region.b);
        if let Some(p) = parent {
            if region.a < p.a || region.b > p.b {
                return Err(format!(
                    "region [{}, {}] is not inside its parent [{}, {}]",
                    region.a, region.b, p.a, p.b
                ));
            }
        }
        if let Some(prev) = previous {
            if !prev.is_above(&interval) {
                return Err(format!(
                    "sibling [{}, {}] does not lie below [{}, {}]",
                    region.a, region.b, prev.a, prev.b
                ));
            }
        }
        previous = Some(interval);
    }
    Ok(())
}
