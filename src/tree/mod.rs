//! Segmentation hypothesis trees
//!
//! Each frame of a growth line comes with a forest of candidate regions
//! produced upstream by a component-tree segmentation. Nested regions are
//! mutually exclusive interpretations of the same pixel range.
//!
//! - [`RegionTree`] - read-only interface the tracking code consumes
//! - [`ComponentTree`] - arena implementation used by scenarios and tests
//! - [`utils`] - interval geometry and tree traversals

pub mod utils;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a region inside one frame's tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Stable identity of a region across the whole growth line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionKey {
    /// Frame (time step) the region belongs to
    pub time: usize,
    /// Region inside the frame's tree
    pub node: NodeId,
}

impl RegionKey {
    /// Create a new region key
    pub fn new(time: usize, node: NodeId) -> Self {
        Self { time, node }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}/n{}", self.time, self.node.0)
    }
}

/// Closed interval `[a, b]` of positions along the channel axis
///
/// Smaller positions are "above" (towards the channel opening).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// First covered position
    pub a: usize,
    /// Last covered position
    pub b: usize,
}

impl Interval {
    /// Create an interval; `a` and `b` are swapped if given in reverse
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            a: a.min(b),
            b: a.max(b),
        }
    }

    /// Length `b - a` (a single position has extent 0)
    #[inline]
    pub fn extent(&self) -> usize {
        self.b - self.a
    }

    /// True if `self` lies strictly above `reference`
    #[inline]
    pub fn is_above(&self, reference: &Interval) -> bool {
        self.b < reference.a
    }

    /// True if `self` lies strictly below `reference`
    #[inline]
    pub fn is_below(&self, reference: &Interval) -> bool {
        self.a > reference.b
    }

    /// True if the two intervals share at least one position
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.a <= other.b && other.a <= self.b
    }
}

/// Read-only view of one frame's candidate region forest
///
/// The tracking ILP never mutates a tree; it only walks it while creating
/// hypotheses, division partners and path-blocking constraints.
pub trait RegionTree {
    /// Root regions, in spatial order
    fn roots(&self) -> &[NodeId];

    /// Child regions, in spatial order (upper child first)
    fn children(&self, node: NodeId) -> &[NodeId];

    /// Parent region, `None` for roots
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Positions along the channel covered by the region
    fn covered_positions(&self, node: NodeId) -> &[usize];

    /// Representative intensity value of the region
    fn value(&self, node: NodeId) -> f64;

    /// Number of covered positions
    fn size(&self, node: NodeId) -> usize {
        self.covered_positions(node).len()
    }
}

/// One region of a [`ComponentTree`]
#[derive(Debug, Clone)]
pub struct ComponentNode {
    positions: Vec<usize>,
    value: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl ComponentNode {
    /// Covered positions
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Intensity value
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Arena-backed region forest
///
/// Nodes are appended through [`ComponentTree::add_root`] and
/// [`ComponentTree::add_child`]; ids are indices into the arena and stay
/// valid for the lifetime of the tree.
#[derive(Debug, Clone, Default)]
pub struct ComponentTree {
    nodes: Vec<ComponentNode>,
    roots: Vec<NodeId>,
}

impl ComponentTree {
    /// Create an empty forest
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root region covering the given positions
    pub fn add_root(&mut self, positions: Vec<usize>, value: f64) -> NodeId {
        let id = self.push(positions, value, None);
        self.roots.push(id);
        id
    }

    /// Add a child region below `parent`
    ///
    /// Children must be added in spatial order, upper child first.
    ///
    /// # Panics
    /// If `parent` is not a node of this tree.
    pub fn add_child(&mut self, parent: NodeId, positions: Vec<usize>, value: f64) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "unknown parent {:?}", parent);
        let id = self.push(positions, value, Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Add a root covering the contiguous range `[a, b]`
    pub fn add_root_interval(&mut self, a: usize, b: usize, value: f64) -> NodeId {
        let iv = Interval::new(a, b);
        self.add_root((iv.a..=iv.b).collect(), value)
    }

    /// Add a child covering the contiguous range `[a, b]`
    pub fn add_child_interval(&mut self, parent: NodeId, a: usize, b: usize, value: f64) -> NodeId {
        let iv = Interval::new(a, b);
        self.add_child(parent, (iv.a..=iv.b).collect(), value)
    }

    /// Number of regions in the forest
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the forest has no regions
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Access a node
    pub fn node(&self, id: NodeId) -> Option<&ComponentNode> {
        self.nodes.get(id.0)
    }

    fn push(&mut self, positions: Vec<usize>, value: f64, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ComponentNode {
            positions,
            value,
            parent,
            children: Vec::new(),
        });
        id
    }
}

impl RegionTree for ComponentTree {
    fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn covered_positions(&self, node: NodeId) -> &[usize] {
        &self.nodes[node.0].positions
    }

    fn value(&self, node: NodeId) -> f64 {
        self.nodes[node.0].value
    }
}
