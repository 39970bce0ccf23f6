//! Traversals and geometry helpers over [`RegionTree`]s
//!
//! All functions are read-only; none of them allocate more than the
//! returned collection.

use super::{Interval, NodeId, RegionTree};

/// Smallest and largest covered position of a region
///
/// Returns `None` for a region without positions.
pub fn node_interval<T: RegionTree + ?Sized>(tree: &T, node: NodeId) -> Option<Interval> {
    let positions = tree.covered_positions(node);
    let min = positions.iter().copied().min()?;
    let max = positions.iter().copied().max()?;
    Some(Interval { a: min, b: max })
}

/// All leaves of the forest, upper leaves first
pub fn leaves_in_order<T: RegionTree + ?Sized>(tree: &T) -> Vec<NodeId> {
    let mut leaves = Vec::new();
    let mut stack: Vec<NodeId> = tree.roots().iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        let children = tree.children(node);
        if children.is_empty() {
            leaves.push(node);
        } else {
            stack.extend(children.iter().rev().copied());
        }
    }
    leaves
}

/// Every region in post-order (children before their parent)
pub fn post_order<T: RegionTree + ?Sized>(tree: &T) -> Vec<NodeId> {
    let mut order = Vec::new();
    // (node, children already expanded)
    let mut stack: Vec<(NodeId, bool)> = tree.roots().iter().rev().map(|&r| (r, false)).collect();
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
        } else {
            stack.push((node, true));
            stack.extend(tree.children(node).iter().rev().map(|&c| (c, false)));
        }
    }
    order
}

/// Every region in pre-order (parents before their children)
pub fn pre_order<T: RegionTree + ?Sized>(tree: &T) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut stack: Vec<NodeId> = tree.roots().iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        order.push(node);
        stack.extend(tree.children(node).iter().rev().copied());
    }
    order
}

/// Iterator from a region up to its root, the region itself included
pub fn ancestors_inclusive<T: RegionTree + ?Sized>(
    tree: &T,
    node: NodeId,
) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(Some(node), move |&n| tree.parent(n))
}

/// Depth of a region (roots are at level 0)
pub fn level_in_tree<T: RegionTree + ?Sized>(tree: &T, node: NodeId) -> usize {
    ancestors_inclusive(tree, node).count() - 1
}

/// Total number of regions reachable from the roots
pub fn count_nodes<T: RegionTree + ?Sized>(tree: &T) -> usize {
    pre_order(tree).len()
}

/// The next region below `node` in the tree's sibling order
///
/// This is the next sibling, or, for a last child, the next sibling of the
/// closest ancestor that has one. Neighbours in a different root's subtree
/// are not found.
pub fn right_neighbor<T: RegionTree + ?Sized>(tree: &T, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    while let Some(father) = tree.parent(current) {
        let siblings = tree.children(father);
        let idx = siblings.iter().position(|&s| s == current)?;
        if let Some(&next) = siblings.get(idx + 1) {
            return Some(next);
        }
        current = father;
    }
    None
}

/// Candidate lower daughters for a division ending in `node`
///
/// The right neighbour of `node` followed by the chain of its first
/// children down to a leaf.
pub fn right_neighbors<T: RegionTree + ?Sized>(tree: &T, node: NodeId) -> Vec<NodeId> {
    let mut neighbors = Vec::new();
    let mut runner = right_neighbor(tree, node);
    while let Some(n) = runner {
        neighbors.push(n);
        runner = tree.children(n).first().copied();
    }
    neighbors
}
