use std::fmt;

use ace_core::collections::map::HashSet;
use ace_core::{NodeId, NodeTree};

/// A structural rule broken somewhere in a node tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeViolation {
    Missing { id: NodeId },
    VisitedTwice { id: NodeId },
    WrongParent { id: NodeId, expected: NodeId, actual: Option<NodeId> },
    WrongDepth { id: NodeId, expected: u32, actual: u32 },
    AttachedUnderDetached { id: NodeId, parent: NodeId },
    ContextMismatch { id: NodeId, parent: NodeId },
    DisappearingNotFlagged { id: NodeId, holder: NodeId },
}

impl fmt::Display for TreeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeViolation::Missing { id } => write!(f, "node {id} is referenced but missing"),
            TreeViolation::VisitedTwice { id } => write!(f, "node {id} is reachable twice"),
            TreeViolation::WrongParent {
                id,
                expected,
                actual,
            } => write!(f, "node {id} has parent {actual:?}, expected {expected}"),
            TreeViolation::WrongDepth {
                id,
                expected,
                actual,
            } => write!(f, "node {id} has depth {actual}, expected {expected}"),
            TreeViolation::AttachedUnderDetached { id, parent } => {
                write!(f, "node {id} is on the main tree but its parent {parent} is not")
            }
            TreeViolation::ContextMismatch { id, parent } => {
                write!(f, "node {id} belongs to another pipeline than its parent {parent}")
            }
            TreeViolation::DisappearingNotFlagged { id, holder } => {
                write!(f, "node {id} is held by {holder} as disappearing but not flagged")
            }
        }
    }
}

impl std::error::Error for TreeViolation {}

/// Walks the tree under `root` and checks the parent links, depths,
/// main-tree flags and disappearing bookkeeping of every reachable node.
/// Returns the number of nodes visited.
pub fn check_tree_invariants(tree: &NodeTree, root: NodeId) -> Result<usize, TreeViolation> {
    let mut seen: HashSet<NodeId> = HashSet::default();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            return Err(TreeViolation::VisitedTwice { id });
        }
        let node = tree.node(id).ok_or(TreeViolation::Missing { id })?;
        for child in node.children() {
            let child_node = tree.node(child).ok_or(TreeViolation::Missing { id: child })?;
            if child_node.parent() != Some(id) {
                return Err(TreeViolation::WrongParent {
                    id: child,
                    expected: id,
                    actual: child_node.parent(),
                });
            }
            if child_node.depth() != node.depth() + 1 {
                return Err(TreeViolation::WrongDepth {
                    id: child,
                    expected: node.depth() + 1,
                    actual: child_node.depth(),
                });
            }
            if child_node.is_on_main_tree() {
                if !node.is_on_main_tree() {
                    return Err(TreeViolation::AttachedUnderDetached { id: child, parent: id });
                }
                if child_node.context() != node.context() {
                    return Err(TreeViolation::ContextMismatch { id: child, parent: id });
                }
            }
            stack.push(child);
        }
        for entry in node.disappearing_children() {
            let held = tree
                .node(entry.node)
                .ok_or(TreeViolation::Missing { id: entry.node })?;
            if !held.is_disappearing() {
                return Err(TreeViolation::DisappearingNotFlagged {
                    id: entry.node,
                    holder: id,
                });
            }
            stack.push(entry.node);
        }
    }
    Ok(seen.len())
}
