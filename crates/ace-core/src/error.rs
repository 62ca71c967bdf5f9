use crate::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    Missing { id: NodeId },
    KindMismatch { id: NodeId, expected: &'static str },
    Occupied { id: NodeId },
}

impl std::fmt::Display for NodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeError::Missing { id } => write!(f, "node {id} missing"),
            NodeError::KindMismatch { id, expected } => {
                write!(f, "node {id} kind mismatch; expected {expected}")
            }
            NodeError::Occupied { id } => write!(f, "node id {id} already in use"),
        }
    }
}

impl std::error::Error for NodeError {}

/// Why [`crate::NodeTree::add_child`] refused to mutate the tree.
///
/// A rejected call leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The parent currently hosts a modal child and the call did not carry
    /// the modal exception.
    ModalExclusive { parent: NodeId },
    /// Parent or child is not registered in the tree.
    Missing { id: NodeId },
    /// The child is the parent itself or one of its ancestors.
    WouldCycle { parent: NodeId, child: NodeId },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::ModalExclusive { parent } => {
                write!(f, "node {parent} is held by a modal child")
            }
            RejectReason::Missing { id } => write!(f, "node {id} missing"),
            RejectReason::WouldCycle { parent, child } => {
                write!(f, "adding {child} under {parent} would form a cycle")
            }
        }
    }
}

impl std::error::Error for RejectReason {}
