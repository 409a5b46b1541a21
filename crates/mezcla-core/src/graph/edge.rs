//! Edges connecting node ports.
//!
//! An edge carries audio from one node's output port to another node's input
//! port. Fan-out is many edges leaving the same output; fan-in at a
//! multi-source input port is many edges arriving at it, ordered by
//! insertion.

use crate::graph::node::NodeId;

/// Unique identifier for an edge in the graph.
///
/// Edge IDs are assigned sequentially and never reused within a graph
/// instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// A directed connection between two node ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Source node.
    pub from: NodeId,
    /// Output port name on the source node.
    pub from_port: &'static str,
    /// Destination node.
    pub to: NodeId,
    /// Input port name on the destination node.
    pub to_port: &'static str,
}
