//! Graph mutation API, dirty propagation, and the evaluation state machine.
//!
//! [`AudioGraph`] owns the topology (nodes and edges) and is the single
//! mutation path: UI edits arrive as [`GraphCommand`]s (or the methods they
//! dispatch to), each of which marks the affected node and its downstream
//! closure `Dirty` and bumps a monotonic **edit serial**.
//!
//! Evaluation is incremental and cancellation-aware. [`begin_pass()`]
//! (AudioGraph::begin_pass) captures the current edit serial plus a
//! topological order over the target's upstream closure;
//! [`step()`](AudioGraph::step) recomputes one dirty node per call and
//! commits its output only while the pass's serial still matches the
//! graph's. An edit between steps supersedes the pass: the next `step`
//! returns [`StepOutcome::Superseded`] without touching node state —
//! cancellation, not rollback. Suspension points are exactly the node
//! boundaries; kernels never suspend.
//!
//! [`evaluate()`](AudioGraph::evaluate) pumps passes to completion,
//! restarting on supersession, which is the debounce-with-cancellation
//! contract: only the freshest parameter state at the moment a pass starts
//! is ever committed.

use std::collections::VecDeque;

use crate::buffer::AudioClip;
use crate::env::AudioEnvironment;
use crate::graph::edge::{Edge, EdgeId};
use crate::graph::node::{NodeData, NodeId, NodeKind, NodeState, Warning};
use crate::graph::process::{NodeOutput, ProcessError, process_node};

/// Errors that can occur during graph-edit operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The specified node was not found in the graph.
    NodeNotFound(NodeId),
    /// The specified edge was not found in the graph.
    EdgeNotFound(EdgeId),
    /// Adding this edge would create a cycle; the graph is unchanged.
    CycleDetected,
    /// An identical edge already exists between these ports.
    DuplicateEdge(NodeId, NodeId),
    /// The named port does not exist on the node.
    UnknownPort {
        /// Node the port was looked up on.
        node: NodeId,
        /// The unrecognized port name.
        port: String,
    },
    /// A single-source input port already has an upstream connection.
    PortOccupied {
        /// Node owning the occupied port.
        node: NodeId,
        /// The occupied port name.
        port: &'static str,
    },
    /// The named parameter does not exist on the node.
    UnknownParam {
        /// Node the parameter was looked up on.
        node: NodeId,
        /// The unrecognized parameter name.
        name: String,
    },
    /// A node cannot be connected to itself.
    SelfLoop(NodeId),
    /// Clips can only be seeded into Source nodes.
    NotASource(NodeId),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::EdgeNotFound(id) => write!(f, "edge {id} not found"),
            Self::CycleDetected => write!(f, "adding this edge would create a cycle"),
            Self::DuplicateEdge(a, b) => write!(f, "edge from {a} to {b} already exists"),
            Self::UnknownPort { node, port } => write!(f, "node {node} has no port '{port}'"),
            Self::PortOccupied { node, port } => {
                write!(f, "input '{port}' of {node} already has a connection")
            }
            Self::UnknownParam { node, name } => {
                write!(f, "node {node} has no parameter '{name}'")
            }
            Self::SelfLoop(id) => write!(f, "cannot connect {id} to itself"),
            Self::NotASource(id) => write!(f, "node {id} is not a source"),
        }
    }
}

impl std::error::Error for GraphError {}

/// A graph edit expressed as a message.
///
/// UI layers produce these instead of mutating node state directly; the
/// graph-edit path is the only consumer, so the scheduler never observes an
/// ad hoc mutation mid-evaluation.
#[derive(Debug, Clone)]
pub enum GraphCommand {
    /// Add a node of the given kind.
    AddNode {
        /// Kind of the node to create.
        kind: NodeKind,
    },
    /// Remove a node and all its edges.
    RemoveNode {
        /// Node to remove.
        node: NodeId,
    },
    /// Connect an output port to an input port.
    Connect {
        /// Source node.
        from: NodeId,
        /// Output port name on the source node.
        from_port: String,
        /// Destination node.
        to: NodeId,
        /// Input port name on the destination node.
        to_port: String,
    },
    /// Remove an edge.
    Disconnect {
        /// Edge to remove.
        edge: EdgeId,
    },
    /// Set a named parameter on a node.
    SetParameter {
        /// Node to edit.
        node: NodeId,
        /// Parameter name.
        name: String,
        /// New value; clamped to the declared range.
        value: f32,
    },
    /// Seed a Source node with decoded clips.
    SetSourceClips {
        /// The Source node to seed.
        node: NodeId,
        /// The decoded clips.
        clips: Vec<AudioClip>,
    },
}

/// What a successfully applied [`GraphCommand`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A node was created.
    NodeAdded(NodeId),
    /// An edge was created.
    EdgeAdded(EdgeId),
    /// The edit completed with nothing to return.
    Done,
}

/// Result of one [`AudioGraph::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A node was recomputed (or skipped as already clean); more remain.
    Progress,
    /// The pass reached the target; its output is committed.
    Complete,
    /// An edit arrived after the pass began; nothing further was committed.
    Superseded,
}

/// An in-flight incremental evaluation toward one target node.
///
/// Captures the topological order over the target's upstream closure and
/// the edit serial at creation. The pass is valid only while no edit has
/// occurred since; [`AudioGraph::step`] enforces this.
#[derive(Debug)]
pub struct EvaluationPass {
    target: NodeId,
    order: Vec<NodeId>,
    cursor: usize,
    serial: u64,
}

impl EvaluationPass {
    /// The node this pass evaluates toward.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Nodes not yet visited by [`AudioGraph::step`].
    pub fn remaining(&self) -> usize {
        self.order.len() - self.cursor
    }
}

/// The user-edited dataflow graph of audio transforms.
///
/// Owns nodes and edges exclusively. Mutations are serialized through
/// `&mut self`; produced [`SampleBuffer`](crate::SampleBuffer)s are
/// immutable and shared downstream behind `Arc`, so concurrent readers of a
/// cached output need no locking.
pub struct AudioGraph {
    nodes: Vec<Option<NodeData>>,
    edges: Vec<Option<Edge>>,
    env: AudioEnvironment,
    next_node_slot: u32,
    next_edge_slot: u32,
    /// Bumped by every edit; passes holding an older value are superseded.
    edit_serial: u64,
}

impl AudioGraph {
    /// Creates an empty graph with the given processing environment.
    pub fn new(env: AudioEnvironment) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            env,
            next_node_slot: 0,
            next_edge_slot: 0,
            edit_serial: 0,
        }
    }

    /// The processing environment kernels receive.
    pub fn env(&self) -> &AudioEnvironment {
        &self.env
    }

    /// Monotonic counter of graph edits.
    pub fn edit_serial(&self) -> u64 {
        self.edit_serial
    }

    // --- Mutations ---

    /// Applies a [`GraphCommand`].
    pub fn apply(&mut self, command: GraphCommand) -> Result<CommandOutcome, GraphError> {
        match command {
            GraphCommand::AddNode { kind } => Ok(CommandOutcome::NodeAdded(self.add_node(kind))),
            GraphCommand::RemoveNode { node } => {
                self.remove_node(node)?;
                Ok(CommandOutcome::Done)
            }
            GraphCommand::Connect {
                from,
                from_port,
                to,
                to_port,
            } => Ok(CommandOutcome::EdgeAdded(self.connect(
                from, &from_port, to, &to_port,
            )?)),
            GraphCommand::Disconnect { edge } => {
                self.disconnect(edge)?;
                Ok(CommandOutcome::Done)
            }
            GraphCommand::SetParameter { node, name, value } => {
                self.set_param(node, &name, value)?;
                Ok(CommandOutcome::Done)
            }
            GraphCommand::SetSourceClips { node, clips } => {
                self.set_source_clips(node, clips)?;
                Ok(CommandOutcome::Done)
            }
        }
    }

    /// Adds a node. Returns the new node's ID. New nodes start Dirty.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_node_slot);
        self.next_node_slot += 1;
        let idx = id.0 as usize;
        if idx >= self.nodes.len() {
            self.nodes.resize_with(idx + 1, || None);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(node = %id, kind = kind.tag(), "graph_add");
        self.nodes[idx] = Some(NodeData::new(id, kind));
        self.touch();
        id
    }

    /// Removes a node and all its connected edges, dirtying downstream.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.get(id)?;
        let edge_ids: Vec<EdgeId> = node
            .incoming
            .iter()
            .chain(node.outgoing.iter())
            .copied()
            .collect();

        // Downstream nodes lose an input; mark before the edges go away.
        self.mark_dirty_downstream(id);

        for edge_id in edge_ids {
            self.remove_edge_internal(edge_id);
        }
        self.nodes[id.0 as usize] = None;
        self.touch();
        #[cfg(feature = "tracing")]
        tracing::debug!(node = %id, "graph_remove");
        Ok(())
    }

    /// Connects an output port to an input port.
    ///
    /// Fails atomically — on any error the connection set is unchanged.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownPort`] for a bad port name,
    /// [`GraphError::PortOccupied`] for a second edge into a single-source
    /// port, [`GraphError::DuplicateEdge`], [`GraphError::SelfLoop`], and
    /// [`GraphError::CycleDetected`] when the edge would close a cycle.
    pub fn connect(
        &mut self,
        from: NodeId,
        from_port: &str,
        to: NodeId,
        to_port: &str,
    ) -> Result<EdgeId, GraphError> {
        if from == to {
            return Err(GraphError::SelfLoop(from));
        }

        let from_node = self.get(from)?;
        let from_port = from_node
            .kind
            .output_ports()
            .iter()
            .find(|&&p| p == from_port)
            .copied()
            .ok_or_else(|| GraphError::UnknownPort {
                node: from,
                port: from_port.to_string(),
            })?;

        let to_node = self.get(to)?;
        let decl = to_node
            .kind
            .input_ports()
            .iter()
            .find(|d| d.name == to_port)
            .copied()
            .ok_or_else(|| GraphError::UnknownPort {
                node: to,
                port: to_port.to_string(),
            })?;

        for &edge_id in &to_node.incoming {
            let edge = self.edge(edge_id);
            if edge.to_port == decl.name {
                if edge.from == from && edge.from_port == from_port {
                    return Err(GraphError::DuplicateEdge(from, to));
                }
                if !decl.multi_source {
                    return Err(GraphError::PortOccupied {
                        node: to,
                        port: decl.name,
                    });
                }
            }
        }

        // A cycle exists iff `from` is already reachable from `to`.
        if self.can_reach(to, from) {
            return Err(GraphError::CycleDetected);
        }

        let edge_id = EdgeId(self.next_edge_slot);
        self.next_edge_slot += 1;
        let idx = edge_id.0 as usize;
        if idx >= self.edges.len() {
            self.edges.resize_with(idx + 1, || None);
        }
        self.edges[idx] = Some(Edge {
            from,
            from_port,
            to,
            to_port: decl.name,
        });
        self.node_mut(from).outgoing.push(edge_id);
        self.node_mut(to).incoming.push(edge_id);

        self.mark_dirty_downstream(to);
        self.touch();
        #[cfg(feature = "tracing")]
        tracing::debug!(%from, %to, port = decl.name, "graph_connect");
        Ok(edge_id)
    }

    /// Removes an edge, dirtying the downstream side.
    pub fn disconnect(&mut self, id: EdgeId) -> Result<(), GraphError> {
        let edge = self
            .edges
            .get(id.0 as usize)
            .and_then(|e| e.as_ref())
            .copied()
            .ok_or(GraphError::EdgeNotFound(id))?;
        self.remove_edge_internal(id);
        self.mark_dirty_downstream(edge.to);
        self.touch();
        #[cfg(feature = "tracing")]
        tracing::debug!(edge = %id, "graph_disconnect");
        Ok(())
    }

    /// Sets a named parameter, clamping to its declared range (NaN falls
    /// back to the default), and dirties the node and its downstream
    /// closure.
    pub fn set_param(&mut self, id: NodeId, name: &str, value: f32) -> Result<(), GraphError> {
        let node = self.get(id)?;
        let pos = node
            .kind
            .param_descriptors()
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| GraphError::UnknownParam {
                node: id,
                name: name.to_string(),
            })?;
        let desc = node.kind.param_descriptors()[pos];
        let value = if value.is_finite() {
            value.clamp(desc.min, desc.max)
        } else {
            desc.default
        };
        self.node_mut(id).params[pos] = value;
        self.mark_dirty_downstream(id);
        self.touch();
        #[cfg(feature = "tracing")]
        tracing::debug!(node = %id, param = name, value, "graph_set_param");
        Ok(())
    }

    /// Seeds a Source node with decoded clips, dirtying downstream.
    pub fn set_source_clips(
        &mut self,
        id: NodeId,
        clips: Vec<AudioClip>,
    ) -> Result<(), GraphError> {
        let node = self.get_mut(id)?;
        match &mut node.kind {
            NodeKind::Source(existing) => {
                *existing = clips;
            }
            _ => return Err(GraphError::NotASource(id)),
        }
        self.mark_dirty_downstream(id);
        self.touch();
        Ok(())
    }

    // --- Introspection ---

    /// Node IDs in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().flatten().map(|n| n.id)
    }

    /// The kind of a node.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0 as usize)?.as_ref().map(|n| &n.kind)
    }

    /// Current value of a named parameter.
    pub fn param(&self, id: NodeId, name: &str) -> Option<f32> {
        self.nodes.get(id.0 as usize)?.as_ref()?.param(name)
    }

    /// Scheduler state of a node.
    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.nodes.get(id.0 as usize)?.as_ref().map(|n| n.state)
    }

    /// The node's cached output clips, if it has produced any.
    pub fn output(&self, id: NodeId) -> Option<&[AudioClip]> {
        self.nodes
            .get(id.0 as usize)?
            .as_ref()?
            .outputs
            .as_deref()
    }

    /// The warning surfaced by the node's last evaluation.
    ///
    /// Returns [`Warning::None`] for unknown nodes, so the UI can poll
    /// without tracking removals.
    pub fn warning(&self, id: NodeId) -> Warning {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .map(|n| n.warning.clone())
            .unwrap_or_default()
    }

    /// All edges with their IDs, in ID order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.map(|edge| (EdgeId(i as u32), edge)))
    }

    // --- Evaluation ---

    /// Starts an incremental evaluation toward `target`.
    ///
    /// The returned pass is superseded by any subsequent edit.
    pub fn begin_pass(&self, target: NodeId) -> Result<EvaluationPass, GraphError> {
        self.get(target)?;
        let order = self.upstream_topo_order(target);
        Ok(EvaluationPass {
            target,
            order,
            cursor: 0,
            serial: self.edit_serial,
        })
    }

    /// Advances a pass by at most one node evaluation.
    ///
    /// Commits the node's output, warning, and Clean/Failed state only when
    /// the pass is still current; a superseded pass commits nothing.
    pub fn step(&mut self, pass: &mut EvaluationPass) -> StepOutcome {
        if pass.serial != self.edit_serial {
            #[cfg(feature = "tracing")]
            tracing::debug!(target = %pass.target, "pass_superseded");
            return StepOutcome::Superseded;
        }

        while pass.cursor < pass.order.len() {
            let id = pass.order[pass.cursor];
            let needs_recompute = self
                .state(id)
                .is_some_and(|s| matches!(s, NodeState::Dirty | NodeState::Failed));
            if !needs_recompute {
                pass.cursor += 1;
                continue;
            }

            // The pass serial matches, so the topology is exactly what
            // begin_pass saw: upstream nodes are already Clean (or Failed
            // with their previous cache) by topological order.
            self.node_mut(id).state = NodeState::Computing;
            let kind = self.node_ref(id).kind.clone();
            let params = self.node_ref(id).params.clone();
            let inputs = self.gather_inputs(id, &kind);

            let result = process_node(&kind, &params, &inputs, &self.env);
            self.commit(id, result);

            pass.cursor += 1;
            return if pass.cursor == pass.order.len() {
                StepOutcome::Complete
            } else {
                StepOutcome::Progress
            };
        }
        StepOutcome::Complete
    }

    /// Evaluates `target`, pumping passes until one completes uncancelled,
    /// and returns its output clips (None when the node declines output).
    ///
    /// Restarting on supersession means only the freshest parameter state
    /// is ever shown — the debounce-with-cancellation contract.
    pub fn evaluate(&mut self, target: NodeId) -> Result<Option<Vec<AudioClip>>, GraphError> {
        loop {
            let mut pass = self.begin_pass(target)?;
            loop {
                match self.step(&mut pass) {
                    StepOutcome::Progress => {}
                    StepOutcome::Complete => {
                        return Ok(self.output(target).map(<[AudioClip]>::to_vec));
                    }
                    StepOutcome::Superseded => break,
                }
            }
        }
    }

    // --- Internals ---

    fn get(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .ok_or(GraphError::NodeNotFound(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut NodeData, GraphError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(|n| n.as_mut())
            .ok_or(GraphError::NodeNotFound(id))
    }

    /// Infallible access for ids already validated this call.
    fn node_ref(&self, id: NodeId) -> &NodeData {
        self.nodes[id.0 as usize]
            .as_ref()
            .unwrap_or_else(|| unreachable!("validated node id {id}"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        self.nodes[id.0 as usize]
            .as_mut()
            .unwrap_or_else(|| unreachable!("validated node id {id}"))
    }

    fn edge(&self, id: EdgeId) -> &Edge {
        self.edges[id.0 as usize]
            .as_ref()
            .unwrap_or_else(|| unreachable!("validated edge id {id}"))
    }

    fn touch(&mut self) {
        self.edit_serial += 1;
    }

    fn remove_edge_internal(&mut self, id: EdgeId) {
        if let Some(edge) = self.edges[id.0 as usize].take() {
            if let Some(node) = self.nodes[edge.from.0 as usize].as_mut() {
                node.outgoing.retain(|&e| e != id);
            }
            if let Some(node) = self.nodes[edge.to.0 as usize].as_mut() {
                node.incoming.retain(|&e| e != id);
            }
        }
    }

    /// Marks `id` and every node reachable downstream of it Dirty.
    fn mark_dirty_downstream(&mut self, id: NodeId) {
        let mut stack = vec![id];
        let mut visited = vec![false; self.nodes.len()];
        while let Some(current) = stack.pop() {
            let idx = current.0 as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            let Some(node) = self.nodes[idx].as_mut() else {
                continue;
            };
            node.state = NodeState::Dirty;
            let outgoing = node.outgoing.clone();
            for edge_id in outgoing {
                if let Some(edge) = self.edges[edge_id.0 as usize] {
                    stack.push(edge.to);
                }
            }
        }
    }

    /// True if `to` is reachable from `from` along edges.
    fn can_reach(&self, from: NodeId, to: NodeId) -> bool {
        let mut stack = vec![from];
        let mut visited = vec![false; self.nodes.len()];
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            let idx = current.0 as usize;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            if let Some(node) = self.nodes[idx].as_ref() {
                for &edge_id in &node.outgoing {
                    if let Some(edge) = self.edges[edge_id.0 as usize] {
                        stack.push(edge.to);
                    }
                }
            }
        }
        false
    }

    /// Topological order (Kahn's algorithm) over the target's upstream
    /// closure, target last. Ties break by ascending node ID, keeping the
    /// visit order deterministic.
    fn upstream_topo_order(&self, target: NodeId) -> Vec<NodeId> {
        // Reverse reachability: everything the target depends on.
        let mut in_closure = vec![false; self.nodes.len()];
        let mut stack = vec![target];
        while let Some(current) = stack.pop() {
            let idx = current.0 as usize;
            if in_closure[idx] {
                continue;
            }
            in_closure[idx] = true;
            if let Some(node) = self.nodes[idx].as_ref() {
                for &edge_id in &node.incoming {
                    if let Some(edge) = self.edges[edge_id.0 as usize] {
                        stack.push(edge.from);
                    }
                }
            }
        }

        let mut indegree = vec![0usize; self.nodes.len()];
        for (_, edge) in self.edges() {
            if in_closure[edge.from.0 as usize] && in_closure[edge.to.0 as usize] {
                indegree[edge.to.0 as usize] += 1;
            }
        }

        let mut queue: VecDeque<NodeId> = self
            .nodes
            .iter()
            .flatten()
            .filter(|n| in_closure[n.id.0 as usize] && indegree[n.id.0 as usize] == 0)
            .map(|n| n.id)
            .collect();

        let mut order = Vec::new();
        while let Some(current) = queue.pop_front() {
            order.push(current);
            if let Some(node) = self.nodes[current.0 as usize].as_ref() {
                for &edge_id in &node.outgoing {
                    if let Some(edge) = self.edges[edge_id.0 as usize] {
                        let idx = edge.to.0 as usize;
                        if in_closure[idx] {
                            indegree[idx] -= 1;
                            if indegree[idx] == 0 {
                                queue.push_back(edge.to);
                            }
                        }
                    }
                }
            }
        }
        order
    }

    /// Gathers, per declared input port, the ordered clips arriving from
    /// upstream caches. Edge insertion order fixes the clip order at
    /// multi-source ports.
    fn gather_inputs(&self, id: NodeId, kind: &NodeKind) -> Vec<Vec<AudioClip>> {
        let node = self.node_ref(id);
        kind.input_ports()
            .iter()
            .map(|decl| {
                let mut clips = Vec::new();
                for &edge_id in &node.incoming {
                    let edge = self.edge(edge_id);
                    if edge.to_port == decl.name
                        && let Some(upstream) = self.output(edge.from)
                    {
                        clips.extend_from_slice(upstream);
                    }
                }
                clips
            })
            .collect()
    }

    /// Commits an evaluation result at a node boundary. Failure keeps the
    /// previous cached output (there is none on a first-ever evaluation).
    fn commit(&mut self, id: NodeId, result: Result<NodeOutput, ProcessError>) {
        let node = self.node_mut(id);
        match result {
            Ok(out) => {
                node.outputs = out.clips;
                node.warning = out.warning;
                node.state = NodeState::Clean;
            }
            Err(_err) => {
                node.state = NodeState::Failed;
                #[cfg(feature = "tracing")]
                tracing::warn!(node = %id, error = %_err, "node evaluation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SampleBuffer;

    fn clip(samples: &[f32], label: &str) -> AudioClip {
        AudioClip::new(
            SampleBuffer::from_mono(samples.to_vec(), 48000).unwrap(),
            label,
        )
    }

    fn graph() -> AudioGraph {
        AudioGraph::new(AudioEnvironment::default())
    }

    fn seeded_source(g: &mut AudioGraph, samples: &[f32], label: &str) -> NodeId {
        g.add_node(NodeKind::Source(vec![clip(samples, label)]))
    }

    #[test]
    fn evaluate_simple_chain() {
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.25, -0.25], "in.wav");
        let vol = g.add_node(NodeKind::Volume);
        g.connect(src, "audio", vol, "audio").unwrap();
        g.set_param(vol, "gain", 2.0).unwrap();

        let out = g.evaluate(vol).unwrap().unwrap();
        assert_eq!(out[0].buffer.channel(0), &[0.5, -0.5]);
        assert_eq!(g.state(vol), Some(NodeState::Clean));
    }

    #[test]
    fn clean_reevaluation_is_byte_identical_and_cached() {
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.1, 0.2, 0.3], "in.wav");
        let soft = g.add_node(NodeKind::Soften);
        g.connect(src, "audio", soft, "audio").unwrap();

        let first = g.evaluate(soft).unwrap().unwrap();
        let serial = g.edit_serial();
        let second = g.evaluate(soft).unwrap().unwrap();
        assert_eq!(first, second);
        // No edits happened, so evaluation did not touch the serial either.
        assert_eq!(g.edit_serial(), serial);
        // The cached Arc is reused, not recomputed.
        assert!(std::sync::Arc::ptr_eq(&first[0].buffer, &second[0].buffer));
    }

    #[test]
    fn dirty_propagation_is_downstream_closure_only() {
        // src -> a -> b, src -> c; sibling d is unrelated.
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.1], "in.wav");
        let a = g.add_node(NodeKind::Volume);
        let b = g.add_node(NodeKind::Fade);
        let c = g.add_node(NodeKind::Speed);
        let d = g.add_node(NodeKind::Crop);
        g.connect(src, "audio", a, "audio").unwrap();
        g.connect(a, "audio", b, "audio").unwrap();
        g.connect(src, "audio", c, "audio").unwrap();

        g.evaluate(b).unwrap();
        g.evaluate(c).unwrap();
        g.evaluate(d).unwrap();

        g.set_param(a, "gain", 0.5).unwrap();
        assert_eq!(g.state(a), Some(NodeState::Dirty));
        assert_eq!(g.state(b), Some(NodeState::Dirty));
        assert_eq!(g.state(c), Some(NodeState::Clean));
        assert_eq!(g.state(d), Some(NodeState::Clean));
        assert_eq!(g.state(src), Some(NodeState::Clean));
    }

    #[test]
    fn cycle_rejection_is_atomic() {
        let mut g = graph();
        let a = g.add_node(NodeKind::Volume);
        let b = g.add_node(NodeKind::Soften);
        let c = g.add_node(NodeKind::Fade);
        g.connect(a, "audio", b, "audio").unwrap();
        g.connect(b, "audio", c, "audio").unwrap();

        let edges_before: Vec<_> = g.edges().collect();
        assert_eq!(
            g.connect(c, "audio", a, "audio").unwrap_err(),
            GraphError::CycleDetected
        );
        assert_eq!(
            g.connect(b, "audio", a, "audio").unwrap_err(),
            GraphError::CycleDetected
        );
        let edges_after: Vec<_> = g.edges().collect();
        assert_eq!(edges_before, edges_after);
    }

    #[test]
    fn self_loop_rejected() {
        let mut g = graph();
        let a = g.add_node(NodeKind::Volume);
        assert_eq!(
            g.connect(a, "audio", a, "audio").unwrap_err(),
            GraphError::SelfLoop(a)
        );
    }

    #[test]
    fn single_source_port_occupancy() {
        let mut g = graph();
        let a = seeded_source(&mut g, &[0.1], "a.wav");
        let b = seeded_source(&mut g, &[0.2], "b.wav");
        let join = g.add_node(NodeKind::Join);
        g.connect(a, "audio", join, "audio1").unwrap();
        assert_eq!(
            g.connect(b, "audio", join, "audio1").unwrap_err(),
            GraphError::PortOccupied {
                node: join,
                port: "audio1"
            }
        );
        g.connect(b, "audio", join, "audio2").unwrap();
    }

    #[test]
    fn duplicate_edge_rejected() {
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.1], "a.wav");
        let vol = g.add_node(NodeKind::Volume);
        g.connect(src, "audio", vol, "audio").unwrap();
        assert_eq!(
            g.connect(src, "audio", vol, "audio").unwrap_err(),
            GraphError::DuplicateEdge(src, vol)
        );
    }

    #[test]
    fn unknown_ports_and_params() {
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.1], "a.wav");
        let vol = g.add_node(NodeKind::Volume);
        assert!(matches!(
            g.connect(src, "audio", vol, "sidechain"),
            Err(GraphError::UnknownPort { .. })
        ));
        assert!(matches!(
            g.connect(src, "aux", vol, "audio"),
            Err(GraphError::UnknownPort { .. })
        ));
        assert!(matches!(
            g.set_param(vol, "drive", 1.0),
            Err(GraphError::UnknownParam { .. })
        ));
    }

    #[test]
    fn join_missing_second_input_scenario() {
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.1, 0.2], "a.wav");
        let join = g.add_node(NodeKind::Join);
        g.connect(src, "audio", join, "audio1").unwrap();

        let out = g.evaluate(join).unwrap();
        assert!(out.is_none());
        assert_eq!(
            g.warning(join),
            Warning::MissingRequiredInput("audio2".into())
        );
    }

    #[test]
    fn join_multi_clip_clears_prior_cache() {
        let mut g = graph();
        let a = seeded_source(&mut g, &[0.1], "a.wav");
        let b = seeded_source(&mut g, &[0.2], "b.wav");
        let join = g.add_node(NodeKind::Join);
        g.connect(a, "audio", join, "audio1").unwrap();
        g.connect(b, "audio", join, "audio2").unwrap();
        assert!(g.evaluate(join).unwrap().is_some());

        // Re-seed the first source with two clips: the join must refuse and
        // drop its previously cached output.
        g.set_source_clips(a, vec![clip(&[0.1], "a1"), clip(&[0.3], "a2")])
            .unwrap();
        let out = g.evaluate(join).unwrap();
        assert!(out.is_none());
        assert!(g.output(join).is_none());
        assert_eq!(g.warning(join), Warning::MultiFileUnsupported);
    }

    #[test]
    fn fan_in_order_follows_edge_insertion() {
        let mut g = graph();
        let a = seeded_source(&mut g, &[0.1], "first.wav");
        let b = seeded_source(&mut g, &[0.2], "second.wav");
        let vol = g.add_node(NodeKind::Volume);
        g.connect(a, "audio", vol, "audio").unwrap();
        g.connect(b, "audio", vol, "audio").unwrap();

        let out = g.evaluate(vol).unwrap().unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].label, "first.wav");
        assert_eq!(out[1].label, "second.wav");
    }

    #[test]
    fn step_pass_supersedes_on_edit() {
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.5], "in.wav");
        let vol = g.add_node(NodeKind::Volume);
        g.connect(src, "audio", vol, "audio").unwrap();

        let mut pass = g.begin_pass(vol).unwrap();
        assert_eq!(g.step(&mut pass), StepOutcome::Progress); // src

        // A slider edit lands between node boundaries.
        g.set_param(vol, "gain", 3.0).unwrap();
        assert_eq!(g.step(&mut pass), StepOutcome::Superseded);
        // The superseded pass committed nothing for the volume node.
        assert_eq!(g.state(vol), Some(NodeState::Dirty));
        assert!(g.output(vol).is_none());

        // A fresh pass sees the freshest parameter state.
        let out = g.evaluate(vol).unwrap().unwrap();
        assert_eq!(out[0].buffer.channel(0), &[1.5]);
    }

    #[test]
    fn superseded_pass_stays_superseded() {
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.5], "in.wav");
        let vol = g.add_node(NodeKind::Volume);
        g.connect(src, "audio", vol, "audio").unwrap();

        let mut pass = g.begin_pass(vol).unwrap();
        g.set_param(vol, "gain", 2.0).unwrap();
        assert_eq!(g.step(&mut pass), StepOutcome::Superseded);
        assert_eq!(g.step(&mut pass), StepOutcome::Superseded);
    }

    #[test]
    fn failed_node_keeps_previous_cached_output() {
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.5], "in.wav");
        let vol = g.add_node(NodeKind::Volume);
        g.connect(src, "audio", vol, "audio").unwrap();
        let first = g.evaluate(vol).unwrap().unwrap();

        // Drive the commit path directly with a process error.
        g.commit(
            vol,
            Err(ProcessError::PortCountMismatch {
                expected: 1,
                got: 0,
            }),
        );
        assert_eq!(g.state(vol), Some(NodeState::Failed));
        assert_eq!(g.output(vol).unwrap(), first.as_slice());
    }

    #[test]
    fn first_ever_failure_has_no_cache() {
        let mut g = graph();
        let vol = g.add_node(NodeKind::Volume);
        g.commit(
            vol,
            Err(ProcessError::PortCountMismatch {
                expected: 1,
                got: 0,
            }),
        );
        assert_eq!(g.state(vol), Some(NodeState::Failed));
        assert!(g.output(vol).is_none());
    }

    #[test]
    fn failed_node_recomputes_once_dirtied() {
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.5], "in.wav");
        let vol = g.add_node(NodeKind::Volume);
        g.connect(src, "audio", vol, "audio").unwrap();
        g.evaluate(vol).unwrap();
        g.commit(
            vol,
            Ok(NodeOutput {
                clips: None,
                warning: Warning::None,
            }),
        );

        g.set_param(vol, "gain", 2.0).unwrap();
        let out = g.evaluate(vol).unwrap().unwrap();
        assert_eq!(out[0].buffer.channel(0), &[1.0]);
    }

    #[test]
    fn remove_node_detaches_edges_and_dirties_downstream() {
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.5], "in.wav");
        let vol = g.add_node(NodeKind::Volume);
        let fade = g.add_node(NodeKind::Fade);
        g.connect(src, "audio", vol, "audio").unwrap();
        g.connect(vol, "audio", fade, "audio").unwrap();
        g.evaluate(fade).unwrap();

        g.remove_node(vol).unwrap();
        assert_eq!(g.state(fade), Some(NodeState::Dirty));
        assert!(g.kind(vol).is_none());
        assert_eq!(g.edges().count(), 0);

        // Fade now has no upstream: evaluates to null + missing input.
        assert!(g.evaluate(fade).unwrap().is_none());
        assert_eq!(
            g.warning(fade),
            Warning::MissingRequiredInput("audio".into())
        );
    }

    #[test]
    fn commands_mirror_methods() {
        let mut g = graph();
        let CommandOutcome::NodeAdded(src) = g
            .apply(GraphCommand::AddNode {
                kind: NodeKind::Source(vec![clip(&[0.5], "in.wav")]),
            })
            .unwrap()
        else {
            panic!("expected NodeAdded")
        };
        let CommandOutcome::NodeAdded(vol) = g
            .apply(GraphCommand::AddNode {
                kind: NodeKind::Volume,
            })
            .unwrap()
        else {
            panic!("expected NodeAdded")
        };
        g.apply(GraphCommand::Connect {
            from: src,
            from_port: "audio".into(),
            to: vol,
            to_port: "audio".into(),
        })
        .unwrap();
        g.apply(GraphCommand::SetParameter {
            node: vol,
            name: "gain".into(),
            value: 2.0,
        })
        .unwrap();

        let out = g.evaluate(vol).unwrap().unwrap();
        assert_eq!(out[0].buffer.channel(0), &[1.0]);
    }

    #[test]
    fn set_source_clips_rejects_non_source() {
        let mut g = graph();
        let vol = g.add_node(NodeKind::Volume);
        assert_eq!(
            g.set_source_clips(vol, vec![]).unwrap_err(),
            GraphError::NotASource(vol)
        );
    }

    #[test]
    fn volume_limiter_and_none_scenario() {
        // 0.9 scaled by 2.0 → 1.8: None flags and passes through, Limiter clamps.
        let mut g = graph();
        let src = seeded_source(&mut g, &[0.9], "hot.wav");
        let vol = g.add_node(NodeKind::Volume);
        g.connect(src, "audio", vol, "audio").unwrap();
        g.set_param(vol, "gain", 2.0).unwrap();

        let out = g.evaluate(vol).unwrap().unwrap();
        assert!((out[0].buffer.channel(0)[0] - 1.8).abs() < 1e-6);
        assert_eq!(g.warning(vol), Warning::ClippingDetected);

        g.set_param(vol, "mode", crate::kernels::ClipMode::Limiter.to_param())
            .unwrap();
        let out = g.evaluate(vol).unwrap().unwrap();
        assert_eq!(out[0].buffer.channel(0), &[1.0]);
        assert_eq!(g.warning(vol), Warning::None);
    }
}
