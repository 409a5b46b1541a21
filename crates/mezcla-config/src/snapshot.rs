//! Snapshot file format and restore semantics.
//!
//! A snapshot captures topology and parameters only: node kinds, parameter
//! values, and edges. Source audio is deliberately not serialized; restored
//! Source nodes come back unseeded and the caller re-attaches clips.
//!
//! Restore is forward-compatible on content and strict on structure:
//! records a newer writer added (unknown node kinds, edges touching them,
//! unknown parameters) are skipped and reported in a [`LoadReport`], while
//! a snapshot whose surviving edges cannot be rebuilt (cycles, bad ports)
//! fails closed.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use mezcla_core::{AudioEnvironment, AudioGraph, GraphError, NodeId, NodeKind};

use crate::error::SnapshotError;

/// One node in a snapshot.
///
/// # TOML Format
///
/// ```toml
/// [[nodes]]
/// id = 1
/// kind = "volume"
/// [nodes.params]
/// gain = 1.5
/// mode = 1.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    /// The node's ID at save time; remapped on restore.
    pub id: u32,
    /// Stable kind tag, e.g. `"volume"`.
    pub kind: String,
    /// Parameter values by name. Sorted map keeps serialization stable.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f32>,
}

/// One edge in a snapshot, referring to save-time node IDs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeRecord {
    /// Save-time ID of the source node.
    pub from: u32,
    /// Output port name on the source node.
    pub from_port: String,
    /// Save-time ID of the destination node.
    pub to: u32,
    /// Input port name on the destination node.
    pub to_port: String,
}

/// A complete serializable picture of a graph's topology and parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphSnapshot {
    /// Nodes in ascending save-time ID order.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// Edges in creation order.
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// An entry the restore pass skipped instead of failing on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkippedEntry {
    /// A node whose kind tag this build does not know.
    UnsupportedNodeKind {
        /// Save-time node ID.
        id: u32,
        /// The unrecognized kind tag.
        kind: String,
    },
    /// An edge with an endpoint that was not restored.
    DanglingEdge {
        /// Save-time source node ID.
        from: u32,
        /// Save-time destination node ID.
        to: u32,
    },
    /// A parameter name the node's descriptor table does not declare.
    UnknownParam {
        /// Save-time node ID.
        id: u32,
        /// The unrecognized parameter name.
        name: String,
    },
}

/// What a restore skipped, alongside the rebuilt graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Entries the restore pass dropped.
    pub skipped: Vec<SkippedEntry>,
    /// Restored node IDs keyed by their save-time IDs.
    pub id_map: HashMap<u32, NodeId>,
}

impl LoadReport {
    /// True when every record restored without being skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl GraphSnapshot {
    /// Captures a graph's topology and parameters.
    ///
    /// Source clips are not captured; a restored Source starts unseeded.
    pub fn capture(graph: &AudioGraph) -> Self {
        let nodes = graph
            .nodes()
            .filter_map(|id| {
                let kind = graph.kind(id)?;
                let params = kind
                    .param_descriptors()
                    .iter()
                    .filter_map(|d| Some((d.name.to_string(), graph.param(id, d.name)?)))
                    .collect();
                Some(NodeRecord {
                    id: id.index(),
                    kind: kind.tag().to_string(),
                    params,
                })
            })
            .collect();

        let edges = graph
            .edges()
            .map(|(_, edge)| EdgeRecord {
                from: edge.from.index(),
                from_port: edge.from_port.to_string(),
                to: edge.to.index(),
                to_port: edge.to_port.to_string(),
            })
            .collect();

        Self { nodes, edges }
    }

    /// Rebuilds a graph from this snapshot.
    ///
    /// Unknown node kinds, edges touching them, and unknown parameters are
    /// skipped and reported. Every restored node starts Dirty and every
    /// Source unseeded, so nothing is evaluated until the caller asks.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::Graph`] when the surviving edges cannot be rebuilt:
    /// a cycle, an unknown port on a known kind, or a single-source port
    /// with two edges.
    pub fn restore(
        &self,
        env: AudioEnvironment,
    ) -> Result<(AudioGraph, LoadReport), SnapshotError> {
        let mut graph = AudioGraph::new(env);
        let mut report = LoadReport::default();

        for record in &self.nodes {
            let Some(kind) = NodeKind::from_tag(&record.kind) else {
                tracing::warn!(id = record.id, kind = %record.kind, "skipping unknown node kind");
                report.skipped.push(SkippedEntry::UnsupportedNodeKind {
                    id: record.id,
                    kind: record.kind.clone(),
                });
                continue;
            };
            let id = graph.add_node(kind);
            report.id_map.insert(record.id, id);

            for (name, &value) in &record.params {
                match graph.set_param(id, name, value) {
                    Ok(()) => {}
                    Err(GraphError::UnknownParam { .. }) => {
                        report.skipped.push(SkippedEntry::UnknownParam {
                            id: record.id,
                            name: name.clone(),
                        });
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }

        for record in &self.edges {
            let (Some(&from), Some(&to)) = (
                report.id_map.get(&record.from),
                report.id_map.get(&record.to),
            ) else {
                tracing::warn!(from = record.from, to = record.to, "skipping dangling edge");
                report.skipped.push(SkippedEntry::DanglingEdge {
                    from: record.from,
                    to: record.to,
                });
                continue;
            };
            graph.connect(from, &record.from_port, to, &record.to_port)?;
        }

        Ok((graph, report))
    }

    /// Load a snapshot from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| SnapshotError::read_file(path, e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load a snapshot from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, SnapshotError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the snapshot to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| SnapshotError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the snapshot to a TOML string.
    pub fn to_toml(&self) -> Result<String, SnapshotError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_skips_source_clips() {
        use mezcla_core::{AudioClip, SampleBuffer};
        let mut g = AudioGraph::new(AudioEnvironment::default());
        let clip = AudioClip::new(
            SampleBuffer::from_mono(vec![0.5], 48000).unwrap(),
            "in.wav",
        );
        g.add_node(NodeKind::Source(vec![clip]));

        let snapshot = GraphSnapshot::capture(&g);
        let toml = snapshot.to_toml().unwrap();
        assert!(toml.contains("kind = \"source\""));
        assert!(!toml.contains("in.wav"));
    }

    #[test]
    fn unknown_param_is_skipped_not_fatal() {
        let snapshot = GraphSnapshot {
            nodes: vec![NodeRecord {
                id: 0,
                kind: "volume".into(),
                params: [("gain".to_string(), 2.0), ("drive".to_string(), 0.7)]
                    .into_iter()
                    .collect(),
            }],
            edges: vec![],
        };
        let (graph, report) = snapshot.restore(AudioEnvironment::default()).unwrap();
        let id = report.id_map[&0];
        assert_eq!(graph.param(id, "gain"), Some(2.0));
        assert_eq!(
            report.skipped,
            vec![SkippedEntry::UnknownParam {
                id: 0,
                name: "drive".into()
            }]
        );
    }

    #[test]
    fn params_clamp_on_restore() {
        let snapshot = GraphSnapshot {
            nodes: vec![NodeRecord {
                id: 0,
                kind: "volume".into(),
                params: [("gain".to_string(), 99.0)].into_iter().collect(),
            }],
            edges: vec![],
        };
        let (graph, report) = snapshot.restore(AudioEnvironment::default()).unwrap();
        assert_eq!(graph.param(report.id_map[&0], "gain"), Some(4.0));
    }
}
