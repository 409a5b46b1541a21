//! Node model for the dataflow graph.
//!
//! Every node has a [`NodeId`], a [`NodeKind`] tag that fixes its ports and
//! parameter table at construction, mutable parameter values, and the
//! bookkeeping the scheduler needs: cached outputs, a state-machine state,
//! and the current warning. Node kinds are a closed tagged enum dispatched
//! through one `process` path — adding a kind means adding a variant arm,
//! not extending a hierarchy.

use crate::buffer::AudioClip;
use crate::graph::edge::EdgeId;

/// Unique identifier for a node in the graph.
///
/// Node IDs are assigned sequentially and never reused within a graph
/// instance. They remain stable across graph mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Declaration of one input port, fixed per node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPortDecl {
    /// Port name, unique within the node.
    pub name: &'static str,
    /// Whether more than one upstream edge may target this port.
    pub multi_source: bool,
}

/// Declared range and default of one parameter, fixed per node kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Parameter name, unique within the node.
    pub name: &'static str,
    /// Smallest accepted value.
    pub min: f32,
    /// Largest accepted value.
    pub max: f32,
    /// Value a fresh node starts with; also the NaN fallback.
    pub default: f32,
}

const NO_INPUTS: &[InputPortDecl] = &[];
const AUDIO_IN: &[InputPortDecl] = &[InputPortDecl {
    name: "audio",
    multi_source: true,
}];
const JOIN_INPUTS: &[InputPortDecl] = &[
    InputPortDecl {
        name: "audio1",
        multi_source: false,
    },
    InputPortDecl {
        name: "audio2",
        multi_source: false,
    },
];

const NO_PARAMS: &[ParamDescriptor] = &[];
const VOLUME_PARAMS: &[ParamDescriptor] = &[
    ParamDescriptor {
        name: "gain",
        min: 0.0,
        max: crate::kernels::MAX_GAIN,
        default: 1.0,
    },
    ParamDescriptor {
        name: "mode",
        min: 0.0,
        max: 3.0,
        default: 0.0,
    },
];
const SOFTEN_PARAMS: &[ParamDescriptor] = &[
    ParamDescriptor {
        name: "cutoff",
        min: crate::kernels::soften::MIN_CUTOFF_HZ,
        max: crate::kernels::soften::MAX_CUTOFF_HZ,
        default: 8000.0,
    },
    ParamDescriptor {
        name: "intensity",
        min: 0.0,
        max: 100.0,
        default: 50.0,
    },
];
/// Upper bound for crop endpoints in seconds (10 hours); the kernel clamps
/// to the actual buffer duration.
const MAX_CLIP_SECS: f32 = 36000.0;
const CROP_PARAMS: &[ParamDescriptor] = &[
    ParamDescriptor {
        name: "start",
        min: 0.0,
        max: MAX_CLIP_SECS,
        default: 0.0,
    },
    ParamDescriptor {
        name: "end",
        min: 0.0,
        max: MAX_CLIP_SECS,
        default: MAX_CLIP_SECS,
    },
];
const FADE_PARAMS: &[ParamDescriptor] = &[
    ParamDescriptor {
        name: "fade_in",
        min: 0.0,
        max: crate::kernels::fade::MAX_FADE_SECS,
        default: 0.0,
    },
    ParamDescriptor {
        name: "fade_out",
        min: 0.0,
        max: crate::kernels::fade::MAX_FADE_SECS,
        default: 0.0,
    },
];
const SPEED_PARAMS: &[ParamDescriptor] = &[ParamDescriptor {
    name: "factor",
    min: crate::kernels::speed::MIN_SPEED,
    max: crate::kernels::speed::MAX_SPEED,
    default: 1.0,
}];

/// The kind of a node — the closed set of audio transforms.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Seeds the graph with decoded clips (file intake hands these over).
    Source(Vec<AudioClip>),
    /// Gain scaling with clipping management.
    Volume,
    /// One-pole low-pass soften with dry/wet mix.
    Soften,
    /// Concatenation of exactly two single-clip inputs.
    Join,
    /// Time-window crop.
    Crop,
    /// Linear fade-in/fade-out envelopes.
    Fade,
    /// Playback-rate change.
    Speed,
}

impl NodeKind {
    /// Stable string tag used by snapshots and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Source(_) => "source",
            Self::Volume => "volume",
            Self::Soften => "soften",
            Self::Join => "join",
            Self::Crop => "crop",
            Self::Fade => "fade",
            Self::Speed => "speed",
        }
    }

    /// Inverse of [`tag()`](Self::tag); `None` for unknown tags. A restored
    /// source starts unseeded.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "source" => Some(Self::Source(Vec::new())),
            "volume" => Some(Self::Volume),
            "soften" => Some(Self::Soften),
            "join" => Some(Self::Join),
            "crop" => Some(Self::Crop),
            "fade" => Some(Self::Fade),
            "speed" => Some(Self::Speed),
            _ => None,
        }
    }

    /// Ordered input port declarations, fixed for the kind.
    pub fn input_ports(&self) -> &'static [InputPortDecl] {
        match self {
            Self::Source(_) => NO_INPUTS,
            Self::Join => JOIN_INPUTS,
            Self::Volume | Self::Soften | Self::Crop | Self::Fade | Self::Speed => AUDIO_IN,
        }
    }

    /// Ordered output port names, fixed for the kind.
    pub fn output_ports(&self) -> &'static [&'static str] {
        &["audio"]
    }

    /// Parameter table, fixed for the kind.
    pub fn param_descriptors(&self) -> &'static [ParamDescriptor] {
        match self {
            Self::Source(_) | Self::Join => NO_PARAMS,
            Self::Volume => VOLUME_PARAMS,
            Self::Soften => SOFTEN_PARAMS,
            Self::Crop => CROP_PARAMS,
            Self::Fade => FADE_PARAMS,
            Self::Speed => SPEED_PARAMS,
        }
    }
}

/// Non-fatal signal surfaced per node after each evaluation, polled
/// read-only by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Warning {
    /// Nothing to report.
    #[default]
    None,
    /// Gain scaling pushed samples past full scale with no protection active.
    ClippingDetected,
    /// A single-clip port received more than one clip.
    MultiFileUnsupported,
    /// A required input port is unconnected; carries the port name(s).
    MissingRequiredInput(String),
}

/// Scheduler state of one node.
///
/// `Clean → Dirty → Computing → Clean | Failed`. A `Failed` node keeps its
/// previous cached output and is retried by the next evaluation pass that
/// reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Cached output is valid.
    Clean,
    /// Parameters or upstream changed; needs recompute.
    Dirty,
    /// Evaluation in flight.
    Computing,
    /// Last evaluation errored; previous cached output retained.
    Failed,
}

/// Internal bookkeeping for a node in the graph.
pub(crate) struct NodeData {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Parameter values, parallel to `kind.param_descriptors()`.
    pub params: Vec<f32>,
    pub state: NodeState,
    /// Cached output clips of the single output port; `None` before the
    /// first evaluation or when the node declines to produce output.
    pub outputs: Option<Vec<AudioClip>>,
    pub warning: Warning,
    /// Edges arriving at this node.
    pub incoming: Vec<EdgeId>,
    /// Edges leaving this node.
    pub outgoing: Vec<EdgeId>,
}

impl NodeData {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        let params = kind.param_descriptors().iter().map(|d| d.default).collect();
        Self {
            id,
            kind,
            params,
            state: NodeState::Dirty,
            outputs: None,
            warning: Warning::None,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Looks up a parameter value by name.
    pub fn param(&self, name: &str) -> Option<f32> {
        self.kind
            .param_descriptors()
            .iter()
            .position(|d| d.name == name)
            .map(|i| self.params[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for tag in ["source", "volume", "soften", "join", "crop", "fade", "speed"] {
            let kind = NodeKind::from_tag(tag).unwrap();
            assert_eq!(kind.tag(), tag);
        }
        assert!(NodeKind::from_tag("reverb").is_none());
    }

    #[test]
    fn join_has_two_single_source_ports() {
        let ports = NodeKind::Join.input_ports();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].name, "audio1");
        assert_eq!(ports[1].name, "audio2");
        assert!(!ports[0].multi_source && !ports[1].multi_source);
    }

    #[test]
    fn transforms_accept_fan_in() {
        for kind in [
            NodeKind::Volume,
            NodeKind::Soften,
            NodeKind::Crop,
            NodeKind::Fade,
            NodeKind::Speed,
        ] {
            let ports = kind.input_ports();
            assert_eq!(ports.len(), 1);
            assert!(ports[0].multi_source);
        }
    }

    #[test]
    fn fresh_node_starts_dirty_with_defaults() {
        let node = NodeData::new(NodeId(0), NodeKind::Volume);
        assert_eq!(node.state, NodeState::Dirty);
        assert_eq!(node.param("gain"), Some(1.0));
        assert_eq!(node.param("mode"), Some(0.0));
        assert_eq!(node.param("missing"), None);
        assert!(node.outputs.is_none());
    }

    #[test]
    fn descriptors_declare_sane_ranges() {
        for kind in [
            NodeKind::Volume,
            NodeKind::Soften,
            NodeKind::Crop,
            NodeKind::Fade,
            NodeKind::Speed,
        ] {
            for d in kind.param_descriptors() {
                assert!(d.min <= d.max, "{}: {}", kind.tag(), d.name);
                assert!(
                    d.default >= d.min && d.default <= d.max,
                    "{}: {}",
                    kind.tag(),
                    d.name
                );
            }
        }
    }
}
