//! Node processing — the uniform `process(inputs) -> outputs` contract.
//!
//! The scheduler never matches on concrete node kinds; it hands every node's
//! gathered inputs to [`process_node`] and commits whatever comes back. A
//! node always yields either valid clips or a null output plus a warning —
//! never a partially-corrupt buffer. Kernels are synchronous and
//! non-suspending; all numeric defense happens at the kernel boundary.

use crate::buffer::AudioClip;
use crate::env::AudioEnvironment;
use crate::graph::node::{NodeKind, Warning};
use crate::kernels::{self, ClipMode};

/// Result of one node evaluation, committed by the scheduler.
#[derive(Debug, Clone)]
pub(crate) struct NodeOutput {
    /// Output clips of the single output port; `None` declines output.
    pub clips: Option<Vec<AudioClip>>,
    /// Warning to surface for this node.
    pub warning: Warning,
}

impl NodeOutput {
    fn clips(clips: Vec<AudioClip>, warning: Warning) -> Self {
        Self {
            clips: Some(clips),
            warning,
        }
    }

    fn null(warning: Warning) -> Self {
        Self {
            clips: None,
            warning,
        }
    }
}

/// Defensive errors from the process path. These indicate a scheduler bug
/// (mismatched port wiring), not bad audio; the node transitions to Failed
/// and keeps its previous cached output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The gathered input list did not match the node's declared ports.
    PortCountMismatch {
        /// Declared input port count.
        expected: usize,
        /// Gathered port value count.
        got: usize,
    },
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PortCountMismatch { expected, got } => {
                write!(f, "gathered {got} input ports, node declares {expected}")
            }
        }
    }
}

impl std::error::Error for ProcessError {}

/// Evaluates one node: `inputs[i]` holds the ordered clips arriving at the
/// node's `i`-th declared input port.
pub(crate) fn process_node(
    kind: &NodeKind,
    params: &[f32],
    inputs: &[Vec<AudioClip>],
    env: &AudioEnvironment,
) -> Result<NodeOutput, ProcessError> {
    let expected = kind.input_ports().len();
    if inputs.len() != expected {
        return Err(ProcessError::PortCountMismatch {
            expected,
            got: inputs.len(),
        });
    }

    Ok(match kind {
        NodeKind::Source(clips) => {
            if clips.is_empty() {
                NodeOutput::null(Warning::MissingRequiredInput("audio".into()))
            } else {
                NodeOutput::clips(clips.clone(), Warning::None)
            }
        }
        NodeKind::Volume => process_volume(params, &inputs[0]),
        NodeKind::Soften => map_clips(&inputs[0], |buf| {
            kernels::soften(buf, params[0], params[1])
        }),
        NodeKind::Join => process_join(inputs, env),
        NodeKind::Crop => map_clips(&inputs[0], |buf| kernels::crop(buf, params[0], params[1])),
        NodeKind::Fade => map_clips(&inputs[0], |buf| kernels::fade(buf, params[0], params[1])),
        NodeKind::Speed => map_clips(&inputs[0], |buf| kernels::change_speed(buf, params[0])),
    })
}

/// Applies a per-buffer kernel to every clip on a multi-value port,
/// preserving order and labels.
fn map_clips(
    clips: &[AudioClip],
    f: impl Fn(&crate::SampleBuffer) -> crate::SampleBuffer,
) -> NodeOutput {
    if clips.is_empty() {
        return NodeOutput::null(Warning::MissingRequiredInput("audio".into()));
    }
    let out = clips
        .iter()
        .map(|clip| AudioClip::new(f(&clip.buffer), clip.label.clone()))
        .collect();
    NodeOutput::clips(out, Warning::None)
}

fn process_volume(params: &[f32], clips: &[AudioClip]) -> NodeOutput {
    if clips.is_empty() {
        return NodeOutput::null(Warning::MissingRequiredInput("audio".into()));
    }
    let gain = params[0];
    let mode = ClipMode::from_param(params[1]);

    let mut any_clipped = false;
    let out = clips
        .iter()
        .map(|clip| {
            let result = kernels::apply_gain(&clip.buffer, gain, mode);
            any_clipped |= result.clipped;
            AudioClip::new(result.buffer, clip.label.clone())
        })
        .collect();

    // Protection modes handle clipping themselves; only unprotected
    // clipping is worth a warning.
    let warning = if mode == ClipMode::None && any_clipped {
        Warning::ClippingDetected
    } else {
        Warning::None
    };
    NodeOutput::clips(out, warning)
}

fn process_join(inputs: &[Vec<AudioClip>], env: &AudioEnvironment) -> NodeOutput {
    let first = &inputs[0];
    let second = &inputs[1];

    // Multiple clips on either port make concatenation order ambiguous:
    // refuse output entirely rather than guess at a partial join.
    if first.len() > 1 || second.len() > 1 {
        return NodeOutput::null(Warning::MultiFileUnsupported);
    }

    match (first.first(), second.first()) {
        (None, None) => NodeOutput::null(Warning::MissingRequiredInput("audio1, audio2".into())),
        (None, Some(_)) => NodeOutput::null(Warning::MissingRequiredInput("audio1".into())),
        (Some(_), None) => NodeOutput::null(Warning::MissingRequiredInput("audio2".into())),
        (Some(a), Some(b)) => {
            let joined = kernels::concat(&a.buffer, &b.buffer, env);
            let label = format!("{} + {}", a.label, b.label);
            NodeOutput::clips(vec![AudioClip::new(joined, label)], Warning::None)
        }
    }
}
