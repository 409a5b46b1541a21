//! Final export: evaluate a target node and encode its output.

use mezcla_core::{AudioGraph, NodeId};

use crate::wav::encode_wav;
use crate::{Error, Result};

/// Evaluates `target` to completion and encodes its first output clip as
/// WAV bytes.
///
/// Evaluation pumps passes until one finishes uncancelled, so the encoded
/// audio always reflects the freshest graph state.
///
/// # Errors
///
/// [`Error::Graph`] when the target does not exist, [`Error::NoOutput`]
/// (carrying the node's warning) when it declines to produce clips, and
/// encoding errors from [`encode_wav`].
pub fn export_final(
    graph: &mut AudioGraph,
    target: NodeId,
    bits_per_sample: u16,
) -> Result<Vec<u8>> {
    let clips = graph.evaluate(target)?;
    let clip = clips
        .as_ref()
        .and_then(|c| c.first())
        .ok_or_else(|| Error::NoOutput {
            warning: graph.warning(target),
        })?;
    tracing::info!(
        target = %target,
        frames = clip.buffer.len(),
        rate = clip.buffer.sample_rate(),
        bits = bits_per_sample,
        "export_final"
    );
    encode_wav(&clip.buffer, bits_per_sample)
}
