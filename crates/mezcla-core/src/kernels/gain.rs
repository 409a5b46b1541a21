//! Gain scaling with clipping management.
//!
//! Scales every sample by a linear gain factor, then detects clipping on the
//! *scaled, unprotected* signal — detection is the trigger for protection, so
//! it must run before any protection is applied. The selected [`ClipMode`]
//! then decides what happens to samples outside `[-1, 1]`:
//!
//! | Mode | Behavior |
//! |------|----------|
//! | `None` | Emit unmodified; the caller surfaces a clipping warning |
//! | `Limiter` | Hard clamp to `[-1, 1]` |
//! | `SoftClip` | Continuous tanh-shaped saturation above a knee |
//! | `Normalize` | Rescale the whole buffer so the peak sits at exactly 1.0 |

use super::sanitize_param;
use crate::buffer::SampleBuffer;

/// Upper bound for the gain factor (+12 dB).
pub const MAX_GAIN: f32 = 4.0;

/// Magnitude above which [`ClipMode::SoftClip`] starts compressing.
///
/// Below the knee the curve is the identity; at the knee the saturator takes
/// over with matching value and no discontinuity.
const SOFT_CLIP_KNEE: f32 = 0.8;

/// Clipping-management policy applied after gain scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipMode {
    /// No protection — scaled samples pass through, clipping is only flagged.
    #[default]
    None,
    /// Hard clamp to `[-1, 1]`.
    Limiter,
    /// Saturating nonlinearity above [`SOFT_CLIP_KNEE`], continuous at the knee.
    SoftClip,
    /// Rescale the entire buffer by `1 / peak` when clipping was detected.
    Normalize,
}

impl ClipMode {
    /// Maps a numeric parameter value (0–3) to a mode. Out-of-range and
    /// non-finite values fall back to `None`.
    pub fn from_param(value: f32) -> Self {
        if !value.is_finite() {
            return Self::None;
        }
        match value.round() as i64 {
            1 => Self::Limiter,
            2 => Self::SoftClip,
            3 => Self::Normalize,
            _ => Self::None,
        }
    }

    /// The numeric parameter value for this mode.
    pub fn to_param(self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::Limiter => 1.0,
            Self::SoftClip => 2.0,
            Self::Normalize => 3.0,
        }
    }
}

/// Output of [`apply_gain`]: the transformed buffer plus the detection flag.
#[derive(Debug, Clone, PartialEq)]
pub struct GainResult {
    /// The gain-scaled (and possibly protected) buffer.
    pub buffer: SampleBuffer,
    /// True if any scaled sample exceeded `[-1, 1]` *before* protection.
    pub clipped: bool,
}

/// Scales `input` by `gain` and applies the clipping policy.
///
/// The gain is clamped to `[0, MAX_GAIN]` (NaN falls back to unity). The
/// `clipped` flag always reports detection on the unprotected scaled signal,
/// regardless of mode.
pub fn apply_gain(input: &SampleBuffer, gain: f32, mode: ClipMode) -> GainResult {
    let gain = sanitize_param(gain, 0.0, MAX_GAIN, 1.0);

    let mut channels: Vec<Vec<f32>> = input
        .channels()
        .iter()
        .map(|ch| ch.iter().map(|&s| s * gain).collect())
        .collect();

    // Detection runs on the scaled signal before any protection.
    let peak = channels
        .iter()
        .flat_map(|ch| ch.iter())
        .fold(0.0f32, |acc, &s| acc.max(s.abs()));
    let clipped = peak > 1.0;

    match mode {
        ClipMode::None => {}
        ClipMode::Limiter => {
            for ch in &mut channels {
                for s in ch.iter_mut() {
                    *s = s.clamp(-1.0, 1.0);
                }
            }
        }
        ClipMode::SoftClip => {
            for ch in &mut channels {
                for s in ch.iter_mut() {
                    *s = soft_clip(*s);
                }
            }
        }
        ClipMode::Normalize => {
            if clipped {
                let scale = 1.0 / peak;
                for ch in &mut channels {
                    for s in ch.iter_mut() {
                        *s *= scale;
                    }
                }
            }
        }
    }

    GainResult {
        buffer: SampleBuffer::from_validated(channels, input.sample_rate()),
        clipped,
    }
}

/// Identity below the knee; above it, a tanh curve compressing toward ±1.
///
/// `f(x) = sign(x) · (K + (1 − K) · tanh((|x| − K) / (1 − K)))` for `|x| > K`.
/// At `|x| = K` the tanh term is zero, so the curve meets the identity with
/// no discontinuity, and `f` never exceeds 1 in magnitude.
fn soft_clip(x: f32) -> f32 {
    let mag = x.abs();
    if mag <= SOFT_CLIP_KNEE {
        return x;
    }
    let headroom = 1.0 - SOFT_CLIP_KNEE;
    let shaped = SOFT_CLIP_KNEE + headroom * ((mag - SOFT_CLIP_KNEE) / headroom).tanh();
    shaped.copysign(x)
}
