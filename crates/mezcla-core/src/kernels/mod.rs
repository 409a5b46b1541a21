//! Pure DSP kernels over whole [`SampleBuffer`](crate::SampleBuffer)s.
//!
//! Every kernel borrows its input read-only, allocates a new buffer for the
//! result, and never suspends — scheduling granularity lives at node
//! boundaries, not inside sample loops. Malformed parameters (NaN/Inf, out
//! of range) are clamped at the kernel boundary instead of propagated, so a
//! kernel always returns a well-formed buffer.

pub mod crop;
pub mod fade;
pub mod gain;
pub mod join;
pub mod resample;
pub mod soften;
pub mod speed;

pub use crop::crop;
pub use fade::fade;
pub use gain::{ClipMode, GainResult, MAX_GAIN, apply_gain};
pub use join::concat;
pub use resample::resample_to_rate;
pub use soften::soften;
pub use speed::change_speed;

/// Clamps a user-supplied parameter into its declared range.
///
/// Non-finite values fall back to `fallback` — a NaN gain would otherwise
/// silently corrupt every downstream buffer.
pub(crate) fn sanitize_param(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        #[cfg(feature = "tracing")]
        tracing::warn!(value, fallback, "non-finite kernel parameter clamped");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_param;

    #[test]
    fn sanitize_clamps_range() {
        assert_eq!(sanitize_param(5.0, 0.0, 2.0, 1.0), 2.0);
        assert_eq!(sanitize_param(-1.0, 0.0, 2.0, 1.0), 0.0);
        assert_eq!(sanitize_param(1.5, 0.0, 2.0, 1.0), 1.5);
    }

    #[test]
    fn sanitize_replaces_non_finite() {
        assert_eq!(sanitize_param(f32::NAN, 0.0, 2.0, 1.0), 1.0);
        assert_eq!(sanitize_param(f32::INFINITY, 0.0, 2.0, 1.0), 1.0);
        assert_eq!(sanitize_param(f32::NEG_INFINITY, 0.0, 2.0, 1.0), 1.0);
    }
}
