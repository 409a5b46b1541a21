//! Linear fade-in / fade-out envelopes.

use super::sanitize_param;
use crate::buffer::SampleBuffer;

/// Longest selectable fade in seconds.
pub const MAX_FADE_SECS: f32 = 60.0;

/// Applies linear ramps at both ends of `input`.
///
/// The fade-in ramps from 0 at the first sample; the fade-out reaches 0 at
/// the last sample. Fade lengths are clamped to the buffer; when the two
/// ramps overlap their gains multiply.
pub fn fade(input: &SampleBuffer, fade_in_secs: f32, fade_out_secs: f32) -> SampleBuffer {
    let sr = input.sample_rate() as f32;
    let fade_in = sanitize_param(fade_in_secs, 0.0, MAX_FADE_SECS, 0.0);
    let fade_out = sanitize_param(fade_out_secs, 0.0, MAX_FADE_SECS, 0.0);

    let len = input.len();
    let in_frames = ((fade_in * sr).round() as usize).min(len);
    let out_frames = ((fade_out * sr).round() as usize).min(len);

    let channels = input
        .channels()
        .iter()
        .map(|ch| {
            ch.iter()
                .enumerate()
                .map(|(i, &s)| {
                    let mut g = 1.0f32;
                    if in_frames > 0 && i < in_frames {
                        g *= i as f32 / in_frames as f32;
                    }
                    if out_frames > 0 && i >= len - out_frames {
                        g *= (len - 1 - i) as f32 / out_frames as f32;
                    }
                    s * g
                })
                .collect()
        })
        .collect();

    SampleBuffer::from_validated(channels, input.sample_rate())
}
