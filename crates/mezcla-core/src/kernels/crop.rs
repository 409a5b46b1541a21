//! Cropping a time window out of a buffer.

use crate::buffer::SampleBuffer;

/// Keeps the window `[start_secs, end_secs)` of `input`.
///
/// The window is clamped to the buffer; non-finite endpoints fall back to
/// the full extent. An empty or inverted window yields a zero-frame buffer
/// with the original channel count and rate.
pub fn crop(input: &SampleBuffer, start_secs: f32, end_secs: f32) -> SampleBuffer {
    let sr = f64::from(input.sample_rate());
    let duration = input.duration_secs();

    let start = if start_secs.is_finite() {
        f64::from(start_secs).clamp(0.0, duration)
    } else {
        0.0
    };
    let end = if end_secs.is_finite() {
        f64::from(end_secs).clamp(0.0, duration)
    } else {
        duration
    };

    let start_frame = ((start * sr).round() as usize).min(input.len());
    let end_frame = ((end * sr).round() as usize).min(input.len());
    let (start_frame, end_frame) = if start_frame <= end_frame {
        (start_frame, end_frame)
    } else {
        (start_frame, start_frame)
    };

    let channels = input
        .channels()
        .iter()
        .map(|ch| ch[start_frame..end_frame].to_vec())
        .collect();

    SampleBuffer::from_validated(channels, input.sample_rate())
}
