//! Buffer concatenation.
//!
//! Appends `b` after `a`. The first input is dominant: the output keeps `a`'s
//! sample rate, and `b` is resampled to it when the rates differ. Channel
//! counts are reconciled to the wider of the two; the narrower buffer's
//! missing channels are filled per the environment's
//! [`ChannelFill`](crate::ChannelFill) policy (duplicate-last-channel by
//! default) rather than silently dropped.

use std::borrow::Cow;

use super::resample::resample_to_rate;
use crate::buffer::SampleBuffer;
use crate::env::{AudioEnvironment, ChannelFill};

/// Concatenates two buffers: output frames = `len(a) + len(b)`.
pub fn concat(a: &SampleBuffer, b: &SampleBuffer, env: &AudioEnvironment) -> SampleBuffer {
    let b: Cow<'_, SampleBuffer> = if b.sample_rate() == a.sample_rate() {
        Cow::Borrowed(b)
    } else {
        Cow::Owned(resample_to_rate(b, a.sample_rate()))
    };

    let channel_count = a.channel_count().max(b.channel_count());
    let mut channels = Vec::with_capacity(channel_count);
    for ch in 0..channel_count {
        let mut samples = Vec::with_capacity(a.len() + b.len());
        extend_from(&mut samples, a, ch, env.channel_fill);
        extend_from(&mut samples, &b, ch, env.channel_fill);
        channels.push(samples);
    }

    SampleBuffer::from_validated(channels, a.sample_rate())
}

/// Appends channel `ch` of `buf`, widening per the fill policy when `buf`
/// has fewer channels.
fn extend_from(out: &mut Vec<f32>, buf: &SampleBuffer, ch: usize, fill: ChannelFill) {
    if ch < buf.channel_count() {
        out.extend_from_slice(buf.channel(ch));
    } else {
        match fill {
            ChannelFill::DuplicateLast => {
                out.extend_from_slice(buf.channel(buf.channel_count() - 1));
            }
            ChannelFill::Silence => out.extend(std::iter::repeat_n(0.0, buf.len())),
        }
    }
}
