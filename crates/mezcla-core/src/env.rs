//! Explicit processing environment passed into kernels.
//!
//! Replaces any ambient global audio context: policy decisions that more than
//! one kernel needs (sample-rate defaults, channel widening) live in one
//! value the caller constructs and threads through the graph.

/// How the join kernel widens the narrower of two buffers when their channel
/// counts differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelFill {
    /// Duplicate the narrower buffer's last channel into the missing slots.
    #[default]
    DuplicateLast,
    /// Fill missing channels with silence.
    Silence,
}

/// Process-wide audio policy handed to kernels and the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioEnvironment {
    /// Sample rate assumed for buffers created without an explicit rate.
    pub default_sample_rate: u32,
    /// Channel widening policy for concatenation.
    pub channel_fill: ChannelFill,
}

impl Default for AudioEnvironment {
    fn default() -> Self {
        Self {
            default_sample_rate: 48000,
            channel_fill: ChannelFill::DuplicateLast,
        }
    }
}
