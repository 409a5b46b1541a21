//! Multi-channel PCM sample buffers.
//!
//! [`SampleBuffer`] is the unit of audio every kernel consumes and produces:
//! one `Vec<f32>` per channel, all the same length, plus a sample rate. A
//! buffer is never mutated after construction — kernels allocate and return
//! new buffers, and the graph shares finished buffers downstream behind an
//! `Arc` so fan-out never copies sample data.

use std::sync::Arc;

/// Errors raised when constructing a [`SampleBuffer`] from raw channel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The channel list was empty.
    NoChannels,
    /// A channel's length differed from the first channel's.
    MismatchedChannelLengths {
        /// Index of the offending channel.
        channel: usize,
        /// Length of channel 0.
        expected: usize,
        /// Length of the offending channel.
        got: usize,
    },
    /// The sample rate was zero.
    ZeroSampleRate,
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoChannels => write!(f, "buffer must have at least one channel"),
            Self::MismatchedChannelLengths {
                channel,
                expected,
                got,
            } => write!(
                f,
                "channel {channel} has {got} samples, expected {expected}"
            ),
            Self::ZeroSampleRate => write!(f, "sample rate must be positive"),
        }
    }
}

impl std::error::Error for BufferError {}

/// Immutable multi-channel PCM data with a sample rate.
///
/// # Invariants
///
/// - At least one channel.
/// - Every channel has the same length (the frame count).
/// - `sample_rate > 0`.
///
/// Both are checked once by [`new()`](Self::new); every accessor and kernel
/// may rely on them afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Creates a buffer from per-channel sample vectors.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if the channel list is empty, channel lengths
    /// differ, or the sample rate is zero.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, BufferError> {
        if channels.is_empty() {
            return Err(BufferError::NoChannels);
        }
        if sample_rate == 0 {
            return Err(BufferError::ZeroSampleRate);
        }
        let expected = channels[0].len();
        for (i, ch) in channels.iter().enumerate().skip(1) {
            if ch.len() != expected {
                return Err(BufferError::MismatchedChannelLengths {
                    channel: i,
                    expected,
                    got: ch.len(),
                });
            }
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Creates a mono buffer.
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, BufferError> {
        Self::new(vec![samples], sample_rate)
    }

    /// Creates a buffer of silence with the given shape.
    pub fn silence(channels: usize, frames: usize, sample_rate: u32) -> Result<Self, BufferError> {
        Self::new(vec![vec![0.0; frames]; channels.max(1)], sample_rate)
    }

    /// Internal constructor for kernels that build channels with the
    /// invariants already guaranteed by construction.
    pub(crate) fn from_validated(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        debug_assert!(!channels.is_empty());
        debug_assert!(sample_rate > 0);
        debug_assert!(channels.iter().all(|c| c.len() == channels[0].len()));
        Self {
            channels,
            sample_rate,
        }
    }

    /// Number of sample frames (samples per channel).
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Returns true if the buffer holds zero frames.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds, derived from frame count and sample rate.
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / f64::from(self.sample_rate)
    }

    /// Samples of one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= channel_count()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// All channels, outermost index first.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Largest absolute sample value across all channels (0.0 for empty).
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flat_map(|ch| ch.iter())
            .fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}

/// A sample buffer travelling through the graph together with its label.
///
/// The label carries the originating filename (or a derived name such as
/// `"a.wav + b.wav"` after a join) so the UI can attribute each buffer at a
/// multi-value port. Buffers are shared, not copied: cloning a clip clones
/// the `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// The shared, immutable sample data.
    pub buffer: Arc<SampleBuffer>,
    /// Display label, typically the source filename.
    pub label: String,
}

impl AudioClip {
    /// Wraps a buffer and a label into a clip.
    pub fn new(buffer: SampleBuffer, label: impl Into<String>) -> Self {
        Self {
            buffer: Arc::new(buffer),
            label: label.into(),
        }
    }
}
