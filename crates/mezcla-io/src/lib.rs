//! WAV codec boundary for the mezcla engine.
//!
//! Inside the graph, audio is always a planar f32 [`SampleBuffer`]; this
//! crate owns the only two crossings of that boundary:
//!
//! - **Intake**: [`decode_wav`] / [`decode_clip`] turn WAV bytes into
//!   buffers that seed Source nodes
//! - **Export**: [`export_final`] evaluates a target node and encodes its
//!   output with [`encode_wav`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mezcla_io::{decode_clip, export_final, write_wav_file};
//!
//! let clip = decode_clip(&std::fs::read("input.wav")?, "input.wav")?;
//! graph.set_source_clips(source, vec![clip])?;
//! let bytes = export_final(&mut graph, target, 16)?;
//! std::fs::write("output.wav", bytes)?;
//! ```

mod export;
mod wav;

pub use export::export_final;
pub use wav::{decode_clip, decode_wav, encode_wav, read_wav_file, write_wav_file};

use mezcla_core::{BufferError, GraphError, Warning};

/// Error types for codec and export operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or truncated WAV container.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The WAV stream uses a bit depth the codec does not handle.
    #[error("unsupported bit depth: {0} (supported: 16, 24, 32-float)")]
    UnsupportedBitDepth(u16),

    /// The WAV stream decodes to zero audio frames.
    #[error("WAV stream contains no audio frames")]
    EmptyStream,

    /// Decoded data did not form a valid buffer.
    #[error("invalid buffer: {0}")]
    InvalidBuffer(#[from] BufferError),

    /// Graph-level failure while evaluating the export target.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// The export target declined to produce output.
    #[error("export target produced no output (warning: {warning:?})")]
    NoOutput {
        /// The warning the target surfaced instead of output.
        warning: Warning,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for codec and export operations.
pub type Result<T> = std::result::Result<T, Error>;
