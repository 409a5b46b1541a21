//! WAV decoding and encoding.
//!
//! Decoding accepts 16- and 24-bit integer PCM plus 32-bit IEEE float and
//! always yields planar f32; encoding is the inverse, selected by the same
//! bit-depth values. Anything else is refused rather than approximated.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};
use mezcla_core::{AudioClip, SampleBuffer};

use crate::{Error, Result};

/// Decodes WAV bytes into a planar buffer.
///
/// # Errors
///
/// [`Error::Wav`] for a malformed container,
/// [`Error::UnsupportedBitDepth`] for formats other than 16/24-bit int and
/// 32-bit float, and [`Error::EmptyStream`] for zero audio frames.
pub fn decode_wav(bytes: &[u8]) -> Result<SampleBuffer> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, bits @ (16 | 24)) => {
            let max_val = (1i32 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<_, _>>()?
        }
        (_, bits) => return Err(Error::UnsupportedBitDepth(bits)),
    };

    if channels == 0 || interleaved.is_empty() {
        return Err(Error::EmptyStream);
    }

    let frames = interleaved.len() / channels;
    let mut planar: Vec<Vec<f32>> = (0..channels).map(|_| Vec::with_capacity(frames)).collect();
    for frame in interleaved.chunks_exact(channels) {
        for (ch, &sample) in planar.iter_mut().zip(frame) {
            ch.push(sample);
        }
    }

    tracing::debug!(channels, frames, rate = spec.sample_rate, "wav_decode");
    Ok(SampleBuffer::new(planar, spec.sample_rate)?)
}

/// Decodes WAV bytes into a labeled clip ready to seed a Source node.
pub fn decode_clip(bytes: &[u8], label: impl Into<String>) -> Result<AudioClip> {
    Ok(AudioClip::new(decode_wav(bytes)?, label))
}

/// Encodes a buffer as WAV bytes.
///
/// `bits_per_sample` selects the stream format: 16 or 24 for integer PCM,
/// 32 for IEEE float. Output is deterministic for identical input.
pub fn encode_wav(buffer: &SampleBuffer, bits_per_sample: u16) -> Result<Vec<u8>> {
    if !matches!(bits_per_sample, 16 | 24 | 32) {
        return Err(Error::UnsupportedBitDepth(bits_per_sample));
    }

    let spec = hound::WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample,
        sample_format: if bits_per_sample == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        if bits_per_sample == 32 {
            for frame in 0..buffer.len() {
                for ch in buffer.channels() {
                    writer.write_sample(ch[frame])?;
                }
            }
        } else {
            let max_val = (1i32 << (bits_per_sample - 1)) as f32;
            for frame in 0..buffer.len() {
                for ch in buffer.channels() {
                    let int_sample =
                        (ch[frame] * max_val).round().clamp(-max_val, max_val - 1.0) as i32;
                    writer.write_sample(int_sample)?;
                }
            }
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Reads and decodes a WAV file.
pub fn read_wav_file<P: AsRef<Path>>(path: P) -> Result<SampleBuffer> {
    decode_wav(&std::fs::read(path)?)
}

/// Encodes a buffer and writes it to a WAV file.
pub fn write_wav_file<P: AsRef<Path>>(
    path: P,
    buffer: &SampleBuffer,
    bits_per_sample: u16,
) -> Result<()> {
    let bytes = encode_wav(buffer, bits_per_sample)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo(left: Vec<f32>, right: Vec<f32>) -> SampleBuffer {
        SampleBuffer::new(vec![left, right], 48000).unwrap()
    }

    #[test]
    fn roundtrip_f32_is_exact() {
        let input = stereo(
            (0..500).map(|i| (i as f32 / 500.0).sin()).collect(),
            (0..500).map(|i| (i as f32 / 500.0).cos()).collect(),
        );
        let decoded = decode_wav(&encode_wav(&input, 32).unwrap()).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn roundtrip_i16_preserves_exact_quantized_samples() {
        // Samples that originated from 16-bit PCM survive a second
        // round-trip bit-exactly.
        let quantized: Vec<f32> = [-32768, -12345, 0, 1, 20000, 32767]
            .iter()
            .map(|&v| v as f32 / 32768.0)
            .collect();
        let input = SampleBuffer::from_mono(quantized, 44100).unwrap();
        let decoded = decode_wav(&encode_wav(&input, 16).unwrap()).unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn roundtrip_i24_close() {
        let samples: Vec<f32> = (0..200).map(|i| (i as f32 / 200.0).sin() * 0.9).collect();
        let input = SampleBuffer::from_mono(samples.clone(), 48000).unwrap();
        let decoded = decode_wav(&encode_wav(&input, 24).unwrap()).unwrap();
        for (a, b) in samples.iter().zip(decoded.channel(0)) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn encode_is_deterministic() {
        let input = stereo(vec![0.1, 0.2, 0.3], vec![-0.1, -0.2, -0.3]);
        assert_eq!(encode_wav(&input, 16).unwrap(), encode_wav(&input, 16).unwrap());
    }

    #[test]
    fn unsupported_bit_depths_refused() {
        let input = SampleBuffer::from_mono(vec![0.0], 48000).unwrap();
        assert!(matches!(
            encode_wav(&input, 8),
            Err(Error::UnsupportedBitDepth(8))
        ));
        assert!(matches!(
            encode_wav(&input, 64),
            Err(Error::UnsupportedBitDepth(64))
        ));
    }

    #[test]
    fn garbage_bytes_are_a_container_error() {
        assert!(matches!(decode_wav(b"not a wav"), Err(Error::Wav(_))));
    }

    #[test]
    fn empty_stream_is_an_error() {
        // A structurally valid header with zero frames.
        let empty = SampleBuffer::from_mono(vec![0.0], 48000).unwrap();
        let mut bytes = encode_wav(&empty, 16).unwrap();
        // Truncating the data chunk to zero frames leaves a header-only file.
        bytes.truncate(44);
        bytes[40..44].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(decode_wav(&bytes), Err(Error::EmptyStream)));
    }

    #[test]
    fn decode_deinterleaves_channels() {
        let input = stereo(vec![0.25, 0.5], vec![-0.25, -0.5]);
        let decoded = decode_wav(&encode_wav(&input, 32).unwrap()).unwrap();
        assert_eq!(decoded.channel(0), &[0.25, 0.5]);
        assert_eq!(decoded.channel(1), &[-0.25, -0.5]);
    }

    #[test]
    fn file_roundtrip() {
        let input = SampleBuffer::from_mono(vec![0.1, -0.1, 0.2], 22050).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_wav_file(&path, &input, 32).unwrap();
        let loaded = read_wav_file(&path).unwrap();
        assert_eq!(loaded, input);
    }

    #[test]
    fn decode_clip_carries_label() {
        let input = SampleBuffer::from_mono(vec![0.5], 48000).unwrap();
        let clip = decode_clip(&encode_wav(&input, 16).unwrap(), "take3.wav").unwrap();
        assert_eq!(clip.label, "take3.wav");
    }
}
