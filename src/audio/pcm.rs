//! PCM codec: base64-encoded 16-bit PCM decoding and WAV encoding.
//!
//! The decode side handles the mono 24 kHz linear PCM produced by the
//! external speech-synthesis service; the encode side writes a canonical
//! RIFF/WAVE container so exported audio plays in any standard decoder.
//! Neither side depends on the theory model.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hound::{SampleFormat, WavSpec, WavWriter};
use rodio::buffer::SamplesBuffer;
use std::io::Cursor;
use thiserror::Error;

/// Sample rate of the upstream speech-synthesized audio (mono).
pub const SPEECH_SAMPLE_RATE: u32 = 24000;

/// Errors surfaced when externally supplied audio cannot be decoded.
///
/// These must reach the caller so it can show a "could not load audio"
/// state for the affected stem; the codec never retries.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed base64 audio payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("PCM byte length {len} is not a multiple of the {frame}-byte frame size")]
    TruncatedPcm { len: usize, frame: usize },
    #[error("channel count must be at least 1")]
    NoChannels,
}

/// Errors from WAV encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("WAV write failed: {0}")]
    Wav(#[from] hound::Error),
    #[error("channel count must be at least 1")]
    NoChannels,
}

/// Decoded audio: one normalized f32 sample vector per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioSampleBuffer {
    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns one channel's samples, normalized to [-1.0, 1.0].
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Returns the number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Reconstructs the interleaved i16 samples this buffer was decoded
    /// from. This is the exact inverse of the decode normalization, so
    /// decode-then-reencode is lossless for 16-bit PCM input.
    pub fn interleaved_i16(&self) -> Vec<i16> {
        let mut samples = Vec::with_capacity(self.frame_count() * self.channel_count());
        for frame in 0..self.frame_count() {
            for channel in &self.channels {
                samples.push((channel[frame] * 32768.0).clamp(-32768.0, 32767.0) as i16);
            }
        }
        samples
    }

    /// Builds a playback source for the audio output graph.
    pub fn to_source(&self) -> SamplesBuffer<f32> {
        let mut interleaved = Vec::with_capacity(self.frame_count() * self.channel_count());
        for frame in 0..self.frame_count() {
            for channel in &self.channels {
                interleaved.push(channel[frame]);
            }
        }
        SamplesBuffer::new(self.channel_count() as u16, self.sample_rate, interleaved)
    }
}

/// Decodes a base64 string (standard alphabet) to raw bytes.
///
/// # Errors
///
/// [`DecodeError::Base64`] on malformed input.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(BASE64.decode(payload)?)
}

/// Decodes little-endian signed 16-bit PCM bytes into per-channel
/// normalized samples.
///
/// Samples are deinterleaved by channel and divided by 32768 to land in
/// [-1.0, 1.0].
///
/// # Errors
///
/// [`DecodeError::TruncatedPcm`] when the byte length is not a multiple
/// of `channels * 2`; [`DecodeError::NoChannels`] for zero channels.
pub fn decode_pcm(
    bytes: &[u8],
    sample_rate: u32,
    channels: usize,
) -> Result<AudioSampleBuffer, DecodeError> {
    if channels == 0 {
        return Err(DecodeError::NoChannels);
    }
    let frame = channels * 2;
    if bytes.len() % frame != 0 {
        return Err(DecodeError::TruncatedPcm {
            len: bytes.len(),
            frame,
        });
    }

    let frame_count = bytes.len() / frame;
    let mut out: Vec<Vec<f32>> = (0..channels)
        .map(|_| Vec::with_capacity(frame_count))
        .collect();
    for (i, pair) in bytes.chunks_exact(2).enumerate() {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        out[i % channels].push(sample as f32 / 32768.0);
    }

    Ok(AudioSampleBuffer {
        channels: out,
        sample_rate,
    })
}

/// Converts a normalized float sample to i16 for export.
///
/// Clamps to [-1.0, 1.0] first; negative values scale by 32768 and
/// non-negative values by 32767, so +1.0 cannot overflow.
pub fn sample_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}

/// Encodes 16-bit PCM samples into a complete in-memory WAV file.
///
/// The output carries the canonical 44-byte RIFF/WAVE PCM header (fmt
/// chunk length 16, format tag 1, block align `channels * 2`, byte rate
/// `sample_rate * block_align`) followed by the little-endian samples,
/// ready to hand to a file-save collaborator.
pub fn encode_wav(
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<Vec<u8>, EncodeError> {
    if channels == 0 {
        return Err(EncodeError::NoChannels);
    }
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(bytes)
}

/// Encodes normalized float samples into a WAV file, applying the
/// [`sample_to_i16`] clamping policy. Used for exporting synthesized or
/// decoded material.
pub fn encode_wav_f32(
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<Vec<u8>, EncodeError> {
    let converted: Vec<i16> = samples.iter().copied().map(sample_to_i16).collect();
    encode_wav(&converted, sample_rate, channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Length of the canonical RIFF/WAVE PCM header.
    const WAV_HEADER_LEN: usize = 44;

    fn le_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_decode_base64() {
        assert_eq!(decode_base64("AAD/fw==").unwrap(), vec![0, 0, 255, 127]);
        assert!(matches!(
            decode_base64("not valid!"),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_pcm_mono_normalization() {
        let bytes = le_bytes(&[0, 16384, -16384, -32768]);
        let buffer = decode_pcm(&bytes, SPEECH_SAMPLE_RATE, 1).unwrap();
        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.frame_count(), 4);
        assert_eq!(buffer.channel(0), [0.0, 0.5, -0.5, -1.0]);
    }

    #[test]
    fn test_decode_pcm_deinterleaves_stereo() {
        let bytes = le_bytes(&[100, -100, 200, -200]);
        let buffer = decode_pcm(&bytes, 44100, 2).unwrap();
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 2);
        assert_eq!(buffer.channel(0), [100.0 / 32768.0, 200.0 / 32768.0]);
        assert_eq!(buffer.channel(1), [-100.0 / 32768.0, -200.0 / 32768.0]);
    }

    #[test]
    fn test_decode_pcm_rejects_bad_lengths() {
        assert!(matches!(
            decode_pcm(&[0, 0, 0], 24000, 1),
            Err(DecodeError::TruncatedPcm { len: 3, frame: 2 })
        ));
        assert!(matches!(
            decode_pcm(&[0, 0], 24000, 2),
            Err(DecodeError::TruncatedPcm { len: 2, frame: 4 })
        ));
        assert!(matches!(
            decode_pcm(&[], 24000, 0),
            Err(DecodeError::NoChannels)
        ));
    }

    #[test]
    fn test_wav_header_is_canonical() {
        let bytes = encode_wav(&[0, 0, 0, 0], 24000, 1).unwrap();
        let data_len = 8u32;

        assert_eq!(bytes.len(), WAV_HEADER_LEN + data_len as usize);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(bytes[4..8], (36 + data_len).to_le_bytes());
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(bytes[16..20], 16u32.to_le_bytes());
        assert_eq!(bytes[20..22], 1u16.to_le_bytes()); // PCM format tag
        assert_eq!(bytes[22..24], 1u16.to_le_bytes()); // channels
        assert_eq!(bytes[24..28], 24000u32.to_le_bytes());
        assert_eq!(bytes[28..32], 48000u32.to_le_bytes()); // byte rate
        assert_eq!(bytes[32..34], 2u16.to_le_bytes()); // block align
        assert_eq!(bytes[34..36], 16u16.to_le_bytes()); // bits per sample
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(bytes[40..44], data_len.to_le_bytes());
    }

    #[test]
    fn test_decode_reencode_is_lossless() {
        let samples = [0i16, 1, -1, 12345, -12345, 32767, -32768];
        let pcm = le_bytes(&samples);

        let buffer = decode_pcm(&pcm, SPEECH_SAMPLE_RATE, 1).unwrap();
        assert_eq!(buffer.interleaved_i16(), samples);

        let wav = encode_wav(&buffer.interleaved_i16(), SPEECH_SAMPLE_RATE, 1).unwrap();
        assert_eq!(&wav[WAV_HEADER_LEN..], pcm.as_slice());
    }

    #[test]
    fn test_sample_to_i16_policy() {
        assert_eq!(sample_to_i16(0.0), 0);
        assert_eq!(sample_to_i16(1.0), 32767);
        assert_eq!(sample_to_i16(-1.0), -32768);
        assert_eq!(sample_to_i16(-0.5), -16384);
        // Out-of-range input clamps instead of wrapping
        assert_eq!(sample_to_i16(2.0), 32767);
        assert_eq!(sample_to_i16(-2.0), -32768);
    }

    #[test]
    fn test_to_source_shape() {
        let bytes = le_bytes(&[0, 16384, 0, -16384]);
        let buffer = decode_pcm(&bytes, 44100, 2).unwrap();
        let source = buffer.to_source();
        use rodio::Source;
        assert_eq!(source.channels(), 2);
        assert_eq!(source.sample_rate(), 44100);
    }
}
