// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::get_codecs;
use symphonia::default::get_probe;

use super::decoded::DecodedAudio;
use super::error::AudioError;
use super::format::BitDepth;

/// A decode capability injected into the chain builder. The builder never
/// parses containers or codecs itself; it only consumes DecodedAudio.
pub trait Decoder: Send + Sync {
    /// Decodes the audio file at the given path entirely into memory.
    fn decode(&self, path: &Path) -> Result<DecodedAudio, AudioError>;
}

/// Decodes audio files (WAV, FLAC, AIFF, MP3, ...) using symphonia.
#[derive(Debug, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    pub fn new() -> Self {
        SymphoniaDecoder
    }
}

impl Decoder for SymphoniaDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio, AudioError> {
        decode_file(path)
    }
}

fn decode_error(path: &Path, reason: impl ToString) -> AudioError {
    AudioError::Decode(path.display().to_string(), reason.to_string())
}

/// Decodes a complete file to interleaved f32 samples. Unlike a streaming
/// player, sample chains need the whole buffer in memory anyway, so this
/// drains all packets in one pass.
fn decode_file(path: &Path) -> Result<DecodedAudio, AudioError> {
    // Open the file (include path in error so the user sees which file failed)
    let path_ref = path;
    let file = File::open(path_ref).map_err(|e| {
        AudioError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path_ref.display(), e),
        ))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Create a hint to help the format registry guess the format
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    // Probe the format
    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| decode_error(path, e))?;

    let mut format_reader = probed.format;

    // Find the first audio track
    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_error(path, "no audio track found"))?;

    let track_id = track.id;
    let params = &track.codec_params;

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| decode_error(path, "sample rate not specified"))?;

    // Determine the decode-time bit depth. Float codecs map to Float32;
    // integer codecs report their bit count (defaulting to 16 when the
    // container omits it, e.g. MP3).
    let is_float = matches!(
        params.codec,
        symphonia::core::codecs::CODEC_TYPE_PCM_F32LE
            | symphonia::core::codecs::CODEC_TYPE_PCM_F32BE
            | symphonia::core::codecs::CODEC_TYPE_PCM_F64LE
            | symphonia::core::codecs::CODEC_TYPE_PCM_F64BE
    );
    let bit_depth = if is_float {
        BitDepth::Float32
    } else if params.bits_per_sample == Some(24) {
        BitDepth::Pcm24
    } else {
        BitDepth::Pcm16
    };

    // Channels from container metadata if present; otherwise derived from
    // the first decoded buffer below.
    let mut channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);

    let decoder_opts: DecoderOptions = Default::default();
    let mut decoder = get_codecs()
        .make(params, &decoder_opts)
        .map_err(|e| decode_error(path, e))?;

    let mut frames: Vec<f32> = Vec::new();
    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // End of file - we're done reading
                break;
            }
            Err(SymphoniaError::DecodeError(_)) => {
                // Some decoders return DecodeError at EOF instead of IoError
                break;
            }
            Err(e) => return Err(decode_error(path, e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                match decoder.decode(&packet) {
                    Ok(decoded) => decoded,
                    Err(e) => return Err(decode_error(path, e)),
                }
            }
            Err(e) => return Err(decode_error(path, e)),
        };

        let (samples, decoded_channels) = interleave_to_f32(decoded);
        if channels == 0 {
            channels = decoded_channels as u16;
        }
        frames.extend_from_slice(&samples);
    }

    if channels == 0 {
        return Err(decode_error(path, "channel count not specified"));
    }
    if channels > 2 {
        return Err(AudioError::UnsupportedChannelLayout(channels));
    }

    Ok(DecodedAudio::new(sample_rate, bit_depth, channels, frames))
}

/// Converts a decoded AudioBufferRef to a Vec<f32> of interleaved samples
/// and returns the channel count as observed in the decoded buffer.
fn interleave_to_f32(decoded: AudioBufferRef) -> (Vec<f32>, usize) {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_planar(&buf, |sample| sample),
        AudioBufferRef::F64(buf) => interleave_planar(&buf, |sample| sample as f32),
        AudioBufferRef::S8(buf) => interleave_planar(&buf, scale_s8),
        AudioBufferRef::S16(buf) => interleave_planar(&buf, scale_s16),
        AudioBufferRef::S24(buf) => interleave_planar(&buf, |sample| scale_s24(sample.inner())),
        AudioBufferRef::S32(buf) => interleave_planar(&buf, scale_s32),
        AudioBufferRef::U8(buf) => interleave_planar(&buf, scale_u8),
        AudioBufferRef::U16(buf) => interleave_planar(&buf, scale_u16),
        AudioBufferRef::U24(buf) => interleave_planar(&buf, |sample| scale_u24(sample.inner())),
        AudioBufferRef::U32(buf) => interleave_planar(&buf, scale_u32),
    }
}

/// Helper to interleave planar samples from a generic AudioBuffer.
/// The closure receives a single sample value and returns the f32 sample value.
fn interleave_planar<T, F>(buf: &AudioBuffer<T>, convert: F) -> (Vec<f32>, usize)
where
    T: symphonia::core::sample::Sample,
    F: Fn(T) -> f32,
{
    let frames = buf.frames();
    let channels = buf.spec().channels.count();
    let planes = buf.planes();
    let mut samples = Vec::with_capacity(frames * channels);
    for frame_idx in 0..frames {
        for ch_idx in 0..channels {
            samples.push(convert(planes.planes()[ch_idx][frame_idx]));
        }
    }
    (samples, channels)
}

// Scaling helpers for all integer formats. These are `pub(crate)` so they can
// be validated directly in unit tests.

#[inline]
pub(crate) fn scale_s8(sample: i8) -> f32 {
    sample as f32 / (1i64 << 7) as f32
}

#[inline]
pub(crate) fn scale_s16(sample: i16) -> f32 {
    sample as f32 / (1i64 << 15) as f32
}

#[inline]
pub(crate) fn scale_s24(sample: i32) -> f32 {
    sample as f32 / (1i64 << 23) as f32
}

#[inline]
pub(crate) fn scale_s32(sample: i32) -> f32 {
    sample as f32 / (1i64 << 31) as f32
}

#[inline]
pub(crate) fn scale_u8(sample: u8) -> f32 {
    (sample as f32 / u8::MAX as f32) * 2.0 - 1.0
}

#[inline]
pub(crate) fn scale_u16(sample: u16) -> f32 {
    (sample as f32 / u16::MAX as f32) * 2.0 - 1.0
}

#[inline]
pub(crate) fn scale_u24(sample: u32) -> f32 {
    let max = (1u32 << 24) - 1;
    (sample as f32 / max as f32) * 2.0 - 1.0
}

#[inline]
pub(crate) fn scale_u32(sample: u32) -> f32 {
    (sample as f32 / u32::MAX as f32) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_bounds() {
        assert_eq!(scale_s16(0), 0.0);
        assert!((scale_s16(i16::MAX) - 1.0).abs() < 0.001);
        assert_eq!(scale_s16(i16::MIN), -1.0);

        assert_eq!(scale_s8(i8::MIN), -1.0);
        assert_eq!(scale_s24(-(1 << 23)), -1.0);
        assert_eq!(scale_s32(i32::MIN), -1.0);

        assert!((scale_u8(u8::MAX) - 1.0).abs() < 0.001);
        assert!((scale_u8(0) + 1.0).abs() < 0.001);
        assert!((scale_u16(u16::MAX / 2)).abs() < 0.001);
        assert!((scale_u24((1 << 24) - 1) - 1.0).abs() < 0.001);
        assert!((scale_u32(u32::MAX) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_decode_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        crate::testutil::write_wav_i16(
            &path,
            &[vec![0i16, 8192, -8192, 16384], vec![0i16, -8192, 8192, -16384]],
            44100,
        );

        let decoder = SymphoniaDecoder::new();
        let audio = decoder.decode(&path).unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.bit_depth, BitDepth::Pcm16);
        assert_eq!(audio.frame_count(), 4);
        // First frame of each channel should match the written samples.
        assert!((audio.frames[0] - 0.0).abs() < 0.001);
        assert!((audio.frames[2] - 0.25).abs() < 0.001);
        assert!((audio.frames[3] + 0.25).abs() < 0.001);
    }

    #[test]
    fn test_decode_missing_file() {
        let decoder = SymphoniaDecoder::new();
        let result = decoder.decode(Path::new("/nonexistent/sample.wav"));
        assert!(matches!(result, Err(AudioError::IoError(_))));
    }
}
