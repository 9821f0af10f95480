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
use rubato::{
    SincFixedIn, SincInterpolationParameters, SincInterpolationType, VecResampler, WindowFunction,
};

use super::error::AudioError;

// Import VecResampler trait to bring methods into scope for method resolution
#[allow(unused_imports)]
use rubato::VecResampler as _;

/// Input block size for the sinc resampler.
const INPUT_BLOCK_SIZE: usize = 1024;

/// Resamples interleaved samples from source_rate to target_rate using a
/// windowed-sinc resampler. The output length is exactly
/// floor(frame_count * target_rate / source_rate) frames; the resampler's
/// startup delay is trimmed so onsets stay aligned with the source. The
/// conversion is deterministic for identical inputs.
pub fn resample(
    frames: &[f32],
    channels: u16,
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, AudioError> {
    if source_rate == target_rate {
        return Ok(frames.to_vec());
    }
    if channels == 0 {
        return Err(AudioError::UnsupportedChannelLayout(0));
    }

    let num_channels = channels as usize;
    let source_frames = frames.len() / num_channels;
    // Frame arithmetic is integer; fractional frames round down.
    let expected_frames =
        (source_frames as u64 * target_rate as u64 / source_rate as u64) as usize;
    if source_frames == 0 {
        return Ok(Vec::new());
    }

    let sinc_params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        oversampling_factor: 128,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };
    let resample_ratio = target_rate as f64 / source_rate as f64;

    let mut resampler = SincFixedIn::<f32>::new(
        resample_ratio,
        1.0,
        sinc_params,
        INPUT_BLOCK_SIZE,
        num_channels,
    )
    .map_err(|_e| AudioError::ResamplingFailed(source_rate, target_rate))?;

    let delay = resampler.output_delay();
    let mut scratch = resampler.output_buffer_allocate(true);

    // Deinterleave into the sliding-window planar buffer the resampler
    // consumes from.
    let mut input: Vec<Vec<f32>> = vec![Vec::with_capacity(source_frames); num_channels];
    for frame in frames.chunks_exact(num_channels) {
        for (ch, sample) in frame.iter().enumerate() {
            input[ch].push(*sample);
        }
    }

    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected_frames + delay); num_channels];

    // Process full input blocks.
    loop {
        let needed = resampler.input_frames_next();
        if input[0].len() < needed {
            break;
        }
        let (consumed, produced) = resampler
            .process_into_buffer(&input, &mut scratch, None)
            .map_err(|_e| AudioError::ResamplingFailed(source_rate, target_rate))?;
        for (ch, out_ch) in output.iter_mut().enumerate() {
            out_ch.extend_from_slice(&scratch[ch][..produced]);
        }
        for ch in input.iter_mut() {
            ch.drain(..consumed);
        }
    }

    // Flush the remaining partial block.
    if !input[0].is_empty() {
        let (_consumed, produced) = resampler
            .process_partial_into_buffer(Some(&input as &[Vec<f32>]), &mut scratch, None)
            .map_err(|_e| AudioError::ResamplingFailed(source_rate, target_rate))?;
        for (ch, out_ch) in output.iter_mut().enumerate() {
            out_ch.extend_from_slice(&scratch[ch][..produced]);
        }
        for ch in input.iter_mut() {
            ch.clear();
        }
    }

    // Keep flushing until the delay-trimmed output covers the expected
    // length or the resampler runs dry.
    while output[0].len() < delay + expected_frames {
        let (_consumed, produced) = resampler
            .process_partial_into_buffer(None::<&[Vec<f32>]>, &mut scratch, None)
            .map_err(|_e| AudioError::ResamplingFailed(source_rate, target_rate))?;
        if produced == 0 {
            break;
        }
        for (ch, out_ch) in output.iter_mut().enumerate() {
            out_ch.extend_from_slice(&scratch[ch][..produced]);
        }
    }

    // Trim the startup delay, clamp to the expected length, and re-interleave.
    let mut interleaved = vec![0.0f32; expected_frames * num_channels];
    for (ch, out_ch) in output.iter().enumerate() {
        for frame_idx in 0..expected_frames {
            if let Some(sample) = out_ch.get(delay + frame_idx) {
                interleaved[frame_idx * num_channels + ch] = *sample;
            }
        }
    }

    Ok(interleaved)
}
