//! Audio decoder using symphonia
//!
//! Decodes a source file (MP3, FLAC, AAC, Vorbis, WAV) to interleaved 16-bit
//! PCM, the working format of the gain cascade. Mono sources are duplicated to
//! stereo; everything else keeps its channel interleave.

use crate::error::{Error, Result};
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// A fully decoded track held in memory for playout.
#[derive(Debug)]
pub struct DecodedTrack {
    /// Interleaved 16-bit PCM samples
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedTrack {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> u64 {
        self.samples.len() as u64 / u64::from(self.channels)
    }

    /// Total duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() * 1000 / u64::from(self.sample_rate)
    }
}

/// Whole-file decoder for the playback renderer.
pub struct TrackDecoder;

impl TrackDecoder {
    /// Decode an entire audio file to interleaved 16-bit PCM.
    ///
    /// # Errors
    /// - Failed to open file
    /// - Unsupported audio format
    /// - Decode error
    pub fn decode_file(path: &Path) -> Result<DecodedTrack> {
        debug!("Decoding file: {}", path.display());

        let file = std::fs::File::open(path)
            .map_err(|e| Error::Decode(format!("Failed to open file {}: {}", path.display(), e)))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Hint the format registry with the file extension
        let mut hint = Hint::new();
        if let Some(extension) = path.extension() {
            if let Some(ext_str) = extension.to_str() {
                hint.with_extension(ext_str);
            }
        }

        let format_opts = FormatOptions::default();
        let metadata_opts = MetadataOptions::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &metadata_opts)
            .map_err(|e| Error::Decode(format!("Failed to probe format: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| Error::Decode("Sample rate not found".to_string()))?;

        let channels = codec_params
            .channels
            .map(|c| c.count() as u16)
            .ok_or_else(|| Error::Decode("Channel count not found".to_string()))?;

        debug!("Audio format: sample_rate={}, channels={}", sample_rate, channels);

        let decoder_opts = DecoderOptions::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &decoder_opts)
            .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

        let mut samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    debug!("Reached end of file");
                    break;
                }
                Err(e) => {
                    warn!("Error reading packet: {}", e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => Self::append_interleaved_i16(&decoded, &mut samples),
                Err(e) => {
                    warn!("Decode error: {}", e);
                    continue;
                }
            }
        }

        // Duplicate mono to stereo so the output stage always sees two channels
        let channels = if channels == 1 {
            samples = samples.iter().flat_map(|&s| [s, s]).collect();
            2
        } else {
            channels
        };

        debug!(
            "Decoded {} samples ({} frames)",
            samples.len(),
            samples.len() / channels as usize
        );

        Ok(DecodedTrack {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Convert a decoded symphonia buffer to interleaved i16 samples.
    fn append_interleaved_i16(decoded: &AudioBufferRef, output: &mut Vec<i16>) {
        match decoded {
            AudioBufferRef::F32(buf) => Self::interleave(buf, output, |s| quantize(s)),
            AudioBufferRef::F64(buf) => Self::interleave(buf, output, |s| quantize(s as f32)),
            AudioBufferRef::S16(buf) => Self::interleave(buf, output, |s| s),
            AudioBufferRef::S32(buf) => Self::interleave(buf, output, |s| (s >> 16) as i16),
            AudioBufferRef::S24(buf) => {
                Self::interleave(buf, output, |s| (s.inner() >> 8) as i16)
            }
            AudioBufferRef::S8(buf) => Self::interleave(buf, output, |s| i16::from(s) << 8),
            AudioBufferRef::U8(buf) => {
                Self::interleave(buf, output, |s| (i16::from(s) - 128) << 8)
            }
            AudioBufferRef::U16(buf) => {
                Self::interleave(buf, output, |s| (i32::from(s) - 32_768) as i16)
            }
            AudioBufferRef::U24(buf) => {
                Self::interleave(buf, output, |s| ((s.inner() as i32 - 8_388_608) >> 8) as i16)
            }
            AudioBufferRef::U32(buf) => {
                Self::interleave(buf, output, |s| ((i64::from(s) - 2_147_483_648) >> 16) as i16)
            }
        }
    }

    /// Interleave a planar buffer, converting each sample with `to_i16`.
    fn interleave<T: Copy + symphonia::core::sample::Sample>(
        buf: &AudioBuffer<T>,
        output: &mut Vec<i16>,
        to_i16: impl Fn(T) -> i16,
    ) {
        let num_channels = buf.spec().channels.count();
        let num_frames = buf.frames();

        output.reserve(num_frames * num_channels);
        for frame_idx in 0..num_frames {
            for ch_idx in 0..num_channels {
                output.push(to_i16(buf.chan(ch_idx)[frame_idx]));
            }
        }
    }
}

/// Quantize a normalized f32 sample to i16 with saturation.
fn quantize(sample: f32) -> i16 {
    (sample * 32_767.0).round().clamp(-32_768.0, 32_767.0) as i16
}
