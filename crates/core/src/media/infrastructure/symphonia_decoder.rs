use std::fs::File;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::audio::domain::signal::{Signal, SignalError};
use crate::audio::infrastructure::resampler::{resample, ResamplingError};
use crate::media::domain::audio_decoder::AudioDecoder;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode audio: {0}")]
    Format(#[from] SymphoniaError),
    #[error("no supported audio track")]
    NoAudioTrack,
    #[error("audio track has no sample rate")]
    MissingSampleRate,
    #[error("decoded channels are inconsistent: {0}")]
    Channels(#[from] SignalError),
    #[error(transparent)]
    Resample(#[from] ResamplingError),
}

/// Decodes wav, flac, mp3 and ogg/vorbis files with symphonia.
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    fn read(&self, path: &Path, target_sample_rate: u32, mono: bool) -> Result<Signal, DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }
        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;

        let mut format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(DecodeError::NoAudioTrack)?;
        let track_id = track.id;
        let native_rate = track
            .codec_params
            .sample_rate
            .ok_or(DecodeError::MissingSampleRate)?;
        let declared_channels = track.codec_params.channels.map_or(1, |c| c.count());

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())?;

        let mut channels: Vec<Vec<f32>> = vec![Vec::new(); declared_channels];
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break
                }
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) => {
                    log::warn!("Skipping corrupt packet in {}: {msg}", path.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let count = spec.channels.count();
            if count == 0 {
                continue;
            }
            let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buffer.copy_interleaved_ref(decoded);

            if channels.len() != count {
                channels.resize(count, Vec::new());
            }
            for frame in buffer.samples().chunks_exact(count) {
                for (channel, &sample) in channels.iter_mut().zip(frame) {
                    channel.push(sample);
                }
            }
        }

        let mut signal = Signal::from_channels(channels, native_rate)?;
        if mono {
            signal = signal.to_mono();
        }
        log::debug!(
            "Decoded {}: {} channel(s), {} frames at {} Hz",
            path.display(),
            signal.channels(),
            signal.len(),
            native_rate
        );
        Ok(resample(&signal, target_sample_rate)?)
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(
        &self,
        path: &Path,
        target_sample_rate: u32,
        mono: bool,
    ) -> Result<Signal, Box<dyn std::error::Error>> {
        Ok(self.read(path, target_sample_rate, mono)?)
    }
}
