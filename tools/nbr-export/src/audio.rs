//! Audio conversion.
//!
//! WAV goes through hound; MP3 and OGG decode through symphonia. Every
//! source resolves to interleaved signed 16-bit PCM, so the payload's
//! format byte is always `I16`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use boreal_common::{AudioFormat, NbrAudio};

/// Convert a WAV/MP3/OGG file into an audio payload.
pub fn convert_audio(input: &Path) -> Result<NbrAudio> {
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let (samples, channels, sample_rate) = match extension.as_str() {
        "wav" => decode_wav(input)?,
        "mp3" | "ogg" => decode_compressed(input, &extension)?,
        other => bail!("'{other}' is not a supported audio format"),
    };

    if channels == 0 || channels > u8::MAX as usize {
        bail!("audio has an unusable channel count ({channels})");
    }

    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    tracing::info!(
        "converted audio '{}': {} Hz, {channels} channels, {} samples",
        input.display(),
        sample_rate,
        samples.len()
    );

    Ok(NbrAudio {
        format: AudioFormat::I16,
        sample_rate,
        channels: channels as u8,
        samples: bytes,
    })
}

fn decode_wav(input: &Path) -> Result<(Vec<i16>, usize, u32)> {
    let mut reader = hound::WavReader::open(input)
        .with_context(|| format!("failed to read WAV file '{}'", input.display()))?;
    let spec = reader.spec();

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => match spec.bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| (v as i16) << 8))
                .collect::<Result<_, _>>()?,
            16 => reader.samples::<i16>().collect::<Result<_, _>>()?,
            24 | 32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> (spec.bits_per_sample - 16)) as i16))
                .collect::<Result<_, _>>()?,
            other => bail!("unsupported WAV bit depth {other}"),
        },
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<Result<_, _>>()?,
    };

    Ok((samples, spec.channels as usize, spec.sample_rate))
}

fn decode_compressed(input: &Path, extension: &str) -> Result<(Vec<i16>, usize, u32)> {
    let file = std::fs::File::open(input)
        .with_context(|| format!("failed to open audio file '{}'", input.display()))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(extension);

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .with_context(|| format!("failed to probe audio file '{}'", input.display()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .context("no decodable audio track")?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("no decoder for audio track")?;

    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
    let mut channels = track
        .codec_params
        .channels
        .map(|channels| channels.count())
        .unwrap_or(2);

    let mut samples: Vec<i16> = Vec::new();
    let mut sample_buffer: Option<SampleBuffer<i16>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(err).context("failed to read audio packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_buffer.is_none() {
                    let spec = *decoded.spec();
                    sample_rate = spec.rate;
                    channels = spec.channels.count();
                    sample_buffer = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                if let Some(buffer) = &mut sample_buffer {
                    buffer.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buffer.samples());
                }
            }
            // A corrupt frame is skippable; anything else is fatal.
            Err(SymphoniaError::DecodeError(err)) => {
                tracing::warn!("skipping undecodable frame in '{}': {err}", input.display());
            }
            Err(err) => return Err(err).context("audio decode failed"),
        }
    }

    if samples.is_empty() {
        bail!("'{}' decoded to zero samples", input.display());
    }

    Ok((samples, channels, sample_rate))
}
