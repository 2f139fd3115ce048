//! NBR audio payload: raw PCM with its sample format.
//!
//! # Layout
//! ```text
//! format      u8
//! sample_rate u32
//! channels    u8
//! size        u32
//! samples     [u8; size]
//! ```
//!
//! The format byte is authoritative: `size` must be a whole number of
//! samples of that width, and consumers size their buffers from it.

use std::io::{Read, Write};

use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

/// Per-sample PCM encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AudioFormat {
    U8 = 0,
    I16 = 1,
    F32 = 2,
}

impl AudioFormat {
    pub fn from_byte(b: u8) -> Result<Self, NbrError> {
        Ok(match b {
            0 => Self::U8,
            1 => Self::I16,
            2 => Self::F32,
            other => return Err(NbrError::UnknownAudioFormat(other)),
        })
    }

    /// Bytes one sample occupies.
    pub fn sample_width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::I16 => 2,
            Self::F32 => 4,
        }
    }
}

/// Decoded PCM audio, interleaved by channel.
#[derive(Debug, Clone, PartialEq)]
pub struct NbrAudio {
    pub format: AudioFormat,
    pub sample_rate: u32,
    pub channels: u8,
    pub samples: Vec<u8>,
}

impl NbrAudio {
    pub(crate) fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        if self.samples.len() % self.format.sample_width() != 0 {
            return Err(NbrError::BadSampleSize {
                size: self.samples.len(),
                format: self.format,
            });
        }

        w.write_u8(self.format as u8)?;
        w.write_u32(self.sample_rate)?;
        w.write_u8(self.channels)?;
        w.write_u32(self.samples.len() as u32)?;
        w.write_bytes(&self.samples)
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let format = AudioFormat::from_byte(r.read_u8()?)?;
        let sample_rate = r.read_u32()?;
        let channels = r.read_u8()?;
        let size = r.read_u32()? as usize;

        if size % format.sample_width() != 0 {
            return Err(NbrError::BadSampleSize { size, format });
        }

        Ok(Self {
            format,
            sample_rate,
            channels,
            samples: r.read_vec(size)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrip_i16_stereo() {
        let samples: Vec<u8> = [100i16, -100, 2000, -2000]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let audio = NbrAudio {
            format: AudioFormat::I16,
            sample_rate: 44_100,
            channels: 2,
            samples,
        };

        let mut buf = Vec::new();
        audio.write_into(&mut buf).unwrap();

        let parsed = NbrAudio::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, audio);
    }

    #[test]
    fn odd_byte_count_rejected_for_i16() {
        let audio = NbrAudio {
            format: AudioFormat::I16,
            sample_rate: 22_050,
            channels: 1,
            samples: vec![0u8; 3],
        };
        let mut buf = Vec::new();
        assert!(matches!(
            audio.write_into(&mut buf),
            Err(NbrError::BadSampleSize { .. })
        ));
    }

    #[test]
    fn unknown_format_byte_rejected() {
        let bytes = [9u8, 0, 0, 0, 0, 1, 0, 0, 0, 0];
        assert!(matches!(
            NbrAudio::read_from(&mut Cursor::new(bytes)),
            Err(NbrError::UnknownAudioFormat(9))
        ));
    }
}
