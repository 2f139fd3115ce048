//! Error type shared by the byte I/O layer and the NBR codecs.

use crate::formats::{AudioFormat, PixelFormat, ResourceKind};

/// Everything that can go wrong while reading or writing an NBR file.
///
/// All variants are recoverable: a failed load returns before any state is
/// published, and whatever was partially decoded is dropped.
#[derive(Debug, thiserror::Error)]
pub enum NbrError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("'{0}' is not a recognized NBR extension")]
    UnknownExtension(String),

    #[error("bad identifier byte (expected {expected}, got {found})")]
    BadIdentifier { expected: u8, found: u8 },

    #[error("unsupported NBR version {major}.{minor}")]
    VersionMismatch { major: i16, minor: i16 },

    #[error("unknown resource type tag {0}")]
    UnknownResourceType(u16),

    #[error("resource type {kind:?} does not match the extension of '{path}'")]
    TypeExtensionMismatch { kind: ResourceKind, path: String },

    #[error("expected a {expected:?} payload, found {found:?}")]
    UnexpectedPayload {
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("texture declares {channels} channels but {format:?} carries {expected}")]
    ChannelFormatMismatch {
        channels: i8,
        format: PixelFormat,
        expected: i8,
    },

    #[error("pixel buffer is {found} bytes, layout requires {expected}")]
    PixelSizeMismatch { expected: usize, found: usize },

    #[error("cubemap has {0} faces, expected 1 to 6")]
    BadFaceCount(usize),

    #[error("shader source is {0} bytes, the length prefix caps at 65535")]
    SourceTooLong(usize),

    #[error("audio payload of {size} bytes is not a whole number of {format:?} samples")]
    BadSampleSize { size: usize, format: AudioFormat },

    #[error("unknown pixel format byte {0}")]
    UnknownPixelFormat(u8),

    #[error("unknown audio format byte {0}")]
    UnknownAudioFormat(u8),

    #[error("string data is not valid UTF-8")]
    InvalidString,

    #[error("malformed payload: {0}")]
    Malformed(&'static str),
}

impl NbrError {
    /// Collapse `io::ErrorKind::UnexpectedEof` into the dedicated variant so
    /// truncated files report as such rather than as a generic i/o failure.
    pub(crate) fn from_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            NbrError::UnexpectedEof
        } else {
            NbrError::Io(err)
        }
    }
}
