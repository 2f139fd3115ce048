//! Typed little-endian binary I/O over `std::io` streams.
//!
//! Every `write_*` here has a matching `read_*`; together a pair is the
//! authoritative layout of that primitive on disk. Multi-byte values go
//! through `to_le_bytes`/`from_le_bytes` so the format is identical on
//! big-endian hosts. Nothing is padded or aligned.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use crate::NbrError;

bitflags::bitflags! {
    /// File open modes, combined with bitwise OR.
    ///
    /// `BINARY` is accepted for symmetry with the on-disk format
    /// descriptions but carries no behavior of its own.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenMode: u32 {
        const READ       = 1 << 0;
        const WRITE      = 1 << 1;
        const BINARY     = 1 << 2;
        const APPEND     = 1 << 3;
        const TRUNCATE   = 1 << 4;
        const AT_END     = 1 << 5;
        const READ_WRITE = 1 << 6;
    }
}

/// Open `path` with the given mode bits.
///
/// `WRITE` implies truncation unless `APPEND` or `AT_END` is also set,
/// matching the stream semantics the formats were authored against.
pub fn open_file(path: &Path, mode: OpenMode) -> Result<File, NbrError> {
    let mut options = OpenOptions::new();

    if mode.contains(OpenMode::READ) || mode.contains(OpenMode::READ_WRITE) {
        options.read(true);
    }
    if mode.contains(OpenMode::WRITE) || mode.contains(OpenMode::READ_WRITE) {
        options.write(true).create(true);

        if mode.contains(OpenMode::APPEND) {
            options.append(true);
        } else if !mode.contains(OpenMode::AT_END) {
            options.truncate(true);
        }
    }

    Ok(options.open(path)?)
}

/// Little-endian write extensions for any [`Write`] sink.
pub trait BinaryWrite: Write {
    fn write_u8(&mut self, v: u8) -> Result<(), NbrError> {
        self.write_all(&[v]).map_err(NbrError::Io)
    }

    fn write_i8(&mut self, v: i8) -> Result<(), NbrError> {
        self.write_all(&[v as u8]).map_err(NbrError::Io)
    }

    fn write_u16(&mut self, v: u16) -> Result<(), NbrError> {
        self.write_all(&v.to_le_bytes()).map_err(NbrError::Io)
    }

    fn write_i16(&mut self, v: i16) -> Result<(), NbrError> {
        self.write_all(&v.to_le_bytes()).map_err(NbrError::Io)
    }

    fn write_u32(&mut self, v: u32) -> Result<(), NbrError> {
        self.write_all(&v.to_le_bytes()).map_err(NbrError::Io)
    }

    fn write_i32(&mut self, v: i32) -> Result<(), NbrError> {
        self.write_all(&v.to_le_bytes()).map_err(NbrError::Io)
    }

    fn write_f32(&mut self, v: f32) -> Result<(), NbrError> {
        self.write_all(&v.to_le_bytes()).map_err(NbrError::Io)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), NbrError> {
        self.write_all(bytes).map_err(NbrError::Io)
    }

    fn write_f32_slice(&mut self, values: &[f32]) -> Result<(), NbrError> {
        for v in values {
            self.write_f32(*v)?;
        }
        Ok(())
    }

    fn write_u32_slice(&mut self, values: &[u32]) -> Result<(), NbrError> {
        for v in values {
            self.write_u32(*v)?;
        }
        Ok(())
    }

    /// String with a `u16` length prefix; used by shader sources.
    fn write_string16(&mut self, s: &str) -> Result<(), NbrError> {
        if s.len() > u16::MAX as usize {
            return Err(NbrError::SourceTooLong(s.len()));
        }
        self.write_u16(s.len() as u16)?;
        self.write_bytes(s.as_bytes())
    }

    /// String with a `u32` length prefix; the general-purpose form.
    fn write_string(&mut self, s: &str) -> Result<(), NbrError> {
        self.write_u32(s.len() as u32)?;
        self.write_bytes(s.as_bytes())
    }
}

impl<W: Write + ?Sized> BinaryWrite for W {}

/// Little-endian read extensions for any [`Read`] source.
///
/// Reading past end-of-file is [`NbrError::UnexpectedEof`].
pub trait BinaryRead: Read {
    fn read_u8(&mut self) -> Result<u8, NbrError> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b).map_err(NbrError::from_read)?;
        Ok(b[0])
    }

    fn read_i8(&mut self) -> Result<i8, NbrError> {
        Ok(self.read_u8()? as i8)
    }

    fn read_u16(&mut self) -> Result<u16, NbrError> {
        let mut b = [0u8; 2];
        self.read_exact(&mut b).map_err(NbrError::from_read)?;
        Ok(u16::from_le_bytes(b))
    }

    fn read_i16(&mut self) -> Result<i16, NbrError> {
        let mut b = [0u8; 2];
        self.read_exact(&mut b).map_err(NbrError::from_read)?;
        Ok(i16::from_le_bytes(b))
    }

    fn read_u32(&mut self) -> Result<u32, NbrError> {
        let mut b = [0u8; 4];
        self.read_exact(&mut b).map_err(NbrError::from_read)?;
        Ok(u32::from_le_bytes(b))
    }

    fn read_i32(&mut self) -> Result<i32, NbrError> {
        let mut b = [0u8; 4];
        self.read_exact(&mut b).map_err(NbrError::from_read)?;
        Ok(i32::from_le_bytes(b))
    }

    fn read_f32(&mut self) -> Result<f32, NbrError> {
        let mut b = [0u8; 4];
        self.read_exact(&mut b).map_err(NbrError::from_read)?;
        Ok(f32::from_le_bytes(b))
    }

    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, NbrError> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf).map_err(NbrError::from_read)?;
        Ok(buf)
    }

    fn read_f32_vec(&mut self, count: usize) -> Result<Vec<f32>, NbrError> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_f32()?);
        }
        Ok(out)
    }

    fn read_u32_vec(&mut self, count: usize) -> Result<Vec<u32>, NbrError> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_u32()?);
        }
        Ok(out)
    }

    fn read_string16(&mut self) -> Result<String, NbrError> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_vec(len)?;
        String::from_utf8(bytes).map_err(|_| NbrError::InvalidString)
    }

    fn read_string(&mut self) -> Result<String, NbrError> {
        let len = self.read_u32()? as usize;
        let bytes = self.read_vec(len)?;
        String::from_utf8(bytes).map_err(|_| NbrError::InvalidString)
    }
}

impl<R: Read + ?Sized> BinaryRead for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn primitive_roundtrip() {
        let mut buf = Vec::new();
        buf.write_u8(107).unwrap();
        buf.write_i16(-3).unwrap();
        buf.write_u16(65535).unwrap();
        buf.write_u32(0xDEAD_BEEF).unwrap();
        buf.write_f32(1.5).unwrap();
        buf.write_i8(-1).unwrap();

        let mut cur = Cursor::new(buf);
        assert_eq!(cur.read_u8().unwrap(), 107);
        assert_eq!(cur.read_i16().unwrap(), -3);
        assert_eq!(cur.read_u16().unwrap(), 65535);
        assert_eq!(cur.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(cur.read_f32().unwrap(), 1.5);
        assert_eq!(cur.read_i8().unwrap(), -1);
    }

    #[test]
    fn values_are_little_endian() {
        let mut buf = Vec::new();
        buf.write_u16(0x0102).unwrap();
        buf.write_u32(0x0A0B0C0D).unwrap();
        assert_eq!(buf, [0x02, 0x01, 0x0D, 0x0C, 0x0B, 0x0A]);
    }

    #[test]
    fn string16_roundtrip() {
        let mut buf = Vec::new();
        buf.write_string16("void main() {}").unwrap();

        let mut cur = Cursor::new(buf);
        assert_eq!(cur.read_string16().unwrap(), "void main() {}");
    }

    #[test]
    fn string16_rejects_oversized_source() {
        let big = "x".repeat(u16::MAX as usize + 1);
        let mut buf = Vec::new();
        assert!(matches!(
            buf.write_string16(&big),
            Err(NbrError::SourceTooLong(_))
        ));
    }

    #[test]
    fn reading_past_eof_fails() {
        let mut cur = Cursor::new(vec![0x01]);
        assert!(matches!(cur.read_u32(), Err(NbrError::UnexpectedEof)));
    }

    #[test]
    fn open_write_truncates() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("file.bin");

        std::fs::write(&path, b"leftover bytes").unwrap();
        {
            let mut file = open_file(&path, OpenMode::WRITE | OpenMode::BINARY).unwrap();
            file.write_u8(42).unwrap();
        }
        assert_eq!(std::fs::read(&path).unwrap(), vec![42]);
    }
}
