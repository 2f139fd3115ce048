//! NBR container entry points: extension classification, save, and load.
//!
//! Validation order on load, first failure wins: known extension → file
//! opens → identifier → exact version → known type tag → tag agrees with
//! the extension. On any failure nothing half-decoded escapes; the file
//! handle closes on every path.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use super::animation::NbrAnimation;
use super::audio::NbrAudio;
use super::cubemap::NbrCubemap;
use super::font::NbrFont;
use super::header::{NbrHeader, ResourceKind};
use super::model::NbrModel;
use super::shader::NbrShader;
use super::texture::NbrTexture;
use crate::io::{open_file, OpenMode};
use crate::NbrError;

/// Closed sum over every payload that exists as a standalone NBR file.
///
/// The header's `resource_type` decodes into this tag once at load time;
/// all downstream dispatch is exhaustive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum NbrPayload {
    Texture(NbrTexture),
    Cubemap(NbrCubemap),
    Shader(NbrShader),
    Model(NbrModel),
    Font(NbrFont),
    Audio(NbrAudio),
    Animation(NbrAnimation),
}

impl NbrPayload {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Texture(_) => ResourceKind::Texture,
            Self::Cubemap(_) => ResourceKind::Cubemap,
            Self::Shader(_) => ResourceKind::Shader,
            Self::Model(_) => ResourceKind::Model,
            Self::Font(_) => ResourceKind::Font,
            Self::Audio(_) => ResourceKind::AudioBuffer,
            Self::Animation(_) => ResourceKind::Animation,
        }
    }
}

/// A loaded NBR file: validated header, decoded payload, and the path it
/// came from. Dropping it frees every decoded array; GPU objects created
/// from the payload are unaffected.
#[derive(Debug)]
pub struct NbrFile {
    pub header: NbrHeader,
    pub payload: NbrPayload,
    pub path: PathBuf,
}

/// Classify a path by its NBR extension.
pub fn extension_kind(path: &Path) -> Option<ResourceKind> {
    match path.extension()?.to_str()? {
        "nbrtexture" => Some(ResourceKind::Texture),
        "nbrcubemap" => Some(ResourceKind::Cubemap),
        "nbrshader" => Some(ResourceKind::Shader),
        "nbrmodel" => Some(ResourceKind::Model),
        "nbrfont" => Some(ResourceKind::Font),
        "nbraudio" => Some(ResourceKind::AudioBuffer),
        "nbranimation" => Some(ResourceKind::Animation),
        _ => None,
    }
}

/// Whether the path carries a known NBR extension. Used to reject inputs
/// before any file is opened.
pub fn valid_extension(path: &Path) -> bool {
    extension_kind(path).is_some()
}

impl NbrFile {
    /// Serialize `payload` to `path`, normalizing the extension to the
    /// payload's kind. Returns the path actually written.
    pub fn save(payload: &NbrPayload, path: &Path) -> Result<PathBuf, NbrError> {
        let kind = payload.kind();
        let extension = kind
            .extension()
            .expect("every file-level payload kind has an extension");
        let nbr_path = path.with_extension(extension);

        let file = open_file(&nbr_path, OpenMode::WRITE | OpenMode::BINARY).map_err(|e| {
            tracing::error!("cannot save NBR file at '{}'", nbr_path.display());
            e
        })?;
        let mut w = BufWriter::new(file);

        NbrHeader::new(kind).write_into(&mut w)?;
        match payload {
            NbrPayload::Texture(t) => t.write_into(&mut w)?,
            NbrPayload::Cubemap(c) => c.write_into(&mut w)?,
            NbrPayload::Shader(s) => s.write_into(&mut w)?,
            NbrPayload::Model(m) => m.write_into(&mut w)?,
            NbrPayload::Font(f) => f.write_into(&mut w)?,
            NbrPayload::Audio(a) => a.write_into(&mut w)?,
            NbrPayload::Animation(a) => a.write_into(&mut w)?,
        }

        use std::io::Write;
        w.flush()?;
        Ok(nbr_path)
    }

    /// Load and fully validate an NBR file.
    pub fn load(path: &Path) -> Result<Self, NbrError> {
        let ext_kind = extension_kind(path).ok_or_else(|| {
            tracing::error!("'{}' is not a recognized NBR file", path.display());
            NbrError::UnknownExtension(path.display().to_string())
        })?;

        let file = open_file(path, OpenMode::READ | OpenMode::BINARY).map_err(|e| {
            tracing::error!("cannot load NBR file at '{}'", path.display());
            e
        })?;
        let mut r = BufReader::new(file);

        let header = NbrHeader::read_from(&mut r)?;
        let kind = header.validate(path)?;

        if kind != ext_kind {
            tracing::error!(
                "NBR file at '{}' stores a {:?} but its extension says {:?}",
                path.display(),
                kind,
                ext_kind
            );
            return Err(NbrError::TypeExtensionMismatch {
                kind,
                path: path.display().to_string(),
            });
        }

        let payload = match kind {
            ResourceKind::Texture => NbrPayload::Texture(NbrTexture::read_from(&mut r)?),
            ResourceKind::Cubemap => NbrPayload::Cubemap(NbrCubemap::read_from(&mut r)?),
            ResourceKind::Shader => NbrPayload::Shader(NbrShader::read_from(&mut r)?),
            ResourceKind::Model => NbrPayload::Model(NbrModel::read_from(&mut r)?),
            ResourceKind::Font => NbrPayload::Font(NbrFont::read_from(&mut r)?),
            ResourceKind::AudioBuffer => NbrPayload::Audio(NbrAudio::read_from(&mut r)?),
            ResourceKind::Animation => NbrPayload::Animation(NbrAnimation::read_from(&mut r)?),
            _ => return Err(NbrError::UnknownResourceType(header.resource_type)),
        };

        Ok(Self {
            header,
            payload,
            path: path.to_path_buf(),
        })
    }

    /// Load with a caller-side expectation on the payload kind.
    pub fn load_expected(path: &Path, expected: ResourceKind) -> Result<Self, NbrError> {
        let file = Self::load(path)?;
        let found = file.payload.kind();
        if found != expected {
            tracing::error!(
                "expected a {:?} at '{}', found {:?}",
                expected,
                path.display(),
                found
            );
            return Err(NbrError::UnexpectedPayload { expected, found });
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::texture::PixelFormat;
    use tempfile::TempDir;

    fn checker_2x2() -> NbrPayload {
        NbrPayload::Texture(NbrTexture {
            width: 2,
            height: 2,
            channels: 4,
            format: PixelFormat::Rgba8,
            pixels: vec![
                0xFF, 0, 0, 0xFF, 0, 0xFF, 0, 0xFF, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
            ],
        })
    }

    #[test]
    fn save_normalizes_extension() {
        let dir = TempDir::new().unwrap();
        let written = NbrFile::save(&checker_2x2(), &dir.path().join("t.png")).unwrap();
        assert_eq!(written.extension().unwrap(), "nbrtexture");
    }

    #[test]
    fn texture_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let payload = checker_2x2();
        let written = NbrFile::save(&payload, &dir.path().join("t")).unwrap();

        let loaded = NbrFile::load(&written).unwrap();
        assert_eq!(loaded.payload, payload);
        assert_eq!(loaded.header.resource_type, ResourceKind::Texture.tag());
    }

    #[test]
    fn cubemap_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let payload = NbrPayload::Cubemap(NbrCubemap {
            width: 1,
            height: 1,
            channels: 4,
            format: PixelFormat::Rgba8,
            faces: (0..6u8).map(|f| vec![f, f, f, 0xFF]).collect(),
        });

        let written = NbrFile::save(&payload, &dir.path().join("sky")).unwrap();
        let loaded = NbrFile::load(&written).unwrap();
        assert_eq!(loaded.payload, payload);
    }

    #[test]
    fn shader_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let payload = NbrPayload::Shader(NbrShader::Render {
            vertex: "#version 420 core\nvoid main(){gl_Position=vec4(0);}".into(),
            pixel: "#version 420 core\nvoid main(){}".into(),
        });

        let written = NbrFile::save(&payload, &dir.path().join("basic")).unwrap();
        let loaded = NbrFile::load(&written).unwrap();
        assert_eq!(loaded.payload, payload);
    }

    #[test]
    fn unknown_extension_rejected_before_open() {
        assert!(matches!(
            NbrFile::load(Path::new("missing.totallynotnbr")),
            Err(NbrError::UnknownExtension(_))
        ));
    }

    #[test]
    fn corrupt_identifier_byte_rejected() {
        let dir = TempDir::new().unwrap();
        let written = NbrFile::save(&checker_2x2(), &dir.path().join("t")).unwrap();

        let mut bytes = std::fs::read(&written).unwrap();
        bytes[0] ^= 0xFF;
        std::fs::write(&written, bytes).unwrap();

        assert!(matches!(
            NbrFile::load(&written),
            Err(NbrError::BadIdentifier { .. })
        ));
    }

    #[test]
    fn corrupt_version_fields_rejected() {
        for offset in [1usize, 3] {
            let dir = TempDir::new().unwrap();
            let written = NbrFile::save(&checker_2x2(), &dir.path().join("t")).unwrap();

            let mut bytes = std::fs::read(&written).unwrap();
            bytes[offset] ^= 0xFF;
            std::fs::write(&written, bytes).unwrap();

            assert!(matches!(
                NbrFile::load(&written),
                Err(NbrError::VersionMismatch { .. })
            ));
        }
    }

    #[test]
    fn type_byte_disagreeing_with_extension_rejected() {
        let dir = TempDir::new().unwrap();
        let written = NbrFile::save(&checker_2x2(), &dir.path().join("t")).unwrap();

        // Rewrite the tag to Cubemap while keeping the .nbrtexture extension.
        let mut bytes = std::fs::read(&written).unwrap();
        bytes[5..7].copy_from_slice(&ResourceKind::Cubemap.tag().to_le_bytes());
        std::fs::write(&written, bytes).unwrap();

        assert!(matches!(
            NbrFile::load(&written),
            Err(NbrError::TypeExtensionMismatch { .. })
        ));
    }

    #[test]
    fn unknown_type_tag_rejected() {
        let dir = TempDir::new().unwrap();
        let written = NbrFile::save(&checker_2x2(), &dir.path().join("t")).unwrap();

        let mut bytes = std::fs::read(&written).unwrap();
        bytes[5..7].copy_from_slice(&500u16.to_le_bytes());
        std::fs::write(&written, bytes).unwrap();

        assert!(matches!(
            NbrFile::load(&written),
            Err(NbrError::UnknownResourceType(500))
        ));
    }

    #[test]
    fn load_expected_enforces_kind() {
        let dir = TempDir::new().unwrap();
        let written = NbrFile::save(&checker_2x2(), &dir.path().join("t")).unwrap();

        assert!(NbrFile::load_expected(&written, ResourceKind::Texture).is_ok());
        assert!(matches!(
            NbrFile::load_expected(&written, ResourceKind::Cubemap),
            Err(NbrError::UnexpectedPayload { .. })
        ));
    }

    #[test]
    fn extension_classifier() {
        assert!(valid_extension(Path::new("a.nbrtexture")));
        assert!(valid_extension(Path::new("b.nbrcubemap")));
        assert!(valid_extension(Path::new("c.nbrshader")));
        assert!(valid_extension(Path::new("d.nbrmodel")));
        assert!(valid_extension(Path::new("e.nbrfont")));
        assert!(valid_extension(Path::new("f.nbraudio")));
        assert!(valid_extension(Path::new("g.nbranimation")));
        assert!(!valid_extension(Path::new("h.png")));
        assert!(!valid_extension(Path::new("no_extension")));
    }
}
