//! Image and cubemap-directory converters.
//!
//! Everything decodes to 4-channel 8-bit RGBA except `.hdr`, which keeps
//! its float channels and tags the payload `Rgba16F` for a half-float
//! upload.

use std::path::Path;

use anyhow::{bail, Context, Result};

use boreal_common::{NbrCubemap, NbrTexture, PixelFormat, CUBEMAP_FACES_MAX};

/// Extensions the image decoder accepts.
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "bmp", "psd", "tga", "gif", "hdr", "pic", "ppm", "pgm",
];

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_hdr_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("hdr"))
        .unwrap_or(false)
}

/// Decode one image file into a texture payload.
pub fn convert_image(path: &Path) -> Result<NbrTexture> {
    if !is_image_path(path) {
        bail!("'{}' is not a supported image format", path.display());
    }

    let decoded = image::open(path).with_context(|| format!("cannot decode '{}'", path.display()))?;

    if is_hdr_path(path) {
        let float_image = decoded.to_rgba32f();
        let (width, height) = float_image.dimensions();
        let pixels: Vec<u8> = float_image
            .into_raw()
            .iter()
            .flat_map(|channel| channel.to_le_bytes())
            .collect();

        tracing::info!("converted HDR image '{}' ({width} x {height})", path.display());
        return Ok(NbrTexture {
            width,
            height,
            channels: 4,
            format: PixelFormat::Rgba16F,
            pixels,
        });
    }

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    tracing::info!("converted image '{}' ({width} x {height})", path.display());
    Ok(NbrTexture {
        width,
        height,
        channels: 4,
        format: PixelFormat::Rgba8,
        pixels: rgba.into_raw(),
    })
}

/// Decode a directory of exactly six face images, ordered by directory
/// traversal, into a cubemap payload. Faces must agree on dimensions.
pub fn convert_cubemap_dir(dir: &Path) -> Result<NbrCubemap> {
    if !dir.is_dir() {
        bail!("cubemap source '{}' is not a directory", dir.display());
    }

    let mut face_paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read cubemap directory '{}'", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_image_path(path))
        .collect();
    face_paths.sort();

    if face_paths.len() != CUBEMAP_FACES_MAX {
        bail!(
            "cubemap directory '{}' has {} face images, expected {}",
            dir.display(),
            face_paths.len(),
            CUBEMAP_FACES_MAX
        );
    }

    let mut faces = Vec::with_capacity(CUBEMAP_FACES_MAX);
    let mut dimensions = None;
    for face_path in &face_paths {
        let face = convert_image(face_path)?;
        if face.format != PixelFormat::Rgba8 {
            bail!("cubemap face '{}' must be an LDR image", face_path.display());
        }

        match dimensions {
            None => dimensions = Some((face.width, face.height)),
            Some(expected) if expected != (face.width, face.height) => {
                bail!(
                    "cubemap face '{}' is {} x {}, expected {} x {}",
                    face_path.display(),
                    face.width,
                    face.height,
                    expected.0,
                    expected.1
                );
            }
            Some(_) => {}
        }
        faces.push(face.pixels);
    }

    let (width, height) = dimensions.unwrap();
    tracing::info!(
        "converted cubemap '{}' ({width} x {height}, 6 faces)",
        dir.display()
    );

    Ok(NbrCubemap {
        width,
        height,
        channels: 4,
        format: PixelFormat::Rgba8,
        faces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32, fill: [u8; 4]) {
        let mut img = RgbaImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = Rgba(fill);
        }
        img.save(path).unwrap();
    }

    #[test]
    fn png_decodes_to_rgba8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("red.png");
        write_png(&path, 2, 3, [255, 0, 0, 255]);

        let texture = convert_image(&path).unwrap();
        assert_eq!((texture.width, texture.height), (2, 3));
        assert_eq!(texture.channels, 4);
        assert_eq!(texture.format, PixelFormat::Rgba8);
        assert_eq!(texture.pixels.len(), 2 * 3 * 4);
        assert_eq!(&texture.pixels[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn unsupported_extension_rejected() {
        assert!(convert_image(Path::new("model.gltf")).is_err());
    }

    #[test]
    fn cubemap_requires_exactly_six_faces() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write_png(&dir.path().join(format!("face{i}.png")), 1, 1, [i, i, i, 255]);
        }
        assert!(convert_cubemap_dir(dir.path()).is_err());

        write_png(&dir.path().join("face5.png"), 1, 1, [5, 5, 5, 255]);
        let cubemap = convert_cubemap_dir(dir.path()).unwrap();
        assert_eq!(cubemap.faces.len(), 6);
        assert_eq!((cubemap.width, cubemap.height), (1, 1));

        // Faces arrive in directory-traversal (sorted) order.
        for (i, face) in cubemap.faces.iter().enumerate() {
            assert_eq!(face[0], i as u8);
        }
    }

    #[test]
    fn cubemap_rejects_mismatched_faces() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write_png(&dir.path().join(format!("face{i}.png")), 2, 2, [0, 0, 0, 255]);
        }
        write_png(&dir.path().join("face5.png"), 4, 4, [0, 0, 0, 255]);

        assert!(convert_cubemap_dir(dir.path()).is_err());
    }
}
