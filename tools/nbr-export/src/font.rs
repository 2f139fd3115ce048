//! TrueType font conversion.
//!
//! Glyphs rasterize at a fixed 256 px base size; the final on-screen size
//! is decided at draw time, the base just keeps the bitmaps crisp. The
//! printable ASCII range is walked and unmapped codepoints are skipped.

use std::path::Path;

use anyhow::{bail, Context, Result};
use fontdue::{Font, FontSettings};

use boreal_common::{NbrFont, NbrGlyph};

/// Base pixel size every glyph rasterizes at.
const BASE_PIXEL_SIZE: f32 = 256.0;

/// First and last codepoints exported (printable ASCII).
const FIRST_CODEPOINT: u8 = 32;
const LAST_CODEPOINT: u8 = 126;

/// Convert a `.ttf`/`.otf` file into a font payload.
pub fn convert_font(input: &Path) -> Result<NbrFont> {
    let data = std::fs::read(input)
        .with_context(|| format!("could not read font file '{}'", input.display()))?;

    let font = Font::from_bytes(data, FontSettings::default())
        .map_err(|err| anyhow::anyhow!("could not parse font '{}': {err}", input.display()))?;

    let line_metrics = font
        .horizontal_line_metrics(BASE_PIXEL_SIZE)
        .context("font has no horizontal metrics")?;

    let mut glyphs = Vec::new();
    for codepoint in FIRST_CODEPOINT..=LAST_CODEPOINT {
        let ch = codepoint as char;

        // Unmapped codepoints rasterize as the missing glyph; skip them.
        if font.lookup_glyph_index(ch) == 0 {
            continue;
        }

        let (metrics, bitmap) = font.rasterize(ch, BASE_PIXEL_SIZE);

        let left = metrics.xmin;
        let bottom = metrics.ymin;
        let right = metrics.xmin + metrics.width as i32;
        let top = metrics.ymin + metrics.height as i32;

        glyphs.push(NbrGlyph {
            unicode: codepoint as i8,
            width: metrics.width as u16,
            height: metrics.height as u16,
            left: left as i16,
            right: right as i16,
            top: top as i16,
            bottom: bottom as i16,
            offset_x: metrics.xmin as i16,
            // Offset runs from the baseline to the bitmap's top-left, y down.
            offset_y: -(metrics.ymin + metrics.height as i32) as i16,
            advance_x: metrics.advance_width.round() as i16,
            kern: 0,
            left_bearing: metrics.xmin as i16,
            pixels: bitmap,
        });
    }

    if glyphs.is_empty() {
        bail!("font '{}' maps none of the exported range", input.display());
    }

    tracing::info!(
        "converted font '{}': {} glyphs at {BASE_PIXEL_SIZE} px",
        input.display(),
        glyphs.len()
    );

    Ok(NbrFont {
        glyphs,
        ascent: line_metrics.ascent.round() as i16,
        descent: line_metrics.descent.round() as i16,
        line_gap: line_metrics.line_gap.round() as i16,
    })
}
