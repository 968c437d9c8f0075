// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Typeface loading and text rasterization into the canvas.
//!
//! Fonts are resolved by file name against `assets/fonts/` and the
//! conventional system font directories (override with `BOING_FONT_DIR`),
//! then rasterized on the CPU as per-pixel coverage.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, PxScaleFont, ScaleFont};
use thiserror::Error;

use crate::canvas::{Canvas, Color, Rect};

#[derive(Debug, Error)]
pub enum TypefaceError {
    #[error("font {name:?} not found in any font directory")]
    NotFound { name: String },
    #[error("failed to read font {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("font {path} is not a usable font file: {source}")]
    Parse {
        path: String,
        #[source]
        source: ab_glyph::InvalidFont,
    },
    #[error("font data is not a usable font: {0}")]
    Invalid(#[from] ab_glyph::InvalidFont),
}

/// A parsed font plus the fixed pixel size it is drawn at.
#[derive(Debug)]
pub struct Typeface {
    font: FontArc,
    scale: PxScale,
}

impl Typeface {
    /// Resolves `name` against the font search directories and parses it.
    pub fn load(name: &str, size: f32) -> Result<Self, TypefaceError> {
        let path = resolve(name).ok_or_else(|| TypefaceError::NotFound {
            name: name.to_string(),
        })?;
        log::debug!("resolved typeface {:?} to {}", name, path.display());
        let data = std::fs::read(&path).map_err(|source| TypefaceError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let font = FontArc::try_from_vec(data).map_err(|source| TypefaceError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            font,
            scale: PxScale::from(size),
        })
    }

    /// Parses an in-memory font file.
    pub fn from_bytes(data: Vec<u8>, size: f32) -> Result<Self, TypefaceError> {
        let font = FontArc::try_from_vec(data)?;
        Ok(Self {
            font,
            scale: PxScale::from(size),
        })
    }
}

/// Rasterizes `text` into `canvas`, wrapping words within the width of
/// `rect`. Lines that run past the bottom of `rect` are not clipped; the
/// canvas bounds are the only hard clip.
pub(crate) fn draw_text(
    canvas: &mut Canvas,
    text: &str,
    rect: Rect,
    typeface: &Typeface,
    color: Color,
) {
    let font = &typeface.font;
    let scaled = font.as_scaled(typeface.scale);
    let line_height = scaled.ascent() - scaled.descent() + scaled.line_gap();
    let space_advance = scaled.h_advance(font.glyph_id(' '));

    let mut caret = rect.x;
    let mut baseline = rect.y + scaled.ascent();
    for word in text.split_whitespace() {
        let width = word_width(&scaled, word);
        if caret > rect.x && caret + width > rect.right() {
            caret = rect.x;
            baseline += line_height;
        }
        let mut prev: Option<GlyphId> = None;
        for ch in word.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(typeface.scale, point(caret, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    canvas.blend_pixel(
                        bounds.min.x as i32 + gx as i32,
                        bounds.min.y as i32 + gy as i32,
                        color,
                        coverage,
                    );
                });
            }
            caret += scaled.h_advance(id);
            prev = Some(id);
        }
        caret += space_advance;
    }
}

fn word_width(scaled: &PxScaleFont<&FontArc>, word: &str) -> f32 {
    let mut width = 0.0;
    let mut prev: Option<GlyphId> = None;
    for ch in word.chars() {
        let id = scaled.font().glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Returns the first existing file named `name` in the search directories,
/// descending two levels into each (distributions nest font families).
fn resolve(name: &str) -> Option<PathBuf> {
    font_directories()
        .iter()
        .find_map(|dir| find_in_dir(dir, name, 2))
}

fn find_in_dir(dir: &Path, name: &str, depth: u32) -> Option<PathBuf> {
    let candidate = dir.join(name);
    if candidate.is_file() {
        return Some(candidate);
    }
    if depth == 0 {
        return None;
    }
    for entry in std::fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_in_dir(&path, name, depth - 1) {
                return Some(found);
            }
        }
    }
    None
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(dir) = std::env::var("BOING_FONT_DIR") {
        dirs.push(PathBuf::from(dir));
    }
    dirs.push(PathBuf::from("assets/fonts"));
    if cfg!(target_os = "linux") {
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(Path::new(&home).join(".local/share/fonts"));
        }
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
    } else if cfg!(target_os = "windows") {
        dirs.push(PathBuf::from(r"C:\Windows\Fonts"));
    }
    dirs
}


// End of File
