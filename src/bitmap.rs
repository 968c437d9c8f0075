// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Sprite bitmap storage, decoded once at startup.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BitmapError {
    #[error("failed to load image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Decoded image in the canvas pixel format (`0xAARRGGBB`, row-major).
#[derive(Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Bitmap {
    /// Decodes an image file (PNG) into canvas pixels.
    pub fn load(path: &Path) -> Result<Self, BitmapError> {
        let image = image::open(path)
            .map_err(|source| BitmapError::Decode {
                path: path.display().to_string(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                u32::from(a) << 24 | u32::from(r) << 16 | u32::from(g) << 8 | u32::from(b)
            })
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a bitmap from pre-packed pixels.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize,
            "pixel count does not match dimensions"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed pixel at `(x, y)`; coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}


// End of File
