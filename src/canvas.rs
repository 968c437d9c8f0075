// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Software rasterizer for the demo's 2D drawing primitives.
//!
//! Pixels are packed `0xAARRGGBB`. All primitives take floating-point
//! geometry, sample at pixel centers, and clip against the canvas bounds, so
//! callers never need to pre-clamp their coordinates.

use glam::Vec2;

use crate::bitmap::Bitmap;

/// Packed `0xAARRGGBB` color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(u32);

impl Color {
    /// Fully opaque color from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 0xff)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Same color with its alpha scaled by `coverage` in `[0, 1]`.
    fn with_coverage(self, coverage: f32) -> Self {
        let a = (self.alpha() as f32 * coverage.clamp(0.0, 1.0)) as u32;
        Self(a << 24 | self.0 & 0x00ff_ffff)
    }
}

/// Axis-aligned rectangle in drawing space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// CPU pixel buffer the scene draws into each frame.
///
/// The render surface uploads the finished buffer to the window after the
/// frame bracket closes; nothing here touches the GPU.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

/// Source-over blend of two packed pixels, straight (non-premultiplied) alpha.
/// The canvas is an opaque backdrop, so the result is always opaque.
fn blend_over(src: u32, dst: u32) -> u32 {
    let sa = src >> 24;
    if sa == 0xff {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let sr = (src >> 16) & 0xff;
    let sg = (src >> 8) & 0xff;
    let sb = src & 0xff;
    let dr = (dst >> 16) & 0xff;
    let dg = (dst >> 8) & 0xff;
    let db = dst & 0xff;
    let r = (sr * sa + dr * inv + 127) / 255;
    let g = (sg * sa + dg * inv + 127) / 255;
    let b = (sb * sa + db * inv + 127) / 255;
    0xff00_0000 | r << 16 | g << 8 | b
}

impl Canvas {
    /// Creates an opaque black canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0xff00_0000; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel rows, top to bottom.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Fills the whole canvas with `color`, ignoring its alpha.
    pub fn clear(&mut self, color: Color) {
        let value = 0xff00_0000 | color.argb() & 0x00ff_ffff;
        self.pixels.fill(value);
    }

    /// Blends `color` into the pixel at `(x, y)` scaled by `coverage`.
    /// Out-of-bounds coordinates are ignored.
    pub(crate) fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        let src = color.with_coverage(coverage).argb();
        self.pixels[idx] = blend_over(src, self.pixels[idx]);
    }

    /// Fills the horizontal run of pixels on row `y` whose centers lie in
    /// `[x_left, x_right)`, clipped to the canvas.
    fn fill_span(&mut self, y: i32, x_left: f32, x_right: f32, value: u32) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let first = (x_left - 0.5).ceil().max(0.0) as i32;
        let last = ((x_right - 0.5).floor() as i32).min(self.width as i32 - 1);
        if first > last {
            return;
        }
        let row = y as usize * self.width as usize;
        self.pixels[row + first as usize..=row + last as usize].fill(value);
    }

    /// Rows whose centers lie in `[top, bottom)`, clipped to the canvas.
    fn row_range(&self, top: f32, bottom: f32) -> std::ops::RangeInclusive<i32> {
        let first = (top - 0.5).ceil().max(0.0) as i32;
        let last = ((bottom - 0.5).floor() as i32).min(self.height as i32 - 1);
        first..=last
    }

    /// Fills an axis-aligned ellipse by horizontal scanline spans.
    pub fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let value = color.argb();
        for y in self.row_range(center.y - radii.y, center.y + radii.y) {
            let dy = (y as f32 + 0.5 - center.y) / radii.y;
            let rest = 1.0 - dy * dy;
            if rest <= 0.0 {
                continue;
            }
            let half = radii.x * rest.sqrt();
            self.fill_span(y, center.x - half, center.x + half, value);
        }
    }

    /// Fills a rectangle with circular corners of the given radius.
    /// The radius is clamped to half the shorter side.
    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let radius = radius.clamp(0.0, rect.width.min(rect.height) / 2.0);
        let value = color.argb();
        for y in self.row_range(rect.y, rect.bottom()) {
            let yc = y as f32 + 0.5;
            // Distance into the top or bottom corner band, zero in the middle.
            let dy = if yc < rect.y + radius {
                rect.y + radius - yc
            } else if yc > rect.bottom() - radius {
                yc - (rect.bottom() - radius)
            } else {
                0.0
            };
            let inset = radius - (radius * radius - dy * dy).max(0.0).sqrt();
            self.fill_span(y, rect.x + inset, rect.right() - inset, value);
        }
    }

    /// Draws `source` scaled to `dest` with nearest-neighbor sampling and
    /// per-pixel source-over blending.
    pub fn blit_scaled(&mut self, source: &Bitmap, dest: Rect) {
        if dest.width <= 0.0 || dest.height <= 0.0 || source.width() == 0 || source.height() == 0 {
            return;
        }
        let src_w = source.width() as f32;
        let src_h = source.height() as f32;
        for y in self.row_range(dest.y, dest.bottom()) {
            let v = ((y as f32 + 0.5 - dest.y) / dest.height * src_h) as u32;
            let v = v.min(source.height() - 1);
            let first = (dest.x - 0.5).ceil().max(0.0) as i32;
            let last = ((dest.right() - 0.5).floor() as i32).min(self.width as i32 - 1);
            for x in first..=last {
                let u = ((x as f32 + 0.5 - dest.x) / dest.width * src_w) as u32;
                let u = u.min(source.width() - 1);
                let src = source.pixel(u, v);
                if src >> 24 == 0 {
                    continue;
                }
                let idx = y as usize * self.width as usize + x as usize;
                self.pixels[idx] = blend_over(src, self.pixels[idx]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(canvas: &Canvas, x: u32, y: u32) -> u32 {
        canvas.pixels()[y as usize * canvas.width() as usize + x as usize]
    }

    // -- clear tests --

    #[test]
    fn clear_fills_every_pixel() {
        let mut canvas = Canvas::new(4, 3);
        canvas.clear(Color::rgb(0x00, 0x00, 0x30));
        assert!(canvas.pixels().iter().all(|&p| p == 0xff00_0030));
    }

    #[test]
    fn clear_forces_opaque_alpha() {
        let mut canvas = Canvas::new(2, 2);
        canvas.clear(Color::rgba(10, 20, 30, 0));
        assert_eq!(px(&canvas, 0, 0), 0xff0a_141e);
    }

    // -- ellipse tests --

    #[test]
    fn ellipse_covers_center_but_not_corner() {
        let mut canvas = Canvas::new(100, 100);
        canvas.fill_ellipse(Vec2::new(50.0, 50.0), Vec2::new(40.0, 20.0), Color::rgb(0, 0, 255));
        assert_eq!(px(&canvas, 50, 50), 0xff00_00ff);
        // Bounding-box corner is outside the ellipse itself.
        assert_eq!(px(&canvas, 12, 32), 0xff00_0000);
        // Extreme points along the axes are inside.
        assert_eq!(px(&canvas, 12, 50), 0xff00_00ff);
        assert_eq!(px(&canvas, 50, 32), 0xff00_00ff);
    }

    #[test]
    fn ellipse_clips_at_canvas_edges() {
        let mut canvas = Canvas::new(20, 20);
        // Center far outside; only the overlapping sliver may be touched.
        canvas.fill_ellipse(Vec2::new(-5.0, 10.0), Vec2::new(10.0, 10.0), Color::rgb(255, 0, 0));
        assert_eq!(px(&canvas, 0, 10), 0xffff_0000);
        assert_eq!(px(&canvas, 10, 10), 0xff00_0000);
    }

    #[test]
    fn degenerate_ellipse_draws_nothing() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill_ellipse(Vec2::new(4.0, 4.0), Vec2::new(0.0, 3.0), Color::rgb(1, 2, 3));
        assert!(canvas.pixels().iter().all(|&p| p == 0xff00_0000));
    }

    // -- rounded rect tests --

    #[test]
    fn rounded_rect_zero_radius_fills_rect() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rounded_rect(Rect::new(2.0, 3.0, 5.0, 4.0), 0.0, Color::rgb(0, 255, 0));
        assert_eq!(px(&canvas, 2, 3), 0xff00_ff00);
        assert_eq!(px(&canvas, 6, 6), 0xff00_ff00);
        assert_eq!(px(&canvas, 1, 3), 0xff00_0000);
        assert_eq!(px(&canvas, 2, 7), 0xff00_0000);
    }

    #[test]
    fn rounded_rect_rounds_corners_only() {
        let mut canvas = Canvas::new(60, 60);
        canvas.fill_rounded_rect(Rect::new(10.0, 10.0, 40.0, 40.0), 10.0, Color::rgb(255, 0, 0));
        // The square corner pixel is cut away.
        assert_eq!(px(&canvas, 10, 10), 0xff00_0000);
        // Edge midpoints and the interior are filled.
        assert_eq!(px(&canvas, 30, 10), 0xffff_0000);
        assert_eq!(px(&canvas, 10, 30), 0xffff_0000);
        assert_eq!(px(&canvas, 30, 30), 0xffff_0000);
    }

    #[test]
    fn rounded_rect_clamps_oversized_radius() {
        let mut canvas = Canvas::new(40, 40);
        // Radius larger than the rect; acts as radius = height / 2.
        let white = Color::rgb(255, 255, 255);
        canvas.fill_rounded_rect(Rect::new(5.0, 15.0, 30.0, 10.0), 100.0, white);
        assert_eq!(px(&canvas, 20, 20), 0xffff_ffff);
        assert_eq!(px(&canvas, 5, 15), 0xff00_0000);
        assert_eq!(px(&canvas, 20, 15), 0xffff_ffff);
    }

    // -- blit tests --

    #[test]
    fn blit_opaque_replaces_and_transparent_preserves() {
        let mut canvas = Canvas::new(4, 1);
        canvas.clear(Color::rgb(9, 9, 9));
        let source = Bitmap::from_pixels(2, 1, vec![0xffab_cdef, 0x0000_0000]);
        canvas.blit_scaled(&source, Rect::new(0.0, 0.0, 2.0, 1.0));
        assert_eq!(px(&canvas, 0, 0), 0xffab_cdef);
        assert_eq!(px(&canvas, 1, 0), 0xff09_0909);
    }

    #[test]
    fn blit_scaled_maps_quadrants() {
        let mut canvas = Canvas::new(8, 8);
        let source = Bitmap::from_pixels(
            2,
            2,
            vec![0xffff_0000, 0xff00_ff00, 0xff00_00ff, 0xffff_ffff],
        );
        canvas.blit_scaled(&source, Rect::new(0.0, 0.0, 8.0, 8.0));
        assert_eq!(px(&canvas, 1, 1), 0xffff_0000);
        assert_eq!(px(&canvas, 6, 1), 0xff00_ff00);
        assert_eq!(px(&canvas, 1, 6), 0xff00_00ff);
        assert_eq!(px(&canvas, 6, 6), 0xffff_ffff);
    }

    #[test]
    fn blit_clips_offscreen_destination() {
        let mut canvas = Canvas::new(4, 4);
        let source = Bitmap::from_pixels(1, 1, vec![0xffff_ffff]);
        // Overlaps only the top-left 2x2 corner of the canvas.
        canvas.blit_scaled(&source, Rect::new(-6.0, -6.0, 8.0, 8.0));
        // Entirely offscreen.
        canvas.blit_scaled(&source, Rect::new(100.0, 100.0, 8.0, 8.0));
        assert_eq!(px(&canvas, 0, 0), 0xffff_ffff);
        assert_eq!(px(&canvas, 1, 1), 0xffff_ffff);
        assert_eq!(px(&canvas, 3, 3), 0xff00_0000);
    }

    #[test]
    fn semitransparent_blit_blends() {
        let mut canvas = Canvas::new(1, 1);
        canvas.clear(Color::rgb(0, 0, 0));
        let source = Bitmap::from_pixels(1, 1, vec![0x80ff_ffff]);
        canvas.blit_scaled(&source, Rect::new(0.0, 0.0, 1.0, 1.0));
        let blended = px(&canvas, 0, 0);
        assert_eq!(blended >> 24, 0xff);
        let channel = blended & 0xff;
        // 0x80 alpha over black lands near mid-gray.
        assert!((0x7e..=0x82).contains(&channel), "channel = {channel:#x}");
    }

    // -- coverage blend tests --

    #[test]
    fn blend_pixel_full_coverage_writes_color() {
        let mut canvas = Canvas::new(2, 2);
        canvas.blend_pixel(1, 1, Color::rgb(40, 255, 40), 1.0);
        assert_eq!(px(&canvas, 1, 1), 0xff28_ff28);
    }

    #[test]
    fn blend_pixel_zero_coverage_is_noop() {
        let mut canvas = Canvas::new(2, 2);
        canvas.clear(Color::rgb(5, 5, 5));
        canvas.blend_pixel(0, 0, Color::rgb(255, 255, 255), 0.0);
        assert_eq!(px(&canvas, 0, 0), 0xff05_0505);
    }

    #[test]
    fn blend_pixel_out_of_bounds_is_ignored() {
        let mut canvas = Canvas::new(2, 2);
        canvas.blend_pixel(-1, 0, Color::rgb(255, 0, 0), 1.0);
        canvas.blend_pixel(0, 5, Color::rgb(255, 0, 0), 1.0);
        assert!(canvas.pixels().iter().all(|&p| p == 0xff00_0000));
    }
}

// End of File
