// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! The render surface: drawing target lifecycle, the begin/end frame
//! bracket, and brush issuance.
//!
//! Scene code paints through [`RenderSurface`] and never touches the GPU
//! directly. The surface reports target rebuilds from its frame-end and
//! resize operations as a [`TargetStatus`] the caller must inspect, since a
//! rebuilt target invalidates every brush minted before it.

use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use winit::window::Window;

use crate::bitmap::{Bitmap, BitmapError};
use crate::canvas::{Canvas, Color, Rect};
use crate::text::{self, Typeface, TypefaceError};

mod error;
mod gpu;
mod present;

pub use error::{PresentError, SurfaceInitError};

use gpu::WgpuPresenter;
use present::{Present, PresentOutcome};

#[cfg(test)]
pub(crate) use present::testing;

/// Identity of one incarnation of the drawing target. Bumped every time the
/// target is rebuilt after device loss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetGeneration(u32);

impl TargetGeneration {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Outcome of a frame-end or resize operation.
///
/// `Rebuilt` means the drawing target was destroyed and recreated in place;
/// brushes created against the previous target are stale and must be
/// recreated before the next frame.
#[must_use = "a rebuilt target invalidates existing brushes"]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetStatus {
    Intact,
    Rebuilt,
}

impl TargetStatus {
    pub fn is_rebuilt(self) -> bool {
        self == Self::Rebuilt
    }
}

/// A solid-color paint resource keyed to the target generation it was
/// created under. Painting with a brush from an older generation is a
/// programming error caught by debug assertions.
#[derive(Clone, Debug)]
pub struct Brush {
    color: Color,
    generation: TargetGeneration,
}

/// Owner of the drawing target and the per-frame draw bracket.
pub struct RenderSurface {
    canvas: Canvas,
    presenter: Box<dyn Present>,
    generation: TargetGeneration,
    frame_open: bool,
}

impl RenderSurface {
    /// Connects a surface to `window`, acquiring the graphics device.
    /// Failure here is fatal; the demo has no headless fallback.
    pub fn new(window: Arc<Window>) -> Result<Self, SurfaceInitError> {
        let presenter = WgpuPresenter::new(window)?;
        Ok(Self::over(Box::new(presenter)))
    }

    #[cfg(test)]
    pub(crate) fn with_presenter(presenter: Box<dyn Present>) -> Self {
        Self::over(presenter)
    }

    fn over(presenter: Box<dyn Present>) -> Self {
        let (width, height) = presenter.dimensions();
        Self {
            canvas: Canvas::new(width, height),
            presenter,
            generation: TargetGeneration::default(),
            frame_open: false,
        }
    }

    /// Current target size in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.presenter.dimensions()
    }

    /// Opens the per-frame draw bracket. Returns false, with no side
    /// effects, while the window cannot show a frame (minimized, zero-sized,
    /// or occluded); the caller skips all drawing for this frame.
    pub fn begin_frame(&mut self) -> bool {
        debug_assert!(!self.frame_open, "frame bracket is already open");
        if !self.presenter.is_presentable() {
            log::trace!("frame declined; window is not presentable");
            return false;
        }
        self.frame_open = true;
        true
    }

    /// Closes the draw bracket and presents the canvas.
    ///
    /// `TargetStatus::Rebuilt` reports that device loss was detected and
    /// the target was recreated in place (one attempt) before returning;
    /// the caller's brushes are stale and must be recreated. Errors are
    /// presentation failures with no recovery path.
    pub fn end_frame(&mut self) -> Result<TargetStatus, PresentError> {
        debug_assert!(self.frame_open, "end_frame without begin_frame");
        self.frame_open = false;
        let outcome = self.presenter.present(&self.canvas)?;
        Ok(self.absorb(outcome))
    }

    /// Reconfigures the target for a new window size, with the same
    /// device-loss contract as [`Self::end_frame`]. A zero dimension marks
    /// the surface unpresentable until a restoring resize arrives.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<TargetStatus, PresentError> {
        debug_assert!(!self.frame_open, "resize during an open frame");
        let outcome = self.presenter.resize(width, height)?;
        let status = self.absorb(outcome);
        self.match_canvas_to_target();
        Ok(status)
    }

    /// Forwards the OS occlusion state; occluded windows decline frames.
    pub fn set_occluded(&mut self, occluded: bool) {
        self.presenter.set_occluded(occluded);
    }

    fn absorb(&mut self, outcome: PresentOutcome) -> TargetStatus {
        if outcome.target_rebuilt {
            self.generation = self.generation.next();
            self.match_canvas_to_target();
            log::warn!(
                "drawing target rebuilt (generation {:?}); dependent resources must be recreated",
                self.generation
            );
            TargetStatus::Rebuilt
        } else {
            TargetStatus::Intact
        }
    }

    fn match_canvas_to_target(&mut self) {
        let (width, height) = self.presenter.dimensions();
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas = Canvas::new(width, height);
        }
    }

    /// Mints a brush for the current target generation.
    pub fn create_brush(&self, color: Color) -> Brush {
        Brush {
            color,
            generation: self.generation,
        }
    }

    /// Loads a typeface by font file name at a fixed pixel size. One-shot
    /// startup resource; failure is fatal to the caller.
    pub fn load_typeface(&self, name: &str, size: f32) -> Result<Typeface, TypefaceError> {
        Typeface::load(name, size)
    }

    /// Loads a bitmap in the canvas pixel format. One-shot startup
    /// resource; failure is fatal to the caller.
    pub fn load_bitmap(&self, path: &Path) -> Result<Bitmap, BitmapError> {
        Bitmap::load(path)
    }

    // Paint operations. All require an open frame bracket and, where a
    // brush is involved, a brush from the current target generation.

    pub fn clear(&mut self, color: Color) {
        self.check_bracket();
        self.canvas.clear(color);
    }

    pub fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, brush: &Brush) {
        self.check_bracket();
        self.check_brush(brush);
        self.canvas.fill_ellipse(center, radii, brush.color);
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, corner_radius: f32, brush: &Brush) {
        self.check_bracket();
        self.check_brush(brush);
        self.canvas.fill_rounded_rect(rect, corner_radius, brush.color);
    }

    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect) {
        self.check_bracket();
        self.canvas.blit_scaled(bitmap, dest);
    }

    pub fn draw_text(&mut self, string: &str, rect: Rect, typeface: &Typeface, brush: &Brush) {
        self.check_bracket();
        self.check_brush(brush);
        text::draw_text(&mut self.canvas, string, rect, typeface, brush.color);
    }

    fn check_bracket(&self) {
        debug_assert!(self.frame_open, "paint call outside the frame bracket");
    }

    fn check_brush(&self, brush: &Brush) {
        debug_assert_eq!(
            brush.generation, self.generation,
            "brush belongs to a previous target generation"
        );
    }

    #[cfg(test)]
    pub(crate) fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> TargetGeneration {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::testing::{Script, ScriptedPresenter};
    use super::*;

    fn scripted(width: u32, height: u32) -> (RenderSurface, Rc<RefCell<Script>>) {
        let (presenter, script) = ScriptedPresenter::new(width, height);
        (RenderSurface::with_presenter(Box::new(presenter)), script)
    }

    // -- frame bracket tests --

    #[test]
    fn begin_frame_opens_and_end_frame_presents() {
        let (mut surface, script) = scripted(32, 16);
        assert!(surface.begin_frame());
        surface.clear(Color::rgb(1, 2, 3));
        let status = surface.end_frame().unwrap();
        assert_eq!(status, TargetStatus::Intact);
        assert_eq!(script.borrow().present_count, 1);
    }

    #[test]
    fn begin_frame_declines_when_occluded() {
        let (mut surface, script) = scripted(32, 16);
        surface.set_occluded(true);
        assert!(!surface.begin_frame());
        assert_eq!(script.borrow().present_count, 0);
        surface.set_occluded(false);
        assert!(surface.begin_frame());
    }

    #[test]
    fn begin_frame_declines_after_zero_resize() {
        let (mut surface, _script) = scripted(32, 16);
        let status = surface.resize(0, 0).unwrap();
        assert_eq!(status, TargetStatus::Intact);
        assert!(!surface.begin_frame());
        let status = surface.resize(100, 50).unwrap();
        assert_eq!(status, TargetStatus::Intact);
        assert!(surface.begin_frame());
    }

    #[test]
    #[should_panic(expected = "outside the frame bracket")]
    fn paint_outside_bracket_panics() {
        let (mut surface, _script) = scripted(32, 16);
        let brush = surface.create_brush(Color::rgb(255, 0, 0));
        surface.fill_ellipse(Vec2::new(8.0, 8.0), Vec2::new(4.0, 4.0), &brush);
    }

    // -- rebuild contract tests --

    #[test]
    fn device_loss_at_end_frame_reports_rebuilt() {
        let (mut surface, script) = scripted(32, 16);
        let before = surface.generation();
        script.borrow_mut().lose_next_present = true;
        assert!(surface.begin_frame());
        let status = surface.end_frame().unwrap();
        assert_eq!(status, TargetStatus::Rebuilt);
        assert_ne!(surface.generation(), before);
    }

    #[test]
    fn intact_frames_keep_brushes_valid() {
        let (mut surface, _script) = scripted(32, 16);
        let brush = surface.create_brush(Color::rgb(40, 40, 255));
        for _ in 0..3 {
            assert!(surface.begin_frame());
            surface.fill_ellipse(Vec2::new(16.0, 8.0), Vec2::new(8.0, 4.0), &brush);
            let status = surface.end_frame().unwrap();
            assert_eq!(status, TargetStatus::Intact);
        }
    }

    #[test]
    fn fresh_brush_after_rebuild_passes_generation_check() {
        let (mut surface, script) = scripted(32, 16);
        script.borrow_mut().lose_next_present = true;
        assert!(surface.begin_frame());
        let _ = surface.end_frame().unwrap().is_rebuilt();
        let brush = surface.create_brush(Color::rgb(255, 40, 40));
        assert!(surface.begin_frame());
        surface.fill_rounded_rect(Rect::new(2.0, 2.0, 10.0, 6.0), 2.0, &brush);
        let status = surface.end_frame().unwrap();
        assert_eq!(status, TargetStatus::Intact);
    }

    #[test]
    #[should_panic(expected = "previous target generation")]
    fn stale_brush_panics_in_debug() {
        let (mut surface, script) = scripted(32, 16);
        let stale = surface.create_brush(Color::rgb(255, 40, 40));
        script.borrow_mut().lose_next_present = true;
        assert!(surface.begin_frame());
        let _ = surface.end_frame().unwrap().is_rebuilt();
        assert!(surface.begin_frame());
        surface.fill_ellipse(Vec2::new(8.0, 8.0), Vec2::new(4.0, 4.0), &stale);
    }

    #[test]
    fn resize_rebuild_reports_and_bumps_generation() {
        let (mut surface, script) = scripted(32, 16);
        let before = surface.generation();
        script.borrow_mut().rebuild_on_next_resize = true;
        let status = surface.resize(64, 48).unwrap();
        assert_eq!(status, TargetStatus::Rebuilt);
        assert_ne!(surface.generation(), before);
    }

    #[test]
    fn resize_matches_canvas_to_target() {
        let (mut surface, script) = scripted(32, 16);
        let status = surface.resize(64, 48).unwrap();
        assert_eq!(status, TargetStatus::Intact);
        assert_eq!(script.borrow().resize_count, 1);
        assert_eq!(surface.dimensions(), (64, 48));
        assert_eq!(surface.canvas().width(), 64);
        assert_eq!(surface.canvas().height(), 48);
    }

    #[test]
    fn present_failure_propagates_as_error() {
        let (mut surface, script) = scripted(32, 16);
        script.borrow_mut().fail_next_present = true;
        assert!(surface.begin_frame());
        let err = surface.end_frame().unwrap_err();
        assert!(matches!(err, PresentError::Acquire(_)));
    }

    // -- paint delegation tests --

    #[test]
    fn clear_writes_through_to_canvas() {
        let (mut surface, _script) = scripted(4, 2);
        assert!(surface.begin_frame());
        surface.clear(Color::rgb(0x00, 0x00, 0x30));
        assert!(surface.canvas().pixels().iter().all(|&p| p == 0xff00_0030));
        let _ = surface.end_frame().unwrap();
    }

    #[test]
    fn bitmap_paint_needs_no_brush() {
        let (mut surface, _script) = scripted(4, 4);
        let bitmap = Bitmap::from_pixels(1, 1, vec![0xffff_ffff]);
        assert!(surface.begin_frame());
        surface.draw_bitmap(&bitmap, Rect::new(1.0, 1.0, 2.0, 2.0));
        assert_eq!(surface.canvas().pixels()[5], 0xffff_ffff);
        let _ = surface.end_frame().unwrap();
    }
}

// End of File
