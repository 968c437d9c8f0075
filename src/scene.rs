// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! The demo scene: one bouncing sprite over static shapes and text.
//!
//! The scene owns its drawing resources (brush set, typeface, sprite
//! bitmap), all created through the render surface at construction. The
//! brush set is recreated wholesale whenever the surface reports a rebuilt
//! target; the typeface and bitmap are device-independent and live for the
//! scene's whole lifetime.

use std::f32::consts::FRAC_1_SQRT_2;
use std::path::Path;

use anyhow::Context as _;
use glam::Vec2;

use crate::bitmap::Bitmap;
use crate::canvas::{Color, Rect};
use crate::surface::{Brush, PresentError, RenderSurface};
use crate::text::Typeface;
use crate::{FRAME_HEIGHT, FRAME_WIDTH};

/// Sprite travel speed in pixels per second.
const SPRITE_SPEED: f32 = 300.0;
/// The sprite bitmap is drawn at this fixed square size.
const SPRITE_SIZE: f32 = 128.0;
const SPRITE_START: Vec2 = Vec2::new(500.0, 200.0);
/// 45 degrees down-right. Reflection only flips component signs, so both
/// components keep this magnitude forever.
const SPRITE_DIRECTION: Vec2 = Vec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2);

const BACKGROUND: Color = Color::rgb(0x00, 0x00, 0x30);
const RED: Color = Color::rgb(255, 40, 40);
const GREEN: Color = Color::rgb(40, 255, 40);
const BLUE: Color = Color::rgb(40, 40, 255);

const ELLIPSE_CENTER: Vec2 = Vec2::new(200.0, 300.0);
const ELLIPSE_RADII: Vec2 = Vec2::new(100.0, 50.0);
const ROUNDED_RECT: Rect = Rect::new(600.0, 400.0, 400.0, 200.0);
const CORNER_RADIUS: f32 = 20.0;
const GREETING: &str = "Hello world!";
const TEXT_RECT: Rect = Rect::new(600.0, 100.0, 200.0, 200.0);
const FONT_NAME: &str = "DejaVuSans.ttf";
const FONT_SIZE: f32 = 50.0;
const SPRITE_IMAGE: &str = "assets/images/player.png";

/// Moving part of the scene: position plus a direction of constant speed.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Sprite {
    position: Vec2,
    direction: Vec2,
}

impl Sprite {
    fn at_start() -> Self {
        Self {
            position: SPRITE_START,
            direction: SPRITE_DIRECTION,
        }
    }

    /// Linear motion with axis-aligned bounce. The bounds check runs after
    /// the move and never clamps, so a long frame can overshoot the edge
    /// briefly; the reflected direction carries the sprite back on the
    /// following update.
    fn advance(&mut self, dt: f32) {
        self.position += self.direction * SPRITE_SPEED * dt;
        let max = Vec2::new(FRAME_WIDTH as f32, FRAME_HEIGHT as f32) - Vec2::splat(SPRITE_SIZE);
        if self.position.x < 0.0 || self.position.x > max.x {
            self.direction.x = -self.direction.x;
        }
        if self.position.y < 0.0 || self.position.y > max.y {
            self.direction.y = -self.direction.y;
        }
    }
}

/// The scene's three solid brushes, created and replaced as one unit so a
/// target rebuild can never leave a partial set behind.
struct Brushes {
    red: Brush,
    green: Brush,
    blue: Brush,
}

impl Brushes {
    fn create(surface: &RenderSurface) -> Self {
        Self {
            red: surface.create_brush(RED),
            green: surface.create_brush(GREEN),
            blue: surface.create_brush(BLUE),
        }
    }
}

/// Animation state and draw orchestration for the demo.
pub struct Scene {
    sprite: Sprite,
    brushes: Brushes,
    typeface: Typeface,
    sprite_image: Bitmap,
}

impl Scene {
    /// Creates the scene and loads its startup resources through the
    /// surface. Resource failures here are fatal to the application.
    pub fn new(surface: &RenderSurface) -> anyhow::Result<Self> {
        let typeface = surface
            .load_typeface(FONT_NAME, FONT_SIZE)
            .context("loading demo typeface")?;
        let sprite_image = surface
            .load_bitmap(Path::new(SPRITE_IMAGE))
            .context("loading sprite bitmap")?;
        Ok(Self {
            sprite: Sprite::at_start(),
            brushes: Brushes::create(surface),
            typeface,
            sprite_image,
        })
    }

    /// Puts the sprite back at its fixed start position and direction.
    pub fn reset(&mut self) {
        self.sprite = Sprite::at_start();
    }

    /// Advances the animation by `dt` seconds (non-negative).
    pub fn update(&mut self, dt: f32) {
        debug_assert!(dt >= 0.0, "update called with negative elapsed time");
        self.sprite.advance(dt);
    }

    /// Draws one frame: background, ellipse, rounded rectangle, sprite,
    /// text. A declined frame (window not presentable) is a no-op. A
    /// rebuilt target is answered by recreating the brush set before
    /// returning, so the next frame paints with fresh brushes.
    pub fn draw(&mut self, surface: &mut RenderSurface) -> Result<(), PresentError> {
        if !surface.begin_frame() {
            return Ok(());
        }
        surface.clear(BACKGROUND);
        surface.fill_ellipse(ELLIPSE_CENTER, ELLIPSE_RADII, &self.brushes.blue);
        surface.fill_rounded_rect(ROUNDED_RECT, CORNER_RADIUS, &self.brushes.red);
        surface.draw_bitmap(
            &self.sprite_image,
            Rect::new(
                self.sprite.position.x,
                self.sprite.position.y,
                SPRITE_SIZE,
                SPRITE_SIZE,
            ),
        );
        surface.draw_text(GREETING, TEXT_RECT, &self.typeface, &self.brushes.green);
        if surface.end_frame()?.is_rebuilt() {
            self.rebuild_brushes(surface);
        }
        Ok(())
    }

    /// Forwards a window resize to the surface, refreshing the brush set
    /// if the target had to be rebuilt along the way.
    pub fn resize(
        &mut self,
        surface: &mut RenderSurface,
        width: u32,
        height: u32,
    ) -> Result<(), PresentError> {
        if surface.resize(width, height)?.is_rebuilt() {
            self.rebuild_brushes(surface);
        }
        Ok(())
    }

    /// A single-character key press. `R` resets the sprite; everything
    /// else is ignored.
    pub fn on_key_down(&mut self, key: char) {
        if key.eq_ignore_ascii_case(&'r') {
            self.reset();
        }
    }

    /// Pointer movement is delivered but currently unused.
    pub fn on_pointer_moved(&mut self, _x: f32, _y: f32) {}

    fn rebuild_brushes(&mut self, surface: &RenderSurface) {
        self.brushes = Brushes::create(surface);
        log::debug!("brush set recreated for the new target generation");
    }
}


// End of File
