// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Boing: a minimal windowed demo that bounces a sprite over a few static
//! shapes and a line of text.
//!
//! All 2D drawing happens on a CPU canvas ([`canvas`]); the render surface
//! ([`surface`]) uploads the finished canvas to the window through wgpu and
//! owns the device-loss/rebuild contract. The [`scene`] holds the animation
//! state and issues the fixed draw sequence each frame, and [`app`] wires
//! everything into the winit event loop.
//!
//! At startup the demo loads two assets relative to the working directory:
//! `assets/images/player.png` (the 128x128 sprite) and the `DejaVuSans.ttf`
//! typeface, resolved from `assets/fonts/` or the system font directories
//! (set `BOING_FONT_DIR` to override). Missing assets are a fatal startup
//! error.

pub mod app;
pub mod bitmap;
pub mod canvas;
pub mod scene;
pub mod surface;
pub mod text;

pub const APP_NAME: &str = "Boing";

/// Fixed frame the sprite bounces inside; also the initial window size.
/// Resizing the window crops or extends the presented area but does not
/// change the animation bounds.
pub const FRAME_WIDTH: u32 = 1280;
pub const FRAME_HEIGHT: u32 = 720;

// End of File
