// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Application object: owns the window, render surface, and scene, and
//! drives the per-frame update/draw cycle from the winit event loop.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::scene::Scene;
use crate::surface::RenderSurface;
use crate::{APP_NAME, FRAME_HEIGHT, FRAME_WIDTH};

/// Top-level application state. One instance owns everything; there is no
/// global state anywhere in the demo.
///
/// The window, surface, and scene are created on `resumed` (winit only
/// allows window creation once the event loop is live) and dropped with the
/// app when the loop finishes.
pub struct App {
    window: Option<Arc<Window>>,
    surface: Option<RenderSurface>,
    scene: Option<Scene>,
    last_frame: Instant,
    /// First fatal error raised inside an event handler; reported by
    /// [`Self::run`] after the loop unwinds.
    exit_error: Option<anyhow::Error>,
}

impl App {
    pub fn new() -> Self {
        Self {
            window: None,
            surface: None,
            scene: None,
            last_frame: Instant::now(),
            exit_error: None,
        }
    }

    /// Runs the event loop to completion. Animation is driven by
    /// continuous redraw requests under [`ControlFlow::Poll`].
    pub fn run(&mut self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("creating the event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(self).context("running the event loop")?;
        match self.exit_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = Window::default_attributes()
            .with_title(APP_NAME)
            .with_inner_size(PhysicalSize::new(FRAME_WIDTH, FRAME_HEIGHT));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("creating the application window")?,
        );
        let size = window.inner_size();
        log::info!("created {}x{} window", size.width, size.height);

        let surface =
            RenderSurface::new(window.clone()).context("initializing the render surface")?;
        let scene = Scene::new(&surface).context("building the demo scene")?;

        self.window = Some(window);
        self.surface = Some(surface);
        self.scene = Some(scene);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(surface), Some(scene)) = (self.surface.as_mut(), self.scene.as_mut()) else {
            return;
        };
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        scene.update(dt);
        if let Err(err) = scene.draw(surface) {
            self.fail(
                event_loop,
                anyhow::Error::new(err).context("presenting a frame"),
            );
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        match &event.logical_key {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Character(text) => {
                if let (Some(scene), Some(key)) = (self.scene.as_mut(), text.chars().next()) {
                    scene.on_key_down(key);
                }
            }
            _ => {}
        }
    }

    /// Stashes a fatal error and asks the loop to wind down; `run` turns
    /// it into the process exit status.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.exit_error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Some platforms deliver resumed more than once; the window and its
        // resources are only built the first time.
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let (Some(surface), Some(scene)) = (self.surface.as_mut(), self.scene.as_mut())
                {
                    if let Err(err) = scene.resize(surface, size.width, size.height) {
                        self.fail(
                            event_loop,
                            anyhow::Error::new(err).context("resizing the render surface"),
                        );
                    }
                }
            }
            WindowEvent::Occluded(occluded) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.set_occluded(occluded);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    self.on_key(event_loop, &event);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.on_pointer_moved(position.x as f32, position.y as f32);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Keep the animation running: one redraw per loop iteration.
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// End of File
