// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! Seam between the render surface and the window it presents to.
//!
//! The production implementation is [`gpu::WgpuPresenter`](super::gpu); tests
//! substitute a scripted presenter so the device-loss contract can be
//! exercised without a display.

use crate::canvas::Canvas;

use super::error::PresentError;

/// What happened to the presentation target during a presenter call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PresentOutcome {
    /// The target was recreated in place; resources keyed to the previous
    /// target are now stale.
    pub target_rebuilt: bool,
}

/// Presents finished canvases to the window.
pub(crate) trait Present {
    /// Current target size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Whether a frame presented now could reach the screen. False while
    /// the window is minimized, zero-sized, or occluded.
    fn is_presentable(&self) -> bool;

    /// Records the OS-reported occlusion state of the window.
    fn set_occluded(&mut self, occluded: bool);

    /// Reconfigures the target for a new window size. A zero dimension
    /// marks the target unpresentable and leaves it otherwise untouched.
    fn resize(&mut self, width: u32, height: u32) -> Result<PresentOutcome, PresentError>;

    /// Uploads and presents `canvas`. Detected device loss is recovered
    /// in place (at most one attempt) and reported via the outcome.
    fn present(&mut self, canvas: &Canvas) -> Result<PresentOutcome, PresentError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Mutable script shared between a test and its presenter.
    #[derive(Default)]
    pub(crate) struct Script {
        pub occluded: bool,
        pub minimized: bool,
        pub lose_next_present: bool,
        pub rebuild_on_next_resize: bool,
        pub fail_next_present: bool,
        pub present_count: usize,
        pub resize_count: usize,
    }

    /// Presenter whose behavior is driven by a [`Script`], for exercising
    /// the begin/end bracket and rebuild contract headlessly.
    pub(crate) struct ScriptedPresenter {
        width: u32,
        height: u32,
        script: Rc<RefCell<Script>>,
    }

    impl ScriptedPresenter {
        pub(crate) fn new(width: u32, height: u32) -> (Self, Rc<RefCell<Script>>) {
            let script = Rc::new(RefCell::new(Script::default()));
            (
                Self {
                    width,
                    height,
                    script: script.clone(),
                },
                script,
            )
        }
    }

    impl Present for ScriptedPresenter {
        fn dimensions(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn is_presentable(&self) -> bool {
            let script = self.script.borrow();
            !script.occluded && !script.minimized
        }

        fn set_occluded(&mut self, occluded: bool) {
            self.script.borrow_mut().occluded = occluded;
        }

        fn resize(&mut self, width: u32, height: u32) -> Result<PresentOutcome, PresentError> {
            let mut script = self.script.borrow_mut();
            script.resize_count += 1;
            if width == 0 || height == 0 {
                script.minimized = true;
                return Ok(PresentOutcome::default());
            }
            script.minimized = false;
            self.width = width;
            self.height = height;
            Ok(PresentOutcome {
                target_rebuilt: std::mem::take(&mut script.rebuild_on_next_resize),
            })
        }

        fn present(&mut self, _canvas: &Canvas) -> Result<PresentOutcome, PresentError> {
            let mut script = self.script.borrow_mut();
            script.present_count += 1;
            if std::mem::take(&mut script.fail_next_present) {
                return Err(PresentError::Acquire(wgpu::SurfaceError::OutOfMemory));
            }
            Ok(PresentOutcome {
                target_rebuilt: std::mem::take(&mut script.lose_next_present),
            })
        }
    }
}

// End of File
