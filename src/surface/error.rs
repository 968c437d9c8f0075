// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use thiserror::Error;

/// Fatal failures while connecting the render surface to the window at
/// startup. There is no recovery path for any of these.
#[derive(Debug, Error)]
pub enum SurfaceInitError {
    /// Failed to create a presentation surface for the window.
    ///
    /// Usually a platform/windowing system issue or an invalid window handle.
    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// No GPU adapter can present to the window.
    #[error("Failed to request adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to hand out a logical device.
    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Per-frame presentation failures that are not covered by the in-place
/// device-loss recovery.
#[derive(Debug, Error)]
pub enum PresentError {
    /// Acquiring a frame from the presentation target failed outright.
    #[error("Failed to acquire frame from presentation target: {0}")]
    Acquire(wgpu::SurfaceError),

    /// The target was lost, rebuilt, and then failed again on the retry.
    #[error("Presentation target could not be recovered after loss: {0}")]
    Recovery(wgpu::SurfaceError),
}

// End of File
