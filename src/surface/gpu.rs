// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

//! wgpu-backed presenter: owns the GPU device and window surface, and
//! stretches the finished canvas over the swapchain each frame.

use std::sync::Arc;

use pollster::FutureExt as _;
use winit::window::Window;

use crate::canvas::Canvas;

use super::error::{PresentError, SurfaceInitError};
use super::present::{Present, PresentOutcome};

/// Connects the CPU canvas to the window through wgpu.
///
/// The canvas is uploaded into a texture and drawn with a single fullscreen
/// triangle, so presentation cost is independent of scene content. Device
/// loss is handled where it surfaces in wgpu: at frame acquisition.
pub(crate) struct WgpuPresenter {
    /// Shared ownership of the window to ensure it outlives [`Self::surface`].
    window: Arc<Window>,
    surface_config: wgpu::SurfaceConfiguration,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    canvas_texture: wgpu::Texture,
    canvas_bind_group: wgpu::BindGroup,
    /// Set when the window reports a zero-sized resize; cleared on restore.
    minimized: bool,
    /// OS-reported occlusion, forwarded from the event loop.
    occluded: bool,
}

/// Canvas pixels are packed `0xAARRGGBB`, which is B, G, R, A in memory on
/// little-endian targets, so the texture and swapchain use the matching
/// BGRA sRGB format.
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

impl WgpuPresenter {
    /// Creates the device, window surface, and blit pipeline.
    ///
    /// Any failure here is fatal for the application; there is no fallback
    /// presentation path.
    pub(crate) fn new(window: Arc<Window>) -> Result<Self, SurfaceInitError> {
        async {
            let actual_size = window.inner_size();

            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                // Prefer a first-class backend for the platform, with GL as
                // the fallback of last resort.
                backends: wgpu::Backends::PRIMARY | wgpu::Backends::GL,
                flags: wgpu::InstanceFlags::from_build_config().with_env(),
                ..Default::default()
            });

            let surface = instance.create_surface(window.clone())?;

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    force_fallback_adapter: false,
                    // Must be able to present to this window.
                    compatible_surface: Some(&surface),
                })
                .await?;
            log::info!("using graphics adapter {:?}", adapter.get_info().name);

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("main device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    ..Default::default()
                })
                .await?;

            let surface_config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: TARGET_FORMAT,
                width: actual_size.width.max(1),
                height: actual_size.height.max(1),
                present_mode: wgpu::PresentMode::AutoVsync,
                desired_maximum_frame_latency: 2,
                alpha_mode: wgpu::CompositeAlphaMode::Auto,
                view_formats: vec![TARGET_FORMAT],
            };
            surface.configure(&device, &surface_config);

            let shader = device.create_shader_module(wgpu::include_wgsl!("blit.wgsl"));

            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("canvas blit bindings"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

            let pipeline_layout =
                device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("canvas blit layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    push_constant_ranges: &[],
                });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("canvas blit pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(TARGET_FORMAT.into())],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

            // The canvas maps 1:1 onto the window in the common case, so
            // nearest sampling keeps pixel edges crisp.
            let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("canvas sampler"),
                mag_filter: wgpu::FilterMode::Nearest,
                min_filter: wgpu::FilterMode::Nearest,
                ..Default::default()
            });

            let (canvas_texture, canvas_bind_group) = create_canvas_texture(
                &device,
                &bind_group_layout,
                &sampler,
                surface_config.width,
                surface_config.height,
            );

            Ok(Self {
                window,
                surface_config,
                surface,
                device,
                queue,
                pipeline,
                bind_group_layout,
                sampler,
                canvas_texture,
                canvas_bind_group,
                minimized: false,
                occluded: false,
            })
        }
        .block_on()
    }

    /// Reconfigures the surface from the live window size after a detected
    /// loss. The canvas texture is refreshed lazily on the next upload.
    fn rebuild_target(&mut self) {
        let size = self.window.inner_size();
        let limit = self.device.limits().max_texture_dimension_2d;
        self.surface_config.width = size.width.clamp(1, limit);
        self.surface_config.height = size.height.clamp(1, limit);
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Recreates the canvas texture when the canvas changed size.
    fn sync_canvas_texture(&mut self, canvas: &Canvas) {
        if self.canvas_texture.width() != canvas.width()
            || self.canvas_texture.height() != canvas.height()
        {
            let (texture, bind_group) = create_canvas_texture(
                &self.device,
                &self.bind_group_layout,
                &self.sampler,
                canvas.width(),
                canvas.height(),
            );
            self.canvas_texture = texture;
            self.canvas_bind_group = bind_group;
        }
    }

    fn upload_canvas(&self, canvas: &Canvas) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.canvas_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(canvas.pixels()),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * canvas.width()),
                rows_per_image: Some(canvas.height()),
            },
            wgpu::Extent3d {
                width: canvas.width(),
                height: canvas.height(),
                depth_or_array_layers: 1,
            },
        );
    }
}

impl Present for WgpuPresenter {
    fn dimensions(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    fn is_presentable(&self) -> bool {
        !self.minimized && !self.occluded
    }

    fn set_occluded(&mut self, occluded: bool) {
        self.occluded = occluded;
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<PresentOutcome, PresentError> {
        if width == 0 || height == 0 {
            // Minimized; keep the old configuration and decline frames
            // until the window is restored.
            self.minimized = true;
            return Ok(PresentOutcome::default());
        }
        self.minimized = false;

        let limit = self.device.limits().max_texture_dimension_2d;
        if width > limit || height > limit {
            log::warn!(
                "Window size {}x{} is greater than the maximum texture dimension {}; upscaling will occur.",
                width,
                height,
                limit
            );
        }
        let width = width.min(limit);
        let height = height.min(limit);
        if self.surface_config.width != width || self.surface_config.height != height {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.device, &self.surface_config);
        }
        Ok(PresentOutcome::default())
    }

    fn present(&mut self, canvas: &Canvas) -> Result<PresentOutcome, PresentError> {
        let mut rebuilt = false;
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Timeout) => {
                log::trace!("frame acquisition timed out; skipping this present");
                None
            }
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("presentation target lost ({err}); rebuilding in place");
                self.rebuild_target();
                rebuilt = true;
                match self.surface.get_current_texture() {
                    Ok(frame) => Some(frame),
                    Err(wgpu::SurfaceError::Timeout) => None,
                    Err(err) => return Err(PresentError::Recovery(err)),
                }
            }
            Err(err) => return Err(PresentError::Acquire(err)),
        };
        let Some(frame) = frame else {
            // Nothing was presented, but a rebuild may still have happened
            // and the caller's resources are stale either way.
            return Ok(PresentOutcome {
                target_rebuilt: rebuilt,
            });
        };

        self.sync_canvas_texture(canvas);
        self.upload_canvas(canvas);

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("canvas blit"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("canvas blit pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.canvas_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(PresentOutcome {
            target_rebuilt: rebuilt,
        })
    }
}

fn create_canvas_texture(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("canvas texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("canvas blit bind group"),
        layout: bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    (texture, bind_group)
}

// End of File
