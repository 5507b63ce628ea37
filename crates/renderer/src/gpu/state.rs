use std::sync::Arc;

use anyhow::Result;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use transition::{RenderSurface, SurfaceOptions, UniformStore, Viewport};

use super::context::GpuContext;
use super::pipeline::OverlayPipeline;
use super::uniforms::TransitionUniforms;
use crate::camera;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// `wgpu` implementation of [`RenderSurface`] drawing into a `winit` window.
///
/// Frame acquisition failures never escape `render`: a lost or outdated
/// swapchain is reconfigured, timeouts are retried on the next frame and an
/// out-of-memory condition is latched for the event loop to act on.
pub struct GpuSurface {
    context: GpuContext,
    pipeline: OverlayPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: TransitionUniforms,
    multisample_target: Option<MultisampleTarget>,
    options: SurfaceOptions,
    viewport: Viewport,
    out_of_memory: bool,
    // Dropped after the surface that borrows its handles.
    _window: Arc<Window>,
}

impl GpuSurface {
    pub fn new(window: Arc<Window>, viewport: Viewport, options: SurfaceOptions) -> Result<Self> {
        let (width, height) =
            camera::backbuffer_size(viewport, options.pixel_ratio_cap).unwrap_or((1, 1));
        let context = GpuContext::new(window.as_ref(), PhysicalSize::new(width, height), &options)?;
        let pipeline =
            OverlayPipeline::new(&context.device, context.surface_format, context.sample_count);

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("overlay uniform buffer"),
            size: std::mem::size_of::<TransitionUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("overlay uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let uniforms = TransitionUniforms::new(
            context.size.width,
            context.size.height,
            options.overlay_color,
        );
        let multisample_target = Self::multisample_target(&context);

        Ok(Self {
            context,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            multisample_target,
            options,
            viewport,
            out_of_memory: false,
            _window: window,
        })
    }

    /// The GPU ran out of memory while acquiring a frame; the window should
    /// close.
    pub fn is_out_of_memory(&self) -> bool {
        self.out_of_memory
    }

    fn multisample_target(context: &GpuContext) -> Option<MultisampleTarget> {
        (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        })
    }

    fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.options.clear_color;
        let a = if self.options.alpha {
            self.options.clear_alpha
        } else {
            1.0
        };
        // Premultiplied to match the blend state.
        wgpu::Color {
            r: f64::from(r * a),
            g: f64::from(g * a),
            b: f64::from(b * a),
            a: f64::from(a),
        }
    }

    fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.context.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("overlay encoder"),
                });
        {
            let (attachment_view, resolve_target) =
                if let Some(msaa) = self.multisample_target.as_ref() {
                    (&msaa.view, Some(&view))
                } else {
                    (&view, None)
                };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("overlay pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.pipeline.vertex_buffer.slice(..));
            render_pass.draw(0..3, 0..1);
        }

        self.context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl RenderSurface for GpuSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let Some((width, height)) = camera::backbuffer_size(viewport, self.options.pixel_ratio_cap)
        else {
            tracing::trace!(
                width = viewport.width,
                height = viewport.height,
                "skipping reconfigure for degenerate viewport"
            );
            return;
        };

        self.context.resize(PhysicalSize::new(width, height));
        self.uniforms.set_resolution(width, height);
        self.multisample_target = Self::multisample_target(&self.context);
    }

    fn render(&mut self, uniforms: &UniformStore) {
        if self.viewport.is_degenerate() || self.out_of_memory {
            return;
        }
        self.uniforms.apply(uniforms);

        match self.present() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated; reconfiguring");
                self.context.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("surface out of memory");
                self.out_of_memory = true;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout; retrying next frame");
            }
            Err(other) => {
                tracing::warn!(error = ?other, "surface error; retrying next frame");
            }
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
