use anyhow::{anyhow, Context as AnyhowContext, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::TextureFormatFeatureFlags;
use winit::dpi::PhysicalSize;

use transition::SurfaceOptions;

/// Multisample count requested when antialiasing is on.
const PREFERRED_SAMPLES: u32 = 4;

pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub sample_count: u32,
    pub surface_format: wgpu::TextureFormat,
}

impl GpuContext {
    /// The surface borrows `target`'s raw handles, so the caller must keep the
    /// window alive for as long as the context exists.
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        options: &SurfaceOptions,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;

        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .context("failed to create rendering surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let adapter_info = adapter.get_info();
        let is_software = adapter_info.device_type == wgpu::DeviceType::Cpu;
        tracing::debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected GPU adapter"
        );

        let surface_caps = surface.get_capabilities(&adapter);
        let fallback_format = *surface_caps
            .formats
            .first()
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
        // Colours are handed over as sRGB values and written without conversion.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .unwrap_or_else(|| {
                tracing::warn!(
                    fallback = ?fallback_format,
                    "no non-sRGB surface format available; colours will be re-encoded"
                );
                fallback_format
            });

        let format_features = adapter.get_texture_format_features(surface_format);
        let sample_count = if options.antialias {
            select_sample_count(
                &format_features.flags.supported_sample_counts(),
                format_features
                    .flags
                    .contains(TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE),
                is_software,
            )
        } else {
            1
        };

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("pagewipe device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        let alpha_mode = select_alpha_mode(&surface_caps.alpha_modes, options.alpha);
        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .unwrap_or(wgpu::PresentMode::AutoVsync);
        tracing::debug!(
            ?surface_format,
            ?alpha_mode,
            ?present_mode,
            sample_count,
            "configuring surface"
        );

        let size = PhysicalSize::new(initial_size.width.max(1), initial_size.height.max(1));
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
            sample_count,
            surface_format,
        })
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Re-applies the current configuration after the swapchain was lost.
    pub(crate) fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

fn select_sample_count(supported: &[u32], can_resolve: bool, is_software: bool) -> u32 {
    if !can_resolve {
        tracing::warn!("surface format does not support MSAA resolve; disabling antialiasing");
        return 1;
    }
    if is_software {
        tracing::warn!("software rasterizer detected; disabling antialiasing");
        return 1;
    }
    supported
        .iter()
        .copied()
        .filter(|&count| count <= PREFERRED_SAMPLES)
        .max()
        .unwrap_or(1)
}

fn select_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    transparent: bool,
) -> wgpu::CompositeAlphaMode {
    let preferred: &[wgpu::CompositeAlphaMode] = if transparent {
        &[
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
            wgpu::CompositeAlphaMode::Inherit,
        ]
    } else {
        &[wgpu::CompositeAlphaMode::Opaque]
    };
    if let Some(mode) = preferred.iter().find(|mode| supported.contains(mode)) {
        return *mode;
    }
    let fallback = supported
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);
    if transparent {
        tracing::warn!(
            ?fallback,
            "compositor offers no transparent alpha mode; overlay background will be opaque"
        );
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_count_caps_at_four() {
        assert_eq!(select_sample_count(&[1, 2, 4, 8], true, false), 4);
        assert_eq!(select_sample_count(&[1, 2], true, false), 2);
        assert_eq!(select_sample_count(&[], true, false), 1);
    }

    #[test]
    fn sample_count_drops_without_resolve_or_on_software() {
        assert_eq!(select_sample_count(&[1, 4], false, false), 1);
        assert_eq!(select_sample_count(&[1, 4], true, true), 1);
    }

    #[test]
    fn transparent_surfaces_prefer_premultiplied() {
        use wgpu::CompositeAlphaMode as Mode;
        assert_eq!(
            select_alpha_mode(&[Mode::Opaque, Mode::PreMultiplied], true),
            Mode::PreMultiplied
        );
        assert_eq!(
            select_alpha_mode(&[Mode::Opaque, Mode::Inherit], true),
            Mode::Inherit
        );
        assert_eq!(select_alpha_mode(&[Mode::Opaque], true), Mode::Opaque);
        assert_eq!(
            select_alpha_mode(&[Mode::PreMultiplied, Mode::Opaque], false),
            Mode::Opaque
        );
    }
}
