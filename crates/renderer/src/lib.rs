//! GPU surface and window host for the page transition overlay.
//!
//! ```text
//!   CLI / pagewipe
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ winit event loop ──▶ TransitionController
//!                         │  click/resize        │ Cue::Redraw
//!                         └──────────────────────┴─▶ GpuSurface::render ─▶ GPU UBO
//! ```
//!
//! [`GpuSurface`] implements [`transition::RenderSurface`] on top of `wgpu`:
//! one pipeline, one oversized triangle and one uniform block. The window
//! loop owns the controller, forwards clicks, key presses and resizes to it
//! and advances its timelines while a sequence is playing.

mod camera;
mod compile;
mod gpu;
mod window;

use std::time::Duration;

use anyhow::Result;
use transition::{SurfaceOptions, TransitionOptions};

pub use camera::{
    backbuffer_size, mesh_scale, overlay_transform, Mat4, OrthoCamera, CAMERA_FAR, CAMERA_NEAR,
    CAMERA_Z, TRIANGLE_POSITIONS, TRIANGLE_UVS,
};
pub use gpu::GpuSurface;

/// Everything the window host needs to open and animate the overlay.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub title: String,
    /// Initial inner size in physical pixels.
    pub window_size: (u32, u32),
    /// Wake-up interval while a sequence plays.
    pub frame_interval: Duration,
    pub surface: SurfaceOptions,
    pub transition: TransitionOptions,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "pagewipe".into(),
            window_size: (1280, 720),
            frame_interval: Duration::from_millis(16),
            surface: SurfaceOptions::default(),
            transition: TransitionOptions::default(),
        }
    }
}

pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and blocks until it is closed.
    pub fn run(&self) -> Result<()> {
        window::run(&self.config)
    }
}
