//! GPU side of the overlay.
//!
//! - `context` owns wgpu instance/device/surface wiring and rebuilds the
//!   swapchain when the window resizes.
//! - `pipeline` builds the single render pipeline and the fixed triangle
//!   vertex buffer.
//! - `uniforms` mirrors the shader's uniform block.
//! - `state` glues everything together behind [`transition::RenderSurface`].

mod context;
mod pipeline;
mod state;
mod uniforms;

pub use state::GpuSurface;
