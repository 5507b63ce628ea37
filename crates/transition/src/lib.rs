//! Page transition state machine.
//!
//! [`TransitionController`] owns the shader uniforms and alternates between a
//! closing sequence (the overlay sweeps in and covers the page) and an opening
//! sequence (it sweeps away again) each time the host fires a trigger. Each
//! sequence is a fresh [`timeline::Timeline`]: a progress tween that requests a
//! redraw on every tick, plus a short bend pulse on `power`.
//!
//! Rendering goes through the [`RenderSurface`] trait so the state machine can
//! be exercised without a GPU, and time goes through the injected
//! [`timeline::TimelineEngine`], so a test can fast-forward a sequence in one
//! call.

mod controller;
mod sequence;
mod surface;
mod uniforms;

pub use controller::{
    EventKind, HostEvent, Phase, TransitionController, TransitionOptions, Trigger,
};
pub use sequence::{BendTiming, Cue, Sequence, SequenceTiming};
pub use surface::{RenderSurface, SurfaceOptions, Viewport, MAX_PIXEL_RATIO};
pub use uniforms::UniformStore;

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("failed to initialise render surface: {0}")]
    Surface(#[source] Box<dyn std::error::Error + Send + Sync>),
}
