//! Tweening engine for the page transition overlay.
//!
//! A [`Timeline`] is plain data: tweens that move a float field of some
//! target type, instantaneous `set` steps, cues and nested child timelines,
//! each placed at an offset. Nothing runs until an engine advances it.
//! [`Ticker`] is the engine used at runtime and in tests; the host decides how
//! much time passes per frame, so a test can fast-forward a whole sequence in
//! one call.
//!
//! Callbacks are modelled as cue values of a caller-chosen type `C`. The engine
//! hands each cue back together with `&mut T`, so the caller keeps ownership of
//! everything it needs to react (renderer, state machine) without closures
//! capturing shared state.

mod ease;
mod ticker;
mod timeline;

use std::time::Duration;

pub use ease::Ease;
pub use ticker::{Ticker, TimelineId};
pub use timeline::{At, FlagField, FloatField, Status, Timeline, Tween, TweenDefaults};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("unknown ease '{0}'")]
    UnknownEase(String),
}

/// Scheduling capability consumed by the transition controller.
pub trait TimelineEngine<T, C> {
    /// Starts playing `timeline` from its beginning on the next advance.
    fn play(&mut self, timeline: Timeline<T, C>) -> TimelineId;
    fn pause(&mut self, id: TimelineId) -> bool;
    fn resume(&mut self, id: TimelineId) -> bool;
    /// Drops the timeline without rendering its remaining items.
    fn kill(&mut self, id: TimelineId) -> bool;
    /// Moves every unpaused timeline forward by `dt`.
    fn advance(&mut self, dt: Duration, target: &mut T, on_cue: &mut dyn FnMut(&mut T, C));
    fn is_idle(&self) -> bool;
    /// Longest remaining play time across owned timelines.
    fn remaining(&self) -> Option<Duration>;
}
