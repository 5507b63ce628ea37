use std::time::Duration;

use timeline::{Ticker, TimelineEngine};
use tracing::{debug, trace};

use crate::sequence::{self, Cue, Sequence, SequenceTiming};
use crate::surface::{RenderSurface, Viewport};
use crate::{TransitionError, UniformStore};

/// Closed set of controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PlayingOpening,
    PlayingClosing,
}

impl Phase {
    fn playing(sequence: Sequence) -> Self {
        match sequence {
            Sequence::Opening => Phase::PlayingOpening,
            Sequence::Closing => Phase::PlayingClosing,
        }
    }
}

/// Outcome of [`TransitionController::trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Started(Sequence),
    /// A sequence is still running; nothing changed.
    Ignored,
}

/// Host event kinds the controller subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Trigger,
    Resize,
}

/// Events the host forwards from its window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Trigger,
    Resize(Viewport),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Trigger => EventKind::Trigger,
            HostEvent::Resize(_) => EventKind::Resize,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Bindings {
    trigger: bool,
    resize: bool,
}

impl Bindings {
    fn is_bound(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Trigger => self.trigger,
            EventKind::Resize => self.resize,
        }
    }

    fn any(&self) -> bool {
        self.trigger || self.resize
    }
}

/// Controller behaviour knobs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransitionOptions {
    pub timing: SequenceTiming,
    /// Draw on every advance, not only on progress ticks.
    pub continuous_redraw: bool,
}

/// Drives the page transition: alternates opening and closing sequences on
/// each trigger and renders through `S` whenever the uniforms move.
pub struct TransitionController<S, E = Ticker<UniformStore, Cue>> {
    surface: S,
    engine: E,
    uniforms: UniformStore,
    phase: Phase,
    reverse: bool,
    bindings: Bindings,
    options: TransitionOptions,
}

impl<S, E> TransitionController<S, E>
where
    S: RenderSurface,
    E: TimelineEngine<UniformStore, Cue>,
{
    /// Builds the surface, sizes it to `viewport`, draws the first frame and
    /// subscribes to host events.
    pub fn initialize<F, BuildErr>(
        build_surface: F,
        viewport: Viewport,
        engine: E,
        options: TransitionOptions,
    ) -> Result<Self, TransitionError>
    where
        F: FnOnce(Viewport) -> Result<S, BuildErr>,
        BuildErr: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let surface = build_surface(viewport).map_err(|err| TransitionError::Surface(err.into()))?;
        let mut controller = Self {
            surface,
            engine,
            uniforms: UniformStore::default(),
            phase: Phase::Idle,
            reverse: false,
            bindings: Bindings::default(),
            options,
        };
        controller.handle_resize(viewport);
        controller.draw_frame();
        controller.bindings = Bindings {
            trigger: true,
            resize: true,
        };
        debug!(
            width = viewport.width,
            height = viewport.height,
            duration_ms = options.timing.duration.as_millis() as u64,
            ease = %options.timing.ease,
            "transition controller ready"
        );
        Ok(controller)
    }

    /// Starts the next sequence unless one is already running.
    pub fn trigger(&mut self) -> Trigger {
        if self.is_animating() {
            trace!(phase = ?self.phase, "trigger ignored while animating");
            return Trigger::Ignored;
        }
        let next = if self.reverse {
            Sequence::Opening
        } else {
            Sequence::Closing
        };
        self.play(next);
        Trigger::Started(next)
    }

    fn play(&mut self, sequence: Sequence) {
        self.reverse = matches!(sequence, Sequence::Closing);
        self.phase = Phase::playing(sequence);
        let timeline = sequence::build(sequence, &self.options.timing);
        debug!(%sequence, duration_ms = timeline.duration().as_millis() as u64, "sequence started");
        self.engine.play(timeline);
    }

    /// Resizes the surface. Timelines and uniforms are left alone.
    pub fn handle_resize(&mut self, viewport: Viewport) {
        trace!(
            width = viewport.width,
            height = viewport.height,
            scale_factor = viewport.scale_factor,
            "resize"
        );
        self.surface.resize(viewport);
    }

    pub fn draw_frame(&mut self) {
        self.surface.render(&self.uniforms);
    }

    /// Moves running timelines forward by `dt` and reacts to their cues.
    pub fn advance(&mut self, dt: Duration) {
        let Self {
            surface,
            engine,
            uniforms,
            phase,
            ..
        } = self;
        engine.advance(dt, uniforms, &mut |uniforms, cue| match cue {
            Cue::Redraw => surface.render(uniforms),
            Cue::Finished => {
                debug!(phase = ?phase, "sequence finished");
                *phase = Phase::Idle;
            }
        });
        if self.options.continuous_redraw {
            self.draw_frame();
        }
    }

    /// Routes a host event to its entry point if still subscribed. Returns
    /// whether the event was handled.
    pub fn dispatch(&mut self, event: HostEvent) -> bool {
        if !self.bindings.is_bound(event.kind()) {
            return false;
        }
        match event {
            HostEvent::Trigger => {
                self.trigger();
            }
            HostEvent::Resize(viewport) => self.handle_resize(viewport),
        }
        true
    }

    /// Unsubscribes from every host event. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.bindings.any() {
            debug!("transition controller disposed");
        }
        self.bindings = Bindings::default();
    }

    /// Whether the host should keep delivering frames.
    pub fn wants_frames(&self) -> bool {
        self.is_animating() || (self.options.continuous_redraw && !self.is_disposed())
    }
}

impl<S, E> TransitionController<S, E> {
    pub fn uniforms(&self) -> &UniformStore {
        &self.uniforms
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_animating(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Direction of the last sequence played: `true` after a closing run.
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    pub fn is_bound(&self, kind: EventKind) -> bool {
        self.bindings.is_bound(kind)
    }

    pub fn is_disposed(&self) -> bool {
        !self.bindings.any()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
