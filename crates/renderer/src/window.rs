use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::{error, info};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use timeline::Ticker;
use transition::{HostEvent, TransitionController, Viewport};

use crate::gpu::GpuSurface;
use crate::RendererConfig;

type Controller = TransitionController<GpuSurface>;

/// Measures the time between animation ticks. Idle periods are not counted.
#[derive(Debug, Default)]
struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    fn tick(&mut self, now: Instant) -> Duration {
        let dt = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last = Some(now);
        dt
    }

    fn stop(&mut self) {
        self.last = None;
    }
}

fn viewport_of(window: &Window) -> Viewport {
    let size = window.inner_size();
    Viewport::new(size.width, size.height).with_scale_factor(window.scale_factor())
}

/// Maps a window event to the host event it stands for.
fn host_event(
    event: &WindowEvent,
    scale_factor: f64,
    size: PhysicalSize<u32>,
) -> Option<HostEvent> {
    match event {
        WindowEvent::MouseInput {
            state: ElementState::Pressed,
            button: MouseButton::Left,
            ..
        } => Some(HostEvent::Trigger),
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: ElementState::Pressed,
                    logical_key: Key::Named(NamedKey::Space | NamedKey::Enter),
                    repeat: false,
                    ..
                },
            ..
        } => Some(HostEvent::Trigger),
        WindowEvent::Resized(new_size) => Some(HostEvent::Resize(
            Viewport::new(new_size.width, new_size.height).with_scale_factor(scale_factor),
        )),
        WindowEvent::ScaleFactorChanged { scale_factor, .. } => Some(HostEvent::Resize(
            Viewport::new(size.width, size.height).with_scale_factor(*scale_factor),
        )),
        _ => None,
    }
}

/// Opens the overlay window and drives the `winit` event loop.
///
/// Input and resize events are forwarded to the controller; while a sequence
/// plays the loop wakes at the configured frame interval and advances the
/// timeline by the wall-clock time that passed.
pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let (width, height) = config.window_size;
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(width, height))
        .with_transparent(config.surface.alpha)
        .build(&event_loop)
        .context("failed to create overlay window")?;
    let window = Arc::new(window);

    let surface_options = config.surface;
    let surface_window = window.clone();
    let mut controller: Controller = TransitionController::initialize(
        move |viewport| GpuSurface::new(surface_window, viewport, surface_options),
        viewport_of(&window),
        Ticker::new(),
        config.transition,
    )
    .context("failed to initialise transition overlay")?;
    info!(
        width,
        height,
        "overlay ready; click, Space or Enter to play the transition"
    );

    let frame_interval = config.frame_interval;
    let mut clock = FrameClock::default();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                if let Some(host) = host_event(&event, window.scale_factor(), window.inner_size()) {
                    // A started sequence is picked up by the next `AboutToWait`.
                    controller.dispatch(host);
                    return;
                }
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        controller.dispose();
                        elwt.exit();
                    }
                    WindowEvent::RedrawRequested => {
                        controller.draw_frame();
                        if controller.surface().is_out_of_memory() {
                            error!("GPU out of memory; exiting");
                            elwt.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                if !controller.wants_frames() {
                    clock.stop();
                    elwt.set_control_flow(ControlFlow::Wait);
                    return;
                }
                let now = Instant::now();
                controller.advance(clock.tick(now));
                if controller.surface().is_out_of_memory() {
                    error!("GPU out of memory; exiting");
                    elwt.exit();
                } else if controller.wants_frames() {
                    elwt.set_control_flow(ControlFlow::WaitUntil(now + frame_interval));
                } else {
                    clock.stop();
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clock_measures_between_ticks() {
        let mut clock = FrameClock::default();
        let start = Instant::now();
        assert_eq!(clock.tick(start), Duration::ZERO);
        assert_eq!(
            clock.tick(start + Duration::from_millis(16)),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn frame_clock_restarts_after_idle() {
        let mut clock = FrameClock::default();
        let start = Instant::now();
        clock.tick(start);
        clock.stop();
        assert_eq!(clock.tick(start + Duration::from_secs(5)), Duration::ZERO);
    }

    #[test]
    fn resize_events_carry_scale_factor() {
        let event = WindowEvent::Resized(PhysicalSize::new(1024, 768));
        let host = host_event(&event, 2.0, PhysicalSize::new(1, 1));
        assert_eq!(
            host,
            Some(HostEvent::Resize(
                Viewport::new(1024, 768).with_scale_factor(2.0)
            ))
        );
    }

    #[test]
    fn unrelated_events_are_ignored() {
        let event = WindowEvent::Focused(true);
        assert_eq!(host_event(&event, 1.0, PhysicalSize::new(1, 1)), None);
    }
}
