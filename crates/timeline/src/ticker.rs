use std::time::Duration;

use tracing::trace;

use crate::timeline::{Status, Timeline};
use crate::TimelineEngine;

/// Handle to a timeline while the ticker owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimelineId(u64);

struct Playing<T, C> {
    id: TimelineId,
    timeline: Timeline<T, C>,
    paused: bool,
}

/// Frame-driven timeline scheduler.
///
/// The ticker has no clock of its own: the host hands it the time elapsed
/// since the previous frame. Tests drive it with fixed steps, which makes
/// every run deterministic.
pub struct Ticker<T, C> {
    active: Vec<Playing<T, C>>,
    next_id: u64,
}

impl<T, C> Default for Ticker<T, C> {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T, C: Clone> Ticker<T, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn find(&mut self, id: TimelineId) -> Option<&mut Playing<T, C>> {
        self.active.iter_mut().find(|playing| playing.id == id)
    }
}

impl<T, C: Clone> TimelineEngine<T, C> for Ticker<T, C> {
    fn play(&mut self, timeline: Timeline<T, C>) -> TimelineId {
        let id = TimelineId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        trace!(id = id.0, duration_ms = timeline.duration().as_millis() as u64, "timeline playing");
        self.active.push(Playing {
            id,
            timeline,
            paused: false,
        });
        id
    }

    fn pause(&mut self, id: TimelineId) -> bool {
        match self.find(id) {
            Some(playing) => {
                playing.paused = true;
                true
            }
            None => false,
        }
    }

    fn resume(&mut self, id: TimelineId) -> bool {
        match self.find(id) {
            Some(playing) => {
                playing.paused = false;
                true
            }
            None => false,
        }
    }

    fn kill(&mut self, id: TimelineId) -> bool {
        let before = self.active.len();
        self.active.retain(|playing| playing.id != id);
        let killed = self.active.len() != before;
        if killed {
            trace!(id = id.0, "timeline killed");
        }
        killed
    }

    fn advance(&mut self, dt: Duration, target: &mut T, on_cue: &mut dyn FnMut(&mut T, C)) {
        self.active.retain_mut(|playing| {
            if playing.paused {
                return true;
            }
            match playing.timeline.advance(dt, target, on_cue) {
                Status::Running => true,
                Status::Complete => {
                    trace!(id = playing.id.0, "timeline complete");
                    false
                }
            }
        });
    }

    fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    fn remaining(&self) -> Option<Duration> {
        self.active
            .iter()
            .map(|playing| playing.timeline.remaining())
            .max()
    }
}
