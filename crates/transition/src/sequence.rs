use std::fmt;
use std::time::Duration;

use timeline::{At, Ease, Timeline, Tween, TweenDefaults};

use crate::UniformStore;

/// Named callbacks the transition timelines emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Uniforms changed; draw a frame.
    Redraw,
    /// The whole sequence has rendered its final state.
    Finished,
}

/// One of the two alternating animation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    /// Overlay sweeps away (`progress` to 0) and ends in its resting state.
    Opening,
    /// Overlay sweeps in and covers the page (`progress` to 1).
    Closing,
}

impl Sequence {
    fn target_progress(self) -> f32 {
        match self {
            Sequence::Opening => 0.0,
            Sequence::Closing => 1.0,
        }
    }

    fn toggles_out_flag(self) -> bool {
        matches!(self, Sequence::Opening)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Opening => f.write_str("opening"),
            Sequence::Closing => f.write_str("closing"),
        }
    }
}

/// How the bend pulse is laid under the progress tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BendTiming {
    /// Pulse plays at its own rate from the start of the sequence.
    Natural,
    /// Pulse playhead is driven across the whole sequence with the sequence
    /// ease.
    #[default]
    Stretched,
}

/// Timing of the progress tween and the bend pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceTiming {
    pub duration: Duration,
    pub ease: Ease,
    /// Length of each half of the bend pulse.
    pub bend_duration: Duration,
    pub bend_ease: Ease,
    pub bend_timing: BendTiming,
}

impl Default for SequenceTiming {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1250),
            ease: Ease::InOutQuart,
            bend_duration: Duration::from_millis(500),
            bend_ease: Ease::Linear,
            bend_timing: BendTiming::default(),
        }
    }
}

/// Builds a fresh timeline for `sequence`.
pub(crate) fn build(sequence: Sequence, timing: &SequenceTiming) -> Timeline<UniformStore, Cue> {
    let toggle = sequence.toggles_out_flag();
    let mut timeline = Timeline::with_defaults(TweenDefaults {
        duration: timing.duration,
        ease: timing.ease,
    });

    if toggle {
        timeline.set_flag(UniformStore::out_flag_mut, false, At::Start);
    }
    timeline.to(
        Tween::to(UniformStore::progress_mut, sequence.target_progress()).on_update(Cue::Redraw),
        At::Start,
    );
    match timing.bend_timing {
        BendTiming::Natural => timeline.add(bend(timing), At::Start),
        BendTiming::Stretched => {
            timeline.scrub(bend(timing), At::Start, timing.duration, timing.ease)
        }
    };
    if toggle {
        timeline.set_flag(UniformStore::out_flag_mut, true, At::End);
    }
    timeline.on_complete(Cue::Finished);
    timeline
}

/// Pulse `power` up to 1 and straight back to 0.
pub(crate) fn bend(timing: &SequenceTiming) -> Timeline<UniformStore, Cue> {
    let mut pulse = Timeline::with_defaults(TweenDefaults {
        duration: timing.bend_duration,
        ease: timing.bend_ease,
    });
    pulse
        .to(Tween::to(UniformStore::power_mut, 1.0), At::End)
        .to(Tween::to(UniformStore::power_mut, 0.0), At::End);
    pulse
}
