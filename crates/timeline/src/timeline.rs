use std::time::Duration;

use crate::Ease;

/// Lens onto an animatable float inside the target.
pub type FloatField<T> = fn(&mut T) -> &mut f32;

/// Lens onto a boolean flag inside the target.
pub type FlagField<T> = fn(&mut T) -> &mut bool;

/// Where an item is placed on its parent timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum At {
    /// Time zero of the timeline.
    Start,
    /// Absolute offset from the start of the timeline.
    Offset(Duration),
    /// Appended at the current end of the timeline.
    End,
}

/// Default duration and ease applied to tweens that do not override them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenDefaults {
    pub duration: Duration,
    pub ease: Ease,
}

impl Default for TweenDefaults {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(500),
            ease: Ease::OutQuad,
        }
    }
}

/// A float tween from the field's current value to `value`.
///
/// The start value is captured the first time the tween renders, not when it
/// is built, so a tween queued behind another one starts from wherever the
/// earlier tween left the field.
pub struct Tween<T, C> {
    field: FloatField<T>,
    value: f32,
    duration: Option<Duration>,
    ease: Option<Ease>,
    on_update: Option<C>,
}

impl<T, C> Tween<T, C> {
    pub fn to(field: FloatField<T>, value: f32) -> Self {
        Self {
            field,
            value,
            duration: None,
            ease: None,
            on_update: None,
        }
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    /// Cue delivered after every write this tween makes.
    pub fn on_update(mut self, cue: C) -> Self {
        self.on_update = Some(cue);
        self
    }
}

enum Item<T, C> {
    Tween {
        start: Duration,
        duration: Duration,
        ease: Ease,
        field: FloatField<T>,
        to: f32,
        from: Option<f32>,
        on_update: Option<C>,
        done: bool,
    },
    SetFloat {
        at: Duration,
        field: FloatField<T>,
        value: f32,
        fired: bool,
    },
    SetFlag {
        at: Duration,
        field: FlagField<T>,
        value: bool,
        fired: bool,
    },
    Call {
        at: Duration,
        cue: C,
        fired: bool,
    },
    Child {
        start: Duration,
        scrub: Option<(Duration, Ease)>,
        timeline: Box<Timeline<T, C>>,
        done: bool,
    },
}

impl<T, C: Clone> Item<T, C> {
    fn end(&self) -> Duration {
        match self {
            Item::Tween {
                start, duration, ..
            } => *start + *duration,
            Item::SetFloat { at, .. } | Item::SetFlag { at, .. } | Item::Call { at, .. } => *at,
            Item::Child {
                start,
                scrub,
                timeline,
                ..
            } => *start + scrub.map_or(timeline.total, |(duration, _)| duration),
        }
    }

    fn render(&mut self, time: Duration, target: &mut T, on_cue: &mut dyn FnMut(&mut T, C)) {
        match self {
            Item::Tween {
                start,
                duration,
                ease,
                field,
                to,
                from,
                on_update,
                done,
            } => {
                if *done || time < *start {
                    return;
                }
                let ratio = fraction(time - *start, *duration);
                let origin = *from.get_or_insert(*field(target));
                let value = if ratio >= 1.0 {
                    *done = true;
                    *to
                } else {
                    origin + (*to - origin) * ease.sample(ratio)
                };
                *field(target) = value;
                if let Some(cue) = on_update.as_ref() {
                    on_cue(target, cue.clone());
                }
            }
            Item::SetFloat {
                at,
                field,
                value,
                fired,
            } => {
                if !*fired && time >= *at {
                    *field(target) = *value;
                    *fired = true;
                }
            }
            Item::SetFlag {
                at,
                field,
                value,
                fired,
            } => {
                if !*fired && time >= *at {
                    *field(target) = *value;
                    *fired = true;
                }
            }
            Item::Call { at, cue, fired } => {
                if !*fired && time >= *at {
                    *fired = true;
                    on_cue(target, cue.clone());
                }
            }
            Item::Child {
                start,
                scrub,
                timeline,
                done,
            } => {
                if *done || time < *start {
                    return;
                }
                let local = time - *start;
                let (child_time, span_finished) = match *scrub {
                    None => (local, local >= timeline.total),
                    Some((span, ease)) => {
                        let ratio = fraction(local, span);
                        if ratio >= 1.0 {
                            (timeline.total, true)
                        } else {
                            (timeline.total.mul_f32(ease.sample(ratio)), false)
                        }
                    }
                };
                timeline.render_to(child_time, target, on_cue);
                *done = span_finished && timeline.completed;
            }
        }
    }
}

/// Share of `span` covered by `elapsed`, saturating at 1. Empty spans count as
/// finished.
fn fraction(elapsed: Duration, span: Duration) -> f32 {
    if span.is_zero() || elapsed >= span {
        1.0
    } else {
        (elapsed.as_secs_f64() / span.as_secs_f64()) as f32
    }
}

/// Progress reported after advancing a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Complete,
}

/// An ordered set of tweens, instantaneous steps and nested timelines.
///
/// Time only moves forward. Items render in the order they were added, so a
/// `set` placed after a tween at the same offset observes the tween's write.
pub struct Timeline<T, C> {
    defaults: TweenDefaults,
    items: Vec<Item<T, C>>,
    total: Duration,
    elapsed: Duration,
    started: bool,
    completed: bool,
    on_complete: Option<C>,
}

impl<T, C: Clone> Default for Timeline<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Clone> Timeline<T, C> {
    pub fn new() -> Self {
        Self::with_defaults(TweenDefaults::default())
    }

    pub fn with_defaults(defaults: TweenDefaults) -> Self {
        Self {
            defaults,
            items: Vec::new(),
            total: Duration::ZERO,
            elapsed: Duration::ZERO,
            started: false,
            completed: false,
            on_complete: None,
        }
    }

    pub fn to(&mut self, tween: Tween<T, C>, at: At) -> &mut Self {
        let start = self.resolve(at);
        let item = Item::Tween {
            start,
            duration: tween.duration.unwrap_or(self.defaults.duration),
            ease: tween.ease.unwrap_or(self.defaults.ease),
            field: tween.field,
            to: tween.value,
            from: None,
            on_update: tween.on_update,
            done: false,
        };
        self.push(item)
    }

    pub fn set(&mut self, field: FloatField<T>, value: f32, at: At) -> &mut Self {
        let at = self.resolve(at);
        self.push(Item::SetFloat {
            at,
            field,
            value,
            fired: false,
        })
    }

    pub fn set_flag(&mut self, field: FlagField<T>, value: bool, at: At) -> &mut Self {
        let at = self.resolve(at);
        self.push(Item::SetFlag {
            at,
            field,
            value,
            fired: false,
        })
    }

    /// Delivers `cue` once when playback reaches `at`.
    pub fn call(&mut self, cue: C, at: At) -> &mut Self {
        let at = self.resolve(at);
        self.push(Item::Call {
            at,
            cue,
            fired: false,
        })
    }

    /// Nests `child` so it plays at its own rate from `at`.
    pub fn add(&mut self, child: Timeline<T, C>, at: At) -> &mut Self {
        let start = self.resolve(at);
        self.push(Item::Child {
            start,
            scrub: None,
            timeline: Box::new(child),
            done: false,
        })
    }

    /// Nests `child` and drives its playhead from start to end over
    /// `duration`, shaped by `ease`.
    pub fn scrub(
        &mut self,
        child: Timeline<T, C>,
        at: At,
        duration: Duration,
        ease: Ease,
    ) -> &mut Self {
        let start = self.resolve(at);
        self.push(Item::Child {
            start,
            scrub: Some((duration, ease)),
            timeline: Box::new(child),
            done: false,
        })
    }

    /// Cue delivered once, after every item has rendered its final state.
    pub fn on_complete(&mut self, cue: C) -> &mut Self {
        self.on_complete = Some(cue);
        self
    }

    pub fn duration(&self) -> Duration {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.elapsed)
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Moves the playhead forward by `dt`, writing into `target` and handing
    /// every cue to `on_cue` in playback order.
    pub fn advance(
        &mut self,
        dt: Duration,
        target: &mut T,
        on_cue: &mut dyn FnMut(&mut T, C),
    ) -> Status {
        let time = self.elapsed.saturating_add(dt);
        self.render_to(time, target, on_cue);
        if self.completed {
            Status::Complete
        } else {
            Status::Running
        }
    }

    fn render_to(&mut self, time: Duration, target: &mut T, on_cue: &mut dyn FnMut(&mut T, C)) {
        if self.completed {
            return;
        }
        let time = time.max(self.elapsed).min(self.total);
        if self.started && time <= self.elapsed && time < self.total {
            return;
        }
        self.started = true;
        for item in &mut self.items {
            item.render(time, target, on_cue);
        }
        self.elapsed = time;
        if time >= self.total {
            self.completed = true;
            if let Some(cue) = self.on_complete.clone() {
                on_cue(target, cue);
            }
        }
    }

    fn resolve(&self, at: At) -> Duration {
        match at {
            At::Start => Duration::ZERO,
            At::Offset(offset) => offset,
            At::End => self.total,
        }
    }

    fn push(&mut self, item: Item<T, C>) -> &mut Self {
        self.total = self.total.max(item.end());
        self.items.push(item);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        value: f32,
        other: f32,
        flag: bool,
    }

    fn value(probe: &mut Probe) -> &mut f32 {
        &mut probe.value
    }

    fn other(probe: &mut Probe) -> &mut f32 {
        &mut probe.other
    }

    fn flag(probe: &mut Probe) -> &mut bool {
        &mut probe.flag
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Cue {
        Tick,
        Done,
        Marker,
    }

    fn run(
        timeline: &mut Timeline<Probe, Cue>,
        probe: &mut Probe,
        dt: Duration,
    ) -> (Status, Vec<Cue>) {
        let mut cues = Vec::new();
        let status = timeline.advance(dt, probe, &mut |_, cue| cues.push(cue));
        (status, cues)
    }

    #[test]
    fn tween_interpolates_from_captured_start() {
        let mut probe = Probe {
            value: 0.5,
            ..Probe::default()
        };
        let mut timeline = Timeline::new();
        timeline.to(
            Tween::to(value, 1.0)
                .duration(Duration::from_secs(1))
                .ease(Ease::Linear),
            At::Start,
        );

        run(&mut timeline, &mut probe, Duration::from_millis(500));
        assert!((probe.value - 0.75).abs() < 1e-5);

        let (status, _) = run(&mut timeline, &mut probe, Duration::from_secs(2));
        assert_eq!(status, Status::Complete);
        assert_eq!(probe.value, 1.0);
    }

    #[test]
    fn on_update_fires_once_per_render() {
        let mut probe = Probe::default();
        let mut timeline = Timeline::new();
        timeline.to(
            Tween::to(value, 1.0)
                .duration(Duration::from_millis(100))
                .on_update(Cue::Tick),
            At::Start,
        );

        let mut ticks = 0;
        for _ in 0..4 {
            let (_, cues) = run(&mut timeline, &mut probe, Duration::from_millis(25));
            ticks += cues.iter().filter(|cue| **cue == Cue::Tick).count();
        }
        assert_eq!(ticks, 4);
        assert!(timeline.is_complete());
    }

    #[test]
    fn appended_items_follow_previous_end() {
        let mut timeline: Timeline<Probe, Cue> = Timeline::with_defaults(TweenDefaults {
            duration: Duration::from_millis(500),
            ease: Ease::Linear,
        });
        timeline
            .to(Tween::to(value, 1.0), At::End)
            .to(Tween::to(value, 0.0), At::End)
            .call(Cue::Marker, At::End);
        assert_eq!(timeline.duration(), Duration::from_secs(1));

        let mut probe = Probe::default();
        run(&mut timeline, &mut probe, Duration::from_millis(500));
        assert_eq!(probe.value, 1.0);
        run(&mut timeline, &mut probe, Duration::from_millis(250));
        assert!((probe.value - 0.5).abs() < 1e-5);
        let (status, cues) = run(&mut timeline, &mut probe, Duration::from_millis(250));
        assert_eq!(status, Status::Complete);
        assert_eq!(probe.value, 0.0);
        assert_eq!(cues, vec![Cue::Marker]);
    }

    #[test]
    fn sets_fire_once_in_insertion_order() {
        let mut probe = Probe::default();
        let mut timeline = Timeline::new();
        timeline
            .set_flag(flag, true, At::Start)
            .to(
                Tween::to(value, 1.0).duration(Duration::from_millis(200)),
                At::Start,
            )
            .set_flag(flag, false, At::End)
            .set(other, 3.0, At::End)
            .on_complete(Cue::Done);

        let (_, cues) = run(&mut timeline, &mut probe, Duration::from_millis(100));
        assert!(probe.flag);
        assert!(cues.is_empty());

        let (status, cues) = run(&mut timeline, &mut probe, Duration::from_millis(100));
        assert_eq!(status, Status::Complete);
        assert!(!probe.flag);
        assert_eq!(probe.other, 3.0);
        assert_eq!(cues, vec![Cue::Done]);

        // Further advances never replay steps or cues.
        probe.flag = true;
        let (_, cues) = run(&mut timeline, &mut probe, Duration::from_millis(100));
        assert!(probe.flag);
        assert!(cues.is_empty());
    }

    #[test]
    fn nested_child_plays_at_its_own_rate() {
        let mut child = Timeline::with_defaults(TweenDefaults {
            duration: Duration::from_millis(100),
            ease: Ease::Linear,
        });
        child
            .to(Tween::to(other, 1.0), At::End)
            .to(Tween::to(other, 0.0), At::End);

        let mut parent = Timeline::new();
        parent
            .to(
                Tween::to(value, 1.0).duration(Duration::from_millis(400)),
                At::Start,
            )
            .add(child, At::Start);
        assert_eq!(parent.duration(), Duration::from_millis(400));

        let mut probe = Probe::default();
        run(&mut parent, &mut probe, Duration::from_millis(100));
        assert_eq!(probe.other, 1.0);
        run(&mut parent, &mut probe, Duration::from_millis(100));
        assert_eq!(probe.other, 0.0);
        run(&mut parent, &mut probe, Duration::from_millis(300));
        assert!(parent.is_complete());
        assert_eq!(probe.other, 0.0);
    }

    #[test]
    fn scrubbed_child_spans_requested_duration() {
        let mut child = Timeline::with_defaults(TweenDefaults {
            duration: Duration::from_millis(500),
            ease: Ease::Linear,
        });
        child
            .to(Tween::to(other, 1.0), At::End)
            .to(Tween::to(other, 0.0), At::End);

        let mut parent = Timeline::new();
        parent.scrub(child, At::Start, Duration::from_secs(2), Ease::Linear);
        assert_eq!(parent.duration(), Duration::from_secs(2));

        let mut probe = Probe::default();
        run(&mut parent, &mut probe, Duration::from_millis(500));
        assert!((probe.other - 0.5).abs() < 1e-4);
        run(&mut parent, &mut probe, Duration::from_millis(500));
        assert!((probe.other - 1.0).abs() < 1e-4);
        let (status, _) = run(&mut parent, &mut probe, Duration::from_secs(1));
        assert_eq!(status, Status::Complete);
        assert_eq!(probe.other, 0.0);
    }

    #[test]
    fn empty_timeline_completes_on_first_advance() {
        let mut timeline: Timeline<Probe, Cue> = Timeline::new();
        timeline.on_complete(Cue::Done);
        let mut probe = Probe::default();
        let (status, cues) = run(&mut timeline, &mut probe, Duration::ZERO);
        assert_eq!(status, Status::Complete);
        assert_eq!(cues, vec![Cue::Done]);
    }

    #[test]
    fn remaining_shrinks_as_playhead_moves() {
        let mut timeline: Timeline<Probe, Cue> = Timeline::new();
        timeline.to(
            Tween::to(value, 1.0).duration(Duration::from_secs(1)),
            At::Offset(Duration::from_millis(250)),
        );
        assert_eq!(timeline.duration(), Duration::from_millis(1250));

        let mut probe = Probe::default();
        run(&mut timeline, &mut probe, Duration::from_millis(200));
        assert_eq!(probe.value, 0.0, "tween must not write before its offset");
        assert_eq!(timeline.remaining(), Duration::from_millis(1050));
    }
}
