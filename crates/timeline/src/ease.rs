use std::fmt;
use std::str::FromStr;

use crate::TimelineError;

/// Maps normalized tween time onto an interpolation factor.
///
/// Names follow the GSAP vocabulary used by transition authors: `power1` is
/// quadratic, `power2` cubic, `power3` quartic and `power4` quintic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
}

impl Ease {
    /// Samples the curve at `t`, clamped to `[0, 1]`. Both endpoints are exact.
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::InQuad => ease_in(t, 2),
            Ease::OutQuad => ease_out(t, 2),
            Ease::InOutQuad => ease_in_out(t, 2),
            Ease::InCubic => ease_in(t, 3),
            Ease::OutCubic => ease_out(t, 3),
            Ease::InOutCubic => ease_in_out(t, 3),
            Ease::InQuart => ease_in(t, 4),
            Ease::OutQuart => ease_out(t, 4),
            Ease::InOutQuart => ease_in_out(t, 4),
            Ease::InQuint => ease_in(t, 5),
            Ease::OutQuint => ease_out(t, 5),
            Ease::InOutQuint => ease_in_out(t, 5),
        }
    }

    fn from_power(power: u8, shape: Shape) -> Option<Self> {
        let ease = match (power, shape) {
            (0, _) => Ease::Linear,
            (1, Shape::In) => Ease::InQuad,
            (1, Shape::Out) => Ease::OutQuad,
            (1, Shape::InOut) => Ease::InOutQuad,
            (2, Shape::In) => Ease::InCubic,
            (2, Shape::Out) => Ease::OutCubic,
            (2, Shape::InOut) => Ease::InOutCubic,
            (3, Shape::In) => Ease::InQuart,
            (3, Shape::Out) => Ease::OutQuart,
            (3, Shape::InOut) => Ease::InOutQuart,
            (4, Shape::In) => Ease::InQuint,
            (4, Shape::Out) => Ease::OutQuint,
            (4, Shape::InOut) => Ease::InOutQuint,
            _ => return None,
        };
        Some(ease)
    }

    fn power_and_shape(self) -> (u8, Shape) {
        match self {
            Ease::Linear => (0, Shape::Out),
            Ease::InQuad => (1, Shape::In),
            Ease::OutQuad => (1, Shape::Out),
            Ease::InOutQuad => (1, Shape::InOut),
            Ease::InCubic => (2, Shape::In),
            Ease::OutCubic => (2, Shape::Out),
            Ease::InOutCubic => (2, Shape::InOut),
            Ease::InQuart => (3, Shape::In),
            Ease::OutQuart => (3, Shape::Out),
            Ease::InOutQuart => (3, Shape::InOut),
            Ease::InQuint => (4, Shape::In),
            Ease::OutQuint => (4, Shape::Out),
            Ease::InOutQuint => (4, Shape::InOut),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    In,
    Out,
    InOut,
}

fn ease_in(t: f32, exponent: i32) -> f32 {
    t.powi(exponent)
}

fn ease_out(t: f32, exponent: i32) -> f32 {
    1.0 - (1.0 - t).powi(exponent)
}

fn ease_in_out(t: f32, exponent: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(exponent - 1) * t.powi(exponent)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(exponent) * 0.5
    }
}

impl FromStr for Ease {
    type Err = TimelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        if matches!(normalized.as_str(), "linear" | "none" | "power0") {
            return Ok(Ease::Linear);
        }

        let (family, shape) = match normalized.split_once('.') {
            Some((family, "in")) => (family, Shape::In),
            Some((family, "out")) => (family, Shape::Out),
            Some((family, "inout")) => (family, Shape::InOut),
            Some(_) => return Err(TimelineError::UnknownEase(value.to_string())),
            // GSAP treats a bare family name as its `.out` variant.
            None => (normalized.as_str(), Shape::Out),
        };

        let power = match family {
            "power0" => 0,
            "power1" | "quad" => 1,
            "power2" | "cubic" => 2,
            "power3" | "quart" => 3,
            "power4" | "quint" => 4,
            _ => return Err(TimelineError::UnknownEase(value.to_string())),
        };

        Ease::from_power(power, shape).ok_or_else(|| TimelineError::UnknownEase(value.to_string()))
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (power, shape) = self.power_and_shape();
        if power == 0 {
            return f.write_str("linear");
        }
        let suffix = match shape {
            Shape::In => "in",
            Shape::Out => "out",
            Shape::InOut => "inOut",
        };
        write!(f, "power{power}.{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 13] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::InQuart,
        Ease::OutQuart,
        Ease::InOutQuart,
        Ease::InQuint,
        Ease::OutQuint,
        Ease::InOutQuint,
    ];

    #[test]
    fn endpoints_are_exact() {
        for ease in ALL {
            assert_eq!(ease.sample(0.0), 0.0, "{ease:?} at 0");
            assert_eq!(ease.sample(1.0), 1.0, "{ease:?} at 1");
        }
    }

    #[test]
    fn samples_clamp_out_of_range_input() {
        assert_eq!(Ease::InOutQuart.sample(-3.0), 0.0);
        assert_eq!(Ease::InOutQuart.sample(7.5), 1.0);
    }

    #[test]
    fn curves_are_monotonic() {
        for ease in ALL {
            let mut last = 0.0;
            for step in 0..=100 {
                let sample = ease.sample(step as f32 / 100.0);
                assert!(sample >= last - 1e-6, "{ease:?} decreased at step {step}");
                last = sample;
            }
        }
    }

    #[test]
    fn in_out_curves_cross_midpoint() {
        for ease in [Ease::InOutQuad, Ease::InOutCubic, Ease::InOutQuart] {
            assert!((ease.sample(0.5) - 0.5).abs() < 1e-6);
            assert!(ease.sample(0.25) < 0.25);
            assert!(ease.sample(0.75) > 0.75);
        }
    }

    #[test]
    fn parses_gsap_names() {
        assert_eq!("power3.inOut".parse::<Ease>().unwrap(), Ease::InOutQuart);
        assert_eq!("linear".parse::<Ease>().unwrap(), Ease::Linear);
        assert_eq!("power1".parse::<Ease>().unwrap(), Ease::OutQuad);
        assert_eq!("cubic.in".parse::<Ease>().unwrap(), Ease::InCubic);
        assert!(matches!(
            "elastic.out".parse::<Ease>(),
            Err(TimelineError::UnknownEase(name)) if name == "elastic.out"
        ));
        assert!("power2.sideways".parse::<Ease>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for ease in ALL {
            let rendered = ease.to_string();
            assert_eq!(rendered.parse::<Ease>().unwrap(), ease, "{rendered}");
        }
    }
}
