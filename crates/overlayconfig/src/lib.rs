use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use timeline::Ease;
use transition::{BendTiming, SequenceTiming, SurfaceOptions, TransitionOptions};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub version: u32,
    pub surface: SurfaceSection,
    pub sequence: SequenceSection,
    pub window: WindowSection,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            surface: SurfaceSection::default(),
            sequence: SequenceSection::default(),
            window: WindowSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SurfaceSection {
    pub alpha: bool,
    pub antialias: bool,
    pub pixel_ratio_cap: f64,
    pub clear_color: Rgb,
    pub clear_alpha: f32,
    pub overlay_color: Rgb,
}

impl Default for SurfaceSection {
    fn default() -> Self {
        Self {
            alpha: true,
            antialias: true,
            pixel_ratio_cap: transition::MAX_PIXEL_RATIO,
            clear_color: Rgb::WHITE,
            clear_alpha: 0.0,
            overlay_color: Rgb::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SequenceSection {
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub duration: Duration,
    pub ease: String,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub bend_duration: Duration,
    pub bend_ease: String,
    pub bend_timing: BendTimingSetting,
}

impl Default for SequenceSection {
    fn default() -> Self {
        let timing = SequenceTiming::default();
        Self {
            duration: timing.duration,
            ease: timing.ease.to_string(),
            bend_duration: timing.bend_duration,
            bend_ease: timing.bend_ease.to_string(),
            bend_timing: BendTimingSetting::Stretched,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BendTimingSetting {
    Natural,
    Stretched,
}

impl From<BendTimingSetting> for BendTiming {
    fn from(value: BendTimingSetting) -> Self {
        match value {
            BendTimingSetting::Natural => BendTiming::Natural,
            BendTimingSetting::Stretched => BendTiming::Stretched,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fps: f32,
    pub continuous_redraw: bool,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "pagewipe".into(),
            width: 1280,
            height: 720,
            fps: 60.0,
            continuous_redraw: false,
        }
    }
}

/// 8-bit colour written as `#rrggbb` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([0xff, 0xff, 0xff]);
    pub const BLACK: Rgb = Rgb([0x00, 0x00, 0x00]);

    pub fn to_unit(self) -> [f32; 3] {
        self.0.map(|channel| f32::from(channel) / 255.0)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(format!("invalid colour '{trimmed}'; expected #rrggbb"));
        }
        let mut rgb = [0u8; 3];
        for (index, channel) in rgb.iter_mut().enumerate() {
            let start = index * 2;
            *channel = u8::from_str_radix(&hex[start..start + 2], 16)
                .map_err(|err| format!("invalid colour '{trimmed}': {err}"))?;
        }
        Ok(Rgb(rgb))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*duration))
}

impl OverlayConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: OverlayConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Renders the effective configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        let surface = &self.surface;
        if !surface.pixel_ratio_cap.is_finite() || surface.pixel_ratio_cap <= 0.0 {
            return Err(ConfigError::Invalid(
                "surface.pixel_ratio_cap must be greater than zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&surface.clear_alpha) {
            return Err(ConfigError::Invalid(
                "surface.clear_alpha must be within 0..=1".into(),
            ));
        }

        let sequence = &self.sequence;
        if sequence.duration.is_zero() {
            return Err(ConfigError::Invalid(
                "sequence.duration must be greater than zero".into(),
            ));
        }
        if sequence.bend_duration.is_zero() {
            return Err(ConfigError::Invalid(
                "sequence.bend_duration must be greater than zero".into(),
            ));
        }
        if sequence.bend_timing == BendTimingSetting::Natural
            && sequence.bend_duration.saturating_mul(2) > sequence.duration
        {
            return Err(ConfigError::Invalid(format!(
                "sequence.bend_duration {} is too long for natural bend timing; \
                 the pulse takes twice that and must fit in sequence.duration {}",
                humantime::format_duration(sequence.bend_duration),
                humantime::format_duration(sequence.duration)
            )));
        }
        parse_ease("sequence.ease", &sequence.ease)?;
        parse_ease("sequence.bend_ease", &sequence.bend_ease)?;

        let window = &self.window;
        if !window.fps.is_finite() || window.fps <= 0.0 {
            return Err(ConfigError::Invalid(
                "window.fps must be greater than zero".into(),
            ));
        }
        if window.width == 0 || window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                window.width, window.height
            )));
        }

        Ok(())
    }

    pub fn sequence_timing(&self) -> Result<SequenceTiming, ConfigError> {
        let sequence = &self.sequence;
        Ok(SequenceTiming {
            duration: sequence.duration,
            ease: parse_ease("sequence.ease", &sequence.ease)?,
            bend_duration: sequence.bend_duration,
            bend_ease: parse_ease("sequence.bend_ease", &sequence.bend_ease)?,
            bend_timing: sequence.bend_timing.into(),
        })
    }

    pub fn transition_options(&self) -> Result<TransitionOptions, ConfigError> {
        Ok(TransitionOptions {
            timing: self.sequence_timing()?,
            continuous_redraw: self.window.continuous_redraw,
        })
    }

    pub fn surface_options(&self) -> SurfaceOptions {
        let surface = &self.surface;
        SurfaceOptions {
            alpha: surface.alpha,
            antialias: surface.antialias,
            pixel_ratio_cap: surface.pixel_ratio_cap,
            clear_color: surface.clear_color.to_unit(),
            clear_alpha: surface.clear_alpha,
            overlay_color: surface.overlay_color.to_unit(),
        }
    }

    /// Target interval between frames while a sequence plays.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.window.fps.max(1.0)))
    }
}

fn parse_ease(field: &str, raw: &str) -> Result<Ease, ConfigError> {
    raw.parse::<Ease>()
        .map_err(|err| ConfigError::Invalid(format!("{field}: {err}")))
}
