use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "pagewipe",
    author,
    version,
    about = "GPU page transition overlay; click, Space or Enter to play the wipe"
)]
pub struct Cli {
    /// Configuration file; defaults to `config.toml` in the user config directory.
    #[arg(long, value_name = "FILE", env = "PAGEWIPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Initial window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Frame rate used while a transition is playing.
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Redraw on every animation tick, not only when the wipe moves.
    #[arg(long)]
    pub continuous: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("window size must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps = value
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid fps '{}'", value.trim()))?;
    if !fps.is_finite() || fps <= 0.0 {
        return Err("fps must be greater than zero".into());
    }
    Ok(fps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_window_sizes() {
        assert_eq!(parse_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_size(" 800 X 600 ").unwrap(), (800, 600));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
        assert!(parse_size("widex720").is_err());
    }

    #[test]
    fn rejects_non_positive_fps() {
        assert_eq!(parse_fps("30").unwrap(), 30.0);
        assert!(parse_fps("0").is_err());
        assert!(parse_fps("-5").is_err());
        assert!(parse_fps("fast").is_err());
    }

    #[test]
    fn flags_reach_the_cli_struct() {
        let cli = Cli::try_parse_from([
            "pagewipe",
            "--size",
            "640x480",
            "--fps",
            "24",
            "--continuous",
            "--print-config",
        ])
        .unwrap();
        assert_eq!(cli.size, Some((640, 480)));
        assert_eq!(cli.fps, Some(24.0));
        assert!(cli.continuous);
        assert!(cli.print_config);
    }
}
