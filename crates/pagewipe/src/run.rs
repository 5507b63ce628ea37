use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use overlayconfig::OverlayConfig;
use renderer::{Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::paths::AppPaths;

pub fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    if cli.print_config {
        let rendered = config
            .to_toml_string()
            .context("failed to render configuration")?;
        print!("{rendered}");
        return Ok(());
    }

    let renderer_config = renderer_config(&config)?;
    tracing::info!(
        width = renderer_config.window_size.0,
        height = renderer_config.window_size.1,
        ease = %config.sequence.ease,
        "starting pagewipe overlay"
    );
    Renderer::new(renderer_config).run()
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<OverlayConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let paths = AppPaths::discover()?;
            load_default_config(&paths.config_file())?
        }
    };
    apply_overrides(&mut config, cli);
    config
        .validate()
        .context("invalid configuration after applying command-line overrides")?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<OverlayConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config = OverlayConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to load config at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// A missing default file is not an error; built-in defaults apply.
fn load_default_config(path: &Path) -> Result<OverlayConfig> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "no config file found; using defaults");
        Ok(OverlayConfig::default())
    }
}

fn apply_overrides(config: &mut OverlayConfig, cli: &Cli) {
    if let Some((width, height)) = cli.size {
        config.window.width = width;
        config.window.height = height;
    }
    if let Some(fps) = cli.fps {
        config.window.fps = fps;
    }
    if cli.continuous {
        config.window.continuous_redraw = true;
    }
}

fn renderer_config(config: &OverlayConfig) -> Result<RendererConfig> {
    Ok(RendererConfig {
        title: config.window.title.clone(),
        window_size: (config.window.width, config.window.height),
        frame_interval: config.frame_interval(),
        surface: config.surface_options(),
        transition: config
            .transition_options()
            .context("invalid sequence configuration")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        use clap::Parser;
        let mut argv = vec!["pagewipe"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn explicit_config_file_is_loaded_and_overridden() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wipe.toml");
        fs::write(
            &path,
            r#"
[sequence]
duration = "2s"

[window]
width = 640
height = 480
"#,
        )
        .unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let cli = cli(&["--config", &path_arg, "--fps", "30", "--continuous"]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.sequence.duration, Duration::from_secs(2));
        assert_eq!((config.window.width, config.window.height), (640, 480));
        assert_eq!(config.window.fps, 30.0);
        assert!(config.window.continuous_redraw);

        let renderer = renderer_config(&config).unwrap();
        assert!(renderer.transition.continuous_redraw);
        assert_eq!(renderer.window_size, (640, 480));
    }

    #[test]
    fn size_flag_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wipe.toml");
        fs::write(&path, "[window]\nwidth = 640\nheight = 480\n").unwrap();
        let path_arg = path.to_string_lossy().into_owned();
        let config = resolve_config(&cli(&["--config", &path_arg, "--size", "1024x768"])).unwrap();
        assert_eq!((config.window.width, config.window.height), (1024, 768));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = load_config(&missing).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn missing_default_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_default_config(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, OverlayConfig::default());
    }

    #[test]
    fn invalid_config_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wipe.toml");
        fs::write(&path, "[sequence]\nease = \"bounce\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
