//! Render the demo scene to a PNG.
//!
//! Usage: `cargo run --release --example simple_render -- [--config render.json] [-o output.png] [--tone ward|reinhard]`
//!
//! The optional JSON file holds any subset of `RenderConfig` fields.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lumen_core::Scene;
use lumen_renderer::{apply_tone, render, FrameBuffer, RenderConfig, ToneOperator};

/// Tone reproduction applied before writing the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Tone {
    Ward,
    Reinhard,
}

impl From<Tone> for ToneOperator {
    fn from(tone: Tone) -> Self {
        match tone {
            Tone::Ward => ToneOperator::Ward,
            Tone::Reinhard => ToneOperator::Reinhard { key_pixel: None },
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "simple_render")]
#[command(about = "Render the lumen demo scene to an image")]
struct Args {
    /// JSON render configuration; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output image path
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Tone reproduction operator
    #[arg(long, value_enum)]
    tone: Option<Tone>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            RenderConfig::from_json_str(&json)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => RenderConfig::default(),
    };

    let scene: Scene = Scene::demo()?;
    let mut frame = render(&scene, &config)?;

    if let Some(tone) = args.tone {
        let operator = ToneOperator::from(tone);
        log::info!("Applying {operator:?} tone reproduction");
        let mut colors = frame.to_colors();
        apply_tone(&mut colors, &scene.tone, operator);
        frame = FrameBuffer::from_colors(frame.width(), frame.height(), &colors)?;
    }

    let image = image::RgbaImage::from_raw(frame.width(), frame.height(), frame.to_rgba8())
        .context("frame buffer size does not match image size")?;
    image
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["simple_render"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.output, PathBuf::from("output.png"));
        assert_eq!(args.tone, None);
    }

    #[test]
    fn test_all_options() {
        let args = Args::try_parse_from([
            "simple_render",
            "--config",
            "cfg.JSON",
            "-o",
            "frame.png",
            "--tone",
            "reinhard",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("cfg.JSON")));
        assert_eq!(args.output, PathBuf::from("frame.png"));
        assert_eq!(
            args.tone.map(ToneOperator::from),
            Some(ToneOperator::Reinhard { key_pixel: None })
        );
    }

    #[test]
    fn test_help_and_bad_input_stop_before_rendering() {
        let help = Args::try_parse_from(["simple_render", "--help"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);

        let short_help = Args::try_parse_from(["simple_render", "-h"]).unwrap_err();
        assert_eq!(short_help.kind(), ErrorKind::DisplayHelp);

        // Bare paths are not silently taken as the output file
        let stray = Args::try_parse_from(["simple_render", "frame.png"]).unwrap_err();
        assert_eq!(stray.kind(), ErrorKind::UnknownArgument);

        let tone = Args::try_parse_from(["simple_render", "--tone", "aces"]).unwrap_err();
        assert_eq!(tone.kind(), ErrorKind::InvalidValue);
    }
}
