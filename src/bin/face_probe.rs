//! Run the face-presence heuristic over still images, to calibrate the
//! luminance and skin-ratio thresholds for a given camera and room.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use proctor_monitor::{
    init_logging,
    sensing::{classify_frame, FaceHeuristicConfig},
    MonitorConfig,
};

#[derive(Parser, Debug)]
#[command(name = "face-probe", version, about = "Classify webcam stills with the face heuristic")]
struct Cli {
    /// Images to classify (any format the `image` crate decodes)
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Monitor config file whose `face` section supplies the thresholds
    #[arg(long, env = "PROCTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Override the minimum average luminance
    #[arg(long)]
    min_luminance: Option<f64>,

    /// Override the minimum skin-tone pixel fraction
    #[arg(long)]
    min_skin_ratio: Option<f64>,

    /// Emit one JSON object per image instead of a table
    #[arg(long)]
    json: bool,
}

fn heuristic_from(cli: &Cli) -> Result<FaceHeuristicConfig> {
    let mut heuristic = match &cli.config {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?
            .face,
        None => FaceHeuristicConfig::default(),
    };
    if let Some(value) = cli.min_luminance {
        heuristic.min_luminance = value;
    }
    if let Some(value) = cli.min_skin_ratio {
        heuristic.min_skin_ratio = value;
    }
    heuristic
        .validate()
        .map_err(|msg| anyhow::anyhow!("invalid thresholds: {msg}"))?;
    Ok(heuristic)
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let heuristic = heuristic_from(&cli)?;

    if !cli.json {
        println!("{:<40} {:>9} {:>10} {:>8}", "image", "luminance", "skin_ratio", "face");
    }

    let mut failures = 0usize;
    for path in &cli.images {
        let frame = match image::open(path) {
            Ok(img) => img.to_rgba8(),
            Err(err) => {
                warn!("skipping {}: {}", path.display(), err);
                failures += 1;
                continue;
            }
        };

        let (present, stats) = classify_frame(&frame, &heuristic);
        if cli.json {
            let line = serde_json::json!({
                "image": path.display().to_string(),
                "present": present,
                "stats": stats,
            });
            println!("{line}");
        } else {
            println!(
                "{:<40} {:>9.1} {:>10.3} {:>8}",
                path.display(),
                stats.avg_luminance,
                stats.skin_ratio,
                if present { "present" } else { "absent" }
            );
        }
    }

    if failures == cli.images.len() {
        anyhow::bail!("no image could be decoded");
    }
    Ok(())
}
