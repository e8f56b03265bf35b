//! PneumoScan CLI - offline inspection of the preprocessing pipelines

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pneumoscan::decision::{decide_breath_sounds, decide_xray, OutputKind};
use pneumoscan::features::MfccPipeline;
use pneumoscan::vision::ImageTensorPacker;
use pneumoscan::{audio::WaveformDecoder, NormalizationParams, VERSION};

/// PneumoScan - respiratory screening preprocessing and decision pipelines
#[derive(Parser, Debug)]
#[command(name = "pneumoscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the normalized 40-element MFCC feature vector from a clip
    Features {
        /// Path to the audio clip (WAV or raw 16-bit PCM)
        #[arg(short, long)]
        audio: PathBuf,

        /// Path to the normalization parameters JSON
        #[arg(short, long, default_value = "normalization_params.json")]
        params: PathBuf,

        /// Print the raw (unnormalized) vector instead
        #[arg(long)]
        raw: bool,
    },

    /// Pack an image into a normalized model-input tensor and report stats
    Pack {
        /// Path to the image file
        #[arg(short, long)]
        image: PathBuf,

        /// Model input shape as comma-separated dims
        #[arg(short, long, default_value = "1,224,224,3")]
        shape: String,
    },

    /// Turn raw classifier scores into a labeled decision
    Decide {
        /// Which classifier produced the scores
        #[arg(short, long, value_parser = ["stethoscope", "xray"])]
        task: String,

        /// Raw output scores, in model order
        #[arg(required = true)]
        scores: Vec<f32>,
    },
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn parse_shape(text: &str) -> Result<Vec<usize>> {
    text.split(',')
        .map(|d| {
            d.trim()
                .parse::<usize>()
                .with_context(|| format!("invalid shape dimension {d:?}"))
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    info!("PneumoScan v{}", VERSION);

    match cli.command {
        Commands::Features { audio, params, raw } => {
            let waveform = WaveformDecoder::decode(&audio)
                .with_context(|| format!("decoding {audio:?}"))?;
            info!(
                "Decoded {} samples ({:.2}s at {} Hz)",
                waveform.len(),
                waveform.duration(),
                waveform.sample_rate()
            );

            let mut pipeline = MfccPipeline::new()?;
            let features = if raw {
                pipeline.mean_features(&waveform)?
            } else {
                let params = NormalizationParams::load(&params)
                    .with_context(|| format!("loading {params:?}"))?;
                pipeline.normalized_features(&waveform, &params)?
            };

            for (i, value) in features.iter().enumerate() {
                println!("{i:3}  {value:+.6}");
            }
            Ok(())
        }

        Commands::Pack { image, shape } => {
            let dims = parse_shape(&shape)?;
            let packer = ImageTensorPacker::new(&dims)?;
            let tensor = packer
                .pack_file(&image)
                .with_context(|| format!("packing {image:?}"))?;

            let shape = packer.shape();
            info!(
                "Packed {}x{}x{} ({:?}): {} values",
                shape.width,
                shape.height,
                shape.channels,
                shape.layout,
                tensor.len()
            );

            let min = tensor.iter().cloned().fold(f32::INFINITY, f32::min);
            let max = tensor.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let mean: f32 = tensor.iter().sum::<f32>() / tensor.len() as f32;
            println!("min {min:+.4}  max {max:+.4}  mean {mean:+.4}");
            println!(
                "first 10: {:?}",
                &tensor[..tensor.len().min(10)]
            );
            Ok(())
        }

        Commands::Decide { task, scores } => {
            let decision = match task.as_str() {
                "stethoscope" => decide_breath_sounds(&scores)?,
                _ => {
                    let kind = OutputKind::resolve(&[scores.len()])?;
                    decide_xray(kind, &scores)?
                }
            };

            println!("prediction: {}", decision.label);
            let mut entries: Vec<_> = decision.confidence.iter().collect();
            entries.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap());
            for (label, p) in entries {
                println!("  {label:10} {:.1}%", p * 100.0);
            }
            Ok(())
        }
    }
}
