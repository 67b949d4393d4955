mod args;
mod audio;
mod emotion;
mod error;
mod render;
mod request;
mod stretch;
mod tts;
mod utils;
mod voices;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::args::Args;
use crate::emotion::Emotion;
use crate::render::{Renderer, write_manifest};
use crate::request::{SingleOptions, batch_dir, resolve_batch};
use crate::tts::{ChatterboxTts, ModelConfig};
use crate::voices::VoiceCatalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let catalog = VoiceCatalog::scan(&args.voices_dir)
        .with_context(|| format!("reading voices from {}", args.voices_dir.display()))?;
    info!(
        "Loaded {} voices from {}",
        catalog.voices().len(),
        catalog.dir().display()
    );

    if args.list {
        print_listing(&catalog);
        return Ok(());
    }

    let device = args.device.resolve();
    let model = ChatterboxTts::from_pretrained(ModelConfig {
        program: args.tts_command.clone(),
        leading_args: args.tts_args.clone(),
        device,
        timeout: Duration::from_secs(args.timeout_secs),
        chunk_chars: args.chunk_chars,
    });
    let renderer = Renderer::new(&model);

    if let Some(batch_voice) = &args.batch_voice {
        let requests = resolve_batch(&catalog, batch_voice, &args.out_dir, args.speed)?;
        let voice_dir = batch_dir(&args.out_dir, catalog.find(batch_voice)?);
        info!(
            "Batch rendering {} emotions for {} into {}",
            requests.len(),
            batch_voice,
            voice_dir.display()
        );

        let outcomes = match renderer.render_batch(&requests).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                error!("Batch render failed: {}", e);
                return Err(e.into());
            }
        };
        for outcome in &outcomes {
            println!("{}\n", outcome.summary());
        }
        let manifest = write_manifest(&voice_dir, &outcomes)?;
        println!(
            "Rendered {} clips on {}; manifest at {}",
            outcomes.len(),
            model.device(),
            manifest.display()
        );
    } else {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let outcome = renderer
            .render_single(
                &catalog,
                &SingleOptions {
                    emotion: &args.emotion,
                    voice: &args.voice,
                    text: &args.text,
                    output: &args.output,
                    speed: args.speed,
                },
                &mut rng,
            )
            .await
            .with_context(|| format!("rendering {}", args.output.display()))?;
        println!("{}", outcome.summary());
    }

    info!("Process complete.");
    Ok(())
}

fn print_listing(catalog: &VoiceCatalog) {
    println!("Voices in {}:", catalog.dir().display());
    if catalog.voices().is_empty() {
        println!("  (none)");
    }
    for voice in catalog.voices() {
        println!("  {}", voice.stem());
    }
    println!("Emotion presets:");
    for emotion in Emotion::ALL {
        println!("  {:<9} {}", emotion.name(), emotion.preset());
    }
}
