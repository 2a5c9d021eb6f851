use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reel_core::hash::hash_bytes;
use reel_core::ReelConfig;
use reel_encode::{negotiate, CaptureBackend, CodecDescriptor, FfmpegBackend};
use reel_render::{FontRasterizer, FrameCompositor};
use reel_session::{
    CaptionDeck, CaptionSource, FileImage, GenerationSession, ReelRequest, RenderTarget,
    SessionOptions, SessionState,
};

const CONFIG_FILE: &str = "reel.config.toml";

#[derive(Parser)]
#[command(
    name = "reel",
    version,
    about = "reelgen - turn a still image and two captions into a vertical video",
    long_about = "reelgen renders a 1080x1920, 8 second clip: a slowly zooming background image,\na quote banner at the top and a call-to-action banner at the bottom,\nencoded to mp4 or webm with the system ffmpeg."
)]
struct Cli {
    /// Config file (default: ./reel.config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a reel from an image
    Generate {
        /// Background image (PNG, JPEG, WebP, ...)
        #[arg(short, long)]
        image: PathBuf,

        /// Quote shown at the top (random from the built-in deck if not set)
        #[arg(short, long)]
        quote: Option<String>,

        /// Call to action shown at the bottom (random if not set)
        #[arg(long)]
        cta: Option<String>,

        /// Output directory (default: [output] dir from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preferred format, MIME style; repeat to build a preference list
        #[arg(long = "format")]
        formats: Vec<String>,

        /// TTF/OTF font for the captions
        #[arg(long)]
        font: Option<PathBuf>,

        /// Seed for the caption deck
        #[arg(long)]
        seed: Option<u64>,

        /// Print a JSON summary on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show which configured formats the installed ffmpeg can produce
    Formats {
        #[arg(long)]
        json: bool,
    },

    /// Print quote / call-to-action pairs from the built-in deck
    Captions {
        /// Number of pairs
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        json: bool,
    },

    /// Write a config file with the default settings
    Init {
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let json_output = matches!(
        cli.command,
        Commands::Generate { json: true, .. }
            | Commands::Formats { json: true }
            | Commands::Captions { json: true, .. }
    );

    let subscriber = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    );

    if json_output {
        // Keep stdout parseable: logs go to stderr without colors.
        subscriber
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        subscriber.init();
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            image,
            quote,
            cta,
            output,
            formats,
            font,
            seed,
            json,
        } => {
            let args = GenerateArgs {
                image,
                quote,
                cta,
                output,
                formats,
                font,
                seed,
                json,
            };
            cmd_generate(config, args).await
        }
        Commands::Formats { json } => cmd_formats(&config, json).await,
        Commands::Captions { count, seed, json } => cmd_captions(count, seed, json),
        Commands::Init { path, force } => cmd_init(&path, force),
    }
}

/// An explicit `--config` must load; the default file is best-effort.
fn load_config(explicit: Option<&Path>) -> Result<ReelConfig> {
    if let Some(path) = explicit {
        return ReelConfig::load_from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()));
    }
    let default_path = Path::new(CONFIG_FILE);
    if !default_path.exists() {
        return Ok(ReelConfig::default());
    }
    match ReelConfig::load_from_file(default_path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", CONFIG_FILE, e);
            Ok(ReelConfig::default())
        }
    }
}

fn caption_deck(seed: Option<u64>) -> CaptionDeck {
    match seed {
        Some(seed) => CaptionDeck::seeded(seed),
        None => CaptionDeck::new(),
    }
}

struct GenerateArgs {
    image: PathBuf,
    quote: Option<String>,
    cta: Option<String>,
    output: Option<PathBuf>,
    formats: Vec<String>,
    font: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
}

async fn cmd_generate(config: ReelConfig, args: GenerateArgs) -> Result<()> {
    let start = Instant::now();

    let font = args.font.or_else(|| config.text.font.clone());
    let rasterizer =
        FontRasterizer::discover(font.as_deref()).context("failed to load caption font")?;
    tracing::info!("Caption font: {}", rasterizer.source().display());
    let compositor = FrameCompositor::new(Arc::new(rasterizer));

    let backend = Arc::new(FfmpegBackend::probe(config.encoder.ffmpeg.clone()).await);

    let mut deck = caption_deck(args.seed);
    let quote = args.quote.unwrap_or_else(|| deck.next_quote());
    let cta = args.cta.unwrap_or_else(|| deck.next_cta());

    let mut options = SessionOptions::from(&config.encoder);
    if !args.formats.is_empty() {
        options.formats = args.formats;
    }

    if !args.json {
        println!("🎬 reelgen v{}", env!("CARGO_PKG_VERSION"));
        println!("   Image: {}", args.image.display());
        println!("   Quote: {}", quote);
        println!("   CTA:   {}", cta);
    }

    let target = RenderTarget::reel();
    let session = GenerationSession::new(&target, compositor, backend, options);
    let request = ReelRequest::new(Arc::new(FileImage::new(&args.image)), quote.clone(), cta.clone());

    let reporter = (!args.json).then(|| {
        let mut status = session.subscribe();
        tokio::spawn(async move {
            let mut last_step = 0;
            while status.changed().await.is_ok() {
                let snapshot = status.borrow_and_update().clone();
                let step = (snapshot.progress / 10.0).floor() as u32;
                if snapshot.state == SessionState::Recording && step > last_step {
                    println!("   ├ {}%", step * 10);
                    last_step = step;
                }
            }
        })
    });

    let result = session.generate(request).await;
    if let Some(reporter) = reporter {
        let _ = reporter.await;
    }
    let reel = result.context("reel generation failed")?;

    let dir = args.output.unwrap_or(config.output.dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    let path = dir.join(&reel.filename);
    std::fs::write(&path, &reel.bytes)
        .with_context(|| format!("failed to write reel: {}", path.display()))?;

    let elapsed = start.elapsed();
    if args.json {
        let summary = serde_json::json!({
            "path": path,
            "filename": reel.filename,
            "format": reel.codec.mime(),
            "bytes": reel.bytes.len(),
            "sha256": hash_bytes(&reel.bytes).to_hex(),
            "frames": reel.frame_count,
            "quote": quote,
            "cta": cta,
            "elapsed_ms": elapsed.as_millis() as u64,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("   └ 100%");
        println!(
            "   ✓ {} ({}, {} frames, {:.1} KiB) in {:.1}s",
            path.display(),
            reel.codec,
            reel.frame_count,
            reel.bytes.len() as f64 / 1024.0,
            elapsed.as_secs_f64()
        );
    }
    Ok(())
}

async fn cmd_formats(config: &ReelConfig, json: bool) -> Result<()> {
    let backend = FfmpegBackend::probe(config.encoder.ffmpeg.clone()).await;

    let rows: Vec<(String, Option<CodecDescriptor>)> = config
        .encoder
        .formats
        .iter()
        .map(|mime| (mime.clone(), mime.parse::<CodecDescriptor>().ok()))
        .collect();
    let chosen = negotiate(&config.encoder.formats, &backend).ok();

    if json {
        let formats: Vec<serde_json::Value> = rows
            .iter()
            .map(|(mime, descriptor)| {
                serde_json::json!({
                    "format": mime,
                    "encoder": descriptor.as_ref().map(|d| d.effective_codec().encoder()),
                    "supported": descriptor.as_ref().is_some_and(|d| backend.supports(d)),
                })
            })
            .collect();
        let report = serde_json::json!({
            "ffmpeg": backend.binary(),
            "formats": formats,
            "selected": chosen.as_ref().map(|d| d.mime()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("🎞  Formats ({})", backend.binary());
    for (mime, descriptor) in &rows {
        match descriptor {
            Some(d) if backend.supports(d) => println!(
                "   ✓ {:<24} {} -> .{}",
                mime,
                d.effective_codec().encoder(),
                d.extension()
            ),
            Some(d) => println!("   ✗ {:<24} {} unavailable", mime, d.effective_codec().encoder()),
            None => println!("   ✗ {:<24} not recognized", mime),
        }
    }
    match chosen {
        Some(d) => println!("   Selected: {}", d),
        None => println!("   Selected: none (generation will fail with UnsupportedFormatError)"),
    }
    Ok(())
}

fn cmd_captions(count: usize, seed: Option<u64>, json: bool) -> Result<()> {
    let mut deck = caption_deck(seed);
    let pairs: Vec<(String, String)> = (0..count)
        .map(|_| (deck.next_quote(), deck.next_cta()))
        .collect();

    if json {
        let values: Vec<serde_json::Value> = pairs
            .iter()
            .map(|(quote, cta)| serde_json::json!({ "quote": quote, "cta": cta }))
            .collect();
        println!("{}", serde_json::to_string(&values)?);
        return Ok(());
    }

    for (i, (quote, cta)) in pairs.iter().enumerate() {
        println!("{:>3}. {}", i + 1, quote);
        println!("     {}", cta);
    }
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    ReelConfig::default()
        .save_to_file(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("✓ Wrote {}", path.display());
    Ok(())
}
