use clap::{Parser, Subcommand};
use pictor::imaging::{OutputFormat, Quality, RustBackend};
use pictor::process::{self, ProcessingOptions};
use pictor::sizes::Hotspot;
use pictor::{config, export, metadata, naming, output};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pictor")]
#[command(about = "Generate named image derivatives, a blurred preview and metadata")]
#[command(long_about = "\
Generate named image derivatives, a blurred preview and metadata

One source image becomes a fixed set of resized, re-encoded files, a tiny
blurred WebP preview embedded as a data URL, and a JSON manifest:

  out/
  ├── dawn-original.webp           # Same pixels, re-encoded
  ├── dawn-large.webp              # Fits in 1200x1200, never upscaled
  ├── dawn-medium.webp             # 600
  ├── dawn-small.webp              # 300
  ├── dawn-thumb.webp              # 160
  └── dawn.json                    # Metadata, preview, per-size details

Sizes are configured in pictor.toml. Box sizes with a hotspot are cropped
around that point first, so the subject stays in frame:

  [sizes]
  square = [400, 400, [820, 310]]

Run 'pictor gen-config' to generate a documented pictor.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Flags for the `process` command.
#[derive(clap::Args)]
struct ProcessArgs {
    /// Source image
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "out")]
    output: PathBuf,

    /// Output format, overriding the config (webp, png, jpeg, avif, gif, tiff)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Lossy quality 1-100, overriding the config
    #[arg(long)]
    quality: Option<u32>,

    /// Default focal point as X,Y in source pixels
    #[arg(long, value_parser = parse_hotspot)]
    hotspot: Option<Hotspot>,

    /// Name recorded in the metadata and used for output file names
    #[arg(long)]
    name: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate every configured size, the preview and the manifest
    Process(ProcessArgs),
    /// Print source metadata without generating anything
    Inspect {
        /// Source image
        source: PathBuf,
    },
    /// Print a stock pictor.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Process(args) => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);

            let mut options = ProcessingOptions::from_config(&config);
            if let Some(format) = args.format {
                options.format = format;
            }
            if let Some(quality) = args.quality {
                options.quality = Quality::new(quality);
            }
            if args.hotspot.is_some() {
                options.hotspot = args.hotspot;
            }

            let source = std::fs::read(&args.source)?;
            let filename = args.name.unwrap_or_else(|| display_name(&args.source));

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::process_with_backend(
                &RustBackend::new(),
                &source,
                &filename,
                &options,
                Some(tx),
            );
            printer.join().map_err(|_| "progress printer panicked")?;
            let result = result?;

            let stem = naming::file_stem(&filename);
            let manifest = export::write_outputs(&result, &args.output, &stem)?;
            output::print_export_summary(&manifest, &args.output, &stem);
        }
        Command::Inspect { source } => {
            let bytes = std::fs::read(&source)?;
            let metadata =
                metadata::extract_metadata(&RustBackend::new(), &bytes, &display_name(&source))?;
            output::print_metadata(&metadata);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// File name of the source path, or the whole path when it has none.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse `X,Y` into a hotspot.
fn parse_hotspot(value: &str) -> Result<Hotspot, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{value}'"))?;
    let coord = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{}': {e}", s.trim()))
    };
    Ok(Hotspot::new(coord(x)?, coord(y)?))
}
