use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use meter_reader::config::{ModelArgs, ServerConfig};
use meter_reader::{MeterReader, OcrsRecognizer, RegionExtractor};

#[derive(Parser)]
#[command(name = "meter-reader")]
#[command(about = "Read the numbers on photos of meters, gauges and labels")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve(ServerConfig),

    /// Read a single image file and print the numbers
    Read {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Save debug outputs to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,

        /// Skip OCR step (only report the extracted region)
        #[arg(long)]
        skip_ocr: bool,

        #[command(flatten)]
        models: ModelArgs,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_recognizer(models: &ModelArgs) -> anyhow::Result<OcrsRecognizer> {
    let models_dir = models.resolve()?;
    OcrsRecognizer::load(&models_dir)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Serve(config) => {
            let recognizer = load_recognizer(&config.models)?;
            info!("OCR engine initialized ({})", meter_reader::ocr::OCR_LANGUAGE);
            let reader = MeterReader::new(Arc::new(recognizer));
            meter_reader::api::start_server(&config, reader).await
        }
        Command::Read { image_path, debug_out, skip_ocr, models } => {
            read_file(image_path, debug_out, skip_ocr, &models)
        }
    }
}

fn read_file(
    image_path: PathBuf,
    debug_out: Option<PathBuf>,
    skip_ocr: bool,
    models: &ModelArgs,
) -> anyhow::Result<()> {
    info!("Loading image: {:?}", image_path);
    let bytes = std::fs::read(&image_path)?;
    let img = MeterReader::decode(&bytes)
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    info!("Image loaded: {}x{}", img.width(), img.height());

    let mut extractor = RegionExtractor::new();
    if let Some(debug_dir) = debug_out {
        extractor = extractor.with_debug(debug_dir)?;
    }

    if skip_ocr {
        match extractor.extract_region(&img) {
            Ok(region) => println!(
                "Region at ({}, {}) {}x{} - contour area: {:.1}",
                region.bbox.x, region.bbox.y, region.bbox.width, region.bbox.height, region.contour_area
            ),
            Err(e) => println!("{}", e),
        }
        return Ok(());
    }

    let recognizer = load_recognizer(models)?;
    let reader = MeterReader::new(Arc::new(recognizer)).with_extractor(extractor);
    let reading = reader.read_image(&img)?;

    println!("\n=== Detected Numbers ===");
    if reading.is_empty() {
        println!("No numbers detected.");
    } else {
        for number in &reading.numbers {
            println!("  {}", number);
        }
    }

    Ok(())
}
