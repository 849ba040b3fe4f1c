use clap::Parser;
use screenshot_standardizer::config::{
    self, DEFAULT_DPI, OutputFormat, ProcessingConfig, ScreenshotType, SizePreset,
};
use screenshot_standardizer::plan::{self, DEFAULT_OUTDIR, PlanRequest};
use screenshot_standardizer::{output, process};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "screenshot-standardizer")]
#[command(version)]
#[command(about = "Standardize screenshots for documentation")]
#[command(long_about = "\
Standardize screenshots for documentation

Resizes every image to a preset width, optionally pads it, paints a thin
border, stamps the DPI and writes it next to its siblings as
<name>_<size>.<format>. Existing outputs are never replaced without --force.

Examples:

  # Process a single file
  screenshot-standardizer --input input.png

  # Process a directory of images
  screenshot-standardizer --input ./screenshots

  # 10px padding and a custom output directory
  screenshot-standardizer --input input.png --padding 10 --outdir ~/Desktop/docs/images

  # Data visualization with enhanced quality and a specific output file
  screenshot-standardizer --input plot.png --type viz --output ~/Desktop/docs/plot.png

  # Large size at high DPI, as JPEG
  screenshot-standardizer --input input.png --size large --dpi 200 --format jpg

Style (colours, border width, encoder settings) is read from
./standardizer.toml when present, or from --config.")]
struct Cli {
    /// Input file or directory
    #[arg(short, long)]
    input: PathBuf,

    /// Output file path (single input file only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory for processed images
    #[arg(short = 'd', long, default_value = DEFAULT_OUTDIR)]
    outdir: PathBuf,

    /// Size preset: small=1024px, medium=1440px, large=1920px width
    #[arg(short, long, value_enum, default_value_t = SizePreset::Medium)]
    size: SizePreset,

    /// Screenshot type
    #[arg(short = 't', long = "type", value_enum, default_value_t = ScreenshotType::Standard)]
    kind: ScreenshotType,

    /// Padding around the image, in pixels
    #[arg(short, long, default_value_t = 0,
          value_parser = clap::value_parser!(u32).range(0..=config::MAX_PADDING as i64))]
    padding: u32,

    /// DPI stamped into the output images
    #[arg(long, visible_alias = "dp", default_value_t = DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(1..=config::MAX_DPI as i64))]
    dpi: u32,

    /// Disable borders on processed images
    #[arg(long)]
    no_border: bool,

    /// Overwrite existing output files
    #[arg(short, long)]
    force: bool,

    /// Output image format
    #[arg(long, visible_alias = "fm", value_enum, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    /// Style file (defaults to ./standardizer.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print detailed processing information
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<process::RunSummary, Box<dyn std::error::Error>> {
    let processing = ProcessingConfig {
        size: cli.size,
        kind: cli.kind,
        padding: cli.padding,
        dpi: cli.dpi,
        border: !cli.no_border,
        format: cli.format,
    };
    processing.validate()?;

    let config_path = cli.config.as_deref().map(plan::expand_home);
    let style = config::load_style(config_path.as_deref(), &std::env::current_dir()?)?;

    let io_plan = plan::resolve_plan(&PlanRequest {
        input: cli.input,
        output: cli.output,
        outdir: cli.outdir,
        size: cli.size,
        format: cli.format,
        force: cli.force,
    })?;

    info!("Size preset: {}", processing.size);
    info!("Output format: {}", processing.format);
    info!("Files: {}", io_plan.files.len());

    let summary = process::process(&io_plan, &processing, &style, output::print_outcome)?;
    output::print_summary(&summary);
    Ok(summary)
}

/// Log to stderr. `--verbose` lowers the default level to debug; `RUST_LOG`
/// takes precedence over both.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
