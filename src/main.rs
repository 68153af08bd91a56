use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use regioneval::config::PipelineConfig;
use regioneval::core::model::count_regions;
use regioneval::export::text_export::render_summary;
use regioneval::pipeline::{evaluate_pages, export_report, refine_pages};
use regioneval::source::{
    find_annotation_files, write_pages, AnnotationXmlSource, CsvRegionSource, RegionSource,
    VisionRegionSource,
};

#[derive(Parser, Debug)]
#[command(name = "regioneval")]
#[command(version, about = "Evaluate detected text regions against annotated reference regions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with pipeline settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[derive(Args, Debug, Default)]
struct ConfigOverrides {
    /// Minimum region width kept by the cleaner
    #[arg(long, global = true)]
    min_w: Option<i64>,

    /// Minimum region height kept by the cleaner
    #[arg(long, global = true)]
    min_h: Option<i64>,

    /// Horizontal margin for combining nearby regions
    #[arg(long, global = true)]
    x_expansion: Option<i64>,

    /// Vertical margin for combining nearby regions
    #[arg(long, global = true)]
    y_expansion: Option<i64>,

    /// Characters removed from merged text
    #[arg(long, global = true)]
    noise_characters: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clean and merge detected regions, writing a new page/frame store
    Refine {
        /// Input pages CSV
        input_pages: PathBuf,
        /// Input frames CSV
        input_frames: PathBuf,
        /// Output pages CSV
        output_pages: PathBuf,
        /// Output frames CSV
        output_frames: PathBuf,
    },

    /// Match detected regions to reference regions and report recall
    Evaluate {
        #[arg(long)]
        detected_pages: PathBuf,
        #[arg(long)]
        detected_frames: PathBuf,
        #[arg(long)]
        reference_pages: PathBuf,
        #[arg(long)]
        reference_frames: PathBuf,

        /// Output directory for report.json, matches.csv and summary.txt
        #[arg(short, long, default_value = "evaluation")]
        output: PathBuf,

        /// Match the detected regions as loaded, without cleaning or merging
        #[arg(long)]
        no_refine: bool,
    },

    /// Convert saved recognition responses into a page/frame store
    ImportVision {
        /// Response JSON files, one per page
        responses: Vec<PathBuf>,

        #[arg(short, long, default_value = "pages.csv")]
        pages: PathBuf,

        #[arg(short, long, default_value = "frames.csv")]
        frames: PathBuf,
    },

    /// Convert reference annotation XML files into a page/frame store
    ImportXml {
        /// Annotation files, loaded before any directory contents
        files: Vec<PathBuf>,

        /// Directories scanned (non-recursively) for annotation files
        #[arg(short, long, num_args = 1..)]
        directories: Vec<PathBuf>,

        /// File extension matched inside the directories
        #[arg(long, default_value = "xml")]
        extension: String,

        #[arg(short, long, default_value = "pages.csv")]
        pages: PathBuf,

        #[arg(short, long, default_value = "frames.csv")]
        frames: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Refine {
            input_pages,
            input_frames,
            output_pages,
            output_frames,
        } => run_refine(&config, input_pages, input_frames, output_pages, output_frames),
        Commands::Evaluate {
            detected_pages,
            detected_frames,
            reference_pages,
            reference_frames,
            output,
            no_refine,
        } => run_evaluate(
            &config,
            CsvRegionSource::new(detected_pages, detected_frames),
            CsvRegionSource::new(reference_pages, reference_frames),
            output,
            !no_refine,
        ),
        Commands::ImportVision {
            responses,
            pages,
            frames,
        } => run_import(responses, pages, frames),
        Commands::ImportXml {
            files,
            directories,
            extension,
            pages,
            frames,
        } => run_import_xml(files, &directories, &extension, pages, frames),
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let base = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let mut config = base
        .apply_env()
        .context("invalid pipeline settings in environment")?;

    let o = &cli.overrides;
    if let Some(v) = o.min_w {
        config.min_w = v;
    }
    if let Some(v) = o.min_h {
        config.min_h = v;
    }
    if let Some(v) = o.x_expansion {
        config.x_expansion = v;
    }
    if let Some(v) = o.y_expansion {
        config.y_expansion = v;
    }
    if let Some(v) = &o.noise_characters {
        config.noise_characters = v.clone();
    }
    config.validate()?;
    info!(?config, "pipeline settings");
    Ok(config)
}

fn ensure_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("Input file does not exist: {}", path.display());
    }
    Ok(())
}

fn run_refine(
    config: &PipelineConfig,
    input_pages: PathBuf,
    input_frames: PathBuf,
    output_pages: PathBuf,
    output_frames: PathBuf,
) -> Result<()> {
    ensure_file(&input_pages)?;
    ensure_file(&input_frames)?;

    let pages = CsvRegionSource::new(input_pages.clone(), input_frames)
        .load()
        .with_context(|| format!("failed to load regions for {}", input_pages.display()))?;
    let outcome = refine_pages(pages, config);

    write_pages(&outcome.pages, &output_pages, &output_frames)
        .with_context(|| format!("failed to write {}", output_pages.display()))?;
    info!(
        pages = outcome.pages.len(),
        frames = count_regions(&outcome.pages),
        "wrote refined regions"
    );
    Ok(())
}

fn run_evaluate(
    config: &PipelineConfig,
    detected: CsvRegionSource,
    reference: CsvRegionSource,
    output: PathBuf,
    refine: bool,
) -> Result<()> {
    let detected = detected.load().context("failed to load detected regions")?;
    let reference = reference.load().context("failed to load reference regions")?;
    info!(
        detected_pages = detected.len(),
        reference_pages = reference.len(),
        "loaded page sets"
    );

    let report = evaluate_pages(detected, reference, config, refine);
    export_report(&report, &output)?;

    println!("{}", render_summary(&report.summary));
    println!("Results saved to: {}", output.display());
    Ok(())
}

fn run_import(responses: Vec<PathBuf>, pages_path: PathBuf, frames_path: PathBuf) -> Result<()> {
    if responses.is_empty() {
        anyhow::bail!("No response files specified");
    }
    let total = responses.len();
    let pages = VisionRegionSource::new(responses).load()?;
    for (i, page) in pages.iter().enumerate() {
        info!(
            "({}/{}) {}: {} regions",
            i + 1,
            total,
            page.source,
            page.regions.len()
        );
    }
    write_pages(&pages, &pages_path, &frames_path)
        .with_context(|| format!("failed to write {}", pages_path.display()))?;
    Ok(())
}

fn run_import_xml(
    mut files: Vec<PathBuf>,
    directories: &[PathBuf],
    extension: &str,
    pages_path: PathBuf,
    frames_path: PathBuf,
) -> Result<()> {
    files.extend(find_annotation_files(directories, extension)?);
    if files.is_empty() {
        anyhow::bail!("No annotation files specified");
    }
    let pages = AnnotationXmlSource::new(files)
        .load()
        .context("failed to load reference annotations")?;
    info!(
        pages = pages.len(),
        frames = count_regions(&pages),
        "converted annotations"
    );
    write_pages(&pages, &pages_path, &frames_path)
        .with_context(|| format!("failed to write {}", pages_path.display()))?;
    Ok(())
}
