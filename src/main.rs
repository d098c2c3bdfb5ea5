use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use cueline::pipeline::{self, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "cueline")]
#[command(about = "Builds word/sentence timing documents from character-level alignment traces")]
#[command(version)]
struct Args {
    /// Alignment JSON file, or a directory with --batch
    input: PathBuf,

    /// Original text sent to synthesis, used for paragraph structure
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Pipeline config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory (defaults to the input file's directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Process every alignment JSON under the input directory
    #[arg(long)]
    batch: bool,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Punctuation-only segmentation, ignoring text structure
    #[arg(long)]
    simple: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logging enables observability and debugging in production
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting cueline");
    info!(?args, "Parsed CLI arguments");

    let mut config = load_config(args.config.as_deref()).await?;
    if args.simple {
        config.use_enhanced_detection = false;
    }

    if args.batch {
        if !args.input.is_dir() {
            bail!("Batch input is not a directory: {}", args.input.display());
        }
        run_batch(&args, &config).await
    } else {
        if !args.input.is_file() {
            bail!("Input file does not exist: {}", args.input.display());
        }
        let outputs = process_file(&args.input, args.reference.as_deref(), &config, args.output_dir.as_deref()).await?;
        println!("Wrote {} and {}", outputs.0.display(), outputs.1.display());
        Ok(())
    }
}

async fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: PipelineConfig = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid config JSON: {}", path.display()))?;
            Ok(config)
        }
        None => Ok(PipelineConfig::default()),
    }
}

async fn run_batch(args: &Args, config: &PipelineConfig) -> Result<()> {
    let inputs = discover_alignment_files(&args.input);
    info!("Discovered {} alignment files", inputs.len());

    if inputs.is_empty() {
        println!("No alignment files found under {}", args.input.display());
        return Ok(());
    }

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(inputs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    };

    let concurrency = num_cpus::get();
    let results: Vec<(PathBuf, Result<()>)> = stream::iter(inputs)
        .map(|path| {
            let progress = progress.clone();
            let output_dir = args.output_dir.clone();
            let config = config.clone();
            async move {
                let result = process_file(&path, None, &config, output_dir.as_deref())
                    .await
                    .map(|_| ());
                progress.inc(1);
                (path, result)
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;
    progress.finish_and_clear();

    let mut failures = 0usize;
    for (path, result) in &results {
        if let Err(error) = result {
            failures += 1;
            warn!("Failed to process {}: {error:#}", path.display());
            if args.fail_fast {
                bail!("Aborting after first failure: {}", path.display());
            }
        }
    }

    println!(
        "Processed {} files, {} failed",
        results.len() - failures,
        failures
    );
    if failures > 0 {
        bail!("{failures} files failed to process");
    }
    Ok(())
}

/// Alignment inputs are *.json, excluding our own outputs from earlier runs
fn discover_alignment_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                return false;
            };
            name.ends_with(".json")
                && !name.ends_with("_content.json")
                && !name.ends_with("_lookup.json")
        })
        .collect()
}

/// Process one alignment file, writing `<stem>_content.json` and
/// `<stem>_lookup.json` next to it (or under `output_dir`)
async fn process_file(
    input: &Path,
    reference: Option<&Path>,
    config: &PipelineConfig,
    output_dir: Option<&Path>,
) -> Result<(PathBuf, PathBuf)> {
    let raw = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read alignment file: {}", input.display()))?;
    let file: cueline::AlignmentFile = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid alignment JSON: {}", input.display()))?;

    let reference_text = match reference {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read reference text: {}", path.display()))?,
        ),
        None => None,
    };

    let processed = pipeline::process_alignment(&file.alignment, reference_text.as_deref(), config)
        .with_context(|| format!("Pipeline failed for {}", input.display()))?;

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Input file has no usable name")?;
    let out_dir = match output_dir {
        Some(dir) => {
            tokio::fs::create_dir_all(dir).await?;
            dir.to_path_buf()
        }
        None => input.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
    };

    let content_path = out_dir.join(format!("{stem}_content.json"));
    let lookup_path = out_dir.join(format!("{stem}_lookup.json"));

    tokio::fs::write(&content_path, serde_json::to_vec_pretty(&processed.content)?)
        .await
        .with_context(|| format!("Failed to write {}", content_path.display()))?;
    tokio::fs::write(&lookup_path, serde_json::to_vec(&processed.lookup)?)
        .await
        .with_context(|| format!("Failed to write {}", lookup_path.display()))?;

    info!(
        "Processed {}: {} words, {} sentences",
        input.display(),
        processed.content.timing.words.len(),
        processed.content.timing.sentences.len()
    );
    Ok((content_path, lookup_path))
}
