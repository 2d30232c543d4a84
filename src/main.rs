mod error;
mod output;
mod parser;
mod settings;
mod source;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use parser::canto::{CantoId, WorkPart};
use parser::lines::{LineClassifier, LineKind};
use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "commedia_json", about = "Divina Commedia PDF -> JSON for recitation")]
struct Cli {
    /// TOML settings file (block sizes, extra noise patterns)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Copy)]
struct BlockArgs {
    /// Recitation block size in verses (default 12)
    #[arg(long)]
    block_size: Option<usize>,
    /// Verses shared by consecutive blocks (default 0)
    #[arg(long)]
    block_overlap: Option<usize>,
}

impl From<BlockArgs> for Overrides {
    fn from(args: BlockArgs) -> Self {
        Overrides {
            block_size: args.block_size,
            block_overlap: args.block_overlap,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Segment the whole work: one JSON per canto plus manifest.json
    Run {
        /// Source PDF, or a form-feed separated text dump
        #[arg(long)]
        pdf: PathBuf,
        /// Output directory
        #[arg(long)]
        outdir: PathBuf,
        #[command(flatten)]
        blocks: BlockArgs,
    },
    /// Extract a single canto from a known page range
    Canto {
        #[arg(long)]
        pdf: PathBuf,
        /// Inferno, Purgatorio or Paradiso
        #[arg(long, value_parser = parse_part)]
        cantica: WorkPart,
        /// Canto number
        #[arg(long)]
        canto: u32,
        /// First page (1-based)
        #[arg(long)]
        start_page: usize,
        /// Last page (inclusive)
        #[arg(long)]
        end_page: usize,
        /// Output JSON file
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        blocks: BlockArgs,
    },
    /// Print every line with its classification
    Classify {
        #[arg(long)]
        pdf: PathBuf,
        /// Only this page (1-based)
        #[arg(short, long)]
        page: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Run { pdf, outdir, blocks } => {
            let settings = Settings::load(config, blocks.into())?;
            info!(settings = ?settings, "Starting full-document run");
            let classifier = LineClassifier::with_extra_noise(&settings.extra_noise_patterns)?;
            let pages = source::load_pages(&pdf)?;
            let pdf_name = pdf.display().to_string();
            let cantos =
                parser::segment_document(&classifier, &pdf_name, &pages, settings.blocks())?;
            let summary = output::write_all(&cantos, &pdf_name, &outdir)?;
            println!("{}", output::to_json(&summary)?.trim_end());
        }
        Commands::Canto {
            pdf,
            cantica,
            canto,
            start_page,
            end_page,
            output: out_path,
            blocks,
        } => {
            let settings = Settings::load(config, blocks.into())?;
            let classifier = LineClassifier::with_extra_noise(&settings.extra_noise_patterns)?;
            let pages = source::page_range(source::load_pages(&pdf)?, start_page, end_page)?;
            let id = CantoId {
                part: cantica,
                number: canto,
            };
            let pdf_name = pdf.display().to_string();
            let record =
                parser::segment_canto(&classifier, &pdf_name, &pages, settings.blocks(), id)?;
            output::write_json(&out_path, &record)?;
            println!("OK: saved JSON -> {}", out_path.display());
            println!("{}", output::to_json(&record.counts)?.trim_end());
        }
        Commands::Classify { pdf, page } => {
            let settings = Settings::load(config, Overrides::default())?;
            let classifier = LineClassifier::with_extra_noise(&settings.extra_noise_patterns)?;
            classify_pages(&classifier, &pdf, page)?;
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn parse_part(s: &str) -> Result<WorkPart, String> {
    WorkPart::from_name(s).map_err(|e| e.to_string())
}

fn classify_pages(classifier: &LineClassifier, pdf: &Path, only: Option<usize>) -> Result<()> {
    let pages = source::load_pages(pdf)?;
    if let Some(n) = only {
        if n == 0 || n > pages.len() {
            anyhow::bail!("page {} out of range 1..{}", n, pages.len());
        }
    }
    for page in pages.iter().filter(|p| only.map_or(true, |n| p.number == n)) {
        for line in &page.lines {
            let kind = classifier
                .classify(line)
                .with_context(|| format!("page {}", page.number))?;
            println!("{:>4} | {:<14} | {}", page.number, label(kind), line);
        }
    }
    Ok(())
}

fn label(kind: LineKind) -> String {
    match kind {
        LineKind::Noise(family) => format!("noise:{:?}", family),
        LineKind::PartMarker(part) => format!("part:{}", part.code()),
        LineKind::CantoMarker => "canto".to_string(),
        LineKind::Verse => "verse".to_string(),
    }
}
