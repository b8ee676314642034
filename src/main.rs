mod error;
mod fetch;
mod ontology;
mod parser;
mod record;
mod settings;
mod tagger;
mod writer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ontology::{Category, Ontology};
use parser::Pipeline;
use record::FoaRecord;
use settings::Settings;

#[derive(Parser)]
#[command(name = "foa_tagger", about = "Extract and tag funding opportunity announcements")]
struct Cli {
    /// JSON ontology file replacing the built-in vocabulary
    #[arg(long, global = true)]
    ontology: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch FOA pages, extract + tag them, write foa.json and foa.csv
    Run {
        /// Source URL (repeatable)
        #[arg(long = "url", required = true)]
        urls: Vec<String>,
        /// Output directory (default: FOA_OUT_DIR or ./out)
        #[arg(long, alias = "out_dir")]
        out_dir: Option<PathBuf>,
        /// Skip pages that fail to fetch or parse instead of aborting
        #[arg(long)]
        skip_malformed: bool,
    },
    /// Run the pipeline on a saved HTML page
    Parse {
        file: PathBuf,
        /// Source URL the page came from (default: file:// URL of the file)
        #[arg(long)]
        url: Option<String>,
        #[arg(long, alias = "out_dir")]
        out_dir: Option<PathBuf>,
    },
    /// List the tags of each ontology category
    Ontology,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let custom;
    let ontology = match &cli.ontology {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            custom = Ontology::from_json(&json)
                .with_context(|| format!("Invalid ontology {}", path.display()))?;
            info!("Loaded ontology from {}", path.display());
            &custom
        }
        None => Ontology::standard(),
    };
    let pipeline = Pipeline::new(ontology, settings.extract_options());

    let result = match cli.command {
        Commands::Run { urls, out_dir, skip_malformed } => {
            let fetcher = Arc::new(fetch::Fetcher::new(&settings)?);

            let t_fetch = Instant::now();
            println!("Fetching {} pages...", urls.len());
            let fetched = fetch::fetch_all(fetcher, urls, settings.concurrency).await;

            let mut pages = Vec::with_capacity(fetched.len());
            for f in fetched {
                match f.markup {
                    Ok(markup) => pages.push((f.url, markup)),
                    Err(e) if skip_malformed => warn!("Skipping {}: {:#}", f.url, e),
                    Err(e) => return Err(e),
                }
            }
            println!(
                "Fetched {} pages in {:.1}s",
                pages.len(),
                t_fetch.elapsed().as_secs_f64()
            );

            let records = process_pages(&pipeline, &pages, skip_malformed)?;
            finish(&records, out_dir.as_deref().unwrap_or(&settings.out_dir))
        }
        Commands::Parse { file, url, out_dir } => {
            let markup = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let url = match url {
                Some(u) => u,
                None => file_url(&file)?,
            };
            let records = process_pages(&pipeline, &[(url, markup)], false)?;
            finish(&records, out_dir.as_deref().unwrap_or(&settings.out_dir))
        }
        Commands::Ontology => {
            for category in Category::ALL {
                println!("{}: {}", category.as_str(), ontology.vocabulary(category).join(", "));
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn process_pages(
    pipeline: &Pipeline,
    pages: &[(String, String)],
    skip_malformed: bool,
) -> anyhow::Result<Vec<FoaRecord>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(pages.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let mut records = Vec::with_capacity(pages.len());
    for chunk in pages.chunks(500) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|(url, markup)| pipeline.run(markup, url))
            .collect();

        for result in results {
            match result {
                Ok(record) => records.push(record),
                Err(e) if skip_malformed => warn!("Skipping page: {}", e),
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(e.into());
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(records)
}

fn finish(records: &[FoaRecord], out_dir: &Path) -> anyhow::Result<()> {
    if records.is_empty() {
        bail!("No pages could be processed; nothing written");
    }
    let (json, csv) = writer::write_outputs(out_dir, records)?;

    println!(
        "{:<16} | {:<36} | {:<19} | {:<32}",
        "FOA", "Agency", "Closes", "Title"
    );
    println!("{}", "-".repeat(112));
    for r in records {
        let closes = r
            .close_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<16} | {:<36} | {:<19} | {:<32}",
            truncate(&r.foa_id, 16),
            truncate(&r.agency, 36),
            closes,
            truncate(&r.title, 32)
        );
    }

    for r in records {
        println!("Successfully processed FOA: {}", r.foa_id);
    }
    println!("Wrote {} and {}", json.display(), csv.display());
    Ok(())
}

fn file_url(path: &Path) -> anyhow::Result<String> {
    let abs = std::fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    url::Url::from_file_path(&abs)
        .map(|u| u.to_string())
        .map_err(|_| anyhow::anyhow!("Cannot build a URL for {}", abs.display()))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
