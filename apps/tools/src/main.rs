use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use dashboard_api::{export_download, filter_records, normalize_selection};
use dataset::{Dataset, DatasetSource, DEFAULT_DATASET_URL};
use shared::domain::{ClickSignal, FilterSelection};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = DEFAULT_DATASET_URL)]
    dataset_url: String,
    /// Read a local CSV instead of fetching `dataset_url`.
    #[arg(long)]
    dataset_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the filtered rows to GapMinder_Filtered_Data.csv.
    Export(ExportArgs),
    Summary,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long = "country")]
    countries: Vec<String>,
    #[arg(long = "continent")]
    continents: Vec<String>,
    #[arg(long)]
    pop_min: Option<u64>,
    #[arg(long)]
    pop_max: Option<u64>,
    #[arg(long)]
    life_exp_min: Option<f64>,
    #[arg(long)]
    life_exp_max: Option<f64>,
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

impl ExportArgs {
    fn selection(&self, dataset: &Dataset) -> FilterSelection {
        let mut selection = FilterSelection::all_inclusive(dataset.bounds());
        selection.countries.extend(self.countries.iter().cloned());
        selection.continents.extend(self.continents.iter().cloned());
        if let Some(v) = self.pop_min {
            selection.population.min = v;
        }
        if let Some(v) = self.pop_max {
            selection.population.max = v;
        }
        if let Some(v) = self.life_exp_min {
            selection.life_expectancy.min = v;
        }
        if let Some(v) = self.life_exp_max {
            selection.life_expectancy.max = v;
        }
        normalize_selection(dataset, selection)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let source = match cli.dataset_path {
        Some(path) => DatasetSource::Path(path),
        None => DatasetSource::Url(cli.dataset_url),
    };
    let dataset = source
        .load()
        .await
        .with_context(|| format!("failed to load dataset from {source}"))?;

    match cli.command {
        Command::Export(args) => {
            let selection = args.selection(&dataset);
            let view = filter_records(&dataset, &selection);
            let payload = export_download(&view, ClickSignal::Clicked(1))
                .map_err(|e| anyhow!("export failed: {}", e.message))?
                .context("export produced no payload")?;

            fs::create_dir_all(&args.output_dir).with_context(|| {
                format!(
                    "failed to create output directory '{}'",
                    args.output_dir.display()
                )
            })?;
            let path = args.output_dir.join(&payload.filename);
            fs::write(&path, payload.content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(rows = view.len(), path = %path.display(), "export written");
            println!("wrote {} rows to {}", view.len(), path.display());
        }
        Command::Summary => {
            let summary = dataset.summary();
            println!("source: {}", summary.source);
            println!("rows: {}", dataset.len());
            println!("countries: {}", summary.countries.len());
            println!("continents: {}", summary.continents.join(", "));
            println!(
                "population: {}..={}",
                summary.bounds.population.min, summary.bounds.population.max
            );
            println!(
                "life expectancy: {}..={}",
                summary.bounds.life_expectancy.min, summary.bounds.life_expectancy.max
            );
        }
    }

    Ok(())
}
