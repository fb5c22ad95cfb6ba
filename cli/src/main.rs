//! PathoShield command line client
//!
//! Runs the console workflows without a terminal UI: check the backend,
//! submit a sample for prediction, issue a prescription, or print the
//! surveillance dashboard. Every command goes through the same `DataSource`
//! the TUI uses, live or mock.
//!
//! Usage:
//!   cargo run -p pathoshield-cli -- health
//!   cargo run -p pathoshield-cli -- predict --file run.csv --organism "E. coli"
//!   cargo run -p pathoshield-cli -- prescribe --file run.csv --organism "E. coli" --dosage 500mg --duration "7 days" --save
//!   cargo run -p pathoshield-cli -- --mock surveillance
//!   cargo run -p pathoshield-cli -- --mock run-all

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pathoshield_client::HttpDataSource;
use pathoshield_config::{ConsoleConfig, DataSourceKind};
use pathoshield_contracts::{
    error::{AmrError, AmrResult},
    prediction::{PredictionResult, SampleFile},
    prescription::Prescription,
};
use pathoshield_core::{
    charts::{map_markers, organism_bars, trend_icon, trend_series},
    ranking::Recommendations,
    summary::{render_summary, write_summary, PRODUCT_NAME, PRODUCT_TAGLINE},
    surveillance::{Fetch, RegionRow},
    DataSource, PredictionWorkflow, PrescriptionWorkflow, SurveillanceDashboard,
};
use pathoshield_mock::MockDataSource;

// ── CLI definition ────────────────────────────────────────────────────────────

/// PathoShield: AMR prediction, e-prescription and surveillance.
#[derive(Parser)]
#[command(
    name = "pathoshield",
    about = "PathoShield AMR console (command line)",
    long_about = "Submits samples for antimicrobial-resistance prediction, issues\n\
                  e-prescriptions and prints regional surveillance data."
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration file.
    #[arg(long, global = true, env = "PATHOSHIELD_API_URL")]
    api_url: Option<String>,

    /// `live` or `mock`, overriding the configuration file.
    #[arg(long, global = true, env = "PATHOSHIELD_DATA_SOURCE")]
    data_source: Option<DataSourceKind>,

    /// Shorthand for `--data-source mock`.
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the backend is reachable.
    Health,
    /// Submit a sample and print the susceptibility results.
    Predict(SampleArgs),
    /// Run a prediction, then issue a prescription for one susceptible antibiotic.
    Prescribe(PrescribeArgs),
    /// Print regional statistics, trends and the organism distribution.
    Surveillance,
    /// Health, surveillance, then a prediction and prescription on a built-in sample.
    RunAll,
}

#[derive(Args)]
struct SampleArgs {
    /// Sample file to upload (.txt or .csv by default).
    #[arg(long)]
    file: PathBuf,
    #[arg(long)]
    organism: String,
    /// Patient age in whole years.
    #[arg(long)]
    age: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    region: Option<String>,
}

#[derive(Args)]
struct PrescribeArgs {
    #[command(flatten)]
    sample: SampleArgs,
    /// Antibiotic to prescribe. Defaults to the top-ranked susceptible one.
    #[arg(long)]
    antibiotic: Option<String>,
    #[arg(long)]
    dosage: String,
    #[arg(long)]
    duration: String,
    #[arg(long)]
    instructions: Option<String>,
    /// Write the summary to the configured prescription directory.
    #[arg(long)]
    save: bool,
    /// Write the summary to this directory instead. Implies `--save`.
    #[arg(long)]
    output: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let console = match Console::open(&cli) {
        Ok(console) => console,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    print_banner(console.source.label());

    let result = match cli.command {
        Command::Health => console.health().await,
        Command::Predict(args) => console.predict(&args).await.map(|_| ()),
        Command::Prescribe(args) => console.prescribe(&args).await.map(|_| ()),
        Command::Surveillance => console.surveillance().await,
        Command::RunAll => console.run_all().await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ── Composition ───────────────────────────────────────────────────────────────

struct Console {
    config: ConsoleConfig,
    source: Arc<dyn DataSource>,
}

impl Console {
    fn open(cli: &Cli) -> AmrResult<Self> {
        let data_source = if cli.mock {
            Some(DataSourceKind::Mock)
        } else {
            cli.data_source
        };
        let config = ConsoleConfig::load(cli.config.as_deref())?
            .with_overrides(cli.api_url.clone(), data_source)?;

        let source: Arc<dyn DataSource> = match config.data_source {
            DataSourceKind::Live => Arc::new(HttpDataSource::from_config(&config)?),
            DataSourceKind::Mock => Arc::new(MockDataSource::new()),
        };
        info!(source = source.label(), base_url = %config.base_url(), "console ready");
        Ok(Self { config, source })
    }

    async fn health(&self) -> AmrResult<()> {
        let status = self.source.health().await?;
        println!("Backend:  online ({})", self.source.label());
        println!("Message:  {}", status.message);
        if let Some(database) = &status.database {
            println!("Database: {}", database);
        }
        println!();
        Ok(())
    }

    async fn predict(&self, args: &SampleArgs) -> AmrResult<PredictionResult> {
        let mut workflow = PredictionWorkflow::new(self.config.upload.limits());
        workflow.attach_path(&args.file)?;
        self.submit_prediction(workflow, args).await
    }

    async fn predict_sample(&self, sample: SampleFile, args: &SampleArgs) -> AmrResult<PredictionResult> {
        let mut workflow = PredictionWorkflow::new(self.config.upload.limits());
        workflow.attach_sample(sample)?;
        self.submit_prediction(workflow, args).await
    }

    async fn submit_prediction(
        &self,
        mut workflow: PredictionWorkflow,
        args: &SampleArgs,
    ) -> AmrResult<PredictionResult> {
        let form = workflow.form_mut();
        form.organism = args.organism.clone();
        form.patient_age = args.age.clone().unwrap_or_default();
        form.patient_gender = args.gender.clone().unwrap_or_default();
        form.region = args.region.clone().unwrap_or_default();

        let result = workflow.submit(self.source.as_ref()).await?;
        print_prediction(&result);
        Ok(result)
    }

    async fn prescribe(&self, args: &PrescribeArgs) -> AmrResult<Prescription> {
        let prediction = self.predict(&args.sample).await?;
        self.issue(prediction, args).await
    }

    async fn issue(&self, prediction: PredictionResult, args: &PrescribeArgs) -> AmrResult<Prescription> {
        let mut workflow = PrescriptionWorkflow::with_prediction(prediction);

        let antibiotic = match &args.antibiotic {
            Some(name) => name.clone(),
            None => workflow
                .recommendations()
                .name_at(0)
                .map(str::to_string)
                .ok_or_else(|| AmrError::validation("antibiotic", "No susceptible antibiotics to prescribe"))?,
        };
        workflow.select(&antibiotic)?;
        workflow.set_dosage(args.dosage.as_str())?;
        workflow.set_duration(args.duration.as_str())?;
        workflow.set_instructions(args.instructions.clone().unwrap_or_default())?;

        let prescription = workflow.submit(self.source.as_ref()).await?;
        println!("{}", render_summary(&prescription));

        let dir = match (&args.output, args.save) {
            (Some(dir), _) => Some(dir.clone()),
            (None, true) => Some(self.config.output.prescription_dir.clone()),
            (None, false) => None,
        };
        if let Some(dir) = dir {
            let path = write_summary(&prescription, &dir)?;
            println!("Saved to {}", path.display());
            println!();
        }
        Ok(prescription)
    }

    async fn surveillance(&self) -> AmrResult<()> {
        let mut dashboard = SurveillanceDashboard::new();
        dashboard.load_all(self.source.as_ref()).await;
        print_surveillance(&dashboard);
        Ok(())
    }

    async fn run_all(&self) -> AmrResult<()> {
        self.health().await?;
        self.surveillance().await?;

        let args = PrescribeArgs {
            sample: SampleArgs {
                file: PathBuf::from(DEMO_SAMPLE_NAME),
                organism: "E. coli".to_string(),
                age: Some("45".to_string()),
                gender: Some("Female".to_string()),
                region: Some("Punjab".to_string()),
            },
            antibiotic: None,
            dosage: "500mg".to_string(),
            duration: "7 days".to_string(),
            instructions: Some("Take with food".to_string()),
            save: false,
            output: None,
        };
        let sample = SampleFile::new(DEMO_SAMPLE_NAME, DEMO_SAMPLE.as_bytes().to_vec());
        let prediction = self.predict_sample(sample, &args.sample).await?;
        self.issue(prediction, &args).await?;

        println!("All workflows completed successfully.");
        Ok(())
    }
}

const DEMO_SAMPLE_NAME: &str = "demo-sample.csv";
const DEMO_SAMPLE: &str = "mz,intensity\n2000.5,112\n2411.0,87\n3125.7,240\n4365.2,65\n";

// ── Output ────────────────────────────────────────────────────────────────────

fn banner_title() -> String {
    format!("{PRODUCT_NAME}: {PRODUCT_TAGLINE}")
}

fn print_banner(source: &str) {
    println!();
    println!("{}", banner_title());
    println!("Data source: {source}");
    println!("=================================");
    println!();
}

fn print_prediction(result: &PredictionResult) {
    let recommendations = Recommendations::from_prediction(result);

    println!("Prediction Results");
    println!("  Patient ID:        {}", result.patient_id);
    println!("  Bacterial Species: {}", result.bacterial_species);
    if let Some(region) = &result.region {
        println!("  Region:            {}", region);
    }
    if let Some(confidence) = result.confidence {
        println!("  Confidence:        {:.1}%", confidence);
    }

    println!("  Susceptible (recommended order):");
    if recommendations.ranked.is_empty() {
        println!("    none");
    }
    for (i, entry) in recommendations.ranked.iter().enumerate() {
        let badges: Vec<&str> = entry.badges.iter().map(|b| b.label()).collect();
        if badges.is_empty() {
            println!("    {}. {}", i + 1, entry.name);
        } else {
            println!("    {}. {} [{}]", i + 1, entry.name, badges.join(", "));
        }
    }

    println!("  Resistant:");
    if recommendations.resistant.is_empty() {
        println!("    none");
    }
    for name in &recommendations.resistant {
        println!("    ✗ {}", name);
    }
    println!();
}

fn print_surveillance(dashboard: &SurveillanceDashboard) {
    let summary = dashboard.summary();
    println!("Surveillance Overview");
    println!("  Total cases:        {}", summary.total_cases);
    println!("  Organisms tracked:  {}", summary.distinct_organisms);
    println!("  Avg resistance:     {}", summary.average_resistance_label());
    println!("  Active regions:     {}", summary.active_regions);
    println!();

    println!("Regions");
    report_failure(dashboard.regions());
    for row in dashboard.table() {
        match row {
            RegionRow::Region {
                region,
                cases,
                resistance,
                organisms,
                trend,
            } => println!(
                "  {:<18} {:>6} cases  {:>6}  {} {:<10}  {}",
                region,
                cases,
                resistance,
                trend_icon(trend),
                trend.as_str(),
                organisms
            ),
            RegionRow::NoData => println!("  {}", RegionRow::NO_DATA_TEXT),
        }
    }
    let markers = map_markers(dashboard.regions().items());
    if !markers.is_empty() {
        println!("  Map markers:");
        for marker in markers {
            println!(
                "    {} ({:.4}, {:.4}): {}",
                marker.region,
                marker.lat,
                marker.lng,
                marker.organisms_label()
            );
        }
    }
    println!();

    println!("Resistance Trends");
    report_failure(dashboard.trends());
    for point in trend_series(dashboard.trends().items()) {
        println!("  {:<10} {:>5.1}%  {:>5} cases", point.label, point.resistance_percent, point.cases);
    }
    println!();

    println!("Organism Distribution");
    report_failure(dashboard.organisms());
    for bar in organism_bars(dashboard.organisms().items()) {
        println!("  {:<16} {:>5} cases  {:>5.1}%", bar.organism, bar.cases, bar.percentage);
    }
    println!();
}

fn report_failure<T>(fetch: &Fetch<Vec<T>>) {
    if let Some(message) = fetch.error() {
        println!("  (failed to load: {})", message);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn banner_title_is_plain_ascii() {
        let title = banner_title();
        assert!(title.starts_with(PRODUCT_NAME));
        assert!(title.is_ascii(), "banner must render on any terminal: {title}");
    }

    #[test]
    fn mock_flag_selects_mock_source() {
        let cli = Cli::try_parse_from(["pathoshield", "--mock", "surveillance"]).unwrap();
        let console = Console::open(&cli).unwrap();
        assert_eq!(console.source.label(), "mock");
    }

    #[test]
    fn prescribe_requires_dosage_and_duration() {
        let parsed = Cli::try_parse_from(["pathoshield", "prescribe", "--file", "a.csv", "--organism", "E. coli"]);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn run_all_completes_against_mock() {
        let cli = Cli::try_parse_from(["pathoshield", "--data-source", "mock", "run-all"]).unwrap();
        let console = Console::open(&cli).unwrap();
        console.run_all().await.unwrap();
    }
}
