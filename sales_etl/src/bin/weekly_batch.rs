use clap::{Parser, Subcommand};
use sales_etl::reset::reset_stores;
use sales_etl::{Pipeline, PipelineConfig, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Weekly sales ETL and forecast batch
#[derive(Parser, Debug)]
#[command(name = "weekly_batch", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding sales.db, new_data.db and warehouse.db
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline, print the chart JSON, then pull in next week's orders
    Run,
    /// Run the pipeline and print the chart JSON
    Forecast,
    /// Pull next week's orders from staging into the raw store
    Replenish,
    /// Reload the raw and staging tables from CSV and remove the warehouse
    Reset {
        #[arg(long)]
        base_csv: PathBuf,
        #[arg(long)]
        new_csv: PathBuf,
    },
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    Ok(match &cli.data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    })
}

fn execute(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Run => {
            let pipeline = Pipeline::new(config)?;
            let chart = pipeline.run()?;
            println!("{}", chart.to_json()?);
            pipeline.replenish()?;
        }
        Command::Forecast => {
            let chart = Pipeline::new(config)?.run()?;
            println!("{}", chart.to_json()?);
        }
        Command::Replenish => {
            let report = sales_etl::replenish(&config)?;
            info!(appended = report.appended, "replenish finished");
        }
        Command::Reset { base_csv, new_csv } => {
            reset_stores(&config, base_csv, new_csv)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
