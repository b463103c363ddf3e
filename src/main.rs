use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use opendata::config::ServiceConfig;
use opendata::errors::ExportError;
use opendata::export::{to_csv, to_json, ROOT_TABLE};
use opendata::services::OpenDataService;
use opendata::source::SubmissionFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[cfg(feature = "server")]
    Serve {
        #[clap(short, long, default_value = "opendata.yaml")]
        config: PathBuf,
        #[clap(short, long, default_value = "3000")]
        port: u16,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    Schema {
        #[clap(short, long, default_value = "opendata.yaml")]
        config: PathBuf,
        #[clap(short, long)]
        uuid: Uuid,
    },
    Data {
        #[clap(short, long, default_value = "opendata.yaml")]
        config: PathBuf,
        #[clap(short, long)]
        uuid: Uuid,
        /// Only submissions with a larger _id
        #[clap(long)]
        gt_id: Option<i64>,
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Table to write when the format is csv
        #[clap(short, long, default_value = ROOT_TABLE)]
        table: String,
        /// Write to a file instead of stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        #[cfg(feature = "server")]
        Commands::Serve {
            config,
            port,
            cors_origin,
        } => {
            let config = ServiceConfig::load(&config)?;
            info!("Starting server on port {}", port);
            opendata::server::start_server(port, &config, cors_origin.as_deref()).await?;
        }
        Commands::Schema { config, uuid } => {
            let service = load_service(&config)?;
            let schemas = service.schema(&uuid)?;
            println!("{}", to_json::render_schema(&schemas)?);
        }
        Commands::Data {
            config,
            uuid,
            gt_id,
            format,
            table,
            output,
        } => {
            let service = load_service(&config)?;
            let filter = SubmissionFilter { gt_id };
            let writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(File::create(path)?)),
                None => Box::new(io::stdout().lock()),
            };

            let count = match format {
                OutputFormat::Json => to_json::write_rows(service.rows(&uuid, filter)?, writer)?,
                OutputFormat::Csv => {
                    let rows = service.rows(&uuid, filter)?;
                    let schema = rows
                        .flattener()
                        .layout()
                        .schema(&table)
                        .cloned()
                        .ok_or_else(|| ExportError::UnknownTable(table.clone()))?;
                    to_csv::write_table(&schema, rows, writer)?
                }
            };
            info!("Exported {} row(s) for {}", count, uuid);
        }
    }

    Ok(())
}

fn load_service(config: &Path) -> Result<OpenDataService> {
    let config = ServiceConfig::load(config)?;
    Ok(OpenDataService::new(
        Arc::new(config.source()),
        &config.base_url,
    ))
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_string()))
        .with_writer(io::stderr)
        .init();
}
