use crate::{commands::Commands, error::CliError};
use clap::Parser;
use commands::ParseArgs;
use engine_config::{ImportOptions, InferenceTables, ParseOptions};
use engine_core::repository::json_store::JsonFileRepository;
use engine_processing::classifier::ColumnClassifier;
use engine_processing::pipeline::IngestionPipeline;
use engine_processing::reader::CsvRowReader;
use model::entities::PeriodKey;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "emissary",
    version = "0.1.0",
    about = "Emissions-activity ingestion tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            file,
            no_headers,
            skip_rows,
            tables,
        } => {
            let tables = load_tables(tables.as_deref())?;
            let options = ParseOptions {
                has_headers: !no_headers,
                skip_rows,
                ..ParseOptions::default()
            };
            let bytes = tokio::fs::read(&file).await?;
            let reader = CsvRowReader::new(bytes, &options);
            let headers = reader.headers()?;
            let sample = reader.sample(tables.weights.sample_cap)?;
            let mapping = ColumnClassifier::new(&tables).classify(&headers, &sample);
            output::print_mapping(&mapping);
        }
        Commands::Parse {
            parse,
            json,
            output: output_path,
        } => {
            let (mut pipeline, options) = upload(&parse).await?;
            let report = pipeline.parse(&options)?;
            match output_path {
                Some(path) => output::write_report(&report, path).await?,
                None if json => output::print_report_json(&report)?,
                None => output::print_report(&report),
            }
        }
        Commands::Import {
            parse,
            auto_create,
            year,
            quarter,
            store,
        } => {
            if let Some(q) = quarter
                && !(1..=4).contains(&q)
            {
                return Err(CliError::InvalidArgument(format!(
                    "quarter must be 1-4, got {q}"
                )));
            }

            let (mut pipeline, options) = upload(&parse).await?;
            let report = pipeline.parse(&options)?;
            output::print_report(&report);

            let repo = Arc::new(JsonFileRepository::open(Path::new(&store))?);
            let import_options = ImportOptions {
                auto_create,
                target_period: year.map(|y| PeriodKey::new(y, quarter)),
            };
            let result = pipeline.import(repo, import_options).await?;
            pipeline.finalize()?;

            println!();
            output::print_import_result(&result);
        }
    }

    Ok(())
}

async fn upload(args: &ParseArgs) -> Result<(IngestionPipeline, ParseOptions), CliError> {
    let tables = load_tables(args.tables.as_deref())?;
    let mut options = ParseOptions {
        has_headers: !args.no_headers,
        skip_rows: args.skip_rows,
        default_year: args.default_year,
        ..ParseOptions::default()
    };
    if let Some(site) = &args.default_site {
        options.default_site = site.clone();
    }

    let bytes = tokio::fs::read(&args.file).await?;
    let pipeline = IngestionPipeline::new(
        bytes,
        &args.file,
        args.customer.as_deref(),
        Arc::new(tables),
    );
    Ok((pipeline, options))
}

fn load_tables(path: Option<&str>) -> Result<InferenceTables, CliError> {
    match path {
        Some(path) => Ok(InferenceTables::from_json_file(Path::new(path))?),
        None => Ok(InferenceTables::default()),
    }
}
