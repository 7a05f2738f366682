//! mysql-pg-export CLI - MySQL table to PostgreSQL data script.

use clap::{Parser, Subcommand};
use mysql_pg_export::{Config, ExportError, Exporter, FileSink, ScriptSink, StdoutSink};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "mysql-pg-export")]
#[command(about = "Export a MySQL table as a PostgreSQL insert and sequence-reset script")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one table as a PostgreSQL script
    Export {
        /// Source table name
        #[arg(short, long)]
        table: String,

        /// Output script path, or "-" for stdout
        #[arg(short, long, default_value = "output.sql")]
        output: PathBuf,

        /// Double-quote identifiers in the script
        #[arg(long)]
        quote_identifiers: bool,

        /// Also export char, text, enum, decimal, float, date and time columns
        #[arg(long)]
        extended_types: bool,
    },

    /// Test the source database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ExportError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(ExportError::Config)?;

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Export {
            table,
            output,
            quote_identifiers,
            extended_types,
        } => {
            // Flags only switch options on; the config file may already have them set.
            config.export.quote_identifiers |= quote_identifiers;
            config.export.extended_types |= extended_types;

            let to_stdout = output.as_os_str() == "-";
            let mut sink: Box<dyn ScriptSink> = if to_stdout {
                Box::new(StdoutSink)
            } else {
                Box::new(FileSink::new(output))
            };

            let exporter = Exporter::new(config);
            let result = exporter.run(&table, sink.as_mut()).await?;

            if cli.output_json {
                // Keep stdout for the script itself.
                if to_stdout {
                    eprintln!("{}", result.to_json()?);
                } else {
                    println!("{}", result.to_json()?);
                }
            } else if !to_stdout {
                println!("\nExport completed!");
                println!("  Table: {}", result.table);
                println!("  Rows: {}", result.rows_exported);
                println!("  Primary key: {}", result.primary_key);
                println!("  Sequence restarts at: {}", result.next_sequence_value);
                println!("  Output: {}", result.output);
                println!("  Duration: {:.2}s", result.duration_seconds);
            }
        }

        Commands::HealthCheck => {
            let exporter = Exporter::new(config);
            let result = exporter.health_check().await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Source (MySQL): {} ({}ms)",
                    if result.source_connected { "OK" } else { "FAILED" },
                    result.source_latency_ms
                );
                if let Some(ref version) = result.server_version {
                    println!("    Version: {}", version);
                }
                if let Some(ref err) = result.source_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "\n  Overall: {}",
                    if result.healthy { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if !result.healthy {
                return Err(ExportError::connection(
                    "health check failed",
                    "checking MySQL source",
                ));
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("Unknown verbosity '{}'", other)),
    };

    // Logs go to stderr so `-o -` leaves a clean script on stdout.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("Unknown log format '{}'", other)),
    }

    Ok(())
}
