//! AC1 tool
//!
//! Converts native observing-array datasets to AC1, validates datasets
//! against the AC1 schemas and exposes the OceanSITES filename codec.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use ac1_tool::commands::{self, ConvertArgs, ValidateArgs};
use ac1_tool::config::{LogFormat, ReportFormat, ToolConfig};

#[derive(Parser, Debug)]
#[command(name = "ac1-tool")]
#[command(about = "Convert and validate AC1 transport datasets")]
struct Args {
    /// Schema directory (default: built-in schemas)
    #[arg(long, global = true, env = "AC1_SCHEMAS")]
    schemas: Option<PathBuf>,

    /// Log level or filter directives; `RUST_LOG` applies when unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Tool configuration file
    #[arg(long, global = true, env = "AC1_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a native dataset document to AC1
    Convert {
        #[arg(long)]
        array: String,
        #[arg(long)]
        product: String,
        /// Native dataset (JSON)
        #[arg(long)]
        input: PathBuf,
        /// Metadata record (YAML)
        #[arg(long)]
        metadata: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Validate the result and fail on errors
        #[arg(long)]
        check: bool,
    },
    /// Validate a dataset document against its schema
    Validate {
        /// Dataset (JSON)
        #[arg(long)]
        input: PathBuf,
        /// OceanSITES filename the dataset is stored under
        #[arg(long)]
        filename: String,
        #[arg(long, requires = "product")]
        array: Option<String>,
        #[arg(long, requires = "array")]
        product: Option<String>,
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
    },
    /// List registered products and their filename templates
    Schemas,
    /// OceanSITES filename codec
    Filename {
        #[command(subcommand)]
        action: FilenameAction,
    },
}

#[derive(Subcommand, Debug)]
enum FilenameAction {
    /// Decode a filename
    Parse { name: String },
    /// Assemble a filename from its parts
    Build {
        #[arg(long)]
        site: String,
        /// YYYYMMDD or YYYY-MM-DD
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "DPR")]
        content_type: String,
        #[arg(long)]
        tag: String,
    },
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match ToolConfig::load_optional(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(
        log_filter(args.log_level.as_deref()),
        args.log_format.unwrap_or(config.log_format),
    );

    match run(args, config) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// `--log-level` when given, else `RUST_LOG`, else `info`.
fn log_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

fn init_tracing(filter: EnvFilter, format: LogFormat) {
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn run(args: Args, config: ToolConfig) -> Result<ExitCode> {
    let schemas = args.schemas.or(config.schemas_dir);

    match args.command {
        Command::Convert {
            array,
            product,
            input,
            metadata,
            output_dir,
            check,
        } => {
            let registry = commands::load_registry(schemas.as_deref())?;
            let output_dir = output_dir
                .or(config.output_dir)
                .unwrap_or_else(|| PathBuf::from("."));
            let outcome = commands::convert(
                &registry,
                &ConvertArgs {
                    array,
                    product,
                    input,
                    metadata,
                    output_dir,
                    check,
                },
            )?;
            if let Some(report) = &outcome.report {
                println!("{}", report);
            }
            println!("{}", outcome.path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate {
            input,
            filename,
            array,
            product,
            format,
        } => {
            let registry = commands::load_registry(schemas.as_deref())?;
            let report = commands::validate_file(
                &registry,
                &ValidateArgs {
                    input,
                    filename,
                    product: array.zip(product),
                },
            )?;
            match format.unwrap_or(config.report_format) {
                ReportFormat::Text => println!("{}", report),
                ReportFormat::Json => println!("{}", report.to_json_pretty()?),
            }
            info!(passed = report.passed(), "Validation finished");
            Ok(if report.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Schemas => {
            let registry = commands::load_registry(schemas.as_deref())?;
            for line in commands::list_schemas(&registry) {
                println!("{}", line);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Filename { action } => {
            let output = match action {
                FilenameAction::Parse { name } => commands::parse_name(&name)?,
                FilenameAction::Build {
                    site,
                    start,
                    end,
                    content_type,
                    tag,
                } => commands::build_name(&site, &start, &end, &content_type, &tag)?,
            };
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_flag_is_optional() {
        let args = Args::try_parse_from(["ac1-tool", "schemas"]).unwrap();
        assert!(args.log_level.is_none());

        let args = Args::try_parse_from(["ac1-tool", "schemas", "--log-level", "debug"]).unwrap();
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_explicit_level_used_verbatim() {
        assert_eq!(log_filter(Some("ac1_convert=debug")).to_string(), "ac1_convert=debug");
    }
}
