use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fieldschema_core::{
    build_from_raw, read_rows_from_path, BuildError, BuildOptions, ErrorCode, TableOptions,
    DRAFT_07,
};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "fieldschema")]
#[command(about = "Turn a field-definition table into a JSON Schema and a sample document")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the schema and sample documents from a CSV table
    Generate {
        /// Input CSV table
        input: PathBuf,

        /// Output JSON Schema file ("-" for stdout)
        #[arg(long, default_value = "output_schema.json")]
        schema_out: PathBuf,

        /// Output sample document file ("-" for stdout)
        #[arg(long, default_value = "sample_output.json")]
        sample_out: PathBuf,

        /// CSV field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,

        /// Value of the top-level `$schema` keyword
        #[arg(long, default_value = DRAFT_07)]
        schema_uri: String,

        /// Maximum number of segments in a field path
        #[arg(long, default_value_t = 50)]
        max_depth: usize,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Build without writing anything and print a summary
    Check {
        /// Input CSV table
        input: PathBuf,

        /// CSV field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Compact,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(exit_status(&err))
        }
    }
}

/// Exit status for a failed run, keyed on the build error code when there
/// is one. Clap already owns status 2 for usage errors.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<BuildError>().map(BuildError::code) {
        Some(
            ErrorCode::MissingField
            | ErrorCode::InvalidPath
            | ErrorCode::PathTooDeep
            | ErrorCode::InvalidNumber
            | ErrorCode::InvalidDefault,
        ) => 3,
        Some(ErrorCode::StructureConflict) => 4,
        Some(ErrorCode::TableError) => 5,
        _ => 1,
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Generate {
            input,
            schema_out,
            sample_out,
            delimiter,
            schema_uri,
            max_depth,
            format,
        } => {
            let options = BuildOptions {
                schema_uri,
                max_depth,
            };
            let result = build_table(&input, delimiter, &options)?;

            // The build has fully succeeded before anything is written
            write_json(&result.schema, &schema_out, format)?;
            write_json(&result.sample, &sample_out, format)?;
            tracing::info!(
                rows = result.rows,
                schema = %schema_out.display(),
                sample = %sample_out.display(),
                "wrote schema and sample"
            );
        }
        Commands::Check { input, delimiter } => {
            let result = build_table(&input, delimiter, &BuildOptions::default())?;
            let properties = result.schema["properties"]
                .as_object()
                .map_or(0, |p| p.len());
            println!(
                "{}: {} rows, {} top-level properties",
                input.display(),
                result.rows,
                properties
            );
        }
    }

    Ok(())
}

fn build_table(
    input: &Path,
    delimiter: char,
    options: &BuildOptions,
) -> Result<fieldschema_core::BuildResult> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Delimiter must be a single ASCII character: {delimiter:?}"))?;

    let rows = read_rows_from_path(input, &TableOptions { delimiter })
        .with_context(|| format!("Failed to read table: {}", input.display()))?;

    build_from_raw(&rows, options).map_err(|e| {
        anyhow::Error::from(e).context(format!("Build failed for {}", input.display()))
    })
}

fn write_json<T: Serialize>(val: &T, path: &Path, format: OutputFormat) -> Result<()> {
    let mut writer: Box<dyn Write> = if path == Path::new("-") {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Box::new(BufWriter::new(file))
    };

    match format {
        OutputFormat::Pretty => {
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
            val.serialize(&mut ser).context("Failed to write JSON")?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut writer, val).context("Failed to write JSON")?;
        }
    }

    // Ensure trailing newline
    writeln!(writer).context("Failed to write trailing newline")?;
    writer.flush().context("Failed to flush output")?;

    Ok(())
}
