mod commands;
mod config;
mod diagnostics;
mod info;
mod serve;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hashline::{EditKind, Error};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::commands::EditArgs;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "hashline", version, about = "Content-hashed line references for safe edits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Fixed hash length (3-8) instead of the adaptive default
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(3..=8))]
    length: Option<u8>,
    /// Write bare `<line>:<hash>|` tags without a prefix
    #[arg(long, global = true)]
    no_prefix: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a file with every line tagged
    Annotate {
        /// File to annotate
        file: String,
    },
    /// Apply a hash-verified edit and write the file back
    Edit {
        /// File to edit
        file: String,
        /// replace, delete, insert_before or insert_after
        operation: EditKind,
        /// Start reference (`12:a3f` or a whole annotated line)
        #[arg(allow_hyphen_values = true)]
        start: String,
        /// End reference for replace/delete ranges
        #[arg(long, allow_hyphen_values = true)]
        end: Option<String>,
        /// Replacement text
        #[arg(long, conflicts_with = "text_file", allow_hyphen_values = true)]
        text: Option<String>,
        /// Read replacement text from a file
        #[arg(long)]
        text_file: Option<PathBuf>,
        /// Print the result instead of writing the file
        #[arg(long)]
        dry_run: bool,
        /// Print the edit result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Output a reference document for hashline
    Info {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// List every line's reference
    Map {
        /// File to map
        file: String,
    },
    /// Print the text of a verified line range
    Range {
        /// File to read
        file: String,
        /// First line reference
        #[arg(allow_hyphen_values = true)]
        start: String,
        /// Last line reference
        #[arg(allow_hyphen_values = true)]
        end: String,
    },
    /// Answer JSON requests on stdin, one per line
    Serve,
    /// Print a file with tags removed
    Strip {
        /// Annotated file
        file: String,
    },
    /// Check whether a reference still matches (exit 0/1/2)
    Verify {
        /// File to check against
        file: String,
        /// Reference (`12:a3f` or a whole annotated line)
        #[arg(allow_hyphen_values = true)]
        reference: String,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match Config::load(&PathBuf::from(".")) {
        Ok(c) => c,
        Err(e) => return report(&e),
    };
    config.apply_overrides(cli.length.map(usize::from), cli.no_prefix);

    let result = match cli.command {
        Commands::Annotate { file } => commands::annotate(&file, &config).map(|()| return ExitCode::SUCCESS),
        Commands::Edit { file, operation, start, end, text, text_file, dry_run, json } => {
            let args = EditArgs { dry_run, end, json, operation, start, text, text_file };
            commands::edit(&file, args, &config).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Info { json } => {
            info::run(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Map { file } => commands::map(&file, &config).map(|()| return ExitCode::SUCCESS),
        Commands::Range { file, start, end } => {
            commands::range(&file, &start, &end).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Serve => serve_stdio(config),
        Commands::Strip { file } => commands::strip(&file, &config).map(|()| return ExitCode::SUCCESS),
        Commands::Verify { file, reference } => commands::verify(&file, &reference),
    };

    return result.unwrap_or_else(|e| return report(&e));
}

/// Logs go to stderr so stdout stays clean for documents and JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("HASHLINE_LOG").unwrap_or_else(|_| {
        return EnvFilter::new(if env::var("DEBUG").is_ok() { "hashline=debug" } else { "hashline=warn" });
    });

    let format = env::var("HASHLINE_LOG_FORMAT").unwrap_or_else(|_| return "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => registry.with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr)).init(),
        _ => registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init(),
    }
}

/// Print a diagnostic and pick the exit code.
/// Priority mirrors `verify`: stale (1), out of range (2), anything else (3).
fn report(e: &Error) -> ExitCode {
    diagnostics::print_error(e);
    return match e {
        Error::StaleReference { .. } => ExitCode::from(1),
        Error::OutOfRange { .. } => ExitCode::from(2),
        _ => ExitCode::from(3),
    };
}

/// Run the JSON request loop on stdin/stdout.
///
/// # Errors
///
/// Returns config or stdio errors.
fn serve_stdio(config: Config) -> Result<ExitCode, Error> {
    let session = serve::Session::new(PathBuf::from("."), config)?;
    eprintln!("serve: reading JSON requests from stdin, one per line");
    session.run(std::io::stdin().lock(), std::io::stdout().lock())?;
    return Ok(ExitCode::SUCCESS);
}
