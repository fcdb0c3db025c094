//! sqlfront CLI
//!
//! Command-line tool for tokenizing, parsing and checking SQL files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use sqlfront_cli::error::CliError;
use sqlfront_cli::{run_file, Format, Mode};

/// Lexer, parser and semantic checker for a small SQL subset.
#[derive(Parser)]
#[command(name = "sqlfront")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, env = "SQLFRONT_FORMAT", default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a file.
    Lex {
        /// SQL source file.
        file: PathBuf,
    },

    /// Print the parse tree of a file.
    Parse {
        /// SQL source file.
        file: PathBuf,
    },

    /// Run every stage and print the annotated tree and symbol table.
    Check {
        /// SQL source file.
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<CliError>().map_or(2, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Setup logging. Reports go to stdout, logs to stderr.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (mode, file) = match cli.command {
        Commands::Lex { file } => (Mode::Lex, file),
        Commands::Parse { file } => (Mode::Parse, file),
        Commands::Check { file } => (Mode::Check, file),
    };
    debug!(?mode, format = ?cli.format, "starting");

    let report = run_file(mode, &file, cli.format)?;
    print!("{}", report.output);
    report.check()?;
    Ok(())
}
