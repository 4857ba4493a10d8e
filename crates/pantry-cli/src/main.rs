//! Pantry command-line interface.
//!
//! Browse datasets, run CRUD operations, and execute the canned report
//! queries from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List configured datasets
//! pantry datasets
//!
//! # Show a dataset
//! pantry show claims
//!
//! # Add a row (every column required)
//! pantry add providers --set Provider_ID=7 --set "Name=Fresh Farm" \
//!     --set Type=Grocery --set "Address=12 High St" \
//!     --set City=Springfield --set Contact=555-0101
//!
//! # Update row 0, blanking is allowed
//! pantry update claims 0 --set Status=Completed
//!
//! # Run a report as JSON
//! pantry -o json query providers_by_city
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod formatter;

use formatter::OutputFormat;

/// Pantry command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "pantry",
    version,
    about = "Browse, edit, and report on pantry datasets",
    long_about = "A command-line interface for the Pantry food-sharing datasets.\n\n\
                  Datasets are configured in a TOML file and may be backed by\n\
                  delimited text files or tables in a SQLite database."
)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", env = "PANTRY_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table")]
    output: OutputFormatArg,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured datasets
    Datasets,
    /// Show the current contents of a dataset
    Show {
        /// Dataset name
        dataset: String,
    },
    /// Add a row to a dataset
    Add {
        /// Dataset name
        dataset: String,
        /// Field values, one per column
        #[arg(long = "set", value_name = "COLUMN=VALUE", required = true)]
        set: Vec<String>,
    },
    /// Update a row of a dataset
    Update {
        /// Dataset name
        dataset: String,
        /// Row index within the current snapshot
        row: usize,
        /// Field overwrites; omitted columns keep their value
        #[arg(long = "set", value_name = "COLUMN=VALUE", required = true)]
        set: Vec<String>,
    },
    /// Delete a row of a dataset
    Delete {
        /// Dataset name
        dataset: String,
        /// Row index within the current snapshot
        row: usize,
    },
    /// List the report query catalog
    Queries,
    /// Run a report query
    Query {
        /// Query name, as listed by `pantry queries`
        name: String,
        /// Filter parameters
        #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
    },
    /// Write a default configuration file
    Init {
        /// Where to write the configuration
        #[arg(long, value_name = "FILE", default_value = "pantry.toml")]
        path: PathBuf,
    },
}

/// Output format argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Display results in a formatted table
    Table,
    /// Display results as JSON
    Json,
    /// Display results as CSV
    Csv,
    /// Display raw values
    Raw,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Csv => OutputFormat::Csv,
            OutputFormatArg::Raw => OutputFormat::Raw,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let format = args.output.into();
    match args.command {
        Command::Init { path } => commands::init(&path),
        Command::Datasets => commands::datasets(args.config.as_deref(), format),
        Command::Show { dataset } => commands::show(args.config.as_deref(), &dataset, format),
        Command::Add { dataset, set } => {
            commands::add(args.config.as_deref(), &dataset, &set, format)
        }
        Command::Update { dataset, row, set } => {
            commands::update(args.config.as_deref(), &dataset, row, &set, format)
        }
        Command::Delete { dataset, row } => {
            commands::delete(args.config.as_deref(), &dataset, row, format)
        }
        Command::Queries => commands::queries(format),
        Command::Query { name, params } => {
            commands::query(args.config.as_deref(), &name, &params, format)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pantry_cli=debug,pantry_engine=debug,pantry_storage=debug")
    } else {
        EnvFilter::new("pantry_cli=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
