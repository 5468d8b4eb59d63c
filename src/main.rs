use clap::{Parser as ClapParser, Subcommand};
use ppl_lang::cli::{
    self, CheckOptions, CliError, CommandOutput, OutputFormat, ParseCommandOptions, TokensOptions,
};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "ppl")]
#[command(about = "PPL - scan, parse and check piped processing language queries")]
#[command(version)]
struct Cli {
    /// Log filter for stderr output (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of a query
    Tokens {
        /// The PPL query (reads from stdin if not provided)
        query: Option<String>,

        /// Include whitespace and unrecognized characters
        #[arg(short, long)]
        all: bool,

        /// Print tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the syntax tree and diagnostics of a query as JSON
    Parse {
        /// The PPL query (reads from stdin if not provided)
        query: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Print the normalized query text instead of JSON
        #[arg(long, conflicts_with = "pretty")]
        canonical: bool,
    },

    /// Check a query and report its diagnostics
    Check {
        /// The PPL query (reads from stdin if not provided)
        query: Option<String>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Stop at the first command with an error
        #[arg(long)]
        fail_fast: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'ppl docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::Tokens { query, all, json } => read_query(query).and_then(|query| {
            cli::execute_tokens(&TokensOptions { query, all, json })
        }),
        Commands::Parse {
            query,
            pretty,
            canonical,
        } => read_query(query).and_then(|query| {
            cli::execute_parse(&ParseCommandOptions {
                query,
                pretty,
                canonical,
            })
        }),
        Commands::Check {
            query,
            format,
            fail_fast,
        } => read_query(query).and_then(|query| {
            cli::execute_check(&CheckOptions {
                query,
                format,
                fail_fast,
            })
        }),
        Commands::Docs => Ok(CommandOutput::ok(cli::get_docs_overview())),
        Commands::Doc { category } => cli::get_doc_category(&category).map(CommandOutput::ok),
    };

    match result {
        Ok(output) => {
            print!("{}", output.text);
            if !output.success {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_query(query: Option<String>) -> Result<String, CliError> {
    match query {
        Some(q) => Ok(q),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            let trimmed = buffer.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                return Err(CliError::NoInput);
            }
            Ok(trimmed.to_string())
        }
        None => Err(CliError::NoInput),
    }
}
