//! CLI support for ppl-lang
//!
//! Every subcommand of the `ppl` binary is a plain function here returning
//! the text to print, so other tools can embed them.

mod check;
mod docs;
mod parse;
mod tokens;

pub use check::{CheckOptions, OutputFormat, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use parse::{ParseCommandOptions, execute_parse};
pub use tokens::{TokensOptions, execute_tokens};

use std::io;

use thiserror::Error;

/// Text produced by a subcommand and whether the query passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    /// `false` makes the binary exit with status 1 after printing `text`
    pub success: bool,
}

impl CommandOutput {
    pub fn ok(text: String) -> Self {
        CommandOutput {
            text,
            success: true,
        }
    }
}

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No query provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'ppl docs' to see available categories.")]
    UnknownCategory(String),
}
