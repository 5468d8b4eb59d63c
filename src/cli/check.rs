//! Validate queries and report their diagnostics

use tracing::debug;

use super::{CliError, CommandOutput};
use crate::output::{render_diagnostics, to_json_pretty};
use crate::{ParseOptions, parse_with_options};

/// How `check` prints its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Diagnostics with source snippets
    #[default]
    Text,
    /// The whole parse result as JSON
    Json,
}

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The PPL query to check
    pub query: String,
    pub format: OutputFormat,
    /// Stop at the first command with an error
    pub fail_fast: bool,
}

/// Parse the query and report every diagnostic.
///
/// Warnings alone do not fail the check.
pub fn execute_check(options: &CheckOptions) -> Result<CommandOutput, CliError> {
    let parse_options = ParseOptions {
        recover: !options.fail_fast,
        ..ParseOptions::default()
    };
    let result = parse_with_options(&options.query, parse_options);
    let success = result.is_success();
    debug!(
        success,
        diagnostics = result.diagnostics.len(),
        "checked query"
    );

    let text = match options.format {
        OutputFormat::Json => to_json_pretty(&result)?,
        OutputFormat::Text => {
            let mut text = render_diagnostics(&options.query, &result.diagnostics);
            let errors = result.errors().count();
            let warnings = result.warnings().count();
            if errors == 0 && warnings == 0 {
                text.push_str(&format!(
                    "Query is valid ({} command{})\n",
                    result.query.len(),
                    if result.query.len() == 1 { "" } else { "s" }
                ));
            } else {
                text.push_str(&format!("{} error(s), {} warning(s)\n", errors, warnings));
            }
            text
        }
    };

    Ok(CommandOutput { text, success })
}
