//! Print the syntax tree of a query

use super::{CliError, CommandOutput};
use crate::output::{to_json, to_json_pretty};

#[derive(Debug, Clone, Default)]
pub struct ParseCommandOptions {
    pub query: String,
    pub pretty: bool,
    /// Print the normalized query text instead of JSON
    pub canonical: bool,
}

/// Parse the query and print the query tree with its diagnostics.
pub fn execute_parse(options: &ParseCommandOptions) -> Result<CommandOutput, CliError> {
    let result = crate::parse(&options.query);
    let success = result.is_success();

    let text = if options.canonical {
        format!("{}\n", result.query)
    } else if options.pretty {
        to_json_pretty(&result)? + "\n"
    } else {
        to_json(&result)? + "\n"
    };

    Ok(CommandOutput { text, success })
}
