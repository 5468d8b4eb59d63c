//! Dump the token stream of a query

use super::{CliError, CommandOutput};
use crate::output::{render_tokens, to_json_pretty};
use crate::{Token, scan};

#[derive(Debug, Clone, Default)]
pub struct TokensOptions {
    pub query: String,
    /// Include whitespace and unrecognized characters
    pub all: bool,
    pub json: bool,
}

pub fn execute_tokens(options: &TokensOptions) -> Result<CommandOutput, CliError> {
    let tokens: Vec<Token<'_>> = scan(&options.query).collect();

    let text = if options.json {
        let listed: Vec<&Token<'_>> = tokens
            .iter()
            .filter(|t| options.all || t.is_significant())
            .collect();
        to_json_pretty(&listed)? + "\n"
    } else {
        render_tokens(&tokens, options.all)
    };

    Ok(CommandOutput::ok(text))
}
