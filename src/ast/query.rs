use std::fmt;

use serde::Serialize;

use crate::ast::Command;

/// Complete query pipeline.
///
/// Commands run left to right, each consuming the rows of the previous one.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Query {
    /// Pipeline stages, in source order
    pub commands: Vec<Command>,
}

impl Query {
    pub fn new(commands: Vec<Command>) -> Self {
        Query { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Names of the commands, in order.
    pub fn command_names(&self) -> Vec<&'static str> {
        self.commands.iter().map(Command::name).collect()
    }
}

/// Renders normalized query text: lower-case keywords, binary
/// sub-expressions parenthesized, stages joined with ` | `.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", command)?;
        }
        Ok(())
    }
}
