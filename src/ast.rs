//! # PPL - Abstract Syntax Tree
//!
//! This module defines the tokens and the Abstract Syntax Tree (AST) of PPL,
//! the piped processing language used to search, filter and aggregate log
//! and event data.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer, with spans and channels
//! - **[keywords]** - The reserved-word table and its per-keyword metadata
//! - **[literals]** - Literal values, temporal literals and cast targets
//! - **[operators]** - Binary and prefix operators
//! - **[expressions]** - Expression nodes (fields, calls, operations)
//! - **[commands]** - One node per pipeline command
//! - **[query]** - The complete pipeline
//!
//! ## Quick Start
//!
//! ```text
//! source=logs | where status >= 500 | stats count() by host
//! ```
//!
//! This query reads the `logs` index, keeps server errors and counts them per
//! host.
//!
//! ## Core Concepts
//!
//! ### Pipeline Structure
//!
//! A query is a sequence of commands separated by `|`. The first command
//! usually names the data (`search`, `describe`, `show datasources`):
//!
//! ```text
//! search source=logs | command | command | ...
//! ```
//!
//! ### Keywords Are Case-Insensitive
//!
//! `STATS`, `stats` and `StAtS` are the same keyword. Outside of command
//! position most keywords can also name a field, so `where span > 10` and
//! `fields source, count` both work.
//!
//! ### Expressions
//!
//! Precedence from loosest to tightest:
//!
//! | Level | Operators |
//! |-------|-----------|
//! | 1 | `xor` |
//! | 2 | `or` |
//! | 3 | `and`, or two conditions side by side |
//! | 4 | `not` |
//! | 5 | `=` `!=` `<` `<=` `>` `>=` `like` `regexp` `in` |
//! | 6 | `+` `-` |
//! | 7 | `*` `/` `%` |
//! | 8 | unary `-` `+` |
//!
//! ## Examples
//!
//! ### Implicit AND in Search
//!
//! ```text
//! search source=web status=500 method='POST'
//! ```
//!
//! ### Relevance Search
//!
//! ```text
//! source=docs | where multi_match(['title' ^ 2, 'body'], 'disk full', operator='AND')
//! ```
//!
//! ### Time Buckets
//!
//! ```text
//! source=metrics | stats avg(cpu) by span(@timestamp, 5m), host
//! ```
pub mod tokens;
pub mod keywords;
pub mod literals;
pub mod expressions;
pub mod operators;
pub mod commands;
pub mod query;

pub use tokens::{Channel, Span, Token, TokenKind};
pub use keywords::{Arity, FunctionFamily, Keyword, KeywordRole};
pub use literals::{DataType, DateKind, Literal};
pub use expressions::{CaseBranch, Expr, FieldRef, FunctionCall, NamedOption, WeightedField};
pub use operators::{BinOp, UnaryOp};
pub use commands::*;
pub use query::Query;
