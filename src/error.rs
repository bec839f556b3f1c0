use thiserror::Error;

use crate::predicate::{Combinator, Param};

#[derive(Error, Debug)]
pub enum WherechainError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Construction error: empty token sequence")]
    EmptyTokens,
    #[error("Construction error: {combinator} at {index} needs {arity} operands but only {available} are available")]
    Arity { combinator: Combinator, index: usize, arity: usize, available: usize },
    #[error("Construction error: {combinator} at {index} has no operands")]
    Degenerate { combinator: Combinator, index: usize },
    #[error("Construction error: {combinator} at {index} leaves {surplus} operands unmerged")]
    Orphaned { combinator: Combinator, index: usize, surplus: usize },
    #[error("Construction error: {operands} operands were never merged into a single tree")]
    Unmerged { operands: usize },
    #[error("Construction error: tokens from {index} onwards are not part of the tree")]
    Trailing { index: usize },
    #[error("Construction error: nesting at {index} exceeds the recursion limit of {limit}")]
    TooDeep { index: usize, limit: usize },
    #[error("Unbound parameter {param} (only {bound} values bound)")]
    UnboundParameter { param: Param, bound: usize },
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, WherechainError>;

// Helper conversions
impl From<config::ConfigError> for WherechainError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
