use super::lexer::LexKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("missing parameter name at index {index} in '{pattern}'")]
    MissingParameterName { pattern: String, index: usize },
    #[error("escape character at index {index} in '{pattern}' has nothing to escape")]
    DanglingEscape { pattern: String, index: usize },
    #[error("group at index {index} in '{pattern}' cannot start with '?'")]
    GroupStartsWithQuestion { pattern: String, index: usize },
    #[error("capturing group at index {index} in '{pattern}' is not allowed inside a parameter pattern")]
    NestedCapturingGroup { pattern: String, index: usize },
    #[error("unbalanced group starting at index {index} in '{pattern}'")]
    UnbalancedGroup { pattern: String, index: usize },
    #[error("empty group at index {index} in '{pattern}'")]
    EmptyGroup { pattern: String, index: usize },
    #[error("unexpected {found:?} at index {index} in '{pattern}', expected {expected:?}")]
    UnexpectedToken {
        pattern: String,
        index: usize,
        found: LexKind,
        expected: LexKind,
    },
    #[error("pattern '{pattern}' compiled to an invalid regular expression '{source_regex}'")]
    InvalidRegex {
        pattern: String,
        source_regex: String,
        #[source]
        source: regex::Error,
    },
}

pub type PatternResult<T> = Result<T, PatternError>;
