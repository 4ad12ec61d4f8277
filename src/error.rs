use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a reader to recognise its pattern at the head of the input.
///
/// The error owns the unconsumed remainder at the point of failure, which is
/// enough to locate it in the original text with [SyntaxError::position].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("syntax error: expected {expected} near {}", near(.remainder))]
pub struct SyntaxError {
    /// What the failing reader was looking for (e.g. `keyword FROM`).
    pub expected: String,
    /// The input left when the reader gave up.
    pub remainder: String,
}

impl SyntaxError {
    pub fn new(expected: impl Into<String>, remainder: &str) -> Self {
        Self {
            expected: expected.into(),
            remainder: remainder.to_string(),
        }
    }

    /// Byte offset of the failure inside `input`, the text handed to the
    /// outermost reader.
    pub fn position(&self, input: &str) -> usize {
        input.len().saturating_sub(self.remainder.len())
    }
}

fn near(remainder: &str) -> String {
    if remainder.is_empty() {
        return "end of input".into();
    }
    let head: String = remainder.chars().take(24).collect();
    format!("{head:?}")
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("LIMIT must be at least 1, got {0}")]
    InvalidLimit(i64),

    #[error("OFFSET must not be negative, got {0}")]
    InvalidOffset(i64),

    #[error("table {0:?} does not exist")]
    TableNotFound(String),

    #[error("table {0:?} already exists")]
    TableExists(String),

    #[error("column {0:?} not found")]
    ColumnNotFound(String),

    #[error("row has {found} values while the table has {expected} columns")]
    RowWidth { expected: usize, found: usize },

    #[error("expected {expected} statement, got {found}")]
    UnexpectedStatement {
        expected: &'static str,
        found: &'static str,
    },
}
