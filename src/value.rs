use std::fmt;
use std::sync::Arc;

/// A literal written in a query: the right-hand side of a comparison, an
/// `IN` list member, or an `INSERT`/`UPDATE` value.
///
/// Table cells are plain strings, so every literal is compared through its
/// string form (see [Value::as_text]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The `NULL` keyword. Never equal to anything.
    Null,
    /// A numeric literal such as `42`, `-7`, `02134` or `2.50`, kept exactly
    /// as written.
    Number(Arc<str>),
    /// A quoted string literal, stored unescaped.
    Text(Arc<str>),
}

impl Value {
    /// Returns `true` if the value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Wraps the text of a numeric literal as recognised by the number reader.
    ///
    /// Returns `None` if the text is not a number. The text itself is kept,
    /// so leading zeros, trailing decimal zeros and values beyond `i64`
    /// survive.
    pub fn from_number(text: &str) -> Option<Self> {
        if text.parse::<i64>().is_err() && text.parse::<f64>().is_err() {
            return None;
        }
        Some(Self::Number(Arc::from(text)))
    }

    /// Returns the integer value of a [Value::Number] that fits an `i64`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    /// The string form used when comparing against table cells: the literal
    /// as written, without quotes.
    ///
    /// Returns `None` for [Value::Null].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Null => None,
            Self::Number(s) | Self::Text(s) => Some(s),
        }
    }

    /// Converts the literal into a table cell.
    pub fn into_cell(self) -> Option<String> {
        self.as_text().map(str::to_string)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(Arc::from(s))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Number(Arc::from(i.to_string()))
    }
}

/// Renders the literal as SQL: numbers as written, text single-quoted with
/// embedded quotes doubled.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Number(n) => f.write_str(n),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}
