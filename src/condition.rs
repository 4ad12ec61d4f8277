use std::fmt;

use crate::column::{Column, eq_ignore_case};
use crate::data::{Cell, ColumnData};
use crate::value::Value;

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    Column(Column),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Column(c) => write!(f, "{c}"),
        }
    }
}

/// A boolean predicate over one row.
///
/// Only [Condition::Equals] and [Condition::In] are evaluated. The other
/// variants parse and render but always reject; see [Condition::is_evaluable].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = literal` or `column = column`, case-insensitive.
    Equals(Column, Operand),
    /// `column > literal` or `column > column`.
    Greater(Column, Operand),
    /// `column IN (literal, ...)`, case-sensitive.
    In(Column, Vec<Value>),
    /// `column LIKE 'pattern'`.
    Like(Column, Value),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn equals(column: Column, value: impl Into<Value>) -> Self {
        Self::Equals(column, Operand::Value(value.into()))
    }

    pub fn equals_column(column: Column, other: Column) -> Self {
        Self::Equals(column, Operand::Column(other))
    }

    /// Returns `false` if this condition, or any condition nested in it, is a
    /// variant whose evaluation is not implemented and always rejects.
    pub fn is_evaluable(&self) -> bool {
        match self {
            Self::Equals(..) | Self::In(..) => true,
            Self::Greater(..) | Self::Like(..) | Self::And(_) | Self::Or(_) | Self::Not(_) => {
                false
            }
        }
    }

    /// Evaluates the condition against `row`, a row of `data`.
    ///
    /// # SQL NULL semantics
    /// A null cell, a `NULL` literal or a column missing from `data` never
    /// satisfies a comparison.
    pub fn accepts<D: ColumnData + ?Sized>(&self, data: &D, row: &[Cell]) -> bool {
        match self {
            Self::Equals(column, operand) => {
                let Some(left) = cell(data, row, column) else {
                    return false;
                };
                match operand {
                    Operand::Value(value) => value
                        .as_text()
                        .is_some_and(|right| eq_ignore_case(left, right)),
                    Operand::Column(other) => {
                        cell(data, row, other).is_some_and(|right| eq_ignore_case(left, right))
                    }
                }
            }
            Self::In(column, values) => {
                let Some(left) = cell(data, row, column) else {
                    return false;
                };
                values
                    .iter()
                    .any(|v| v.as_text().is_some_and(|right| left == right))
            }
            // Not evaluated yet: these always reject until their semantics are decided.
            Self::Greater(..) | Self::Like(..) | Self::And(_) | Self::Or(_) | Self::Not(_) => false,
        }
    }
}

fn cell<'r, D: ColumnData + ?Sized>(data: &D, row: &'r [Cell], column: &Column) -> Option<&'r str> {
    let idx = data.index_of(column)?;
    row.get(idx)?.as_deref()
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Condition], keyword: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " {keyword} ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(column, operand) => write!(f, "{column} = {operand}"),
            Self::Greater(column, operand) => write!(f, "{column} > {operand}"),
            Self::In(column, values) => {
                write!(f, "{column} IN (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
            Self::Like(column, pattern) => write!(f, "{column} LIKE {pattern}"),
            Self::And(items) => write_joined(f, items, "AND"),
            Self::Or(items) => write_joined(f, items, "OR"),
            Self::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}
