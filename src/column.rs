use std::fmt;
use std::hash::{Hash, Hasher};

use allocative::Allocative;

/// Name of the wildcard column produced by `*`.
pub const WILDCARD: &str = "*";

/// Case-insensitive text equality, used for identifiers and for cell values.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Identity of a column inside a query.
///
/// A column is identified by `(table, name)`, both compared case-insensitively.
/// The alias only affects how the column is labelled in output and is not
/// part of its identity. A column without a table is "free": it resolves by
/// name alone.
#[derive(Debug, Clone, Allocative)]
pub struct Column {
    /// Name of the owning table, if the column was qualified.
    pub table: Option<String>,
    /// The column name.
    pub name: String,
    /// Optional `AS` alias.
    pub alias: Option<String>,
}

impl Column {
    /// Creates a free column, not bound to any table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Creates a column bound to the given table name.
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
            alias: None,
        }
    }

    /// The free wildcard `*`, standing for every column.
    pub fn all() -> Self {
        Self::new(WILDCARD)
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// `[table.]name`, without the alias.
    pub fn qualified_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{table}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Returns `true` for `*` and `table.*`.
    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }

    /// The label of the column in a result: its alias if any, else its name.
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Returns `true` if this column, used as a lookup key, designates
    /// `candidate` (a column of some schema).
    ///
    /// Names must match. A free key matches regardless of the candidate's
    /// table, a qualified key only matches a candidate of the same table.
    pub fn designates(&self, candidate: &Column) -> bool {
        if !eq_ignore_case(&self.name, &candidate.name) {
            return false;
        }
        match (&self.table, &candidate.table) {
            (None, _) => true,
            (Some(t), Some(c)) => eq_ignore_case(t, c),
            (Some(_), None) => false,
        }
    }

    /// Returns `true` if this wildcard covers `candidate`: `*` covers every
    /// column, `t.*` the columns of table `t`.
    pub fn covers(&self, candidate: &Column) -> bool {
        if !self.is_wildcard() {
            return false;
        }
        match (&self.table, &candidate.table) {
            (None, _) => true,
            (Some(t), Some(c)) => eq_ignore_case(t, c),
            (Some(_), None) => false,
        }
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        let same_table = match (&self.table, &other.table) {
            (None, None) => true,
            (Some(a), Some(b)) => eq_ignore_case(a, b),
            _ => false,
        };
        same_table && eq_ignore_case(&self.name, &other.name)
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        fn hash_folded<H: Hasher>(text: &str, state: &mut H) {
            for c in text.chars().flat_map(char::to_lowercase) {
                c.hash(state);
            }
            state.write_u8(0xff);
        }
        match &self.table {
            Some(table) => hash_folded(table, state),
            None => state.write_u8(0),
        }
        hash_folded(&self.name, state);
    }
}

/// Renders `[table.]name[ AS alias]`.
impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(table) = &self.table {
            write!(f, "{table}.")?;
        }
        f.write_str(&self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}
