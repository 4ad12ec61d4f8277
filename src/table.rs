use std::fmt;

use allocative::Allocative;

use crate::column::{Column, eq_ignore_case};

/// Identity of a table: a case-insensitive name plus the columns declared
/// for it so far.
///
/// Columns may be appended while a query is being built; the declared list is
/// what a [crate::Database] uses as the schema when the table is created.
#[derive(Debug, Clone, Allocative)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Creates a table and declares the given columns on it, in order.
    pub fn with_columns(name: impl Into<String>, columns: &[&str]) -> Self {
        let mut table = Self::new(name);
        for column in columns {
            table.add_column(*column);
        }
        table
    }

    /// Declares a new column on the table and returns it.
    pub fn add_column(&mut self, name: impl Into<String>) -> Column {
        let column = self.column(name);
        self.columns.push(column.clone());
        column
    }

    /// Returns a column bound to this table without declaring it.
    pub fn column(&self, name: impl Into<String>) -> Column {
        Column::qualified(self.name.clone(), name)
    }

    /// Looks up a declared column by name (case-insensitive).
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| eq_ignore_case(&c.name, name))
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        eq_ignore_case(&self.name, &other.name)
    }
}

impl Eq for Table {}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_creation() {
        let table = Table::with_columns("users", &["id", "name"]);
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0], Column::qualified("users", "id"));
        assert_eq!(table.columns[1].table.as_deref(), Some("users"));
    }

    #[test]
    fn test_identity_is_name_only() {
        let a = Table::with_columns("Users", &["id"]);
        let b = Table::new("USERS");
        assert_eq!(a, b);
        assert_ne!(a, Table::new("orders"));
    }

    #[test]
    fn test_add_and_get_column() {
        let mut table = Table::new("users");
        let id = table.add_column("id");
        assert_eq!(id, Column::qualified("users", "id"));
        assert!(table.get_column("ID").is_some());
        assert!(table.get_column("age").is_none());

        // column() binds without declaring
        let age = table.column("age");
        assert_eq!(age.table.as_deref(), Some("users"));
        assert_eq!(table.columns.len(), 1);
    }
}
