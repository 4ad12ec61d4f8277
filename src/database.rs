use std::collections::HashMap;

use tracing::{debug, info};

use crate::ast::{InsertQuery, Statement, UpdateQuery};
use crate::column::Column;
use crate::data::{Cell, ColumnData, Data, Row};
use crate::error::{Error, Result};
use crate::executor::TableSource;
use crate::parser::parse;
use crate::table::Table;

/// A table together with its rows.
#[derive(Debug, Clone)]
struct Stored {
    table: Table,
    data: Data,
}

/// An in-memory set of tables, usable as the [TableSource] of a query.
///
/// Table names are case-insensitive.
#[derive(Debug, Default)]
pub struct Database {
    tables: HashMap<String, Stored>,
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

impl Database {
    /// Creates a new, empty database instance.
    pub fn new() -> Self {
        Self {
            tables: HashMap::default(),
        }
    }

    /// Creates an empty table with the columns declared on `table`. Every
    /// column is bound to the table, whatever qualifier it was declared with.
    ///
    /// # Errors
    /// Returns [Error::TableExists] if a table with the same name already exists.
    pub fn create_table(&mut self, table: &Table) -> Result<()> {
        let key = key(&table.name);
        if self.tables.contains_key(&key) {
            return Err(Error::TableExists(table.name.clone()));
        }
        let mut schema = Table::new(table.name.clone());
        for column in &table.columns {
            schema.add_column(column.name.clone());
        }
        info!(table = %schema.name, columns = schema.columns.len(), "created table");
        let data = Data::for_table(&schema);
        self.tables.insert(key, Stored { table: schema, data });
        Ok(())
    }

    /// Removes a table from the database by its name.
    ///
    /// # Errors
    /// Returns [Error::TableNotFound] if the table does not exist.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        match self.tables.remove(&key(name)) {
            Some(_) => {
                info!(table = name, "dropped table");
                Ok(())
            }
            None => Err(Error::TableNotFound(name.to_string())),
        }
    }

    /// Retrieves the schema of a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&key(name)).map(|s| &s.table)
    }

    /// Retrieves the rows of a table by name.
    pub fn get_data(&self, name: &str) -> Option<&Data> {
        self.tables.get(&key(name)).map(|s| &s.data)
    }

    /// Returns the names of all tables, in no particular order.
    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.values().map(|s| s.table.name.as_str()).collect()
    }

    /// Executes an `INSERT` or `UPDATE` statement and returns the number of
    /// rows it wrote. Use [Database::query] for `SELECT`.
    ///
    /// # Errors
    /// Returns an error if the statement does not parse, is a `SELECT`, names
    /// an unknown table or column, or supplies the wrong number of values.
    ///
    /// # Example
    /// ```
    /// use minisql::{Database, Table};
    ///
    /// let mut db = Database::new();
    /// db.create_table(&Table::with_columns("users", &["id", "name"])).unwrap();
    /// assert_eq!(db.execute("INSERT INTO users VALUES (1, 'Ann')").unwrap(), 1);
    /// assert_eq!(db.execute("UPDATE users SET name = 'Bob' WHERE id = 1").unwrap(), 1);
    /// assert!(db.execute("SELECT * FROM users").is_err());
    /// ```
    pub fn execute(&mut self, sql: &str) -> Result<usize> {
        match parse(sql)? {
            Statement::Insert(insert) => self.insert(insert),
            Statement::Update(update) => self.update(update),
            statement => Err(Error::UnexpectedStatement {
                expected: "INSERT or UPDATE",
                found: statement.kind(),
            }),
        }
    }

    /// Parses and runs a `SELECT` against this database.
    ///
    /// # Errors
    /// Returns an error if the statement does not parse, is not a `SELECT`, or
    /// fails during execution (see [crate::SelectQuery::create_data]).
    ///
    /// # Example
    /// ```
    /// use minisql::{ColumnData, Database, Table};
    ///
    /// let mut db = Database::new();
    /// db.create_table(&Table::with_columns("products", &["name", "price"])).unwrap();
    /// db.execute("INSERT INTO products VALUES ('Laptop', 1200)").unwrap();
    /// db.execute("INSERT INTO products VALUES ('Mouse', 25)").unwrap();
    ///
    /// let data = db.query("SELECT name FROM products WHERE price = 25").unwrap();
    /// assert_eq!(data.rows(), &[vec![Some("Mouse".to_string())]]);
    /// ```
    pub fn query(&self, sql: &str) -> Result<Data> {
        match parse(sql)? {
            Statement::Select(select) => select.create_data(self),
            statement => Err(Error::UnexpectedStatement {
                expected: "SELECT",
                found: statement.kind(),
            }),
        }
    }

    fn stored_mut(&mut self, table: &Table) -> Result<&mut Stored> {
        self.tables
            .get_mut(&key(&table.name))
            .ok_or_else(|| Error::TableNotFound(table.name.clone()))
    }

    /// Appends one row. Without a column list the values are positional;
    /// with one, columns left out are null.
    fn insert(&mut self, insert: InsertQuery) -> Result<usize> {
        let stored = self.stored_mut(&insert.table)?;
        let row: Row = if insert.columns.is_empty() {
            insert.values.into_iter().map(|v| v.into_cell()).collect()
        } else {
            if insert.columns.len() != insert.values.len() {
                return Err(Error::RowWidth {
                    expected: insert.columns.len(),
                    found: insert.values.len(),
                });
            }
            for column in &insert.columns {
                if stored.data.index_of(column).is_none() {
                    return Err(Error::ColumnNotFound(column.qualified_name()));
                }
            }
            let mut provided: Vec<_> = insert.columns.iter().zip(insert.values).collect();
            stored
                .data
                .columns()
                .iter()
                .map(|target| {
                    provided
                        .iter()
                        .position(|(column, _)| column.designates(target))
                        .and_then(|i| provided.swap_remove(i).1.into_cell())
                })
                .collect()
        };
        stored.data.append(row)?;
        debug!(table = %stored.table, rows = stored.data.row_count(), "inserted row");
        Ok(1)
    }

    /// Assigns values in every row accepted by all the conditions.
    fn update(&mut self, update: UpdateQuery) -> Result<usize> {
        let stored = self.stored_mut(&update.table)?;
        let assignments = update
            .assignments
            .into_iter()
            .map(|(column, value)| -> Result<(usize, Cell)> {
                let idx = stored
                    .data
                    .index_of(&column)
                    .ok_or_else(|| Error::ColumnNotFound(column.qualified_name()))?;
                Ok((idx, value.into_cell()))
            })
            .collect::<Result<Vec<_>>>()?;

        let data = &stored.data;
        let matching: Vec<usize> = data
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| update.conditions.iter().all(|c| c.accepts(data, row)))
            .map(|(i, _)| i)
            .collect();

        let rows = stored.data.rows_mut();
        for &i in &matching {
            for (idx, cell) in &assignments {
                rows[i][*idx] = cell.clone();
            }
        }
        debug!(table = %stored.table, rows = matching.len(), "updated rows");
        Ok(matching.len())
    }
}

impl TableSource for Database {
    fn table_data(&self, table: &Table) -> Result<Data> {
        self.get_data(&table.name)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(table.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Database {
        let mut db = Database::new();
        db.create_table(&Table::with_columns("users", &["id", "name", "age"]))
            .unwrap();
        db.execute("INSERT INTO users VALUES (1, 'Alice', 30)").unwrap();
        db.execute("INSERT INTO users VALUES (2, 'Bob', 25)").unwrap();
        db.execute("INSERT INTO users VALUES (3, 'Charlie', 30)").unwrap();
        db
    }

    fn column(data: &Data, name: &str) -> Vec<Option<String>> {
        (0..data.row_count())
            .map(|i| data.get(i, &Column::new(name)).map(str::to_string))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────
    // Test 1 : Table management
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_create_and_drop_table() {
        let mut db = Database::new();
        assert!(db.create_table(&Table::with_columns("users", &["id"])).is_ok());
        assert!(db.get_table("USERS").is_some());

        assert!(db.drop_table("users").is_ok());
        assert!(db.get_table("users").is_none());
    }

    #[test]
    fn test_duplicate_table_error() {
        let mut db = Database::new();
        db.create_table(&Table::new("users")).unwrap();
        let err = db.create_table(&Table::new("Users")).unwrap_err();
        assert_eq!(err, Error::TableExists("Users".to_string()));
    }

    #[test]
    fn test_drop_nonexistent_table() {
        let mut db = Database::new();
        assert_eq!(
            db.drop_table("unknown").unwrap_err(),
            Error::TableNotFound("unknown".to_string())
        );
    }

    #[test]
    fn test_list_tables() {
        let mut db = Database::new();
        db.create_table(&Table::new("users")).unwrap();
        db.create_table(&Table::new("posts")).unwrap();

        let mut tables = db.list_tables();
        tables.sort();
        assert_eq!(tables, vec!["posts", "users"]);
    }

    #[test]
    fn test_columns_are_bound_to_table() {
        let mut db = Database::new();
        let mut declared = Table::new("users");
        declared.columns.push(Column::qualified("other", "id"));
        db.create_table(&declared).unwrap();

        let schema = db.get_table("users").unwrap();
        assert_eq!(schema.columns, vec![Column::qualified("users", "id")]);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : INSERT
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_insert_positional() {
        let db = users();
        let data = db.get_data("users").unwrap();
        assert_eq!(data.row_count(), 3);
        assert_eq!(
            data.rows()[0],
            vec![Some("1".into()), Some("Alice".into()), Some("30".into())]
        );
    }

    #[test]
    fn test_insert_with_column_reordering() {
        let mut db = users();
        db.execute("INSERT INTO users (name, id) VALUES ('Dave', 4)")
            .unwrap();
        let data = db.get_data("users").unwrap();
        // schema order, age left null
        assert_eq!(data.rows()[3], vec![Some("4".into()), Some("Dave".into()), None]);
    }

    #[test]
    fn test_insert_errors() {
        let mut db = users();
        assert_eq!(
            db.execute("INSERT INTO users VALUES (1, 'x')").unwrap_err(),
            Error::RowWidth {
                expected: 3,
                found: 2
            }
        );
        assert_eq!(
            db.execute("INSERT INTO users (salary) VALUES (1)")
                .unwrap_err(),
            Error::ColumnNotFound("salary".to_string())
        );
        assert_eq!(
            db.execute("INSERT INTO ghosts VALUES (1)").unwrap_err(),
            Error::TableNotFound("ghosts".to_string())
        );
        assert_eq!(db.get_data("users").unwrap().row_count(), 3);
    }

    #[test]
    fn test_insert_null_literal() {
        let mut db = users();
        db.execute("INSERT INTO users VALUES (4, NULL, 20)").unwrap();
        assert_eq!(db.get_data("users").unwrap().rows()[3][1], None);
    }

    #[test]
    fn test_numeric_literals_keep_their_text() {
        let mut db = Database::new();
        db.create_table(&Table::with_columns("t", &["zip", "price"]))
            .unwrap();
        db.execute("INSERT INTO t VALUES ('02134', '1.50')").unwrap();
        db.execute("INSERT INTO t VALUES (00501, 2.50)").unwrap();
        db.execute("INSERT INTO t VALUES (7, 123456789012345678901234567890)")
            .unwrap();

        let rows = db.get_data("t").unwrap().rows();
        assert_eq!(rows[1], vec![Some("00501".into()), Some("2.50".into())]);
        assert_eq!(
            rows[2][1].as_deref(),
            Some("123456789012345678901234567890")
        );

        let zip = db.query("SELECT price FROM t WHERE zip = 02134").unwrap();
        assert_eq!(zip.rows(), &[vec![Some("1.50".to_string())]]);
        let price = db.query("SELECT zip FROM t WHERE price IN (1.50, 2.50)").unwrap();
        assert_eq!(column(&price, "zip"), vec![Some("02134".into()), Some("00501".into())]);
        let big = db
            .query("SELECT zip FROM t WHERE price = 123456789012345678901234567890")
            .unwrap();
        assert_eq!(column(&big, "zip"), vec![Some("7".into())]);
        assert_eq!(db.query("SELECT zip FROM t WHERE price = 2.5").unwrap().row_count(), 0);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : UPDATE
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_update_matching_rows() {
        let mut db = users();
        let updated = db
            .execute("UPDATE users SET name = 'Zed' WHERE age = 30")
            .unwrap();
        assert_eq!(updated, 2);
        let data = db.query("SELECT name FROM users").unwrap();
        assert_eq!(
            column(&data, "name"),
            vec![Some("Zed".into()), Some("Bob".into()), Some("Zed".into())]
        );
    }

    #[test]
    fn test_update_without_where_touches_all_rows() {
        let mut db = users();
        assert_eq!(db.execute("UPDATE users SET age = NULL").unwrap(), 3);
        let data = db.get_data("users").unwrap();
        assert!(data.rows().iter().all(|row| row[2].is_none()));
    }

    #[test]
    fn test_update_no_rows_matched() {
        let mut db = users();
        assert_eq!(
            db.execute("UPDATE users SET age = 1 WHERE id = 99").unwrap(),
            0
        );
    }

    #[test]
    fn test_update_non_existent_column() {
        let mut db = users();
        assert_eq!(
            db.execute("UPDATE users SET salary = 1").unwrap_err(),
            Error::ColumnNotFound("salary".to_string())
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : SELECT
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_query_with_where() {
        let db = users();
        let data = db.query("SELECT name FROM users WHERE age = 30").unwrap();
        assert_eq!(
            column(&data, "name"),
            vec![Some("Alice".into()), Some("Charlie".into())]
        );
    }

    #[test]
    fn test_query_with_join() {
        let mut db = users();
        db.create_table(&Table::with_columns("posts", &["author", "title"]))
            .unwrap();
        db.execute("INSERT INTO posts VALUES (2, 'Hello')").unwrap();

        let data = db
            .query(
                "SELECT users.name, posts.title FROM users \
                 INNER JOIN posts ON users.id = posts.author",
            )
            .unwrap();
        assert_eq!(
            data.rows(),
            &[vec![Some("Bob".to_string()), Some("Hello".to_string())]]
        );
    }

    #[test]
    fn test_statement_kind_mismatch() {
        let mut db = users();
        assert_eq!(
            db.query("UPDATE users SET age = 1").unwrap_err(),
            Error::UnexpectedStatement {
                expected: "SELECT",
                found: "UPDATE"
            }
        );
        assert!(matches!(
            db.execute("SELECT * FROM users"),
            Err(Error::UnexpectedStatement { .. })
        ));
    }

    #[test]
    fn test_table_source_unknown_table() {
        let db = Database::new();
        assert_eq!(
            db.table_data(&Table::new("nope")).unwrap_err(),
            Error::TableNotFound("nope".to_string())
        );
    }
}
