use std::fmt;

use crate::column::Column;
use crate::condition::Condition;
use crate::error::{Error, Result};
use crate::join::Join;
use crate::table::Table;
use crate::value::Value;

/// A parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
}

impl Statement {
    /// The leading keyword of the statement.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
        }
    }

    /// Renders the statement back to canonical SQL.
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(q) => write!(f, "{q}"),
            Self::Insert(q) => write!(f, "{q}"),
            Self::Update(q) => write!(f, "{q}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One `ORDER BY` item.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub column: Column,
    pub direction: Direction,
}

impl Sort {
    pub fn new(column: Column, direction: Direction) -> Self {
        Self { column, direction }
    }

    pub fn asc(column: Column) -> Self {
        Self::new(column, Direction::Asc)
    }

    pub fn desc(column: Column) -> Self {
        Self::new(column, Direction::Desc)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        write!(f, "{} {direction}", self.column)
    }
}

/// A `SELECT` query, built incrementally and executed with
/// [SelectQuery::create_data].
///
/// Joins are applied left to right in the order they were added. Conditions
/// are conjunctive: a row is kept only if every one of them accepts it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: Table,
    columns: Vec<Column>,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
    group_by: Vec<Column>,
    sorts: Vec<Sort>,
    limit: Option<usize>,
    offset: usize,
}

impl SelectQuery {
    /// Creates a query over `table` with no output columns, joins or
    /// conditions, no limit and a zero offset.
    pub fn new(table: Table) -> Self {
        Self {
            table,
            columns: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            group_by: Vec::new(),
            sorts: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    pub fn add_column(&mut self, column: Column) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn add_join(&mut self, join: Join) -> &mut Self {
        self.joins.push(join);
        self
    }

    pub fn add_condition(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    pub fn add_group_by(&mut self, column: Column) -> &mut Self {
        self.group_by.push(column);
        self
    }

    pub fn add_sort(&mut self, sort: Sort) -> &mut Self {
        self.sorts.push(sort);
        self
    }

    /// Caps the number of returned rows.
    ///
    /// # Errors
    /// Returns [Error::InvalidLimit] if `limit` is not positive.
    pub fn set_limit(&mut self, limit: i64) -> Result<&mut Self> {
        if limit < 1 {
            return Err(Error::InvalidLimit(limit));
        }
        self.limit = Some(usize::try_from(limit).map_err(|_| Error::InvalidLimit(limit))?);
        Ok(self)
    }

    /// Skips the first `offset` joined rows before filtering.
    ///
    /// # Errors
    /// Returns [Error::InvalidOffset] if `offset` is negative.
    pub fn set_offset(&mut self, offset: i64) -> Result<&mut Self> {
        self.offset = usize::try_from(offset).map_err(|_| Error::InvalidOffset(offset))?;
        Ok(self)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn group_by(&self) -> &[Column] {
        &self.group_by
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Renders the query back to canonical SQL, one clause per line.
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_where(f: &mut fmt::Formatter<'_>, conditions: &[Condition]) -> fmt::Result {
    for (i, condition) in conditions.iter().enumerate() {
        let keyword = if i == 0 { "\nWHERE " } else { "\n  AND " };
        write!(f, "{keyword}{condition}")?;
    }
    Ok(())
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.columns.is_empty() {
            f.write_str("*")?;
        } else {
            write_list(f, &self.columns)?;
        }
        write!(f, "\nFROM {}", self.table)?;
        for join in &self.joins {
            write!(f, "\n{join}")?;
        }
        write_where(f, &self.conditions)?;
        if !self.group_by.is_empty() {
            f.write_str("\nGROUP BY ")?;
            write_list(f, &self.group_by)?;
        }
        if !self.sorts.is_empty() {
            f.write_str("\nORDER BY ")?;
            write_list(f, &self.sorts)?;
        }
        if let Some(limit) = self.limit {
            write!(f, "\nLIMIT {limit}")?;
        }
        if self.offset > 0 {
            write!(f, "\nOFFSET {}", self.offset)?;
        }
        Ok(())
    }
}

/// `INSERT INTO table [(columns)] VALUES (values)`.
///
/// An empty column list means the values are positional.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    pub table: Table,
    pub columns: Vec<Column>,
    pub values: Vec<Value>,
}

impl InsertQuery {
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InsertQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if !self.columns.is_empty() {
            f.write_str(" (")?;
            write_list(f, &self.columns)?;
            f.write_str(")")?;
        }
        f.write_str("\nVALUES (")?;
        write_list(f, &self.values)?;
        f.write_str(")")
    }
}

/// `UPDATE table SET column = value, ... [WHERE conditions]`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    pub table: Table,
    pub assignments: Vec<(Column, Value)>,
    pub conditions: Vec<Condition>,
}

impl UpdateQuery {
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UpdateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {}\nSET ", self.table)?;
        for (i, (column, value)) in self.assignments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column} = {value}")?;
        }
        write_where(f, &self.conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::{JoinKind, JoinOn};

    fn employee_query() -> SelectQuery {
        let mut query = SelectQuery::new(Table::new("employee"));
        query
            .add_column(Column::new("id"))
            .add_column(Column::qualified("department", "name").with_alias("dept"));
        query
    }

    // ─────────────────────────────────────────────────────────────
    // Test 1 : Builder
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_new_query_defaults() {
        let query = SelectQuery::new(Table::new("t"));
        assert_eq!(query.table().name, "t");
        assert!(query.columns().is_empty());
        assert!(query.joins().is_empty());
        assert!(query.conditions().is_empty());
        assert_eq!(query.limit(), None);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_limit_validation() {
        let mut query = employee_query();
        assert_eq!(query.set_limit(0).unwrap_err(), Error::InvalidLimit(0));
        assert_eq!(query.set_limit(-4).unwrap_err(), Error::InvalidLimit(-4));
        assert_eq!(query.limit(), None);
        query.set_limit(5).unwrap();
        assert_eq!(query.limit(), Some(5));
    }

    #[test]
    fn test_offset_validation() {
        let mut query = employee_query();
        assert_eq!(query.set_offset(-1).unwrap_err(), Error::InvalidOffset(-1));
        query.set_offset(0).unwrap().set_offset(3).unwrap();
        assert_eq!(query.offset(), 3);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : Rendering
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_to_sql_clause_order() {
        let mut query = employee_query();
        query
            .add_join(Join::new(
                Table::new("department"),
                JoinKind::Inner(JoinOn::new(
                    Column::qualified("employee", "deptId"),
                    Column::qualified("department", "deptId"),
                )),
            ))
            .add_condition(Condition::equals(Column::new("id"), 1i64));
        let sql = query.to_sql();

        let select = sql.find("SELECT").unwrap();
        let from = sql.find("FROM").unwrap();
        let join = sql.find("INNER JOIN").unwrap();
        let filter = sql.find("WHERE").unwrap();
        assert!(select < from && from < join && join < filter);
    }

    #[test]
    fn test_to_sql_full() {
        let mut query = employee_query();
        query
            .add_condition(Condition::equals(Column::new("id"), 1i64))
            .add_condition(Condition::equals(Column::new("name"), "Bill"))
            .add_group_by(Column::new("id"))
            .add_sort(Sort::desc(Column::new("id")))
            .add_sort(Sort::asc(Column::new("name")));
        query.set_limit(10).unwrap().set_offset(2).unwrap();

        assert_eq!(
            query.to_sql(),
            "SELECT id, department.name AS dept\n\
             FROM employee\n\
             WHERE id = 1\n  AND name = 'Bill'\n\
             GROUP BY id\n\
             ORDER BY id DESC, name ASC\n\
             LIMIT 10\n\
             OFFSET 2"
        );
    }

    #[test]
    fn test_to_sql_without_columns() {
        let query = SelectQuery::new(Table::new("t"));
        assert_eq!(query.to_sql(), "SELECT *\nFROM t");
    }

    #[test]
    fn test_insert_and_update_to_sql() {
        let insert = InsertQuery {
            table: Table::new("users"),
            columns: vec![Column::new("id"), Column::new("name")],
            values: vec![Value::from(1i64), "Ann".into()],
        };
        assert_eq!(insert.to_sql(), "INSERT INTO users (id, name)\nVALUES (1, 'Ann')");

        let update = UpdateQuery {
            table: Table::new("users"),
            assignments: vec![(Column::new("name"), Value::Null)],
            conditions: vec![Condition::equals(Column::new("id"), 1i64)],
        };
        assert_eq!(
            Statement::Update(update).to_sql(),
            "UPDATE users\nSET name = NULL\nWHERE id = 1"
        );
    }
}
