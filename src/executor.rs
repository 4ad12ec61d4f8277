use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::ast::{Direction, SelectQuery};
use crate::column::{Column, eq_ignore_case};
use crate::data::{Cell, ColumnData, Data, Row};
use crate::error::{Error, Result};
use crate::table::Table;

/// Resolves a table to its rows. The executor calls it once for the base
/// table and once per joined table, in join order.
pub trait TableSource {
    /// Returns the rows of `table`, with columns bound to the table's name.
    ///
    /// # Errors
    /// Typically [Error::TableNotFound] when the table is unknown.
    fn table_data(&self, table: &Table) -> Result<Data>;
}

impl<T: TableSource + ?Sized> TableSource for &T {
    fn table_data(&self, table: &Table) -> Result<Data> {
        (**self).table_data(table)
    }
}

/// Sort order of two cells: case-insensitive text order, nulls first.
fn compare_cells(a: &Cell, b: &Cell) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
    }
}

impl SelectQuery {
    /// Executes the query against `source`.
    ///
    /// 1. Loads the base table and folds every join over it, left-deep, in order.
    /// 2. Stably sorts the joined rows by the `ORDER BY` list.
    /// 3. Skips `offset` joined rows, keeps the rows accepted by every
    ///    condition, and stops once `limit` rows are kept.
    /// 4. Projects the kept rows onto the selected columns.
    ///
    /// # Example
    /// ```
    /// use minisql::{ColumnData, Database, Table, parse_select};
    ///
    /// let mut db = Database::new();
    /// db.create_table(&Table::with_columns("users", &["id", "name"])).unwrap();
    /// db.execute("INSERT INTO users VALUES (1, 'Ann')").unwrap();
    /// db.execute("INSERT INTO users VALUES (2, 'Bob')").unwrap();
    ///
    /// let query = parse_select("SELECT name FROM users WHERE id = 2").unwrap();
    /// let data = query.create_data(&db).unwrap();
    /// assert_eq!(data.rows(), &[vec![Some("Bob".to_string())]]);
    /// ```
    ///
    /// # Errors
    /// Propagates the errors of `source` and returns [Error::ColumnNotFound]
    /// if a selected column is not part of the joined rows.
    pub fn create_data<S: TableSource + ?Sized>(&self, source: &S) -> Result<Data> {
        let mut joined = source.table_data(self.table())?;
        debug!(table = %self.table(), rows = joined.row_count(), "loaded base table");

        for join in self.joins() {
            let right = source.table_data(&join.table)?;
            joined = join.join(&joined, &right);
            debug!(
                join = %join,
                rows = joined.row_count(),
                bytes = allocative::size_of_unique_allocated_data(&joined),
                "join step"
            );
        }

        if !self.group_by().is_empty() {
            warn!("GROUP BY is not applied, rows are returned ungrouped");
        }
        if self.conditions().iter().any(|c| !c.is_evaluable()) {
            warn!("query uses conditions that are not evaluated yet and reject every row");
        }

        self.sort(&mut joined);
        let projection = self.projection(&joined)?;

        let mut out = Data::new(projection.iter().map(|(_, c)| c.clone()).collect());
        for row in joined.rows().iter().skip(self.offset()) {
            if self.limit().is_some_and(|limit| out.row_count() >= limit) {
                break;
            }
            if self.conditions().iter().all(|c| c.accepts(&joined, row)) {
                out.append(project(row, &projection))?;
            }
        }
        debug!(rows = out.row_count(), "query done");
        Ok(out)
    }

    /// Index of a sort key in `data`. Unqualified keys may also name the
    /// alias of a selected column.
    fn sort_key(&self, data: &Data, column: &Column) -> Option<usize> {
        data.index_of(column).or_else(|| {
            if column.table.is_some() {
                return None;
            }
            self.columns()
                .iter()
                .find(|c| c.alias.as_deref().is_some_and(|a| eq_ignore_case(a, &column.name)))
                .and_then(|c| data.index_of(c))
        })
    }

    fn sort(&self, data: &mut Data) {
        let view: &Data = data;
        let keys: Vec<(usize, bool)> = self
            .sorts()
            .iter()
            .filter_map(|s| {
                self.sort_key(view, &s.column)
                    .map(|idx| (idx, s.direction == Direction::Desc))
            })
            .collect();
        if keys.is_empty() {
            return;
        }
        data.sort_rows_by(|a, b| {
            for (idx, is_desc) in &keys {
                let mut ord = compare_cells(&a[*idx], &b[*idx]);
                if *is_desc {
                    ord = ord.reverse();
                }
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }

    /// Positions and output columns of the selection. No selection or a
    /// wildcard keeps every (covered) column.
    fn projection(&self, data: &Data) -> Result<Vec<(usize, Column)>> {
        if self.columns().is_empty() {
            return Ok(data.columns().iter().cloned().enumerate().collect());
        }
        let mut projection = Vec::new();
        for selected in self.columns() {
            if selected.is_wildcard() {
                projection.extend(
                    data.columns()
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| selected.covers(c))
                        .map(|(i, c)| (i, c.clone())),
                );
                continue;
            }
            let idx = data
                .index_of(selected)
                .ok_or_else(|| Error::ColumnNotFound(selected.qualified_name()))?;
            let mut column = data.columns()[idx].clone();
            column.alias = selected.alias.clone();
            projection.push((idx, column));
        }
        Ok(projection)
    }
}

fn project(row: &[Cell], projection: &[(usize, Column)]) -> Row {
    projection.iter().map(|(idx, _)| row[*idx].clone()).collect()
}
