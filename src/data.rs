use std::cmp::Ordering;

use allocative::Allocative;

use crate::column::Column;
use crate::error::{Error, Result};
use crate::table::Table;

/// A single value of a row. `None` is SQL `NULL`.
pub type Cell = Option<String>;

/// One row: exactly one cell per column of the owning [ColumnData].
pub type Row = Vec<Cell>;

/// Read-only tabular view: an ordered list of columns and rows of string cells.
///
/// Column order is significant, it is the order of the values inside every
/// row and the order of the columns in any output built from this view.
pub trait ColumnData {
    fn columns(&self) -> &[Column];

    fn rows(&self) -> &[Row];

    fn column_count(&self) -> usize {
        self.columns().len()
    }

    fn row_count(&self) -> usize {
        self.rows().len()
    }

    /// Position of `column` in this schema, or `None` if no column matches.
    ///
    /// A free column matches the first column with the same name; a qualified
    /// one must also match the table. Missing columns are routine (conditions
    /// probe columns that a join may not have brought in), hence no error.
    fn index_of(&self, column: &Column) -> Option<usize> {
        self.columns().iter().position(|c| column.designates(c))
    }

    /// The text of `column` in the row at `row_idx`, if both exist and the
    /// cell is not null.
    fn get(&self, row_idx: usize, column: &Column) -> Option<&str> {
        let idx = self.index_of(column)?;
        self.rows().get(row_idx)?.get(idx)?.as_deref()
    }
}

/// Mutable row accumulator, the concrete [ColumnData] produced by joins,
/// filters and table sources.
///
/// Appending is the only mutation exposed to callers and every appended row
/// must have one cell per column. Inside the crate, `rows_mut` (UPDATE
/// assignments) and `sort_rows_by` (ORDER BY) also edit rows in place; neither
/// changes the row count or width.
#[derive(Debug, Clone, Default, PartialEq, Allocative)]
pub struct Data {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Data {
    /// Creates an empty accumulator over the given columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates an empty accumulator over `left ++ right`, the schema of a join output.
    pub fn joined(left: &[Column], right: &[Column]) -> Self {
        let mut columns = Vec::with_capacity(left.len() + right.len());
        columns.extend_from_slice(left);
        columns.extend_from_slice(right);
        Self::new(columns)
    }

    /// Creates an empty accumulator over the declared columns of `table`.
    pub fn for_table(table: &Table) -> Self {
        Self::new(table.columns.clone())
    }

    /// Builds a table from string rows; `None` cells are nulls.
    ///
    /// # Errors
    /// Returns [Error::RowWidth] if a row does not have one value per column.
    pub fn from_rows<'r, 's: 'r, R>(columns: Vec<Column>, rows: R) -> Result<Self>
    where
        R: IntoIterator<Item = &'r [Option<&'s str>]>,
    {
        let mut data = Self::new(columns);
        for row in rows {
            data.append(row.iter().map(|c| c.map(str::to_string)).collect())?;
        }
        Ok(data)
    }

    /// Appends a row.
    ///
    /// # Errors
    /// Returns [Error::RowWidth] if the row length differs from the column count.
    pub fn append(&mut self, row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Appends the concatenation of a left and a right row.
    pub(crate) fn append_pair(&mut self, left: &[Cell], right: &[Cell]) {
        let mut row = Vec::with_capacity(left.len() + right.len());
        row.extend_from_slice(left);
        row.extend_from_slice(right);
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Appends a left row followed by `width` nulls.
    pub(crate) fn append_left_padded(&mut self, left: &[Cell], width: usize) {
        let mut row = Vec::with_capacity(left.len() + width);
        row.extend_from_slice(left);
        row.resize(left.len() + width, None);
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Appends `width` nulls followed by a right row.
    pub(crate) fn append_right_padded(&mut self, width: usize, right: &[Cell]) {
        let mut row = vec![None; width];
        row.extend_from_slice(right);
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// Stable sort of the rows.
    pub(crate) fn sort_rows_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Row, &Row) -> Ordering,
    {
        self.rows.sort_by(compare);
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl ColumnData for Data {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn rows(&self) -> &[Row] {
        &self.rows
    }
}
