//! SQL grammar built from the primitives of [crate::reader].
//!
//! Each clause of the language has its own reader; [SelectReader],
//! [InsertReader] and [UpdateReader] compose them into whole statements and
//! [parse] dispatches on the leading keyword.

use tracing::debug;

use crate::ast::{Direction, InsertQuery, SelectQuery, Sort, Statement, UpdateQuery};
use crate::column::{Column, WILDCARD};
use crate::condition::{Condition, Operand};
use crate::error::Result;
use crate::join::{Join, JoinKind, JoinOn};
use crate::reader::{
    Array, Blank, End, Identifier, List, Number, Prefixed, Quoted, Reader, Text, fail,
};
use crate::table::Table;
use crate::value::Value;

/// Parses one statement, optionally terminated by `;`.
///
/// ```
/// use minisql::{Statement, parse};
///
/// let statement = parse("UPDATE users SET name = 'Bob' WHERE id = 2;").unwrap();
/// assert!(matches!(statement, Statement::Update(_)));
/// assert!(parse("DELETE FROM users").is_err());
/// ```
pub fn parse(sql: &str) -> Result<Statement> {
    let head = Blank.consume(sql)?;
    let (rest, statement) = if Text("SELECT").consume(head).is_ok() {
        SelectReader.map(Statement::Select).read(head)?
    } else if Text("INSERT").consume(head).is_ok() {
        InsertReader.map(Statement::Insert).read(head)?
    } else if Text("UPDATE").consume(head).is_ok() {
        UpdateReader.map(Statement::Update).read(head)?
    } else {
        return fail("SELECT, INSERT or UPDATE", head);
    };
    End.consume(rest)?;
    debug!(%statement, "parsed statement");
    Ok(statement)
}

/// Parses a single `SELECT` statement.
///
/// ```
/// use minisql::parse_select;
///
/// let query = parse_select("SELECT a, b FROM t").unwrap();
/// assert_eq!(query.columns().len(), 2);
/// assert!(query.joins().is_empty());
/// assert!(parse_select("SELECT FROM t").is_err());
/// ```
pub fn parse_select(sql: &str) -> Result<SelectQuery> {
    let (_, (query, ())) = (SelectReader, End).read(sql)?;
    debug!(%query, "parsed select");
    Ok(query)
}

// ─────────────────────────────────────────────────────────────
// Names and literals
// ─────────────────────────────────────────────────────────────

/// A table name.
pub struct TableReader;

impl Reader for TableReader {
    type Output = Table;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Table)> {
        Identifier.map(Table::new).read(input)
    }
}

/// `[table.]name`, `*` or `table.*`, followed by `AS alias` when `alias` is
/// set. Wildcards never take an alias.
pub struct ColumnReader {
    pub alias: bool,
}

impl ColumnReader {
    /// A column reference inside an expression.
    pub const PLAIN: Self = Self { alias: false };
    /// An item of the `SELECT` list.
    pub const SELECTED: Self = Self { alias: true };
}

impl Reader for ColumnReader {
    type Output = Column;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Column)> {
        if let Ok(rest) = Text(WILDCARD).consume(input) {
            return Ok((rest, Column::all()));
        }
        let (rest, first) = Identifier.read(input)?;
        let (rest, column) = match Text(".").consume(rest) {
            Ok(after) => match Text(WILDCARD).consume(after) {
                Ok(rest) => (rest, Column::qualified(first, WILDCARD)),
                Err(_) => {
                    let (rest, name) = Identifier.read(after)?;
                    (rest, Column::qualified(first, name))
                }
            },
            Err(_) => (rest, Column::new(first)),
        };
        if !self.alias || column.is_wildcard() {
            return Ok((rest, column));
        }
        let (rest, alias) = Prefixed::new(Text("AS"), Identifier).read(rest)?;
        Ok((rest, match alias {
            Some(alias) => column.with_alias(alias),
            None => column,
        }))
    }
}

/// A literal: `'text'`, a number or `NULL`.
pub struct ValueReader;

impl Reader for ValueReader {
    type Output = Value;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Value)> {
        match input.chars().next() {
            Some('\'') => Quoted::default().map(|s| Value::Text(s.into())).read(input),
            Some(c) if c == '-' || c.is_ascii_digit() => {
                let (rest, number) = Number.read(input)?;
                match Value::from_number(&number) {
                    Some(value) => Ok((rest, value)),
                    None => fail("number", input),
                }
            }
            _ => match Text("NULL").consume(input) {
                Ok(rest) => Ok((rest, Value::Null)),
                Err(_) => fail("literal", input),
            },
        }
    }
}

/// An integer, as required by `LIMIT` and `OFFSET`.
struct IntegerReader;

impl Reader for IntegerReader {
    type Output = i64;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, i64)> {
        let (rest, number) = Number.read(input)?;
        match number.parse() {
            Ok(n) => Ok((rest, n)),
            Err(_) => fail("integer", input),
        }
    }
}

/// The right-hand side of a comparison: a literal or a column.
struct OperandReader;

impl Reader for OperandReader {
    type Output = Operand;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Operand)> {
        let literal = input
            .chars()
            .next()
            .is_some_and(|c| c == '\'' || c == '-' || c.is_ascii_digit())
            || Text("NULL").consume(input).is_ok();
        if literal {
            ValueReader.map(Operand::Value).read(input)
        } else {
            ColumnReader::PLAIN.map(Operand::Column).read(input)
        }
    }
}

// ─────────────────────────────────────────────────────────────
// Conditions
// ─────────────────────────────────────────────────────────────

fn collapse(mut items: Vec<Condition>, wrap: fn(Vec<Condition>) -> Condition) -> Condition {
    if items.len() == 1 {
        if let Some(only) = items.pop() {
            return only;
        }
    }
    wrap(items)
}

/// One condition:
///
/// - `column = operand`, `column > operand`
/// - `column IN (literal, ...)`, `column LIKE 'pattern'`
/// - `NOT condition`
/// - `( condition AND ... OR ... )`, where `AND` binds tighter than `OR`
///
/// `OR` is only recognised inside parentheses.
pub struct ConditionReader;

impl Reader for ConditionReader {
    type Output = Condition;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Condition)> {
        if let Ok(rest) = (Text("NOT"), Blank).consume(input) {
            let (rest, inner) = self.read(rest)?;
            return Ok((rest, Condition::Not(Box::new(inner))));
        }
        if let Ok(rest) = (Text("("), Blank).consume(input) {
            let conjunction = Array::new(ConditionReader, "AND").map(|c| collapse(c, Condition::And));
            let (rest, group) = Array::new(conjunction, "OR")
                .map(|c| collapse(c, Condition::Or))
                .read(rest)?;
            let rest = (Blank, Text(")")).consume(rest)?;
            return Ok((rest, group));
        }

        let (rest, column) = ColumnReader::PLAIN.read(input)?;
        let rest = Blank.consume(rest)?;
        if let Ok(after) = Text("=").consume(rest) {
            let (rest, operand) = OperandReader.padded().read(after)?;
            return Ok((rest, Condition::Equals(column, operand)));
        }
        if let Ok(after) = Text(">").consume(rest) {
            let (rest, operand) = OperandReader.padded().read(after)?;
            return Ok((rest, Condition::Greater(column, operand)));
        }
        if let Ok(after) = Text("IN").consume(rest) {
            let (rest, (_, _, _, values, _, _)) = (
                Blank,
                Text("("),
                Blank,
                List::comma(ValueReader),
                Blank,
                Text(")"),
            )
                .read(after)?;
            return Ok((rest, Condition::In(column, values)));
        }
        if let Ok(after) = Text("LIKE").consume(rest) {
            let (rest, pattern) = Quoted::default().padded().read(after)?;
            return Ok((rest, Condition::Like(column, Value::Text(pattern.into()))));
        }
        fail("comparison operator", rest)
    }
}

/// An optional `WHERE condition AND ...` clause. Yields no conditions when
/// the clause is absent.
pub struct WhereReader;

impl Reader for WhereReader {
    type Output = Vec<Condition>;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Vec<Condition>)> {
        let (rest, conditions) =
            Prefixed::new(Text("WHERE"), Array::new(ConditionReader, "AND")).read(input)?;
        Ok((rest, conditions.unwrap_or_default()))
    }
}

// ─────────────────────────────────────────────────────────────
// Joins
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKeyword {
    Inner,
    Left,
    Right,
    Full,
    Natural,
    Cross,
}

/// Reads the keywords introducing a join clause, if any.
fn join_keyword(input: &str) -> Option<(&str, JoinKeyword)> {
    let outer = (Blank, Text("OUTER")).optional();
    let join = (Blank, Text("JOIN"));
    if let Ok(rest) = (Text("INNER"), join).consume(input) {
        return Some((rest, JoinKeyword::Inner));
    }
    if let Ok(rest) = (Text("LEFT"), &outer, join).consume(input) {
        return Some((rest, JoinKeyword::Left));
    }
    if let Ok(rest) = (Text("RIGHT"), &outer, join).consume(input) {
        return Some((rest, JoinKeyword::Right));
    }
    if let Ok(rest) = (Text("FULL"), &outer, join).consume(input) {
        return Some((rest, JoinKeyword::Full));
    }
    if let Ok(rest) = (Text("NATURAL"), join).consume(input) {
        return Some((rest, JoinKeyword::Natural));
    }
    if let Ok(rest) = (Text("CROSS"), join).consume(input) {
        return Some((rest, JoinKeyword::Cross));
    }
    if let Ok(rest) = Text("JOIN").consume(input) {
        return Some((rest, JoinKeyword::Inner));
    }
    None
}

/// Zero or more join clauses: `<kind> JOIN table [ON column = column]`.
///
/// `ON` is required for inner, left, right and full outer joins and
/// rejected for natural and cross joins. A bare `JOIN` is an inner join.
pub struct MultipleJoinReader;

impl Reader for MultipleJoinReader {
    type Output = Vec<Join>;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Vec<Join>)> {
        let on_clause = Prefixed::new(
            Text("ON"),
            (ColumnReader::PLAIN, Blank, Text("="), Blank, ColumnReader::PLAIN),
        );
        let mut joins = Vec::new();
        let mut rest = input;
        while let Some((after, keyword)) = join_keyword(Blank.consume(rest)?) {
            let (after, table) = TableReader.padded().read(after)?;
            let (next, on) = on_clause.read(after)?;
            let on = on.map(|(left, _, _, _, right)| JoinOn::new(left, right));
            let kind = match (keyword, on) {
                (JoinKeyword::Cross, None) => JoinKind::Cross,
                (JoinKeyword::Natural, None) => JoinKind::Natural,
                (JoinKeyword::Cross | JoinKeyword::Natural, Some(_)) => {
                    return fail("join without ON", Blank.consume(after)?);
                }
                (JoinKeyword::Inner, Some(on)) => JoinKind::Inner(on),
                (JoinKeyword::Left, Some(on)) => JoinKind::Left(on),
                (JoinKeyword::Right, Some(on)) => JoinKind::Right(on),
                (JoinKeyword::Full, Some(on)) => JoinKind::Outer(on),
                (_, None) => return fail("ON", Blank.consume(after)?),
            };
            joins.push(Join::new(table, kind));
            rest = next;
        }
        Ok((rest, joins))
    }
}

// ─────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────

/// `column [ASC | DESC]`.
pub struct SortReader;

impl Reader for SortReader {
    type Output = Sort;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Sort)> {
        let (rest, column) = ColumnReader::PLAIN.read(input)?;
        if let Ok(rest) = (Blank, Text("DESC")).consume(rest) {
            return Ok((rest, Sort::new(column, Direction::Desc)));
        }
        let rest = (Blank, Text("ASC")).consume(rest).unwrap_or(rest);
        Ok((rest, Sort::asc(column)))
    }
}

/// ```text
/// SELECT column, ... FROM table
///   [joins] [WHERE ...] [GROUP BY column, ...] [ORDER BY sort, ...]
///   [LIMIT n] [OFFSET n]
/// ```
///
/// Does not read the end of the statement.
pub struct SelectReader;

impl Reader for SelectReader {
    type Output = SelectQuery;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, SelectQuery)> {
        let rest = (Blank, Text("SELECT"), Blank).consume(input)?;
        let (rest, columns) = List::comma(ColumnReader::SELECTED).read(rest)?;
        let rest = (Blank, Text("FROM"), Blank).consume(rest)?;
        let (rest, table) = TableReader.read(rest)?;

        let mut query = SelectQuery::new(table);
        for column in columns {
            query.add_column(column);
        }

        let (rest, joins) = MultipleJoinReader.read(rest)?;
        for join in joins {
            query.add_join(join);
        }

        let (rest, conditions) = WhereReader.read(rest)?;
        for condition in conditions {
            query.add_condition(condition);
        }

        let group_by = Prefixed::new(
            (Text("GROUP"), Blank, Text("BY")),
            List::comma(ColumnReader::PLAIN),
        );
        let (rest, group_by) = group_by.read(rest)?;
        for column in group_by.into_iter().flatten() {
            query.add_group_by(column);
        }

        let order_by = Prefixed::new((Text("ORDER"), Blank, Text("BY")), List::comma(SortReader));
        let (rest, sorts) = order_by.read(rest)?;
        for sort in sorts.into_iter().flatten() {
            query.add_sort(sort);
        }

        let (rest, limit) = Prefixed::new(Text("LIMIT"), IntegerReader).read(rest)?;
        if let Some(limit) = limit {
            query.set_limit(limit)?;
        }
        let (rest, offset) = Prefixed::new(Text("OFFSET"), IntegerReader).read(rest)?;
        if let Some(offset) = offset {
            query.set_offset(offset)?;
        }
        Ok((rest, query))
    }
}

/// `INSERT INTO table [(column, ...)] VALUES (literal, ...)`.
pub struct InsertReader;

impl Reader for InsertReader {
    type Output = InsertQuery;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, InsertQuery)> {
        let rest = (Blank, Text("INSERT"), Blank, Text("INTO"), Blank).consume(input)?;
        let (rest, table) = TableReader.read(rest)?;
        let column_list = Prefixed::new(
            Text("("),
            (List::comma(ColumnReader::PLAIN), Blank, Text(")")),
        );
        let (rest, columns) = column_list.read(rest)?;
        let (rest, (_, _, _, _, _, values, _, _)) = (
            Blank,
            Text("VALUES"),
            Blank,
            Text("("),
            Blank,
            List::comma(ValueReader),
            Blank,
            Text(")"),
        )
            .read(rest)?;
        let columns = columns.map(|(columns, _, _)| columns).unwrap_or_default();
        Ok((
            rest,
            InsertQuery {
                table,
                columns,
                values,
            },
        ))
    }
}

/// `UPDATE table SET column = literal, ... [WHERE ...]`.
pub struct UpdateReader;

impl Reader for UpdateReader {
    type Output = UpdateQuery;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, UpdateQuery)> {
        let rest = (Blank, Text("UPDATE"), Blank).consume(input)?;
        let (rest, table) = TableReader.read(rest)?;
        let rest = (Blank, Text("SET"), Blank).consume(rest)?;
        let assignment = (ColumnReader::PLAIN, Blank, Text("="), Blank, ValueReader)
            .map(|(column, _, _, _, value)| (column, value));
        let (rest, assignments) = List::comma(assignment).read(rest)?;
        let (rest, conditions) = WhereReader.read(rest)?;
        Ok((
            rest,
            UpdateQuery {
                table,
                assignments,
                conditions,
            },
        ))
    }
}
