use std::fmt;

use bitvec::prelude::*;

use crate::column::{Column, eq_ignore_case};
use crate::data::{Cell, ColumnData, Data};
use crate::table::Table;

/// The `ON left = right` key pair of a keyed join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOn {
    pub left: Column,
    pub right: Column,
}

impl JoinOn {
    pub fn new(left: Column, right: Column) -> Self {
        Self { left, right }
    }

    /// Resolves the key pair to `(left index, right index)`.
    ///
    /// The pair is tried as written, then swapped, so `ON b.x = a.y` works as
    /// well as `ON a.y = b.x`. Returns `None` if neither orientation resolves.
    fn resolve<L, R>(&self, left: &L, right: &R) -> Option<(usize, usize)>
    where
        L: ColumnData + ?Sized,
        R: ColumnData + ?Sized,
    {
        let as_written = left.index_of(&self.left).zip(right.index_of(&self.right));
        as_written.or_else(|| left.index_of(&self.right).zip(right.index_of(&self.left)))
    }
}

/// How a joined table is matched against the rows accumulated so far.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinKind {
    /// Every pair of rows.
    Cross,
    /// Pairs agreeing on every column name the two sides share.
    Natural,
    /// Pairs whose keys are equal; unmatched rows dropped.
    Inner(JoinOn),
    /// Inner pairs plus unmatched left rows padded with nulls.
    Left(JoinOn),
    /// Inner pairs plus unmatched right rows padded with nulls.
    Right(JoinOn),
    /// Inner pairs plus unmatched rows of both sides padded with nulls.
    Outer(JoinOn),
}

impl JoinKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Cross => "CROSS JOIN",
            Self::Natural => "NATURAL JOIN",
            Self::Inner(_) => "INNER JOIN",
            Self::Left(_) => "LEFT JOIN",
            Self::Right(_) => "RIGHT JOIN",
            Self::Outer(_) => "FULL OUTER JOIN",
        }
    }

    pub fn on(&self) -> Option<&JoinOn> {
        match self {
            Self::Cross | Self::Natural => None,
            Self::Inner(on) | Self::Left(on) | Self::Right(on) | Self::Outer(on) => Some(on),
        }
    }
}

/// A join clause: the table brought in and how its rows are matched.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: Table,
    pub kind: JoinKind,
}

/// Key equality: case-insensitive, and null never matches anything.
fn same_key(a: &Cell, b: &Cell) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => eq_ignore_case(a, b),
        _ => false,
    }
}

impl Join {
    pub fn new(table: Table, kind: JoinKind) -> Self {
        Self { table, kind }
    }

    /// Joins `left` (the rows accumulated so far) with `right` (the rows of
    /// [Join::table]).
    ///
    /// The output columns are always `left.columns ++ right.columns`. Rows
    /// come out left-row-major (right-row-major for [JoinKind::Right]); for
    /// [JoinKind::Outer] the unmatched rows of each side follow all matched
    /// pairs, in source order. Joining never fails: keys that cannot be
    /// resolved simply match nothing.
    pub fn join<L, R>(&self, left: &L, right: &R) -> Data
    where
        L: ColumnData + ?Sized,
        R: ColumnData + ?Sized,
    {
        let mut out = Data::joined(left.columns(), right.columns());
        match &self.kind {
            JoinKind::Cross => cross(left, right, &mut out),
            JoinKind::Natural => natural(left, right, &mut out),
            JoinKind::Inner(on) => {
                if let Some(keys) = on.resolve(left, right) {
                    inner(left, right, keys, &mut out);
                }
            }
            JoinKind::Left(on) => left_outer(left, right, on.resolve(left, right), &mut out),
            JoinKind::Right(on) => right_outer(left, right, on.resolve(left, right), &mut out),
            JoinKind::Outer(on) => full_outer(left, right, on.resolve(left, right), &mut out),
        }
        out
    }
}

fn cross<L, R>(left: &L, right: &R, out: &mut Data)
where
    L: ColumnData + ?Sized,
    R: ColumnData + ?Sized,
{
    for l in left.rows() {
        for r in right.rows() {
            out.append_pair(l, r);
        }
    }
}

fn inner<L, R>(left: &L, right: &R, (li, ri): (usize, usize), out: &mut Data)
where
    L: ColumnData + ?Sized,
    R: ColumnData + ?Sized,
{
    for l in left.rows() {
        for r in right.rows() {
            if same_key(&l[li], &r[ri]) {
                out.append_pair(l, r);
            }
        }
    }
}

fn left_outer<L, R>(left: &L, right: &R, keys: Option<(usize, usize)>, out: &mut Data)
where
    L: ColumnData + ?Sized,
    R: ColumnData + ?Sized,
{
    let width = right.column_count();
    for l in left.rows() {
        let mut matched = false;
        if let Some((li, ri)) = keys {
            for r in right.rows() {
                if same_key(&l[li], &r[ri]) {
                    out.append_pair(l, r);
                    matched = true;
                }
            }
        }
        if !matched {
            out.append_left_padded(l, width);
        }
    }
}

fn right_outer<L, R>(left: &L, right: &R, keys: Option<(usize, usize)>, out: &mut Data)
where
    L: ColumnData + ?Sized,
    R: ColumnData + ?Sized,
{
    let width = left.column_count();
    for r in right.rows() {
        let mut matched = false;
        if let Some((li, ri)) = keys {
            for l in left.rows() {
                if same_key(&l[li], &r[ri]) {
                    out.append_pair(l, r);
                    matched = true;
                }
            }
        }
        if !matched {
            out.append_right_padded(width, r);
        }
    }
}

fn full_outer<L, R>(left: &L, right: &R, keys: Option<(usize, usize)>, out: &mut Data)
where
    L: ColumnData + ?Sized,
    R: ColumnData + ?Sized,
{
    let mut left_matched = bitvec![0; left.row_count()];
    let mut right_matched = bitvec![0; right.row_count()];

    if let Some((li, ri)) = keys {
        for (i, l) in left.rows().iter().enumerate() {
            for (j, r) in right.rows().iter().enumerate() {
                if same_key(&l[li], &r[ri]) {
                    out.append_pair(l, r);
                    left_matched.set(i, true);
                    right_matched.set(j, true);
                }
            }
        }
    }

    let right_width = right.column_count();
    for i in left_matched.iter_zeros() {
        out.append_left_padded(&left.rows()[i], right_width);
    }
    let left_width = left.column_count();
    for j in right_matched.iter_zeros() {
        out.append_right_padded(left_width, &right.rows()[j]);
    }
}

/// Pairs of column positions whose names the two schemas share, in the order
/// the left schema first mentions each name.
fn shared_columns(left: &[Column], right: &[Column]) -> Vec<(usize, usize)> {
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for (li, lc) in left.iter().enumerate() {
        if pairs
            .iter()
            .any(|&(seen, _)| eq_ignore_case(&left[seen].name, &lc.name))
        {
            continue;
        }
        if let Some(ri) = right.iter().position(|rc| eq_ignore_case(&rc.name, &lc.name)) {
            pairs.push((li, ri));
        }
    }
    pairs
}

fn natural<L, R>(left: &L, right: &R, out: &mut Data)
where
    L: ColumnData + ?Sized,
    R: ColumnData + ?Sized,
{
    let shared = shared_columns(left.columns(), right.columns());
    if shared.is_empty() {
        return;
    }
    for l in left.rows() {
        for r in right.rows() {
            if shared.iter().all(|&(li, ri)| same_key(&l[li], &r[ri])) {
                out.append_pair(l, r);
            }
        }
    }
}

/// Renders `KIND JOIN table[ ON left = right]`.
impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.keyword(), self.table)?;
        if let Some(on) = self.kind.on() {
            write!(f, " ON {} = {}", on.left, on.right)?;
        }
        Ok(())
    }
}
