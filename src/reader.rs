//! Composable text readers.
//!
//! A [Reader] recognises a grammar fragment at the head of its input and
//! returns the unconsumed remainder together with what it built, or fails with
//! a [SyntaxError] carrying the remainder it could not read. There is no
//! tokenizer pass and no backtracking: a composite reader runs its children in
//! order and the first required failure aborts it. Whitespace is never skipped
//! implicitly, it is consumed by [Blank] (or [Padded]) where the grammar allows it.

use crate::error::{Error, Result, SyntaxError};

/// Words that can never be read as an identifier.
pub const RESERVED: &[&str] = &[
    "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "IN", "LIKE", "AS", "ON", "JOIN", "INNER",
    "LEFT", "RIGHT", "FULL", "OUTER", "NATURAL", "CROSS", "ORDER", "GROUP", "BY", "ASC", "DESC",
    "LIMIT", "OFFSET", "NULL", "INSERT", "INTO", "VALUES", "UPDATE", "SET",
];

pub(crate) fn fail<T>(expected: impl Into<String>, input: &str) -> Result<T> {
    Err(SyntaxError::new(expected, input).into())
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A unit of recursive-descent parsing.
pub trait Reader {
    type Output;

    /// Reads a prefix of `input`, returning the remainder and the built value.
    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Self::Output)>;

    /// Reads a prefix of `input` and returns only the remainder.
    fn consume<'a>(&self, input: &'a str) -> Result<&'a str> {
        Ok(self.read(input)?.0)
    }

    /// Transforms the output of this reader.
    fn map<F, T>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> T,
    {
        Map { reader: self, f }
    }

    /// Transforms the output of this reader with a fallible function. Its
    /// error aborts the read like any other failure.
    fn try_map<F, T>(self, f: F) -> TryMap<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> Result<T>,
    {
        TryMap { reader: self, f }
    }

    /// Makes this reader optional: a syntax failure yields `None` and
    /// consumes nothing.
    fn optional(self) -> Optional<Self>
    where
        Self: Sized,
    {
        Optional(self)
    }

    /// Skips leading whitespace before this reader.
    fn padded(self) -> Padded<Self>
    where
        Self: Sized,
    {
        Padded(self)
    }
}

impl<R: Reader + ?Sized> Reader for &R {
    type Output = R::Output;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Self::Output)> {
        (**self).read(input)
    }
}

// ─────────────────────────────────────────────────────────────
// Primitives
// ─────────────────────────────────────────────────────────────

/// Skips zero or more whitespace characters. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blank;

impl Reader for Blank {
    type Output = ();

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, ())> {
        Ok((input.trim_start(), ()))
    }
}

/// Matches a literal keyword or symbol, ignoring ASCII case.
///
/// A keyword ending in a word character must not be followed by another one,
/// so `Text("OR")` does not match the head of `ORDER`.
#[derive(Debug, Clone, Copy)]
pub struct Text(pub &'static str);

impl Reader for Text {
    type Output = ();

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, ())> {
        let keyword = self.0;
        let matched = input
            .get(..keyword.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(keyword));
        if !matched {
            return fail(format!("{keyword:?}"), input);
        }
        let rest = &input[keyword.len()..];
        let word = keyword.chars().last().is_some_and(is_ident_char);
        if word && rest.chars().next().is_some_and(is_ident_char) {
            return fail(format!("{keyword:?}"), input);
        }
        Ok((rest, ()))
    }
}

/// Matches an identifier: a letter or `_` followed by letters, digits or `_`.
/// Reserved words are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identifier;

impl Reader for Identifier {
    type Output = String;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, String)> {
        let starts_well = input
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_');
        if !starts_well {
            return fail("identifier", input);
        }
        let end = input
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map_or(input.len(), |(i, _)| i);
        let word = &input[..end];
        if RESERVED.iter().any(|r| r.eq_ignore_ascii_case(word)) {
            return fail("identifier", input);
        }
        Ok((&input[end..], word.to_string()))
    }
}

/// Matches a numeric literal: an optional `-`, digits, and an optional
/// fractional part. Returns the literal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Number;

impl Reader for Number {
    type Output = String;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, String)> {
        let bytes = input.as_bytes();
        let mut end = usize::from(bytes.first() == Some(&b'-'));
        let digits = end;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if end == digits {
            return fail("number", input);
        }
        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end += 1;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
        }
        if input[end..].chars().next().is_some_and(is_ident_char) {
            return fail("number", input);
        }
        Ok((&input[end..], input[..end].to_string()))
    }
}

/// Matches a quoted literal. The quote character doubled inside the literal
/// stands for one embedded quote. Returns the unescaped content.
#[derive(Debug, Clone, Copy)]
pub struct Quoted(pub char);

impl Default for Quoted {
    fn default() -> Self {
        Self('\'')
    }
}

impl Reader for Quoted {
    type Output = String;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, String)> {
        let quote = self.0;
        let Some(body) = input.strip_prefix(quote) else {
            return fail("quoted string", input);
        };
        let mut content = String::new();
        let mut chars = body.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != quote {
                content.push(c);
                continue;
            }
            if chars.peek().is_some_and(|(_, next)| *next == quote) {
                chars.next();
                content.push(quote);
                continue;
            }
            return Ok((&body[i + c.len_utf8()..], content));
        }
        fail(format!("closing {quote}"), input)
    }
}

/// Matches the end of a statement: whitespace, an optional `;`, whitespace,
/// then nothing at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct End;

impl Reader for End {
    type Output = ();

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, ())> {
        let rest = Blank.consume(input)?;
        let rest = rest.strip_prefix(';').unwrap_or(rest);
        let rest = Blank.consume(rest)?;
        if !rest.is_empty() {
            return fail("end of statement", rest);
        }
        Ok((rest, ()))
    }
}

// ─────────────────────────────────────────────────────────────
// Composites
// ─────────────────────────────────────────────────────────────

pub struct Map<R, F> {
    reader: R,
    f: F,
}

impl<R, F, T> Reader for Map<R, F>
where
    R: Reader,
    F: Fn(R::Output) -> T,
{
    type Output = T;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, T)> {
        let (rest, out) = self.reader.read(input)?;
        Ok((rest, (self.f)(out)))
    }
}

pub struct TryMap<R, F> {
    reader: R,
    f: F,
}

impl<R, F, T> Reader for TryMap<R, F>
where
    R: Reader,
    F: Fn(R::Output) -> Result<T>,
{
    type Output = T;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, T)> {
        let (rest, out) = self.reader.read(input)?;
        Ok((rest, (self.f)(out)?))
    }
}

/// A branch whose syntax failure is swallowed and treated as zero-width.
///
/// Only [Error::Syntax] is swallowed; any other error (e.g. an invalid
/// `LIMIT` rejected while building the query) propagates.
pub struct Optional<R>(pub R);

impl<R: Reader> Reader for Optional<R> {
    type Output = Option<R::Output>;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Self::Output)> {
        match self.0.read(input) {
            Ok((rest, out)) => Ok((rest, Some(out))),
            Err(Error::Syntax(_)) => Ok((input, None)),
            Err(e) => Err(e),
        }
    }
}

/// Skips whitespace, then applies the inner reader.
pub struct Padded<R>(pub R);

impl<R: Reader> Reader for Padded<R> {
    type Output = R::Output;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, R::Output)> {
        self.0.read(Blank.consume(input)?)
    }
}

/// A clause introduced by a keyword: when `key` is absent the clause is
/// skipped without consuming anything; once `key` is read the clause is
/// committed and `body` must follow. Whitespace before and after the key is
/// skipped.
pub struct Prefixed<K, R> {
    key: K,
    body: R,
}

impl<K: Reader, R: Reader> Prefixed<K, R> {
    pub fn new(key: K, body: R) -> Self {
        Self { key, body }
    }
}

impl<K: Reader, R: Reader> Reader for Prefixed<K, R> {
    type Output = Option<R::Output>;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Self::Output)> {
        let start = Blank.consume(input)?;
        let after = match self.key.read(start) {
            Ok((after, _)) => after,
            Err(Error::Syntax(_)) => return Ok((input, None)),
            Err(e) => return Err(e),
        };
        let (rest, out) = self.body.read(Blank.consume(after)?)?;
        Ok((rest, Some(out)))
    }
}

/// A fixed sequence of readers, run in order. Tuples of readers are groups;
/// wrap a member in [Optional] to make it skippable.
macro_rules! group_reader {
    ($($name:ident),+) => {
        impl<$($name: Reader),+> Reader for ($($name,)+) {
            type Output = ($($name::Output,)+);

            #[allow(non_snake_case)]
            fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Self::Output)> {
                let ($($name,)+) = self;
                let rest = input;
                $(let (rest, $name) = $name.read(rest)?;)+
                Ok((rest, ($($name,)+)))
            }
        }
    };
}

group_reader!(A);
group_reader!(A, B);
group_reader!(A, B, C);
group_reader!(A, B, C, D);
group_reader!(A, B, C, D, E);
group_reader!(A, B, C, D, E, F);
group_reader!(A, B, C, D, E, F, G);
group_reader!(A, B, C, D, E, F, G, H);

/// Reads `element (separator element)*` where `separator` is given as a reader.
/// Once a separator is read the next element is required.
fn repeat<'a, R, S>(element: &R, separator: &S, input: &'a str) -> Result<(&'a str, Vec<R::Output>)>
where
    R: Reader,
    S: Reader<Output = ()>,
{
    let (mut rest, first) = element.read(input)?;
    let mut items = vec![first];
    loop {
        let Ok(after) = (Blank, separator, Blank).consume(rest) else {
            return Ok((rest, items));
        };
        let (next, item) = element.read(after)?;
        items.push(item);
        rest = next;
    }
}

/// One or more elements separated by a symbol such as `,`.
pub struct List<R> {
    element: R,
    separator: &'static str,
}

impl<R: Reader> List<R> {
    pub fn new(element: R, separator: &'static str) -> Self {
        Self { element, separator }
    }

    /// A comma separated list.
    pub fn comma(element: R) -> Self {
        Self::new(element, ",")
    }
}

impl<R: Reader> Reader for List<R> {
    type Output = Vec<R::Output>;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Self::Output)> {
        repeat(&self.element, &Text(self.separator), input)
    }
}

/// One or more elements separated by a keyword such as `AND`. The keyword must
/// stand as a whole word.
pub struct Array<R> {
    element: R,
    keyword: &'static str,
}

impl<R: Reader> Array<R> {
    pub fn new(element: R, keyword: &'static str) -> Self {
        Self { element, keyword }
    }
}

impl<R: Reader> Reader for Array<R> {
    type Output = Vec<R::Output>;

    fn read<'a>(&self, input: &'a str) -> Result<(&'a str, Self::Output)> {
        repeat(&self.element, &Text(self.keyword), input)
    }
}
