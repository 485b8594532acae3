//! The dotted/indexed path grammar (spec §3, §4.B).
//!
//! ```text
//! Path    := ('$' | '.') Step*
//! Step    := '.' Name | '[' Index ']' | '.*'
//! Name    := ident
//! Index   := digits | '*'
//! ```
//!
//! `$` anchors at the document root (`Global`); a leading `.` with no `$`
//! anchors at the "current" schema scope (`Local`). The module is pure and
//! depends only on strings, per spec §4.B.

use crate::error::{Error, Result};
use std::fmt;

/// One step in a parsed path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item {
    /// `$` — anchors at the document root.
    Global,
    /// Leading `.` with no `$` — anchors at the current schema scope.
    Local,
    /// `.name` — a named object key.
    Named(String),
    /// `[n]` — an array index.
    Indexed(usize),
    /// `[*]` or `.*` — wildcard, matches any key/index at that level.
    Any,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Global => write!(f, "$"),
            Item::Local => write!(f, "."),
            Item::Named(n) => write!(f, ".{n}"),
            Item::Indexed(i) => write!(f, "[{i}]"),
            Item::Any => write!(f, "[*]"),
        }
    }
}

/// A parsed path: an anchor followed by zero or more steps.
///
/// Equality is structural. Paths are cheap to clone and compare; there is no
/// back-reference to any value tree (see `value.rs` module docs for why).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    items: Vec<Item>,
}

impl Path {
    /// An empty path (no anchor, no steps) — used as a builder start.
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// The global root path, `$`.
    pub fn global() -> Self {
        Self {
            items: vec![Item::Global],
        }
    }

    /// The local root path, `.`.
    pub fn local() -> Self {
        Self {
            items: vec![Item::Local],
        }
    }

    /// Append a step, returning the extended path.
    pub fn push(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Append a named step in place.
    pub fn push_named(&mut self, name: impl Into<String>) {
        self.items.push(Item::Named(name.into()));
    }

    /// Append an indexed step in place.
    pub fn push_index(&mut self, index: usize) {
        self.items.push(Item::Indexed(index));
    }

    /// All steps, in document order (including the leading anchor, if any).
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// True if the path starts with `Global`.
    pub fn is_global(&self) -> bool {
        matches!(self.items.first(), Some(Item::Global))
    }

    /// True if the path starts with `Local`.
    pub fn is_local(&self) -> bool {
        matches!(self.items.first(), Some(Item::Local))
    }

    /// Longest common prefix of `self` and `other`.
    pub fn prefix(&self, other: &Path) -> Path {
        let n = self
            .items
            .iter()
            .zip(other.items.iter())
            .take_while(|(a, b)| a == b)
            .count();
        Path {
            items: self.items[..n].to_vec(),
        }
    }

    /// The steps after the anchor and the first `n` named/indexed steps are
    /// stripped; used to compute a "residual path" during a walk.
    pub fn suffix(&self, n: usize) -> Path {
        Path {
            items: self.items.iter().skip(n).cloned().collect(),
        }
    }

    /// Number of steps, anchor included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if this path has no steps at all (not even an anchor).
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parse a path expression per the grammar above.
    pub fn parse(s: &str) -> Result<Path> {
        let mut chars = s.chars().peekable();
        let mut items = Vec::new();

        match chars.peek() {
            Some('$') => {
                items.push(Item::Global);
                chars.next();
            }
            Some('.') => {
                items.push(Item::Local);
            }
            _ => return Err(Error::InvalidPath(s.to_string())),
        }

        while let Some(&c) = chars.peek() {
            match c {
                '.' => {
                    chars.next();
                    if chars.peek() == Some(&'*') {
                        chars.next();
                        items.push(Item::Any);
                        continue;
                    }
                    let name = take_ident(&mut chars);
                    if name.is_empty() {
                        return Err(Error::InvalidPath(s.to_string()));
                    }
                    items.push(Item::Named(name));
                }
                '[' => {
                    chars.next();
                    let idx = take_while(&mut chars, |c| c != ']');
                    if chars.next() != Some(']') {
                        return Err(Error::InvalidPath(s.to_string()));
                    }
                    if idx == "*" {
                        items.push(Item::Any);
                    } else {
                        let n: usize = idx
                            .parse()
                            .map_err(|_| Error::InvalidPath(s.to_string()))?;
                        items.push(Item::Indexed(n));
                    }
                }
                _ => return Err(Error::InvalidPath(s.to_string())),
            }
        }

        Ok(Path { items })
    }
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    take_while(chars, |c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn take_while(
    chars: &mut std::iter::Peekable<std::str::Chars>,
    pred: impl Fn(char) -> bool,
) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if pred(c) {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    out
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            match item {
                Item::Global if i == 0 => write!(f, "$")?,
                Item::Local if i == 0 => write!(f, ".")?,
                other => write!(f, "{other}")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_path() {
        let p = Path::parse("$.a.b[2].c").unwrap();
        assert_eq!(
            p.items(),
            &[
                Item::Global,
                Item::Named("a".into()),
                Item::Named("b".into()),
                Item::Indexed(2),
                Item::Named("c".into()),
            ]
        );
    }

    #[test]
    fn parses_local_path() {
        let p = Path::parse(".x.y").unwrap();
        assert!(p.is_local());
        assert_eq!(p.items().len(), 3);
    }

    #[test]
    fn parses_wildcard_steps() {
        let a = Path::parse("$.a[*].b").unwrap();
        let b = Path::parse("$.a.*.b").unwrap();
        assert_eq!(a.items()[2], Item::Any);
        assert_eq!(b.items()[2], Item::Any);
    }

    #[test]
    fn rejects_bad_anchor() {
        assert!(Path::parse("a.b").is_err());
    }

    #[test]
    fn print_parse_roundtrip() {
        for s in ["$.a.b[2].c", ".x.y", "$", "."] {
            let p = Path::parse(s).unwrap();
            let printed = p.to_string();
            let reparsed = Path::parse(&printed).unwrap();
            assert_eq!(p, reparsed, "roundtrip failed for {s}");
        }
    }

    #[test]
    fn prefix_is_longest_common() {
        let a = Path::parse("$.a.b.c").unwrap();
        let b = Path::parse("$.a.b.d").unwrap();
        assert_eq!(a.prefix(&b), Path::parse("$.a.b").unwrap());
    }
}
