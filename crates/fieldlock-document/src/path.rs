//! Field paths for addressing within documents
//!
//! Provides [`FieldPath`] for dot/bracket addressing of leaves within a
//! JSON document, e.g. `profile.name` or `items[2].amount`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Record key
    Key(String),

    /// Positional list index
    Index(usize),
}

impl Segment {
    /// Key name, if this is a key segment
    #[inline]
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            Self::Index(_) => None,
        }
    }

    /// Index, if this is an index segment
    #[inline]
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Key(_) => None,
            Self::Index(index) => Some(*index),
        }
    }
}

/// Path within a document tree
///
/// Records are addressed by key, lists by position. Positional addressing
/// means a reordered list is seen as a change at every shifted index.
///
/// # Examples
/// - `["profile", "name"]` → `profile.name`
/// - `["items", 2, "amount"]` → `items[2].amount`
/// - `["a.b"]` → `a\.b` (separators inside keys are escaped)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Create path from a single key
    #[inline]
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self(vec![Segment::Key(key.into())])
    }

    /// Empty path (document root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty (root)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get last segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Last key segment, skipping trailing indices
    #[must_use]
    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(Segment::as_key)
    }

    /// Index segment closest to the leaf
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.0.iter().rev().find_map(Segment::as_index)
    }

    /// Append a key, returning new path
    #[inline]
    #[must_use]
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(Segment::Key(key.into()));
        new
    }

    /// Append an index, returning new path
    #[inline]
    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        let mut new = self.clone();
        new.0.push(Segment::Index(index));
        new
    }

    #[inline]
    pub(crate) fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    #[inline]
    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    /// Rendering with every index replaced by `[]`
    ///
    /// `items[2].amount` → `items[].amount`. Used to key settings that apply to
    /// every element of a list.
    #[must_use]
    pub fn normalized(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(&escape_key(key));
                }
                Segment::Index(_) => out.push_str("[]"),
            }
        }
        out
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", escape_key(key))?,
                Segment::Key(key) => write!(f, ".{}", escape_key(key))?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Characters that must be escaped with `\` inside a rendered key
fn is_special(c: char) -> bool {
    matches!(c, '.' | '[' | ']' | '\\')
}

/// `a.b` → `a\.b`, so a flat key never renders like a nested path
fn escape_key(key: &str) -> Cow<'_, str> {
    if !key.contains(is_special) {
        return Cow::Borrowed(key);
    }
    let mut out = String::with_capacity(key.len() + 2);
    for c in key.chars() {
        if is_special(c) {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        let mut chars = s.chars().peekable();

        loop {
            let mut key = String::new();
            while let Some(&c) = chars.peek() {
                match c {
                    '.' | '[' => break,
                    '\\' => {
                        chars.next();
                        key.push(chars.next().ok_or(PathError::DanglingEscape)?);
                    }
                    _ => {
                        key.push(c);
                        chars.next();
                    }
                }
            }

            if key.is_empty() {
                // Only a leading index (`[0].a`) may omit the key
                if !(segments.is_empty() && chars.peek() == Some(&'[')) {
                    return Err(PathError::EmptySegment);
                }
            } else {
                segments.push(Segment::Key(key));
            }

            while chars.peek() == Some(&'[') {
                chars.next();
                let mut raw = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(c) => raw.push(c),
                        None => return Err(PathError::UnclosedBracket),
                    }
                }
                if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(PathError::InvalidIndex(raw));
                }
                let index = raw
                    .parse::<usize>()
                    .map_err(|_| PathError::InvalidIndex(raw.clone()))?;
                segments.push(Segment::Index(index));
            }

            match chars.next() {
                None => break,
                Some('.') => {}
                Some(other) => return Err(PathError::UnexpectedCharacter(other)),
            }
        }

        Ok(Self(segments))
    }
}

impl From<Vec<Segment>> for FieldPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors related to field paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty key segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// `[` without matching `]`
    #[error("unclosed bracket in path")]
    UnclosedBracket,

    /// Bracket contents are not a list index
    #[error("invalid index: '{0}' (must be decimal digits)")]
    InvalidIndex(String),

    /// Character that cannot follow an index
    #[error("unexpected character '{0}' after index")]
    UnexpectedCharacter(char),

    /// `\` at the very end of the path
    #[error("path ends with a dangling escape")]
    DanglingEscape,
}
