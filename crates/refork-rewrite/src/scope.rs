//! Line-range scopes that confine a rule to part of a file.
//!
//! A scope resolves per file to a byte range made of whole lines. Ranges
//! follow the `sed` address convention: the range opens on the first line
//! matching the start anchor and closes on the next *later* line matching the
//! end anchor, or at end of file when the end anchor never matches. A start
//! anchor that never matches resolves to no range, which leaves the file
//! untouched.

use std::fmt;
use std::ops::Range;

use regex::Regex;

use crate::error::RewriteError;

/// Regular expression tested against single lines (without the newline).
#[derive(Debug, Clone)]
pub struct LinePattern(Regex);

impl LinePattern {
    /// Compiles a line pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidPattern`] when the expression is
    /// malformed.
    pub fn new(pattern: &str) -> Result<Self, RewriteError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|error| RewriteError::invalid_pattern(pattern, error.to_string()))
    }

    /// Returns true when the line matches.
    #[must_use]
    pub fn is_match(&self, line: &str) -> bool {
        self.0.is_match(line)
    }

    /// Source text of the pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Where a scoped line range opens.
#[derive(Debug, Clone)]
pub enum LineStart {
    /// The first line of the file.
    FirstLine,
    /// The first line matching the pattern.
    Matching(LinePattern),
}

/// Where a scoped line range closes (inclusive).
#[derive(Debug, Clone)]
pub enum LineEnd {
    /// The last line of the file.
    LastLine,
    /// The next line after the start that matches the pattern.
    Matching(LinePattern),
}

/// Portion of a file a rule is allowed to touch.
#[derive(Debug, Clone, Default)]
pub enum Scope {
    /// The entire file.
    #[default]
    WholeFile,
    /// A contiguous run of whole lines.
    Lines {
        /// Opening anchor.
        start: LineStart,
        /// Closing anchor.
        end: LineEnd,
    },
}

impl Scope {
    /// Lines from the first match of `start` to end of file.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidPattern`] when `start` is malformed.
    pub fn from_line(start: &str) -> Result<Self, RewriteError> {
        Ok(Self::Lines {
            start: LineStart::Matching(LinePattern::new(start)?),
            end: LineEnd::LastLine,
        })
    }

    /// Lines from the first match of `start` through the next match of `end`.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidPattern`] when either pattern is
    /// malformed.
    pub fn between(start: &str, end: &str) -> Result<Self, RewriteError> {
        Ok(Self::Lines {
            start: LineStart::Matching(LinePattern::new(start)?),
            end: LineEnd::Matching(LinePattern::new(end)?),
        })
    }

    /// Lines from the top of the file through the next match of `end`.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidPattern`] when `end` is malformed.
    pub fn through(end: &str) -> Result<Self, RewriteError> {
        Ok(Self::Lines {
            start: LineStart::FirstLine,
            end: LineEnd::Matching(LinePattern::new(end)?),
        })
    }

    /// Resolves the scope against `text`, returning the covered byte range.
    ///
    /// Returns `None` when the scope does not occur in the text.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Option<Range<usize>> {
        let (start, end) = match self {
            Self::WholeFile => return Some(0..text.len()),
            Self::Lines { start, end } => (start, end),
        };

        let lines = line_spans(text);
        let open = match start {
            LineStart::FirstLine => (!lines.is_empty()).then_some(0)?,
            LineStart::Matching(pattern) => lines
                .iter()
                .position(|span| pattern.is_match(line_body(text, span)))?,
        };
        let range_start = lines.get(open)?.start;

        let close = match end {
            LineEnd::LastLine => None,
            LineEnd::Matching(pattern) => lines
                .iter()
                .enumerate()
                .skip(open + 1)
                .find(|(_, span)| pattern.is_match(line_body(text, span)))
                .map(|(index, _)| index),
        };
        let range_end = close
            .and_then(|index| lines.get(index))
            .map_or(text.len(), |span| span.end);

        Some(range_start..range_end)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self::Lines { start, end } = self else {
            return formatter.write_str("whole file");
        };
        match start {
            LineStart::FirstLine => formatter.write_str("1")?,
            LineStart::Matching(pattern) => write!(formatter, "/{}/", pattern.as_str())?,
        }
        match end {
            LineEnd::LastLine => formatter.write_str(",$"),
            LineEnd::Matching(pattern) => write!(formatter, ",/{}/", pattern.as_str()),
        }
    }
}

/// Byte spans of each line including its terminator.
pub(crate) fn line_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        spans.push(offset..offset + line.len());
        offset += line.len();
    }
    spans
}

fn line_body<'a>(text: &'a str, span: &Range<usize>) -> &'a str {
    text.get(span.clone())
        .map_or("", |line| line.trim_end_matches('\n'))
}
