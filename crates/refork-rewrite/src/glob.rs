//! File globs matched against `/`-separated tree paths.
//!
//! `*` and `?` stay within one path component, while `**/` spans zero or more
//! whole directories. A glob without a slash therefore only selects files at
//! the tree root, which is how the fork recipes distinguish "top-level Go
//! files" from "every Go file".

use std::fmt;

use regex::Regex;

use crate::error::RewriteError;

/// A set of glob patterns; a path is selected when any pattern matches.
#[derive(Debug, Clone)]
pub struct FileGlob {
    patterns: Vec<String>,
    regex: Regex,
}

impl FileGlob {
    /// Compiles a single glob.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidGlob`] when the pattern is empty or the
    /// translated expression fails to compile.
    pub fn new(pattern: &str) -> Result<Self, RewriteError> {
        Self::any([pattern])
    }

    /// Compiles a glob set that selects paths matching any of `globs`.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidGlob`] when the set is empty, any
    /// pattern is empty, or the translated expression fails to compile.
    pub fn any<I, S>(globs: I) -> Result<Self, RewriteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = globs
            .into_iter()
            .map(|pattern| pattern.as_ref().to_owned())
            .collect();
        if patterns.is_empty() {
            return Err(RewriteError::invalid_glob("", "glob set is empty"));
        }

        let mut alternatives = Vec::with_capacity(patterns.len());
        for pattern in &patterns {
            if pattern.is_empty() {
                return Err(RewriteError::invalid_glob(pattern.as_str(), "glob is empty"));
            }
            alternatives.push(translate(pattern));
        }

        let source = format!("^(?:{})$", alternatives.join("|"));
        let regex = Regex::new(&source)
            .map_err(|error| RewriteError::invalid_glob(patterns.join(", "), error.to_string()))?;
        Ok(Self { patterns, regex })
    }

    /// Returns true when the relative path is selected.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Source patterns in declaration order.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl fmt::Display for FileGlob {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.patterns.join(" "))
    }
}

fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;
    while let Some(ch) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("**/") {
            out.push_str("(?:[^/]+/)*");
            rest = tail;
            continue;
        }
        if let Some(tail) = rest.strip_prefix("**") {
            out.push_str(".*");
            rest = tail;
            continue;
        }
        match ch {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
        rest = rest.get(ch.len_utf8()..).unwrap_or_default();
    }
    out
}
