//! Text rewrite rules.
//!
//! A rule selects files with a [`FileGlob`], confines itself to a [`Scope`]
//! inside each file and then either substitutes matches line by line or
//! deletes the scoped lines. Matching happens one line at a time, so `^` and
//! `$` anchor to line boundaries and no match ever spans a newline.

use std::borrow::Cow;

use regex::Regex;

use crate::error::RewriteError;
use crate::glob::FileGlob;
use crate::scope::Scope;

/// What a substitution looks for.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// An exact string; the replacement is inserted verbatim.
    Literal(String),
    /// A regular expression; the replacement may reference capture groups
    /// with `$1`, `${1}` or `${name}`.
    Pattern(Regex),
}

impl Matcher {
    /// Creates a literal matcher.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidPattern`] when `literal` is empty.
    pub fn literal(literal: impl Into<String>) -> Result<Self, RewriteError> {
        let text = literal.into();
        if text.is_empty() {
            return Err(RewriteError::invalid_pattern(text, "literal matcher is empty"));
        }
        Ok(Self::Literal(text))
    }

    /// Compiles a regular expression matcher.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidPattern`] when the expression is
    /// malformed.
    pub fn pattern(pattern: &str) -> Result<Self, RewriteError> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|error| RewriteError::invalid_pattern(pattern, error.to_string()))
    }

    /// Source text of the matcher.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Pattern(regex) => regex.as_str(),
        }
    }

    fn replace_line<'a>(
        &self,
        line: &'a str,
        replacement: &str,
        occurrences: Occurrences,
    ) -> (Cow<'a, str>, usize) {
        match (self, occurrences) {
            (Self::Literal(text), Occurrences::All) => match line.matches(text.as_str()).count() {
                0 => (Cow::Borrowed(line), 0),
                count => (Cow::Owned(line.replace(text.as_str(), replacement)), count),
            },
            (Self::Literal(text), Occurrences::FirstPerLine) => {
                if line.contains(text.as_str()) {
                    (Cow::Owned(line.replacen(text.as_str(), replacement, 1)), 1)
                } else {
                    (Cow::Borrowed(line), 0)
                }
            }
            (Self::Pattern(regex), Occurrences::All) => match regex.find_iter(line).count() {
                0 => (Cow::Borrowed(line), 0),
                count => (regex.replace_all(line, replacement), count),
            },
            (Self::Pattern(regex), Occurrences::FirstPerLine) => {
                if regex.is_match(line) {
                    (regex.replace(line, replacement), 1)
                } else {
                    (Cow::Borrowed(line), 0)
                }
            }
        }
    }
}

/// How many matches per line a substitution replaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Occurrences {
    /// Every non-overlapping match on the line.
    #[default]
    All,
    /// Only the leftmost match on each line.
    FirstPerLine,
}

/// The edit a rule performs inside its scope.
#[derive(Debug, Clone)]
pub enum RuleAction {
    /// Replace matches of `matcher` with `replacement`.
    Substitute {
        /// What to look for.
        matcher: Matcher,
        /// What to insert.
        replacement: String,
        /// How many matches per line to replace.
        occurrences: Occurrences,
    },
    /// Remove every line of the scope.
    DeleteLines,
}

/// A named, immutable text rewrite step.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    name: String,
    files: FileGlob,
    scope: Scope,
    action: RuleAction,
    require_match: bool,
}

impl RewriteRule {
    /// Creates a substitution rule over the whole of every selected file,
    /// replacing all matches.
    #[must_use]
    pub fn substitute(
        name: impl Into<String>,
        files: FileGlob,
        matcher: Matcher,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            files,
            scope: Scope::WholeFile,
            action: RuleAction::Substitute {
                matcher,
                replacement: replacement.into(),
                occurrences: Occurrences::All,
            },
            require_match: false,
        }
    }

    /// Creates a rule that deletes the scoped lines of every selected file.
    ///
    /// Without a narrower [`Scope`] the rule empties each selected file.
    #[must_use]
    pub fn delete_lines(name: impl Into<String>, files: FileGlob) -> Self {
        Self {
            name: name.into(),
            files,
            scope: Scope::WholeFile,
            action: RuleAction::DeleteLines,
            require_match: false,
        }
    }

    /// Confines the rule to `scope`.
    #[must_use]
    pub fn within(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Replaces only the leftmost match on each line.
    #[must_use]
    pub fn first_per_line(mut self) -> Self {
        if let RuleAction::Substitute { occurrences, .. } = &mut self.action {
            *occurrences = Occurrences::FirstPerLine;
        }
        self
    }

    /// Makes the rule fail when it changes nothing in the tree.
    #[must_use]
    pub const fn require_match(mut self) -> Self {
        self.require_match = true;
        self
    }

    /// Rule name used in reports and errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Files the rule selects.
    #[must_use]
    pub const fn files(&self) -> &FileGlob {
        &self.files
    }

    /// Portion of each file the rule may touch.
    #[must_use]
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Edit performed inside the scope.
    #[must_use]
    pub const fn action(&self) -> &RuleAction {
        &self.action
    }

    /// Whether a rule that changes nothing is an error.
    #[must_use]
    pub const fn requires_match(&self) -> bool {
        self.require_match
    }

    /// Applies the rule to the content of one file.
    #[must_use]
    pub fn apply_to(&self, text: &str) -> TextRewrite {
        let Some(range) = self.scope.resolve(text) else {
            return TextRewrite::unchanged(text);
        };
        let (Some(before), Some(scoped), Some(after)) = (
            text.get(..range.start),
            text.get(range.clone()),
            text.get(range.end..),
        ) else {
            return TextRewrite::unchanged(text);
        };

        let (middle, replacements) = match &self.action {
            RuleAction::DeleteLines => (String::new(), scoped.split_inclusive('\n').count()),
            RuleAction::Substitute {
                matcher,
                replacement,
                occurrences,
            } => substitute_lines(scoped, matcher, replacement, *occurrences),
        };

        let mut output = String::with_capacity(text.len());
        output.push_str(before);
        output.push_str(&middle);
        output.push_str(after);
        TextRewrite {
            output,
            replacements,
        }
    }
}

fn substitute_lines(
    text: &str,
    matcher: &Matcher,
    replacement: &str,
    occurrences: Occurrences,
) -> (String, usize) {
    let mut output = String::with_capacity(text.len());
    let mut total: usize = 0;
    for line in text.split_inclusive('\n') {
        let (body, terminator) = line
            .strip_suffix('\n')
            .map_or((line, ""), |stripped| (stripped, "\n"));
        let (rewritten, count) = matcher.replace_line(body, replacement, occurrences);
        output.push_str(&rewritten);
        output.push_str(terminator);
        total = total.saturating_add(count);
    }
    (output, total)
}

/// Result of applying one rule to one file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRewrite {
    output: String,
    replacements: usize,
}

impl TextRewrite {
    fn unchanged(text: &str) -> Self {
        Self {
            output: text.to_owned(),
            replacements: 0,
        }
    }

    /// The rewritten content.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consumes the result, returning the rewritten content.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    /// Number of substitutions made or lines deleted.
    #[must_use]
    pub const fn replacements(&self) -> usize {
        self.replacements
    }

    /// Returns true when at least one edit was made.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.replacements > 0
    }
}
