//! Parsed representation of a unified diff.

/// One line of a hunk body, without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HunkLine {
    Context(String),
    Remove(String),
    Add(String),
}

/// A single `@@` hunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Hunk {
    pub(crate) old_start: usize,
    pub(crate) old_len: usize,
    pub(crate) new_start: usize,
    pub(crate) new_len: usize,
    pub(crate) lines: Vec<HunkLine>,
    /// The pre-image ends without a trailing newline.
    pub(crate) old_missing_newline: bool,
    /// The post-image ends without a trailing newline.
    pub(crate) new_missing_newline: bool,
}

impl Hunk {
    pub(crate) fn pre_image(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                HunkLine::Context(text) | HunkLine::Remove(text) => Some(text.as_str()),
                HunkLine::Add(_) => None,
            })
            .collect()
    }

    pub(crate) fn post_image(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                HunkLine::Context(text) | HunkLine::Add(text) => Some(text.as_str()),
                HunkLine::Remove(_) => None,
            })
            .collect()
    }

    /// Zero-based line index the pre-image is expected at.
    pub(crate) const fn anchor(&self) -> usize {
        if self.old_len == 0 {
            self.old_start
        } else {
            self.old_start.saturating_sub(1)
        }
    }
}

/// All hunks for one file section of the patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FilePatch {
    /// `None` when the old side is `/dev/null`.
    pub(crate) old_path: Option<String>,
    /// `None` when the new side is `/dev/null`.
    pub(crate) new_path: Option<String>,
    pub(crate) hunks: Vec<Hunk>,
}

/// Text content split into lines, remembering the final newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lines {
    pub(crate) lines: Vec<String>,
    pub(crate) trailing_newline: bool,
}

impl Lines {
    pub(crate) fn parse(text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(str::to_owned).collect();
        let trailing_newline = text.is_empty() || text.ends_with('\n');
        if trailing_newline {
            lines.pop();
        }
        Self {
            lines,
            trailing_newline,
        }
    }

    pub(crate) fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            text.push('\n');
        }
        text
    }
}
