//! Unified-diff parser.
//!
//! Lines outside file sections (`diff --git`, `index`, blank separators) are
//! preamble and ignored. Inside a hunk, the body is consumed until both the
//! old and new line counts from the header are exhausted.

use crate::patch::errors::PatchError;
use crate::patch::types::{FilePatch, Hunk, HunkLine};

const DEV_NULL: &str = "/dev/null";

pub(crate) fn parse_patch(patch: &str) -> Result<Vec<FilePatch>, PatchError> {
    if patch.trim().is_empty() {
        return Err(PatchError::EmptyPatch);
    }
    if patch.as_bytes().contains(&0) {
        return Err(PatchError::BinaryPatch);
    }

    let mut parser = Parser::default();
    for (index, line) in patch.split_inclusive('\n').enumerate() {
        parser.feed(index.saturating_add(1), trim_line(line))?;
    }
    parser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineType {
    OldHeader,
    NewHeader,
    HunkHeader,
    NoNewline,
    Other,
}

fn classify_line(trimmed: &str) -> LineType {
    if trimmed.starts_with("--- ") {
        LineType::OldHeader
    } else if trimmed.starts_with("+++ ") {
        LineType::NewHeader
    } else if trimmed.starts_with("@@ ") {
        LineType::HunkHeader
    } else if trimmed.starts_with('\\') {
        LineType::NoNewline
    } else {
        LineType::Other
    }
}

/// Remaining body lines of the hunk being read.
#[derive(Debug, Default)]
struct Remaining {
    old: usize,
    new: usize,
}

impl Remaining {
    const fn is_open(&self) -> bool {
        self.old > 0 || self.new > 0
    }
}

#[derive(Debug, Default)]
struct Parser {
    files: Vec<FilePatch>,
    pending_old: Option<Option<String>>,
    remaining: Remaining,
}

impl Parser {
    fn feed(&mut self, number: usize, line: &str) -> Result<(), PatchError> {
        if self.remaining.is_open() {
            return self.body_line(line);
        }
        match classify_line(line) {
            LineType::OldHeader => {
                self.pending_old = Some(parse_header_path(line, "--- "));
            }
            LineType::NewHeader => {
                let old_path = self
                    .pending_old
                    .take()
                    .ok_or(PatchError::UnpairedHeader { line: number })?;
                self.files.push(FilePatch {
                    old_path,
                    new_path: parse_header_path(line, "+++ "),
                    hunks: Vec::new(),
                });
            }
            LineType::HunkHeader => {
                let hunk = parse_hunk_header(number, line)?;
                let file = self
                    .files
                    .last_mut()
                    .ok_or(PatchError::MissingFileHeader { line: number })?;
                self.remaining = Remaining {
                    old: hunk.old_len,
                    new: hunk.new_len,
                };
                file.hunks.push(hunk);
            }
            LineType::NoNewline => self.mark_missing_newline(),
            LineType::Other => {}
        }
        Ok(())
    }

    fn body_line(&mut self, line: &str) -> Result<(), PatchError> {
        if classify_line(line) == LineType::NoNewline {
            self.mark_missing_newline();
            return Ok(());
        }

        let (kind, text) = match line.chars().next() {
            None => (' ', ""),
            Some(first @ (' ' | '-' | '+')) => (first, line.get(1..).unwrap_or_default()),
            Some(_) => return Err(self.count_mismatch()),
        };
        let (old, new) = match kind {
            '-' => (1, 0),
            '+' => (0, 1),
            _ => (1, 1),
        };
        if self.remaining.old < old || self.remaining.new < new {
            return Err(self.count_mismatch());
        }
        self.remaining.old -= old;
        self.remaining.new -= new;

        let entry = match kind {
            '-' => HunkLine::Remove(text.to_owned()),
            '+' => HunkLine::Add(text.to_owned()),
            _ => HunkLine::Context(text.to_owned()),
        };
        if let Some(hunk) = self.current_hunk() {
            hunk.lines.push(entry);
        }
        Ok(())
    }

    fn mark_missing_newline(&mut self) {
        let Some(hunk) = self.current_hunk() else {
            return;
        };
        match hunk.lines.last() {
            Some(HunkLine::Remove(_)) => hunk.old_missing_newline = true,
            Some(HunkLine::Add(_)) => hunk.new_missing_newline = true,
            Some(HunkLine::Context(_)) => {
                hunk.old_missing_newline = true;
                hunk.new_missing_newline = true;
            }
            None => {}
        }
    }

    fn current_hunk(&mut self) -> Option<&mut Hunk> {
        self.files.last_mut().and_then(|file| file.hunks.last_mut())
    }

    fn count_mismatch(&self) -> PatchError {
        let (path, hunk) = self.files.last().map_or((String::new(), 0), |file| {
            (display_path(file), file.hunks.len())
        });
        PatchError::CountMismatch { path, hunk }
    }

    fn finish(self) -> Result<Vec<FilePatch>, PatchError> {
        if self.remaining.is_open() {
            return Err(self.count_mismatch());
        }
        if self.files.is_empty() {
            return Err(PatchError::EmptyPatch);
        }
        Ok(self.files)
    }
}

pub(crate) fn display_path(file: &FilePatch) -> String {
    file.new_path
        .as_deref()
        .or(file.old_path.as_deref())
        .unwrap_or(DEV_NULL)
        .to_owned()
}

fn trim_line(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

fn parse_header_path(line: &str, marker: &str) -> Option<String> {
    let rest = line.strip_prefix(marker).unwrap_or(line);
    let field = rest.split('\t').next().unwrap_or(rest).trim_end();
    let path = field
        .strip_prefix('"')
        .and_then(|quoted| quoted.strip_suffix('"'))
        .unwrap_or(field);
    (path != DEV_NULL).then(|| path.to_owned())
}

fn parse_hunk_header(number: usize, line: &str) -> Result<Hunk, PatchError> {
    let invalid = || PatchError::InvalidHunkHeader {
        line: number,
        text: line.to_owned(),
    };
    let ranges = line
        .strip_prefix("@@ ")
        .and_then(|rest| rest.split_once(" @@"))
        .map(|(spans, _)| spans)
        .ok_or_else(invalid)?;
    let (old, new) = ranges.split_once(' ').ok_or_else(invalid)?;
    let (old_start, old_len) = old
        .strip_prefix('-')
        .and_then(parse_range)
        .ok_or_else(invalid)?;
    let (new_start, new_len) = new
        .strip_prefix('+')
        .and_then(parse_range)
        .ok_or_else(invalid)?;
    Ok(Hunk {
        old_start,
        old_len,
        new_start,
        new_len,
        ..Hunk::default()
    })
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
    match range.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}
