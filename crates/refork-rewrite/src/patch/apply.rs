//! In-memory hunk application.

use crate::patch::errors::PatchError;
use crate::patch::types::{Hunk, Lines};

/// Applies every hunk of one file section to `content`.
///
/// Each hunk is tried at its stated line first, then at increasing distances
/// above and below it. Only an exact pre-image match is accepted, and a hunk
/// never lands before the end of the previous one.
pub(crate) fn apply_hunks(path: &str, content: &str, hunks: &[Hunk]) -> Result<String, PatchError> {
    let mut file = Lines::parse(content);
    let mut cursor = 0_usize;
    let mut ahead = 0_usize;
    let mut behind = 0_usize;

    for (index, hunk) in hunks.iter().enumerate() {
        let pre = hunk.pre_image();
        let post = hunk.post_image();
        let expected = hunk.anchor().saturating_add(ahead).saturating_sub(behind);

        let at = locate(&file, &pre, expected, cursor, hunk).ok_or_else(|| {
            PatchError::HunkMismatch {
                path: path.to_owned(),
                hunk: index.saturating_add(1),
                line: hunk.old_start,
            }
        })?;
        let end = at.saturating_add(pre.len());
        let at_eof = end == file.lines.len();

        file.lines
            .splice(at..end, post.iter().map(|line| (*line).to_owned()));
        if at_eof {
            if hunk.new_missing_newline {
                file.trailing_newline = false;
            } else if hunk.old_missing_newline {
                file.trailing_newline = true;
            }
        }

        cursor = at.saturating_add(post.len());
        ahead = cursor;
        behind = hunk.anchor().saturating_add(pre.len());
    }

    Ok(file.render())
}

fn locate(file: &Lines, pre: &[&str], expected: usize, cursor: usize, hunk: &Hunk) -> Option<usize> {
    let last_start = file.lines.len().checked_sub(pre.len())?;
    let fits = |at: usize| -> bool {
        if at < cursor || at > last_start {
            return false;
        }
        let Some(window) = file.lines.get(at..at.saturating_add(pre.len())) else {
            return false;
        };
        if window.iter().map(String::as_str).ne(pre.iter().copied()) {
            return false;
        }
        let touches_eof = at.saturating_add(pre.len()) == file.lines.len();
        !hunk.old_missing_newline || (touches_eof && !file.trailing_newline)
    };

    let span = file.lines.len().max(expected).saturating_add(1);
    for distance in 0..=span {
        if let Some(below) = expected.checked_add(distance) {
            if fits(below) {
                return Some(below);
            }
        }
        if distance > 0 {
            if let Some(above) = expected.checked_sub(distance) {
                if fits(above) {
                    return Some(above);
                }
            }
        }
    }
    None
}
