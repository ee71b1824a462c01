//! Run stages and the state machine that orders them.
//!
//! A run moves strictly forward:
//! `Empty -> Loaded -> Verified(pre) -> Rewritten -> DocGenerated ->
//! Verified(post) -> Done`. Any failure moves the run to `Failed` and nothing
//! after the failing stage executes.

use std::fmt;

/// Which verification pass a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before any rewrite, against the freshly loaded tree.
    Pre,
    /// After the docs are generated, against the finished fork.
    Post,
}

impl fmt::Display for Phase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Pre => "pre",
            Self::Post => "post",
        })
    }
}

/// Unit of work a run reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Environment resolution and working directory checks.
    Precondition,
    /// Copying the upstream snapshot into the working directory.
    Load,
    /// Running the verification commands.
    Verify(Phase),
    /// One recipe step, numbered from one.
    Step {
        /// Position in the recipe.
        index: usize,
        /// Human-readable step description.
        label: String,
    },
    /// Writing the package documentation file.
    Doc,
}

impl fmt::Display for Stage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition => formatter.write_str("precondition check"),
            Self::Load => formatter.write_str("snapshot load"),
            Self::Verify(phase) => write!(formatter, "{phase}-verification"),
            Self::Step { index, label } => write!(formatter, "step {index} ({label})"),
            Self::Doc => formatter.write_str("doc generation"),
        }
    }
}

/// Position of a run in its life cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    /// Nothing has happened yet.
    Empty,
    /// The upstream snapshot has been copied and stamped.
    Loaded,
    /// A verification pass succeeded.
    Verified(Phase),
    /// Every recipe step succeeded.
    Rewritten,
    /// The documentation file has been written.
    DocGenerated,
    /// The run completed.
    Done,
    /// A stage failed; the run stops here.
    Failed(Stage),
}

impl PipelineState {
    /// The state reached when the current one completes successfully.
    ///
    /// Terminal states have no successor.
    #[must_use]
    pub const fn successor(&self) -> Option<Self> {
        match self {
            Self::Empty => Some(Self::Loaded),
            Self::Loaded => Some(Self::Verified(Phase::Pre)),
            Self::Verified(Phase::Pre) => Some(Self::Rewritten),
            Self::Rewritten => Some(Self::DocGenerated),
            Self::DocGenerated => Some(Self::Verified(Phase::Post)),
            Self::Verified(Phase::Post) => Some(Self::Done),
            Self::Done | Self::Failed(_) => None,
        }
    }

    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("empty"),
            Self::Loaded => formatter.write_str("loaded"),
            Self::Verified(phase) => write!(formatter, "verified ({phase})"),
            Self::Rewritten => formatter.write_str("rewritten"),
            Self::DocGenerated => formatter.write_str("doc generated"),
            Self::Done => formatter.write_str("done"),
            Self::Failed(stage) => write!(formatter, "failed at {stage}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_advance_in_fixed_order() {
        let mut state = PipelineState::Empty;
        let mut visited = vec![state.clone()];
        while let Some(next) = state.successor() {
            visited.push(next.clone());
            state = next;
        }
        assert_eq!(
            visited,
            vec![
                PipelineState::Empty,
                PipelineState::Loaded,
                PipelineState::Verified(Phase::Pre),
                PipelineState::Rewritten,
                PipelineState::DocGenerated,
                PipelineState::Verified(Phase::Post),
                PipelineState::Done,
            ]
        );
        assert!(state.is_terminal());
    }

    #[test]
    fn failed_is_terminal() {
        let state = PipelineState::Failed(Stage::Load);
        assert!(state.is_terminal());
        assert!(state.successor().is_none());
        assert_eq!(state.to_string(), "failed at snapshot load");
    }

    #[test]
    fn step_stage_names_its_position() {
        let stage = Stage::Step {
            index: 3,
            label: String::from("rename *otto*.go"),
        };
        assert_eq!(stage.to_string(), "step 3 (rename *otto*.go)");
        assert_eq!(Stage::Verify(Phase::Post).to_string(), "post-verification");
    }
}
