//! Text rewriting primitives for forking a source tree under a new identity.
//!
//! The crate works on a [`SourceTree`] in place. [`RewriteRule`]s select files
//! with a [`FileGlob`], confine themselves to a [`Scope`] and substitute or
//! delete text line by line; a [`RuleEngine`] applies them strictly in order.
//! Alongside the rules sit the structural edits a fork needs: renaming files
//! that carry the upstream name ([`RenameSpec`]), pruning upstream-only paths
//! ([`PruneSpec`]), applying a literal unified diff ([`PatchSet`]) and
//! rendering license headers and documentation ([`LicenseBlock`],
//! [`DocTemplate`]).
//!
//! Matching is purely textual. Nothing here understands the syntax of the
//! files being rewritten; correctness comes from the order in which a recipe
//! lists its rules.
//!
//! ```rust,ignore
//! use refork_rewrite::{FileGlob, Matcher, RewriteRule, RuleEngine, Scope, SourceTree};
//!
//! let tree = SourceTree::new("/work/fork");
//! let rule = RewriteRule::substitute(
//!     "receiver",
//!     FileGlob::new("value.go")?,
//!     Matcher::pattern(r"\bself\b")?,
//!     "value",
//! )
//! .within(Scope::from_line(r"^func \(self Value\)")?);
//! let report = RuleEngine::new(&tree).apply(&rule)?;
//! ```

pub mod doc;
pub mod engine;
pub mod error;
pub mod glob;
pub mod license;
pub mod patch;
pub mod prune;
pub mod rename;
pub mod rule;
pub mod scope;
pub mod tree;

#[cfg(test)]
mod tests;

pub(crate) const REWRITE_TARGET: &str = "refork::rewrite";

pub use self::doc::DocTemplate;
pub use self::engine::{RewriteReport, RuleEngine, RuleReport};
pub use self::error::RewriteError;
pub use self::glob::FileGlob;
pub use self::license::{LicenseBlock, LicenseTemplate, Shield};
pub use self::patch::{PatchError, PatchSet};
pub use self::prune::PruneSpec;
pub use self::rename::RenameSpec;
pub use self::rule::{Matcher, Occurrences, RewriteRule, RuleAction, TextRewrite};
pub use self::scope::{LineEnd, LinePattern, LineStart, Scope};
pub use self::tree::{SourceTree, TreePath, visible_entries};
