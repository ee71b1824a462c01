//! Applies rewrite rules to a source tree.
//!
//! Rules run strictly in declaration order; each rule sees the tree exactly as
//! the previous rule left it. Within a rule, files are visited in sorted path
//! order. Files that are not valid UTF-8 are skipped and logged.

use tracing::debug;

use crate::REWRITE_TARGET;
use crate::error::RewriteError;
use crate::rule::RewriteRule;
use crate::tree::SourceTree;

/// Engine for applying text rewrite rules to a [`SourceTree`].
#[derive(Debug)]
pub struct RuleEngine<'tree> {
    tree: &'tree SourceTree,
}

impl<'tree> RuleEngine<'tree> {
    /// Creates an engine operating on `tree`.
    #[must_use]
    pub const fn new(tree: &'tree SourceTree) -> Self {
        Self { tree }
    }

    /// Applies one rule to every file it selects, writing changed files.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when a file cannot be read or written and
    /// [`RewriteError::RuleMatchedNothing`] when a strict rule changes nothing.
    pub fn apply(&self, rule: &RewriteRule) -> Result<RuleReport, RewriteError> {
        let mut report = RuleReport::new(rule.name());

        for path in self.tree.select(rule.files())? {
            let bytes = self.tree.read(&path)?;
            let Ok(text) = String::from_utf8(bytes) else {
                debug!(
                    target: REWRITE_TARGET,
                    rule = rule.name(),
                    file = %path,
                    "skipping file that is not valid UTF-8"
                );
                continue;
            };

            let rewrite = rule.apply_to(&text);
            if !rewrite.has_changes() {
                continue;
            }
            report.replacements = report.replacements.saturating_add(rewrite.replacements());
            if rewrite.output() != text {
                self.tree.write(&path, rewrite.output().as_bytes())?;
                report.files_changed = report.files_changed.saturating_add(1);
            }
        }

        debug!(
            target: REWRITE_TARGET,
            rule = rule.name(),
            files_changed = report.files_changed,
            replacements = report.replacements,
            "applied rewrite rule"
        );

        if rule.requires_match() && report.replacements == 0 {
            return Err(RewriteError::RuleMatchedNothing {
                rule: rule.name().to_owned(),
            });
        }
        Ok(report)
    }

    /// Applies rules in sequence, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`RuleEngine::apply`].
    pub fn apply_all<'rule, I>(&self, rules: I) -> Result<RewriteReport, RewriteError>
    where
        I: IntoIterator<Item = &'rule RewriteRule>,
    {
        let mut report = RewriteReport::default();
        for rule in rules {
            report.rules.push(self.apply(rule)?);
        }
        Ok(report)
    }
}

/// Effect of one rule on the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleReport {
    rule: String,
    files_changed: usize,
    replacements: usize,
}

impl RuleReport {
    fn new(rule: &str) -> Self {
        Self {
            rule: rule.to_owned(),
            files_changed: 0,
            replacements: 0,
        }
    }

    /// Name of the rule.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Number of files whose content changed.
    #[must_use]
    pub const fn files_changed(&self) -> usize {
        self.files_changed
    }

    /// Number of substitutions made or lines deleted.
    #[must_use]
    pub const fn replacements(&self) -> usize {
        self.replacements
    }
}

/// Effect of a sequence of rules on the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    rules: Vec<RuleReport>,
}

impl RewriteReport {
    /// Per-rule reports in application order.
    #[must_use]
    pub fn rules(&self) -> &[RuleReport] {
        &self.rules
    }

    /// Total replacements across all rules.
    #[must_use]
    pub fn total_replacements(&self) -> usize {
        self.rules
            .iter()
            .fold(0_usize, |acc, rule| acc.saturating_add(rule.replacements))
    }

    /// Returns true when any rule changed any file.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.rules.iter().any(|rule| rule.files_changed > 0)
    }
}
