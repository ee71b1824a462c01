//! Recipes: the ordered list of edits that turns an upstream snapshot into a
//! fork.
//!
//! A [`Recipe`] is plain data. Steps run strictly in declaration order and
//! later steps may depend on the effects of earlier ones, so order is part of
//! a recipe's meaning. Recipes that need facts only known at run time (the
//! fork's import path) are produced by a [`RecipeSource`].

use std::fmt;

use refork_rewrite::{DocTemplate, LicenseTemplate, PatchSet, PruneSpec, RenameSpec, RewriteRule};

use crate::command::CommandSpec;
use crate::error::PipelineError;

/// One edit in a recipe.
#[derive(Debug, Clone)]
pub enum Step {
    /// A text rewrite rule.
    Rule(RewriteRule),
    /// A file rename.
    Rename(RenameSpec),
    /// Removal of upstream-only paths.
    Prune(PruneSpec),
    /// An external command run in the working directory.
    Command(CommandSpec),
    /// A literal unified diff.
    Patch(PatchSet),
}

impl fmt::Display for Step {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(rule) => write!(formatter, "rewrite {}: {}", rule.files(), rule.name()),
            Self::Rename(rename) => write!(
                formatter,
                "rename {}: {} -> {}",
                rename.files(),
                rename.from_token(),
                rename.to_token()
            ),
            Self::Prune(prune) => write!(formatter, "prune {}", prune.paths()),
            Self::Command(command) => write!(formatter, "$ {command}"),
            Self::Patch(patch) => write!(formatter, "patch -p{}", patch.strip()),
        }
    }
}

/// Everything a fork run needs besides the environment.
#[derive(Debug, Clone)]
pub struct Recipe {
    name: String,
    license: LicenseTemplate,
    header_prefix: String,
    pre_verify: Vec<CommandSpec>,
    steps: Vec<Step>,
    doc: Option<DocTemplate>,
    post_verify: Vec<CommandSpec>,
}

impl Recipe {
    /// Default comment prefix for license headers.
    pub const DEFAULT_HEADER_PREFIX: &'static str = "// ";

    /// Creates an empty recipe.
    #[must_use]
    pub fn new(name: impl Into<String>, license: LicenseTemplate) -> Self {
        Self {
            name: name.into(),
            license,
            header_prefix: String::from(Self::DEFAULT_HEADER_PREFIX),
            pre_verify: Vec::new(),
            steps: Vec::new(),
            doc: None,
            post_verify: Vec::new(),
        }
    }

    /// Overrides the line comment prefix used for license headers.
    #[must_use]
    pub fn with_header_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.header_prefix = prefix.into();
        self
    }

    /// Adds a verification command run before any rewrite.
    #[must_use]
    pub fn verify_before(mut self, command: CommandSpec) -> Self {
        self.pre_verify.push(command);
        self
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends a rewrite rule step.
    #[must_use]
    pub fn rule(self, rule: RewriteRule) -> Self {
        self.step(Step::Rule(rule))
    }

    /// Sets the documentation file generated after the steps.
    #[must_use]
    pub fn with_doc(mut self, doc: DocTemplate) -> Self {
        self.doc = Some(doc);
        self
    }

    /// Adds a verification command run after the docs are generated.
    #[must_use]
    pub fn verify_after(mut self, command: CommandSpec) -> Self {
        self.post_verify.push(command);
        self
    }

    /// Recipe name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// License template.
    #[must_use]
    pub const fn license(&self) -> &LicenseTemplate {
        &self.license
    }

    /// Line comment prefix for license headers.
    #[must_use]
    pub fn header_prefix(&self) -> &str {
        &self.header_prefix
    }

    /// Verification commands run before rewriting.
    #[must_use]
    pub fn pre_verify(&self) -> &[CommandSpec] {
        &self.pre_verify
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Documentation template, if any.
    #[must_use]
    pub const fn doc(&self) -> Option<&DocTemplate> {
        self.doc.as_ref()
    }

    /// Verification commands run after doc generation.
    #[must_use]
    pub fn post_verify(&self) -> &[CommandSpec] {
        &self.post_verify
    }

    /// One line per stage, in execution order.
    #[must_use]
    pub fn plan(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.steps.len() + 4);
        lines.push(String::from("load upstream snapshot"));
        lines.extend(self.pre_verify.iter().map(|command| format!("verify: $ {command}")));
        lines.extend(
            self.steps
                .iter()
                .enumerate()
                .map(|(index, step)| format!("{:>2}. {step}", index + 1)),
        );
        if let Some(doc) = &self.doc {
            lines.push(format!("generate {}", doc.path()));
        }
        lines.extend(self.post_verify.iter().map(|command| format!("verify: $ {command}")));
        lines
    }
}

/// Run-time facts a recipe may embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeContext {
    import_path: String,
}

impl RecipeContext {
    /// Creates a context for a fork published under `import_path`.
    #[must_use]
    pub fn new(import_path: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
        }
    }

    /// The fork's import path.
    #[must_use]
    pub fn import_path(&self) -> &str {
        &self.import_path
    }
}

/// Produces a recipe once the run-time context is known.
pub trait RecipeSource {
    /// Import path of the upstream project, relative to the search root.
    fn upstream_import_path(&self) -> &str;

    /// Builds the recipe.
    ///
    /// # Errors
    ///
    /// Returns an error when a rule, glob or command in the recipe is
    /// malformed.
    fn recipe(&self, context: &RecipeContext) -> Result<Recipe, PipelineError>;
}
