//! Documentation file generated from a template and the license block.

use crate::error::RewriteError;
use crate::license::LicenseBlock;
use crate::tree::{SourceTree, TreePath};

/// Template for a generated documentation file.
///
/// The template contains a `{license}` placeholder. The license text is
/// inserted with its continuation lines indented so it nests inside the
/// surrounding comment block.
#[derive(Debug, Clone)]
pub struct DocTemplate {
    path: TreePath,
    template: String,
    indent: String,
}

impl DocTemplate {
    /// Placeholder replaced with the license text.
    pub const LICENSE: &'static str = "{license}";

    /// Creates a template rendered to `path` with a two-space indent.
    #[must_use]
    pub fn new(path: TreePath, template: impl Into<String>) -> Self {
        Self {
            path,
            template: template.into(),
            indent: String::from("  "),
        }
    }

    /// Overrides the continuation-line indent.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Destination of the rendered file.
    #[must_use]
    pub const fn path(&self) -> &TreePath {
        &self.path
    }

    /// Renders the documentation text.
    #[must_use]
    pub fn render(&self, license: &LicenseBlock) -> String {
        let separator = format!("\n{}", self.indent);
        let indented = license
            .restored_text()
            .split('\n')
            .collect::<Vec<_>>()
            .join(&separator);
        self.template.replace(Self::LICENSE, &indented)
    }

    /// Renders and writes the file, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Io`] when the file cannot be written.
    pub fn write(&self, tree: &SourceTree, license: &LicenseBlock) -> Result<(), RewriteError> {
        tree.write(&self.path, self.render(license).as_bytes())
    }
}
