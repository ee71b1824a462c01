//! License text stamped into every file and embedded in the generated docs.
//!
//! A template may carry a [`Shield`]: a placeholder spelling of the upstream
//! name that identifier rules leave alone. A late rule in the recipe restores
//! the real spelling across the tree, and the doc generator embeds the
//! restored text directly.

/// Placeholder that stands in for the real upstream name while rules run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shield {
    placeholder: String,
    restored: String,
}

impl Shield {
    /// Creates a shield that writes `placeholder` and later becomes `restored`.
    #[must_use]
    pub fn new(placeholder: impl Into<String>, restored: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            restored: restored.into(),
        }
    }

    /// The protected spelling.
    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The spelling restored at the end of the run.
    #[must_use]
    pub fn restored(&self) -> &str {
        &self.restored
    }
}

/// License text with a `{timestamp}` placeholder.
#[derive(Debug, Clone)]
pub struct LicenseTemplate {
    text: String,
    shield: Option<Shield>,
}

impl LicenseTemplate {
    /// Placeholder replaced with the run timestamp.
    pub const TIMESTAMP: &'static str = "{timestamp}";

    /// Creates a template without a shield.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shield: None,
        }
    }

    /// Attaches a shield to the template.
    #[must_use]
    pub fn with_shield(mut self, shield: Shield) -> Self {
        self.shield = Some(shield);
        self
    }

    /// The shield, if any.
    #[must_use]
    pub const fn shield(&self) -> Option<&Shield> {
        self.shield.as_ref()
    }

    /// Computes the license block for one run.
    #[must_use]
    pub fn render(&self, timestamp: &str) -> LicenseBlock {
        let text = self.text.replace(Self::TIMESTAMP, timestamp);
        let restored = match &self.shield {
            Some(shield) => text.replace(shield.placeholder(), shield.restored()),
            None => text.clone(),
        };
        LicenseBlock { text, restored }
    }
}

/// License text computed once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseBlock {
    text: String,
    restored: String,
}

impl LicenseBlock {
    /// The text as written into file headers, shield placeholder included.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text with the shield placeholder restored.
    #[must_use]
    pub fn restored_text(&self) -> &str {
        &self.restored
    }

    /// Renders the block as a line comment header followed by a blank line.
    ///
    /// Every line of the text, including a trailing empty one, receives the
    /// `prefix`.
    #[must_use]
    pub fn header(&self, prefix: &str) -> String {
        let separator = format!("\n{prefix}");
        let mut header = String::with_capacity(self.text.len() * 2);
        header.push_str(prefix);
        header.push_str(&self.text.split('\n').collect::<Vec<_>>().join(&separator));
        header.push_str("\n\n");
        header
    }
}
