//! Reader configuration

use crate::error::{ConfigError, Result};
use crate::highlight::ScrollBehavior;
use crate::paginate::{Paginator, DEFAULT_WORD_BUDGET};
use crate::render::{Renderer, DEFAULT_HIGHLIGHT_CLASS};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Word budgets that give comfortable pages
pub const RECOMMENDED_WORD_BUDGET: RangeInclusive<usize> = 200..=300;

/// Settings for the reading surfaces
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReaderConfig {
    /// Maximum words per page in page-flip mode
    pub page_word_budget: usize,

    /// Class of the narration highlight marker
    pub highlight_class: String,

    /// Scroll behavior when narration moves to a new block
    pub scroll_behavior: ScrollBehavior,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            page_word_budget: DEFAULT_WORD_BUDGET,
            highlight_class: DEFAULT_HIGHLIGHT_CLASS.to_string(),
            scroll_behavior: ScrollBehavior::default(),
        }
    }
}

impl ReaderConfig {
    /// Parse and validate a JSON configuration; missing keys take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReaderConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn with_word_budget(mut self, budget: usize) -> Self {
        self.page_word_budget = budget;
        self
    }

    pub fn with_highlight_class(mut self, class: impl Into<String>) -> Self {
        self.highlight_class = class.into();
        self
    }

    pub fn with_scroll_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.scroll_behavior = behavior;
        self
    }

    /// Check values; budgets outside the recommended range only warn
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.page_word_budget == 0 {
            return Err(ConfigError::InvalidWordBudget(0));
        }
        if self.highlight_class.trim().is_empty() {
            return Err(ConfigError::EmptyHighlightClass);
        }
        if !RECOMMENDED_WORD_BUDGET.contains(&self.page_word_budget) {
            tracing::warn!(
                "page word budget {} is outside the recommended {}-{}",
                self.page_word_budget,
                RECOMMENDED_WORD_BUDGET.start(),
                RECOMMENDED_WORD_BUDGET.end()
            );
        }
        Ok(())
    }

    pub fn paginator(&self) -> Paginator {
        Paginator::new().with_word_budget(self.page_word_budget)
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new().with_highlight_class(self.highlight_class.clone())
    }
}
