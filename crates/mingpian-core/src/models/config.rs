//! Configuration structures for the card parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::correction::store::DEFAULT_RULES_KEY;
use crate::error::{MingpianError, Result};
use crate::ocr::DEFAULT_MIN_CONFIDENCE;

/// Main configuration for mingpian.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MingpianConfig {
    /// Card parsing configuration.
    pub parser: ParserConfig,

    /// Custom correction rule storage.
    pub rules: RuleStoreConfig,
}

/// Card parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Fragments below this recognition confidence are ignored (0.0 - 1.0).
    pub min_confidence: f32,

    /// Number of preceding fragments consulted when deciding a phone's type.
    pub context_window: usize,

    /// Enforce the business-registration checksum on the final record.
    pub validate_company_id: bool,

    /// Map OCR look-alike characters to digits inside phone numbers.
    pub auto_correct: bool,

    /// Lowercase emails picked up by the context pass.
    pub lowercase_emails: bool,

    /// Known-card templates (company names, personal names, default website).
    pub templates: Vec<CardTemplate>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            context_window: 1,
            validate_company_id: true,
            auto_correct: true,
            lowercase_emails: false,
            templates: Vec::new(),
        }
    }
}

/// Hints for one known card layout.
///
/// Templates carry values that only make sense for a specific card (a brand
/// name, the holder's name, the company's site). They are never applied unless
/// configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTemplate {
    /// Human-readable label.
    pub label: String,

    /// Texts that identify the company (substring match).
    pub company_hints: Vec<String>,

    /// Texts that identify the card holder (substring match).
    pub name_hints: Vec<String>,

    /// Website used when the card shows none and a company hint matched.
    pub default_website: Option<String>,
}

impl CardTemplate {
    /// Check if `text` contains one of the company hints.
    pub fn matches_company(&self, text: &str) -> bool {
        self.company_hints.iter().any(|h| !h.is_empty() && text.contains(h.as_str()))
    }

    /// Check if `text` contains one of the name hints.
    pub fn matches_name(&self, text: &str) -> bool {
        self.name_hints.iter().any(|h| !h.is_empty() && text.contains(h.as_str()))
    }
}

/// Where custom correction rules are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleStoreConfig {
    /// Store file; `None` means the per-user default location.
    pub path: Option<PathBuf>,

    /// Key the rule map is stored under.
    pub key: String,
}

impl Default for RuleStoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: DEFAULT_RULES_KEY.to_string(),
        }
    }
}

impl MingpianConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let confidence = self.parser.min_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(MingpianError::Config(format!(
                "min_confidence must be between 0 and 1, got {confidence}"
            )));
        }
        if self.rules.key.is_empty() {
            return Err(MingpianError::Config("rules.key must not be empty".to_string()));
        }
        Ok(())
    }
}
