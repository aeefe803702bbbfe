//! Card parser driving the full pipeline.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::assign::assign_fields;
use super::context::refine;
use super::fallback::resolve;
use super::finalize::finalize;
use super::rules::patterns::WHITESPACE_RUN;
use super::rules::Classifier;
use super::structure::analyze;
use super::CardExtractor;
use crate::correction::CorrectionRuleSet;
use crate::models::{ContactRecord, ParserConfig};
use crate::ocr::{RecognitionResult, TextFragment};

/// Result of parsing one card.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    /// Extracted contact.
    pub record: ContactRecord,
    /// Fragment texts after correction and cleanup, in sequence order.
    pub cleaned_texts: Vec<String>,
    /// Parsing warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Business-card parser.
///
/// ```
/// use mingpian_core::CardParser;
///
/// let result = CardParser::new().parse_texts(&["王小明", "0933 231 545"]);
/// assert_eq!(result.record.name.full(), "王小明");
/// assert_eq!(result.record.phone, "0933231545");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CardParser {
    rules: CorrectionRuleSet,
    config: ParserConfig,
}

impl CardParser {
    /// Create a parser with built-in correction rules and default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the correction rule set (built-ins plus any user overrides).
    pub fn with_rules(mut self, rules: CorrectionRuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the whole parser configuration.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Set business-registration checksum validation.
    pub fn with_company_id_validation(mut self, validate: bool) -> Self {
        self.config.validate_company_id = validate;
        self
    }

    /// Set minimum fragment confidence.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.config.min_confidence = confidence;
        self
    }

    /// Set how many preceding fragments serve as phone context.
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.config.context_window = window;
        self
    }

    pub fn rules(&self) -> &CorrectionRuleSet {
        &self.rules
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Apply correction rules and collapse whitespace.
    ///
    /// Returns `None` for text that is empty afterwards.
    pub fn clean(&self, text: &str) -> Option<String> {
        let corrected = self.rules.correct(text);
        let cleaned = WHITESPACE_RUN
            .replace_all(corrected.trim(), " ")
            .into_owned();

        (!cleaned.is_empty()).then_some(cleaned)
    }

    /// Parse recognizer fragments into a contact record.
    pub fn parse(&self, fragments: &[TextFragment], image: Option<Vec<u8>>) -> ParseResult {
        let start = Utc::now();
        let mut warnings = Vec::new();

        let mut confident: Vec<&TextFragment> = fragments
            .iter()
            .filter(|f| f.confidence >= self.config.min_confidence)
            .collect();
        confident.sort_by_key(|f| f.sequence_position);

        let dropped = fragments.len() - confident.len();
        if dropped > 0 {
            debug!(
                "Ignored {} fragments below confidence {}",
                dropped, self.config.min_confidence
            );
        }

        let cleaned_texts: Vec<String> = confident
            .iter()
            .filter_map(|f| self.clean(&f.text))
            .collect();

        info!("Parsing card from {} fragments", cleaned_texts.len());
        for (index, text) in cleaned_texts.iter().enumerate() {
            debug!("{}: [{}]", index + 1, text);
        }

        if cleaned_texts.is_empty() {
            warnings.push("No usable text found".to_string());
        }

        let record = self.run_pipeline(&cleaned_texts, image);

        for field in record.missing_fields() {
            warnings.push(format!("Could not extract {field}"));
        }

        let processing_time_ms = (Utc::now() - start).num_milliseconds().max(0) as u64;

        info!(
            "Parsed card in {}ms ({} warnings)",
            processing_time_ms,
            warnings.len()
        );

        ParseResult {
            record,
            cleaned_texts,
            warnings,
            processing_time_ms,
        }
    }

    /// Parse plain texts given in reading order with full confidence.
    pub fn parse_texts<S: AsRef<str>>(&self, texts: &[S]) -> ParseResult {
        self.parse(&TextFragment::from_texts(texts), None)
    }

    fn run_pipeline(&self, texts: &[String], image: Option<Vec<u8>>) -> ContactRecord {
        let config = &self.config;
        let classifier = Classifier::new(&config.templates);

        let structure = analyze(texts, config.context_window, &classifier);
        debug!("Bucketed {} fragments", structure.len());

        let record = ContactRecord::new().with_image(image);
        let record = assign_fields(record, &structure, config);
        let record = refine(record, texts, config, &classifier);
        let record = resolve(record, texts, &self.rules, config, &classifier);
        finalize(record, config)
    }
}

impl CardExtractor for CardParser {
    fn extract(&self, recognition: &RecognitionResult, image: Option<Vec<u8>>) -> ContactRecord {
        self.parse(&recognition.fragments, image).record
    }

    fn extract_from_texts(&self, texts: &[String]) -> ContactRecord {
        self.parse_texts(texts).record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardTemplate;
    use crate::ocr::BoundingBox;
    use std::collections::BTreeMap;

    #[test]
    fn test_clean() {
        let parser = CardParser::new();

        assert_eq!(parser.clean("  a \n  b\tc "), Some("a b c".to_string()));
        assert_eq!(parser.clean("   "), None);
        assert_eq!(parser.clean("L|NE TAX|"), Some("LINE TAXI".to_string()));
    }

    #[test]
    fn test_filters_low_confidence_and_sorts() {
        let fragments = vec![
            TextFragment::new("0933 231 545", 0.9, 2),
            TextFragment::new("王小明", 0.95, 0),
            TextFragment::new("陳大同", 0.1, 1),
        ];

        let result = CardParser::new().parse(&fragments, None);

        assert_eq!(result.cleaned_texts, vec!["王小明", "0933 231 545"]);
        assert_eq!(result.record.name.full(), "王小明");
        assert_eq!(result.record.phone, "0933231545");
    }

    #[test]
    fn test_min_confidence_override() {
        let fragments = vec![TextFragment::new("王小明", 0.2, 0)];

        let strict = CardParser::new().parse(&fragments, None);
        assert!(strict.record.name.is_empty());
        assert!(strict.warnings.iter().any(|w| w == "No usable text found"));

        let lenient = CardParser::new().with_min_confidence(0.1).parse(&fragments, None);
        assert_eq!(lenient.record.name.full(), "王小明");
    }

    #[test]
    fn test_image_passthrough() {
        let image = vec![0xff, 0xd8, 0xff, 0xe0];
        let fragments = vec![TextFragment::new("王小明", 1.0, 0)
            .with_bounding_box(BoundingBox::new(0.1, 0.1, 0.3, 0.05))];

        let result = CardParser::new().parse(&fragments, Some(image.clone()));
        assert_eq!(result.record.image, Some(image));
    }

    #[test]
    fn test_empty_input_gives_empty_record() {
        let result = CardParser::new().parse(&[], None);

        assert!(result.record.is_empty());
        assert!(result.cleaned_texts.is_empty());
        assert!(result.warnings.len() > 1);
    }

    #[test]
    fn test_custom_rules_apply_after_builtins() {
        let mut overrides = BTreeMap::new();
        overrides.insert("Taxl".to_string(), "Taxi".to_string());
        let rules = CorrectionRuleSet::builtin().with_overrides(&overrides);

        let result = CardParser::new()
            .with_rules(rules)
            .parse_texts(&["Taxl Go Co."]);

        assert_eq!(result.record.company, "Taxi Go Co.");
    }

    #[test]
    fn test_warnings_list_missing_fields() {
        let result = CardParser::new().parse_texts(&["王小明"]);

        assert!(result.warnings.contains(&"Could not extract phone".to_string()));
        assert!(!result.warnings.contains(&"Could not extract name".to_string()));
    }

    #[test]
    fn test_templates_feed_classifier() {
        let config = ParserConfig {
            templates: vec![CardTemplate {
                label: "sample".to_string(),
                company_hints: vec!["Acme Works".to_string()],
                name_hints: Vec::new(),
                default_website: Some("acme.example.com".to_string()),
            }],
            ..ParserConfig::default()
        };

        let result = CardParser::new()
            .with_config(config)
            .parse_texts(&["Acme Works", "王小明"]);

        assert_eq!(result.record.company, "Acme Works");
        assert_eq!(result.record.name.full(), "王小明");
        assert_eq!(result.record.website, "https://www.acme.example.com");
    }

    #[test]
    fn test_extractor_trait() {
        let parser = CardParser::new();
        let texts = vec!["王小明".to_string(), "a@example.com".to_string()];

        let record = parser.extract_from_texts(&texts);
        assert_eq!(record.email, "a@example.com");

        let recognition = RecognitionResult::new(TextFragment::from_texts(&texts));
        let record = parser.extract(&recognition, None);
        assert_eq!(record.name.full(), "王小明");
    }
}
