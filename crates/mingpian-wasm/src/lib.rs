//! WASM bindings for business-card OCR parsing.
//!
//! Hosts run their own text recognizer and hand the fragments over; the
//! parser returns the contact record as a plain JS object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use mingpian_core::{CardParser, CorrectionRuleSet, ParseResult, ParserConfig, TextFragment};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Fragments as passed from JS: full fragment objects or bare strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum FragmentsInput {
    Fragments(Vec<TextFragment>),
    Texts(Vec<String>),
}

fn read_fragments(value: JsValue) -> Result<Vec<TextFragment>, JsValue> {
    let input: FragmentsInput =
        serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;

    Ok(match input {
        FragmentsInput::Fragments(fragments) => fragments,
        FragmentsInput::Texts(texts) => TextFragment::from_texts(&texts),
    })
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // Plain objects instead of JS Maps for the social media table.
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn log_warnings(result: &ParseResult) {
    for warning in &result.warnings {
        web_sys::console::debug_1(&JsValue::from_str(warning));
    }
}

/// Parse recognized fragments into a contact record.
///
/// `fragments` is an array of `{text, confidence, sequence_position}` objects
/// or of plain strings. The optional image bytes are attached to the record.
#[wasm_bindgen]
pub fn parse_card(fragments: JsValue, image: Option<Vec<u8>>) -> Result<JsValue, JsValue> {
    let fragments = read_fragments(fragments)?;
    let result = CardParser::new().parse(&fragments, image);
    log_warnings(&result);
    to_js(&result.record)
}

/// Parse with user correction rules (`{wrong: correct}`) applied after the built-ins.
#[wasm_bindgen]
pub fn parse_card_with_rules(fragments: JsValue, rules: JsValue) -> Result<JsValue, JsValue> {
    let fragments = read_fragments(fragments)?;
    let overrides: BTreeMap<String, String> =
        serde_wasm_bindgen::from_value(rules).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let parser = CardParser::new().with_rules(CorrectionRuleSet::builtin().with_overrides(&overrides));
    let result = parser.parse(&fragments, None);
    log_warnings(&result);
    to_js(&result.record)
}

/// Validate a Taiwan business-registration number.
#[wasm_bindgen]
pub fn validate_company_id(id: &str) -> bool {
    mingpian_core::validate_company_id(id)
}

/// Apply the built-in correction rules to a piece of text.
#[wasm_bindgen]
pub fn correct_text(text: &str) -> String {
    CorrectionRuleSet::builtin().correct(text)
}

/// Format a Taiwan mobile number as `+886 XXX XXX XXX`.
#[wasm_bindgen]
pub fn format_phone(phone: &str) -> String {
    mingpian_core::format_phone(phone)
}

/// Stateful reader for hosts that stream fragments in one at a time.
#[wasm_bindgen]
pub struct CardReader {
    fragments: Vec<TextFragment>,
    overrides: BTreeMap<String, String>,
    config: ParserConfig,
}

#[wasm_bindgen]
impl CardReader {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
            overrides: BTreeMap::new(),
            config: ParserConfig::default(),
        }
    }

    /// Add a fragment; it is ordered after every fragment added before it.
    #[wasm_bindgen]
    pub fn add_fragment(&mut self, text: &str, confidence: f32) {
        let position = self.fragments.len();
        self.fragments.push(TextFragment::new(text, confidence, position));
    }

    /// Add or replace a correction override.
    #[wasm_bindgen]
    pub fn add_rule(&mut self, wrong: &str, correct: &str) {
        self.overrides.insert(wrong.to_string(), correct.to_string());
    }

    /// Enforce the business-registration checksum.
    #[wasm_bindgen]
    pub fn set_validate_company_id(&mut self, validate: bool) {
        self.config.validate_company_id = validate;
    }

    /// Number of preceding fragments used to type a phone number.
    #[wasm_bindgen]
    pub fn set_context_window(&mut self, window: usize) {
        self.config.context_window = window;
    }

    #[wasm_bindgen(getter)]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Drop all fragments, keeping rules and settings.
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    /// Parse the collected fragments.
    ///
    /// Returns `{record, cleaned_texts, warnings, processing_time_ms}`.
    #[wasm_bindgen]
    pub fn parse(&self, image: Option<Vec<u8>>) -> Result<JsValue, JsValue> {
        let parser = CardParser::new()
            .with_rules(CorrectionRuleSet::builtin().with_overrides(&self.overrides))
            .with_config(self.config.clone());

        let result = parser.parse(&self.fragments, image);
        log_warnings(&result);
        to_js(&result)
    }
}

impl Default for CardReader {
    fn default() -> Self {
        Self::new()
    }
}
