//! Core library for business-card text parsing.
//!
//! This crate provides:
//! - Correction rules for systematic OCR substitution errors, with persisted
//!   user overrides
//! - Field classifiers and the Taiwan business-registration checksum
//! - A multi-pass pipeline turning recognizer fragments into a contact record
//! - Parser configuration and known-card templates

pub mod card;
pub mod correction;
pub mod error;
pub mod models;
pub mod ocr;

pub use card::rules::{format_phone, validate_company_id};
pub use card::{CardExtractor, CardParser, ParseResult};
pub use correction::{CorrectionRule, CorrectionRuleSet, CustomRuleStore, JsonFileStore, KeyValueStore};
pub use error::{MingpianError, RecognitionError, Result, StoreError};
pub use models::{BilingualText, CardTemplate, ContactRecord, MingpianConfig, ParserConfig, PhoneSlot};
pub use ocr::{BoundingBox, RecognitionResult, TextFragment};
