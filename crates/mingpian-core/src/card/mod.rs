//! Business-card parsing pipeline.
//!
//! Stages run in a fixed order, each taking the record by value and handing
//! it on: [`structure::analyze`], [`assign::assign_fields`],
//! [`context::refine`], [`fallback::resolve`], [`finalize::finalize`].

pub mod assign;
pub mod context;
pub mod fallback;
pub mod finalize;
mod parser;
pub mod rules;
pub mod structure;

pub use parser::{CardParser, ParseResult};

use crate::models::ContactRecord;
use crate::ocr::RecognitionResult;

/// Trait for card extractors.
pub trait CardExtractor {
    /// Build a contact record from recognizer output and the raw image.
    fn extract(&self, recognition: &RecognitionResult, image: Option<Vec<u8>>) -> ContactRecord;

    /// Build a contact record from plain texts in reading order.
    fn extract_from_texts(&self, texts: &[String]) -> ContactRecord;
}
