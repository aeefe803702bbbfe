//! Rule-based classifiers and field helpers for business cards.

pub mod classify;
pub mod company_id;
pub mod contact;
pub mod keywords;
pub mod patterns;
pub mod phone;

pub use classify::{classify, Classifier, FieldCategory, PRECEDENCE};
pub use company_id::{digits_only, extract_company_id, validate_company_id, CompanyIdExtractor};
pub use contact::{
    bilingual_name, canonical_position, extract_email, extract_social, is_valid_email,
    name_from_email, normalize_website,
};
pub use phone::{
    correct_phone, extract_mobile, format_phone, has_mobile_marker, normalize_phone, phone_kind,
    PhoneExtractor, PhoneKind,
};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in text, with a confidence score.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
