//! Taiwan business-registration number (統一編號) extraction and validation.

use super::patterns::{COMPANY_ID_LABELED, COMPANY_ID_STANDALONE, NON_DIGIT};
use super::{ExtractionMatch, FieldExtractor};

/// Positional weights of the checksum.
const WEIGHTS: [u32; 8] = [1, 2, 1, 2, 1, 2, 4, 1];

/// Business-registration number extractor.
pub struct CompanyIdExtractor {
    validate: bool,
}

impl CompanyIdExtractor {
    /// Create a new extractor with checksum validation enabled.
    pub fn new() -> Self {
        Self { validate: true }
    }

    /// Set whether to validate checksums.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    fn accepts(&self, digits: &str) -> bool {
        !self.validate || validate_company_id(digits)
    }
}

impl Default for CompanyIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CompanyIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // Marker-labelled numbers first
        for caps in COMPANY_ID_LABELED.captures_iter(text) {
            let (Some(full), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            if self.accepts(digits.as_str()) {
                results.push(
                    ExtractionMatch::new(digits.as_str().to_string(), 0.95, full.as_str())
                        .with_position(full.start(), full.end()),
                );
            }
        }

        for caps in COMPANY_ID_STANDALONE.captures_iter(text) {
            let Some(digits) = caps.get(1) else {
                continue;
            };

            if results.iter().any(|r| r.value == digits.as_str()) {
                continue;
            }

            if self.accepts(digits.as_str()) {
                results.push(
                    ExtractionMatch::new(digits.as_str().to_string(), 0.6, digits.as_str())
                        .with_position(digits.start(), digits.end()),
                );
            }
        }

        results
    }
}

/// Extract a checksum-valid, marker-labelled company id from text.
pub fn extract_company_id(text: &str) -> Option<String> {
    CompanyIdExtractor::new()
        .extract_all(text)
        .into_iter()
        .find(|m| m.confidence >= 0.9)
        .map(|m| m.value)
}

/// Remove every character that is not an ASCII digit.
pub fn digits_only(text: &str) -> String {
    NON_DIGIT.replace_all(text, "").into_owned()
}

/// Validate a Taiwan business-registration number.
///
/// Each digit is multiplied by its weight `[1,2,1,2,1,2,4,1]` and products are
/// reduced to one digit by repeated digit sums (28 -> 10 -> 1). The check value
/// is `(10 - s % 10) % 10` where `s` is the sum over the first seven reduced
/// products; it must equal the eighth digit. When the seventh digit is 7 its
/// product may also count as 0, so `(check + 1) % 10` is accepted too.
pub fn validate_company_id(company_id: &str) -> bool {
    if company_id.len() != 8 || !company_id.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u32> = company_id.chars().filter_map(|c| c.to_digit(10)).collect();

    let sum: u32 = digits
        .iter()
        .take(7)
        .zip(WEIGHTS.iter())
        .map(|(d, w)| reduce(d * w))
        .sum();

    let check = (10 - sum % 10) % 10;
    let last = digits[7];

    check == last || (digits[6] == 7 && (check + 1) % 10 == last)
}

fn reduce(mut value: u32) -> u32 {
    while value >= 10 {
        value = value / 10 + value % 10;
    }
    value
}
