//! Phone number cleanup, typing and formatting.

use serde::{Deserialize, Serialize};

use super::keywords::{contains_label, FAX_CONTEXT, WORK_CONTEXT};
use super::patterns::{MOBILE_MARKER, MOBILE_SEARCH, PHONE_NOISE};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::PhoneSlot;

/// Type of a phone line as inferred from its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneKind {
    Mobile,
    Work,
    Fax,
    /// No context keyword and no mobile prefix.
    Unspecified,
}

impl PhoneKind {
    /// Slot a number of this kind is stored in first.
    pub fn slot(self) -> PhoneSlot {
        match self {
            PhoneKind::Work => PhoneSlot::Work,
            PhoneKind::Fax => PhoneSlot::Fax,
            PhoneKind::Mobile | PhoneKind::Unspecified => PhoneSlot::Mobile,
        }
    }
}

/// Mobile number extractor for free text.
pub struct PhoneExtractor;

impl FieldExtractor for PhoneExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        MOBILE_SEARCH
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(canonical_mobile(m.as_str()), 0.9, m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Strip whitespace, parentheses and dashes.
pub fn normalize_phone(phone: &str) -> String {
    PHONE_NOISE.replace_all(phone, "").into_owned()
}

/// Map OCR look-alikes to digits: `l`, `I`, `|` to 1 and `O`, `o` to 0.
///
/// Only meant for strings already known to be phone numbers.
pub fn correct_phone(phone: &str) -> String {
    phone
        .chars()
        .map(|c| match c {
            'l' | 'I' | '|' => '1',
            'O' | 'o' => '0',
            other => other,
        })
        .collect()
}

/// Group a Taiwan mobile number as `+886 9XX XXX XXX`.
///
/// Anything that is not `+8869` followed by eight digits once non-digits are
/// removed is returned unchanged.
pub fn format_phone(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    let is_mobile = cleaned.len() == 13
        && cleaned.starts_with("+8869")
        && cleaned[1..].bytes().all(|b| b.is_ascii_digit());

    if is_mobile {
        let national = &cleaned[4..];
        return format!("+886 {} {} {}", &national[0..3], &national[3..6], &national[6..9]);
    }

    phone.to_string()
}

/// Decide a phone's type from the text around it.
///
/// Fax keywords win over office keywords; without either a Taiwan mobile
/// prefix marks a mobile line.
pub fn phone_kind(phone: &str, context: &str) -> PhoneKind {
    let context = context.to_lowercase();

    if contains_label(&context, FAX_CONTEXT) {
        return PhoneKind::Fax;
    }
    if contains_label(&context, WORK_CONTEXT) {
        return PhoneKind::Work;
    }

    let digits = normalize_phone(phone);
    if digits.starts_with("09") || digits.starts_with("+8869") || digits.starts_with("8869") {
        PhoneKind::Mobile
    } else {
        PhoneKind::Unspecified
    }
}

/// Check if text carries a Taiwan mobile prefix (`+886`, `886` or `09xx`).
pub fn has_mobile_marker(text: &str) -> bool {
    MOBILE_MARKER.is_match(text)
}

/// Find a Taiwan mobile number inside mixed text.
///
/// The result has separators removed and a `+` added to a bare `886` prefix.
pub fn extract_mobile(text: &str) -> Option<String> {
    PhoneExtractor.extract(text).map(|m| m.value)
}

fn canonical_mobile(raw: &str) -> String {
    let digits = normalize_phone(raw);
    if digits.starts_with("886") {
        format!("+{digits}")
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::CorrectionRuleSet;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+886 933-231 545"), "+886933231545");
        assert_eq!(normalize_phone("(02) 2345-6789"), "0223456789");
    }

    #[test]
    fn test_correct_phone() {
        assert_eq!(correct_phone("+88693323l545"), "+886933231545");
        assert_eq!(correct_phone("O933 |23 I545"), "0933 123 1545");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("+886933231545"), "+886 933 231 545");
        assert_eq!(format_phone("+886-933-231-545"), "+886 933 231 545");
        assert_eq!(format_phone("0223456789"), "0223456789");
        assert_eq!(format_phone("+88693323154"), "+88693323154");
    }

    #[test]
    fn test_format_phone_idempotent() {
        let once = format_phone("+886933231545");
        assert_eq!(format_phone(&once), once);

        let untouched = format_phone("(02) 2345-6789");
        assert_eq!(format_phone(&untouched), untouched);
    }

    #[test]
    fn test_mangled_mobile_digits() {
        let corrected = CorrectionRuleSet::builtin().correct("93323l545");
        assert_eq!(corrected, "933231545");
        assert_eq!(format_phone(&format!("+886{corrected}")), "+886 933 231 545");
    }

    #[test]
    fn test_phone_kind() {
        assert_eq!(phone_kind("0223456789", "Fax"), PhoneKind::Fax);
        assert_eq!(phone_kind("0223456789", "傳真"), PhoneKind::Fax);
        assert_eq!(phone_kind("0223456789", "Office"), PhoneKind::Work);
        assert_eq!(phone_kind("0223456789", "TEL"), PhoneKind::Unspecified);
        assert_eq!(phone_kind("0933231545", "Chunghwa Telecom"), PhoneKind::Mobile);
        assert_eq!(phone_kind("0223456789", "Hotel Intel"), PhoneKind::Unspecified);
        assert_eq!(phone_kind("0933231545", ""), PhoneKind::Mobile);
        assert_eq!(phone_kind("+886 933 231 545", "李亞昀"), PhoneKind::Mobile);
        assert_eq!(phone_kind("0223456789", ""), PhoneKind::Unspecified);
        assert_eq!(PhoneKind::Unspecified.slot(), PhoneSlot::Mobile);
    }

    #[test]
    fn test_extract_mobile() {
        assert_eq!(
            extract_mobile("heidie@test.com +886933231545"),
            Some("+886933231545".to_string())
        );
        assert_eq!(
            extract_mobile("M: 886 933 231 545"),
            Some("+886933231545".to_string())
        );
        assert_eq!(extract_mobile("0933-231-545 ext"), Some("0933231545".to_string()));
        assert_eq!(extract_mobile("02 2345 6789"), None);
    }

    #[test]
    fn test_mobile_marker() {
        assert!(has_mobile_marker("a@b.com +886"));
        assert!(has_mobile_marker("call 0933"));
        assert!(!has_mobile_marker("a@b.com"));
    }
}
