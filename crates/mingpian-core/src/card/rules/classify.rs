//! Field classifiers and their precedence.
//!
//! Every predicate is independent; a text may satisfy several. [`PRECEDENCE`]
//! fixes which category wins: high-precision patterns (phone, email, website)
//! come before the looser keyword heuristics.

use serde::{Deserialize, Serialize};

use super::keywords::{
    contains_any, ADDRESS_KEYWORDS, BUSINESS_TERMS, COMPANY_KEYWORDS, POSITION_KEYWORDS,
    WEBSITE_KEYWORDS,
};
use super::patterns::{
    CJK_NAME, COMPANY_ID, EMAIL_STRICT, LATIN_NAME, PHONE_GROUPED, PHONE_INTERNATIONAL,
    PHONE_TW_NATIONAL,
};
use super::phone::normalize_phone;
use crate::models::config::CardTemplate;

/// Category a fragment is bucketed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    Phone,
    Email,
    Website,
    Address,
    CompanyId,
    Position,
    Company,
    Name,
    Other,
}

/// A classifier predicate.
pub type Predicate = fn(&str) -> bool;

/// Classifiers in precedence order; the first match wins.
pub const PRECEDENCE: [(FieldCategory, Predicate); 8] = [
    (FieldCategory::Phone, is_phone),
    (FieldCategory::Email, is_email),
    (FieldCategory::Website, is_website),
    (FieldCategory::Address, is_address),
    (FieldCategory::CompanyId, is_company_id),
    (FieldCategory::Position, is_position),
    (FieldCategory::Company, is_company),
    (FieldCategory::Name, is_person_name),
];

/// Classify `text` using the built-in predicates only.
pub fn classify(text: &str) -> FieldCategory {
    Classifier::default().classify(text)
}

/// Precedence classifier that also honours known-card templates.
///
/// Template company hints count as a company match and template name hints
/// as a name match, each at its own precedence level.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier<'a> {
    templates: &'a [CardTemplate],
}

impl<'a> Classifier<'a> {
    pub fn new(templates: &'a [CardTemplate]) -> Self {
        Self { templates }
    }

    /// Return the highest-precedence category `text` matches.
    pub fn classify(&self, text: &str) -> FieldCategory {
        PRECEDENCE
            .iter()
            .find(|(category, predicate)| predicate(text) || self.template_match(*category, text))
            .map(|(category, _)| *category)
            .unwrap_or(FieldCategory::Other)
    }

    /// Check a personal-name candidate against built-in rules and template hints.
    pub fn is_person_name(&self, text: &str) -> bool {
        is_person_name(text) || self.template_match(FieldCategory::Name, text)
    }

    /// Check if a template names `text` as a card holder.
    pub fn matches_template_name(&self, text: &str) -> bool {
        self.template_match(FieldCategory::Name, text)
    }

    fn template_match(&self, category: FieldCategory, text: &str) -> bool {
        match category {
            FieldCategory::Company => self.templates.iter().any(|t| t.matches_company(text)),
            FieldCategory::Name => self.templates.iter().any(|t| t.matches_name(text)),
            _ => false,
        }
    }
}

/// Taiwan national, grouped-digit or international phone number.
pub fn is_phone(text: &str) -> bool {
    let cleaned = normalize_phone(text);
    PHONE_TW_NATIONAL.is_match(&cleaned)
        || PHONE_GROUPED.is_match(&cleaned)
        || PHONE_INTERNATIONAL.is_match(&cleaned)
}

pub fn is_email(text: &str) -> bool {
    EMAIL_STRICT.is_match(text)
}

pub fn is_website(text: &str) -> bool {
    let lower = text.to_lowercase();
    contains_any(&lower, WEBSITE_KEYWORDS)
}

/// Locality/road keyword, or a long line containing a digit.
pub fn is_address(text: &str) -> bool {
    contains_any(text, ADDRESS_KEYWORDS) || (text.chars().count() > 15 && contains_digit(text))
}

/// Exactly eight digits.
pub fn is_company_id(text: &str) -> bool {
    COMPANY_ID.is_match(text)
}

pub fn is_position(text: &str) -> bool {
    contains_any(text, POSITION_KEYWORDS)
}

pub fn is_company(text: &str) -> bool {
    contains_any(text, COMPANY_KEYWORDS) && text.chars().count() > 2
}

/// Whole-string CJK or Latin name that carries no business term.
pub fn is_person_name(text: &str) -> bool {
    let length = text.chars().count();
    let is_name_format = CJK_NAME.is_match(text) || LATIN_NAME.is_match(text);

    is_name_format && !contains_business_terms(text) && (2..=20).contains(&length)
}

/// Stricter name test: 2-4 CJK characters, or two or more Latin words of two
/// letters or more.
pub fn is_likely_person_name(text: &str) -> bool {
    if contains_business_terms(text) {
        return false;
    }

    if contains_cjk(text) {
        return CJK_NAME.is_match(text);
    }

    let parts: Vec<&str> = text.split(' ').collect();
    parts.len() >= 2
        && parts
            .iter()
            .all(|p| p.len() >= 2 && p.chars().all(|c| c.is_ascii_alphabetic()))
}

pub fn contains_business_terms(text: &str) -> bool {
    contains_any(text, BUSINESS_TERMS)
}

/// Check for a CJK unified ideograph (U+4E00..U+9FFF).
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

pub fn contains_latin(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphabetic())
}

pub fn contains_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_formats() {
        assert!(is_phone("+886 933 231 545"));
        assert!(is_phone("0933-231-545"));
        assert!(is_phone("(02) 2345-6789"));
        assert!(is_phone("+44 20 7946 0958"));
        assert!(!is_phone("1234567"));
        assert!(!is_phone("Tel 02 2345 6789"));
    }

    #[test]
    fn test_email_and_website() {
        assert!(is_email("heidie@taxigo.com.tw"));
        assert!(!is_email("heidie@taxigo"));
        assert!(!is_email("mail: heidie@taxigo.com"));
        assert!(is_website("WWW.LINETAXI.COM.TW"));
        assert!(is_website("linetaxi.com.tw"));
        assert!(!is_website("LINE TAXI"));
    }

    #[test]
    fn test_address() {
        assert!(is_address("106台北市大安區安和路一段27號17樓"));
        assert!(is_address("17F, No. 27, Sec.1, Anhe Rd."));
        assert!(is_address("Building 5 Science Park West"));
        assert!(!is_address("Science Park West Wing"));
    }

    #[test]
    fn test_company_and_position() {
        assert!(is_company("LINE TAXI"));
        assert!(is_company("台灣大車隊股份有限公司"));
        assert!(!is_company("公司"));
        assert!(is_position("資深會計專員"));
        assert!(is_position("Senior Engineer"));
        assert!(!is_position("李亞昀"));
    }

    #[test]
    fn test_person_name() {
        assert!(is_person_name("李亞昀"));
        assert!(is_person_name("Heidie Lin"));
        assert!(!is_person_name("李"));
        assert!(!is_person_name("LINE TAXI"));
        assert!(!is_person_name("王大明經理"));
        assert!(!is_person_name("Heidie Lin 2"));

        assert!(is_likely_person_name("Heidie Lin"));
        assert!(!is_likely_person_name("Heidie"));
        assert!(is_likely_person_name("李亞昀"));
    }

    #[test]
    fn test_precedence() {
        // An email also matches the website keywords; email wins.
        assert_eq!(classify("heidie@taxigo.com.tw"), FieldCategory::Email);
        // Eight digits are a valid national phone number before they are an id.
        assert_eq!(classify("52621439"), FieldCategory::Phone);
        // An address keyword beats a position keyword.
        assert_eq!(classify("台北市 Senior Manager"), FieldCategory::Address);
        // A position keyword beats a company keyword.
        assert_eq!(classify("Senior Manager, ABC Corp"), FieldCategory::Position);
        assert_eq!(classify("LINE TAXI"), FieldCategory::Company);
        assert_eq!(classify("李亞昀"), FieldCategory::Name);
        assert_eq!(classify("推薦人 Ken"), FieldCategory::Other);
    }

    #[test]
    fn test_precedence_is_first_match() {
        let samples = [
            "+886 933 231 545",
            "heidie@taxigo.com.tw",
            "www.linetaxi.com.tw",
            "106台北市大安區安和路一段27號17樓",
            "Finance | 資深會計專員",
            "LINE TAXI",
            "李亞昀",
            "12345678",
            "???",
        ];

        for text in samples {
            let expected = PRECEDENCE
                .iter()
                .find(|(_, predicate)| predicate(text))
                .map(|(category, _)| *category)
                .unwrap_or(FieldCategory::Other);
            assert_eq!(classify(text), expected, "{text}");
        }
    }

    #[test]
    fn test_template_hints() {
        let templates = vec![CardTemplate {
            label: "sample".to_string(),
            company_hints: vec!["Acme Works".to_string()],
            name_hints: vec!["Heidie Lin".to_string()],
            default_website: None,
        }];
        let classifier = Classifier::new(&templates);

        assert_eq!(classify("Acme Works"), FieldCategory::Name);
        assert_eq!(classifier.classify("Acme Works"), FieldCategory::Company);
        assert_eq!(classifier.classify("Heidie Lin • 李亞畇"), FieldCategory::Name);
        assert_eq!(classify("Heidie Lin • 李亞畇"), FieldCategory::Other);
    }
}
