//! Final normalization and validation of a contact record.

use tracing::debug;

use super::rules::{
    correct_phone, digits_only, extract_mobile, format_phone, is_valid_email, name_from_email,
    normalize_website, validate_company_id,
};
use crate::models::{ContactRecord, ParserConfig, PhoneSlot};

/// Normalize formats and clear fields that fail validation.
pub fn finalize(mut record: ContactRecord, config: &ParserConfig) -> ContactRecord {
    let name = record.name.full().trim().to_string();
    record.set_name(name);
    record.company = record.company.trim().to_string();
    let position = record.position.full().trim().to_string();
    record.set_position(position);

    for slot in PhoneSlot::CASCADE {
        let phone = record.phone(slot).trim();
        if phone.is_empty() {
            continue;
        }
        let phone = if config.auto_correct {
            correct_phone(phone)
        } else {
            phone.to_string()
        };
        *record.phone_mut(slot) = format_phone(&phone);
    }

    if !record.email.is_empty() && !is_valid_email(&record.email) {
        debug!("Clearing invalid email [{}]", record.email);
        record.email.clear();
    }
    if !record.secondary_email.is_empty() && !is_valid_email(&record.secondary_email) {
        debug!("Clearing invalid secondary email [{}]", record.secondary_email);
        record.secondary_email.clear();
    }
    if record.email.is_empty() && !record.secondary_email.is_empty() {
        record.email = std::mem::take(&mut record.secondary_email);
    }

    if record.name.is_empty() && !record.email.is_empty() {
        let name = name_from_email(&record.email);
        if !name.is_empty() {
            debug!("Name from email: {}", name);
            record.set_name(name);
        }
    }

    if !record.company_id.is_empty() {
        let digits = digits_only(&record.company_id);
        let valid = digits.len() == 8
            && (!config.validate_company_id || validate_company_id(&digits));
        if valid {
            record.company_id = digits;
        } else {
            debug!("Clearing company id [{}]", record.company_id);
            record.company_id.clear();
        }
    }

    if !record.website.is_empty() {
        if is_contaminated_website(&record.website) {
            debug!("Discarding website [{}]", record.website);
            record.website.clear();
        } else {
            record.website = normalize_website(&record.website);
        }
    }

    record
}

/// A website that swallowed part of an email or phone run.
fn is_contaminated_website(website: &str) -> bool {
    website.contains('@')
        || website.contains("+886")
        || website.chars().any(char::is_whitespace)
        || extract_mobile(website).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clears_invalid_email() {
        let mut record = ContactRecord::new();
        record.email = "not-an-email".to_string();

        let record = finalize(record, &ParserConfig::default());
        assert_eq!(record.email, "");
        assert!(record.name.is_empty());
    }

    #[test]
    fn test_promotes_secondary_email() {
        let mut record = ContactRecord::new();
        record.email = "broken@".to_string();
        record.secondary_email = "heidie@taxigo.com.tw".to_string();

        let record = finalize(record, &ParserConfig::default());
        assert_eq!(record.email, "heidie@taxigo.com.tw");
        assert!(record.secondary_email.is_empty());
    }

    #[test]
    fn test_formats_phones() {
        let mut record = ContactRecord::new();
        record.phone = "+88693323l545".to_string();
        record.work_phone = "(02) 2345-6789".to_string();

        let record = finalize(record, &ParserConfig::default());
        assert_eq!(record.phone, "+886 933 231 545");
        assert_eq!(record.work_phone, "(02) 2345-6789");

        let again = finalize(record.clone(), &ParserConfig::default());
        assert_eq!(again.phone, record.phone);
    }

    #[test]
    fn test_name_from_email() {
        let mut record = ContactRecord::new();
        record.email = "heidie.lin@taxigo.com.tw".to_string();

        let record = finalize(record, &ParserConfig::default());
        assert_eq!(record.name.full(), "Heidie Lin");
        assert_eq!(record.name.latin(), "Heidie Lin");
    }

    #[test]
    fn test_trims_and_rederives_parts() {
        let mut record = ContactRecord::new();
        record.set_name("  Heidie Lin 李亞畇 ");
        record.set_position(" Finance | 資深會計專員 ");
        record.company = " LINE TAXI ".to_string();

        let record = finalize(record, &ParserConfig::default());
        assert_eq!(record.name.full(), "Heidie Lin 李亞畇");
        assert_eq!(record.name.cjk(), "李亞畇");
        assert_eq!(record.position.full(), "Finance | 資深會計專員");
        assert_eq!(record.company, "LINE TAXI");
    }

    #[test]
    fn test_company_id_guard() {
        let mut record = ContactRecord::new();
        record.company_id = "5262-1439".to_string();
        let record = finalize(record, &ParserConfig::default());
        assert_eq!(record.company_id, "52621439");

        let mut record = ContactRecord::new();
        record.company_id = "12345678".to_string();
        let record = finalize(record, &ParserConfig::default());
        assert!(record.company_id.is_empty());

        let config = ParserConfig {
            validate_company_id: false,
            ..ParserConfig::default()
        };
        let mut record = ContactRecord::new();
        record.company_id = "12345678".to_string();
        assert_eq!(finalize(record, &config).company_id, "12345678");

        let mut record = ContactRecord::new();
        record.company_id = "1234".to_string();
        assert!(finalize(record, &config).company_id.is_empty());
    }

    #[test]
    fn test_discards_contaminated_website() {
        let mut record = ContactRecord::new();
        record.website = "https://www.heidie@test.com +886933231545".to_string();
        assert!(finalize(record, &ParserConfig::default()).website.is_empty());

        let mut record = ContactRecord::new();
        record.website = "linetaxi.com.tw".to_string();
        assert_eq!(
            finalize(record, &ParserConfig::default()).website,
            "https://www.linetaxi.com.tw"
        );
    }
}
