//! Context pass over the cleaned fragment sequence.
//!
//! Handles text runs the bucket pass cannot: a merged email and phone, an
//! address carrying the business-registration number, bilingual names and
//! titles, labelled social handles. Everything else is re-classified and
//! only fills fields that are still empty.

use tracing::debug;

use super::assign::{assign_email, assign_one, holds_phone, EMAIL_ENTRIES};
use super::rules::keywords::{contains_any, COMPANY_ID_MARKERS};
use super::rules::patterns::{COMPANY_ID_LABELED, COMPANY_ID_SEGMENT, COMPANY_ID_TAIL};
use super::rules::{
    bilingual_name, canonical_position, correct_phone, extract_company_id, extract_email,
    extract_mobile, extract_social, format_phone, has_mobile_marker, normalize_website,
    Classifier, FieldCategory,
};
use super::structure::context_before;
use crate::models::card::fill;
use crate::models::{ContactRecord, ParserConfig};

/// Run the context pass.
pub fn refine<S: AsRef<str>>(
    mut record: ContactRecord,
    texts: &[S],
    config: &ParserConfig,
    classifier: &Classifier,
) -> ContactRecord {
    let mut email_entries = 0;

    for (index, text) in texts.iter().enumerate() {
        let text = text.as_ref();

        if text.contains('@') && has_mobile_marker(text) {
            split_email_and_phone(&mut record, text, config);
            continue;
        }

        if contains_any(text, COMPANY_ID_MARKERS) {
            split_address_and_company_id(&mut record, text, config);
            continue;
        }

        if let Some((platform, handle)) = extract_social(text) {
            if !record.social_media.contains_key(&platform) {
                debug!("Social handle {}: {}", platform, handle);
                record.social_media.insert(platform, handle);
            }
            continue;
        }

        if let Some(name) = bilingual_name(text) {
            if record.name.is_empty() {
                debug!("Bilingual name: {}", name);
                record.set_name(name);
            }
            continue;
        }

        if let Some(position) = canonical_position(text) {
            if record.position.is_empty() {
                debug!("Bilingual position: {}", position);
                record.set_position(position);
            }
            continue;
        }

        let category = classifier.classify(text);
        if category == FieldCategory::Email {
            email_entries += 1;
            if email_entries > EMAIL_ENTRIES {
                continue;
            }
        }

        let context = context_before(texts, index, config.context_window);
        assign_one(&mut record, category, text, &context, config);
    }

    record
}

/// One run holding both an email address and a mobile number.
///
/// The run also looks like a website, so a website taken from it is released
/// for a later fragment.
fn split_email_and_phone(record: &mut ContactRecord, text: &str, config: &ParserConfig) {
    if !record.website.is_empty() && record.website == normalize_website(text) {
        debug!("Releasing website taken from merged run");
        record.website.clear();
    }

    if let Some(email) = extract_email(text) {
        if record.email.is_empty() && assign_email(record, &email, config.lowercase_emails) {
            debug!("Email from merged run: {}", email);
        }
    }

    if let Some(phone) = extract_mobile(text) {
        let phone = if config.auto_correct {
            correct_phone(&phone)
        } else {
            phone
        };
        let formatted = format_phone(&phone);

        if !holds_phone(record, &formatted) && fill(&mut record.phone, formatted.as_str()) {
            debug!("Phone from merged run: {}", formatted);
        }
    }
}

/// An address line with a labelled business-registration number.
///
/// The remainder always goes to the local address, whatever its script.
fn split_address_and_company_id(record: &mut ContactRecord, text: &str, config: &ParserConfig) {
    let company_id = if config.validate_company_id {
        extract_company_id(text)
    } else {
        COMPANY_ID_LABELED
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    };

    if let Some(id) = company_id {
        if fill(&mut record.company_id, id.as_str()) {
            debug!("Company id from labelled run: {}", id);
        }
    }

    let remainder = if COMPANY_ID_LABELED.is_match(text) {
        COMPANY_ID_SEGMENT.replace_all(text, "")
    } else {
        COMPANY_ID_TAIL.replace_all(text, "")
    };
    let address = remainder.trim().trim_matches('|').trim();

    if !address.is_empty() && fill(&mut record.address, address) {
        debug!("Address from labelled run: {}", address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(record: ContactRecord, texts: &[&str]) -> ContactRecord {
        refine(record, texts, &ParserConfig::default(), &Classifier::default())
    }

    #[test]
    fn test_merged_email_and_phone() {
        let record = run(ContactRecord::new(), &["heidie@test.com +886933231545"]);

        assert_eq!(record.email, "heidie@test.com");
        assert_eq!(record.phone, "+886 933 231 545");
    }

    #[test]
    fn test_merged_run_releases_website() {
        let mut record = ContactRecord::new();
        record.website = "https://www.heidie@test.com +886933231545".to_string();

        let record = run(record, &["heidie@test.com +886933231545", "www.linetaxi.com.tw"]);
        assert_eq!(record.website, "https://www.linetaxi.com.tw");
    }

    #[test]
    fn test_merged_run_keeps_existing_fields() {
        let mut record = ContactRecord::new();
        record.email = "first@test.com".to_string();
        record.phone = "+886933231545".to_string();

        let record = run(record, &["heidie@test.com +886 933 231 545"]);

        assert_eq!(record.email, "first@test.com");
        assert_eq!(record.phone, "+886933231545");
        assert!(record.work_phone.is_empty());
    }

    #[test]
    fn test_address_with_company_id() {
        let record = run(
            ContactRecord::new(),
            &["106台北市大安區安和路一段27號17樓 | 統一編號 52621439"],
        );

        assert_eq!(record.company_id, "52621439");
        assert_eq!(record.address, "106台北市大安區安和路一段27號17樓");
    }

    #[test]
    fn test_latin_address_with_company_id_stays_local() {
        let record = run(
            ContactRecord::new(),
            &["No. 27, Sec. 1, Anhe Rd., Taipei | 統一編號 52621439"],
        );

        assert_eq!(record.company_id, "52621439");
        assert_eq!(record.address, "No. 27, Sec. 1, Anhe Rd., Taipei");
        assert_eq!(record.english_address, "");
    }

    #[test]
    fn test_third_email_entry_is_dropped() {
        let record = run(ContactRecord::new(), &["a@x.com", "a@x.com", "b@x.com"]);

        assert_eq!(record.email, "a@x.com");
        assert_eq!(record.secondary_email, "");
    }

    #[test]
    fn test_company_id_marker_without_digits() {
        let record = run(ContactRecord::new(), &["台北市大安區安和路 統一編號"]);

        assert!(record.company_id.is_empty());
        assert_eq!(record.address, "台北市大安區安和路");
    }

    #[test]
    fn test_invalid_labelled_id_is_rejected() {
        let record = run(ContactRecord::new(), &["統一編號 12345678"]);
        assert!(record.company_id.is_empty());

        let config = ParserConfig {
            validate_company_id: false,
            ..ParserConfig::default()
        };
        let record = refine(
            ContactRecord::new(),
            &["統一編號 12345678"],
            &config,
            &Classifier::default(),
        );
        assert_eq!(record.company_id, "12345678");
    }

    #[test]
    fn test_bilingual_name_and_position() {
        let record = run(
            ContactRecord::new(),
            &["Heidie Lin • 李亞畇", "Finance I 資深會計專員"],
        );

        assert_eq!(record.name.full(), "Heidie Lin 李亞畇");
        assert_eq!(record.name.latin(), "Heidie Lin");
        assert_eq!(record.name.cjk(), "李亞畇");
        assert_eq!(record.position.full(), "Finance | 資深會計專員");
    }

    #[test]
    fn test_social_handles_first_wins() {
        let record = run(ContactRecord::new(), &["LINE ID: heidie", "LINE: other", "IG: @heidie.lin"]);

        assert_eq!(record.social_media.get("line").map(String::as_str), Some("heidie"));
        assert_eq!(
            record.social_media.get("instagram").map(String::as_str),
            Some("heidie.lin")
        );
    }

    #[test]
    fn test_general_pass_fills_only_empty_fields() {
        let mut record = ContactRecord::new();
        record.company = "Existing Corp".to_string();

        let record = run(record, &["LINE TAXI", "王小明", "Fax", "02 2345 6789"]);

        assert_eq!(record.company, "Existing Corp");
        assert_eq!(record.name.full(), "王小明");
        assert_eq!(record.fax_phone, "0223456789");
    }
}
