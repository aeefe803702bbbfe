//! Fallback recovery for fields still empty after the context pass.

use tracing::debug;

use super::assign::holds_phone;
use super::rules::classify::{is_company, is_company_id, is_likely_person_name, is_person_name};
use super::rules::keywords::{contains_any, contains_label, COMPANY_ID_MARKERS, PHONE_LABELS};
use super::rules::patterns::{COMPANY_ID_SEGMENT, COMPANY_ID_TAIL};
use super::rules::{
    bilingual_name, correct_phone, digits_only, extract_mobile, format_phone, has_mobile_marker,
    normalize_phone, normalize_website, validate_company_id, Classifier,
};
use crate::correction::CorrectionRuleSet;
use crate::models::{BilingualText, ContactRecord, ParserConfig, PhoneSlot};

/// Run the fallback pass.
pub fn resolve<S: AsRef<str>>(
    record: ContactRecord,
    texts: &[S],
    rules: &CorrectionRuleSet,
    config: &ParserConfig,
    classifier: &Classifier,
) -> ContactRecord {
    let record = reset_company_like_name(record, config);
    let record = recover_name(record, texts, classifier);
    let record = recover_company_id(record, texts, rules);
    let record = recover_phone(record, texts, rules, config);
    let record = apply_template_website(record, config);
    clean_address(record)
}

/// Drop a name that is really the company.
fn reset_company_like_name(mut record: ContactRecord, config: &ParserConfig) -> ContactRecord {
    let name = record.name.full();
    if name.is_empty() {
        return record;
    }

    let company_like = name == record.company
        || is_company(name)
        || config.templates.iter().any(|t| t.matches_company(name));

    if company_like {
        debug!("Name [{}] looks like a company, resetting", name);
        record.name = BilingualText::default();
    }

    record
}

fn recover_name<S: AsRef<str>>(
    mut record: ContactRecord,
    texts: &[S],
    classifier: &Classifier,
) -> ContactRecord {
    if !record.name.is_empty() {
        return record;
    }

    let candidates = || {
        texts
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| *t != record.company && !is_company(t))
    };

    let found = candidates()
        .find_map(bilingual_name)
        .or_else(|| {
            candidates()
                .find(|t| {
                    classifier.matches_template_name(t)
                        || (is_likely_person_name(t) && is_person_name(t))
                })
                .map(str::to_string)
        });

    if let Some(name) = found {
        debug!("Fallback name: {}", name);
        record.set_name(name);
    }

    record
}

fn recover_company_id<S: AsRef<str>>(
    mut record: ContactRecord,
    texts: &[S],
    rules: &CorrectionRuleSet,
) -> ContactRecord {
    if !record.company_id.is_empty() {
        return record;
    }

    let found = texts.iter().enumerate().find_map(|(index, text)| {
        let corrected = rules.correct(text.as_ref());
        let digits = digits_only(&corrected);
        if digits.len() != 8 || !validate_company_id(&digits) {
            return None;
        }

        // A number already sitting in a phone slot is only an id when it
        // reads like one: a bare 8-digit token without a phone label before
        // it, or a marker-labelled run.
        let held = holds_phone(&record, &digits);
        let reads_as_id = contains_any(&corrected, COMPANY_ID_MARKERS)
            || (is_company_id(corrected.trim()) && !follows_phone_label(texts, index));
        if held && !reads_as_id {
            debug!("Keeping {} as a phone number", digits);
            return None;
        }

        Some((digits, held))
    });

    let Some((id, held)) = found else {
        return record;
    };

    debug!("Fallback company id: {}", id);

    if held {
        for slot in PhoneSlot::CASCADE {
            if normalize_phone(record.phone(slot)) == id {
                debug!("Releasing {:?} slot held by company id {}", slot, id);
                record.phone_mut(slot).clear();
            }
        }
    }

    record.company_id = id;
    record
}

fn follows_phone_label<S: AsRef<str>>(texts: &[S], index: usize) -> bool {
    index
        .checked_sub(1)
        .and_then(|previous| texts.get(previous))
        .is_some_and(|text| contains_label(&text.as_ref().to_lowercase(), PHONE_LABELS))
}

fn recover_phone<S: AsRef<str>>(
    mut record: ContactRecord,
    texts: &[S],
    rules: &CorrectionRuleSet,
    config: &ParserConfig,
) -> ContactRecord {
    if !record.phone.is_empty() {
        return record;
    }

    let found = texts
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| has_mobile_marker(t))
        .find_map(|t| extract_mobile(&rules.correct(t)));

    if let Some(phone) = found {
        let phone = if config.auto_correct {
            correct_phone(&phone)
        } else {
            phone
        };
        let formatted = format_phone(&phone);

        if !holds_phone(&record, &formatted) {
            debug!("Fallback phone: {}", formatted);
            record.phone = formatted;
        }
    }

    record
}

fn apply_template_website(mut record: ContactRecord, config: &ParserConfig) -> ContactRecord {
    if !record.website.is_empty() || record.company.is_empty() {
        return record;
    }

    let website = config
        .templates
        .iter()
        .filter(|t| t.matches_company(&record.company))
        .find_map(|t| t.default_website.as_deref());

    if let Some(website) = website {
        debug!("Template website for {}: {}", record.company, website);
        record.website = normalize_website(website);
    }

    record
}

/// Remove a leftover id label from the address once the id is known.
fn clean_address(mut record: ContactRecord) -> ContactRecord {
    if record.company_id.is_empty() || !contains_any(&record.address, COMPANY_ID_MARKERS) {
        return record;
    }

    let cleaned = COMPANY_ID_SEGMENT.replace_all(&record.address, "");
    let cleaned = COMPANY_ID_TAIL.replace_all(&cleaned, "");
    let cleaned = cleaned.trim().trim_matches('|').trim().to_string();

    debug!("Cleaned address: {}", cleaned);
    record.address = cleaned;
    record
}
