//! Field assignment from classified buckets.

use tracing::debug;

use super::rules::classify::contains_latin;
use super::rules::{canonical_position, normalize_phone, normalize_website, phone_kind, FieldCategory};
use super::structure::CardStructure;
use crate::models::card::fill;
use crate::models::{ContactRecord, ParserConfig, PhoneSlot};

/// Order in which buckets are written into the record.
pub const ASSIGNMENT_ORDER: [FieldCategory; 8] = [
    FieldCategory::Name,
    FieldCategory::Position,
    FieldCategory::Company,
    FieldCategory::Phone,
    FieldCategory::Email,
    FieldCategory::Website,
    FieldCategory::Address,
    FieldCategory::CompanyId,
];

/// Email entries that are considered; later ones are dropped even when a
/// duplicate left the secondary slot free.
pub const EMAIL_ENTRIES: usize = 2;

/// Fill the record from the buckets.
///
/// Every field takes the first entry that reaches it; later entries only
/// land in fields that are still empty.
pub fn assign_fields(
    mut record: ContactRecord,
    structure: &CardStructure,
    config: &ParserConfig,
) -> ContactRecord {
    for category in ASSIGNMENT_ORDER {
        let bucket = structure.bucket(category);
        let mut entries: Vec<_> = bucket.iter().collect();
        entries.sort_by_key(|e| e.position);
        if category == FieldCategory::Email {
            entries.truncate(EMAIL_ENTRIES);
        }

        for entry in entries {
            assign_one(&mut record, category, &entry.text, &entry.context, config);
        }
    }

    record
}

/// Write one classified text into the matching empty field.
///
/// Returns whether the record changed.
pub fn assign_one(
    record: &mut ContactRecord,
    category: FieldCategory,
    text: &str,
    context: &str,
    config: &ParserConfig,
) -> bool {
    let stored = match category {
        FieldCategory::Name => {
            if record.name.is_empty() {
                record.set_name(text);
                true
            } else {
                false
            }
        }
        FieldCategory::Position => {
            if record.position.is_empty() {
                record.set_position(canonical_position(text).unwrap_or_else(|| text.to_string()));
                true
            } else {
                false
            }
        }
        FieldCategory::Company => fill(&mut record.company, text),
        FieldCategory::Phone => place_phone(record, text, context).is_some(),
        FieldCategory::Email => assign_email(record, text, config.lowercase_emails),
        FieldCategory::Website => {
            record.website.is_empty()
                && !text.is_empty()
                && fill(&mut record.website, normalize_website(text))
        }
        FieldCategory::Address => assign_address(record, text),
        FieldCategory::CompanyId => fill(&mut record.company_id, text),
        FieldCategory::Other => false,
    };

    if stored {
        debug!("Assigned {:?}: {}", category, text);
    }
    stored
}

/// Put a phone number into its slot, cascading when the slot is taken.
///
/// The type decided from `context` picks the first slot; if it is occupied the
/// number takes the first free slot of [`PhoneSlot::CASCADE`]. A number that
/// is already stored in any slot is skipped. Returns the slot used.
pub fn place_phone(record: &mut ContactRecord, raw: &str, context: &str) -> Option<PhoneSlot> {
    let number = normalize_phone(raw);
    if number.is_empty() {
        return None;
    }

    if holds_phone(record, &number) {
        debug!("Phone {} already assigned", number);
        return None;
    }

    let kind = phone_kind(&number, context);
    let target = kind.slot();

    let slot = if record.phone(target).is_empty() {
        target
    } else {
        let free = PhoneSlot::CASCADE
            .into_iter()
            .find(|s| record.phone(*s).is_empty());
        match free {
            Some(slot) => slot,
            None => {
                debug!("No free phone slot for {}", number);
                return None;
            }
        }
    };

    debug!("Phone {} ({:?}) -> {:?}", number, kind, slot);
    *record.phone_mut(slot) = number;
    Some(slot)
}

/// Check if `number` already sits in one of the phone slots.
pub fn holds_phone(record: &ContactRecord, number: &str) -> bool {
    let number = normalize_phone(number);
    PhoneSlot::CASCADE
        .into_iter()
        .any(|slot| normalize_phone(record.phone(slot)) == number)
}

/// Fill the primary email, then the secondary one.
pub fn assign_email(record: &mut ContactRecord, email: &str, lowercase: bool) -> bool {
    let email = if lowercase {
        email.to_lowercase()
    } else {
        email.to_string()
    };

    if record.email == email || record.secondary_email == email {
        return false;
    }

    fill(&mut record.email, email.as_str()) || fill(&mut record.secondary_email, email)
}

/// Route an address to the English field when it has Latin letters.
pub fn assign_address(record: &mut ContactRecord, address: &str) -> bool {
    if contains_latin(address) {
        fill(&mut record.english_address, address)
    } else {
        fill(&mut record.address, address)
    }
}
