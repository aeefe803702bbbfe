//! Structured contact record produced from a business card.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::rules::classify::contains_cjk;

/// A text value with its script-tagged parts.
///
/// The parts are always derived from `full`; there is no way to set them
/// independently. Deserialized parts must match one of the constructors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBilingualText")]
pub struct BilingualText {
    full: String,
    latin: String,
    cjk: String,
}

#[derive(Deserialize)]
struct RawBilingualText {
    full: String,
    latin: Option<String>,
    cjk: Option<String>,
}

impl TryFrom<RawBilingualText> for BilingualText {
    type Error = String;

    fn try_from(raw: RawBilingualText) -> Result<Self, Self::Error> {
        let (latin, cjk) = match (raw.latin, raw.cjk) {
            (None, None) if raw.full.contains('|') => return Ok(Self::position(raw.full)),
            (None, None) => return Ok(Self::name(raw.full)),
            (latin, cjk) => (latin.unwrap_or_default(), cjk.unwrap_or_default()),
        };

        [Self::name(raw.full.as_str()), Self::position(raw.full.as_str())]
            .into_iter()
            .find(|derived| derived.latin == latin && derived.cjk == cjk)
            .ok_or_else(|| format!("parts do not match {:?}", raw.full))
    }
}

impl BilingualText {
    /// Split a personal name into its Latin-script and CJK-script words.
    pub fn name(full: impl Into<String>) -> Self {
        let full = full.into();
        let mut latin = Vec::new();
        let mut cjk = Vec::new();

        for word in full.split(' ').filter(|w| !w.is_empty()) {
            if contains_cjk(word) {
                cjk.push(word);
            } else {
                latin.push(word);
            }
        }

        Self {
            latin: latin.join(" "),
            cjk: cjk.join(" "),
            full,
        }
    }

    /// Split a job title written as `English | 中文`.
    ///
    /// Without a `|` separator the whole title lands in the CJK part when it
    /// contains an ideograph, otherwise in the Latin part.
    pub fn position(full: impl Into<String>) -> Self {
        let full = full.into();

        let (latin, cjk) = match full.split_once('|') {
            Some((left, right)) => (left.trim().to_string(), right.trim().to_string()),
            None if contains_cjk(&full) => (String::new(), full.clone()),
            None => (full.clone(), String::new()),
        };

        Self { full, latin, cjk }
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn latin(&self) -> &str {
        &self.latin
    }

    pub fn cjk(&self) -> &str {
        &self.cjk
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }
}

/// The three phone slots of a contact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneSlot {
    /// Primary (usually mobile) number.
    Mobile,
    /// Office line.
    Work,
    /// Fax line.
    Fax,
}

impl PhoneSlot {
    /// Order in which competing numbers take free slots.
    pub const CASCADE: [PhoneSlot; 3] = [PhoneSlot::Mobile, PhoneSlot::Work, PhoneSlot::Fax];
}

/// A contact reconstructed from one business card.
///
/// Every field defaults to empty; a record with all fields empty means the
/// recognizer output held nothing usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Personal name with Latin/CJK parts.
    pub name: BilingualText,

    /// Company name.
    pub company: String,

    /// Job title with Latin/CJK parts.
    pub position: BilingualText,

    /// Primary phone number.
    pub phone: String,

    /// Office phone number.
    pub work_phone: String,

    /// Fax number.
    pub fax_phone: String,

    /// Primary email address.
    pub email: String,

    /// Secondary email address.
    pub secondary_email: String,

    /// Company website.
    pub website: String,

    /// Address in the local language.
    pub address: String,

    /// Address in English.
    pub english_address: String,

    /// Taiwan business-registration number (8 digits).
    pub company_id: String,

    /// Social platform name to handle.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub social_media: BTreeMap<String, String>,

    /// Raw card image, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl ContactRecord {
    /// Create an empty record stamped with the current time.
    pub fn new() -> Self {
        Self {
            name: BilingualText::default(),
            company: String::new(),
            position: BilingualText::default(),
            phone: String::new(),
            work_phone: String::new(),
            fax_phone: String::new(),
            email: String::new(),
            secondary_email: String::new(),
            website: String::new(),
            address: String::new(),
            english_address: String::new(),
            company_id: String::new(),
            social_media: BTreeMap::new(),
            image: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the raw card image.
    pub fn with_image(mut self, image: Option<Vec<u8>>) -> Self {
        self.image = image;
        self
    }

    /// Set the full name and re-derive its parts.
    pub fn set_name(&mut self, full: impl Into<String>) {
        self.name = BilingualText::name(full);
    }

    /// Set the full position and re-derive its parts.
    pub fn set_position(&mut self, full: impl Into<String>) {
        self.position = BilingualText::position(full);
    }

    /// Get the number stored in a phone slot.
    pub fn phone(&self, slot: PhoneSlot) -> &str {
        match slot {
            PhoneSlot::Mobile => &self.phone,
            PhoneSlot::Work => &self.work_phone,
            PhoneSlot::Fax => &self.fax_phone,
        }
    }

    /// Get mutable access to a phone slot.
    pub fn phone_mut(&mut self, slot: PhoneSlot) -> &mut String {
        match slot {
            PhoneSlot::Mobile => &mut self.phone,
            PhoneSlot::Work => &mut self.work_phone,
            PhoneSlot::Fax => &mut self.fax_phone,
        }
    }

    /// Check if no text field holds a value.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.company.is_empty()
            && self.position.is_empty()
            && self.phone.is_empty()
            && self.work_phone.is_empty()
            && self.fax_phone.is_empty()
            && self.email.is_empty()
            && self.secondary_email.is_empty()
            && self.website.is_empty()
            && self.address.is_empty()
            && self.english_address.is_empty()
            && self.company_id.is_empty()
            && self.social_media.is_empty()
    }

    /// Names of the main fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("name", self.name.is_empty()),
            ("company", self.company.is_empty()),
            ("position", self.position.is_empty()),
            ("phone", self.phone.is_empty()),
            ("email", self.email.is_empty()),
            ("website", self.website.is_empty()),
            ("address", self.address.is_empty() && self.english_address.is_empty()),
            ("company_id", self.company_id.is_empty()),
        ];

        checks
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(field, _)| field)
            .collect()
    }
}

impl Default for ContactRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Store `value` into `slot` only if the slot is empty. Returns whether it was stored.
pub(crate) fn fill(slot: &mut String, value: impl Into<String>) -> bool {
    if !slot.is_empty() {
        return false;
    }
    let value = value.into();
    if value.is_empty() {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_split() {
        let name = BilingualText::name("Heidie Lin 李亞畇");
        assert_eq!(name.full(), "Heidie Lin 李亞畇");
        assert_eq!(name.latin(), "Heidie Lin");
        assert_eq!(name.cjk(), "李亞畇");

        let name = BilingualText::name("李亞昀");
        assert_eq!(name.latin(), "");
        assert_eq!(name.cjk(), "李亞昀");
    }

    #[test]
    fn test_position_split() {
        let position = BilingualText::position("Finance | 資深會計專員");
        assert_eq!(position.latin(), "Finance");
        assert_eq!(position.cjk(), "資深會計專員");

        let position = BilingualText::position("Senior Engineer");
        assert_eq!(position.latin(), "Senior Engineer");
        assert_eq!(position.cjk(), "");

        let position = BilingualText::position("資深會計專員");
        assert_eq!(position.cjk(), "資深會計專員");
    }

    #[test]
    fn test_deserialized_parts_must_match_full() {
        let name: BilingualText =
            serde_json::from_str(r#"{"full": "Heidie Lin 李亞畇", "latin": "Heidie Lin", "cjk": "李亞畇"}"#)
                .unwrap();
        assert_eq!(name, BilingualText::name("Heidie Lin 李亞畇"));

        let position: BilingualText =
            serde_json::from_str(r#"{"full": "Finance | 資深會計專員", "latin": "Finance", "cjk": "資深會計專員"}"#)
                .unwrap();
        assert_eq!(position, BilingualText::position("Finance | 資深會計專員"));

        let derived: BilingualText = serde_json::from_str(r#"{"full": "李亞昀"}"#).unwrap();
        assert_eq!(derived.cjk(), "李亞昀");

        let forged = serde_json::from_str::<BilingualText>(
            r#"{"full": "李亞昀", "latin": "Somebody", "cjk": "Else"}"#,
        );
        assert!(forged.is_err());
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let mut record = ContactRecord::new();
        record.set_name("Heidie Lin 李亞畇");
        record.set_position("Finance | 資深會計專員");

        let json = serde_json::to_string(&record).unwrap();
        let parsed: ContactRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_empty_record() {
        let record = ContactRecord::new();
        assert!(record.is_empty());
        assert_eq!(record.missing_fields().len(), 8);
    }

    #[test]
    fn test_fill_only_when_empty() {
        let mut slot = String::new();
        assert!(fill(&mut slot, "first"));
        assert!(!fill(&mut slot, "second"));
        assert_eq!(slot, "first");

        let mut empty = String::new();
        assert!(!fill(&mut empty, ""));
    }

    #[test]
    fn test_phone_slots() {
        let mut record = ContactRecord::new();
        *record.phone_mut(PhoneSlot::Fax) = "0227001234".to_string();
        assert_eq!(record.fax_phone, "0227001234");
        assert_eq!(record.phone(PhoneSlot::Fax), "0227001234");
        assert_eq!(record.phone(PhoneSlot::Mobile), "");
    }
}
