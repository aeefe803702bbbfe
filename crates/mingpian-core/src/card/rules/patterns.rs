//! Common regex patterns for business-card field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Phone formats, matched against text with whitespace/parens/dashes stripped
    pub static ref PHONE_TW_NATIONAL: Regex = Regex::new(
        r"^(?:\+?886|0)?[0-9]{8,10}$"
    ).unwrap();

    pub static ref PHONE_GROUPED: Regex = Regex::new(
        r"^[0-9]{3,4}[-\s]?[0-9]{3,4}[-\s]?[0-9]{3,4}$"
    ).unwrap();

    pub static ref PHONE_INTERNATIONAL: Regex = Regex::new(
        r"^\+?[0-9]{10,15}$"
    ).unwrap();

    // Characters removed before phone matching
    pub static ref PHONE_NOISE: Regex = Regex::new(
        r"[\s\-\(\)]"
    ).unwrap();

    // Taiwan mobile numbers inside free text
    pub static ref MOBILE_SEARCH: Regex = Regex::new(
        r"\+?886[\s\-]*9\d{2}[\s\-]*\d{3}[\s\-]*\d{3}|09\d{2}[\s\-]*\d{3}[\s\-]*\d{3}"
    ).unwrap();

    // Marker that a text run probably carries a mobile number
    pub static ref MOBILE_MARKER: Regex = Regex::new(
        r"\+?886|09\d{2}"
    ).unwrap();

    // Email patterns
    pub static ref EMAIL_STRICT: Regex = Regex::new(
        r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$"
    ).unwrap();

    pub static ref EMAIL: Regex = Regex::new(
        r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"
    ).unwrap();

    // Personal names
    pub static ref CJK_NAME: Regex = Regex::new(
        r"^[\x{4e00}-\x{9fff}]{2,4}$"
    ).unwrap();

    pub static ref LATIN_NAME: Regex = Regex::new(
        r"^[A-Za-z]+(?:\s+[A-Za-z]+)*$"
    ).unwrap();

    // "Heidie Lin • 李亞畇" and "李亞畇 Heidie Lin"
    pub static ref BILINGUAL_NAME_LATIN_FIRST: Regex = Regex::new(
        r"^([A-Za-z]+(?:\s+[A-Za-z]+)*)\s*[•·・]?\s*([\x{4e00}-\x{9fff}]{2,4})$"
    ).unwrap();

    pub static ref BILINGUAL_NAME_CJK_FIRST: Regex = Regex::new(
        r"^([\x{4e00}-\x{9fff}]{2,4})\s*[•·・]?\s*([A-Za-z]+(?:\s+[A-Za-z]+)*)$"
    ).unwrap();

    // "Finance | 資深會計專員", including a bar misread as l, I or 1
    pub static ref BILINGUAL_POSITION: Regex = Regex::new(
        r"^([A-Za-z][A-Za-z .&/,\-]*?)(?:\s*\|\s*|\s+[lI1]\s+)([\x{4e00}-\x{9fff}].*)$"
    ).unwrap();

    // Business registration number
    pub static ref COMPANY_ID: Regex = Regex::new(
        r"^[0-9]{8}$"
    ).unwrap();

    pub static ref COMPANY_ID_LABELED: Regex = Regex::new(
        r"(?:統一編號|统一编号|統編|统编)\s*:?\s*(\d{8})"
    ).unwrap();

    pub static ref COMPANY_ID_STANDALONE: Regex = Regex::new(
        r"\b(\d{8})\b"
    ).unwrap();

    // Labelled id segment to cut out of an address line
    pub static ref COMPANY_ID_SEGMENT: Regex = Regex::new(
        r"\|?\s*(?:統一編號|统一编号|統編|统编)\s*:?\s*\d{8}"
    ).unwrap();

    // Marker and everything after it, for lines where the digits were lost
    pub static ref COMPANY_ID_TAIL: Regex = Regex::new(
        r"\|?\s*(?:統一編號|统一编号|統編|统编).*$"
    ).unwrap();

    pub static ref NON_DIGIT: Regex = Regex::new(
        r"[^0-9]"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();

    // Labelled social handles ("LINE ID: heidie", "WeChat：abc")
    pub static ref SOCIAL_HANDLE: Regex = Regex::new(
        r"(?i)^\s*(LINE(?:\s*ID)?|WeChat|微信|Facebook|FB|Instagram|IG|Telegram|Skype|Twitter|WhatsApp)\s*:\s*@?(\S+)\s*$"
    ).unwrap();
}
