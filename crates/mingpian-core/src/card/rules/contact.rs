//! Email, website, social handle and bilingual text helpers.

use super::classify::{contains_business_terms, is_company, is_position};
use super::patterns::{
    BILINGUAL_NAME_CJK_FIRST, BILINGUAL_NAME_LATIN_FIRST, BILINGUAL_POSITION, EMAIL, EMAIL_STRICT,
    SOCIAL_HANDLE,
};

/// Prefix a scheme (and `www.` when missing) to a bare domain.
pub fn normalize_website(website: &str) -> String {
    let website = website.trim();
    let lower = website.to_lowercase();

    if lower.starts_with("http://") || lower.starts_with("https://") {
        website.to_string()
    } else if lower.starts_with("www.") {
        format!("https://{website}")
    } else {
        format!("https://www.{website}")
    }
}

pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_STRICT.is_match(email)
}

/// Find the first email address inside mixed text.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}

/// Guess a display name from an email local part.
///
/// `heidie.lin88@x.com` becomes `Heidie Lin`.
pub fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();

    local
        .split(|c: char| c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Parse a labelled social handle such as `LINE ID: heidie`.
///
/// Returns the canonical lowercase platform key and the handle.
pub fn extract_social(text: &str) -> Option<(String, String)> {
    let caps = SOCIAL_HANDLE.captures(text)?;
    let platform = caps.get(1)?.as_str();
    let handle = caps.get(2)?.as_str();

    let key: String = platform
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let key = match key.as_str() {
        "line" | "lineid" => "line",
        "wechat" | "微信" => "wechat",
        "fb" | "facebook" => "facebook",
        "ig" | "instagram" => "instagram",
        other => other,
    };

    Some((key.to_string(), handle.to_string()))
}

/// Rewrite an `English | 中文` job title into canonical form.
///
/// A separator bar misread as `l`, `I` or `1` is restored. Returns `None`
/// unless the text is a position with both a Latin and a CJK part.
pub fn canonical_position(text: &str) -> Option<String> {
    if !is_position(text) {
        return None;
    }

    let caps = BILINGUAL_POSITION.captures(text)?;
    let latin = caps.get(1)?.as_str().trim();
    let cjk = caps.get(2)?.as_str().trim();

    Some(format!("{latin} | {cjk}"))
}

/// Join a `Latin • CJK` (or `CJK Latin`) personal name into `Latin CJK`.
///
/// Separator dots are dropped and script order is kept.
pub fn bilingual_name(text: &str) -> Option<String> {
    if contains_business_terms(text) || is_company(text) || is_position(text) {
        return None;
    }

    let caps = BILINGUAL_NAME_LATIN_FIRST
        .captures(text)
        .or_else(|| BILINGUAL_NAME_CJK_FIRST.captures(text))?;
    let first = caps.get(1)?.as_str().trim();
    let second = caps.get(2)?.as_str().trim();

    Some(format!("{first} {second}"))
}
