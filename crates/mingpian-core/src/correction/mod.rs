//! Correction rules for systematic OCR substitution errors.
//!
//! A rule set is an ordered list of find/replace pairs. Each rule runs on the
//! output of the previous one, so a later rule can build on (or undo) an
//! earlier one. Built-in rules come first, user-defined overrides after.

pub mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::card::rules::classify::is_website;
use crate::error::StoreError;

pub use store::{CustomRuleStore, JsonFileStore, KeyValueStore, MemoryStore};

/// Where a rule is allowed to fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// Replace every literal occurrence.
    #[default]
    Anywhere,
    /// Replace an occurrence only when a neighbouring character is an ASCII
    /// digit. Email and web address tokens are never touched.
    NextToDigit,
    /// Replace every occurrence outside email and web address tokens.
    PlainText,
}

/// A single find/replace correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRule {
    /// Text as the recognizer tends to produce it.
    pub wrong: String,
    /// Text it should be.
    pub correct: String,
    /// Where the rule applies.
    #[serde(default)]
    pub scope: RuleScope,
}

impl CorrectionRule {
    pub fn new(wrong: impl Into<String>, correct: impl Into<String>) -> Self {
        Self {
            wrong: wrong.into(),
            correct: correct.into(),
            scope: RuleScope::Anywhere,
        }
    }

    /// A rule that only fires next to a digit.
    pub fn next_to_digit(wrong: impl Into<String>, correct: impl Into<String>) -> Self {
        Self {
            scope: RuleScope::NextToDigit,
            ..Self::new(wrong, correct)
        }
    }

    /// A rule that leaves email and web addresses alone.
    pub fn plain_text(wrong: impl Into<String>, correct: impl Into<String>) -> Self {
        Self {
            scope: RuleScope::PlainText,
            ..Self::new(wrong, correct)
        }
    }

    /// Apply this rule to `text`.
    pub fn apply(&self, text: &str) -> String {
        if self.wrong.is_empty() {
            return text.to_string();
        }

        match self.scope {
            RuleScope::Anywhere => text.replace(&self.wrong, &self.correct),
            RuleScope::NextToDigit => outside_links(text, |token| self.apply_next_to_digit(token)),
            RuleScope::PlainText => {
                outside_links(text, |token| token.replace(&self.wrong, &self.correct))
            }
        }
    }

    fn apply_next_to_digit(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for (start, matched) in text.match_indices(self.wrong.as_str()) {
            let end = start + matched.len();
            let before = text[..start].chars().next_back();
            let after = text[end..].chars().next();
            let digit_adjacent = before.is_some_and(|c| c.is_ascii_digit())
                || after.is_some_and(|c| c.is_ascii_digit());

            if digit_adjacent {
                out.push_str(&text[last..start]);
                out.push_str(&self.correct);
                last = end;
            }
        }

        out.push_str(&text[last..]);
        out
    }
}

/// Apply `f` to each whitespace-separated token that is not an email or web address.
fn outside_links(text: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while !rest.is_empty() {
        let gap = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
        out.push_str(&rest[..gap]);
        rest = &rest[gap..];

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let token = &rest[..end];
        if token.contains('@') || is_website(token) {
            out.push_str(token);
        } else {
            out.push_str(&f(token));
        }
        rest = &rest[end..];
    }

    out
}

/// The built-in rules, in application order.
pub fn builtin_rules() -> Vec<CorrectionRule> {
    vec![
        // Letter/digit confusion
        CorrectionRule::plain_text("lO", "10"),
        CorrectionRule::plain_text("l7", "17"),
        CorrectionRule::next_to_digit("l", "1"),
        CorrectionRule::next_to_digit("O", "0"),
        // Separator and symbol confusion
        CorrectionRule::new("｜", "|"),
        CorrectionRule::new("丨", "|"),
        CorrectionRule::new("L|NE", "LINE"),
        CorrectionRule::new("TAX|", "TAXI"),
        CorrectionRule::new("5ec.", "Sec."),
        CorrectionRule::new("Sec.l", "Sec. 1"),
        // Full-width punctuation
        CorrectionRule::new("．", "."),
        CorrectionRule::new("，", ","),
        CorrectionRule::new("：", ":"),
        CorrectionRule::new("；", ";"),
        CorrectionRule::new("（", "("),
        CorrectionRule::new("）", ")"),
    ]
}

/// Ordered correction rules applied sequentially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionRuleSet {
    rules: Vec<CorrectionRule>,
    builtin_count: usize,
}

impl CorrectionRuleSet {
    /// Create a rule set from an explicit list (no built-ins).
    pub fn new(rules: Vec<CorrectionRule>) -> Self {
        Self {
            rules,
            builtin_count: 0,
        }
    }

    /// Create a rule set holding only the built-in rules.
    pub fn builtin() -> Self {
        let rules = builtin_rules();
        let builtin_count = rules.len();
        Self {
            rules,
            builtin_count,
        }
    }

    /// Append user-defined overrides (`wrong -> correct`) after the existing rules.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        self.rules.extend(
            overrides
                .iter()
                .filter(|(wrong, _)| !wrong.is_empty())
                .map(|(wrong, correct)| CorrectionRule::new(wrong.as_str(), correct.as_str())),
        );
        self
    }

    /// Built-in rules followed by the overrides persisted in `store`.
    pub fn from_store<S: KeyValueStore>(store: &CustomRuleStore<S>) -> Result<Self, StoreError> {
        let overrides = store.load()?;
        debug!("Loaded {} custom correction rules", overrides.len());
        Ok(Self::builtin().with_overrides(&overrides))
    }

    /// Append a single rule.
    pub fn push(&mut self, rule: CorrectionRule) {
        self.rules.push(rule);
    }

    /// Apply every rule in order, each to the output of the previous one.
    pub fn correct(&self, text: &str) -> String {
        let corrected = self
            .rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc));

        if corrected != text {
            trace!("Corrected [{}] -> [{}]", text, corrected);
        }

        corrected
    }

    /// All rules in application order.
    pub fn rules(&self) -> &[CorrectionRule] {
        &self.rules
    }

    /// The built-in part of this rule set.
    pub fn builtin_rules(&self) -> &[CorrectionRule] {
        &self.rules[..self.builtin_count]
    }

    /// The user-defined part of this rule set.
    pub fn custom_rules(&self) -> &[CorrectionRule] {
        &self.rules[self.builtin_count..]
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for CorrectionRuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_confusion_in_numbers() {
        let rules = CorrectionRuleSet::builtin();
        assert_eq!(rules.correct("93323l545"), "933231545");
        assert_eq!(rules.correct("5262l439"), "52621439");
        assert_eq!(rules.correct("2O24"), "2024");
        assert_eq!(rules.correct("l7樓"), "17樓");
    }

    #[test]
    fn test_words_are_left_alone() {
        let rules = CorrectionRuleSet::builtin();
        assert_eq!(rules.correct("www.linetaxi.com.tw"), "www.linetaxi.com.tw");
        assert_eq!(rules.correct("Heidie Lin"), "Heidie Lin");
        assert_eq!(rules.correct("OFFICE"), "OFFICE");
    }

    #[test]
    fn test_contact_addresses_are_left_alone() {
        let rules = CorrectionRuleSet::builtin();
        assert_eq!(rules.correct("paul2024@gmail.com"), "paul2024@gmail.com");
        assert_eq!(rules.correct("www.mall2go.com"), "www.mall2go.com");
        assert_eq!(rules.correct("paul7@O2.tw"), "paul7@O2.tw");
        assert_eq!(
            rules.correct("paul2024@gmail.com +88693323l545"),
            "paul2024@gmail.com +886933231545"
        );
    }

    #[test]
    fn test_symbol_and_punctuation_rules() {
        let rules = CorrectionRuleSet::builtin();
        assert_eq!(rules.correct("L｜NE TAX丨"), "LINE TAXI");
        assert_eq!(rules.correct("統一編號：52621439"), "統一編號:52621439");
        assert_eq!(rules.correct("5ec.l, Anhe Rd."), "Sec. 1, Anhe Rd.");
    }

    #[test]
    fn test_rules_apply_sequentially() {
        // The second rule sees the output of the first.
        let rules = CorrectionRuleSet::new(vec![
            CorrectionRule::new("a", "b"),
            CorrectionRule::new("bb", "c"),
        ]);
        assert_eq!(rules.correct("ab"), "c");
    }

    #[test]
    fn test_overrides_run_after_builtins() {
        let mut overrides = BTreeMap::new();
        overrides.insert("TTaxiGo".to_string(), "TaxiGo".to_string());
        overrides.insert(String::new(), "ignored".to_string());

        let rules = CorrectionRuleSet::builtin().with_overrides(&overrides);
        assert_eq!(rules.custom_rules().len(), 1);
        assert_eq!(rules.builtin_rules().len(), builtin_rules().len());
        assert_eq!(rules.correct("TTaxiGo"), "TaxiGo");
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let rules = CorrectionRuleSet::builtin();
        let once = rules.correct("106台北市大安區安和路一段27號l7樓");
        assert_eq!(rules.correct(&once), once);
    }

    #[test]
    fn test_from_store() {
        let mut store = CustomRuleStore::new(MemoryStore::new());
        store.add("TTaxiGo", "TaxiGo").unwrap();

        let rules = CorrectionRuleSet::from_store(&store).unwrap();
        assert_eq!(rules.custom_rules().len(), 1);
        assert_eq!(rules.correct("TTaxiGo 5262l439"), "TaxiGo 52621439");
    }
}
