//! Structural analysis: bucket cleaned fragments by field category.

use serde::Serialize;
use tracing::trace;

use super::rules::{Classifier, FieldCategory};

/// One fragment inside a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketEntry {
    pub text: String,
    /// Index in the cleaned fragment sequence.
    pub position: usize,
    /// Preceding fragments inside the context window, space-joined.
    pub context: String,
}

/// Fragments sharing a category, in sequence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedBucket {
    pub category: FieldCategory,
    pub entries: Vec<BucketEntry>,
}

impl ClassifiedBucket {
    pub fn new(category: FieldCategory) -> Self {
        Self {
            category,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: BucketEntry) {
        self.entries.push(entry);
    }

    /// Entry with the lowest sequence position.
    pub fn first(&self) -> Option<&BucketEntry> {
        self.entries.iter().min_by_key(|e| e.position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BucketEntry> {
        self.entries.iter()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every fragment of a card, sorted into one bucket per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardStructure {
    pub names: ClassifiedBucket,
    pub companies: ClassifiedBucket,
    pub positions: ClassifiedBucket,
    pub phones: ClassifiedBucket,
    pub emails: ClassifiedBucket,
    pub websites: ClassifiedBucket,
    pub addresses: ClassifiedBucket,
    pub company_ids: ClassifiedBucket,
    pub others: ClassifiedBucket,
}

impl CardStructure {
    pub fn new() -> Self {
        Self {
            names: ClassifiedBucket::new(FieldCategory::Name),
            companies: ClassifiedBucket::new(FieldCategory::Company),
            positions: ClassifiedBucket::new(FieldCategory::Position),
            phones: ClassifiedBucket::new(FieldCategory::Phone),
            emails: ClassifiedBucket::new(FieldCategory::Email),
            websites: ClassifiedBucket::new(FieldCategory::Website),
            addresses: ClassifiedBucket::new(FieldCategory::Address),
            company_ids: ClassifiedBucket::new(FieldCategory::CompanyId),
            others: ClassifiedBucket::new(FieldCategory::Other),
        }
    }

    pub fn bucket(&self, category: FieldCategory) -> &ClassifiedBucket {
        match category {
            FieldCategory::Name => &self.names,
            FieldCategory::Company => &self.companies,
            FieldCategory::Position => &self.positions,
            FieldCategory::Phone => &self.phones,
            FieldCategory::Email => &self.emails,
            FieldCategory::Website => &self.websites,
            FieldCategory::Address => &self.addresses,
            FieldCategory::CompanyId => &self.company_ids,
            FieldCategory::Other => &self.others,
        }
    }

    fn bucket_mut(&mut self, category: FieldCategory) -> &mut ClassifiedBucket {
        match category {
            FieldCategory::Name => &mut self.names,
            FieldCategory::Company => &mut self.companies,
            FieldCategory::Position => &mut self.positions,
            FieldCategory::Phone => &mut self.phones,
            FieldCategory::Email => &mut self.emails,
            FieldCategory::Website => &mut self.websites,
            FieldCategory::Address => &mut self.addresses,
            FieldCategory::CompanyId => &mut self.company_ids,
            FieldCategory::Other => &mut self.others,
        }
    }

    /// Total number of bucketed fragments.
    pub fn len(&self) -> usize {
        [
            &self.names,
            &self.companies,
            &self.positions,
            &self.phones,
            &self.emails,
            &self.websites,
            &self.addresses,
            &self.company_ids,
            &self.others,
        ]
        .iter()
        .map(|b| b.len())
        .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CardStructure {
    fn default() -> Self {
        Self::new()
    }
}

/// Text of the `window` fragments before `index`, joined by spaces.
pub fn context_before<S: AsRef<str>>(texts: &[S], index: usize, window: usize) -> String {
    let start = index.saturating_sub(window);
    texts[start..index]
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bucket each fragment under its highest-precedence category.
pub fn analyze<S: AsRef<str>>(texts: &[S], window: usize, classifier: &Classifier) -> CardStructure {
    let mut structure = CardStructure::new();

    for (index, text) in texts.iter().enumerate() {
        let text = text.as_ref();
        let category = classifier.classify(text);
        trace!("Fragment {} [{}] -> {:?}", index, text, category);

        structure.bucket_mut(category).push(BucketEntry {
            text: text.to_string(),
            position: index,
            context: context_before(texts, index, window),
        });
    }

    structure
}
