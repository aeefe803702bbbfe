//! Recognizer boundary: text fragments as produced by an external OCR engine.
//!
//! The core never runs recognition itself. A host hands over the fragments it
//! got from its platform recognizer and this module provides the small amount
//! of bookkeeping needed before parsing (confidence filtering, ordering).

use serde::{Deserialize, Serialize};

/// Default confidence threshold below which fragments are discarded.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.3;

/// Axis-aligned bounding rectangle of a fragment, in normalized image units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Get the center point of the box.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One piece of recognized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    #[serde(default = "full_confidence")]
    pub confidence: f32,

    /// Position of the fragment in the recognizer's output sequence.
    #[serde(default)]
    pub sequence_position: usize,

    /// Location of the fragment on the card image.
    #[serde(default)]
    pub bounding_box: BoundingBox,
}

fn full_confidence() -> f32 {
    1.0
}

impl TextFragment {
    /// Create a fragment without geometry.
    pub fn new(text: impl Into<String>, confidence: f32, sequence_position: usize) -> Self {
        Self {
            text: text.into(),
            confidence,
            sequence_position,
            bounding_box: BoundingBox::default(),
        }
    }

    /// Attach a bounding box.
    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    /// Build a fragment list from plain strings, numbered in order, at full confidence.
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Vec<TextFragment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextFragment::new(t.as_ref(), 1.0, i))
            .collect()
    }
}

/// Output of an external recognition run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Recognized fragments.
    pub fragments: Vec<TextFragment>,

    /// Recognition time in milliseconds, as reported by the host.
    #[serde(default)]
    pub processing_time_ms: u64,
}

impl RecognitionResult {
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        Self {
            fragments,
            processing_time_ms: 0,
        }
    }

    /// Drop fragments whose confidence is below `threshold`.
    pub fn retain_confident(&mut self, threshold: f32) {
        self.fragments.retain(|f| f.confidence >= threshold);
    }

    /// Order fragments by their sequence position.
    pub fn sort_by_sequence(&mut self) {
        self.fragments.sort_by_key(|f| f.sequence_position);
    }

    /// Sort fragments by reading order (top-to-bottom, left-to-right) and
    /// renumber their sequence positions accordingly.
    pub fn sort_by_reading_order(&mut self) {
        self.fragments.sort_by(|a, b| {
            // Group by approximate vertical position (2% of the card height)
            let row_a = (a.bounding_box.y / 0.02) as i32;
            let row_b = (b.bounding_box.y / 0.02) as i32;

            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                a.bounding_box
                    .x
                    .partial_cmp(&b.bounding_box.x)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }
        });

        for (i, fragment) in self.fragments.iter_mut().enumerate() {
            fragment.sequence_position = i;
        }
    }

    /// Fragment texts in their current order.
    pub fn texts(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }

    /// Check whether any fragment carries non-blank text.
    pub fn has_text(&self) -> bool {
        self.fragments.iter().any(|f| !f.text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_confident() {
        let mut result = RecognitionResult::new(vec![
            TextFragment::new("keep", 0.9, 0),
            TextFragment::new("drop", 0.1, 1),
            TextFragment::new("edge", 0.3, 2),
        ]);
        result.retain_confident(DEFAULT_MIN_CONFIDENCE);
        assert_eq!(result.texts(), vec!["keep", "edge"]);
    }

    #[test]
    fn test_sort_by_reading_order() {
        let mut result = RecognitionResult::new(vec![
            TextFragment::new("bottom", 1.0, 0).with_bounding_box(BoundingBox::new(0.1, 0.8, 0.3, 0.05)),
            TextFragment::new("top-right", 1.0, 1).with_bounding_box(BoundingBox::new(0.6, 0.1, 0.3, 0.05)),
            TextFragment::new("top-left", 1.0, 2).with_bounding_box(BoundingBox::new(0.1, 0.105, 0.3, 0.05)),
        ]);
        result.sort_by_reading_order();
        assert_eq!(result.texts(), vec!["top-left", "top-right", "bottom"]);
        assert_eq!(result.fragments[2].sequence_position, 2);
    }

    #[test]
    fn test_fragment_json_defaults() {
        let fragment: TextFragment = serde_json::from_str(r#"{"text": "李亞昀"}"#).unwrap();
        assert_eq!(fragment.confidence, 1.0);
        assert_eq!(fragment.sequence_position, 0);
    }
}
