//! Detector class vocabulary
//!
//! Maps the numeric class ids produced by the gesture detector to the label
//! strings the rest of the recognition pipeline works with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label the detector emits for the "undo last word" gesture
pub const DEFAULT_RESET_LABEL: &str = "리셋";

/// A single detected gesture in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Detector class id
    pub class_id: u32,
    /// Detector confidence (0.0 to 1.0)
    pub confidence: f32,
}

impl Detection {
    pub fn new(class_id: u32, confidence: f32) -> Self {
        Self {
            class_id,
            confidence,
        }
    }
}

/// Gesture detector
///
/// Model loading and inference live behind this trait. An error means the
/// frame could not be analysed; it is logged and treated as an empty frame.
pub trait SignDetector {
    /// Image type accepted by the detector
    type Frame;

    /// Detect gestures in a frame
    fn detect(&mut self, frame: &Self::Frame) -> anyhow::Result<Vec<Detection>>;
}

/// A gesture class known to the detector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureClass {
    /// Label passed to the recognition pipeline
    pub label: String,
    /// English gloss
    pub english: String,
}

/// Class id to label mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    classes: BTreeMap<u32, GestureClass>,
}

impl Vocabulary {
    /// Creates an empty vocabulary
    pub fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
        }
    }

    /// The Korean sign vocabulary of the bundled detection model
    pub fn korean_default() -> Self {
        let entries = [
            (0, "구급차1/3", "ambulance"),
            (1, "구급차2/3", "ambulance"),
            (2, "구급차3/3", "ambulance"),
            (3, "학교", "school"),
            (4, "쓰러지다1/2", "collapse"),
            (5, "쓰러지다2/2", "collapse"),
            (6, "아프다", "hurt"),
            (7, "가다", "go"),
            (8, "나", "me"),
            (9, "사람1/2", "person"),
            (10, "사람2/2", "person"),
            (11, "빨리", "quickly"),
            (12, "병원", "hospital"),
            (13, "구조", "rescue"),
            (14, DEFAULT_RESET_LABEL, "reset"),
        ];

        let mut vocabulary = Self::new();
        for (class_id, label, english) in entries {
            vocabulary.classes.insert(
                class_id,
                GestureClass {
                    label: label.to_string(),
                    english: english.to_string(),
                },
            );
        }
        vocabulary
    }

    /// Number of known classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Look up a class by id
    pub fn get(&self, class_id: u32) -> Option<&GestureClass> {
        self.classes.get(&class_id)
    }

    /// Iterate over all classes in id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &GestureClass)> {
        self.classes.iter().map(|(id, class)| (*id, class))
    }

    /// Add or replace a class mapping
    pub fn add_class(
        &mut self,
        class_id: u32,
        label: impl Into<String>,
        english: impl Into<String>,
    ) {
        let class = GestureClass {
            label: label.into(),
            english: english.into(),
        };
        tracing::info!(
            "Class mapping added: {} -> {}/{}",
            class_id,
            class.label,
            class.english
        );
        self.classes.insert(class_id, class);
    }

    /// Convert one frame's detections into labels
    ///
    /// Detections below `threshold` or with an unknown class id are dropped.
    pub fn labels_for(&self, detections: &[Detection], threshold: f32) -> Vec<String> {
        detections
            .iter()
            .filter(|d| d.confidence >= threshold)
            .filter_map(|d| match self.classes.get(&d.class_id) {
                Some(class) => {
                    tracing::debug!(
                        "Detected sign: {} (confidence: {:.3})",
                        class.label,
                        d.confidence
                    );
                    Some(class.label.clone())
                }
                None => {
                    tracing::debug!("Ignoring unknown class id: {}", d.class_id);
                    None
                }
            })
            .collect()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::korean_default()
    }
}
