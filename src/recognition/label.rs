//! Detector label parsing
//!
//! The detector packs multi-step gestures into a single label string such as
//! `구급차1/3`: the base name with the step number glued to it, a slash, and
//! the total number of steps. Everything else is a plain word.
//!
//! All knowledge of that encoding lives in [`parse_label`] so a structured
//! detector output can replace it without touching the sequence manager.

use std::fmt;
use std::num::IntErrorKind;

/// One step of a multi-step gesture, decoded from a detector label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepLabel {
    /// Gesture identity shared by every step (digits removed)
    pub base_name: String,
    /// Position of this step, as written in the label
    pub step: u32,
    /// Step count written after the slash
    pub total_steps: u32,
}

impl fmt::Display for StepLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", self.base_name, self.step, self.total_steps)
    }
}

/// Result of parsing a raw detector label
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLabel {
    /// Single-frame word, passed through as-is
    Plain,
    /// One step of a multi-step sequence
    Step(StepLabel),
}

impl ParsedLabel {
    /// Returns whether the label encodes a sequence step
    pub fn is_step(&self) -> bool {
        matches!(self, ParsedLabel::Step(_))
    }
}

/// Parse a raw detector label
///
/// A label containing `/` is treated as a step candidate: the segment after
/// the first slash must be an integer, and the segment before it must carry
/// at least one digit. Those digits form the step number and the remaining
/// characters the base name. If any of that fails the label is `Plain`.
/// Numbers too large for `u32` saturate, so they still parse as a step.
pub fn parse_label(label: &str) -> ParsedLabel {
    let mut parts = label.split('/');
    let (Some(head), Some(total)) = (parts.next(), parts.next()) else {
        return ParsedLabel::Plain;
    };

    let Some(total_steps) = parse_count(total.trim()) else {
        return ParsedLabel::Plain;
    };

    let (digits, base_name): (String, String) = head.chars().partition(|c| c.is_ascii_digit());

    match parse_count(&digits) {
        Some(step) => ParsedLabel::Step(StepLabel {
            base_name,
            step,
            total_steps,
        }),
        None => ParsedLabel::Plain,
    }
}

fn parse_count(text: &str) -> Option<u32> {
    match text.parse::<u32>() {
        Ok(n) => Some(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u32::MAX),
        Err(_) => None,
    }
}
