//! Per-frame detection deduplication
//!
//! A gesture held in front of the camera is detected on many consecutive
//! frames. The deduplicator drops a label when it repeats the last accepted
//! label within the cooldown window.

use std::time::{Duration, Instant};

/// Default cooldown before the same label is accepted again (in seconds)
pub const DEFAULT_COOLDOWN_SECS: f64 = 3.0;

/// The most recently accepted label
#[derive(Debug, Clone)]
struct LastDetection {
    label: String,
    at: Instant,
}

/// Suppresses repeats of the same label within a cooldown window
#[derive(Debug, Clone)]
pub struct DetectionDeduplicator {
    cooldown: Duration,
    last: Option<LastDetection>,
}

impl DetectionDeduplicator {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// Returns the cooldown window
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Sets the cooldown window
    ///
    /// A zero cooldown is rejected and the previous value is kept.
    pub fn set_cooldown(&mut self, cooldown: Duration) -> bool {
        if cooldown.is_zero() {
            tracing::warn!("Ignoring zero detection cooldown");
            return false;
        }
        self.cooldown = cooldown;
        tracing::info!("Detection cooldown updated: {:.1}s", cooldown.as_secs_f64());
        true
    }

    /// Returns the most recently accepted label
    pub fn last_label(&self) -> Option<&str> {
        self.last.as_ref().map(|l| l.label.as_str())
    }

    /// Check a single label, recording it if accepted
    pub fn accept(&mut self, label: &str, now: Instant) -> bool {
        if let Some(last) = &self.last {
            if last.label == label && now.saturating_duration_since(last.at) < self.cooldown {
                tracing::trace!("Suppressed duplicate detection: {}", label);
                return false;
            }
        }

        self.last = Some(LastDetection {
            label: label.to_string(),
            at: now,
        });
        true
    }

    /// Filter one frame's labels, preserving order
    pub fn filter<I, S>(&mut self, labels: I, now: Instant) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .filter(|label| self.accept(label.as_ref(), now))
            .map(|label| label.as_ref().to_string())
            .collect()
    }

    /// Forget the last accepted label
    pub fn reset(&mut self) {
        self.last = None;
        tracing::info!("Detection state reset");
    }
}

impl Default for DetectionDeduplicator {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(DEFAULT_COOLDOWN_SECS))
    }
}
