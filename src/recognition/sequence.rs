//! Multi-step gesture sequence state machine
//!
//! Turns a stream of deduplicated detector labels into completed words.
//! Plain labels complete immediately; step labels complete a word only once
//! every step of a known sequence has been seen in order, within the
//! sequence timeout.

use super::label::{parse_label, ParsedLabel, StepLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Default maximum gap between consecutive steps (in seconds)
pub const DEFAULT_SEQUENCE_TIMEOUT_SECS: f64 = 10.0;

/// A known multi-step gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDefinition {
    /// Number of steps (at least 2)
    pub total_steps: u32,
    /// Word emitted once the final step is seen
    pub completed_word: String,
}

impl SequenceDefinition {
    pub fn new(total_steps: u32, completed_word: impl Into<String>) -> Self {
        Self {
            total_steps,
            completed_word: completed_word.into(),
        }
    }
}

/// Errors raised when configuring sequence definitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("Sequence '{base_name}' needs at least 2 steps, got {total_steps}")]
    TooFewSteps { base_name: String, total_steps: u32 },

    #[error("Sequence base name cannot be empty")]
    EmptyBaseName,

    #[error("Sequence base name '{0}' cannot contain digits or '/'")]
    InvalidBaseName(String),
}

/// Read-only snapshot of sequence progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SequenceStatus {
    /// No sequence in progress
    Idle,
    /// A sequence has started but not finished
    InProgress {
        sequence: String,
        current_step: u32,
        total_steps: u32,
    },
}

impl SequenceStatus {
    /// Returns whether a sequence is in progress
    pub fn is_in_progress(&self) -> bool {
        matches!(self, SequenceStatus::InProgress { .. })
    }

    /// Progress as `current/total`, if a sequence is in progress
    pub fn progress(&self) -> Option<String> {
        match self {
            SequenceStatus::Idle => None,
            SequenceStatus::InProgress {
                current_step,
                total_steps,
                ..
            } => Some(format!("{}/{}", current_step, total_steps)),
        }
    }
}

/// The sequence currently being tracked
#[derive(Debug, Clone)]
struct Progress {
    sequence: String,
    current_step: u32,
    last_update: Instant,
}

/// Sequence manager
///
/// Tracks at most one in-progress sequence. Not thread-safe on its own;
/// callers sharing it across threads must serialize access (see
/// [`SharedSession`](super::session::SharedSession)).
#[derive(Debug, Clone)]
pub struct SequenceManager {
    definitions: BTreeMap<String, SequenceDefinition>,
    timeout: Duration,
    progress: Option<Progress>,
}

impl SequenceManager {
    /// Creates a manager with no definitions
    pub fn new(timeout: Duration) -> Self {
        tracing::info!(
            "Sequence manager initialised (timeout: {:.1}s)",
            timeout.as_secs_f64()
        );
        Self {
            definitions: BTreeMap::new(),
            timeout,
            progress: None,
        }
    }

    /// Creates a manager with the given definitions
    pub fn with_definitions<I>(definitions: I, timeout: Duration) -> Result<Self, SequenceError>
    where
        I: IntoIterator<Item = (String, SequenceDefinition)>,
    {
        let mut manager = Self::new(timeout);
        for (base_name, definition) in definitions {
            manager.add_definition(base_name, definition)?;
        }
        Ok(manager)
    }

    /// Returns the sequence timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sets the sequence timeout
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
        tracing::info!("Sequence timeout updated: {:.1}s", timeout.as_secs_f64());
    }

    /// Returns all configured definitions
    pub fn definitions(&self) -> &BTreeMap<String, SequenceDefinition> {
        &self.definitions
    }

    /// Add or replace a sequence definition
    pub fn add_definition(
        &mut self,
        base_name: impl Into<String>,
        definition: SequenceDefinition,
    ) -> Result<(), SequenceError> {
        let base_name = base_name.into();

        if base_name.is_empty() {
            return Err(SequenceError::EmptyBaseName);
        }
        if base_name.chars().any(|c| c.is_ascii_digit() || c == '/') {
            return Err(SequenceError::InvalidBaseName(base_name));
        }
        if definition.total_steps < 2 {
            return Err(SequenceError::TooFewSteps {
                base_name,
                total_steps: definition.total_steps,
            });
        }

        tracing::info!(
            "Sequence definition added: {} ({} steps) -> {}",
            base_name,
            definition.total_steps,
            definition.completed_word
        );

        // The active sequence must still have a step left to complete on
        if self.current_sequence() == Some(base_name.as_str())
            && definition.total_steps <= self.current_step()
        {
            tracing::info!("Sequence abandoned after redefinition: {}", base_name);
            self.reset();
        }

        self.definitions.insert(base_name, definition);
        Ok(())
    }

    /// Remove a sequence definition
    ///
    /// If the removed sequence is in progress it is abandoned immediately,
    /// otherwise it could never complete.
    pub fn remove_definition(&mut self, base_name: &str) -> Option<SequenceDefinition> {
        let removed = self.definitions.remove(base_name)?;
        tracing::info!("Sequence definition removed: {}", base_name);

        if self.current_sequence() == Some(base_name) {
            self.reset();
        }
        Some(removed)
    }

    /// Returns the base name of the in-progress sequence
    pub fn current_sequence(&self) -> Option<&str> {
        self.progress.as_ref().map(|p| p.sequence.as_str())
    }

    /// Returns the last confirmed step (0 when idle)
    pub fn current_step(&self) -> u32 {
        self.progress.as_ref().map_or(0, |p| p.current_step)
    }

    /// Snapshot of the current progress
    pub fn status(&self) -> SequenceStatus {
        let Some(progress) = &self.progress else {
            return SequenceStatus::Idle;
        };

        match self.definitions.get(&progress.sequence) {
            Some(definition) => SequenceStatus::InProgress {
                sequence: progress.sequence.clone(),
                current_step: progress.current_step,
                total_steps: definition.total_steps,
            },
            None => SequenceStatus::Idle,
        }
    }

    /// Abandon the in-progress sequence, if any
    pub fn reset(&mut self) {
        if let Some(progress) = self.progress.take() {
            tracing::info!(
                "Sequence reset: {} (step {})",
                progress.sequence,
                progress.current_step
            );
        }
    }

    /// Apply the timeout without processing a label
    ///
    /// Returns true if an in-progress sequence was abandoned.
    pub fn expire(&mut self, now: Instant) -> bool {
        let timed_out = self
            .progress
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.last_update) > self.timeout);

        if timed_out {
            if let Some(progress) = &self.progress {
                tracing::info!(
                    "Sequence timed out: {} (step {})",
                    progress.sequence,
                    progress.current_step
                );
            }
            self.reset();
        }
        timed_out
    }

    /// Process one label and return the completed word, if any
    pub fn process(&mut self, label: &str, now: Instant) -> Option<String> {
        self.expire(now);

        let step = match parse_label(label) {
            ParsedLabel::Step(step) => step,
            ParsedLabel::Plain => {
                if let Some(sequence) = self.current_sequence() {
                    tracing::info!("Sequence interrupted: {} -> plain word {}", sequence, label);
                    self.reset();
                }
                return Some(label.to_string());
            }
        };

        let Some(total_steps) = self.definitions.get(&step.base_name).map(|d| d.total_steps)
        else {
            tracing::warn!("Unknown sequence: {}", step.base_name);
            return None;
        };

        if self.current_sequence() != Some(step.base_name.as_str()) {
            if step.step == 1 {
                tracing::info!("Sequence started: {} (1/{})", step.base_name, total_steps);
                self.begin(step.base_name, now);
            } else {
                tracing::info!("Ignoring mid-sequence step: {}", label);
            }
            return None;
        }

        self.continue_sequence(step, total_steps, label, now)
    }

    fn continue_sequence(
        &mut self,
        step: StepLabel,
        total_steps: u32,
        label: &str,
        now: Instant,
    ) -> Option<String> {
        let current_step = self.current_step();
        let expected = current_step + 1;

        if step.step == expected {
            if let Some(progress) = self.progress.as_mut() {
                progress.current_step = step.step;
                progress.last_update = now;
            }
            tracing::info!(
                "Sequence advanced: {} ({}/{})",
                step.base_name,
                step.step,
                total_steps
            );

            if step.step == total_steps {
                let completed = self
                    .definitions
                    .get(&step.base_name)
                    .map(|d| d.completed_word.clone());
                tracing::info!("Sequence completed: {} -> {:?}", step.base_name, completed);
                self.progress = None;
                return completed;
            }
            return None;
        }

        if step.step == current_step {
            tracing::debug!("Ignoring repeated step: {}", label);
            return None;
        }

        tracing::warn!(
            "Out-of-order sequence step: {} (expected {}{})",
            label,
            step.base_name,
            expected
        );
        self.reset();

        if step.step == 1 {
            tracing::info!("Sequence restarted: {}", step.base_name);
            self.begin(step.base_name, now);
        }
        None
    }

    fn begin(&mut self, sequence: String, now: Instant) {
        self.progress = Some(Progress {
            sequence,
            current_step: 1,
            last_update: now,
        });
    }
}

impl Default for SequenceManager {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(DEFAULT_SEQUENCE_TIMEOUT_SECS))
    }
}
