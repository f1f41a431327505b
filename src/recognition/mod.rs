//! Sign gesture recognition
//!
//! Turns per-frame detector output into completed words.
//!
//! ## Pipeline
//!
//! ```text
//! frame ─► SignDetector ─► Vocabulary ─► DetectionDeduplicator ─► SequenceManager ─► word
//!          (class ids)     (labels)      (drop repeats)           (one label at a time)
//! ```
//!
//! ## Sequence states
//!
//! Multi-step gestures are labelled `<base><step>/<total>`, e.g. `구급차2/3`.
//!
//! ```text
//!            step 1                      next step (not last)
//! ┌──────┐ ────────────► ┌─────────────┐ ◄──────────────┐
//! │ IDLE │               │ IN_PROGRESS │ ───────────────┘
//! └──────┘ ◄──────────── └─────────────┘
//!     ▲    plain word / timeout / skip / reset     │
//!     │                                            │ last step
//!     └────────────────────────────────────────────┘ (emit completed word)
//! ```
//!
//! Repeats of the current step are ignored. A non-initial step of another
//! sequence is ignored; step 1 of another sequence replaces the current one.
//! The timeout is checked lazily when the next label arrives, or explicitly
//! through [`SequenceManager::expire`].

pub mod dedup;
pub mod label;
pub mod sequence;
pub mod session;
pub mod vocabulary;

pub use dedup::DetectionDeduplicator;
pub use label::{parse_label, ParsedLabel, StepLabel};
pub use sequence::{SequenceDefinition, SequenceError, SequenceManager, SequenceStatus};
pub use session::{RecognitionSession, SessionEvent, SharedSession};
pub use vocabulary::{Detection, GestureClass, SignDetector, Vocabulary};
