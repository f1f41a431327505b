//! Recognition session
//!
//! Wires the deduplicator, the sequence manager and the word accumulator
//! together for one camera session, and provides a thread-safe handle for
//! pipelines where capture and UI run on different threads.

use super::dedup::DetectionDeduplicator;
use super::sequence::{SequenceError, SequenceManager, SequenceStatus};
use super::vocabulary::{Detection, SignDetector, Vocabulary};
use crate::accumulator::WordAccumulator;
use crate::config::RecognitionConfig;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Something the consumer should react to after a frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A word was recognised and accumulated
    WordCompleted { word: String },
    /// The reset gesture removed the last word (if there was one)
    WordRemoved { word: Option<String> },
}

/// One signing session
pub struct RecognitionSession {
    vocabulary: Vocabulary,
    deduplicator: DetectionDeduplicator,
    sequences: SequenceManager,
    words: WordAccumulator,
    reset_label: String,
    confidence_threshold: f32,
    detection_interval: u32,
    status_interval: u32,
    frame_count: u64,
    status_due: bool,
    active: bool,
}

impl RecognitionSession {
    /// Creates an inactive session from configuration
    pub fn new(vocabulary: Vocabulary, config: &RecognitionConfig) -> Result<Self, SequenceError> {
        let sequences = SequenceManager::with_definitions(
            config.sequences.clone(),
            config.sequence_timeout(),
        )?;

        Ok(Self {
            vocabulary,
            deduplicator: DetectionDeduplicator::new(config.cooldown()),
            sequences,
            words: WordAccumulator::new(),
            reset_label: config.reset_label.clone(),
            confidence_threshold: config.confidence_threshold.clamp(0.0, 1.0),
            detection_interval: config.detection_interval.max(1),
            status_interval: config.status_interval.max(1),
            frame_count: 0,
            status_due: false,
            active: false,
        })
    }

    /// Returns whether the session is accepting detections
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start accepting detections with an empty word list
    pub fn start(&mut self) {
        self.words.clear();
        self.frame_count = 0;
        self.status_due = false;
        self.active = true;
        tracing::info!("Recognition session started");
    }

    /// Stop the session and return the accumulated words
    pub fn stop(&mut self) -> Vec<String> {
        self.active = false;
        self.deduplicator.reset();
        self.sequences.reset();
        let words = self.words.take();
        tracing::info!("Recognition session stopped ({} words)", words.len());
        words
    }

    /// Words recognised so far
    pub fn words(&self) -> &WordAccumulator {
        &self.words
    }

    /// Take the recognised words, e.g. to build a sentence
    pub fn take_words(&mut self) -> Vec<String> {
        self.words.take()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn sequences(&self) -> &SequenceManager {
        &self.sequences
    }

    pub fn sequences_mut(&mut self) -> &mut SequenceManager {
        &mut self.sequences
    }

    /// Snapshot of sequence progress
    pub fn status(&self) -> SequenceStatus {
        self.sequences.status()
    }

    /// Whether the frame last passed to [`Self::process_frame`] is due for a
    /// status report
    ///
    /// Frames are counted from zero, so with an interval of 10 this is true
    /// after frames 0, 10, 20 and so on.
    pub fn should_report_status(&self) -> bool {
        self.status_due
    }

    /// Run the detector on a frame, if this frame is due for detection
    pub fn process_frame<D: SignDetector>(
        &mut self,
        detector: &mut D,
        frame: &D::Frame,
        now: Instant,
    ) -> Vec<SessionEvent> {
        let due = self.frame_count % u64::from(self.detection_interval) == 0;
        self.status_due = self.frame_count % u64::from(self.status_interval) == 0;
        self.frame_count += 1;

        if !due || !self.active {
            return Vec::new();
        }

        match detector.detect(frame) {
            Ok(detections) => self.process_detections(&detections, now),
            Err(e) => {
                tracing::error!("Sign detection failed: {:#}", e);
                Vec::new()
            }
        }
    }

    /// Process raw detector output for one frame
    pub fn process_detections(
        &mut self,
        detections: &[Detection],
        now: Instant,
    ) -> Vec<SessionEvent> {
        let labels = self
            .vocabulary
            .labels_for(detections, self.confidence_threshold);
        self.process_labels(labels.as_slice(), now)
    }

    /// Process one frame's labels
    ///
    /// At most one word completes per frame; reset gestures before it are
    /// all applied.
    pub fn process_labels<S: AsRef<str>>(
        &mut self,
        labels: &[S],
        now: Instant,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.active || labels.is_empty() {
            return events;
        }

        for label in self.deduplicator.filter(labels, now) {
            if label == self.reset_label {
                self.sequences.reset();
                events.push(SessionEvent::WordRemoved {
                    word: self.words.undo_last(),
                });
                continue;
            }

            match self.sequences.process(&label, now) {
                Some(word) if !word.is_empty() => {
                    self.words.push(word.clone());
                    events.push(SessionEvent::WordCompleted { word });
                    break;
                }
                Some(_) => tracing::debug!("Skipping empty word"),
                None => {}
            }
        }

        events
    }

    pub fn set_cooldown(&mut self, cooldown: Duration) -> bool {
        self.deduplicator.set_cooldown(cooldown)
    }

    pub fn set_sequence_timeout(&mut self, timeout: Duration) -> bool {
        if timeout.is_zero() {
            tracing::warn!("Ignoring zero sequence timeout");
            return false;
        }
        self.sequences.set_timeout(timeout);
        true
    }

    /// Update the confidence threshold (0.0 to 1.0)
    pub fn set_confidence_threshold(&mut self, threshold: f32) -> bool {
        if !(0.0..=1.0).contains(&threshold) {
            tracing::warn!("Ignoring confidence threshold out of range: {}", threshold);
            return false;
        }
        self.confidence_threshold = threshold;
        tracing::info!("Confidence threshold updated: {}", threshold);
        true
    }

    /// Update how often (in frames) the detector runs
    pub fn set_detection_interval(&mut self, frames: u32) -> bool {
        if frames == 0 {
            tracing::warn!("Ignoring zero detection interval");
            return false;
        }
        self.detection_interval = frames;
        tracing::info!("Detection interval updated: {} frames", frames);
        true
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn detection_interval(&self) -> u32 {
        self.detection_interval
    }
}

/// Thread-safe handle to a [`RecognitionSession`]
///
/// Every call takes the session lock, so at most one operation is in
/// flight at a time.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<RecognitionSession>>,
}

impl SharedSession {
    pub fn new(session: RecognitionSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn start(&self) {
        self.inner.lock().start();
    }

    pub fn stop(&self) -> Vec<String> {
        self.inner.lock().stop()
    }

    pub fn process_detections(&self, detections: &[Detection], now: Instant) -> Vec<SessionEvent> {
        self.inner.lock().process_detections(detections, now)
    }

    pub fn process_labels<S: AsRef<str>>(&self, labels: &[S], now: Instant) -> Vec<SessionEvent> {
        self.inner.lock().process_labels(labels, now)
    }

    /// Apply the sequence timeout without new input
    pub fn expire(&self, now: Instant) -> bool {
        self.inner.lock().sequences_mut().expire(now)
    }

    pub fn status(&self) -> SequenceStatus {
        self.inner.lock().status()
    }

    pub fn words(&self) -> Vec<String> {
        self.inner.lock().words().words().to_vec()
    }

    /// Run a closure with exclusive access to the session
    pub fn with<R>(&self, f: impl FnOnce(&mut RecognitionSession) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RecognitionSession {
        let mut session =
            RecognitionSession::new(Vocabulary::korean_default(), &RecognitionConfig::default())
                .unwrap();
        session.start();
        session
    }

    fn at(t0: Instant, secs: u64) -> Instant {
        t0 + Duration::from_secs(secs)
    }

    fn completed(word: &str) -> SessionEvent {
        SessionEvent::WordCompleted {
            word: word.to_string(),
        }
    }

    struct ScriptedDetector {
        frames: Vec<anyhow::Result<Vec<Detection>>>,
        calls: usize,
    }

    impl SignDetector for ScriptedDetector {
        type Frame = ();

        fn detect(&mut self, _frame: &()) -> anyhow::Result<Vec<Detection>> {
            self.calls += 1;
            if self.frames.is_empty() {
                return Ok(Vec::new());
            }
            self.frames.remove(0)
        }
    }

    #[test]
    fn test_plain_word_is_accumulated() {
        let mut session = session();
        let events = session.process_labels(&["학교"], Instant::now());

        assert_eq!(events, vec![completed("학교")]);
        assert_eq!(session.words().display_text(), "학교");
    }

    #[test]
    fn test_sequence_across_frames() {
        let mut session = session();
        let t0 = Instant::now();

        assert!(session.process_labels(&["구급차1/3"], at(t0, 0)).is_empty());
        assert!(session.process_labels(&["구급차2/3"], at(t0, 1)).is_empty());
        assert_eq!(
            session.process_labels(&["구급차3/3"], at(t0, 2)),
            vec![completed("구급차")]
        );
    }

    #[test]
    fn test_one_completed_word_per_frame() {
        let mut session = session();
        let events = session.process_labels(&["나", "학교"], Instant::now());

        assert_eq!(events, vec![completed("나")]);
        assert_eq!(session.words().len(), 1);
    }

    #[test]
    fn test_reset_label_removes_last_word() {
        let mut session = session();
        let t0 = Instant::now();

        session.process_labels(&["나"], at(t0, 0));
        session.process_labels(&["아프다"], at(t0, 1));
        let events = session.process_labels(&["리셋"], at(t0, 2));

        assert_eq!(
            events,
            vec![SessionEvent::WordRemoved {
                word: Some("아프다".to_string())
            }]
        );
        assert_eq!(session.words().display_text(), "나");
    }

    #[test]
    fn test_reset_label_with_no_words() {
        let mut session = session();
        let events = session.process_labels(&["리셋"], Instant::now());
        assert_eq!(events, vec![SessionEvent::WordRemoved { word: None }]);
    }

    #[test]
    fn test_reset_label_abandons_sequence_and_continues() {
        let mut session = session();
        let t0 = Instant::now();

        session.process_labels(&["쓰러지다1/2"], at(t0, 0));
        let events = session.process_labels(&["리셋", "병원"], at(t0, 1));

        assert_eq!(
            events,
            vec![SessionEvent::WordRemoved { word: None }, completed("병원")]
        );
        assert_eq!(session.status(), SequenceStatus::Idle);
    }

    #[test]
    fn test_duplicates_are_filtered() {
        let mut session = session();
        let t0 = Instant::now();

        assert_eq!(session.process_labels(&["학교"], at(t0, 0)).len(), 1);
        assert!(session.process_labels(&["학교"], at(t0, 1)).is_empty());
        assert_eq!(session.process_labels(&["학교"], at(t0, 4)).len(), 1);
        assert_eq!(session.words().len(), 2);
    }

    #[test]
    fn test_inactive_session_ignores_labels() {
        let mut session =
            RecognitionSession::new(Vocabulary::korean_default(), &RecognitionConfig::default())
                .unwrap();
        assert!(!session.is_active());
        assert!(session.process_labels(&["학교"], Instant::now()).is_empty());
        assert!(session.words().is_empty());
    }

    #[test]
    fn test_stop_returns_words_and_resets_state() {
        let mut session = session();
        let t0 = Instant::now();

        session.process_labels(&["나"], at(t0, 0));
        session.process_labels(&["구급차1/3"], at(t0, 1));
        assert!(session.status().is_in_progress());

        assert_eq!(session.stop(), vec!["나".to_string()]);
        assert_eq!(session.status(), SequenceStatus::Idle);
        assert!(!session.is_active());

        // dedup state was cleared, so the same label passes straight away
        session.start();
        assert_eq!(session.process_labels(&["나"], at(t0, 2)).len(), 1);
    }

    #[test]
    fn test_process_detections_applies_threshold() {
        let mut session = session();
        let detections = [Detection::new(3, 0.2), Detection::new(6, 0.7)];

        let events = session.process_detections(&detections, Instant::now());
        assert_eq!(events, vec![completed("아프다")]);
    }

    #[test]
    fn test_process_frame_respects_detection_interval() {
        let mut session = session();
        assert!(session.set_detection_interval(3));
        let mut detector = ScriptedDetector {
            frames: vec![
                Ok(vec![Detection::new(8, 0.9)]),
                Ok(vec![Detection::new(3, 0.9)]),
            ],
            calls: 0,
        };
        let t0 = Instant::now();

        let mut events = Vec::new();
        for i in 0..6 {
            events.extend(session.process_frame(&mut detector, &(), at(t0, i)));
        }

        assert_eq!(detector.calls, 2);
        assert_eq!(events, vec![completed("나"), completed("학교")]);
    }

    #[test]
    fn test_process_frame_detector_error_is_empty() {
        let mut session = session();
        let mut detector = ScriptedDetector {
            frames: vec![Err(anyhow::anyhow!("model not loaded"))],
            calls: 0,
        };

        assert!(session
            .process_frame(&mut detector, &(), Instant::now())
            .is_empty());
        assert_eq!(detector.calls, 1);
    }

    #[test]
    fn test_status_interval() {
        let mut session = session();
        let mut detector = ScriptedDetector {
            frames: Vec::new(),
            calls: 0,
        };
        assert!(!session.should_report_status());

        // Default interval is 10: frames 0, 10 and 20 report
        let reported: Vec<usize> = (0..25)
            .filter(|_| {
                session.process_frame(&mut detector, &(), Instant::now());
                session.should_report_status()
            })
            .collect();
        assert_eq!(reported, vec![0, 10, 20]);
    }

    #[test]
    fn test_empty_completed_word_is_skipped() {
        let mut session = session();
        session
            .sequences_mut()
            .add_definition("빈", crate::recognition::SequenceDefinition::new(2, ""))
            .unwrap();
        let t0 = Instant::now();

        session.process_labels(&["빈1/2"], at(t0, 0));
        let events = session.process_labels(&["빈2/2", "학교"], at(t0, 1));
        assert_eq!(events, vec![completed("학교")]);
        assert_eq!(session.words().words(), ["학교".to_string()]);

        let events = session.process_labels(&["", "병원"], at(t0, 2));
        assert_eq!(events, vec![completed("병원")]);
        assert_eq!(session.words().len(), 2);
    }

    #[test]
    fn test_runtime_updates_validate() {
        let mut session = session();

        assert!(!session.set_confidence_threshold(1.5));
        assert!(session.set_confidence_threshold(0.8));
        assert_eq!(session.confidence_threshold(), 0.8);

        assert!(!session.set_detection_interval(0));
        assert_eq!(session.detection_interval(), 30);

        assert!(!session.set_sequence_timeout(Duration::ZERO));
        assert!(session.set_sequence_timeout(Duration::from_secs(5)));
        assert_eq!(session.sequences().timeout(), Duration::from_secs(5));

        assert!(session.set_cooldown(Duration::from_secs(1)));
    }

    #[test]
    fn test_invalid_sequence_config_is_rejected() {
        let mut config = RecognitionConfig::default();
        config
            .sequences
            .insert("손".to_string(), crate::recognition::SequenceDefinition::new(1, "손"));

        assert!(RecognitionSession::new(Vocabulary::korean_default(), &config).is_err());
    }

    #[test]
    fn test_shared_session_across_threads() {
        let shared = SharedSession::new(session());
        let t0 = Instant::now();

        let worker = {
            let shared = shared.clone();
            std::thread::spawn(move || {
                shared.process_labels(&["사람1/2"], t0);
                shared.process_labels(&["사람2/2"], t0 + Duration::from_secs(1))
            })
        };

        let events = worker.join().unwrap();
        assert_eq!(events, vec![completed("사람")]);
        assert_eq!(shared.words(), vec!["사람".to_string()]);
        assert_eq!(shared.status(), SequenceStatus::Idle);
    }

    #[test]
    fn test_shared_session_expire() {
        let shared = SharedSession::new(session());
        let t0 = Instant::now();

        shared.process_labels(&["구급차1/3"], t0);
        assert!(shared.expire(t0 + Duration::from_secs(11)));
        assert_eq!(shared.status(), SequenceStatus::Idle);
        assert_eq!(shared.with(|s| s.words().len()), 0);
    }
}
