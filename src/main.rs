//! Replay recorded detector labels through a recognition session
//!
//! Input lines look like `<seconds> <label> [<label>...]`, one frame per
//! line, with seconds measured from the start of the recording. Blank lines
//! and lines starting with `#` are skipped.
//!
//! Usage: `sueo [FILE]` (reads stdin when no file is given)

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, BufReader};
use std::time::{Duration, Instant};
use sueo_lib::config;
use sueo_lib::recognition::{RecognitionSession, SessionEvent, Vocabulary};

/// One recorded frame
#[derive(Debug, PartialEq)]
struct Frame {
    offset: Duration,
    labels: Vec<String>,
}

fn parse_frame(line: &str) -> Result<Option<Frame>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut fields = line.split_whitespace();
    let seconds: f64 = fields
        .next()
        .context("missing timestamp")?
        .parse()
        .context("invalid timestamp")?;
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("timestamp must be a non-negative number of seconds");
    }

    Ok(Some(Frame {
        offset: Duration::from_secs_f64(seconds),
        labels: fields.map(str::to_string).collect(),
    }))
}

fn replay(input: impl BufRead, session: &mut RecognitionSession) -> Result<()> {
    let origin = Instant::now();
    session.start();

    for (index, line) in input.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let Some(frame) =
            parse_frame(&line).with_context(|| format!("line {}: {:?}", index + 1, line))?
        else {
            continue;
        };

        let now = origin + frame.offset;
        for event in session.process_labels(frame.labels.as_slice(), now) {
            match event {
                SessionEvent::WordCompleted { word } => {
                    println!("{:>8.2}s  + {}", frame.offset.as_secs_f64(), word)
                }
                SessionEvent::WordRemoved { word: Some(word) } => {
                    println!("{:>8.2}s  - {}", frame.offset.as_secs_f64(), word)
                }
                SessionEvent::WordRemoved { word: None } => {
                    println!("{:>8.2}s  - (nothing to remove)", frame.offset.as_secs_f64())
                }
            }
        }

        if let Some(progress) = session.status().progress() {
            if let Some(sequence) = session.sequences().current_sequence() {
                println!("{:>8.2}s    {} ({})", frame.offset.as_secs_f64(), sequence, progress);
            }
        }
    }

    let words = session.stop();
    println!("words: {}", words.join(", "));
    Ok(())
}

fn main() -> Result<()> {
    sueo_lib::init_logging();

    let cfg = config::get_config();
    let mut session = RecognitionSession::new(Vocabulary::korean_default(), &cfg.recognition)
        .context("invalid recognition config")?;

    match std::env::args().nth(1) {
        Some(path) => {
            let file = std::fs::File::open(&path).with_context(|| format!("cannot open {}", path))?;
            replay(BufReader::new(file), &mut session)
        }
        None => replay(io::stdin().lock(), &mut session),
    }
}
