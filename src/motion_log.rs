//! Reader for recorded motion logs.
//!
//! A log is a stream of whitespace-separated numbers; line breaks carry no
//! meaning. Each entry holds, for every one of the N declared sources,
//! linear velocity x/y/z followed by angular velocity x/y/z, and ends with
//! the elapsed time since the previous entry:
//!
//! ```text
//! vx vy vz wx wy wz   [... repeated per source ...]   dt
//! ```
//!
//! `#` starts a comment running to the end of the line. A stream that ends
//! in the middle of an entry is an error; so is any token that is not a
//! finite number. There is no skipping: the first bad entry ends the replay.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use nalgebra::Vector3;

use crate::error::{Result, ValidationError};
use crate::types::{MotionEntry, SourceSample, VALUES_PER_SOURCE};

/// Streaming parser yielding one [`MotionEntry`] at a time.
pub struct MotionLogReader<R> {
    reader: R,
    sources: usize,
    /// Parsed values not yet consumed, with the line they came from
    pending: VecDeque<(f64, usize)>,
    line_number: usize,
    line: String,
    finished: bool,
    entries_read: u64,
}

impl<R: BufRead> MotionLogReader<R> {
    pub fn new(reader: R, sources: usize) -> std::result::Result<Self, ValidationError> {
        if sources == 0 {
            return Err(ValidationError::new(
                "MotionLogReader::new",
                "At least one sensor source is required per log entry",
            ));
        }
        Ok(Self {
            reader,
            sources,
            pending: VecDeque::new(),
            line_number: 0,
            line: String::new(),
            finished: false,
            entries_read: 0,
        })
    }

    pub fn sources(&self) -> usize {
        self.sources
    }

    /// Number of values making up a complete entry.
    pub fn entry_len(&self) -> usize {
        self.sources * VALUES_PER_SOURCE + 1
    }

    pub fn entries_read(&self) -> u64 {
        self.entries_read
    }

    /// Read lines until `needed` values are buffered.
    ///
    /// Returns `false` if the stream ended first.
    fn fill(&mut self, needed: usize) -> Result<bool> {
        while self.pending.len() < needed {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            self.line_number += 1;

            let content = match self.line.find('#') {
                Some(idx) => &self.line[..idx],
                None => self.line.as_str(),
            };
            for token in content.split_whitespace() {
                let value = token
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        ValidationError::new(
                            "read_motion_log",
                            format!(
                                "Malformed value '{token}' on log line {}",
                                self.line_number
                            ),
                        )
                    })?;
                self.pending.push_back((value, self.line_number));
            }
        }
        Ok(true)
    }

    /// Next complete entry, or `None` on a clean end of stream.
    pub fn next_entry(&mut self) -> Result<Option<MotionEntry>> {
        let entry_len = self.entry_len();
        if !self.fill(entry_len)? {
            if self.pending.is_empty() {
                return Ok(None);
            }
            let start_line = self.pending.front().map(|(_, line)| *line).unwrap_or(0);
            return Err(ValidationError::new(
                "read_motion_log",
                format!(
                    "Incomplete log entry at end of stream: expected {entry_len} values for {} source(s), found {} (entry starts on line {start_line})",
                    self.sources,
                    self.pending.len()
                ),
            )
            .into());
        }

        let values: Vec<(f64, usize)> = self.pending.drain(..entry_len).collect();
        let samples = values[..entry_len - 1]
            .chunks_exact(VALUES_PER_SOURCE)
            .map(|chunk| {
                SourceSample::new(
                    Vector3::new(chunk[0].0, chunk[1].0, chunk[2].0),
                    Vector3::new(chunk[3].0, chunk[4].0, chunk[5].0),
                )
            })
            .collect();

        let (dt, dt_line) = values[entry_len - 1];
        if dt < 0.0 {
            return Err(ValidationError::new(
                "read_motion_log",
                format!("Elapsed time must not be negative. Found {dt} on log line {dt_line}"),
            )
            .into());
        }

        self.entries_read += 1;
        Ok(Some(MotionEntry { samples, dt }))
    }
}

impl<R: BufRead> Iterator for MotionLogReader<R> {
    type Item = Result<MotionEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Open a motion log, decompressing `.gz` files on the fly.
pub fn open_log(path: &Path, sources: usize) -> Result<MotionLogReader<Box<dyn BufRead>>> {
    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = if path.extension().map(|e| e == "gz").unwrap_or(false) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(MotionLogReader::new(reader, sources)?)
}
