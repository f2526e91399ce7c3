use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::FormatError;

// @module: Subtitle values shared by the parser, the writer and the merge engine

/// Which input track a line of text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineSource {
    /// Freshly parsed text that has not been merged with anything
    #[default]
    Single,
    /// Line taken from the upper (first priority) track
    Upper,
    /// Line taken from the lower (second priority) track
    Lower,
}

impl LineSource {
    /// The side a line from this source competes with during merging
    pub fn counterpart(self) -> Self {
        match self {
            Self::Upper => Self::Lower,
            Self::Lower => Self::Upper,
            Self::Single => Self::Single,
        }
    }
}

/// One displayed line of text tagged with its origin
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    // @field: Raw text, may contain inline markup
    pub text: String,

    // @field: Originating track
    pub source: LineSource,
}

impl Line {
    pub fn new(text: impl Into<String>, source: LineSource) -> Self {
        Line {
            text: text.into(),
            source,
        }
    }

    /// Same text, different origin tag
    pub fn retagged(&self, source: LineSource) -> Self {
        Line {
            text: self.text.clone(),
            source,
        }
    }
}

// @struct: Single timed subtitle entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    // @field: Sequence number, display only
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Displayed lines, top to bottom
    pub lines: Vec<Line>,
}

impl Cue {
    /// Creates a new cue
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, lines: Vec<Line>) -> Self {
        Cue {
            seq_num,
            start_time_ms,
            end_time_ms,
            lines,
        }
    }

    /// Creates a cue from plain strings, all tagged with the same source
    pub fn from_texts(seq_num: usize, start_time_ms: u64, end_time_ms: u64, texts: &[&str], source: LineSource) -> Self {
        let lines = texts.iter().map(|text| Line::new(*text, source)).collect();
        Self::new(seq_num, start_time_ms, end_time_ms, lines)
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }

    /// Distinct sources present among the lines
    pub fn sources(&self) -> BTreeSet<LineSource> {
        self.lines.iter().map(|line| line.source).collect()
    }

    /// True if at least one line came from `source`
    pub fn has_source(&self, source: LineSource) -> bool {
        self.lines.iter().any(|line| line.source == source)
    }

    /// Lines from `source`, in their original order
    pub fn lines_from(&self, source: LineSource) -> Vec<Line> {
        self.lines
            .iter()
            .filter(|line| line.source == source)
            .cloned()
            .collect()
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm`) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, FormatError> {
        let invalid = || FormatError::InvalidTimestamp(timestamp.to_string());

        let (clock, millis) = timestamp.split_once(',').ok_or_else(invalid)?;
        let parts: Vec<&str> = clock.split(':').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(parts[0])
            || parts[1].len() != 2
            || parts[2].len() != 2
            || millis.len() != 3
            || !all_digits(parts[1])
            || !all_digits(parts[2])
            || !all_digits(millis)
        {
            return Err(invalid());
        }

        let hours: u64 = parts[0].parse().map_err(|_| invalid())?;
        let minutes: u64 = parts[1].parse().map_err(|_| invalid())?;
        let seconds: u64 = parts[2].parse().map_err(|_| invalid())?;
        let millis: u64 = millis.parse().map_err(|_| invalid())?;

        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .ok_or_else(invalid)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// The `start --> end` line of this cue
    pub fn format_time_range(&self) -> String {
        format!(
            "{} --> {}",
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms)
        )
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{}", self.format_time_range())?;
        for line in &self.lines {
            writeln!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

/// Ordered, non-overlapping cues plus the languages they are written in
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Track {
    /// Cues sorted by start time
    pub cues: Vec<Cue>,

    /// Language identifiers associated with the track, possibly none
    #[serde(default)]
    pub language_tags: Vec<String>,
}

impl Track {
    pub fn new(cues: Vec<Cue>) -> Self {
        Track {
            cues,
            language_tags: Vec::new(),
        }
    }

    /// Same cues, with the given language tags
    pub fn with_language_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.language_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Copy of the track with sequence numbers set to 1..N
    pub fn renumbered(&self) -> Self {
        let cues = self
            .cues
            .iter()
            .enumerate()
            .map(|(i, cue)| Cue {
                seq_num: i + 1,
                ..cue.clone()
            })
            .collect();

        Track {
            cues,
            language_tags: self.language_tags.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Sum of all cue durations
    pub fn total_duration_ms(&self) -> u64 {
        self.cues.iter().map(Cue::duration_ms).sum()
    }

    /// Number of cues whose end runs past the next cue's start
    pub fn overlap_count(&self) -> usize {
        self.cues
            .windows(2)
            .filter(|pair| pair[0].end_time_ms > pair[1].start_time_ms)
            .count()
    }
}
