/*!
 * SubRip (SRT) parser.
 *
 * Parsing is driven by a four-state machine keyed on the structural position
 * inside a block (number, time range, first text line, further text lines)
 * rather than by sniffing line contents, so subtitle text that happens to look
 * like a number or a time range is never misread.
 */

use log::debug;

use crate::errors::FormatError;
use crate::subtitle_model::{Cue, Line, LineSource, Track};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Position of the parser inside the current block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    AwaitingNumber,
    AwaitingTimeRange,
    AwaitingFirstLine,
    AwaitingMoreLinesOrBlank,
}

/// Incremental line-by-line SubRip parser
#[derive(Debug)]
pub struct SrtParser {
    state: ParserState,
    source: LineSource,
    line_number: usize,
    seq_num: usize,
    start_time_ms: u64,
    end_time_ms: u64,
    lines: Vec<Line>,
    cues: Vec<Cue>,
}

impl SrtParser {
    /// Creates a parser that tags every parsed line with `source`
    pub fn new(source: LineSource) -> Self {
        SrtParser {
            state: ParserState::AwaitingNumber,
            source,
            line_number: 0,
            seq_num: 0,
            start_time_ms: 0,
            end_time_ms: 0,
            lines: Vec::new(),
            cues: Vec::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Feed one raw input line (without its line terminator)
    pub fn feed_line(&mut self, raw: &str) -> Result<(), FormatError> {
        self.line_number += 1;
        let line = raw.trim_start_matches(BYTE_ORDER_MARK).trim();
        let blank = line.is_empty();

        match self.state {
            ParserState::AwaitingNumber => {
                if !blank {
                    self.seq_num = Self::parse_sequence_number(line).ok_or_else(|| {
                        FormatError::InvalidSequenceNumber {
                            line: self.line_number,
                            value: line.to_string(),
                        }
                    })?;
                    self.state = ParserState::AwaitingTimeRange;
                }
            }
            ParserState::AwaitingTimeRange => {
                if !blank {
                    let (start, end) = Self::parse_time_range(line, self.line_number)?;
                    self.start_time_ms = start;
                    self.end_time_ms = end;
                    self.state = ParserState::AwaitingFirstLine;
                }
            }
            ParserState::AwaitingFirstLine => {
                if !blank {
                    self.lines.push(Line::new(line, self.source));
                    self.state = ParserState::AwaitingMoreLinesOrBlank;
                }
            }
            ParserState::AwaitingMoreLinesOrBlank => {
                if blank {
                    self.finish_cue();
                    self.state = ParserState::AwaitingNumber;
                } else {
                    self.lines.push(Line::new(line, self.source));
                }
            }
        }

        Ok(())
    }

    /// Signal end of input and collect the parsed track
    pub fn finish(mut self) -> Result<Track, FormatError> {
        match self.state {
            ParserState::AwaitingNumber => {}
            ParserState::AwaitingMoreLinesOrBlank => self.finish_cue(),
            ParserState::AwaitingTimeRange => {
                return Err(FormatError::UnexpectedEndOfInput {
                    line: self.line_number,
                    missing: "time range",
                });
            }
            ParserState::AwaitingFirstLine => {
                return Err(FormatError::UnexpectedEndOfInput {
                    line: self.line_number,
                    missing: "text",
                });
            }
        }

        debug!("Parsed {} subtitle cues from {} lines", self.cues.len(), self.line_number);
        Ok(Track::new(self.cues))
    }

    fn finish_cue(&mut self) {
        let lines = std::mem::take(&mut self.lines);
        self.cues.push(Cue::new(self.seq_num, self.start_time_ms, self.end_time_ms, lines));
    }

    /// Positive decimal integer made of digits only (no sign)
    fn parse_sequence_number(line: &str) -> Option<usize> {
        if !line.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        line.parse().ok().filter(|&n: &usize| n > 0)
    }

    /// Split `start --> end` at the first `-` and the first `>` after it
    fn parse_time_range(line: &str, line_number: usize) -> Result<(u64, u64), FormatError> {
        let invalid = |reason: &str| FormatError::InvalidTimeRange {
            line: line_number,
            value: line.to_string(),
            reason: reason.to_string(),
        };

        let dash = line.find('-').ok_or_else(|| invalid("missing '-->' separator"))?;
        let after_dash = &line[dash..];
        let arrow = after_dash.find('>').ok_or_else(|| invalid("missing '>' in separator"))?;

        let start_text = line[..dash].trim();
        let end_text = after_dash[arrow + 1..].trim();

        let start = Cue::parse_timestamp(start_text).map_err(|_| invalid("unreadable start time"))?;
        let end = Cue::parse_timestamp(end_text).map_err(|_| invalid("unreadable end time"))?;

        if end < start {
            return Err(invalid("end time precedes start time"));
        }

        Ok((start, end))
    }
}

/// Parse SubRip text into a track whose lines are all tagged with `source`
pub fn parse(text: &str, source: LineSource) -> Result<Track, FormatError> {
    let mut parser = SrtParser::new(source);
    for line in text.lines() {
        parser.feed_line(line)?;
    }
    parser.finish()
}
