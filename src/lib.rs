/*!
 * # bisub - bilingual subtitle merging
 *
 * A Rust library for combining two independently timed subtitle tracks into
 * one track that shows both languages at the same time.
 *
 * ## Features
 *
 * - SubRip (SRT) parsing with a strict block state machine
 * - SubRip writing, optionally stripping inline markup such as `<i>` or `<font>`
 * - Interval-splitting merge of two tracks with flicker elimination and
 *   coalescing of identical adjacent cues
 * - Cooperative cancellation of long merges
 * - ISO 639-1 and ISO 639-2 language tag support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `subtitle_model`: Cue, line and track values
 * - `srt_parser`: SubRip text to tracks
 * - `srt_writer`: Tracks to SubRip text
 * - `merge`: The merge engine and its passes:
 *   - `merge::split_pass`: Atomic interval split
 *   - `merge::extension_pass`: Flicker elimination
 *   - `merge::ordering_pass`: Upper lines before lower lines
 *   - `merge::coalesce_pass`: Joining identical touching cues
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations and input decoding
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod merge;
pub mod srt_parser;
pub mod srt_writer;
pub mod subtitle_model;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, FormatError};
pub use merge::{merge, merge_with_cancellation, MergeEngine, MergeOutcome};
pub use srt_parser::parse;
pub use srt_writer::{strip_markup, write};
pub use subtitle_model::{Cue, Line, LineSource, Track};
pub use language_utils::{language_codes_match, normalize_to_part1_or_part2t, get_language_name};
