use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::app_config::{Config, EncodingFallback};
use crate::errors::{AppError, FormatError};
use crate::file_utils::{FileManager, FileType};
use crate::language_utils;
use crate::merge::MergeEngine;
use crate::srt_parser;
use crate::srt_writer;
use crate::subtitle_model::{LineSource, Track};

// @module: Application controller for subtitle merging

/// Files and options for one merge run
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Track shown first in every merged cue
    pub upper_path: PathBuf,
    /// Track shown second in every merged cue
    pub lower_path: PathBuf,
    /// Output file; derived from the upper file name when absent
    pub output_path: Option<PathBuf>,
    /// Replace an existing output file
    pub force_overwrite: bool,
    /// Write the merged track as JSON instead of SubRip
    pub json: bool,
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Output written to this path
    Written(PathBuf),
    /// Output already existed and overwriting was not requested
    Skipped(PathBuf),
    /// The merge was cancelled and nothing was written
    Cancelled,
}

/// Main application controller for subtitle merging
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Merge engine shared with the interrupt handler
    engine: MergeEngine,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        Ok(Self {
            config,
            engine: MergeEngine::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Flag that cancels the running merge when set
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.engine.cancel_handle()
    }

    /// Decode input bytes and parse them, retrying with the fallback encoding.
    ///
    /// UTF-8 is tried first. When the bytes are not UTF-8, or the UTF-8 text is
    /// not valid SubRip, the configured fallback encoding gets a second chance.
    /// The error of the last attempt is returned if every attempt fails.
    pub fn parse_with_fallback(bytes: &[u8], fallback: EncodingFallback, source: LineSource) -> Result<Track, AppError> {
        let utf8_attempt = FileManager::decode_utf8(bytes).map(|text| srt_parser::parse(&text, source));

        match (utf8_attempt, fallback) {
            (Some(Ok(track)), _) => Ok(track),
            (Some(Err(e)), EncodingFallback::None) => Err(AppError::Format(e)),
            (None, EncodingFallback::None) => Err(AppError::File("input is not valid UTF-8".to_string())),
            (utf8_attempt, EncodingFallback::Latin1) => {
                if let Some(Err(e)) = &utf8_attempt {
                    debug!("UTF-8 parse failed ({}), retrying as Latin-1", e);
                } else {
                    debug!("Input is not valid UTF-8, decoding as Latin-1");
                }
                let text = FileManager::decode_latin1(bytes);
                srt_parser::parse(&text, source).map_err(AppError::Format)
            }
        }
    }

    /// Read and parse one subtitle file, attaching `language_tags`
    pub fn load_track(&self, path: &Path, language_tags: Vec<String>) -> Result<Track> {
        if !FileManager::file_exists(path) {
            return Err(anyhow!("Subtitle file does not exist: {:?}", path));
        }

        if FileManager::detect_file_type(path)? != FileType::Subtitle {
            warn!("{:?} does not look like a SubRip file, trying to parse it anyway", path);
        }

        let bytes = FileManager::read_bytes(path)?;
        let track = Self::parse_with_fallback(&bytes, self.config.encoding_fallback, LineSource::Single)
            .with_context(|| format!("Failed to parse subtitle file: {:?}", path))?;

        debug!("Loaded {} cues from {:?}", track.len(), path);
        Ok(track.with_language_tags(language_tags))
    }

    /// Merge two subtitle files into one
    pub async fn run_merge(&self, request: MergeRequest) -> Result<RunStatus> {
        let start_time = std::time::Instant::now();
        let (upper_tags, lower_tags) = self.config.language_tags();
        self.log_languages(&upper_tags, &lower_tags);

        let output_path = request.output_path.clone().unwrap_or_else(|| {
            let tags: Vec<String> = upper_tags.iter().chain(&lower_tags).cloned().collect();
            let extension = if request.json { "json" } else { "srt" };
            FileManager::generate_output_path(&request.upper_path, &tags, extension)
        });

        if output_path.exists() && !request.force_overwrite {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", output_path);
            return Ok(RunStatus::Skipped(output_path));
        }

        let upper = self.load_track(&request.upper_path, upper_tags)?;
        let lower = self.load_track(&request.lower_path, lower_tags)?;

        let Some(merged) = self.merge_interruptible(upper, lower).await? else {
            warn!("Merge cancelled, nothing written");
            return Ok(RunStatus::Cancelled);
        };

        let content = if request.json {
            serde_json::to_string_pretty(&merged).context("Failed to serialize merged track")?
        } else {
            srt_writer::write(&merged, self.config.plain_text)
        };
        FileManager::write_to_file(&output_path, &content)?;

        info!(
            "Merged into {} cues in {:.2}s: {:?}",
            merged.len(),
            start_time.elapsed().as_secs_f64(),
            output_path
        );

        Ok(RunStatus::Written(output_path))
    }

    /// Rewrite a subtitle file without inline markup
    pub fn run_strip(&self, input: &Path, output: Option<PathBuf>, force_overwrite: bool) -> Result<RunStatus> {
        let output_path = output
            .unwrap_or_else(|| FileManager::generate_output_path(input, &["plain".to_string()], "srt"));

        if output_path.exists() && !force_overwrite {
            warn!("Output file already exists: {:?}. Use -f to force overwrite.", output_path);
            return Ok(RunStatus::Skipped(output_path));
        }

        let track = self.load_track(input, Vec::new())?;
        FileManager::write_to_file(&output_path, &srt_writer::write(&track, true))?;

        info!("Stripped markup from {} cues: {:?}", track.len(), output_path);
        Ok(RunStatus::Written(output_path))
    }

    /// Run the merge on a blocking thread; Ctrl-C sets the cancel flag
    async fn merge_interruptible(&self, upper: Track, lower: Track) -> Result<Option<Track>> {
        let engine = self.engine.clone();
        let cancel = self.engine.cancel_handle();
        let mut merge_task = tokio::task::spawn_blocking(move || engine.run(&upper, &lower));

        let outcome = tokio::select! {
            joined = &mut merge_task => joined.context("Merge task failed")?,
            Ok(()) = tokio::signal::ctrl_c() => {
                warn!("Interrupt received, cancelling merge");
                cancel.store(true, Ordering::SeqCst);
                merge_task.await.context("Merge task failed")?
            }
        };

        Ok(outcome.into_track())
    }

    fn log_languages(&self, upper_tags: &[String], lower_tags: &[String]) {
        let describe = |tags: &[String]| -> String {
            tags.first()
                .and_then(|tag| language_utils::get_language_name(tag).ok())
                .unwrap_or_else(|| "unspecified language".to_string())
        };
        info!("Merging {} (upper) with {} (lower)", describe(upper_tags), describe(lower_tags));

        if let (Some(upper), Some(lower)) = (upper_tags.first(), lower_tags.first()) {
            if language_utils::language_codes_match(upper, lower) {
                warn!("Both tracks are tagged with the same language: {}", upper);
            }
        }
    }
}

/// The SubRip format error behind a failed run, if parsing is what failed
pub fn format_error(error: &anyhow::Error) -> Option<&FormatError> {
    error.chain().find_map(|cause| cause.downcast_ref::<FormatError>())
}
