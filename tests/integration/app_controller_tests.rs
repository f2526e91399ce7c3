/*!
 * Integration tests for the application controller
 */

use std::sync::atomic::Ordering;
use anyhow::Result;

use bisub::app_config::{Config, EncodingFallback};
use bisub::app_controller::{self, Controller, MergeRequest, RunStatus};
use bisub::errors::AppError;
use bisub::{LineSource, Track};
use crate::common;

const LATIN1_SRT: &[u8] = b"1\n00:00:01,000 --> 00:00:02,000\nO\xf9 vas-tu ?\n";

fn request(temp_dir: &std::path::Path, output: Option<&str>) -> Result<MergeRequest> {
    Ok(MergeRequest {
        upper_path: common::create_test_file(temp_dir, "movie.en.srt", common::ENGLISH_SRT)?,
        lower_path: common::create_test_file(temp_dir, "movie.fr.srt", common::FRENCH_SRT)?,
        output_path: output.map(|name| temp_dir.join(name)),
        force_overwrite: false,
        json: false,
    })
}

#[tokio::test]
async fn test_runMerge_withLanguages_shouldWriteTaggedOutput() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let config = Config {
        upper_language: "eng".to_string(),
        lower_language: "fre".to_string(),
        ..Config::default()
    };
    let controller = Controller::with_config(config)?;

    let status = controller.run_merge(request(temp_dir.path(), None)?).await?;

    let expected_path = temp_dir.path().join("movie.en.en-fr.srt");
    assert_eq!(status, RunStatus::Written(expected_path.clone()));
    let written = std::fs::read_to_string(&expected_path)?;
    assert!(written.starts_with("1\n00:00:01,000 --> 00:00:04,000\nWhere are you going?\nOù vas-tu ?\n"));
    Ok(())
}

#[tokio::test]
async fn test_runMerge_withPlainTextConfig_shouldStripMarkup() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config { plain_text: true, ..Config::default() })?;

    let status = controller.run_merge(request(temp_dir.path(), Some("out.srt"))?).await?;

    assert_eq!(status, RunStatus::Written(temp_dir.path().join("out.srt")));
    let written = std::fs::read_to_string(temp_dir.path().join("out.srt"))?;
    assert!(written.contains("\nHome.\n"));
    assert!(!written.contains("<i>"));
    Ok(())
}

#[tokio::test]
async fn test_runMerge_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let existing = common::create_test_file(temp_dir.path(), "movie.en.merged.srt", "keep me")?;
    let controller = Controller::with_config(Config::default())?;

    let status = controller.run_merge(request(temp_dir.path(), None)?).await?;
    assert_eq!(status, RunStatus::Skipped(existing.clone()));
    assert_eq!(std::fs::read_to_string(&existing)?, "keep me");

    let mut forced = request(temp_dir.path(), None)?;
    forced.force_overwrite = true;
    let status = controller.run_merge(forced).await?;
    assert_eq!(status, RunStatus::Written(existing.clone()));
    assert_ne!(std::fs::read_to_string(&existing)?, "keep me");
    Ok(())
}

#[tokio::test]
async fn test_runMerge_withJsonOutput_shouldSerializeTrack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config {
        upper_language: "en".to_string(),
        lower_language: "fr".to_string(),
        ..Config::default()
    })?;
    let mut json_request = request(temp_dir.path(), None)?;
    json_request.json = true;

    let status = controller.run_merge(json_request).await?;

    let expected_path = temp_dir.path().join("movie.en.en-fr.json");
    assert_eq!(status, RunStatus::Written(expected_path.clone()));
    let track: Track = serde_json::from_str(&std::fs::read_to_string(&expected_path)?)?;
    assert_eq!(track.len(), 3);
    assert_eq!(track.language_tags, vec!["en", "fr"]);
    assert_eq!(track.cues[0].lines[1].source, LineSource::Lower);
    Ok(())
}

#[tokio::test]
async fn test_runMerge_withCancelFlagSet_shouldWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;
    controller.cancel_handle().store(true, Ordering::SeqCst);

    let status = controller.run_merge(request(temp_dir.path(), Some("out.srt"))?).await?;

    assert_eq!(status, RunStatus::Cancelled);
    assert!(!temp_dir.path().join("out.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_runMerge_withMalformedInput_shouldExposeFormatError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;
    let mut bad_request = request(temp_dir.path(), Some("out.srt"))?;
    bad_request.lower_path = common::create_test_file(
        temp_dir.path(),
        "broken.srt",
        "1\n00:00:01,000 00:00:02,000\nHi\n",
    )?;

    let error = controller.run_merge(bad_request).await.unwrap_err();

    let format_error = app_controller::format_error(&error).expect("format error in chain");
    assert!(format_error.is_malformed_field());
    assert!(!temp_dir.path().join("out.srt").exists());
    Ok(())
}

#[tokio::test]
async fn test_runMerge_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(Config::default())?;
    let mut missing = request(temp_dir.path(), None)?;
    missing.upper_path = temp_dir.path().join("nope.srt");

    assert!(controller.run_merge(missing).await.is_err());
    Ok(())
}

#[test]
fn test_withConfig_withInvalidLanguage_shouldFail() {
    let config = Config { upper_language: "zz".to_string(), ..Config::default() };
    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_parseWithFallback_withLatin1Bytes_shouldDecodeAsLatin1() {
    let track = Controller::parse_with_fallback(LATIN1_SRT, EncodingFallback::Latin1, LineSource::Single).unwrap();
    assert_eq!(track.cues[0].lines[0].text, "Où vas-tu ?");
}

#[test]
fn test_parseWithFallback_withoutFallback_shouldRejectLatin1Bytes() {
    let result = Controller::parse_with_fallback(LATIN1_SRT, EncodingFallback::None, LineSource::Single);
    assert!(matches!(result, Err(AppError::File(_))));
}

#[test]
fn test_parseWithFallback_withMalformedUtf8Srt_shouldReturnFormatError() {
    let result = Controller::parse_with_fallback(b"1\n00:00:01,000\n", EncodingFallback::Latin1, LineSource::Single);
    assert!(matches!(result, Err(AppError::Format(_))));
}

#[test]
fn test_runStrip_withMarkedUpFile_shouldWritePlainCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "movie.en.srt", common::ENGLISH_SRT)?;
    let controller = Controller::with_config(Config::default())?;

    let status = controller.run_strip(&input, None, false)?;

    let expected_path = temp_dir.path().join("movie.en.plain.srt");
    assert_eq!(status, RunStatus::Written(expected_path.clone()));
    assert_eq!(
        std::fs::read_to_string(&expected_path)?,
        common::ENGLISH_SRT.replace("<i>Home.</i>", "Home.")
    );
    Ok(())
}
