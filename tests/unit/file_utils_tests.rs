/*!
 * Tests for file utility functions
 */

use std::path::Path;
use anyhow::Result;
use bisub::file_utils::{FileManager, FileType};
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "movie.srt", common::ENGLISH_SRT)?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));

    Ok(())
}

#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.srt"));
}

#[test]
fn test_generate_output_path_withLanguageTags_shouldJoinThem() {
    let tags = vec!["en".to_string(), "fr".to_string()];

    let output_path = FileManager::generate_output_path(Path::new("/tmp/movies/movie.srt"), &tags, "srt");

    assert_eq!(output_path, Path::new("/tmp/movies/movie.en-fr.srt"));
}

#[test]
fn test_generate_output_path_withoutTags_shouldUseMergedSuffix() {
    let output_path = FileManager::generate_output_path(Path::new("/tmp/movies/movie.en.srt"), &[], ".json");

    assert_eq!(output_path, Path::new("/tmp/movies/movie.en.merged.json"));
}

#[test]
fn test_write_to_file_withMissingParentDir_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("out.srt");

    FileManager::write_to_file(&path, "content")?;

    assert_eq!(std::fs::read_to_string(&path)?, "content");
    Ok(())
}

#[test]
fn test_decode_utf8_withInvalidBytes_shouldReturnNone() {
    assert_eq!(FileManager::decode_utf8("Où".as_bytes()), Some("Où".to_string()));
    assert_eq!(FileManager::decode_utf8(b"O\xf9"), None);
}

#[test]
fn test_decode_latin1_withHighBytes_shouldMapEachByteToOneChar() {
    assert_eq!(FileManager::decode_latin1(b"O\xf9 vas-tu ?"), "Où vas-tu ?");
    assert_eq!(FileManager::decode_latin1(b"\xc0 la maison"), "À la maison");
}

#[test]
fn test_read_bytes_withMissingFile_shouldFail() {
    assert!(FileManager::read_bytes("definitely_missing.srt").is_err());
}

#[test]
fn test_detect_file_type_withSrtExtension_shouldReturnSubtitle() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "empty.srt", "")?;

    assert_eq!(FileManager::detect_file_type(&path)?, FileType::Subtitle);
    Ok(())
}

#[test]
fn test_detect_file_type_withSrtContentAndOtherExtension_shouldReturnSubtitle() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "movie.txt", common::FRENCH_SRT)?;

    assert_eq!(FileManager::detect_file_type(&path)?, FileType::Subtitle);
    Ok(())
}

#[test]
fn test_detect_file_type_withPlainText_shouldReturnUnknown() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "notes.txt", "just some notes --> nothing else")?;

    assert_eq!(FileManager::detect_file_type(&path)?, FileType::Unknown);
    Ok(())
}

#[test]
fn test_detect_file_type_withMissingFile_shouldFail() {
    assert!(FileManager::detect_file_type("missing.srt").is_err());
}
