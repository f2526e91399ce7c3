use anyhow::{Result, Context};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @const: A sequence number followed by a SubRip time line
static SRT_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*\d+\s*\r?\n\s*\d{2,}:\d{2}:\d{2},\d{3}\s*-->\s*\d{2,}:\d{2}:\d{2},\d{3}").unwrap()
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Output path for a merged subtitle next to the upper input
    // @params: upper_file, language_tags, extension
    pub fn generate_output_path<P: AsRef<Path>>(
        upper_file: P,
        language_tags: &[String],
        extension: &str,
    ) -> PathBuf {
        let upper_file = upper_file.as_ref();
        let output_dir = upper_file.parent().unwrap_or(Path::new(""));

        // Get the file stem (filename without extension)
        let stem = upper_file.file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        if language_tags.is_empty() {
            output_filename.push_str("merged");
        } else {
            output_filename.push_str(&language_tags.join("-"));
        }
        output_filename.push('.');
        output_filename.push_str(extension.trim_start_matches('.'));

        output_dir.join(output_filename)
    }

    /// Read a file's raw bytes
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Decode bytes as UTF-8, returning `None` if they are not valid UTF-8
    pub fn decode_utf8(bytes: &[u8]) -> Option<String> {
        String::from_utf8(bytes.to_vec()).ok()
    }

    /// Decode bytes as ISO-8859-1, where every byte maps to one character
    pub fn decode_latin1(bytes: &[u8]) -> String {
        bytes.iter().map(|&b| char::from(b)).collect()
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Detect whether a file looks like a SubRip subtitle
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        if let Some(ext) = path.extension() {
            if ext.to_string_lossy().eq_ignore_ascii_case("srt") {
                return Ok(FileType::Subtitle);
            }
        }

        // Fall back to examining file contents
        let bytes = Self::read_bytes(path)?;
        let content = Self::decode_utf8(&bytes).unwrap_or_else(|| Self::decode_latin1(&bytes));
        if content.contains("-->") && SRT_BLOCK_REGEX.is_match(&content) {
            return Ok(FileType::Subtitle);
        }

        Ok(FileType::Unknown)
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Subtitle file (SRT)
    Subtitle,
    /// Anything else
    Unknown,
}
