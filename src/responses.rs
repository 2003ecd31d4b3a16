//! Response files read by the text commands.
//!
//! This module provides the [`ResponseReader`] which turns a file name into a
//! chat reply. Files live in one directory, beside the executable unless
//! configured otherwise, and are read on every invocation so edits apply
//! without a restart.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::{debug, error};
use tokio::fs;

use crate::{
    commands::{format_file_empty, format_file_not_found, format_read_error},
    utils::executable_dir,
};

/// Reads response files from a fixed directory.
///
/// Reading never fails: missing or unreadable files produce an error text
/// meant to be sent to chat as is.
#[derive(Debug, Clone)]
pub struct ResponseReader {
    /// Directory holding the response files
    dir: PathBuf,
}

impl ResponseReader {
    /// Creates a reader for the files in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ResponseReader { dir: dir.into() }
    }

    /// Creates a reader for the files beside the running executable.
    ///
    /// # Errors
    ///
    /// Fails if the executable location cannot be determined.
    pub fn beside_executable() -> Result<Self, anyhow::Error> {
        Ok(Self::new(executable_dir()?))
    }

    /// Directory the files are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads the file `name` and returns its content without surrounding
    /// whitespace.
    ///
    /// # Returns
    ///
    /// - the trimmed content when the file exists and is not blank
    /// - `Error: {name} not found.` when the file does not exist
    /// - `Error: {name} is empty.` when the file holds only whitespace
    /// - `Error reading command file.` on any other I/O error (permissions,
    ///   invalid UTF-8), which is also logged
    pub async fn read(&self, name: &str) -> String {
        let path = self.dir.join(name);
        debug!("reading response file {}", path.display());

        match fs::read_to_string(&path).await {
            Ok(content) => {
                let content = content.trim();
                if content.is_empty() {
                    return format_file_empty(name);
                }
                content.to_owned()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => format_file_not_found(name),
            Err(e) => {
                error!("failed to read response file {}: {}", path.display(), e);
                format_read_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_trims_content() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("rules.txt"), "  \nHello\n  ").unwrap();

        let reader = ResponseReader::new(dir.path());
        assert_eq!(reader.read("rules.txt").await, "Hello");
    }

    #[tokio::test]
    async fn test_read_preserves_inner_formatting() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("shopping.txt"),
            "\n Shopping List:\n- Item 1\n- Item 2\n\n",
        )
        .unwrap();

        let reader = ResponseReader::new(dir.path());
        assert_eq!(
            reader.read("shopping.txt").await,
            "Shopping List:\n- Item 1\n- Item 2"
        );
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();

        let reader = ResponseReader::new(dir.path());
        assert_eq!(
            reader.read("tarkov_pve.txt").await,
            "Error: tarkov_pve.txt not found."
        );
    }

    #[tokio::test]
    async fn test_read_blank_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("rules.txt"), " \n\t\n").unwrap();

        let reader = ResponseReader::new(dir.path());
        assert_eq!(reader.read("rules.txt").await, "Error: rules.txt is empty.");
    }

    #[tokio::test]
    async fn test_read_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("rules.txt"), [0xff, 0xfe, 0xfd]).unwrap();

        let reader = ResponseReader::new(dir.path());
        assert_eq!(reader.read("rules.txt").await, "Error reading command file.");
    }

    #[tokio::test]
    async fn test_read_directory_instead_of_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("rules.txt")).unwrap();

        let reader = ResponseReader::new(dir.path());
        assert_eq!(reader.read("rules.txt").await, "Error reading command file.");
    }

    #[test]
    fn test_beside_executable() {
        let reader = ResponseReader::beside_executable().unwrap();
        assert_eq!(reader.dir(), executable_dir().unwrap());
    }
}
