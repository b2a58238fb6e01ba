//! Staging folder scanner
//!
//! Lists the files waiting in an input folder. Non-recursive, extension
//! filtered, sorted by file name so runs are reproducible.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Folder not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Nothing to process
    #[error("No supported files found in {folder} (supported: {supported})")]
    NoFiles { folder: PathBuf, supported: String },
}

/// Folder scanner
pub struct FolderScanner {
    extensions: Vec<String>,
    ignore_patterns: Vec<String>,
}

impl FolderScanner {
    /// Scanner accepting the given extensions (without dot, any case)
    ///
    /// Ignores system files like .DS_Store, Thumbs.db and other dot-files.
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
            ignore_patterns: vec!["Thumbs.db".to_string(), "desktop.ini".to_string()],
        }
    }

    /// List matching files directly inside `folder`
    pub fn scan(&self, folder: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !folder.exists() {
            return Err(ScanError::PathNotFound(folder.to_path_buf()));
        }

        if !folder.is_dir() {
            return Err(ScanError::NotADirectory(folder.to_path_buf()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.should_process_entry(&entry) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    // Continue scanning, don't abort
                }
            }
        }

        tracing::debug!(folder = %folder.display(), files = files.len(), "Folder scanned");
        Ok(files)
    }

    /// Like [`scan`](Self::scan) but an empty result is an error
    pub fn scan_non_empty(&self, folder: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let files = self.scan(folder)?;
        if files.is_empty() {
            return Err(ScanError::NoFiles {
                folder: folder.to_path_buf(),
                supported: self.extensions.join(", "),
            });
        }
        Ok(files)
    }

    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        let file_name = entry.file_name().to_string_lossy();

        if file_name.starts_with('.') || self.ignore_patterns.iter().any(|p| file_name == p.as_str()) {
            return false;
        }

        entry
            .path()
            .extension()
            .map(|ext| self.is_supported_extension(&ext.to_string_lossy()))
            .unwrap_or(false)
    }

    fn is_supported_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions.iter().any(|e| *e == ext)
    }
}
