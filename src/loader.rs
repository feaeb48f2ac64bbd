//! Document loading.
//!
//! Extracts text from PDFs and plain-text files and describes their origin
//! as chunk metadata.

use crate::embedding::FILE_NAME_KEY;
use crate::error::{EmbedSyncError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extensions read as UTF-8 text.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "csv", "json", "html", "htm", "xml", "toml", "yaml", "yml",
    "rs", "py",
];

/// Extensions handled by the PDF extractor.
const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Supported document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Detect the document kind from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if PDF_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Pdf)
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Text)
        } else {
            None
        }
    }
}

/// Extract the text content of a document.
pub async fn load_text(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(EmbedSyncError::FileNotFound(path.display().to_string()));
    }

    let kind = DocumentKind::from_path(path).ok_or_else(|| {
        EmbedSyncError::InvalidInput(format!("Unsupported file type: {}", path.display()))
    })?;

    let text = match kind {
        DocumentKind::Text => tokio::fs::read_to_string(path).await?,
        DocumentKind::Pdf => {
            let owned = path.to_path_buf();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
                .await
                .map_err(|e| EmbedSyncError::Pdf(format!("Extraction task failed: {}", e)))?
                .map_err(|e| EmbedSyncError::Pdf(format!("{}: {}", path.display(), e)))?
        }
    };

    debug!("Loaded {} bytes from {:?}", text.len(), path);
    Ok(text)
}

/// Metadata attached to every chunk of a file.
///
/// `file_name` is the path as given; `created` and `modified` are included
/// when the filesystem reports them.
pub fn file_metadata(path: &Path) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert(FILE_NAME_KEY.to_string(), path.to_string_lossy().to_string());

    if let Ok(fs_meta) = std::fs::metadata(path) {
        if let Ok(created) = fs_meta.created() {
            metadata.insert(
                "created".to_string(),
                DateTime::<Utc>::from(created).to_rfc3339(),
            );
        }
        if let Ok(modified) = fs_meta.modified() {
            metadata.insert(
                "modified".to_string(),
                DateTime::<Utc>::from(modified).to_rfc3339(),
            );
        }
    }

    metadata
}

/// Recursively collect files under `dir`, sorted by path.
///
/// When `extensions` is given only files with a matching extension
/// (case-insensitive, without the dot) are returned.
pub fn collect_files(dir: &Path, extensions: Option<&[String]>) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(EmbedSyncError::FileNotFound(dir.display().to_string()));
    }
    if !dir.is_dir() {
        return Err(EmbedSyncError::InvalidInput(format!(
            "Not a directory: {}",
            dir.display()
        )));
    }

    let wanted: Option<Vec<String>> = extensions.map(|exts| {
        exts.iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect()
    });

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| EmbedSyncError::Io(std::io::Error::other(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        let matches = match &wanted {
            Some(exts) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| exts.contains(&e.to_lowercase()))
                .unwrap_or(false),
            None => true,
        };
        if matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
