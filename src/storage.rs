//! Storage helpers for uploaded files on disk.

use std::path::{Path, PathBuf};

use crate::models::Document;

/// Fallback MIME type when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Construct the storage path for uploaded content.
///
/// Uses a two-level directory structure based on hash prefix:
/// `{uploads_dir}/{hash[0..2]}/{hash[0..16]}.{extension}`
pub fn content_storage_path(uploads_dir: &Path, content_hash: &str, extension: &str) -> PathBuf {
    uploads_dir
        .join(&content_hash[..2])
        .join(format!("{}.{}", &content_hash[..16], extension))
}

/// Map MIME type to file extension.
pub fn mime_to_extension(mime: &str) -> &'static str {
    match mime {
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/tiff" => "tiff",
        "image/bmp" => "bmp",
        "image/webp" => "webp",
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin"),
    }
}

/// Work out an upload's MIME type.
///
/// Magic bytes win over the client's `Content-Type`. Bytes that sniff as
/// nothing but decode as UTF-8 are treated as plain text.
pub fn detect_mime(content: &[u8], declared: Option<&str>) -> String {
    if let Some(kind) = infer::get(content) {
        return kind.mime_type().to_string();
    }

    let declared = declared
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != OCTET_STREAM);

    match declared {
        Some(ct) => ct,
        None if !content.is_empty() && std::str::from_utf8(content).is_ok() => {
            "text/plain".to_string()
        }
        None => OCTET_STREAM.to_string(),
    }
}

/// A file written to the uploads directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub content_hash: String,
}

/// Write upload content to disk, keyed by content hash.
///
/// Identical content lands on the same path and is only written once.
pub fn save_upload(
    content: &[u8],
    mime_type: &str,
    uploads_dir: &Path,
) -> std::io::Result<StoredUpload> {
    let content_hash = Document::compute_hash(content);
    let path = content_storage_path(uploads_dir, &content_hash, mime_to_extension(mime_type));

    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
    }

    Ok(StoredUpload { path, content_hash })
}

/// Remove a stored upload, ignoring files that are already gone.
pub fn remove_upload(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
