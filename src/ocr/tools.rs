//! External tool discovery.

use std::process::Command;

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Availability of one external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: &'static str,
    /// Package that provides the tool.
    pub package: &'static str,
    pub available: bool,
}

pub(crate) const PDFTOTEXT: (&str, &str) = ("pdftotext", "poppler-utils");
pub(crate) const PDFTOPPM: (&str, &str) = ("pdftoppm", "poppler-utils");
pub(crate) const PDFINFO: (&str, &str) = ("pdfinfo", "poppler-utils");
pub(crate) const TESSERACT: (&str, &str) = ("tesseract", "tesseract-ocr");

/// Every tool the extractor may shell out to.
pub(crate) const ALL_TOOLS: [(&str, &str); 4] = [PDFTOTEXT, PDFTOPPM, PDFINFO, TESSERACT];

/// Human-readable tool name with its install hint.
pub(crate) fn describe((name, package): (&str, &str)) -> String {
    format!("{} (install {})", name, package)
}
