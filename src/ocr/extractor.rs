//! Text extraction using pdftotext and Tesseract.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, warn};

use super::tools::{self, check_binary, ToolStatus};
use crate::config::OcrConfig;

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of text extraction.
#[derive(Debug)]
pub struct ExtractionResult {
    pub text: String,
    pub method: ExtractionMethod,
    /// Number of pages processed.
    pub page_count: Option<u32>,
}

/// Method used to extract text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// Embedded PDF text layer.
    PdfToText,
    /// Tesseract OCR.
    Tesseract,
    /// pdftotext with OCR for pages where it found more.
    Hybrid,
    /// File was already text.
    Plain,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PdfToText => "pdftotext",
            Self::Tesseract => "tesseract",
            Self::Hybrid => "hybrid",
            Self::Plain => "plain",
        }
    }
}

/// MIME types accepted as images.
const IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/tiff",
    "image/gif",
    "image/bmp",
    "image/webp",
];

/// Whether the extractor can handle a MIME type.
pub fn is_supported(mime_type: &str) -> bool {
    mime_type == "application/pdf" || mime_type == "text/plain" || IMAGE_TYPES.contains(&mime_type)
}

/// Non-whitespace character count, used to compare extraction quality.
fn content_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// OCR wins when it finds more than 20% more content.
fn prefer_ocr(pdf_chars: usize, ocr_chars: usize) -> bool {
    ocr_chars > pdf_chars + (pdf_chars / 5)
}

fn handle_cmd_output(
    result: std::io::Result<Output>,
    tool: (&str, &str),
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ExtractionError::ExtractionFailed(format!(
                "{}: {}",
                error_prefix,
                stderr.trim()
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tools::describe(tool)))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

fn check_cmd_status(
    result: std::io::Result<ExitStatus>,
    tool: (&str, &str),
    error_msg: &str,
) -> Result<(), ExtractionError> {
    match result {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => Err(ExtractionError::ExtractionFailed(error_msg.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tools::describe(tool)))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Text extractor that shells out to Poppler and Tesseract.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    language: String,
    dpi: u32,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(&OcrConfig::default())
    }
}

impl TextExtractor {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            language: config.language.clone(),
            dpi: config.dpi,
        }
    }

    /// Extract text from a file based on its MIME type.
    pub fn extract(
        &self,
        file_path: &Path,
        mime_type: &str,
    ) -> Result<ExtractionResult, ExtractionError> {
        match mime_type {
            "application/pdf" => self.extract_pdf(file_path),
            m if IMAGE_TYPES.contains(&m) => self.extract_image(file_path),
            "text/plain" => {
                let bytes = std::fs::read(file_path)?;
                Ok(ExtractionResult {
                    text: String::from_utf8_lossy(&bytes).into_owned(),
                    method: ExtractionMethod::Plain,
                    page_count: None,
                })
            }
            _ => Err(ExtractionError::UnsupportedFileType(mime_type.to_string())),
        }
    }

    /// Extract text from a PDF, page by page.
    ///
    /// Each page's text layer is compared with Tesseract's reading of the
    /// rendered page and the richer one kept.
    fn extract_pdf(&self, file_path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let page_count = self.pdf_page_count(file_path).unwrap_or(1);

        if page_count <= 1 {
            return self.extract_pdf_single(file_path);
        }

        let temp_dir = TempDir::new()?;
        let ocr_available = match self.render_pages(file_path, temp_dir.path(), None) {
            Ok(()) => true,
            Err(e) => {
                debug!("Page rendering unavailable, using pdftotext only: {}", e);
                false
            }
        };

        let mut page_texts = Vec::with_capacity(page_count as usize);
        let mut used_ocr = false;

        for page in 1..=page_count {
            let pdf_text = match self.pdftotext(file_path, Some(page)) {
                Ok(text) => text,
                Err(e @ ExtractionError::ToolNotFound(_)) => return Err(e),
                Err(e) => {
                    warn!("pdftotext failed on page {}: {}", page, e);
                    String::new()
                }
            };
            let mut text = pdf_text;

            if ocr_available {
                if let Some(image) = find_page_image(temp_dir.path(), page) {
                    match self.run_tesseract(&image) {
                        Ok(ocr_text)
                            if prefer_ocr(content_chars(&text), content_chars(&ocr_text)) =>
                        {
                            text = ocr_text;
                            used_ocr = true;
                        }
                        Ok(_) => {}
                        Err(e) => debug!("OCR failed on page {}: {}", page, e),
                    }
                }
            }

            page_texts.push(text);
        }

        Ok(ExtractionResult {
            text: page_texts.join("\n\n"),
            method: if used_ocr {
                ExtractionMethod::Hybrid
            } else {
                ExtractionMethod::PdfToText
            },
            page_count: Some(page_count),
        })
    }

    /// Single-page PDFs: whole-document pdftotext versus OCR.
    fn extract_pdf_single(&self, file_path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let pdf_text = self.pdftotext(file_path, None)?;

        let temp_dir = TempDir::new()?;
        let ocr_text = self
            .render_pages(file_path, temp_dir.path(), Some(1))
            .and_then(|_| {
                find_page_image(temp_dir.path(), 1).ok_or_else(|| {
                    ExtractionError::ExtractionFailed("No image generated from PDF".to_string())
                })
            })
            .and_then(|image| self.run_tesseract(&image));

        let (text, method) = match ocr_text {
            Ok(ocr) if prefer_ocr(content_chars(&pdf_text), content_chars(&ocr)) => {
                (ocr, ExtractionMethod::Tesseract)
            }
            Ok(_) => (pdf_text, ExtractionMethod::PdfToText),
            Err(e) => {
                debug!("OCR failed: {}, using pdftotext result", e);
                (pdf_text, ExtractionMethod::PdfToText)
            }
        };

        Ok(ExtractionResult {
            text,
            method,
            page_count: Some(1),
        })
    }

    fn extract_image(&self, file_path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let text = self.run_tesseract(file_path)?;
        Ok(ExtractionResult {
            text,
            method: ExtractionMethod::Tesseract,
            page_count: Some(1),
        })
    }

    /// Run pdftotext on a whole PDF or a single page.
    fn pdftotext(&self, file_path: &Path, page: Option<u32>) -> Result<String, ExtractionError> {
        let mut cmd = Command::new(tools::PDFTOTEXT.0);
        cmd.args(["-layout", "-enc", "UTF-8"]);
        if let Some(page) = page {
            let page = page.to_string();
            cmd.args(["-f", &page, "-l", &page]);
        }
        let output = cmd.arg(file_path).arg("-").output();

        handle_cmd_output(output, tools::PDFTOTEXT, "pdftotext failed")
    }

    /// Get the page count of a PDF.
    pub fn pdf_page_count(&self, file_path: &Path) -> Option<u32> {
        let output = Command::new(tools::PDFINFO.0)
            .arg(file_path)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        parse_page_count(&String::from_utf8_lossy(&output.stdout))
    }

    /// Render PDF pages to PNG files named `page-NN.png` in `out_dir`.
    fn render_pages(
        &self,
        file_path: &Path,
        out_dir: &Path,
        page: Option<u32>,
    ) -> Result<(), ExtractionError> {
        let mut cmd = Command::new(tools::PDFTOPPM.0);
        cmd.args(["-png", "-r", &self.dpi.to_string()]);
        if let Some(page) = page {
            let page = page.to_string();
            cmd.args(["-f", &page, "-l", &page]);
        }
        let status = cmd.arg(file_path).arg(out_dir.join("page")).status();

        check_cmd_status(status, tools::PDFTOPPM, "pdftoppm failed to convert PDF")
    }

    fn run_tesseract(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new(tools::TESSERACT.0)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        handle_cmd_output(output, tools::TESSERACT, "tesseract failed")
    }

    /// Check which external tools are installed.
    pub fn check_tools() -> Vec<ToolStatus> {
        tools::ALL_TOOLS
            .iter()
            .map(|&(name, package)| ToolStatus {
                name,
                package,
                available: check_binary(name),
            })
            .collect()
    }
}

/// Find pdftoppm's output for a page; the number is zero-padded to the
/// width of the document's page count.
fn find_page_image(dir: &Path, page: u32) -> Option<PathBuf> {
    [1, 2, 3, 4].into_iter().find_map(|width| {
        let path = dir.join(format!("page-{:0width$}.png", page, width = width));
        path.exists().then_some(path)
    })
}

fn parse_page_count(pdfinfo: &str) -> Option<u32> {
    pdfinfo
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|n| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_plain_text_read_directly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Mitosis has four phases.").unwrap();

        let result = TextExtractor::default().extract(&path, "text/plain").unwrap();
        assert_eq!(result.text, "Mitosis has four phases.");
        assert_eq!(result.method, ExtractionMethod::Plain);
        assert_eq!(result.page_count, None);
    }

    #[test]
    fn test_unsupported_type() {
        let err = TextExtractor::default()
            .extract(Path::new("/nonexistent"), "application/zip")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFileType(_)));
        assert!(!is_supported("application/zip"));
        assert!(is_supported("image/webp"));
    }

    #[test]
    fn test_prefer_ocr_threshold() {
        assert!(!prefer_ocr(100, 120));
        assert!(prefer_ocr(100, 121));
        assert!(prefer_ocr(0, 1));
        assert!(!prefer_ocr(0, 0));
    }

    #[test]
    fn test_parse_page_count() {
        let info = "Title:          Notes\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(12));
        assert_eq!(parse_page_count("Title: x\n"), None);
    }

    #[test]
    fn test_find_page_image_widths() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("page-03.png"), b"").unwrap();
        std::fs::write(dir.path().join("page-7.png"), b"").unwrap();

        assert_eq!(
            find_page_image(dir.path(), 3),
            Some(dir.path().join("page-03.png"))
        );
        assert_eq!(
            find_page_image(dir.path(), 7),
            Some(dir.path().join("page-7.png"))
        );
        assert_eq!(find_page_image(dir.path(), 9), None);
    }

    #[test]
    fn test_check_tools_lists_all() {
        let tools = TextExtractor::check_tools();
        assert_eq!(tools.len(), 4);
        assert!(tools.iter().any(|t| t.name == "tesseract"));
    }
}
