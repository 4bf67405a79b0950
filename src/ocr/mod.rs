//! Text extraction from uploaded study material.
//!
//! PDFs go through pdftotext (Poppler), with Tesseract OCR of rendered
//! pages where the embedded text layer is thin. Images go straight to
//! Tesseract. Plain text is read as-is.

mod extractor;
mod tools;

pub use extractor::{
    is_supported, ExtractionError, ExtractionMethod, ExtractionResult, TextExtractor,
};
pub use tools::{check_binary, ToolStatus};
