//! PDF reader.
//!
//! Only the full view is available: text runs come out of the content
//! streams without layout, so visibility cannot be judged.

use std::panic;

/// Extract every text run of a PDF.
pub fn read(bytes: &[u8]) -> Result<String, String> {
    // pdf-extract panics on some malformed inputs
    let result = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(format!("pdf text extraction failed: {}", e)),
        Err(_) => Err("pdf text extraction aborted on malformed input".to_string()),
    }
}
