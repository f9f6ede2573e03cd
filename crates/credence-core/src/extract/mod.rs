//! Layered Text Extractor
//!
//! Produces two views of one document:
//!
//! | View | Content |
//! |------|---------|
//! | `rendered_text` | What a human reader sees |
//! | `full_text` | Every text run, visible or not |
//!
//! The difference between the two is what the invisible-content detector
//! looks at. When layout-aware extraction is impossible the rendered view
//! falls back to the full view and the extraction is marked degraded, since
//! that silently disables invisible-content detection otherwise.

mod docx;
mod html;
mod pdf;
pub mod style;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{RecommendedAction, SecurityFinding, Severity};

pub use style::{Rgb, StyleHint, StylingTechnique};

/// Detector name used for the degraded-extraction notice.
pub const EXTRACTOR_NAME: &str = "layered_text_extractor";

/// Finding type of the degraded-extraction notice.
pub const DEGRADED_FINDING_TYPE: &str = "extraction_degraded";

lazy_static! {
    static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[ \t\u{00A0}\u{3000}]+").unwrap();
    static ref MARKUP_HINT: Regex =
        Regex::new(r"(?i)<\s*(html|body|div|p|span|table|br)[\s>/]").unwrap();
}

/// Invisible characters that can splice words together: every Unicode
/// format character (general category Cf) plus the combining grapheme
/// joiner. Inclusive ranges, ascending.
const INVISIBLE_FORMAT: &[(char, char)] = &[
    ('\u{00AD}', '\u{00AD}'),
    ('\u{034F}', '\u{034F}'),
    ('\u{0600}', '\u{0605}'),
    ('\u{061C}', '\u{061C}'),
    ('\u{06DD}', '\u{06DD}'),
    ('\u{070F}', '\u{070F}'),
    ('\u{0890}', '\u{0891}'),
    ('\u{08E2}', '\u{08E2}'),
    ('\u{180E}', '\u{180E}'),
    ('\u{200B}', '\u{200F}'),
    ('\u{202A}', '\u{202E}'),
    ('\u{2060}', '\u{2064}'),
    ('\u{2066}', '\u{206F}'),
    ('\u{FEFF}', '\u{FEFF}'),
    ('\u{FFF9}', '\u{FFFB}'),
    ('\u{110BD}', '\u{110BD}'),
    ('\u{110CD}', '\u{110CD}'),
    ('\u{13430}', '\u{1343F}'),
    ('\u{1BCA0}', '\u{1BCA3}'),
    ('\u{1D173}', '\u{1D17A}'),
    ('\u{E0001}', '\u{E0001}'),
    ('\u{E0020}', '\u{E007F}'),
];

/// Detected container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Html,
    Docx,
    Pdf,
    Unknown,
}

impl DocumentFormat {
    /// Sniff the format from leading bytes and content.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"%PDF") {
            return DocumentFormat::Pdf;
        }
        if bytes.starts_with(b"PK\x03\x04") {
            return if docx::is_docx(bytes) {
                DocumentFormat::Docx
            } else {
                DocumentFormat::Unknown
            };
        }
        match std::str::from_utf8(bytes) {
            Ok(text) if MARKUP_HINT.is_match(text) => DocumentFormat::Html,
            Ok(_) => DocumentFormat::PlainText,
            Err(_) => DocumentFormat::Unknown,
        }
    }
}

/// How the rendered view was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Visibility was judged from layout and styling
    LayoutAware,
    /// Rendered view is a copy of the full view
    Degraded { reason: String },
}

impl ExtractionMode {
    pub fn is_degraded(&self) -> bool {
        matches!(self, ExtractionMode::Degraded { .. })
    }
}

/// Both views of a document. Transient: scoped to one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredText {
    pub format: DocumentFormat,
    pub rendered_text: String,
    pub full_text: String,
    pub mode: ExtractionMode,
    /// Styling declarations that suppress rendering; `None` when the format
    /// has no styling layer
    pub style_layer: Option<Vec<StyleHint>>,
}

impl LayeredText {
    /// Build layers for text that has no layout (rendered == full).
    pub fn plain(text: &str) -> Self {
        let text = normalize_view(&strip_invisible_format(text));
        Self {
            format: DocumentFormat::PlainText,
            rendered_text: text.clone(),
            full_text: text,
            mode: ExtractionMode::LayoutAware,
            style_layer: None,
        }
    }

    /// The notice raised when the rendered view could not be trusted.
    pub fn degraded_finding(&self) -> Option<SecurityFinding> {
        match &self.mode {
            ExtractionMode::LayoutAware => None,
            ExtractionMode::Degraded { reason } => Some(
                SecurityFinding::clear(EXTRACTOR_NAME, DEGRADED_FINDING_TYPE)
                    .with_outcome(Severity::Low, RecommendedAction::FlagForReview)
                    .with_detail("reason", reason.clone())
                    .with_detail("format", serde_json::to_value(self.format).unwrap_or_default()),
            ),
        }
    }
}

/// Output of a format reader before normalization into [`LayeredText`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Views {
    pub rendered: String,
    pub full: String,
    pub style_layer: Option<Vec<StyleHint>>,
}

/// Extract both views from raw document bytes.
///
/// Never fails: unreadable input yields degraded (possibly empty) layers.
pub fn extract_layers(bytes: &[u8]) -> LayeredText {
    let format = DocumentFormat::detect(bytes);

    let layers = match format {
        DocumentFormat::PlainText => {
            LayeredText::plain(&String::from_utf8_lossy(bytes))
        }
        DocumentFormat::Html => {
            let views = html::read(&String::from_utf8_lossy(bytes));
            from_views(format, views)
        }
        DocumentFormat::Docx => match docx::read(bytes) {
            Ok(views) => from_views(format, views),
            Err(e) => degraded(format, String::new(), format!("docx unreadable: {}", e)),
        },
        DocumentFormat::Pdf => match pdf::read(bytes) {
            Ok(text) => degraded(format, text, "pdf layout analysis unavailable".to_string()),
            Err(e) => degraded(format, String::new(), e),
        },
        DocumentFormat::Unknown => degraded(
            format,
            String::from_utf8_lossy(bytes).into_owned(),
            "unrecognized document format".to_string(),
        ),
    };

    if let ExtractionMode::Degraded { reason } = &layers.mode {
        tracing::warn!(format = ?layers.format, reason = %reason, "Layout-aware extraction unavailable");
    } else {
        tracing::debug!(
            format = ?layers.format,
            full_chars = layers.full_text.len(),
            rendered_chars = layers.rendered_text.len(),
            "Extracted document layers"
        );
    }

    layers
}

fn from_views(format: DocumentFormat, views: Views) -> LayeredText {
    LayeredText {
        format,
        rendered_text: normalize_view(&strip_invisible_format(&views.rendered)),
        full_text: normalize_view(&strip_invisible_format(&views.full)),
        mode: ExtractionMode::LayoutAware,
        style_layer: views.style_layer,
    }
}

fn degraded(format: DocumentFormat, full: String, reason: String) -> LayeredText {
    let full = normalize_view(&strip_invisible_format(&full));
    LayeredText {
        format,
        rendered_text: full.clone(),
        full_text: full,
        mode: ExtractionMode::Degraded { reason },
        style_layer: None,
    }
}

fn is_invisible_format(c: char) -> bool {
    INVISIBLE_FORMAT
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

fn strip_invisible_format(text: &str) -> String {
    text.chars().filter(|&c| !is_invisible_format(c)).collect()
}

/// Collapse horizontal whitespace, trim lines and drop empty ones.
pub(crate) fn normalize_view(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| HORIZONTAL_SPACE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_formats() {
        assert_eq!(DocumentFormat::detect(b"%PDF-1.4 ..."), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::detect(b"<html><body>x</body></html>"), DocumentFormat::Html);
        assert_eq!(DocumentFormat::detect(b"Jane Doe\nEngineer"), DocumentFormat::PlainText);
        assert_eq!(DocumentFormat::detect(&[0xff, 0xfe, 0x00, 0x9f]), DocumentFormat::Unknown);
        assert_eq!(DocumentFormat::detect(b"PK\x03\x04garbage"), DocumentFormat::Unknown);
    }

    #[test]
    fn test_plain_text_views_identical() {
        let layers = extract_layers(b"Jane  Doe\n\n  Rust developer \r\n");
        assert_eq!(layers.rendered_text, "Jane Doe\nRust developer");
        assert_eq!(layers.rendered_text, layers.full_text);
        assert!(!layers.mode.is_degraded());
        assert!(layers.style_layer.is_none());
        assert!(layers.degraded_finding().is_none());
    }

    #[test]
    fn test_zero_width_removed() {
        let layers = extract_layers("pyt\u{200B}hon".as_bytes());
        assert_eq!(layers.full_text, "python");
    }

    #[test]
    fn test_every_format_character_removed() {
        for c in ['\u{00AD}', '\u{034F}', '\u{180E}', '\u{2061}', '\u{2064}', '\u{202E}', '\u{E0041}'] {
            let layers = extract_layers(format!("Ig{c}nore").as_bytes());
            assert_eq!(layers.full_text, "Ignore", "U+{:04X} survived", c as u32);
            assert_eq!(layers.rendered_text, "Ignore");
        }
        assert!(!is_invisible_format('a'));
        assert!(!is_invisible_format('é'));
    }

    #[test]
    fn test_format_ranges_sorted() {
        assert!(INVISIBLE_FORMAT.windows(2).all(|w| w[0].1 < w[1].0));
        assert!(INVISIBLE_FORMAT.iter().all(|(lo, hi)| lo <= hi));
    }

    #[test]
    fn test_unknown_bytes_degrade() {
        let layers = extract_layers(&[0xff, 0xfe, b'h', b'i']);
        assert!(layers.mode.is_degraded());
        assert_eq!(layers.rendered_text, layers.full_text);

        let finding = layers.degraded_finding().unwrap();
        assert_eq!(finding.severity, Severity::Low);
        assert_eq!(finding.recommended_action, RecommendedAction::FlagForReview);
    }

    #[test]
    fn test_html_layers_are_layout_aware() {
        let layers = extract_layers(br#"<body><p>Shown</p><p style="opacity:0">gone</p></body>"#);
        assert_eq!(layers.format, DocumentFormat::Html);
        assert_eq!(layers.rendered_text, "Shown");
        assert_eq!(layers.full_text, "Shown\ngone");
    }
}
