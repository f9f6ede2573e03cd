//! DOCX reader: pulls runs out of `word/document.xml`.
//!
//! Run properties decide visibility: `<w:vanish/>`, a near-white color or a
//! font size of 2pt or less keep the run out of the rendered view.

use lazy_static::lazy_static;
use regex::Regex;
use std::io::{Cursor, Read};
use thiserror::Error;

use super::style::{Rgb, StyleHint, StylingTechnique};
use super::{normalize_view, Views};

lazy_static! {
    static ref PARAGRAPH: Regex = Regex::new(r"(?s)<w:p[ >].*?</w:p>").unwrap();
    static ref RUN: Regex = Regex::new(r"(?s)<w:r[ >].*?</w:r>").unwrap();
    static ref RUN_PROPS: Regex = Regex::new(r"(?s)<w:rPr>(.*?)</w:rPr>").unwrap();
    static ref RUN_TEXT: Regex = Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab/>|<w:br/>").unwrap();
    static ref VANISH: Regex = Regex::new(r#"<w:(?:spec)?[vV]anish(?:\s+w:val="(?:1|true|on)")?\s*/>"#).unwrap();
    static ref COLOR: Regex = Regex::new(r#"<w:color\s+w:val="([0-9A-Fa-f]{6})""#).unwrap();
    static ref SIZE: Regex = Regex::new(r#"<w:sz\s+w:val="(\d+)""#).unwrap();
}

/// Half-points; 4 half-points is a 2pt font.
const MAX_HIDDEN_HALF_POINTS: u32 = 4;

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("not a zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to read document part: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether the archive looks like a Word document.
pub fn is_docx(bytes: &[u8]) -> bool {
    let Ok(mut archive) = zip::ZipArchive::new(Cursor::new(bytes)) else {
        return false;
    };
    let found = archive.by_name("word/document.xml").is_ok();
    found
}

/// Read a DOCX archive into both views plus run-level style hints.
pub fn read(bytes: &[u8]) -> Result<Views, DocxError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name("word/document.xml")?.read_to_string(&mut xml)?;
    Ok(read_document_xml(&xml))
}

fn read_document_xml(xml: &str) -> Views {
    let mut rendered = String::new();
    let mut full = String::new();
    let mut hints = Vec::new();

    for paragraph in PARAGRAPH.find_iter(xml) {
        for run in RUN.find_iter(paragraph.as_str()) {
            let run = run.as_str();
            let text = run_text(run);
            if text.is_empty() {
                continue;
            }

            let techniques = run_suppression(run);
            for (technique, declaration) in &techniques {
                hints.push(StyleHint {
                    technique: *technique,
                    declaration: declaration.clone(),
                    element: "w:r".to_string(),
                    text_preview: text.chars().take(60).collect(),
                });
            }

            full.push_str(&text);
            if techniques.is_empty() {
                rendered.push_str(&text);
            }
        }
        full.push('\n');
        rendered.push('\n');
    }

    Views {
        rendered: normalize_view(&rendered),
        full: normalize_view(&full),
        style_layer: Some(hints),
    }
}

fn run_text(run: &str) -> String {
    let mut out = String::new();
    for cap in RUN_TEXT.captures_iter(run) {
        match cap.get(1) {
            Some(text) => out.push_str(&decode_entities(text.as_str())),
            None if cap[0].starts_with("<w:br") => out.push('\n'),
            None => out.push(' '),
        }
    }
    out
}

fn run_suppression(run: &str) -> Vec<(StylingTechnique, String)> {
    let Some(props) = RUN_PROPS.captures(run).and_then(|c| c.get(1)) else {
        return Vec::new();
    };
    let props = props.as_str();
    let mut techniques = Vec::new();

    if let Some(m) = VANISH.find(props) {
        techniques.push((StylingTechnique::VanishedRun, m.as_str().to_string()));
    }

    if let Some(cap) = COLOR.captures(props) {
        if Rgb::parse_hex(&cap[1]).map_or(false, |c| c.is_near(&Rgb::WHITE)) {
            techniques.push((StylingTechnique::BackgroundColor, cap[0].to_string()));
        }
    }

    if let Some(cap) = SIZE.captures(props) {
        if cap[1].parse::<u32>().map_or(false, |hp| hp <= MAX_HIDDEN_HALF_POINTS) {
            techniques.push((StylingTechnique::MicroscopicFont, cap[0].to_string()));
        }
    }

    techniques
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(runs: &[(&str, &str)]) -> String {
        let body: String = runs
            .iter()
            .map(|(props, text)| format!("<w:r><w:rPr>{}</w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r>", props, text))
            .collect();
        format!("<w:p>{}</w:p>", body)
    }

    #[test]
    fn test_plain_runs_visible() {
        let xml = paragraph(&[("", "Software Engineer "), ("<w:b/>", "at Acme")]);
        let views = read_document_xml(&xml);
        assert_eq!(views.rendered, "Software Engineer at Acme");
        assert_eq!(views.rendered, views.full);
    }

    #[test]
    fn test_vanished_run_hidden() {
        let xml = paragraph(&[("", "Visible. "), ("<w:vanish/>", "expert senior")]);
        let views = read_document_xml(&xml);
        assert_eq!(views.rendered, "Visible.");
        assert_eq!(views.full, "Visible. expert senior");
        let hints = views.style_layer.unwrap();
        assert_eq!(hints[0].technique, StylingTechnique::VanishedRun);
    }

    #[test]
    fn test_white_and_tiny_runs_hidden() {
        let xml = paragraph(&[
            ("<w:color w:val=\"FFFFFF\"/>", "white"),
            ("<w:sz w:val=\"2\"/>", "tiny"),
            ("<w:sz w:val=\"22\"/>", "normal"),
        ]);
        let views = read_document_xml(&xml);
        assert_eq!(views.rendered, "normal");
        assert_eq!(views.style_layer.unwrap().len(), 2);
    }

    #[test]
    fn test_entities_decoded() {
        let xml = paragraph(&[("", "R&amp;D &lt;team&gt;")]);
        assert_eq!(read_document_xml(&xml).full, "R&D <team>");
    }

    #[test]
    fn test_non_zip_rejected() {
        assert!(!is_docx(b"plain text"));
        assert!(read(b"plain text").is_err());
    }
}
