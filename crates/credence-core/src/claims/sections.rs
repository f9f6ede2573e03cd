//! Deterministic section segmentation.
//!
//! A header is a short line (few words, few chars, no digits) that names a
//! known section. Text before the first header belongs to `other`.

use serde::{Deserialize, Serialize};

use crate::policy::ClaimsPolicy;

/// Label of a résumé section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Experience,
    Projects,
    Skills,
    Education,
    Certifications,
    Other,
}

/// Header keywords, checked in this order.
const HEADERS: &[(SectionKind, &[&str])] = &[
    (
        SectionKind::Certifications,
        &["certifications", "certification", "certificates", "licenses", "licences"],
    ),
    (
        SectionKind::Experience,
        &["experience", "employment", "work history", "career history", "professional background"],
    ),
    (SectionKind::Projects, &["projects", "project", "portfolio", "open source"]),
    (
        SectionKind::Skills,
        &["skills", "technologies", "tech stack", "competencies", "toolbox", "expertise"],
    ),
    (SectionKind::Education, &["education", "academic", "qualifications"]),
    (
        SectionKind::Other,
        &["summary", "profile", "about", "objective", "interests", "awards", "publications", "languages"],
    ),
];

/// A labelled run of lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub header: Option<String>,
    pub body: String,
}

/// Segmentation result.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub sections: Vec<Section>,
    /// No section passed the minimum length; `sections` are fixed windows
    pub windowed: bool,
}

impl Segmentation {
    pub fn bodies(&self, kind: SectionKind) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .filter(move |s| s.kind == kind)
            .map(|s| s.body.as_str())
    }

    pub fn has(&self, kind: SectionKind) -> bool {
        self.sections.iter().any(|s| s.kind == kind)
    }
}

/// Label a line as a section header, if it is one.
pub fn header_kind(line: &str, policy: &ClaimsPolicy) -> Option<SectionKind> {
    let cleaned = line
        .trim()
        .trim_start_matches(['#', '*', '='])
        .trim_end_matches([':', '*', '=', '#'])
        .trim();

    if cleaned.is_empty()
        || cleaned.chars().count() > policy.max_header_chars
        || cleaned.split_whitespace().count() > policy.max_header_words
        || cleaned.chars().any(|c| c.is_ascii_digit())
        || cleaned.ends_with('.')
    {
        return None;
    }

    let lower = cleaned.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let normalized = words.join(" ");

    HEADERS.iter().find_map(|(kind, keywords)| {
        keywords
            .iter()
            .any(|kw| starts_or_ends_with_phrase(&normalized, kw))
            .then_some(*kind)
    })
}

fn starts_or_ends_with_phrase(text: &str, phrase: &str) -> bool {
    text == phrase
        || text.starts_with(&format!("{} ", phrase))
        || text.ends_with(&format!(" {}", phrase))
}

/// Split text into labelled sections, or fixed windows when no section has
/// enough content.
pub fn segment(text: &str, policy: &ClaimsPolicy) -> Segmentation {
    let mut sections = Vec::new();
    let mut current = Section {
        kind: SectionKind::Other,
        header: None,
        body: String::new(),
    };

    for line in text.lines() {
        if let Some(kind) = header_kind(line, policy) {
            sections.push(current);
            current = Section {
                kind,
                header: Some(line.trim().to_string()),
                body: String::new(),
            };
        } else {
            if !current.body.is_empty() {
                current.body.push('\n');
            }
            current.body.push_str(line);
        }
    }
    sections.push(current);
    sections.retain(|s| s.header.is_some() || !s.body.trim().is_empty());

    let has_content = sections
        .iter()
        .any(|s| s.body.trim().chars().count() > policy.min_section_chars);

    if has_content {
        return Segmentation {
            sections,
            windowed: false,
        };
    }

    Segmentation {
        sections: windows(text, policy.window_chars),
        windowed: true,
    }
}

fn windows(text: &str, size: usize) -> Vec<Section> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|chunk| Section {
            kind: SectionKind::Other,
            header: None,
            body: chunk.iter().collect(),
        })
        .filter(|s| !s.body.trim().is_empty())
        .collect()
}
