//! Project extraction by title delimiters.
//!
//! A project starts at a non-bullet line that is either `Name – description`
//! (also `:` or `|`) or a short title on its own. Bullets that follow become
//! highlights, prose becomes description.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref TITLE_DELIMITER: Regex = Regex::new(r"^(.{2,60}?)\s*(?:\s[–—-]\s|:\s|\s\|\s)\s*(.+)$").unwrap();

    static ref BULLET: Regex = Regex::new(r"^\s*(?:[-*•·▪●◦]|\d+[.)])\s+").unwrap();
}

const MAX_NAME_WORDS: usize = 6;
const MAX_BARE_TITLE_WORDS: usize = 8;

/// One project claimed in the document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub highlights: Vec<String>,
}

impl ProjectEntry {
    pub fn completeness(&self) -> f64 {
        let filled = [
            !self.name.is_empty(),
            !self.description.is_empty(),
            !self.highlights.is_empty(),
        ]
        .iter()
        .filter(|f| **f)
        .count();
        filled as f64 / 3.0
    }
}

/// Extract projects from the text of project sections.
pub fn extract(text: &str) -> Vec<ProjectEntry> {
    let mut projects: Vec<ProjectEntry> = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if BULLET.is_match(line) {
            let item = BULLET.replace(line, "").trim().to_string();
            if let Some(last) = projects.last_mut() {
                last.highlights.push(item);
            }
            continue;
        }

        if let Some(cap) = TITLE_DELIMITER.captures(line) {
            let name = cap[1].trim();
            if name.split_whitespace().count() <= MAX_NAME_WORDS {
                projects.push(ProjectEntry {
                    name: name.to_string(),
                    description: cap[2].trim().to_string(),
                    highlights: Vec::new(),
                });
                continue;
            }
        }

        let is_bare_title = line.split_whitespace().count() <= MAX_BARE_TITLE_WORDS
            && !line.ends_with('.')
            && projects.last().map_or(true, |p| !p.description.is_empty() || !p.highlights.is_empty());
        if is_bare_title {
            projects.push(ProjectEntry {
                name: line.to_string(),
                ..ProjectEntry::default()
            });
            continue;
        }

        if let Some(last) = projects.last_mut() {
            if !last.description.is_empty() {
                last.description.push(' ');
            }
            last.description.push_str(line);
        }
    }

    projects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_titles() {
        let text = "ledgerd – double-entry ledger service in Rust\n\
                    - 40k writes/s on a single node\n\
                    - Property-tested with proptest\n\
                    Trailhead: hiking route planner";
        let projects = extract(text);
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "ledgerd");
        assert_eq!(projects[0].description, "double-entry ledger service in Rust");
        assert_eq!(projects[0].highlights.len(), 2);
        assert_eq!(projects[1].name, "Trailhead");
        assert!(projects[1].highlights.is_empty());
    }

    #[test]
    fn test_bare_title_with_prose() {
        let text = "Compiler Playground\nAn online sandbox for a toy language.\nRuns in the browser via WASM.";
        let projects = extract(text);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Compiler Playground");
        assert_eq!(
            projects[0].description,
            "An online sandbox for a toy language. Runs in the browser via WASM."
        );
        assert_eq!(projects[0].completeness(), 2.0 / 3.0);
    }
}
