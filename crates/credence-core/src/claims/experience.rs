//! Pattern-based experience extraction.
//!
//! Reconstructs (title, company, timeframe) triples from two layouts:
//!
//! 1. Inline: `Senior Engineer at Acme (Jan 2020 - Present)`
//! 2. Separated: title lines without dates, with the date ranges on lines of
//!    their own; dates are matched to titles positionally in document order.
//!
//! Bullets and prose that follow an entry become its responsibilities.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref DATE_RANGE: Regex = Regex::new(
        r"(?i)\b(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+|\d{1,2}/)?\d{4}\s*(?:-|–|—|to|until)\s*(?:(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+|\d{1,2}/)?\d{4}|present|current|now|today)\b"
    ).unwrap();

    static ref ROLE: Regex = Regex::new(
        r"(?i)\b(?:engineer|developer|programmer|architect|manager|lead|analyst|scientist|consultant|designer|administrator|specialist|director|intern|researcher|founder|cto|head\s+of|sre|devops)\b"
    ).unwrap();

    /// Title/company separators, strongest first.
    static ref SEPARATOR: Regex = Regex::new(r"\s+(?:at|@)\s+|\s*[|–—]\s*|\s+-\s+|,\s+").unwrap();

    static ref BULLET: Regex = Regex::new(r"^\s*(?:[-*•·▪●◦]|\d+[.)])\s+").unwrap();
}

const TRIM: &[char] = &[' ', '\t', ',', '|', '-', '–', '—', '(', ')', '[', ']', ':', '@'];

/// One position held.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub timeframe: Option<String>,
    pub responsibilities: Vec<String>,
}

impl ExperienceEntry {
    /// Case- and whitespace-insensitive identity used for deduplication.
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            squash(&self.company),
            squash(&self.title),
            squash(self.timeframe.as_deref().unwrap_or("")),
        )
    }

    /// Fraction of the four fields that are filled.
    pub fn completeness(&self) -> f64 {
        let filled = [
            !self.title.is_empty(),
            !self.company.is_empty(),
            self.timeframe.is_some(),
            !self.responsibilities.is_empty(),
        ]
        .iter()
        .filter(|f| **f)
        .count();
        filled as f64 / 4.0
    }
}

fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Extract experience entries from the text of experience sections.
pub fn extract(text: &str) -> Vec<ExperienceEntry> {
    let mut entries: Vec<ExperienceEntry> = Vec::new();
    let mut loose_dates: Vec<String> = Vec::new();
    // whether the last entry still expects a company line (layout 2)
    let mut awaiting_company = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let bullet = BULLET.is_match(line);

        if !bullet {
            if let Some(range) = DATE_RANGE.find(line) {
                let timeframe = squash_range(range.as_str());
                let prefix = line[..range.start()].trim_matches(TRIM);
                match split_title_company(prefix) {
                    Some((title, company)) => {
                        entries.push(ExperienceEntry {
                            title,
                            company,
                            timeframe: Some(timeframe),
                            responsibilities: Vec::new(),
                        });
                        awaiting_company = false;
                    }
                    None => loose_dates.push(timeframe),
                }
                continue;
            }

            if is_title_line(line) {
                let (title, company) = split_title_company(line)
                    .unwrap_or_else(|| (line.trim_matches(TRIM).to_string(), String::new()));
                awaiting_company = company.is_empty();
                entries.push(ExperienceEntry {
                    title,
                    company,
                    timeframe: None,
                    responsibilities: Vec::new(),
                });
                continue;
            }

            if awaiting_company && line.split_whitespace().count() <= 6 && !line.ends_with('.') {
                if let Some(last) = entries.last_mut() {
                    last.company = line.trim_matches(TRIM).to_string();
                }
                awaiting_company = false;
                continue;
            }
        }

        awaiting_company = false;
        if let Some(last) = entries.last_mut() {
            let item = BULLET.replace(line, "").trim().to_string();
            if !item.is_empty() {
                last.responsibilities.push(item);
            }
        }
    }

    // Layout 2: dates on their own lines pair with undated titles in order.
    let mut dates = loose_dates.into_iter();
    for entry in entries.iter_mut().filter(|e| e.timeframe.is_none()) {
        match dates.next() {
            Some(date) => entry.timeframe = Some(date),
            None => break,
        }
    }

    entries
}

fn squash_range(range: &str) -> String {
    range.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A short line naming a role, without sentence punctuation.
fn is_title_line(line: &str) -> bool {
    let words = line.split_whitespace().count();
    (1..=10).contains(&words) && ROLE.is_match(line) && !line.ends_with('.')
}

/// Split "Title at Company" into its parts. The side holding a role keyword
/// is the title.
fn split_title_company(text: &str) -> Option<(String, String)> {
    let text = text.trim_matches(TRIM);
    if text.is_empty() {
        return None;
    }

    let Some(sep) = SEPARATOR.find(text) else {
        return ROLE
            .is_match(text)
            .then(|| (text.to_string(), String::new()));
    };

    let left = text[..sep.start()].trim_matches(TRIM).to_string();
    let right = text[sep.end()..].trim_matches(TRIM).to_string();
    if left.is_empty() && right.is_empty() {
        return None;
    }

    if !ROLE.is_match(&left) && ROLE.is_match(&right) {
        Some((right, left))
    } else {
        Some((left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_layout() {
        let text = "Senior Engineer at Acme Corp (Jan 2020 - Present)\n\
                    - Led migration to Rust\n\
                    - Cut p99 latency by half\n\
                    Software Developer | Globex | 2016 – 2019\n\
                    - Built internal tools";
        let entries = extract(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Senior Engineer");
        assert_eq!(entries[0].company, "Acme Corp");
        assert_eq!(entries[0].timeframe.as_deref(), Some("Jan 2020 - Present"));
        assert_eq!(entries[0].responsibilities.len(), 2);
        assert_eq!(entries[1].title, "Software Developer");
        assert_eq!(entries[1].company, "Globex");
        assert_eq!(entries[1].timeframe.as_deref(), Some("2016 – 2019"));
    }

    #[test]
    fn test_separated_layout_matches_dates_positionally() {
        let text = "Staff Engineer\nInitech\n- Owned the data platform\n\
                    Backend Developer\nHooli\n- Wrote payment services\n\
                    2021 - Present\n2018 - 2021";
        let entries = extract(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].company, "Initech");
        assert_eq!(entries[0].timeframe.as_deref(), Some("2021 - Present"));
        assert_eq!(entries[1].title, "Backend Developer");
        assert_eq!(entries[1].company, "Hooli");
        assert_eq!(entries[1].timeframe.as_deref(), Some("2018 - 2021"));
    }

    #[test]
    fn test_company_first_is_swapped() {
        let (title, company) = split_title_company("Acme, Platform Engineer").unwrap();
        assert_eq!(title, "Platform Engineer");
        assert_eq!(company, "Acme");
    }

    #[test]
    fn test_dedup_key_ignores_case_and_spacing() {
        let a = ExperienceEntry {
            title: "Senior  Engineer".into(),
            company: "ACME".into(),
            timeframe: Some("2020 - 2021".into()),
            responsibilities: vec![],
        };
        let b = ExperienceEntry {
            title: "senior engineer".into(),
            company: "acme".into(),
            timeframe: Some("2020  - 2021".into()),
            responsibilities: vec!["x".into()],
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_eq!(a.completeness(), 0.75);
    }
}
