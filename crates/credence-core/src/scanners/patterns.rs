//! Shared detection patterns for the integrity scanners and identity stripping.
//!
//! Every injection pattern is anchored on word boundaries so incidental
//! substrings ("ignoring edge cases") never match.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// One entry of the injection catalogue.
pub struct InjectionPattern {
    pub id: &'static str,
    pub category: InjectionCategory,
    pub regex: Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionCategory {
    /// Chat role markers and takeover phrases
    RoleTakeover,
    /// "ignore previous instructions" class directives
    IgnoreDirective,
    /// Fixed model delimiter tokens
    Delimiter,
    /// "give this candidate a perfect score"
    ScoreSetting,
    /// New or replacement instructions without an ignore clause
    InstructionOverride,
}

impl InjectionCategory {
    /// Any single match from a critical category blocks on its own.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            InjectionCategory::RoleTakeover
                | InjectionCategory::IgnoreDirective
                | InjectionCategory::Delimiter
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InjectionCategory::RoleTakeover => "role_takeover",
            InjectionCategory::IgnoreDirective => "ignore_directive",
            InjectionCategory::Delimiter => "delimiter",
            InjectionCategory::ScoreSetting => "score_setting",
            InjectionCategory::InstructionOverride => "instruction_override",
        }
    }
}

fn pattern(id: &'static str, category: InjectionCategory, re: &str) -> InjectionPattern {
    InjectionPattern {
        id,
        category,
        regex: Regex::new(re).unwrap(),
    }
}

lazy_static! {
    /// Word tokens used for multiset comparison of the two views.
    pub static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'+#_-]*").unwrap();

    // =========================================================================
    // PII DETECTION PATTERNS
    // =========================================================================

    /// Email address pattern (RFC 5322 simplified)
    pub static ref EMAIL_PATTERN: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    /// Phone number with optional country code
    pub static ref PHONE_PATTERN: Regex = Regex::new(
        r"(?:\+?\d{1,3}[-.\s]?)?(?:\(\d{3}\)|\d{3})[-.\s]?\d{3}[-.\s]?\d{4}"
    ).unwrap();

    // =========================================================================
    // INJECTION CATALOGUE
    // =========================================================================

    pub static ref INJECTION_PATTERNS: Vec<InjectionPattern> = vec![
        pattern(
            "role_marker",
            InjectionCategory::RoleTakeover,
            r"(?im)^\s*(?:system|assistant)\s*:",
        ),
        pattern(
            "you_are_now",
            InjectionCategory::RoleTakeover,
            r"(?i)\byou\s+are\s+now\s+(?:an?|the|my)\b",
        ),
        pattern(
            "act_as_evaluator",
            InjectionCategory::RoleTakeover,
            r"(?i)\b(?:act|behave|respond)\s+as\s+(?:an?|the)\s+(?:recruiter|evaluator|hiring\s+manager|screening\s+(?:system|bot)|ai|assistant)\b",
        ),
        pattern(
            "ignore_previous",
            InjectionCategory::IgnoreDirective,
            r"(?i)\b(?:ignore|disregard|forget|override)\s+(?:all\s+|any\s+)?(?:of\s+)?(?:the\s+|your\s+)?(?:previous|prior|above|earlier|preceding|original|system)\s+(?:instructions?|prompts?|directions?|rules|guidelines|context)\b",
        ),
        pattern(
            "ignore_everything",
            InjectionCategory::IgnoreDirective,
            r"(?i)\b(?:ignore|disregard)\s+(?:everything|all)\s+(?:above|before|else)\b",
        ),
        pattern(
            "chatml_delimiter",
            InjectionCategory::Delimiter,
            r"<\|(?:im_start|im_end|endoftext|system|user|assistant)\|>",
        ),
        pattern(
            "inst_delimiter",
            InjectionCategory::Delimiter,
            r"\[/?INST\]|<<\s*/?SYS\s*>>",
        ),
        pattern(
            "markdown_role_header",
            InjectionCategory::Delimiter,
            r"(?im)^\s*#{2,}\s*(?:system|instruction|instructions)\s*#*\s*$",
        ),
        pattern(
            "give_score",
            InjectionCategory::ScoreSetting,
            r"(?i)\b(?:give|assign|award|grant)\s+(?:this\s+|the\s+)?(?:candidate|applicant|resume|profile)\s+(?:an?\s+)?(?:perfect|maximum|max|top|highest|full)\s+(?:score|rating|marks?|rank(?:ing)?)\b",
        ),
        pattern(
            "rate_as",
            InjectionCategory::ScoreSetting,
            r"(?i)\b(?:rate|score|rank)\s+(?:this\s+|the\s+)?(?:candidate|applicant|resume|profile)\s+(?:as\s+)?(?:10/10|100/100|100%|the\s+(?:best|top))\b",
        ),
        pattern(
            "new_instructions",
            InjectionCategory::InstructionOverride,
            r"(?i)\b(?:new|updated|revised|additional)\s+instructions?\s*:",
        ),
        pattern(
            "do_not_flag",
            InjectionCategory::InstructionOverride,
            r"(?i)\bdo\s+not\s+(?:flag|reject|penalize|screen\s+out|filter\s+out)\s+(?:this\s+)?(?:candidate|applicant|resume|document)\b",
        ),
    ];

    // =========================================================================
    // SEMANTIC REGISTER PHRASES
    // =========================================================================

    /// Sentences that impersonate evaluation guidance without issuing a
    /// direct command.
    pub static ref SEMANTIC_PHRASES: Vec<Regex> = vec![
        Regex::new(r"(?i)\bnote\s+(?:to|for)\s+(?:the\s+|any\s+)?(?:reviewer|recruiter|evaluator|screener|screening\s+system|hiring\s+(?:team|manager)|ai)s?\b").unwrap(),
        Regex::new(r"(?i)\b(?:evaluators?|reviewers?|screening\s+systems?|automated\s+(?:systems?|tools?)|ai\s+(?:systems?|models?))\s+(?:should|must|are\s+(?:advised|expected)\s+to)\s+(?:note|consider|treat|rank|prioriti[sz]e|regard)\b").unwrap(),
        Regex::new(r"(?i)\b(?:this|the)\s+(?:candidate|applicant|profile)\s+(?:has\s+been|was|is)\s+(?:already\s+)?(?:pre-?(?:screened|approved|vetted)|verified\s+by|approved\s+by|endorsed\s+by)\b").unwrap(),
        Regex::new(r"(?i)\b(?:this|the)\s+(?:candidate|applicant|profile)\s+(?:fully\s+)?(?:meets|exceeds|satisfies)\s+(?:all|every\s+one)\s+(?:of\s+)?(?:the|your)\s+(?:requirements|qualifications|criteria)\b").unwrap(),
        Regex::new(r"(?i)\bshould\s+be\s+(?:considered|treated|ranked|scored|regarded)\s+as\s+(?:an?\s+)?(?:top|strong|ideal|qualified|expert|perfect)\b").unwrap(),
        Regex::new(r"(?i)\bfor\s+(?:the\s+)?(?:purposes?\s+of\s+)?(?:this|the|any)\s+(?:automated\s+)?(?:evaluation|assessment|screening),\s+(?:assume|treat|consider)\b").unwrap(),
    ];
}

/// Keywords that are only suspicious when hidden from the reader: they inflate
/// keyword-matching scores.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    // seniority and praise
    "senior", "principal", "staff", "lead", "expert", "exceptional", "outstanding",
    "genius", "rockstar", "ninja", "guru", "perfect", "ideal", "qualified",
    "hire", "hired", "recommend", "recommended", "shortlist", "top",
    // stuffed technologies
    "python", "java", "javascript", "typescript", "golang", "rust", "kubernetes",
    "aws", "docker", "react", "tensorflow", "pytorch", "llm", "ai",
    // evaluation vocabulary
    "candidate", "score", "ranking", "instructions", "prompt", "system",
];

/// Lowercase word tokens of `text`.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD.find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Built-in suspicious keywords plus policy extensions.
pub fn suspicious_keywords(extra: &[String]) -> HashSet<String> {
    SUSPICIOUS_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .chain(extra.iter().flat_map(|k| words(k).collect::<Vec<_>>()))
        .collect()
}

/// Check if content contains any email addresses.
pub fn contains_email(content: &str) -> bool {
    EMAIL_PATTERN.is_match(content)
}

/// Check if content contains any phone numbers.
pub fn contains_phone(content: &str) -> bool {
    PHONE_PATTERN.is_match(content)
}
