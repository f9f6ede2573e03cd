//! Skill ontology: which skills are languages, which are frameworks, and
//! which specific skills imply broader ones.

/// Recognized programming languages. Only these can raise a conflict flag.
pub const LANGUAGES: &[&str] = &[
    "python", "java", "javascript", "typescript", "go", "rust", "c", "c++", "c#", "ruby", "php",
    "kotlin", "swift", "scala", "r", "haskell", "elixir", "dart", "julia", "sql", "bash",
];

/// Frameworks and libraries. Exempt from conflict checks: they often surface
/// only through imports or a bio.
pub const FRAMEWORKS: &[&str] = &[
    "react", "vue", "angular", "svelte", "nextjs", "nodejs", "express", "django", "flask",
    "fastapi", "spring", "rails", "dotnet", "tokio", "pytorch", "tensorflow", "keras",
    "scikit-learn", "pandas", "numpy", "graphql",
];

/// (specific skill, broader skill it implies)
const IMPLICATIONS: &[(&str, &str)] = &[
    ("dynamic-programming", "algorithms"),
    ("graph-algorithms", "algorithms"),
    ("data-structures", "algorithms"),
    ("pytorch", "deep-learning"),
    ("tensorflow", "deep-learning"),
    ("keras", "deep-learning"),
    ("scikit-learn", "machine-learning"),
    ("deep-learning", "machine-learning"),
    ("pandas", "data-analysis"),
    ("numpy", "data-analysis"),
    ("react", "frontend-development"),
    ("vue", "frontend-development"),
    ("angular", "frontend-development"),
    ("svelte", "frontend-development"),
    ("nextjs", "frontend-development"),
    ("django", "backend-development"),
    ("flask", "backend-development"),
    ("fastapi", "backend-development"),
    ("spring", "backend-development"),
    ("rails", "backend-development"),
    ("express", "backend-development"),
    ("docker", "containers"),
    ("kubernetes", "containers"),
    ("terraform", "infrastructure-as-code"),
    ("kafka", "distributed-systems"),
];

pub fn is_language(skill: &str) -> bool {
    LANGUAGES.contains(&skill)
}

pub fn is_framework(skill: &str) -> bool {
    FRAMEWORKS.contains(&skill)
}

/// Broader skills implied by `skill`.
pub fn implied_by(skill: &str) -> impl Iterator<Item = &'static str> + '_ {
    IMPLICATIONS
        .iter()
        .filter(move |(specific, _)| *specific == skill)
        .map(|(_, broader)| *broader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_and_framework_are_disjoint() {
        assert!(is_language("python"));
        assert!(!is_language("react"));
        assert!(is_framework("react"));
        assert!(LANGUAGES.iter().all(|l| !is_framework(l)));
    }

    #[test]
    fn test_implications() {
        let implied: Vec<&str> = implied_by("dynamic-programming").collect();
        assert_eq!(implied, vec!["algorithms"]);
        assert_eq!(implied_by("python").count(), 0);
    }
}
