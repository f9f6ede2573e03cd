//! Technology vocabulary and skill normalization.
//!
//! Every skill mention, whatever its source, is reduced to one canonical
//! lowercase token: "React.js" → `react`, "Amazon Web Services" → `aws`,
//! "Python 3.11" → `python`.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Canonical skill tokens and the spellings that map onto them.
const VOCABULARY: &[(&str, &[&str])] = &[
    // languages
    ("python", &["python", "python3", "py"]),
    ("java", &["java"]),
    ("javascript", &["javascript", "js", "ecmascript", "es6"]),
    ("typescript", &["typescript", "ts"]),
    ("go", &["go", "golang"]),
    ("rust", &["rust", "rustlang"]),
    ("c", &["c", "ansi c"]),
    ("c++", &["c++", "cpp"]),
    ("c#", &["c#", "csharp", "c sharp"]),
    ("ruby", &["ruby"]),
    ("php", &["php"]),
    ("kotlin", &["kotlin"]),
    ("swift", &["swift"]),
    ("scala", &["scala"]),
    ("r", &["r"]),
    ("haskell", &["haskell"]),
    ("elixir", &["elixir"]),
    ("dart", &["dart"]),
    ("julia", &["julia"]),
    ("sql", &["sql"]),
    ("bash", &["bash", "shell scripting", "shell"]),
    // frameworks and libraries
    ("react", &["react", "react.js", "reactjs", "react js"]),
    ("vue", &["vue", "vue.js", "vuejs"]),
    ("angular", &["angular", "angularjs", "angular.js"]),
    ("svelte", &["svelte"]),
    ("nextjs", &["next.js", "nextjs", "next js"]),
    ("nodejs", &["node.js", "nodejs", "node"]),
    ("express", &["express", "express.js", "expressjs"]),
    ("django", &["django"]),
    ("flask", &["flask"]),
    ("fastapi", &["fastapi"]),
    ("spring", &["spring", "spring boot", "springboot"]),
    ("rails", &["rails", "ruby on rails", "ror"]),
    ("dotnet", &[".net", "dotnet", ".net core", "asp.net"]),
    ("tokio", &["tokio"]),
    ("pytorch", &["pytorch", "torch"]),
    ("tensorflow", &["tensorflow", "tf"]),
    ("keras", &["keras"]),
    ("scikit-learn", &["scikit-learn", "scikit learn", "sklearn"]),
    ("pandas", &["pandas"]),
    ("numpy", &["numpy"]),
    ("graphql", &["graphql"]),
    // infrastructure
    ("aws", &["aws", "amazon web services"]),
    ("gcp", &["gcp", "google cloud", "google cloud platform"]),
    ("azure", &["azure", "microsoft azure"]),
    ("docker", &["docker"]),
    ("kubernetes", &["kubernetes", "k8s"]),
    ("terraform", &["terraform"]),
    ("linux", &["linux"]),
    ("postgresql", &["postgresql", "postgres", "psql"]),
    ("mysql", &["mysql"]),
    ("mongodb", &["mongodb", "mongo"]),
    ("redis", &["redis"]),
    ("kafka", &["kafka", "apache kafka"]),
    ("ci-cd", &["ci/cd", "cicd", "ci cd", "continuous integration"]),
    // tools
    ("git", &["git"]),
    ("github-actions", &["github actions"]),
    ("jenkins", &["jenkins"]),
    ("jira", &["jira"]),
    ("figma", &["figma"]),
    ("webpack", &["webpack"]),
    ("tableau", &["tableau"]),
    // disciplines
    ("algorithms", &["algorithms", "algorithm design"]),
    ("data-structures", &["data structures"]),
    ("dynamic-programming", &["dynamic programming", "dp"]),
    ("graph-algorithms", &["graph algorithms", "graph theory", "graphs"]),
    ("machine-learning", &["machine learning", "ml"]),
    ("deep-learning", &["deep learning"]),
    ("distributed-systems", &["distributed systems"]),
];

/// Spellings that are too ambiguous to accept from free prose. They are
/// still accepted from explicit skill lists. The last row doubles as
/// personal names.
const LIST_ONLY: &[&str] = &[
    "c", "r", "go", "py", "js", "ts", "tf", "dp", "ml", "node", "shell", "express", "spring",
    "swift", "rust", "graphs", "torch", "ror", "mongo", "psql",
    "julia", "ruby", "dart", "jenkins",
];

/// Longest alias, in tokens.
const MAX_ALIAS_TOKENS: usize = 4;

lazy_static! {
    static ref ALIASES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        for (canonical, aliases) in VOCABULARY {
            map.insert(*canonical, *canonical);
            for alias in *aliases {
                map.insert(*alias, *canonical);
            }
        }
        map
    };

    /// Tokens that can form part of a technology name.
    static ref TOKEN: Regex = Regex::new(r"[A-Za-z0-9.][A-Za-z0-9+#./-]*").unwrap();

    static ref VERSION: Regex = Regex::new(r"^v?\d+(?:\.\d+)*[a-z]?$").unwrap();

    static ref PARENTHESIZED: Regex = Regex::new(r"\([^)]*\)").unwrap();

    static ref LIST_SEPARATOR: Regex = Regex::new(r"[,;|•·▪●\n\t]|\s+and\s+|\s/\s").unwrap();
}

fn tokens(text: &str) -> Vec<String> {
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', '/', '-']).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Find known technologies in free prose, longest spelling first.
pub fn scan_mentions(text: &str) -> Vec<String> {
    scan_tokens(&tokens(text), false)
}

fn scan_tokens(tokens: &[String], allow_ambiguous: bool) -> Vec<String> {
    let mut found = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let mut matched = 0;
        for n in (1..=MAX_ALIAS_TOKENS.min(tokens.len() - i)).rev() {
            let phrase = tokens[i..i + n].join(" ");
            if let Some(canonical) = lookup_token(&phrase) {
                if n > 1 || allow_ambiguous || !LIST_ONLY.contains(&phrase.as_str()) {
                    push_unique(&mut found, canonical.to_string());
                    matched = n;
                    break;
                }
            }
        }
        i += matched.max(1);
    }
    found
}

/// Alias lookup tolerating a `.js`/`js` suffix and a trailing version number.
fn lookup_token(token: &str) -> Option<&'static str> {
    if let Some(c) = ALIASES.get(token) {
        return Some(*c);
    }
    let stripped = token
        .strip_suffix(".js")
        .or_else(|| token.strip_suffix("js"))
        .filter(|s| !s.is_empty());
    if let Some(c) = stripped.and_then(|s| ALIASES.get(s).copied()) {
        return Some(c);
    }
    // python3.11, java17
    let base = token.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    if base.len() >= 2 && base.len() < token.len() {
        return ALIASES.get(base).copied();
    }
    None
}

/// Normalize one explicitly listed skill to its most specific atomic token.
///
/// Unknown skills are kept as a lowercase hyphenated token.
pub fn normalize(raw: &str) -> Option<String> {
    let without_parens = PARENTHESIZED.replace_all(raw, " ");
    let toks: Vec<String> = tokens(&without_parens)
        .into_iter()
        .filter(|t| !VERSION.is_match(t))
        .collect();
    if toks.is_empty() {
        // "(AWS)" alone
        return tokens(raw).first().and_then(|t| lookup_token(t)).map(str::to_string);
    }

    let joined = toks.join(" ");
    if let Some(c) = lookup_token(&joined).or_else(|| lookup_token(&joined.replace(['-', '_'], " "))) {
        return Some(c.to_string());
    }

    let known = scan_tokens(&toks, true);
    if let Some(first) = known.into_iter().next() {
        return Some(first);
    }

    let slug = toks.join("-");
    (slug.len() <= 40).then_some(slug)
}

/// Split a skills-section body into normalized skills.
pub fn parse_skill_list(body: &str) -> Vec<String> {
    let mut skills = Vec::new();
    for line in body.lines() {
        // "Languages: Python, Go" keeps only the list part
        let list = match line.split_once(':') {
            Some((label, rest)) if label.split_whitespace().count() <= 3 => rest,
            _ => line,
        };
        for item in LIST_SEPARATOR.split(list) {
            let item = item.trim().trim_start_matches(['-', '*']).trim();
            if item.is_empty() || item.split_whitespace().count() > 4 {
                continue;
            }
            if let Some(skill) = normalize(item) {
                push_unique(&mut skills, skill);
            }
        }
    }
    skills
}

pub(crate) fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize("React.js").as_deref(), Some("react"));
        assert_eq!(normalize("Amazon Web Services").as_deref(), Some("aws"));
        assert_eq!(normalize("Python 3.11").as_deref(), Some("python"));
        assert_eq!(normalize("Amazon Web Services (AWS)").as_deref(), Some("aws"));
        assert_eq!(normalize("golang").as_deref(), Some("go"));
        assert_eq!(normalize("C++").as_deref(), Some("c++"));
        assert_eq!(normalize("Node.js").as_deref(), Some("nodejs"));
        assert_eq!(normalize("Java 17").as_deref(), Some("java"));
    }

    #[test]
    fn test_normalize_is_idempotent_for_canonical_tokens() {
        assert_eq!(normalize("machine-learning").as_deref(), Some("machine-learning"));
        assert_eq!(normalize("dynamic_programming").as_deref(), Some("dynamic-programming"));
        assert_eq!(normalize("ci-cd").as_deref(), Some("ci-cd"));
    }

    #[test]
    fn test_unknown_skill_is_slugged() {
        assert_eq!(normalize("Event Sourcing").as_deref(), Some("event-sourcing"));
    }

    #[test]
    fn test_scan_prose_skips_ambiguous_short_tokens() {
        let found = scan_mentions("Built services in Go and Python on AWS; go-to person for React.js");
        assert_eq!(found, vec!["python", "aws", "react"]);
    }

    #[test]
    fn test_scan_prefers_longest_alias() {
        let found = scan_mentions("Deployed Ruby on Rails apps to Google Cloud Platform");
        assert_eq!(found, vec!["rails", "gcp"]);
    }

    #[test]
    fn test_parse_skill_list() {
        let body = "Languages: Python, Go, TypeScript\nCloud: AWS | Docker | Kubernetes (K8s)\nReact.js and Node.js";
        let skills = parse_skill_list(body);
        assert_eq!(
            skills,
            vec!["python", "go", "typescript", "aws", "docker", "kubernetes", "react", "nodejs"]
        );
    }

    #[test]
    fn test_names_in_prose_are_not_languages() {
        assert!(scan_mentions("Julia Martinez").is_empty());
        assert!(scan_mentions("Ruby Chen, reporting to Sam Jenkins").is_empty());
        assert!(scan_mentions("Shipped a Dart prototype").is_empty());

        let listed = parse_skill_list("Julia, Ruby, Dart, Jenkins");
        assert_eq!(listed, vec!["julia", "ruby", "dart", "jenkins"]);
    }
}
