//! Skill tiers for the decision output.
//!
//! Exact table lookup first, then a keyword taxonomy over the skill name.
//! Anything unmatched lands in `core`.

use serde::{Deserialize, Serialize};

use crate::graph::ontology;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    Core,
    Frameworks,
    Infrastructure,
    Tools,
}

const CORE_EXTRA: &[&str] = &[
    "algorithms",
    "data-structures",
    "dynamic-programming",
    "graph-algorithms",
    "machine-learning",
    "deep-learning",
    "distributed-systems",
    "system-design",
];

const INFRASTRUCTURE: &[&str] = &[
    "aws", "gcp", "azure", "docker", "kubernetes", "terraform", "ansible", "linux", "nginx",
    "containers", "postgresql", "mysql", "mongodb", "redis", "kafka", "elasticsearch",
    "infrastructure-as-code", "ci-cd",
];

const TOOLS: &[&str] = &[
    "git", "jira", "figma", "jenkins", "github-actions", "webpack", "vim", "postman", "excel",
    "tableau",
];

/// (substring, tier) pairs tried in order when no table matches.
const TAXONOMY: &[(&str, SkillTier)] = &[
    ("cloud", SkillTier::Infrastructure),
    ("devops", SkillTier::Infrastructure),
    ("container", SkillTier::Infrastructure),
    ("database", SkillTier::Infrastructure),
    ("sql", SkillTier::Infrastructure),
    ("infra", SkillTier::Infrastructure),
    ("framework", SkillTier::Frameworks),
    ("development", SkillTier::Frameworks),
    ("js", SkillTier::Frameworks),
    ("tool", SkillTier::Tools),
    ("lint", SkillTier::Tools),
    ("testing", SkillTier::Tools),
];

pub fn classify(skill: &str) -> SkillTier {
    if ontology::is_language(skill) || CORE_EXTRA.contains(&skill) {
        return SkillTier::Core;
    }
    if ontology::is_framework(skill) {
        return SkillTier::Frameworks;
    }
    if INFRASTRUCTURE.contains(&skill) {
        return SkillTier::Infrastructure;
    }
    if TOOLS.contains(&skill) {
        return SkillTier::Tools;
    }
    TAXONOMY
        .iter()
        .find(|(keyword, _)| skill.contains(*keyword))
        .map_or(SkillTier::Core, |(_, tier)| *tier)
}

/// Skills grouped by tier, each list sorted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TieredSkills {
    pub core: Vec<String>,
    pub frameworks: Vec<String>,
    pub infrastructure: Vec<String>,
    pub tools: Vec<String>,
}

impl TieredSkills {
    pub fn from_skills<'a>(skills: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tiers = Self::default();
        for skill in skills {
            let bucket = match classify(skill) {
                SkillTier::Core => &mut tiers.core,
                SkillTier::Frameworks => &mut tiers.frameworks,
                SkillTier::Infrastructure => &mut tiers.infrastructure,
                SkillTier::Tools => &mut tiers.tools,
            };
            bucket.push(skill.to_string());
        }
        for bucket in [
            &mut tiers.core,
            &mut tiers.frameworks,
            &mut tiers.infrastructure,
            &mut tiers.tools,
        ] {
            bucket.sort();
            bucket.dedup();
        }
        tiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        assert_eq!(classify("rust"), SkillTier::Core);
        assert_eq!(classify("algorithms"), SkillTier::Core);
        assert_eq!(classify("react"), SkillTier::Frameworks);
        assert_eq!(classify("kubernetes"), SkillTier::Infrastructure);
        assert_eq!(classify("git"), SkillTier::Tools);
    }

    #[test]
    fn test_taxonomy_fallback() {
        assert_eq!(classify("cloud-architecture"), SkillTier::Infrastructure);
        assert_eq!(classify("frontend-development"), SkillTier::Frameworks);
        assert_eq!(classify("unit-testing"), SkillTier::Tools);
        assert_eq!(classify("quantum-chemistry"), SkillTier::Core);
    }

    #[test]
    fn test_grouping_is_sorted() {
        let tiers = TieredSkills::from_skills(["rust", "docker", "c++", "react"]);
        assert_eq!(tiers.core, vec!["c++", "rust"]);
        assert_eq!(tiers.frameworks, vec!["react"]);
        assert_eq!(tiers.infrastructure, vec!["docker"]);
        assert!(tiers.tools.is_empty());
    }
}
