//! Claim Extractor
//!
//! Segments the rendered view, runs the extraction chain (external capability
//! first, pattern fallback second) and post-processes the result into one
//! [`ClaimSet`], whatever strategy supplied each field.

pub mod experience;
pub mod projects;
pub mod sections;
pub mod skills;
pub mod strategy;

pub use experience::ExperienceEntry;
pub use projects::ProjectEntry;
pub use sections::{Section, SectionKind, Segmentation};
pub use strategy::{
    ClaimField, ExternalExtraction, ExternalExtractor, NoExternalExtractor, PrecomputedExtraction,
    PATTERN_STRATEGY,
};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::policy::ClaimsPolicy;
use crate::types::{Degradation, DegradationKind};

const COMPONENT: &str = "claim_extractor";

/// What a claim is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    Experience,
    Project,
    Skill,
}

/// One factual statement the document makes about its subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub kind: ClaimKind,
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// How well the document itself supports the claim, in [0, 1]
    pub evidence_strength: f64,
}

/// Everything extracted from one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClaimSet {
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    pub claims: Vec<Claim>,
    /// Strategy that supplied each field
    pub provenance: BTreeMap<ClaimField, String>,
    /// Segmentation fell back to fixed windows
    pub windowed: bool,
}

/// The Claim Extractor.
pub struct ClaimExtractor {
    policy: ClaimsPolicy,
}

impl ClaimExtractor {
    pub fn new(policy: &ClaimsPolicy) -> Self {
        Self {
            policy: policy.clone(),
        }
    }

    /// Extract claims from text that has passed the integrity gate.
    pub fn extract(&self, text: &str, external: &dyn ExternalExtractor) -> (ClaimSet, Vec<Degradation>) {
        let mut degradations = Vec::new();

        let segmentation = sections::segment(text, &self.policy);
        if segmentation.windowed {
            tracing::warn!("No section passed the minimum length, using fixed windows");
            degradations.push(Degradation::new(
                COMPONENT,
                DegradationKind::SegmentationEmpty,
                format!(
                    "no section exceeded {} chars; split into {}-char windows",
                    self.policy.min_section_chars, self.policy.window_chars
                ),
            ));
        }

        let mut candidates = Vec::new();
        match external.extract(text) {
            Ok(output) => candidates.push((external.name().to_string(), output)),
            Err(e) => {
                tracing::warn!(extractor = external.name(), error = %e, "External extractor failed, using patterns");
                degradations.push(Degradation::new(
                    external.name(),
                    DegradationKind::CapabilityUnavailable,
                    e.to_string(),
                ));
            }
        }
        candidates.push((
            PATTERN_STRATEGY.to_string(),
            ExternalExtraction {
                skills: pattern_skills(&segmentation),
                experience: pattern_experience(&segmentation),
                projects: pattern_projects(&segmentation),
            },
        ));

        let (merged, provenance) = strategy::chain(candidates);
        let mut set = post_process(merged, &segmentation);
        set.provenance = provenance;

        tracing::info!(
            skills = set.skills.len(),
            experience = set.experience.len(),
            projects = set.projects.len(),
            windowed = set.windowed,
            "Claims extracted"
        );

        (set, degradations)
    }
}

impl Default for ClaimExtractor {
    fn default() -> Self {
        Self::new(&ClaimsPolicy::default())
    }
}

/// Skills section lists, plus technologies mentioned anywhere else.
fn pattern_skills(seg: &Segmentation) -> Vec<String> {
    let mut found = Vec::new();
    for body in seg.bodies(SectionKind::Skills) {
        for skill in skills::parse_skill_list(body) {
            skills::push_unique(&mut found, skill);
        }
    }
    for section in seg.sections.iter().filter(|s| s.kind != SectionKind::Skills) {
        for skill in skills::scan_mentions(&section.body) {
            skills::push_unique(&mut found, skill);
        }
    }
    found
}

fn pattern_experience(seg: &Segmentation) -> Vec<ExperienceEntry> {
    let kind = if seg.has(SectionKind::Experience) {
        SectionKind::Experience
    } else {
        SectionKind::Other
    };
    seg.bodies(kind).flat_map(experience::extract).collect()
}

fn pattern_projects(seg: &Segmentation) -> Vec<ProjectEntry> {
    seg.bodies(SectionKind::Projects).flat_map(projects::extract).collect()
}

fn plain_lines(seg: &Segmentation, kind: SectionKind) -> Vec<String> {
    seg.bodies(kind)
        .flat_map(|body| body.lines())
        .map(|l| l.trim().trim_start_matches(['-', '*', '•', '·']).trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Normalize skills, dedup experience, merge mentions and build claims.
fn post_process(merged: ExternalExtraction, seg: &Segmentation) -> ClaimSet {
    let mut listed = Vec::new();
    for raw in &merged.skills {
        if let Some(skill) = skills::normalize(raw) {
            skills::push_unique(&mut listed, skill);
        }
    }

    let experience = dedup_experience(merged.experience);
    let projects = merged.projects;

    // Technologies named in experience and project context
    let mut in_context = Vec::new();
    for entry in &experience {
        let text = format!("{} {}", entry.title, entry.responsibilities.join(" "));
        for skill in skills::scan_mentions(&text) {
            skills::push_unique(&mut in_context, skill);
        }
    }
    for project in &projects {
        let text = format!("{} {} {}", project.name, project.description, project.highlights.join(" "));
        for skill in skills::scan_mentions(&text) {
            skills::push_unique(&mut in_context, skill);
        }
    }

    let mut all_skills = listed.clone();
    for skill in &in_context {
        skills::push_unique(&mut all_skills, skill.clone());
    }

    let mut claims = Vec::new();
    for skill in &all_skills {
        let strength = match (listed.contains(skill), in_context.contains(skill)) {
            (true, true) => 1.0,
            _ => 0.5,
        };
        let mut attributes = serde_json::Map::new();
        attributes.insert("name".into(), skill.clone().into());
        claims.push(Claim {
            kind: ClaimKind::Skill,
            attributes,
            evidence_strength: strength,
        });
    }
    for entry in &experience {
        claims.push(Claim {
            kind: ClaimKind::Experience,
            attributes: to_attributes(entry),
            evidence_strength: entry.completeness(),
        });
    }
    for project in &projects {
        claims.push(Claim {
            kind: ClaimKind::Project,
            attributes: to_attributes(project),
            evidence_strength: project.completeness(),
        });
    }

    ClaimSet {
        skills: all_skills,
        experience,
        projects,
        education: plain_lines(seg, SectionKind::Education),
        certifications: plain_lines(seg, SectionKind::Certifications),
        claims,
        provenance: BTreeMap::new(),
        windowed: seg.windowed,
    }
}

fn to_attributes<T: Serialize>(value: &T) -> serde_json::Map<String, serde_json::Value> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    }
}

/// Deduplicate by (company, role, timeframe), merging responsibilities.
fn dedup_experience(entries: Vec<ExperienceEntry>) -> Vec<ExperienceEntry> {
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();
    let mut unique: Vec<ExperienceEntry> = Vec::new();

    for entry in entries {
        match index.get(&entry.dedup_key()) {
            Some(&i) => {
                for r in entry.responsibilities {
                    if !unique[i].responsibilities.contains(&r) {
                        unique[i].responsibilities.push(r);
                    }
                }
            }
            None => {
                index.insert(entry.dedup_key(), unique.len());
                unique.push(entry);
            }
        }
    }
    unique
}
