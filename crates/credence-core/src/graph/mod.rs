//! Evidence Graph Builder
//!
//! Fuses document claims with externally gathered signals into one
//! [`EvidenceGraph`] with per-skill confidence.

pub mod adapter;
pub mod builder;
pub mod ontology;
pub mod sources;

pub use adapter::{normalize, SkillMention, SourceEvidence};
pub use builder::{ConflictFlag, EvidenceGraph, GraphBuilder, SkillNode, SKILL_CLAIM_WITHOUT_CODE};
pub use sources::{
    CodeHostingSnapshot, CompetitiveSnapshot, EvidenceSource, EvidenceType, ProfessionalSnapshot,
    Repository, SourceSnapshots, TimelineEntry,
};
