//! Policy parsing and validation.
//!
//! A policy holds every tunable of the engine: integrity thresholds,
//! segmentation parameters, source weights and decision thresholds. Policies
//! are YAML/JSON documents validated against schema/policy.schema.json.

mod parser;
mod schema;

pub use parser::{
    ClaimsPolicy, CriticPolicy, DecisionPolicy, GraphPolicy, InjectionPolicy, IntegrityPolicy,
    InvisiblePolicy, Policy, PolicyError, PortfolioWeights, SourceWeights,
};
pub use schema::validate_policy_schema;
