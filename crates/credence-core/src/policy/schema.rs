//! JSON Schema validation for policies.
//!
//! Policies are validated against schema/policy.schema.json before they are
//! deserialized, so a typo in a section name fails loudly instead of being
//! silently replaced by a default.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded policy schema (loaded at compile time).
const POLICY_SCHEMA_JSON: &str = include_str!("../../../../schema/policy.schema.json");

/// Compiled validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(POLICY_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result
        .as_ref()
        .map_err(|e| SchemaError::LoadError(e.clone()))
}

/// Validate a policy JSON value against the schema.
///
/// Returns every validation error, formatted with its instance path.
pub fn validate_policy_schema(policy_json: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(policy_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_policy_passes_schema() {
        let value = serde_json::json!({
            "policy_version": "1.0",
            "name": "Test",
            "graph": { "min_confidence": 0.25 }
        });
        assert!(validate_policy_schema(&value).is_ok());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let value = serde_json::json!({ "policy_version": "1.0" });
        let errors = validate_policy_schema(&value).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_unknown_section_fails() {
        let value = serde_json::json!({
            "policy_version": "1.0",
            "name": "Test",
            "intgrity": {}
        });
        assert!(validate_policy_schema(&value).is_err());
    }

    #[test]
    fn test_out_of_range_weight_fails() {
        let value = serde_json::json!({
            "policy_version": "1.0",
            "name": "Test",
            "graph": { "weights": { "document": 1.5 } }
        });
        assert!(validate_policy_schema(&value).is_err());
    }

    #[test]
    fn test_bad_version_format_fails() {
        let value = serde_json::json!({ "policy_version": "one", "name": "Test" });
        assert!(validate_policy_schema(&value).is_err());
    }
}
