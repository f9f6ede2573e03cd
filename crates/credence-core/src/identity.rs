//! Identity stripping for the evidence bundle.
//!
//! Only a display name and public profile links survive. Everything else an
//! upstream system attaches to a candidate (email, phone, address, date of
//! birth) is dropped before the bundle is assembled.

use serde::{Deserialize, Serialize};

use crate::scanners::patterns::{contains_email, contains_phone};

/// Keys accepted as the display name, in priority order.
const NAME_KEYS: &[&str] = &["name", "full_name", "display_name"];

/// Keys whose values may hold profile links.
const LINK_KEYS: &[&str] = &["profile_links", "links", "profiles", "website", "url"];

/// What the evidence bundle may say about who the candidate is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PublicIdentity {
    pub name: Option<String>,
    pub profile_links: Vec<String>,
}

/// Reduce an arbitrary identity record to its public part.
pub fn strip_identity(raw: &serde_json::Map<String, serde_json::Value>) -> PublicIdentity {
    let name = NAME_KEYS
        .iter()
        .filter_map(|key| raw.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|n| !n.is_empty())
        .filter(|n| !contains_email(n) && !contains_phone(n))
        .map(str::to_string);

    let mut profile_links = Vec::new();
    for key in LINK_KEYS {
        let Some(value) = raw.get(*key) else {
            continue;
        };
        let candidates: Vec<&str> = match value {
            serde_json::Value::String(s) => vec![s.as_str()],
            serde_json::Value::Array(items) => items.iter().filter_map(|v| v.as_str()).collect(),
            serde_json::Value::Object(map) => map.values().filter_map(|v| v.as_str()).collect(),
            _ => Vec::new(),
        };
        for link in candidates.into_iter().map(str::trim) {
            if is_public_link(link) && !profile_links.iter().any(|l| l == link) {
                profile_links.push(link.to_string());
            }
        }
    }

    let dropped = raw
        .keys()
        .filter(|k| !NAME_KEYS.contains(&k.as_str()) && !LINK_KEYS.contains(&k.as_str()))
        .count();
    if dropped > 0 {
        tracing::debug!(dropped, "Identity attributes stripped");
    }

    PublicIdentity {
        name,
        profile_links,
    }
}

/// http(s) URL without whitespace or embedded credentials.
fn is_public_link(link: &str) -> bool {
    let lower = link.to_ascii_lowercase();
    let Some(rest) = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
    else {
        return false;
    };
    let authority = rest.split('/').next().unwrap_or_default();
    !rest.is_empty()
        && !authority.is_empty()
        && !authority.contains('@')
        && !link.chars().any(char::is_whitespace)
}
