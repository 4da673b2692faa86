//! Version metadata published by the release endpoint
//!
//! The decoded token payload looks like:
//!
//! ```json
//! {
//!   "environments": {
//!     "production":      { "id": "...", "version": "..." },
//!     "production-last": { "version": "..." },
//!     "staging":         { "id": "...", "version": "..." }
//!   }
//! }
//! ```
//!
//! Other keys are ignored. Every field listed above is required.

use crate::error::SchemaError;
use serde::Serialize;
use serde_json::Value;

/// Production and staging release identifiers for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMetadata {
    pub production_id: String,
    pub production_version: String,
    pub production_previous_version: String,
    pub staging_id: String,
    pub staging_version: String,
}

impl VersionMetadata {
    /// Parse decoded payload text
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let root: Value = serde_json::from_str(json)?;
        Self::from_value(&root)
    }

    /// Extract the required fields from an already parsed payload
    pub fn from_value(root: &Value) -> Result<Self, SchemaError> {
        Ok(Self {
            production_id: required_str(root, &["environments", "production", "id"])?,
            production_version: required_str(root, &["environments", "production", "version"])?,
            production_previous_version: required_str(
                root,
                &["environments", "production-last", "version"],
            )?,
            staging_id: required_str(root, &["environments", "staging", "id"])?,
            staging_version: required_str(root, &["environments", "staging", "version"])?,
        })
    }
}

/// Walk `path` from `root` and return the string found there
fn required_str(root: &Value, path: &[&str]) -> Result<String, SchemaError> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        current = current
            .get(key)
            .ok_or_else(|| SchemaError::MissingField(path[..=depth].join(".")))?;
    }

    current
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SchemaError::NotAString {
            path: path.join("."),
        })
}
