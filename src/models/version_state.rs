//! Persisted last-seen state and change detection

use super::metadata::VersionMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Last-seen release identifiers, as stored in the state blob
///
/// Written with camelCase keys. PascalCase keys from older state blobs are
/// still read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionState {
    #[serde(default, alias = "LastProductionId")]
    pub last_production_id: String,

    #[serde(default, alias = "LastStagingId")]
    pub last_staging_id: String,
}

impl VersionState {
    /// State that records the identifiers seen in `metadata`
    pub fn from_metadata(metadata: &VersionMetadata) -> Self {
        Self {
            last_production_id: metadata.production_id.clone(),
            last_staging_id: metadata.staging_id.clone(),
        }
    }
}

/// Tracked release channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Production,
    Staging,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Production => "production",
            Channel::Staging => "staging",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which channels differ from the previously stored state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub production_changed: bool,
    pub staging_changed: bool,
}

impl ChangeSet {
    /// Compare current metadata against the stored state.
    ///
    /// No stored state means every channel counts as changed.
    pub fn detect(previous: Option<&VersionState>, current: &VersionMetadata) -> Self {
        match previous {
            None => Self {
                production_changed: true,
                staging_changed: true,
            },
            Some(state) => Self {
                production_changed: state.last_production_id != current.production_id,
                staging_changed: state.last_staging_id != current.staging_id,
            },
        }
    }

    pub fn any(&self) -> bool {
        self.production_changed || self.staging_changed
    }

    /// Changed channels, production first
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels = Vec::with_capacity(2);
        if self.production_changed {
            channels.push(Channel::Production);
        }
        if self.staging_changed {
            channels.push(Channel::Staging);
        }
        channels
    }
}
