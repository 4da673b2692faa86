pub mod metadata;
pub mod version_state;

pub use metadata::VersionMetadata;
pub use version_state::{ChangeSet, Channel, VersionState};
