// Revision Checker - release channel change detection
// Polls a signed version-metadata endpoint and notifies a webhook when the
// production or staging release changes.

pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod notifier;
pub mod scheduler;
pub mod state;
pub mod token;

pub use anyhow::{Context, Result};

// Re-export commonly used types
pub use checker::{Checker, RunReport};
pub use error::{CheckError, DecodeError, FetchError, NotifyError, PersistError, SchemaError};
pub use models::{ChangeSet, Channel, VersionMetadata, VersionState};
pub use scheduler::{FailureTracker, ScheduleOptions, Scheduler};
pub use state::{BlobStore, FsBlobStore, MemoryBlobStore, StateManager};
pub use token::{decode_payload, TokenDecoder, TokenVerifier};
