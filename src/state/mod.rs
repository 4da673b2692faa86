//! Version state persistence
//!
//! Handles the single state object that records the last-seen production and
//! staging identifiers:
//! - Blob store abstraction (filesystem and in-memory)
//! - Load / overwrite of the JSON state

mod manager;
mod store;

pub use manager::StateManager;
pub use store::{BlobStore, FsBlobStore, MemoryBlobStore};
