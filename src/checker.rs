//! One check run: fetch, decode, compare, notify, persist
//!
//! Fetch, decode, schema and state-load failures abort the run before anything
//! is sent or written. Each notification is attempted independently and its
//! failure is only logged, so the new state is still persisted. Notifications
//! always go out before the write; a crash in between re-notifies next run.

use crate::error::CheckError;
use crate::fetcher::MetadataSource;
use crate::models::{ChangeSet, Channel, VersionMetadata, VersionState};
use crate::notifier::{change_message, Notifier};
use crate::state::StateManager;
use crate::token::TokenDecoder;
use chrono::Utc;
use std::sync::Arc;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub metadata: VersionMetadata,
    pub changes: ChangeSet,
    /// `true` when no state had been stored before this run
    pub first_run: bool,
    pub notified: Vec<Channel>,
    pub failed_notifications: Vec<Channel>,
    /// State computed from this run's ids, written only if `persisted`
    pub new_state: VersionState,
    pub persisted: bool,
}

/// Wires the collaborators of a run together
#[derive(Clone)]
pub struct Checker {
    source: Arc<dyn MetadataSource>,
    decoder: TokenDecoder,
    notifier: Arc<dyn Notifier>,
    state: StateManager,
}

impl Checker {
    pub fn new(
        source: Arc<dyn MetadataSource>,
        decoder: TokenDecoder,
        notifier: Arc<dyn Notifier>,
        state: StateManager,
    ) -> Self {
        Self {
            source,
            decoder,
            notifier,
            state,
        }
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Execute one run
    pub async fn run(&self) -> Result<RunReport, CheckError> {
        tracing::info!(at = %Utc::now().to_rfc3339(), "Checking release versions");

        let token = self.source.fetch_token().await?;
        let payload = self.decoder.decode(&token)?;
        let metadata = VersionMetadata::from_json(&payload)?;
        tracing::debug!(
            production_id = %metadata.production_id,
            production_version = %metadata.production_version,
            staging_id = %metadata.staging_id,
            staging_version = %metadata.staging_version,
            "Extracted release metadata"
        );

        let previous = self.state.load().await?;
        let changes = ChangeSet::detect(previous.as_ref(), &metadata);
        let new_state = VersionState::from_metadata(&metadata);

        let mut notified = Vec::new();
        let mut failed_notifications = Vec::new();
        for channel in changes.channels() {
            let version = match channel {
                Channel::Production => &metadata.production_version,
                Channel::Staging => &metadata.staging_version,
            };
            let message = change_message(channel, &metadata);
            match self.notifier.notify(&message).await {
                Ok(()) => {
                    tracing::info!(%channel, %version, "Sent change notification");
                    notified.push(channel);
                }
                Err(err) => {
                    tracing::warn!(%channel, %version, error = %err, "Failed to send change notification");
                    failed_notifications.push(channel);
                }
            }
        }

        let persisted = if changes.any() {
            self.state.save(&new_state).await?;
            tracing::info!(location = %self.state.location(), "Updated version state");
            true
        } else {
            tracing::info!("No updates detected");
            false
        };

        Ok(RunReport {
            metadata,
            changes,
            first_run: previous.is_none(),
            notified,
            failed_notifications,
            new_state,
            persisted,
        })
    }
}

impl std::fmt::Debug for Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("verifier", &self.decoder.verifier_name())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
