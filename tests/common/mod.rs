//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use revision_checker::fetcher::MetadataSource;
use revision_checker::notifier::Notifier;
use revision_checker::{
    BlobStore, Checker, FetchError, MemoryBlobStore, NotifyError, PersistError, StateManager,
    TokenDecoder,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const STATE_KEY: &str = "version-state.json";

/// Payload JSON with the given ids and fixed versions
pub fn payload(production_id: &str, staging_id: &str) -> serde_json::Value {
    serde_json::json!({
        "environments": {
            "production": { "id": production_id, "version": "v2" },
            "production-last": { "version": "v1" },
            "staging": { "id": staging_id, "version": "s1" }
        }
    })
}

/// `header.payload.signature` token around `payload`
pub fn token_for(payload: &serde_json::Value) -> String {
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.c2lnbmF0dXJl",
        STANDARD_NO_PAD.encode(payload.to_string())
    )
}

pub fn token(production_id: &str, staging_id: &str) -> String {
    token_for(&payload(production_id, staging_id))
}

/// Replays queued results; repeats the last one when the queue runs dry
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fixed(token: String) -> Self {
        Self::new(vec![Ok(token)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for ScriptedSource {
    async fn fetch_token(&self) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        let response = match next {
            Some(response) => {
                *self.last.lock().unwrap() = Some(response.clone());
                response
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("no response scripted".to_string())),
        };
        response.map_err(FetchError::Unavailable)
    }
}

/// Records every message; can be switched to fail
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.set_failing(true);
        notifier
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected("webhook down".to_string()));
        }
        Ok(())
    }
}

/// Store whose writes always fail
#[derive(Default)]
pub struct ReadOnlyStore {
    pub inner: MemoryBlobStore,
}

#[async_trait]
impl BlobStore for ReadOnlyStore {
    async fn exists(&self, key: &str) -> Result<bool, PersistError> {
        self.inner.exists(key).await
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, PersistError> {
        self.inner.read(key).await
    }

    async fn write(&self, _key: &str, _bytes: Vec<u8>) -> Result<(), PersistError> {
        Err(PersistError::Unavailable("store is read-only".to_string()))
    }

    fn describe(&self) -> String {
        "read-only".to_string()
    }
}

pub fn checker(
    source: Arc<dyn MetadataSource>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn BlobStore>,
) -> Checker {
    Checker::new(
        source,
        TokenDecoder::unverified(),
        notifier,
        StateManager::new(store, STATE_KEY),
    )
}
