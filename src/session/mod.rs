//! Per-visitor session state.
//!
//! The store is a narrow key/value contract (`get`/`put`/`remove`/`exists`
//! and a read-and-clear `pop`); transport of the session token is the HTTP
//! layer's problem. On top of the raw store, [`Session`] gives the rest of
//! the crate typed access to the few things actually kept in a session:
//! the draft reservation, flash/error messages and the calendar's cached
//! block maps.
//!
//! A session is only ever mutated by one request at a time in practice;
//! concurrent tabs race with last-write-wins semantics and no detection.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::models::DraftReservation;

/// Opaque per-visitor token. Minted by the HTTP layer, meaningless here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(pub String);

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key/value session storage.
pub trait SessionStore: Send + Sync {
    fn get(&self, token: &SessionToken, key: &str) -> Option<Value>;
    fn put(&self, token: &SessionToken, key: &str, value: Value);
    fn remove(&self, token: &SessionToken, key: &str);
    fn exists(&self, token: &SessionToken, key: &str) -> bool;
    /// Read and clear in one step.
    fn pop(&self, token: &SessionToken, key: &str) -> Option<Value>;
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionToken, HashMap<String, Value>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, token: &SessionToken, key: &str) -> Option<Value> {
        self.sessions.read().get(token)?.get(key).cloned()
    }

    fn put(&self, token: &SessionToken, key: &str, value: Value) {
        self.sessions
            .write()
            .entry(token.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn remove(&self, token: &SessionToken, key: &str) {
        if let Some(values) = self.sessions.write().get_mut(token) {
            values.remove(key);
        }
    }

    fn exists(&self, token: &SessionToken, key: &str) -> bool {
        self.sessions
            .read()
            .get(token)
            .is_some_and(|values| values.contains_key(key))
    }

    fn pop(&self, token: &SessionToken, key: &str) -> Option<Value> {
        self.sessions.write().get_mut(token)?.remove(key)
    }
}

const DRAFT_KEY: &str = "reservation";
const FLASH_KEY: &str = "flash";
const ERROR_KEY: &str = "error";

/// Cached calendar block sub-map: day key (`YYYY-MM-D`) → restriction id.
pub type BlockMap = BTreeMap<String, i64>;

fn block_map_key(room_id: i64) -> String {
    format!("block_map_{}", room_id)
}

/// Typed handle over one visitor's session.
#[derive(Clone)]
pub struct Session {
    token: SessionToken,
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(token: SessionToken, store: Arc<dyn SessionStore>) -> Self {
        Self { token, store }
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.store.get(&self.token, key)?;
        serde_json::from_value(value).ok()
    }

    fn put_typed<T: Serialize>(&self, key: &str, value: &T) {
        if let Ok(value) = serde_json::to_value(value) {
            self.store.put(&self.token, key, value);
        }
    }

    // ── draft reservation ────────────────────────────────────────────

    pub fn draft(&self) -> Option<DraftReservation> {
        self.get_typed(DRAFT_KEY)
    }

    pub fn put_draft(&self, draft: &DraftReservation) {
        self.put_typed(DRAFT_KEY, draft);
    }

    pub fn remove_draft(&self) {
        self.store.remove(&self.token, DRAFT_KEY);
    }

    // ── flash messages ───────────────────────────────────────────────

    pub fn put_flash(&self, message: &str) {
        self.put_typed(FLASH_KEY, &message);
    }

    /// Flash messages are displayed once.
    pub fn pop_flash(&self) -> Option<String> {
        serde_json::from_value(self.store.pop(&self.token, FLASH_KEY)?).ok()
    }

    pub fn put_error(&self, message: &str) {
        self.put_typed(ERROR_KEY, &message);
    }

    pub fn pop_error(&self) -> Option<String> {
        serde_json::from_value(self.store.pop(&self.token, ERROR_KEY)?).ok()
    }

    // ── calendar block maps ──────────────────────────────────────────

    pub fn block_map(&self, room_id: i64) -> Option<BlockMap> {
        self.get_typed(&block_map_key(room_id))
    }

    pub fn put_block_map(&self, room_id: i64, map: &BlockMap) {
        self.put_typed(&block_map_key(room_id), map);
    }
}

/// Convenience for tests and non-HTTP callers.
pub fn session_for(store: &Arc<dyn SessionStore>, token: &str) -> Session {
    Session::new(SessionToken(token.to_string()), Arc::clone(store))
}
