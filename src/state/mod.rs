pub mod answer;
pub mod deck;
pub mod run;
pub mod session;
mod sse;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, watch};
use uuid::Uuid;

use crate::{
    config::{AppConfig, GameRules},
    dao::record_store::{RecordStore, memory::MemoryRecordStore},
    questions::QuestionBank,
    state::session::PlayerSession,
};

pub use self::sse::SseHub;

/// Shared handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the question source, live sessions, record
/// stores, and the event hub.
pub struct AppState {
    config: AppConfig,
    bank: QuestionBank,
    sessions: DashMap<Uuid, Arc<Mutex<PlayerSession>>>,
    local_records: Arc<MemoryRecordStore>,
    remote_records: RwLock<Option<Arc<dyn RecordStore>>>,
    degraded: watch::Sender<bool>,
    events: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until the remote record
    /// store is installed; gameplay and the local cache work regardless.
    pub fn new(config: AppConfig, bank: QuestionBank) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            bank,
            sessions: DashMap::new(),
            local_records: Arc::new(MemoryRecordStore::new()),
            remote_records: RwLock::new(None),
            degraded: degraded_tx,
            events: SseHub::new(16),
        })
    }

    /// Rule constants applied to every run.
    pub fn rules(&self) -> GameRules {
        self.config.rules()
    }

    /// The read-only question source.
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Registry of live sessions keyed by their identifier.
    pub fn sessions(&self) -> &DashMap<Uuid, Arc<Mutex<PlayerSession>>> {
        &self.sessions
    }

    /// The always-available local record cache.
    pub fn local_records(&self) -> Arc<MemoryRecordStore> {
        self.local_records.clone()
    }

    /// Obtain a handle to the remote record store, if one is installed.
    pub async fn remote_records(&self) -> Option<Arc<dyn RecordStore>> {
        let guard = self.remote_records.read().await;
        guard.as_ref().cloned()
    }

    /// Install a remote record store implementation and leave degraded mode.
    pub async fn install_record_store(&self, store: Arc<dyn RecordStore>) {
        {
            let mut guard = self.remote_records.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the remote record store and enter degraded mode.
    pub async fn clear_record_store(&self) {
        {
            let mut guard = self.remote_records.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.remote_records.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn events(&self) -> &SseHub {
        &self.events
    }
}
