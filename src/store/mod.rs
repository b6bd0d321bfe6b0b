//! Session state store.
//!
//! Holds the connection flag and the job-scoped fields the conversion service
//! reports, each as an independently observable [`ObservableField`]. All
//! writes go through one write guard so a job reset never interleaves with a
//! frame being applied.

mod field;

pub use field::ObservableField;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Connection state machine of the session adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No activation has succeeded, or the session was closed.
    #[default]
    Disconnected,
    /// Activation requested, session not yet acknowledged.
    Connecting,
    /// Session acknowledged and queue subscriptions registered.
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// A decoded value ready to be written into the store.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    VideoId(Option<String>),
    Title(Option<String>),
    Progress(f64),
    Error(String),
    DownloadUrl(Option<String>),
}

/// All fields read in one consistent pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub connected: bool,
    pub connection: ConnectionState,
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub progress: Option<f64>,
    pub error: String,
    pub download_url: Option<String>,
    /// Number of jobs started on this store.
    pub generation: u64,
}

pub struct SessionStore {
    write_guard: Mutex<()>,
    generation: AtomicU64,
    connected: ObservableField<bool>,
    connection: ObservableField<ConnectionState>,
    video_id: ObservableField<Option<String>>,
    title: ObservableField<Option<String>>,
    progress: ObservableField<Option<f64>>,
    error: ObservableField<String>,
    download_url: ObservableField<Option<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            write_guard: Mutex::new(()),
            generation: AtomicU64::new(0),
            connected: ObservableField::new(false),
            connection: ObservableField::new(ConnectionState::Disconnected),
            video_id: ObservableField::new(None),
            title: ObservableField::new(None),
            progress: ObservableField::new(None),
            error: ObservableField::new(String::new()),
            download_url: ObservableField::new(None),
        }
    }

    pub fn connected(&self) -> &ObservableField<bool> {
        &self.connected
    }

    pub fn connection(&self) -> &ObservableField<ConnectionState> {
        &self.connection
    }

    pub fn video_id(&self) -> &ObservableField<Option<String>> {
        &self.video_id
    }

    pub fn title(&self) -> &ObservableField<Option<String>> {
        &self.title
    }

    pub fn progress(&self) -> &ObservableField<Option<f64>> {
        &self.progress
    }

    pub fn error(&self) -> &ObservableField<String> {
        &self.error
    }

    pub fn download_url(&self) -> &ObservableField<Option<String>> {
        &self.download_url
    }

    /// Number of resets performed, i.e. jobs started.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let _guard = self.write_guard.lock();
        SessionSnapshot {
            connected: self.connected.get(),
            connection: self.connection.get(),
            video_id: self.video_id.get(),
            title: self.title.get(),
            progress: self.progress.get(),
            error: self.error.get(),
            download_url: self.download_url.get(),
            generation: self.generation(),
        }
    }

    /// Move the connection state machine. `connected` follows it.
    pub(crate) fn set_connection(&self, state: ConnectionState) {
        let _guard = self.write_guard.lock();
        self.write_connection(state);
    }

    /// Move to `Connected` only if `active` holds, checked under the write
    /// guard so a concurrent `set_connection` cannot slip in between.
    pub(crate) fn connect_if(&self, active: impl FnOnce() -> bool) -> bool {
        let _guard = self.write_guard.lock();
        if !active() {
            return false;
        }
        self.write_connection(ConnectionState::Connected);
        true
    }

    fn write_connection(&self, state: ConnectionState) {
        self.connection.set(state);
        self.connected.set(state.is_connected());
    }

    pub(crate) fn apply(&self, update: FieldUpdate) {
        let _guard = self.write_guard.lock();
        match update {
            FieldUpdate::VideoId(value) => self.video_id.set(value),
            FieldUpdate::Title(value) => self.title.set(value),
            FieldUpdate::Progress(value) => self.progress.set(Some(value)),
            FieldUpdate::Error(value) => self.error.set(value),
            FieldUpdate::DownloadUrl(value) => self.download_url.set(value),
        };
    }

    /// Clear every job-scoped field and start a new job context.
    ///
    /// Returns the new generation.
    pub(crate) fn reset(&self) -> u64 {
        let _guard = self.write_guard.lock();
        self.video_id.set(None);
        self.title.set(None);
        self.progress.set(None);
        self.error.set(String::new());
        self.download_url.set(None);
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
