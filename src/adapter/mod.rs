//! Uniform control contract over the embed backends.
//!
//! The shell only ever talks to [`BackendAdapter`]. Each backend kind has one
//! concrete adapter that owns its SDK bootstrap and event wiring, and reports
//! back through an [`AdapterEvent`] channel tagged with its [`AdapterId`].

pub mod bootstrap;
mod progress;
pub mod social;
pub mod stream;

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{BootstrapFailure, PlayerError};
use crate::events::PlaybackEvent;
use crate::models::{BackendKind, PlaybackSnapshot};
use crate::utils::lock;

pub use bootstrap::{LoadState, ScriptHost, ScriptRegistry};
pub use social::{SocialEmbedAdapter, SocialEmbedPlayer, SocialEmbedSdk, SocialSdkEvent};
pub use stream::{StreamEmbedAdapter, StreamEmbedPlayer, StreamEmbedSdk, StreamSdkEvent};

/// Identity of one adapter instance; a fresh one per mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdapterId(Uuid);

impl AdapterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AdapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-side handle of the element the embed renders into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerHandle(pub String);

impl ContainerHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterStatus {
    /// Created, not initialized.
    Idle,
    /// Waiting on the SDK script or the native ready callback.
    Loading,
    Ready,
    /// Permanent; the shell falls back to a thumbnail.
    Unavailable(BootstrapFailure),
    Destroyed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdapterEventKind {
    Ready { duration: f64 },
    State(PlaybackEvent),
    Progress(PlaybackSnapshot),
    Unavailable(BootstrapFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdapterEvent {
    pub adapter: AdapterId,
    pub kind: AdapterEventKind,
}

pub type AdapterEventSender = mpsc::UnboundedSender<AdapterEvent>;

/// Capability interface implemented once per backend kind.
pub trait BackendAdapter: Send {
    fn kind(&self) -> BackendKind;

    fn id(&self) -> AdapterId;

    fn status(&self) -> AdapterStatus;

    /// Starts bootstrapping in the background. Progress and readiness arrive
    /// on `events`; nothing is emitted after [`BackendAdapter::destroy`].
    fn initialize(&mut self, container: ContainerHandle, locator: &str, events: AdapterEventSender);

    fn play(&self) -> Result<(), PlayerError>;

    fn pause(&self) -> Result<(), PlayerError>;

    fn seek(&self, seconds: f64) -> Result<(), PlayerError>;

    fn mute(&self) -> Result<(), PlayerError>;

    fn unmute(&self) -> Result<(), PlayerError>;

    fn is_muted(&self) -> bool;

    fn current_time(&self) -> f64;

    fn duration(&self) -> f64;

    /// Unsubscribes, stops polling and releases the native handle. Idempotent.
    fn destroy(&mut self);
}

/// Builds the adapter for a backend kind.
pub trait AdapterFactory: Send + Sync {
    fn create(&self, kind: BackendKind) -> Box<dyn BackendAdapter>;
}

/// Factory wiring both embed adapters to the host's SDK bindings.
pub struct EmbedAdapterFactory {
    registry: Arc<ScriptRegistry>,
    host: Arc<dyn ScriptHost>,
    stream_sdk: Arc<dyn StreamEmbedSdk>,
    social_sdk: Arc<dyn SocialEmbedSdk>,
    config: Config,
}

impl EmbedAdapterFactory {
    /// Uses the process-wide script registry.
    pub fn new(
        host: Arc<dyn ScriptHost>,
        stream_sdk: Arc<dyn StreamEmbedSdk>,
        social_sdk: Arc<dyn SocialEmbedSdk>,
        config: Config,
    ) -> Self {
        Self::with_registry(ScriptRegistry::global(), host, stream_sdk, social_sdk, config)
    }

    pub fn with_registry(
        registry: Arc<ScriptRegistry>,
        host: Arc<dyn ScriptHost>,
        stream_sdk: Arc<dyn StreamEmbedSdk>,
        social_sdk: Arc<dyn SocialEmbedSdk>,
        config: Config,
    ) -> Self {
        Self {
            registry,
            host,
            stream_sdk,
            social_sdk,
            config,
        }
    }
}

impl AdapterFactory for EmbedAdapterFactory {
    fn create(&self, kind: BackendKind) -> Box<dyn BackendAdapter> {
        match kind {
            BackendKind::StreamEmbed => Box::new(StreamEmbedAdapter::new(
                self.registry.clone(),
                self.host.clone(),
                self.stream_sdk.clone(),
                self.config.clone(),
            )),
            BackendKind::SocialEmbed => Box::new(SocialEmbedAdapter::new(
                self.registry.clone(),
                self.host.clone(),
                self.social_sdk.clone(),
                self.config.clone(),
            )),
        }
    }
}

/// Sends events for one adapter until it is cancelled.
#[derive(Clone)]
pub(crate) struct Emitter {
    id: AdapterId,
    tx: AdapterEventSender,
    cancel: CancellationToken,
}

impl Emitter {
    /// Returns false when the adapter was torn down or the shell is gone.
    pub(crate) fn emit(&self, kind: AdapterEventKind) -> bool {
        if self.cancel.is_cancelled() {
            debug!(adapter = %self.id, ?kind, "Dropping event from torn-down adapter");
            return false;
        }
        self.tx
            .send(AdapterEvent {
                adapter: self.id,
                kind,
            })
            .is_ok()
    }
}

/// Lifecycle bookkeeping shared by both adapters.
pub(crate) struct AdapterCore {
    pub(crate) id: AdapterId,
    pub(crate) kind: BackendKind,
    pub(crate) status: Arc<Mutex<AdapterStatus>>,
    pub(crate) cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AdapterCore {
    pub(crate) fn new(kind: BackendKind) -> Self {
        Self {
            id: AdapterId::new(),
            kind,
            status: Arc::new(Mutex::new(AdapterStatus::Idle)),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    pub(crate) fn status(&self) -> AdapterStatus {
        lock(&self.status).clone()
    }

    pub(crate) fn emitter(&self, tx: AdapterEventSender) -> Emitter {
        Emitter {
            id: self.id,
            tx,
            cancel: self.cancel.clone(),
        }
    }

    /// Marks the adapter as loading; false if it was already started or torn down.
    pub(crate) fn begin(&self) -> bool {
        let mut status = lock(&self.status);
        if *status != AdapterStatus::Idle {
            return false;
        }
        *status = AdapterStatus::Loading;
        true
    }

    pub(crate) fn attach(&mut self, task: JoinHandle<()>) {
        self.task = Some(task);
    }

    /// Error for a command that found no native handle.
    pub(crate) fn unavailable_error(&self) -> PlayerError {
        match self.status() {
            AdapterStatus::Unavailable(failure) => PlayerError::Bootstrap(failure),
            AdapterStatus::Destroyed => PlayerError::AdapterUnavailable,
            _ => PlayerError::AdapterNotReady,
        }
    }

    pub(crate) fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        *lock(&self.status) = AdapterStatus::Destroyed;
        debug!(adapter = %self.id, kind = %self.kind, "Adapter destroyed");
    }
}

/// Records a terminal failure and reports it, unless the adapter is gone.
pub(crate) fn report_unavailable(
    status: &Mutex<AdapterStatus>,
    emitter: &Emitter,
    failure: BootstrapFailure,
) {
    {
        let mut status = lock(status);
        if *status == AdapterStatus::Destroyed {
            return;
        }
        *status = AdapterStatus::Unavailable(failure.clone());
    }
    warn!(error = %failure, "Backend unavailable, degrading to thumbnail");
    emitter.emit(AdapterEventKind::Unavailable(failure));
}

/// Marks the adapter ready, unless it was torn down meanwhile.
pub(crate) fn mark_ready(status: &Mutex<AdapterStatus>) -> bool {
    let mut status = lock(status);
    if *status != AdapterStatus::Loading {
        return false;
    }
    *status = AdapterStatus::Ready;
    true
}
