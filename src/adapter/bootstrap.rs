//! Load-once guard for backend SDK scripts.
//!
//! A backend's script is injected at most once per process no matter how many
//! adapters mount concurrently; later mounts wait on the same in-flight load.
//! A failed load is remembered until [`ScriptRegistry::reset`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tokio::sync::OnceCell;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{BootstrapFailure, PlayerError};
use crate::models::BackendKind;
use crate::utils::{calculate_backoff_delay, lock};

/// The page-side operations needed to bring an SDK up.
pub trait ScriptHost: Send + Sync {
    /// Appends the SDK `<script>` for `kind`.
    fn inject_script(&self, kind: BackendKind, src: &str) -> Result<(), PlayerError>;

    /// Whether the SDK global for `kind` is usable yet.
    fn sdk_ready(&self, kind: BackendKind) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
    Failed(BootstrapFailure),
}

type LoadSlot = Arc<OnceCell<Result<(), BootstrapFailure>>>;

#[derive(Debug, Default)]
pub struct ScriptRegistry {
    slots: Mutex<HashMap<BackendKind, LoadSlot>>,
    injected: Mutex<HashSet<BackendKind>>,
}

static GLOBAL_REGISTRY: Lazy<Arc<ScriptRegistry>> = Lazy::new(|| Arc::new(ScriptRegistry::new()));

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Arc<ScriptRegistry> {
        GLOBAL_REGISTRY.clone()
    }

    pub fn state(&self, kind: BackendKind) -> LoadState {
        match lock(&self.slots).get(&kind) {
            None => LoadState::NotLoaded,
            Some(slot) => match slot.get() {
                None => LoadState::Loading,
                Some(Ok(())) => LoadState::Loaded,
                Some(Err(failure)) => LoadState::Failed(failure.clone()),
            },
        }
    }

    /// Forgets everything known about `kind`, so the next mount loads afresh.
    pub fn reset(&self, kind: BackendKind) {
        lock(&self.slots).remove(&kind);
        lock(&self.injected).remove(&kind);
        debug!(%kind, "Script registry entry reset");
    }

    fn slot(&self, kind: BackendKind) -> LoadSlot {
        lock(&self.slots)
            .entry(kind)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Resolves once the SDK for `kind` is usable, or with the permanent failure.
    pub async fn ensure_loaded(
        &self,
        kind: BackendKind,
        host: &dyn ScriptHost,
        src: &str,
        config: &Config,
    ) -> Result<(), BootstrapFailure> {
        let slot = self.slot(kind);
        slot.get_or_init(|| self.load(kind, host, src, config))
            .await
            .clone()
    }

    async fn load(
        &self,
        kind: BackendKind,
        host: &dyn ScriptHost,
        src: &str,
        config: &Config,
    ) -> Result<(), BootstrapFailure> {
        // A previous attempt may have been cancelled after injecting.
        let already_injected = lock(&self.injected).contains(&kind);
        if !already_injected && !host.sdk_ready(kind) {
            self.inject_with_retry(kind, host, src, config).await?;
        }

        for attempt in 1..=config.bootstrap_max_attempts {
            if host.sdk_ready(kind) {
                info!(%kind, attempt, "Backend SDK ready");
                return Ok(());
            }
            sleep(config.bootstrap_poll_interval).await;
        }
        if host.sdk_ready(kind) {
            return Ok(());
        }

        warn!(%kind, attempts = config.bootstrap_max_attempts, "Backend SDK never became ready");
        Err(BootstrapFailure::TimedOut {
            kind,
            attempts: config.bootstrap_max_attempts,
        })
    }

    async fn inject_with_retry(
        &self,
        kind: BackendKind,
        host: &dyn ScriptHost,
        src: &str,
        config: &Config,
    ) -> Result<(), BootstrapFailure> {
        let attempts = config.inject_max_retries.max(1);
        let mut backoff = config.inject_backoff;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            debug!(%kind, src, attempt, "Injecting backend SDK script");
            match host.inject_script(kind, src) {
                Ok(()) => {
                    lock(&self.injected).insert(kind);
                    return Ok(());
                }
                Err(e) => {
                    warn!(%kind, attempt, error = %e, "Script injection failed");
                    last_error = e.to_string();
                    if attempt < attempts {
                        sleep(calculate_backoff_delay(backoff)).await;
                        backoff = backoff.saturating_mul(2);
                    }
                }
            }
        }

        Err(BootstrapFailure::InjectFailed {
            kind,
            attempts,
            reason: last_error,
        })
    }
}
