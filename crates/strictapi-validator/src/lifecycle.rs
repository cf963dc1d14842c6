//! # Spec Lifecycle
//!
//! Three-state machine owning the live [`Schema`]:
//!
//! ```text
//!            fetch+parse ok
//! Unloaded ───────────────────▶ Loaded(schema)      (terminal)
//!     │                            ▲
//!     │ fetch/parse failed         │ fetch+parse ok, cooldown elapsed
//!     ▼                            │
//!   Error{message, retry_at} ──────┘
//!     ▲   │
//!     └───┘ failed again, or still cooling down
//! ```
//!
//! Every public call runs refresh-then-snapshot under one mutex, so no
//! caller can see a fresh schema paired with a stale error. The returned
//! `Arc<Schema>` is used after the lock is released; checks against it
//! never block one another.
//!
//! A stalled fetch holds the lock and blocks every caller until it returns.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use strictapi_schema::Schema;

use crate::error::ValidationError;
use crate::source::SpecFetcher;

/// Fixed delay between refresh attempts after a failure.
pub const RETRY_COOLDOWN: Duration = Duration::from_secs(1);

/// Internal lifecycle state.
#[derive(Debug, Clone)]
pub enum LoadState {
    Unloaded,
    Loaded(Arc<Schema>),
    Error { message: String, retry_at: Instant },
}

/// Health view of the lifecycle, observed without triggering a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleStatus {
    Unloaded,
    Loaded,
    Error(String),
}

/// Fetches, parses and retains the specification.
pub struct SpecLifecycle {
    fetcher: Box<dyn SpecFetcher>,
    state: Mutex<LoadState>,
}

impl std::fmt::Debug for SpecLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("SpecLifecycle");
        match self.state.try_lock() {
            Some(state) => debug.field("state", &*state),
            None => debug.field("state", &format_args!("<locked>")),
        };
        debug.finish_non_exhaustive()
    }
}

impl SpecLifecycle {
    pub fn new(fetcher: Box<dyn SpecFetcher>) -> Self {
        Self {
            fetcher,
            state: Mutex::new(LoadState::Unloaded),
        }
    }

    /// Refresh if eligible, then return the live schema.
    ///
    /// # Errors
    ///
    /// [`ValidationError::BrokenSchema`] with the retained message while the
    /// lifecycle is in the error state.
    pub fn snapshot(&self) -> Result<Arc<Schema>, ValidationError> {
        self.snapshot_at(Instant::now())
    }

    /// [`snapshot`](Self::snapshot) with an explicit clock reading.
    pub fn snapshot_at(&self, now: Instant) -> Result<Arc<Schema>, ValidationError> {
        let mut state = self.state.lock();
        let eligible = match &*state {
            LoadState::Unloaded => true,
            LoadState::Loaded(_) => false,
            LoadState::Error { retry_at, .. } => now >= *retry_at,
        };
        if eligible {
            *state = self.refresh(now);
        }
        match &*state {
            LoadState::Loaded(schema) => Ok(Arc::clone(schema)),
            LoadState::Error { message, .. } => Err(ValidationError::BrokenSchema(message.clone())),
            // refresh never leaves the state Unloaded
            LoadState::Unloaded => Err(ValidationError::BrokenSchema(
                "specification not loaded".to_string(),
            )),
        }
    }

    /// Current state without refreshing.
    pub fn status(&self) -> LifecycleStatus {
        match &*self.state.lock() {
            LoadState::Unloaded => LifecycleStatus::Unloaded,
            LoadState::Loaded(_) => LifecycleStatus::Loaded,
            LoadState::Error { message, .. } => LifecycleStatus::Error(message.clone()),
        }
    }

    fn refresh(&self, now: Instant) -> LoadState {
        let parsed = self
            .fetcher
            .fetch()
            .map_err(|e| e.to_string())
            .and_then(|document| strictapi_schema::parse(&document).map_err(|e| e.to_string()));
        match parsed {
            Ok(schema) => {
                tracing::info!(paths = schema.paths.len(), "specification loaded");
                LoadState::Loaded(Arc::new(schema))
            }
            Err(message) => {
                let retry_at = now + RETRY_COOLDOWN;
                tracing::warn!(error = %message, retry_in = ?RETRY_COOLDOWN, "specification unavailable");
                LoadState::Error { message, retry_at }
            }
        }
    }
}
