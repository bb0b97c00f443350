use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::{error::StatsError, types::CredentialPair};

/// Outcome of the last refresh of a session that failed, kept so callers
/// queued behind it get the same answer without another upstream call.
#[derive(Debug, Clone)]
pub(crate) struct FailedRefresh {
    pub stale: String,
    pub error: StatsError,
}

/// Holds the credential pair of one client session for the duration of a
/// request.
///
/// Readers always see the latest pair. Only the token manager writes to it,
/// after a refresh succeeded.
#[derive(Debug)]
pub struct CredentialStore {
    initial_access_token: String,
    pair: RwLock<CredentialPair>,
    refresh_gate: Mutex<Option<FailedRefresh>>,
}

impl CredentialStore {
    /// Starts a session from the pair the client presented. The access token
    /// given here is what [`CredentialStore::was_refreshed`] compares against.
    pub fn new(pair: CredentialPair) -> Self {
        Self {
            initial_access_token: pair.access_token.clone(),
            pair: RwLock::new(pair),
            refresh_gate: Mutex::new(None),
        }
    }

    pub async fn access_token(&self) -> String {
        self.pair.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.pair.read().await.refresh_token.clone()
    }

    /// Snapshot of both tokens, read under one lock.
    pub async fn pair(&self) -> CredentialPair {
        self.pair.read().await.clone()
    }

    /// True once the access token differs from the one the session started
    /// with.
    pub async fn was_refreshed(&self) -> bool {
        self.pair.read().await.access_token != self.initial_access_token
    }

    /// Serializes refresh attempts of this session. A caller that waited
    /// sees either the pair the previous holder installed or the failure it
    /// recorded.
    pub(crate) async fn refresh_gate(&self) -> MutexGuard<'_, Option<FailedRefresh>> {
        self.refresh_gate.lock().await
    }

    /// Installs `fresh` unless the stored access token has already moved on
    /// from `stale`. Returns the access token callers should use next.
    pub(crate) async fn replace_if_current(&self, stale: &str, fresh: CredentialPair) -> String {
        let mut pair = self.pair.write().await;
        if pair.access_token == stale {
            *pair = fresh;
        }
        pair.access_token.clone()
    }
}
