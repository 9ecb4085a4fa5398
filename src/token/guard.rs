use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use jiff::Timestamp;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::Error;
use crate::telemetry::refresh::{RefreshOutcome, RefreshTelemetry};

use super::{Token, TokenEndpoint};

/// Convenience result alias for guard operations.
pub type TokenGuardResult<T> = Result<T, Error>;

/// A token read for one request attempt, stamped with the moment it was read.
#[derive(Clone, Debug)]
pub struct TokenLease {
    token: Arc<Token>,
    leased_at: Instant,
}

impl TokenLease {
    fn new(token: Arc<Token>) -> Self {
        Self {
            token,
            leased_at: Instant::now(),
        }
    }

    pub fn token(&self) -> &Arc<Token> {
        &self.token
    }
}

struct FailedRefresh {
    stale: Arc<Token>,
    finished_at: Instant,
    reason: String,
}

/// Holds the current user token and runs refreshes single-flight: concurrent
/// callers holding the same stale token share one exchange and its outcome.
pub struct TokenGuard {
    current: Arc<ArcSwap<Token>>,
    // Held for the whole exchange. Remembers the last failure so that callers
    // queued behind it surface the same error instead of retrying the exchange.
    refresh_state: Arc<Mutex<Option<FailedRefresh>>>,
}

impl TokenGuard {
    pub fn new(token: Token) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(token)),
            refresh_state: Arc::new(Mutex::new(None)),
        }
    }

    pub fn current(&self) -> Arc<Token> {
        self.current.load_full()
    }

    pub fn lease(&self) -> TokenLease {
        TokenLease::new(self.current.load_full())
    }

    /// Leases the current token, refreshing it first when it has expired and
    /// can be refreshed.
    pub async fn ensure_fresh(&self, endpoint: &TokenEndpoint) -> TokenGuardResult<TokenLease> {
        let lease = self.lease();
        if !lease.token.is_expired() || !lease.token.can_refresh() {
            return Ok(lease);
        }
        debug!("token already expired; refreshing before use");
        self.refresh_from(&lease, endpoint, "expired").await
    }

    /// Called after the server rejected `rejected`. Returns the token to retry
    /// with, refreshing only if nobody replaced `rejected` in the meantime.
    pub async fn refresh_rejected(
        &self,
        rejected: &TokenLease,
        endpoint: &TokenEndpoint,
    ) -> TokenGuardResult<TokenLease> {
        self.refresh_from(rejected, endpoint, "rejected").await
    }

    pub async fn force_refresh(&self, endpoint: &TokenEndpoint) -> TokenGuardResult<TokenLease> {
        let lease = self.lease();
        self.refresh_from(&lease, endpoint, "forced").await
    }

    async fn refresh_from(
        &self,
        stale: &TokenLease,
        endpoint: &TokenEndpoint,
        context: &'static str,
    ) -> TokenGuardResult<TokenLease> {
        let mut state = Arc::clone(&self.refresh_state).lock_owned().await;
        let telemetry = RefreshTelemetry::new(context);

        let current = self.current.load_full();
        if !Arc::ptr_eq(&current, &stale.token) {
            telemetry.emit_coalesced(RefreshOutcome::Coalesced);
            return Ok(TokenLease::new(current));
        }
        if let Some(failed) = state.as_ref()
            && Arc::ptr_eq(&failed.stale, &current)
            && stale.leased_at <= failed.finished_at
        {
            telemetry.emit_coalesced(RefreshOutcome::Failed);
            return Err(Error::UnableToAuthenticate(failed.reason.clone()));
        }
        if !current.can_refresh() {
            return Err(Error::UnableToAuthenticate(
                "token is missing refresh credentials".into(),
            ));
        }

        // The exchange runs on its own task so that dropping the caller does not
        // abandon waiters queued on the lock.
        let holder = Arc::clone(&self.current);
        let endpoint = endpoint.clone();
        let task = tokio::spawn(async move {
            telemetry.emit_start(Timestamp::now());
            let result = current.refresh(&endpoint).await;
            match result {
                Ok(token) => {
                    let token = Arc::new(token);
                    holder.store(Arc::clone(&token));
                    *state = None;
                    telemetry.emit_success(RefreshOutcome::Refreshed, Timestamp::now());
                    Ok(token)
                }
                Err(err) => {
                    telemetry.emit_failure(&err, Timestamp::now());
                    let reason = format!("token refresh failed: {}", err);
                    *state = Some(FailedRefresh {
                        stale: current,
                        finished_at: Instant::now(),
                        reason: reason.clone(),
                    });
                    Err(Error::UnableToAuthenticate(reason))
                }
            }
        });

        match task.await {
            Ok(result) => result.map(TokenLease::new),
            Err(join_err) => Err(Error::UnableToAuthenticate(format!(
                "token refresh did not complete: {}",
                join_err
            ))),
        }
    }
}
