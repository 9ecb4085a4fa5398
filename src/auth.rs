//! Credential attachment and the refresh-and-retry protocol.

use std::future::Future;
use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::Error;
use crate::request::RequestDescriptor;
use crate::retry::{OperationKind, RetryCoordinator};
use crate::token::{Token, TokenEndpoint, TokenGuard, TokenLease};

/// How a client authenticates. Fixed for the lifetime of the client.
pub enum AuthorizationMode {
    /// Long-lived application token; never refreshed.
    AppToken(String),
    /// Refreshable user token.
    UserToken(TokenGuard),
}

impl AuthorizationMode {
    pub fn user(token: Token) -> Self {
        AuthorizationMode::UserToken(TokenGuard::new(token))
    }

    pub fn is_app_token(&self) -> bool {
        matches!(self, AuthorizationMode::AppToken(_))
    }
}

pub struct AuthorizationStrategy {
    mode: AuthorizationMode,
    endpoint: TokenEndpoint,
    retry: RetryCoordinator,
}

impl AuthorizationStrategy {
    pub fn new(mode: AuthorizationMode, endpoint: TokenEndpoint) -> Self {
        Self {
            mode,
            endpoint,
            retry: RetryCoordinator::new(),
        }
    }

    pub fn mode(&self) -> &AuthorizationMode {
        &self.mode
    }

    pub fn endpoint(&self) -> &TokenEndpoint {
        &self.endpoint
    }

    /// The user token currently held, if this is a user-token strategy.
    pub fn token(&self) -> Option<Arc<Token>> {
        match &self.mode {
            AuthorizationMode::AppToken(_) => None,
            AuthorizationMode::UserToken(guard) => Some(guard.current()),
        }
    }

    /// Attaches the mode's credential unless the call does not require auth.
    pub fn authorize(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        let lease = match &self.mode {
            AuthorizationMode::UserToken(guard) => Some(guard.lease()),
            AuthorizationMode::AppToken(_) => None,
        };
        self.authorize_with(descriptor, lease.as_ref())
    }

    fn authorize_with(
        &self,
        descriptor: RequestDescriptor,
        lease: Option<&TokenLease>,
    ) -> RequestDescriptor {
        if !descriptor.requires_auth {
            return descriptor;
        }
        let credential = match (&self.mode, lease) {
            (AuthorizationMode::AppToken(token), _) => format!("Token {}", token),
            (AuthorizationMode::UserToken(_), Some(lease)) => {
                format!("Bearer {}", lease.token().access_token())
            }
            (AuthorizationMode::UserToken(guard), None) => {
                format!("Bearer {}", guard.current().access_token())
            }
        };
        let mut descriptor = descriptor;
        descriptor
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case(AUTHORIZATION.as_str()));
        descriptor.header(AUTHORIZATION.as_str(), credential)
    }

    /// Runs `perform` with credentials attached. A user-token call rejected as
    /// unauthenticated is retried once after a refresh; every other failure, and
    /// any failure of the retry itself, is returned as-is.
    pub async fn execute_with_refresh<F, Fut, T>(
        &self,
        operation: OperationKind,
        descriptor: RequestDescriptor,
        perform: F,
    ) -> Result<T, Error>
    where
        F: Fn(RequestDescriptor) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, Error>> + Send,
        T: Send,
    {
        let guard = match &self.mode {
            AuthorizationMode::UserToken(guard) if descriptor.requires_auth => Some(guard),
            _ => None,
        };
        let initial = match guard {
            Some(guard) => Some(guard.ensure_fresh(&self.endpoint).await?),
            None => None,
        };

        let lease_slot = Mutex::new(initial);
        let lease_slot = &lease_slot;
        let descriptor = &descriptor;
        let perform = &perform;
        let endpoint = &self.endpoint;

        self.retry
            .execute(
                operation,
                move |attempt| async move {
                    let lease = lease_slot.lock().await.clone();
                    debug!(operation = %operation, attempt, "dispatching request");
                    perform(self.authorize_with(descriptor.clone(), lease.as_ref())).await
                },
                move |err| async move {
                    let Some(guard) = guard else {
                        return Err(err);
                    };
                    let Some(rejected) = lease_slot.lock().await.clone() else {
                        return Err(err);
                    };
                    let current = guard.current();
                    if Arc::ptr_eq(&current, rejected.token()) && !current.can_refresh() {
                        debug!("rejected token cannot be refreshed");
                        return Err(err);
                    }
                    match guard.refresh_rejected(&rejected, endpoint).await {
                        Ok(fresh) => {
                            *lease_slot.lock().await = Some(fresh);
                            Ok(())
                        }
                        Err(refresh_err) => {
                            warn!("refresh after rejection failed: {}", refresh_err);
                            Err(refresh_err)
                        }
                    }
                },
            )
            .await
    }
}
