use std::sync::Arc;

use reqwest::Client;
use reqwest::header::ACCEPT_LANGUAGE;
use serde_json::Value;
use tracing::debug;

use crate::auth::AuthorizationStrategy;
use crate::errors::Error;
use crate::request::{Method, RequestDescriptor};
use crate::response::{RawResponse, validate};
use crate::retry::OperationKind;

/// Shared context for outbound API calls ensuring consistent auth and retry handling.
#[derive(Clone)]
pub struct RequestDispatchContext {
    http_client: Client,
    strategy: Arc<AuthorizationStrategy>,
    api_base: String,
    locale: Option<String>,
}

impl RequestDispatchContext {
    pub fn build(
        http_client: Client,
        strategy: AuthorizationStrategy,
        api_base: String,
        locale: Option<String>,
    ) -> Self {
        Self {
            http_client,
            strategy: Arc::new(strategy),
            api_base,
            locale,
        }
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn strategy(&self) -> Arc<AuthorizationStrategy> {
        Arc::clone(&self.strategy)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Starts a descriptor against the API host.
    pub fn descriptor(&self, method: Method, path: impl Into<String>) -> RequestDescriptor {
        RequestDescriptor::new(method, self.api_base.as_str(), path)
    }

    /// Authorizes, sends and validates one call, refreshing and retrying once on
    /// an authentication failure when the strategy allows it.
    pub async fn dispatch(
        &self,
        operation: OperationKind,
        descriptor: RequestDescriptor,
    ) -> Result<Value, Error> {
        let descriptor = match &self.locale {
            Some(locale) => descriptor.header(ACCEPT_LANGUAGE.as_str(), locale.as_str()),
            None => descriptor,
        };
        self.strategy
            .execute_with_refresh(operation, descriptor, move |request| self.perform(request))
            .await
    }

    async fn perform(&self, descriptor: RequestDescriptor) -> Result<Value, Error> {
        let request = descriptor.build(&self.http_client)?;
        debug!("{} {}", request.method(), request.url().path());
        let transport = match self.http_client.execute(request).await {
            Ok(resp) => {
                let status = resp.status();
                resp.bytes()
                    .await
                    .map(|body| RawResponse::new(status, body.to_vec()))
            }
            Err(err) => Err(err),
        };
        validate(transport)
    }
}
