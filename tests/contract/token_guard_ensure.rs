use std::sync::Arc;
use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use reqwest::Client;
use wiremock::MockServer;

use rides_client::token::{Token, TokenEndpoint, TokenGuard};
use rides_client::{ClientCredentials, Error};

use crate::common::{mount_refresh, token};

fn credentials() -> ClientCredentials {
    ClientCredentials {
        client_id: "client-id".into(),
        client_secret: "client-secret".into(),
        redirect_uri: "app://callback".into(),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn ensure_fresh_keeps_a_live_token() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh-access", Duration::ZERO, 0).await;
    let endpoint = TokenEndpoint::new(Client::new(), server.uri());

    let guard = TokenGuard::new(
        token("live-access", SignedDuration::from_hours(1)).with_credentials(&credentials()),
    );
    let before = guard.current();
    let lease = guard.ensure_fresh(&endpoint).await.unwrap();
    assert!(Arc::ptr_eq(lease.token(), &before));
}

#[tokio::test(flavor = "current_thread")]
async fn ensure_fresh_replaces_an_expired_token() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh-access", Duration::ZERO, 1).await;
    let endpoint = TokenEndpoint::new(Client::new(), server.uri());

    let guard = TokenGuard::new(
        token("stale-access", SignedDuration::from_mins(-1)).with_credentials(&credentials()),
    );
    let lease = guard.ensure_fresh(&endpoint).await.unwrap();
    assert_eq!(lease.token().access_token(), "fresh-access");
    assert_eq!(guard.current().access_token(), "fresh-access");
    assert_eq!(guard.current().client_id(), Some("client-id"));
}

#[tokio::test(flavor = "current_thread")]
async fn expired_token_without_credentials_is_left_alone() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh-access", Duration::ZERO, 0).await;
    let endpoint = TokenEndpoint::new(Client::new(), server.uri());

    let guard = TokenGuard::new(Token::new(
        "stale-access",
        None,
        Timestamp::now() - SignedDuration::from_mins(1),
    ));
    let lease = guard.ensure_fresh(&endpoint).await.unwrap();
    assert_eq!(lease.token().access_token(), "stale-access");
    assert!(matches!(
        guard.force_refresh(&endpoint).await,
        Err(Error::UnableToAuthenticate(_))
    ));
}

#[tokio::test(flavor = "current_thread")]
async fn stale_rejection_after_replacement_reuses_new_token() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh-access", Duration::ZERO, 1).await;
    let endpoint = TokenEndpoint::new(Client::new(), server.uri());

    let guard = TokenGuard::new(
        token("stale-access", SignedDuration::from_hours(1)).with_credentials(&credentials()),
    );
    let first = guard.lease();
    let second = guard.lease();

    let refreshed = guard.refresh_rejected(&first, &endpoint).await.unwrap();
    let coalesced = guard.refresh_rejected(&second, &endpoint).await.unwrap();
    assert!(Arc::ptr_eq(refreshed.token(), coalesced.token()));
}
