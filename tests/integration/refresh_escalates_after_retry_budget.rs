use std::time::Duration;

use jiff::SignedDuration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rides_client::Error;
use rides_client::RidesClient;

use crate::common::{mount_refresh, token, user_config};

#[tokio::test(flavor = "current_thread")]
async fn refresh_escalates_after_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/requests/r-1/receipt"))
        .respond_with(ResponseTemplate::new(401))
        .expect(4)
        .mount(&server)
        .await;
    // Every call gets exactly one refresh and one retry.
    mount_refresh(&server, "fresh-access", Duration::ZERO, 2).await;

    let client = RidesClient::with_user_token(
        user_config(&server.uri()),
        token("live-access", SignedDuration::from_hours(1)),
    )
    .unwrap();

    for _ in 0..2 {
        match client.ride_receipt("r-1").await {
            Err(Error::UnableToAuthenticate(_)) => {}
            other => panic!("unexpected result: {:?}", other.map(|r| r.request_id)),
        }
    }
}
