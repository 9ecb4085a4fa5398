use jiff::SignedDuration;
use serde_json::json;
use wiremock::matchers::{header, header_regex, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rides_client::{Coordinate, Error, RidesClient};

use crate::common::{oakland, san_francisco, server_config, token, user_config};

#[tokio::test]
async fn requests_carry_user_agent_and_locale() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/estimates/time"))
        .and(header_regex("User-Agent", "^rides-client-rust-sdk/"))
        .and(header("Accept-Language", "fr_FR"))
        .and(query_param("start_latitude", "37.7752315"))
        .and(query_param("start_longitude", "-122.418075"))
        .and(query_param_is_missing("product_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "times": [
                {"product_id": "p1", "display_name": "uberX", "estimate": 180},
                {"product_id": "p2", "display_name": "TAXI", "estimate": null}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        RidesClient::with_server_token(server_config(&server.uri()).locale("fr_FR")).unwrap();
    let times = client.time_estimates(san_francisco(), None).await.unwrap();
    assert_eq!(times.len(), 2);
    assert_eq!(times[0].estimate, Some(180));
    assert_eq!(times[1].estimate, None);
}

#[tokio::test]
async fn invalid_parameters_issue_no_request() {
    let server = MockServer::start().await;
    let client = RidesClient::with_user_token(
        user_config(&server.uri()),
        token("live-access", SignedDuration::from_hours(1)),
    )
    .unwrap();

    let out_of_range = Coordinate::new(91.0, 0.0);
    assert!(matches!(
        client.products(out_of_range).await,
        Err(Error::InvalidParam(_))
    ));
    assert!(matches!(
        client.price_estimates(san_francisco(), Coordinate::new(0.0, 180.5)).await,
        Err(Error::InvalidParam(_))
    ));
    assert!(matches!(
        client.time_estimates(san_francisco(), Some("")).await,
        Err(Error::InvalidParam(_))
    ));
    assert!(matches!(
        client.ride_details("").await,
        Err(Error::InvalidParam(_))
    ));
    assert!(matches!(
        client.user_activity(0, 51).await,
        Err(Error::InvalidParam(_))
    ));
    assert!(matches!(
        client.ride_estimate("", san_francisco(), oakland()).await,
        Err(Error::InvalidParam(_))
    ));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn server_error_envelope_is_preserved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/estimates/price"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": "distance_exceeded",
            "message": "Distance between two points exceeds 100 miles",
            "fields": {"end_latitude": "too far"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RidesClient::with_server_token(server_config(&server.uri())).unwrap();
    let err = client
        .price_estimates(san_francisco(), Coordinate::new(40.7128, -74.006))
        .await
        .unwrap_err();
    let server_error = err.server_error().expect("validation error");
    assert_eq!(server_error.status, 422);
    assert_eq!(server_error.code.as_deref(), Some("distance_exceeded"));
    assert_eq!(
        server_error.fields.get("end_latitude").map(String::as_str),
        Some("too far")
    );
}

#[tokio::test]
async fn unparsable_error_body_is_a_parse_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = RidesClient::with_server_token(server_config(&server.uri())).unwrap();
    assert!(matches!(
        client.user_profile().await,
        Err(Error::UnableToParseResponse(_))
    ));
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let config = server_config("http://127.0.0.1:1");
    let client = RidesClient::with_server_token(config).unwrap();
    let err = client.products(san_francisco()).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn cancel_accepts_an_empty_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/requests/r-1"))
        .and(header("Authorization", "Bearer live-access"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = RidesClient::with_user_token(
        user_config(&server.uri()),
        token("live-access", SignedDuration::from_hours(1)),
    )
    .unwrap();
    client.cancel_ride("r-1").await.expect("cancel");
}

#[tokio::test]
async fn single_product_and_promotion_decode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/products/p%2F1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "product_id": "p/1",
            "display_name": "TAXI",
            "capacity": 4,
            "price_details": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/promotions"))
        .and(query_param("end_longitude", "-122.2711639"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "display_text": "Free ride up to $30",
            "localized_value": "$30",
            "type": "trip_credit"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RidesClient::with_server_token(server_config(&server.uri())).unwrap();
    let product = client.product("p/1").await.unwrap();
    assert_eq!(product.product_id, "p/1");
    assert!(product.price_detail.is_none());

    let promotion = client.promotions(san_francisco(), oakland()).await.unwrap();
    assert_eq!(promotion.kind.as_deref(), Some("trip_credit"));
}
