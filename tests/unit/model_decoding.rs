use serde_json::json;

use rides_client::errors::Error;
use rides_client::model::{decode_field_many, decode_many};
use rides_client::{Product, UserActivityPage};

#[test]
fn one_bad_element_fails_the_whole_list() {
    let json = json!([
        {"product_id": "p1", "display_name": "uberX"},
        {"display_name": "no id"},
        {"product_id": "p3", "display_name": "uberXL"}
    ]);
    match decode_many::<Product>(json) {
        Err(Error::UnableToParseResponse(message)) => assert!(message.contains("element 1")),
        other => panic!("unexpected result: {:?}", other.map(|v| v.len())),
    }
}

#[test]
fn wrapped_lists_decode_with_renamed_fields() {
    let products: Vec<Product> = decode_field_many(
        json!({"products": [{
            "product_id": "p1",
            "display_name": "uberX",
            "capacity": 4,
            "image": "https://example.com/x.png",
            "price_details": {
                "base": 2.2,
                "currency_code": "USD",
                "service_fees": [{"name": "safe rides fee", "fee": 1.0}]
            }
        }]}),
        "products",
    )
    .unwrap();
    let product = &products[0];
    assert_eq!(product.image_url.as_deref(), Some("https://example.com/x.png"));
    let detail = product.price_detail.as_ref().unwrap();
    assert_eq!(detail.service_fees[0].name, "safe rides fee");
}

#[test]
fn missing_wrapper_field_is_a_parse_error() {
    assert!(matches!(
        decode_field_many::<Product>(json!({"prices": []}), "products"),
        Err(Error::UnableToParseResponse(_))
    ));
}

#[test]
fn history_page_decodes() {
    let page: UserActivityPage = rides_client::model::decode_one(json!({
        "offset": 0,
        "limit": 2,
        "count": 5,
        "history": [{
            "request_id": "r1",
            "status": "completed",
            "distance": 1.64,
            "start_city": {"display_name": "San Francisco", "latitude": 37.77, "longitude": -122.41}
        }]
    }))
    .unwrap();
    assert_eq!(page.count, 5);
    assert_eq!(
        page.history[0].start_city.as_ref().unwrap().display_name.as_deref(),
        Some("San Francisco")
    );
}
