use rides_client::request::{QueryValue, RequestDescriptor, decode_query, encode_query};

#[test]
fn list_values_round_trip() {
    let query = "k[]=a&k[]=b";
    let decoded = decode_query(query).unwrap();
    assert_eq!(
        decoded,
        vec![(
            "k".to_string(),
            QueryValue::List(vec!["a".into(), "b".into()])
        )]
    );
    assert_eq!(encode_query(&decoded), query);
}

#[test]
fn descriptor_url_encodes_conservatively() {
    let descriptor = RequestDescriptor::get("https://api.example.com", "/v1/products")
        .query("latitude", 37.5)
        .query("note", "a+b c/d")
        .query("missing", None::<String>);
    assert_eq!(
        descriptor.url(),
        "https://api.example.com/v1/products?latitude=37.5&note=a%2Bb%20c%2Fd"
    );
}

#[test]
fn unicode_round_trips() {
    let pairs = vec![("name".to_string(), QueryValue::from("Zürich ☕"))];
    let encoded = encode_query(&pairs);
    assert!(encoded.is_ascii());
    assert_eq!(decode_query(&encoded).unwrap(), pairs);
}
