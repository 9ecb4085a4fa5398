use jiff::{SignedDuration, Timestamp};
use serde_json::{Map, Value, json};

use rides_client::Token;

fn token_json(mask: u8) -> Value {
    let mut object = Map::new();
    object.insert("access_token".into(), json!("access"));
    object.insert("expiration_date".into(), json!("2030-01-01T00:00:00Z"));
    let optional = ["refresh_token", "client_id", "client_secret", "redirect_url"];
    for (bit, key) in optional.iter().enumerate() {
        if mask & (1 << bit) != 0 {
            object.insert((*key).into(), json!(format!("{}-value", key)));
        }
    }
    Value::Object(object)
}

#[test]
fn restored_tokens_refresh_only_when_complete() {
    for mask in 0u8..16 {
        let token: Token = serde_json::from_value(token_json(mask)).unwrap();
        assert_eq!(token.can_refresh(), mask == 0b1111, "mask {:04b}", mask);
    }
}

#[test]
fn empty_strings_do_not_count() {
    let mut json = token_json(0b1111);
    json["client_secret"] = json!("");
    let token: Token = serde_json::from_value(json).unwrap();
    assert!(!token.can_refresh());
}

#[test]
fn expiry_boundary_is_inclusive() {
    let expires = Timestamp::now() + SignedDuration::from_mins(10);
    let token = Token::new("access", None, expires);
    assert!(!token.is_expired());
    assert!(!token.is_expired_at(expires - SignedDuration::from_secs(1)));
    assert!(token.is_expired_at(expires));
    assert!(token.is_expired_at(expires + SignedDuration::from_secs(1)));
}

#[test]
fn serialized_token_restores_identically() {
    let token: Token = serde_json::from_value(token_json(0b1111)).unwrap();
    let restored: Token =
        serde_json::from_str(&serde_json::to_string(&token).unwrap()).unwrap();
    assert_eq!(token, restored);
    assert!(!format!("{:?}", restored).contains("client_secret-value"));
}
