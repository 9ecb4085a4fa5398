//! Generic JSON → entity decoding. Collections decode all-or-nothing.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::Error;

pub fn decode_one<T: DeserializeOwned>(json: Value) -> Result<T, Error> {
    serde_json::from_value(json).map_err(|e| {
        Error::UnableToParseResponse(format!(
            "cannot decode {}: {}",
            std::any::type_name::<T>(),
            e
        ))
    })
}

pub fn decode_many<T: DeserializeOwned>(json: Value) -> Result<Vec<T>, Error> {
    let Value::Array(items) = json else {
        return Err(Error::UnableToParseResponse(format!(
            "expected an array of {}",
            std::any::type_name::<T>()
        )));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| {
                Error::UnableToParseResponse(format!(
                    "element {} is not a valid {}: {}",
                    index,
                    std::any::type_name::<T>(),
                    e
                ))
            })
        })
        .collect()
}

/// Decodes the array stored under `field`, e.g. `{"products": [...]}`.
pub fn decode_field_many<T: DeserializeOwned>(json: Value, field: &str) -> Result<Vec<T>, Error> {
    match json {
        Value::Object(mut map) => match map.remove(field) {
            Some(items) => decode_many(items),
            None => Err(Error::UnableToParseResponse(format!(
                "response has no '{}' field",
                field
            ))),
        },
        _ => Err(Error::UnableToParseResponse(format!(
            "expected an object holding '{}'",
            field
        ))),
    }
}
