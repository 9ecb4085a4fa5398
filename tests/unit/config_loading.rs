use std::time::Duration;

use serde_json::json;

use rides_client::config::{PRODUCTION_API_HOST, SANDBOX_API_HOST};
use rides_client::{Config, ConfigLocation, Error, read_config};

use crate::common::write_config;

#[tokio::test]
async fn config_file_is_read() {
    let cfg_path = write_config(
        "unit-config-file.json",
        &json!({
            "client_id": "client-id",
            "client_secret": "client-secret",
            "redirect_uri": "app://callback",
            "sandbox": true,
            "request_timeout_secs": 15,
            "locale": "en_US"
        }),
    );

    let config = read_config(ConfigLocation::File(cfg_path.to_string_lossy().into_owned()))
        .await
        .expect("config file");
    assert!(config.sandbox);
    assert_eq!(config.api_base().unwrap(), SANDBOX_API_HOST);
    assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    assert_eq!(config.locale.as_deref(), Some("en_US"));
    let credentials = config.require_credentials().unwrap();
    assert_eq!(credentials.redirect_uri, "app://callback");
}

#[test]
fn malformed_config_file_is_a_config_error() {
    let mut cfg_path = std::path::PathBuf::from("target");
    std::fs::create_dir_all(&cfg_path).ok();
    cfg_path.push("unit-config-malformed.json");
    std::fs::write(&cfg_path, "{ not json").unwrap();
    assert!(matches!(Config::from_file(&cfg_path), Err(Error::Config(_))));
}

#[test]
fn missing_config_file_is_an_io_error() {
    assert!(matches!(
        Config::from_file("target/does-not-exist.json"),
        Err(Error::Io(_))
    ));
}

// The only test in this binary touching the process environment.
#[test]
fn environment_is_read() {
    unsafe {
        std::env::set_var("RIDES_SERVER_TOKEN", "server-token");
        std::env::set_var("RIDES_SANDBOX", "false");
        std::env::set_var("RIDES_API_HOST", "api.example.com");
        std::env::set_var("RIDES_REQUEST_TIMEOUT_SECS", "20");
    }
    let config = Config::from_env().expect("env config");
    assert_eq!(config.server_token.as_deref(), Some("server-token"));
    assert_eq!(config.api_base().unwrap(), "https://api.example.com");
    assert_eq!(config.timeout(), Some(Duration::from_secs(20)));

    unsafe {
        std::env::set_var("RIDES_REQUEST_TIMEOUT_SECS", "soon");
    }
    assert!(matches!(Config::from_env(), Err(Error::Config(_))));

    unsafe {
        std::env::remove_var("RIDES_SERVER_TOKEN");
        std::env::remove_var("RIDES_SANDBOX");
        std::env::remove_var("RIDES_API_HOST");
        std::env::remove_var("RIDES_REQUEST_TIMEOUT_SECS");
    }
}

#[test]
fn production_is_the_default_host() {
    assert_eq!(
        Config::from_server_token("t").api_base().unwrap(),
        PRODUCTION_API_HOST
    );
}
