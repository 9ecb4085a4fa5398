#[path = "../common/mod.rs"]
mod common;

mod config_loading;
mod model_decoding;
mod refresh_telemetry_tests;
mod retry_coordinator_tests;
mod token_state;
mod url;
