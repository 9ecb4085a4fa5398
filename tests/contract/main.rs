#[path = "../common/mod.rs"]
mod common;

mod request_send;
mod token_guard_ensure;
