#[path = "../common/mod.rs"]
mod common;

mod refresh_escalates_after_retry_budget;
