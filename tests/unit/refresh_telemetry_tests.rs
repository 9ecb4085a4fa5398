use rides_client::telemetry::refresh::RefreshTelemetry;
use rides_client::telemetry::ride::RideRequestState;

#[test]
fn telemetry_preserves_context_and_id() {
    let telemetry = RefreshTelemetry::new("ctx");
    assert_eq!(telemetry.context(), "ctx");
    let first = telemetry.attempt_id();
    assert_eq!(first, telemetry.attempt_id());
    assert_ne!(first, RefreshTelemetry::new("ctx").attempt_id());
}

#[test]
fn ride_states_render_in_snake_case() {
    assert_eq!(
        RideRequestState::SurgeConfirmationPending.to_string(),
        "surge_confirmation_pending"
    );
    assert_eq!(RideRequestState::Idle.to_string(), "idle");
}
