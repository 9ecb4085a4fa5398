use std::fmt;

use tracing::{Level, event};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RideRequestState {
    Idle,
    Requesting,
    Confirmed,
    SurgeConfirmationPending,
    Failed,
}

impl fmt::Display for RideRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RideRequestState::Idle => "idle",
            RideRequestState::Requesting => "requesting",
            RideRequestState::Confirmed => "confirmed",
            RideRequestState::SurgeConfirmationPending => "surge_confirmation_pending",
            RideRequestState::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub fn emit_transition(product_id: &str, from: RideRequestState, to: RideRequestState) {
    if to == RideRequestState::Failed {
        event!(
            Level::WARN,
            product_id = %product_id,
            from = %from,
            to = %to,
            "ride_request.state"
        );
    } else {
        event!(
            Level::INFO,
            product_id = %product_id,
            from = %from,
            to = %to,
            "ride_request.state"
        );
    }
}
