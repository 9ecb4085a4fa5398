use std::fmt;
use std::future::Future;

use tokio::time::Instant;
use tracing::warn;

use crate::errors::Error;

use super::RetryOutcome;

/// An original attempt plus at most one retry after re-authentication.
pub const MAX_ATTEMPTS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Products,
    Product,
    PriceEstimates,
    TimeEstimates,
    Promotions,
    UserActivity,
    UserProfile,
    RequestRide,
    CurrentRide,
    RideDetails,
    RideEstimate,
    CancelRide,
    RideMap,
    RideReceipt,
    SandboxRideStatus,
    SandboxProduct,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Products => "products",
            OperationKind::Product => "product",
            OperationKind::PriceEstimates => "price_estimates",
            OperationKind::TimeEstimates => "time_estimates",
            OperationKind::Promotions => "promotions",
            OperationKind::UserActivity => "user_activity",
            OperationKind::UserProfile => "user_profile",
            OperationKind::RequestRide => "request_ride",
            OperationKind::CurrentRide => "current_ride",
            OperationKind::RideDetails => "ride_details",
            OperationKind::RideEstimate => "ride_estimate",
            OperationKind::CancelRide => "cancel_ride",
            OperationKind::RideMap => "ride_map",
            OperationKind::RideReceipt => "ride_receipt",
            OperationKind::SandboxRideStatus => "sandbox_ride_status",
            OperationKind::SandboxProduct => "sandbox_product",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default)]
pub struct RetryCoordinator;

impl RetryCoordinator {
    pub fn new() -> Self {
        Self
    }

    /// Runs `op`, and after an authentication failure gives `recover` one chance
    /// to repair credentials before a single retry. `recover` hands the error
    /// back when it cannot help, and that error is surfaced unchanged.
    pub async fn execute<F, Fut, R, RFut, T>(
        &self,
        operation: OperationKind,
        mut op: F,
        mut recover: R,
    ) -> Result<T, Error>
    where
        F: FnMut(u8) -> Fut + Send,
        Fut: Future<Output = Result<T, Error>> + Send,
        R: FnMut(Error) -> RFut + Send,
        RFut: Future<Output = Result<(), Error>> + Send,
    {
        let mut attempt: u8 = 1;
        let start = Instant::now();
        loop {
            let err = match op(attempt).await {
                Ok(value) => {
                    RetryOutcome::new(operation, attempt, true, start.elapsed()).log();
                    return Ok(value);
                }
                Err(err) => err,
            };
            if attempt >= MAX_ATTEMPTS || !Self::is_retriable(&err) {
                RetryOutcome::new(operation, attempt, false, start.elapsed()).log();
                return Err(err);
            }
            warn!(
                operation = %operation,
                attempt,
                max_attempts = MAX_ATTEMPTS,
                error = %err,
                "retry.reauthenticating"
            );
            if let Err(err) = recover(err).await {
                RetryOutcome::new(operation, attempt, false, start.elapsed()).log();
                return Err(err);
            }
            attempt += 1;
        }
    }

    fn is_retriable(err: &Error) -> bool {
        matches!(err, Error::UnableToAuthenticate(_))
    }
}
