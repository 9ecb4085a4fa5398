use std::time::Duration;

use tracing::Level;
use tracing::event;

use super::OperationKind;

#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub operation: OperationKind,
    pub attempts: u8,
    pub success: bool,
    pub elapsed: Duration,
}

impl RetryOutcome {
    pub fn new(operation: OperationKind, attempts: u8, success: bool, elapsed: Duration) -> Self {
        Self {
            operation,
            attempts,
            success,
            elapsed,
        }
    }

    pub fn log(&self) {
        event!(
            Level::INFO,
            operation = %self.operation,
            attempts = self.attempts,
            success = self.success,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "retry.outcome"
        );
    }
}
