mod coordinator;
mod outcome;

pub use coordinator::{MAX_ATTEMPTS, OperationKind, RetryCoordinator};
pub use outcome::RetryOutcome;
