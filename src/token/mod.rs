mod credential;
mod endpoint;
mod guard;

pub use credential::Token;
pub use endpoint::TokenEndpoint;
pub use guard::{TokenGuard, TokenGuardResult, TokenLease};
