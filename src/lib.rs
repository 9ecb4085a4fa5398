pub mod auth;
mod client;
pub mod config;
pub mod errors;
pub mod model;
pub mod request;
pub mod request_context;
pub mod response;
pub mod retry;
pub mod rides;
pub mod telemetry;
pub mod token;
pub mod types;

pub use auth::{AuthorizationMode, AuthorizationStrategy};
pub use client::RidesClient;
pub use config::{ClientCredentials, Config, ConfigLocation, read_config};
pub use errors::{Error, ServerError};
pub use rides::{RideRequest, RideRequestOutcome, SurgeConfirmation};
pub use token::{Token, TokenEndpoint};
pub use types::*;
