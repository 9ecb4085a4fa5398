use crate::config::ClientCredentials;
use crate::request_context::RequestDispatchContext;
use crate::rides::RideRequestCoordinator;

mod impls;

/// Entry point for the rides API. Cloning is cheap; clones share the held
/// token and its refresh state.
#[derive(Clone)]
pub struct RidesClient {
    context: RequestDispatchContext,
    rides: RideRequestCoordinator,
    credentials: Option<ClientCredentials>,
    sandbox: bool,
}
