//! Ride requests and the two-phase surge confirmation handshake.
//!
//! A request made while surge pricing is in effect is refused with a
//! confirmation the rider has to accept. The caller shows the confirmation
//! page, then submits the same request again carrying the confirmation id.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::errors::{Error, ServerError};
use crate::model::decode_one;
use crate::request::Method;
use crate::request_context::RequestDispatchContext;
use crate::retry::OperationKind;
use crate::telemetry::ride::{RideRequestState, emit_transition};
use crate::types::{Coordinate, Ride};

const REQUESTS_PATH: &str = "/v1/requests";
const SURGE_CODE: &str = "surge";
const SURGE_FIELD: &str = "surge_confirmation";

#[derive(Clone, Debug, PartialEq)]
pub struct RideRequest {
    pub product_id: String,
    pub start: Coordinate,
    pub end: Coordinate,
    /// Set when re-submitting after the rider accepted surge pricing.
    pub surge_confirmation_id: Option<String>,
}

impl RideRequest {
    pub fn new(product_id: impl Into<String>, start: Coordinate, end: Coordinate) -> Self {
        Self {
            product_id: product_id.into(),
            start,
            end,
            surge_confirmation_id: None,
        }
    }

    /// The same request, confirmed with the id the server handed out.
    pub fn confirmed(mut self, confirmation: &SurgeConfirmation) -> Self {
        self.surge_confirmation_id = Some(confirmation.confirmation_id.clone());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.product_id.is_empty() {
            return Err(Error::InvalidParam("product_id is empty".into()));
        }
        self.start.validate("start")?;
        self.end.validate("end")?;
        if self.surge_confirmation_id.as_deref() == Some("") {
            return Err(Error::InvalidParam("surge_confirmation_id is empty".into()));
        }
        Ok(())
    }

    pub(crate) fn body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("product_id".into(), json!(self.product_id));
        body.insert("start_latitude".into(), json!(self.start.latitude));
        body.insert("start_longitude".into(), json!(self.start.longitude));
        body.insert("end_latitude".into(), json!(self.end.latitude));
        body.insert("end_longitude".into(), json!(self.end.longitude));
        if let Some(id) = &self.surge_confirmation_id {
            body.insert("surge_confirmation_id".into(), json!(id));
        }
        body
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurgeConfirmation {
    /// Page the rider opens to accept the surge multiplier.
    #[serde(rename = "href")]
    pub confirmation_url: String,
    #[serde(rename = "surge_confirmation_id")]
    pub confirmation_id: String,
}

#[derive(Debug)]
pub enum RideRequestOutcome {
    Confirmed(Ride),
    SurgeConfirmationRequired(SurgeConfirmation),
    Failed(Error),
}

impl RideRequestOutcome {
    pub fn ride(&self) -> Option<&Ride> {
        match self {
            RideRequestOutcome::Confirmed(ride) => Some(ride),
            _ => None,
        }
    }

    pub fn surge_confirmation(&self) -> Option<&SurgeConfirmation> {
        match self {
            RideRequestOutcome::SurgeConfirmationRequired(confirmation) => Some(confirmation),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            RideRequestOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Collapses the outcome for callers that treat a pending confirmation as
    /// an ordinary branch: `Ok(Ok(ride))` or `Ok(Err(confirmation))`.
    pub fn into_result(self) -> Result<Result<Ride, SurgeConfirmation>, Error> {
        match self {
            RideRequestOutcome::Confirmed(ride) => Ok(Ok(ride)),
            RideRequestOutcome::SurgeConfirmationRequired(confirmation) => Ok(Err(confirmation)),
            RideRequestOutcome::Failed(err) => Err(err),
        }
    }

    fn state(&self) -> RideRequestState {
        match self {
            RideRequestOutcome::Confirmed(_) => RideRequestState::Confirmed,
            RideRequestOutcome::SurgeConfirmationRequired(_) => {
                RideRequestState::SurgeConfirmationPending
            }
            RideRequestOutcome::Failed(_) => RideRequestState::Failed,
        }
    }
}

/// Submits ride requests. Holds no state between attempts.
#[derive(Clone)]
pub struct RideRequestCoordinator {
    context: RequestDispatchContext,
}

impl RideRequestCoordinator {
    pub fn new(context: RequestDispatchContext) -> Self {
        Self { context }
    }

    pub async fn request_ride(&self, request: &RideRequest) -> RideRequestOutcome {
        let product_id = request.product_id.as_str();
        if let Err(err) = request.validate() {
            emit_transition(product_id, RideRequestState::Idle, RideRequestState::Failed);
            return RideRequestOutcome::Failed(err);
        }

        emit_transition(product_id, RideRequestState::Idle, RideRequestState::Requesting);
        let descriptor = self
            .context
            .descriptor(Method::Post, REQUESTS_PATH)
            .json_body(request.body());
        let outcome = match self.context.dispatch(OperationKind::RequestRide, descriptor).await {
            Ok(json) => classify_success(json),
            Err(Error::Validation(server)) if is_surge(&server) => classify_surge(server),
            Err(err) => RideRequestOutcome::Failed(err),
        };
        emit_transition(product_id, RideRequestState::Requesting, outcome.state());
        outcome
    }
}

fn classify_success(json: Value) -> RideRequestOutcome {
    let carries_surge = json.get(SURGE_FIELD).is_some_and(|v| !v.is_null())
        && json.get("request_id").is_none();
    if carries_surge {
        let confirmation = json.get(SURGE_FIELD).cloned().unwrap_or(Value::Null);
        return match parse_confirmation(confirmation) {
            Ok(confirmation) => RideRequestOutcome::SurgeConfirmationRequired(confirmation),
            Err(err) => RideRequestOutcome::Failed(err),
        };
    }
    match decode_one::<Ride>(json) {
        Ok(ride) => RideRequestOutcome::Confirmed(ride),
        Err(err) => RideRequestOutcome::Failed(err),
    }
}

fn is_surge(server: &ServerError) -> bool {
    server.status == StatusCode::CONFLICT.as_u16()
        && server
            .code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(SURGE_CODE))
}

fn classify_surge(server: ServerError) -> RideRequestOutcome {
    let confirmation = server
        .meta
        .as_ref()
        .and_then(|meta| meta.get(SURGE_FIELD))
        .cloned();
    match confirmation {
        Some(confirmation) => match parse_confirmation(confirmation) {
            Ok(confirmation) => RideRequestOutcome::SurgeConfirmationRequired(confirmation),
            Err(err) => RideRequestOutcome::Failed(err),
        },
        None => RideRequestOutcome::Failed(Error::UnableToParseResponse(format!(
            "surge response carries no confirmation: {}",
            server
        ))),
    }
}

fn parse_confirmation(json: Value) -> Result<SurgeConfirmation, Error> {
    let confirmation: SurgeConfirmation = decode_one(json)?;
    if confirmation.confirmation_id.is_empty() {
        return Err(Error::UnableToParseResponse(
            "surge confirmation id is empty".into(),
        ));
    }
    reqwest::Url::parse(&confirmation.confirmation_url).map_err(|e| {
        Error::UnableToParseResponse(format!(
            "invalid surge confirmation url '{}': {}",
            confirmation.confirmation_url, e
        ))
    })?;
    Ok(confirmation)
}
