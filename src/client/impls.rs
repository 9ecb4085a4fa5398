use std::sync::Arc;

use reqwest::Client;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::RidesClient;
use crate::auth::{AuthorizationMode, AuthorizationStrategy};
use crate::config::Config;
use crate::errors::Error;
use crate::model::{decode_field_many, decode_one};
use crate::request::{Method, encode_component};
use crate::request_context::RequestDispatchContext;
use crate::retry::OperationKind;
use crate::rides::{RideRequest, RideRequestCoordinator, RideRequestOutcome};
use crate::token::{Token, TokenEndpoint};
use crate::types::{
    Coordinate, PriceEstimate, Product, Promotion, Ride, RideEstimate, RideMap, RideReceipt,
    TimeEstimate, UserActivityPage, UserProfile,
};

const MAX_ACTIVITY_LIMIT: u32 = 50;

impl RidesClient {
    /// Create a client bound to `mode` for its whole lifetime.
    /// # Arguments
    /// * `config` - Hosts, timeout, locale and sandbox flag. Typically loaded via
    ///   `Config::from_file` or `Config::from_env`.
    /// * `mode` - The app token or the user token to authenticate with.
    pub fn new(config: Config, mode: AuthorizationMode) -> Result<Self, Error> {
        let http = http_client(&config)?;
        let endpoint = TokenEndpoint::from_config(http.clone(), &config)?;
        let api_base = config.api_base()?;
        info!(
            "rides client created: api_host='{}' sandbox={} app_token={}",
            api_base,
            config.sandbox,
            mode.is_app_token()
        );
        let strategy = AuthorizationStrategy::new(mode, endpoint);
        let context = RequestDispatchContext::build(http, strategy, api_base, config.locale.clone());
        Ok(Self {
            rides: RideRequestCoordinator::new(context.clone()),
            context,
            credentials: config.credentials(),
            sandbox: config.sandbox,
        })
    }

    /// Client authenticating every call with the configured server token.
    pub fn with_server_token(config: Config) -> Result<Self, Error> {
        config.ensure_single_mode()?;
        let server_token = config
            .server_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Config("server_token is required".into()))?;
        Self::new(config, AuthorizationMode::AppToken(server_token))
    }

    /// Client acting for a user. Client credentials missing from `token` are
    /// taken from `config` so that the token can be refreshed.
    pub fn with_user_token(config: Config, token: Token) -> Result<Self, Error> {
        config.ensure_single_mode()?;
        let token = match config.credentials() {
            Some(credentials) => token.with_credentials(&credentials),
            None => token,
        };
        if !token.can_refresh() {
            debug!("user token cannot be refreshed; auth failures will be final");
        }
        Self::new(config, AuthorizationMode::user(token))
    }

    /// Exchanges the code returned by the login page and builds a user client.
    pub async fn from_authorization_code(config: Config, code: &str) -> Result<Self, Error> {
        config.ensure_single_mode()?;
        let credentials = config.require_credentials()?;
        let endpoint = TokenEndpoint::from_config(http_client(&config)?, &config)?;
        let token = endpoint.exchange_code(code, &credentials).await?;
        Self::with_user_token(config, token)
    }

    /// Login page for the configured application.
    pub fn authorize_url(&self, scopes: &[&str], state: Option<&str>) -> Result<String, Error> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            Error::Config("client_id, client_secret and redirect_uri are required".into())
        })?;
        Ok(self.context.strategy().endpoint().authorize_url(
            &credentials.client_id,
            &credentials.redirect_uri,
            scopes,
            state,
        ))
    }

    /// The user token currently held; `None` for app-token clients.
    pub fn token(&self) -> Option<Arc<Token>> {
        self.context.strategy().token()
    }

    pub fn is_sandbox(&self) -> bool {
        self.sandbox
    }

    /// Revokes the held user token server-side. The client keeps using the
    /// local value, so it should be dropped afterwards.
    pub async fn revoke(&self) -> Result<(), Error> {
        let strategy = self.context.strategy();
        let token = strategy
            .token()
            .ok_or_else(|| Error::InvalidParam("app tokens cannot be revoked".into()))?;
        token.revoke(strategy.endpoint()).await
    }

    pub async fn products(&self, location: Coordinate) -> Result<Vec<Product>, Error> {
        location.validate("location")?;
        let descriptor = self
            .context
            .descriptor(Method::Get, "/v1/products")
            .query("latitude", location.latitude)
            .query("longitude", location.longitude);
        let json = self.context.dispatch(OperationKind::Products, descriptor).await?;
        decode_field_many(json, "products")
    }

    pub async fn product(&self, product_id: &str) -> Result<Product, Error> {
        let path = format!("/v1/products/{}", path_id("product_id", product_id)?);
        let descriptor = self.context.descriptor(Method::Get, path);
        let json = self.context.dispatch(OperationKind::Product, descriptor).await?;
        decode_one(json)
    }

    pub async fn price_estimates(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<Vec<PriceEstimate>, Error> {
        start.validate("start")?;
        end.validate("end")?;
        let descriptor = self
            .context
            .descriptor(Method::Get, "/v1/estimates/price")
            .query("start_latitude", start.latitude)
            .query("start_longitude", start.longitude)
            .query("end_latitude", end.latitude)
            .query("end_longitude", end.longitude);
        let json = self
            .context
            .dispatch(OperationKind::PriceEstimates, descriptor)
            .await?;
        decode_field_many(json, "prices")
    }

    /// Pickup ETAs, optionally narrowed to one product.
    pub async fn time_estimates(
        &self,
        start: Coordinate,
        product_id: Option<&str>,
    ) -> Result<Vec<TimeEstimate>, Error> {
        start.validate("start")?;
        if product_id == Some("") {
            return Err(Error::InvalidParam("product_id is empty".into()));
        }
        let descriptor = self
            .context
            .descriptor(Method::Get, "/v1/estimates/time")
            .query("start_latitude", start.latitude)
            .query("start_longitude", start.longitude)
            .query("product_id", product_id);
        let json = self
            .context
            .dispatch(OperationKind::TimeEstimates, descriptor)
            .await?;
        decode_field_many(json, "times")
    }

    pub async fn promotions(&self, start: Coordinate, end: Coordinate) -> Result<Promotion, Error> {
        start.validate("start")?;
        end.validate("end")?;
        let descriptor = self
            .context
            .descriptor(Method::Get, "/v1/promotions")
            .query("start_latitude", start.latitude)
            .query("start_longitude", start.longitude)
            .query("end_latitude", end.latitude)
            .query("end_longitude", end.longitude);
        let json = self.context.dispatch(OperationKind::Promotions, descriptor).await?;
        decode_one(json)
    }

    /// One page of the user's ride history. `limit` must be within 1..=50.
    pub async fn user_activity(&self, offset: u32, limit: u32) -> Result<UserActivityPage, Error> {
        if !(1..=MAX_ACTIVITY_LIMIT).contains(&limit) {
            return Err(Error::InvalidParam(format!(
                "limit {} is outside 1..={}",
                limit, MAX_ACTIVITY_LIMIT
            )));
        }
        let descriptor = self
            .context
            .descriptor(Method::Get, "/v1.2/history")
            .query("offset", offset)
            .query("limit", limit);
        let json = self
            .context
            .dispatch(OperationKind::UserActivity, descriptor)
            .await?;
        decode_one(json)
    }

    pub async fn user_profile(&self) -> Result<UserProfile, Error> {
        let descriptor = self.context.descriptor(Method::Get, "/v1/me");
        let json = self.context.dispatch(OperationKind::UserProfile, descriptor).await?;
        decode_one(json)
    }

    /// Requests a ride. A [`RideRequestOutcome::SurgeConfirmationRequired`]
    /// outcome is resolved by re-submitting with [`RideRequest::confirmed`].
    pub async fn request_ride(&self, request: &RideRequest) -> RideRequestOutcome {
        self.rides.request_ride(request).await
    }

    pub async fn current_ride(&self) -> Result<Ride, Error> {
        let descriptor = self.context.descriptor(Method::Get, "/v1/requests/current");
        let json = self.context.dispatch(OperationKind::CurrentRide, descriptor).await?;
        decode_one(json)
    }

    pub async fn ride_details(&self, request_id: &str) -> Result<Ride, Error> {
        let path = format!("/v1/requests/{}", path_id("request_id", request_id)?);
        let descriptor = self.context.descriptor(Method::Get, path);
        let json = self.context.dispatch(OperationKind::RideDetails, descriptor).await?;
        decode_one(json)
    }

    pub async fn ride_estimate(
        &self,
        product_id: &str,
        start: Coordinate,
        end: Coordinate,
    ) -> Result<RideEstimate, Error> {
        let request = RideRequest::new(product_id, start, end);
        request.validate()?;
        let descriptor = self
            .context
            .descriptor(Method::Post, "/v1/requests/estimate")
            .json_body(request.body());
        let json = self
            .context
            .dispatch(OperationKind::RideEstimate, descriptor)
            .await?;
        decode_one(json)
    }

    pub async fn cancel_ride(&self, request_id: &str) -> Result<(), Error> {
        let path = format!("/v1/requests/{}", path_id("request_id", request_id)?);
        let descriptor = self.context.descriptor(Method::Delete, path);
        self.context.dispatch(OperationKind::CancelRide, descriptor).await?;
        info!("ride cancelled");
        Ok(())
    }

    pub async fn ride_map(&self, request_id: &str) -> Result<RideMap, Error> {
        let path = format!("/v1/requests/{}/map", path_id("request_id", request_id)?);
        let descriptor = self.context.descriptor(Method::Get, path);
        let json = self.context.dispatch(OperationKind::RideMap, descriptor).await?;
        decode_one(json)
    }

    pub async fn ride_receipt(&self, request_id: &str) -> Result<RideReceipt, Error> {
        let path = format!("/v1/requests/{}/receipt", path_id("request_id", request_id)?);
        let descriptor = self.context.descriptor(Method::Get, path);
        let json = self.context.dispatch(OperationKind::RideReceipt, descriptor).await?;
        decode_one(json)
    }

    /// Sandbox only: moves a ride to `status` (e.g. `accepted`, `completed`).
    pub async fn update_sandbox_ride(&self, request_id: &str, status: &str) -> Result<(), Error> {
        self.require_sandbox()?;
        if status.is_empty() {
            return Err(Error::InvalidParam("status is empty".into()));
        }
        let path = format!("/v1/sandbox/requests/{}", path_id("request_id", request_id)?);
        let mut body = Map::new();
        body.insert("status".into(), json!(status));
        let descriptor = self.context.descriptor(Method::Put, path).json_body(body);
        self.context
            .dispatch(OperationKind::SandboxRideStatus, descriptor)
            .await?;
        Ok(())
    }

    /// Sandbox only: overrides driver availability and surge for a product.
    pub async fn update_sandbox_product(
        &self,
        product_id: &str,
        drivers_available: Option<bool>,
        surge_multiplier: Option<f64>,
    ) -> Result<(), Error> {
        self.require_sandbox()?;
        if surge_multiplier.is_some_and(|m| !m.is_finite() || m < 1.0) {
            return Err(Error::InvalidParam(
                "surge_multiplier must be at least 1.0".into(),
            ));
        }
        let path = format!("/v1/sandbox/products/{}", path_id("product_id", product_id)?);
        let mut body = Map::new();
        if let Some(available) = drivers_available {
            body.insert("drivers_available".into(), Value::Bool(available));
        }
        if let Some(multiplier) = surge_multiplier {
            body.insert("surge_multiplier".into(), json!(multiplier));
        }
        let descriptor = self.context.descriptor(Method::Put, path).json_body(body);
        self.context
            .dispatch(OperationKind::SandboxProduct, descriptor)
            .await?;
        Ok(())
    }

    fn require_sandbox(&self) -> Result<(), Error> {
        if self.sandbox {
            Ok(())
        } else {
            Err(Error::InvalidParam(
                "sandbox calls require a client in sandbox mode".into(),
            ))
        }
    }
}

fn http_client(config: &Config) -> Result<Client, Error> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| Error::Config(format!("cannot build http client: {}", e)))
}

fn path_id(name: &str, value: &str) -> Result<String, Error> {
    if value.is_empty() {
        return Err(Error::InvalidParam(format!("{} is empty", name)));
    }
    Ok(encode_component(value))
}
