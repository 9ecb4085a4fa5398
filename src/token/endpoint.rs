use jiff::Timestamp;
use reqwest::Client;
use serde_json::{Map, Value, json};
use tracing::{error, info};

use crate::config::{ClientCredentials, Config};
use crate::errors::Error;
use crate::model::decode_one;
use crate::request::{QueryValue, RequestDescriptor, encode_query};
use crate::response::{RawResponse, validate};

use super::Token;
use super::credential::TokenResponse;

const TOKEN_PATH: &str = "/oauth/token";
const REVOKE_PATH: &str = "/oauth/revoke";
const AUTHORIZE_PATH: &str = "/oauth/v2/authorize";

/// Calls against the login host: token exchange, refresh and revocation.
#[derive(Clone)]
pub struct TokenEndpoint {
    http: Client,
    login_host: String,
}

impl TokenEndpoint {
    pub fn new(http: Client, login_host: impl Into<String>) -> Self {
        Self {
            http,
            login_host: login_host.into(),
        }
    }

    pub fn from_config(http: Client, config: &Config) -> Result<Self, Error> {
        Ok(Self::new(http, config.login_base()?))
    }

    pub fn login_host(&self) -> &str {
        &self.login_host
    }

    /// URL of the login page the host application should display. The
    /// authorization code it yields goes to [`TokenEndpoint::exchange_code`].
    pub fn authorize_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[&str],
        state: Option<&str>,
    ) -> String {
        let query = vec![
            ("client_id".to_string(), QueryValue::from(client_id)),
            ("response_type".to_string(), QueryValue::from("code")),
            ("redirect_uri".to_string(), QueryValue::from(redirect_uri)),
            ("scope".to_string(), QueryValue::from(scopes.join(" "))),
            ("state".to_string(), QueryValue::from(state)),
        ];
        format!("{}{}?{}", self.login_host, AUTHORIZE_PATH, encode_query(&query))
    }

    pub async fn exchange_code(
        &self,
        code: &str,
        credentials: &ClientCredentials,
    ) -> Result<Token, Error> {
        if code.is_empty() {
            return Err(Error::InvalidParam("authorization code is empty".into()));
        }
        let form = form(json!({
            "grant_type": "authorization_code",
            "code": code,
            "client_id": credentials.client_id,
            "client_secret": credentials.client_secret,
            "redirect_uri": credentials.redirect_uri,
        }));
        let token = self.request_token(form, credentials).await?;
        info!("authorization code exchanged (len={})", token.access_token().len());
        Ok(token)
    }

    pub(crate) async fn refresh(
        &self,
        refresh_token: &str,
        credentials: &ClientCredentials,
    ) -> Result<Token, Error> {
        let form = form(json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
            "client_id": credentials.client_id,
            "client_secret": credentials.client_secret,
            "redirect_uri": credentials.redirect_uri,
        }));
        let token = self.request_token(form, credentials).await?;
        info!("token refreshed (len={})", token.access_token().len());
        Ok(token)
    }

    pub(crate) async fn revoke(
        &self,
        token: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<(), Error> {
        let form = form(json!({
            "client_id": client_id,
            "client_secret": client_secret,
            "token": token,
        }));
        self.post_form(REVOKE_PATH, form).await?;
        info!("token revoked");
        Ok(())
    }

    async fn request_token(
        &self,
        form: Map<String, Value>,
        credentials: &ClientCredentials,
    ) -> Result<Token, Error> {
        let json = self.post_form(TOKEN_PATH, form).await.map_err(|err| match err {
            Error::Network(_) => err,
            other => {
                error!("token endpoint rejected the exchange: {}", other);
                Error::UnableToAuthenticate(other.to_string())
            }
        })?;
        let response: TokenResponse = decode_one(json)?;
        Token::from_response(response, credentials, Timestamp::now())
    }

    async fn post_form(&self, path: &str, form: Map<String, Value>) -> Result<Value, Error> {
        let request = RequestDescriptor::post(self.login_host.as_str(), path)
            .form_body(form)
            .requires_auth(false)
            .build(&self.http)?;
        let raw = match self.http.execute(request).await {
            Ok(resp) => {
                let status = resp.status();
                resp.bytes()
                    .await
                    .map(|body| RawResponse::new(status, body.to_vec()))
            }
            Err(err) => Err(err),
        };
        validate(raw)
    }
}

fn form(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
