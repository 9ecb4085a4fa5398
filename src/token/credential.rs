use std::fmt;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::config::ClientCredentials;
use crate::errors::Error;

use super::TokenEndpoint;

/// One OAuth credential snapshot. Tokens are never mutated once shared; a refresh
/// produces a new value that replaces the old one wholesale.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expiration_date: Timestamp,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    redirect_url: Option<String>,
}

/// Token endpoint payload.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

impl Token {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expiration_date: Timestamp,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expiration_date,
            client_id: None,
            client_secret: None,
            redirect_url: None,
        }
    }

    /// Fills in any client credential the token does not already carry.
    pub fn with_credentials(mut self, credentials: &ClientCredentials) -> Self {
        if self.client_id.as_deref().is_none_or(str::is_empty) {
            self.client_id = Some(credentials.client_id.clone());
        }
        if self.client_secret.as_deref().is_none_or(str::is_empty) {
            self.client_secret = Some(credentials.client_secret.clone());
        }
        if self.redirect_url.as_deref().is_none_or(str::is_empty) {
            self.redirect_url = Some(credentials.redirect_uri.clone());
        }
        self
    }

    pub(crate) fn from_response(
        response: TokenResponse,
        credentials: &ClientCredentials,
        now: Timestamp,
    ) -> Result<Self, Error> {
        let expiration_date = now
            .checked_add(SignedDuration::from_secs(response.expires_in.max(0)))
            .map_err(|err| {
                Error::UnableToParseResponse(format!(
                    "expires_in {} is out of range: {}",
                    response.expires_in, err
                ))
            })?;
        Ok(
            Token::new(response.access_token, response.refresh_token, expiration_date)
                .with_credentials(credentials),
        )
    }

    /// Returns the raw token value suitable for Authorization headers.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn expiration_date(&self) -> Timestamp {
        self.expiration_date
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expiration_date
    }

    /// True iff every input of the refresh exchange is present and non-empty.
    pub fn can_refresh(&self) -> bool {
        self.credentials().is_some()
    }

    pub(crate) fn credentials(&self) -> Option<(&str, ClientCredentials)> {
        let refresh_token = present(&self.refresh_token)?;
        Some((
            refresh_token,
            ClientCredentials {
                client_id: present(&self.client_id)?.to_string(),
                client_secret: present(&self.client_secret)?.to_string(),
                redirect_uri: present(&self.redirect_url)?.to_string(),
            },
        ))
    }

    /// Exchanges the refresh token for a brand-new token. `self` is left untouched.
    pub async fn refresh(&self, endpoint: &TokenEndpoint) -> Result<Token, Error> {
        let (refresh_token, credentials) = self.credentials().ok_or_else(|| {
            Error::UnableToAuthenticate("token is missing refresh credentials".into())
        })?;
        let mut token = endpoint.refresh(refresh_token, &credentials).await?;
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        Ok(token)
    }

    /// Revokes the token server-side. The local value stays as it is; callers
    /// should discard it.
    pub async fn revoke(&self, endpoint: &TokenEndpoint) -> Result<(), Error> {
        let client_id = present(&self.client_id);
        let client_secret = present(&self.client_secret);
        let (Some(client_id), Some(client_secret)) = (client_id, client_secret) else {
            return Err(Error::InvalidParam(
                "revoking a token requires client_id and client_secret".into(),
            ));
        };
        endpoint
            .revoke(&self.access_token, client_id, client_secret)
            .await
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &format_args!("<{} bytes>", self.access_token.len()))
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expiration_date", &self.expiration_date)
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
