//! read client configuration from a file, the environment, or a secret

use std::fmt;
use std::path::Path;
use std::time::Duration;

use aws_config::BehaviorVersion;

use crate::errors::Error;

pub const PRODUCTION_API_HOST: &str = "https://api.uber.com";
pub const SANDBOX_API_HOST: &str = "https://sandbox-api.uber.com";
pub const LOGIN_HOST: &str = "https://login.uber.com";

pub enum ConfigLocation {
    File(String),
    Env,
    Secret,
}

/// OAuth application credentials needed to refresh or revoke user tokens.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

#[derive(Clone, Default, serde::Deserialize)]
pub struct Config {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    /// App-level server token. Clients built from it never refresh.
    pub server_token: Option<String>,
    #[serde(default)]
    pub sandbox: bool,
    pub api_host: Option<String>,
    pub login_host: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub locale: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("has_client_secret", &self.client_secret.is_some())
            .field("has_server_token", &self.server_token.is_some())
            .field("sandbox", &self.sandbox)
            .field("api_host", &self.api_host)
            .field("login_host", &self.login_host)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("locale", &self.locale)
            .finish()
    }
}

impl Config {
    /// Configuration for a user-token client.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            redirect_uri: Some(redirect_uri.into()),
            ..Self::default()
        }
    }

    /// Configuration for an app-token client.
    pub fn from_server_token(server_token: impl Into<String>) -> Self {
        Self {
            server_token: Some(server_token.into()),
            ..Self::default()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Reads `RIDES_*` environment variables. Every variable is optional; missing
    /// pieces surface when a client is built from the result.
    pub fn from_env() -> Result<Self, Error> {
        let sandbox = match std::env::var("RIDES_SANDBOX") {
            Ok(value) => parse_flag(&value)?,
            Err(_) => false,
        };
        let request_timeout_secs = match std::env::var("RIDES_REQUEST_TIMEOUT_SECS") {
            Ok(value) => Some(value.parse().map_err(|_| {
                Error::Config(format!("Invalid RIDES_REQUEST_TIMEOUT_SECS '{}'", value))
            })?),
            Err(_) => None,
        };
        Ok(Self {
            client_id: std::env::var("RIDES_CLIENT_ID").ok(),
            client_secret: std::env::var("RIDES_CLIENT_SECRET").ok(),
            redirect_uri: std::env::var("RIDES_REDIRECT_URI").ok(),
            server_token: std::env::var("RIDES_SERVER_TOKEN").ok(),
            sandbox,
            api_host: std::env::var("RIDES_API_HOST").ok(),
            login_host: std::env::var("RIDES_LOGIN_HOST").ok(),
            request_timeout_secs,
            locale: std::env::var("RIDES_LOCALE").ok(),
        })
    }

    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = Some(host.into());
        self
    }

    pub fn login_host(mut self, host: impl Into<String>) -> Self {
        self.login_host = Some(host.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Base URL for resource calls; sandbox unless overridden.
    pub fn api_base(&self) -> Result<String, Error> {
        let host = match self.api_host.as_deref() {
            Some(host) => host,
            None if self.sandbox => SANDBOX_API_HOST,
            None => PRODUCTION_API_HOST,
        };
        normalize_host(host)
    }

    pub fn login_base(&self) -> Result<String, Error> {
        normalize_host(self.login_host.as_deref().unwrap_or(LOGIN_HOST))
    }

    /// Returns the OAuth credentials when all three pieces are configured.
    pub fn credentials(&self) -> Option<ClientCredentials> {
        let client_id = non_empty(self.client_id.as_deref())?;
        let client_secret = non_empty(self.client_secret.as_deref())?;
        let redirect_uri = non_empty(self.redirect_uri.as_deref())?;
        Some(ClientCredentials {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
        })
    }

    /// Server token and user credentials select different client modes and may
    /// not be configured together.
    pub(crate) fn ensure_single_mode(&self) -> Result<(), Error> {
        let has_server_token = non_empty(self.server_token.as_deref()).is_some();
        let has_user_credentials = [&self.client_id, &self.client_secret, &self.redirect_uri]
            .into_iter()
            .any(|value| non_empty(value.as_deref()).is_some());
        if has_server_token && has_user_credentials {
            return Err(Error::Config(
                "server_token cannot be combined with client_id, client_secret or redirect_uri"
                    .into(),
            ));
        }
        Ok(())
    }

    pub fn require_credentials(&self) -> Result<ClientCredentials, Error> {
        self.credentials().ok_or_else(|| {
            Error::Config("client_id, client_secret and redirect_uri are required".into())
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

pub async fn read_config(loc: ConfigLocation) -> Result<Config, Error> {
    let config = match loc {
        ConfigLocation::File(path) => Config::from_file(path)?,
        ConfigLocation::Env => Config::from_env()?,
        ConfigLocation::Secret => read_config_from_secret().await?,
    };
    Ok(config)
}

async fn read_config_from_secret() -> Result<Config, Error> {
    let secret_arn = std::env::var("RIDES_CONFIG_SECRET_ARN")
        .map_err(|_| Error::Config("Missing RIDES_CONFIG_SECRET_ARN env var".to_string()))?;
    let client = aws_sdk_secretsmanager::Client::new(
        &aws_config::load_defaults(BehaviorVersion::latest()).await,
    );
    let resp = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Config(format!("Failed to get secret: {}", e)))?;
    let secret = resp
        .secret_string()
        .ok_or_else(|| Error::Config("Failed to get secret string, returned None".to_string()))?;
    serde_json::from_str(secret).map_err(|e| Error::Config(format!("Invalid secret: {}", e)))
}

fn normalize_host(host: &str) -> Result<String, Error> {
    let host = if host.starts_with("http") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", host.trim_end_matches('/'))
    };
    reqwest::Url::parse(&host)
        .map_err(|e| Error::Config(format!("Invalid host URL '{}': {}", host, e)))?;
    Ok(host)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Result<bool, Error> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(Error::Config(format!(
            "Unknown RIDES_SANDBOX value '{}'; expected true or false",
            other
        ))),
    }
}
