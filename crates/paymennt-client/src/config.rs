//! # Client Configuration
//!
//! Credentials, target environment and transport options.
//! Loaded explicitly, from environment variables, or from a TOML file.

use paymennt_core::{PaymenntError, PaymenntResult};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Deployment target of the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Environment {
    /// Production gateway
    #[default]
    Live,
    /// Sandbox gateway
    Test,
    /// Gateway running on the developer's machine
    Local,
}

impl Environment {
    pub fn scheme(&self) -> &'static str {
        match self {
            Environment::Live | Environment::Test => "https",
            Environment::Local => "http",
        }
    }

    pub fn host(&self) -> &'static str {
        match self {
            Environment::Live => "api.paymennt.com",
            Environment::Test => "api.test.paymennt.com",
            Environment::Local => "localhost",
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            Environment::Live | Environment::Test => 443,
            Environment::Local => 8080,
        }
    }

    /// Path every API route is mounted under
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Environment::Live | Environment::Test => "mer/v2.0",
            Environment::Local => "api/mer/v2.0",
        }
    }

    /// Base URI: scheme, host, port and prefix joined
    pub fn base_url(&self) -> PaymenntResult<Url> {
        let raw = format!(
            "{}://{}:{}/{}",
            self.scheme(),
            self.host(),
            self.port(),
            self.path_prefix()
        );
        Url::parse(&raw)
            .map_err(|e| PaymenntError::Configuration(format!("invalid base URL {raw}: {e}")))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Live => "live",
            Environment::Test => "test",
            Environment::Local => "local",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = PaymenntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Environment::Live),
            "test" => Ok(Environment::Test),
            "local" => Ok(Environment::Local),
            other => Err(PaymenntError::Configuration(format!(
                "Invalid environment '{other}', expected live, test or local"
            ))),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = PaymenntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// API key and secret pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    /// Both values must be non-blank
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> PaymenntResult<Self> {
        let api_key = api_key.into();
        let api_secret = api_secret.into();

        if api_key.trim().is_empty() {
            return Err(PaymenntError::Configuration(
                "Unable to initiate PaymenntClient: Missing apiKey".to_string(),
            ));
        }
        if api_secret.trim().is_empty() {
            return Err(PaymenntError::Configuration(
                "Unable to initiate PaymenntClient: Missing apiSecret".to_string(),
            ));
        }

        Ok(Self { api_key, api_secret })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Everything needed to build a `PaymenntClient`
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,

    pub environment: Environment,

    /// Replaces the environment's base URI (for testing/mocking)
    pub base_url: Option<Url>,

    /// Client-wide request timeout; `None` keeps the HTTP client's default
    pub timeout: Option<Duration>,
}

/// On-disk shape of the TOML configuration
#[derive(Debug, Deserialize)]
struct FileConfig {
    api_key: String,
    api_secret: String,
    #[serde(default)]
    environment: Environment,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Create config with explicit values
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        environment: Environment,
    ) -> PaymenntResult<Self> {
        Ok(Self {
            credentials: Credentials::new(api_key, api_secret)?,
            environment,
            base_url: None,
            timeout: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAYMENNT_API_KEY`
    /// - `PAYMENNT_API_SECRET`
    ///
    /// Optional: `PAYMENNT_ENVIRONMENT` (live, test, local; default live),
    /// `PAYMENNT_BASE_URL`, `PAYMENNT_TIMEOUT_SECS`.
    pub fn from_env() -> PaymenntResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_key = env::var("PAYMENNT_API_KEY")
            .map_err(|_| PaymenntError::Configuration("PAYMENNT_API_KEY not set".to_string()))?;

        let api_secret = env::var("PAYMENNT_API_SECRET")
            .map_err(|_| PaymenntError::Configuration("PAYMENNT_API_SECRET not set".to_string()))?;

        let environment = match env::var("PAYMENNT_ENVIRONMENT") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::default(),
        };

        let mut config = Self::new(api_key, api_secret, environment)?;

        if let Ok(url) = env::var("PAYMENNT_BASE_URL") {
            config = config.with_base_url(&url)?;
        }

        if let Ok(secs) = env::var("PAYMENNT_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                PaymenntError::Configuration(format!(
                    "PAYMENNT_TIMEOUT_SECS must be an integer, got '{secs}'"
                ))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Parse a TOML document:
    ///
    /// ```toml
    /// api_key = "..."
    /// api_secret = "..."
    /// environment = "test"
    /// timeout_secs = 30
    /// ```
    pub fn from_toml_str(content: &str) -> PaymenntResult<Self> {
        let file: FileConfig = toml::from_str(content)
            .map_err(|e| PaymenntError::Configuration(format!("Failed to parse config: {e}")))?;

        let mut config = Self::new(file.api_key, file.api_secret, file.environment)?;
        if let Some(url) = file.base_url {
            config = config.with_base_url(&url)?;
        }
        if let Some(secs) = file.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> PaymenntResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PaymenntError::Configuration(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Builder: point at a custom base URI (for testing)
    pub fn with_base_url(mut self, url: &str) -> PaymenntResult<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| PaymenntError::Configuration(format!("Invalid base URL '{url}': {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(PaymenntError::Configuration(format!(
                "Base URL '{url}' cannot carry a path"
            )));
        }
        self.base_url = Some(parsed);
        Ok(self)
    }

    /// Builder: set the client-wide request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The base URI requests are built from
    pub fn resolved_base_url(&self) -> PaymenntResult<Url> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => self.environment.base_url(),
        }
    }
}
