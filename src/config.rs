use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub authority: AuthorityConfig,
    pub license: LicenseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Access token scoped to activation-only permission, baked into the image
    pub auth_token: String,
    /// Authority public key material, baked into the image
    pub rsa_pub_key: String,
    /// Base URL of the remote licensing authority (no trailing slash)
    pub server_url: String,
    /// Per-call timeout in seconds; must stay below the check interval so a
    /// stuck call cannot outlive the tick that gets skipped because of it
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct LicenseConfig {
    /// How often the license is re-validated (seconds); also sent to the
    /// authority as the floating-license renewal interval
    pub check_interval_seconds: u64,
    pub product_id: u32,
    /// End-customer-provided license key
    pub product_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8000);

        let server_url = std::env::var("CL_SERVER_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_default();
        let auth_token = std::env::var("CL_AUTH_TOKEN").unwrap_or_default();
        let rsa_pub_key = std::env::var("CL_RSA_PUB_KEY").unwrap_or_default();

        let product_id = std::env::var("CL_PRODUCT_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let product_key = std::env::var("CL_PRODUCT_KEY").unwrap_or_default();

        let check_interval_seconds = std::env::var("CL_CHECK_INTERVAL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);
        let timeout_seconds = std::env::var("CL_AUTHORITY_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let config = Config {
            authority: AuthorityConfig {
                auth_token,
                rsa_pub_key,
                server_url,
                timeout_seconds,
            },
            license: LicenseConfig {
                check_interval_seconds,
                product_id,
                product_key,
            },
            server: ServerConfig { host, port },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.authority.server_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "CL_SERVER_URL cannot be empty".to_string(),
            ));
        }
        if self.authority.auth_token.is_empty() {
            return Err(ConfigError::ValidationError(
                "CL_AUTH_TOKEN cannot be empty".to_string(),
            ));
        }
        if self.authority.rsa_pub_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "CL_RSA_PUB_KEY cannot be empty".to_string(),
            ));
        }
        if self.license.product_id == 0 {
            return Err(ConfigError::ValidationError(
                "CL_PRODUCT_ID must be set to a non-zero product id".to_string(),
            ));
        }
        if self.license.product_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "CL_PRODUCT_KEY cannot be empty".to_string(),
            ));
        }
        if self.license.check_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "CL_CHECK_INTERVAL must be greater than 0".to_string(),
            ));
        }
        if self.authority.timeout_seconds == 0
            || self.authority.timeout_seconds >= self.license.check_interval_seconds
        {
            return Err(ConfigError::ValidationError(format!(
                "CL_AUTHORITY_TIMEOUT ({}s) must be non-zero and shorter than \
                 CL_CHECK_INTERVAL ({}s)",
                self.authority.timeout_seconds, self.license.check_interval_seconds
            )));
        }

        Ok(())
    }

    /// The listener address composed from HOST and PORT.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
