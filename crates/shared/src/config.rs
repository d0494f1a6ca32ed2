//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Business rules that depend on the deployment (timezone, thresholds).
    #[serde(default)]
    pub business: BusinessConfig,
    /// First-run bootstrap settings.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: i64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: i64,
}

fn default_access_token_expiry() -> i64 {
    3600 // 1 hour
}

fn default_refresh_token_expiry() -> i64 {
    604_800 // 7 days
}

/// Deployment-specific business settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessConfig {
    /// IANA timezone used for document years, due dates and subscription checks.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Threshold used by the low-stock report when a product has no `min_stock`.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

fn default_timezone() -> String {
    "America/Port-au-Prince".to_string()
}

fn default_low_stock_threshold() -> i32 {
    5
}

/// Settings read by the `bootstrap` binary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    /// The bootstrap binary refuses to run unless this is set.
    #[serde(default)]
    pub enabled: bool,
    /// Email of the first super-admin.
    pub admin_email: Option<String>,
    /// Password of the first super-admin.
    pub admin_password: Option<String>,
    /// Display name of the first super-admin.
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
}

fn default_admin_name() -> String {
    "Super Admin".to_string()
}

impl AppConfig {
    /// Loads configuration from `.env`, config files and `PLUS__*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PLUS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
