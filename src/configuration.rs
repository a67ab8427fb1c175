use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub hashing: HashingSettings,
    /// When absent the service falls back to the in-memory credential store
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Browser origins allowed to call the API with credentials (the session cookie)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3500
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection before failing the request
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    5
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT signing settings
///
/// Expiries are in seconds.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct JwtSettings {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
    /// Lifetime of access tokens minted by the refresh endpoint
    #[serde(default = "default_refreshed_access_token_expiry")]
    pub refreshed_access_token_expiry: i64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_access_token_expiry() -> i64 {
    5 * 60
}

fn default_refresh_token_expiry() -> i64 {
    24 * 60 * 60
}

fn default_refreshed_access_token_expiry() -> i64 {
    10
}

fn default_issuer() -> String {
    "credential_gate".to_string()
}

/// bcrypt work factor
#[derive(serde::Deserialize, Clone, Debug)]
pub struct HashingSettings {
    pub cost: u32,
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self { cost: 10 }
    }
}

impl Settings {
    fn check(self) -> Result<Self, ConfigError> {
        if self.jwt.access_token_secret.is_empty() || self.jwt.refresh_token_secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "jwt secrets must not be empty".to_string(),
            ));
        }
        if !(4..=31).contains(&self.hashing.cost) {
            return Err(ConfigError::InvalidValue(format!(
                "hashing.cost must be between 4 and 31, got {}",
                self.hashing.cost
            )));
        }
        if let Some(origin) = self
            .application
            .allowed_origins
            .iter()
            .find(|origin| !is_origin(origin))
        {
            return Err(ConfigError::InvalidValue(format!(
                "application.allowed_origins entry {:?} is not an http(s) origin",
                origin
            )));
        }
        for (name, value) in [
            ("access_token_expiry", self.jwt.access_token_expiry),
            ("refresh_token_expiry", self.jwt.refresh_token_expiry),
            ("refreshed_access_token_expiry", self.jwt.refreshed_access_token_expiry),
        ] {
            if value <= 0 {
                return Err(ConfigError::InvalidValue(format!(
                    "jwt.{} must be positive",
                    name
                )));
            }
        }
        Ok(self)
    }
}

/// `scheme://host[:port]` with nothing after the authority.
fn is_origin(origin: &str) -> bool {
    let authority = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"));
    matches!(authority, Some(rest) if !rest.is_empty() && !rest.contains('/'))
}

/// Reads `configuration.yaml` (optional) and then `APP_*` environment variables,
/// e.g. `APP_JWT__ACCESS_TOKEN_SECRET`. Origins are comma separated in
/// `APP_APPLICATION__ALLOWED_ORIGINS`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("application.allowed_origins"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()?.check()
}
