use std::str::FromStr;
use std::time::Duration;

use collabbridge_core::rate_limit::{PolicyGroup, RatePolicy};
use collabbridge_db::RetryPolicy;

/// Errors raised while reading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Deployment environment, from `APP_ENV` (falling back to `NODE_ENV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

/// Identity token verification settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret shared with the identity provider bridge.
    pub secret: String,
    /// Expected `iss` claim, checked when set.
    pub issuer: Option<String>,
    /// Expected `aud` claim, checked when set.
    pub audience: Option<String>,
}

/// Cloudinary credentials. Uploads are disabled without them.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Server configuration loaded from environment variables.
///
/// Everything except `DATABASE_URL` and `AUTH_TOKEN_SECRET` has a default
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background services get to stop after shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub environment: Environment,
    pub database_url: String,
    /// Recognized for deployment parity; no cache layer is built on it.
    pub redis_url: Option<String>,
    pub auth: AuthConfig,
    pub cloudinary: Option<CloudinaryConfig>,
    /// Replacement for the built-in global rate-limit budget.
    pub global_rate_limit: Option<RatePolicy>,
    /// Startup database connection retry schedule.
    pub db_retry: RetryPolicy,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    /// Only safe behind a reverse proxy that sets them.
    pub trust_proxy_headers: bool,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                          | Default                   |
    /// |----------------------------------|---------------------------|
    /// | `HOST`                           | `0.0.0.0`                 |
    /// | `PORT`                           | `5000`                    |
    /// | `CORS_ORIGINS`                   | `http://localhost:3000`   |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                      |
    /// | `SHUTDOWN_TIMEOUT_SECS`          | `30`                      |
    /// | `APP_ENV` / `NODE_ENV`           | `development`             |
    /// | `DATABASE_URL`                   | required                  |
    /// | `REDIS_URL`                      | unset                     |
    /// | `AUTH_TOKEN_SECRET`              | required                  |
    /// | `AUTH_TOKEN_ISSUER`              | unset                     |
    /// | `AUTH_TOKEN_AUDIENCE`            | unset                     |
    /// | `CLOUDINARY_CLOUD_NAME`          | unset (uploads disabled)  |
    /// | `CLOUDINARY_API_KEY`             | unset                     |
    /// | `CLOUDINARY_API_SECRET`          | unset                     |
    /// | `RATE_LIMIT_WINDOW_MS`           | built-in global policy    |
    /// | `RATE_LIMIT_MAX_REQUESTS`        | built-in global policy    |
    /// | `TRUST_PROXY_HEADERS`            | `false`                   |
    /// | `DB_CONNECT_MAX_ATTEMPTS`        | `15`                      |
    /// | `DB_CONNECT_INITIAL_DELAY_SECS`  | `15`                      |
    /// | `DB_CONNECT_MAX_DELAY_SECS`      | `60`                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&get, "PORT", 5000u16)?;

        let cors_origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_or(&get, "REQUEST_TIMEOUT_SECS", 30u64)?;
        let shutdown_timeout_secs = parse_or(&get, "SHUTDOWN_TIMEOUT_SECS", 30u64)?;

        let environment = get("APP_ENV")
            .or_else(|| get("NODE_ENV"))
            .map(|v| Environment::parse(&v))
            .unwrap_or_default();

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        validate_database_url(&database_url)?;

        let auth = AuthConfig {
            secret: get("AUTH_TOKEN_SECRET").ok_or(ConfigError::Missing("AUTH_TOKEN_SECRET"))?,
            issuer: get("AUTH_TOKEN_ISSUER"),
            audience: get("AUTH_TOKEN_AUDIENCE"),
        };

        let cloudinary = match (
            get("CLOUDINARY_CLOUD_NAME"),
            get("CLOUDINARY_API_KEY"),
            get("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    var: "CLOUDINARY_*",
                    reason: "cloud name, API key and API secret must be set together".into(),
                })
            }
        };

        let global_rate_limit = {
            let window_ms: Option<u64> = parse_opt(&get, "RATE_LIMIT_WINDOW_MS")?;
            let max_requests: Option<u32> = parse_opt(&get, "RATE_LIMIT_MAX_REQUESTS")?;
            if window_ms.is_none() && max_requests.is_none() {
                None
            } else {
                let default = PolicyGroup::Global.default_policy();
                Some(RatePolicy {
                    window: window_ms.map(Duration::from_millis).unwrap_or(default.window),
                    max_requests: max_requests.unwrap_or(default.max_requests),
                })
            }
        };

        let trust_proxy_headers = parse_or(&get, "TRUST_PROXY_HEADERS", false)?;

        let retry_default = RetryPolicy::default();
        let db_retry = RetryPolicy {
            max_attempts: parse_or(&get, "DB_CONNECT_MAX_ATTEMPTS", retry_default.max_attempts)?,
            initial_delay: Duration::from_secs(parse_or(
                &get,
                "DB_CONNECT_INITIAL_DELAY_SECS",
                retry_default.initial_delay.as_secs(),
            )?),
            max_delay: Duration::from_secs(parse_or(
                &get,
                "DB_CONNECT_MAX_DELAY_SECS",
                retry_default.max_delay.as_secs(),
            )?),
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            environment,
            database_url,
            redis_url: get("REDIS_URL"),
            auth,
            cloudinary,
            global_rate_limit,
            db_retry,
            trust_proxy_headers,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Check that `url` is a Postgres connection URL with a host.
pub fn validate_database_url(url: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        var: "DATABASE_URL",
        reason: reason.to_string(),
    };

    let rest = url
        .strip_prefix("postgresql://")
        .or_else(|| url.strip_prefix("postgres://"))
        .ok_or_else(|| invalid("must start with postgres:// or postgresql://"))?;

    let authority = rest.split(['/', '?']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let host = if host_port.starts_with('[') {
        host_port.split(']').next().unwrap_or_default().trim_start_matches('[')
    } else {
        host_port.split(':').next().unwrap_or_default()
    };

    if host.is_empty() {
        return Err(invalid("missing host"));
    }
    Ok(())
}

fn parse_opt<T, F>(get: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_or<T, F>(get: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(get, var)?.unwrap_or(default))
}
