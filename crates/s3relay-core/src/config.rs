use std::env;
use std::fmt;

pub const DEFAULT_BIND: &str = "0.0.0.0:3001";
pub const DEFAULT_ENDPOINT: &str = "https://nyc3.digitaloceanspaces.com";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MAX_FILES: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("storage credentials are not configured (set S3RELAY_ACCESS_KEY and S3RELAY_SECRET_KEY)")]
    MissingCredentials,
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub bind: String,
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    /// Address objects as `endpoint/bucket/key` instead of `bucket.endpoint/key`.
    pub path_style: bool,
    /// Overrides the host-derived public URL. `{bucket}` is substituted.
    pub public_url_base: Option<String>,
    pub max_files: usize,
    /// `None` lifts the request body limit entirely.
    pub max_body_bytes: Option<usize>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`Config::from_env`], but values from `overrides` win over the
    /// environment and go through the same validation.
    pub fn from_env_with<F>(overrides: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|name| overrides(name).or_else(|| env::var(name).ok()))
    }

    /// Builds a config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let access_key = var("S3RELAY_ACCESS_KEY").ok_or(ConfigError::MissingCredentials)?;
        let secret_key = var("S3RELAY_SECRET_KEY").ok_or(ConfigError::MissingCredentials)?;

        let path_style = match var("S3RELAY_PATH_STYLE") {
            Some(v) => parse_bool("S3RELAY_PATH_STYLE", &v)?,
            None => false,
        };
        let max_files = match var("S3RELAY_MAX_FILES") {
            Some(v) => parse_count("S3RELAY_MAX_FILES", &v)?,
            None => DEFAULT_MAX_FILES,
        };
        let max_body_bytes = var("S3RELAY_MAX_BODY_BYTES")
            .map(|v| parse_count("S3RELAY_MAX_BODY_BYTES", &v))
            .transpose()?;

        Ok(Self {
            bind: var("S3RELAY_BIND").unwrap_or_else(|| DEFAULT_BIND.into()),
            endpoint: var("S3RELAY_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.into()),
            region: var("S3RELAY_REGION").unwrap_or_else(|| DEFAULT_REGION.into()),
            access_key,
            secret_key,
            path_style,
            public_url_base: var("S3RELAY_PUBLIC_URL_BASE"),
            max_files,
            max_body_bytes,
            log_level: var("S3RELAY_LOG_LEVEL").unwrap_or_else(|| "info".into()),
        })
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

fn parse_count(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            reason: "must be greater than zero".into(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind", &self.bind)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("path_style", &self.path_style)
            .field("public_url_base", &self.public_url_base)
            .field("max_files", &self.max_files)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            region: DEFAULT_REGION.into(),
            access_key: String::new(),
            secret_key: String::new(),
            path_style: false,
            public_url_base: None,
            max_files: DEFAULT_MAX_FILES,
            max_body_bytes: None,
            log_level: "info".into(),
        }
    }
}
