use crate::config::{Config, ConfigError};
use http::Uri;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped inside a single key segment. Unreserved characters stay literal.
const KEY_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Builds the public URL of an object from the configured endpoint.
#[derive(Debug, Clone)]
pub struct PublicUrl {
    scheme: String,
    host: String,
    path_style: bool,
    base: Option<String>,
}

impl PublicUrl {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let uri: Uri = config.endpoint.parse().map_err(|e: http::uri::InvalidUri| {
            ConfigError::Invalid {
                var: "S3RELAY_ENDPOINT",
                reason: e.to_string(),
            }
        })?;
        let scheme = uri.scheme_str().ok_or_else(|| ConfigError::Invalid {
            var: "S3RELAY_ENDPOINT",
            reason: "endpoint must include a scheme".into(),
        })?;
        let host = uri.authority().ok_or_else(|| ConfigError::Invalid {
            var: "S3RELAY_ENDPOINT",
            reason: "endpoint must include a host".into(),
        })?;

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.as_str().to_string(),
            path_style: config.path_style,
            base: config
                .public_url_base
                .as_ref()
                .map(|b| b.trim_end_matches('/').to_string()),
        })
    }

    /// Virtual-hosted URL unless path-style is configured or the bucket
    /// cannot be used as a host label, in which case the bucket goes in the path.
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        let key = encode_key(key);
        match &self.base {
            Some(base) => format!("{}/{}", base.replace("{bucket}", bucket), key),
            None if self.path_style || !self.virtual_hostable(bucket) => format!(
                "{}://{}/{}/{}",
                self.scheme,
                self.host,
                utf8_percent_encode(bucket, KEY_SEGMENT),
                key
            ),
            None => format!("{}://{}.{}/{}", self.scheme, bucket, self.host, key),
        }
    }

    fn virtual_hostable(&self, bucket: &str) -> bool {
        // Dotted names break wildcard certificates over TLS.
        if self.scheme == "https" && bucket.contains('.') {
            return false;
        }
        is_dns_bucket_name(bucket)
    }
}

/// Lowercase DNS-compatible bucket name that is not shaped like an IPv4 address.
fn is_dns_bucket_name(bucket: &str) -> bool {
    let bytes = bucket.as_bytes();
    if !(3..=63).contains(&bytes.len()) {
        return false;
    }
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !edge_ok(bytes[0]) || !edge_ok(bytes[bytes.len() - 1]) {
        return false;
    }
    if !bytes.iter().all(|&b| edge_ok(b) || b == b'-' || b == b'.') {
        return false;
    }
    if bucket.contains("..") || bucket.contains(".-") || bucket.contains("-.") {
        return false;
    }
    bucket.parse::<std::net::Ipv4Addr>().is_err()
}

fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
