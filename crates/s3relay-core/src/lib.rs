pub mod config;
pub mod error;
pub mod object;
pub mod storage;
pub mod url;

pub use config::{Config, ConfigError};
pub use error::RelayError;
pub use object::{ObjectSummary, PutObject};
pub use url::PublicUrl;
