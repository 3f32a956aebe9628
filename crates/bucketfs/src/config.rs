//! Filesystem configuration.
//!
//! A bucketfs filesystem is described by the bucket it represents and the
//! key prefix that acts as its root. Configs can be built in code or loaded
//! from JSON:
//!
//! ```json
//! { "bucket": "assets", "prefix": "site/v2" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tree::builder::normalize_prefix;

/// Configuration for one [`BucketFs`](crate::BucketFs).
///
/// # Example
///
/// ```rust
/// use bucketfs::FsConfig;
///
/// let config = FsConfig::new("assets").prefix("/site/v2/");
/// assert_eq!(config.bucket, "assets");
/// assert_eq!(config.prefix, "site/v2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Bucket name. Informational for the tree; stores use it to address
    /// requests.
    pub bucket: String,

    /// Key prefix acting as the filesystem root, without leading or trailing
    /// slashes. Empty means the whole bucket.
    /// Default: empty
    pub prefix: String,
}

impl FsConfig {
    /// Config for the whole of `bucket`.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Set the root prefix. Slashes at either end are dropped.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = normalize_prefix(prefix);
        self
    }

    /// Parse a JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: FsConfig = serde_json::from_str(json)?;
        config.prefix = normalize_prefix(&config.prefix);
        config.validate()?;
        Ok(config)
    }

    /// Check the config is usable.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(Error::Config("bucket name must not be empty".to_string()));
        }
        if self.prefix.split('/').any(|part| part.is_empty()) && !self.prefix.is_empty() {
            return Err(Error::Config(format!(
                "prefix {:?} contains an empty segment",
                self.prefix
            )));
        }
        Ok(())
    }

    /// The store key for a filesystem path: leading slash stripped, root
    /// prefix prepended.
    pub fn key_for(&self, path: &str) -> String {
        let relative = path.trim_start_matches('/');
        if self.prefix.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.prefix, relative)
        }
    }
}
