use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid validator configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What to do when the path carries a percent-encoded slash (`%2F`/`%5C`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapedSlashesAction {
    /// Behaves as `KeepEncoded`.
    ImplementationDefault,
    KeepEncoded,
    Reject,
    UnescapeAndForward,
    UnescapeAndRedirect,
}

impl Default for EscapedSlashesAction {
    fn default() -> Self {
        Self::ImplementationDefault
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PathNormalizationOptions {
    /// Leave `:path` exactly as received.
    pub skip_normalization: bool,
    /// Preserve consecutive `/` instead of collapsing them.
    pub skip_merging_slashes: bool,
    pub escaped_slashes_action: EscapedSlashesAction,
}

/// Validation knobs, all defaulting off. Validators take an immutable copy
/// at creation time; nothing here changes mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ValidatorConfig {
    /// Reject methods outside the IANA HTTP Method Registry.
    pub restrict_http_methods: bool,
    /// Reject header names containing `_`.
    pub reject_headers_with_underscores: bool,
    /// Accept a request carrying both `Transfer-Encoding: chunked` and
    /// `Content-Length`, stripping the latter.
    pub http1_allow_chunked_length: bool,
    pub path_normalization: PathNormalizationOptions,
}

impl ValidatorConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}
