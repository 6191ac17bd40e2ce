//! Protocol-version-aware validation of HTTP request and response header
//! maps on behalf of a proxy codec, per RFC 9110/9112 (HTTP/1.1), RFC 7540
//! (HTTP/2), and RFC 3986 (URIs). Also normalizes the request `:path` in
//! place.
//!
//! The codec creates one validator per stream through
//! [`HeaderValidatorFactory`], presents header maps to it, and acts on the
//! returned verdicts. Rejections never panic and never mutate the map;
//! accepted maps may come back with the path rewritten and a stripped
//! `content-length`.

use std::sync::Arc;

pub mod config;
mod http1;
mod http2;
mod null;
pub mod path_normalizer;
pub mod primitives;
mod registry;
mod stream_info;
mod verdict;

pub use config::{ConfigError, EscapedSlashesAction, PathNormalizationOptions, ValidatorConfig};
pub use http1::Http1HeaderValidator;
pub use http2::Http2HeaderValidator;
pub use null::NullHeaderValidator;
pub use path_normalizer::{normalize_path, NormalizedPath};
pub use stream_info::{NoopStreamInfo, RecordingStreamInfo, StreamInfoSink};
pub use uhv_http::{HeaderEntry, HeaderMap, Protocol};
pub use verdict::{EntryVerdict, MapVerdict, ResponseCodeDetail};

/// One header validator, bound to a single in-flight stream. No state
/// persists across requests; every call returns synchronously.
pub trait HeaderValidator: Send + Sync {
    fn validate_request_header_entry(&self, name: &[u8], value: &[u8]) -> EntryVerdict;

    fn validate_response_header_entry(&self, name: &[u8], value: &[u8]) -> EntryVerdict;

    /// Validates a request map. On Accept/Redirect the map may have been
    /// mutated (normalized path, stripped content-length); on Reject it is
    /// untouched.
    fn validate_request_header_map(&self, header_map: &mut HeaderMap) -> MapVerdict;

    fn validate_response_header_map(&self, header_map: &mut HeaderMap) -> MapVerdict;
}

/// Creates per-stream validators for whatever protocol the codec
/// negotiated.
#[derive(Debug, Clone)]
pub struct HeaderValidatorFactory {
    config: ValidatorConfig,
}

impl HeaderValidatorFactory {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn create(
        &self,
        protocol: Protocol,
        stream_info: Arc<dyn StreamInfoSink>,
    ) -> Box<dyn HeaderValidator> {
        match protocol {
            Protocol::Http2 => Box::new(Http2HeaderValidator::new(self.config, stream_info)),
            Protocol::Http1 | Protocol::Http09 => {
                Box::new(Http1HeaderValidator::new(self.config, stream_info))
            }
            Protocol::Other => Box::new(NullHeaderValidator::new()),
        }
    }
}
