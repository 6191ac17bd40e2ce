//! Header validation for the HTTP/1 codec (also used for HTTP/0.9
//! upgrades). Follows RFC 3986 (URI syntax), RFC 7230 (message syntax),
//! and RFC 7231 (semantics).

use std::sync::Arc;

use uhv_http::HeaderMap;

use crate::config::ValidatorConfig;
use crate::path_normalizer;
use crate::primitives::{self, StatusValidationMode};
use crate::stream_info::StreamInfoSink;
use crate::verdict::{EntryVerdict, MapVerdict, ResponseCodeDetail};
use crate::HeaderValidator;

type EntryValidatorFn = fn(&Http1HeaderValidator, &[u8]) -> EntryVerdict;

const ALLOWED_PSEUDO_HEADERS: &[&[u8]] = &[b":method", b":scheme", b":authority", b":path"];

pub struct Http1HeaderValidator {
    config: ValidatorConfig,
    stream_info: Arc<dyn StreamInfoSink>,
}

impl Http1HeaderValidator {
    pub fn new(config: ValidatorConfig, stream_info: Arc<dyn StreamInfoSink>) -> Self {
        Self {
            config,
            stream_info,
        }
    }

    fn request_entry_validator(name: &[u8]) -> Option<EntryValidatorFn> {
        const DISPATCH: &[(&[u8], EntryValidatorFn)] = &[
            (b":method", Http1HeaderValidator::check_method),
            (b":authority", Http1HeaderValidator::check_host),
            (b"host", Http1HeaderValidator::check_host),
            (b":scheme", Http1HeaderValidator::check_scheme),
            (b":path", Http1HeaderValidator::check_path),
            (b"transfer-encoding", Http1HeaderValidator::check_transfer_encoding),
            (b"content-length", Http1HeaderValidator::check_content_length),
        ];
        DISPATCH
            .iter()
            .find(|(dispatch_name, _)| name.eq_ignore_ascii_case(dispatch_name))
            .map(|(_, validator)| *validator)
    }

    fn check_method(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_method(value, &self.config)
    }

    fn check_host(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_host(value)
    }

    fn check_scheme(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_scheme(value)
    }

    fn check_path(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_path_characters(value)
    }

    fn check_transfer_encoding(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_transfer_encoding(value)
    }

    fn check_content_length(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_content_length(value)
    }

    fn note_entry(&self, verdict: EntryVerdict) -> EntryVerdict {
        if let EntryVerdict::Reject(detail) = verdict {
            self.stream_info.set_response_code_detail(detail.code());
        }
        verdict
    }

    fn reject_map(&self, detail: ResponseCodeDetail) -> MapVerdict {
        tracing::debug!(detail = detail.code(), "rejecting http/1 header map");
        self.stream_info.set_response_code_detail(detail.code());
        MapVerdict::Reject(detail)
    }
}

impl HeaderValidator for Http1HeaderValidator {
    fn validate_request_header_entry(&self, name: &[u8], value: &[u8]) -> EntryVerdict {
        if name.is_empty() {
            return self.note_entry(EntryVerdict::Reject(ResponseCodeDetail::EmptyHeaderName));
        }
        if let Some(validator) = Self::request_entry_validator(name) {
            return self.note_entry(validator(self, value));
        }
        if name[0] == b':' {
            return self.note_entry(EntryVerdict::Reject(ResponseCodeDetail::InvalidPseudoHeader));
        }
        match primitives::validate_generic_header_name(name, &self.config) {
            EntryVerdict::Accept => {
                self.note_entry(primitives::validate_generic_header_value(value))
            }
            rejected => self.note_entry(rejected),
        }
    }

    fn validate_response_header_entry(&self, name: &[u8], value: &[u8]) -> EntryVerdict {
        if name.is_empty() {
            return self.note_entry(EntryVerdict::Reject(ResponseCodeDetail::EmptyHeaderName));
        }
        if name == b":status" {
            return self.note_entry(primitives::validate_status(
                value,
                StatusValidationMode::ValueRange,
            ));
        }
        if name.eq_ignore_ascii_case(b"content-length") {
            return self.note_entry(primitives::validate_content_length(value));
        }
        if name[0] == b':' {
            return self.note_entry(EntryVerdict::Reject(ResponseCodeDetail::InvalidPseudoHeader));
        }
        match primitives::validate_generic_header_name(name, &self.config) {
            EntryVerdict::Accept => {
                self.note_entry(primitives::validate_generic_header_value(value))
            }
            rejected => self.note_entry(rejected),
        }
    }

    fn validate_request_header_map(&self, header_map: &mut HeaderMap) -> MapVerdict {
        // The request line requires a method and a target, and HTTP/1.1
        // requires a Host header even for absolute-form targets.
        let method = match header_map.method() {
            Some(method) if !method.is_empty() => method.to_vec(),
            _ => return self.reject_map(ResponseCodeDetail::InvalidMethod),
        };
        let path = match header_map.path() {
            Some(path) if !path.is_empty() => path.to_vec(),
            _ => return self.reject_map(ResponseCodeDetail::InvalidUrl),
        };
        if header_map.host().map_or(true, <[u8]>::is_empty) {
            return self.reject_map(ResponseCodeDetail::InvalidHost);
        }

        let is_connect = method == b"CONNECT";
        let is_options = method == b"OPTIONS";

        // asterisk-form is reserved for server-wide OPTIONS
        if path == b"*" && !is_options {
            return self.reject_map(ResponseCodeDetail::InvalidUrl);
        }

        // A message must not carry both Transfer-Encoding and
        // Content-Length, and a CONNECT request must not carry a body at
        // all. `http1_allow_chunked_length` relaxes the first rule by
        // stripping Content-Length instead.
        let mut strip_content_length = false;
        if let Some(transfer_encoding) = header_map.get(b"transfer-encoding") {
            if is_connect {
                return self.reject_map(ResponseCodeDetail::TransferEncodingNotAllowed);
            }
            if !transfer_encoding.eq_ignore_ascii_case(b"chunked") {
                return self.reject_map(ResponseCodeDetail::InvalidTransferEncoding);
            }
            if header_map.contains(b"content-length") {
                if !self.config.http1_allow_chunked_length {
                    return self.reject_map(ResponseCodeDetail::ContentLengthAndChunkedNotAllowed);
                }
                strip_content_length = true;
            }
        } else if is_connect {
            if let Some(content_length) = header_map.get(b"content-length") {
                if content_length == b"0" {
                    strip_content_length = true;
                } else {
                    return self.reject_map(ResponseCodeDetail::ContentLengthNotAllowed);
                }
            }
        }

        let mut normalized_path: Option<Vec<u8>> = None;
        let mut redirect = false;
        if is_connect {
            // CONNECT targets are authority-form
            if let EntryVerdict::Reject(detail) = primitives::validate_host(&path) {
                return self.reject_map(detail);
            }
        } else if path[0] == b'/' && !self.config.path_normalization.skip_normalization {
            match path_normalizer::normalize_path(&path, &self.config.path_normalization) {
                Ok(normalized) => {
                    redirect = normalized.redirect;
                    normalized_path = Some(normalized.path);
                }
                Err(detail) => return self.reject_map(detail),
            }
        }

        for entry in header_map.iter() {
            let name = entry.name();
            if name.first() == Some(&b':')
                && !ALLOWED_PSEUDO_HEADERS.iter().any(|allowed| *allowed == name)
            {
                return self.reject_map(ResponseCodeDetail::InvalidPseudoHeader);
            }
            // Entry checks run against the path as it will be forwarded.
            let value = match normalized_path.as_deref() {
                Some(normalized) if name == b":path" => normalized,
                _ => entry.value(),
            };
            if let EntryVerdict::Reject(detail) = self.validate_request_header_entry(name, value) {
                return self.reject_map(detail);
            }
        }

        // Mutations are held back until the map is known good, so a
        // rejected map is byte-identical to its input.
        if strip_content_length {
            header_map.remove(b"content-length");
        }
        if let Some(normalized) = normalized_path {
            header_map.set_path(normalized);
        }
        if redirect {
            return MapVerdict::Redirect(ResponseCodeDetail::PathNormalizationRedirect);
        }
        MapVerdict::Accept
    }

    fn validate_response_header_map(&self, header_map: &mut HeaderMap) -> MapVerdict {
        match header_map.status() {
            Some(status) if !status.is_empty() => {}
            _ => return self.reject_map(ResponseCodeDetail::InvalidStatus),
        }

        for entry in header_map.iter() {
            let name = entry.name();
            if name.first() == Some(&b':') && name != b":status" {
                return self.reject_map(ResponseCodeDetail::InvalidPseudoHeader);
            }
            if let EntryVerdict::Reject(detail) =
                self.validate_response_header_entry(name, entry.value())
            {
                return self.reject_map(detail);
            }
        }
        MapVerdict::Accept
    }
}
