//! Header validation for the HTTP/2 codec. On top of the shared RFC
//! 3986/7230/7231 rules this enforces the RFC 7540 pseudo-header
//! discipline and the ban on connection-specific headers.

use std::sync::Arc;

use uhv_http::HeaderMap;

use crate::config::ValidatorConfig;
use crate::path_normalizer;
use crate::primitives::{self, StatusValidationMode};
use crate::stream_info::StreamInfoSink;
use crate::verdict::{EntryVerdict, MapVerdict, ResponseCodeDetail};
use crate::HeaderValidator;

type EntryValidatorFn = fn(&Http2HeaderValidator, &[u8]) -> EntryVerdict;

const ALLOWED_PSEUDO_HEADERS: &[&[u8]] = &[b":method", b":scheme", b":authority", b":path"];
const ALLOWED_PSEUDO_HEADERS_FOR_CONNECT: &[&[u8]] = &[b":method", b":authority"];

// Messages carrying connection-specific headers are malformed in HTTP/2
// (RFC 7540 section 8.1.2.2).
const CONNECTION_SPECIFIC_HEADERS: &[&[u8]] = &[
    b"transfer-encoding",
    b"connection",
    b"upgrade",
    b"keep-alive",
    b"proxy-connection",
];

pub struct Http2HeaderValidator {
    config: ValidatorConfig,
    stream_info: Arc<dyn StreamInfoSink>,
}

impl Http2HeaderValidator {
    pub fn new(config: ValidatorConfig, stream_info: Arc<dyn StreamInfoSink>) -> Self {
        Self {
            config,
            stream_info,
        }
    }

    fn request_entry_validator(name: &[u8]) -> Option<EntryValidatorFn> {
        const DISPATCH: &[(&[u8], EntryValidatorFn)] = &[
            (b":method", Http2HeaderValidator::check_method),
            (b":authority", Http2HeaderValidator::check_authority),
            (b"host", Http2HeaderValidator::check_authority),
            (b":scheme", Http2HeaderValidator::check_scheme),
            (b":path", Http2HeaderValidator::check_path),
            (b"te", Http2HeaderValidator::check_te),
            (b"content-length", Http2HeaderValidator::check_content_length),
        ];
        DISPATCH
            .iter()
            .find(|(dispatch_name, _)| name.eq_ignore_ascii_case(dispatch_name))
            .map(|(_, validator)| *validator)
    }

    fn check_method(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_method(value, &self.config)
    }

    // HTTP/2 deprecates the userinfo portion of :authority; otherwise the
    // host rules are unchanged.
    fn check_authority(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_host(value)
    }

    fn check_scheme(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_scheme(value)
    }

    // The structural :path checks happen in the map phase, after
    // normalization.
    fn check_path(&self, _value: &[u8]) -> EntryVerdict {
        EntryVerdict::Accept
    }

    fn check_te(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_te(value)
    }

    fn check_content_length(&self, value: &[u8]) -> EntryVerdict {
        primitives::validate_content_length(value)
    }

    fn check_generic_header_name(&self, name: &[u8]) -> EntryVerdict {
        if CONNECTION_SPECIFIC_HEADERS
            .iter()
            .any(|rejected| name.eq_ignore_ascii_case(rejected))
        {
            return EntryVerdict::Reject(ResponseCodeDetail::ConnectionHeaderRejected);
        }
        primitives::validate_generic_header_name(name, &self.config)
    }

    fn note_entry(&self, verdict: EntryVerdict) -> EntryVerdict {
        if let EntryVerdict::Reject(detail) = verdict {
            self.stream_info.set_response_code_detail(detail.code());
        }
        verdict
    }

    fn reject_map(&self, detail: ResponseCodeDetail) -> MapVerdict {
        tracing::debug!(detail = detail.code(), "rejecting http/2 header map");
        self.stream_info.set_response_code_detail(detail.code());
        MapVerdict::Reject(detail)
    }
}

impl HeaderValidator for Http2HeaderValidator {
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
        match self.check_generic_header_name(name) {
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
        match self.check_generic_header_name(name) {
            EntryVerdict::Accept => {
                self.note_entry(primitives::validate_generic_header_value(value))
            }
            rejected => self.note_entry(rejected),
        }
    }

    fn validate_request_header_map(&self, header_map: &mut HeaderMap) -> MapVerdict {
        let method = match header_map.method() {
            Some(method) if !method.is_empty() => method.to_vec(),
            _ => return self.reject_map(ResponseCodeDetail::InvalidMethod),
        };
        let is_connect = method == b"CONNECT";
        let is_options = method == b"OPTIONS";

        // Every request needs :method, :scheme, and :path. CONNECT instead
        // replaces the target with :authority and must omit the other two
        // (RFC 7540 sections 8.1.2.3 and 8.3).
        if is_connect {
            if header_map.scheme().is_some() {
                return self.reject_map(ResponseCodeDetail::InvalidScheme);
            }
            if header_map.path().is_some() {
                return self.reject_map(ResponseCodeDetail::InvalidUrl);
            }
            if header_map.authority().map_or(true, <[u8]>::is_empty) {
                return self.reject_map(ResponseCodeDetail::InvalidHost);
            }
        } else {
            if header_map.scheme().map_or(true, <[u8]>::is_empty) {
                return self.reject_map(ResponseCodeDetail::InvalidScheme);
            }
            if header_map.path().map_or(true, <[u8]>::is_empty) {
                return self.reject_map(ResponseCodeDetail::InvalidUrl);
            }
        }

        let path = header_map.path().map(<[u8]>::to_vec).unwrap_or_default();
        if path == b"*" && !is_options {
            return self.reject_map(ResponseCodeDetail::InvalidUrl);
        }

        let mut normalized_path: Option<Vec<u8>> = None;
        let mut redirect = false;
        if path.first() == Some(&b'/') && !self.config.path_normalization.skip_normalization {
            match path_normalizer::normalize_path(&path, &self.config.path_normalization) {
                Ok(normalized) => {
                    redirect = normalized.redirect;
                    normalized_path = Some(normalized.path);
                }
                Err(detail) => return self.reject_map(detail),
            }
        }

        let allowed_pseudo_headers = if is_connect {
            ALLOWED_PSEUDO_HEADERS_FOR_CONNECT
        } else {
            ALLOWED_PSEUDO_HEADERS
        };

        for entry in header_map.iter() {
            let name = entry.name();
            if name.first() == Some(&b':')
                && !allowed_pseudo_headers.iter().any(|allowed| *allowed == name)
            {
                return self.reject_map(ResponseCodeDetail::InvalidPseudoHeader);
            }
            let value = match normalized_path.as_deref() {
                Some(normalized) if name == b":path" => normalized,
                _ => entry.value(),
            };
            if let EntryVerdict::Reject(detail) = self.validate_request_header_entry(name, value) {
                return self.reject_map(detail);
            }
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
