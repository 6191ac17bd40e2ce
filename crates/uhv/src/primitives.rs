//! Pure per-value validators, one RFC grammar each. These are shared by the
//! HTTP/1 and HTTP/2 validators; the per-version rules live in the
//! respective modules.

use uhv_http::tables;

use crate::config::ValidatorConfig;
use crate::registry;
use crate::verdict::{EntryVerdict, ResponseCodeDetail};

/// How strictly a `:status` value is checked after it parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusValidationMode {
    /// Any whole number.
    WholeNumber,
    /// 100 through 599.
    ValueRange,
    /// Only codes in the IANA registry.
    OfficialStatusCodes,
}

fn reject(detail: ResponseCodeDetail) -> EntryVerdict {
    EntryVerdict::Reject(detail)
}

/// Whole-number decimal parse requiring full consumption; no sign, no
/// surrounding whitespace, overflow fails.
fn parse_decimal(value: &[u8]) -> Option<u32> {
    if value.is_empty() {
        return None;
    }
    let mut parsed: u32 = 0;
    for byte in value {
        if !byte.is_ascii_digit() {
            return None;
        }
        parsed = parsed
            .checked_mul(10)?
            .checked_add(u32::from(byte - b'0'))?;
    }
    Some(parsed)
}

/// method = token. With `restrict_http_methods`, only IANA-registered
/// methods (and `*`) pass.
pub fn validate_method(value: &[u8], config: &ValidatorConfig) -> EntryVerdict {
    let valid = if config.restrict_http_methods {
        registry::is_registered_method(value)
    } else {
        !value.is_empty() && value.iter().all(|byte| tables::TOKEN.contains(*byte))
    };
    if valid {
        EntryVerdict::Accept
    } else {
        reject(ResponseCodeDetail::InvalidMethod)
    }
}

/// scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ). Uppercase is
/// accepted but never rewritten; lowercase is the canonical form.
pub fn validate_scheme(value: &[u8]) -> EntryVerdict {
    let Some((first, tail)) = value.split_first() else {
        return reject(ResponseCodeDetail::InvalidScheme);
    };
    if !first.is_ascii_alphabetic() {
        return reject(ResponseCodeDetail::InvalidScheme);
    }
    if tail.iter().all(|byte| tables::SCHEME_TAIL.contains(*byte)) {
        EntryVerdict::Accept
    } else {
        reject(ResponseCodeDetail::InvalidScheme)
    }
}

pub fn validate_status(value: &[u8], mode: StatusValidationMode) -> EntryVerdict {
    let Some(status) = parse_decimal(value) else {
        return reject(ResponseCodeDetail::InvalidStatus);
    };
    let valid = match mode {
        StatusValidationMode::WholeNumber => true,
        StatusValidationMode::ValueRange => (100..=599).contains(&status),
        StatusValidationMode::OfficialStatusCodes => {
            u16::try_from(status).is_ok_and(registry::is_official_status_code)
        }
    };
    if valid {
        EntryVerdict::Accept
    } else {
        reject(ResponseCodeDetail::InvalidStatus)
    }
}

/// Host = uri-host [ ":" port ]. Userinfo is disallowed outright. The host
/// part only needs to be non-empty; reg-name and IP-literal syntax is the
/// routing layer's concern. The port, when present, is 1-5 ASCII digits in
/// [1, 65534]; 65535 stays out of range.
pub fn validate_host(value: &[u8]) -> EntryVerdict {
    if value.contains(&b'@') {
        return reject(ResponseCodeDetail::InvalidHost);
    }

    let (host, port) = match value.iter().position(|byte| *byte == b':') {
        Some(delimiter) => (&value[..delimiter], Some(&value[delimiter + 1..])),
        None => (value, None),
    };

    if host.is_empty() {
        return reject(ResponseCodeDetail::InvalidHost);
    }

    if let Some(port) = port {
        if port.is_empty() || port.len() > 5 {
            return reject(ResponseCodeDetail::InvalidHost);
        }
        let Some(port) = parse_decimal(port) else {
            return reject(ResponseCodeDetail::InvalidHost);
        };
        if port == 0 || port >= 65535 {
            return reject(ResponseCodeDetail::InvalidHost);
        }
    }

    EntryVerdict::Accept
}

/// Content-Length = 1*DIGIT. No numeric ceiling; the grammar alone decides.
pub fn validate_content_length(value: &[u8]) -> EntryVerdict {
    if !value.is_empty() && value.iter().all(u8::is_ascii_digit) {
        EntryVerdict::Accept
    } else {
        reject(ResponseCodeDetail::InvalidContentLength)
    }
}

/// HTTP/1 only understands the chunked coding; anything else is rejected.
pub fn validate_transfer_encoding(value: &[u8]) -> EntryVerdict {
    if value.eq_ignore_ascii_case(b"chunked") {
        EntryVerdict::Accept
    } else {
        reject(ResponseCodeDetail::InvalidTransferEncoding)
    }
}

/// The HTTP/2 `te` header may only carry "trailers".
pub fn validate_te(value: &[u8]) -> EntryVerdict {
    if value.eq_ignore_ascii_case(b"trailers") {
        EntryVerdict::Accept
    } else {
        reject(ResponseCodeDetail::InvalidTe)
    }
}

pub fn validate_generic_header_name(name: &[u8], config: &ValidatorConfig) -> EntryVerdict {
    if name.is_empty() {
        return reject(ResponseCodeDetail::EmptyHeaderName);
    }
    for byte in name {
        if !tables::TOKEN.contains(*byte) {
            return reject(ResponseCodeDetail::InvalidCharacters);
        }
        if *byte == b'_' && config.reject_headers_with_underscores {
            return reject(ResponseCodeDetail::InvalidUnderscore);
        }
    }
    EntryVerdict::Accept
}

pub fn validate_generic_header_value(value: &[u8]) -> EntryVerdict {
    if value.iter().all(|byte| tables::FIELD_VALUE.contains(*byte)) {
        EntryVerdict::Accept
    } else {
        reject(ResponseCodeDetail::InvalidCharacters)
    }
}

/// Character-level `:path` check. Structure (absolute form, dot segments)
/// is the map phase's concern.
pub fn validate_path_characters(value: &[u8]) -> EntryVerdict {
    if value.iter().all(|byte| tables::PATH.contains(*byte)) {
        EntryVerdict::Accept
    } else {
        reject(ResponseCodeDetail::InvalidUrl)
    }
}
