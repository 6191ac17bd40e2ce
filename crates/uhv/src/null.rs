use uhv_http::HeaderMap;

use crate::verdict::{EntryVerdict, MapVerdict};
use crate::HeaderValidator;

/// Passthrough validator for protocols the codec does not want validated
/// (HTTP/3 bridging in this iteration). Accepts everything, mutates
/// nothing.
#[derive(Debug, Default)]
pub struct NullHeaderValidator;

impl NullHeaderValidator {
    pub fn new() -> Self {
        Self
    }
}

impl HeaderValidator for NullHeaderValidator {
    fn validate_request_header_entry(&self, _name: &[u8], _value: &[u8]) -> EntryVerdict {
        EntryVerdict::Accept
    }

    fn validate_response_header_entry(&self, _name: &[u8], _value: &[u8]) -> EntryVerdict {
        EntryVerdict::Accept
    }

    fn validate_request_header_map(&self, _header_map: &mut HeaderMap) -> MapVerdict {
        MapVerdict::Accept
    }

    fn validate_response_header_map(&self, _header_map: &mut HeaderMap) -> MapVerdict {
        MapVerdict::Accept
    }
}
