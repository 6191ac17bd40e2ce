#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use uhv::{
    HeaderMap, HeaderValidator, HeaderValidatorFactory, MapVerdict, NoopStreamInfo, Protocol,
    ValidatorConfig,
};

fn build_map(data: &[u8]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for line in data.split(|byte| *byte == b'\n') {
        let split = line.iter().position(|byte| *byte == b'=').unwrap_or(line.len());
        let name = line[..split].to_vec();
        let value = line.get(split + 1..).unwrap_or_default().to_vec();
        map.append(name, value);
    }
    map
}

fuzz_target!(|data: &[u8]| {
    let Some((selector, rest)) = data.split_first() else {
        return;
    };
    let protocol = match selector & 0x03 {
        0 => Protocol::Http09,
        1 => Protocol::Http1,
        2 => Protocol::Http2,
        _ => Protocol::Other,
    };

    let factory = HeaderValidatorFactory::new(ValidatorConfig::default());
    let validator = factory.create(protocol, Arc::new(NoopStreamInfo));

    let mut request = build_map(rest);
    let original = request.clone();
    // A rejected map must come back byte-identical.
    if let MapVerdict::Reject(_) = validator.validate_request_header_map(&mut request) {
        assert_eq!(request, original);
    }

    let mut response = build_map(rest);
    let original = response.clone();
    if let MapVerdict::Reject(_) = validator.validate_response_header_map(&mut response) {
        assert_eq!(response, original);
    }
});
