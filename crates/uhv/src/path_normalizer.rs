//! Decode-and-resolve engine for the request `:path`.
//!
//! A single pass over an owned copy of the path with a read cursor and a
//! write cursor. Every rewrite rule shrinks or preserves length, so the
//! write cursor never overtakes the read cursor and the scan stays
//! in-place safe.

use uhv_http::tables;

use crate::config::{EscapedSlashesAction, PathNormalizationOptions};
use crate::verdict::ResponseCodeDetail;

/// Output of a successful normalization. `redirect` is set when an
/// `UnescapeAndRedirect` decode fired and the caller should answer with a
/// redirect to the rewritten path instead of forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    pub path: Vec<u8>,
    pub redirect: bool,
}

enum PercentDecode {
    /// Stays encoded; the hex digits were normalized to uppercase.
    Normalized,
    /// Decoded in place; the current byte must be reprocessed.
    Decoded,
    /// Decoded in place, and the verdict becomes Redirect.
    DecodedRedirect,
    Reject(ResponseCodeDetail),
}

const fn hex_value(digit: u8) -> u8 {
    if digit >= b'A' {
        digit - b'A' + 10
    } else {
        digit - b'0'
    }
}

fn decode_octet(buf: &mut [u8], at: usize, action: EscapedSlashesAction) -> PercentDecode {
    if at + 2 >= buf.len()
        || !buf[at + 1].is_ascii_hexdigit()
        || !buf[at + 2].is_ascii_hexdigit()
    {
        return PercentDecode::Reject(ResponseCodeDetail::InvalidUrl);
    }

    buf[at + 1] = buf[at + 1].to_ascii_uppercase();
    buf[at + 2] = buf[at + 2].to_ascii_uppercase();
    let decoded = hex_value(buf[at + 1]) * 16 + hex_value(buf[at + 2]);

    // An encoded dot stays encoded: decoding it would be indistinguishable
    // from a dot-segment on a second pass, and normalization must be
    // idempotent.
    if decoded != b'.' && tables::UNRESERVED.contains(decoded) {
        buf[at + 2] = decoded;
        return PercentDecode::Decoded;
    }

    if decoded == b'/' || decoded == b'\\' {
        return match action {
            EscapedSlashesAction::ImplementationDefault | EscapedSlashesAction::KeepEncoded => {
                PercentDecode::Normalized
            }
            EscapedSlashesAction::Reject => {
                PercentDecode::Reject(ResponseCodeDetail::PercentEncodedSlash)
            }
            EscapedSlashesAction::UnescapeAndForward => {
                buf[at + 2] = decoded;
                PercentDecode::Decoded
            }
            EscapedSlashesAction::UnescapeAndRedirect => {
                buf[at + 2] = decoded;
                PercentDecode::DecodedRedirect
            }
        };
    }

    // A valid encoding of a reserved (or otherwise significant) byte; it
    // keeps its escape.
    PercentDecode::Normalized
}

/// Resolves dot segments, merges duplicate slashes, normalizes
/// percent-encodings, and applies the configured encoded-slash policy.
/// The path must be in origin form (leading `/`). The map is not touched;
/// callers write the result back on acceptance.
pub fn normalize_path(
    path: &[u8],
    options: &PathNormalizationOptions,
) -> Result<NormalizedPath, ResponseCodeDetail> {
    if path.first() != Some(&b'/') {
        return Err(ResponseCodeDetail::InvalidUrl);
    }

    let mut buf = path.to_vec();
    let mut read = 1_usize;
    let mut write = 1_usize;
    let mut redirect = false;

    while read < buf.len() {
        let byte = buf[read];
        let prev = buf[write - 1];

        match byte {
            b'%' => match decode_octet(&mut buf, read, options.escaped_slashes_action) {
                PercentDecode::Reject(detail) => return Err(detail),
                PercentDecode::Normalized => {
                    for _ in 0..3 {
                        buf[write] = buf[read];
                        write += 1;
                        read += 1;
                    }
                }
                PercentDecode::Decoded => {
                    // The decoded byte sits at the end of the octet; jump
                    // there so it goes through the structural rules below.
                    read += 2;
                }
                PercentDecode::DecodedRedirect => {
                    read += 2;
                    redirect = true;
                }
            },
            b'.' => {
                let segment_ends = matches!(buf.get(read + 1), Some(&b'/') | None);
                if segment_ends && prev == b'/' {
                    // "/./" collapses to "/"
                    read += 2;
                } else if segment_ends && prev == b'.' && write >= 2 && buf[write - 2] == b'/' {
                    // "/../" rewinds past the parent segment
                    write -= 2;
                    if write == 0 {
                        // ".." with no parent
                        return Err(ResponseCodeDetail::InvalidUrl);
                    }
                    while write > 0 && buf[write - 1] != b'/' {
                        write -= 1;
                    }
                    read += 2;
                } else {
                    // a dot inside an ordinary segment
                    buf[write] = byte;
                    write += 1;
                    read += 1;
                }
            }
            b'/' => {
                if prev == b'/' && !options.skip_merging_slashes {
                    read += 1;
                } else {
                    buf[write] = byte;
                    write += 1;
                    read += 1;
                }
            }
            b'?' => {
                // Normalization stops at the query; the tail is copied
                // verbatim and its characters are the entry check's job.
                while read < buf.len() {
                    buf[write] = buf[read];
                    write += 1;
                    read += 1;
                }
            }
            _ => {
                if !tables::PCHAR.contains(byte) {
                    return Err(ResponseCodeDetail::InvalidUrl);
                }
                buf[write] = byte;
                write += 1;
                read += 1;
            }
        }
    }

    buf.truncate(write);
    Ok(NormalizedPath {
        path: buf,
        redirect,
    })
}

#[cfg(test)]
mod tests {
    use super::normalize_path;
    use crate::config::{EscapedSlashesAction, PathNormalizationOptions};
    use crate::verdict::ResponseCodeDetail;

    fn defaults() -> PathNormalizationOptions {
        PathNormalizationOptions::default()
    }

    fn with_action(action: EscapedSlashesAction) -> PathNormalizationOptions {
        PathNormalizationOptions {
            escaped_slashes_action: action,
            ..PathNormalizationOptions::default()
        }
    }

    #[test]
    fn resolves_single_and_double_dot_segments() {
        let normalized = normalize_path(b"/a/./b/../c", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/a/c");
        assert!(!normalized.redirect);
    }

    #[test]
    fn keeps_encoded_dot_encoded() {
        let normalized = normalize_path(b"/a/%2E/b", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/a/%2E/b");

        let normalized = normalize_path(b"/a/%2e/b", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/a/%2E/b");
    }

    #[test]
    fn decodes_unreserved_octets_in_place() {
        let normalized = normalize_path(b"/%61b%7Ec", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/ab~c");
    }

    #[test]
    fn uppercases_retained_escapes() {
        let normalized = normalize_path(b"/a%3fb%2fc", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/a%3Fb%2Fc");
    }

    #[test]
    fn merges_duplicate_slashes_by_default() {
        let normalized = normalize_path(b"/a//b", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/a/b");

        let options = PathNormalizationOptions {
            skip_merging_slashes: true,
            ..defaults()
        };
        let normalized = normalize_path(b"/a//b", &options).expect("must accept");
        assert_eq!(normalized.path, b"/a//b");
    }

    #[test]
    fn dot_dot_at_root_is_rejected() {
        assert_eq!(
            normalize_path(b"/..", &defaults()),
            Err(ResponseCodeDetail::InvalidUrl)
        );
        assert_eq!(
            normalize_path(b"/../a", &defaults()),
            Err(ResponseCodeDetail::InvalidUrl)
        );
    }

    #[test]
    fn parent_segment_resolution_stops_at_root() {
        let normalized = normalize_path(b"/a/..", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/");

        let normalized = normalize_path(b"/a/b/..", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/a/");
    }

    #[test]
    fn trailing_single_dot_is_dropped() {
        let normalized = normalize_path(b"/a/.", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/a/");
    }

    #[test]
    fn interior_dots_are_ordinary_bytes() {
        let normalized = normalize_path(b"/a.b/c..d", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/a.b/c..d");
    }

    #[test]
    fn invalid_hex_rejects() {
        assert_eq!(
            normalize_path(b"/a%ZZ", &defaults()),
            Err(ResponseCodeDetail::InvalidUrl)
        );
        assert_eq!(
            normalize_path(b"/a%2", &defaults()),
            Err(ResponseCodeDetail::InvalidUrl)
        );
        assert_eq!(
            normalize_path(b"/a%", &defaults()),
            Err(ResponseCodeDetail::InvalidUrl)
        );
    }

    #[test]
    fn relative_and_empty_paths_are_rejected() {
        assert_eq!(
            normalize_path(b"a/b", &defaults()),
            Err(ResponseCodeDetail::InvalidUrl)
        );
        assert_eq!(normalize_path(b"", &defaults()), Err(ResponseCodeDetail::InvalidUrl));
    }

    #[test]
    fn bytes_outside_pchar_are_rejected() {
        assert_eq!(
            normalize_path(b"/a b", &defaults()),
            Err(ResponseCodeDetail::InvalidUrl)
        );
        assert_eq!(
            normalize_path(b"/a\\b", &defaults()),
            Err(ResponseCodeDetail::InvalidUrl)
        );
    }

    #[test]
    fn keep_encoded_preserves_escaped_slashes() {
        let normalized =
            normalize_path(b"/a%2Fb", &with_action(EscapedSlashesAction::KeepEncoded))
                .expect("must accept");
        assert_eq!(normalized.path, b"/a%2Fb");
        assert!(!normalized.redirect);
    }

    #[test]
    fn reject_action_flags_the_escaped_slash() {
        assert_eq!(
            normalize_path(b"/a%2Fb", &with_action(EscapedSlashesAction::Reject)),
            Err(ResponseCodeDetail::PercentEncodedSlash)
        );
        assert_eq!(
            normalize_path(b"/a%5Cb", &with_action(EscapedSlashesAction::Reject)),
            Err(ResponseCodeDetail::PercentEncodedSlash)
        );
    }

    #[test]
    fn unescape_and_forward_decodes_without_redirect() {
        let normalized =
            normalize_path(b"/a%2Fb", &with_action(EscapedSlashesAction::UnescapeAndForward))
                .expect("must accept");
        assert_eq!(normalized.path, b"/a/b");
        assert!(!normalized.redirect);
    }

    #[test]
    fn unescape_and_redirect_decodes_and_flags_redirect() {
        let normalized =
            normalize_path(b"/a/%2f/b", &with_action(EscapedSlashesAction::UnescapeAndRedirect))
                .expect("must accept");
        assert_eq!(normalized.path, b"/a/b");
        assert!(normalized.redirect);
    }

    #[test]
    fn unescape_and_redirect_respects_skip_merging_slashes() {
        let options = PathNormalizationOptions {
            skip_merging_slashes: true,
            escaped_slashes_action: EscapedSlashesAction::UnescapeAndRedirect,
            ..PathNormalizationOptions::default()
        };
        let normalized = normalize_path(b"/a%2f/b", &options).expect("must accept");
        assert_eq!(normalized.path, b"/a//b");
        assert!(normalized.redirect);
    }

    #[test]
    fn decoded_backslash_is_not_a_path_byte() {
        assert_eq!(
            normalize_path(b"/a%5Cb", &with_action(EscapedSlashesAction::UnescapeAndForward)),
            Err(ResponseCodeDetail::InvalidUrl)
        );
    }

    #[test]
    fn decoded_slash_opens_a_segment_for_dot_dot_resolution() {
        let normalized = normalize_path(
            b"/a%2F../b",
            &with_action(EscapedSlashesAction::UnescapeAndForward),
        )
        .expect("must accept");
        assert_eq!(normalized.path, b"/b");
    }

    #[test]
    fn dot_lookahead_reads_the_raw_next_byte() {
        // The ".." check looks at the literal next byte; an encoded slash
        // right after it does not end the segment on this pass.
        let normalized = normalize_path(
            b"/a%2F..%2Fb",
            &with_action(EscapedSlashesAction::UnescapeAndForward),
        )
        .expect("must accept");
        assert_eq!(normalized.path, b"/a/../b");
    }

    #[test]
    fn query_terminates_normalization() {
        let normalized = normalize_path(b"/a/../b?x=%2F/../y", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/b?x=%2F/../y");
    }

    #[test]
    fn root_path_normalizes_to_itself() {
        let normalized = normalize_path(b"/", &defaults()).expect("must accept");
        assert_eq!(normalized.path, b"/");
    }
}
