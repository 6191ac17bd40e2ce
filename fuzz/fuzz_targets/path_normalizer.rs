#![no_main]

use libfuzzer_sys::fuzz_target;
use uhv::{normalize_path, EscapedSlashesAction, PathNormalizationOptions};

fuzz_target!(|data: &[u8]| {
    let Some((selector, path)) = data.split_first() else {
        return;
    };

    let action = match selector & 0x07 {
        0 => EscapedSlashesAction::ImplementationDefault,
        1 => EscapedSlashesAction::KeepEncoded,
        2 => EscapedSlashesAction::Reject,
        3 => EscapedSlashesAction::UnescapeAndForward,
        _ => EscapedSlashesAction::UnescapeAndRedirect,
    };
    let options = PathNormalizationOptions {
        skip_normalization: false,
        skip_merging_slashes: selector & 0x08 != 0,
        escaped_slashes_action: action,
    };

    if let Ok(first) = normalize_path(path, &options) {
        // Whatever we accept must be absolute and no longer than the input.
        assert_eq!(first.path.first(), Some(&b'/'));
        assert!(first.path.len() <= path.len());

        // Without decoded slashes no structural bytes can appear, so the
        // output must be a fixpoint of the normalizer.
        let decodes_slashes = matches!(
            action,
            EscapedSlashesAction::UnescapeAndForward | EscapedSlashesAction::UnescapeAndRedirect
        );
        if !decodes_slashes {
            assert!(!first.redirect);
            let second =
                normalize_path(&first.path, &options).expect("renormalization must accept");
            assert_eq!(second.path, first.path);
        }
    }
});
