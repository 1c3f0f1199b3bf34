//! Fuzz target: `split_nested`
//!
//! Drives arbitrary text through the depth-aware splitter in both
//! delimiter modes and asserts it never panics and never yields an empty
//! token, even with unbalanced open/close characters.
//!
//! cargo fuzz run fuzz_split

#![no_main]

use cncrelay::text::split_nested;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    for remove in [true, false] {
        let tokens = split_nested(&text, &['|', ' ', ':'], &['<', '['], &['>', ']'], remove);
        assert!(tokens.iter().all(|t| !t.is_empty()), "empty token emitted");

        // Removing delimiters can only shrink the text.
        if remove {
            let total: usize = tokens.iter().map(String::len).sum();
            assert!(total <= text.len());
        }
    }
});
