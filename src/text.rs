//! Text primitives shared by the dispatcher and the status tracker.
//!
//! Everything here works on `char`s and is allocation-light.  The one
//! non-trivial piece is [`split_nested`], which only treats a delimiter as
//! a split point while outside every open/close pair.  GRBL status lines
//! embed sub-delimited fields inside `<...>` and `[...]`, so a single
//! depth-aware splitter covers every parsing need in the crate.

/// `true` if the first character of `s` is one of `chars`.
///
/// An empty string never matches.
pub fn starts_with_any(s: &str, chars: &[char]) -> bool {
    s.chars().next().is_some_and(|first| chars.contains(&first))
}

/// `true` if any character of `s` is one of `chars`.
pub fn contains_any(s: &str, chars: &[char]) -> bool {
    s.chars().any(|c| chars.contains(&c))
}

/// Return `s` with every occurrence of `chars` removed.
pub fn strip_chars(s: &str, chars: &[char]) -> String {
    s.chars().filter(|c| !chars.contains(c)).collect()
}

/// Split `s` on `delimiters`, dropping the delimiters and empty tokens.
pub fn split(s: &str, delimiters: &[char]) -> Vec<String> {
    split_nested(s, delimiters, &[], &[], true)
}

/// Depth-aware split.
///
/// Every character in `open` raises the nesting depth and every character
/// in `close` lowers it.  A delimiter only ends a token at depth zero.
///
/// With `remove_delimiter == false` the delimiter is kept as the last
/// character of the token it terminates, but only when that token already
/// holds something; a delimiter seen on an empty token is carried into the
/// next token instead.  The final character of the input always closes the
/// current token.  Empty tokens are never emitted.
pub fn split_nested(
    s: &str,
    delimiters: &[char],
    open: &[char],
    close: &[char],
    remove_delimiter: bool,
) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if open.contains(&c) {
            depth += 1;
        }
        if close.contains(&c) {
            depth -= 1;
        }

        let mut end = false;
        if depth == 0 && delimiters.contains(&c) {
            if remove_delimiter {
                end = true;
            } else if !current.is_empty() {
                end = true;
                current.push(c);
            }
        }

        let is_last = chars.peek().is_none();
        if is_last && !end {
            end = true;
            current.push(c);
        }

        if end {
            if !current.is_empty() {
                tokens.push(core::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }

    tokens
}
