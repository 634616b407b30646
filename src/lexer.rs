//! Splitting a command line into an argument vector.

/// Characters separating tokens on a command line.
pub const WHITESPACE: [char; 3] = [' ', '\t', '\n'];

/// Splits `line` into owned, non-empty tokens.
///
/// Runs of delimiters collapse, so no empty token is ever produced. At most
/// `max_tokens` tokens are returned; anything after that is silently
/// dropped. Each token is cut to `max_token_len` characters.
///
/// A blank line yields an empty vector.
pub fn split_into_tokens(line: &str, max_tokens: usize, max_token_len: usize) -> Vec<String> {
    line.split(WHITESPACE)
        .filter(|word| !word.is_empty())
        .take(max_tokens)
        .map(|word| truncate_chars(word, max_token_len).to_string())
        .collect()
}

/// Returns the prefix of `s` holding at most `max` characters.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
