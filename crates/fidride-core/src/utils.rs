/// Check if all bytes of a byte-string are "word-characters" (`\w` in regex),
/// i.e. ASCII alphanumerics or `_`.
#[must_use]
pub const fn is_all_w_c(s: &[u8]) -> bool {
    let mut i = 0;
    while i < s.len() {
        let b = s[i];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return false;
        }
        i += 1;
    }
    true
}

/// Wrap a string in single quotes so the device's `sh` passes it through verbatim.
#[must_use]
pub fn sh_single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
