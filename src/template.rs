// src/template.rs

//! Shell-style `$NAME` / `${NAME}` placeholder expansion for URL templates.
//!
//! Rules:
//! - `$NAME` takes the longest run of ASCII letters, digits and `_`.
//! - `${NAME}` takes everything up to the closing brace.
//! - A single special character (`*#$@!?-` or a digit) after `$` or inside
//!   `${…}` is a name of its own, so `$$` looks up `"$"`.
//! - `$` followed by anything else (or at the end) is kept verbatim.
//! - `${}` and an unterminated `${` are dropped from the output.
//!
//! Expansion is a single pass: substituted values are never re-scanned.

/// Expand every placeholder in `template` through `lookup`.
pub fn expand<F>(template: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> String,
{
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut copied = 0;
    let mut j = 0;

    while j < bytes.len() {
        if bytes[j] == b'$' && j + 1 < bytes.len() {
            out.push_str(&template[copied..j]);
            let rest = &template[j + 1..];
            match placeholder_name(rest) {
                (Some(name), width) => {
                    out.push_str(&lookup(name));
                    j += width;
                }
                (None, 0) => out.push('$'),
                (None, width) => j += width,
            }
            copied = j + 1;
        }
        j += 1;
    }

    out.push_str(&template[copied..]);
    out
}

/// Parse the placeholder right after a `$`.
///
/// Returns the name (if any) and how many bytes of `s` it consumed. A
/// `None` name with a non-zero width means malformed syntax to be dropped.
fn placeholder_name(s: &str) -> (Option<&str>, usize) {
    let bytes = s.as_bytes();

    if bytes[0] == b'{' {
        if bytes.len() > 2 && is_special(bytes[1]) && bytes[2] == b'}' {
            return (Some(&s[1..2]), 3);
        }
        return match bytes.iter().skip(1).position(|b| *b == b'}') {
            Some(0) => (None, 2),
            Some(offset) => {
                let end = offset + 1;
                (Some(&s[1..end]), end + 1)
            }
            None => (None, 1),
        };
    }

    if is_special(bytes[0]) {
        return (Some(&s[0..1]), 1);
    }

    let len = bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    if len == 0 { (None, 0) } else { (Some(&s[..len]), len) }
}

fn is_special(b: u8) -> bool {
    matches!(b, b'*' | b'#' | b'$' | b'@' | b'!' | b'?' | b'-') || b.is_ascii_digit()
}
