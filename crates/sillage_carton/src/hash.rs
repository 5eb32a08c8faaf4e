//! Content fingerprinting using xxHash3.
//!
//! Declaration-level change detection compares fingerprints of the
//! *normalized* defining syntax, so formatting and comment edits never
//! register as changes. Front-ends may bring their own hasher as long as
//! equal normalized inputs keep producing equal fingerprints; the graph
//! engine only ever compares fingerprints for string equality.

use xxhash_rust::xxh3::xxh3_64;

/// Compute a 64-bit hash of the given string using xxHash3.
#[inline]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

/// Convert a hash to a hex string (16 characters).
#[inline]
pub fn hash_to_hex(hash: u64) -> String {
    format!("{:016x}", hash)
}

/// Strip comments and collapse whitespace runs to single spaces.
///
/// String, char and template literals are passed through untouched so a
/// `//` inside a string does not truncate the body. The result is trimmed;
/// source that is all comments and whitespace normalizes to the empty
/// string.
pub fn normalize_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' | '`' => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                quote = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for n in chars.by_ref() {
                    if n == '\n' {
                        break;
                    }
                }
                pending_space = true;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
                pending_space = true;
            }
            c if c.is_whitespace() => {
                pending_space = true;
            }
            c => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    out
}

/// Fingerprint of the normalized source, as 16 hex characters.
///
/// Source that normalizes to nothing yields the empty string, the
/// "not computed" marker used by declarations with no hashable body.
pub fn content_hash(source: &str) -> String {
    let normalized = normalize_source(source);
    if normalized.is_empty() {
        return String::new();
    }
    hash_to_hex(hash_str(&normalized))
}
