//! Path resolution and key escaping.
//!
//! Every key maps to exactly one filename component inside the base folder:
//! the key is percent-encoded, and a leading `.` is escaped as well so no key
//! can name the folder itself, its parent, or a hidden file. The empty key
//! takes the name `%`, which percent-encoding never emits on its own.

use std::borrow::Cow;

use fsvault_core::fs::SEPARATOR;

const EMPTY_KEY_NAME: &str = "%";

/// Join segments, split on `/`, drop empty and `.` segments, and rejoin.
/// A leading `/` on the first segment is preserved.
pub fn resolve<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = segments
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("/");

    let body = joined
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    if joined.starts_with(SEPARATOR) {
        format!("/{body}")
    } else {
        body
    }
}

/// Encode a key as a single filesystem-safe name.
pub fn escape_key(key: &str) -> String {
    if key.is_empty() {
        return EMPTY_KEY_NAME.to_string();
    }
    let encoded = urlencoding::encode(key);
    match encoded.strip_prefix('.') {
        Some(rest) => format!("%2E{rest}"),
        None => encoded.into_owned(),
    }
}

/// Invert [`escape_key`]. Names that are not valid percent-encoded UTF-8 are
/// returned unchanged.
pub fn unescape_key(name: &str) -> String {
    if name == EMPTY_KEY_NAME {
        return String::new();
    }
    urlencoding::decode(name)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| name.to_string())
}
