//! Path and object-key sanitization.
//!
//! Client-supplied paths are cleaned rather than rejected: unsafe segments
//! are dropped silently and the remainder is used as-is.

use time::OffsetDateTime;

/// Normalize a client-supplied path into a safe key prefix.
///
/// Backslashes become forward slashes; empty, `.`, and `..` segments are
/// dropped. The result never starts or ends with a slash.
pub fn sanitize_path(raw: &str) -> String {
    raw.trim()
        .replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect::<Vec<_>>()
        .join("/")
}

/// Sanitize a file name for use in an object key.
///
/// Runs of characters outside `[A-Za-z0-9._-]` collapse into a single dash.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }
    out
}

/// Build the storage key for an uploaded file.
///
/// Keys are `<base>/<unix-millis>-<name>`; without a base path they fall
/// under a `<year>/<month>/` prefix derived from the upload time (UTC).
/// The millisecond timestamp keeps concurrent uploads of the same file
/// name from colliding.
pub fn build_object_key(base_path: &str, file_name: &str, now: OffsetDateTime) -> String {
    let name = sanitize_file_name(file_name);
    let safe_base = sanitize_path(base_path);
    let prefix = if safe_base.is_empty() {
        format!("{:04}/{:02}/", now.year(), u8::from(now.month()))
    } else {
        format!("{safe_base}/")
    };
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!("{prefix}{millis}-{name}")
}

/// Display name for a key: the trailing path segment.
pub fn display_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Canonical trailing-slash form of a folder path, or empty if nothing
/// survives sanitization.
pub fn normalize_folder_path(raw: &str) -> String {
    let safe = sanitize_path(raw);
    if safe.is_empty() {
        String::new()
    } else {
        format!("{safe}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn sanitize_path_drops_unsafe_segments() {
        assert_eq!(sanitize_path("docs/../pics"), "docs/pics");
        assert_eq!(sanitize_path("/leading/and/trailing/"), "leading/and/trailing");
        assert_eq!(sanitize_path("a\\b\\c"), "a/b/c");
        assert_eq!(sanitize_path("  spaced/./out  "), "spaced/out");
        assert_eq!(sanitize_path("../../.."), "");
        assert_eq!(sanitize_path(""), "");
    }

    #[test]
    fn sanitize_file_name_collapses_runs() {
        assert_eq!(sanitize_file_name("My Photo!.png"), "My-Photo-.png");
        assert_eq!(sanitize_file_name("clean_name-1.jpg"), "clean_name-1.jpg");
        assert_eq!(sanitize_file_name("a   b??c.gif"), "a-b-c.gif");
        assert_eq!(sanitize_file_name(""), "");
    }

    #[test]
    fn object_keys_fall_under_date_prefix_without_base() {
        let now = datetime!(2024-03-03 0:00 UTC);
        assert_eq!(
            build_object_key("", "My Photo!.png", now),
            "2024/03/1709424000000-My-Photo-.png"
        );
    }

    #[test]
    fn object_keys_use_sanitized_base_path() {
        let now = datetime!(2024-03-03 0:00 UTC);
        assert_eq!(
            build_object_key("docs/../pics", "a.png", now),
            "docs/pics/1709424000000-a.png"
        );
    }

    #[test]
    fn display_name_is_trailing_segment() {
        assert_eq!(display_name("2024/03/1709424000000-a.png"), "1709424000000-a.png");
        assert_eq!(display_name("plain.png"), "plain.png");
        assert_eq!(display_name("folder/"), "");
    }

    #[test]
    fn folder_paths_normalize_to_trailing_slash() {
        assert_eq!(normalize_folder_path("albums/summer"), "albums/summer/");
        assert_eq!(normalize_folder_path("albums/summer/"), "albums/summer/");
        assert_eq!(normalize_folder_path("../.."), "");
        assert_eq!(normalize_folder_path(""), "");
    }
}
