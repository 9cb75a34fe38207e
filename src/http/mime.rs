//! MIME type detection module
//!
//! Content-Type comes from the file extension. Files with no known extension
//! are sniffed: valid UTF-8 without NUL bytes is served as plain text.

use std::path::Path;

const OCTET_STREAM: &str = "application/octet-stream";
const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// Number of leading bytes inspected when sniffing
const SNIFF_LEN: usize = 512;

/// Get MIME Content-Type based on file extension (case-insensitive)
///
/// # Examples
/// ```
/// use dirserve::http::mime::content_type_for_extension;
/// assert_eq!(content_type_for_extension("HTML"), Some("text/html; charset=utf-8"));
/// assert_eq!(content_type_for_extension("xyz"), None);
/// ```
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let ty = match extension.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "txt" | "md" => PLAIN_TEXT,
        "csv" => "text/csv; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",

        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "wasm" => "application/wasm",

        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",

        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",

        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        _ => return None,
    };
    Some(ty)
}

/// Content-Type for a file, falling back to sniffing its leading bytes
pub fn content_type(path: &Path, content: &[u8]) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(content_type_for_extension)
        .unwrap_or_else(|| sniff(content))
}

fn sniff(content: &[u8]) -> &'static str {
    let head = &content[..content.len().min(SNIFF_LEN)];
    if head.contains(&0) {
        return OCTET_STREAM;
    }
    match std::str::from_utf8(head) {
        Ok(_) => PLAIN_TEXT,
        // A multi-byte character cut off at the sniff boundary is still text
        Err(e) if e.error_len().is_none() && head.len() == SNIFF_LEN => PLAIN_TEXT,
        Err(_) => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(content_type(Path::new("a/index.html"), b""), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("app.JS"), b""), "text/javascript; charset=utf-8");
        assert_eq!(content_type(Path::new("logo.png"), b"\x89PNG"), "image/png");
    }

    #[test]
    fn test_sniff_unknown_extension() {
        assert_eq!(content_type(Path::new("README"), b"hello world"), PLAIN_TEXT);
        assert_eq!(content_type(Path::new("blob.bin"), b"\x00\x01\x02"), OCTET_STREAM);
        assert_eq!(content_type(Path::new("latin1.dat"), b"caf\xe9 au lait"), OCTET_STREAM);
    }

    #[test]
    fn test_sniff_truncated_multibyte() {
        let mut content = vec![b'a'; SNIFF_LEN - 1];
        content.extend_from_slice("é".as_bytes());
        assert_eq!(sniff(&content), PLAIN_TEXT);
    }
}
