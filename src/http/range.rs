//! HTTP Range request parsing module
//!
//! Single-range `bytes=` requests per RFC 7233. Multi-range requests are
//! answered with the full representation.

/// Inclusive byte range resolved against a known file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub const fn byte_len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for this range
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No Range header, or one we ignore (malformed, multi-range, other unit)
    Full,
    Partial(ByteRange),
    /// Well-formed but outside the file - should return 416
    Unsatisfiable,
}

/// Parse a Range header against a file of `size` bytes
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
pub fn parse_range_header(header: Option<&str>, size: u64) -> RangeOutcome {
    let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };
    if spec.contains(',') {
        return RangeOutcome::Full;
    }
    let Some((start, end)) = spec.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (start, end) = (start.trim(), end.trim());

    if start.is_empty() {
        let Ok(suffix) = end.parse::<u64>() else {
            return RangeOutcome::Full;
        };
        if suffix == 0 || size == 0 {
            return RangeOutcome::Unsatisfiable;
        }
        return RangeOutcome::Partial(ByteRange {
            start: size.saturating_sub(suffix),
            end: size - 1,
        });
    }

    let Ok(start) = start.parse::<u64>() else {
        return RangeOutcome::Full;
    };
    let end = if end.is_empty() {
        None
    } else {
        match end.parse::<u64>() {
            Ok(e) => Some(e),
            Err(_) => return RangeOutcome::Full,
        }
    };

    if end.is_some_and(|e| e < start) {
        // Syntactically invalid range spec; ignore it
        return RangeOutcome::Full;
    }
    if start >= size {
        return RangeOutcome::Unsatisfiable;
    }

    let last = size - 1;
    RangeOutcome::Partial(ByteRange {
        start,
        end: end.map_or(last, |e| e.min(last)),
    })
}
