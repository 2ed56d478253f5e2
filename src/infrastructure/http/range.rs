/// An inclusive byte range resolved against a resource length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn content_range(&self, total: usize) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No usable range; serve the whole resource
    Full,
    Partial(ByteRange),
    Unsatisfiable,
}

/// Interpret a `Range` header value for a resource of `total` bytes.
///
/// Only single `bytes=` ranges are honoured; anything malformed or
/// multi-range falls back to the full resource.
pub fn parse_range(header: Option<&str>, total: usize) -> RangeRequest {
    let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeRequest::Full;
    };
    if spec.contains(',') {
        return RangeRequest::Full;
    }
    let Some((start, end)) = spec.trim().split_once('-') else {
        return RangeRequest::Full;
    };

    match (start.trim(), end.trim()) {
        ("", "") => RangeRequest::Full,
        ("", suffix) => match suffix.parse::<usize>() {
            Ok(0) => RangeRequest::Unsatisfiable,
            Ok(_) if total == 0 => RangeRequest::Unsatisfiable,
            Ok(suffix) => RangeRequest::Partial(ByteRange {
                start: total.saturating_sub(suffix),
                end: total - 1,
            }),
            Err(_) => RangeRequest::Full,
        },
        (start, end) => {
            let Ok(start) = start.parse::<usize>() else {
                return RangeRequest::Full;
            };
            let end = if end.is_empty() {
                None
            } else {
                match end.parse::<usize>() {
                    Ok(end) if end >= start => Some(end),
                    _ => return RangeRequest::Full,
                }
            };

            if start >= total {
                return RangeRequest::Unsatisfiable;
            }

            RangeRequest::Partial(ByteRange {
                start,
                end: end.map_or(total - 1, |end| end.min(total - 1)),
            })
        }
    }
}
