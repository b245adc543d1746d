//! Byte-level request parsing.
//!
//! Everything here is pure: it works on the framed message bytes and knows
//! nothing about the filesystem. Offsets are explicit and every lookup that
//! can miss returns `Option`/`Result` instead of slicing blindly.

const HEADERS_END: &[u8] = b"\r\n\r\n";
const BOUNDARY_MARKER: &[u8] = b"boundary=";

/// The only protocol version the server speaks.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Outcome of splitting the request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestLine {
    /// Three fields and an `HTTP/1.1` version token.
    Parsed { method: String, target: String },
    /// A well-formed `HTTP/x` token other than `HTTP/1.1`.
    UnsupportedVersion(String),
    /// Fewer than three fields, or a version token that isn't HTTP at all.
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipartError {
    /// `boundary=` carried an empty value.
    EmptyBoundary,
    /// Fewer than two delimiter occurrences after the boundary declaration.
    MissingDelimiter,
    /// The body part has no header terminator.
    MissingPartHeaders,
    /// The part headers carry no `name="..."` parameter.
    MissingName,
    /// The part name would address something other than a plain file.
    InvalidName,
}

/// The single body part extracted from a multipart payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: Option<String>,
    pub content: Vec<u8>,
}

pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    find(buf, HEADERS_END)
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub(crate) fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Splits the first line of `buf` into method, target and version.
pub fn parse_request_line(buf: &[u8]) -> RequestLine {
    let line_end = buf.iter().position(|&b| b == b'\n').unwrap_or(buf.len());
    let line = String::from_utf8_lossy(&buf[..line_end]);

    let mut parts = line.splitn(3, ' ');
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return RequestLine::Malformed;
    };

    let version = version.trim();
    if version == HTTP_VERSION {
        RequestLine::Parsed {
            method: method.to_string(),
            target: target.to_string(),
        }
    } else if version.starts_with("HTTP/") {
        RequestLine::UnsupportedVersion(version.to_string())
    } else {
        RequestLine::Malformed
    }
}

/// Looks up a header in a header block (request line included).
///
/// Names compare case-insensitively; the value is everything after the colon
/// up to the line break, trimmed.
pub fn header_value(headers: &[u8], name: &str) -> Option<String> {
    headers
        .split(|&b| b == b'\n')
        .skip(1)
        .filter_map(|line| {
            let colon = line.iter().position(|&b| b == b':')?;
            let (key, value) = line.split_at(colon);
            key.trim_ascii()
                .eq_ignore_ascii_case(name.as_bytes())
                .then(|| String::from_utf8_lossy(value[1..].trim_ascii()).into_owned())
        })
        .next()
}

/// Returns the body after the top-level header terminator with every bare
/// `\n` widened to `\r\n`. Existing CRLF pairs are left alone.
pub fn plain_payload(message: &[u8]) -> Vec<u8> {
    let body = match find_headers_end(message) {
        Some(end) => &message[end + HEADERS_END.len()..],
        None => return Vec::new(),
    };
    normalize_line_endings(body)
}

pub fn normalize_line_endings(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut prev = None;
    for &b in body {
        if b == b'\n' && prev != Some(b'\r') {
            out.push(b'\r');
        }
        out.push(b);
        prev = Some(b);
    }
    out
}

/// Finds a `boundary=` declaration anywhere in the message.
///
/// Returns the boundary value and the offset just past it, where the search
/// for delimiters begins.
pub fn find_boundary(message: &[u8]) -> Option<(Vec<u8>, usize)> {
    let start = find(message, BOUNDARY_MARKER)? + BOUNDARY_MARKER.len();
    let len = message[start..]
        .iter()
        .position(|&b| matches!(b, b'\r' | b'\n' | b';'))
        .unwrap_or(message.len() - start);

    let raw = message[start..start + len].trim_ascii();
    let value = raw
        .strip_prefix(b"\"")
        .and_then(|v| v.strip_suffix(b"\""))
        .unwrap_or(raw);

    Some((value.to_vec(), start + len))
}

/// Extracts the body part between the first and last boundary delimiter.
///
/// `from` is where the delimiter scan starts (just past the boundary
/// declaration).
pub fn parse_multipart(message: &[u8], boundary: &[u8], from: usize) -> Result<Part, MultipartError> {
    if boundary.is_empty() {
        return Err(MultipartError::EmptyBoundary);
    }

    let mut delimiter = b"\r\n--".to_vec();
    delimiter.extend_from_slice(boundary);

    let rest = &message[from.min(message.len())..];
    let first = find(rest, &delimiter).ok_or(MultipartError::MissingDelimiter)?;
    let last = rfind(rest, &delimiter).ok_or(MultipartError::MissingDelimiter)?;
    let part_start = first + delimiter.len();
    if last < part_start {
        return Err(MultipartError::MissingDelimiter);
    }

    let part = &rest[part_start..last];
    let headers_end = find_headers_end(part).ok_or(MultipartError::MissingPartHeaders)?;

    Ok(Part {
        name: part_name(&part[..headers_end]),
        content: part[headers_end + HEADERS_END.len()..].to_vec(),
    })
}

/// Pulls the exact `name="..."` parameter out of the part headers.
fn part_name(part_headers: &[u8]) -> Option<String> {
    part_headers
        .split(|&b| matches!(b, b';' | b'\n'))
        .filter_map(|param| param.trim_ascii().strip_prefix(b"name="))
        .map(|value| {
            let value = value.strip_prefix(b"\"").unwrap_or(value);
            let end = value.iter().position(|&b| b == b'"').unwrap_or(value.len());
            String::from_utf8_lossy(&value[..end]).into_owned()
        })
        .next()
}

/// Checks that a part name can stand in as a single path segment.
pub fn validate_part_name(name: &str) -> Result<&str, MultipartError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(MultipartError::InvalidName);
    }
    Ok(name)
}
