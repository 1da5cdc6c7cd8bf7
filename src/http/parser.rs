use crate::http::request::{is_token, Method, Request};

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidMethod,
    InvalidVersion,
    InvalidHeader,
    InvalidContentLength,
    InvalidChunk,
    TooLarge,
    Incomplete,
}

/// Parses one request from the front of `buf` with no size limit.
///
/// On success returns the request and the number of bytes it occupied.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    parse_http_request_limited(buf, usize::MAX)
}

/// Parses one request, refusing anything larger than `max_bytes` in total.
///
/// An incomplete buffer that has already reached the limit can never
/// become a valid request, so it is reported as `TooLarge` rather than
/// `Incomplete`.
pub fn parse_http_request_limited(
    buf: &[u8],
    max_bytes: usize,
) -> Result<(Request, usize), ParseError> {
    match parse_inner(buf, max_bytes) {
        Err(ParseError::Incomplete) if buf.len() >= max_bytes => Err(ParseError::TooLarge),
        Ok((_, consumed)) if consumed > max_bytes => Err(ParseError::TooLarge),
        other => other,
    }
}

fn parse_inner(buf: &[u8], max_bytes: usize) -> Result<(Request, usize), ParseError> {
    // Look for header/body separator
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_start = headers_end + 4;
    let body_bytes = &buf[body_start..];

    let headers_str = std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split(' ');

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;
    if parts.next().is_some() || path.is_empty() {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    if version != "HTTP/1.1" && version != "HTTP/1.0" {
        return Err(ParseError::InvalidVersion);
    }

    // Headers
    let mut headers = Vec::new();

    for line in lines {
        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;

        if !is_token(key) {
            return Err(ParseError::InvalidHeader);
        }

        headers.push((key.to_string(), value.trim().to_string()));
    }

    // Body
    let transfer_encoding = find_header(&headers, "Transfer-Encoding");
    let content_length = declared_content_length(&headers)?;

    let (body, body_len) = match (transfer_encoding, content_length) {
        (Some(_), Some(_)) => return Err(ParseError::InvalidRequest),
        (Some(te), None) => {
            let last = te.rsplit(',').next().unwrap_or("").trim();
            if !last.eq_ignore_ascii_case("chunked") {
                return Err(ParseError::InvalidRequest);
            }
            decode_chunked(body_bytes, max_bytes)?
        }
        (None, content_length) => {
            let content_length = content_length.unwrap_or(0);

            if content_length > max_bytes.saturating_sub(body_start) {
                return Err(ParseError::TooLarge);
            }

            if body_bytes.len() < content_length {
                return Err(ParseError::Incomplete);
            }

            (body_bytes[..content_length].to_vec(), content_length)
        }
    };

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    Ok((request, body_start + body_len))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// The declared Content-Length, if any.
///
/// Values must be plain decimal digits, and repeated headers must agree.
fn declared_content_length(headers: &[(String, String)]) -> Result<Option<usize>, ParseError> {
    let mut length = None;

    for (_, value) in headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
    {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidContentLength);
        }
        let parsed = value
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength)?;

        match length {
            Some(prev) if prev != parsed => return Err(ParseError::InvalidRequest),
            _ => length = Some(parsed),
        }
    }

    Ok(length)
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Decodes a chunked body from the front of `buf`.
///
/// Returns the decoded bytes and how many raw bytes the encoding used,
/// trailer section included. A single chunk larger than `max_bytes` is
/// rejected before any of its data is awaited.
fn decode_chunked(buf: &[u8], max_bytes: usize) -> Result<(Vec<u8>, usize), ParseError> {
    let mut body = Vec::new();
    let mut pos = 0;

    loop {
        let line_len = find_crlf(&buf[pos..]).ok_or(ParseError::Incomplete)?;
        let line =
            std::str::from_utf8(&buf[pos..pos + line_len]).map_err(|_| ParseError::InvalidChunk)?;
        // chunk extensions are ignored
        let size_str = line.split(';').next().unwrap_or("").trim();
        if size_str.is_empty() || !size_str.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseError::InvalidChunk);
        }
        let size = usize::from_str_radix(size_str, 16).map_err(|_| ParseError::InvalidChunk)?;
        if size > max_bytes {
            return Err(ParseError::TooLarge);
        }
        pos += line_len + 2;

        if size == 0 {
            break;
        }

        let data_end = pos.checked_add(size).ok_or(ParseError::InvalidChunk)?;
        let chunk_end = data_end.checked_add(2).ok_or(ParseError::InvalidChunk)?;
        if buf.len() < chunk_end {
            return Err(ParseError::Incomplete);
        }
        if &buf[data_end..chunk_end] != b"\r\n" {
            return Err(ParseError::InvalidChunk);
        }

        body.extend_from_slice(&buf[pos..data_end]);
        pos = chunk_end;
    }

    // Trailer fields, terminated by an empty line
    loop {
        let line_len = find_crlf(&buf[pos..]).ok_or(ParseError::Incomplete)?;
        pos += line_len + 2;
        if line_len == 0 {
            return Ok((body, pos));
        }
    }
}
