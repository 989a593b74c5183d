//! Multipart batch response decoder.
//!
//! Splits the outer response body into ordered sub-responses, driven by the
//! boundary token declared in the outer Content-Type. The decoder is a
//! forward-only state machine over a bounds-checked byte cursor:
//!
//! 1. **SeekBoundary**: scan to the next `--{boundary}`; a trailing `--`
//!    means the stream is exhausted
//! 2. **SkipPartHeaders**: discard the multipart wrapper headers
//!    (Content-Type / Content-ID / ...) up to the blank line
//! 3. **ParseStatusLine**: parse the embedded `HTTP/x.y status reason` line
//! 4. **ParseHeaders**: collect `name: value` pairs until a blank line,
//!    retaining duplicates and the received casing
//! 5. **ExtractBody**: everything up to the next boundary occurrence is the
//!    sub-response body
//!
//! No lengths are transmitted, so framing is purely a function of the
//! boundary delimiter; total work is O(body length) with no backtracking.
//! Any malformed or truncated frame is a call-level error carrying the byte
//! offset where parsing stopped — a response whose framing cannot be trusted
//! yields no partial results. (This also pins down the wire format's
//! boundary-collision blind spot: a boundary occurring inside a sub-response
//! body ends that part early and surfaces as a parse failure downstream,
//! never as silent truncation past the end of the buffer.)

use crate::error::{BatchError, Result};
use crate::pipeline::RawResponse;
use bytes::Bytes;

/// Decoder position in the multipart state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    SeekBoundary,
    SkipPartHeaders,
    ParseStatusLine,
    ParseHeaders,
    ExtractBody,
    Done,
}

/// Forward-only cursor over the response body. Every operation is
/// bounds-checked; running past the end is reported as a framing error at
/// the current offset, never a panic.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn looking_at(&self, pat: &[u8]) -> bool {
        self.buf[self.pos..].starts_with(pat)
    }

    /// Absolute index of the next occurrence of `pat` at or after the cursor.
    fn find(&self, pat: &[u8]) -> Option<usize> {
        if pat.is_empty() {
            return None;
        }
        self.buf[self.pos..]
            .windows(pat.len())
            .position(|w| w == pat)
            .map(|p| p + self.pos)
    }

    fn advance_to(&mut self, abs: usize) {
        debug_assert!(abs >= self.pos && abs <= self.buf.len());
        self.pos = abs.min(self.buf.len());
    }

    fn consume(&mut self, pat: &[u8]) -> Result<()> {
        if self.looking_at(pat) {
            self.pos += pat.len();
            Ok(())
        } else {
            Err(BatchError::frame(
                self.pos,
                format!("expected {:?}", String::from_utf8_lossy(pat)),
            ))
        }
    }

    /// Bytes up to the next CRLF; consumes the CRLF as well.
    fn take_line(&mut self) -> Result<&'a [u8]> {
        let end = self
            .find(b"\r\n")
            .ok_or_else(|| BatchError::frame(self.pos, "expected CRLF-terminated line"))?;
        let line = &self.buf[self.pos..end];
        self.pos = end + 2;
        Ok(line)
    }

    fn slice_to(&self, abs: usize) -> &'a [u8] {
        &self.buf[self.pos..abs]
    }
}

/// Splits one multipart response body into its embedded sub-responses.
///
/// Consumed by [`parse`](MultipartParser::parse); construct one per response.
pub struct MultipartParser<'a> {
    cursor: Cursor<'a>,
    delimiter: Vec<u8>,
    parts: Vec<RawResponse>,
    current: Option<RawResponse>,
}

impl<'a> MultipartParser<'a> {
    /// Create a parser over `body` using the boundary declared by the outer
    /// response Content-Type.
    pub fn new(body: &'a [u8], boundary: &str) -> Self {
        MultipartParser {
            cursor: Cursor::new(body),
            delimiter: format!("--{}", boundary).into_bytes(),
            parts: Vec::new(),
            current: None,
        }
    }

    /// Run the state machine to completion and return the sub-responses in
    /// the order their parts appeared, which the protocol guarantees matches
    /// submission order.
    pub fn parse(mut self) -> Result<Vec<RawResponse>> {
        let mut state = ParseState::SeekBoundary;
        loop {
            state = match state {
                ParseState::SeekBoundary => self.seek_boundary()?,
                ParseState::SkipPartHeaders => self.skip_part_headers()?,
                ParseState::ParseStatusLine => self.parse_status_line()?,
                ParseState::ParseHeaders => self.parse_headers()?,
                ParseState::ExtractBody => self.extract_body()?,
                ParseState::Done => return Ok(self.parts),
            };
        }
    }

    fn seek_boundary(&mut self) -> Result<ParseState> {
        let at = self
            .cursor
            .find(&self.delimiter)
            .ok_or_else(|| BatchError::frame(self.cursor.offset(), "expected multipart boundary"))?;
        self.cursor.advance_to(at + self.delimiter.len());
        if self.cursor.looking_at(b"--") {
            Ok(ParseState::Done)
        } else {
            Ok(ParseState::SkipPartHeaders)
        }
    }

    fn skip_part_headers(&mut self) -> Result<ParseState> {
        let at = self.cursor.find(b"\r\n\r\n").ok_or_else(|| {
            BatchError::frame(self.cursor.offset(), "part wrapper headers not terminated")
        })?;
        self.cursor.advance_to(at + 4);
        Ok(ParseState::ParseStatusLine)
    }

    fn parse_status_line(&mut self) -> Result<ParseState> {
        let offset = self.cursor.offset();
        let malformed = || BatchError::frame(offset, "malformed HTTP status line");

        let line = self.cursor.take_line()?;
        let text = std::str::from_utf8(line).map_err(|_| malformed())?;
        let rest = text.strip_prefix("HTTP/").ok_or_else(malformed)?;
        let (version, rest) = rest.split_once(' ').ok_or_else(malformed)?;
        let (major, minor) = version.split_once('.').ok_or_else(malformed)?;
        let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));

        let major: u8 = major.parse().map_err(|_| malformed())?;
        let minor: u8 = minor.parse().map_err(|_| malformed())?;
        let status: u16 = code.parse().map_err(|_| malformed())?;

        self.current = Some(RawResponse::new(major, minor, status, reason));
        Ok(ParseState::ParseHeaders)
    }

    fn parse_headers(&mut self) -> Result<ParseState> {
        loop {
            if self.cursor.looking_at(b"\r\n") {
                self.cursor.consume(b"\r\n")?;
                return Ok(ParseState::ExtractBody);
            }
            let offset = self.cursor.offset();
            let line = self.cursor.take_line()?;
            let text = std::str::from_utf8(line)
                .map_err(|_| BatchError::frame(offset, "header line is not UTF-8"))?;
            let (name, value) = text
                .split_once(':')
                .ok_or_else(|| BatchError::frame(offset, "expected 'name: value' header"))?;
            let part = self.current.as_mut().ok_or_else(|| {
                BatchError::frame(offset, "header outside of a sub-response part")
            })?;
            part.add_header(name, value.trim_start());
        }
    }

    fn extract_body(&mut self) -> Result<ParseState> {
        let offset = self.cursor.offset();
        let mut part = self
            .current
            .take()
            .ok_or_else(|| BatchError::frame(offset, "body outside of a sub-response part"))?;
        let at = self.cursor.find(&self.delimiter).ok_or_else(|| {
            BatchError::frame(offset, "part body not terminated by a boundary")
        })?;
        part.body = Bytes::copy_from_slice(self.cursor.slice_to(at));
        self.cursor.advance_to(at);
        self.parts.push(part);
        Ok(ParseState::SeekBoundary)
    }
}

/// Parse a complete multipart response body into ordered sub-responses.
///
/// # Examples
///
/// ```
/// use storage_batch_http::protocol::decode::parse_multipart_body;
///
/// let body = b"--b\r\n\
///     Content-Type: application/http\r\n\r\n\
///     HTTP/1.1 202 Accepted\r\n\
///     x-ms-request-id: r0\r\n\r\n\
///     \r\n--b--\r\n";
/// let parts = parse_multipart_body(body, "b").unwrap();
/// assert_eq!(parts.len(), 1);
/// assert_eq!(parts[0].status, 202);
/// ```
pub fn parse_multipart_body(body: &[u8], boundary: &str) -> Result<Vec<RawResponse>> {
    MultipartParser::new(body, boundary).parse()
}
