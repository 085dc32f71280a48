use bytes::Bytes;

use crate::http::request::Method;

/// Longest request or header line kept; further bytes of the line are dropped.
pub const MAX_LINE_LEN: usize = 8192;

/// Coarse position of the parser within a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for the first byte of a message.
    Idle,
    /// Reading the request line (method, target, version).
    ParsingUrl,
    /// Reading header lines.
    Headers,
    /// Discarding `Content-Length` body bytes.
    Body,
    /// A message just finished; the next byte starts a new one.
    Complete,
}

/// Something the parser recognised while consuming bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    MessageBegin,
    Url(Bytes),
    HeadersComplete { method: Method },
    MessageComplete { keep_alive: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    RequestLine,
    Headers,
    Body { remaining: usize },
    Complete,
}

/// Incremental HTTP/1.x request parser.
///
/// Bytes may arrive split at any position; state is carried between calls to
/// [`RequestParser::execute`], so the events produced do not depend on how
/// the stream was chunked.
#[derive(Debug)]
pub struct RequestParser {
    phase: Phase,
    line: Vec<u8>,
    method: Method,
    version: (u8, u8),
    connection_close: bool,
    connection_keep_alive: bool,
    content_length: usize,
    keep_alive: bool,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            line: Vec::with_capacity(256),
            method: Method::default(),
            version: (1, 1),
            connection_close: false,
            connection_keep_alive: false,
            content_length: 0,
            keep_alive: false,
        }
    }

    pub fn state(&self) -> ParserState {
        match self.phase {
            Phase::Idle => ParserState::Idle,
            Phase::RequestLine => ParserState::ParsingUrl,
            Phase::Headers => ParserState::Headers,
            Phase::Body { .. } => ParserState::Body,
            Phase::Complete => ParserState::Complete,
        }
    }

    /// Keep-alive decision for the most recent message.
    ///
    /// HTTP/1.1 and later keep the connection unless `Connection: close` was
    /// sent; older versions keep it only with `Connection: keep-alive`.
    pub fn should_keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Protocol version of the current message as `(major, minor)`.
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Consumes `data` and returns the events it completed.
    pub fn execute(&mut self, data: &[u8]) -> Vec<ParseEvent> {
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            match self.phase {
                Phase::Idle | Phase::Complete => {
                    let byte = data[pos];
                    if byte == b'\r' || byte == b'\n' {
                        pos += 1;
                        continue;
                    }
                    self.begin_message();
                    events.push(ParseEvent::MessageBegin);
                }

                Phase::RequestLine | Phase::Headers => {
                    let rest = &data[pos..];
                    match rest.iter().position(|&b| b == b'\n') {
                        Some(end) => {
                            self.push_line(&rest[..end]);
                            pos += end + 1;
                            self.finish_line(&mut events);
                        }
                        None => {
                            self.push_line(rest);
                            pos = data.len();
                        }
                    }
                }

                Phase::Body { remaining } => {
                    let take = remaining.min(data.len() - pos);
                    pos += take;
                    if take == remaining {
                        self.finish_message(&mut events);
                    } else {
                        self.phase = Phase::Body { remaining: remaining - take };
                    }
                }
            }
        }

        events
    }

    fn begin_message(&mut self) {
        self.phase = Phase::RequestLine;
        self.line.clear();
        self.method = Method::default();
        self.version = (1, 1);
        self.connection_close = false;
        self.connection_keep_alive = false;
        self.content_length = 0;
    }

    fn push_line(&mut self, bytes: &[u8]) {
        let room = MAX_LINE_LEN.saturating_sub(self.line.len());
        self.line.extend_from_slice(&bytes[..bytes.len().min(room)]);
    }

    fn finish_line(&mut self, events: &mut Vec<ParseEvent>) {
        let mut line = std::mem::take(&mut self.line);
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        match self.phase {
            Phase::RequestLine => {
                self.parse_request_line(&line, events);
                // HTTP/0.9 requests carry no headers.
                if self.version == (0, 9) {
                    self.finish_headers(events);
                } else {
                    self.phase = Phase::Headers;
                }
            }
            Phase::Headers if line.is_empty() => self.finish_headers(events),
            Phase::Headers => self.parse_header(&line),
            _ => {}
        }

        line.clear();
        self.line = line;
    }

    fn parse_request_line(&mut self, line: &[u8], events: &mut Vec<ParseEvent>) {
        let mut parts = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|part| !part.is_empty());

        self.method = parts.next().map(Method::from_bytes).unwrap_or_default();

        if let Some(target) = parts.next() {
            events.push(ParseEvent::Url(Bytes::copy_from_slice(target)));
        }

        self.version = parts.next().map(parse_version).unwrap_or((0, 9));
    }

    fn parse_header(&mut self, line: &[u8]) {
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            return;
        };
        let name = line[..colon].trim_ascii();
        let value = line[colon + 1..].trim_ascii();

        if name.eq_ignore_ascii_case(b"connection") {
            for token in value.split(|&b| b == b',').map(<[u8]>::trim_ascii) {
                if token.eq_ignore_ascii_case(b"close") {
                    self.connection_close = true;
                } else if token.eq_ignore_ascii_case(b"keep-alive") {
                    self.connection_keep_alive = true;
                }
            }
        } else if name.eq_ignore_ascii_case(b"content-length") {
            self.content_length = std::str::from_utf8(value)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
        }
    }

    fn finish_headers(&mut self, events: &mut Vec<ParseEvent>) {
        self.keep_alive = if self.version >= (1, 1) {
            !self.connection_close
        } else {
            self.connection_keep_alive && !self.connection_close
        };

        events.push(ParseEvent::HeadersComplete { method: self.method });

        if self.content_length > 0 {
            self.phase = Phase::Body {
                remaining: self.content_length,
            };
        } else {
            self.finish_message(events);
        }
    }

    fn finish_message(&mut self, events: &mut Vec<ParseEvent>) {
        self.phase = Phase::Complete;
        events.push(ParseEvent::MessageComplete {
            keep_alive: self.keep_alive,
        });
    }
}

fn parse_version(token: &[u8]) -> (u8, u8) {
    let digits = match token.strip_prefix(b"HTTP/") {
        Some(rest) => rest,
        None => return (0, 9),
    };
    match digits {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            (major - b'0', minor - b'0')
        }
        [major] if major.is_ascii_digit() => (major - b'0', 0),
        _ => (0, 9),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let mut parser = RequestParser::new();
        let events = parser.execute(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");

        assert_eq!(
            events,
            vec![
                ParseEvent::MessageBegin,
                ParseEvent::Url(Bytes::from_static(b"/")),
                ParseEvent::HeadersComplete { method: Method::GET },
                ParseEvent::MessageComplete { keep_alive: true },
            ]
        );
        assert_eq!(parser.state(), ParserState::Complete);
    }

    #[test]
    fn version_tokens() {
        assert_eq!(parse_version(b"HTTP/1.1"), (1, 1));
        assert_eq!(parse_version(b"HTTP/1.0"), (1, 0));
        assert_eq!(parse_version(b"HTTP/2"), (2, 0));
        assert_eq!(parse_version(b"garbage"), (0, 9));
    }
}
