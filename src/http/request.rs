use std::borrow::Cow;

use bytes::BytesMut;

/// HTTP request methods.
///
/// Represents the HTTP method/verb of a request. Only GET is served; every
/// other method, including ones the parser does not recognise, is answered
/// with 501 Not Implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other token
    #[default]
    Other,
}

impl Method {
    /// Parses an HTTP method token.
    ///
    /// Matching is case-sensitive; unknown tokens collapse to `Other`.
    ///
    /// # Example
    ///
    /// ```
    /// # use dirhttpd::http::request::Method;
    /// assert_eq!(Method::from_bytes(b"GET"), Method::GET);
    /// assert_eq!(Method::from_bytes(b"get"), Method::Other);
    /// ```
    pub fn from_bytes(token: &[u8]) -> Self {
        match token {
            b"GET" => Method::GET,
            b"HEAD" => Method::HEAD,
            b"POST" => Method::POST,
            b"PUT" => Method::PUT,
            b"DELETE" => Method::DELETE,
            b"OPTIONS" => Method::OPTIONS,
            b"PATCH" => Method::PATCH,
            _ => Method::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Other => "OTHER",
        }
    }
}

/// Per-message state of one connection.
///
/// Filled in from parser events and cleared in place at the start of every
/// message. The URL buffer has a fixed capacity; bytes past it are dropped
/// and the truncation is recorded so the caller can see it.
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: BytesMut,
    max_url_len: usize,
    url_truncated: bool,
    complete: bool,
}

impl Request {
    pub fn new(max_url_len: usize) -> Self {
        Self {
            method: Method::default(),
            url: BytesMut::with_capacity(max_url_len),
            max_url_len,
            url_truncated: false,
            complete: false,
        }
    }

    /// Clears every per-message field.
    pub fn reset(&mut self) {
        self.method = Method::default();
        self.url.clear();
        self.url_truncated = false;
        self.complete = false;
    }

    /// Appends a URL fragment.
    ///
    /// A single trailing `/` on the fragment is dropped first, so `/docs/`
    /// becomes `/docs` and `/` becomes the empty path. No decoding is done.
    pub fn push_url(&mut self, fragment: &[u8]) {
        let fragment = match fragment.split_last() {
            Some((b'/', rest)) => rest,
            _ => fragment,
        };

        let room = self.max_url_len.saturating_sub(self.url.len());
        if fragment.len() > room {
            self.url_truncated = true;
        }
        self.url.extend_from_slice(&fragment[..fragment.len().min(room)]);
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Raw URL bytes as received, after trailing-slash normalisation.
    pub fn url(&self) -> &[u8] {
        &self.url
    }

    /// URL as text; invalid UTF-8 is replaced rather than rejected.
    pub fn path(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.url)
    }

    pub fn url_truncated(&self) -> bool {
        self.url_truncated
    }
}
