//! Response generation
//!
//! Turns a completed request into exactly one response. GET requests are
//! answered with a directory listing; the listing is gathered before any
//! byte is written so a missing directory still gets a complete 404.

use std::sync::Arc;

use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::listing::DirectoryLister;
use crate::listing::page;

const NOT_IMPLEMENTED_BODY: &[u8] = b"501 Not Implemented\r\n";
const NOT_FOUND_BODY: &[u8] = b"404 Not Found\r\n";
const INTERNAL_ERROR_BODY: &[u8] = b"500 Internal Server Error\r\n";

pub struct Responder {
    lister: Arc<dyn DirectoryLister>,
    server_name: String,
}

impl Responder {
    pub fn new(lister: Arc<dyn DirectoryLister>, server_name: impl Into<String>) -> Self {
        Self {
            lister,
            server_name: server_name.into(),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Builds the response for a completed request.
    pub async fn respond(&self, request: &Request, keep_alive: bool) -> Response {
        let path = request.path().into_owned();

        if request.url_truncated() {
            tracing::warn!(path = %path, "Request URL truncated");
        }

        let response = if request.method() != Method::GET {
            self.finish(StatusCode::NotImplemented, "text/plain", NOT_IMPLEMENTED_BODY.to_vec(), keep_alive)
        } else {
            let lister = Arc::clone(&self.lister);
            let dir = path.clone();
            match tokio::task::spawn_blocking(move || lister.list(&dir)).await {
                Ok(Ok(entries)) => {
                    let body = page::render(&path, &entries).into_bytes();
                    self.finish(StatusCode::Ok, "text/html", body, keep_alive)
                }
                Ok(Err(e)) => {
                    tracing::debug!(path = %path, error = %e, "Cannot open directory");
                    self.finish(StatusCode::NotFound, "text/plain", NOT_FOUND_BODY.to_vec(), keep_alive)
                }
                Err(e) => {
                    tracing::error!(path = %path, error = %e, "Directory listing task failed");
                    self.finish(
                        StatusCode::InternalServerError,
                        "text/plain",
                        INTERNAL_ERROR_BODY.to_vec(),
                        keep_alive,
                    )
                }
            }
        };

        tracing::info!(
            method = request.method().as_str(),
            path = %path,
            status = response.status.as_u16(),
            keep_alive,
            "Request served"
        );

        response
    }

    fn finish(
        &self,
        status: StatusCode,
        content_type: &str,
        body: Vec<u8>,
        keep_alive: bool,
    ) -> Response {
        ResponseBuilder::new(status)
            .header("Server", self.server_name.as_str())
            .header("Content-Type", content_type)
            .header("Content-Length", body.len().to_string())
            .header("Connection", if keep_alive { "Keep-Alive" } else { "Close" })
            .body(body)
            .build()
    }
}
