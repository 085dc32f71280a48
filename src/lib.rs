//! dirhttpd - Directory Listing HTTP Server
//!
//! Core library for request parsing, connection handling, and the
//! dispatcher that runs one worker per accepted connection.

pub mod config;
pub mod http;
pub mod listing;
pub mod server;
