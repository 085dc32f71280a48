//! Directory listing
//!
//! The server consumes directory enumeration as a capability
//! ([`DirectoryLister`]) and renders the result as a small HTML table.

pub mod lister;
pub mod page;

pub use lister::{DirectoryLister, FsLister};
