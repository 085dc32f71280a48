//! Tests for directory listing and response generation

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dirhttpd::http::request::{Method, Request};
use dirhttpd::http::responder::Responder;
use dirhttpd::http::response::StatusCode;
use dirhttpd::listing::page::{self, EPILOGUE, PREAMBLE};
use dirhttpd::listing::{DirectoryLister, FsLister};

/// In-memory lister that counts how often it is asked.
#[derive(Default)]
struct StaticLister {
    dirs: HashMap<String, Vec<String>>,
    calls: AtomicUsize,
}

impl StaticLister {
    fn with_dir(mut self, path: &str, entries: &[&str]) -> Self {
        self.dirs
            .insert(path.to_string(), entries.iter().map(|e| e.to_string()).collect());
        self
    }
}

impl DirectoryLister for StaticLister {
    fn list(&self, path: &str) -> io::Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.dirs
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

fn request(method: Method, url: &[u8]) -> Request {
    let mut req = Request::new(128);
    req.set_method(method);
    req.push_url(url);
    req.mark_complete();
    req
}

#[test]
fn test_row_format() {
    assert_eq!(
        page::row("/docs", "a.txt"),
        "<tr><td><a href=\"/docs/a.txt\">a.txt</a></td></tr>\r\n"
    );
}

#[test]
fn test_row_escapes_name_and_path() {
    assert_eq!(
        page::row("/a&b", "<x>\"y\""),
        "<tr><td><a href=\"/a&amp;b/&lt;x&gt;&quot;y&quot;\">&lt;x&gt;&quot;y&quot;</a></td></tr>\r\n"
    );
}

#[test]
fn test_render_skips_only_dot_and_keeps_order() {
    let html = page::render("", &["b.txt", ".", "..", "a.txt", ".hidden"]);

    assert!(html.starts_with(PREAMBLE));
    assert!(html.ends_with(EPILOGUE));
    assert!(!html.contains("href=\"/.\""));

    let rows: Vec<&str> = html.lines().filter(|l| l.starts_with("<tr>")).collect();
    assert_eq!(
        rows,
        vec![
            "<tr><td><a href=\"/b.txt\">b.txt</a></td></tr>",
            "<tr><td><a href=\"/..\">..</a></td></tr>",
            "<tr><td><a href=\"/a.txt\">a.txt</a></td></tr>",
            "<tr><td><a href=\"/.hidden\">.hidden</a></td></tr>",
        ]
    );
}

#[test]
fn test_fs_lister_lists_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
    std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let lister = FsLister::new(dir.path());
    let mut entries = lister.list("").unwrap();

    assert_eq!(&entries[..2], &[".".to_string(), "..".to_string()]);
    entries.sort();
    assert_eq!(entries, vec![".", "..", "a.txt", "b.txt", "sub"]);
}

#[test]
fn test_fs_lister_resolves_below_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub").join("inner"), b"").unwrap();

    let lister = FsLister::new(dir.path());

    assert_eq!(lister.resolve("/sub"), dir.path().join("sub"));
    assert_eq!(lister.resolve(""), dir.path());
    assert!(lister.list("/sub").unwrap().contains(&"inner".to_string()));
}

#[test]
fn test_fs_lister_rejects_files_and_missing_paths() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("file"), b"x").unwrap();

    let lister = FsLister::new(dir.path());

    assert!(lister.list("/file").is_err());
    assert!(lister.list("/missing").is_err());
}

#[tokio::test]
async fn test_get_lists_directory() {
    let lister = Arc::new(StaticLister::default().with_dir("", &[".", "..", "a.txt", "b.txt"]));
    let responder = Responder::new(lister.clone(), "dirhttpd");

    let response = responder.respond(&request(Method::GET, b"/"), false).await;
    let body = String::from_utf8(response.body.clone()).unwrap();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("text/html"));
    assert_eq!(response.header("Connection"), Some("Close"));
    assert_eq!(response.header("Server"), Some("dirhttpd"));
    assert_eq!(
        response.header("Content-Length"),
        Some(response.body.len().to_string().as_str())
    );
    assert!(body.contains("<a href=\"/a.txt\">a.txt</a>"));
    assert!(body.contains("<a href=\"/b.txt\">b.txt</a>"));
    assert!(!body.contains("<a href=\"/.\">"));
    assert_eq!(lister.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_subdirectory_uses_normalised_path() {
    let lister = Arc::new(StaticLister::default().with_dir("/docs", &["x"]));
    let responder = Responder::new(lister, "dirhttpd");

    let response = responder.respond(&request(Method::GET, b"/docs/"), true).await;
    let body = String::from_utf8(response.body.clone()).unwrap();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Connection"), Some("Keep-Alive"));
    assert!(body.contains("<a href=\"/docs/x\">x</a>"));
}

#[tokio::test]
async fn test_non_get_never_lists() {
    let lister = Arc::new(StaticLister::default().with_dir("", &["a"]));
    let responder = Responder::new(lister.clone(), "dirhttpd");

    for method in [Method::POST, Method::HEAD, Method::DELETE, Method::Other] {
        for keep_alive in [true, false] {
            let response = responder.respond(&request(method, b"/"), keep_alive).await;

            assert_eq!(response.status, StatusCode::NotImplemented);
            assert_eq!(response.body, b"501 Not Implemented\r\n".to_vec());
            assert_eq!(response.header("Content-Length"), Some("21"));
            assert_eq!(response.header("Content-Type"), Some("text/plain"));
            assert_eq!(
                response.header("Connection"),
                Some(if keep_alive { "Keep-Alive" } else { "Close" })
            );
        }
    }

    assert_eq!(lister.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_directory_is_a_complete_404() {
    let responder = Responder::new(Arc::new(StaticLister::default()), "dirhttpd");

    let response = responder.respond(&request(Method::GET, b"/nope"), false).await;

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(
        response.header("Content-Length"),
        Some(response.body.len().to_string().as_str())
    );
}
