#![allow(dead_code)]

use std::path::PathBuf;

use docroot::http::docroot::DocumentRoot;
use docroot::server::context::ServerContext;
use docroot::server::control::Maintenance;

/// A fresh document root under the system temp directory.
pub async fn temp_root() -> DocumentRoot {
    let dir = std::env::temp_dir().join(format!("docroot-test-{}", uuid::Uuid::new_v4()));
    DocumentRoot::bootstrap(&dir).await.unwrap()
}

pub async fn temp_context() -> ServerContext {
    ServerContext::new(temp_root().await, Maintenance::new())
}

/// Writes `contents` to `relative` (slash separated) under the root.
pub fn seed(root: &DocumentRoot, relative: &str, contents: &[u8]) -> PathBuf {
    let path = root.path().join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn multipart_request(method: &str, target: &str, name: &str, content: &str) -> Vec<u8> {
    let body = format!(
        "--XyZ\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n--XyZ--\r\n"
    );
    format!(
        "{method} {target} HTTP/1.1\r\nHost: localhost\r\nContent-Type: multipart/form-data; boundary=XyZ\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

pub fn plain_request(method: &str, target: &str, body: &str) -> Vec<u8> {
    format!(
        "{method} {target} HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}
