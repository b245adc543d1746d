mod common;

use common::{multipart_request, plain_request, seed, temp_context, temp_root};
use docroot::http::handler::respond;
use docroot::http::request::Incoming;
use docroot::http::response::{Response, StatusCode};

async fn send(ctx: &docroot::server::context::ServerContext, raw: impl Into<Vec<u8>>) -> Response {
    respond(&Incoming::Message(raw.into().into()), ctx).await
}

#[tokio::test]
async fn test_get_html_file() {
    let ctx = temp_context().await;
    seed(&ctx.root, "index.html", b"<h1>home</h1>");

    let response = send(&ctx, "GET /index.html HTTP/1.1\r\n\r\n").await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("text/html"));
    assert_eq!(response.header("Content-Length"), Some("13"));
    assert_eq!(response.body, b"<h1>home</h1>".to_vec());
}

#[tokio::test]
async fn test_get_root_serves_index() {
    let ctx = temp_context().await;
    seed(&ctx.root, "index.htm", b"root page");

    let response = send(&ctx, "GET / HTTP/1.1\r\n\r\n").await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"root page".to_vec());
}

#[tokio::test]
async fn test_get_png_and_txt() {
    let ctx = temp_context().await;
    seed(&ctx.root, "img/logo.png", &[0x89, b'P', b'N', b'G']);
    seed(&ctx.root, "notes.TXT", b"notes");

    let png = send(&ctx, "GET /img/logo.png HTTP/1.1\r\n\r\n").await;
    assert_eq!(png.header("Content-Type"), Some("image/png"));
    assert_eq!(png.body, vec![0x89, b'P', b'N', b'G']);

    let txt = send(&ctx, "GET /notes.TXT HTTP/1.1\r\n\r\n").await;
    assert_eq!(txt.header("Content-Type"), Some("text/plain"));
}

#[tokio::test]
async fn test_get_unknown_extension_is_unsupported() {
    let ctx = temp_context().await;
    seed(&ctx.root, "photo.jpg", b"jpeg");

    let response = send(&ctx, "GET /photo.jpg HTTP/1.1\r\n\r\n").await;
    assert_eq!(response.status, StatusCode::UnsupportedMediaType);
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let ctx = temp_context().await;

    let response = send(&ctx, "GET /missing.html HTTP/1.1\r\n\r\n").await;

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.body.len(), 48);
    assert_eq!(response.header("Content-Length"), Some("48"));
}

#[tokio::test]
async fn test_get_directory_is_forbidden() {
    let ctx = temp_context().await;

    let response = send(&ctx, "GET /post/ HTTP/1.1\r\n\r\n").await;
    assert_eq!(response.status, StatusCode::Forbidden);
}

#[tokio::test]
async fn test_get_outside_root_is_forbidden() {
    let ctx = temp_context().await;

    let response = send(&ctx, "GET /../../../../etc/passwd HTTP/1.1\r\n\r\n").await;

    assert_eq!(response.status, StatusCode::Forbidden);
    assert_eq!(response.body, b"<html><body><h1>403 Forbidden</h1></body></html>".to_vec());
}

#[tokio::test]
async fn test_put_then_get_round_trip() {
    let ctx = temp_context().await;

    let created = send(&ctx, plain_request("PUT", "/put/new.txt", "fresh\r\ncontent")).await;
    assert_eq!(created.status, StatusCode::Created);
    assert_eq!(created.header("Location"), Some("/put/new.txt"));

    let fetched = send(&ctx, "GET /put/new.txt HTTP/1.1\r\n\r\n").await;
    assert_eq!(fetched.status, StatusCode::Ok);
    assert_eq!(fetched.body, b"fresh\r\ncontent".to_vec());
}

#[tokio::test]
async fn test_put_overwrites_existing_file() {
    let ctx = temp_context().await;
    let path = seed(&ctx.root, "put/old.txt", b"a much longer original body");

    let response = send(&ctx, plain_request("PUT", "/put/old.txt", "short")).await;

    assert_eq!(response.status, StatusCode::NoContent);
    assert_eq!(std::fs::read(path).unwrap(), b"short".to_vec());
}

#[tokio::test]
async fn test_put_to_directory_is_forbidden() {
    let ctx = temp_context().await;

    let response = send(&ctx, plain_request("PUT", "/put", "x")).await;
    assert_eq!(response.status, StatusCode::Forbidden);
}

#[tokio::test]
async fn test_put_into_missing_directory_is_forbidden() {
    let ctx = temp_context().await;

    // The write fails, which degrades to 403.
    let response = send(&ctx, plain_request("PUT", "/nowhere/a.txt", "x")).await;
    assert_eq!(response.status, StatusCode::Forbidden);
}

#[tokio::test]
async fn test_post_appends_in_order() {
    let ctx = temp_context().await;
    let path = seed(&ctx.root, "post/post-test.txt", b"start\r\n");

    let first = send(&ctx, plain_request("POST", "/post/post-test.txt", "one\n")).await;
    let second = send(&ctx, plain_request("POST", "/post/post-test.txt", "two\n")).await;

    assert_eq!(first.status, StatusCode::NoContent);
    assert_eq!(second.status, StatusCode::NoContent);
    assert_eq!(std::fs::read(path).unwrap(), b"start\r\none\r\ntwo\r\n".to_vec());
}

#[tokio::test]
async fn test_post_creates_missing_file() {
    let ctx = temp_context().await;

    let response = send(&ctx, plain_request("POST", "/post/fresh.txt", "hello")).await;

    assert_eq!(response.status, StatusCode::Created);
    assert_eq!(response.header("Location"), Some("/post/fresh.txt"));
    assert_eq!(std::fs::read(ctx.root.path().join("post/fresh.txt")).unwrap(), b"hello".to_vec());
}

#[tokio::test]
async fn test_post_upload_never_overwrites() {
    let ctx = temp_context().await;
    let original = seed(&ctx.root, "post/photo.png", b"original");

    let response = send(&ctx, multipart_request("POST", "/post/upload", "photo.png", "replacement")).await;

    assert_eq!(response.status, StatusCode::Created);
    assert_eq!(std::fs::read(&original).unwrap(), b"original".to_vec());

    let location = response.header("Location").unwrap();
    assert!(location.starts_with("/post/copy-"), "{location}");
    assert!(location.ends_with("-photo.png"), "{location}");

    let copy = ctx.root.path().join(location.trim_start_matches('/'));
    assert_eq!(std::fs::read(copy).unwrap(), b"replacement".to_vec());
}

#[tokio::test]
async fn test_post_upload_copies_are_unique() {
    let ctx = temp_context().await;
    seed(&ctx.root, "post/doc.txt", b"original");

    let a = send(&ctx, multipart_request("POST", "/post/x", "doc.txt", "a")).await;
    let b = send(&ctx, multipart_request("POST", "/post/x", "doc.txt", "b")).await;

    assert_ne!(a.header("Location"), b.header("Location"));
}

#[tokio::test]
async fn test_post_outside_post_dir_is_forbidden() {
    let ctx = temp_context().await;

    for target in ["/put/a.txt", "/a.txt", "/post", "/post/../a.txt"] {
        let response = send(&ctx, plain_request("POST", target, "x")).await;
        assert_eq!(response.status, StatusCode::Forbidden, "{target}");
    }
    assert!(!ctx.root.path().join("a.txt").exists());
}

#[tokio::test]
async fn test_post_to_directory_is_forbidden() {
    let ctx = temp_context().await;
    std::fs::create_dir_all(ctx.root.path().join("post/sub")).unwrap();

    let response = send(&ctx, plain_request("POST", "/post/sub", "x")).await;
    assert_eq!(response.status, StatusCode::Forbidden);
}

#[cfg(unix)]
#[tokio::test]
async fn test_writes_through_symlinked_directory_are_forbidden() {
    let ctx = temp_context().await;
    let outside = temp_root().await;
    std::os::unix::fs::symlink(outside.path(), ctx.root.path().join("put/link")).unwrap();
    std::os::unix::fs::symlink(outside.path(), ctx.root.path().join("post/link")).unwrap();

    let put = send(&ctx, plain_request("PUT", "/put/link/x.txt", "x")).await;
    let post = send(&ctx, plain_request("POST", "/post/link/x.txt", "x")).await;
    let upload = send(&ctx, multipart_request("POST", "/post/link/upload", "y.txt", "y")).await;

    assert_eq!(put.status, StatusCode::Forbidden);
    assert_eq!(post.status, StatusCode::Forbidden);
    assert_eq!(upload.status, StatusCode::Forbidden);
    assert!(!outside.path().join("x.txt").exists());
    assert!(!outside.path().join("y.txt").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_put_to_dangling_symlink_is_forbidden() {
    let ctx = temp_context().await;
    let outside = temp_root().await;
    let escaped = outside.path().join("created.txt");
    std::os::unix::fs::symlink(&escaped, ctx.root.path().join("put/dangling.txt")).unwrap();

    let response = send(&ctx, plain_request("PUT", "/put/dangling.txt", "x")).await;

    assert_eq!(response.status, StatusCode::Forbidden);
    assert!(!escaped.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_put_through_symlink_inside_root_is_allowed() {
    let ctx = temp_context().await;
    std::fs::create_dir_all(ctx.root.path().join("put/real")).unwrap();
    std::os::unix::fs::symlink(ctx.root.path().join("put/real"), ctx.root.path().join("put/alias")).unwrap();

    let response = send(&ctx, plain_request("PUT", "/put/alias/a.txt", "inside")).await;

    assert_eq!(response.status, StatusCode::Created);
    assert_eq!(std::fs::read(ctx.root.path().join("put/real/a.txt")).unwrap(), b"inside".to_vec());
}

#[tokio::test]
async fn test_fixed_status_responses() {
    let ctx = temp_context().await;
    let cases = [
        ("DELETE /index.html HTTP/1.1\r\n\r\n", StatusCode::MethodNotAllowed),
        ("OPTIONS * HTTP/1.1\r\n\r\n", StatusCode::NotImplemented),
        ("HEAD / HTTP/1.1\r\n\r\n", StatusCode::NotImplemented),
        ("TRACE / HTTP/1.1\r\n\r\n", StatusCode::NotImplemented),
        ("CONNECT host:443 HTTP/1.1\r\n\r\n", StatusCode::NotImplemented),
        ("BREW /pot HTTP/1.1\r\n\r\n", StatusCode::BadRequest),
        ("garbage\r\n\r\n", StatusCode::BadRequest),
        ("GET / HTTP/1.0\r\n\r\n", StatusCode::HttpVersionNotSupported),
    ];

    for (raw, expected) in cases {
        let response = send(&ctx, raw).await;
        assert_eq!(response.status, expected, "{raw:?}");
    }
}

#[tokio::test]
async fn test_pseudo_requests() {
    let ctx = temp_context().await;

    let paused = respond(&Incoming::Pause, &ctx).await;
    assert_eq!(paused.status, StatusCode::ServiceUnavailable);

    let failed = respond(&Incoming::Error, &ctx).await;
    assert_eq!(failed.status, StatusCode::InternalServerError);
}
