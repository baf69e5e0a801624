mod common;

use sitan::files::Dispatcher;
use sitan::http::request::{Request, RequestBuilder};
use sitan::http::response::StatusCode;

use common::TempRoot;

fn get(target: &str) -> Request {
    RequestBuilder::new().target(target).host("x").build().unwrap()
}

fn get_and_close(target: &str) -> Request {
    RequestBuilder::new().target(target).host("x").close(true).build().unwrap()
}

#[tokio::test]
async fn test_serves_existing_file() {
    let root = TempRoot::new("dispatch-ok");
    root.write("index.html", b"<html>home</html>");
    let dispatcher = Dispatcher::new(root.path(), "index.html").unwrap();

    let response = dispatcher.dispatch(get("/index.html")).await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.file_path, Some(dispatcher.root().join("index.html")));
    assert_eq!(response.headers.get("Content-Length"), Some("17"));
    assert_eq!(
        response.headers.get("Content-Type"),
        Some("text/html; charset=utf-8")
    );
    assert!(response.headers.contains_key("Date"));
    assert!(response.headers.contains_key("Last-Modified"));
    assert_eq!(response.headers.get("Connection"), None);
    assert_eq!(response.request.as_ref().map(|r| r.target.as_str()), Some("/index.html"));
}

#[tokio::test]
async fn test_last_modified_is_http_date() {
    let root = TempRoot::new("dispatch-date");
    root.write("a.txt", b"a");
    let dispatcher = Dispatcher::new(root.path(), "index.html").unwrap();

    let response = dispatcher.dispatch(get("/a.txt")).await;

    let last_modified = response.headers.get("Last-Modified").unwrap();
    assert!(httpdate::parse_http_date(last_modified).is_ok());
    assert!(last_modified.ends_with(" GMT"));
    let date = response.headers.get("Date").unwrap();
    assert!(httpdate::parse_http_date(date).is_ok());
}

#[tokio::test]
async fn test_directory_index_is_served() {
    let root = TempRoot::new("dispatch-index");
    root.write("docs/index.html", b"docs");
    let dispatcher = Dispatcher::new(root.path(), "index.html").unwrap();

    let response = dispatcher.dispatch(get("/docs/")).await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(
        response.file_path,
        Some(dispatcher.root().join("docs").join("index.html"))
    );
}

#[tokio::test]
async fn test_close_flag_is_copied() {
    let root = TempRoot::new("dispatch-close");
    root.write("a.css", b"body{}");
    let dispatcher = Dispatcher::new(root.path(), "index.html").unwrap();

    let response = dispatcher.dispatch(get_and_close("/a.css")).await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.headers.get("Connection"), Some("close"));
    assert_eq!(response.headers.get("Content-Type"), Some("text/css; charset=utf-8"));
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let root = TempRoot::new("dispatch-missing");
    let dispatcher = Dispatcher::new(root.path(), "index.html").unwrap();

    let response = dispatcher.dispatch(get("/nope.html")).await;

    assert_eq!(response.status, StatusCode::NotFound);
    assert!(response.file_path.is_none());
    assert!(response.headers.contains_key("Date"));
    assert_eq!(response.headers.get("Connection"), None);
    assert_eq!(response.headers.get("Content-Length"), None);
}

#[tokio::test]
async fn test_directory_is_not_found() {
    let root = TempRoot::new("dispatch-dir");
    root.mkdir("assets");
    let dispatcher = Dispatcher::new(root.path(), "index.html").unwrap();

    let response = dispatcher.dispatch(get("/assets")).await;
    assert_eq!(response.status, StatusCode::NotFound);

    // A directory without an index file.
    let response = dispatcher.dispatch(get_and_close("/assets/")).await;
    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.headers.get("Connection"), Some("close"));
}

#[tokio::test]
async fn test_traversal_is_bad_request() {
    let root = TempRoot::new("dispatch-escape");
    root.write("inner/ok.txt", b"ok");
    let dispatcher = Dispatcher::new(root.path().join("inner"), "index.html").unwrap();

    let response = dispatcher.dispatch(get("/../secret")).await;

    assert_eq!(response.status, StatusCode::BadRequest);
    assert_eq!(response.headers.get("Connection"), Some("close"));
    assert!(response.headers.contains_key("Date"));
    assert!(response.request.is_none());
    assert!(response.file_path.is_none());
}

#[tokio::test]
async fn test_relative_target_is_bad_request() {
    let root = TempRoot::new("dispatch-relative");
    let dispatcher = Dispatcher::new(root.path(), "index.html").unwrap();

    let response = dispatcher.dispatch(get("index.html")).await;
    assert_eq!(response.status, StatusCode::BadRequest);
}

#[tokio::test]
async fn test_root_is_made_absolute_and_clean() {
    let dispatcher = Dispatcher::new("./public/../site", "index.html").unwrap();

    assert!(dispatcher.root().is_absolute());
    assert!(dispatcher.root().ends_with("site"));
    assert!(!dispatcher.root().to_string_lossy().contains(".."));
}
