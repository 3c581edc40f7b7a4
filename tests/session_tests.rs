//! Unit tests for the session cookie extractor

use arena_mock_api::api::ExtractSession;
use axum::extract::FromRequestParts;
use axum::http::{HeaderValue, Request, header};
use uuid::Uuid;

async fn extract(request: Request<()>) -> Option<String> {
    let (mut parts, _) = request.into_parts();
    match ExtractSession::from_request_parts(&mut parts, &()).await {
        Ok(ExtractSession(session)) => session,
        Err(never) => match never {},
    }
}

#[tokio::test]
async fn test_extract_session_from_cookie() {
    let session_id = Uuid::new_v4();
    let req = Request::builder()
        .header(header::COOKIE, format!("theme=dark; session_id={session_id}"))
        .body(())
        .unwrap();

    assert_eq!(extract(req).await, Some(session_id.to_string()));
}

#[tokio::test]
async fn test_extract_session_missing_cookie() {
    let req = Request::builder().body(()).unwrap();

    assert_eq!(extract(req).await, None);
}

#[tokio::test]
async fn test_extract_session_ignores_other_cookies() {
    let req = Request::builder()
        .header(header::COOKIE, "theme=dark; lang=fi")
        .body(())
        .unwrap();

    assert_eq!(extract(req).await, None);
}

#[tokio::test]
async fn test_extract_session_keeps_opaque_value() {
    let req = Request::builder()
        .header(header::COOKIE, "session_id=abc123")
        .body(())
        .unwrap();

    assert_eq!(extract(req).await.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn test_extract_session_skips_unreadable_header() {
    let mut req = Request::builder().body(()).unwrap();
    req.headers_mut()
        .append(header::COOKIE, HeaderValue::from_bytes(&[0xFF, 0xFE]).unwrap());
    req.headers_mut()
        .append(header::COOKIE, HeaderValue::from_static("session_id=later"));

    assert_eq!(extract(req).await.as_deref(), Some("later"));
}
