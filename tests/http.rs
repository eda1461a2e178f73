//! End-to-end requests against the router, served from `fixtures/content`.
//!
//! The fixture tree is only read here, never written.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use inklab::config::load_config;
use inklab::contact::{ContactForm, ContactSink, SinkError};
use inklab::repository::ContentRepository;
use inklab::server::{AppState, router};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct Inbox {
    received: Mutex<Vec<ContactForm>>,
}

impl ContactSink for Inbox {
    fn deliver(&self, form: &ContactForm) -> Result<(), SinkError> {
        self.received.lock().unwrap().push(form.clone());
        Ok(())
    }
}

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/content")
}

fn app_with(inbox: Arc<Inbox>) -> Router {
    let root = fixtures();
    let config = load_config(&root).unwrap();
    router(AppState::new(ContentRepository::new(root), config, inbox))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post(app: Router, forwarded_for: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json");
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    let response = app
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn booking(message: &str) -> Value {
    json!({
        "name": "Laura Gil",
        "email": "laura@example.com",
        "phone": "+34 600 123 456",
        "bodyArea": "Antebrazo",
        "size": "10x15 cm",
        "message": message,
        "reference": "https://example.com/koi.jpg"
    })
}

#[tokio::test]
async fn every_page_route_renders() {
    let app = app_with(Arc::default());
    for uri in [
        "/",
        "/artists",
        "/artists/marta-ruiz",
        "/portfolio",
        "/portfolio?style=Color",
        "/portfolio/geometric-mandala",
        "/booking",
    ] {
        let (status, html) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(html.starts_with("<!DOCTYPE html>"), "{uri}");
        assert!(html.contains("| Inklab Mastery</title>") || uri == "/", "{uri}");
    }
}

#[tokio::test]
async fn malformed_piece_is_not_served() {
    let app = app_with(Arc::default());

    let (status, _) = get(app.clone(), "/portfolio/unfinished-draft").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listing) = get(app, "/portfolio").await;
    assert!(!listing.contains("unfinished-draft"));
    assert!(listing.contains("/portfolio/koi-sleeve"));
}

#[tokio::test]
async fn artists_listed_in_configured_order() {
    let app = app_with(Arc::default());
    let (_, html) = get(app, "/artists").await;

    let ana = html.find("/artists/ana-perez").unwrap();
    let luis = html.find("/artists/luis-gomez").unwrap();
    let marta = html.find("/artists/marta-ruiz").unwrap();
    assert!(ana < luis && luis < marta);
}

#[tokio::test]
async fn accepted_booking_reaches_sink() {
    let inbox = Arc::new(Inbox::default());
    let app = app_with(inbox.clone());

    let (status, body) = post(app, Some("203.0.113.9"), booking("Quiero un koi en el brazo")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "Mensaje enviado correctamente" }));
    let received = inbox.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].reference.as_deref(), Some("https://example.com/koi.jpg"));
}

#[tokio::test]
async fn requests_without_forwarding_share_one_window() {
    let app = app_with(Arc::default());

    for _ in 0..5 {
        let (status, _) = post(app.clone(), None, booking("Quiero un koi en el brazo")).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = post(app.clone(), None, booking("Quiero un koi en el brazo")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // a forwarded client has its own window
    let (status, _) = post(app, Some("203.0.113.10"), booking("Quiero un koi en el brazo")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_booking_lists_every_failing_field() {
    let inbox = Arc::new(Inbox::default());
    let app = app_with(inbox.clone());

    let (status, body) = post(
        app,
        Some("203.0.113.11"),
        json!({ "name": "L", "email": "nope", "message": "Quiero un koi en el brazo" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_object().unwrap();
    let mut fields: Vec<&str> = errors.keys().map(String::as_str).collect();
    fields.sort_unstable();
    assert_eq!(fields, vec!["bodyArea", "email", "name", "phone", "size"]);
    assert!(inbox.received.lock().unwrap().is_empty());
}
