//! HTTP server.
//!
//! Serves the rendered pages, the sitemap, and the booking endpoint from one
//! axum [`Router`]. Content is read from disk on every request; repository
//! calls run on the blocking pool.
//!
//! ## Routes
//!
//! ```text
//! GET  /                   home
//! GET  /artists            artist listing
//! GET  /artists/{slug}     artist profile, 404 when unknown
//! GET  /portfolio          portfolio, optional ?style=<s>
//! GET  /portfolio/{slug}   piece detail, 404 when unknown
//! GET  /booking            booking form
//! GET  /sitemap.xml        sitemap
//! POST /api/contact        booking request (JSON)
//! *                        404 page
//! ```
//!
//! The booking endpoint keys its rate limit on the first `x-forwarded-for`
//! entry, so the server is expected to run behind a proxy that sets it.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use maud::Markup;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::config::SiteConfig;
use crate::contact::{ContactService, ContactSink, Submission};
use crate::render;
use crate::repository::ContentRepository;
use crate::sitemap;

/// Rate-limit key used when no forwarding header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<ContentRepository>,
    pub config: Arc<SiteConfig>,
    pub contact: Arc<ContactService>,
}

impl AppState {
    pub fn new(repository: ContentRepository, config: SiteConfig, sink: Arc<dyn ContactSink>) -> Self {
        let contact = ContactService::from_config(&config.contact, sink);
        Self {
            repository: Arc::new(repository),
            config: Arc::new(config),
            contact: Arc::new(contact),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/artists", get(artists_handler))
        .route("/artists/{slug}", get(artist_handler))
        .route("/portfolio", get(portfolio_handler))
        .route("/portfolio/{slug}", get(piece_handler))
        .route("/booking", get(booking_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .route("/api/contact", post(contact_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C.
///
/// Also runs a background task that drops expired rate-limit windows once
/// per window length.
pub async fn serve(state: AppState) -> Result<(), ServerError> {
    let addr = (state.config.server.host.clone(), state.config.server.port);
    let listener = TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "listening");

    let sweeper = spawn_sweeper(state.contact.clone());
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    sweeper.abort();

    info!("server stopped");
    Ok(())
}

fn spawn_sweeper(contact: Arc<ContactService>) -> JoinHandle<()> {
    let period = contact.limiter().window();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = contact.limiter().sweep();
            if removed > 0 {
                debug!(removed, "expired rate-limit windows dropped");
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// First `x-forwarded-for` entry, trimmed; [`UNKNOWN_CLIENT`] when absent or empty.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

// ============================================================================
// Handlers
// ============================================================================

fn page(status: StatusCode, markup: Markup) -> Response {
    (status, Html(markup.into_string())).into_response()
}

fn server_error_page(state: &AppState) -> Response {
    page(
        StatusCode::INTERNAL_SERVER_ERROR,
        render::server_error(&state.config.site),
    )
}

/// Run a repository query on the blocking pool.
async fn query<T, F>(state: &AppState, f: F) -> Result<T, Response>
where
    F: FnOnce(&ContentRepository) -> T + Send + 'static,
    T: Send + 'static,
{
    let repository = state.repository.clone();
    tokio::task::spawn_blocking(move || f(&repository))
        .await
        .map_err(|e| {
            error!(error = %e, "repository task failed");
            server_error_page(state)
        })
}

async fn home_handler(State(state): State<AppState>) -> Response {
    match query(&state, |r| (r.featured_artists(), r.all_portfolio_pieces())).await {
        Ok((featured, pieces)) => page(
            StatusCode::OK,
            render::home(&state.config.site, &featured, &pieces),
        ),
        Err(response) => response,
    }
}

async fn artists_handler(State(state): State<AppState>) -> Response {
    match query(&state, |r| r.all_artists()).await {
        Ok(artists) => page(StatusCode::OK, render::artists(&state.config.site, &artists)),
        Err(response) => response,
    }
}

async fn artist_handler(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let found = query(&state, move |r| {
        r.artist(&slug).map(|artist| {
            let pieces = r.portfolio_pieces_by_artist(&artist.slug);
            (artist, pieces)
        })
    })
    .await;

    match found {
        Ok(Some((artist, pieces))) => page(
            StatusCode::OK,
            render::artist(&state.config.site, &artist, &pieces),
        ),
        Ok(None) => not_found_page(&state),
        Err(response) => response,
    }
}

#[derive(Debug, Deserialize)]
pub struct PortfolioQuery {
    pub style: Option<String>,
}

async fn portfolio_handler(
    State(state): State<AppState>,
    Query(params): Query<PortfolioQuery>,
) -> Response {
    let style = params.style.filter(|s| !s.trim().is_empty());
    let filter = style.clone();
    let listing = query(&state, move |r| {
        let pieces = match &filter {
            Some(s) => r.portfolio_pieces_by_style(s),
            None => r.all_portfolio_pieces(),
        };
        (pieces, r.all_styles())
    })
    .await;

    match listing {
        Ok((pieces, styles)) => page(
            StatusCode::OK,
            render::portfolio(&state.config.site, &pieces, &styles, style.as_deref()),
        ),
        Err(response) => response,
    }
}

async fn piece_handler(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let found = query(&state, move |r| {
        r.portfolio_piece(&slug).map(|piece| {
            let artist = r.artist(&piece.artist.to_lowercase());
            (piece, artist)
        })
    })
    .await;

    match found {
        Ok(Some((piece, artist))) => page(
            StatusCode::OK,
            render::piece(&state.config.site, &piece, artist.as_ref()),
        ),
        Ok(None) => not_found_page(&state),
        Err(response) => response,
    }
}

async fn booking_handler(State(state): State<AppState>) -> Response {
    page(StatusCode::OK, render::booking(&state.config.site))
}

async fn sitemap_handler(State(state): State<AppState>) -> Response {
    match query(&state, |r| r.all_portfolio_pieces()).await {
        Ok(pieces) => {
            let entries = sitemap::entries(state.config.site.base_url(), &pieces, Utc::now());
            (
                [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
                sitemap::render(&entries),
            )
                .into_response()
        }
        Err(response) => response,
    }
}

async fn contact_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Submission {
    let key = client_key(&headers);
    state.contact.submit(&key, &body)
}

fn not_found_page(state: &AppState) -> Response {
    page(StatusCode::NOT_FOUND, render::not_found(&state.config.site))
}

async fn not_found_handler(State(state): State<AppState>) -> Response {
    not_found_page(&state)
}

impl IntoResponse for Submission {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Submission::Accepted(_) => (
                StatusCode::OK,
                json!({ "success": true, "message": "Mensaje enviado correctamente" }),
            ),
            Submission::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": "Demasiadas solicitudes. Intenta de nuevo más tarde." }),
            ),
            Submission::Invalid(errors) => (StatusCode::BAD_REQUEST, json!({ "errors": errors })),
            Submission::Spam => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Mensaje rechazado" }),
            ),
            Submission::Malformed | Submission::Failed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Error al procesar la solicitud" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
