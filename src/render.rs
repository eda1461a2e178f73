//! HTML page rendering.
//!
//! Every page is a pure function from repository data to [`Markup`]; the
//! server decides which data to load and which status code to send.
//!
//! ## Pages
//!
//! | Route | Renderer | Title |
//! |-------|----------|-------|
//! | `/` | [`home`] | site title |
//! | `/artists` | [`artists`] | `Artistas \| <name>` |
//! | `/artists/{slug}` | [`artist`] | `<artist> \| <name>` |
//! | `/portfolio` | [`portfolio`] | `Portfolio \| <name>` |
//! | `/portfolio/{slug}` | [`piece`] | `<piece> \| <name>` |
//! | `/booking` | [`booking`] | `Reservar cita \| <name>` |
//! | anything else | [`not_found`] | `Página no encontrada \| <name>` |
//!
//! ## Assets
//!
//! Embedded at compile time and inlined into each page:
//! - `static/style.css`: Base styles
//! - `static/booking.js`: Submits the booking form as JSON and shows field errors
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating;
//! front-matter strings are escaped, markdown bodies are rendered by
//! pulldown-cmark and inserted as-is.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};

use crate::config::SiteInfo;
use crate::entity::{Artist, PortfolioPiece};

const CSS: &str = include_str!("../static/style.css");
const BOOKING_JS: &str = include_str!("../static/booking.js");

/// Number of pieces shown on the home page.
pub const HOME_RECENT_PIECES: usize = 3;

/// Head metadata for one page.
#[derive(Debug, Clone, Copy)]
pub struct PageMeta<'a> {
    /// `None` for the home page, which uses the site title as-is.
    pub title: Option<&'a str>,
    pub description: &'a str,
    /// Site-relative path, starting with `/`.
    pub path: &'a str,
    pub image: Option<&'a str>,
}

/// `"<page> | <site name>"`, or the site title for the home page.
pub fn page_title(site: &SiteInfo, title: Option<&str>) -> String {
    match title {
        Some(t) => format!("{t} | {}", site.name),
        None => site.title.clone(),
    }
}

fn og_locale(locale: &str) -> String {
    locale.replace('-', "_")
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(site: &SiteInfo, meta: PageMeta<'_>, current: &str, content: Markup) -> Markup {
    let title = page_title(site, meta.title);
    let canonical = format!("{}{}", site.base_url(), meta.path);

    html! {
        (DOCTYPE)
        html lang=(site.lang()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                meta name="description" content=(meta.description);
                link rel="canonical" href=(canonical);
                meta property="og:type" content="website";
                meta property="og:site_name" content=(site.name);
                meta property="og:locale" content=(og_locale(&site.locale));
                meta property="og:title" content=(title);
                meta property="og:description" content=(meta.description);
                meta property="og:url" content=(canonical);
                @if let Some(image) = meta.image {
                    meta property="og:image" content=(absolute(site, image));
                }
                style { (PreEscaped(CSS)) }
            }
            body {
                (site_header(site, current))
                (content)
                footer.site-footer {
                    p { "© " (site.name) }
                }
            }
        }
    }
}

fn absolute(site: &SiteInfo, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{}{}", site.base_url(), path)
    }
}

const NAV: &[(&str, &str)] = &[
    ("/portfolio", "Portfolio"),
    ("/artists", "Artistas"),
    ("/booking", "Reservar"),
];

fn site_header(site: &SiteInfo, current: &str) -> Markup {
    html! {
        header.site-header {
            a.brand href="/" { (site.name) }
            nav.site-nav {
                ul {
                    @for (href, label) in NAV {
                        @let is_current = current == *href;
                        li class=[is_current.then_some("current")] {
                            a href=(href) { (label) }
                        }
                    }
                }
            }
        }
    }
}

/// Render a markdown body to HTML.
pub fn markdown(body: &str) -> Markup {
    let parser = Parser::new(body);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    PreEscaped(out)
}

fn is_video(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".mp4") || lower.ends_with(".webm")
}

fn avatar(artist: &Artist) -> Markup {
    html! {
        @if is_video(&artist.avatar) {
            video.avatar src=(artist.avatar) autoplay muted loop playsinline {}
        } @else {
            img.avatar src=(artist.avatar) alt=(artist.name) loading="lazy";
        }
    }
}

fn artist_card(artist: &Artist) -> Markup {
    html! {
        a.artist-card href={ "/artists/" (artist.slug) } {
            (avatar(artist))
            span.artist-name { (artist.name) }
            @if !artist.specialties.is_empty() {
                span.artist-specialties { (artist.specialties.join(" · ")) }
            }
        }
    }
}

fn piece_card(piece: &PortfolioPiece) -> Markup {
    html! {
        a.piece-card href={ "/portfolio/" (piece.slug) } {
            img src=(piece.cover) alt=(piece.title) loading="lazy";
            span.piece-title { (piece.title) }
            @if !piece.styles.is_empty() {
                span.piece-styles { (piece.styles.join(", ")) }
            }
        }
    }
}

fn piece_grid(pieces: &[PortfolioPiece]) -> Markup {
    html! {
        div.piece-grid {
            @for piece in pieces {
                (piece_card(piece))
            }
        }
    }
}

/// Accepts either a profile URL or a bare `@handle`.
fn instagram_url(value: &str) -> String {
    if value.starts_with("http://") || value.starts_with("https://") {
        value.to_string()
    } else {
        format!("https://instagram.com/{}", value.trim_start_matches('@'))
    }
}

fn style_query(style: &str) -> String {
    url::form_urlencoded::byte_serialize(style.as_bytes()).collect()
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Featured artists and the most recent pieces.
pub fn home(site: &SiteInfo, featured: &[Artist], pieces: &[PortfolioPiece]) -> Markup {
    let recent = &pieces[..pieces.len().min(HOME_RECENT_PIECES)];
    let meta = PageMeta {
        title: None,
        description: &site.description,
        path: "",
        image: recent.first().map(|p| p.cover.as_str()),
    };

    let content = html! {
        main.home-page {
            section.hero {
                h1 { (site.title) }
                p { (site.description) }
                a.cta href="/booking" { "Reserva tu cita" }
            }
            @if !featured.is_empty() {
                section.featured-artists {
                    h2 { "Nuestros artistas" }
                    div.artist-grid {
                        @for artist in featured {
                            (artist_card(artist))
                        }
                    }
                }
            }
            @if !recent.is_empty() {
                section.recent-work {
                    h2 { "Trabajos recientes" }
                    (piece_grid(recent))
                    a href="/portfolio" { "Ver todo el portfolio" }
                }
            }
        }
    };

    base_document(site, meta, "/", content)
}

pub fn artists(site: &SiteInfo, artists: &[Artist]) -> Markup {
    let meta = PageMeta {
        title: Some("Artistas"),
        description: "Conoce a los artistas del estudio.",
        path: "/artists",
        image: None,
    };

    let content = html! {
        main.artists-page {
            h1 { "Artistas" }
            div.artist-grid {
                @for artist in artists {
                    (artist_card(artist))
                }
            }
        }
    };

    base_document(site, meta, "/artists", content)
}

/// Artist profile with their pieces.
pub fn artist(site: &SiteInfo, artist: &Artist, pieces: &[PortfolioPiece]) -> Markup {
    let path = format!("/artists/{}", artist.slug);
    let meta = PageMeta {
        title: Some(artist.name.as_str()),
        description: &artist.bio,
        path: &path,
        image: (!is_video(&artist.avatar)).then_some(artist.avatar.as_str()),
    };

    let content = html! {
        main.artist-page {
            header.artist-header {
                (avatar(artist))
                div {
                    h1 { (artist.name) }
                    p.experience { (artist.years_experience) " años de experiencia" }
                    @if !artist.specialties.is_empty() {
                        ul.specialties {
                            @for s in &artist.specialties {
                                li { (s) }
                            }
                        }
                    }
                    @if let Some(instagram) = &artist.instagram {
                        a.instagram href=(instagram_url(instagram)) target="_blank" rel="noopener" {
                            "Instagram"
                        }
                    }
                }
            }
            @if let Some(quote) = &artist.hero_quote {
                blockquote.hero-quote { (quote) }
            }
            p.bio { (artist.bio) }
            @if let Some(body) = &artist.content {
                article.artist-content { (markdown(body)) }
            }
            @if !artist.gallery.is_empty() {
                div.gallery {
                    @for image in &artist.gallery {
                        img src=(image) alt=(artist.name) loading="lazy";
                    }
                }
            }
            @if !artist.instagram_posts.is_empty() {
                ul.instagram-posts {
                    @for post in &artist.instagram_posts {
                        li { a href=(post) target="_blank" rel="noopener" { (post) } }
                    }
                }
            }
            section.artist-work {
                h2 { "Trabajos" }
                @if pieces.is_empty() {
                    p.empty { "Todavía no hay trabajos publicados." }
                } @else {
                    (piece_grid(pieces))
                }
            }
        }
    };

    base_document(site, meta, "/artists", content)
}

/// Portfolio listing with style filter links; `active` marks the current filter.
pub fn portfolio(
    site: &SiteInfo,
    pieces: &[PortfolioPiece],
    styles: &[String],
    active: Option<&str>,
) -> Markup {
    let meta = PageMeta {
        title: Some("Portfolio"),
        description: "Trabajos realizados en el estudio.",
        path: "/portfolio",
        image: pieces.first().map(|p| p.cover.as_str()),
    };

    let content = html! {
        main.portfolio-page {
            h1 { "Portfolio" }
            nav.style-filter {
                a class=[active.is_none().then_some("current")] href="/portfolio" { "Todos" }
                @for style in styles {
                    @let is_current = active.is_some_and(|a| a.to_lowercase() == style.to_lowercase());
                    a class=[is_current.then_some("current")]
                        href={ "/portfolio?style=" (style_query(style)) } {
                        (style)
                    }
                }
            }
            @if pieces.is_empty() {
                p.empty { "No hay trabajos con este estilo." }
            } @else {
                (piece_grid(pieces))
            }
        }
    };

    base_document(site, meta, "/portfolio", content)
}

/// Piece detail; `artist` is the resolved author, when it exists.
pub fn piece(site: &SiteInfo, piece: &PortfolioPiece, artist: Option<&Artist>) -> Markup {
    let path = format!("/portfolio/{}", piece.slug);
    let meta = PageMeta {
        title: Some(piece.title.as_str()),
        description: &piece.description,
        path: &path,
        image: Some(piece.cover.as_str()),
    };

    let content = html! {
        main.piece-page {
            figure.cover {
                img src=(piece.cover) alt=(piece.title);
            }
            h1 { (piece.title) }
            dl.piece-facts {
                dt { "Artista" }
                dd {
                    @match artist {
                        Some(a) => {
                            a href={ "/artists/" (a.slug) } { (a.name) }
                        }
                        None => {
                            (piece.artist)
                        }
                    }
                }
                dt { "Zona" }
                dd { (piece.body_area) }
                dt { "Duración" }
                dd { (piece.duration_hours) " h" }
                dt { "Fecha" }
                dd { time datetime=(piece.date) { (piece.date.format("%d/%m/%Y")) } }
                @if !piece.styles.is_empty() {
                    dt { "Estilos" }
                    dd {
                        @for style in &piece.styles {
                            a.style-tag href={ "/portfolio?style=" (style_query(style)) } { (style) }
                            " "
                        }
                    }
                }
            }
            p.description { (piece.description) }
            @if let Some(body) = &piece.content {
                article.piece-content { (markdown(body)) }
            }
            @if !piece.gallery.is_empty() {
                div.gallery {
                    @for image in &piece.gallery {
                        img src=(image) alt=(piece.title) loading="lazy";
                    }
                }
            }
        }
    };

    base_document(site, meta, "/portfolio", content)
}

struct FormField {
    name: &'static str,
    label: &'static str,
    kind: &'static str,
    required: bool,
}

const BOOKING_FIELDS: &[FormField] = &[
    FormField { name: "name", label: "Nombre", kind: "text", required: true },
    FormField { name: "email", label: "Email", kind: "email", required: true },
    FormField { name: "phone", label: "Teléfono", kind: "tel", required: true },
    FormField { name: "bodyArea", label: "Zona del cuerpo", kind: "text", required: true },
    FormField { name: "size", label: "Tamaño aproximado", kind: "text", required: true },
    FormField { name: "reference", label: "Imagen de referencia (URL)", kind: "url", required: false },
];

/// Booking form; submitted as JSON to `/api/contact`.
pub fn booking(site: &SiteInfo) -> Markup {
    let meta = PageMeta {
        title: Some("Reservar cita"),
        description: "Cuéntanos tu idea y reserva una cita en el estudio.",
        path: "/booking",
        image: None,
    };

    let content = html! {
        main.booking-page {
            h1 { "Reservar cita" }
            form id="booking-form" method="post" action="/api/contact" novalidate {
                @for field in BOOKING_FIELDS {
                    label for=(field.name) { (field.label) }
                    input id=(field.name) name=(field.name) type=(field.kind) required[field.required];
                    p.field-error data-field=(field.name) {}
                }
                label for="message" { "Mensaje" }
                textarea id="message" name="message" rows="6" required {}
                p.field-error data-field="message" {}
                button type="submit" { "Enviar" }
                p id="form-status" role="status" {}
            }
            script { (PreEscaped(BOOKING_JS)) }
        }
    };

    base_document(site, meta, "/booking", content)
}

pub fn not_found(site: &SiteInfo) -> Markup {
    let meta = PageMeta {
        title: Some("Página no encontrada"),
        description: &site.description,
        path: "",
        image: None,
    };

    let content = html! {
        main.error-page {
            h1 { "Página no encontrada" }
            p { "La página que buscas no existe." }
            a href="/" { "Volver al inicio" }
        }
    };

    base_document(site, meta, "", content)
}

pub fn server_error(site: &SiteInfo) -> Markup {
    let meta = PageMeta {
        title: Some("Error"),
        description: &site.description,
        path: "",
        image: None,
    };

    let content = html! {
        main.error-page {
            h1 { "Algo ha salido mal" }
            p { "Inténtalo de nuevo en unos minutos." }
        }
    };

    base_document(site, meta, "", content)
}

// ============================================================================
// Tests
// ============================================================================
