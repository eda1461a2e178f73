//! # Inklab
//!
//! Marketing and booking site for a tattoo studio. The content directory is
//! the data source: every portfolio piece and artist is one MDX file with a
//! YAML front-matter block, and pages are rendered from those files on each
//! request.
//!
//! # Architecture
//!
//! ```text
//! content/*.mdx ─→ frontmatter ─→ entity ─→ repository ─┬─→ render ──→ server (HTML)
//!                                                        └─→ sitemap ─→ server (XML)
//! POST /api/contact ─→ contact (rate limit → validate → spam → sink)
//! ```
//!
//! There is no cache and no build step. Edits show up on the next request.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`frontmatter`] | Splits a content file into a YAML mapping and a markdown body |
//! | [`entity`] | Typed portfolio pieces and artists, mapped from front-matter |
//! | [`repository`] | Query interface over the content directory |
//! | [`contact`] | Booking request pipeline: rate limiter, validation, spam filter |
//! | [`render`] | HTML pages using Maud |
//! | [`sitemap`] | Sitemap entries and XML |
//! | [`server`] | axum router, handlers and the serve loop |
//! | [`config`] | `site.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting for the `check` command |
//!
//! # Design Decisions
//!
//! ## Silent Degrade
//!
//! A malformed content file never takes a page down. Listings skip it and log
//! a warning; single lookups treat it as missing. `inklab check` is the place
//! where those files are reported, and it exits non-zero when there are any.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Front-matter strings are auto-escaped; only rendered markdown
//! bodies are inserted verbatim.
//!
//! ## In-Process Rate Limiting
//!
//! The booking endpoint's fixed-window counters live in memory inside the
//! server state. They reset on restart and are not shared between instances.

pub mod config;
pub mod contact;
pub mod entity;
pub mod frontmatter;
pub mod output;
pub mod render;
pub mod repository;
pub mod server;
pub mod sitemap;

#[cfg(test)]
pub(crate) mod test_helpers;
