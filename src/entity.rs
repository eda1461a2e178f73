//! Typed content entities and the mapping from front-matter to them.
//!
//! Front-matter arrives as an untyped YAML mapping. Each entity kind declares
//! a private serde schema (`PieceSource`, `ArtistSource`) listing the keys it
//! recognizes, which of them are required, and the default for every optional
//! one. Mapping is a single `serde_yaml::from_value` call plus a few value
//! checks, so a missing or malformed field fails in exactly one place.
//!
//! Mapping is pure: the same slug, mapping and body always produce the same
//! entity.
//!
//! ## Defaults
//!
//! | Entity | Field | Default |
//! |--------|-------|---------|
//! | piece | `styles`, `gallery` | empty |
//! | artist | `specialties`, `instagramPosts`, `gallery` | empty |
//! | artist | `featured` | `false` |
//! | artist | `order` | [`DEFAULT_ARTIST_ORDER`] |
//! | both | `content` | absent when the body is blank |
//!
//! A key present with a `null` value (`styles:` with nothing after it) counts
//! as absent. Unknown keys are ignored.

use crate::frontmatter::FrontMatter;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use thiserror::Error;

/// Display order given to artists whose front-matter has no `order`.
pub const DEFAULT_ARTIST_ORDER: i64 = 999;

#[derive(Error, Debug)]
pub enum EntityError {
    #[error("{0}")]
    Schema(#[from] serde_yaml::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A named group of entities stored in one content directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Portfolio,
    Artists,
}

impl Collection {
    /// Directory name under the content root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Collection::Portfolio => "portfolio",
            Collection::Artists => "artists",
        }
    }
}

/// An entity kind the content repository can load.
pub trait Entity: Sized + Send {
    const COLLECTION: Collection;

    fn slug(&self) -> &str;

    /// Build the entity from a parsed content file.
    fn from_front_matter(slug: &str, source: FrontMatter) -> Result<Self, EntityError>;

    /// Sort a listing into the collection's canonical order.
    ///
    /// Implementations use a stable sort so equal keys keep enumeration order.
    fn sort_canonical(items: &mut [Self]);
}

/// A finished tattoo shown in the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioPiece {
    pub slug: String,
    pub title: String,
    /// Soft reference to an artist, by slug or name.
    pub artist: String,
    pub styles: Vec<String>,
    pub body_area: String,
    pub duration_hours: f64,
    pub date: NaiveDate,
    pub cover: String,
    pub gallery: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl PortfolioPiece {
    /// Case-insensitive exact match against one of the piece's styles.
    pub fn has_style(&self, style: &str) -> bool {
        let wanted = style.to_lowercase();
        self.styles.iter().any(|s| s.to_lowercase() == wanted)
    }

    /// Case-insensitive exact match against the piece's artist reference.
    pub fn is_by(&self, artist: &str) -> bool {
        self.artist.to_lowercase() == artist.to_lowercase()
    }
}

/// A resident artist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub slug: String,
    pub name: String,
    pub bio: String,
    /// Image or video reference.
    pub avatar: String,
    pub specialties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    pub instagram_posts: Vec<String>,
    pub years_experience: f64,
    pub featured: bool,
    pub order: i64,
    pub gallery: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_quote: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PieceSource {
    title: String,
    artist: String,
    #[serde(default, deserialize_with = "null_as_default")]
    styles: Vec<String>,
    body_area: String,
    duration_hours: f64,
    date: String,
    cover: String,
    #[serde(default, deserialize_with = "null_as_default")]
    gallery: Vec<String>,
    description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtistSource {
    name: String,
    bio: String,
    avatar: String,
    #[serde(default, deserialize_with = "null_as_default")]
    specialties: Vec<String>,
    #[serde(default)]
    instagram: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    instagram_posts: Vec<String>,
    years_experience: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    featured: bool,
    #[serde(default)]
    order: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    gallery: Vec<String>,
    #[serde(default)]
    hero_quote: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Entity for PortfolioPiece {
    const COLLECTION: Collection = Collection::Portfolio;

    fn slug(&self) -> &str {
        &self.slug
    }

    fn from_front_matter(slug: &str, source: FrontMatter) -> Result<Self, EntityError> {
        let raw: PieceSource = serde_yaml::from_value(Value::Mapping(source.metadata))?;

        if !(raw.duration_hours.is_finite() && raw.duration_hours > 0.0) {
            return Err(EntityError::Invalid {
                field: "durationHours",
                reason: format!("expected a positive number, got {}", raw.duration_hours),
            });
        }
        let date = parse_date(&raw.date).ok_or_else(|| EntityError::Invalid {
            field: "date",
            reason: format!("expected an ISO date, got {:?}", raw.date),
        })?;

        Ok(PortfolioPiece {
            slug: slug.to_string(),
            title: raw.title,
            artist: raw.artist,
            styles: raw.styles,
            body_area: raw.body_area,
            duration_hours: raw.duration_hours,
            date,
            cover: raw.cover,
            gallery: raw.gallery,
            description: raw.description,
            content: body_content(source.body),
        })
    }

    /// Most recent first.
    fn sort_canonical(items: &mut [Self]) {
        items.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

impl Entity for Artist {
    const COLLECTION: Collection = Collection::Artists;

    fn slug(&self) -> &str {
        &self.slug
    }

    fn from_front_matter(slug: &str, source: FrontMatter) -> Result<Self, EntityError> {
        let raw: ArtistSource = serde_yaml::from_value(Value::Mapping(source.metadata))?;

        if !(raw.years_experience.is_finite() && raw.years_experience >= 0.0) {
            return Err(EntityError::Invalid {
                field: "yearsExperience",
                reason: format!("expected a non-negative number, got {}", raw.years_experience),
            });
        }

        Ok(Artist {
            slug: slug.to_string(),
            name: raw.name,
            bio: raw.bio,
            avatar: raw.avatar,
            specialties: raw.specialties,
            instagram: raw.instagram.filter(|url| !url.trim().is_empty()),
            instagram_posts: raw.instagram_posts,
            years_experience: raw.years_experience,
            featured: raw.featured,
            order: raw.order.unwrap_or(DEFAULT_ARTIST_ORDER),
            gallery: raw.gallery,
            hero_quote: raw.hero_quote,
            content: body_content(source.body),
        })
    }

    /// Ascending `order`.
    fn sort_canonical(items: &mut [Self]) {
        items.sort_by_key(|a| a.order);
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (reduced to its date).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn body_content(body: String) -> Option<String> {
    if body.trim().is_empty() {
        None
    } else {
        Some(body)
    }
}
