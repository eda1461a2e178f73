//! Read-only query access to the content store.
//!
//! The repository owns nothing but the content root. Every query reads the
//! files again, so edits show up on the next request without a restart.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── site.toml                 # Site configuration (optional)
//! ├── portfolio/
//! │   ├── koi-sleeve.mdx        # slug = "koi-sleeve"
//! │   └── geometric-mandala.mdx
//! └── artists/
//!     ├── ana-perez.mdx
//!     └── luis-gomez.mdx
//! ```
//!
//! Only `*.mdx` files count; dotfiles are skipped so editors' swap files and
//! drafts like `.wip.mdx` stay out of listings.
//!
//! ## Failure policy
//!
//! Listings favour availability: a file that cannot be read, parsed or mapped
//! is logged and left out, and an unreadable directory yields an empty
//! listing. Single lookups return `None` for both missing and malformed
//! files. Query methods never return errors; [`ContentRepository::load_report`]
//! is the one place that exposes per-file failures, for the `check` command.

use crate::entity::{Artist, Entity, EntityError, PortfolioPiece};
use crate::frontmatter::{self, FrontMatterError};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

/// File extension of content files.
pub const CONTENT_EXTENSION: &str = "mdx";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("front-matter error: {0}")]
    FrontMatter(#[from] FrontMatterError),
    #[error("{0}")]
    Entity(#[from] EntityError),
    #[error("file name is not a valid slug: {0:?}")]
    InvalidSlug(String),
}

/// A content file that was left out of a listing.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: LoadError,
}

/// Everything one collection scan produced: entities in canonical order plus
/// the files that failed.
#[derive(Debug)]
pub struct LoadReport<T> {
    pub entities: Vec<T>,
    pub failures: Vec<LoadFailure>,
}

#[derive(Debug, Clone)]
pub struct ContentRepository {
    root: PathBuf,
}

impl ContentRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // =========================================================================
    // Portfolio
    // =========================================================================

    /// Every portfolio piece, most recent first.
    pub fn all_portfolio_pieces(&self) -> Vec<PortfolioPiece> {
        self.load_all()
    }

    pub fn portfolio_piece(&self, slug: &str) -> Option<PortfolioPiece> {
        self.load_one(slug)
    }

    /// Pieces tagged with `style`, compared case-insensitively.
    pub fn portfolio_pieces_by_style(&self, style: &str) -> Vec<PortfolioPiece> {
        filter_by_style(&self.all_portfolio_pieces(), style)
    }

    /// Pieces whose artist reference equals `artist_slug`, compared
    /// case-insensitively.
    pub fn portfolio_pieces_by_artist(&self, artist_slug: &str) -> Vec<PortfolioPiece> {
        filter_by_artist(&self.all_portfolio_pieces(), artist_slug)
    }

    /// Distinct styles across all pieces, sorted. Casing is preserved, so
    /// `Color` and `color` are two entries.
    pub fn all_styles(&self) -> Vec<String> {
        distinct_styles(&self.all_portfolio_pieces())
    }

    // =========================================================================
    // Artists
    // =========================================================================

    /// Every artist, ascending by `order`.
    pub fn all_artists(&self) -> Vec<Artist> {
        self.load_all()
    }

    pub fn artist(&self, slug: &str) -> Option<Artist> {
        self.load_one(slug)
    }

    /// Featured artists, in the same order as [`Self::all_artists`].
    pub fn featured_artists(&self) -> Vec<Artist> {
        self.all_artists().into_iter().filter(|a| a.featured).collect()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Directory holding the files of `T`'s collection.
    pub fn collection_dir<T: Entity>(&self) -> PathBuf {
        self.root.join(T::COLLECTION.dir_name())
    }

    /// Scan one collection and report both loaded entities and failures.
    ///
    /// Files are parsed in parallel; the result is sorted afterwards, so the
    /// order of completion never shows. Fails only when the collection
    /// directory itself cannot be listed.
    pub fn load_report<T: Entity>(&self) -> Result<LoadReport<T>, LoadError> {
        let paths = content_paths(&self.collection_dir::<T>())?;

        let outcomes: Vec<(PathBuf, Result<T, LoadError>)> = paths
            .into_par_iter()
            .map(|path| {
                let outcome = load_file::<T>(&path);
                (path, outcome)
            })
            .collect();

        let mut entities = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(entity) => entities.push(entity),
                Err(error) => failures.push(LoadFailure { path, error }),
            }
        }

        T::sort_canonical(&mut entities);
        Ok(LoadReport { entities, failures })
    }

    fn load_all<T: Entity>(&self) -> Vec<T> {
        let collection = T::COLLECTION.dir_name();
        match self.load_report::<T>() {
            Ok(report) => {
                for failure in &report.failures {
                    warn!(
                        collection,
                        path = %failure.path.display(),
                        error = %failure.error,
                        "excluding malformed content file"
                    );
                }
                report.entities
            }
            Err(err) => {
                error!(collection, error = %err, "failed to list content directory");
                Vec::new()
            }
        }
    }

    fn load_one<T: Entity>(&self, slug: &str) -> Option<T> {
        let collection = T::COLLECTION.dir_name();
        if !is_valid_slug(slug) {
            debug!(collection, slug, "rejecting unsafe slug");
            return None;
        }

        let path = self
            .collection_dir::<T>()
            .join(format!("{slug}.{CONTENT_EXTENSION}"));
        match load_file::<T>(&path) {
            Ok(entity) => Some(entity),
            Err(LoadError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                debug!(collection, slug, "content file not found");
                None
            }
            Err(err) => {
                warn!(collection, slug, error = %err, "failed to load content file");
                None
            }
        }
    }
}

/// Keep pieces tagged with `style` (case-insensitive exact match).
pub fn filter_by_style(pieces: &[PortfolioPiece], style: &str) -> Vec<PortfolioPiece> {
    pieces.iter().filter(|p| p.has_style(style)).cloned().collect()
}

/// Keep pieces whose artist reference equals `artist` (case-insensitive).
pub fn filter_by_artist(pieces: &[PortfolioPiece], artist: &str) -> Vec<PortfolioPiece> {
    pieces.iter().filter(|p| p.is_by(artist)).cloned().collect()
}

/// Sorted union of every piece's styles.
pub fn distinct_styles(pieces: &[PortfolioPiece]) -> Vec<String> {
    pieces
        .iter()
        .flat_map(|p| p.styles.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A slug is any file stem that cannot step outside its collection
/// directory when joined onto it.
///
/// Rejected: empty stems, path separators, `..`, a leading `.`, and control
/// characters. Everything else, including non-ASCII letters and inner dots
/// (`diseño-floral`, `koi.v2`), is a valid slug.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains("..")
        && !slug.chars().any(|c| c == '/' || c == '\\' || c.is_control())
}

fn content_paths(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let hidden = p
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'));
            !hidden
                && p.is_file()
                && p.extension().is_some_and(|e| e == CONTENT_EXTENSION)
        })
        .collect();

    paths.sort();
    Ok(paths)
}

fn load_file<T: Entity>(path: &Path) -> Result<T, LoadError> {
    let slug = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if !is_valid_slug(&slug) {
        return Err(LoadError::InvalidSlug(slug));
    }

    let raw = fs::read_to_string(path)?;
    let source = frontmatter::parse(&raw)?;
    Ok(T::from_front_matter(&slug, source)?)
}
