//! Shared test utilities for the inklab test suite.
//!
//! Provides fixture setup, small content-file writers, and extractors that
//! work with repository data (`PortfolioPiece`, `Artist`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let repo = ContentRepository::new(tmp.path());
//! assert_eq!(slugs(&repo.all_artists()), vec!["ana-perez", "luis-gomez", "marta-ruiz"]);
//!
//! write_piece(tmp.path(), "new-piece", "date: 2025-01-01\nstyles: [Color]");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::entity::Entity;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Content writers
// =========================================================================

const PIECE_BASE: &[(&str, &str)] = &[
    ("title", "Test Piece"),
    ("artist", "ana-perez"),
    ("bodyArea", "Brazo"),
    ("durationHours", "3"),
    ("date", "2024-01-01"),
    ("cover", "/images/test.jpg"),
    ("description", "Pieza de prueba"),
];

const ARTIST_BASE: &[(&str, &str)] = &[
    ("name", "Test Artist"),
    ("bio", "Bio de prueba"),
    ("avatar", "/images/artist.jpg"),
    ("yearsExperience", "5"),
];

/// Write `portfolio/<slug>.mdx` with valid required fields.
///
/// `overrides` is raw YAML; any top-level key it sets replaces the base value.
pub fn write_piece(root: &Path, slug: &str, overrides: &str) {
    write_entity(root, "portfolio", slug, PIECE_BASE, overrides);
}

/// Write `artists/<slug>.mdx` with valid required fields.
///
/// `overrides` is raw YAML; any top-level key it sets replaces the base value.
pub fn write_artist(root: &Path, slug: &str, overrides: &str) {
    write_entity(root, "artists", slug, ARTIST_BASE, overrides);
}

fn write_entity(root: &Path, dir: &str, slug: &str, base: &[(&str, &str)], overrides: &str) {
    let overridden: Vec<&str> = overrides
        .lines()
        .filter(|l| !l.starts_with(' ') && !l.starts_with('-'))
        .filter_map(|l| l.split_once(':').map(|(k, _)| k.trim()))
        .collect();

    let mut front = String::new();
    for (key, value) in base {
        if !overridden.contains(key) {
            front.push_str(&format!("{key}: {value}\n"));
        }
    }
    if !overrides.is_empty() {
        front.push_str(overrides);
        front.push('\n');
    }

    let collection = root.join(dir);
    std::fs::create_dir_all(&collection).unwrap();
    std::fs::write(
        collection.join(format!("{slug}.mdx")),
        format!("---\n{front}---\n"),
    )
    .unwrap();
}

// =========================================================================
// Extractors
// =========================================================================

/// Slugs in listing order.
pub fn slugs<T: Entity>(items: &[T]) -> Vec<&str> {
    items.iter().map(|i| i.slug()).collect()
}
