//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity leads
//! with its positional index and title; the source file and the fields an
//! editor is likely to get wrong follow as indented context lines. The
//! result reads as a content inventory while still pointing back at files.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Portfolio
//! 001 Rosa Realista (2024-06-21)
//!     Source: portfolio/rose-realism.mdx
//!     Artist: Ana-Perez
//!     Styles: Realismo, Color
//! 002 Koi Sleeve (2024-05-10)
//!     Source: portfolio/koi-sleeve.mdx
//!     ...
//!
//! Artists
//! 001 Ana Pérez (featured)
//!     Source: artists/ana-perez.mdx
//!     Order: 1
//!
//! Styles
//!     Blackwork, Color, Geométrico, Japonés, Realismo
//!
//! Excluded
//!     portfolio/unfinished-draft.mdx
//!         missing field `title`
//!
//! Checked 3 pieces, 3 artists, 1 excluded
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::entity::{Artist, PortfolioPiece};
use crate::repository::{LoadFailure, LoadReport, distinct_styles};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional detail.
///
/// ```text
/// 001 Koi Sleeve (2024-05-10)
/// 002 Luis Gómez
/// ```
fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), title, d),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

/// Path relative to the content root, for display.
fn source_line(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

// ============================================================================
// Check output
// ============================================================================

fn piece_lines(index: usize, piece: &PortfolioPiece, root: &Path, lines: &mut Vec<String>) {
    let date = piece.date.to_string();
    lines.push(entity_header(index, &piece.title, Some(&date)));
    let path = root
        .join("portfolio")
        .join(format!("{}.{}", piece.slug, crate::repository::CONTENT_EXTENSION));
    lines.push(format!("{}Source: {}", indent(1), source_line(&path, root)));
    lines.push(format!("{}Artist: {}", indent(1), piece.artist));
    if !piece.styles.is_empty() {
        lines.push(format!("{}Styles: {}", indent(1), piece.styles.join(", ")));
    }
    lines.push(format!(
        "{}Description: {}",
        indent(1),
        truncate_desc(&piece.description, 40)
    ));
}

fn artist_lines(index: usize, artist: &Artist, root: &Path, lines: &mut Vec<String>) {
    lines.push(entity_header(
        index,
        &artist.name,
        artist.featured.then_some("featured"),
    ));
    let path = root
        .join("artists")
        .join(format!("{}.{}", artist.slug, crate::repository::CONTENT_EXTENSION));
    lines.push(format!("{}Source: {}", indent(1), source_line(&path, root)));
    lines.push(format!("{}Order: {}", indent(1), artist.order));
}

fn failure_lines(failure: &LoadFailure, root: &Path, lines: &mut Vec<String>) {
    lines.push(format!("{}{}", indent(1), source_line(&failure.path, root)));
    lines.push(format!("{}{}", indent(2), failure.error));
}

/// Format the content inventory produced by the `check` command.
pub fn format_check_output(
    pieces: &LoadReport<PortfolioPiece>,
    artists: &LoadReport<Artist>,
    source_root: &Path,
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Portfolio".to_string());
    for (i, piece) in pieces.entities.iter().enumerate() {
        piece_lines(i + 1, piece, source_root, &mut lines);
    }

    lines.push(String::new());
    lines.push("Artists".to_string());
    for (i, artist) in artists.entities.iter().enumerate() {
        artist_lines(i + 1, artist, source_root, &mut lines);
    }

    let styles = distinct_styles(&pieces.entities);
    if !styles.is_empty() {
        lines.push(String::new());
        lines.push("Styles".to_string());
        lines.push(format!("{}{}", indent(1), styles.join(", ")));
    }

    let excluded = pieces.failures.len() + artists.failures.len();
    if excluded > 0 {
        lines.push(String::new());
        lines.push("Excluded".to_string());
        for failure in pieces.failures.iter().chain(&artists.failures) {
            failure_lines(failure, source_root, &mut lines);
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Checked {} pieces, {} artists, {} excluded",
        pieces.entities.len(),
        artists.entities.len(),
        excluded
    ));

    lines
}

pub fn print_check_output(
    pieces: &LoadReport<PortfolioPiece>,
    artists: &LoadReport<Artist>,
    source_root: &Path,
) {
    for line in format_check_output(pieces, artists, source_root) {
        println!("{}", line);
    }
}
