//! Front-matter splitting for content files.
//!
//! Every content file starts with a YAML block fenced by `---` lines, followed
//! by the free-text body:
//!
//! ```text
//! ---
//! title: Koi Sleeve
//! styles:
//!   - Japonés
//!   - Color
//! ---
//!
//! Body text, rendered as markdown on the detail page.
//! ```
//!
//! This module only separates the two parts and parses the block into an
//! untyped mapping. Turning that mapping into a typed entity is the job of
//! [`crate::entity`].

use serde_yaml::{Mapping, Value};
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("file does not start with a front-matter block")]
    Missing,
    #[error("front-matter block is never closed")]
    Unterminated,
    #[error("front-matter is not a key/value mapping")]
    NotAMapping,
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A content file split into its metadata block and body.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub metadata: Mapping,
    pub body: String,
}

/// Split raw file text into metadata and body.
///
/// The opening fence must be the first line (a leading byte-order mark is
/// ignored). The block ends at the next line that is exactly `---`; trailing
/// whitespace and CRLF line endings are tolerated on both fences.
pub fn parse(raw: &str) -> Result<FrontMatter, FrontMatterError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');

    let first = lines.next().ok_or(FrontMatterError::Missing)?;
    if first.trim_end() != DELIMITER {
        return Err(FrontMatterError::Missing);
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let metadata = parse_block(&text[block_start..offset])?;
            let body = text[offset + line.len()..].to_string();
            return Ok(FrontMatter { metadata, body });
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

fn parse_block(block: &str) -> Result<Mapping, FrontMatterError> {
    if block.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(block)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(FrontMatterError::NotAMapping),
    }
}
