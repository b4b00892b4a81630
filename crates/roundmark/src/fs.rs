//! File helpers for loading and saving Markdown
//!
//! Nothing in the parsers or the renderer touches the filesystem; these are for
//! callers that start from or end at a file.

use std::io;
use std::path::Path;

use crate::{Error, Result};

/// Read the whole file at `path`
pub fn read(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            Error::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::ReadFile {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Read the file at `path` as UTF-8 text
pub fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = read(path)?;
    String::from_utf8(bytes).map_err(|err| Error::ReadFile {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidData, err),
    })
}

/// Write `text` to `path`, replacing any existing file
pub fn write(path: impl AsRef<Path>, text: &str) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, text).map_err(|source| Error::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
