//! External tool lookup.

use std::path::PathBuf;

use crate::{Error, Result};

/// Require that a tool is available, returning its path.
///
/// `name` may be a bare executable name resolved on PATH or an explicit
/// path to the binary.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}
