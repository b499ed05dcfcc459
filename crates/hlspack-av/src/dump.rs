//! Atom dumps via mp4file.

use std::path::Path;

use crate::runner::{run_tool, ArgList};
use crate::{Error, Result};

/// Dump the atom tree of `sample` as text.
///
/// Both a missing sample file and a missing dump tool surface as distinct
/// errors ([`Error::FileNotFound`], [`Error::ToolNotFound`]) so callers can
/// treat "unavailable" differently from a real failure.
pub fn dump_atoms(mp4file: &Path, sample: &Path) -> Result<String> {
    if !sample.is_file() {
        return Err(Error::file_not_found(sample));
    }

    let mut args = ArgList::new();
    args.arg("--dump");
    args.arg(sample.display());
    run_tool(mp4file, &args, None)
}
