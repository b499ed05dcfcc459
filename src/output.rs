//! Output directory preparation.

use anyhow::{bail, Context};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve and create the output directory.
///
/// Without an explicit choice the directory is the input path with its
/// extension stripped, or with `_output` appended when there is no
/// extension to strip. An existing directory is refused unless
/// overwriting was requested.
pub fn prepare_output_dir(
    input: &Path,
    output: Option<&Path>,
    overwrite: bool,
) -> anyhow::Result<PathBuf> {
    let dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => default_output_dir(input),
    };
    if dir.exists() && !overwrite {
        bail!(
            "output directory {} already exists, use --output-overwrite to reuse it",
            dir.display()
        );
    }
    fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    dir.canonicalize()
        .with_context(|| format!("cannot resolve output directory {}", dir.display()))
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stripped = input.with_extension("");
    if stripped != input {
        return stripped;
    }
    // No extension to strip, avoid clobbering the input itself.
    let mut name = input.as_os_str().to_os_string();
    name.push("_output");
    PathBuf::from(name)
}
