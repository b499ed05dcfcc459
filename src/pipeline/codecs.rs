//! Codec identifier lookup for produced files.
//!
//! The transcoding run leaves a one-frame MP4 sample per rendition; mp4file
//! dumps its atoms and the identifiers are decoded from there. mp4file is
//! an optional tool, so extraction failures degrade to playlists without
//! CODECS attributes instead of failing the run.

use std::path::Path;

use tracing::{debug, warn};

use hlspack_av::{dump_atoms, require_tool};
use hlspack_media::extract_codecs;

use super::transcode::sample_name;

/// Codec identifiers extracted from the rendition samples.
#[derive(Debug, Default)]
pub struct CodecCatalog {
    /// Identifier per rendition, in plan order.
    pub renditions: Vec<Option<String>>,
    /// Set when a lookup failed and the catalog was emptied.
    pub disabled: bool,
}

impl CodecCatalog {
    /// A catalog with no identifiers for `count` renditions.
    pub fn empty(count: usize) -> Self {
        Self {
            renditions: vec![None; count],
            disabled: false,
        }
    }
}

/// Extract codec identifiers for `count` renditions from their samples.
///
/// The first failure abandons the whole catalog, identifiers collected
/// before it included: a missing mp4file warns once, not once per
/// rendition, and the master playlist carries CODECS on every variant
/// or on none.
pub fn collect_rendition_codecs(mp4file: &str, dir: &Path, count: usize) -> CodecCatalog {
    let mut catalog = CodecCatalog::default();
    for index in 0..count {
        match codecs_for(mp4file, &dir.join(sample_name(index))) {
            Ok(codecs) => catalog.renditions.push(codecs),
            Err(err) => {
                warn!("cannot extract codecs: {err:#}");
                return CodecCatalog {
                    renditions: vec![None; count],
                    disabled: true,
                };
            }
        }
    }
    catalog
}

/// Codec identifiers of the progressive MP4, when they can be extracted.
pub fn fallback_codecs(mp4file: &str, dir: &Path, filename: &str) -> Option<String> {
    match codecs_for(mp4file, &dir.join(filename)) {
        Ok(codecs) => codecs,
        Err(err) => {
            debug!("no codec information for {filename}: {err:#}");
            None
        }
    }
}

fn codecs_for(mp4file: &str, sample: &Path) -> anyhow::Result<Option<String>> {
    let tool = require_tool(mp4file)?;
    let dump = dump_atoms(&tool, sample)?;
    let codecs = extract_codecs(&dump)?;
    Ok((!codecs.is_empty()).then_some(codecs))
}
