//! # hlspack-media
//!
//! Rendition planning and manifest assembly for HLS delivery.
//!
//! This crate is the pure core of hlspack: it turns probed source facts and
//! requested rendition parameters into a deliverable plan, decodes codec
//! parameter atoms into RFC 6381 identifiers, and serializes the master
//! playlist plus the fallback HTML snippet. It never touches the filesystem
//! or spawns processes.
//!
//! # Modules
//!
//! - `geometry` - aspect-preserving box fits with even rounding
//! - `plan` - rendition ladder normalization and derived defaults
//! - `atoms` - MP4 atom dump parsing and codec identifier extraction
//! - `hls` - master playlist serialization (m3u8)
//! - `html` - fallback `<video>` snippet
//! - `template` - `{var}` substitution for segment names and overlays

pub mod atoms;
pub mod error;
pub mod geometry;
pub mod hls;
pub mod html;
pub mod plan;
pub mod template;

pub use atoms::{extract_codecs, AtomDump};
pub use error::{Error, Result};
pub use geometry::Dimensions;
pub use hls::{MasterPlaylist, VariantStream};
pub use html::{FallbackSource, VideoTag};
pub use plan::{AspectRatio, LadderRequest, Profile, Rendition, RenditionPlan, SeekPosition};
pub use template::TemplateContext;
