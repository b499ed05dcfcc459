//! External tool integration for hlspack.
//!
//! Everything that leaves the process lives here: probing sources with
//! ffprobe, running ffmpeg invocations, and dumping container atoms with
//! mp4file. The crate is synchronous; each call blocks until the child
//! process exits.
//!
//! - [`probe`] - technical facts about a source file
//! - [`runner`] - annotated argument lists and subprocess execution
//! - [`dump`] - textual atom dumps of produced samples
//! - [`tools`] - PATH lookup for required executables

pub mod dump;
pub mod error;
pub mod probe;
pub mod runner;
pub mod tools;

pub use dump::dump_atoms;
pub use error::{Error, Result};
pub use probe::{probe, AudioStream, FrameRate, SourceInfo, VideoStream};
pub use runner::{run_tool, ArgList};
pub use tools::require_tool;
