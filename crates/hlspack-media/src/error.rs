//! Error types for hlspack-media.

use thiserror::Error;

/// Result type for hlspack-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for hlspack-media operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed display aspect ratio.
    #[error("invalid aspect ratio {0:?}: expected \"W:H\" with non-zero integers")]
    InvalidAspectRatio(String),

    /// Malformed seek position.
    #[error("invalid seek position {0:?}: expected \"<n>%\" or \"<n>s\"")]
    InvalidSeek(String),

    /// Malformed encoder profile.
    #[error("invalid profile {0:?}: expected \"name@level\"")]
    InvalidProfile(String),

    /// An avcC box was found but a required field was missing.
    #[error("unable to decode AVC1 codec")]
    AvcDecode,

    /// An esds box was found but a required field was missing.
    #[error("unable to decode MP4A codec")]
    Mp4aDecode,

    /// The atom dump carried no atoms at all.
    #[error("empty or unparsable atom dump")]
    EmptyDump,
}
