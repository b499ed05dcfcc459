//! Fallback `<video>` element for pages that embed the stream directly.

use std::fmt::Write;

/// Progressive MP4 fallback source.
#[derive(Debug, Clone)]
pub struct FallbackSource {
    pub filename: String,
    /// Codec identifiers for the `type` attribute, when decodable.
    pub codecs: Option<String>,
}

/// A ready-to-paste `<video>` element.
///
/// The first source is the master playlist; browsers without native HLS
/// support fall through to the progressive MP4, when one was produced.
#[derive(Debug, Clone)]
pub struct VideoTag {
    pub master_playlist: String,
    pub poster: Option<String>,
    pub fallback: Option<FallbackSource>,
}

impl VideoTag {
    /// Serialize to HTML text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        match &self.poster {
            Some(poster) => writeln!(out, "<video controls poster=\"{poster}\">").unwrap(),
            None => writeln!(out, "<video controls>").unwrap(),
        }
        writeln!(
            out,
            "  <source src=\"{}\" type=\"application/vnd.apple.mpegurl\">",
            self.master_playlist
        )
        .unwrap();
        if let Some(fallback) = &self.fallback {
            // The codecs parameter itself is double quoted, so the type
            // attribute uses single quotes.
            match &fallback.codecs {
                Some(codecs) => writeln!(
                    out,
                    "  <source src=\"{}\" type='video/mp4; codecs=\"{codecs}\"'>",
                    fallback.filename
                )
                .unwrap(),
                None => writeln!(
                    out,
                    "  <source src=\"{}\" type='video/mp4'>",
                    fallback.filename
                )
                .unwrap(),
            }
        }
        writeln!(out, "</video>").unwrap();
        out
    }
}
