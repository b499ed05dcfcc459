//! Master playlist serialization.

use std::fmt::Write;

use crate::geometry::Dimensions;

/// One `#EXT-X-STREAM-INF` entry of the master playlist.
#[derive(Debug, Clone)]
pub struct VariantStream {
    /// Media playlist file name, without any path prefix.
    pub playlist: String,
    /// Peak bandwidth in bits per second.
    pub bandwidth: u32,
    /// Output dimensions; omitted for audio-only variants.
    pub resolution: Option<Dimensions>,
    /// Source frame rate; omitted for audio-only variants.
    pub frame_rate: Option<f64>,
    /// Codec identifier string; omitted when unavailable.
    pub codecs: Option<String>,
    /// Display name.
    pub name: String,
}

/// A master playlist under assembly.
///
/// Variants render in insertion order. Every variant entry is repeated once
/// per playlist prefix, so one master can point at the same media playlists
/// through several delivery paths.
#[derive(Debug, Clone)]
pub struct MasterPlaylist {
    variants: Vec<VariantStream>,
    prefixes: Vec<String>,
    audio_playlist: Option<String>,
}

impl MasterPlaylist {
    /// Create an empty master playlist with the given path prefixes.
    ///
    /// An empty prefix list behaves like a single empty prefix.
    pub fn new(prefixes: Vec<String>) -> Self {
        let prefixes = if prefixes.is_empty() {
            vec![String::new()]
        } else {
            prefixes
        };
        Self {
            variants: Vec::new(),
            prefixes,
            audio_playlist: None,
        }
    }

    /// Declare the shared audio rendition group.
    ///
    /// `playlist` is the audio media playlist's file name; switching this on
    /// bumps the playlist version and annotates every variant with the
    /// audio group.
    pub fn with_audio_group(mut self, playlist: impl Into<String>) -> Self {
        self.audio_playlist = Some(playlist.into());
        self
    }

    /// Append a variant stream.
    pub fn add_variant(&mut self, variant: VariantStream) {
        self.variants.push(variant);
    }

    /// Serialize to playlist text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        writeln!(out, "#EXTM3U").unwrap();
        let version = if self.audio_playlist.is_some() { 4 } else { 3 };
        writeln!(out, "#EXT-X-VERSION:{version}").unwrap();

        if let Some(audio) = &self.audio_playlist {
            for prefix in &self.prefixes {
                writeln!(
                    out,
                    "#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"audio\",DEFAULT=yes,\
                     AUTOSELECT=yes,URI=\"{prefix}{audio}\""
                )
                .unwrap();
            }
        }

        for variant in &self.variants {
            for prefix in &self.prefixes {
                let mut attrs = vec![format!("BANDWIDTH={}", variant.bandwidth)];
                if let Some(resolution) = variant.resolution {
                    attrs.push(format!("RESOLUTION={resolution}"));
                }
                if let Some(frame_rate) = variant.frame_rate {
                    attrs.push(format!("FRAME-RATE={frame_rate:.3}"));
                }
                if let Some(codecs) = &variant.codecs {
                    attrs.push(format!("CODECS=\"{codecs}\""));
                }
                if self.audio_playlist.is_some() {
                    attrs.push("AUDIO=\"audio\"".to_string());
                }
                attrs.push(format!("NAME=\"{}\"", variant.name));
                writeln!(out, "#EXT-X-STREAM-INF:{}", attrs.join(",")).unwrap();
                writeln!(out, "{prefix}{}", variant.playlist).unwrap();
            }
        }
        out
    }
}
