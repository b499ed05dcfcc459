//! Rendition ladder normalization.
//!
//! Turns the raw, possibly-inconsistent per-rendition option vectors into a
//! [`RenditionPlan`]: all vectors aligned to one canonical length, missing
//! values derived, renditions larger than the source pruned.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::{Error, Result};
use crate::geometry::Dimensions;

/// A display aspect ratio such as `16:9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    num: u32,
    den: u32,
}

impl AspectRatio {
    /// Create a ratio from numerator and denominator.
    ///
    /// The caller guarantees both components are non-zero; user-supplied
    /// text goes through [`FromStr`], which validates.
    pub fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// The ratio as a floating point number (width over height).
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Height matching `width` at this ratio, truncated to an integer.
    pub fn height_for(&self, width: u32) -> u32 {
        (width as f64 / self.as_f64()) as u32
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (num, den) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidAspectRatio(s.to_string()))?;
        let num: u32 = num
            .parse()
            .map_err(|_| Error::InvalidAspectRatio(s.to_string()))?;
        let den: u32 = den
            .parse()
            .map_err(|_| Error::InvalidAspectRatio(s.to_string()))?;
        if num == 0 || den == 0 {
            return Err(Error::InvalidAspectRatio(s.to_string()));
        }
        Ok(Self { num, den })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.num, self.den)
    }
}

/// A position in the source video, either relative or absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekPosition {
    /// Percentage of the source duration, `"5%"`.
    Percent(u32),
    /// Absolute seconds, `"12s"`.
    Seconds(u32),
}

impl SeekPosition {
    /// Resolve to whole seconds against the source duration.
    pub fn resolve(&self, duration: f64) -> u64 {
        match self {
            Self::Percent(percent) => (duration * f64::from(*percent) / 100.0) as u64,
            Self::Seconds(seconds) => u64::from(*seconds),
        }
    }
}

impl FromStr for SeekPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (digits, ctor) = if let Some(digits) = s.strip_suffix('%') {
            (digits, Self::Percent as fn(u32) -> Self)
        } else if let Some(digits) = s.strip_suffix('s') {
            (digits, Self::Seconds as fn(u32) -> Self)
        } else {
            return Err(Error::InvalidSeek(s.to_string()));
        };
        digits
            .parse::<u32>()
            .map(ctor)
            .map_err(|_| Error::InvalidSeek(s.to_string()))
    }
}

impl fmt::Display for SeekPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(percent) => write!(f, "{percent}%"),
            Self::Seconds(seconds) => write!(f, "{seconds}s"),
        }
    }
}

/// An encoder profile with its level, parsed from `name@level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub level: String,
}

impl FromStr for Profile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('@') {
            Some((name, level)) if !name.is_empty() && !level.is_empty() => Ok(Self {
                name: name.to_string(),
                level: level.to_string(),
            }),
            _ => Err(Error::InvalidProfile(s.to_string())),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.level)
    }
}

/// How a per-rendition vector is brought to the canonical length.
#[derive(Debug, Clone, Copy)]
enum AlignPolicy {
    /// Truncate if longer, repeat the last element if shorter.
    RepeatLast,
    /// Like [`AlignPolicy::RepeatLast`], but an empty vector stays empty.
    RepeatLastUnlessEmpty,
    /// Truncate if longer, never extend.
    TruncateOnly,
}

fn align<T: Clone>(values: &mut Vec<T>, len: usize, policy: AlignPolicy) {
    values.truncate(len);
    match policy {
        AlignPolicy::TruncateOnly => {}
        AlignPolicy::RepeatLastUnlessEmpty if values.is_empty() => {}
        AlignPolicy::RepeatLast | AlignPolicy::RepeatLastUnlessEmpty => {
            if let Some(last) = values.last().cloned() {
                values.resize(len, last);
            }
        }
    }
}

/// The raw rendition ladder as requested on the command line.
///
/// Vectors may have mismatched lengths; [`LadderRequest::normalize`] aligns
/// them. Bitrates are in kbit/s, widths in pixels (0 marks an audio-only
/// rendition).
#[derive(Debug, Clone)]
pub struct LadderRequest {
    pub widths: Vec<u32>,
    pub bitrates: Vec<u32>,
    pub codecs: Vec<String>,
    /// Raw `name@level` strings, parsed during normalization.
    pub profiles: Vec<String>,
    pub names: Vec<String>,
    /// Encoder presets; empty means none requested.
    pub presets: Vec<String>,
    pub ratio: AspectRatio,
    /// Scale factor applied to every video bitrate.
    pub bitrate_factor: f64,
    pub audio_only: bool,
    pub audio_separate: bool,
    pub prefixes: Vec<String>,
    pub poster_width: Option<u32>,
    pub poster_max_width: u32,
    pub mp4_width: Option<u32>,
    pub mp4_max_width: u32,
    /// Explicit progressive MP4 bitrate in kbit/s; derived when absent.
    pub mp4_bitrate: Option<u32>,
    pub mp4_bitrate_factor: f64,
}

impl LadderRequest {
    /// Normalize the request against the probed source dimensions.
    ///
    /// Aligns every vector to the width vector's length, zeroes bitrates of
    /// audio-only renditions, synthesizes missing display names, applies the
    /// bitrate factor, drops renditions that would upscale the source by
    /// more than 10% and derives the poster and progressive MP4 defaults.
    pub fn normalize(mut self, source: Dimensions) -> Result<RenditionPlan> {
        if self.prefixes.is_empty() {
            self.prefixes.push(String::new());
        }
        if self.audio_only || self.audio_separate {
            self.widths.push(0);
        }

        let len = self.widths.len();
        align(&mut self.bitrates, len, AlignPolicy::RepeatLast);
        align(&mut self.codecs, len, AlignPolicy::RepeatLast);
        align(&mut self.profiles, len, AlignPolicy::RepeatLast);
        align(&mut self.presets, len, AlignPolicy::RepeatLastUnlessEmpty);
        align(&mut self.names, len, AlignPolicy::TruncateOnly);

        for (width, bitrate) in self.widths.iter().zip(self.bitrates.iter_mut()) {
            if *width == 0 {
                *bitrate = 0;
            }
        }

        for i in self.names.len()..len {
            let name = if self.bitrates[i] == 0 {
                "Audio only".to_string()
            } else {
                format!("{}p", self.ratio.height_for(self.widths[i]))
            };
            self.names.push(name);
        }

        for bitrate in &mut self.bitrates {
            *bitrate = (*bitrate as f64 * self.bitrate_factor) as u32;
        }
        if let Some(bitrate) = self.mp4_bitrate {
            self.mp4_bitrate = Some((bitrate as f64 * self.bitrate_factor) as u32);
        }

        let src_w = source.width as f64;
        let src_h = source.height as f64;
        let mut i = self.widths.len();
        while i > 0 {
            i -= 1;
            let width = self.widths[i];
            let w = width as f64;
            if w > src_w * 1.1 && w * src_h / src_w > src_h * 1.1 {
                warn!("dropping {width}px rendition: larger than the {source} source");
                self.widths.remove(i);
                self.bitrates.remove(i);
                self.codecs.remove(i);
                self.profiles.remove(i);
                self.names.remove(i);
                if !self.presets.is_empty() {
                    self.presets.remove(i);
                }
            }
        }

        let poster_width = match self.poster_width {
            Some(width) => width,
            None => largest_width_within(&self.widths, self.poster_max_width)
                .unwrap_or(source.width),
        };
        let mp4_width = match self.mp4_width {
            Some(width) => width,
            None => largest_width_within(&self.widths, self.mp4_max_width)
                .unwrap_or(source.width),
        };
        let mp4_bitrate = match self.mp4_bitrate {
            Some(bitrate) => bitrate,
            None => {
                let base = self
                    .widths
                    .iter()
                    .position(|w| *w == mp4_width)
                    .map(|i| self.bitrates[i])
                    .unwrap_or_else(|| self.bitrates.first().copied().unwrap_or(0));
                (base as f64 * self.mp4_bitrate_factor) as u32
            }
        };

        let renditions = self
            .widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                Ok(Rendition {
                    width,
                    bitrate: self.bitrates[i],
                    codec: self.codecs[i].clone(),
                    profile: self.profiles[i].parse()?,
                    name: self.names[i].clone(),
                    preset: self.presets.get(i).cloned(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RenditionPlan {
            renditions,
            ratio: self.ratio,
            prefixes: self.prefixes,
            poster_width,
            mp4_width,
            mp4_bitrate,
        })
    }
}

/// The largest non-zero width not exceeding `max`.
fn largest_width_within(widths: &[u32], max: u32) -> Option<u32> {
    widths.iter().copied().filter(|w| *w > 0 && *w <= max).max()
}

/// One normalized output rendition.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendition {
    /// Output width in pixels; 0 for an audio-only rendition.
    pub width: u32,
    /// Video bitrate in kbit/s; 0 for an audio-only rendition.
    pub bitrate: u32,
    pub codec: String,
    pub profile: Profile,
    pub name: String,
    pub preset: Option<String>,
}

impl Rendition {
    /// Whether the rendition carries an encoded video track.
    pub fn has_video(&self) -> bool {
        self.bitrate > 0
    }
}

/// The normalized, deliverable rendition ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct RenditionPlan {
    /// Renditions in plan order.
    pub renditions: Vec<Rendition>,
    pub ratio: AspectRatio,
    /// Playlist path prefixes; at least one (possibly empty) entry.
    pub prefixes: Vec<String>,
    /// Poster image width in pixels.
    pub poster_width: u32,
    /// Progressive MP4 width in pixels.
    pub mp4_width: u32,
    /// Progressive MP4 bitrate in kbit/s.
    pub mp4_bitrate: u32,
}

impl RenditionPlan {
    /// Height matching `width` at the plan's display ratio.
    pub fn height_for(&self, width: u32) -> u32 {
        self.ratio.height_for(width)
    }
}
