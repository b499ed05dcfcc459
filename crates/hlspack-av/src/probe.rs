//! Source probing via ffprobe.

use std::path::Path;

use serde::Deserialize;

use crate::runner::{run_tool, ArgList};
use crate::{Error, Result};

/// A frame rate kept as the rational ffprobe reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    /// Frames per second as a floating point number.
    pub fn fps(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

/// Facts about the source's video stream.
#[derive(Debug, Clone)]
pub struct VideoStream {
    /// Global stream index, usable in `-map 0:N`.
    pub index: u32,
    pub width: u32,
    pub height: u32,
    /// Duration in seconds.
    pub duration: f64,
    pub frame_rate: FrameRate,
}

/// Facts about the source's audio stream.
#[derive(Debug, Clone)]
pub struct AudioStream {
    /// Global stream index, usable in `-map 0:N`.
    pub index: u32,
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
}

/// Probed technical facts about a source file.
///
/// Only the first video and the first audio stream are kept; the video
/// stream is mandatory.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub video: VideoStream,
    pub audio: Option<AudioStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
}

/// Probe a media file using ffprobe.
pub fn probe(ffprobe: &Path, input: &Path) -> Result<SourceInfo> {
    let mut args = ArgList::new();
    args.note("probe");
    args.args([
        "-v",
        "quiet",
        "-print_format",
        "json",
        "-show_entries",
        "format=duration:streams",
    ]);
    args.arg(input.display());

    let stdout = run_tool(ffprobe, &args, None)?;
    parse_probe_output(&stdout, input)
}

fn parse_probe_output(json: &str, input: &Path) -> Result<SourceInfo> {
    let output: FfprobeOutput = serde_json::from_str(json)?;

    let format_duration = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok());

    let mut video: Option<VideoStream> = None;
    let mut audio: Option<AudioStream> = None;
    for stream in &output.streams {
        match stream.codec_type.as_deref() {
            Some("video") if video.is_none() => {
                let width = stream
                    .width
                    .ok_or_else(|| Error::parse_error("ffprobe", "video stream has no width"))?;
                let height = stream
                    .height
                    .ok_or_else(|| Error::parse_error("ffprobe", "video stream has no height"))?;
                let duration = stream
                    .duration
                    .as_deref()
                    .and_then(|s| s.parse::<f64>().ok())
                    .or(format_duration)
                    .ok_or_else(|| Error::parse_error("ffprobe", "no duration reported"))?;
                let frame_rate = stream
                    .r_frame_rate
                    .as_deref()
                    .and_then(parse_frame_rate)
                    .or_else(|| stream.avg_frame_rate.as_deref().and_then(parse_frame_rate))
                    .ok_or_else(|| Error::parse_error("ffprobe", "no usable frame rate"))?;
                video = Some(VideoStream {
                    index: stream.index,
                    width,
                    height,
                    duration,
                    frame_rate,
                });
            }
            Some("audio") if audio.is_none() => {
                audio = Some(AudioStream {
                    index: stream.index,
                    channels: stream.channels,
                    sample_rate: stream.sample_rate.as_deref().and_then(|s| s.parse().ok()),
                });
            }
            _ => {}
        }
    }

    let video = video.ok_or_else(|| Error::no_video_stream(input))?;
    Ok(SourceInfo { video, audio })
}

/// Parse `num/den` (or a plain integer) into a usable frame rate.
fn parse_frame_rate(text: &str) -> Option<FrameRate> {
    let (num, den) = match text.split_once('/') {
        Some((num, den)) => (num.parse().ok()?, den.parse().ok()?),
        None => (text.parse().ok()?, 1),
    };
    if num == 0 || den == 0 {
        return None;
    }
    Some(FrameRate { num, den })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const FULL: &str = r#"{
        "format": {"duration": "60.000000"},
        "streams": [
            {
                "index": 0,
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "duration": "59.975000",
                "avg_frame_rate": "30000/1001",
                "r_frame_rate": "30000/1001"
            },
            {
                "index": 1,
                "codec_type": "audio",
                "channels": 2,
                "sample_rate": "48000",
                "avg_frame_rate": "0/0",
                "r_frame_rate": "0/0"
            }
        ]
    }"#;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(
            parse_frame_rate("30000/1001"),
            Some(FrameRate { num: 30000, den: 1001 })
        );
        assert_eq!(parse_frame_rate("25"), Some(FrameRate { num: 25, den: 1 }));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("30000/0"), None);
        assert_eq!(parse_frame_rate("invalid"), None);
    }

    #[test]
    fn test_parse_full_output() {
        let info = parse_probe_output(FULL, Path::new("in.mp4")).unwrap();

        assert_eq!(info.video.index, 0);
        assert_eq!(info.video.width, 1920);
        assert_eq!(info.video.height, 1080);
        assert_eq!(info.video.duration, 59.975);
        assert!((info.video.frame_rate.fps() - 29.97).abs() < 0.01);

        let audio = info.audio.unwrap();
        assert_eq!(audio.index, 1);
        assert_eq!(audio.channels, Some(2));
        assert_eq!(audio.sample_rate, Some(48000));
    }

    #[test]
    fn test_duration_falls_back_to_format() {
        let json = r#"{
            "format": {"duration": "60.000000"},
            "streams": [
                {"index": 0, "codec_type": "video", "width": 1280, "height": 720,
                 "r_frame_rate": "25/1"}
            ]
        }"#;
        let info = parse_probe_output(json, Path::new("in.mp4")).unwrap();
        assert_eq!(info.video.duration, 60.0);
    }

    #[test]
    fn test_frame_rate_falls_back_to_average() {
        let json = r#"{
            "format": {"duration": "10"},
            "streams": [
                {"index": 0, "codec_type": "video", "width": 1280, "height": 720,
                 "avg_frame_rate": "25/1", "r_frame_rate": "0/0"}
            ]
        }"#;
        let info = parse_probe_output(json, Path::new("in.mp4")).unwrap();
        assert_eq!(info.video.frame_rate, FrameRate { num: 25, den: 1 });
    }

    #[test]
    fn test_no_video_stream_rejected() {
        let json = r#"{
            "format": {"duration": "60"},
            "streams": [{"index": 0, "codec_type": "audio", "channels": 2}]
        }"#;
        assert_matches!(
            parse_probe_output(json, Path::new("in.mp4")),
            Err(Error::NoVideoStream { .. })
        );
    }

    #[test]
    fn test_second_video_stream_ignored() {
        let json = r#"{
            "format": {"duration": "60"},
            "streams": [
                {"index": 0, "codec_type": "video", "width": 1920, "height": 1080,
                 "r_frame_rate": "25/1"},
                {"index": 1, "codec_type": "video", "width": 640, "height": 360,
                 "r_frame_rate": "25/1"}
            ]
        }"#;
        let info = parse_probe_output(json, Path::new("in.mp4")).unwrap();
        assert_eq!(info.video.width, 1920);
    }
}
