use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use hlspack_media::{AspectRatio, LadderRequest, SeekPosition};

/// Container format for HLS media segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SegmentType {
    /// MPEG-TS segments, playable by every HLS client.
    Mpegts,
    /// Fragmented MP4 segments, HLS version 7.
    Fmp4,
}

impl SegmentType {
    /// Value for ffmpeg's `-hls_segment_type`.
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            Self::Mpegts => "mpegts",
            Self::Fmp4 => "fmp4",
        }
    }

    /// File extension of produced segments.
    pub fn segment_extension(self) -> &'static str {
        match self {
            Self::Mpegts => "ts",
            Self::Fmp4 => "mp4",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "hlspack")]
#[command(author, version, about = "Convert a video to HLS renditions with poster and MP4 fallback")]
pub struct Cli {
    /// Input video file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output directory (defaults to the input name without extension)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Overwrite the output directory if it exists
    #[arg(long)]
    pub output_overwrite: bool,

    /// Target aspect ratio, as `width:height`
    #[arg(long, default_value = "16:9")]
    pub ratio: AspectRatio,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "silent")]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long)]
    pub silent: bool,

    /// Container format for media segments
    #[arg(long, value_enum, default_value_t = SegmentType::Mpegts, help_heading = "HLS")]
    pub hls_type: SegmentType,

    /// Duration of each segment in seconds
    #[arg(long, default_value_t = 6, help_heading = "HLS")]
    pub hls_time: u32,

    /// Naming pattern for segments and media playlists
    #[arg(long, value_name = "PATTERN", default_value = "{resolution}p_{index}", help_heading = "HLS")]
    pub hls_segments: String,

    /// Prefix for segment URLs inside media playlists
    #[arg(long, default_value = "", hide_default_value = true, help_heading = "HLS")]
    pub hls_segment_prefix: String,

    /// Prefixes for media playlist URLs in the master playlist
    #[arg(long, num_args = 1.., help_heading = "HLS")]
    pub hls_playlist_prefix: Vec<String>,

    /// Master playlist file name
    #[arg(long, default_value = "index.m3u8", help_heading = "HLS")]
    pub hls_master_playlist: String,

    /// Skip codec information in the master playlist
    #[arg(long, help_heading = "HLS")]
    pub hls_no_codecs: bool,

    /// Widths of the renditions to produce
    #[arg(long, num_args = 1.., default_values_t = [3840u32, 2560, 1920, 1280, 854, 640, 428], help_heading = "Video")]
    pub video_widths: Vec<u32>,

    /// Video bitrates in kbit/s, matching the requested widths
    #[arg(long, num_args = 1.., default_values_t = [14000u32, 6500, 4500, 2500, 1300, 800, 400], help_heading = "Video")]
    pub video_bitrates: Vec<u32>,

    /// Video codecs, matching the requested widths
    #[arg(long, num_args = 1.., default_values_t = [String::from("h264")], help_heading = "Video")]
    pub video_codecs: Vec<String>,

    /// Encoder profiles as `name@level`, matching the requested widths
    #[arg(long, num_args = 1.., default_values_t = [
        String::from("high@5.1"),
        String::from("high@5.1"),
        String::from("main@3.2"),
        String::from("main@3.1"),
    ], help_heading = "Video")]
    pub video_profiles: Vec<String>,

    /// Display names for renditions (derived from heights when absent)
    #[arg(long, num_args = 1.., help_heading = "Video")]
    pub video_names: Vec<String>,

    /// Text overlay template to burn into each rendition
    #[arg(long, value_name = "TEMPLATE", help_heading = "Video")]
    pub video_overlay: Option<String>,

    /// Factor applied to all video bitrates
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0, help_heading = "Video")]
    pub video_bitrate_factor: f64,

    /// Encoder presets, matching the requested widths
    #[arg(long, num_args = 1.., help_heading = "Video")]
    pub video_presets: Vec<String>,

    /// Do not include an audio track
    #[arg(long, help_heading = "Audio")]
    pub no_audio: bool,

    /// Audio sampling rate in Hz (defaults to the source rate)
    #[arg(long, value_name = "RATE", help_heading = "Audio")]
    pub audio_sampling: Option<u32>,

    /// Audio bitrate in kbit/s
    #[arg(long, default_value_t = 96, help_heading = "Audio")]
    pub audio_bitrate: u32,

    /// Audio codec
    #[arg(long, default_value = "aac", help_heading = "Audio")]
    pub audio_codec: String,

    /// Audio encoder profile
    #[arg(long, default_value = "aac_low", help_heading = "Audio")]
    pub audio_profile: String,

    /// Only produce an audio rendition
    #[arg(long, help_heading = "Audio")]
    pub audio_only: bool,

    /// Put audio in a separate rendition shared by all variants
    #[arg(long, help_heading = "Audio")]
    pub audio_separate: bool,

    /// Do not build the progressive MP4 fallback
    #[arg(long, help_heading = "Progressive MP4")]
    pub no_mp4: bool,

    /// Width of the progressive MP4
    #[arg(long, value_name = "WIDTH", help_heading = "Progressive MP4")]
    pub mp4_width: Option<u32>,

    /// Maximum width of the progressive MP4
    #[arg(long, value_name = "WIDTH", default_value_t = 1280, help_heading = "Progressive MP4")]
    pub mp4_max_width: u32,

    /// Factor applied to the progressive MP4 bitrate
    #[arg(long, value_name = "FACTOR", default_value_t = 0.8, help_heading = "Progressive MP4")]
    pub mp4_bitrate_factor: f64,

    /// Bitrate of the progressive MP4 in kbit/s
    #[arg(long, value_name = "BITRATE", help_heading = "Progressive MP4")]
    pub mp4_bitrate: Option<u32>,

    /// Codec for the progressive MP4
    #[arg(long, default_value = "h264", help_heading = "Progressive MP4")]
    pub mp4_codec: String,

    /// Encoder profile for the progressive MP4, as `name@level`
    #[arg(long, default_value = "main@3.1", help_heading = "Progressive MP4")]
    pub mp4_profile: String,

    /// Text overlay template to burn into the progressive MP4
    #[arg(long, value_name = "TEMPLATE", help_heading = "Progressive MP4")]
    pub mp4_overlay: Option<String>,

    /// File name of the progressive MP4
    #[arg(long, default_value = "progressive.mp4", help_heading = "Progressive MP4")]
    pub mp4_filename: String,

    /// Encoder preset for the progressive MP4
    #[arg(long, help_heading = "Progressive MP4")]
    pub mp4_preset: Option<String>,

    /// Do not extract a poster image
    #[arg(long, help_heading = "Poster")]
    pub no_poster: bool,

    /// JPEG quality of the poster, from 0 to 100
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100), default_value_t = 10, help_heading = "Poster")]
    pub poster_quality: u32,

    /// Convert the poster to grayscale
    #[arg(long, help_heading = "Poster")]
    pub poster_grayscale: bool,

    /// File name of the poster
    #[arg(long, default_value = "poster.jpg", help_heading = "Poster")]
    pub poster_filename: String,

    /// Position of the poster frame, as `N%` of the duration or `Ns`
    #[arg(long, default_value = "5%", help_heading = "Poster")]
    pub poster_seek: SeekPosition,

    /// Width of the poster
    #[arg(long, value_name = "WIDTH", help_heading = "Poster")]
    pub poster_width: Option<u32>,

    /// Maximum width of the poster
    #[arg(long, value_name = "WIDTH", default_value_t = 1280, help_heading = "Poster")]
    pub poster_max_width: u32,

    /// Path to the ffmpeg executable
    #[arg(long, default_value = "ffmpeg", help_heading = "Programs")]
    pub ffmpeg: String,

    /// Path to the ffprobe executable
    #[arg(long, default_value = "ffprobe", help_heading = "Programs")]
    pub ffprobe: String,

    /// Path to the mp4file executable
    #[arg(long, default_value = "mp4file", help_heading = "Programs")]
    pub mp4file: String,
}

impl Cli {
    /// Whether renditions carry an audio track.
    pub fn audio(&self) -> bool {
        !self.no_audio
    }

    /// Whether the progressive MP4 fallback is built.
    pub fn mp4(&self) -> bool {
        !self.no_mp4
    }

    /// Whether a poster image is extracted.
    pub fn poster(&self) -> bool {
        !self.no_poster
    }

    /// Whether codec identifiers are added to the master playlist.
    pub fn codecs_enabled(&self) -> bool {
        !self.hls_no_codecs
    }

    /// Assemble the rendition ladder request from the video, audio and
    /// MP4 options.
    pub fn ladder_request(&self) -> LadderRequest {
        LadderRequest {
            widths: self.video_widths.clone(),
            bitrates: self.video_bitrates.clone(),
            codecs: self.video_codecs.clone(),
            profiles: self.video_profiles.clone(),
            names: self.video_names.clone(),
            presets: self.video_presets.clone(),
            ratio: self.ratio,
            bitrate_factor: self.video_bitrate_factor,
            audio_only: self.audio_only,
            audio_separate: self.audio_separate,
            prefixes: self.hls_playlist_prefix.clone(),
            poster_width: self.poster_width,
            poster_max_width: self.poster_max_width,
            mp4_width: self.mp4_width,
            mp4_max_width: self.mp4_max_width,
            mp4_bitrate: self.mp4_bitrate,
            mp4_bitrate_factor: self.mp4_bitrate_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["hlspack", "input.mp4"]);
        assert_eq!(cli.input, PathBuf::from("input.mp4"));
        assert_eq!(cli.hls_type, SegmentType::Mpegts);
        assert_eq!(cli.hls_time, 6);
        assert_eq!(cli.hls_segments, "{resolution}p_{index}");
        assert_eq!(cli.hls_master_playlist, "index.m3u8");
        assert_eq!(cli.video_widths, vec![3840, 2560, 1920, 1280, 854, 640, 428]);
        assert_eq!(cli.video_bitrates, vec![14000, 6500, 4500, 2500, 1300, 800, 400]);
        assert_eq!(cli.video_codecs, vec!["h264"]);
        assert_eq!(cli.audio_bitrate, 96);
        assert_eq!(cli.poster_seek, SeekPosition::Percent(5));
        assert!(cli.audio());
        assert!(cli.mp4());
        assert!(cli.poster());
        assert!(cli.codecs_enabled());
    }

    #[test]
    fn test_segment_type_values() {
        assert_eq!(SegmentType::Mpegts.ffmpeg_name(), "mpegts");
        assert_eq!(SegmentType::Mpegts.segment_extension(), "ts");
        assert_eq!(SegmentType::Fmp4.ffmpeg_name(), "fmp4");
        assert_eq!(SegmentType::Fmp4.segment_extension(), "mp4");
    }

    #[test]
    fn test_debug_and_silent_conflict() {
        let result = Cli::try_parse_from(["hlspack", "--debug", "--silent", "input.mp4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_multi_value_options() {
        let cli = Cli::parse_from([
            "hlspack",
            "input.mp4",
            "--video-widths",
            "1920",
            "1280",
            "--video-bitrates",
            "4000",
            "2000",
            "--hls-playlist-prefix",
            "https://a.example.net/",
            "https://b.example.net/",
        ]);
        assert_eq!(cli.input, PathBuf::from("input.mp4"));
        assert_eq!(cli.video_widths, vec![1920, 1280]);
        assert_eq!(cli.video_bitrates, vec![4000, 2000]);
        assert_eq!(cli.hls_playlist_prefix.len(), 2);
    }

    #[test]
    fn test_multi_value_options_swallow_trailing_words() {
        // A bare word after a multi-value flag is read as another value,
        // so the input path has to come before such flags.
        let result = Cli::try_parse_from([
            "hlspack",
            "--hls-playlist-prefix",
            "https://cdn.example.net/",
            "input.mp4",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ladder_request_mapping() {
        let cli = Cli::parse_from([
            "hlspack",
            "--video-widths",
            "1280",
            "--video-bitrates",
            "2500",
            "--audio-separate",
            "--ratio",
            "4:3",
            "input.mp4",
        ]);
        let request = cli.ladder_request();
        assert_eq!(request.widths, vec![1280]);
        assert_eq!(request.bitrates, vec![2500]);
        assert!(request.audio_separate);
        assert!(!request.audio_only);
        assert_eq!(request.ratio, AspectRatio::new(4, 3));
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let result = Cli::try_parse_from(["hlspack", "--ratio", "16x9", "input.mp4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_poster_seek_rejected() {
        let result = Cli::try_parse_from(["hlspack", "--poster-seek", "12", "input.mp4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_poster_quality_range() {
        let result = Cli::try_parse_from(["hlspack", "--poster-quality", "101", "input.mp4"]);
        assert!(result.is_err());
    }
}
