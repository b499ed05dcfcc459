//! Master playlist and fallback HTML assembly.

use hlspack_av::SourceInfo;
use hlspack_media::{FallbackSource, MasterPlaylist, RenditionPlan, VariantStream, VideoTag};

use super::transcode::PlaylistEntry;
use crate::cli::Cli;

/// Assemble the master playlist for the produced renditions.
pub fn build_master_playlist(
    cli: &Cli,
    plan: &RenditionPlan,
    playlists: &[PlaylistEntry],
    codecs: &[Option<String>],
    source: &SourceInfo,
) -> String {
    let mut master = MasterPlaylist::new(plan.prefixes.clone());
    if cli.audio_separate {
        if let Some(audio) = playlists.last() {
            master = master.with_audio_group(&audio.name);
        }
    }

    // Variants stream their audio alongside the video, or fetch the shared
    // audio rendition next to it; either way the bandwidth adds up.
    let audio_bandwidth = if source.audio.is_some() && cli.audio() {
        cli.audio_bitrate
    } else {
        0
    };
    let fps = source.video.frame_rate.fps();

    for (index, rendition) in plan.renditions.iter().enumerate() {
        // The audio-only rendition appended for separate delivery is
        // reachable through the audio group, not as a variant of its own.
        if !cli.audio_only && !rendition.has_video() {
            continue;
        }
        let entry = &playlists[index];
        master.add_variant(VariantStream {
            playlist: entry.name.clone(),
            bandwidth: (rendition.bitrate + audio_bandwidth) * 1000,
            resolution: entry.resolution,
            frame_rate: entry.resolution.is_some().then_some(fps),
            codecs: codecs.get(index).cloned().flatten(),
            name: rendition.name.clone(),
        });
    }
    master.render()
}

/// Assemble the copy-paste `<video>` element.
pub fn build_video_tag(cli: &Cli, mp4_codecs: Option<String>) -> String {
    VideoTag {
        master_playlist: cli.hls_master_playlist.clone(),
        poster: cli.poster().then(|| cli.poster_filename.clone()),
        fallback: cli.mp4().then(|| FallbackSource {
            filename: cli.mp4_filename.clone(),
            codecs: mp4_codecs,
        }),
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transcode::build_transcode_job;
    use clap::Parser;
    use hlspack_av::{AudioStream, FrameRate, VideoStream};
    use hlspack_media::Dimensions;
    use std::path::Path;

    fn source_1080p() -> SourceInfo {
        SourceInfo {
            video: VideoStream {
                index: 0,
                width: 1920,
                height: 1080,
                duration: 120.0,
                frame_rate: FrameRate { num: 25, den: 1 },
            },
            audio: Some(AudioStream {
                index: 1,
                channels: Some(2),
                sample_rate: Some(44100),
            }),
        }
    }

    fn master_for(argv: &[&str], codecs: &[Option<String>]) -> String {
        // The input path goes first; multi-value flags would swallow it.
        let mut full = vec!["hlspack", "input.mp4"];
        full.extend_from_slice(argv);
        let cli = Cli::parse_from(full);
        let source = source_1080p();
        let plan = cli
            .ladder_request()
            .normalize(Dimensions::new(source.video.width, source.video.height))
            .unwrap();
        let job = build_transcode_job(&cli, &source, &plan, Path::new("input.mp4")).unwrap();
        build_master_playlist(&cli, &plan, &job.playlists, codecs, &source)
    }

    #[test]
    fn test_variant_attributes() {
        let text = master_for(
            &["--video-widths", "1920", "1280", "--video-bitrates", "4500", "2500"],
            &[None, None],
        );
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "#EXTM3U");
        assert_eq!(lines[1], "#EXT-X-VERSION:3");
        assert_eq!(
            lines[2],
            "#EXT-X-STREAM-INF:BANDWIDTH=4596000,RESOLUTION=1920x1080,\
             FRAME-RATE=25.000,NAME=\"1080p\""
        );
        assert_eq!(lines[3], "1080p_0.m3u8");
        assert_eq!(
            lines[4],
            "#EXT-X-STREAM-INF:BANDWIDTH=2596000,RESOLUTION=1280x720,\
             FRAME-RATE=25.000,NAME=\"720p\""
        );
        assert_eq!(lines[5], "720p_1.m3u8");
    }

    #[test]
    fn test_codecs_attribute_per_rendition() {
        let text = master_for(
            &["--video-widths", "1280", "--video-bitrates", "2500"],
            &[Some("avc1.64001f,mp4a.40.2".to_string())],
        );
        assert!(text.contains("CODECS=\"avc1.64001f,mp4a.40.2\",NAME=\"720p\""));
    }

    #[test]
    fn test_no_audio_lowers_bandwidth() {
        let text = master_for(
            &["--no-audio", "--video-widths", "1280", "--video-bitrates", "2500"],
            &[None],
        );
        assert!(text.contains("BANDWIDTH=2500000,"));
    }

    #[test]
    fn test_separate_audio_group() {
        let text = master_for(
            &[
                "--audio-separate",
                "--video-widths",
                "1280",
                "640",
                "--video-bitrates",
                "2500",
                "800",
            ],
            &[None, None, None],
        );
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[1], "#EXT-X-VERSION:4");
        assert_eq!(
            lines[2],
            "#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"audio\",DEFAULT=yes,\
             AUTOSELECT=yes,URI=\"0p_2.m3u8\""
        );
        // The audio-only rendition is only reachable through the group.
        assert_eq!(text.matches("#EXT-X-STREAM-INF").count(), 2);
        assert!(text.contains("AUDIO=\"audio\""));
        assert_eq!(text.matches("0p_2.m3u8").count(), 1);
    }

    #[test]
    fn test_audio_only_variant_kept() {
        let text = master_for(
            &["--audio-only", "--video-widths", "1280", "--video-bitrates", "2500"],
            &[None, None],
        );

        // The appended audio-only rendition stays a variant, without
        // resolution or frame rate.
        assert!(text.contains("#EXT-X-STREAM-INF:BANDWIDTH=96000,NAME=\"Audio only\""));
        assert!(text.contains("0p_1.m3u8"));
    }

    #[test]
    fn test_playlist_prefixes_replicate_variants() {
        let text = master_for(
            &[
                "--hls-playlist-prefix",
                "https://a.example.net/",
                "https://b.example.net/",
                "--video-widths",
                "1280",
                "--video-bitrates",
                "2500",
            ],
            &[None],
        );

        assert_eq!(text.matches("#EXT-X-STREAM-INF").count(), 2);
        assert!(text.contains("https://a.example.net/720p_0.m3u8"));
        assert!(text.contains("https://b.example.net/720p_0.m3u8"));
    }

    #[test]
    fn test_video_tag_defaults() {
        let cli = Cli::parse_from(["hlspack", "input.mp4"]);
        let html = build_video_tag(&cli, Some("avc1.4d401f".to_string()));

        assert!(html.starts_with("<video controls poster=\"poster.jpg\">"));
        assert!(html.contains("src=\"index.m3u8\" type=\"application/vnd.apple.mpegurl\""));
        assert!(html.contains("src=\"progressive.mp4\" type='video/mp4; codecs=\"avc1.4d401f\"'"));
    }

    #[test]
    fn test_video_tag_without_poster_and_fallback() {
        let cli = Cli::parse_from(["hlspack", "--no-poster", "--no-mp4", "input.mp4"]);
        let html = build_video_tag(&cli, None);

        assert!(html.starts_with("<video controls>"));
        assert!(!html.contains("video/mp4"));
    }
}
