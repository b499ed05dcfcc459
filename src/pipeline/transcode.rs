//! ffmpeg argument assembly for the transcoding run.
//!
//! A single ffmpeg invocation produces every output: the progressive MP4,
//! one HLS leg per rendition and, when codec extraction is enabled, a
//! one-frame MP4 sample per rendition. Building the arguments is pure;
//! only the overlay text files touch the filesystem, and those are
//! returned to the caller instead of written here.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use hlspack_av::{ArgList, AudioStream, SourceInfo};
use hlspack_media::{Dimensions, Profile, Rendition, RenditionPlan, TemplateContext};

use crate::cli::{Cli, SegmentType};

/// A media playlist produced by the transcoding run.
#[derive(Debug, Clone)]
pub struct PlaylistEntry {
    /// File name of the media playlist, relative to the output directory.
    pub name: String,
    /// Encoded resolution, absent for renditions without video.
    pub resolution: Option<Dimensions>,
}

/// An overlay text file to write before running ffmpeg.
#[derive(Debug, Clone)]
pub struct OverlayFile {
    pub name: String,
    pub text: String,
}

/// Everything needed to transcode and then assemble the master playlist.
#[derive(Debug)]
pub struct TranscodeJob {
    /// Arguments for the single ffmpeg invocation.
    pub args: ArgList,
    /// Overlay text files referenced by drawtext filters in `args`.
    pub overlays: Vec<OverlayFile>,
    /// Media playlists in rendition order.
    pub playlists: Vec<PlaylistEntry>,
}

/// Build the ffmpeg invocation for `plan` applied to `input`.
pub fn build_transcode_job(
    cli: &Cli,
    source: &SourceInfo,
    plan: &RenditionPlan,
    input: &Path,
) -> Result<TranscodeJob> {
    let video = &source.video;
    let source_dims = Dimensions::new(video.width, video.height);
    let fps = video.frame_rate.fps();
    let keyframe_interval = (fps * f64::from(cli.hls_time)).ceil() as u32;
    info!(
        "input video is {}x{} at {:.2}fps",
        video.width, video.height, fps
    );
    if let Some(audio) = &source.audio {
        info!(
            "input audio is {} channels at {}Hz",
            audio.channels.map_or_else(|| "?".into(), |c| c.to_string()),
            audio.sample_rate.map_or_else(|| "?".into(), |r| r.to_string()),
        );
    }

    let mut args = ArgList::new();
    args.note("only log errors");
    args.args(["-loglevel", "error", "-hide_banner"]);
    args.note("input file");
    args.arg("-i");
    args.arg(input.display());

    let audio_args = match &source.audio {
        Some(audio) if cli.audio() => build_audio_args(cli, audio),
        _ => ArgList::new(),
    };

    let mut overlays = Vec::new();

    if cli.mp4() {
        let leg = build_mp4_leg(cli, plan, source_dims, video.index, &audio_args, &mut overlays)?;
        args.extend(leg);
    }

    let mut playlists = Vec::new();
    for (index, rendition) in plan.renditions.iter().enumerate() {
        debug!("set up HLS rendition {}", rendition.name);
        let context = rendition_context(rendition, plan);
        let video_args = build_rendition_video_args(
            cli,
            plan,
            rendition,
            index,
            source_dims,
            video.index,
            &context,
            &mut overlays,
        );

        let resolution = plan.height_for(rendition.width);
        args.note(format!("HLS rendition {index} ({resolution}p)"));
        args.args(["-f", "hls"]);
        args.extend(video_args.clone());
        // In separate-audio mode only renditions without video carry the
        // audio track; the rest reference it through the audio group.
        if !cli.audio_separate || !rendition.has_video() {
            args.extend(audio_args.clone());
        }
        args.note("segment duration");
        args.arg("-hls_time");
        args.arg(cli.hls_time);
        args.note(format!(
            "force a keyframe at each segment boundary (fps={fps:.3})"
        ));
        args.arg("-g");
        args.arg(keyframe_interval);
        args.arg("-keyint_min");
        args.arg(keyframe_interval);
        args.note("playlist type");
        args.args(["-hls_playlist_type", "vod"]);
        args.note("keep every segment in the playlist");
        args.args(["-hls_list_size", "0"]);
        args.note("segment container");
        args.arg("-hls_segment_type");
        args.arg(cli.hls_type.ffmpeg_name());
        args.note("base URL prepended to segment names");
        args.arg("-hls_base_url");
        args.arg(&cli.hls_segment_prefix);
        args.note("segment filename pattern");
        args.arg("-hls_segment_filename");
        args.arg(format!(
            "{}.{}",
            with_index(&context, format!("{index}_%03d")).substitute(&cli.hls_segments),
            cli.hls_type.segment_extension()
        ));
        if cli.hls_type == SegmentType::Fmp4 {
            args.note("initialization segment");
            args.arg("-hls_fmp4_init_filename");
            args.arg(format!(
                "{}.mp4",
                with_index(&context, format!("{index}_init")).substitute(&cli.hls_segments)
            ));
        }
        let playlist_name = format!(
            "{}.m3u8",
            with_index(&context, index).substitute(&cli.hls_segments)
        );
        args.arg(&playlist_name);
        playlists.push(PlaylistEntry {
            name: playlist_name,
            resolution: rendition.has_video().then(|| {
                source_dims.fit_within(Dimensions::new(rendition.width, resolution))
            }),
        });

        if cli.codecs_enabled() {
            args.note("one-frame MP4 sample for codec extraction");
            args.args(["-f", "mp4"]);
            args.extend(video_args);
            args.extend(audio_args.clone());
            args.note("keep a single frame");
            args.args(["-frames:v", "1"]);
            args.arg(sample_name(index));
        }
    }

    Ok(TranscodeJob {
        args,
        overlays,
        playlists,
    })
}

/// Name of the one-frame codec sample for rendition `index`.
pub fn sample_name(index: usize) -> String {
    format!("_{index}.mp4")
}

fn build_audio_args(cli: &Cli, audio: &AudioStream) -> ArgList {
    let mut args = ArgList::new();
    args.note("map the audio track");
    args.arg("-map");
    args.arg(format!("0:{}", audio.index));
    args.note("audio codec");
    args.arg("-c:a");
    args.arg(&cli.audio_codec);
    // Without a requested or reported rate the encoder picks one.
    if let Some(rate) = cli.audio_sampling.or(audio.sample_rate) {
        args.note("sampling rate");
        args.arg("-ar");
        args.arg(rate);
    }
    args.note("audio profile");
    args.arg("-profile:a");
    args.arg(&cli.audio_profile);
    args.note("audio bitrate");
    args.arg("-b:a");
    args.arg(format!("{}k", cli.audio_bitrate));
    args
}

fn build_mp4_leg(
    cli: &Cli,
    plan: &RenditionPlan,
    source_dims: Dimensions,
    video_index: u32,
    audio_args: &ArgList,
    overlays: &mut Vec<OverlayFile>,
) -> Result<ArgList> {
    let resolution = plan.height_for(plan.mp4_width);
    let fitted = source_dims.fit_within(Dimensions::new(plan.mp4_width, resolution));
    info!(
        "progressive MP4 is {fitted} at {}kbps",
        plan.mp4_bitrate
    );

    let profile: Profile = cli.mp4_profile.parse()?;
    let mut filters = Vec::new();
    if let Some(template) = &cli.mp4_overlay {
        let context = TemplateContext::new()
            .with_var("width", plan.mp4_width)
            .with_var("resolution", resolution)
            .with_var("bitrate", plan.mp4_bitrate)
            .with_var("codec", &cli.mp4_codec)
            .with_var("profile", &cli.mp4_profile);
        overlays.push(OverlayFile {
            name: "_mp4.txt".to_string(),
            text: context.substitute(template),
        });
        filters.push(drawtext_filter("_mp4.txt"));
    }
    filters.push(format!("scale={}:{}", fitted.width, fitted.height));
    filters.push("format=yuv420p".to_string());

    let mut args = ArgList::new();
    args.note("progressive MP4 fallback");
    args.args(["-f", "mp4"]);
    args.note("map the video track");
    args.arg("-map");
    args.arg(format!("0:{video_index}"));
    args.note("filter chain");
    args.arg("-vf");
    args.arg(filters.join(","));
    args.note("video codec");
    args.arg("-c:v");
    args.arg(&cli.mp4_codec);
    args.note("video profile and level");
    args.arg("-profile:v");
    args.arg(&profile.name);
    args.arg("-level:v");
    args.arg(&profile.level);
    args.note("constrain the video bitrate");
    args.arg("-b:v");
    args.arg(format!("{}k", plan.mp4_bitrate));
    args.arg("-maxrate:v");
    args.arg(format!("{}k", plan.mp4_bitrate));
    args.arg("-bufsize:v");
    args.arg(format!("{}k", plan.mp4_bitrate * 3 / 2));
    if let Some(preset) = &cli.mp4_preset {
        args.note("encoder preset");
        args.arg("-preset");
        args.arg(preset);
    }
    args.extend(audio_args.clone());
    args.note("front-load the index for streaming");
    args.args(["-movflags", "+faststart"]);
    args.note("progressive MP4 output");
    args.arg(&cli.mp4_filename);
    Ok(args)
}

#[allow(clippy::too_many_arguments)]
fn build_rendition_video_args(
    cli: &Cli,
    plan: &RenditionPlan,
    rendition: &Rendition,
    index: usize,
    source_dims: Dimensions,
    video_index: u32,
    context: &TemplateContext,
    overlays: &mut Vec<OverlayFile>,
) -> ArgList {
    let mut args = ArgList::new();
    if !rendition.has_video() {
        args.note("no video");
        return args;
    }

    let resolution = plan.height_for(rendition.width);
    let fitted = source_dims.fit_within(Dimensions::new(rendition.width, resolution));
    let mut filters = Vec::new();
    if let Some(template) = &cli.video_overlay {
        let name = format!("_{index}.txt");
        overlays.push(OverlayFile {
            name: name.clone(),
            text: context.substitute(template),
        });
        filters.push(drawtext_filter(&name));
    }
    filters.push(format!("scale={}:{}", fitted.width, fitted.height));
    filters.push("format=yuv420p".to_string());

    args.note("map the video track");
    args.arg("-map");
    args.arg(format!("0:{video_index}"));
    args.note("filter chain");
    args.arg("-vf");
    args.arg(filters.join(","));
    args.note("video codec");
    args.arg("-c:v");
    args.arg(&rendition.codec);
    args.note("video profile and level");
    args.arg("-profile:v");
    args.arg(&rendition.profile.name);
    args.arg("-level:v");
    args.arg(&rendition.profile.level);
    args.note("constrain the video bitrate");
    args.arg("-b:v");
    args.arg(format!("{}k", rendition.bitrate));
    args.arg("-maxrate:v");
    args.arg(format!("{}k", rendition.bitrate));
    args.arg("-bufsize:v");
    args.arg(format!("{}k", rendition.bitrate * 3 / 2));
    if let Some(preset) = &rendition.preset {
        args.note("encoder preset");
        args.arg("-preset");
        args.arg(preset);
    }
    args
}

/// Template variables shared by segment names and overlay text.
fn rendition_context(rendition: &Rendition, plan: &RenditionPlan) -> TemplateContext {
    TemplateContext::new()
        .with_var("width", rendition.width)
        .with_var("resolution", plan.height_for(rendition.width))
        .with_var("bitrate", rendition.bitrate)
        .with_var("codec", &rendition.codec)
        .with_var("name", &rendition.name)
        .with_var("profile", &rendition.profile)
}

fn with_index(context: &TemplateContext, index: impl ToString) -> TemplateContext {
    let mut context = context.clone();
    context.set("index", index);
    context
}

fn drawtext_filter(textfile: &str) -> String {
    format!(
        "drawtext=x=10: y=10: textfile={textfile}: fontsize=48: \
         fontcolor=white@0.5: borderw=3: bordercolor=black@0.5"
    )
}
