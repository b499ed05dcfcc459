//! Poster image extraction.

use std::path::Path;

use tracing::{debug, info};

use hlspack_av::{ArgList, VideoStream};
use hlspack_media::{Dimensions, RenditionPlan};

use crate::cli::Cli;

/// Build the ffmpeg invocation that extracts the poster frame.
///
/// Seeks to the requested position, keeps the first I-frame there and
/// scales it to the poster width from the plan.
pub fn build_poster_args(
    cli: &Cli,
    video: &VideoStream,
    plan: &RenditionPlan,
    input: &Path,
) -> ArgList {
    let seek = cli.poster_seek.resolve(video.duration);
    debug!("poster frame comes from {seek}s into the source");

    let bounds = Dimensions::new(plan.poster_width, plan.height_for(plan.poster_width));
    let fitted = Dimensions::new(video.width, video.height).fit_within(bounds);
    info!("poster is {fitted}");

    let mut filters = vec![
        "select=eq(pict_type\\,I)".to_string(),
        format!("scale={}:{}", fitted.width, fitted.height),
    ];
    if cli.poster_grayscale {
        filters.push("format=gray".to_string());
    }

    // ffmpeg's -qscale for JPEG runs from 1 (best) to 31 (worst).
    let quality = 31 - cli.poster_quality * 30 / 100;

    let mut args = ArgList::new();
    args.note("only log errors");
    args.args(["-loglevel", "error", "-hide_banner"]);
    args.note(format!("seek to the requested position ({})", cli.poster_seek));
    args.arg("-ss");
    args.arg(seek);
    args.note("input file");
    args.arg("-i");
    args.arg(input.display());
    args.note("map the video track");
    args.arg("-map");
    args.arg(format!("0:{}", video.index));
    args.note("keep a single frame");
    args.args(["-frames:v", "1"]);
    args.note("pick an I-frame and scale it");
    args.arg("-vf");
    args.arg(filters.join(","));
    args.note(format!("JPEG quality for ~{}%", cli.poster_quality));
    args.arg("-qscale:v");
    args.arg(quality);
    args.note("poster output");
    args.arg(&cli.poster_filename);
    args
}
