//! End-to-end packaging pipeline.
//!
//! Stages run in order: probe the source, normalize the rendition ladder,
//! prepare the output directory, extract the poster, transcode everything
//! in one ffmpeg run, look up codec identifiers from the produced samples
//! and write the master playlist plus the fallback HTML snippet.

pub mod codecs;
pub mod manifest;
pub mod poster;
pub mod transcode;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use hlspack_av::{probe, require_tool, run_tool};
use hlspack_media::Dimensions;

use crate::cli::Cli;
use crate::output::prepare_output_dir;

/// Run the whole packaging pipeline for the parsed command line.
pub fn run(cli: &Cli) -> Result<()> {
    let ffmpeg = require_tool(&cli.ffmpeg)?;
    let ffprobe = require_tool(&cli.ffprobe)?;

    if !cli.input.is_file() {
        bail!("input {} is not a file", cli.input.display());
    }
    let input = cli
        .input
        .canonicalize()
        .with_context(|| format!("cannot resolve input {}", cli.input.display()))?;

    info!("probe {}", input.display());
    let source = probe(&ffprobe, &input)?;
    let source_dims = Dimensions::new(source.video.width, source.video.height);

    let plan = cli.ladder_request().normalize(source_dims)?;
    let outdir = prepare_output_dir(&input, cli.output.as_deref(), cli.output_overwrite)?;
    debug!("write outputs into {}", outdir.display());

    if cli.poster() {
        info!("extract poster");
        let args = poster::build_poster_args(cli, &source.video, &plan, &input);
        run_tool(&ffmpeg, &args, Some(&outdir))?;
    }

    let job = transcode::build_transcode_job(cli, &source, &plan, &input)?;
    write_overlays(&outdir, &job.overlays)?;
    info!("start transcoding");
    run_tool(&ffmpeg, &job.args, Some(&outdir))?;

    let catalog = if cli.codecs_enabled() {
        codecs::collect_rendition_codecs(&cli.mp4file, &outdir, plan.renditions.len())
    } else {
        codecs::CodecCatalog::empty(plan.renditions.len())
    };

    info!("write master playlist");
    let master =
        manifest::build_master_playlist(cli, &plan, &job.playlists, &catalog.renditions, &source);
    let master_path = outdir.join(&cli.hls_master_playlist);
    fs::write(&master_path, master)
        .with_context(|| format!("cannot write {}", master_path.display()))?;

    let mp4_codecs = if cli.mp4() && cli.codecs_enabled() && !catalog.disabled {
        codecs::fallback_codecs(&cli.mp4file, &outdir, &cli.mp4_filename)
    } else {
        None
    };
    let tag_path = outdir.join("video-tag.html");
    fs::write(&tag_path, manifest::build_video_tag(cli, mp4_codecs))
        .with_context(|| format!("cannot write {}", tag_path.display()))?;

    info!("outputs are in {}", outdir.display());
    Ok(())
}

fn write_overlays(outdir: &Path, overlays: &[transcode::OverlayFile]) -> Result<()> {
    for overlay in overlays {
        let path = outdir.join(&overlay.name);
        fs::write(&path, &overlay.text)
            .with_context(|| format!("cannot write {}", path.display()))?;
    }
    Ok(())
}
