//! Command-line interface for scrubbing profanity from videos.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use log::info;

use scrubsubs::{
    job::{CleanJob, JobOptions},
    remux::{DEFAULT_AUDIO_PARAMS, DEFAULT_VIDEO_PARAMS},
    timeline::LastCuePolicy,
    ui::Ui,
};

#[derive(Debug, Parser)]
/// Remove profanity from a video's subtitles, and mute the audio to match.
/// (Subtitles must be in *.srt format. Many common encodings will be
/// automatically detected, but try converting to UTF-8 if you have problems.)
#[command(name = "scrubsubs", version)]
struct Args {
    /// Path to the input video.
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Path to the input subtitles. If omitted, SRT subtitles in `--lang`
    /// are extracted from the video.
    #[arg(short = 's', long = "subs")]
    subs: Option<PathBuf>,

    /// Path to the output video [default: <input stem>_clean<ext>].
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Path to the cleaned subtitles [default: <subs stem>_clean<ext>].
    #[arg(long = "subs-output")]
    subs_output: Option<PathBuf>,

    /// Profanity rule file, with one `term` or `term|replacement` per line.
    #[arg(short = 'w', long = "swears", env = "SCRUBSUBS_SWEARS")]
    swears: PathBuf,

    /// Language of the subtitles, as tagged in the video.
    #[arg(short = 'l', long = "lang", default_value = "eng")]
    lang: String,

    /// Seconds of extra audio to mute around each profanity.
    #[arg(short = 'p', long = "pad", default_value = "0", value_parser = parse_pad)]
    pad_ms: u64,

    /// Embed the cleaned subtitles in the output video.
    #[arg(short = 'e', long = "embed-subs")]
    embed_subs: bool,

    /// Keep every cue in the cleaned subtitles, not just the profane ones.
    #[arg(short = 'f', long = "full-subs")]
    full_subs: bool,

    /// Only clean the subtitles. Don't mute the audio.
    #[arg(long = "subs-only")]
    subs_only: bool,

    /// Write an edit decision list next to the cleaned subtitles (implies
    /// --subs-only).
    #[arg(long = "edl")]
    edl: bool,

    /// Re-encode the video.
    #[arg(short = 'r', long = "re-encode")]
    re_encode: bool,

    /// Burn the cleaned subtitles into the video (implies --re-encode).
    #[arg(short = 'b', long = "burn")]
    burn: bool,

    /// Video encoder parameters. Prefix with `base64:` to pass them
    /// encoded.
    #[arg(short = 'v', long = "video-params", default_value = DEFAULT_VIDEO_PARAMS, allow_hyphen_values = true)]
    video_params: String,

    /// Audio encoder parameters. Prefix with `base64:` to pass them
    /// encoded.
    #[arg(short = 'a', long = "audio-params", default_value = DEFAULT_AUDIO_PARAMS, allow_hyphen_values = true)]
    audio_params: String,

    /// Write PlexAutoSkip mute markers to this JSON file (implies
    /// --subs-only; requires --plex-auto-skip-id).
    #[arg(long = "plex-auto-skip-json")]
    plex_auto_skip_json: Option<PathBuf>,

    /// Content identifier for PlexAutoSkip markers (implies --subs-only).
    #[arg(long = "plex-auto-skip-id")]
    plex_auto_skip_id: Option<String>,

    /// Never output the final cue, like older versions of this tool.
    #[arg(long = "drop-last-cue")]
    drop_last_cue: bool,
}

impl Args {
    fn into_options(self) -> JobOptions {
        let mut options = JobOptions::new(self.input, self.swears);
        options.subs = self.subs;
        options.output = self.output;
        options.subs_output = self.subs_output;
        options.lang = self.lang;
        options.pad_ms = self.pad_ms;
        options.embed_subs = self.embed_subs;
        options.full_subs = self.full_subs;
        options.subs_only = self.subs_only;
        options.edl = self.edl;
        options.re_encode = self.re_encode;
        options.burn = self.burn;
        options.video_params = self.video_params;
        options.audio_params = self.audio_params;
        options.plex_json = self.plex_auto_skip_json;
        options.plex_id = self.plex_auto_skip_id;
        options.last_cue = if self.drop_last_cue {
            LastCuePolicy::Drop
        } else {
            LastCuePolicy::Include
        };
        options
    }
}

/// The longest pad we accept, in seconds.
const MAX_PAD_SECONDS: f64 = 3600.0;

/// Parse a pad in seconds into milliseconds.
fn parse_pad(s: &str) -> Result<u64, String> {
    let secs: f64 = s.trim().parse().map_err(|_| format!("not a number: {:?}", s))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("pad must be zero or more seconds: {:?}", s));
    }
    if secs > MAX_PAD_SECONDS {
        return Err(format!("pad must be at most {} seconds: {:?}", MAX_PAD_SECONDS, s));
    }
    Ok((secs * 1000.0).round() as u64)
}

fn main() -> Result<()> {
    dotenv().ok();
    let ui = Ui::init();

    let args = Args::parse();
    let options = args.into_options();
    let input = options.input.clone();
    let job = CleanJob::new(options).context("could not set up cleaning job")?;
    let report = job
        .run(&ui)
        .with_context(|| format!("could not clean {}", input.display()))?;

    info!("wrote {}", report.clean_subs.display());
    for path in [&report.edl, &report.markers, &report.video].into_iter().flatten() {
        info!("wrote {}", path.display());
    }
    Ok(())
}

#[test]
fn pad_is_seconds() {
    assert_eq!(Ok(0), parse_pad("0"));
    assert_eq!(Ok(250), parse_pad("0.25"));
    assert_eq!(Ok(2000), parse_pad("2"));
    assert!(parse_pad("-1").is_err());
    assert!(parse_pad("soon").is_err());
    assert_eq!(Ok(3_600_000), parse_pad("3600"));
    assert!(parse_pad("1e16").is_err());
}
