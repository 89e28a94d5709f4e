//! Building and running the `ffmpeg` command which writes the cleaned video.

use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use tempfile::tempdir;

use crate::{errors::Error, ui::Ui, Result};

/// Video encoder parameters used when re-encoding.
pub const DEFAULT_VIDEO_PARAMS: &str = "-c:v libx264 -preset slow -crf 22";

/// Audio encoder parameters.
pub const DEFAULT_AUDIO_PARAMS: &str = "-c:a aac -ac 2 -ab 224k -ar 44100";

/// Parameter strings with this prefix are base64-encoded, which makes it
/// easier to pass them through layers of shell quoting.
const BASE64_PREFIX: &str = "base64:";

/// Split an encoder parameter string into arguments, decoding it first if it
/// starts with `base64:`.
///
/// ```
/// use scrubsubs::remux::decode_params;
///
/// assert_eq!(vec!["-c:v", "copy"], decode_params("-c:v  copy").unwrap());
/// assert_eq!(vec!["-crf", "18"], decode_params("base64:LWNyZiAxOA==").unwrap());
/// assert!(decode_params("base64:!!!").is_err());
/// ```
pub fn decode_params(value: &str) -> Result<Vec<String>> {
    let text = match value.strip_prefix(BASE64_PREFIX) {
        Some(encoded) => {
            let bad = || Error::CouldNotDecodeParams {
                value: value.to_owned(),
            };
            let bytes = STANDARD.decode(encoded.trim()).map_err(|_| bad())?;
            Cow::Owned(String::from_utf8(bytes).map_err(|_| bad())?)
        }
        None => Cow::Borrowed(value),
    };
    Ok(text.split_whitespace().map(|s| s.to_owned()).collect())
}

/// Everything we need to know to write a new video.
#[derive(Clone, Debug)]
pub struct RemuxPlan {
    /// The original video.
    pub input: PathBuf,
    /// Where to write the new video.
    pub output: PathBuf,
    /// The cleaned subtitles.
    pub subs: PathBuf,
    /// The language to tag embedded subtitles with.
    pub lang: String,
    /// Add `subs` as the default subtitle stream.
    pub embed_subs: bool,
    /// Render `subs` into the picture. This always re-encodes.
    pub burn_subs: bool,
    /// Re-encode the video instead of copying it.
    pub re_encode: bool,
    /// Video encoder arguments, used when re-encoding.
    pub video_params: Vec<String>,
    /// Audio encoder arguments.
    pub audio_params: Vec<String>,
    /// An `ffmpeg` audio filter, if the audio should be altered.
    pub audio_filter: Option<String>,
}

impl RemuxPlan {
    /// Does the output container want `mov_text` subtitles?
    fn is_mp4(&self) -> bool {
        self.output
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("mp4"))
    }

    /// The full argument list for `ffmpeg`. When burning subtitles in,
    /// `ass` must point at the converted subtitles.
    pub fn ffmpeg_args(&self, ass: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), self.input.clone().into()];

        if self.embed_subs {
            let codec = if self.is_mp4() { "mov_text" } else { "srt" };
            args.push("-i".into());
            args.push(self.subs.clone().into());
            for arg in [
                "-map",
                "0",
                "-map",
                "-0:s",
                "-map",
                "1",
                "-c:s",
                codec,
                "-disposition:s:0",
                "default",
                "-metadata:s:s:0",
            ] {
                args.push(arg.into());
            }
            args.push(format!("language={}", self.lang).into());
        } else {
            args.push("-sn".into());
        }

        match ass {
            Some(ass) if self.burn_subs => {
                args.extend(self.video_params.iter().map(OsString::from));
                args.push("-vf".into());
                let mut filter = OsString::from("ass=");
                filter.push(&*escape_filter_arg(&ass.to_string_lossy()));
                args.push(filter);
            }
            _ if self.re_encode || self.burn_subs => {
                args.extend(self.video_params.iter().map(OsString::from));
            }
            _ => {
                args.push("-c:v".into());
                args.push("copy".into());
            }
        }

        if let Some(filter) = &self.audio_filter {
            args.push("-af".into());
            args.push(filter.into());
        }
        args.extend(self.audio_params.iter().map(OsString::from));
        args.push(self.output.clone().into());
        args
    }

    /// Write the new video.
    pub fn run(&self, ui: &Ui) -> Result<()> {
        // Keep this alive until ffmpeg finishes.
        let tmp = if self.burn_subs {
            Some(tempdir().map_err(|source| Error::CouldNotWrite {
                path: std::env::temp_dir(),
                source,
            })?)
        } else {
            None
        };
        let ass = match &tmp {
            Some(dir) => {
                let ass = dir.path().join("subs.ass");
                run_ffmpeg(
                    ui,
                    "converting subtitles",
                    vec!["-y".into(), "-i".into(), self.subs.clone().into(), ass.clone().into()],
                )?;
                Some(ass)
            }
            None => None,
        };

        info!("writing {}", self.output.display());
        run_ffmpeg(ui, "writing video", self.ffmpeg_args(ass.as_deref()))
    }
}

/// Run `ffmpeg` with a spinner, failing if it exits unsuccessfully.
fn run_ffmpeg(ui: &Ui, msg: &str, args: Vec<OsString>) -> Result<()> {
    debug!("ffmpeg {:?}", args);
    let sp = ui.new_spinner(msg);
    let output = Command::new("ffmpeg").args(&args).output();
    sp.finish_and_clear();
    let output = output.map_err(|source| Error::CouldNotRunCommand {
        command: "ffmpeg".to_owned(),
        source,
    })?;
    if !output.status.success() {
        return Err(Error::command_failed("ffmpeg", &output.stderr));
    }
    Ok(())
}

/// Escape a value for use inside an `ffmpeg` filter description.
fn escape_filter_arg(value: &str) -> Cow<'_, str> {
    lazy_static! {
        static ref SPECIAL: Regex = Regex::new(r"[\\':,;\[\]=]").expect("bad regex");
    }
    SPECIAL.replace_all(value, r"\$0")
}
