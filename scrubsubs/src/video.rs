//! Tools for working with video files.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::result;

use log::{debug, info};
use serde::{Deserialize, Deserializer};

use crate::{errors::Error, Result};

/// Individual streams inside a video are labelled with a codec type.
#[derive(Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CodecType {
    Audio,
    Video,
    Subtitle,
    Other(String),
}

impl<'de> Deserialize<'de> for CodecType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        match &s[..] {
            "audio" => Ok(CodecType::Audio),
            "video" => Ok(CodecType::Video),
            "subtitle" => Ok(CodecType::Subtitle),
            s => Ok(CodecType::Other(s.to_owned())),
        }
    }
}

/// An individual content stream within a video.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct Stream {
    pub index: usize,
    pub codec_type: CodecType,
    #[serde(default)]
    pub codec_name: Option<String>,
    #[serde(default)]
    tags: Option<BTreeMap<String, String>>,
}

impl Stream {
    /// The language tag of this stream, exactly as the container records it.
    pub fn language(&self) -> Option<&str> {
        self.tags
            .as_ref()
            .and_then(|tags| tags.get("language"))
            .map(|lang| lang.as_str())
    }

    /// Is this a text subtitle stream in SRT format?
    pub fn is_subrip(&self) -> bool {
        self.codec_type == CodecType::Subtitle && self.codec_name.as_deref() == Some("subrip")
    }
}

/// Metadata associated with a video.
#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(default)]
    streams: Vec<Stream>,
}

/// Represents a video file on disk.
#[derive(Debug)]
pub struct Video {
    path: PathBuf,
    metadata: Metadata,
}

impl Video {
    /// Probe a video file using `ffprobe`.
    pub fn new(path: &Path) -> Result<Video> {
        // Ensure we have an actual file before doing anything else.
        if !path.is_file() {
            return Err(Error::NoSuchVideo {
                path: path.to_owned(),
            });
        }

        let output = Command::new("ffprobe")
            .arg("-v")
            .arg("quiet")
            .arg("-show_streams")
            .arg("-of")
            .arg("json")
            .arg(path)
            .output()
            .map_err(|source| Error::CouldNotRunCommand {
                command: "ffprobe".to_owned(),
                source,
            })?;
        if !output.status.success() {
            return Err(Error::command_failed("ffprobe", &output.stderr));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("Video metadata: {}", stdout);
        let metadata = Video::parse_metadata(&stdout)?;
        Ok(Video {
            path: path.to_owned(),
            metadata,
        })
    }

    fn parse_metadata(json: &str) -> Result<Metadata> {
        serde_json::from_str(json).map_err(|source| Error::CouldNotParseCommandOutput {
            command: "ffprobe".to_owned(),
            source,
        })
    }

    /// The path to this video.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get just the file stem of this video file, stripped of any
    /// extensions.
    pub fn file_stem(&self) -> &OsStr {
        self.path.file_stem().unwrap_or_else(|| OsStr::new("video"))
    }

    /// List all the tracks in a video file.
    pub fn streams(&self) -> &[Stream] {
        &self.metadata.streams
    }

    /// The first SRT-format subtitle stream tagged with `lang`.
    pub fn subrip_stream(&self, lang: &str) -> Option<&Stream> {
        self.streams()
            .iter()
            .find(|s| s.is_subrip() && s.language() == Some(lang))
    }

    /// Where [`Video::extract_subtitles`] puts subtitles for `lang`.
    pub fn extracted_subtitles_path(&self, lang: &str) -> PathBuf {
        let mut name = self.file_stem().to_owned();
        name.push(format!(".{}.srt", lang));
        self.path.with_file_name(name)
    }

    /// Copy the embedded SRT subtitles for `lang` out to
    /// `<stem>.<lang>.srt` next to the video. Returns `None` if the video
    /// has no such subtitles.
    pub fn extract_subtitles(&self, lang: &str) -> Result<Option<PathBuf>> {
        let stream = match self.subrip_stream(lang) {
            Some(stream) => stream,
            None => {
                debug!("no {} subrip stream in {}", lang, self.path.display());
                return Ok(None);
            }
        };
        let out = self.extracted_subtitles_path(lang);
        info!(
            "extracting subtitle stream {} to {}",
            stream.index,
            out.display()
        );
        let output = Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(&self.path)
            .arg("-map")
            .arg(format!("0:{}", stream.index))
            .arg(&out)
            .output()
            .map_err(|source| Error::CouldNotRunCommand {
                command: "ffmpeg".to_owned(),
                source,
            })?;
        if !output.status.success() {
            return Err(Error::command_failed("ffmpeg", &output.stderr));
        }
        Ok(Some(out))
    }
}
