//! Error-handling for this library.

use std::{io, path::PathBuf, result};

use thiserror::Error;

/// Our standard result type.
pub type Result<T, E = Error> = result::Result<T, E>;

/// Broad categories of failure. Every [`Error`] belongs to exactly one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The rules or options we were given are unusable.
    Config,
    /// The video or subtitles we were asked to read are missing or broken.
    Input,
    /// Our own results violated an invariant.
    Processing,
    /// We could not write one of our artifacts.
    Output,
    /// An external tool (`ffmpeg` or `ffprobe`) failed.
    External,
}

/// Errors which can be returned by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// We could not read the profanity rule file.
    #[error("could not read profanity rules from {path:?}")]
    #[non_exhaustive]
    CouldNotReadRules {
        /// The rule file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The profanity rules could not be compiled into a pattern.
    #[error("could not compile profanity rules into a pattern")]
    #[non_exhaustive]
    CouldNotCompileRules {
        /// The underlying error.
        source: regex::Error,
    },

    /// A marker document was requested, but we have no content identifier.
    #[error("a content identifier is required to write marker document {path:?}")]
    #[non_exhaustive]
    MissingContentId {
        /// Where the marker document would have gone.
        path: PathBuf,
    },

    /// The input video does not exist.
    #[error("no such video file {path:?}")]
    #[non_exhaustive]
    NoSuchVideo {
        /// The missing video.
        path: PathBuf,
    },

    /// We could not read a subtitle file.
    #[error("could not read subtitles from {path:?}")]
    #[non_exhaustive]
    CouldNotReadSubtitles {
        /// The subtitle file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// We could not figure out the character encoding of a subtitle file.
    #[error("could not decode subtitles in {path:?}: {message}")]
    #[non_exhaustive]
    CouldNotDecodeSubtitles {
        /// The subtitle file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// We could not parse subtitle data.
    #[error("could not parse subtitles{}", display_path(.path))]
    #[non_exhaustive]
    CouldNotParseSubtitles {
        /// The subtitle file, if the data came from one.
        path: Option<PathBuf>,
        /// The underlying error.
        source: peg::error::ParseError<peg::str::LineCol>,
    },

    /// We have no subtitles to work with.
    #[error("no {lang:?} subtitles found for {video:?}")]
    #[non_exhaustive]
    NoSubtitles {
        /// The video we were looking at.
        video: PathBuf,
        /// The language we wanted.
        lang: String,
    },

    /// A mute interval ended before it began.
    #[error("mute interval {start_ms}ms-{end_ms}ms ends before it begins")]
    #[non_exhaustive]
    InvalidInterval {
        /// Start of the interval, in milliseconds.
        start_ms: i64,
        /// End of the interval, in milliseconds.
        end_ms: i64,
    },

    /// We could not write an output file.
    #[error("could not write {path:?}")]
    #[non_exhaustive]
    CouldNotWrite {
        /// The file we were writing.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// An existing marker document could not be read.
    #[error("could not read existing marker document {path:?}")]
    #[non_exhaustive]
    CouldNotReadMarkers {
        /// The marker document.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// An existing marker document could not be parsed, so we refuse to
    /// overwrite it.
    #[error("could not parse existing marker document {path:?}")]
    #[non_exhaustive]
    CouldNotParseMarkers {
        /// The marker document.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },

    /// We could not serialize the marker document.
    #[error("could not serialize marker document")]
    #[non_exhaustive]
    CouldNotSerializeMarkers {
        /// The underlying error.
        source: serde_json::Error,
    },

    /// A parameter string marked `base64:` was not valid base64 UTF-8.
    #[error("could not decode base64 parameters {value:?}")]
    #[non_exhaustive]
    CouldNotDecodeParams {
        /// The raw parameter string.
        value: String,
    },

    /// We could not run an external command at all.
    #[error("error running external command {command:?}")]
    #[non_exhaustive]
    CouldNotRunCommand {
        /// The name of the command.
        command: String,
        /// The underlying error.
        source: io::Error,
    },

    /// An external command ran but failed.
    #[error("external command {command:?} failed: {stderr}")]
    #[non_exhaustive]
    CommandFailed {
        /// The name of the command.
        command: String,
        /// Whatever the command printed on standard error.
        stderr: String,
    },

    /// An external command produced output that we could not understand.
    #[error("could not parse output of {command:?}")]
    #[non_exhaustive]
    CouldNotParseCommandOutput {
        /// The name of the command.
        command: String,
        /// The underlying error.
        source: serde_json::Error,
    },
}

impl Error {
    /// Which broad category does this error belong to?
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CouldNotReadRules { .. }
            | Error::CouldNotCompileRules { .. }
            | Error::MissingContentId { .. }
            | Error::CouldNotDecodeParams { .. } => ErrorKind::Config,
            Error::NoSuchVideo { .. }
            | Error::CouldNotReadSubtitles { .. }
            | Error::CouldNotDecodeSubtitles { .. }
            | Error::CouldNotParseSubtitles { .. }
            | Error::NoSubtitles { .. } => ErrorKind::Input,
            Error::InvalidInterval { .. } => ErrorKind::Processing,
            Error::CouldNotWrite { .. }
            | Error::CouldNotReadMarkers { .. }
            | Error::CouldNotParseMarkers { .. }
            | Error::CouldNotSerializeMarkers { .. } => ErrorKind::Output,
            Error::CouldNotRunCommand { .. }
            | Error::CommandFailed { .. }
            | Error::CouldNotParseCommandOutput { .. } => ErrorKind::External,
        }
    }

    /// Build an error for a command which exited unsuccessfully.
    pub(crate) fn command_failed<S: Into<String>>(command: S, stderr: &[u8]) -> Error {
        Error::CommandFailed {
            command: command.into(),
            stderr: String::from_utf8_lossy(stderr).trim().to_owned(),
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" in {:?}", path),
        None => String::new(),
    }
}

#[test]
fn errors_are_classified() {
    let err = Error::MissingContentId {
        path: PathBuf::from("skip.json"),
    };
    assert_eq!(err.kind(), ErrorKind::Config);
    let err = Error::InvalidInterval {
        start_ms: 10,
        end_ms: 5,
    };
    assert_eq!(err.kind(), ErrorKind::Processing);
    assert!(err.to_string().contains("10ms-5ms"));
}
