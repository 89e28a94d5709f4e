//! Scrub profanity from subtitles, and work out when to mute a video's audio
//! to match.
//!
//! The heart of this crate is [`timeline::build_timeline`], which makes a
//! single pass over a subtitle file's cues. It replaces profanity using a
//! [`matcher::Matcher`] built from a rule file, and decides which cues to
//! keep and which stretches of audio to mute. The results can then be
//! written out as:
//!
//! - a cleaned SRT file ([`srt::CueFile`]),
//! - an `ffmpeg` audio filter ([`export::audio_filter`]),
//! - an edit decision list ([`export::write_edl`]), or
//! - a player marker document ([`export::write_markers`]).
//!
//! [`job::CleanJob`] ties all of this together, optionally writing a new
//! video with `ffmpeg`.
//!
//! ```
//! use scrubsubs::{
//!     matcher::Matcher,
//!     rules::ProfanityRules,
//!     srt::CueFile,
//!     timeline::{build_timeline, TimelineOptions},
//! };
//!
//! let rules: ProfanityRules = "darn|dang".parse().unwrap();
//! let matcher = Matcher::new(rules).unwrap();
//! let srt: CueFile = "1\n00:00:01,000 --> 00:00:02,000\nOh, darn it.\n"
//!     .parse()
//!     .unwrap();
//! let result = build_timeline(&srt.cues, &matcher, &TimelineOptions::default());
//! assert_eq!("Oh, dang it.", result.output_cues[0].text);
//! assert_eq!(1.0, result.mute_intervals[0].start_seconds());
//! ```

#![warn(missing_docs)]

pub mod caseless;
pub mod cleanup;
pub mod decode;
pub mod errors;
pub mod export;
pub mod job;
pub mod matcher;
pub mod remux;
pub mod rules;
pub mod srt;
pub mod time;
pub mod timeline;
pub mod ui;
pub mod video;

pub use crate::errors::{Error, ErrorKind, Result};
