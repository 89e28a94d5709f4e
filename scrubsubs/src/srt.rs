//! SRT-format subtitle support.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use crate::{decode::smart_decode, errors::Error, time::Timestamp, Result};

/// A single SRT-format subtitle cue.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cue {
    /// The sequence number of this cue. We preserve whatever the input file
    /// used.
    pub index: usize,

    /// When this cue appears.
    pub start: Timestamp,

    /// When this cue disappears. Never before `start`.
    pub end: Timestamp,

    /// The text of this cue, with lines separated by `\n`.
    pub text: String,
}

impl Cue {
    /// Create a new cue.
    pub fn new<S: Into<String>>(index: usize, start: Timestamp, end: Timestamp, text: S) -> Cue {
        Cue {
            index,
            start,
            end,
            text: text.into(),
        }
    }

    /// A copy of this cue with different text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Cue {
        Cue {
            text: text.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n{} --> {}\n{}\n", self.index, self.start, self.end, self.text)
    }
}

/// The contents of an SRT-format subtitle file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CueFile {
    /// The cues in this file, in file order.
    pub cues: Vec<Cue>,
}

impl CueFile {
    /// Parse raw subtitle text, remembering `path` for error messages.
    fn parse(data: &str, path: Option<&Path>) -> Result<CueFile> {
        grammar::cue_file(data).map_err(|source| Error::CouldNotParseSubtitles {
            path: path.map(|p| p.to_owned()),
            source,
        })
    }

    /// Parse the subtitle file found at the specified path, in any encoding
    /// we can detect.
    pub fn from_path(path: &Path) -> Result<CueFile> {
        let bytes = fs::read(path).map_err(|source| Error::CouldNotReadSubtitles {
            path: path.to_owned(),
            source,
        })?;
        let data = smart_decode(&bytes).map_err(|message| Error::CouldNotDecodeSubtitles {
            path: path.to_owned(),
            message,
        })?;
        let file = CueFile::parse(&data, Some(path))?;
        debug!("read {} cues from {}", file.cues.len(), path.display());
        Ok(file)
    }

    /// Write these cues to `path` as UTF-8.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string()).map_err(|source| Error::CouldNotWrite {
            path: path.to_owned(),
            source,
        })?;
        debug!("wrote {} cues to {}", self.cues.len(), path.display());
        Ok(())
    }
}

impl FromStr for CueFile {
    type Err = Error;

    fn from_str(data: &str) -> Result<CueFile> {
        CueFile::parse(data, None)
    }
}

impl fmt::Display for CueFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, cue) in self.cues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", cue)?;
        }
        Ok(())
    }
}

peg::parser! {
    grammar grammar() for str {
        use super::{Cue, CueFile};
        use crate::time::Timestamp;

        pub(crate) rule cue_file() -> CueFile
            = "\u{FEFF}"? blank_lines()? cues:(cue() ** blank_lines()) blank_lines()? space() ![_] {
                CueFile { cues }
            }

        rule cue() -> Cue
            = space() index:index() space() eol() times:times() lines:(eol() l:text_lines() { l })? {?
                let (start, end) = times;
                if start > end {
                    return Err("a cue end time no earlier than its start time");
                }
                let text = lines.unwrap_or_default().join("\n");
                Ok(Cue { index, start, end, text })
            }

        rule times() -> (Timestamp, Timestamp)
            = start:timestamp() space() "-->" space() end:timestamp() [^ '\r' | '\n']* {
                (start, end)
            }

        // Some files use "." before the milliseconds.
        rule timestamp() -> Timestamp
            = hh:number() ":" mm:number() ":" ss:number() [',' | '.'] ms:number() {?
                Timestamp::from_hms_millis(hh, mm, ss, ms).ok_or("timestamp")
            }

        rule text_lines() -> Vec<&'input str>
            = text_line() ** eol()

        rule text_line() -> &'input str
            = quiet!{ line:$([^ '\r' | '\n']+) {?
                if line.trim().is_empty() { Err("text") } else { Ok(line) }
            } } / expected!("subtitle text")

        rule index() -> usize
            = digits:$(['0'..='9']+) {? digits.parse().or(Err("cue index")) }

        rule number() -> i64
            = digits:$(['0'..='9']+) {? digits.parse().or(Err("number")) }

        rule space() = [' ' | '\t']*

        rule eol() = space() "\r"? "\n"

        rule blank_lines() = eol()+
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::{Cue, CueFile};
    use crate::{errors::ErrorKind, time::Timestamp};

    fn t(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn cue_file_from_path() {
        let srt = CueFile::from_path(Path::new("fixtures/sample.srt")).unwrap();
        assert_eq!(6, srt.cues.len());

        let cue = &srt.cues[0];
        assert_eq!(1, cue.index);
        assert_eq!(t(1_000), cue.start);
        assert_eq!(t(3_500), cue.end);
        assert_eq!("Good morning, everyone.", cue.text);

        assert_eq!("Well, damn.\nThat's a shame.", srt.cues[2].text);
    }

    #[test]
    fn cue_to_string() {
        let cue = Cue::new(4, t(61_500), t(63_750), "Line 1\n<i>Line 2</i>");
        let expected = r"4
00:01:01,500 --> 00:01:03,750
Line 1
<i>Line 2</i>
";
        assert_eq!(expected, cue.to_string());
    }

    #[test]
    fn cue_file_to_string() {
        let data = "16
00:01:02,328 --> 00:01:04,664
Line 1.1

17
00:01:12,839 --> 00:01:13,839
Line 2.1
";
        let srt: CueFile = data.parse().unwrap();
        assert_eq!(data, &srt.to_string());
    }

    #[test]
    fn tolerates_sloppy_files() {
        let data = "\u{FEFF}\r\n1 \r\n00:00:01.000 --> 00:00:02,000  X1:10 X2:20\r\nHello\r\n \r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nBye";
        let srt: CueFile = data.parse().unwrap();
        assert_eq!(2, srt.cues.len());
        assert_eq!(t(1_000), srt.cues[0].start);
        assert_eq!("Hello", srt.cues[0].text);
        assert_eq!("Bye", srt.cues[1].text);
    }

    #[test]
    fn cue_without_text() {
        let data = "1
00:00:01,000 --> 00:00:01,000

2
00:00:02,000 --> 00:00:03,000
Text
";
        let srt: CueFile = data.parse().unwrap();
        assert_eq!(2, srt.cues.len());
        assert_eq!("", srt.cues[0].text);
        assert_eq!(t(1_000), srt.cues[0].end);
    }

    #[test]
    fn empty_file() {
        let srt: CueFile = "\n\n".parse().unwrap();
        assert!(srt.cues.is_empty());
    }

    #[test]
    fn backwards_cue_is_rejected() {
        let data = "1\n00:00:02,000 --> 00:00:01,000\nOops\n";
        let err = data.parse::<CueFile>().unwrap_err();
        assert_eq!(ErrorKind::Input, err.kind());
    }

    #[test]
    fn enormous_timestamps_are_rejected() {
        let data = "1\n9999999999999999:00:00,000 --> 9999999999999999:00:01,000\nhi\n";
        let err = data.parse::<CueFile>().unwrap_err();
        assert_eq!(ErrorKind::Input, err.kind());
    }

    #[test]
    fn garbage_is_rejected() {
        let data = "1\n00:00:01,000 --> 00:00:02,000\nFine\n\nnot a cue\n";
        assert!(data.parse::<CueFile>().is_err());
    }

    #[test]
    fn missing_file_names_path() {
        let err = CueFile::from_path(Path::new("fixtures/missing.srt")).unwrap_err();
        assert_eq!(ErrorKind::Input, err.kind());
        assert!(err.to_string().contains("missing.srt"));
    }
}
