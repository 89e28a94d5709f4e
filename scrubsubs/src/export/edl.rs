//! MPlayer-style edit decision lists.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::debug;

use crate::{errors::Error, time::MuteInterval, Result};

/// The EDL action code for "mute".
const ACTION_MUTE: u8 = 1;

/// Format intervals as an edit decision list, one mute action per line.
pub fn edl_string(intervals: &[MuteInterval]) -> Result<String> {
    let mut out = String::new();
    for interval in intervals {
        let interval = interval.clamped()?;
        writeln!(
            out,
            "{:.1}\t{:.3}\t{}",
            interval.start_seconds(),
            interval.end_seconds(),
            ACTION_MUTE
        )
        .expect("writing to a String cannot fail");
    }
    Ok(out)
}

/// Write an edit decision list to `path`. Nothing is written when there are
/// no intervals; returns whether a file was written.
pub fn write_edl(path: &Path, intervals: &[MuteInterval]) -> Result<bool> {
    if intervals.is_empty() {
        debug!("no mute intervals, not writing {}", path.display());
        return Ok(false);
    }
    let edl = edl_string(intervals)?;
    fs::write(path, edl).map_err(|source| Error::CouldNotWrite {
        path: path.to_owned(),
        source,
    })?;
    Ok(true)
}
