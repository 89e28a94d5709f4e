//! `ffmpeg` audio filters which silence each mute interval.

use crate::{time::MuteInterval, Result};

/// Build an `ffmpeg` audio filter expression which silences every interval.
/// Returns an empty string when there is nothing to mute, in which case the
/// caller must not pass `-af` at all.
///
/// Overlapping intervals are harmless, because each clause gates the volume
/// independently.
///
/// ```
/// use scrubsubs::{export::audio_filter, time::{MuteInterval, Timestamp}};
///
/// let t = |ms| Timestamp::from_millis(ms);
/// let intervals = vec![MuteInterval::new(t(700), t(2500)).unwrap()];
/// assert_eq!(
///     "volume=enable='between(t,0.700,2.500)':volume=0",
///     audio_filter(&intervals).unwrap(),
/// );
/// ```
pub fn audio_filter(intervals: &[MuteInterval]) -> Result<String> {
    let clauses = intervals
        .iter()
        .map(|interval| {
            let interval = interval.clamped()?;
            Ok(format!(
                "volume=enable='between(t,{:.3},{:.3})':volume=0",
                interval.start_seconds(),
                interval.end_seconds()
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(clauses.join(","))
}
