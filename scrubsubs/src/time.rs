//! Tools for working with time.

use std::fmt;

use crate::{errors::Error, Result};

/// A point in time, stored as whole milliseconds. SRT files only have
/// millisecond precision, so this is exact for anything we read.
///
/// ```
/// use scrubsubs::time::Timestamp;
///
/// let t = Timestamp::from_hms_millis(1, 2, 3, 456).unwrap();
/// assert_eq!(3_723_456, t.as_millis());
/// assert_eq!("01:02:03,456", t.to_string());
/// assert!(Timestamp::from_hms_millis(i64::MAX, 0, 0, 0).is_none());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from milliseconds.
    pub fn from_millis(millis: i64) -> Timestamp {
        Timestamp(millis)
    }

    /// Create a timestamp from the fields of an SRT time, or `None` if it
    /// doesn't fit.
    pub fn from_hms_millis(hours: i64, minutes: i64, seconds: i64, millis: i64) -> Option<Timestamp> {
        let ms = hours
            .checked_mul(60)?
            .checked_add(minutes)?
            .checked_mul(60)?
            .checked_add(seconds)?
            .checked_mul(1000)?
            .checked_add(millis)?;
        Some(Timestamp(ms))
    }

    /// This timestamp in milliseconds.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// This timestamp in seconds.
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

/// Formats using the standard SRT time format, `HH:MM:SS,mmm`.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let ms = self.0.abs();
        write!(
            f,
            "{}{:02}:{:02}:{:02},{:03}",
            sign,
            ms / 3_600_000,
            (ms / 60_000) % 60,
            (ms / 1000) % 60,
            ms % 1000
        )
    }
}

/// A span of time during which the audio should be silenced.
///
/// The start may be negative when padding pushes it before the beginning of
/// the video. Intervals may overlap each other; nothing merges them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MuteInterval {
    start_ms: i64,
    end_ms: i64,
}

impl MuteInterval {
    /// Create a new interval. Fails if `end` comes before `start`.
    ///
    /// ```
    /// use scrubsubs::time::{MuteInterval, Timestamp};
    ///
    /// let t = |ms| Timestamp::from_millis(ms);
    /// let interval = MuteInterval::new(t(1500), t(2250)).unwrap();
    /// assert_eq!(1.5, interval.start_seconds());
    /// assert_eq!(2.25, interval.end_seconds());
    /// assert!(MuteInterval::new(t(2), t(1)).is_err());
    /// ```
    pub fn new(start: Timestamp, end: Timestamp) -> Result<MuteInterval> {
        if start > end {
            return Err(Error::InvalidInterval {
                start_ms: start.as_millis(),
                end_ms: end.as_millis(),
            });
        }
        Ok(MuteInterval {
            start_ms: start.as_millis(),
            end_ms: end.as_millis(),
        })
    }

    /// The interval covering `start..end`, widened by `pad_ms` on each side.
    /// Since `pad_ms` is never negative, the result is valid whenever the
    /// input is.
    pub(crate) fn padded(start: Timestamp, end: Timestamp, pad_ms: i64) -> MuteInterval {
        debug_assert!(start <= end && pad_ms >= 0);
        MuteInterval {
            start_ms: start.as_millis().saturating_sub(pad_ms),
            end_ms: end.as_millis().saturating_add(pad_ms),
        }
    }

    /// The beginning of this interval.
    pub fn start(&self) -> Timestamp {
        Timestamp(self.start_ms)
    }

    /// The end of this interval.
    pub fn end(&self) -> Timestamp {
        Timestamp(self.end_ms)
    }

    /// The beginning of this interval, in seconds.
    pub fn start_seconds(&self) -> f64 {
        self.start().as_seconds()
    }

    /// The end of this interval, in seconds.
    pub fn end_seconds(&self) -> f64 {
        self.end().as_seconds()
    }

    /// Clamp the start of this interval to zero, for output formats which
    /// can't represent negative times.
    ///
    /// ```
    /// use scrubsubs::time::{MuteInterval, Timestamp};
    ///
    /// let t = |ms| Timestamp::from_millis(ms);
    /// let clamped = MuteInterval::new(t(-500), t(1500)).unwrap().clamped().unwrap();
    /// assert_eq!(0.0, clamped.start_seconds());
    /// assert!(MuteInterval::new(t(-500), t(-100)).unwrap().clamped().is_err());
    /// ```
    pub fn clamped(&self) -> Result<MuteInterval> {
        MuteInterval::new(Timestamp(self.start_ms.max(0)), self.end())
    }
}

#[cfg(test)]
mod test {
    use super::{MuteInterval, Timestamp};

    #[test]
    fn format_timestamps() {
        assert_eq!("00:00:00,000", Timestamp::from_millis(0).to_string());
        assert_eq!("00:01:01,500", Timestamp::from_millis(61_500).to_string());
        assert_eq!("100:00:00,001", Timestamp::from_hms_millis(100, 0, 0, 1).unwrap().to_string());
        assert_eq!("-00:00:00,250", Timestamp::from_millis(-250).to_string());
    }

    #[test]
    fn padding_widens_both_sides() {
        let interval =
            MuteInterval::padded(Timestamp::from_millis(1200), Timestamp::from_millis(2000), 500);
        assert_eq!(0.7, interval.start_seconds());
        assert_eq!(2.5, interval.end_seconds());
    }

    #[test]
    fn huge_padding_saturates() {
        let interval =
            MuteInterval::padded(Timestamp::from_millis(100), Timestamp::from_millis(900), i64::MAX);
        assert_eq!(i64::MAX, interval.end().as_millis());
        assert!(interval.start() < interval.end());
        assert_eq!(0, interval.clamped().unwrap().start().as_millis());
    }

    #[test]
    fn padding_can_go_negative() {
        let interval =
            MuteInterval::padded(Timestamp::from_millis(100), Timestamp::from_millis(900), 500);
        assert_eq!(-400, interval.start().as_millis());
        assert_eq!(0, interval.clamped().unwrap().start().as_millis());
    }
}
