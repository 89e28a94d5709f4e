//! Deciding which cues to keep and when to mute the audio.
//!
//! We make a single pass over the cues, looking one cue ahead and
//! remembering the last profane cue we kept. A cue is kept when:
//!
//! * it contains profanity, or
//! * a pad is configured, the cue has a successor, and either
//!   - the successor contains profanity and starts within the pad of this
//!     cue's end, or
//!   - the last profane cue we kept ended within the pad of this cue's
//!     start.
//!
//! Every kept cue produces exactly one mute interval. Profane cues get an
//! interval widened by the pad on both sides; cues kept only for being near
//! profanity get their own, unpadded, span.

use log::{debug, trace};

use crate::{
    matcher::{Matcher, Scrubbed},
    srt::{Cue, CueFile},
    time::MuteInterval,
};

/// What to do with the final cue, which has no successor to look at.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LastCuePolicy {
    /// Evaluate the final cue like any other, with no successor.
    #[default]
    Include,
    /// Never output the final cue, whatever it says. Older versions of this
    /// tool behaved this way, and some downstream files may depend on it.
    Drop,
}

/// Options controlling how we build a timeline.
#[derive(Clone, Debug, Default)]
pub struct TimelineOptions {
    /// How much audio to mute around each profane cue, in milliseconds.
    pub pad_ms: u64,
    /// Output every cue, not just the ones we kept. Cues we didn't keep are
    /// copied verbatim.
    pub full_subs: bool,
    /// How to handle the final cue.
    pub last_cue: LastCuePolicy,
}

/// The cues to output and the intervals to mute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimelineResult {
    /// The cues to write to the cleaned subtitle file.
    pub output_cues: Vec<Cue>,
    /// The intervals to mute, in scan order. These may overlap.
    pub mute_intervals: Vec<MuteInterval>,
}

impl TimelineResult {
    /// Our output cues as a subtitle file.
    pub fn to_cue_file(&self) -> CueFile {
        CueFile {
            cues: self.output_cues.clone(),
        }
    }
}

/// Scan `cues` and decide what to keep and what to mute.
pub fn build_timeline(cues: &[Cue], matcher: &Matcher, options: &TimelineOptions) -> TimelineResult {
    let pad = i64::try_from(options.pad_ms).unwrap_or(i64::MAX);
    let scrubbed: Vec<Scrubbed> = cues.iter().map(|cue| matcher.apply(&cue.text)).collect();

    let scan_len = match options.last_cue {
        LastCuePolicy::Include => cues.len(),
        LastCuePolicy::Drop => cues.len().saturating_sub(1),
    };

    let mut result = TimelineResult::default();
    let mut prev_naughty: Option<&Cue> = None;
    for i in 0..scan_len {
        let cue = &cues[i];
        let is_profane = scrubbed[i].changed;
        let near_profanity = pad > 0
            && i + 1 < cues.len()
            && ((scrubbed[i + 1].changed && cues[i + 1].start.as_millis() - cue.end.as_millis() <= pad)
                || prev_naughty
                    .map_or(false, |prev| cue.start.as_millis() - prev.end.as_millis() <= pad));

        if is_profane || near_profanity {
            trace!("keeping cue {} (profane: {})", cue.index, is_profane);
            result.output_cues.push(cue.with_text(scrubbed[i].text.as_ref()));
            let interval = if is_profane {
                prev_naughty = Some(cue);
                MuteInterval::padded(cue.start, cue.end, pad)
            } else {
                prev_naughty = None;
                MuteInterval::padded(cue.start, cue.end, 0)
            };
            result.mute_intervals.push(interval);
        } else {
            if options.full_subs {
                result.output_cues.push(cue.clone());
            }
            prev_naughty = None;
        }
    }

    debug!(
        "kept {} of {} cues, {} mute intervals",
        result.output_cues.len(),
        cues.len(),
        result.mute_intervals.len()
    );
    result
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::{build_timeline, LastCuePolicy, TimelineOptions, TimelineResult};
    use crate::{
        matcher::Matcher,
        rules::ProfanityRules,
        srt::{Cue, CueFile},
        time::Timestamp,
    };

    fn matcher(rules: &str) -> Matcher {
        Matcher::new(rules.parse::<ProfanityRules>().unwrap()).unwrap()
    }

    fn cue(index: usize, start_ms: i64, end_ms: i64, text: &str) -> Cue {
        Cue::new(
            index,
            Timestamp::from_millis(start_ms),
            Timestamp::from_millis(end_ms),
            text,
        )
    }

    fn intervals(result: &TimelineResult) -> Vec<(f64, f64)> {
        result
            .mute_intervals
            .iter()
            .map(|i| (i.start_seconds(), i.end_seconds()))
            .collect()
    }

    fn pad(pad_ms: u64) -> TimelineOptions {
        TimelineOptions {
            pad_ms,
            ..TimelineOptions::default()
        }
    }

    #[test]
    fn single_profane_cue() {
        let cues = vec![cue(1, 0, 1000, "I damn well will")];
        let result = build_timeline(&cues, &matcher("damn|darn"), &pad(0));
        assert_eq!(vec![cue(1, 0, 1000, "I darn well will")], result.output_cues);
        assert_eq!(vec![(0.0, 1.0)], intervals(&result));
    }

    #[test]
    fn default_mask_in_output() {
        let cues = vec![cue(1, 0, 1000, "I damn well will")];
        let result = build_timeline(&cues, &matcher("damn"), &pad(0));
        assert_eq!("I ***** well will", result.output_cues[0].text);
    }

    #[test]
    fn clean_cue_before_profanity_is_kept_within_pad() {
        let cues = vec![cue(1, 0, 1000, "clean"), cue(2, 1200, 2000, "damn it")];
        let result = build_timeline(&cues, &matcher("damn"), &pad(500));
        assert_eq!(
            vec![cue(1, 0, 1000, "clean"), cue(2, 1200, 2000, "***** it")],
            result.output_cues
        );
        assert_eq!(vec![(0.0, 1.0), (0.7, 2.5)], intervals(&result));
    }

    #[test]
    fn clean_cue_after_profanity_is_kept_within_pad() {
        let cues = vec![
            cue(1, 0, 1000, "damn it"),
            cue(2, 1300, 2000, "clean"),
            cue(3, 9000, 9500, "later"),
        ];
        let result = build_timeline(&cues, &matcher("damn"), &pad(500));
        assert_eq!(2, result.output_cues.len());
        assert_eq!("clean", result.output_cues[1].text);
        assert_eq!(vec![(-0.5, 1.5), (1.3, 2.0)], intervals(&result));
    }

    #[test]
    fn lookbehind_only_reaches_one_cue() {
        // The second cue clears the lookbehind state, so the third cue is not
        // kept even though it's close to the second.
        let cues = vec![
            cue(1, 0, 1000, "damn it"),
            cue(2, 1100, 1200, "clean"),
            cue(3, 1300, 1400, "also clean"),
            cue(4, 9000, 9500, "later"),
        ];
        let result = build_timeline(&cues, &matcher("damn"), &pad(500));
        assert_eq!(2, result.output_cues.len());
    }

    #[test]
    fn gaps_larger_than_pad_are_ignored() {
        let cues = vec![cue(1, 0, 1000, "clean"), cue(2, 1600, 2000, "damn")];
        let result = build_timeline(&cues, &matcher("damn"), &pad(500));
        assert_eq!(vec![cue(2, 1600, 2000, "*****")], result.output_cues);
        assert_eq!(vec![(1.1, 2.5)], intervals(&result));
    }

    #[test]
    fn no_profanity_means_no_output() {
        let cues = CueFile::from_path(Path::new("fixtures/sample.srt")).unwrap().cues;
        let result = build_timeline(&cues, &matcher("heck\nfrick"), &pad(0));
        assert!(result.output_cues.is_empty());
        assert!(result.mute_intervals.is_empty());
    }

    #[test]
    fn empty_rules_with_full_subs_copy_everything() {
        let cues = CueFile::from_path(Path::new("fixtures/sample.srt")).unwrap().cues;
        let options = TimelineOptions {
            full_subs: true,
            ..TimelineOptions::default()
        };
        let result = build_timeline(&cues, &matcher(""), &options);
        assert_eq!(cues, result.output_cues);
        assert!(result.mute_intervals.is_empty());

        let result = build_timeline(&cues, &matcher(""), &pad(0));
        assert!(result.output_cues.is_empty());
    }

    #[test]
    fn full_subs_keeps_clean_cues_verbatim() {
        let cues = vec![
            cue(1, 0, 1000, "Hello there"),
            cue(2, 5000, 6000, "What the hell"),
            cue(3, 9000, 9500, "Bye"),
        ];
        let options = TimelineOptions {
            full_subs: true,
            ..TimelineOptions::default()
        };
        let result = build_timeline(&cues, &matcher("hell|heck"), &options);
        let texts: Vec<_> = result.output_cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(vec!["Hello there", "What the heck", "Bye"], texts);
        assert_eq!(vec![(5.0, 6.0)], intervals(&result));
    }

    #[test]
    fn last_cue_policies() {
        let cues = vec![cue(1, 0, 1000, "fine"), cue(2, 3000, 4000, "damn")];
        let m = matcher("damn");

        let include = build_timeline(&cues, &m, &pad(0));
        assert_eq!(vec![cue(2, 3000, 4000, "*****")], include.output_cues);

        let options = TimelineOptions {
            last_cue: LastCuePolicy::Drop,
            ..TimelineOptions::default()
        };
        let dropped = build_timeline(&cues, &m, &options);
        assert!(dropped.output_cues.is_empty());
        assert!(dropped.mute_intervals.is_empty());
    }

    #[test]
    fn drop_policy_still_drops_last_in_full_subs_mode() {
        let cues = vec![cue(1, 0, 1000, "fine"), cue(2, 3000, 4000, "also fine")];
        let options = TimelineOptions {
            full_subs: true,
            last_cue: LastCuePolicy::Drop,
            ..TimelineOptions::default()
        };
        let result = build_timeline(&cues, &matcher("damn"), &options);
        assert_eq!(vec![cue(1, 0, 1000, "fine")], result.output_cues);
    }

    #[test]
    fn padding_needs_a_successor() {
        // The final cue has no successor, so it can't be kept just for
        // following profanity.
        let cues = vec![cue(1, 0, 1000, "damn"), cue(2, 1100, 1500, "clean")];
        let result = build_timeline(&cues, &matcher("damn"), &pad(500));
        assert_eq!(1, result.output_cues.len());
    }

    #[test]
    fn cue_timestamps_are_never_padded() {
        let cues = CueFile::from_path(Path::new("fixtures/sample.srt")).unwrap().cues;
        let rules = ProfanityRules::from_path(Path::new("fixtures/swears.txt")).unwrap();
        let m = Matcher::new(rules).unwrap();
        let result = build_timeline(&cues, &m, &pad(2000));
        assert!(!result.output_cues.is_empty());
        for out in &result.output_cues {
            let source = cues.iter().find(|c| c.index == out.index).unwrap();
            assert_eq!((source.start, source.end), (out.start, out.end));
            assert!(out.start <= out.end);
        }
    }

    #[test]
    fn increasing_pad_only_adds() {
        let cues = CueFile::from_path(Path::new("fixtures/sample.srt")).unwrap().cues;
        let rules = ProfanityRules::from_path(Path::new("fixtures/swears.txt")).unwrap();
        let m = Matcher::new(rules).unwrap();
        let unpadded = build_timeline(&cues, &m, &pad(0));
        for pad_ms in &[1, 250, 500, 1000, 2000, 10_000] {
            let padded = build_timeline(&cues, &m, &pad(*pad_ms));
            for kept in &unpadded.output_cues {
                assert!(padded.output_cues.contains(kept), "pad {} lost {:?}", pad_ms, kept);
            }
            assert!(padded.mute_intervals.len() >= unpadded.mute_intervals.len());
            for interval in &unpadded.mute_intervals {
                assert!(padded.mute_intervals.iter().any(|p| p.start() <= interval.start()
                    && interval.end() <= p.end()));
            }
        }
    }

    #[test]
    fn scan_is_deterministic() {
        let cues = CueFile::from_path(Path::new("fixtures/sample.srt")).unwrap().cues;
        let rules = ProfanityRules::from_path(Path::new("fixtures/swears.txt")).unwrap();
        let m = Matcher::new(rules).unwrap();
        let options = pad(1500);
        assert_eq!(build_timeline(&cues, &m, &options), build_timeline(&cues, &m, &options));
    }

    #[test]
    fn enormous_pad_does_not_overflow() {
        let cues = vec![cue(1, 1000, 2000, "damn"), cue(2, 5000, 6000, "fine")];
        let result = build_timeline(&cues, &matcher("damn"), &pad(u64::MAX));
        assert_eq!(1, result.output_cues.len());
        let first = result.mute_intervals[0];
        assert_eq!(i64::MAX, first.end().as_millis());
        assert!(first.start() <= first.end());
    }

    #[test]
    fn empty_input() {
        let result = build_timeline(&[], &matcher("damn"), &pad(500));
        assert_eq!(TimelineResult::default(), result);
        let options = TimelineOptions {
            last_cue: LastCuePolicy::Drop,
            ..TimelineOptions::default()
        };
        assert_eq!(TimelineResult::default(), build_timeline(&[], &matcher("damn"), &options));
    }
}
