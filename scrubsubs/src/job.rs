//! Running a complete cleaning job: reading inputs, building the timeline,
//! writing every requested artifact and, if needed, a new video.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{
    cleanup::OutputGuard,
    errors::Error,
    export::{audio_filter, write_edl, write_markers},
    matcher::Matcher,
    remux::{decode_params, RemuxPlan, DEFAULT_AUDIO_PARAMS, DEFAULT_VIDEO_PARAMS},
    rules::ProfanityRules,
    srt::CueFile,
    timeline::{build_timeline, LastCuePolicy, TimelineOptions, TimelineResult},
    ui::Ui,
    video::Video,
    Result,
};

/// Everything the user can tell us about a job.
#[derive(Clone, Debug)]
pub struct JobOptions {
    /// The video to clean.
    pub input: PathBuf,
    /// Subtitles for `input`. If missing, we extract them from the video.
    pub subs: Option<PathBuf>,
    /// Where to write the new video, if we make one.
    pub output: Option<PathBuf>,
    /// Where to write the cleaned subtitles.
    pub subs_output: Option<PathBuf>,
    /// The profanity rule file.
    pub swears: PathBuf,
    /// The subtitle language, as tagged in the video container.
    pub lang: String,
    /// Extra time to mute around profanity, in milliseconds.
    pub pad_ms: u64,
    /// Embed the cleaned subtitles in the new video.
    pub embed_subs: bool,
    /// Keep every cue in the cleaned subtitles.
    pub full_subs: bool,
    /// Leave the audio alone.
    pub subs_only: bool,
    /// Write an edit decision list.
    pub edl: bool,
    /// Re-encode the video.
    pub re_encode: bool,
    /// Burn the cleaned subtitles into the picture.
    pub burn: bool,
    /// Video encoder parameters, possibly `base64:`-encoded.
    pub video_params: String,
    /// Audio encoder parameters, possibly `base64:`-encoded.
    pub audio_params: String,
    /// Where to write a marker document.
    pub plex_json: Option<PathBuf>,
    /// The content identifier for the marker document.
    pub plex_id: Option<String>,
    /// How to handle the final cue.
    pub last_cue: LastCuePolicy,
}

impl JobOptions {
    /// Options for cleaning `input` using the rules in `swears`, with
    /// everything else at its default.
    pub fn new<P1, P2>(input: P1, swears: P2) -> JobOptions
    where
        P1: Into<PathBuf>,
        P2: Into<PathBuf>,
    {
        JobOptions {
            input: input.into(),
            subs: None,
            output: None,
            subs_output: None,
            swears: swears.into(),
            lang: "eng".to_owned(),
            pad_ms: 0,
            embed_subs: false,
            full_subs: false,
            subs_only: false,
            edl: false,
            re_encode: false,
            burn: false,
            video_params: DEFAULT_VIDEO_PARAMS.to_owned(),
            audio_params: DEFAULT_AUDIO_PARAMS.to_owned(),
            plex_json: None,
            plex_id: None,
            last_cue: LastCuePolicy::default(),
        }
    }

    /// Are we writing a marker document?
    fn wants_markers(&self) -> bool {
        self.plex_json.is_some() || self.plex_id.is_some()
    }

    /// Should we leave the audio alone? Asking for an EDL or a marker
    /// document means the player will do the muting.
    pub fn is_subs_only(&self) -> bool {
        self.subs_only || self.edl || self.wants_markers()
    }

    /// Should we re-encode the video? Burning in subtitles requires it.
    pub fn is_re_encode(&self) -> bool {
        self.re_encode || self.burn
    }

    /// Do we need to write a new video, given how many intervals we mute?
    pub fn needs_new_video(&self, mute_intervals: usize) -> bool {
        self.is_re_encode() || self.embed_subs || (!self.is_subs_only() && mute_intervals > 0)
    }

    /// Where the new video goes. Defaults to `<stem>_clean<ext>`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| with_stem_suffix(&self.input, "_clean"))
    }

    /// Where the cleaned version of `subs` goes. Defaults to
    /// `<stem>_clean<ext>`.
    pub fn subs_output_path(&self, subs: &Path) -> PathBuf {
        self.subs_output
            .clone()
            .unwrap_or_else(|| with_stem_suffix(subs, "_clean"))
    }

    /// Where the marker document goes, if we want one.
    pub fn markers_path(&self) -> Option<PathBuf> {
        match (&self.plex_json, &self.plex_id) {
            (Some(path), _) => Some(path.clone()),
            (None, Some(_)) => {
                let mut name = self
                    .input
                    .file_stem()
                    .map(|s| s.to_owned())
                    .unwrap_or_default();
                name.push("_PlexAutoSkip_clean.json");
                Some(self.input.with_file_name(name))
            }
            (None, None) => None,
        }
    }
}

/// Insert `suffix` between the stem and extension of `path`.
fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_stem().map(|s| s.to_owned()).unwrap_or_default();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// What a job produced.
#[derive(Clone, Debug, Default)]
pub struct JobReport {
    /// The cleaned subtitles.
    pub clean_subs: PathBuf,
    /// The edit decision list, if we wrote one.
    pub edl: Option<PathBuf>,
    /// The marker document, if we wrote one.
    pub markers: Option<PathBuf>,
    /// The new video, if we wrote one.
    pub video: Option<PathBuf>,
    /// The timeline we built.
    pub timeline: TimelineResult,
}

/// A cleaning job, ready to run.
#[derive(Debug)]
pub struct CleanJob {
    options: JobOptions,
    matcher: Matcher,
}

impl CleanJob {
    /// Check `options` and load our profanity rules.
    pub fn new(options: JobOptions) -> Result<CleanJob> {
        if options.plex_json.is_some() && options.plex_id.is_none() {
            return Err(Error::MissingContentId {
                path: options.plex_json.clone().unwrap_or_default(),
            });
        }
        let rules = ProfanityRules::from_path(&options.swears)?;
        let matcher = Matcher::new(rules)?;
        Ok(CleanJob { options, matcher })
    }

    /// Our options.
    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    /// Find our input subtitles, extracting them from the video if we
    /// weren't given any.
    fn find_subs(&self) -> Result<PathBuf> {
        if let Some(subs) = &self.options.subs {
            return Ok(subs.clone());
        }
        let video = Video::new(&self.options.input)?;
        video
            .extract_subtitles(&self.options.lang)?
            .ok_or_else(|| Error::NoSubtitles {
                video: self.options.input.clone(),
                lang: self.options.lang.clone(),
            })
    }

    /// Run this job. If anything fails, the outputs we created are removed
    /// again.
    pub fn run(&self, ui: &Ui) -> Result<JobReport> {
        let opt = &self.options;
        if !opt.input.is_file() {
            return Err(Error::NoSuchVideo {
                path: opt.input.clone(),
            });
        }

        let subs = self.find_subs()?;
        let cues = CueFile::from_path(&subs)?;
        let timeline = build_timeline(
            &cues.cues,
            &self.matcher,
            &TimelineOptions {
                pad_ms: opt.pad_ms,
                full_subs: opt.full_subs,
                last_cue: opt.last_cue,
            },
        );
        let intervals = &timeline.mute_intervals;
        info!(
            "{} cues to keep, {} intervals to mute",
            timeline.output_cues.len(),
            intervals.len()
        );

        // Everything that can fail without touching the disk goes first.
        let filter = if opt.is_subs_only() || intervals.is_empty() {
            None
        } else {
            Some(audio_filter(intervals)?)
        };
        let plan = if opt.needs_new_video(intervals.len()) {
            Some(RemuxPlan {
                input: opt.input.clone(),
                output: opt.output_path(),
                subs: opt.subs_output_path(&subs),
                lang: opt.lang.clone(),
                embed_subs: opt.embed_subs,
                burn_subs: opt.burn,
                re_encode: opt.is_re_encode(),
                video_params: decode_params(&opt.video_params)?,
                audio_params: decode_params(&opt.audio_params)?,
                audio_filter: filter,
            })
        } else {
            None
        };

        let mut guard = OutputGuard::new();
        let mut report = JobReport {
            clean_subs: opt.subs_output_path(&subs),
            ..JobReport::default()
        };
        timeline.to_cue_file().write_to_path(&report.clean_subs)?;
        guard.register(&report.clean_subs);

        if opt.edl {
            let path = report.clean_subs.with_extension("edl");
            if write_edl(&path, intervals)? {
                guard.register(&path);
                report.edl = Some(path);
            }
        }

        match plan {
            Some(plan) => {
                plan.run(ui)?;
                guard.register(&plan.output);
                report.video = Some(plan.output);
            }
            None => debug!("leaving {} unaltered", opt.input.display()),
        }

        // A marker document may be shared with other videos, so it is only
        // touched once everything else has succeeded.
        if let (Some(path), Some(id)) = (opt.markers_path(), &opt.plex_id) {
            let existed = path.exists();
            if write_markers(&path, id, intervals)? {
                if !existed {
                    guard.register(&path);
                }
                report.markers = Some(path);
            }
        }

        guard.commit();
        report.timeline = timeline;
        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::{with_stem_suffix, CleanJob, JobOptions};
    use crate::{errors::ErrorKind, ui::Ui};

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
    }

    /// A job in a scratch directory, with a dummy video and our sample
    /// subtitles.
    fn scratch_job(dir: &Path) -> JobOptions {
        let _ = env_logger::builder().is_test(true).try_init();
        let video = dir.join("movie.mkv");
        fs::write(&video, "not really a video").unwrap();
        let subs = dir.join("movie.srt");
        fs::copy(fixture("sample.srt"), &subs).unwrap();
        let mut options = JobOptions::new(video, fixture("swears.txt"));
        options.subs = Some(subs);
        options.subs_only = true;
        options
    }

    #[test]
    fn derived_paths() {
        assert_eq!(
            PathBuf::from("/v/Film.2020_clean.mkv"),
            with_stem_suffix(Path::new("/v/Film.2020.mkv"), "_clean")
        );
        assert_eq!(PathBuf::from("noext_clean"), with_stem_suffix(Path::new("noext"), "_clean"));

        let mut options = JobOptions::new("/v/Film.mkv", "swears.txt");
        assert_eq!(PathBuf::from("/v/Film_clean.mkv"), options.output_path());
        assert_eq!(
            PathBuf::from("/s/Film.eng_clean.srt"),
            options.subs_output_path(Path::new("/s/Film.eng.srt"))
        );
        assert_eq!(None, options.markers_path());
        options.plex_id = Some("42".to_owned());
        assert_eq!(
            Some(PathBuf::from("/v/Film_PlexAutoSkip_clean.json")),
            options.markers_path()
        );
    }

    #[test]
    fn mode_implications() {
        let mut options = JobOptions::new("a.mkv", "swears.txt");
        assert!(!options.is_subs_only());
        assert!(options.needs_new_video(1));
        assert!(!options.needs_new_video(0));

        options.edl = true;
        assert!(options.is_subs_only());
        assert!(!options.needs_new_video(3));

        options.embed_subs = true;
        assert!(options.needs_new_video(0));

        let mut options = JobOptions::new("a.mkv", "swears.txt");
        options.plex_id = Some("1".to_owned());
        assert!(options.is_subs_only());
        options.burn = true;
        assert!(options.is_re_encode());
        assert!(options.needs_new_video(0));
    }

    #[test]
    fn marker_path_without_id_is_rejected() {
        let mut options = JobOptions::new("a.mkv", fixture("swears.txt"));
        options.plex_json = Some(PathBuf::from("skip.json"));
        let err = CleanJob::new(options).unwrap_err();
        assert_eq!(ErrorKind::Config, err.kind());
    }

    #[test]
    fn missing_rules_are_rejected() {
        let options = JobOptions::new("a.mkv", fixture("no-such-rules.txt"));
        let err = CleanJob::new(options).unwrap_err();
        assert_eq!(ErrorKind::Config, err.kind());
    }

    #[test]
    fn missing_video_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = scratch_job(dir.path());
        options.input = dir.path().join("nope.mkv");
        let err = CleanJob::new(options).unwrap().run(&Ui::quiet()).unwrap_err();
        assert_eq!(ErrorKind::Input, err.kind());
    }

    #[test]
    fn subs_only_run_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = scratch_job(dir.path());
        options.pad_ms = 500;
        options.edl = true;
        options.plex_id = Some("777".to_owned());
        let report = CleanJob::new(options).unwrap().run(&Ui::quiet()).unwrap();

        assert_eq!(dir.path().join("movie_clean.srt"), report.clean_subs);
        let clean = fs::read_to_string(&report.clean_subs).unwrap();
        assert!(clean.contains("Well, darn."));
        assert!(clean.contains("What the heck was that?"));
        assert!(!clean.contains("damn"));

        let edl = report.edl.unwrap();
        assert_eq!(dir.path().join("movie_clean.edl"), edl);
        assert!(fs::read_to_string(&edl).unwrap().ends_with("\t1\n"));

        let markers = report.markers.unwrap();
        assert_eq!(dir.path().join("movie_PlexAutoSkip_clean.json"), markers);
        assert!(fs::read_to_string(&markers).unwrap().contains("\"777\""));

        assert_eq!(None, report.video);
        assert!(!report.timeline.mute_intervals.is_empty());
    }

    #[test]
    fn failed_run_removes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = scratch_job(dir.path());
        let markers = dir.path().join("skip.json");
        fs::write(&markers, "garbage").unwrap();
        options.edl = true;
        options.plex_json = Some(markers.clone());
        options.plex_id = Some("1".to_owned());
        let err = CleanJob::new(options).unwrap().run(&Ui::quiet()).unwrap_err();
        assert_eq!(ErrorKind::Output, err.kind());
        assert!(!dir.path().join("movie_clean.srt").exists());
        assert!(!dir.path().join("movie_clean.edl").exists());
        assert_eq!("garbage", fs::read_to_string(&markers).unwrap());
    }

    #[test]
    fn failed_remux_leaves_existing_markers_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = scratch_job(dir.path());
        let markers = dir.path().join("skip.json");
        let original = r#"{"markers": {"other": []}, "mode": {"other": "skip"}}"#;
        fs::write(&markers, original).unwrap();
        options.plex_json = Some(markers.clone());
        options.plex_id = Some("1".to_owned());
        // Our dummy video can't be remuxed, whether or not ffmpeg exists.
        options.embed_subs = true;
        let err = CleanJob::new(options).unwrap().run(&Ui::quiet()).unwrap_err();
        assert_eq!(ErrorKind::External, err.kind());
        assert_eq!(original, fs::read_to_string(&markers).unwrap());
        assert!(!dir.path().join("movie_clean.srt").exists());
    }

    #[test]
    fn clean_subs_without_profanity_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = scratch_job(dir.path());
        let subs = dir.path().join("movie.srt");
        fs::write(&subs, "1\n00:00:01,000 --> 00:00:02,000\nHello there.\n").unwrap();
        options.edl = true;
        let report = CleanJob::new(options).unwrap().run(&Ui::quiet()).unwrap();
        assert_eq!("", fs::read_to_string(&report.clean_subs).unwrap());
        assert_eq!(None, report.edl);
    }
}
