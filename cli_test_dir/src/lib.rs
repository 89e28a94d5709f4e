//! Helpers for integration tests which run a command-line binary inside a
//! scratch directory and then inspect the files it wrote.
//!
//! ```rust,no_run
//! use cli_test_dir::*;
//!
//! let testdir = TestDir::new("scrubsubs", "writes_clean_subs");
//! testdir.create_file("movie.mkv", "");
//! testdir
//!     .cmd()
//!     .args(["-i", "movie.mkv", "--subs-only"])
//!     .expect_success();
//! testdir.expect_path("movie_clean.srt");
//! ```
//!
//! Each test gets its own directory under `target/<profile>/integration-tests`,
//! wiped at the start of the test and left behind afterwards so that failures
//! can be inspected.

use std::env;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::str;
use std::sync::atomic::{AtomicUsize, Ordering};

static TEST_ID: AtomicUsize = AtomicUsize::new(0);

/// A scratch directory for one test, plus the binary under test.
pub struct TestDir {
    bin: PathBuf,
    dir: PathBuf,
}

impl TestDir {
    /// Create a fresh directory for `test_name`, which will run `bin_name`
    /// from the current crate.
    pub fn new(bin_name: &str, test_name: &str) -> TestDir {
        let mut bin_dir = env::current_exe()
            .expect("could not find test executable")
            .parent()
            .expect("test executable has no parent directory")
            .to_path_buf();
        if bin_dir.ends_with("deps") {
            bin_dir.pop();
        }

        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        let dir = bin_dir
            .join("integration-tests")
            .join(test_name)
            .join(id.to_string());
        if dir.exists() {
            fs::remove_dir_all(&dir).expect("could not remove old test directory");
        }
        fs::create_dir_all(&dir).expect("could not create test directory");

        let mut bin = bin_dir.join(bin_name);
        if cfg!(windows) {
            bin.set_extension("exe");
        }
        if !bin.exists() {
            eprintln!("WARNING: could not find {}, will search PATH", bin.display());
            bin = PathBuf::from(bin_name);
        }

        TestDir { bin, dir }
    }

    /// A command which runs our binary inside the test directory.
    pub fn cmd(&self) -> process::Command {
        let mut cmd = process::Command::new(&self.bin);
        cmd.current_dir(&self.dir);
        cmd
    }

    /// The absolute path of `path` inside the test directory.
    pub fn path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.dir.join(path)
    }

    /// A path relative to the source directory of the crate being tested.
    /// Useful for finding fixtures.
    pub fn src_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let cwd = env::current_dir().expect("could not get current directory");
        fs::canonicalize(cwd.join(path)).expect("could not canonicalize path")
    }

    /// Create a file in the test directory.
    pub fn create_file<P, S>(&self, path: P, contents: S)
    where
        P: AsRef<Path>,
        S: AsRef<[u8]>,
    {
        let path = self.dir.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("could not create directory");
        }
        fs::write(&path, contents).expect("could not write file");
    }

    /// Fail unless `path` exists.
    pub fn expect_path<P: AsRef<Path>>(&self, path: P) {
        let path = self.dir.join(path);
        assert!(path.exists(), "{} should exist", path.display());
    }

    /// Fail if `path` exists.
    pub fn expect_no_such_path<P: AsRef<Path>>(&self, path: P) {
        let path = self.dir.join(path);
        assert!(!path.exists(), "{} should not exist", path.display());
    }

    /// Fail unless the file at `path` holds exactly `expected`.
    pub fn expect_file_contents<P, S>(&self, path: P, expected: S)
    where
        P: AsRef<Path>,
        S: AsRef<[u8]>,
    {
        let path = self.dir.join(path);
        self.expect_path(&path);
        let found = fs::read(&path).expect("could not read file");
        expect_data_eq(path.display(), &found, expected.as_ref());
    }

    fn read_file(&self, path: &Path) -> String {
        self.expect_path(path);
        fs::read_to_string(path).expect("expected a UTF-8 file")
    }

    /// Fail unless the file at `path` contains `pattern`.
    pub fn expect_contains<P: AsRef<Path>>(&self, path: P, pattern: &str) {
        let path = self.dir.join(path);
        let contents = self.read_file(&path);
        assert!(
            contents.contains(pattern),
            "expected {} to contain {:?}, but it contained {:?}",
            path.display(),
            pattern,
            contents
        );
    }

    /// Fail if the file at `path` contains `pattern`.
    pub fn expect_does_not_contain<P: AsRef<Path>>(&self, path: P, pattern: &str) {
        let path = self.dir.join(path);
        let contents = self.read_file(&path);
        assert!(
            !contents.contains(pattern),
            "expected {} not to contain {:?}, but it contained {:?}",
            path.display(),
            pattern,
            contents
        );
    }
}

fn expect_data_eq<D: fmt::Display>(source: D, found: &[u8], expected: &[u8]) {
    if found != expected {
        panic!(
            "expected {} to equal {:?}, found {:?}",
            source,
            String::from_utf8_lossy(expected),
            String::from_utf8_lossy(found)
        );
    }
}

/// Extension methods for `std::process::Output`.
pub trait OutputExt {
    /// Standard output as a `str`.
    fn stdout_str(&self) -> &str;

    /// Standard error as a `str`.
    fn stderr_str(&self) -> &str;
}

impl OutputExt for process::Output {
    fn stdout_str(&self) -> &str {
        str::from_utf8(&self.stdout).expect("stdout was not UTF-8 text")
    }

    fn stderr_str(&self) -> &str {
        str::from_utf8(&self.stderr).expect("stderr was not UTF-8 text")
    }
}

/// Check how a child process exited.
pub trait ExpectStatus {
    /// Fail unless the process succeeded, and return its output.
    fn expect_success(self) -> process::Output;

    /// Fail unless the process failed, and return its output.
    fn expect_failure(self) -> process::Output;
}

/// Echo a child's output so that it shows up in the test log.
fn dump(output: &process::Output) {
    io::stdout()
        .write_all(&output.stdout)
        .expect("could not write to stdout");
    io::stderr()
        .write_all(&output.stderr)
        .expect("could not write to stderr");
}

impl ExpectStatus for process::Output {
    fn expect_success(self) -> process::Output {
        if !self.status.success() {
            dump(&self);
            panic!("expected command to succeed, got {:?}", self.status)
        }
        self
    }

    fn expect_failure(self) -> process::Output {
        if self.status.success() {
            dump(&self);
            panic!("expected command to fail, got {:?}", self.status)
        }
        self
    }
}

impl<ES: ExpectStatus, E: fmt::Debug> ExpectStatus for Result<ES, E> {
    fn expect_success(self) -> process::Output {
        match self {
            Ok(es) => es.expect_success(),
            Err(err) => panic!("error running command: {:?}", err),
        }
    }

    fn expect_failure(self) -> process::Output {
        match self {
            Ok(es) => es.expect_failure(),
            // We couldn't even run the command.
            Err(err) => panic!("error running command: {:?}", err),
        }
    }
}

impl<'a> ExpectStatus for &'a mut process::Command {
    fn expect_success(self) -> process::Output {
        self.output().expect_success()
    }

    fn expect_failure(self) -> process::Output {
        self.output().expect_failure()
    }
}
