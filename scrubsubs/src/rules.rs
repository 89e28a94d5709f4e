//! Loading profanity rules.
//!
//! A rule file has one rule per line, either `term` or `term|replacement`.
//! Terms are matched without regard to case. When no replacement is given,
//! matches are masked with [`DEFAULT_MASK`].

use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use crate::{caseless::CaselessMap, errors::Error, Result};

/// The replacement used for terms which don't specify one.
pub const DEFAULT_MASK: &str = "*****";

/// A set of profanity rules, mapping terms to replacements.
#[derive(Clone, Debug, Default)]
pub struct ProfanityRules {
    map: CaselessMap<String>,
}

impl ProfanityRules {
    /// Create an empty rule set.
    pub fn new() -> ProfanityRules {
        ProfanityRules::default()
    }

    /// Load rules from the file at `path`.
    pub fn from_path(path: &Path) -> Result<ProfanityRules> {
        let data =
            fs::read_to_string(path).map_err(|source| Error::CouldNotReadRules {
                path: path.to_owned(),
                source,
            })?;
        let rules = ProfanityRules::from_lines(data.lines());
        debug!("loaded {} profanity rules from {}", rules.len(), path.display());
        Ok(rules)
    }

    /// Build rules from individual lines. Later lines override earlier ones
    /// with the same term.
    pub fn from_lines<'a, I>(lines: I) -> ProfanityRules
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut rules = ProfanityRules::new();
        for (i, line) in lines.into_iter().enumerate() {
            if !rules.add_line(line) {
                debug!("skipping rule line {}: no term in {:?}", i + 1, line);
            }
        }
        rules
    }

    /// Parse a single rule line and add it. Returns `false` if the line
    /// has no term (a blank line, or one like `|foo`) and was skipped.
    pub fn add_line(&mut self, line: &str) -> bool {
        let line = line.trim_end_matches(|c| c == '\n' || c == '\r');
        match line.split_once('|') {
            Some((term, replacement)) => self.insert(term, replacement),
            None => self.insert(line, DEFAULT_MASK),
        }
    }

    /// Add a rule. An empty `term` is ignored, and we return `false`.
    pub fn insert<T, R>(&mut self, term: T, replacement: R) -> bool
    where
        T: Into<String>,
        R: Into<String>,
    {
        let term = term.into();
        if term.is_empty() {
            return false;
        }
        self.map.insert(term, replacement.into());
        true
    }

    /// The replacement for `term`, ignoring case.
    pub fn replacement(&self, term: &str) -> Option<&str> {
        self.map.get(term).map(|s| s.as_str())
    }

    /// All the terms, in the order they were first added.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.map.keys()
    }

    /// The number of distinct terms.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Do we have any rules at all?
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromStr for ProfanityRules {
    type Err = Error;

    fn from_str(data: &str) -> Result<ProfanityRules> {
        Ok(ProfanityRules::from_lines(data.lines()))
    }
}
