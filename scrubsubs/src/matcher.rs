//! Finding and replacing profanity in subtitle text.

use std::borrow::Cow;

use log::debug;
use regex::{Captures, Regex, RegexBuilder};

use crate::{
    errors::Error,
    rules::{ProfanityRules, DEFAULT_MASK},
    Result,
};

/// Large rule lists produce large alternations, so allow more room than the
/// `regex` default.
const PATTERN_SIZE_LIMIT: usize = 64 * (1 << 20);

/// The result of scrubbing a piece of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scrubbed<'a> {
    /// The text with every match replaced.
    pub text: Cow<'a, str>,
    /// Did we replace anything?
    pub changed: bool,
}

/// Replaces whole-word, case-insensitive occurrences of rule terms.
///
/// All the terms are compiled into a single alternation, in the order they
/// appear in the rules, so when two terms could match at the same position
/// the first one listed wins.
#[derive(Debug)]
pub struct Matcher {
    rules: ProfanityRules,
    /// `None` when there are no rules, because an empty alternation would
    /// match everywhere.
    pattern: Option<Regex>,
}

impl Matcher {
    /// Compile a matcher for `rules`.
    pub fn new(rules: ProfanityRules) -> Result<Matcher> {
        if rules.is_empty() {
            debug!("no profanity rules; matcher will never change text");
            return Ok(Matcher {
                rules,
                pattern: None,
            });
        }

        let alternatives: Vec<String> = rules.terms().map(regex::escape).collect();
        let source = format!(r"\b(?:{})\b", alternatives.join("|"));
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map_err(|source| Error::CouldNotCompileRules { source })?;
        debug!("compiled matcher for {} terms", rules.len());
        Ok(Matcher {
            rules,
            pattern: Some(pattern),
        })
    }

    /// The rules we were built from.
    pub fn rules(&self) -> &ProfanityRules {
        &self.rules
    }

    /// Replace every rule term in `text` with its replacement.
    pub fn apply<'a>(&self, text: &'a str) -> Scrubbed<'a> {
        let pattern = match &self.pattern {
            Some(pattern) if pattern.is_match(text) => pattern,
            _ => {
                return Scrubbed {
                    text: Cow::Borrowed(text),
                    changed: false,
                }
            }
        };
        let replaced = pattern.replace_all(text, |caps: &Captures| {
            // Case-folding in the regex engine and `to_lowercase` can
            // disagree on a few exotic characters.
            self.rules
                .replacement(&caps[0])
                .unwrap_or(DEFAULT_MASK)
                .to_owned()
        });
        Scrubbed {
            text: Cow::Owned(replaced.into_owned()),
            changed: true,
        }
    }

    /// Does `text` contain any rule term?
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(false, |pattern| pattern.is_match(text))
    }
}
