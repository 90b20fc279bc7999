//! Placeholder Tokens
//!
//! Every slot of a template is marked in the composed markup by a token
//! `<prefix>-<index>-`. The prefix carries a nonce chosen per bind so that
//! no literal fragment of the template contains it.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const TOKEN_STEM: &str = "htmel";

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"htmel(\d+)-(\d+)-").expect("valid token pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderToken(String);

impl PlaceholderToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceholderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlaceholderToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mints the tokens of one bind operation
#[derive(Debug, Clone)]
pub struct TokenFactory {
    nonce: u64,
    prefix: String,
}

impl TokenFactory {
    /// Pick a prefix that collides with none of `fragments`
    pub fn for_fragments<S: AsRef<str>>(fragments: &[S]) -> Self {
        Self::first_free(fragments, 0)
    }

    /// The next prefix after this one that collides with none of `fragments`
    pub fn next<S: AsRef<str>>(&self, fragments: &[S]) -> Self {
        Self::first_free(fragments, self.nonce + 1)
    }

    fn first_free<S: AsRef<str>>(fragments: &[S], mut nonce: u64) -> Self {
        loop {
            let prefix = format!("{}{}", TOKEN_STEM, nonce);
            let marker = format!("{}-", prefix);
            if !fragments.iter().any(|f| f.as_ref().contains(&marker)) {
                return TokenFactory { nonce, prefix };
            }
            nonce += 1;
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn token(&self, index: usize) -> PlaceholderToken {
        PlaceholderToken(format!("{}-{}-", self.prefix, index))
    }

    /// Join literal fragments with the tokens of the slots between them
    pub fn compose<S: AsRef<str>>(&self, fragments: &[S]) -> String {
        let mut source = String::new();
        for (index, fragment) in fragments.iter().enumerate() {
            if index > 0 {
                source.push_str(self.token(index - 1).as_str());
            }
            source.push_str(fragment.as_ref());
        }
        source
    }

    /// Slot index of a token match that belongs to this factory
    fn slot_of(&self, caps: &Captures<'_>) -> Option<usize> {
        let nonce: u64 = caps.get(1)?.as_str().parse().ok()?;
        if nonce != self.nonce {
            return None;
        }
        caps.get(2)?.as_str().parse().ok()
    }

    /// Whether `text` holds any token of this factory
    pub fn contains_token(&self, text: &str) -> bool {
        !self.indexes_in(text).is_empty()
    }

    /// Slot indexes of the tokens in `text`, in order of appearance
    pub fn indexes_in(&self, text: &str) -> Vec<usize> {
        TOKEN_PATTERN
            .captures_iter(text)
            .filter_map(|caps| self.slot_of(&caps))
            .collect()
    }

    /// Whether the tokens found across `texts` could be mistaken for one
    /// another: a slot index seen twice or one beyond `slot_count`.
    pub fn collides<'a>(&self, texts: impl IntoIterator<Item = &'a str>, slot_count: usize) -> bool {
        let mut seen = vec![false; slot_count];
        for index in texts.into_iter().flat_map(|text| self.indexes_in(text)) {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => return true,
            }
        }
        false
    }

    /// Render every token in `text` as `${<describe(index)>}`
    pub fn describe(&self, text: &str, describe: impl Fn(usize) -> String) -> String {
        TOKEN_PATTERN
            .replace_all(text, |caps: &Captures<'_>| match self.slot_of(caps) {
                Some(index) => format!("${{{}}}", describe(index)),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
