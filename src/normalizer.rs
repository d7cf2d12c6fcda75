//! Turns raw input lines into the set of words to search for.

use std::collections::HashSet;
use std::io::{self, BufRead};

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://(?:www\.)?([^/]+)").expect("Invalid URL_RE regex"));

/// Reduces an http(s) URL to its host, without a leading `www.`. Anything else is
/// returned unchanged.
pub fn clean_url(word: &str) -> &str {
    match URL_RE.captures(word).and_then(|caps| caps.get(1)) {
        Some(host) => host.as_str(),
        None => word,
    }
}

/// Words derived from one input line: the trimmed (and optionally URL-cleaned)
/// line, the same with whitespace removed, and with whitespace runs turned into
/// hyphens. Duplicates are not removed here.
pub fn variants(line: &str, clean_urls: bool) -> [String; 3] {
    let mut word = line.trim();
    if clean_urls {
        word = clean_url(word);
    }

    let parts: Vec<&str> = word.split_whitespace().collect();
    [word.to_string(), parts.concat(), parts.join("-")]
}

/// Deduplicated words, keyed by exact (case-sensitive) value.
#[derive(Debug, Default, Clone)]
pub struct WordSet {
    words: HashSet<String>,
    clean_urls: bool,
}

impl WordSet {
    pub fn new(clean_urls: bool) -> Self {
        Self {
            words: HashSet::new(),
            clean_urls,
        }
    }

    /// Adds every variant of `line`. A blank line adds the empty word.
    pub fn insert_line(&mut self, line: &str) {
        for word in variants(line, self.clean_urls) {
            self.words.insert(word);
        }
    }

    /// Adds every line of `input`. Lines are split on `\n` (a trailing `\r` is
    /// dropped) and decoded lossily, so only a failing read is an error.
    pub fn read_lines<R: BufRead>(&mut self, input: R) -> io::Result<usize> {
        let mut count = 0;
        for line in input.split(b'\n') {
            let mut line = line?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            self.insert_line(&String::from_utf8_lossy(&line));
            count += 1;
        }
        Ok(count)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl<'a> Extend<&'a str> for WordSet {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, lines: I) {
        for line in lines {
            self.insert_line(line);
        }
    }
}
