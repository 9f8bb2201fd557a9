//! Title matching against the configured phrase sets.
//!
//! Marketplace subreddits title their posts `[H] what I have [W] what I want`,
//! so `have` and `want` phrases are tested against their own half of the title
//! while `post` phrases see the whole thing. A title matches when any of the
//! configured modes matches.

/// Marker separating the "have" and "want" halves, compared after lower-casing.
pub const WANT_MARKER: &str = "[w]";

/// Lowercase, trimmed phrases grouped by the part of the title they apply to.
///
/// Phrases are normalised on the way in, so blank entries never reach the
/// matcher and case never matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSets {
    post: Vec<String>,
    have: Vec<String>,
    want: Vec<String>,
}

impl RuleSets {
    pub fn with_post<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.post = normalize_phrases(phrases);
        self
    }

    pub fn with_have<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.have = normalize_phrases(phrases);
        self
    }

    pub fn with_want<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.want = normalize_phrases(phrases);
        self
    }

    pub fn post(&self) -> &[String] {
        &self.post
    }

    pub fn have(&self) -> &[String] {
        &self.have
    }

    pub fn want(&self) -> &[String] {
        &self.want
    }

    pub fn is_empty(&self) -> bool {
        self.post.is_empty() && self.have.is_empty() && self.want.is_empty()
    }
}

/// Trims and lowercases each phrase, dropping the blank ones.
///
/// An empty phrase is a substring of every title.
pub fn normalize_phrases<I, S>(phrases: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    phrases
        .into_iter()
        .map(|phrase| phrase.as_ref().trim().to_lowercase())
        .filter(|phrase| !phrase.is_empty())
        .collect()
}

/// True if any phrase occurs in `text`. An empty phrase list never matches.
pub fn contains_any(phrases: &[String], text: &str) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase.as_str()))
}

/// Splits a lower-cased title into its have segment and, when the title
/// carries a non-empty `[w]` section, its want segment.
pub fn split_have_want(title: &str) -> (&str, Option<&str>) {
    let mut segments = title.split(WANT_MARKER);
    let have = segments.next().unwrap_or_default();
    let want = segments.next().filter(|segment| !segment.is_empty());
    (have, want)
}

pub fn matches(rules: &RuleSets, title: &str) -> bool {
    let title = title.to_lowercase();

    if contains_any(&rules.post, &title) {
        return true;
    }

    if rules.have.is_empty() && rules.want.is_empty() {
        return false;
    }

    let (have, want) = split_have_want(&title);
    contains_any(&rules.have, have) || want.is_some_and(|want| contains_any(&rules.want, want))
}
