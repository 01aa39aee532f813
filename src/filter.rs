//! Regular-expression line filtering.
//!
//! A [`PatternGroup`] matches when all of its expressions match, and a
//! [`Filter`] passes a line when any of its groups matches. A filter without
//! groups passes everything.

use std::pin::Pin;
use std::task;

use futures_util::ready;
use futures_util::stream::Stream as FuturesStream;
use pin_project_lite::pin_project;
use regex::Regex;

use crate::error::{Error, Result};

/// Expressions that must all match (AND).
#[derive(Clone, Debug)]
pub struct PatternGroup {
    patterns: Vec<Regex>,
}

impl PatternGroup {
    /// Compiles every expression, failing on the first malformed one.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| Error::Pattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PatternGroup { patterns })
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.patterns.iter().all(|re| re.is_match(line))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Groups of which at least one must match (OR).
#[derive(Clone, Debug, Default)]
pub struct Filter {
    groups: Vec<PatternGroup>,
}

impl Filter {
    /// A filter that passes every line.
    pub fn all() -> Self {
        Filter::default()
    }

    /// Compiles a filter from groups of expression strings.
    ///
    /// ```
    /// use linetail::Filter;
    ///
    /// let filter = Filter::new([vec!["error", "db"], vec!["warn"]]).unwrap();
    /// assert!(filter.is_match("db error seen"));
    /// assert!(filter.is_match("warn only"));
    /// assert!(!filter.is_match("info only"));
    /// ```
    pub fn new<G, I, S>(groups: G) -> Result<Self>
    where
        G: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let groups = groups
            .into_iter()
            .map(PatternGroup::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Filter { groups })
    }

    /// Parses the query syntax used by streaming subscribers:
    /// `tok1&&tok2||tok3` is `(tok1 AND tok2) OR tok3`.
    ///
    /// Tokens are regular expressions and are trimmed. Empty tokens and empty
    /// groups are skipped, so an empty query passes everything.
    pub fn parse_query(query: &str) -> Result<Self> {
        let groups = query
            .split("||")
            .map(|group| {
                group
                    .split("&&")
                    .map(str::trim)
                    .filter(|tok| !tok.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|group| !group.is_empty());

        Filter::new(groups)
    }

    /// Appends a group to the OR set.
    pub fn push(&mut self, group: PatternGroup) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[PatternGroup] {
        &self.groups
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.groups.is_empty() || self.groups.iter().any(|group| group.is_match(line))
    }
}

pin_project! {
/// Stream adapter that only yields lines passing a [`Filter`].
///
/// This is how a query filter is layered on top of a follower's own filter:
/// a line reaches the consumer only if it passed both.
#[derive(Debug)]
#[must_use = "streams do nothing unless polled"]
pub struct Matching<S> {
    #[pin]
    inner: S,
    filter: Filter,
}
}

/// Wraps `stream` so that only lines matching `filter` are yielded.
pub fn matching<S>(stream: S, filter: Filter) -> Matching<S>
where
    S: FuturesStream<Item = String>,
{
    Matching {
        inner: stream,
        filter,
    }
}

impl<S> Matching<S> {
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> FuturesStream for Matching<S>
where
    S: FuturesStream<Item = String>,
{
    type Item = String;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> task::Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(line) if this.filter.is_match(&line) => {
                    return task::Poll::Ready(Some(line));
                }
                Some(_) => continue,
                None => return task::Poll::Ready(None),
            }
        }
    }
}
