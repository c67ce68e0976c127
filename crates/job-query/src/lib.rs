//! Free-text search grammar for transcode jobs.
//!
//! A query is a whitespace-separated list of tokens. Tokens of the form
//! `field:value` become [`Clause`]s; anything else is kept as a bare term.
//! Values may be double-quoted to contain spaces.
//!
//! | field | clause |
//! |-------|--------|
//! | `id` | [`Clause::Exact`] on [`Field::Id`] |
//! | `state` | [`Clause::Exact`] on [`Field::State`] (lowercased) |
//! | `source`, `input` | [`Clause::Substring`] on [`Field::SourceFile`] |
//! | `dest`, `output` | [`Clause::Substring`] on [`Field::DestinationFile`] |
//! | `file` | [`Clause::SubstringEitherOf`] source or destination |
//! | `preset` | [`Clause::JoinSubstring`] on [`Relation::Preset`] |
//! | `host` | [`Clause::JoinSubstring`] on [`Relation::Host`] |
//! | `submitted`, `created` | [`Clause::DateRange`] on [`Field::CreatedAt`] |
//! | `completed` | [`Clause::DateRange`] on [`Field::CompletedAt`] |
//! | `started` | [`Clause::DateRange`] on [`Field::TranscodingStartedAt`] |
//!
//! Unknown fields and unparseable date shortcuts are dropped without error.

mod clause;
mod date;

pub use clause::{Clause, DateWindow, Field, Relation};
pub use date::{day_window, resolve_shortcut};

use chrono::{DateTime, TimeZone};
use tracing::debug;

use clause::Key;

/// A parsed search string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    clauses: Vec<Clause>,
    terms: Vec<String>,
}

impl Query {
    /// Recognized clauses, in token order, without duplicates.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Bare words. Reported but not used for filtering.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    fn push(&mut self, clause: Clause) {
        if !self.clauses.contains(&clause) {
            self.clauses.push(clause);
        }
    }
}

/// Parse `input`, resolving date shortcuts against `now`.
pub fn parse<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Query {
    let mut query = Query::default();

    for token in tokenize(input) {
        let Some((name, value)) = token.split_once(':') else {
            query.terms.push(token);
            continue;
        };

        let Some(key) = Key::parse(name) else {
            debug!(field = %name, "Ignoring unknown search field");
            continue;
        };

        if value.is_empty() {
            continue;
        }

        if let Some(field) = key.date_field() {
            match resolve_shortcut(value, now) {
                Some(window) => query.push(Clause::DateRange { field, window }),
                None => debug!(field = %name, value = %value, "Dropping unparseable date"),
            }
        } else if let Some(clause) = key.text_clause(value) {
            query.push(clause);
        }
    }

    query
}

fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in input.chars() {
        match ch {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
