//! Clause model produced by the parser.
//!
//! Clauses name logical job attributes, never storage columns. Mapping a
//! clause onto a concrete query is the job of whichever backend consumes it.

use chrono::{DateTime, Utc};

/// A job attribute a clause can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    State,
    SourceFile,
    DestinationFile,
    CreatedAt,
    CompletedAt,
    TranscodingStartedAt,
}

/// An associated record reachable from a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Preset,
    Host,
}

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// One recognized `field:value` unit of a search string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Clause {
    /// Equality on a job attribute.
    Exact { field: Field, value: String },
    /// Case-insensitive substring on a job attribute.
    Substring { field: Field, value: String },
    /// Substring on either of two attributes.
    SubstringEitherOf { fields: [Field; 2], value: String },
    /// Substring on the name of an associated record.
    JoinSubstring { relation: Relation, value: String },
    /// Timestamp inside a window.
    DateRange { field: Field, window: DateWindow },
}

impl Clause {
    /// The relation this clause needs joined, if any.
    pub fn relation(&self) -> Option<Relation> {
        match self {
            Self::JoinSubstring { relation, .. } => Some(*relation),
            _ => None,
        }
    }
}

/// Field names accepted on the left of `:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Key {
    Id,
    State,
    Source,
    Destination,
    File,
    Preset,
    Host,
    Submitted,
    Completed,
    Started,
}

impl Key {
    pub(crate) fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "state" => Some(Self::State),
            "source" | "input" => Some(Self::Source),
            "dest" | "output" => Some(Self::Destination),
            "file" => Some(Self::File),
            "preset" => Some(Self::Preset),
            "host" => Some(Self::Host),
            "submitted" | "created" => Some(Self::Submitted),
            "completed" => Some(Self::Completed),
            "started" => Some(Self::Started),
            _ => None,
        }
    }

    /// The timestamp a date-valued key filters on.
    pub(crate) fn date_field(self) -> Option<Field> {
        match self {
            Self::Submitted => Some(Field::CreatedAt),
            Self::Completed => Some(Field::CompletedAt),
            Self::Started => Some(Field::TranscodingStartedAt),
            _ => None,
        }
    }

    /// Build the clause for a non-date key.
    pub(crate) fn text_clause(self, value: &str) -> Option<Clause> {
        let value = value.to_string();
        let clause = match self {
            Self::Id => Clause::Exact {
                field: Field::Id,
                value,
            },
            Self::State => Clause::Exact {
                field: Field::State,
                value: value.to_ascii_lowercase(),
            },
            Self::Source => Clause::Substring {
                field: Field::SourceFile,
                value,
            },
            Self::Destination => Clause::Substring {
                field: Field::DestinationFile,
                value,
            },
            Self::File => Clause::SubstringEitherOf {
                fields: [Field::SourceFile, Field::DestinationFile],
                value,
            },
            Self::Preset => Clause::JoinSubstring {
                relation: Relation::Preset,
                value,
            },
            Self::Host => Clause::JoinSubstring {
                relation: Relation::Host,
                value,
            },
            Self::Submitted | Self::Completed | Self::Started => return None,
        };
        Some(clause)
    }
}
