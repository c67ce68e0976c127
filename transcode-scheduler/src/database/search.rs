//! Job search predicates.
//!
//! Translates parsed query clauses into SQL fragments over the `jobs` table.
//! Joins are only added when a clause references a related table.

use chrono::{DateTime, TimeZone};
use job_query::{Clause, Field, Query, Relation};
use tracing::debug;

use crate::database::time::datetime_to_ms;
use crate::domain::JobState;

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bind {
    Text(String),
    Integer(i64),
}

/// One condition of the WHERE clause with its bound values in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlPredicate {
    pub sql: String,
    pub binds: Vec<Bind>,
}

impl SqlPredicate {
    fn new(sql: impl Into<String>, binds: Vec<Bind>) -> Self {
        Self {
            sql: sql.into(),
            binds,
        }
    }
}

/// Filter over jobs built from a search string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSearch {
    predicates: Vec<SqlPredicate>,
    joins: Vec<Relation>,
}

impl JobSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `input` and build predicates; date shortcuts resolve against `now`.
    pub fn parse<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Self {
        Self::from_query(&job_query::parse(input, now))
    }

    pub fn from_query(query: &Query) -> Self {
        if !query.terms().is_empty() {
            debug!(terms = ?query.terms(), "Ignoring bare words in search");
        }
        let mut search = Self::new();
        for clause in query.clauses() {
            search.push_clause(clause);
        }
        search
    }

    /// Jobs currently in `state`.
    pub fn by_state(state: &str) -> Self {
        let mut search = Self::new();
        search.push(SqlPredicate::new(
            "jobs.state = ?",
            vec![Bind::Text(state.to_string())],
        ));
        search
    }

    pub fn push_clause(&mut self, clause: &Clause) {
        if let Some(relation) = clause.relation()
            && !self.joins.contains(&relation)
        {
            self.joins.push(relation);
        }
        self.push(predicate_for(clause));
    }

    fn push(&mut self, predicate: SqlPredicate) {
        if !self.predicates.contains(&predicate) {
            self.predicates.push(predicate);
        }
    }

    pub fn predicates(&self) -> &[SqlPredicate] {
        &self.predicates
    }

    pub fn joins(&self) -> &[Relation] {
        &self.joins
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// `FROM jobs` plus any LEFT JOINs the predicates need.
    pub fn from_sql(&self) -> String {
        let mut sql = String::from("FROM jobs");
        for relation in &self.joins {
            sql.push(' ');
            sql.push_str(join_sql(*relation));
        }
        sql
    }

    /// `WHERE a AND b ...`, or an empty string when unfiltered.
    pub fn where_sql(&self) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }
        let conditions: Vec<&str> = self.predicates.iter().map(|p| p.sql.as_str()).collect();
        format!("WHERE {}", conditions.join(" AND "))
    }

    /// Bound values in placeholder order.
    pub fn binds(&self) -> impl Iterator<Item = &Bind> {
        self.predicates.iter().flat_map(|p| p.binds.iter())
    }
}

fn column(field: Field) -> &'static str {
    match field {
        Field::Id => "jobs.id",
        Field::State => "jobs.state",
        Field::SourceFile => "jobs.source_file",
        Field::DestinationFile => "jobs.destination_file",
        Field::CreatedAt => "jobs.created_at",
        Field::CompletedAt => "jobs.completed_at",
        Field::TranscodingStartedAt => "jobs.transcoding_started_at",
    }
}

fn join_sql(relation: Relation) -> &'static str {
    match relation {
        Relation::Preset => "LEFT JOIN presets ON presets.id = jobs.preset_id",
        Relation::Host => "LEFT JOIN hosts ON hosts.id = jobs.host_id",
    }
}

fn relation_name(relation: Relation) -> &'static str {
    match relation {
        Relation::Preset => "presets.name",
        Relation::Host => "hosts.name",
    }
}

/// Substring pattern with the user's `%`, `_` and `\` matched literally.
fn like(value: &str) -> Bind {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Bind::Text(pattern)
}

fn like_sql(column: &str) -> String {
    format!("{column} LIKE ? ESCAPE '\\'")
}

fn predicate_for(clause: &Clause) -> SqlPredicate {
    match clause {
        Clause::Exact { field, value } => {
            // A non-numeric id still binds so that it matches nothing.
            let bind = match field {
                Field::Id => value
                    .parse::<i64>()
                    .map(Bind::Integer)
                    .unwrap_or_else(|_| Bind::Text(value.clone())),
                Field::State => Bind::Text(
                    JobState::parse(value)
                        .map(|state| state.as_str().to_string())
                        .unwrap_or_else(|| value.clone()),
                ),
                _ => Bind::Text(value.clone()),
            };
            SqlPredicate::new(format!("{} = ?", column(*field)), vec![bind])
        }
        Clause::Substring { field, value } => {
            SqlPredicate::new(like_sql(column(*field)), vec![like(value)])
        }
        Clause::SubstringEitherOf { fields, value } => SqlPredicate::new(
            format!(
                "({} OR {})",
                like_sql(column(fields[0])),
                like_sql(column(fields[1]))
            ),
            vec![like(value), like(value)],
        ),
        Clause::JoinSubstring { relation, value } => {
            SqlPredicate::new(like_sql(relation_name(*relation)), vec![like(value)])
        }
        Clause::DateRange { field, window } => {
            let col = column(*field);
            SqlPredicate::new(
                format!("({col} >= ? AND {col} < ?)"),
                vec![
                    Bind::Integer(datetime_to_ms(window.start)),
                    Bind::Integer(datetime_to_ms(window.end)),
                ],
            )
        }
    }
}

/// Listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first, ties broken by id.
    #[default]
    Recent,
    /// `jobs.<column> <direction>`, interpolated as given.
    Column { column: String, direction: String },
}

impl SortOrder {
    /// Build from request parameters; empty strings count as absent.
    ///
    /// Neither part is validated. Callers exposing this to untrusted input
    /// must whitelist columns and directions first.
    pub fn from_params(sort: Option<&str>, dir: Option<&str>) -> Self {
        let sort = sort.map(str::trim).filter(|s| !s.is_empty());
        let dir = dir.map(str::trim).filter(|d| !d.is_empty());
        if sort.is_none() && dir.is_none() {
            return Self::Recent;
        }
        Self::Column {
            column: sort.unwrap_or("created_at").to_string(),
            direction: dir.unwrap_or("desc").to_string(),
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            Self::Recent => "jobs.created_at DESC, jobs.id DESC".to_string(),
            Self::Column { column, direction } => format!("jobs.{column} {direction}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_id_is_single_predicate() {
        let search = JobSearch::parse("id:1", &now());
        assert_eq!(
            search.predicates(),
            &[SqlPredicate::new("jobs.id = ?", vec![Bind::Integer(1)])]
        );
        assert!(search.joins().is_empty());
    }

    #[test]
    fn test_date_window() {
        let search = JobSearch::parse("submitted:2_days_ago", &now());
        let start = Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap();
        let end = start + Duration::days(1);
        assert_eq!(
            search.predicates(),
            &[SqlPredicate::new(
                "(jobs.created_at >= ? AND jobs.created_at < ?)",
                vec![
                    Bind::Integer(start.timestamp_millis()),
                    Bind::Integer(end.timestamp_millis())
                ],
            )]
        );
    }

    #[test]
    fn test_bad_date_adds_nothing() {
        let search = JobSearch::parse("submitted:foo_bar_baz", &now());
        assert!(search.is_empty());
        assert_eq!(search.where_sql(), "");
    }

    #[test]
    fn test_order_independent() {
        let a = JobSearch::parse("state:failed source:foo", &now());
        let b = JobSearch::parse("source:foo state:failed", &now());
        assert_eq!(a.predicates().len(), 2);
        for predicate in a.predicates() {
            assert!(b.predicates().contains(predicate));
        }
        assert!(a.where_sql().contains(" AND "));
    }

    #[test]
    fn test_joins_added_once() {
        let search = JobSearch::parse("preset:h264 host:w1 preset:hevc", &now());
        assert_eq!(search.joins(), &[Relation::Preset, Relation::Host]);
        assert_eq!(
            search.from_sql(),
            "FROM jobs LEFT JOIN presets ON presets.id = jobs.preset_id \
             LEFT JOIN hosts ON hosts.id = jobs.host_id"
        );
        assert_eq!(search.binds().count(), 3);
    }

    #[test]
    fn test_file_matches_either_column() {
        let search = JobSearch::parse("file:clip", &now());
        assert_eq!(
            search.where_sql(),
            "WHERE (jobs.source_file LIKE ? ESCAPE '\\' OR jobs.destination_file LIKE ? ESCAPE '\\')"
        );
        let binds: Vec<_> = search.binds().cloned().collect();
        assert_eq!(binds, vec![like("clip"), like("clip")]);
    }

    #[test]
    fn test_state_alias_normalized() {
        for input in ["state:on_hold", "state:OnHold", "state:onhold"] {
            let search = JobSearch::parse(input, &now());
            assert_eq!(
                search.predicates(),
                &[SqlPredicate::new(
                    "jobs.state = ?",
                    vec![Bind::Text("onhold".to_string())]
                )]
            );
        }
        let unknown = JobSearch::parse("state:paused", &now());
        assert_eq!(unknown.binds().cloned().collect::<Vec<_>>(), vec![Bind::Text("paused".to_string())]);
    }

    #[test]
    fn test_like_wildcards_are_literal() {
        assert_eq!(like("a_b"), Bind::Text("%a\\_b%".to_string()));
        assert_eq!(like("50%"), Bind::Text("%50\\%%".to_string()));
        assert_eq!(like("c:\\tmp"), Bind::Text("%c:\\\\tmp%".to_string()));
    }

    #[test]
    fn test_sort_order() {
        assert_eq!(
            SortOrder::from_params(Some("foo"), Some("bar")).to_sql(),
            "jobs.foo bar"
        );
        assert_eq!(
            SortOrder::from_params(None, None).to_sql(),
            "jobs.created_at DESC, jobs.id DESC"
        );
        assert_eq!(
            SortOrder::from_params(Some("priority"), None).to_sql(),
            "jobs.priority desc"
        );
        assert_eq!(SortOrder::from_params(Some(""), Some(" ")), SortOrder::Recent);
    }
}
