//! State entry effects.
//!
//! Entering a state is a pure computation from `(state, params, now)` to the
//! set of job columns that change. Storage writes exactly [`StateEntry::changes`]
//! in one update and the service runs the scheduling trigger for
//! [`StateEntry::Scheduled`].

use chrono::{DateTime, Utc};

use super::{JobState, StateParams};

/// Progress recorded on success regardless of what the worker reported.
pub const COMPLETE_PROGRESS: f64 = 1.0;

/// Field changes applied when a job enters a state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEntry {
    /// Dispatch to the transcoder; no fields change.
    Scheduled,
    Transcoding {
        host_id: Option<String>,
        remote_job_id: Option<String>,
        started_at: DateTime<Utc>,
    },
    /// Values are stored as given, without clamping or rounding.
    Processing {
        progress: Option<f64>,
        duration: Option<f64>,
        filesize: Option<f64>,
    },
    OnHold,
    Failed {
        message: Option<String>,
    },
    Success {
        completed_at: DateTime<Utc>,
        message: Option<String>,
    },
}

/// New value of one job column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Real(Option<f64>),
    Timestamp(DateTime<Utc>),
}

impl StateEntry {
    pub fn for_state(state: JobState, params: &StateParams, now: DateTime<Utc>) -> Self {
        match state {
            JobState::Scheduled => Self::Scheduled,
            JobState::Transcoding => Self::Transcoding {
                host_id: params.string("host_id"),
                remote_job_id: params.string("job_id"),
                started_at: now,
            },
            JobState::Processing => Self::Processing {
                progress: params.float("progress"),
                duration: params.float("duration"),
                filesize: params.float("filesize"),
            },
            JobState::OnHold => Self::OnHold,
            JobState::Failed => Self::Failed {
                message: params.string("message"),
            },
            JobState::Success => Self::Success {
                completed_at: now,
                message: params.string("message"),
            },
        }
    }

    pub fn state(&self) -> JobState {
        match self {
            Self::Scheduled => JobState::Scheduled,
            Self::Transcoding { .. } => JobState::Transcoding,
            Self::Processing { .. } => JobState::Processing,
            Self::OnHold => JobState::OnHold,
            Self::Failed { .. } => JobState::Failed,
            Self::Success { .. } => JobState::Success,
        }
    }

    /// Whether entering triggers a dispatch to the transcoder.
    pub fn dispatches(&self) -> bool {
        matches!(self, Self::Scheduled)
    }

    /// Columns written on entry besides `state` and `updated_at`.
    pub fn changes(&self) -> Vec<(&'static str, FieldValue)> {
        match self {
            Self::Scheduled | Self::OnHold => Vec::new(),
            Self::Transcoding {
                host_id,
                remote_job_id,
                started_at,
            } => vec![
                ("host_id", FieldValue::Text(host_id.clone())),
                ("remote_job_id", FieldValue::Text(remote_job_id.clone())),
                ("transcoding_started_at", FieldValue::Timestamp(*started_at)),
            ],
            Self::Processing {
                progress,
                duration,
                filesize,
            } => vec![
                ("progress", FieldValue::Real(*progress)),
                ("duration", FieldValue::Real(*duration)),
                ("filesize", FieldValue::Real(*filesize)),
            ],
            Self::Failed { message } => vec![("message", FieldValue::Text(message.clone()))],
            Self::Success {
                completed_at,
                message,
            } => vec![
                ("completed_at", FieldValue::Timestamp(*completed_at)),
                ("message", FieldValue::Text(message.clone())),
                ("progress", FieldValue::Real(Some(COMPLETE_PROGRESS))),
            ],
        }
    }
}

/// A requested transition with its audit note.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub entry: StateEntry,
    /// `message` from the request, kept on the audit row for every state.
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

impl Transition {
    pub fn new(state: JobState, params: &StateParams) -> Self {
        Self::at(state, params, Utc::now())
    }

    pub fn at(state: JobState, params: &StateParams, at: DateTime<Utc>) -> Self {
        Self {
            entry: StateEntry::for_state(state, params, at),
            note: params.string("message"),
            at,
        }
    }

    pub fn state(&self) -> JobState {
        self.entry.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use strum::IntoEnumIterator;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn changes(state: JobState, params: &StateParams) -> Vec<(&'static str, FieldValue)> {
        StateEntry::for_state(state, params, now()).changes()
    }

    fn columns(changes: &[(&'static str, FieldValue)]) -> Vec<&'static str> {
        changes.iter().map(|(name, _)| *name).collect()
    }

    #[test]
    fn test_every_state_maps_to_itself() {
        for state in JobState::iter() {
            assert_eq!(StateEntry::for_state(state, &StateParams::new(), now()).state(), state);
        }
    }

    #[test]
    fn test_only_scheduled_dispatches() {
        for state in JobState::iter() {
            let entry = StateEntry::for_state(state, &StateParams::new(), now());
            assert_eq!(entry.dispatches(), state == JobState::Scheduled);
        }
    }

    #[test]
    fn test_transcoding_records_worker() {
        let params = StateParams::new().with("host_id", "h1").with("job_id", "remote-9");
        assert_eq!(
            changes(JobState::Transcoding, &params),
            vec![
                ("host_id", FieldValue::Text(Some("h1".to_string()))),
                ("remote_job_id", FieldValue::Text(Some("remote-9".to_string()))),
                ("transcoding_started_at", FieldValue::Timestamp(now())),
            ]
        );
    }

    #[test]
    fn test_processing_passes_values_through() {
        let params = StateParams::new()
            .with("progress", 1.7)
            .with("duration", 90.7)
            .with("filesize", "12.9");
        assert_eq!(
            changes(JobState::Processing, &params),
            vec![
                ("progress", FieldValue::Real(Some(1.7))),
                ("duration", FieldValue::Real(Some(90.7))),
                ("filesize", FieldValue::Real(Some(12.9))),
            ]
        );
    }

    #[test]
    fn test_processing_non_numeric_clears() {
        let params = StateParams::new().with("progress", "lots");
        assert_eq!(
            changes(JobState::Processing, &params),
            vec![
                ("progress", FieldValue::Real(None)),
                ("duration", FieldValue::Real(None)),
                ("filesize", FieldValue::Real(None)),
            ]
        );
    }

    #[test]
    fn test_success_forces_full_progress() {
        let params = StateParams::new().with("message", "done").with("progress", 0.2);
        assert_eq!(
            changes(JobState::Success, &params),
            vec![
                ("completed_at", FieldValue::Timestamp(now())),
                ("message", FieldValue::Text(Some("done".to_string()))),
                ("progress", FieldValue::Real(Some(COMPLETE_PROGRESS))),
            ]
        );
    }

    #[test]
    fn test_failed_leaves_progress_alone() {
        let params = StateParams::new().with("message", "x").with("progress", 0.9);
        let changes = changes(JobState::Failed, &params);
        assert_eq!(columns(&changes), vec!["message"]);
        assert_eq!(changes[0].1, FieldValue::Text(Some("x".to_string())));
    }

    #[test]
    fn test_scheduled_and_on_hold_change_only_state() {
        let params = StateParams::new().with("message", "paused").with("progress", 0.4);
        assert!(changes(JobState::OnHold, &params).is_empty());
        assert!(changes(JobState::Scheduled, &params).is_empty());
    }

    #[test]
    fn test_transition_note_comes_from_message() {
        let params = StateParams::new().with("message", "paused by operator");
        let transition = Transition::at(JobState::OnHold, &params, now());
        assert_eq!(transition.note.as_deref(), Some("paused by operator"));
        assert_eq!(transition.state(), JobState::OnHold);
    }
}
