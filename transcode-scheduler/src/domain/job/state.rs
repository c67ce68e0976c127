//! Job lifecycle states.

use serde::{Deserialize, Serialize};

/// States a transcode job moves through.
///
/// Any state may be entered from any other; workers legitimately re-enter
/// `Processing` after `OnHold`, and retries re-enter `Scheduled` from
/// `Failed`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// Waiting to be picked up by a transcoder.
    #[default]
    Scheduled,
    /// Claimed by a worker.
    Transcoding,
    /// Worker is reporting progress.
    Processing,
    /// Worker paused the job.
    OnHold,
    /// Terminal: the transcode failed.
    Failed,
    /// Terminal: the transcode finished.
    Success,
}

impl JobState {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Transcoding => "transcoding",
            Self::Processing => "processing",
            Self::OnHold => "onhold",
            Self::Failed => "failed",
            Self::Success => "success",
        }
    }

    /// Parse from a database or request string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "transcoding" => Some(Self::Transcoding),
            "processing" => Some(Self::Processing),
            "onhold" | "on_hold" => Some(Self::OnHold),
            "failed" => Some(Self::Failed),
            "success" => Some(Self::Success),
            _ => None,
        }
    }

    /// Success or Failed.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    pub fn is_unfinished(&self) -> bool {
        !self.is_finished()
    }

    /// Whether the worker may still send progress updates.
    pub fn needs_update(&self) -> bool {
        matches!(self, Self::Processing | Self::OnHold)
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid job state: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[test]
    fn test_state_round_trips_through_storage_string() {
        for state in JobState::iter() {
            assert_eq!(JobState::parse(state.as_str()), Some(state));
            assert_eq!(state.to_string(), state.as_str());
        }
    }

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!(JobState::parse("FAILED"), Some(JobState::Failed));
        assert_eq!(JobState::parse("on_hold"), Some(JobState::OnHold));
        assert_eq!(JobState::parse("accepted"), None);
    }

    #[test]
    fn test_default_is_scheduled() {
        assert_eq!(JobState::default(), JobState::Scheduled);
    }

    #[rstest]
    #[case(JobState::Scheduled, false, false)]
    #[case(JobState::Transcoding, false, false)]
    #[case(JobState::Processing, false, true)]
    #[case(JobState::OnHold, false, true)]
    #[case(JobState::Failed, true, false)]
    #[case(JobState::Success, true, false)]
    fn test_predicates(#[case] state: JobState, #[case] finished: bool, #[case] needs_update: bool) {
        assert_eq!(state.is_finished(), finished);
        assert_eq!(state.is_unfinished(), !finished);
        assert_eq!(state.needs_update(), needs_update);
    }

    #[test]
    fn test_finished_and_needs_update_are_exclusive() {
        for state in JobState::iter() {
            assert!(!(state.is_finished() && state.needs_update()), "{state}");
        }
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&JobState::OnHold).unwrap();
        assert_eq!(json, "\"onhold\"");
    }
}
