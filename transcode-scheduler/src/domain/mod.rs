//! Domain layer.
//!
//! This module contains the job entity, its lifecycle state machine, and the
//! value objects carried by submissions and worker callbacks.

pub mod job;

pub use job::{
    COMPLETE_PROGRESS, DEFAULT_PRIORITY, FieldValue, Job, JobArguments, JobState, JobSubmission,
    NewJob, StateEntry, StateParams, Transition,
};
