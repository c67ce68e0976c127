//! Transcode job entity and lifecycle.

mod arguments;
mod entity;
mod entry;
mod params;
mod state;
mod submission;

pub use arguments::JobArguments;
pub use entity::{DEFAULT_PRIORITY, Job, NewJob};
pub use entry::{COMPLETE_PROGRESS, FieldValue, StateEntry, Transition};
pub use params::StateParams;
pub use state::JobState;
pub use submission::JobSubmission;
