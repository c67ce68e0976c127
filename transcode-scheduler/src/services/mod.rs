//! Service layer.

pub mod catalog;
pub mod container;
pub mod jobs;
pub mod schedule;

pub use catalog::CatalogService;
pub use container::ServiceContainer;
pub use jobs::{DEFAULT_PER_PAGE, JobDetails, JobService, ListingConfig};
pub use schedule::{DEFAULT_TRANSCODER_TIMEOUT, ScheduleJob};
