//! Repository layer for database access.
//!
//! Each repository is an `async_trait` over the SQLite pool so services can be
//! exercised against an in-memory database.

/// Bind a sequence of [`Bind`](crate::database::search::Bind) values in order.
macro_rules! bind_all {
    ($query:expr, $binds:expr) => {{
        let mut query = $query;
        for bind in $binds {
            query = match bind {
                $crate::database::search::Bind::Text(value) => query.bind(value.clone()),
                $crate::database::search::Bind::Integer(value) => query.bind(*value),
            };
        }
        query
    }};
}

pub mod host;
pub mod job;
pub mod preset;

pub use host::*;
pub use job::*;
pub use preset::*;
