//! Shared infrastructure: errors, ids, store deadlines, indexes and HTTP plumbing

pub mod api_common;
pub mod deadline;
pub mod error;
pub mod indexes;
pub mod middleware;
pub mod tsid;
