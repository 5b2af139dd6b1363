//! Pagination, field resolution, and aggregation services.

pub mod aggregate;
pub mod interests;
pub mod overview;
pub mod paginate;
pub mod references;
pub mod refresh;
pub mod resolve;
pub mod users;
