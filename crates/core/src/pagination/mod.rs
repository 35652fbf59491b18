//! Release-index pagination.
//!
//! The coordinator walks a show's paginated release index (sequentially or
//! concurrently) and hands back the merged episodes in a deterministic order.

mod config;
mod coordinator;
mod ordering;

pub use config::PaginationConfig;
pub use coordinator::{Collection, CollectError, FetchMode, PaginationCoordinator};
pub use ordering::{release_number, sort_episodes};
