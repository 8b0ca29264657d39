//! Read-path planning.
//!
//! - [`projection`] - Projection & sort builder
//! - [`planner`] - Turns a [`GridRequest`](crate::types::GridRequest) into a
//!   [`QueryPlan`](crate::types::QueryPlan)

pub mod planner;
pub mod projection;

pub use planner::QueryPlanner;
pub use projection::ProjectionSortBuilder;
