//! Domain logic kept apart from the MCP and HTTP surfaces.
//!
//! - [`stats`]: weekly statistics and goal progress
//! - [`workouts`]: workout input validation and result shaping
//! - [`meals`]: meal-type catalogue and meal input validation
//! - [`coach`]: coach prompt composition and completion

pub mod coach;
pub mod meals;
pub mod stats;
pub mod workouts;

pub use stats::{DEFAULT_WEEKLY_GOAL, StatsAggregator, StatsSummary, StatsWindow};
