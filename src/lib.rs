//! Balanced karting teams.
//!
//! Participants of every group are first placed into teams that honor their team size
//! preferences ([`matching`]), then pairwise swaps lower the spread of the teams' effort-weighted
//! lap times ([`descent`]). [`restart`] repeats both from shuffled orders and keeps the best
//! result per group.

pub mod action;
pub mod cache;
pub mod config;
pub mod descent;
pub mod error;
pub mod matching;
pub mod model;
pub mod report;
pub mod restart;

pub use descent::Sweep;
pub use error::AssignError;
pub use model::condition::{GroupSizes, Score};
pub use model::entity::Participant;
pub use model::group::{Group, Table, Team};
pub use restart::{optimize, optimize_parallel, Best, Params};
