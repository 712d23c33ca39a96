use thiserror::Error;

use crate::action::ActionError;
use crate::model::entity::{GroupId, Size};

/// Fatal problems with the dataset. None of these depend on participant order, so they are never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssignError {
    #[error("{found} participants are in group {group} while {expected} are expected")]
    SizeMismatch { group: GroupId, found: usize, expected: usize },
    #[error("team {team} of group {group} has size 0")]
    ZeroTeamSize { group: GroupId, team: usize },
    #[error("participant {name} belongs to group {group}, but only {groups} groups are configured")]
    UnknownGroup { name: String, group: GroupId, groups: usize },
    #[error("no participant wants to be allocated in a team of size {size} for group {group}")]
    EmptyEligibility { group: GroupId, size: Size },
    #[error("no valid starting allocation satisfies the preferences of group {group}")]
    InfeasibleMatching { group: GroupId },
    #[error("at least one iteration is required")]
    NoIterations,
    #[error(transparent)]
    Action(#[from] ActionError),
}
