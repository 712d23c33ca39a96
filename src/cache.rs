use crate::action::{ActionError, Position, Swap};
use crate::model::condition::{average_lap, deviation, Score};
use crate::model::entity::Participant;
use crate::model::group::{Group, Team};

/// Team averages of a group, kept in sync with the group across accepted swaps.
///
/// A simulated swap recomputes the two affected teams from scratch in member order, so the
/// resulting cost is bit-for-bit the value a full recomputation of the swapped group would give.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCache {
    pub averages: Vec<Score>,
    pub cost: Score,
}

fn member<'a>(group: &'a Group, position: &Position) -> Result<&'a Participant, ActionError> {
    group
        .teams
        .get(position.team_index)
        .and_then(|team| team.members.get(position.member_index))
        .ok_or(ActionError::InvalidPosition)
}

/// Average of `team` with the member at `index` replaced by `incoming`.
fn average_with(team: &Team, index: usize, incoming: &Participant) -> Score {
    average_lap(
        team.members
            .iter()
            .enumerate()
            .map(|(i, m)| if i == index { incoming } else { m }),
    )
}

impl GroupCache {
    pub fn create(group: &Group) -> GroupCache {
        let averages = group.averages();
        let cost = deviation(&averages);
        GroupCache { averages, cost }
    }

    fn swapped_averages(&self, group: &Group, swap: &Swap) -> Result<Vec<Score>, ActionError> {
        let Swap(a, b) = swap;
        if a.team_index == b.team_index {
            return Err(ActionError::SameTeam);
        }
        let (member_a, member_b) = (member(group, a)?, member(group, b)?);
        let mut averages = self.averages.clone();
        averages[a.team_index] = average_with(&group.teams[a.team_index], a.member_index, member_b);
        averages[b.team_index] = average_with(&group.teams[b.team_index], b.member_index, member_a);
        Ok(averages)
    }

    /// Cost of `group` after `swap`, leaving both the group and the cache untouched.
    pub fn simulate(&self, group: &Group, swap: &Swap) -> Result<Score, ActionError> {
        Ok(deviation(&self.swapped_averages(group, swap)?))
    }

    pub fn act(&mut self, group: &mut Group, swap: &Swap) -> Result<Score, ActionError> {
        let averages = self.swapped_averages(group, swap)?;
        group.apply(swap)?;
        self.cost = deviation(&averages);
        self.averages = averages;
        Ok(self.cost)
    }
}
