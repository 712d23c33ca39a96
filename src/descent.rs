use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::action::{ActionError, Position, Swap};
use crate::cache::GroupCache;
use crate::model::condition::{improves, Score};
use crate::model::group::{Group, Table};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescentStats {
    pub attempts: usize,
    pub accepted: usize,
}

/// How often the position scan is repeated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sweep {
    /// A single scan over all positions. Earlier positions are not revisited once a later one changed.
    #[default]
    Once,
    /// Rescan until a whole scan accepts no swap; the result admits no improving pairwise swap.
    UntilStable,
}

struct State<'a> {
    group: &'a mut Group,
    cache: GroupCache,
    stats: DescentStats,
}

impl State<'_> {
    /// Accepts the first swap of `position` with a member of a later team that lowers the cost.
    fn improve(&mut self, position: Position) -> Result<bool, ActionError> {
        let current = &self.group.teams[position.team_index];
        let current_size = current.size();
        let member = &current.members[position.member_index];

        for team_index in position.team_index + 1..self.group.teams.len() {
            let other = &self.group.teams[team_index];
            if !member.accepts(other.size()) {
                continue;
            }
            for (member_index, candidate) in other.members.iter().enumerate() {
                if !candidate.accepts(current_size) {
                    continue;
                }
                let swap = Swap(position, Position { team_index, member_index });
                self.stats.attempts += 1;
                if improves(self.cache.simulate(self.group, &swap)?, self.cache.cost) {
                    let cost = self.cache.act(self.group, &swap)?;
                    self.stats.accepted += 1;
                    trace!(?swap, cost, "accepted swap");
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// First-improvement pairwise swap descent on a single group.
///
/// Positions are visited in team order, then member order. Each position is improved until no
/// swap with a later team lowers the cost before moving on to the next one.
pub fn optimize_group(group: &mut Group, sweep: Sweep) -> Result<(Score, DescentStats), ActionError> {
    let cache = GroupCache::create(group);
    let mut state = State { group, cache, stats: DescentStats::default() };

    loop {
        let accepted = state.stats.accepted;
        for team_index in 0..state.group.teams.len() {
            for member_index in 0..state.group.teams[team_index].size() {
                while state.improve(Position { team_index, member_index })? {}
            }
        }
        if sweep == Sweep::Once || state.stats.accepted == accepted {
            break;
        }
    }
    trace!(cost = state.cache.cost, stats = ?state.stats, "descent finished");
    Ok((state.cache.cost, state.stats))
}

/// Optimizes every group of `table` independently and returns their final costs.
pub fn balance(table: &mut Table, sweep: Sweep) -> Result<Vec<Score>, ActionError> {
    table
        .groups
        .iter_mut()
        .map(|group| optimize_group(group, sweep).map(|(cost, _)| cost))
        .collect()
}
