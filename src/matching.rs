//! Feasible starting allocation.
//!
//! Every unit of team capacity is a slot. A slot and a participant of the same group are connected
//! when the participant accepts the size of the slot's team; a perfect matching of that bipartite
//! graph (Hopcroft-Karp) is an allocation that honors every preference.

use std::collections::VecDeque;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::error::AssignError;
use crate::model::condition::GroupSizes;
use crate::model::entity::{GroupId, Participant, Size};
use crate::model::group::{Group, Table, Team};

const UNREACHED: usize = usize::MAX;

struct Matching<'a> {
    /// Accepting participants per slot, in participant order.
    adjacency: &'a [Vec<usize>],
    slot_match: Vec<Option<usize>>,
    participant_match: Vec<Option<usize>>,
    /// BFS layer per slot.
    distance: Vec<usize>,
}

impl<'a> Matching<'a> {
    fn new(adjacency: &'a [Vec<usize>], n_participants: usize) -> Matching<'a> {
        Matching {
            adjacency,
            slot_match: vec![None; adjacency.len()],
            participant_match: vec![None; n_participants],
            distance: vec![UNREACHED; adjacency.len()],
        }
    }

    /// Layers the slots by alternating-path distance from the free slots. Stops as soon as a free
    /// participant shows up; false means the matching is maximum.
    fn layer(&mut self) -> bool {
        let mut queue = VecDeque::new();
        for (slot, matched) in self.slot_match.iter().enumerate() {
            if matched.is_none() {
                self.distance[slot] = 0;
                queue.push_back(slot);
            } else {
                self.distance[slot] = UNREACHED;
            }
        }

        while let Some(slot) = queue.pop_front() {
            for &participant in &self.adjacency[slot] {
                match self.participant_match[participant] {
                    None => return true,
                    Some(next) if self.distance[next] == UNREACHED => {
                        self.distance[next] = self.distance[slot] + 1;
                        queue.push_back(next);
                    }
                    Some(_) => {}
                }
            }
        }
        false
    }

    /// Looks for an augmenting path from `slot` along edges one layer deeper and flips it.
    /// Recursion depth is bounded by the number of slots.
    fn augment(&mut self, slot: usize) -> bool {
        let adjacency = self.adjacency;
        for &participant in &adjacency[slot] {
            let found = match self.participant_match[participant] {
                None => true,
                Some(next) => self.distance[next] == self.distance[slot] + 1 && self.augment(next),
            };
            if found {
                self.participant_match[participant] = Some(slot);
                self.slot_match[slot] = Some(participant);
                return true;
            }
        }
        self.distance[slot] = UNREACHED;
        false
    }

    fn run(mut self) -> (usize, Vec<Option<usize>>) {
        let mut size = 0;
        let mut phases = 0;
        while self.layer() {
            phases += 1;
            for slot in 0..self.slot_match.len() {
                if self.slot_match[slot].is_none() && self.augment(slot) {
                    size += 1;
                }
            }
        }
        trace!(phases, size, "matching finished");
        (size, self.slot_match)
    }
}

fn build_group(group: GroupId, team_sizes: &[Size], participants: &[Participant]) -> Result<Group, AssignError> {
    let eligible: Vec<&Participant> = participants.iter().filter(|p| p.group == group).collect();

    let mut adjacency = Vec::with_capacity(team_sizes.iter().sum());
    for &size in team_sizes {
        let accepting: Vec<usize> = eligible.iter().positions(|p| p.accepts(size)).collect();
        if accepting.is_empty() {
            return Err(AssignError::EmptyEligibility { group, size });
        }
        adjacency.extend(std::iter::repeat(accepting).take(size));
    }

    let (size, slot_match) = Matching::new(&adjacency, eligible.len()).run();
    if size != adjacency.len() {
        debug!(group, matched = size, slots = adjacency.len(), "preferences cannot be satisfied");
        return Err(AssignError::InfeasibleMatching { group });
    }

    let mut slots = slot_match.into_iter().flatten();
    let teams = team_sizes
        .iter()
        .map(|&size| Team {
            members: slots.by_ref().take(size).map(|k| eligible[k].clone()).collect(),
        })
        .collect();
    Ok(Group { teams })
}

/// Allocates every participant to a team of its group without violating any preference.
///
/// Deterministic for a given participant order; the restart driver shuffles that order to obtain
/// different starting points.
pub fn build(sizes: &GroupSizes, participants: &[Participant]) -> Result<Table, AssignError> {
    sizes.check(participants)?;
    let groups = sizes
        .iter()
        .enumerate()
        .map(|(group, team_sizes)| build_group(group, team_sizes, participants))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Table { groups })
}
