use thiserror::Error;

use crate::model::group::{Group, Team};

pub type Index = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub team_index: Index,
    pub member_index: Index,
}

impl Position {
    pub fn new(team_index: Index, member_index: Index) -> Position {
        Position { team_index, member_index }
    }
}

/// Exchange of two participants between two teams of the same group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap(pub Position, pub Position);

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("Invalid position")]
    InvalidPosition,
    #[error("Swap within a single team")]
    SameTeam,
}

impl Swap {
    /// Neither participant refuses the size of the team it would move into.
    pub fn is_allowed(&self, group: &Group) -> Result<bool, ActionError> {
        let Swap(a, b) = self;
        let (team_a, team_b) = (team(group, a)?, team(group, b)?);
        let (member_a, member_b) = (
            team_a.members.get(a.member_index).ok_or(ActionError::InvalidPosition)?,
            team_b.members.get(b.member_index).ok_or(ActionError::InvalidPosition)?,
        );
        Ok(member_a.accepts(team_b.size()) && member_b.accepts(team_a.size()))
    }
}

fn team<'a>(group: &'a Group, position: &Position) -> Result<&'a Team, ActionError> {
    group.teams.get(position.team_index).ok_or(ActionError::InvalidPosition)
}

impl Group {
    /// Applies `swap`. Applying the same swap twice restores the group.
    pub fn apply(&mut self, swap: &Swap) -> Result<(), ActionError> {
        let Swap(a, b) = *swap;
        if a.team_index == b.team_index {
            return Err(ActionError::SameTeam);
        }
        let (low, high) = if a.team_index < b.team_index { (a, b) } else { (b, a) };
        if high.team_index >= self.teams.len() {
            return Err(ActionError::InvalidPosition);
        }
        let (head, tail) = self.teams.split_at_mut(high.team_index);
        let first = head[low.team_index]
            .members
            .get_mut(low.member_index)
            .ok_or(ActionError::InvalidPosition)?;
        let second = tail[0]
            .members
            .get_mut(high.member_index)
            .ok_or(ActionError::InvalidPosition)?;
        std::mem::swap(first, second);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::Participant;

    fn group() -> Group {
        let p = |name: &str| Participant::new(name, 35.0, 1.0, 0);
        Group {
            teams: vec![
                Team { members: vec![p("a"), p("b").refusing([3])] },
                Team { members: vec![p("c"), p("d"), p("e")] },
            ],
        }
    }

    #[test]
    fn test_apply_twice_restores_group() {
        let mut g = group();
        let original = g.clone();
        let swap = Swap(Position::new(1, 2), Position::new(0, 0));
        g.apply(&swap).unwrap();
        assert_eq!(g.teams[0].members[0].name, "e");
        assert_eq!(g.teams[1].members[2].name, "a");
        g.apply(&swap).unwrap();
        assert_eq!(g, original);
    }

    #[test]
    fn test_apply_rejects_bad_positions() {
        let mut g = group();
        assert_eq!(g.apply(&Swap(Position::new(0, 0), Position::new(2, 0))), Err(ActionError::InvalidPosition));
        assert_eq!(g.apply(&Swap(Position::new(0, 5), Position::new(1, 0))), Err(ActionError::InvalidPosition));
        assert_eq!(g.apply(&Swap(Position::new(1, 0), Position::new(1, 1))), Err(ActionError::SameTeam));
    }

    #[test]
    fn test_is_allowed_checks_both_directions() {
        let g = group();
        assert_eq!(Swap(Position::new(0, 0), Position::new(1, 0)).is_allowed(&g), Ok(true));
        assert_eq!(Swap(Position::new(0, 1), Position::new(1, 0)).is_allowed(&g), Ok(false));
    }
}
