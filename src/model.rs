pub mod entity {
    use std::collections::HashSet;

    use serde::{Deserialize, Serialize};

    pub type Size = usize;
    pub type GroupId = usize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Participant {
        pub name: String,
        /// Average lap time without outliers. Lower is faster.
        pub average_lap: f64,
        /// Share of a fair driving stint, in [0, 1]. 0 means the participant does not drive.
        pub effort: f64,
        pub group: GroupId,
        #[serde(default)]
        pub unwanted_sizes: HashSet<Size>,
    }

    impl Participant {
        pub fn new(name: impl Into<String>, average_lap: f64, effort: f64, group: GroupId) -> Participant {
            Participant {
                name: name.into(),
                average_lap,
                effort,
                group,
                unwanted_sizes: HashSet::new(),
            }
        }

        pub fn refusing(mut self, sizes: impl IntoIterator<Item = Size>) -> Participant {
            self.unwanted_sizes.extend(sizes);
            self
        }

        pub fn accepts(&self, size: Size) -> bool {
            !self.unwanted_sizes.contains(&size)
        }
    }
}


pub mod group {
    use serde::Serialize;

    use super::entity::{Participant, Size};

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Team {
        pub members: Vec<Participant>,
    }

    impl Team {
        pub fn size(&self) -> Size {
            self.members.len()
        }
    }

    #[derive(Debug, Clone, PartialEq, Default, Serialize)]
    pub struct Group {
        pub teams: Vec<Team>,
    }

    impl Group {
        pub fn sizes(&self) -> Vec<Size> {
            self.teams.iter().map(Team::size).collect()
        }

        pub fn members(&self) -> impl Iterator<Item = &Participant> {
            self.teams.iter().flat_map(|team| team.members.iter())
        }
    }

    #[derive(Debug, Clone, PartialEq, Default, Serialize)]
    pub struct Table {
        pub groups: Vec<Group>,
    }
}

pub mod condition {
    use itertools::Itertools;
    use serde::{Deserialize, Serialize};

    use super::entity::{Participant, Size};
    use super::group::{Group, Team};
    use crate::error::AssignError;

    pub type Score = f64;

    /// Team sizes per group, in group-id order.
    #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct GroupSizes(pub Vec<Vec<Size>>);

    impl GroupSizes {
        pub fn new(groups: Vec<Vec<Size>>) -> GroupSizes {
            GroupSizes(groups)
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn teams(&self, group: usize) -> &[Size] {
            &self.0[group]
        }

        pub fn iter(&self) -> impl Iterator<Item = &Vec<Size>> {
            self.0.iter()
        }

        /// Verifies that the configured sizes can be filled by exactly the participants of each group.
        pub fn check(&self, participants: &[Participant]) -> Result<(), AssignError> {
            if let Some(stray) = participants.iter().find(|p| p.group >= self.len()) {
                return Err(AssignError::UnknownGroup {
                    name: stray.name.clone(),
                    group: stray.group,
                    groups: self.len(),
                });
            }
            let counts = participants.iter().map(|p| p.group).counts();
            for (group, sizes) in self.0.iter().enumerate() {
                if let Some(team) = sizes.iter().position(|size| *size == 0) {
                    return Err(AssignError::ZeroTeamSize { group, team });
                }
                let expected: Size = sizes.iter().sum();
                let found = counts.get(&group).copied().unwrap_or(0);
                if found != expected {
                    return Err(AssignError::SizeMismatch { group, found, expected });
                }
            }
            Ok(())
        }
    }

    /// `candidate` is strictly better than `incumbent`. A finite score always beats an undefined one.
    pub fn improves(candidate: Score, incumbent: Score) -> bool {
        candidate < incumbent || (incumbent.is_nan() && !candidate.is_nan())
    }

    /// Effort-weighted harmonic average of the lap times of `members`.
    pub fn average_lap<'a>(members: impl IntoIterator<Item = &'a Participant>) -> Score {
        let (weighted, normalize) = members.into_iter().fold((0.0, 0.0), |(weighted, normalize), p| {
            (weighted + p.effort / p.average_lap, normalize + p.effort)
        });
        normalize / weighted
    }

    /// Population standard deviation of the given team averages.
    pub fn deviation(averages: &[Score]) -> Score {
        if averages.is_empty() {
            return 0.0;
        }
        let n = averages.len() as Score;
        let mean = averages.iter().sum::<Score>() / n;
        let square_sum: Score = averages.iter().map(|avg| (avg - mean) * (avg - mean)).sum();
        (square_sum / n).sqrt()
    }

    impl Team {
        pub fn average_lap(&self) -> Score {
            average_lap(&self.members)
        }
    }

    impl Group {
        pub fn averages(&self) -> Vec<Score> {
            self.teams.iter().map(Team::average_lap).collect()
        }

        pub fn cost(&self) -> Score {
            deviation(&self.averages())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::condition::{deviation, improves, GroupSizes};
    use super::entity::Participant;
    use super::group::{Group, Team};
    use crate::error::AssignError;

    fn team(laps: &[(f64, f64)]) -> Team {
        Team {
            members: laps
                .iter()
                .enumerate()
                .map(|(i, (lap, effort))| Participant::new(format!("p{i}"), *lap, *effort, 0))
                .collect(),
        }
    }

    #[test]
    fn test_average_lap_is_harmonic_for_full_effort() {
        let t = team(&[(30.0, 1.0), (60.0, 1.0)]);
        assert!((t.average_lap() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_effort_member_does_not_drive() {
        let t = team(&[(30.0, 1.0), (90.0, 0.0)]);
        assert!((t.average_lap() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_identical_teams_cost_exactly_zero() {
        let group = Group {
            teams: vec![team(&[(35.0, 1.0), (36.0, 0.5)]), team(&[(36.0, 0.5), (35.0, 1.0)])],
        };
        assert_eq!(group.cost(), 0.0);
    }

    #[test]
    fn test_deviation_divides_by_team_count() {
        assert!((deviation(&[1.0, 3.0]) - 1.0).abs() < 1e-12);
        assert_eq!(deviation(&[]), 0.0);
    }

    #[test]
    fn test_improves_is_strict_and_escapes_nan() {
        assert!(improves(1.0, 2.0));
        assert!(!improves(2.0, 2.0));
        assert!(improves(5.0, f64::NAN));
        assert!(!improves(f64::NAN, 5.0));
        assert!(!improves(f64::NAN, f64::NAN));
    }

    #[test]
    fn test_check_reports_size_mismatch() {
        let sizes = GroupSizes::new(vec![vec![2, 2]]);
        let participants: Vec<_> = (0..3).map(|i| Participant::new(format!("p{i}"), 35.0, 1.0, 0)).collect();
        assert_eq!(
            sizes.check(&participants),
            Err(AssignError::SizeMismatch { group: 0, found: 3, expected: 4 })
        );
    }

    #[test]
    fn test_check_reports_unknown_group_and_zero_size() {
        let stray = vec![Participant::new("lost", 35.0, 1.0, 1)];
        assert!(matches!(
            GroupSizes::new(vec![vec![1]]).check(&stray),
            Err(AssignError::UnknownGroup { group: 1, groups: 1, .. })
        ));
        let empty = GroupSizes::new(vec![vec![0]]);
        assert_eq!(empty.check(&[]), Err(AssignError::ZeroTeamSize { group: 0, team: 0 }));
    }

    #[test]
    fn test_accepts_respects_unwanted_sizes() {
        let p = Participant::new("a", 35.0, 1.0, 0).refusing([2]);
        assert!(!p.accepts(2));
        assert!(p.accepts(3));
    }
}
