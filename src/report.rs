use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::model::condition::Score;
use crate::model::group::{Group, Table, Team};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub names: Vec<String>,
    pub average_lap: Score,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub index: usize,
    pub teams: Vec<TeamSummary>,
    pub standard_deviation: Score,
}

/// What gets printed after a run, as text or JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub groups: Vec<GroupSummary>,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        TeamSummary {
            names: team.members.iter().map(|m| m.name.clone()).collect(),
            average_lap: team.average_lap(),
        }
    }
}

impl GroupSummary {
    fn new(index: usize, group: &Group) -> GroupSummary {
        GroupSummary {
            index,
            teams: group.teams.iter().map(TeamSummary::from).collect(),
            standard_deviation: group.cost(),
        }
    }
}

impl From<&Table> for Summary {
    fn from(table: &Table) -> Self {
        Summary {
            groups: table.groups.iter().enumerate().map(|(i, g)| GroupSummary::new(i, g)).collect(),
        }
    }
}

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        writeln!(f, "  Group #{}", self.index)?;
        writeln!(f, "  --------")?;
        for (i, team) in self.teams.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "  Team #{i}:")?;
            writeln!(f, "    Names: [{}]", team.names.iter().join(", "))?;
            writeln!(f, "    Avg lap time: {:.6} s", team.average_lap)?;
        }
        writeln!(f)?;
        writeln!(f, "  Standard deviation: {:.6}", self.standard_deviation)?;
        write!(f, "]")
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.groups.iter().join(",\n"))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Summary::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::Participant;

    fn table() -> Table {
        let p = |name: &str, lap| Participant::new(name, lap, 1.0, 0);
        Table {
            groups: vec![Group {
                teams: vec![
                    Team { members: vec![p("Kyle", 30.0), p("Sam", 60.0)] },
                    Team { members: vec![p("Emil", 40.0)] },
                ],
            }],
        }
    }

    #[test]
    fn test_text_layout() {
        let text = table().to_string();
        assert!(text.starts_with("[\n  Group #0\n  --------\n"));
        assert!(text.contains("  Team #0:\n    Names: [Kyle, Sam]\n    Avg lap time: 40.000000 s\n"));
        assert!(text.contains("  Team #1:\n    Names: [Emil]\n"));
        assert!(text.ends_with("  Standard deviation: 0.000000\n]"));
    }

    #[test]
    fn test_groups_are_comma_separated() {
        let mut t = table();
        t.groups.push(t.groups[0].clone());
        let text = t.to_string();
        assert!(text.contains("],\n["));
        assert!(text.contains("Group #1"));
    }

    #[test]
    fn test_json_summary() {
        let summary = Summary::from(&table());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["groups"][0]["teams"][0]["names"][1], "Sam");
        assert_eq!(json["groups"][0]["teams"][1]["names"][0], "Emil");
        let average = json["groups"][0]["teams"][1]["average_lap"].as_f64().unwrap();
        assert!((average - 40.0).abs() < 1e-9);
    }
}
