use std::collections::HashMap;
use std::path::Path;

use itertools::Itertools;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use kart_shuffle::config::Dataset;
use kart_shuffle::matching::build;
use kart_shuffle::{optimize, optimize_parallel, AssignError, GroupSizes, Params, Participant, Sweep, Table};

fn dataset() -> Dataset {
    Dataset::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("data/karting.toml")).unwrap()
}

fn assert_valid(table: &Table, sizes: &GroupSizes, participants: &[Participant]) {
    for (g, group) in table.groups.iter().enumerate() {
        assert_eq!(&group.sizes(), sizes.teams(g));
        for team in &group.teams {
            assert!(team.members.iter().all(|m| m.accepts(team.size()) && m.group == g));
        }
        let placed = group.members().map(|p| p.name.as_str()).counts();
        let expected: HashMap<&str, usize> =
            participants.iter().filter(|p| p.group == g).map(|p| p.name.as_str()).counts();
        assert_eq!(placed, expected);
    }
}

#[test]
fn test_shipped_dataset_loads() {
    let dataset = dataset();
    assert_eq!(dataset.participants.len(), 25);
    assert_eq!(dataset.groups, GroupSizes::new(vec![vec![3, 3, 3, 3, 3, 3, 3, 2, 2]]));
    assert_eq!(dataset.iterations, 1000);
}

#[test]
fn test_restarts_improve_on_the_starting_allocation() {
    let dataset = dataset();
    let mut params = dataset.params();
    params.iterations = 20;
    let start = build(&dataset.groups, &dataset.participants).unwrap();
    let table = optimize(&dataset.groups, &dataset.participants, &params, &mut SmallRng::seed_from_u64(5)).unwrap();
    assert_valid(&table, &dataset.groups, &dataset.participants);
    assert!(table.groups[0].cost() <= start.groups[0].cost());
}

#[test]
fn test_preferences_hold_in_parallel_search() {
    let dataset = dataset();
    let mut participants = dataset.participants.clone();
    for p in participants.iter_mut() {
        match p.name.as_str() {
            "BartG" | "StijnC" | "Mauro" => {
                p.unwanted_sizes.insert(3);
            }
            "Inigo" | "Kyle" => {
                p.unwanted_sizes.insert(2);
            }
            _ => {}
        }
    }
    let params = Params { iterations: 12, time_limit: None, sweep: Sweep::UntilStable };
    let table = optimize_parallel(&dataset.groups, &participants, &params, 17).unwrap();
    assert_valid(&table, &dataset.groups, &participants);
}

#[test]
fn test_too_many_pair_refusals_is_infeasible() {
    let dataset = dataset();
    // Four slots in pairs, but only three karters are willing to sit in one.
    let participants: Vec<_> = dataset
        .participants
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, p)| if i < 22 { p.refusing([2]) } else { p })
        .collect();
    let mut rng = SmallRng::seed_from_u64(1);
    assert_eq!(
        optimize(&dataset.groups, &participants, &Params::new(3), &mut rng),
        Err(AssignError::InfeasibleMatching { group: 0 })
    );
}
