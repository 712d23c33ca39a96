use std::time::{Duration, Instant};

use itertools::{EitherOrBoth, Itertools};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::descent::{balance, Sweep};
use crate::error::AssignError;
use crate::matching::build;
use crate::model::condition::{improves, GroupSizes, Score};
use crate::model::entity::Participant;
use crate::model::group::{Group, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub iterations: usize,
    /// Checked between trials; the first trial always runs.
    pub time_limit: Option<Duration>,
    pub sweep: Sweep,
}

impl Params {
    pub fn new(iterations: usize) -> Params {
        Params { iterations, time_limit: None, sweep: Sweep::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub group: Group,
    pub cost: Score,
    pub trial: usize,
}

impl Scored {
    /// Lower cost wins, ties go to the earlier trial.
    fn beats(&self, other: &Scored) -> bool {
        improves(self.cost, other.cost) || (!improves(other.cost, self.cost) && self.trial < other.trial)
    }
}

/// Best assignment seen so far, kept per group. Groups may come from different trials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Best {
    groups: Vec<Option<Scored>>,
}

impl Best {
    pub fn new(n_groups: usize) -> Best {
        Best { groups: vec![None; n_groups] }
    }

    /// Keeps every group of `table` that beats the retained one. Returns whether anything changed.
    pub fn offer(&mut self, trial: usize, table: Table) -> bool {
        debug_assert_eq!(table.groups.len(), self.groups.len());
        let mut updated = false;
        for (slot, group) in self.groups.iter_mut().zip(table.groups) {
            let candidate = Scored { cost: group.cost(), group, trial };
            if slot.as_ref().map_or(true, |best| candidate.beats(best)) {
                *slot = Some(candidate);
                updated = true;
            }
        }
        updated
    }

    /// Combines two accumulators; the result does not depend on the order trials were offered in.
    pub fn merge(self, other: Best) -> Best {
        let groups = self
            .groups
            .into_iter()
            .zip_longest(other.groups)
            .map(|pair| match pair {
                EitherOrBoth::Both(Some(a), Some(b)) => Some(if b.beats(&a) { b } else { a }),
                EitherOrBoth::Both(a, b) => a.or(b),
                EitherOrBoth::Left(a) | EitherOrBoth::Right(a) => a,
            })
            .collect();
        Best { groups }
    }

    pub fn get(&self, group: usize) -> Option<&Scored> {
        self.groups.get(group)?.as_ref()
    }

    pub fn costs(&self) -> Vec<Option<Score>> {
        self.groups.iter().map(|s| s.as_ref().map(|s| s.cost)).collect()
    }

    pub fn into_table(self) -> Table {
        Table {
            groups: self.groups.into_iter().map(|s| s.map(|s| s.group).unwrap_or_default()).collect(),
        }
    }
}

fn run_trial<R: Rng + ?Sized>(
    sizes: &GroupSizes,
    order: &mut [Participant],
    sweep: Sweep,
    rng: &mut R,
) -> Result<Table, AssignError> {
    order.shuffle(rng);
    let mut table = build(sizes, order)?;
    balance(&mut table, sweep)?;
    Ok(table)
}

fn expired(start: Instant, time_limit: Option<Duration>) -> bool {
    time_limit.is_some_and(|limit| start.elapsed() >= limit)
}

/// Random restarts: shuffle, build, balance, keep the best per group.
pub fn search<R: Rng + ?Sized>(
    sizes: &GroupSizes,
    participants: &[Participant],
    params: &Params,
    rng: &mut R,
) -> Result<Best, AssignError> {
    if params.iterations == 0 {
        return Err(AssignError::NoIterations);
    }
    let start = Instant::now();
    let mut order = participants.to_vec();
    let mut best = Best::new(sizes.len());

    for trial in 0..params.iterations {
        if trial > 0 && expired(start, params.time_limit) {
            info!(trial, "time limit reached");
            break;
        }
        let table = run_trial(sizes, &mut order, params.sweep, rng)?;
        if best.offer(trial, table) {
            info!(iteration = trial + 1, costs = ?best.costs(), "best groups improved");
        } else {
            debug!(iteration = trial + 1, "trial did not improve");
        }
    }
    Ok(best)
}

pub fn optimize<R: Rng + ?Sized>(
    sizes: &GroupSizes,
    participants: &[Participant],
    params: &Params,
    rng: &mut R,
) -> Result<Table, AssignError> {
    search(sizes, participants, params, rng).map(Best::into_table)
}

/// Runs the trials on the rayon pool. Trial `t` shuffles with its own generator seeded from
/// `seed` and `t`, so the outcome does not depend on the number of threads.
pub fn search_parallel(
    sizes: &GroupSizes,
    participants: &[Participant],
    params: &Params,
    seed: u64,
) -> Result<Best, AssignError> {
    if params.iterations == 0 {
        return Err(AssignError::NoIterations);
    }
    sizes.check(participants)?;
    let start = Instant::now();

    let best = (0..params.iterations)
        .into_par_iter()
        .map(|trial| -> Result<Best, AssignError> {
            let mut best = Best::new(sizes.len());
            if trial > 0 && expired(start, params.time_limit) {
                return Ok(best);
            }
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(trial as u64));
            let mut order = participants.to_vec();
            best.offer(trial, run_trial(sizes, &mut order, params.sweep, &mut rng)?);
            Ok(best)
        })
        .try_reduce(|| Best::new(sizes.len()), |a, b| Ok(a.merge(b)))?;

    info!(costs = ?best.costs(), elapsed = ?start.elapsed(), "parallel search finished");
    Ok(best)
}

pub fn optimize_parallel(
    sizes: &GroupSizes,
    participants: &[Participant],
    params: &Params,
    seed: u64,
) -> Result<Table, AssignError> {
    search_parallel(sizes, participants, params, seed).map(Best::into_table)
}
