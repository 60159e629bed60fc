use std::cmp::Ordering;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{rank, Card, Deck, EquityError, HandState};

/// Result of one simulated showdown from the hero's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Tie,
    Loss,
}

/// Aggregate of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Fraction of trials won, in `[0, 1]`.
    pub win_rate: f64,
    /// Fraction of trials tied, in `[0, 1]`.
    pub tie_rate: f64,
    pub trials: usize,
    pub wins: usize,
    pub ties: usize,
}

impl SimulationResult {
    fn from_counts(tally: Tally) -> Self {
        let n = tally.trials as f64;
        Self {
            win_rate: tally.wins as f64 / n,
            tie_rate: tally.ties as f64 / n,
            trials: tally.trials,
            wins: tally.wins,
            ties: tally.ties,
        }
    }

    #[inline]
    pub fn losses(&self) -> usize {
        self.trials - self.wins - self.ties
    }

    pub fn loss_rate(&self) -> f64 {
        self.losses() as f64 / self.trials as f64
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Tally {
    trials: usize,
    wins: usize,
    ties: usize,
}

impl Tally {
    fn record(&mut self, outcome: Outcome) {
        self.trials += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Tie => self.ties += 1,
            Outcome::Loss => {}
        }
    }

    fn merge(self, other: Tally) -> Tally {
        Tally {
            trials: self.trials + other.trials,
            wins: self.wins + other.wins,
            ties: self.ties + other.ties,
        }
    }
}

/// Estimate win and tie rates for `hole` (+ `community`) against one random
/// opponent over `trials` random completions.
pub fn simulate<R: Rng + ?Sized>(
    hole: &[Card],
    community: &[Card],
    trials: usize,
    rng: &mut R,
) -> Result<SimulationResult, EquityError> {
    let state = HandState::new(hole, community)?;
    simulate_state(&state, trials, rng)
}

/// [`simulate`] for an already validated hand.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(state, rng), fields(known = state.known().len()))
)]
pub fn simulate_state<R: Rng + ?Sized>(
    state: &HandState,
    trials: usize,
    rng: &mut R,
) -> Result<SimulationResult, EquityError> {
    if trials == 0 {
        return Err(EquityError::NoTrials);
    }
    let tally = run_trials(state, trials, rng)?;
    let result = SimulationResult::from_counts(tally);
    debug!(
        "{} trials: win {:.4}, tie {:.4}",
        result.trials, result.win_rate, result.tie_rate
    );
    Ok(result)
}

fn run_trials<R: Rng + ?Sized>(
    state: &HandState,
    trials: usize,
    rng: &mut R,
) -> Result<Tally, EquityError> {
    let mut remaining = Deck::full();
    remaining.remove(&state.known())?;

    let mut tally = Tally::default();
    for _ in 0..trials {
        // Every trial deals from the complete set of unseen cards.
        let mut deck = remaining.clone();
        let draw = deck.shuffle_and_draw(rng, 2, state.board_needed())?;
        tally.record(showdown(state, &draw.opponent, &draw.board));
    }
    Ok(tally)
}

fn showdown(state: &HandState, opponent: &[Card], board: &[Card]) -> Outcome {
    let hole = state.hole();
    let community = state.community();

    let mut hero = [hole[0]; 7];
    let mut villain = [hole[0]; 7];
    for (slot, &card) in hero.iter_mut().zip(hole.iter().chain(community).chain(board)) {
        *slot = card;
    }
    for (slot, &card) in villain
        .iter_mut()
        .zip(opponent.iter().chain(community).chain(board))
    {
        *slot = card;
    }

    match rank(&hero).cmp(&rank(&villain)) {
        Ordering::Greater => Outcome::Win,
        Ordering::Equal => Outcome::Tie,
        Ordering::Less => Outcome::Loss,
    }
}

/// Run [`simulate`] split across `workers` threads.
///
/// Worker `i` draws from its own `SmallRng` seeded from `seed` and `i`, so the
/// result depends only on `(seed, workers, trials)`, never on scheduling.
#[cfg(feature = "rayon")]
pub fn simulate_parallel(
    hole: &[Card],
    community: &[Card],
    trials: usize,
    seed: u64,
    workers: usize,
) -> Result<SimulationResult, EquityError> {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rayon::prelude::*;

    let state = HandState::new(hole, community)?;
    if trials == 0 {
        return Err(EquityError::NoTrials);
    }
    let workers = workers.clamp(1, trials);
    let base = trials / workers;
    let extra = trials % workers;

    let tally = (0..workers)
        .into_par_iter()
        .map(|i| {
            let share = base + usize::from(i < extra);
            let mut rng = SmallRng::seed_from_u64(worker_seed(seed, i));
            run_trials(&state, share, &mut rng)
        })
        .try_reduce(Tally::default, |a, b| Ok(a.merge(b)))?;

    let result = SimulationResult::from_counts(tally);
    debug!(
        "{} trials on {} workers: win {:.4}, tie {:.4}",
        result.trials, workers, result.win_rate, result.tie_rate
    );
    Ok(result)
}

#[cfg(feature = "rayon")]
fn worker_seed(seed: u64, worker: usize) -> u64 {
    seed ^ (worker as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn cards(ids: &[u8]) -> Vec<Card> {
        ids.iter().map(|&id| Card::new(id).unwrap()).collect()
    }

    #[test]
    fn showdown_compares_tiers() {
        let state = HandState::from_ids(&[0, 13]).unwrap();
        // Hero holds a pair; opponent and board share no ranks.
        let board = cards(&[27, 29, 31, 33, 35]);
        assert_eq!(showdown(&state, &cards(&[41, 43]), &board), Outcome::Win);
        // Opponent pairs as well.
        assert_eq!(showdown(&state, &cards(&[40, 14]), &board), Outcome::Tie);

        let weak = HandState::from_ids(&[0, 2]).unwrap();
        assert_eq!(showdown(&weak, &cards(&[41, 15]), &board), Outcome::Loss);
    }

    #[test]
    fn complete_board_with_pairs_always_ties() {
        // The board itself pairs (2 and 15), so every opponent also pairs.
        let hole = cards(&[0, 13]);
        let board = cards(&[2, 15, 27, 29, 31]);
        let mut rng = SmallRng::seed_from_u64(1);
        let r = simulate(&hole, &board, 300, &mut rng).unwrap();
        assert_eq!(r.ties, 300);
        assert_eq!(r.tie_rate, 1.0);
        assert_eq!(r.loss_rate(), 0.0);
    }

    #[test]
    fn zero_trials_is_an_error() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            simulate(&cards(&[0, 12]), &[], 0, &mut rng),
            Err(EquityError::NoTrials)
        );
    }

    #[test]
    fn counts_and_rates_agree() {
        let mut rng = SmallRng::seed_from_u64(42);
        let r = simulate(&cards(&[0, 12]), &cards(&[20]), 1_000, &mut rng).unwrap();
        assert_eq!(r.trials, 1_000);
        assert_eq!(r.wins + r.ties + r.losses(), 1_000);
        assert!((r.win_rate + r.tie_rate + r.loss_rate() - 1.0).abs() < 1e-12);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn parallel_split_covers_every_trial() {
        let r = simulate_parallel(&cards(&[0, 12]), &[], 1_001, 5, 4).unwrap();
        assert_eq!(r.trials, 1_001);
        let again = simulate_parallel(&cards(&[0, 12]), &[], 1_001, 5, 4).unwrap();
        assert_eq!(r, again);

        let more_workers_than_trials = simulate_parallel(&cards(&[0, 12]), &[], 3, 5, 16).unwrap();
        assert_eq!(more_workers_than_trials.trials, 3);
    }
}
