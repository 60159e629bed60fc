//! Hand-equity estimation by random sampling.
//!
//! A [`HandState`] (2 hole cards plus 0-5 community cards) is played against
//! a random opponent hand and a random board completion, many times over.
//! Every random draw comes from a caller-supplied [`rand::Rng`], so a fixed
//! seed reproduces a run exactly.
//!
//! ```
//! use pokervision_equity::{simulate, Card};
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! # fn main() -> Result<(), pokervision_equity::EquityError> {
//! let hole = [Card::new(0)?, Card::new(12)?];
//! let mut rng = SmallRng::seed_from_u64(7);
//! let result = simulate(&hole, &[], 2_000, &mut rng)?;
//! assert!(result.win_rate + result.tie_rate <= 1.0);
//! # Ok(())
//! # }
//! ```
//!
//! The hand evaluator is deliberately coarse: see [`Tier`].

mod card;
mod deck;
mod error;
mod eval;
mod hand;
mod simulate;

pub use card::{Card, DECK_SIZE, RANKS, SUITS};
pub use deck::{full_deck, Deck, Draw};
pub use error::EquityError;
pub use eval::{rank, Tier};
pub use hand::{HandState, BOARD_SIZE};
pub use simulate::{simulate, simulate_state, Outcome, SimulationResult};

#[cfg(feature = "rayon")]
pub use simulate::simulate_parallel;
