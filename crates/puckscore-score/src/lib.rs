//! Shuffleboard scoring.
//!
//! [`score`] is a pure function from detected pucks and calibrated court
//! geometry to a [`RoundScore`]. Nothing here errors: pucks that cannot be
//! scored come back as invalid `"out"` / `"line"` entries. Borderline
//! calls carry an alternate value that the operator may accept with
//! [`RoundScore::accept_alternate`]; [`Game`] accumulates rounds toward a
//! points or rounds goal.

mod engine;
mod game;
mod result;

pub use engine::{score, ScoringCourt, ScoringParams};
pub use game::{Game, GameGoal, RoundRecord};
pub use result::{PuckScoreResult, RoundScore, Zone};
