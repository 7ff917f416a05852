//! Knockout cup engine: draws, match decisions and round progression.

pub mod bracket;
pub mod decide;
pub mod draw;
pub mod seeding;
pub mod stage;

pub use bracket::{CupBracket, CupPhase};
pub use decide::{advance_round, decide_match, is_round_decided, is_round_played};
pub use draw::{create_round, create_round_from_pairings, CupRoundDraft, Pots};
pub use seeding::{PotRule, SeedingPlan};
pub use stage::{RoundNames, RoundStage};
