//! Module with the concrete players and dealers the simulator seats at a table.
//! Strategies are composed from a counting strategy, a decision strategy and a betting strategy.

pub mod dealer;
pub mod strategy;

pub mod prelude {
    pub use super::dealer::HouseDealer;
    pub use super::strategy::prelude::*;
    pub use super::StrategyKind;
}

use blackjack_lib::PlayerStrategy;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use strategy::{
    BasicStrategy, CountDeviations, CountingPlayer, CountingStrategy, FlatBetting, HiLo,
    MarginBettingStrategy, MimicDealer, NoCount, TrueCountRamp, WongHalves,
};

/// True count at which counting players take insurance.
pub const INSURANCE_TRUE_COUNT: f32 = 3.0;

/// Margin used by the Wong Halves player's bet spread.
pub const WONG_HALVES_MARGIN: f32 = 2.0;

/// The player strategies selectable from the command line or a config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Flat minimum bets, plays like the dealer.
    #[default]
    Default,
    /// Flat minimum bets, plays basic strategy.
    Basic,
    /// Hi-Lo count with a true count bet ramp and insurance at a high count.
    TrueCount,
    /// Wong Halves count with margin betting and insurance at a high count.
    WongHalves,
    /// Hi-Lo count that also drives the playing decisions: basic strategy with count deviations.
    ModifiedBasic,
}

impl StrategyKind {
    /// Builds a fresh strategy of this kind for a shoe of `num_decks` decks.
    pub fn player_strategy(&self, num_decks: usize) -> Box<dyn PlayerStrategy> {
        match self {
            StrategyKind::Default => Box::new(CountingPlayer::new(NoCount, MimicDealer, FlatBetting)),
            StrategyKind::Basic => Box::new(CountingPlayer::new(
                NoCount,
                BasicStrategy::new(),
                FlatBetting,
            )),
            StrategyKind::TrueCount => Box::new(
                CountingPlayer::new(HiLo::new(num_decks), BasicStrategy::new(), TrueCountRamp)
                    .with_insurance_threshold(INSURANCE_TRUE_COUNT),
            ),
            StrategyKind::WongHalves => Box::new(
                CountingPlayer::new(
                    WongHalves::new(num_decks),
                    BasicStrategy::new(),
                    MarginBettingStrategy::new(WONG_HALVES_MARGIN),
                )
                .with_insurance_threshold(INSURANCE_TRUE_COUNT),
            ),
            StrategyKind::ModifiedBasic => Box::new(
                CountingPlayer::new(HiLo::new(num_decks), CountDeviations::new(), TrueCountRamp)
                    .with_insurance_threshold(INSURANCE_TRUE_COUNT),
            ),
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StrategyKind::Default => "default",
            StrategyKind::Basic => "basic",
            StrategyKind::TrueCount => "true-count",
            StrategyKind::WongHalves => "wong-halves",
            StrategyKind::ModifiedBasic => "modified-basic",
        };
        write!(f, "{}", s)
    }
}
