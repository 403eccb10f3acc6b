use crate::Chips;
use thiserror::Error;

/// Errors raised by the blackjack engine. Construction errors reject the object outright,
/// `ShoeExhausted` aborts the round in progress.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlackjackGameError {
    #[error("shoe must contain at least {minimum} decks, got {requested}")]
    TooFewDecks { requested: usize, minimum: usize },
    #[error("maximum number of players must be positive")]
    InvalidCapacity,
    #[error("minimum bet must not be negative, got {0}")]
    NegativeMinimumBet(Chips),
    #[error("maximum bet must not be negative, got {0}")]
    NegativeMaximumBet(Chips),
    #[error("maximum bet {max_bet} must not be less than minimum bet {min_bet}")]
    InvertedBetLimits { min_bet: Chips, max_bet: Chips },
    #[error("bankroll can not be negative, got {0}")]
    NegativeBankroll(Chips),
    #[error("card identifier {0} is not in range")]
    InvalidCardId(usize),
    #[error("table {0} has no room for another player")]
    TableFull(String),
    #[error("shoe exhausted after dealing {dealt} cards, round aborted")]
    ShoeExhausted { dealt: usize },
}
