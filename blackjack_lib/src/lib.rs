//! Core blackjack engine: cards, a multi-deck shoe, ace-aware hands and a table that plays
//! complete rounds between a dealer and pluggable player strategies.
//!
//! ```no_run
//! use blackjack_lib::prelude::*;
//! # fn run(dealer: Box<dyn DealerStrategy>, strategy: Box<dyn PlayerStrategy>) -> Result<(), BlackjackGameError> {
//! let mut table = Table::builder().min_bet(10).max_bet(500).build(dealer)?;
//! let id = table.add_player(Player::with_bankroll("Ann", strategy, 1000)?)?;
//! table.play_rounds(1000)?;
//! println!("{}", table.player(id).map(|p| p.bankroll()).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod card;
pub mod error;
pub mod hand;
pub mod observer;
pub mod player;
pub mod shoe;
pub mod strategy;
pub mod table;

/// Amounts of money: bets, payouts and bankrolls.
pub type Chips = i64;

pub use card::{Card, Rank, Suit};
pub use error::BlackjackGameError;
pub use hand::{Hand, PlayerHand, BLACKJACK};
pub use observer::{ObserverList, PlayerEvent, PlayerObserver, TableEvent, TableObserver};
pub use player::{Player, PlayerId};
pub use shoe::Shoe;
pub use strategy::{DealerAction, DealerStrategy, PlayerAction, PlayerStrategy};
pub use table::{Table, TableBuilder, TableRules};

pub mod prelude {
    pub use super::{
        BlackjackGameError, Card, Chips, DealerAction, DealerStrategy, Hand, Player, PlayerAction,
        PlayerEvent, PlayerHand, PlayerId, PlayerObserver, PlayerStrategy, Rank, Suit, Table,
        TableBuilder, TableEvent, TableObserver, TableRules,
    };
}
