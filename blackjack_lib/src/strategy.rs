//! Contracts between the table and the pluggable decision makers sitting at it.
//!
//! Strategies are advisory: the table clamps insurance amounts, treats a missing or
//! illegal action as a stand, and never lets a strategy touch engine state directly.

use crate::card::Card;
use crate::hand::{Hand, PlayerHand};
use crate::table::TableRules;
use crate::Chips;
use std::fmt::Display;

/// What a player can do with a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    Hit,
    Stand,
    DoubleDown,
    Split,
}

impl Display for PlayerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PlayerAction::Hit => "hit",
            PlayerAction::Stand => "stand",
            PlayerAction::DoubleDown => "double down",
            PlayerAction::Split => "split",
        };
        write!(f, "{}", s)
    }
}

/// What the dealer can do with its hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealerAction {
    Hit,
    Stand,
}

/// Trait for a player's decision maker. Only `action` and `bet` are required; the hooks
/// default to doing nothing, so a strategy that does not count cards can ignore them.
pub trait PlayerStrategy {
    /// Decides how to play `hand` against the dealer's visible card.
    /// `None` is treated by the table as a stand.
    fn action(&self, hand: &PlayerHand, dealer_card: &Card) -> Option<PlayerAction>;

    /// Bet for the next round given the current bankroll. Zero or less sits the round out.
    /// Bets above the bankroll are not checked by the table.
    fn bet(&self, bankroll: Chips) -> Chips;

    /// Insurance to stake when the dealer shows an ace. The table clamps it to `[0, bet / 2]`.
    fn insurance_bet(&self, _hand: &PlayerHand, _bet: Chips) -> Chips {
        0
    }

    fn shoe_shuffled(&mut self) {}

    /// Called for every card that becomes visible at the table, including the dealer's.
    fn card_dealt(&mut self, _card: &Card) {}

    fn joined_table(&mut self, _table: &TableRules) {}

    fn left_table(&mut self, _table: &TableRules) {}

    /// Short description used in reports.
    fn label(&self) -> String {
        String::from("custom")
    }
}

/// Trait for the house's drawing rule, asked once per candidate hit.
pub trait DealerStrategy {
    /// `None` is treated as a stand.
    fn action(&self, dealer_hand: &Hand) -> Option<DealerAction>;
}
