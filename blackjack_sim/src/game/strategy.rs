use blackjack_lib::{Card, Chips, PlayerAction, PlayerHand, PlayerStrategy, TableRules};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::Display;

pub mod prelude {
    pub use super::{
        BasicStrategy, BettingStrategy, CountDeviations, CountingPlayer, CountingStrategy,
        DecisionStrategy, FlatBetting, HiLo, MarginBettingStrategy, MimicDealer, NoCount, TableState,
        TrueCountRamp, WongHalves,
    };
}

const CARDS_PER_DECK: f32 = 52.0;

/// Struct for encapsulating all the necessary information for a `DecisionStrategy` to make a decision.
/// Meant as a convenience for reducing the number of arguments passed around between the components of a `CountingPlayer`.
#[derive(Debug, Clone, Copy)]
pub struct TableState<'a> {
    pub hand: &'a PlayerHand,
    pub dealers_up_card: &'a Card,
    pub running_count: f32,
    pub true_count: f32,
}

/// Trait for a generic decision strategy. Has only one required method `decide`,
/// the method that takes in the current state of the table i.e. the dealer's face up card and the player's hand and returns a decision.
pub trait DecisionStrategy {
    /// Returns the action to take with `state.hand`, `None` leaves the choice to the table (a stand).
    fn decide(&self, state: TableState<'_>) -> Option<PlayerAction>;

    fn label(&self) -> &'static str;
}

/// Trait for a generic betting strategy. Allows greater composability for any playing strategy.
pub trait BettingStrategy {
    fn bet(&self, min_bet: Chips, running_count: f32, true_count: f32, bankroll: Chips) -> Chips;

    fn label(&self) -> &'static str;
}

/// Trait for a specific counting strategy. Can be implemented by any object that keeps a count of the cards seen since the last shuffle.
pub trait CountingStrategy {
    fn new(num_decks: usize) -> Self;
    fn update(&mut self, card: &Card);
    fn get_current_table_state<'a>(
        &self,
        hand: &'a PlayerHand,
        dealers_up_card: &'a Card,
    ) -> TableState<'a>;
    fn reset(&mut self);
    fn running_count(&self) -> f32;
    fn true_count(&self) -> f32;
    fn label(&self) -> &'static str;
}

/// Running count normalised by the decks left in a shoe of `num_decks` after `cards_counted` cards.
fn true_count(running_count: f32, num_decks: usize, cards_counted: usize) -> f32 {
    let remaining = (num_decks * CARDS_PER_DECK as usize).saturating_sub(cards_counted);
    running_count * CARDS_PER_DECK / (remaining.max(1) as f32)
}

/// Flat bet of the table minimum, whatever the count.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatBetting;

impl BettingStrategy for FlatBetting {
    fn bet(&self, min_bet: Chips, _running_count: f32, _true_count: f32, _bankroll: Chips) -> Chips {
        min_bet
    }

    fn label(&self) -> &'static str {
        "flat"
    }
}

/// Bet ramp keyed on the true count: 1, 2, 3, 5 then 10 units of the table minimum.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueCountRamp;

impl BettingStrategy for TrueCountRamp {
    fn bet(&self, min_bet: Chips, _running_count: f32, true_count: f32, _bankroll: Chips) -> Chips {
        let units = if true_count <= 1.0 {
            1
        } else if true_count <= 2.0 {
            2
        } else if true_count <= 3.0 {
            3
        } else if true_count <= 4.0 {
            5
        } else {
            10
        };
        min_bet * units
    }

    fn label(&self) -> &'static str {
        "true count ramp"
    }
}

/// Struct that encapsulates the logic needed for a simple margin based betting strategy, i.e. for each positive value that the true count takes it will compute the bet as
/// `min_bet` * `self.margin` * true_count, never more than the bankroll.
#[derive(Debug, Clone, Copy)]
pub struct MarginBettingStrategy {
    margin: f32,
}

impl MarginBettingStrategy {
    pub fn new(margin: f32) -> MarginBettingStrategy {
        MarginBettingStrategy { margin }
    }
}

impl BettingStrategy for MarginBettingStrategy {
    fn bet(&self, min_bet: Chips, _running_count: f32, true_count: f32, bankroll: Chips) -> Chips {
        if true_count > 0.0 {
            let scalar = f32::ceil(true_count);
            Chips::min(
                bankroll,
                ((min_bet as f32) * scalar * self.margin) as Chips,
            )
        } else {
            Chips::min(bankroll, min_bet)
        }
    }

    fn label(&self) -> &'static str {
        "margin"
    }
}

/// Plays exactly like the house: hits until 17 and hits a soft 17.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimicDealer;

impl DecisionStrategy for MimicDealer {
    fn decide(&self, state: TableState<'_>) -> Option<PlayerAction> {
        match state.hand.high_valid_value() {
            Some(value) if value < 17 || (value == 17 && state.hand.is_soft()) => {
                Some(PlayerAction::Hit)
            }
            _ => Some(PlayerAction::Stand),
        }
    }

    fn label(&self) -> &'static str {
        "mimic dealer"
    }
}

/// Entry of a basic strategy chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Play {
    Hit,
    Stand,
    Split,
    DoubleOrHit,
    DoubleOrStand,
}

impl Play {
    /// Doubling needs exactly two cards.
    fn action(self, hand: &PlayerHand) -> PlayerAction {
        let can_double = hand.len() == 2;
        match self {
            Play::Hit => PlayerAction::Hit,
            Play::Stand => PlayerAction::Stand,
            Play::Split => PlayerAction::Split,
            Play::DoubleOrHit if can_double => PlayerAction::DoubleDown,
            Play::DoubleOrHit => PlayerAction::Hit,
            Play::DoubleOrStand if can_double => PlayerAction::DoubleDown,
            Play::DoubleOrStand => PlayerAction::Stand,
        }
    }
}

/// Charts keyed by (player total or pair card value, dealer up card value with aces as 1).
struct LookupTables {
    hard_totals: HashMap<(u32, u32), Play>,
    soft_totals: HashMap<(u32, u32), Play>,
    pair_totals: HashMap<(u32, u32), Play>,
}

lazy_static! {
    static ref LOOKUP_TABLES: LookupTables = BasicStrategy::build_lookup_tables();
}

/// A struct that implements the `DecisionStrategy` trait. Decides playing option according to strict basic strategy only.
/// The decision strategy only requires knowing the dealer's face up card and the player's current cards.
pub struct BasicStrategy {
    tables: &'static LookupTables,
}

impl BasicStrategy {
    /// Associated method for populating the lookup tables used in basic strategy, intended to be a helper method.
    fn build_lookup_tables() -> LookupTables {
        let mut hard_totals = HashMap::new();
        for i in 2..=21 {
            for j in 1..=10 {
                let play = match i {
                    9 => match j {
                        3..=6 => Play::DoubleOrHit,
                        _ => Play::Hit,
                    },
                    10 => match j {
                        2..=9 => Play::DoubleOrHit,
                        _ => Play::Hit,
                    },
                    11 => Play::DoubleOrHit,
                    12 => match j {
                        4..=6 => Play::Stand,
                        _ => Play::Hit,
                    },
                    13..=16 => match j {
                        2..=6 => Play::Stand,
                        _ => Play::Hit,
                    },
                    17..=21 => Play::Stand,
                    _ => Play::Hit,
                };
                hard_totals.insert((i, j), play);
            }
        }

        // Soft totals are keyed by the total counting the ace as 11
        let mut soft_totals = HashMap::new();
        for i in 11..=21 {
            for j in 1..=10 {
                let play = match i {
                    13 | 14 => match j {
                        5 | 6 => Play::DoubleOrHit,
                        _ => Play::Hit,
                    },
                    15 | 16 => match j {
                        4..=6 => Play::DoubleOrHit,
                        _ => Play::Hit,
                    },
                    17 => match j {
                        3..=6 => Play::DoubleOrHit,
                        _ => Play::Hit,
                    },
                    18 => match j {
                        2..=6 => Play::DoubleOrStand,
                        7 | 8 => Play::Stand,
                        _ => Play::Hit,
                    },
                    19 => match j {
                        6 => Play::DoubleOrStand,
                        _ => Play::Stand,
                    },
                    20 | 21 => Play::Stand,
                    _ => Play::Hit,
                };
                soft_totals.insert((i, j), play);
            }
        }

        // Pairs are keyed by the value of one card of the pair
        let mut pair_totals = HashMap::new();
        for i in 1..=10 {
            for j in 1..=10 {
                let play = match i {
                    1 | 8 => Play::Split,
                    2 | 3 => match j {
                        2..=7 => Play::Split,
                        _ => Play::Hit,
                    },
                    4 => match j {
                        5 | 6 => Play::Split,
                        _ => Play::Hit,
                    },
                    5 => match j {
                        2..=9 => Play::DoubleOrHit,
                        _ => Play::Hit,
                    },
                    6 => match j {
                        2..=6 => Play::Split,
                        _ => Play::Hit,
                    },
                    7 => match j {
                        2..=7 => Play::Split,
                        _ => Play::Hit,
                    },
                    9 => match j {
                        1 | 7 | 10 => Play::Stand,
                        _ => Play::Split,
                    },
                    _ => Play::Stand,
                };
                pair_totals.insert((i, j), play);
            }
        }

        LookupTables {
            hard_totals,
            soft_totals,
            pair_totals,
        }
    }

    pub fn new() -> BasicStrategy {
        BasicStrategy {
            tables: &LOOKUP_TABLES,
        }
    }

    fn lookup(&self, hand: &PlayerHand, dealers_card: u32) -> Option<Play> {
        let total = hand.high_valid_value()?;
        if hand.is_pair() {
            self.tables
                .pair_totals
                .get(&(hand.cards()[0].value(), dealers_card))
                .copied()
        } else if hand.is_soft() {
            self.tables.soft_totals.get(&(total, dealers_card)).copied()
        } else {
            self.tables.hard_totals.get(&(total, dealers_card)).copied()
        }
    }
}

impl Default for BasicStrategy {
    fn default() -> Self {
        BasicStrategy::new()
    }
}

impl DecisionStrategy for BasicStrategy {
    fn decide(&self, state: TableState<'_>) -> Option<PlayerAction> {
        let play = self.lookup(state.hand, state.dealers_up_card.value())?;
        Some(play.action(state.hand))
    }

    fn label(&self) -> &'static str {
        "basic strategy"
    }
}

/// `yes` once the true count reaches `index`, `no` below it.
fn at(true_count: f32, index: f32, yes: Play, no: Play) -> Play {
    if true_count >= index {
        yes
    } else {
        no
    }
}

/// Basic strategy adjusted by the true count: each cell of the chart below switches play once
/// the true count reaches its index. Hands the chart does not cover are played by `BasicStrategy`.
pub struct CountDeviations {
    basic: BasicStrategy,
}

impl CountDeviations {
    pub fn new() -> CountDeviations {
        CountDeviations {
            basic: BasicStrategy::new(),
        }
    }

    fn pair(value: u32, dealer: u32, tc: f32) -> Play {
        use Play::*;
        match (value, dealer) {
            (1, _) | (8, _) => Split,
            (10, 5) => at(tc, 5.0, Split, Stand),
            (10, 6) => at(tc, 4.0, Split, Stand),
            (10, _) => Stand,
            (9, 1) => at(tc, 3.0, Split, Stand),
            (9, 2) => at(tc, -2.0, Split, Stand),
            (9, 3) => at(tc, -3.0, Split, Stand),
            (9, 4) | (9, 5) => at(tc, -5.0, Split, Stand),
            (9, 7) => at(tc, 3.0, Split, Stand),
            (9, 10) => Stand,
            (9, _) => Split,
            (7, 2..=7) => Split,
            (6, 2) => at(tc, -1.0, Split, Hit),
            (6, 3) => at(tc, -3.0, Split, Hit),
            (6, 4) => at(tc, -4.0, Split, Hit),
            (6, 5) | (6, 6) => Split,
            (5, 1) | (5, 10) => Hit,
            (5, _) => DoubleOrHit,
            (4, 4) => at(tc, 3.0, Split, Hit),
            (4, 5) => at(tc, -1.0, Split, Hit),
            (4, 6) => at(tc, -2.0, Split, Hit),
            (3, 2) => at(tc, -2.0, Split, Hit),
            (3, 3) => at(tc, -5.0, Split, Hit),
            (2, 2) => at(tc, -4.0, Split, Hit),
            (2, 3) => at(tc, -5.0, Split, Hit),
            (3, 4..=7) | (2, 4..=7) => Split,
            _ => Hit,
        }
    }

    /// Two card soft hands, keyed by the card next to the ace.
    fn soft_two_cards(other: u32, dealer: u32, tc: f32) -> Option<Play> {
        use Play::*;
        let play = match (other, dealer) {
            (9, 5) | (9, 6) => at(tc, 5.0, DoubleOrStand, Stand),
            (8, 3) => at(tc, 5.0, DoubleOrStand, Stand),
            (8, 4) => at(tc, 3.0, DoubleOrStand, Stand),
            (8, 5) | (8, 6) => at(tc, 1.0, DoubleOrStand, Stand),
            (8, _) => Stand,
            (7, 1) => at(tc, 1.0, Stand, Hit),
            (7, 2) => at(tc, 1.0, DoubleOrStand, Stand),
            (7, 3) => at(tc, -1.0, DoubleOrStand, Stand),
            (7, 4) => at(tc, -5.0, DoubleOrStand, Stand),
            (7, 5) | (7, 6) => DoubleOrStand,
            (7, 7) | (7, 8) => Stand,
            (7, _) => Hit,
            (6, 2) => at(tc, 1.0, DoubleOrStand, Stand),
            (6, 3) => at(tc, -2.0, DoubleOrStand, Stand),
            (6, 4) => at(tc, -5.0, DoubleOrStand, Stand),
            (6, 5) | (6, 6) => DoubleOrHit,
            (6, _) => Hit,
            (5, 3) => at(tc, 3.0, DoubleOrHit, Hit),
            (5, 4) => at(tc, -2.0, DoubleOrHit, Hit),
            (5, 5) => at(tc, -5.0, DoubleOrHit, Hit),
            (4, 3) => at(tc, 5.0, DoubleOrHit, Hit),
            (4, 4) => at(tc, -1.0, DoubleOrHit, Hit),
            (4, 5) => at(tc, -4.0, DoubleOrHit, Hit),
            (5, 6) | (4, 6) => DoubleOrHit,
            (3, 4) => at(tc, 1.0, DoubleOrHit, Hit),
            (3, 5) => at(tc, -2.0, DoubleOrHit, Hit),
            (3, 6) => at(tc, -4.0, DoubleOrHit, Hit),
            (2, 4) => at(tc, 2.0, DoubleOrHit, Hit),
            (2, 5) => at(tc, -1.0, DoubleOrHit, Hit),
            (2, 6) => at(tc, -2.0, DoubleOrHit, Hit),
            (2..=6, _) => Hit,
            _ => return None,
        };
        Some(play)
    }

    fn total(total: u32, soft: bool, dealer: u32, tc: f32) -> Option<Play> {
        use Play::*;
        let play = match (total, dealer) {
            (18, 1) if soft => at(tc, 1.0, Stand, Hit),
            (18, 2..=8) if soft => Stand,
            (18, _) if soft => Hit,
            (17, _) if soft => Hit,
            (_, _) if soft && total < 17 => return None,
            (17..=21, 1) => at(tc, -5.0, Stand, Hit),
            (17..=21, _) => Stand,
            (16, 2..=6) => Stand,
            (16, 9) => at(tc, 4.0, Stand, Hit),
            (16, 10) => at(tc, 0.0, Stand, Hit),
            (16, 1) => at(tc, 3.0, Stand, Hit),
            (15, 2..=6) => Stand,
            (15, 10) => at(tc, 3.0, Stand, Hit),
            (15, 1) => at(tc, 5.0, Stand, Hit),
            (14, 2) => at(tc, -3.0, Stand, Hit),
            (14, 3) => at(tc, -4.0, Stand, Hit),
            (14, 4) => at(tc, -5.0, Stand, Hit),
            (14, 5) | (14, 6) => Stand,
            (13, 2) => at(tc, -1.0, Stand, Hit),
            (13, 3) => at(tc, -2.0, Stand, Hit),
            (13, 4) => at(tc, -4.0, Stand, Hit),
            (13, 5) | (13, 6) => at(tc, -5.0, Stand, Hit),
            (12, 2) => at(tc, 2.0, Stand, Hit),
            (12, 3) => at(tc, 1.0, Stand, Hit),
            (12, 4) => at(tc, 0.0, Stand, Hit),
            (12, 5) => at(tc, -1.0, Stand, Hit),
            (12, 6) => at(tc, -2.0, Stand, Hit),
            (11, 2..=8) => DoubleOrHit,
            (11, 9) => at(tc, -4.0, DoubleOrHit, Hit),
            (11, 10) => at(tc, -3.0, DoubleOrHit, Hit),
            (11, 1) => at(tc, 1.0, DoubleOrHit, Hit),
            (10, 2..=7) => DoubleOrHit,
            (10, 8) => at(tc, -4.0, DoubleOrHit, Hit),
            (10, 9) => at(tc, -1.0, DoubleOrHit, Hit),
            (10, _) => at(tc, 4.0, DoubleOrHit, Hit),
            (9, 2) => at(tc, 1.0, DoubleOrHit, Hit),
            (9, 3) => at(tc, -1.0, DoubleOrHit, Hit),
            (9, 4) => at(tc, -2.0, DoubleOrHit, Hit),
            (9, 5) => at(tc, -4.0, DoubleOrHit, Hit),
            (9, 6) => at(tc, -5.0, DoubleOrHit, Hit),
            (9, 7) => at(tc, 3.0, DoubleOrHit, Hit),
            (8, 4) => at(tc, 5.0, DoubleOrHit, Hit),
            (8, 5) => at(tc, 3.0, DoubleOrHit, Hit),
            (8, 6) => at(tc, 2.0, DoubleOrHit, Hit),
            _ => Hit,
        };
        Some(play)
    }

    fn lookup(hand: &PlayerHand, dealer: u32, tc: f32) -> Option<Play> {
        let total = hand.high_valid_value()?;
        let cards = hand.cards();
        if hand.is_pair() {
            return Some(CountDeviations::pair(cards[0].value(), dealer, tc));
        }
        if cards.len() == 2 && hand.is_soft() {
            let other = if cards[0].is_ace() { cards[1] } else { cards[0] };
            if let Some(play) = CountDeviations::soft_two_cards(other.value(), dealer, tc) {
                return Some(play);
            }
        }
        CountDeviations::total(total, hand.is_soft(), dealer, tc)
    }
}

impl Default for CountDeviations {
    fn default() -> Self {
        CountDeviations::new()
    }
}

impl DecisionStrategy for CountDeviations {
    fn decide(&self, state: TableState<'_>) -> Option<PlayerAction> {
        match CountDeviations::lookup(state.hand, state.dealers_up_card.value(), state.true_count) {
            Some(play) => Some(play.action(state.hand)),
            None => self.basic.decide(state),
        }
    }

    fn label(&self) -> &'static str {
        "count deviations"
    }
}

/// Count that ignores every card, for strategies that do not count.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCount;

impl CountingStrategy for NoCount {
    fn new(_num_decks: usize) -> Self {
        NoCount
    }

    fn update(&mut self, _card: &Card) {}

    fn get_current_table_state<'a>(
        &self,
        hand: &'a PlayerHand,
        dealers_up_card: &'a Card,
    ) -> TableState<'a> {
        TableState {
            hand,
            dealers_up_card,
            running_count: 0.0,
            true_count: 0.0,
        }
    }

    fn reset(&mut self) {}

    fn running_count(&self) -> f32 {
        0.0
    }

    fn true_count(&self) -> f32 {
        0.0
    }

    fn label(&self) -> &'static str {
        "no count"
    }
}

/// The Hi-Lo count: low cards +1, tens and aces -1.
#[derive(Debug, Clone)]
pub struct HiLo {
    running_count: i32,
    num_decks: usize,
    total_cards_counted: usize,
    lookup_table: HashMap<u32, i32>,
}

impl CountingStrategy for HiLo {
    fn new(num_decks: usize) -> Self {
        let mut lookup_table = HashMap::new();
        for i in 2..7 {
            lookup_table.insert(i, 1);
        }
        for i in 7..10 {
            lookup_table.insert(i, 0);
        }
        lookup_table.insert(1, -1);
        lookup_table.insert(10, -1);

        HiLo {
            running_count: 0,
            num_decks,
            total_cards_counted: 0,
            lookup_table,
        }
    }

    fn update(&mut self, card: &Card) {
        self.running_count += self.lookup_table.get(&card.value()).copied().unwrap_or(0);
        self.total_cards_counted += 1;
    }

    fn get_current_table_state<'a>(
        &self,
        hand: &'a PlayerHand,
        dealers_up_card: &'a Card,
    ) -> TableState<'a> {
        TableState {
            hand,
            dealers_up_card,
            running_count: self.running_count(),
            true_count: self.true_count(),
        }
    }

    fn reset(&mut self) {
        self.running_count = 0;
        self.total_cards_counted = 0;
    }

    fn running_count(&self) -> f32 {
        self.running_count as f32
    }

    fn true_count(&self) -> f32 {
        true_count(
            self.running_count as f32,
            self.num_decks,
            self.total_cards_counted,
        )
    }

    fn label(&self) -> &'static str {
        "hi-lo"
    }
}

impl Display for HiLo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = "total cards counted:".len();
        write!(
            f,
            "{:<width$}{:>8}\n{:<width$}{:>8}\n{:<width$}{:>8.2}",
            "running count:",
            self.running_count,
            "total cards counted:",
            self.total_cards_counted,
            "true count:",
            self.true_count(),
        )
    }
}

/// A struct that implements the Wong Halves card counting strategy.
#[derive(Debug, Clone)]
pub struct WongHalves {
    running_count: f32,
    num_decks: usize,
    total_cards_counted: usize,
    lookup_table: HashMap<u32, f32>,
}

impl CountingStrategy for WongHalves {
    fn new(num_decks: usize) -> Self {
        let mut lookup_table = HashMap::new();
        lookup_table.insert(1, -1.0);
        lookup_table.insert(10, -1.0);
        lookup_table.insert(2, 0.5);
        lookup_table.insert(7, 0.5);
        lookup_table.insert(3, 1.0);
        lookup_table.insert(4, 1.0);
        lookup_table.insert(6, 1.0);
        lookup_table.insert(5, 1.5);
        lookup_table.insert(8, 0.0);
        lookup_table.insert(9, -0.5);

        WongHalves {
            running_count: 0.0,
            num_decks,
            total_cards_counted: 0,
            lookup_table,
        }
    }

    fn update(&mut self, card: &Card) {
        self.running_count += self.lookup_table.get(&card.value()).copied().unwrap_or(0.0);
        self.total_cards_counted += 1;
    }

    fn get_current_table_state<'a>(
        &self,
        hand: &'a PlayerHand,
        dealers_up_card: &'a Card,
    ) -> TableState<'a> {
        TableState {
            hand,
            dealers_up_card,
            running_count: self.running_count,
            true_count: self.true_count(),
        }
    }

    fn reset(&mut self) {
        self.running_count = 0.0;
        self.total_cards_counted = 0;
    }

    fn running_count(&self) -> f32 {
        self.running_count
    }

    fn true_count(&self) -> f32 {
        true_count(self.running_count, self.num_decks, self.total_cards_counted)
    }

    fn label(&self) -> &'static str {
        "wong halves"
    }
}

/// A struct that encapsulates everything needed to implement a specific playing strategy to test in a simulation.
/// Composes a count, a decision strategy and a betting strategy into something that can sit at a table.
pub struct CountingPlayer<C, D, B>
where
    C: CountingStrategy,
    D: DecisionStrategy,
    B: BettingStrategy,
{
    counting_strategy: C,
    decision_strategy: D,
    betting_strategy: B,
    insurance_threshold: Option<f32>,
    min_bet: Chips,
    table: Option<String>,
}

impl<C, D, B> CountingPlayer<C, D, B>
where
    C: CountingStrategy,
    D: DecisionStrategy,
    B: BettingStrategy,
{
    pub fn new(counting_strategy: C, decision_strategy: D, betting_strategy: B) -> Self {
        CountingPlayer {
            counting_strategy,
            decision_strategy,
            betting_strategy,
            insurance_threshold: None,
            min_bet: 0,
            table: None,
        }
    }

    /// Takes insurance for half the bet whenever the true count is at least `threshold`.
    pub fn with_insurance_threshold(mut self, threshold: f32) -> Self {
        self.insurance_threshold = Some(threshold);
        self
    }

    pub fn counting_strategy(&self) -> &C {
        &self.counting_strategy
    }

    /// Minimum bet of the table this player sits at, 0 when not seated.
    pub fn min_bet(&self) -> Chips {
        self.min_bet
    }
}

impl<C, D, B> Display for CountingPlayer<C, D, B>
where
    C: CountingStrategy,
    D: DecisionStrategy,
    B: BettingStrategy,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.counting_strategy.label(),
            self.decision_strategy.label(),
            self.betting_strategy.label()
        )
    }
}

impl<C, D, B> PlayerStrategy for CountingPlayer<C, D, B>
where
    C: CountingStrategy,
    D: DecisionStrategy,
    B: BettingStrategy,
{
    fn action(&self, hand: &PlayerHand, dealer_card: &Card) -> Option<PlayerAction> {
        let state = self
            .counting_strategy
            .get_current_table_state(hand, dealer_card);
        self.decision_strategy.decide(state)
    }

    fn bet(&self, bankroll: Chips) -> Chips {
        self.betting_strategy.bet(
            self.min_bet,
            self.counting_strategy.running_count(),
            self.counting_strategy.true_count(),
            bankroll,
        )
    }

    fn insurance_bet(&self, _hand: &PlayerHand, bet: Chips) -> Chips {
        match self.insurance_threshold {
            Some(threshold) if self.counting_strategy.true_count() >= threshold => bet / 2,
            _ => 0,
        }
    }

    fn shoe_shuffled(&mut self) {
        self.counting_strategy.reset();
    }

    fn card_dealt(&mut self, card: &Card) {
        self.counting_strategy.update(card);
    }

    fn joined_table(&mut self, table: &TableRules) {
        if let Some(ref current) = self.table {
            log::warn!(
                "already seated at {}, ignoring join of {}",
                current,
                table.name()
            );
            return;
        }
        self.table = Some(table.name().to_string());
        self.min_bet = table.min_bet();
    }

    fn left_table(&mut self, table: &TableRules) {
        if self.table.as_deref() == Some(table.name()) {
            self.table = None;
            self.min_bet = 0;
        }
    }

    fn label(&self) -> String {
        self.to_string()
    }
}
