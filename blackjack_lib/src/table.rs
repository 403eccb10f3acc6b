use crate::card::Card;
use crate::hand::{Hand, PlayerHand, BLACKJACK};
use crate::observer::{ObserverList, PlayerEvent, TableEvent, TableObserver};
use crate::player::{Player, PlayerId};
use crate::shoe::Shoe;
use crate::strategy::{DealerAction, DealerStrategy, PlayerAction};
use crate::{BlackjackGameError, Chips};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_TABLE_NUM: AtomicUsize = AtomicUsize::new(0);

pub const DEFAULT_MAX_PLAYERS: usize = 6;
pub const DEFAULT_MIN_BET: Chips = 20;
pub const DEFAULT_MAX_BET: Chips = 200;
pub const DEFAULT_DECKS: usize = 8;

/// The fixed, publicly visible properties of a table. Strategies receive these when they
/// join or leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRules {
    name: String,
    max_players: usize,
    min_bet: Chips,
    max_bet: Chips,
}

impl TableRules {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn min_bet(&self) -> Chips {
        self.min_bet
    }

    pub fn max_bet(&self) -> Chips {
        self.max_bet
    }
}

/// Struct to implement the builder pattern for `Table`. Every setting is optional; the dealer
/// strategy is supplied to `build`.
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    name: Option<String>,
    max_players: Option<usize>,
    min_bet: Option<Chips>,
    max_bet: Option<Chips>,
    num_decks: Option<usize>,
    seed: Option<u64>,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        TableBuilder::default()
    }

    /// Sets the table name, otherwise tables are numbered `Table 0`, `Table 1`, ...
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn max_players(&mut self, max_players: usize) -> &mut Self {
        self.max_players = Some(max_players);
        self
    }

    pub fn min_bet(&mut self, min_bet: Chips) -> &mut Self {
        self.min_bet = Some(min_bet);
        self
    }

    pub fn max_bet(&mut self, max_bet: Chips) -> &mut Self {
        self.max_bet = Some(max_bet);
        self
    }

    /// Number of decks in the shoe, at least six.
    pub fn num_decks(&mut self, num_decks: usize) -> &mut Self {
        self.num_decks = Some(num_decks);
        self
    }

    /// Seeds the shoe so that every shuffle at the table is reproducible.
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the settings and builds the table, with a freshly shuffled shoe.
    pub fn build(
        &self,
        dealer_strategy: Box<dyn DealerStrategy>,
    ) -> Result<Table, BlackjackGameError> {
        let max_players = self.max_players.unwrap_or(DEFAULT_MAX_PLAYERS);
        let min_bet = self.min_bet.unwrap_or(DEFAULT_MIN_BET);
        let max_bet = self.max_bet.unwrap_or(DEFAULT_MAX_BET);
        let num_decks = self.num_decks.unwrap_or(DEFAULT_DECKS);

        if max_players < 1 {
            return Err(BlackjackGameError::InvalidCapacity);
        }
        if min_bet < 0 {
            return Err(BlackjackGameError::NegativeMinimumBet(min_bet));
        }
        if max_bet < 0 {
            return Err(BlackjackGameError::NegativeMaximumBet(max_bet));
        }
        if max_bet < min_bet {
            return Err(BlackjackGameError::InvertedBetLimits { min_bet, max_bet });
        }

        let shoe = match self.seed {
            Some(seed) => Shoe::with_seed(num_decks, seed)?,
            None => Shoe::new(num_decks)?,
        };
        let name = match self.name {
            Some(ref name) => name.clone(),
            None => format!("Table {}", NEXT_TABLE_NUM.fetch_add(1, Ordering::Relaxed)),
        };

        Ok(Table {
            rules: TableRules {
                name,
                max_players,
                min_bet,
                max_bet,
            },
            dealer_strategy,
            shoe,
            players: Vec::new(),
            observers: ObserverList::new(),
            rounds_played: 0,
        })
    }
}

/// How a bet was resolved. Each variant maps to exactly one bankroll change and one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Win,
    Lose,
    Bust,
    Blackjack,
    Push,
}

/// A blackjack table. Owns the shoe, the dealer's drawing rule and the seated players, and
/// plays rounds from betting through settlement.
///
/// Bankrolls only move when a bet is resolved: losses are deducted and wins added at that
/// point, nothing is held back when the bet is placed.
pub struct Table {
    rules: TableRules,
    dealer_strategy: Box<dyn DealerStrategy>,
    shoe: Shoe,
    players: Vec<Player>,
    observers: ObserverList<dyn TableObserver>,
    rounds_played: u64,
}

impl Table {
    /// Associated function returning a `TableBuilder` with every setting at its default.
    pub fn builder() -> TableBuilder {
        TableBuilder::new()
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn name(&self) -> &str {
        self.rules.name()
    }

    pub fn dealer_strategy(&self) -> &dyn DealerStrategy {
        self.dealer_strategy.as_ref()
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn has_room(&self) -> bool {
        self.players.len() < self.rules.max_players
    }

    /// Seated players in seating order, which is also the order they are dealt and played.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id() == id)
    }

    pub fn observers(&self) -> &ObserverList<dyn TableObserver> {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut ObserverList<dyn TableObserver> {
        &mut self.observers
    }

    /// Rounds that ran to completion at this table.
    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    /// Seats `player` at the end of the table. The player's strategy and observers, then the
    /// table's observers, are told about it.
    pub fn add_player(&mut self, mut player: Player) -> Result<PlayerId, BlackjackGameError> {
        if !self.has_room() {
            return Err(BlackjackGameError::TableFull(self.rules.name.clone()));
        }
        let id = player.id();
        player.clear_round();
        player.strategy_mut().joined_table(&self.rules);
        log::debug!("{} joined {}", player.name(), self.rules.name);
        self.players.push(player);
        self.emit_player(
            self.players.len() - 1,
            PlayerEvent::Joins { table: &self.rules },
        );
        Ok(id)
    }

    /// Removes the player with the given id and hands it back, or `None` if it is not seated here.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let seat = self.players.iter().position(|p| p.id() == id)?;
        let mut player = self.players.remove(seat);
        player.clear_round();
        player.strategy_mut().left_table(&self.rules);
        log::debug!("{} left {}", player.name(), self.rules.name);
        notify_player(
            &self.observers,
            &player,
            PlayerEvent::Leaves { table: &self.rules },
        );
        Some(player)
    }

    pub fn play_round(&mut self) -> Result<(), BlackjackGameError> {
        self.play_rounds(1)
    }

    /// Plays `num_rounds` rounds back to back. Does nothing if no one is seated.
    ///
    /// A round that runs out of cards is abandoned: hands are cleared, bankroll changes made
    /// before that point stand, and the error is returned without playing further rounds.
    pub fn play_rounds(&mut self, num_rounds: usize) -> Result<(), BlackjackGameError> {
        if self.players.is_empty() {
            return Ok(());
        }
        for _ in 0..num_rounds {
            let result = self.run_round();
            self.clear_table();
            if let Err(e) = result {
                log::warn!("{}: {}", self.rules.name, e);
                return Err(e);
            }
            self.rounds_played += 1;
        }
        Ok(())
    }

    fn run_round(&mut self) -> Result<(), BlackjackGameError> {
        log::debug!(
            "{}: round {}, {} cards left in shoe",
            self.rules.name,
            self.rounds_played + 1,
            self.shoe.cards_left()
        );
        self.new_round();
        self.take_bets();
        self.deal_players()?;
        let mut dealer_hand = self.deal_house()?;
        if self.dealer_peek(&dealer_hand) {
            let up_card = dealer_hand.cards()[0];
            self.play_players(up_card)?;
            self.play_house(&mut dealer_hand)?;
            self.settle_hands(&dealer_hand);
        }
        Ok(())
    }

    fn new_round(&mut self) {
        self.observers.emit(&TableEvent::NewRound {
            players: &self.players,
        });
        if self.shoe.needs_shuffle() {
            self.shoe.shuffle();
            for player in self.players.iter_mut() {
                player.strategy_mut().shoe_shuffled();
            }
            self.observers.emit(&TableEvent::ShoeShuffled);
        }
    }

    /// Players with money are asked for a bet; a bet of zero or less sits the round out.
    fn take_bets(&mut self) {
        for seat in 0..self.players.len() {
            let player = &mut self.players[seat];
            let bankroll = player.bankroll();
            let bet = if bankroll > 0 {
                player.strategy().bet(bankroll)
            } else {
                0
            };
            if bet > bankroll {
                log::warn!("{} bet {} with a bankroll of {}", player.name(), bet, bankroll);
            }
            if bet > 0 {
                let id = player.id();
                player.hands.push(PlayerHand::new(bet, id));
            }
            self.emit_player(
                seat,
                PlayerEvent::Bets {
                    amount: bet.max(0),
                    bankroll,
                },
            );
        }
    }

    /// Two passes round the table, one card per active player each pass.
    fn deal_players(&mut self) -> Result<(), BlackjackGameError> {
        for pass in 0..2 {
            for seat in 0..self.players.len() {
                if !self.players[seat].is_active() {
                    continue;
                }
                self.draw_to(seat, 0)?;
                if pass == 1 {
                    self.emit_player(
                        seat,
                        PlayerEvent::Dealt {
                            hand: &self.players[seat].hands[0],
                        },
                    );
                }
            }
        }
        Ok(())
    }

    /// Deals the dealer's up and down cards, showing only the up card, and offers insurance
    /// against an ace.
    fn deal_house(&mut self) -> Result<Hand, BlackjackGameError> {
        let up_card = self.shoe.draw()?;
        let down_card = self.shoe.draw()?;
        let dealer_hand = Hand::from_cards([up_card, down_card]);

        self.notify_dealt(up_card);
        self.observers
            .emit(&TableEvent::DealerUpCard { card: up_card });

        if up_card.is_ace() {
            self.offer_insurance();
        }
        Ok(dealer_hand)
    }

    fn offer_insurance(&mut self) {
        for seat in 0..self.players.len() {
            let player = &mut self.players[seat];
            let Some(hand) = player.hands.first() else {
                continue;
            };
            let half_bet = hand.bet() / 2;
            let requested = player.strategy().insurance_bet(hand, hand.bet());
            let amount = requested.clamp(0, half_bet);
            if amount != requested {
                log::warn!(
                    "{} asked for {} insurance, limited to {}",
                    player.name(),
                    requested,
                    amount
                );
            }
            player.insurance = amount;
            let bankroll = player.bankroll();
            self.emit_player(seat, PlayerEvent::Insures { amount, bankroll });
        }
    }

    /// Checks the dealer for blackjack and settles insurance and naturals. Returns whether the
    /// round goes on to player and dealer play.
    fn dealer_peek(&mut self, dealer_hand: &Hand) -> bool {
        let up_card = dealer_hand.cards()[0];
        let dealer_blackjack = (up_card.is_ace() || up_card.value() == 10)
            && dealer_hand.high_valid_value() == Some(BLACKJACK);

        if dealer_blackjack {
            let down_card = dealer_hand.cards()[1];
            self.notify_dealt(down_card);
            self.observers
                .emit(&TableEvent::DealerBlackjack { hand: dealer_hand });
            log::debug!("{}: dealer blackjack", self.rules.name);
        }

        for seat in 0..self.players.len() {
            if !self.players[seat].is_active() {
                continue;
            }
            self.resolve_insurance(seat, dealer_blackjack);
            let first_hand = &self.players[seat].hands[0];
            if dealer_blackjack {
                // only a two card 21 stands up to a dealer blackjack
                let outcome = if first_hand.high_valid_value() == Some(BLACKJACK) {
                    Outcome::Push
                } else {
                    Outcome::Lose
                };
                self.resolve(seat, 0, outcome);
            } else if first_hand.is_blackjack() {
                self.resolve(seat, 0, Outcome::Blackjack);
            }
        }
        !dealer_blackjack
    }

    fn resolve_insurance(&mut self, seat: usize, dealer_blackjack: bool) {
        let player = &mut self.players[seat];
        let insured = std::mem::take(&mut player.insurance);
        if insured <= 0 {
            return;
        }
        let event = if dealer_blackjack {
            player.adjust_bankroll(2 * insured);
            PlayerEvent::WinsInsurance {
                amount: 2 * insured,
                bankroll: player.bankroll(),
            }
        } else {
            player.adjust_bankroll(-insured);
            PlayerEvent::LosesInsurance {
                amount: insured,
                bankroll: player.bankroll(),
            }
        };
        self.emit_player(seat, event);
    }

    /// Plays every unfinished hand in seating order. Hands created by splitting are appended to
    /// the player's list, so the index-driven loop picks them up in the same pass.
    fn play_players(&mut self, dealer_card: &'static Card) -> Result<(), BlackjackGameError> {
        for seat in 0..self.players.len() {
            let mut index = 0;
            while index < self.players[seat].hands.len() {
                if !self.players[seat].hands[index].is_finished() {
                    self.play_hand(seat, index, dealer_card)?;
                }
                index += 1;
            }
        }
        Ok(())
    }

    fn play_hand(
        &mut self,
        seat: usize,
        index: usize,
        dealer_card: &'static Card,
    ) -> Result<(), BlackjackGameError> {
        loop {
            match self.ask_action(seat, index, dealer_card) {
                PlayerAction::Stand => {
                    self.stand(seat, index);
                    return Ok(());
                }
                PlayerAction::Hit => {
                    let card = self.draw_to(seat, index)?;
                    self.emit_player(
                        seat,
                        PlayerEvent::Draws {
                            card,
                            hand: &self.players[seat].hands[index],
                        },
                    );

                    let hand = &self.players[seat].hands[index];
                    if hand.is_busted() {
                        self.resolve(seat, index, Outcome::Bust);
                        return Ok(());
                    }
                    if hand.from_split() {
                        if hand.is_blackjack() {
                            self.resolve(seat, index, Outcome::Blackjack);
                            return Ok(());
                        }
                        if hand.cards()[0].is_ace() {
                            // split aces take one card, unless it makes another pair of aces
                            if hand.is_pair()
                                && self.ask_action(seat, index, dealer_card) == PlayerAction::Split
                            {
                                self.split(seat, index);
                                continue;
                            }
                            self.stand(seat, index);
                            return Ok(());
                        }
                    }
                }
                PlayerAction::DoubleDown => {
                    if self.players[seat].hands[index].len() != 2 {
                        log::warn!(
                            "{} can not double down on {}, standing",
                            self.players[seat].name(),
                            self.players[seat].hands[index]
                        );
                        self.stand(seat, index);
                        return Ok(());
                    }
                    self.players[seat].hands[index].double_bet();
                    let card = self.draw_to(seat, index)?;
                    self.players[seat].hands[index].finish();
                    self.emit_player(
                        seat,
                        PlayerEvent::DoublesDown {
                            card,
                            hand: &self.players[seat].hands[index],
                        },
                    );
                    if self.players[seat].hands[index].is_busted() {
                        self.resolve(seat, index, Outcome::Bust);
                    }
                    return Ok(());
                }
                PlayerAction::Split => {
                    if !self.players[seat].hands[index].is_pair() {
                        log::warn!(
                            "{} can not split {}, standing",
                            self.players[seat].name(),
                            self.players[seat].hands[index]
                        );
                        self.stand(seat, index);
                        return Ok(());
                    }
                    self.split(seat, index);
                }
            }
        }
    }

    fn ask_action(&self, seat: usize, index: usize, dealer_card: &Card) -> PlayerAction {
        let player = &self.players[seat];
        let hand = &player.hands[index];
        player
            .strategy()
            .action(hand, dealer_card)
            .unwrap_or_else(|| {
                log::warn!("{} gave no action for {}, standing", player.name(), hand);
                PlayerAction::Stand
            })
    }

    fn stand(&mut self, seat: usize, index: usize) {
        self.players[seat].hands[index].finish();
        self.emit_player(
            seat,
            PlayerEvent::Stands {
                hand: &self.players[seat].hands[index],
            },
        );
    }

    fn split(&mut self, seat: usize, index: usize) {
        self.emit_player(
            seat,
            PlayerEvent::Splits {
                hand: &self.players[seat].hands[index],
            },
        );
        if let Some(new_hand) = self.players[seat].hands[index].split() {
            self.players[seat].hands.push(new_hand);
        }
    }

    /// Turns the down card over and draws for the dealer until its strategy stands.
    fn play_house(&mut self, dealer_hand: &mut Hand) -> Result<(), BlackjackGameError> {
        let down_card = dealer_hand.cards()[1];
        self.notify_dealt(down_card);
        self.observers.emit(&TableEvent::DealerDownCard {
            card: down_card,
            hand: &*dealer_hand,
        });

        while !dealer_hand.is_busted() {
            match self.dealer_strategy.action(dealer_hand) {
                Some(DealerAction::Hit) => {}
                Some(DealerAction::Stand) => break,
                None => {
                    log::warn!("{}: dealer gave no action, standing", self.rules.name);
                    break;
                }
            }
            let card = self.shoe.draw()?;
            dealer_hand.add(card);
            self.notify_dealt(card);
            self.observers.emit(&TableEvent::DealerDraws {
                card,
                hand: &*dealer_hand,
            });
        }

        dealer_hand.finish();
        if dealer_hand.is_busted() {
            self.observers
                .emit(&TableEvent::DealerBusts { hand: &*dealer_hand });
        } else {
            self.observers
                .emit(&TableEvent::DealerStands { hand: &*dealer_hand });
        }
        Ok(())
    }

    /// Pays or collects every hand not already resolved during play.
    fn settle_hands(&mut self, dealer_hand: &Hand) {
        // a busted dealer has no valid value, which orders below every standing hand
        let dealer_value = dealer_hand.high_valid_value();
        for seat in 0..self.players.len() {
            for index in 0..self.players[seat].hands.len() {
                let hand = &self.players[seat].hands[index];
                if hand.is_settled() {
                    continue;
                }
                let outcome = match dealer_value.cmp(&hand.high_valid_value()) {
                    std::cmp::Ordering::Less => Outcome::Win,
                    std::cmp::Ordering::Greater => Outcome::Lose,
                    std::cmp::Ordering::Equal => Outcome::Push,
                };
                self.resolve(seat, index, outcome);
            }
        }
    }

    fn resolve(&mut self, seat: usize, index: usize, outcome: Outcome) {
        let player = &mut self.players[seat];
        let bet = player.hands[index].bet();
        let change = match outcome {
            Outcome::Win => bet,
            Outcome::Lose | Outcome::Bust => -bet,
            Outcome::Blackjack => bet * 3 / 2,
            Outcome::Push => 0,
        };
        player.adjust_bankroll(change);
        player.hands[index].settle();

        let bankroll = player.bankroll();
        let hand = &self.players[seat].hands[index];
        let event = match outcome {
            Outcome::Win => PlayerEvent::Wins {
                hand,
                amount: change,
                bankroll,
            },
            Outcome::Lose => PlayerEvent::Loses {
                hand,
                amount: bet,
                bankroll,
            },
            Outcome::Bust => PlayerEvent::Busts {
                hand,
                amount: bet,
                bankroll,
            },
            Outcome::Blackjack => PlayerEvent::Blackjack {
                hand,
                amount: change,
                bankroll,
            },
            Outcome::Push => PlayerEvent::Push { hand, bankroll },
        };
        self.emit_player(seat, event);
    }

    fn draw_to(&mut self, seat: usize, index: usize) -> Result<&'static Card, BlackjackGameError> {
        let card = self.shoe.draw()?;
        self.players[seat].hands[index].add(card);
        self.notify_dealt(card);
        Ok(card)
    }

    /// Every seated player's strategy sees every card turned face up.
    fn notify_dealt(&mut self, card: &Card) {
        for player in self.players.iter_mut() {
            player.strategy_mut().card_dealt(card);
        }
    }

    fn emit_player(&self, seat: usize, event: PlayerEvent<'_>) {
        notify_player(&self.observers, &self.players[seat], event);
    }

    fn clear_table(&mut self) {
        for player in self.players.iter_mut() {
            player.clear_round();
        }
    }
}

/// Sends a player event to the player's own observers, then to the table's.
fn notify_player(
    table_observers: &ObserverList<dyn TableObserver>,
    player: &Player,
    event: PlayerEvent<'_>,
) {
    player.observers().emit(&event);
    table_observers.emit(&TableEvent::Player { player, event });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::card::{Rank, Suit};
    use crate::strategy::PlayerStrategy;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    use PlayerAction::{DoubleDown, Hit, Split, Stand};

    struct StandOnSeventeen;

    impl DealerStrategy for StandOnSeventeen {
        fn action(&self, dealer_hand: &Hand) -> Option<DealerAction> {
            match dealer_hand.high_valid_value() {
                Some(value) if value < 17 => Some(DealerAction::Hit),
                _ => Some(DealerAction::Stand),
            }
        }
    }

    /// Plays a fixed list of actions, then returns no action at all.
    struct Scripted {
        bet: Chips,
        insurance: Chips,
        actions: Rc<RefCell<VecDeque<PlayerAction>>>,
        seen: Rc<Cell<usize>>,
        min_bet: Rc<Cell<Chips>>,
    }

    impl PlayerStrategy for Scripted {
        fn action(&self, _hand: &PlayerHand, _dealer_card: &Card) -> Option<PlayerAction> {
            self.actions.borrow_mut().pop_front()
        }

        fn bet(&self, _bankroll: Chips) -> Chips {
            self.bet
        }

        fn insurance_bet(&self, _hand: &PlayerHand, _bet: Chips) -> Chips {
            self.insurance
        }

        fn shoe_shuffled(&mut self) {
            self.seen.set(0);
        }

        fn card_dealt(&mut self, _card: &Card) {
            self.seen.set(self.seen.get() + 1);
        }

        fn joined_table(&mut self, table: &TableRules) {
            self.min_bet.set(table.min_bet());
        }

        fn left_table(&mut self, _table: &TableRules) {
            self.min_bet.set(-1);
        }
    }

    struct Script {
        actions: Rc<RefCell<VecDeque<PlayerAction>>>,
        seen: Rc<Cell<usize>>,
        min_bet: Rc<Cell<Chips>>,
    }

    impl Script {
        fn remaining(&self) -> usize {
            self.actions.borrow().len()
        }
    }

    fn scripted(
        bet: Chips,
        insurance: Chips,
        actions: &[PlayerAction],
    ) -> (Box<Scripted>, Script) {
        let script = Script {
            actions: Rc::new(RefCell::new(actions.iter().copied().collect())),
            seen: Rc::new(Cell::new(0)),
            min_bet: Rc::new(Cell::new(0)),
        };
        let strategy = Box::new(Scripted {
            bet,
            insurance,
            actions: Rc::clone(&script.actions),
            seen: Rc::clone(&script.seen),
            min_bet: Rc::clone(&script.min_bet),
        });
        (strategy, script)
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TableObserver for Recorder {
        fn on_event(&mut self, event: &TableEvent<'_>) {
            self.events.push(describe(event));
        }
    }

    fn describe(event: &TableEvent<'_>) -> String {
        match event {
            TableEvent::NewRound { .. } => "new round".to_string(),
            TableEvent::ShoeShuffled => "shuffle".to_string(),
            TableEvent::DealerUpCard { card } => format!("dealer shows {}", card),
            TableEvent::DealerDownCard { card, .. } => format!("dealer reveals {}", card),
            TableEvent::DealerBlackjack { .. } => "dealer blackjack".to_string(),
            TableEvent::DealerDraws { card, .. } => format!("dealer draws {}", card),
            TableEvent::DealerStands { hand } => {
                format!("dealer stands {}", hand.high_valid_value().unwrap_or(0))
            }
            TableEvent::DealerBusts { .. } => "dealer busts".to_string(),
            TableEvent::Player { event, .. } => match event {
                PlayerEvent::Joins { .. } => "joins".to_string(),
                PlayerEvent::Leaves { .. } => "leaves".to_string(),
                PlayerEvent::Bets { amount, .. } => format!("bets {}", amount),
                PlayerEvent::Insures { amount, .. } => format!("insures {}", amount),
                PlayerEvent::Dealt { hand } => format!("dealt {}", hand),
                PlayerEvent::Draws { card, .. } => format!("draws {}", card),
                PlayerEvent::Stands { hand } => format!("stands {}", hand),
                PlayerEvent::Busts { amount, .. } => format!("busts {}", amount),
                PlayerEvent::Splits { .. } => "splits".to_string(),
                PlayerEvent::DoublesDown { hand, .. } => format!("doubles down {}", hand),
                PlayerEvent::Wins { amount, .. } => format!("wins {}", amount),
                PlayerEvent::Loses { amount, .. } => format!("loses {}", amount),
                PlayerEvent::Blackjack { amount, .. } => format!("blackjack {}", amount),
                PlayerEvent::Push { .. } => "push".to_string(),
                PlayerEvent::WinsInsurance { amount, .. } => format!("wins insurance {}", amount),
                PlayerEvent::LosesInsurance { amount, .. } => {
                    format!("loses insurance {}", amount)
                }
            },
        }
    }

    fn spade(rank: Rank) -> &'static Card {
        Card::get(rank, Suit::Spades)
    }

    fn heart(rank: Rank) -> &'static Card {
        Card::get(rank, Suit::Hearts)
    }

    fn new_table() -> (Table, Rc<RefCell<Recorder>>) {
        let mut table = Table::builder()
            .name("Test")
            .seed(17)
            .build(Box::new(StandOnSeventeen))
            .unwrap();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        table.observers_mut().add(recorder.clone());
        (table, recorder)
    }

    fn seat(
        table: &mut Table,
        bet: Chips,
        insurance: Chips,
        actions: &[PlayerAction],
    ) -> (PlayerId, Script) {
        let (strategy, script) = scripted(bet, insurance, actions);
        let player = Player::with_bankroll("Test Player", strategy, 1000).unwrap();
        let id = table.add_player(player).unwrap();
        (id, script)
    }

    fn bankroll(table: &Table, id: PlayerId) -> Chips {
        table.player(id).unwrap().bankroll()
    }

    fn count(recorder: &Rc<RefCell<Recorder>>, label: &str) -> usize {
        recorder.borrow().events.iter().filter(|e| *e == label).count()
    }

    #[test]
    fn test_round_event_order() {
        let (mut table, recorder) = new_table();
        let (id, script) = seat(&mut table, 100, 0, &[Stand]);
        table.shoe.stack(&[
            spade(Rank::Ten),
            spade(Rank::Nine),
            heart(Rank::Ten),
            heart(Rank::Seven),
        ]);
        table.play_round().unwrap();

        assert_eq!(
            recorder.borrow().events,
            vec![
                "joins",
                "new round",
                "bets 100",
                "dealt 10S, 9S (19), bet 100",
                "dealer shows 10H",
                "stands 10S, 9S (19), bet 100",
                "dealer reveals 7H",
                "dealer stands 17",
                "wins 100",
            ]
        );
        assert_eq!(bankroll(&table, id), 1100);
        assert_eq!(script.seen.get(), 4);
        assert_eq!(table.rounds_played(), 1);
        assert!(!table.players()[0].is_active());
    }

    #[test]
    fn test_dealer_blackjack_with_insurance() {
        let (mut table, recorder) = new_table();
        let (insured, insured_script) = seat(&mut table, 100, 80, &[Hit]);
        let (natural, _) = seat(&mut table, 100, 0, &[]);
        let (plain, _) = seat(&mut table, 100, 0, &[]);
        table.shoe.stack(&[
            spade(Rank::Ten),
            spade(Rank::Ace),
            heart(Rank::Nine),
            spade(Rank::Nine),
            spade(Rank::King),
            heart(Rank::Seven),
            heart(Rank::Ace),
            heart(Rank::King),
        ]);
        table.play_round().unwrap();

        // insurance is limited to half the bet, wins twice that, and the hand still loses
        assert_eq!(count(&recorder, "insures 50"), 1);
        assert_eq!(count(&recorder, "insures 0"), 2);
        assert_eq!(count(&recorder, "wins insurance 100"), 1);
        assert_eq!(bankroll(&table, insured), 1000);
        assert_eq!(bankroll(&table, natural), 1000);
        assert_eq!(bankroll(&table, plain), 900);
        assert_eq!(count(&recorder, "push"), 1);
        assert_eq!(count(&recorder, "loses 100"), 2);

        // the round ends at the peek
        assert_eq!(insured_script.remaining(), 1);
        assert_eq!(count(&recorder, "dealer reveals KH"), 0);
        assert_eq!(insured_script.seen.get(), 8);
    }

    #[test]
    fn test_insurance_lost_without_dealer_blackjack() {
        let (mut table, recorder) = new_table();
        let (id, _) = seat(&mut table, 100, 50, &[Stand]);
        table.shoe.stack(&[
            spade(Rank::Ten),
            spade(Rank::Nine),
            spade(Rank::Ace),
            spade(Rank::Seven),
        ]);
        table.play_round().unwrap();
        assert_eq!(count(&recorder, "loses insurance 50"), 1);
        assert_eq!(count(&recorder, "dealer stands 18"), 1);
        assert_eq!(bankroll(&table, id), 1050);
    }

    #[test]
    fn test_no_insurance_unless_ace_showing() {
        let (mut table, recorder) = new_table();
        let (id, _) = seat(&mut table, 100, 50, &[Stand]);
        table.shoe.stack(&[
            spade(Rank::Ten),
            spade(Rank::Nine),
            spade(Rank::King),
            spade(Rank::Ace),
        ]);
        table.play_round().unwrap();
        assert!(recorder.borrow().events.iter().all(|e| !e.starts_with("insures")));
        assert_eq!(count(&recorder, "dealer blackjack"), 1);
        assert_eq!(bankroll(&table, id), 900);
    }

    #[test]
    fn test_natural_pays_three_to_two() {
        let (mut table, recorder) = new_table();
        let (id, script) = seat(&mut table, 100, 0, &[Hit]);
        table.shoe.stack(&[
            spade(Rank::Ace),
            spade(Rank::King),
            spade(Rank::Nine),
            spade(Rank::Eight),
        ]);
        table.play_round().unwrap();
        assert_eq!(bankroll(&table, id), 1150);
        assert_eq!(count(&recorder, "blackjack 150"), 1);
        assert_eq!(count(&recorder, "wins 100"), 0);
        assert_eq!(script.remaining(), 1);
        // the dealer still plays out the hand
        assert_eq!(count(&recorder, "dealer stands 17"), 1);
    }

    #[test]
    fn test_split_eights() {
        let (mut table, recorder) = new_table();
        let (id, script) = seat(&mut table, 100, 0, &[Split, Hit, Stand, Hit, Stand]);
        table.shoe.stack(&[
            spade(Rank::Eight),
            heart(Rank::Eight),
            spade(Rank::Ten),
            spade(Rank::Seven),
            spade(Rank::Three),
            heart(Rank::Ten),
        ]);
        table.play_round().unwrap();

        let events = recorder.borrow().events.clone();
        let played: Vec<&str> = events
            .iter()
            .map(|e| e.as_str())
            .filter(|e| e.starts_with("stands") || e.starts_with("wins") || e.starts_with("loses"))
            .collect();
        assert_eq!(
            played,
            vec![
                "stands 8S, 3S (11), bet 100",
                "stands 8H, 10H (18), bet 100",
                "loses 100",
                "wins 100",
            ]
        );
        assert_eq!(count(&recorder, "splits"), 1);
        assert_eq!(bankroll(&table, id), 1000);
        assert_eq!(script.remaining(), 0);
    }

    #[test]
    fn test_double_down_on_eleven() {
        let (mut table, recorder) = new_table();
        let (id, script) = seat(&mut table, 100, 0, &[DoubleDown, Hit]);
        table.shoe.stack(&[
            spade(Rank::Six),
            spade(Rank::Five),
            heart(Rank::Six),
            spade(Rank::Ten),
            spade(Rank::Two),
            heart(Rank::Ten),
        ]);
        table.play_round().unwrap();

        assert_eq!(count(&recorder, "doubles down 6S, 5S, 2S (13), bet 200"), 1);
        assert_eq!(count(&recorder, "dealer draws 10H"), 1);
        assert_eq!(count(&recorder, "dealer busts"), 1);
        assert_eq!(count(&recorder, "wins 200"), 1);
        assert_eq!(bankroll(&table, id), 1200);
        // finished after one card, never asked again
        assert_eq!(script.remaining(), 1);
    }

    #[test]
    fn test_double_down_bust_forfeits_doubled_bet() {
        let (mut table, recorder) = new_table();
        let (id, _) = seat(&mut table, 100, 0, &[DoubleDown]);
        table.shoe.stack(&[
            spade(Rank::Ten),
            spade(Rank::Two),
            heart(Rank::Ten),
            heart(Rank::Seven),
            spade(Rank::King),
        ]);
        table.play_round().unwrap();
        assert_eq!(count(&recorder, "busts 200"), 1);
        assert_eq!(bankroll(&table, id), 800);
        assert!(recorder
            .borrow()
            .events
            .iter()
            .all(|e| !e.starts_with("wins") && !e.starts_with("loses") && e != "push"));
    }

    #[test]
    fn test_illegal_double_down_stands() {
        let (mut table, recorder) = new_table();
        let (id, _) = seat(&mut table, 100, 0, &[Hit, DoubleDown]);
        table.shoe.stack(&[
            spade(Rank::Two),
            spade(Rank::Three),
            spade(Rank::Ten),
            spade(Rank::Eight),
            spade(Rank::Four),
        ]);
        table.play_round().unwrap();
        assert_eq!(count(&recorder, "stands 2S, 3S, 4S (9), bet 100"), 1);
        assert_eq!(count(&recorder, "loses 100"), 1);
        assert_eq!(bankroll(&table, id), 900);
    }

    #[test]
    fn test_illegal_split_and_missing_action_stand() {
        let (mut table, recorder) = new_table();
        let (id, _) = seat(&mut table, 100, 0, &[Split]);
        let (other, _) = seat(&mut table, 100, 0, &[]);
        table.shoe.stack(&[
            spade(Rank::Ten),
            heart(Rank::Ten),
            spade(Rank::Nine),
            heart(Rank::Nine),
            spade(Rank::Ten),
            spade(Rank::Eight),
        ]);
        table.play_round().unwrap();
        assert_eq!(count(&recorder, "splits"), 0);
        assert_eq!(count(&recorder, "stands 10S, 9S (19), bet 100"), 1);
        assert_eq!(count(&recorder, "stands 10H, 9H (19), bet 100"), 1);
        assert_eq!(bankroll(&table, id), 1100);
        assert_eq!(bankroll(&table, other), 1100);
    }

    #[test]
    fn test_split_aces_take_one_card() {
        let (mut table, recorder) = new_table();
        let (id, script) = seat(&mut table, 100, 0, &[Split, Hit, Hit, Hit]);
        table.shoe.stack(&[
            spade(Rank::Ace),
            heart(Rank::Ace),
            spade(Rank::Ten),
            spade(Rank::Seven),
            spade(Rank::King),
            spade(Rank::Five),
        ]);
        table.play_round().unwrap();

        assert_eq!(count(&recorder, "stands AS, KS (21), bet 100"), 1);
        assert_eq!(count(&recorder, "stands AH, 5S (16), bet 100"), 1);
        // 21 on a split ace is paid even money
        assert_eq!(count(&recorder, "blackjack 150"), 0);
        assert_eq!(count(&recorder, "wins 100"), 1);
        assert_eq!(count(&recorder, "loses 100"), 1);
        assert_eq!(bankroll(&table, id), 1000);
        assert_eq!(script.remaining(), 1);
    }

    #[test]
    fn test_resplit_aces() {
        let (mut table, recorder) = new_table();
        let (id, script) = seat(&mut table, 100, 0, &[Split, Hit, Split, Hit, Hit, Hit]);
        table.shoe.stack(&[
            spade(Rank::Ace),
            heart(Rank::Ace),
            spade(Rank::Ten),
            spade(Rank::Seven),
            Card::get(Rank::Ace, Suit::Diamonds),
            spade(Rank::Nine),
            heart(Rank::Nine),
            Card::get(Rank::Nine, Suit::Diamonds),
        ]);
        table.play_round().unwrap();

        assert_eq!(count(&recorder, "splits"), 2);
        assert_eq!(count(&recorder, "stands AS, 9S (20), bet 100"), 1);
        assert_eq!(count(&recorder, "stands AH, 9H (20), bet 100"), 1);
        assert_eq!(count(&recorder, "stands AD, 9D (20), bet 100"), 1);
        assert_eq!(count(&recorder, "wins 100"), 3);
        assert_eq!(bankroll(&table, id), 1300);
        assert_eq!(script.remaining(), 0);
    }

    #[test]
    fn test_split_tens_blackjack_pays_three_to_two() {
        let (mut table, recorder) = new_table();
        let (id, _) = seat(&mut table, 100, 0, &[Split, Hit, Hit, Stand]);
        table.shoe.stack(&[
            spade(Rank::King),
            heart(Rank::King),
            spade(Rank::Ten),
            spade(Rank::Seven),
            spade(Rank::Ace),
            spade(Rank::Nine),
        ]);
        table.play_round().unwrap();
        assert_eq!(count(&recorder, "blackjack 150"), 1);
        assert_eq!(count(&recorder, "wins 100"), 1);
        assert_eq!(bankroll(&table, id), 1250);
    }

    #[test]
    fn test_players_sitting_out() {
        let (mut table, recorder) = new_table();
        let (idle, idle_script) = seat(&mut table, 0, 0, &[Hit]);
        let (strategy, broke_script) = scripted(100, 0, &[Hit]);
        let broke = table
            .add_player(Player::with_bankroll("Broke", strategy, 0).unwrap())
            .unwrap();
        let (active, _) = seat(&mut table, 100, 0, &[Stand]);
        table.shoe.stack(&[
            spade(Rank::Ten),
            spade(Rank::Nine),
            heart(Rank::Ten),
            heart(Rank::Seven),
        ]);
        table.play_round().unwrap();

        assert_eq!(count(&recorder, "bets 0"), 2);
        assert_eq!(bankroll(&table, idle), 1000);
        assert_eq!(bankroll(&table, broke), 0);
        assert_eq!(bankroll(&table, active), 1100);
        assert_eq!(idle_script.remaining(), 1);
        assert_eq!(broke_script.remaining(), 1);
        // everyone still watches the cards
        assert_eq!(idle_script.seen.get(), 4);
    }

    struct Undecided;

    impl DealerStrategy for Undecided {
        fn action(&self, _dealer_hand: &Hand) -> Option<DealerAction> {
            None
        }
    }

    #[test]
    fn test_bad_requests_are_recovered() {
        let mut table = Table::builder()
            .name("Test")
            .seed(17)
            .build(Box::new(Undecided))
            .unwrap();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        table.observers_mut().add(recorder.clone());
        let (a, _) = seat(&mut table, 100, -40, &[Stand]);
        let (b, b_script) = seat(&mut table, -50, 0, &[Hit]);
        table.shoe.stack(&[
            spade(Rank::Ten),
            spade(Rank::Nine),
            spade(Rank::Ace),
            spade(Rank::Five),
        ]);
        table.play_round().unwrap();

        // a dealer without an answer stands, here on soft 16
        assert_eq!(count(&recorder, "dealer stands 16"), 1);
        assert!(recorder.borrow().events.iter().all(|e| !e.starts_with("dealer draws")));
        // negative insurance is clamped to nothing
        assert_eq!(count(&recorder, "insures 0"), 1);
        assert!(recorder.borrow().events.iter().all(|e| !e.contains("insurance")));
        // a negative bet sits the round out
        assert_eq!(count(&recorder, "bets 0"), 1);
        assert_eq!(b_script.remaining(), 1);
        assert_eq!(bankroll(&table, a), 1100);
        assert_eq!(bankroll(&table, b), 1000);
    }

    #[test]
    fn test_shoe_exhaustion_aborts_round() {
        let (mut table, recorder) = new_table();
        let (id, _) = seat(&mut table, 100, 0, &[]);
        table.shoe.burn_to(3);
        assert_eq!(
            table.play_round(),
            Err(BlackjackGameError::ShoeExhausted { dealt: 416 })
        );
        assert!(!table.players()[0].is_active());
        assert_eq!(bankroll(&table, id), 1000);
        assert_eq!(table.rounds_played(), 0);
        assert_eq!(count(&recorder, "shuffle"), 0);

        // the next round reshuffles and plays normally
        table.play_round().unwrap();
        assert_eq!(count(&recorder, "shuffle"), 1);
        assert_eq!(table.rounds_played(), 1);
    }

    /// Sums every bankroll change reported to the table.
    #[derive(Default)]
    struct Ledger {
        net: Chips,
    }

    impl TableObserver for Ledger {
        fn on_event(&mut self, event: &TableEvent<'_>) {
            if let TableEvent::Player { event, .. } = event {
                self.net += match event {
                    PlayerEvent::Wins { amount, .. }
                    | PlayerEvent::Blackjack { amount, .. }
                    | PlayerEvent::WinsInsurance { amount, .. } => *amount,
                    PlayerEvent::Loses { amount, .. }
                    | PlayerEvent::Busts { amount, .. }
                    | PlayerEvent::LosesInsurance { amount, .. } => -*amount,
                    _ => 0,
                };
            }
        }
    }

    #[test]
    fn test_many_rounds_match_reported_results() {
        let (mut table, recorder) = new_table();
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        table.observers_mut().add(ledger.clone());
        let mut ids = Vec::new();
        for _ in 0..4 {
            ids.push(seat(&mut table, 25, 10, &[]).0);
        }
        table.play_rounds(200).unwrap();

        assert_eq!(table.rounds_played(), 200);
        assert_eq!(count(&recorder, "new round"), 200);
        assert!(count(&recorder, "shuffle") > 0);
        let net: Chips = ids.iter().map(|id| bankroll(&table, *id) - 1000).sum();
        assert_eq!(net, ledger.borrow().net);
        assert!(table.players().iter().all(|p| !p.is_active()));
    }

    #[test]
    fn test_builder_validation() {
        let dealer = || Box::new(StandOnSeventeen);
        assert_eq!(
            Table::builder().num_decks(5).build(dealer()).err(),
            Some(BlackjackGameError::TooFewDecks {
                requested: 5,
                minimum: 6
            })
        );
        assert_eq!(
            Table::builder().max_players(0).build(dealer()).err(),
            Some(BlackjackGameError::InvalidCapacity)
        );
        assert_eq!(
            Table::builder().min_bet(-1).build(dealer()).err(),
            Some(BlackjackGameError::NegativeMinimumBet(-1))
        );
        assert_eq!(
            Table::builder().min_bet(0).max_bet(-5).build(dealer()).err(),
            Some(BlackjackGameError::NegativeMaximumBet(-5))
        );
        assert_eq!(
            Table::builder().min_bet(50).max_bet(10).build(dealer()).err(),
            Some(BlackjackGameError::InvertedBetLimits {
                min_bet: 50,
                max_bet: 10
            })
        );

        let table = Table::builder().build(dealer()).unwrap();
        assert!(table.name().starts_with("Table "));
        assert_eq!(table.rules().max_players(), DEFAULT_MAX_PLAYERS);
        assert_eq!(table.rules().min_bet(), DEFAULT_MIN_BET);
        assert_eq!(table.rules().max_bet(), DEFAULT_MAX_BET);
        assert_eq!(table.shoe().num_decks(), DEFAULT_DECKS);
    }

    #[test]
    fn test_join_and_leave() {
        let mut table = Table::builder()
            .name("Small")
            .max_players(1)
            .min_bet(10)
            .build(Box::new(StandOnSeventeen))
            .unwrap();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        table.observers_mut().add(recorder.clone());

        let (id, script) = seat(&mut table, 10, 0, &[]);
        assert_eq!(script.min_bet.get(), 10);
        assert!(!table.has_room());

        let (strategy, _) = scripted(10, 0, &[]);
        assert_eq!(
            table.add_player(Player::new(strategy)).err(),
            Some(BlackjackGameError::TableFull("Small".to_string()))
        );

        let player = table.remove_player(id).unwrap();
        assert_eq!(player.id(), id);
        assert_eq!(script.min_bet.get(), -1);
        assert!(table.remove_player(id).is_none());
        assert!(table.has_room());
        assert_eq!(recorder.borrow().events, vec!["joins", "leaves"]);

        // an empty table plays nothing
        table.play_rounds(3).unwrap();
        assert_eq!(table.rounds_played(), 0);
        assert_eq!(recorder.borrow().events.len(), 2);
    }
}
