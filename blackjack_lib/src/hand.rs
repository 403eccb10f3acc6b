use crate::card::Card;
use crate::player::PlayerId;
use crate::Chips;
use std::collections::BTreeSet;
use std::fmt::Display;

/// Highest total that is not a bust.
pub const BLACKJACK: u32 = 21;

/// A hand of cards together with every total it can reach.
///
/// Each ace may count as 1 or 11 independently, so a hand tracks the full set of totals
/// rather than a single value. The set is rebuilt from scratch whenever a card is added.
#[derive(Debug, Clone)]
pub struct Hand {
    cards: Vec<&'static Card>,
    values: BTreeSet<u32>,
    high_valid_value: Option<u32>,
    finished: bool,
}

impl Hand {
    /// Associated function to create an empty hand, whose only total is zero.
    pub fn new() -> Hand {
        Hand {
            cards: Vec::new(),
            values: BTreeSet::from([0]),
            high_valid_value: Some(0),
            finished: false,
        }
    }

    /// Creates a hand from the given cards, added in order.
    pub fn from_cards<I: IntoIterator<Item = &'static Card>>(cards: I) -> Hand {
        let mut hand = Hand::new();
        for card in cards {
            hand.add(card);
        }
        hand
    }

    /// Adds `card`, expanding every existing total by each value the card can take.
    pub fn add(&mut self, card: &'static Card) {
        let mut values = BTreeSet::new();
        for total in self.values.iter() {
            if card.is_ace() {
                values.insert(total + 1);
                values.insert(total + 11);
            } else {
                values.insert(total + card.value());
            }
        }
        self.values = values;
        self.high_valid_value = self.values.range(..=BLACKJACK).next_back().copied();
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[&'static Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Every total reachable by choosing each ace's value independently.
    pub fn values(&self) -> &BTreeSet<u32> {
        &self.values
    }

    pub fn low_value(&self) -> u32 {
        self.values.first().copied().unwrap_or(0)
    }

    pub fn high_value(&self) -> u32 {
        self.values.last().copied().unwrap_or(0)
    }

    /// The best total not exceeding 21, or `None` if the hand is busted.
    pub fn high_valid_value(&self) -> Option<u32> {
        self.high_valid_value
    }

    pub fn is_busted(&self) -> bool {
        self.low_value() > BLACKJACK
    }

    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.high_valid_value == Some(BLACKJACK)
    }

    /// True when the best total counts an ace as 11.
    pub fn is_soft(&self) -> bool {
        match self.high_valid_value {
            Some(high) if !self.is_busted() => self.low_value() + 10 <= high,
            _ => false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }

    /// Keeps only the first card and returns the second, resetting the totals to the one card case.
    fn split_off_second(&mut self) -> &'static Card {
        let first = self.cards[0];
        let second = self.cards[1];
        *self = Hand::from_cards([first]);
        second
    }
}

impl Default for Hand {
    fn default() -> Self {
        Hand::new()
    }
}

impl Hand {
    fn describe(&self, blackjack: bool) -> String {
        let cards = self
            .cards
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        match self.high_valid_value {
            _ if blackjack => format!("{} (Blackjack)", cards),
            Some(high) => format!("{} ({})", cards, high),
            None => format!("{} ({})", cards, self.low_value()),
        }
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe(self.is_blackjack()))
    }
}

/// A hand a player has wagered on for the current round.
#[derive(Debug, Clone)]
pub struct PlayerHand {
    hand: Hand,
    bet: Chips,
    from_split: bool,
    settled: bool,
    owner: PlayerId,
}

impl PlayerHand {
    pub fn new(bet: Chips, owner: PlayerId) -> PlayerHand {
        PlayerHand {
            hand: Hand::new(),
            bet,
            from_split: false,
            settled: false,
            owner,
        }
    }

    /// The underlying hand, for queries that `PlayerHand` does not change.
    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn add(&mut self, card: &'static Card) {
        self.hand.add(card);
    }

    pub fn cards(&self) -> &[&'static Card] {
        self.hand.cards()
    }

    pub fn len(&self) -> usize {
        self.hand.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hand.is_empty()
    }

    pub fn values(&self) -> &BTreeSet<u32> {
        self.hand.values()
    }

    pub fn high_valid_value(&self) -> Option<u32> {
        self.hand.high_valid_value()
    }

    pub fn is_busted(&self) -> bool {
        self.hand.is_busted()
    }

    pub fn is_soft(&self) -> bool {
        self.hand.is_soft()
    }

    pub fn is_finished(&self) -> bool {
        self.hand.is_finished()
    }

    pub(crate) fn finish(&mut self) {
        self.hand.finish();
    }

    pub fn bet(&self) -> Chips {
        self.bet
    }

    pub(crate) fn double_bet(&mut self) {
        self.bet *= 2;
    }

    pub fn from_split(&self) -> bool {
        self.from_split
    }

    /// Whether money already changed hands for this bet.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub(crate) fn settle(&mut self) {
        self.settled = true;
        self.hand.finish();
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Two cards of equal value, e.g. a ten and a king count as a pair.
    pub fn is_pair(&self) -> bool {
        let cards = self.hand.cards();
        cards.len() == 2 && cards[0].value() == cards[1].value()
    }

    /// A two card 21 pays as blackjack unless the hand came from splitting aces.
    /// 21s made after splitting any other pair still pay 3:2.
    pub fn is_blackjack(&self) -> bool {
        self.hand.is_blackjack() && (!self.from_split || !self.hand.cards()[0].is_ace())
    }

    /// Splits a pair. This hand keeps the first card and the returned hand starts with the second;
    /// both carry the original bet and are marked as coming from a split.
    /// Anything but a pair is left untouched and gives `None`.
    pub fn split(&mut self) -> Option<PlayerHand> {
        if !self.is_pair() {
            return None;
        }
        let second = self.hand.split_off_second();
        self.from_split = true;
        let mut new_hand = PlayerHand {
            hand: Hand::new(),
            bet: self.bet,
            from_split: true,
            settled: false,
            owner: self.owner,
        };
        new_hand.add(second);
        Some(new_hand)
    }
}

impl Display for PlayerHand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, bet {}", self.hand.describe(self.is_blackjack()), self.bet)
    }
}
