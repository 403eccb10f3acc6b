use crate::BlackjackGameError;
use serde::Serialize;
use std::fmt::Display;

pub const CARD_SUITS: usize = 4;
pub const CARD_RANKS: usize = 13;
pub const CARDS_PER_DECK: usize = 52;

/// The four suits, in the order used to build card ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; CARD_SUITS] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    fn symbol(&self) -> &'static str {
        match self {
            Suit::Clubs => "C",
            Suit::Diamonds => "D",
            Suit::Hearts => "H",
            Suit::Spades => "S",
        }
    }
}

/// The thirteen ranks. Aces come first so that a rank's index plus one is its hard value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; CARD_RANKS] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// The blackjack value of the rank, aces count as 1 and face cards as 10.
    pub fn value(&self) -> u32 {
        match self {
            Rank::Jack | Rank::Queen | Rank::King => 10,
            r => (*r as u32) + 1,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

/// An immutable playing card. Exactly one instance exists per rank and suit,
/// obtained through `Card::get` or `Card::from_id`.
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Card {
    rank: Rank,
    suit: Suit,
    id: u8,
}

static ALL_CARDS: [Card; CARDS_PER_DECK] = build_deck();

/// Card `id` has rank `id % 13` and suit `id / 13`.
const fn build_deck() -> [Card; CARDS_PER_DECK] {
    const BLANK: Card = Card {
        rank: Rank::Ace,
        suit: Suit::Clubs,
        id: 0,
    };
    let mut cards = [BLANK; CARDS_PER_DECK];
    let mut id = 0;
    while id < CARDS_PER_DECK {
        cards[id] = Card {
            rank: Rank::ALL[id % CARD_RANKS],
            suit: Suit::ALL[id / CARD_RANKS],
            id: id as u8,
        };
        id += 1;
    }
    cards
}

impl Card {
    /// Returns the shared instance for `rank` of `suit`.
    pub fn get(rank: Rank, suit: Suit) -> &'static Card {
        &ALL_CARDS[(suit as usize) * CARD_RANKS + (rank as usize)]
    }

    /// Returns the shared instance with identifier `id`, which must lie in `[0, 52)`.
    pub fn from_id(id: usize) -> Result<&'static Card, BlackjackGameError> {
        ALL_CARDS
            .get(id)
            .ok_or(BlackjackGameError::InvalidCardId(id))
    }

    /// Iterator over one full deck, in id order.
    pub fn deck() -> impl Iterator<Item = &'static Card> {
        ALL_CARDS.iter()
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    /// Numeric value of the card. Aces are always reported as 1, callers decide on soft values.
    pub fn value(&self) -> u32 {
        self.rank.value()
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }

    pub fn id(&self) -> usize {
        self.id as usize
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}
