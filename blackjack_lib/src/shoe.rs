use crate::card::{Card, CARDS_PER_DECK};
use crate::BlackjackGameError;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The fewest decks a shoe may be built from.
pub const MIN_DECKS: usize = 6;

/// A multi-deck shoe. Cards are dealt front to back from a shuffled pool, and the shoe
/// flags itself for reshuffling once fewer than `shuffle_mark` cards remain.
#[derive(Debug)]
pub struct Shoe {
    num_decks: usize,
    cards: Vec<&'static Card>,
    next_card: usize,
    shuffle_mark: usize,
    rng: ChaCha8Rng,
}

impl Shoe {
    /// Builds and shuffles a shoe of `num_decks` decks seeded from system entropy.
    pub fn new(num_decks: usize) -> Result<Shoe, BlackjackGameError> {
        Shoe::build(num_decks, ChaCha8Rng::from_entropy())
    }

    /// Builds and shuffles a shoe whose whole card sequence is determined by `seed`.
    pub fn with_seed(num_decks: usize, seed: u64) -> Result<Shoe, BlackjackGameError> {
        Shoe::build(num_decks, ChaCha8Rng::seed_from_u64(seed))
    }

    fn build(num_decks: usize, rng: ChaCha8Rng) -> Result<Shoe, BlackjackGameError> {
        if num_decks < MIN_DECKS {
            return Err(BlackjackGameError::TooFewDecks {
                requested: num_decks,
                minimum: MIN_DECKS,
            });
        }
        let cards = (0..num_decks).flat_map(|_| Card::deck()).collect();
        let mut shoe = Shoe {
            num_decks,
            cards,
            next_card: 0,
            shuffle_mark: 0,
            rng,
        };
        shoe.shuffle();
        Ok(shoe)
    }

    /// Shuffles the entire pool in place, rewinds the shoe and picks a new reshuffle threshold
    /// somewhere between two and three decks remaining.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
        self.next_card = 0;
        self.shuffle_mark = 2 * CARDS_PER_DECK + self.rng.gen_range(0..CARDS_PER_DECK);
        log::debug!(
            "shuffled {} decks, reshuffle below {} cards",
            self.num_decks,
            self.shuffle_mark
        );
    }

    /// Advisory flag, the table honours it only between rounds.
    pub fn needs_shuffle(&self) -> bool {
        self.cards_left() < self.shuffle_mark
    }

    pub fn cards_left(&self) -> usize {
        self.cards.len() - self.next_card
    }

    pub fn is_empty(&self) -> bool {
        self.next_card == self.cards.len()
    }

    pub fn num_decks(&self) -> usize {
        self.num_decks
    }

    /// Total number of cards in the shoe, dealt or not.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn shuffle_mark(&self) -> usize {
        self.shuffle_mark
    }

    /// Returns the next card, or `None` once every card has been dealt.
    pub fn next_card(&mut self) -> Option<&'static Card> {
        let card = self.cards.get(self.next_card).copied()?;
        self.next_card += 1;
        Some(card)
    }

    /// Like `next_card`, but treats an empty shoe as a fatal error for the current round.
    pub fn draw(&mut self) -> Result<&'static Card, BlackjackGameError> {
        let card = self.next_card().ok_or(BlackjackGameError::ShoeExhausted {
            dealt: self.next_card,
        })?;
        log::trace!("dealt {}", card);
        Ok(card)
    }

    /// Rearranges the undealt cards so that `cards` come out next, in order.
    /// Cards are swapped rather than inserted, so the shoe still holds every card `num_decks` times.
    #[cfg(test)]
    pub(crate) fn stack(&mut self, cards: &[&'static Card]) {
        for (offset, card) in cards.iter().enumerate() {
            let target = self.next_card + offset;
            let found = (target..self.cards.len())
                .find(|&i| std::ptr::eq(self.cards[i], *card))
                .expect("card to stack is no longer in the shoe");
            self.cards.swap(target, found);
        }
    }

    /// Discards undealt cards until only `remaining` are left and drops the reshuffle mark to
    /// a single card, so the next round is dealt from what is left.
    #[cfg(test)]
    pub(crate) fn burn_to(&mut self, remaining: usize) {
        self.next_card = self.cards.len() - remaining;
        self.shuffle_mark = 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::card::{Rank, Suit};
    use std::collections::HashMap;

    fn count_remaining(shoe: &mut Shoe) -> HashMap<usize, usize> {
        let mut counts = HashMap::new();
        while let Some(card) = shoe.next_card() {
            *counts.entry(card.id()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_too_few_decks() {
        assert_eq!(
            Shoe::new(5).unwrap_err(),
            BlackjackGameError::TooFewDecks {
                requested: 5,
                minimum: 6
            }
        );
        assert!(Shoe::new(6).is_ok());
    }

    #[test]
    fn test_shoe_conservation() {
        for num_decks in [6, 8] {
            let mut shoe = Shoe::with_seed(num_decks, 7).unwrap();
            for _ in 0..3 {
                assert_eq!(shoe.cards_left(), num_decks * CARDS_PER_DECK);
                let counts = count_remaining(&mut shoe);
                assert_eq!(counts.len(), CARDS_PER_DECK);
                assert!(counts.values().all(|&c| c == num_decks));
                assert!(shoe.is_empty());
                shoe.shuffle();
            }
        }
    }

    #[test]
    fn test_shuffle_mark_range() {
        let mut shoe = Shoe::with_seed(8, 11).unwrap();
        for _ in 0..500 {
            assert!(shoe.shuffle_mark() >= 104 && shoe.shuffle_mark() < 156);
            shoe.shuffle();
        }
    }

    #[test]
    fn test_needs_shuffle_threshold() {
        let mut shoe = Shoe::with_seed(8, 3).unwrap();
        let mark = shoe.shuffle_mark();
        assert!(!shoe.needs_shuffle());
        while shoe.cards_left() > mark {
            shoe.next_card();
            assert!(!shoe.needs_shuffle());
        }
        // exactly at the mark is not below it
        assert_eq!(shoe.cards_left(), mark);
        assert!(!shoe.needs_shuffle());
        shoe.next_card();
        assert!(shoe.needs_shuffle());
        shoe.shuffle();
        assert!(!shoe.needs_shuffle());
    }

    #[test]
    fn test_draw_exhausted() {
        let mut shoe = Shoe::with_seed(6, 1).unwrap();
        shoe.burn_to(1);
        assert!(shoe.draw().is_ok());
        assert_eq!(shoe.next_card(), None);
        assert_eq!(
            shoe.draw(),
            Err(BlackjackGameError::ShoeExhausted { dealt: 312 })
        );
    }

    #[test]
    fn test_seeded_shoes_match() {
        let mut a = Shoe::with_seed(6, 42).unwrap();
        let mut b = Shoe::with_seed(6, 42).unwrap();
        for _ in 0..50 {
            assert!(std::ptr::eq(a.next_card().unwrap(), b.next_card().unwrap()));
        }
    }

    #[test]
    fn test_stack_preserves_conservation() {
        let mut shoe = Shoe::with_seed(6, 5).unwrap();
        let ace = Card::get(Rank::Ace, Suit::Spades);
        let king = Card::get(Rank::King, Suit::Hearts);
        shoe.stack(&[ace, king, ace]);
        assert!(std::ptr::eq(shoe.next_card().unwrap(), ace));
        assert!(std::ptr::eq(shoe.next_card().unwrap(), king));
        assert!(std::ptr::eq(shoe.next_card().unwrap(), ace));
        shoe.shuffle();
        let counts = count_remaining(&mut shoe);
        assert!(counts.values().all(|&c| c == 6));
    }
}
