//! Event fan-out for tables and players.
//!
//! Observers are passive: they receive borrowed events in the order things happen at the
//! table and must not block. Lists can only be changed through `&mut Table` or `&mut Player`,
//! so nothing can subscribe or unsubscribe while a round is being played.

use crate::card::Card;
use crate::hand::{Hand, PlayerHand};
use crate::player::Player;
use crate::table::TableRules;
use crate::Chips;
use std::cell::RefCell;
use std::rc::Rc;

/// Something that happened to one player, with the resulting bankroll where money moved.
#[derive(Debug, Clone, Copy)]
pub enum PlayerEvent<'a> {
    Joins { table: &'a TableRules },
    Leaves { table: &'a TableRules },
    Bets { amount: Chips, bankroll: Chips },
    Insures { amount: Chips, bankroll: Chips },
    Dealt { hand: &'a PlayerHand },
    Draws { card: &'a Card, hand: &'a PlayerHand },
    Stands { hand: &'a PlayerHand },
    Busts { hand: &'a PlayerHand, amount: Chips, bankroll: Chips },
    Splits { hand: &'a PlayerHand },
    DoublesDown { card: &'a Card, hand: &'a PlayerHand },
    Wins { hand: &'a PlayerHand, amount: Chips, bankroll: Chips },
    Loses { hand: &'a PlayerHand, amount: Chips, bankroll: Chips },
    Blackjack { hand: &'a PlayerHand, amount: Chips, bankroll: Chips },
    Push { hand: &'a PlayerHand, bankroll: Chips },
    WinsInsurance { amount: Chips, bankroll: Chips },
    LosesInsurance { amount: Chips, bankroll: Chips },
}

/// Something that happened at the table.
#[derive(Debug, Clone, Copy)]
pub enum TableEvent<'a> {
    NewRound { players: &'a [Player] },
    ShoeShuffled,
    DealerUpCard { card: &'a Card },
    DealerDownCard { card: &'a Card, hand: &'a Hand },
    DealerBlackjack { hand: &'a Hand },
    DealerDraws { card: &'a Card, hand: &'a Hand },
    DealerStands { hand: &'a Hand },
    DealerBusts { hand: &'a Hand },
    Player { player: &'a Player, event: PlayerEvent<'a> },
}

pub trait TableObserver {
    fn on_event(&mut self, event: &TableEvent<'_>);
}

/// Observer attached to a single player.
pub trait PlayerObserver {
    fn on_event(&mut self, event: &PlayerEvent<'_>);
}

/// An ordered list of shared observer handles. The same handle is never held twice.
pub struct ObserverList<T: ?Sized> {
    observers: Vec<Rc<RefCell<T>>>,
}

impl<T: ?Sized> ObserverList<T> {
    pub fn new() -> Self {
        ObserverList {
            observers: Vec::new(),
        }
    }

    /// Adds `observer`, returning false if this exact handle is already registered.
    pub fn add(&mut self, observer: Rc<RefCell<T>>) -> bool {
        if self.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Removes `observer`, returning whether it was registered.
    pub fn remove(&mut self, observer: &Rc<RefCell<T>>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| !Rc::ptr_eq(o, observer));
        before != self.observers.len()
    }

    pub fn contains(&self, observer: &Rc<RefCell<T>>) -> bool {
        self.observers.iter().any(|o| Rc::ptr_eq(o, observer))
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    pub(crate) fn for_each<F: FnMut(&mut T)>(&self, mut f: F) {
        for observer in self.observers.iter() {
            f(&mut *observer.borrow_mut());
        }
    }
}

impl<T: ?Sized> Default for ObserverList<T> {
    fn default() -> Self {
        ObserverList::new()
    }
}

impl ObserverList<dyn TableObserver> {
    pub(crate) fn emit(&self, event: &TableEvent<'_>) {
        self.for_each(|o| o.on_event(event));
    }
}

impl ObserverList<dyn PlayerObserver> {
    pub(crate) fn emit(&self, event: &PlayerEvent<'_>) {
        self.for_each(|o| o.on_event(event));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct Counter {
        shuffles: usize,
    }

    impl TableObserver for Counter {
        fn on_event(&mut self, event: &TableEvent<'_>) {
            if let TableEvent::ShoeShuffled = event {
                self.shuffles += 1;
            }
        }
    }

    #[test]
    fn test_observer_list_dedup() {
        let counter = Rc::new(RefCell::new(Counter::default()));
        let handle: Rc<RefCell<dyn TableObserver>> = counter.clone();
        let mut list: ObserverList<dyn TableObserver> = ObserverList::new();
        assert!(list.add(handle.clone()));
        assert!(!list.add(handle.clone()));
        assert_eq!(list.len(), 1);

        list.emit(&TableEvent::ShoeShuffled);
        list.emit(&TableEvent::ShoeShuffled);
        assert_eq!(counter.borrow().shuffles, 2);

        assert!(list.remove(&handle));
        assert!(!list.remove(&handle));
        assert!(list.is_empty());
        list.emit(&TableEvent::ShoeShuffled);
        assert_eq!(counter.borrow().shuffles, 2);
    }
}
