use crate::hand::PlayerHand;
use crate::observer::{ObserverList, PlayerObserver};
use crate::strategy::PlayerStrategy;
use crate::{BlackjackGameError, Chips};
use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_PLAYER_ID: AtomicUsize = AtomicUsize::new(0);

/// Process unique identifier of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(usize);

impl PlayerId {
    pub(crate) fn next() -> PlayerId {
        PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bankroll a player starts with unless told otherwise.
pub const DEFAULT_BANKROLL: Chips = 500;

/// A player at a table. The strategy decides every bet and action; the player only holds
/// money and the hands wagered on during the current round.
pub struct Player {
    id: PlayerId,
    name: String,
    strategy: Box<dyn PlayerStrategy>,
    bankroll: Chips,
    pub(crate) hands: Vec<PlayerHand>,
    pub(crate) insurance: Chips,
    observers: ObserverList<dyn PlayerObserver>,
}

impl Player {
    /// Associated function to create a new `Player` named after its id, with the default bankroll.
    pub fn new(strategy: Box<dyn PlayerStrategy>) -> Player {
        let id = PlayerId::next();
        Player {
            id,
            name: format!("Player {}", id),
            strategy,
            bankroll: DEFAULT_BANKROLL,
            hands: Vec::new(),
            insurance: 0,
            observers: ObserverList::new(),
        }
    }

    /// Creates a named player with the given starting bankroll.
    pub fn with_bankroll(
        name: &str,
        strategy: Box<dyn PlayerStrategy>,
        bankroll: Chips,
    ) -> Result<Player, BlackjackGameError> {
        let mut player = Player::new(strategy);
        player.name = name.to_string();
        player.set_bankroll(bankroll)?;
        Ok(player)
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bankroll(&self) -> Chips {
        self.bankroll
    }

    /// Replaces the bankroll, returning the previous one. Negative bankrolls are rejected.
    pub fn set_bankroll(&mut self, bankroll: Chips) -> Result<Chips, BlackjackGameError> {
        if bankroll < 0 {
            return Err(BlackjackGameError::NegativeBankroll(bankroll));
        }
        Ok(std::mem::replace(&mut self.bankroll, bankroll))
    }

    pub(crate) fn adjust_bankroll(&mut self, amount: Chips) {
        self.bankroll += amount;
    }

    pub fn strategy(&self) -> &dyn PlayerStrategy {
        self.strategy.as_ref()
    }

    pub(crate) fn strategy_mut(&mut self) -> &mut dyn PlayerStrategy {
        self.strategy.as_mut()
    }

    /// Swaps in a new strategy and hands back the old one.
    pub fn set_strategy(&mut self, strategy: Box<dyn PlayerStrategy>) -> Box<dyn PlayerStrategy> {
        std::mem::replace(&mut self.strategy, strategy)
    }

    /// The hands wagered on in the current round, in the order they are played.
    pub fn hands(&self) -> &[PlayerHand] {
        &self.hands
    }

    /// Insurance staked in the current round.
    pub fn insurance(&self) -> Chips {
        self.insurance
    }

    /// Whether the player placed a bet this round.
    pub fn is_active(&self) -> bool {
        !self.hands.is_empty()
    }

    pub fn observers(&self) -> &ObserverList<dyn PlayerObserver> {
        &self.observers
    }

    pub fn observers_mut(&mut self) -> &mut ObserverList<dyn PlayerObserver> {
        &mut self.observers
    }

    pub(crate) fn clear_round(&mut self) {
        self.hands.clear();
        self.insurance = 0;
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("strategy", &self.strategy.label())
            .field("bankroll", &self.bankroll)
            .field("hands", &self.hands)
            .field("insurance", &self.insurance)
            .finish()
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<21}{}\n{:<21}{}\n{:<21}{}",
            "player:",
            self.name,
            "strategy:",
            self.strategy.label(),
            "bankroll:",
            self.bankroll,
        )
    }
}
