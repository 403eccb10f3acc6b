//! Observers that turn table events into win/loss statistics, and the summary built from them.

use blackjack_lib::{Chips, PlayerEvent, PlayerObserver, TableEvent, TableObserver};
use serde::Serialize;
use std::fmt::Display;

const WIDTH: usize = 80;
const TEXT_WIDTH: usize = "longest losing streak".len() + 20;
const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;

/// Counts of how bets were resolved and the money that changed hands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WinLossStats {
    pub rounds: u64,
    pub wins: u64,
    /// Includes busted hands.
    pub losses: u64,
    pub blackjacks: u64,
    pub pushes: u64,
    pub insurance_wins: u64,
    pub insurance_losses: u64,
    pub net_gain: Chips,
}

impl WinLossStats {
    /// Hands resolved, not counting insurance.
    pub fn hands(&self) -> u64 {
        self.wins + self.losses + self.blackjacks + self.pushes
    }

    fn record(&mut self, event: &PlayerEvent<'_>) {
        match *event {
            PlayerEvent::Wins { amount, .. } => {
                self.wins += 1;
                self.net_gain += amount;
            }
            PlayerEvent::Blackjack { amount, .. } => {
                self.blackjacks += 1;
                self.net_gain += amount;
            }
            PlayerEvent::Loses { amount, .. } | PlayerEvent::Busts { amount, .. } => {
                self.losses += 1;
                self.net_gain -= amount;
            }
            PlayerEvent::Push { .. } => self.pushes += 1,
            PlayerEvent::WinsInsurance { amount, .. } => {
                self.insurance_wins += 1;
                self.net_gain += amount;
            }
            PlayerEvent::LosesInsurance { amount, .. } => {
                self.insurance_losses += 1;
                self.net_gain -= amount;
            }
            _ => {}
        }
    }
}

impl Display for WinLossStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hands = self.hands().max(1) as f64;
        write!(
            f,
            "{:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.3}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n",
            "rounds",
            self.rounds,
            "hands won",
            self.wins,
            "hands lost",
            self.losses,
            "blackjacks",
            self.blackjacks,
            "hands pushed",
            self.pushes,
            "insurance won",
            self.insurance_wins,
            "insurance lost",
            self.insurance_losses,
            "win percentage",
            (self.wins + self.blackjacks) as f64 / hands,
            "net gain",
            self.net_gain,
            "average gain per hand",
            self.net_gain as f64 / hands,
        )
    }
}

/// Table wide statistics over every seated player.
#[derive(Debug, Default)]
pub struct WinLossTableObserver {
    stats: WinLossStats,
}

impl WinLossTableObserver {
    pub fn new() -> WinLossTableObserver {
        WinLossTableObserver::default()
    }

    pub fn stats(&self) -> WinLossStats {
        self.stats
    }
}

impl TableObserver for WinLossTableObserver {
    fn on_event(&mut self, event: &TableEvent<'_>) {
        match event {
            TableEvent::NewRound { .. } => self.stats.rounds += 1,
            TableEvent::Player { event, .. } => self.stats.record(event),
            _ => {}
        }
    }
}

/// Statistics of one player, including streaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    #[serde(flatten)]
    pub totals: WinLossStats,
    pub longest_win_streak: u64,
    pub longest_loss_streak: u64,
}

/// Per player statistics. Rounds sat out do not count.
#[derive(Debug, Default)]
pub struct WinLossPlayerObserver {
    stats: PlayerStats,
    // positive while winning, negative while losing
    streak: i64,
}

impl WinLossPlayerObserver {
    pub fn new() -> WinLossPlayerObserver {
        WinLossPlayerObserver::default()
    }

    pub fn stats(&self) -> PlayerStats {
        self.stats
    }

    fn won(&mut self) {
        self.streak = if self.streak > 0 { self.streak + 1 } else { 1 };
        self.stats.longest_win_streak = self.stats.longest_win_streak.max(self.streak as u64);
    }

    fn lost(&mut self) {
        self.streak = if self.streak < 0 { self.streak - 1 } else { -1 };
        self.stats.longest_loss_streak = self
            .stats
            .longest_loss_streak
            .max(self.streak.unsigned_abs());
    }
}

impl PlayerObserver for WinLossPlayerObserver {
    fn on_event(&mut self, event: &PlayerEvent<'_>) {
        self.stats.totals.record(event);
        match event {
            PlayerEvent::Bets { amount, .. } if *amount > 0 => self.stats.totals.rounds += 1,
            PlayerEvent::Wins { .. } | PlayerEvent::Blackjack { .. } => self.won(),
            PlayerEvent::Loses { .. } | PlayerEvent::Busts { .. } => self.lost(),
            PlayerEvent::Push { .. } => self.streak = 0,
            _ => {}
        }
    }
}

/// Narrates every table event through the `log` facade at info level.
#[derive(Debug, Default)]
pub struct LogTableObserver;

impl TableObserver for LogTableObserver {
    fn on_event(&mut self, event: &TableEvent<'_>) {
        match event {
            TableEvent::NewRound { players } => log::info!("new round with {} players", players.len()),
            TableEvent::ShoeShuffled => log::info!("shoe shuffled"),
            TableEvent::DealerUpCard { card } => log::info!("dealer shows {}", card),
            TableEvent::DealerDownCard { card, hand } => {
                log::info!("dealer turns over {}: {}", card, hand)
            }
            TableEvent::DealerBlackjack { hand } => log::info!("dealer has blackjack: {}", hand),
            TableEvent::DealerDraws { card, hand } => log::info!("dealer draws {}: {}", card, hand),
            TableEvent::DealerStands { hand } => log::info!("dealer stands: {}", hand),
            TableEvent::DealerBusts { hand } => log::info!("dealer busts: {}", hand),
            TableEvent::Player { player, event } => {
                let name = player.name();
                match event {
                    PlayerEvent::Joins { table } => log::info!("{} joins {}", name, table.name()),
                    PlayerEvent::Leaves { table } => log::info!("{} leaves {}", name, table.name()),
                    PlayerEvent::Bets { amount, bankroll } => {
                        log::info!("{} bets {} (bankroll {})", name, amount, bankroll)
                    }
                    PlayerEvent::Insures { amount, bankroll } => {
                        log::info!("{} insures for {} (bankroll {})", name, amount, bankroll)
                    }
                    PlayerEvent::Dealt { hand } => log::info!("{} is dealt {}", name, hand),
                    PlayerEvent::Draws { card, hand } => {
                        log::info!("{} draws {}: {}", name, card, hand)
                    }
                    PlayerEvent::Stands { hand } => log::info!("{} stands: {}", name, hand),
                    PlayerEvent::Busts {
                        hand,
                        amount,
                        bankroll,
                    } => log::info!("{} busts {}, loses {} ({})", name, hand, amount, bankroll),
                    PlayerEvent::Splits { hand } => log::info!("{} splits: {}", name, hand),
                    PlayerEvent::DoublesDown { card, hand } => {
                        log::info!("{} doubles down, draws {}: {}", name, card, hand)
                    }
                    PlayerEvent::Wins {
                        hand,
                        amount,
                        bankroll,
                    } => log::info!("{} wins {} with {} ({})", name, amount, hand, bankroll),
                    PlayerEvent::Loses {
                        hand,
                        amount,
                        bankroll,
                    } => log::info!("{} loses {} with {} ({})", name, amount, hand, bankroll),
                    PlayerEvent::Blackjack {
                        hand,
                        amount,
                        bankroll,
                    } => log::info!("{} wins {} with {} ({})", name, amount, hand, bankroll),
                    PlayerEvent::Push { hand, bankroll } => {
                        log::info!("{} pushes with {} ({})", name, hand, bankroll)
                    }
                    PlayerEvent::WinsInsurance { amount, bankroll } => {
                        log::info!("{} wins {} on insurance ({})", name, amount, bankroll)
                    }
                    PlayerEvent::LosesInsurance { amount, bankroll } => {
                        log::info!("{} loses {} on insurance ({})", name, amount, bankroll)
                    }
                }
            }
        }
    }
}

/// Outcome of one player over a whole simulation.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub name: String,
    pub strategy: String,
    pub starting_bankroll: Chips,
    pub final_bankroll: Chips,
    pub stats: PlayerStats,
}

impl Display for PlayerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {}\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
            {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n",
            "strategy",
            self.strategy,
            "starting bankroll",
            self.starting_bankroll,
            "final bankroll",
            self.final_bankroll,
            self.stats.totals,
            "longest winning streak",
            self.stats.longest_win_streak,
            "longest losing streak",
            self.stats.longest_loss_streak,
        )
    }
}

/// Simple struct for recording all of the interesting data points accumulated during a simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub table: String,
    pub rounds_requested: u64,
    pub rounds_played: u64,
    pub table_stats: WinLossStats,
    pub players: Vec<PlayerSummary>,
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = format!(" {} ", self.table);
        writeln!(f, "{:=^WIDTH$}", title)?;
        writeln!(
            f,
            "{:<TEXT_WIDTH$}{:>NUM_WIDTH$}",
            "rounds played", self.rounds_played
        )?;
        write!(f, "{}", self.table_stats)?;
        for player in self.players.iter() {
            let header = format!(" {} ", player.name);
            writeln!(f, "{:-^WIDTH$}", header)?;
            write!(f, "{}", player)?;
        }
        write!(f, "{}", "=".repeat(WIDTH))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use blackjack_lib::{Card, PlayerHand, PlayerStrategy, Player, Rank, Suit};

    struct Idle;

    impl PlayerStrategy for Idle {
        fn action(&self, _hand: &PlayerHand, _dealer_card: &Card) -> Option<blackjack_lib::PlayerAction> {
            None
        }

        fn bet(&self, _bankroll: Chips) -> Chips {
            0
        }
    }

    fn hand() -> PlayerHand {
        let mut hand = PlayerHand::new(10, Player::new(Box::new(Idle)).id());
        hand.add(Card::get(Rank::Ten, Suit::Clubs));
        hand.add(Card::get(Rank::Nine, Suit::Clubs));
        hand
    }

    #[test]
    fn test_player_streaks() {
        let hand = hand();
        let mut observer = WinLossPlayerObserver::new();
        let events = [
            PlayerEvent::Bets { amount: 10, bankroll: 100 },
            PlayerEvent::Wins { hand: &hand, amount: 10, bankroll: 110 },
            PlayerEvent::Bets { amount: 10, bankroll: 110 },
            PlayerEvent::Blackjack { hand: &hand, amount: 15, bankroll: 125 },
            PlayerEvent::Bets { amount: 10, bankroll: 125 },
            PlayerEvent::Insures { amount: 5, bankroll: 125 },
            PlayerEvent::LosesInsurance { amount: 5, bankroll: 120 },
            PlayerEvent::Wins { hand: &hand, amount: 10, bankroll: 130 },
            PlayerEvent::Bets { amount: 10, bankroll: 130 },
            PlayerEvent::Push { hand: &hand, bankroll: 130 },
            PlayerEvent::Bets { amount: 10, bankroll: 130 },
            PlayerEvent::Loses { hand: &hand, amount: 10, bankroll: 120 },
            PlayerEvent::Bets { amount: 10, bankroll: 120 },
            PlayerEvent::Busts { hand: &hand, amount: 10, bankroll: 110 },
        ];
        for event in events.iter() {
            observer.on_event(event);
        }

        let stats = observer.stats();
        assert_eq!(stats.totals.rounds, 6);
        assert_eq!(stats.totals.wins, 2);
        assert_eq!(stats.totals.blackjacks, 1);
        assert_eq!(stats.totals.losses, 2);
        assert_eq!(stats.totals.pushes, 1);
        assert_eq!(stats.totals.insurance_losses, 1);
        assert_eq!(stats.totals.net_gain, 10);
        assert_eq!(stats.longest_win_streak, 3);
        assert_eq!(stats.longest_loss_streak, 2);
    }

    #[test]
    fn test_table_observer_counts_rounds() {
        let hand = hand();
        let player = Player::new(Box::new(Idle));
        let mut observer = WinLossTableObserver::new();
        observer.on_event(&TableEvent::NewRound { players: &[] });
        observer.on_event(&TableEvent::ShoeShuffled);
        observer.on_event(&TableEvent::Player {
            player: &player,
            event: PlayerEvent::Wins { hand: &hand, amount: 10, bankroll: 510 },
        });
        observer.on_event(&TableEvent::Player {
            player: &player,
            event: PlayerEvent::WinsInsurance { amount: 10, bankroll: 520 },
        });
        observer.on_event(&TableEvent::NewRound { players: &[] });

        let stats = observer.stats();
        assert_eq!(stats.rounds, 2);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.insurance_wins, 1);
        assert_eq!(stats.net_gain, 20);
        assert_eq!(stats.hands(), 1);
    }

    #[test]
    fn test_summary_display() {
        let summary = SimulationSummary {
            table: String::from("Table1"),
            rounds_requested: 10,
            rounds_played: 10,
            table_stats: WinLossStats::default(),
            players: vec![PlayerSummary {
                name: String::from("Ann"),
                strategy: String::from("basic"),
                starting_bankroll: 100,
                final_bankroll: 90,
                stats: PlayerStats::default(),
            }],
        };
        let text = summary.to_string();
        assert!(text.starts_with(&format!("{:=^80}", " Table1 ")));
        assert!(text.contains(" Ann "));
        assert!(text
            .lines()
            .any(|line| line.starts_with("final bankroll") && line.ends_with("90")));
    }
}
