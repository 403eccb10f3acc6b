pub mod game;
pub mod stats;
pub mod write;

use blackjack_lib::{
    BlackjackGameError, Chips, Player, PlayerId, PlayerObserver, Table, TableObserver,
};
use game::dealer::HouseDealer;
pub use game::StrategyKind;
use serde::Deserialize;
use stats::{PlayerSummary, SimulationSummary, WinLossPlayerObserver, WinLossTableObserver};
use std::cell::RefCell;
use std::io::Read;
use std::rc::Rc;
use thiserror::Error;

pub mod prelude {
    pub use super::{
        game::prelude::*, stats::*, BlackjackSimulator, SimulationError, SimulatorConfig,
        SimulatorConfigBuilder,
    };
}

pub const DEFAULT_TABLE_NAME: &str = "Table1";
pub const DEFAULT_BANKROLL: Chips = 100_000;
pub const DEFAULT_MIN_BET: Chips = 20;
pub const DEFAULT_MAX_BET: Chips = 200;
pub const DEFAULT_MAX_PLAYERS: usize = 6;
pub const DEFAULT_DECKS: usize = 8;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Game(#[from] BlackjackGameError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unable to read or write: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything needed to set up and run a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub num_rounds: u64,
    pub player_names: Vec<String>,
    pub strategy: StrategyKind,
    pub bankroll: Chips,
    pub table_name: String,
    pub min_bet: Chips,
    pub max_bet: Chips,
    pub max_players: usize,
    pub num_decks: usize,
    pub hit_soft_seventeen: bool,
    pub seed: Option<u64>,
    pub verbose: bool,
}

impl SimulatorConfig {
    /// Associated function that returns a `SimulatorConfigBuilder`, the way to create a new config.
    pub fn new() -> SimulatorConfigBuilder {
        SimulatorConfigBuilder::default()
    }

    /// Checks what the table can not check itself.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.num_rounds == 0 {
            return Err(SimulationError::InvalidConfig(
                "number of rounds must be positive".to_string(),
            ));
        }
        if self.player_names.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "at least one player name is required".to_string(),
            ));
        }
        if let Some(name) = self.player_names.iter().find(|n| n.trim().is_empty()) {
            return Err(SimulationError::InvalidConfig(format!(
                "player name {:?} is blank",
                name
            )));
        }
        Ok(())
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig::new().build()
    }
}

/// Struct to implement builder pattern for `SimulatorConfig`. Can also be deserialized from a
/// JSON config file; fields missing from the file keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfigBuilder {
    num_rounds: Option<u64>,
    player_names: Option<Vec<String>>,
    strategy: Option<StrategyKind>,
    bankroll: Option<Chips>,
    table_name: Option<String>,
    min_bet: Option<Chips>,
    max_bet: Option<Chips>,
    max_players: Option<usize>,
    num_decks: Option<usize>,
    hit_soft_seventeen: Option<bool>,
    seed: Option<u64>,
    verbose: Option<bool>,
}

impl SimulatorConfigBuilder {
    /// Reads a builder from JSON, e.g. `{"num_rounds": 1000, "strategy": "true-count"}`.
    pub fn from_json<R: Read>(reader: R) -> Result<SimulatorConfigBuilder, SimulationError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn num_rounds(&mut self, num_rounds: u64) -> &mut Self {
        self.num_rounds = Some(num_rounds);
        self
    }

    pub fn player_names<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.player_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn strategy(&mut self, strategy: StrategyKind) -> &mut Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn bankroll(&mut self, bankroll: Chips) -> &mut Self {
        self.bankroll = Some(bankroll);
        self
    }

    pub fn table_name(&mut self, name: &str) -> &mut Self {
        self.table_name = Some(name.to_string());
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

    pub fn max_players(&mut self, max_players: usize) -> &mut Self {
        self.max_players = Some(max_players);
        self
    }

    pub fn num_decks(&mut self, num_decks: usize) -> &mut Self {
        self.num_decks = Some(num_decks);
        self
    }

    pub fn hit_soft_seventeen(&mut self, hit: bool) -> &mut Self {
        self.hit_soft_seventeen = Some(hit);
        self
    }

    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    pub fn verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn build(&mut self) -> SimulatorConfig {
        SimulatorConfig {
            num_rounds: self.num_rounds.unwrap_or(0),
            player_names: self.player_names.take().unwrap_or_default(),
            strategy: self.strategy.unwrap_or_default(),
            bankroll: self.bankroll.unwrap_or(DEFAULT_BANKROLL),
            table_name: self
                .table_name
                .take()
                .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            min_bet: self.min_bet.unwrap_or(DEFAULT_MIN_BET),
            max_bet: self.max_bet.unwrap_or(DEFAULT_MAX_BET),
            max_players: self.max_players.unwrap_or(DEFAULT_MAX_PLAYERS),
            num_decks: self.num_decks.unwrap_or(DEFAULT_DECKS),
            hit_soft_seventeen: self.hit_soft_seventeen.unwrap_or(true),
            seed: self.seed,
            verbose: self.verbose.unwrap_or(false),
        }
    }
}

/// Struct that wraps a table, its players and the statistics observers attached to them.
/// Its main purpose is convenience: build it from a `SimulatorConfig`, call `run` and read the summary.
pub struct BlackjackSimulator {
    config: SimulatorConfig,
    table: Table,
    table_stats: Rc<RefCell<WinLossTableObserver>>,
    player_stats: Vec<(PlayerId, Rc<RefCell<WinLossPlayerObserver>>)>,
}

impl BlackjackSimulator {
    /// Sets up the table and seats one player per configured name, each with the configured
    /// strategy and bankroll.
    pub fn new(config: SimulatorConfig) -> Result<BlackjackSimulator, SimulationError> {
        config.validate()?;

        let mut builder = Table::builder();
        builder
            .name(&config.table_name)
            .max_players(config.max_players)
            .min_bet(config.min_bet)
            .max_bet(config.max_bet)
            .num_decks(config.num_decks);
        if let Some(seed) = config.seed {
            builder.seed(seed);
        }
        let mut table = builder.build(Box::new(HouseDealer::new(config.hit_soft_seventeen)))?;

        let table_stats = Rc::new(RefCell::new(WinLossTableObserver::new()));
        table
            .observers_mut()
            .add(table_stats.clone() as Rc<RefCell<dyn TableObserver>>);
        if config.verbose {
            table
                .observers_mut()
                .add(Rc::new(RefCell::new(stats::LogTableObserver)));
        }

        let mut player_stats = Vec::with_capacity(config.player_names.len());
        for name in config.player_names.iter() {
            let strategy = config.strategy.player_strategy(config.num_decks);
            let mut player = Player::with_bankroll(name, strategy, config.bankroll)?;
            let observer = Rc::new(RefCell::new(WinLossPlayerObserver::new()));
            player
                .observers_mut()
                .add(observer.clone() as Rc<RefCell<dyn PlayerObserver>>);
            let id = table.add_player(player)?;
            player_stats.push((id, observer));
        }
        log::debug!(
            "seated {} players at {} playing {}",
            player_stats.len(),
            table.name(),
            config.strategy
        );

        Ok(BlackjackSimulator {
            config,
            table,
            table_stats,
            player_stats,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Plays the configured number of rounds and returns the summary.
    pub fn run(&mut self) -> Result<SimulationSummary, SimulationError> {
        log::info!(
            "simulating {} rounds at {}",
            self.config.num_rounds,
            self.table.name()
        );
        for _ in 0..self.config.num_rounds {
            self.table.play_round()?;
        }
        Ok(self.summary())
    }

    /// Statistics gathered so far.
    pub fn summary(&self) -> SimulationSummary {
        let players = self
            .player_stats
            .iter()
            .filter_map(|(id, observer)| {
                let player = self.table.player(*id)?;
                Some(PlayerSummary {
                    name: player.name().to_string(),
                    strategy: player.strategy().label(),
                    starting_bankroll: self.config.bankroll,
                    final_bankroll: player.bankroll(),
                    stats: observer.borrow().stats(),
                })
            })
            .collect();

        SimulationSummary {
            table: self.table.name().to_string(),
            rounds_requested: self.config.num_rounds,
            rounds_played: self.table.rounds_played(),
            table_stats: self.table_stats.borrow().stats(),
            players,
        }
    }
}
