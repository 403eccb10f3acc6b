use blackjack_sim::write::{self, OutputFormat};
use blackjack_sim::{BlackjackSimulator, SimulationError, SimulatorConfigBuilder, StrategyKind};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "blackjack_sim",
    about = "Simulate rounds of blackjack for a table of players sharing one strategy"
)]
struct Args {
    /// Number of rounds to play
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    num_rounds: Option<u64>,

    /// Comma separated player names, e.g. ann,bob
    #[arg(long, value_delimiter = ',')]
    player_names: Vec<String>,

    /// Strategy every player uses
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Narrate every table event
    #[arg(long)]
    verbose: bool,

    /// Seed for the shoe, makes a run reproducible
    #[arg(long)]
    seed: Option<u64>,

    /// Number of decks in the shoe (at least 6)
    #[arg(long)]
    decks: Option<usize>,

    /// Starting bankroll of every player
    #[arg(long)]
    bankroll: Option<i64>,

    /// Dealer hits soft 17
    #[arg(long, action = clap::ArgAction::Set)]
    hit_soft_17: Option<bool>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// JSON config file, flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn config_builder(&self) -> Result<SimulatorConfigBuilder, SimulationError> {
        let mut builder = match self.config {
            Some(ref path) => SimulatorConfigBuilder::from_json(BufReader::new(File::open(path)?))?,
            None => SimulatorConfigBuilder::default(),
        };
        if let Some(num_rounds) = self.num_rounds {
            builder.num_rounds(num_rounds);
        }
        if !self.player_names.is_empty() {
            builder.player_names(self.player_names.iter().map(|n| n.trim()));
        }
        if let Some(strategy) = self.strategy {
            builder.strategy(strategy);
        }
        if self.verbose {
            builder.verbose(true);
        }
        if let Some(seed) = self.seed {
            builder.seed(seed);
        }
        if let Some(decks) = self.decks {
            builder.num_decks(decks);
        }
        if let Some(bankroll) = self.bankroll {
            builder.bankroll(bankroll);
        }
        if let Some(hit) = self.hit_soft_17 {
            builder.hit_soft_seventeen(hit);
        }
        Ok(builder)
    }
}

fn run(args: &Args) -> Result<(), SimulationError> {
    let config = args.config_builder()?.build();
    let mut simulator = BlackjackSimulator::new(config)?;
    let summary = simulator.run()?;
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    write::write(&summary, format, std::io::stdout().lock())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
