use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use serde::Serialize;
use uuid::Uuid;

use yaht_engine::analysis;
use yaht_engine::config::EngineConfig;
use yaht_engine::dice::{Faces, RngRoller, MAX_ROLLS};
use yaht_engine::game::{Match, MatchOutcome, TurnRecord};
use yaht_engine::patterns::AnchorMode;
use yaht_engine::player::Player;
use yaht_engine::scoring::Category;
use yaht_engine::turn::Situation;

/// YAHT - two-seat Yahtzee engine with a shared category ledger
#[derive(Parser, Debug)]
#[command(name = "yaht", version, about)]
struct Args {
    /// Engine config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// How Large Straight draws are recognised; overrides the config file
    #[arg(long, global = true, value_enum)]
    anchor_mode: Option<AnchorArg>,

    /// Log rule decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Let the computer play both seats
    Play {
        /// RNG seed for reproducible matches
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of matches to play
        #[arg(short, long, default_value_t = 1)]
        games: u32,

        /// Print turn records as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show what the engine would do with a roll
    Advise {
        /// Five dice, e.g. "2,2,3,4,5"
        #[arg(short, long)]
        dice: Faces,

        /// Which roll of the turn this is (1-3)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
        roll: u8,

        /// Open categories, comma separated; all when omitted
        #[arg(short, long, value_delimiter = ',')]
        open: Vec<Category>,

        /// Upper-section subtotal of the player deciding
        #[arg(short, long, default_value_t = 0)]
        upper: u16,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnchorArg {
    Literal,
    Generalized,
}

impl From<AnchorArg> for AnchorMode {
    fn from(arg: AnchorArg) -> Self {
        match arg {
            AnchorArg::Literal => AnchorMode::Literal,
            AnchorArg::Generalized => AnchorMode::Generalized,
        }
    }
}

#[derive(Serialize)]
struct MatchReport<'a> {
    game: u32,
    turns: &'a [TurnRecord],
    outcome: Option<MatchOutcome>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "yaht_cli=debug,yaht_engine=debug"
    } else {
        "yaht_cli=info,yaht_engine=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(mode) = args.anchor_mode {
        config.anchor_mode = mode.into();
    }

    match args.command {
        Command::Play { seed, games, json } => play(config, seed, games, json),
        Command::Advise {
            dice,
            roll,
            open,
            upper,
            json,
        } => advise(config, dice, roll, open, upper, json),
    }
}

fn play(config: EngineConfig, seed: Option<u64>, games: u32, json: bool) -> anyhow::Result<()> {
    let rng = match seed {
        Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
        None => rand::rngs::StdRng::from_entropy(),
    };
    let mut roller = RngRoller::new(rng);

    for n in 1..=games {
        let players = vec![
            Player::computer(Uuid::new_v4(), "Player 1".into()),
            Player::computer(Uuid::new_v4(), "Player 2".into()),
        ];
        let mut game = Match::new(players, config.clone())?;
        let first = game.toss_for_first_player(&mut roller)?;
        if let Some(p) = game.player(first) {
            tracing::info!(game = n, first = %p.name, "toss won");
        }
        let turns = game.play_to_end(&mut roller)?;

        if json {
            let report = MatchReport {
                game: n,
                turns: &turns,
                outcome: game.outcome(),
            };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_match(n, &game, &turns);
        }
    }
    Ok(())
}

fn print_match(n: u32, game: &Match, turns: &[TurnRecord]) {
    println!("== Game {n} ==");
    for t in turns {
        let rolls: Vec<String> = t.rolls.iter().map(|r| r.dice.to_string()).collect();
        println!(
            "R{} {:<9} {:<40} -> {} ({})",
            t.round,
            t.player_name,
            rolls.join(" "),
            t.category,
            t.score
        );
    }
    for p in &game.players {
        println!("{:<9} upper {:>3}  total {:>3}", p.name, p.scorecard.upper_subtotal(), p.scorecard.total());
    }
    match game.outcome() {
        Some(MatchOutcome::Winner { name, total, .. }) => println!("{name} wins with {total}"),
        Some(MatchOutcome::Tie { total }) => println!("Tie at {total}"),
        None => println!("Unfinished"),
    }
}

fn advise(
    config: EngineConfig,
    dice: Faces,
    roll: u8,
    open: Vec<Category>,
    upper: u16,
    json: bool,
) -> anyhow::Result<()> {
    let mut open = if open.is_empty() { Category::ALL.to_vec() } else { open };
    open.sort();
    open.dedup();
    let situation = Situation::new(dice, open, roll.min(MAX_ROLLS))
        .with_upper_section_score(upper)
        .with_anchor_mode(config.anchor_mode);
    let report = analysis::analyze_situation(&situation);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
