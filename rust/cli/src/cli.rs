//! Command-line argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use kalooki_engine::seat::{Difficulty, Seat};

#[derive(Parser, Debug)]
#[command(name = "kalooki", version, about = "Kalooki rummy engine CLI")]
pub struct KalookiCli {
    /// Log engine and bot decisions at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play at the bottom seat against three bots, or watch four bots
    Play {
        #[arg(long, value_enum, default_value_t = Vs::Human)]
        vs: Vs,
        #[arg(long)]
        hands: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        /// Bot difficulty: easy, medium or hard
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    /// Play bot-only hands and write them as JSONL hand histories
    Sim {
        #[arg(long)]
        hands: u64,
        /// Output path; a `.zst` suffix compresses the file
        #[arg(long)]
        output: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Turns after which an undecided hand is abandoned
        #[arg(long)]
        max_turns: Option<usize>,
    },
    /// Re-deal recorded hands and print what happened
    Replay {
        #[arg(long)]
        input: String,
        /// Hide deck draws as this seat would
        #[arg(long)]
        viewer: Option<Seat>,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Check that every recorded hand replays legally and conserves cards
    Verify {
        #[arg(long)]
        input: String,
    },
    /// Summarize wins, eliminations and hand lengths
    Stats {
        #[arg(long)]
        input: String,
    },
    /// Deal one hand and show all four hands
    Deal {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}

/// Who sits with the bots in `play`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Vs {
    /// You take the bottom seat and enter moves on stdin.
    Human,
    /// All four seats are bots; the hand is narrated.
    Bots,
}

impl Vs {
    /// ```
    /// # use kalooki_cli::Vs;
    /// assert_eq!(Vs::Bots.as_str(), "bots");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Vs::Human => "human",
            Vs::Bots => "bots",
        }
    }
}
