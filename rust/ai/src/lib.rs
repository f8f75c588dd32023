//! # kalooki-ai: Bot Players for Kalooki
//!
//! Automated seats for the Kalooki rule engine. A bot reads a snapshot of the
//! hand, decides where to draw from, then plans the rest of its turn (melds,
//! goers and a discard) which the driver applies through the session.
//!
//! ## Core Components
//!
//! - [`BotPlayer`] - Trait every bot implements
//! - [`strategy`] - Heuristic bot with easy/medium/hard tiers
//! - [`candidates`] - Meld search over a hand
//! - [`driver`] - Plays one full bot turn against a [`Session`]
//! - [`create_bot`] - Factory by difficulty name
//!
//! ## Quick Start
//!
//! ```rust
//! use kalooki_ai::{create_bot, driver::play_bot_turn};
//! use kalooki_engine::config::RuleConfig;
//! use kalooki_engine::seat::{Difficulty, SeatKind};
//! use kalooki_engine::session::Session;
//!
//! let mut session = Session::with_seed(RuleConfig::default(), [SeatKind::Bot(Difficulty::Medium); 4], 42);
//! session.deal_initial_hands().unwrap();
//!
//! let bot = create_bot("medium").unwrap();
//! play_bot_turn(&mut session, bot.as_ref()).unwrap();
//! // At least a draw and a discard were recorded.
//! assert!(session.actions().len() >= 2);
//! ```

use kalooki_engine::cards::CardId;
use kalooki_engine::errors::GameError;
use kalooki_engine::events::DrawSource;
use kalooki_engine::game::HandState;
use kalooki_engine::melds::GroupId;
use kalooki_engine::seat::{Difficulty, Seat};
use kalooki_engine::session::Session;
use thiserror::Error;

pub mod candidates;
pub mod driver;
pub mod strategy;

/// Read-only view a bot decides from.
#[derive(Debug, Clone, Copy)]
pub struct BotContext<'a> {
    pub state: &'a HandState,
    pub seat: Seat,
    /// Seed of the current deal; randomized tiers derive their RNG from it.
    pub seed: u64,
}

impl<'a> BotContext<'a> {
    pub fn new(state: &'a HandState, seat: Seat, seed: u64) -> Self {
        Self { state, seat, seed }
    }

    /// Context for the seat whose turn it is in `session`.
    pub fn for_session(session: &'a Session) -> Option<Self> {
        let state = session.state()?;
        Some(Self::new(state, state.current_seat(), session.hand_seed()))
    }
}

/// A card a bot wants to add to an existing group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoerPlacement {
    pub card: CardId,
    pub target_seat: Seat,
    pub group: GroupId,
}

/// Everything a bot does after drawing, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnPlan {
    pub melds: Vec<Vec<CardId>>,
    pub goers: Vec<GoerPlacement>,
    /// `None` when the plan empties the hand by melding.
    pub discard: Option<CardId>,
}

/// Trait implemented by every automated seat.
///
/// # Example Implementation
///
/// ```rust
/// use kalooki_ai::{BotContext, BotPlayer, TurnPlan};
/// use kalooki_engine::events::DrawSource;
///
/// struct DeckOnly;
///
/// impl BotPlayer for DeckOnly {
///     fn choose_draw(&self, _ctx: &BotContext<'_>) -> DrawSource {
///         DrawSource::Deck
///     }
///
///     fn plan_turn(&self, ctx: &BotContext<'_>) -> TurnPlan {
///         let legal = ctx.state.legal_actions(ctx.seat);
///         TurnPlan {
///             discard: legal.discardable.first().copied(),
///             ..TurnPlan::default()
///         }
///     }
///
///     fn name(&self) -> &str {
///         "DeckOnly"
///     }
/// }
/// ```
pub trait BotPlayer: Send + Sync {
    /// Where to draw from at the start of the turn.
    fn choose_draw(&self, ctx: &BotContext<'_>) -> DrawSource;

    /// Melds, goers and discard for the rest of the turn. Called after the draw.
    fn plan_turn(&self, ctx: &BotContext<'_>) -> TurnPlan;

    fn name(&self) -> &str;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BotError {
    #[error("Unknown bot type: {0}")]
    UnknownBot(String),
    #[error("No hand in progress")]
    NoHand,
    #[error("Engine rejected {action} from {seat}: {source}")]
    Rejected {
        seat: Seat,
        action: &'static str,
        #[source]
        source: GameError,
    },
    #[error("{0} has no legal discard")]
    NoLegalDiscard(Seat),
}

/// Creates a bot by difficulty name (`easy`, `medium` or `hard`).
///
/// ```rust
/// use kalooki_ai::create_bot;
///
/// let bot = create_bot("hard").unwrap();
/// assert_eq!(bot.name(), "HardBot");
/// assert!(create_bot("grandmaster").is_err());
/// ```
pub fn create_bot(kind: &str) -> Result<Box<dyn BotPlayer>, BotError> {
    let difficulty: Difficulty = kind.parse().map_err(|_| BotError::UnknownBot(kind.to_string()))?;
    Ok(bot_for(difficulty))
}

pub fn bot_for(difficulty: Difficulty) -> Box<dyn BotPlayer> {
    Box::new(strategy::StrategyBot::new(difficulty))
}
