//! # kalooki-engine: Kalooki Rule Engine Core
//!
//! A deterministic rule engine for four-seat Kalooki rummy: two decks plus
//! two jokers, sets and runs, the 40-point opening, goers, joker swaps and
//! elimination. Every shuffle comes from a seeded RNG so that any hand can be
//! replayed from its seed and action list.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card identity, faces, joker bindings and the 106-card deck
//! - [`deck`] - Seeded shuffling with ChaCha20 RNG and pack reshuffles
//! - [`seat`] - Table positions, clockwise order and seat kinds
//! - [`melds`] - Set/run validity, scoring and joker representation
//! - [`game`] - Per-hand state and dealing
//! - [`rules`] - The turn state machine: draw, meld, goers, take-back, discard
//! - [`jokers`] - Immediate and staged joker swaps
//! - [`elimination`] - Post-discard elimination checks
//! - [`session`] - Multi-hand orchestration, restart voting, seat views, replay
//! - [`events`] - State transition events
//! - [`logger`] - HandRecord serialization to JSONL
//! - [`config`] - Tunable table rules
//! - [`errors`] - Error types for illegal actions
//!
//! ## Quick Start
//!
//! ```rust
//! use kalooki_engine::config::RuleConfig;
//! use kalooki_engine::events::DrawSource;
//! use kalooki_engine::seat::SeatKind;
//! use kalooki_engine::session::Session;
//!
//! let mut session = Session::with_seed(RuleConfig::default(), [SeatKind::Human; 4], 42);
//! session.deal_initial_hands().unwrap();
//!
//! let seat = session.state().unwrap().current_seat();
//! session.draw_card(seat, DrawSource::Deck).unwrap();
//! assert_eq!(session.state().unwrap().hand(seat).len(), 14);
//! ```
//!
//! ## Meld Validation
//!
//! ```rust
//! use kalooki_engine::cards::{Card, CardId, Rank, Suit};
//! use kalooki_engine::melds::{classify, MeldKind};
//!
//! let run = [
//!     Card::natural(CardId(4), Rank::Five, Suit::Clubs),
//!     Card::joker(CardId(104)),
//!     Card::natural(CardId(6), Rank::Seven, Suit::Clubs),
//! ];
//! assert_eq!(classify(&run, false), Some(MeldKind::Run));
//! ```

pub mod cards;
pub mod config;
pub mod deck;
pub mod elimination;
pub mod errors;
pub mod events;
pub mod game;
pub mod jokers;
pub mod logger;
pub mod melds;
pub mod rules;
pub mod seat;
pub mod session;
