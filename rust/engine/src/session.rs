use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cards::{Card, CardId};
use crate::config::RuleConfig;
use crate::errors::GameError;
use crate::events::{DrawSource, GameEvent, SwapMode};
use crate::game::{HandState, Phase};
use crate::jokers::PendingJokerSwap;
use crate::logger::{ActionRecord, HandRecord, HandResult};
use crate::melds::{GroupId, MeldGroup};
use crate::rules::LegalActions;
use crate::seat::{Seat, SeatKind};

/// A move proposed by a seat. Every accepted action is recorded, so a hand
/// can be replayed from its seed and this list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Draw {
        source: DrawSource,
    },
    Discard {
        card: CardId,
    },
    LayMeld {
        cards: Vec<CardId>,
    },
    ExtendMeld {
        card: CardId,
        target_seat: Seat,
        group: GroupId,
    },
    JokerSwap {
        natural: CardId,
        joker: CardId,
        target_seat: Seat,
        group: GroupId,
        mode: SwapMode,
    },
    CancelSwap,
    TakeBack {
        card: CardId,
    },
    RestartVote,
}

/// Applies a table action to a hand. Restart votes are session business and
/// leave the hand untouched.
pub fn apply_to_hand(state: &mut HandState, seat: Seat, action: &Action) -> Result<Vec<GameEvent>, GameError> {
    match action {
        Action::Draw { source } => state.draw(seat, *source),
        Action::Discard { card } => state.discard(seat, *card),
        Action::LayMeld { cards } => state.lay_meld(seat, cards),
        Action::ExtendMeld {
            card,
            target_seat,
            group,
        } => state.extend_meld(seat, *card, *target_seat, *group),
        Action::JokerSwap {
            natural,
            joker,
            target_seat,
            group,
            mode,
        } => state.joker_swap(seat, *natural, *joker, *target_seat, *group, *mode),
        Action::CancelSwap => state.cancel_pending_swap(seat),
        Action::TakeBack { card } => state.take_back(seat, *card),
        Action::RestartVote => Ok(Vec::new()),
    }
}

/// Re-deals a recorded hand and re-applies its actions. Any rejected action
/// means the record does not describe a legal hand.
pub fn replay_record(record: &HandRecord) -> Result<(HandState, Vec<GameEvent>), GameError> {
    let mut state = HandState::deal(record.rules.clone(), record.seats, record.dealer, record.seed);
    let mut events = Vec::new();
    for rec in &record.actions {
        events.extend(apply_to_hand(&mut state, rec.seat, &rec.action)?);
    }
    Ok((state, events))
}

/// Public facts about one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSummary {
    pub seat: Seat,
    pub kind: SeatKind,
    pub hand_count: usize,
    pub opened: bool,
    pub eliminated: bool,
}

/// What one seat (or a spectator) is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub viewer: Option<Seat>,
    pub hand_number: u32,
    pub dealer: Seat,
    pub turn_seat: Seat,
    pub turn_id: u64,
    pub phase: Phase,
    /// The viewer's own cards; empty for spectators.
    pub hand: Vec<Card>,
    pub seats: Vec<SeatSummary>,
    pub melds: Vec<MeldGroup>,
    pub pack_top: Option<Card>,
    pub pack_count: usize,
    pub deck_count: usize,
    pub restart_votes: usize,
    pub pending_swap: Option<PendingJokerSwap>,
    pub legal: LegalActions,
}

/// Owns the authoritative state of one table across hands.
#[derive(Debug, Clone)]
pub struct Session {
    config: RuleConfig,
    seats: [SeatKind; 4],
    base_seed: u64,
    dealer: Seat,
    hand_number: u32,
    deals: u64,
    hand_seed: u64,
    state: Option<HandState>,
    restart_votes: Vec<Seat>,
    actions: Vec<ActionRecord>,
    archived: Vec<HandRecord>,
}

impl Session {
    pub fn new(config: RuleConfig, seats: [SeatKind; 4]) -> Self {
        Self::with_seed(config, seats, 0)
    }

    /// A session whose first dealer and every shuffle follow from `seed`.
    pub fn with_seed(config: RuleConfig, seats: [SeatKind; 4], seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let dealer = Seat::from_index(rng.random_range(0..4));
        Self {
            config,
            seats,
            base_seed: seed,
            dealer,
            hand_number: 0,
            deals: 0,
            hand_seed: seed,
            state: None,
            restart_votes: Vec::new(),
            actions: Vec::new(),
            archived: Vec::new(),
        }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }
    pub fn seats(&self) -> &[SeatKind; 4] {
        &self.seats
    }
    pub fn dealer(&self) -> Seat {
        self.dealer
    }
    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }
    /// Seed of the current deal.
    pub fn hand_seed(&self) -> u64 {
        self.hand_seed
    }
    pub fn state(&self) -> Option<&HandState> {
        self.state.as_ref()
    }
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }
    /// Records of deals abandoned by a restart vote.
    pub fn archived_records(&self) -> &[HandRecord] {
        &self.archived
    }

    pub fn is_hand_over(&self) -> bool {
        self.state.as_ref().map_or(true, HandState::is_over)
    }

    /// Deals the first hand of the session.
    pub fn deal_initial_hands(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.state.as_ref().is_some_and(|s| !s.is_over()) {
            return Err(GameError::HandInProgress);
        }
        self.hand_number += 1;
        Ok(self.deal())
    }

    /// Moves the deal clockwise and deals again. The previous hand must be over.
    pub fn start_next_hand(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if !self.is_hand_over() {
            return Err(GameError::HandInProgress);
        }
        if self.state.is_some() {
            self.dealer = self.dealer.next();
        }
        self.hand_number += 1;
        Ok(self.deal())
    }

    fn deal(&mut self) -> Vec<GameEvent> {
        self.deals += 1;
        self.hand_seed = self.base_seed.wrapping_add(self.deals);
        let state = HandState::deal(self.config.clone(), self.seats, self.dealer, self.hand_seed);
        let first_seat = state.current_seat();
        self.state = Some(state);
        self.restart_votes.clear();
        self.actions.clear();
        info!(hand = self.hand_number, dealer = %self.dealer, seed = self.hand_seed, "hand dealt");
        vec![GameEvent::HandDealt {
            hand_number: self.hand_number,
            dealer: self.dealer,
            first_seat,
        }]
    }

    /// Validates and applies `action` for `seat`. A rejected action leaves
    /// the session exactly as it was.
    pub fn apply(&mut self, seat: Seat, action: Action) -> Result<Vec<GameEvent>, GameError> {
        if action == Action::RestartVote {
            return self.vote_restart(seat);
        }
        let state = self.state.as_mut().ok_or(GameError::NoHandInProgress)?;
        let turn_id = state.turn_id();
        let was_over = state.is_over();
        let mut events = apply_to_hand(state, seat, &action)?;
        let over_now = state.is_over();
        let winner = state.winner();
        debug!(%seat, turn_id, ?action, "action accepted");
        self.actions.push(ActionRecord { seat, turn_id, action });
        if !was_over && over_now {
            if let Some(w) = winner {
                info!(seat = %w, hand = self.hand_number, "hand won");
                events.push(GameEvent::Won { seat: w });
            }
            events.push(GameEvent::GameOver { winner });
        }
        Ok(events)
    }

    pub fn draw_card(&mut self, seat: Seat, source: DrawSource) -> Result<Vec<GameEvent>, GameError> {
        self.apply(seat, Action::Draw { source })
    }

    pub fn discard_card(&mut self, seat: Seat, card: CardId) -> Result<Vec<GameEvent>, GameError> {
        self.apply(seat, Action::Discard { card })
    }

    pub fn lay_meld(&mut self, seat: Seat, cards: Vec<CardId>) -> Result<Vec<GameEvent>, GameError> {
        self.apply(seat, Action::LayMeld { cards })
    }

    pub fn extend_meld(
        &mut self,
        seat: Seat,
        card: CardId,
        target_seat: Seat,
        group: GroupId,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.apply(
            seat,
            Action::ExtendMeld {
                card,
                target_seat,
                group,
            },
        )
    }

    pub fn joker_swap(
        &mut self,
        seat: Seat,
        natural: CardId,
        joker: CardId,
        target_seat: Seat,
        group: GroupId,
        mode: SwapMode,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.apply(
            seat,
            Action::JokerSwap {
                natural,
                joker,
                target_seat,
                group,
                mode,
            },
        )
    }

    /// Voting is open until some seat takes its second draw.
    pub fn restart_voting_open(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| !s.is_over() && Seat::ALL.iter().all(|x| s.draw_count(*x) < 2))
    }

    pub fn restart_votes(&self) -> &[Seat] {
        &self.restart_votes
    }

    fn vote_restart(&mut self, seat: Seat) -> Result<Vec<GameEvent>, GameError> {
        let state = self.state.as_ref().ok_or(GameError::NoHandInProgress)?;
        if !self.restart_voting_open() {
            return Err(GameError::VotingClosed);
        }
        if self.restart_votes.contains(&seat) {
            return Err(GameError::AlreadyVoted(seat));
        }
        let turn_id = state.turn_id();
        self.restart_votes.push(seat);
        self.actions.push(ActionRecord {
            seat,
            turn_id,
            action: Action::RestartVote,
        });
        let votes = self.restart_votes.len();
        let mut events = vec![GameEvent::RestartVoteCast { seat, votes }];
        if votes >= self.config.restart_votes_needed {
            let mut record = self.hand_record();
            if let Some(result) = record.result.as_mut() {
                result.restarted = true;
            } else {
                record.result = Some(HandResult {
                    winner: None,
                    eliminated: Vec::new(),
                    restarted: true,
                    turns: turn_id,
                });
            }
            self.archived.push(record);
            info!(hand = self.hand_number, votes, "hand restarted by vote");
            events.push(GameEvent::HandRestarted {
                hand_number: self.hand_number,
            });
            events.extend(self.deal());
        }
        Ok(events)
    }

    pub fn legal_actions(&self, seat: Seat) -> LegalActions {
        self.state
            .as_ref()
            .map(|s| s.legal_actions(seat))
            .unwrap_or_default()
    }

    /// The table as `seat` sees it: its own hand, counts for the others.
    pub fn view_for(&self, seat: Seat) -> Option<SeatView> {
        self.view(Some(seat))
    }

    /// The table with every hand concealed.
    pub fn spectator_view(&self) -> Option<SeatView> {
        self.view(None)
    }

    fn view(&self, viewer: Option<Seat>) -> Option<SeatView> {
        let st = self.state.as_ref()?;
        let seats = Seat::ALL
            .iter()
            .map(|s| SeatSummary {
                seat: *s,
                kind: st.seat_kind(*s),
                hand_count: st.hand(*s).len(),
                opened: st.is_opened(*s),
                eliminated: st.is_eliminated(*s),
            })
            .collect();
        let own_swap = st
            .pending_swap()
            .filter(|_| viewer == Some(st.current_seat()))
            .cloned();
        Some(SeatView {
            viewer,
            hand_number: self.hand_number,
            dealer: st.dealer(),
            turn_seat: st.current_seat(),
            turn_id: st.turn_id(),
            phase: st.phase(),
            hand: viewer.map(|s| st.hand(s).to_vec()).unwrap_or_default(),
            seats,
            melds: st.melds().to_vec(),
            pack_top: st.pack_top().copied(),
            pack_count: st.pack().len(),
            deck_count: st.deck_remaining(),
            restart_votes: self.restart_votes.len(),
            pending_swap: own_swap,
            legal: viewer.map(|s| st.legal_actions(s)).unwrap_or_default(),
        })
    }

    /// Record of the current deal so far.
    pub fn hand_record(&self) -> HandRecord {
        let result = self.state.as_ref().filter(|s| s.is_over()).map(|s| HandResult {
            winner: s.winner(),
            eliminated: Seat::ALL.into_iter().filter(|x| s.is_eliminated(*x)).collect(),
            restarted: false,
            turns: s.turn_id(),
        });
        HandRecord {
            hand_id: String::new(),
            seed: self.hand_seed,
            hand_number: self.hand_number,
            dealer: self.dealer,
            seats: self.seats,
            rules: self.config.clone(),
            actions: self.actions.clone(),
            result,
            ts: None,
            meta: None,
        }
    }
}
