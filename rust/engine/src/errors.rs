use thiserror::Error;

use crate::cards::CardId;
use crate::melds::GroupId;
use crate::seat::Seat;

/// Reasons an action is refused. Every variant is an illegal action: the
/// state is left untouched and the `Display` text is the reason reported to
/// the acting seat.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("Hand already complete")]
    HandAlreadyComplete,
    #[error("A hand is already in progress")]
    HandInProgress,
    #[error("It's not {actual}'s turn (waiting for {expected})")]
    NotYourTurn { expected: Seat, actual: Seat },
    #[error("Seat {0} has been eliminated")]
    SeatEliminated(Seat),
    #[error("Already drew this turn")]
    AlreadyDrawn,
    #[error("Must draw before playing cards")]
    MustDrawFirst,
    #[error("Pack is empty")]
    PackEmpty,
    #[error("Cannot take back the card you just discarded from a deck draw")]
    RedrawOwnDiscard,
    #[error("Card {0} not in hand")]
    CardNotInHand(CardId),
    #[error("Card {0} listed more than once")]
    DuplicateCard(CardId),
    #[error("A meld needs at least 3 cards, got {0}")]
    MeldTooSmall(usize),
    #[error("A new meld may hold at most {max} cards, got {got}")]
    MeldTooLarge { got: usize, max: usize },
    #[error("A meld must contain at least one natural card")]
    NoNaturalCard,
    #[error("Meld {group} not found on {seat}'s table")]
    MeldNotFound { seat: Seat, group: GroupId },
    #[error("Meld {0} is locked")]
    MeldLocked(GroupId),
    #[error("Must open before playing goers")]
    NotOpened,
    #[error("The card drawn from the pack must be used in a new meld")]
    PackCardMustMeld,
    #[error("Cannot lay every card before opening")]
    CannotEmptyHandUnopened,
    #[error("Cannot go out while meld {0} is not a set or run")]
    InvalidMeldOnGoingOut(GroupId),
    #[error("Card {0} was not placed by you this turn")]
    NotTakeBackable(CardId),
    #[error("Card {0} is not a joker in that meld")]
    NotAJoker(CardId),
    #[error("Card {natural} does not match the card the joker represents")]
    JokerSwapMismatch { natural: CardId },
    #[error("A joker swap is already pending")]
    SwapAlreadyPending,
    #[error("No joker swap is pending")]
    NoPendingSwap,
    #[error("Cannot mix immediate and staged joker swaps in one turn")]
    SwapModeConflict,
    #[error("Restart voting is closed")]
    VotingClosed,
    #[error("{0} has already voted")]
    AlreadyVoted(Seat),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseCardError {
    #[error("Invalid card code: {0}")]
    InvalidCode(String),
    #[error("Invalid card id: {0}")]
    InvalidId(String),
    #[error("Invalid seat: {0}")]
    InvalidSeat(String),
}
