use kalooki_ai::driver::{play_bot_turn, play_out_hand};
use kalooki_ai::{bot_for, create_bot, BotError, BotPlayer};
use kalooki_engine::config::RuleConfig;
use kalooki_engine::game::Phase;
use kalooki_engine::seat::{Difficulty, Seat, SeatKind};
use kalooki_engine::session::Session;

fn bot_session(seed: u64) -> Session {
    let seats = [
        SeatKind::Bot(Difficulty::Easy),
        SeatKind::Bot(Difficulty::Medium),
        SeatKind::Bot(Difficulty::Hard),
        SeatKind::Bot(Difficulty::Medium),
    ];
    let mut s = Session::with_seed(RuleConfig::default(), seats, seed);
    s.deal_initial_hands().unwrap();
    s
}

fn bots() -> [Box<dyn BotPlayer>; 4] {
    [
        bot_for(Difficulty::Easy),
        bot_for(Difficulty::Medium),
        bot_for(Difficulty::Hard),
        bot_for(Difficulty::Medium),
    ]
}

#[test]
fn bot_turns_keep_the_table_consistent() {
    for seed in [1u64, 7, 42, 2025] {
        let mut session = bot_session(seed);
        let bots = bots();
        for _ in 0..400 {
            if session.is_hand_over() {
                break;
            }
            let seat = session.state().unwrap().current_seat();
            play_bot_turn(&mut session, bots[seat.index()].as_ref()).unwrap();
            let st = session.state().unwrap();
            assert!(st.is_conserved(), "seed {} lost cards", seed);
            if st.phase() == Phase::AwaitingDraw {
                assert!(st.melds().iter().filter(|g| !g.locked).all(|g| g.is_valid()));
            }
        }
        // All-bot tables are exempt from elimination.
        let st = session.state().unwrap();
        assert!(Seat::ALL.iter().all(|s| !st.is_eliminated(*s)));
    }
}

#[test]
fn same_seed_same_game() {
    let mut a = bot_session(99);
    let mut b = bot_session(99);
    play_out_hand(&mut a, &bots(), 120).unwrap();
    play_out_hand(&mut b, &bots(), 120).unwrap();
    assert_eq!(a.actions(), b.actions());
}

#[test]
fn every_bot_turn_ends_with_a_discard_or_the_hand() {
    let mut session = bot_session(5);
    let bot = create_bot("easy").unwrap();
    let before = session.state().unwrap().turn_id();
    play_bot_turn(&mut session, bot.as_ref()).unwrap();
    let st = session.state().unwrap();
    assert!(st.is_over() || st.turn_id() == before + 1);
}

#[test]
fn driver_needs_a_dealt_hand() {
    let mut session = Session::new(RuleConfig::default(), [SeatKind::Bot(Difficulty::Easy); 4]);
    let bot = create_bot("easy").unwrap();
    assert_eq!(play_bot_turn(&mut session, bot.as_ref()).unwrap_err(), BotError::NoHand);
}

#[test]
fn unknown_bot_names_are_rejected() {
    assert!(matches!(create_bot("expert"), Err(BotError::UnknownBot(name)) if name == "expert"));
    assert_eq!(create_bot("MEDIUM").unwrap().name(), "MediumBot");
}
