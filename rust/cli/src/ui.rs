//! Terminal output helpers shared by the commands.

use crate::formatters::{format_card, format_hand, format_meld};
use kalooki_engine::session::SeatView;
use std::io::Write;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

/// Display a warning message to stderr with "WARNING:" prefix
pub fn display_warning(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "WARNING: {}", message)
}

/// Prints the table as `view` sees it: seats, melds, pack and, for a seated
/// viewer, its own numbered hand.
pub fn render_table(out: &mut dyn Write, view: &SeatView) -> std::io::Result<()> {
    for s in &view.seats {
        let mut flags = Vec::new();
        if s.seat == view.dealer {
            flags.push("dealer");
        }
        if s.opened {
            flags.push("opened");
        }
        if s.eliminated {
            flags.push("eliminated");
        }
        let marker = if s.seat == view.turn_seat { '>' } else { ' ' };
        writeln!(
            out,
            "{} {:<6} {:>2} cards {}",
            marker,
            s.seat.as_str(),
            s.hand_count,
            flags.join(",")
        )?;
    }
    if view.melds.is_empty() {
        writeln!(out, "Melds: none")?;
    } else {
        writeln!(out, "Melds:")?;
        for g in &view.melds {
            writeln!(out, "  {}", format_meld(g))?;
        }
    }
    let top = view
        .pack_top
        .as_ref()
        .map(format_card)
        .unwrap_or_else(|| "-".to_string());
    writeln!(
        out,
        "Pack: {} ({} cards)  Deck: {}",
        top, view.pack_count, view.deck_count
    )?;
    if view.viewer.is_some() {
        writeln!(out, "Hand: {}", format_hand(&view.hand))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalooki_engine::config::RuleConfig;
    use kalooki_engine::seat::{Seat, SeatKind};
    use kalooki_engine::session::Session;

    #[test]
    fn spectators_do_not_see_a_hand() {
        let mut s = Session::with_seed(RuleConfig::default(), [SeatKind::Human; 4], 3);
        s.deal_initial_hands().unwrap();

        let mut out = Vec::new();
        render_table(&mut out, &s.spectator_view().unwrap()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Melds: none"));
        assert!(!text.contains("Hand:"));

        let mut out = Vec::new();
        render_table(&mut out, &s.view_for(Seat::Bottom).unwrap()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Hand: 1:"));
        assert!(text.contains("dealer"));
    }

    #[test]
    fn warnings_are_prefixed() {
        let mut err = Vec::new();
        display_warning(&mut err, "careful").unwrap();
        assert_eq!(String::from_utf8(err).unwrap(), "WARNING: careful\n");
    }
}
