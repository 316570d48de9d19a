//! Human-readable console formatting for server-side logging.

use holdem_shared::{ActionEvent, ActionKind, BlindKind, Card, GameAction, PlayerId, PlayerView};
use owo_colors::OwoColorize;

fn format_card(c: Card, color: bool) -> String {
    let text = c.to_string();
    if color && c.suit.is_red() {
        text.red().to_string()
    } else {
        text
    }
}

fn format_cards(cards: &[Card], color: bool) -> String {
    cards.iter().map(|&c| format_card(c, color)).collect::<Vec<_>>().join(", ")
}

fn player_name(players: &[PlayerView], id: PlayerId) -> String {
    players
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("P{id}"))
}

fn format_log_entry(entry: &ActionEvent, players: &[PlayerView], color: bool) -> String {
    match entry {
        ActionEvent::PlayerAction { player_id, action } => {
            let who = player_name(players, *player_id);
            match action {
                ActionKind::Fold => format!(
                    "{} {} (fold)",
                    if color { "↩".red().to_string() } else { "FOLD".into() },
                    who
                ),
                ActionKind::Check => format!(
                    "{} {} (check)",
                    if color { "✓".green().to_string() } else { "CHECK".into() },
                    who
                ),
                ActionKind::Call(n) => format!(
                    "{} {} {} (call)",
                    if color { "↪".cyan().to_string() } else { "CALL".into() },
                    who,
                    n
                ),
                ActionKind::Raise { to, by } => format!(
                    "{} {} to {} (+{}) (raise)",
                    if color { "▲".magenta().to_string() } else { "RAISE".into() },
                    who,
                    to,
                    by
                ),
                ActionKind::AllIn(n) => format!(
                    "{} {} {} (all-in)",
                    if color { "★".yellow().to_string() } else { "ALLIN".into() },
                    who,
                    n
                ),
                ActionKind::PostBlind { kind, amount } => {
                    let k = match *kind {
                        BlindKind::SmallBlind => "SB",
                        BlindKind::BigBlind => "BB",
                    };
                    format!("{k} {who} {amount}")
                }
            }
        }
        ActionEvent::GameAction(GameAction::DealtCommunity { cards }) => {
            format!("Board +[{}]", format_cards(cards, color))
        }
        ActionEvent::GameAction(GameAction::DealtHole { player_id }) => {
            format!("Dealt hole to {}", player_name(players, *player_id))
        }
        ActionEvent::GameAction(GameAction::Showdown { .. }) => "Showdown".into(),
        ActionEvent::GameAction(GameAction::PotAwarded { winners, amount }) => {
            let names = winners.iter().map(|id| player_name(players, *id)).collect::<Vec<_>>().join(", ");
            format!("Pot awarded {amount} -> [{names}]")
        }
        ActionEvent::GameAction(GameAction::Refund { player_id, amount }) => {
            format!("Refund {amount} -> {}", player_name(players, *player_id))
        }
        ActionEvent::GameAction(GameAction::Eliminated { player_id }) => {
            format!("{} eliminated", player_name(players, *player_id))
        }
        ActionEvent::GameAction(GameAction::RebuyQueued { player_id }) => {
            format!("{} queued a rebuy", player_name(players, *player_id))
        }
        ActionEvent::GameAction(GameAction::RebuyFulfilled { player_id }) => {
            format!("{} rebought", player_name(players, *player_id))
        }
        ActionEvent::GameAction(GameAction::Paused) => "Game paused".into(),
        ActionEvent::GameAction(GameAction::Resumed) => "Game resumed".into(),
        ActionEvent::GameAction(GameAction::BlindLevelAdvanced { level, sb, bb }) => {
            format!("Blinds advanced to level {level}: {sb}/{bb}")
        }
        ActionEvent::GameAction(GameAction::StageChanged(_)) => unreachable!(),
    }
}

pub fn format_event_human(entry: &ActionEvent, players: &[PlayerView], color: bool) -> String {
    match entry {
        ActionEvent::GameAction(GameAction::StageChanged(s)) => {
            let sname = format!("== {s:?} ==");
            if color {
                sname.bold().purple().to_string()
            } else {
                sname
            }
        }
        _ => format_log_entry(entry, players, color),
    }
}

pub fn format_table_header(code: &str, hand_number: u32, sb: u32, bb: u32, color: bool) -> String {
    let title = format!("=== {code} — Hand #{hand_number} ===");
    let title = if color { title.bold().blue().to_string() } else { title };
    let blinds = if color {
        format!("{} SB {} / BB {}", "Blinds:".bold().yellow(), sb, bb)
    } else {
        format!("Blinds: SB {sb} / BB {bb}")
    };
    format!("{title}\n{blinds}\n")
}
