//! # Display Management
//!
//! Text layout for the encounter table, the command menu and event messages.

use crate::encounter::{Combatant, Encounter};
use crate::session::{AutosaveStatus, CommandReport};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use std::fmt::Write as _;
use std::io::{self, Write};

/// Command menu shown below the encounter table.
pub const MENU: &str = "\
====================== COMMANDS ======================
1:Add        2:Start     3:Next      4:HP         5:TempHP
6:AddStatus  7:RemStatus 8:Display   9:End       10:Details
11:Save      12:Load     13:Duplicate 14:Change Initiative
0:Exit
======================================================";

/// Renders one roster line.
///
/// # Examples
///
/// ```
/// use skirmish::{render_combatant, Combatant};
///
/// let line = render_combatant(0, &Combatant::new("Wolf", 15, 10, false), true);
/// assert!(line.starts_with("→ M  1. Wolf"));
/// assert!(line.contains("HP:  10/10"));
/// ```
pub fn render_combatant(index: usize, combatant: &Combatant, is_current: bool) -> String {
    let marker = if is_current { "→" } else { " " };
    let kind = if combatant.is_player { "P" } else { "M" };

    let mut line = format!(
        "{marker} {kind} {:2}. {:<20} Init: {:2} HP: {:3}/{:<3}",
        index + 1,
        combatant.name,
        combatant.initiative,
        combatant.current_hp,
        combatant.max_hp
    );
    if combatant.temporary_hp > 0 {
        let _ = write!(line, " (Temp: {})", combatant.temporary_hp);
    }
    if !combatant.is_conscious {
        line.push_str(" (Unconscious)");
    }
    if !combatant.status_effects.is_empty() {
        let _ = write!(line, " [{}]", combatant.status_effects.join(", "));
    }
    line
}

/// Renders the full encounter table.
pub fn render_encounter(encounter: &Encounter) -> String {
    let mut out = String::from("===== COMBAT STATE =====\n");
    let _ = writeln!(
        out,
        "Campaign: {} | Encounter: {}",
        encounter.campaign_name, encounter.encounter_name
    );
    if let Some(target) = &encounter.save_target {
        let _ = writeln!(out, "Auto-saving to: {}", target.display());
    }
    let _ = writeln!(out, "Round: {}", encounter.round);
    out.push_str("-------------------\n");

    let current = encounter.active_turn();
    for (index, combatant) in encounter.combatants.iter().enumerate() {
        out.push_str(&render_combatant(index, combatant, current == Some(index)));
        out.push('\n');
    }
    out.push_str("-------------------");
    out
}

/// Renders the messages of a command report.
pub fn render_report(report: &CommandReport) -> String {
    let mut lines: Vec<String> = report.events.iter().map(ToString::to_string).collect();
    match &report.autosave {
        AutosaveStatus::Saved(path) if report.events.is_empty() => {
            lines.push(format!("Combat state saved to {}", path.display()));
        }
        AutosaveStatus::Failed(reason) => lines.push(format!("Auto-save failed: {reason}")),
        _ => {}
    }
    lines.join("\n")
}

/// Homes the cursor and clears the terminal.
pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    execute!(out, MoveTo(0, 0), Clear(ClearType::All))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encounter::EncounterEvent;
    use std::path::PathBuf;

    #[test]
    fn test_render_combatant_details() {
        let mut hero = Combatant::new("Hero", 10, 20, true);
        hero.current_hp = 0;
        hero.is_conscious = false;
        hero.temporary_hp = 3;
        hero.status_effects = vec!["Prone".to_string(), "Stunned".to_string()];

        let line = render_combatant(1, &hero, false);
        assert!(line.starts_with("  P  2. Hero"));
        assert!(line.ends_with("(Temp: 3) (Unconscious) [Prone, Stunned]"));
    }

    #[test]
    fn test_render_encounter_marks_current_turn() {
        let mut encounter = Encounter::with_save_target("fight.json");
        encounter.add_combatant("Hero", 10, 20, true).unwrap();
        encounter.add_combatant("Wolf", 15, 10, false).unwrap();

        let table = render_encounter(&encounter);
        assert!(table.contains("Auto-saving to: fight.json"));
        assert!(!table.contains('→'));

        encounter.start_combat().unwrap();
        let table = render_encounter(&encounter);
        assert!(table.contains("Round: 1"));
        assert!(table.contains("→ M  1. Wolf"));
    }

    #[test]
    fn test_render_report() {
        let report = CommandReport {
            events: vec![EncounterEvent::TurnAdvanced {
                index: 0,
                name: "Wolf".to_string(),
            }],
            autosave: AutosaveStatus::Failed("disk full".to_string()),
        };
        assert_eq!(render_report(&report), "It's Wolf's turn!\nAuto-save failed: disk full");

        let saved = CommandReport {
            events: Vec::new(),
            autosave: AutosaveStatus::Saved(PathBuf::from("a.json")),
        };
        assert_eq!(render_report(&saved), "Combat state saved to a.json");
    }

    #[test]
    fn test_clear_screen() {
        let mut out = Vec::new();
        clear_screen(&mut out).unwrap();
        assert_eq!(out, b"\x1b[1;1H\x1b[2J");
    }
}
