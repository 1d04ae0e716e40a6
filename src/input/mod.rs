//! # Input Module
//!
//! Menu handling and prompt parsing for operator interactions.

pub mod commands;

pub use commands::*;

use crate::encounter::Encounter;
use crate::persistence::{default_save_file_name, with_save_extension};
use crate::{config, TrackerError, TrackerResult};
use std::io::{BufRead, Write};

/// Entries of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    Start,
    Next,
    Hp,
    TempHp,
    AddStatus,
    RemoveStatus,
    Display,
    End,
    Details,
    Save,
    Load,
    Duplicate,
    ChangeInitiative,
    Exit,
}

impl MenuChoice {
    /// Parses the number typed at the menu prompt.
    ///
    /// # Examples
    ///
    /// ```
    /// use skirmish::MenuChoice;
    ///
    /// assert_eq!(MenuChoice::from_input(" 3 "), Some(MenuChoice::Next));
    /// assert_eq!(MenuChoice::from_input("0"), Some(MenuChoice::Exit));
    /// assert_eq!(MenuChoice::from_input("15"), None);
    /// ```
    pub fn from_input(input: &str) -> Option<Self> {
        let choice = match input.trim() {
            "1" => MenuChoice::Add,
            "2" => MenuChoice::Start,
            "3" => MenuChoice::Next,
            "4" => MenuChoice::Hp,
            "5" => MenuChoice::TempHp,
            "6" => MenuChoice::AddStatus,
            "7" => MenuChoice::RemoveStatus,
            "8" => MenuChoice::Display,
            "9" => MenuChoice::End,
            "10" => MenuChoice::Details,
            "11" => MenuChoice::Save,
            "12" => MenuChoice::Load,
            "13" => MenuChoice::Duplicate,
            "14" => MenuChoice::ChangeInitiative,
            "0" => MenuChoice::Exit,
            _ => return None,
        };
        Some(choice)
    }
}

/// Line-oriented prompter that turns operator answers into [`Command`]s.
///
/// Reading past the end of input is reported as an I/O error; the caller
/// treats it as the end of the session.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Creates a prompter over the given input and output.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Access to the output stream.
    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Reads one line without its line ending; `None` at end of input.
    pub fn read_line(&mut self) -> TrackerResult<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Prints `prompt` and reads the answer.
    fn ask(&mut self, prompt: &str) -> TrackerResult<String> {
        write!(self.writer, "{prompt}")?;
        self.writer.flush()?;
        self.read_line()?.ok_or_else(|| {
            TrackerError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "end of input",
            ))
        })
    }

    /// Prompts for a signed number.
    fn ask_number(&mut self, prompt: &str, what: &str) -> TrackerResult<i32> {
        let answer = self.ask(prompt)?;
        answer
            .trim()
            .parse()
            .map_err(|_| TrackerError::InvalidInput(format!("invalid {what} entered")))
    }

    /// Reads the main menu choice; `None` at end of input.
    pub fn read_menu_choice(&mut self) -> TrackerResult<Option<Option<MenuChoice>>> {
        write!(self.writer, "\nEnter command: ")?;
        self.writer.flush()?;
        Ok(self.read_line()?.map(|line| MenuChoice::from_input(&line)))
    }

    /// Prompts for a 1-based combatant number. An empty answer picks the
    /// current turn while combat is active.
    pub fn ask_index(&mut self, encounter: &Encounter, prompt: &str) -> TrackerResult<usize> {
        if let (Some(idx), Some(current)) = (encounter.active_turn(), encounter.current_combatant()) {
            writeln!(self.writer, "Current player: {} (index: {})", current.name, idx + 1)?;
        }
        let answer = self.ask(prompt)?;
        resolve_index(answer.trim(), encounter)
    }

    /// Prompts for the arguments of a menu choice.
    ///
    /// Returns `None` for choices that do not map to a command (display, exit).
    pub fn prompt_command(
        &mut self,
        choice: MenuChoice,
        encounter: &Encounter,
    ) -> TrackerResult<Option<Command>> {
        const INDEX_PROMPT: &str = "Enter combatant number (press Enter for current player): ";

        let command = match choice {
            MenuChoice::Add => {
                writeln!(self.writer, "=== ADD COMBATANT ===")?;
                let name = self.ask("Enter name: ")?;
                let initiative = self.ask("Enter initiative: ")?.trim().parse().unwrap_or(0);
                let max_hp = self.ask("Enter max HP: ")?.trim().parse().unwrap_or(0);
                let answer = self.ask("Is this a player? (y/n): ")?.trim().to_lowercase();
                Command::AddCombatant {
                    name,
                    initiative,
                    max_hp,
                    is_player: answer == "y" || answer == "yes",
                }
            }
            MenuChoice::Start => Command::StartCombat,
            MenuChoice::Next => Command::AdvanceTurn,
            MenuChoice::Hp => {
                writeln!(self.writer, "=== ADJUST HIT POINTS ===")?;
                let index = self.ask_index(encounter, INDEX_PROMPT)?;
                let delta = self.ask_number("Enter amount (+heal, -damage): ", "amount")?;
                Command::AdjustHp { index, delta }
            }
            MenuChoice::TempHp => {
                writeln!(self.writer, "=== ADD TEMPORARY HP ===")?;
                let index = self.ask_index(encounter, INDEX_PROMPT)?;
                let amount = self.ask_number("Enter temporary HP amount: ", "amount")?;
                Command::SetTemporaryHp { index, amount }
            }
            MenuChoice::AddStatus => {
                writeln!(self.writer, "=== ADD STATUS EFFECT ===")?;
                let index = self.ask_index(encounter, INDEX_PROMPT)?;
                let catalog = &encounter.available_status_effects;
                writeln!(self.writer, "\nSelect status effect for {}:", encounter.combatants[index].name)?;
                writeln!(self.writer, "0. {}", config::CUSTOM_STATUS_EFFECT)?;
                for (i, effect) in catalog.iter().enumerate() {
                    writeln!(self.writer, "{}. {}", i + 1, effect)?;
                }
                let pick = self.ask("\nEnter number of status effect (or 0 for custom): ")?;
                let effect = match pick.trim().parse::<usize>() {
                    Ok(0) => self.ask("Enter custom status effect name: ")?,
                    Ok(n) if n <= catalog.len() => catalog[n - 1].clone(),
                    _ => return Err(TrackerError::InvalidInput("invalid selection".to_string())),
                };
                Command::AddStatusEffect { index, effect }
            }
            MenuChoice::RemoveStatus => {
                writeln!(self.writer, "=== REMOVE STATUS EFFECT ===")?;
                let index = self.ask_index(encounter, INDEX_PROMPT)?;
                let combatant = &encounter.combatants[index];
                if combatant.status_effects.is_empty() {
                    writeln!(self.writer, "{} has no status effects to remove.", combatant.name)?;
                    return Ok(None);
                }
                writeln!(self.writer, "\nCurrent status effects for {}:", combatant.name)?;
                for (i, effect) in combatant.status_effects.iter().enumerate() {
                    writeln!(self.writer, "{}. {}", i + 1, effect)?;
                }
                let pick = self.ask("\nEnter number of status effect to remove: ")?;
                let effect = match pick.trim().parse::<usize>() {
                    Ok(n) if n >= 1 && n <= combatant.status_effects.len() => {
                        combatant.status_effects[n - 1].clone()
                    }
                    _ => return Err(TrackerError::InvalidInput("invalid selection".to_string())),
                };
                Command::RemoveStatusEffect { index, effect }
            }
            MenuChoice::End => Command::EndCombat,
            MenuChoice::Details => {
                writeln!(self.writer, "=== SET ENCOUNTER DETAILS ===")?;
                let campaign = self.ask("Enter campaign name: ")?;
                let name = self.ask("Enter encounter name: ")?;
                Command::SetDetails {
                    campaign,
                    encounter: name,
                }
            }
            MenuChoice::Save => {
                writeln!(self.writer, "=== SAVE COMBAT STATE ===")?;
                let default = match &encounter.save_target {
                    Some(target) => target.display().to_string(),
                    None => default_save_file_name(encounter),
                };
                let answer = self.ask(&format!("Enter filename (default: {default}): "))?;
                let name = if answer.trim().is_empty() {
                    default
                } else {
                    answer.trim().to_string()
                };
                Command::SaveTo(with_save_extension(&name))
            }
            MenuChoice::Load => {
                writeln!(self.writer, "=== LOAD COMBAT STATE ===")?;
                let answer = self.ask("Enter filename to load: ")?;
                Command::LoadFrom(answer.trim().into())
            }
            MenuChoice::Duplicate => {
                writeln!(self.writer, "=== DUPLICATE COMBATANT ===")?;
                let index = self.ask_index(
                    encounter,
                    "Enter combatant number to duplicate (press Enter for current player): ",
                )?;
                let count = self
                    .ask("Enter number of copies to create: ")?
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|&count| count >= 1)
                    .ok_or_else(|| TrackerError::InvalidInput("invalid number of copies".to_string()))?;
                Command::DuplicateCombatant { index, count }
            }
            MenuChoice::ChangeInitiative => {
                writeln!(self.writer, "=== CHANGE INITIATIVE ===")?;
                let index = self.ask_index(encounter, INDEX_PROMPT)?;
                let initiative = self.ask_number("Enter new initiative value: ", "initiative value")?;
                Command::ChangeInitiative { index, initiative }
            }
            MenuChoice::Display | MenuChoice::Exit => return Ok(None),
        };
        Ok(Some(command))
    }
}

/// Turns a 1-based answer into a roster index.
///
/// An empty answer resolves to the current turn while combat is active.
pub fn resolve_index(answer: &str, encounter: &Encounter) -> TrackerResult<usize> {
    let index = if answer.is_empty() {
        encounter
            .active_turn()
            .ok_or_else(|| TrackerError::InvalidInput("invalid number entered".to_string()))?
    } else {
        match answer.parse::<usize>() {
            Ok(n) if n >= 1 => n - 1,
            _ => return Err(TrackerError::InvalidInput("invalid number entered".to_string())),
        }
    };

    if index >= encounter.len() {
        return Err(TrackerError::InvalidIndex {
            index,
            len: encounter.len(),
        });
    }
    Ok(index)
}
