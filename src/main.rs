//! # Skirmish Main Entry Point
//!
//! Opens or creates an encounter, then runs the interactive command loop.

use clap::Parser;
use log::{error, info};
use skirmish::{
    clear_screen, render_encounter, render_report, JsonFileStore, MenuChoice, Prompter, Session,
    TrackerError, TrackerResult, MENU,
};
use std::io::{self, Write};
use std::path::PathBuf;

/// Command line arguments for the Skirmish tracker.
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "A turn-based encounter tracker for tabletop role-playing sessions")]
#[command(version)]
struct Args {
    /// Save file to load and auto-save to
    save_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Do not clear the screen between commands
    #[arg(long)]
    no_clear: bool,
}

fn main() -> TrackerResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    info!("Starting Skirmish v{}", skirmish::VERSION);

    let mut session = Session::open(args.save_file.clone(), Box::new(JsonFileStore::new()));
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    writeln!(prompter.writer(), "===== D&D COMBAT TRACKER =====")?;
    if let Some(target) = session.save_target() {
        writeln!(prompter.writer(), "Auto-saving enabled to: {}", target.display())?;
    }

    let result = run_command_loop(&mut session, &mut prompter, &args);

    let status = session.shutdown();
    info!("Final save: {status:?}");
    writeln!(prompter.writer(), "Exiting combat tracker. Farewell, adventurer!")?;
    result
}

/// Initializes the logging system based on the specified log level.
///
/// `RUST_LOG` takes precedence over the command line.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_target(false)
        .init();
}

/// Main command loop: show state, read a menu choice, run it.
fn run_command_loop<R: io::BufRead, W: Write>(
    session: &mut Session,
    prompter: &mut Prompter<R, W>,
    args: &Args,
) -> TrackerResult<()> {
    loop {
        writeln!(prompter.writer(), "\n{}", render_encounter(session.encounter()))?;
        writeln!(prompter.writer(), "\n{MENU}")?;

        let choice = match prompter.read_menu_choice()? {
            Some(choice) => choice,
            None => {
                info!("End of input");
                return Ok(());
            }
        };
        if !args.no_clear {
            clear_screen(prompter.writer())?;
        }

        let choice = match choice {
            Some(MenuChoice::Exit) => return Ok(()),
            Some(MenuChoice::Display) => {
                writeln!(prompter.writer(), "Combat state refreshed.")?;
                continue;
            }
            Some(choice) => choice,
            None => {
                writeln!(prompter.writer(), "Invalid command. Please try again.")?;
                continue;
            }
        };

        let command = match prompter.prompt_command(choice, session.encounter()) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) if err.is_end_of_input() => {
                info!("End of input");
                return Ok(());
            }
            Err(TrackerError::Io(err)) => {
                error!("Cannot read input: {err}");
                return Err(TrackerError::Io(err));
            }
            Err(err) => {
                writeln!(prompter.writer(), "{err}")?;
                continue;
            }
        };

        match session.execute(command) {
            Ok(report) => {
                let text = render_report(&report);
                if !text.is_empty() {
                    writeln!(prompter.writer(), "{text}")?;
                }
            }
            Err(err) => writeln!(prompter.writer(), "{err}")?,
        }
    }
}
