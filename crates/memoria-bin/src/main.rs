// memoria: terminal front-end for the sequence memory game.
//
// Reads commands from stdin on a helper thread and ticks the session from
// a fixed-rate loop on the main thread.

mod command;
mod render;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use memoria_audio::{PacedPlayback, PlaybackGateway};
use memoria_db::{JsonFileStore, MemoryStore, PersistenceGateway};
use memoria_game::{GameSession, NoteOutcome, Phase, RandomSource, RngSource};
use memoria_types::config::CONFIG_FILE;
use memoria_types::{Difficulty, GameConfig, Note, WallClock};
use rand::SeedableRng;
use rand::rngs::StdRng;

use command::{Command, HELP};

const TICK: Duration = Duration::from_millis(10);

#[derive(Parser, Debug)]
#[command(name = "memoria", about = "Sequence memory game for the terminal")]
struct Args {
    /// Path to the JSON config file.
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Path to the save file (overrides the config's save_path).
    #[arg(long)]
    save: Option<PathBuf>,

    /// Starting difficulty: 3, 6, 8, 12 or a tier name.
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Seed for reproducible sequences.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep progress in memory only.
    #[arg(long)]
    no_save: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "info,memoria=debug,memoria_game=debug,memoria_db=debug,memoria_audio=debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = load_config(&args.config);
    if let Some(save) = &args.save {
        config.save_path = save.display().to_string();
    }

    let gateway: Box<dyn PersistenceGateway> = if args.no_save {
        info!("Progress will not be saved");
        Box::new(MemoryStore::new())
    } else {
        info!("Saving progress to {}", config.save_path);
        Box::new(JsonFileStore::new(&config.save_path))
    };
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let playback = PacedPlayback::with_interval(
        |note: Note| println!("  ♪ {note}"),
        config.timing.note_interval_us(),
    );

    let mut session = GameSession::new(config, playback, gateway, RngSource(rng));
    if let Some(difficulty) = args.difficulty {
        session.select_difficulty(difficulty);
    }

    println!("{HELP}");
    println!();
    render::announce(&session);
    run(&mut session, spawn_stdin_reader())
}

/// A broken config file falls back to defaults instead of refusing to start.
fn load_config(path: &Path) -> GameConfig {
    match GameConfig::read_or_default(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{e:#}, using default config");
            GameConfig::default()
        }
    }
}

/// Forwards stdin lines; the channel closes at end of input.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn run<P, G, R>(session: &mut GameSession<P, G, R>, input: Receiver<String>) -> Result<()>
where
    P: PlaybackGateway,
    G: PersistenceGateway,
    R: RandomSource,
{
    let clock = WallClock::start();
    let mut last_phase = session.phase();

    loop {
        session.tick(&clock);

        match input.try_recv() {
            Ok(line) => match Command::parse(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => apply(session, command)?,
                Ok(None) => {}
                Err(e) => println!("{e}"),
            },
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                debug!("stdin closed");
                break;
            }
        }

        if session.phase() != last_phase {
            debug!("Phase {} -> {}", last_phase, session.phase());
            last_phase = session.phase();
            render::announce(session);
        }
        let pause = session
            .next_wakeup_us()
            .map_or(TICK, |due| clock.until_us(due).min(TICK));
        thread::sleep(pause);
    }

    info!("Bye");
    Ok(())
}

fn apply<P, G, R>(session: &mut GameSession<P, G, R>, command: Command) -> Result<()>
where
    P: PlaybackGateway,
    G: PersistenceGateway,
    R: RandomSource,
{
    match command {
        Command::Level(difficulty) => {
            if session.select_difficulty(difficulty) {
                println!("Level: {difficulty}");
            } else {
                println!("Finish or reset the current game before changing level.");
            }
        }
        Command::Start => {
            if session.start_session()? {
                session.begin_playback();
            } else {
                println!("A game is already running. Use `reset` to abandon it.");
            }
        }
        Command::Play => {
            if !session.begin_playback() {
                println!("Nothing to play right now.");
            }
        }
        Command::Notes(notes) => {
            for note in notes {
                match session.submit_note(note) {
                    NoteOutcome::Ignored => {
                        println!("Not accepting notes right now.");
                        break;
                    }
                    NoteOutcome::Correct => {}
                    NoteOutcome::Mismatch { lives_left } => {
                        println!("Wrong note {note}! Lives left: {lives_left}");
                        break;
                    }
                    NoteOutcome::RoundComplete { score } => {
                        println!("Correct! Score: {score}");
                        break;
                    }
                }
            }
            if session.phase() == Phase::AwaitingInput {
                render::progress(session);
            }
        }
        Command::Reset => session.reset(),
        Command::Stats => render::stats(session),
        Command::Achievements => render::achievements(session),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}
