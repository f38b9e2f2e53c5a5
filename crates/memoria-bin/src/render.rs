//! Plain-text views of the session.

use memoria_audio::PlaybackGateway;
use memoria_db::PersistenceGateway;
use memoria_game::{GameSession, Phase, RandomSource};

/// Prints the status line for the current phase.
pub fn announce<P, G, R>(session: &GameSession<P, G, R>)
where
    P: PlaybackGateway,
    G: PersistenceGateway,
    R: RandomSource,
{
    match session.phase() {
        Phase::GameOver => println!(
            "Game Over! Final score: {} (best {})",
            session.score(),
            session.high_score()
        ),
        Phase::AwaitingInput => {
            let len = session.target().map_or(0, |t| t.len());
            println!("{} ({len} notes)", Phase::AwaitingInput.message());
        }
        Phase::Idle => println!(
            "{} Current level: {}",
            Phase::Idle.message(),
            session.difficulty()
        ),
        phase => println!("{}", phase.message()),
    }
}

/// Shows how far into the target the player is.
pub fn progress<P, G, R>(session: &GameSession<P, G, R>)
where
    P: PlaybackGateway,
    G: PersistenceGateway,
    R: RandomSource,
{
    let entered = session.input().len();
    let total = session.target().map_or(0, |t| t.len());
    println!("  {entered}/{total}");
}

pub fn stats<P, G, R>(session: &mut GameSession<P, G, R>)
where
    P: PlaybackGateway,
    G: PersistenceGateway,
    R: RandomSource,
{
    let games = session.store_mut().games_played();
    println!("Level:       {}", session.difficulty());
    println!("Score:       {}", session.score());
    println!("Lives:       {}", session.lives());
    println!("High score:  {}", session.high_score());
    println!("Games:       {games}");
}

pub fn achievements<P, G, R>(session: &GameSession<P, G, R>)
where
    P: PlaybackGateway,
    G: PersistenceGateway,
    R: RandomSource,
{
    for achievement in session.achievements() {
        let mark = if achievement.unlocked { "x" } else { " " };
        let when = achievement
            .unlocked_at
            .map(|at| format!(" ({})", at.format("%Y-%m-%d")))
            .unwrap_or_default();
        println!(
            "[{mark}] {} - {}{when}",
            achievement.name, achievement.description
        );
    }
    let summary = session.achievement_summary();
    println!(
        "{}/{} unlocked ({:.0}%)",
        summary.unlocked,
        summary.total,
        summary.completion_percent()
    );
}
