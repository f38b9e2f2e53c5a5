//! The game session state machine.
//!
//! Time is virtual: the driver feeds `update(now_us)` every frame, which
//! resolves finished playback and fires due round transitions. Every
//! delayed transition and playback completion is tied to the round it was
//! issued for and is dropped once the session has moved on.

use chrono::Utc;
use log::{debug, error, info, warn};
use memoria_audio::{PlaybackGateway, PlaybackTicket};
use memoria_db::{PersistenceGateway, ProgressStore, UnlockOutcome};
use memoria_types::{Achievement, Difficulty, GameClock, GameConfig, Note, Sequence};

use crate::achievement::{self, AchievementSummary, Progress};
use crate::scheduler::{RoundId, Scheduled, Scheduler};
use crate::sequence::{self, RandomSource, SequenceError};

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for a difficulty choice or an explicit start.
    Idle,
    /// The target sequence is being performed.
    PlayingBack,
    /// The player is reproducing the target.
    AwaitingInput,
    /// The target was reproduced; the next round follows shortly.
    RoundSuccess,
    /// A wrong note was played; a retry or game over follows shortly.
    RoundFailure,
    /// No lives left.
    GameOver,
}

impl Phase {
    /// Status line shown to the player.
    pub fn message(self) -> &'static str {
        match self {
            Phase::Idle => "Select a level and start to begin!",
            Phase::PlayingBack => "Listen to the sequence...",
            Phase::AwaitingInput => "Now repeat the sequence!",
            Phase::RoundSuccess => "Great! Get ready for the next sequence...",
            Phase::RoundFailure => "Oops! Try again...",
            Phase::GameOver => "Game Over!",
        }
    }

    /// Phases in which a new session may be set up.
    fn is_between_sessions(self) -> bool {
        matches!(self, Phase::Idle | Phase::GameOver)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "Idle",
            Phase::PlayingBack => "PlayingBack",
            Phase::AwaitingInput => "AwaitingInput",
            Phase::RoundSuccess => "RoundSuccess",
            Phase::RoundFailure => "RoundFailure",
            Phase::GameOver => "GameOver",
        };
        f.write_str(name)
    }
}

/// Everything the front-end needs to draw the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub difficulty: Difficulty,
    /// Absent until a session is started.
    pub target: Option<Sequence>,
    /// Notes entered so far this round.
    pub input: Vec<Note>,
    /// Consecutive successful rounds this session.
    pub score: u32,
    pub lives: u32,
    pub phase: Phase,
    /// Set while the target is being performed.
    pub busy: bool,
}

impl SessionState {
    fn new(difficulty: Difficulty, lives: u32) -> Self {
        Self {
            difficulty,
            target: None,
            input: Vec::new(),
            score: 0,
            lives,
            phase: Phase::Idle,
            busy: false,
        }
    }
}

/// What happened to a submitted note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOutcome {
    /// Input is not being accepted right now.
    Ignored,
    /// Correct so far; more notes expected.
    Correct,
    /// Wrong note; a life was lost.
    Mismatch { lives_left: u32 },
    /// The whole target was reproduced.
    RoundComplete { score: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEvent {
    EvaluateAchievements,
    AdvanceRound,
    RetryRound,
    EndGame,
}

pub struct GameSession<P, G, R> {
    config: GameConfig,
    state: SessionState,
    playback: P,
    store: ProgressStore<G>,
    rng: R,
    scheduler: Scheduler<SessionEvent>,
    round: RoundId,
    in_flight: Option<PlaybackTicket>,
    now_us: i64,
    high_score: u32,
    achievements: Vec<Achievement>,
}

impl<P, G, R> GameSession<P, G, R>
where
    P: PlaybackGateway,
    G: PersistenceGateway,
    R: RandomSource,
{
    /// Creates an idle session at the last-played difficulty.
    pub fn new(config: GameConfig, playback: P, gateway: G, rng: R) -> Self {
        let mut store = ProgressStore::new(gateway);
        let record = store.record();
        info!(
            "Loaded progress: high score {}, {} games played, last difficulty {}",
            record.high_score, record.total_games_played, record.last_played_difficulty
        );
        Self {
            state: SessionState::new(record.last_played_difficulty, config.starting_lives),
            config,
            playback,
            store,
            rng,
            scheduler: Scheduler::new(),
            round: RoundId::default(),
            in_flight: None,
            now_us: 0,
            high_score: record.high_score,
            achievements: record.achievements,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.state.difficulty
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn lives(&self) -> u32 {
        self.state.lives
    }

    pub fn target(&self) -> Option<&Sequence> {
        self.state.target.as_ref()
    }

    pub fn input(&self) -> &[Note] {
        &self.state.input
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn achievement_summary(&self) -> AchievementSummary {
        AchievementSummary::of(&self.achievements)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Last time passed to `update`.
    pub fn now_us(&self) -> i64 {
        self.now_us
    }

    /// Earliest pending round transition, for drivers that sleep between frames.
    pub fn next_wakeup_us(&self) -> Option<i64> {
        self.scheduler.next_due()
    }

    /// Whether key presses are accepted (the keyboard's enabled state).
    pub fn accepts_input(&self) -> bool {
        self.state.phase == Phase::AwaitingInput && !self.state.busy
    }

    /// Keys to light up: the target while it is being performed.
    pub fn highlighted_notes(&self) -> &[Note] {
        match (&self.state.target, self.state.phase) {
            (Some(target), Phase::PlayingBack) => target.notes(),
            _ => &[],
        }
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }

    pub fn store(&self) -> &ProgressStore<G> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProgressStore<G> {
        &mut self.store
    }

    /// Changes difficulty between sessions and remembers it as last played.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if !self.state.phase.is_between_sessions() {
            debug!("select_difficulty ignored in phase {}", self.state.phase);
            return false;
        }
        self.state.difficulty = difficulty;
        if let Err(e) = self.store.set_last_played_difficulty(difficulty) {
            warn!("Failed to save last played difficulty: {e:#}");
        }
        info!("Difficulty set to {difficulty}");
        true
    }

    /// Prepares a fresh session at the current difficulty. Playback is
    /// started separately with `begin_playback`.
    pub fn start_session(&mut self) -> Result<bool, SequenceError> {
        if !self.state.phase.is_between_sessions() {
            debug!("start_session ignored in phase {}", self.state.phase);
            return Ok(false);
        }
        let difficulty = self.state.difficulty;
        let target = sequence::generate(
            sequence::initial_length(difficulty),
            difficulty,
            &mut self.rng,
        )?;

        self.enter_new_round();
        self.state = SessionState::new(difficulty, self.config.starting_lives);
        self.state.target = Some(target);

        match self.store.increment_games_played() {
            Ok(total) => info!("Session started at {difficulty} (game #{total})"),
            Err(e) => warn!("Failed to save games played: {e:#}"),
        }
        Ok(true)
    }

    /// Performs the target of a freshly started session. Later rounds and
    /// retries are played by the session itself once their delay elapses.
    pub fn begin_playback(&mut self) -> bool {
        if self.state.phase != Phase::Idle || self.state.target.is_none() {
            debug!("begin_playback ignored in phase {}", self.state.phase);
            return false;
        }
        self.replay();
        true
    }

    /// Performs the current target. Input is accepted once it finishes.
    fn replay(&mut self) {
        let Some(target) = self.state.target.as_ref() else {
            return;
        };
        let result = self.playback.perform_sequence(target, self.now_us);

        self.state.input.clear();
        match result {
            Ok(ticket) => {
                debug!("Playback {ticket:?} started for round {:?}", self.round);
                self.state.busy = true;
                self.state.phase = Phase::PlayingBack;
                self.in_flight = Some(ticket);
            }
            Err(e) => {
                warn!("Playback unavailable, accepting input immediately: {e:#}");
                self.state.busy = false;
                self.state.phase = Phase::AwaitingInput;
                self.in_flight = None;
            }
        }
    }

    /// Push-style playback completion. Returns false for a ticket that does
    /// not belong to the performance currently awaited.
    pub fn complete_playback(&mut self, ticket: PlaybackTicket) -> bool {
        if self.in_flight != Some(ticket) || self.state.phase != Phase::PlayingBack {
            debug!("Stale playback completion {ticket:?} ignored");
            return false;
        }
        self.finish_playback();
        true
    }

    /// Handles one key press.
    pub fn submit_note(&mut self, note: Note) -> NoteOutcome {
        if !self.accepts_input() {
            debug!("Note {note} ignored in phase {}", self.state.phase);
            return NoteOutcome::Ignored;
        }
        self.playback.trigger_note(note);
        self.state.input.push(note);

        let (on_track, complete) = match self.state.target.as_ref() {
            Some(target) => (
                sequence::validate_partial(&self.state.input, target),
                sequence::validate_full(&self.state.input, target),
            ),
            None => return NoteOutcome::Ignored,
        };

        if !on_track {
            self.state.lives = self.state.lives.saturating_sub(1);
            self.state.phase = Phase::RoundFailure;
            let lives_left = self.state.lives;
            let delay = self.config.timing.failure_delay_us();
            if lives_left == 0 {
                info!("Wrong note {note}, no lives left");
                self.schedule(delay, SessionEvent::EndGame);
            } else {
                info!("Wrong note {note}, {lives_left} lives left");
                self.schedule(delay, SessionEvent::RetryRound);
            }
            return NoteOutcome::Mismatch { lives_left };
        }

        if complete {
            self.state.score += 1;
            self.state.phase = Phase::RoundSuccess;
            let score = self.state.score;
            info!("Round complete, score {score}");
            let timing = &self.config.timing;
            let (achievement_delay, next_round_delay) =
                (timing.achievement_delay_us(), timing.next_round_delay_us());
            self.schedule(achievement_delay, SessionEvent::EvaluateAchievements);
            self.schedule(next_round_delay, SessionEvent::AdvanceRound);
            return NoteOutcome::RoundComplete { score };
        }

        NoteOutcome::Correct
    }

    /// Back to idle defaults, keeping the selected difficulty. Pending
    /// transitions and playback are abandoned.
    pub fn reset(&mut self) {
        self.enter_new_round();
        self.state = SessionState::new(self.state.difficulty, self.config.starting_lives);
        self.refresh_from_store();
        info!("Session reset");
    }

    /// Advances virtual time: resolves finished playback, then fires every
    /// due transition in order.
    pub fn update(&mut self, now_us: i64) {
        self.now_us = self.now_us.max(now_us);

        if let Some(ticket) = self.in_flight {
            if self.playback.poll_complete(ticket, self.now_us) {
                self.complete_playback(ticket);
            }
        }

        while let Some(due) = self.scheduler.pop_due(self.now_us) {
            self.fire(due);
        }
    }

    /// `update` at the clock's current reading.
    pub fn tick(&mut self, clock: &impl GameClock) {
        self.update(clock.elapsed_us());
    }

    /// Re-reads persisted progress. Values only ever move forward, so an
    /// unreadable store does not hide progress made this run.
    fn refresh_from_store(&mut self) {
        let record = self.store.record();
        self.high_score = self.high_score.max(record.high_score);
        let mut merged = record.achievements;
        for local in self.achievements.iter().filter(|a| a.unlocked) {
            if let Some(entry) = merged.iter_mut().find(|a| a.id == local.id && !a.unlocked) {
                *entry = local.clone();
            }
        }
        self.achievements = merged;
    }

    /// Invalidates every pending transition and in-flight playback.
    fn enter_new_round(&mut self) {
        self.round = self.round.next();
        self.scheduler.clear();
        self.in_flight = None;
    }

    fn schedule(&mut self, delay_us: i64, event: SessionEvent) {
        let due = self.now_us.saturating_add(delay_us);
        self.scheduler.schedule_at(due, self.round, event);
    }

    fn finish_playback(&mut self) {
        self.in_flight = None;
        self.state.busy = false;
        self.state.phase = Phase::AwaitingInput;
        debug!("Playback finished, awaiting input");
    }

    fn fire(&mut self, due: Scheduled<SessionEvent>) {
        if due.round != self.round {
            debug!("Stale {:?} from round {:?} ignored", due.event, due.round);
            return;
        }
        match (due.event, self.state.phase) {
            (SessionEvent::EvaluateAchievements, Phase::RoundSuccess) => self.unlock_achievements(),
            (SessionEvent::AdvanceRound, Phase::RoundSuccess) => self.advance_round(),
            (SessionEvent::RetryRound, Phase::RoundFailure) => self.replay(),
            // Lives only reach zero through a mismatch in this round.
            (SessionEvent::EndGame, _) => self.end_game(),
            (event, phase) => debug!("{event:?} ignored in phase {phase}"),
        }
    }

    fn unlock_achievements(&mut self) {
        let Some(target) = self.state.target.as_ref() else {
            return;
        };
        let progress = Progress {
            consecutive_successes: self.state.score,
            difficulty: self.state.difficulty,
            sequence_length: target.len(),
        };
        for id in achievement::newly_satisfied(&progress, &self.achievements) {
            let outcome = self.store.unlock(id);
            let Some(local) = self.achievements.iter_mut().find(|a| a.id == id) else {
                continue;
            };
            match outcome {
                Ok(UnlockOutcome::Unlocked(at)) => {
                    local.unlock(at);
                    info!("Achievement unlocked: {} ({id})", local.name);
                }
                Ok(UnlockOutcome::AlreadyUnlocked) => local.unlocked = true,
                Err(e) => {
                    warn!("Failed to save achievement {id}: {e:#}");
                    local.unlock(Utc::now());
                }
            }
        }
    }

    fn advance_round(&mut self) {
        let current = self.state.target.as_ref().map_or(0, |t| t.len());
        let next = match sequence::generate(
            sequence::next_length(current),
            self.state.difficulty,
            &mut self.rng,
        ) {
            Ok(next) => next,
            Err(e) => {
                error!("Failed to generate next sequence: {e}");
                return;
            }
        };
        debug!("Next round: {} notes", next.len());
        self.enter_new_round();
        self.state.target = Some(next);
        self.replay();
    }

    fn end_game(&mut self) {
        self.state.phase = Phase::GameOver;
        self.state.busy = false;
        let score = self.state.score;
        match self.store.update_high_score(score) {
            Ok(best) => self.high_score = self.high_score.max(best),
            Err(e) => {
                warn!("Failed to save high score: {e:#}");
                self.high_score = self.high_score.max(score);
            }
        }
        info!("Game over, final score {score} (best {})", self.high_score);
    }

    /// Replaces the target and starts a new round, for scenarios that need a
    /// specific sequence.
    #[cfg(test)]
    pub(crate) fn load_target(&mut self, target: Sequence) {
        self.enter_new_round();
        self.state.target = Some(target);
        self.state.input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::ScriptedSource;
    use memoria_audio::{PacedPlayback, RecordingSink};
    use memoria_db::MemoryStore;
    use memoria_types::AchievementId;

    const MS: i64 = 1000;

    type TestSession = GameSession<PacedPlayback<RecordingSink>, MemoryStore, ScriptedSource>;

    fn session(difficulty: Difficulty) -> TestSession {
        let mut s = GameSession::new(
            GameConfig::default(),
            PacedPlayback::new(RecordingSink::new()),
            MemoryStore::new(),
            ScriptedSource::new([0]),
        );
        assert!(s.select_difficulty(difficulty));
        s.start_session().unwrap();
        s
    }

    fn seq(notes: &[Note]) -> Sequence {
        Sequence::new(notes.to_vec()).unwrap()
    }

    /// Plays the target back and waits until input is accepted.
    fn listen(s: &mut TestSession) {
        assert!(s.begin_playback());
        let len = s.target().unwrap().len() as i64;
        s.update(s.now_us() + len * 400 * MS);
        assert_eq!(s.phase(), Phase::AwaitingInput);
    }

    fn unlocked(s: &TestSession, id: AchievementId) -> bool {
        s.achievements().iter().any(|a| a.id == id && a.unlocked)
    }

    #[test]
    fn single_note_success_grows_next_target() {
        let mut s = session(Difficulty::Easy);
        s.load_target(seq(&[Note::C4]));
        listen(&mut s);

        assert_eq!(s.submit_note(Note::C4), NoteOutcome::RoundComplete { score: 1 });
        assert_eq!(s.phase(), Phase::RoundSuccess);
        assert_eq!(s.score(), 1);

        s.update(s.now_us() + 1500 * MS);
        assert_eq!(s.phase(), Phase::PlayingBack);
        assert_eq!(s.target().unwrap().len(), 2);
        assert!(s.input().is_empty());
    }

    #[test]
    fn first_note_mismatch_retries_same_target() {
        let mut s = session(Difficulty::Easy);
        let target = seq(&[Note::C4, Note::D4]);
        s.load_target(target.clone());
        listen(&mut s);

        assert_eq!(s.submit_note(Note::D4), NoteOutcome::Mismatch { lives_left: 2 });
        assert_eq!(s.phase(), Phase::RoundFailure);
        assert_eq!(s.lives(), 2);

        s.update(s.now_us() + 999 * MS);
        assert_eq!(s.phase(), Phase::RoundFailure);
        s.update(s.now_us() + MS);
        assert_eq!(s.phase(), Phase::PlayingBack);
        assert_eq!(s.target(), Some(&target));
        assert!(s.input().is_empty());
    }

    #[test]
    fn last_life_lost_ends_game_and_saves_high_score() {
        let mut s = session(Difficulty::Easy);
        s.load_target(seq(&[Note::C4]));
        listen(&mut s);
        s.submit_note(Note::C4);
        s.update(s.now_us() + 1500 * MS);
        s.update(s.now_us() + 800 * MS);
        assert_eq!(s.phase(), Phase::AwaitingInput);

        // Burn two lives on the two-note round, then lose the last one.
        for expected_lives in [2, 1] {
            assert_eq!(
                s.submit_note(Note::D4),
                NoteOutcome::Mismatch { lives_left: expected_lives }
            );
            s.update(s.now_us() + 1000 * MS);
            s.update(s.now_us() + 800 * MS);
            assert_eq!(s.phase(), Phase::AwaitingInput);
        }
        assert_eq!(s.lives(), 1);
        assert_eq!(s.submit_note(Note::D4), NoteOutcome::Mismatch { lives_left: 0 });
        assert_eq!(s.phase(), Phase::RoundFailure);

        s.update(s.now_us() + 1000 * MS);
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.lives(), 0);
        assert_eq!(s.high_score(), 1);
        assert_eq!(s.store().gateway().record().unwrap().high_score, 1);
    }

    #[test]
    fn game_over_keeps_higher_previous_high_score() {
        let mut s = GameSession::new(
            GameConfig {
                starting_lives: 1,
                ..GameConfig::default()
            },
            PacedPlayback::new(RecordingSink::new()),
            MemoryStore::with_record(memoria_db::PersistedRecord {
                high_score: 9,
                ..Default::default()
            }),
            ScriptedSource::new([0]),
        );
        s.start_session().unwrap();
        listen(&mut s);
        s.submit_note(Note::D4);
        s.update(s.now_us() + 1000 * MS);

        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.high_score(), 9);
        assert_eq!(s.store().gateway().record().unwrap().high_score, 9);
    }

    #[test]
    fn streak_achievements_accumulate() {
        let mut s = session(Difficulty::Easy);
        assert!(s.begin_playback());
        for round in 1..=10u32 {
            let len = s.target().unwrap().len();
            s.update(s.now_us() + len as i64 * 400 * MS);
            assert_eq!(s.phase(), Phase::AwaitingInput);
            for _ in 0..len {
                s.submit_note(Note::C4);
            }
            assert_eq!(s.score(), round);

            s.update(s.now_us() + 500 * MS);
            assert!(unlocked(&s, AchievementId::FirstSequence));
            assert_eq!(unlocked(&s, AchievementId::SequenceMaster10), round >= 10);

            s.update(s.now_us() + 1000 * MS);
            assert_eq!(s.phase(), Phase::PlayingBack);
        }
        let record = s.store().gateway().record().unwrap().clone();
        assert!(record.achievement(AchievementId::FirstSequence).unwrap().unlocked);
        assert!(record.achievement(AchievementId::SequenceMaster10).unwrap().unlocked);
        assert!(!record.achievement(AchievementId::SequenceMaster20).unwrap().unlocked);
    }

    #[test]
    fn level_complete_unlocks_current_tier_only() {
        for (difficulty, expected, other) in [
            (Difficulty::Easy, Difficulty::Easy, Difficulty::Medium),
            (Difficulty::Medium, Difficulty::Medium, Difficulty::Easy),
        ] {
            let mut s = session(difficulty);
            s.load_target(seq(&[Note::C4; 15]));
            listen(&mut s);
            for _ in 0..15 {
                s.submit_note(Note::C4);
            }
            s.update(s.now_us() + 500 * MS);

            assert!(unlocked(&s, AchievementId::LevelComplete(expected)));
            assert!(!unlocked(&s, AchievementId::LevelComplete(other)));
        }
    }

    #[test]
    fn fourteen_notes_do_not_complete_tier() {
        let mut s = session(Difficulty::Easy);
        s.load_target(seq(&[Note::C4; 14]));
        listen(&mut s);
        for _ in 0..14 {
            s.submit_note(Note::C4);
        }
        s.update(s.now_us() + 500 * MS);
        assert!(!unlocked(&s, AchievementId::LevelComplete(Difficulty::Easy)));
    }

    #[test]
    fn highlighted_only_during_playback() {
        let mut s = session(Difficulty::Easy);
        assert!(s.highlighted_notes().is_empty());
        s.begin_playback();
        assert_eq!(s.highlighted_notes(), &[Note::C4; 3]);
        s.update(1200 * MS);
        assert!(s.highlighted_notes().is_empty());
    }

    #[test]
    fn phase_messages() {
        assert_eq!(Phase::PlayingBack.message(), "Listen to the sequence...");
        assert_eq!(Phase::RoundFailure.message(), "Oops! Try again...");
        assert_eq!(Phase::GameOver.to_string(), "GameOver");
    }
}
