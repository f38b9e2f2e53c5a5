//! Sequence generation and validation.
//!
//! Pure functions over an injected random source. Each round draws a brand
//! new sequence; nothing here extends a previous one.

use std::collections::VecDeque;

use memoria_types::{Difficulty, NOTE_COUNT, Note, Sequence};
use rand::Rng;
use thiserror::Error;

/// Configuration errors: these indicate a programming mistake, not a
/// gameplay state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("sequence length must be at least 1")]
    EmptySequence,

    #[error("invalid note pool size {pool_size}: expected 1..={max}", max = NOTE_COUNT)]
    InvalidPoolSize { pool_size: usize },
}

/// Source of uniformly distributed indices.
pub trait RandomSource {
    /// Returns an index in `0..bound`. `bound` is always at least 1.
    fn pick(&mut self, bound: usize) -> usize;
}

/// Adapts any `rand::Rng` (seeded `StdRng`, `thread_rng`, ...).
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn pick(&mut self, bound: usize) -> usize {
        self.0.gen_range(0..bound)
    }
}

/// Replays a fixed list of indices, cycling when exhausted. Each index is
/// reduced modulo the requested bound.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    script: VecDeque<usize>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = usize>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// A script that picks exactly these notes (while they fit the pool).
    pub fn notes(notes: &[Note]) -> Self {
        Self::new(notes.iter().map(|n| n.index()))
    }
}

impl RandomSource for ScriptedSource {
    fn pick(&mut self, bound: usize) -> usize {
        match self.script.pop_front() {
            Some(index) => {
                self.script.push_back(index);
                index % bound
            }
            None => 0,
        }
    }
}

/// Length of the first sequence of a session.
pub fn initial_length(difficulty: Difficulty) -> usize {
    difficulty.value() as usize
}

/// Length of the sequence that follows a completed one.
pub fn next_length(current: usize) -> usize {
    current + 1
}

/// Draws `length` notes uniformly, with replacement, from the difficulty's pool.
pub fn generate(
    length: usize,
    difficulty: Difficulty,
    rng: &mut impl RandomSource,
) -> Result<Sequence, SequenceError> {
    generate_from_pool(length, difficulty.pool_size(), rng)
}

/// Draws `length` notes uniformly, with replacement, from the first
/// `pool_size` notes of the alphabet.
pub fn generate_from_pool(
    length: usize,
    pool_size: usize,
    rng: &mut impl RandomSource,
) -> Result<Sequence, SequenceError> {
    if pool_size == 0 || pool_size > NOTE_COUNT {
        return Err(SequenceError::InvalidPoolSize { pool_size });
    }
    if length == 0 {
        return Err(SequenceError::EmptySequence);
    }
    let pool = &Note::all()[..pool_size];
    let notes: Vec<Note> = (0..length).map(|_| pool[rng.pick(pool_size)]).collect();
    Sequence::new(notes).ok_or(SequenceError::EmptySequence)
}

/// True iff `user` reproduces `target` exactly.
pub fn validate_full(user: &[Note], target: &[Note]) -> bool {
    user == target
}

/// True iff `user` agrees with the start of `target` so far.
/// The empty input and the full target both qualify.
pub fn validate_partial(user: &[Note], target: &[Note]) -> bool {
    user.len() <= target.len() && target.starts_with(user)
}
