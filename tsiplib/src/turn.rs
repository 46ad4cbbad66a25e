use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

/// How often a waiting party wakes up to check for cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// A shared flag that stops everyone waiting on a [Turnstile].
///
/// Clones share the same flag. Once cancelled, it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct TurnState<T> {
    turn: usize,
    value: T,
}

/// Strict round-robin access to a value.
///
/// Parties are numbered `0..parties`, and are let in one at a time in
/// exactly that order, over and over. A party that arrives early waits
/// for its turn.
#[derive(Debug)]
pub struct Turnstile<T> {
    state: Mutex<TurnState<T>>,
    turn_changed: Condvar,
    parties: usize,
}

impl<T> Turnstile<T> {
    /// Party 0 goes first. At least one party is assumed.
    pub fn new(parties: usize, value: T) -> Self {
        Self {
            state: Mutex::new(TurnState { turn: 0, value }),
            turn_changed: Condvar::new(),
            parties: parties.max(1),
        }
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    /// The party currently allowed in.
    pub fn turn(&self) -> usize {
        self.state.lock().turn
    }

    /// Wait for `party`'s turn. The turn passes to the next party when
    /// the returned guard is dropped.
    ///
    /// Returns [None], without taking the turn, once `cancel` is set.
    pub fn acquire(&self, party: usize, cancel: &CancelToken) -> Option<TurnGuard<'_, T>> {
        debug_assert!(party < self.parties);

        let mut state = self.state.lock();
        loop {
            if cancel.is_cancelled() {
                return None;
            }
            if state.turn == party {
                return Some(TurnGuard {
                    turnstile: self,
                    state,
                });
            }
            self.turn_changed.wait_for(&mut state, CANCEL_POLL);
        }
    }

    pub fn into_inner(self) -> T {
        self.state.into_inner().value
    }
}

/// Exclusive access to a [Turnstile]'s value during one party's turn.
pub struct TurnGuard<'a, T> {
    turnstile: &'a Turnstile<T>,
    state: MutexGuard<'a, TurnState<T>>,
}

impl<T> core::ops::Deref for TurnGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.state.value
    }
}

impl<T> core::ops::DerefMut for TurnGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state.value
    }
}

impl<T> Drop for TurnGuard<'_, T> {
    fn drop(&mut self) {
        self.state.turn = (self.state.turn + 1) % self.turnstile.parties;
        self.turnstile.turn_changed.notify_all();
    }
}
