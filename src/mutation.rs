//! Optimistic updates with rollback.
//!
//! A field is shown with its new value as soon as a change is requested and
//! reverted if the server refuses it. Every change gets a generation number, so
//! a slow response that fails after a newer change has been made cannot undo
//! that newer change.

use crate::errors::ClientError;
use std::future::Future;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A locally displayed value plus the last value the server accepted.
#[derive(Debug, Clone)]
pub struct Optimistic<T> {
    value: T,
    confirmed: T,
    next: u64,
    shown: u64,
    confirmed_at: u64,
}

/// Handle for one in-flight change.
#[derive(Debug, Clone)]
pub struct Ticket<T> {
    generation: u64,
    value: T,
}

impl<T> Ticket<T> {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Confirmed,
    RolledBack,
    /// The change failed, but a newer one is already displayed.
    Superseded,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Self {
            confirmed: value.clone(),
            value,
            next: 0,
            shown: 0,
            confirmed_at: 0,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn confirmed(&self) -> &T {
        &self.confirmed
    }

    /// Replaces both values with fresh server state. Outstanding tickets
    /// become stale.
    pub fn hydrate(&mut self, value: T) {
        self.next += 1;
        self.shown = self.next;
        self.confirmed_at = self.next;
        self.confirmed = value.clone();
        self.value = value;
    }

    pub fn begin(&mut self, value: T) -> Ticket<T> {
        self.next += 1;
        self.shown = self.next;
        self.value = value.clone();
        Ticket {
            generation: self.next,
            value,
        }
    }

    pub fn confirm(&mut self, ticket: Ticket<T>) -> Settled {
        if ticket.generation > self.confirmed_at {
            self.confirmed_at = ticket.generation;
            self.confirmed = ticket.value;
            // Nothing newer is on screen (it was rolled back), so show what the server holds.
            if self.shown < ticket.generation {
                self.shown = ticket.generation;
                self.value = self.confirmed.clone();
            }
        }
        Settled::Confirmed
    }

    pub fn fail(&mut self, ticket: Ticket<T>) -> Settled {
        if ticket.generation != self.shown {
            return Settled::Superseded;
        }
        self.value = self.confirmed.clone();
        self.shown = self.confirmed_at;
        Settled::RolledBack
    }

    pub fn settle<R, E>(&mut self, ticket: Ticket<T>, outcome: &Result<R, E>) -> Settled {
        match outcome {
            Ok(_) => self.confirm(ticket),
            Err(_) => self.fail(ticket),
        }
    }
}

impl<T: Clone + Default> Default for Optimistic<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Runs one optimistic change against view state `S`.
///
/// `field` selects the optimistic slot, `next` derives the new value from the
/// displayed one, and `send` builds the request from the state as it looks with
/// the new value applied. The lock is released while the request is in flight.
pub async fn mutate<S, T, R, Fut>(
    state: &Mutex<S>,
    field: impl Fn(&mut S) -> &mut Optimistic<T>,
    next: impl FnOnce(&T) -> T,
    send: impl FnOnce(&S) -> Fut,
) -> Result<R, ClientError>
where
    T: Clone,
    Fut: Future<Output = Result<R, ClientError>>,
{
    let (ticket, request) = {
        let mut guard = state.lock().await;
        let slot = field(&mut *guard);
        let value = next(slot.get());
        let ticket = slot.begin(value);
        (ticket, send(&*guard))
    };

    let outcome = request.await;

    let mut guard = state.lock().await;
    let generation = ticket.generation();
    match field(&mut *guard).settle(ticket, &outcome) {
        Settled::Confirmed => debug!(generation, "optimistic change confirmed"),
        Settled::RolledBack => warn!(generation, "optimistic change rolled back"),
        Settled::Superseded => debug!(generation, "stale optimistic change failed; newer value kept"),
    }
    outcome
}
