//! Single-value channel between a task and whoever waits for its outcome.
//!
//! The channel is in one of three states: `Pending` until the sender delivers a
//! value, `Ready` while the value waits to be taken, and `Closed` once the value has
//! been taken or the sender went away without sending.

use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

/// Creates a connected sender and receiver.
pub fn channel<T>() -> (OneshotSender<T>, OneshotReceiver<T>) {
    let cell = Arc::new(OneshotCell::new(State::Pending));
    (OneshotSender(cell.clone()), OneshotReceiver(cell))
}

/// Creates a receiver already holding `value`.
pub fn ready<T>(value: T) -> OneshotReceiver<T> {
    OneshotReceiver(Arc::new(OneshotCell::new(State::Ready(value))))
}

/// Sending half. Dropping it without sending closes the channel.
pub struct OneshotSender<T>(Arc<OneshotCell<T>>);

impl<T> OneshotSender<T> {
    /// Delivers `value`, or hands it back if the channel is no longer pending.
    pub fn send(self, value: T) -> Result<(), T> {
        self.0.set(value)
    }

    pub fn is_pending(&self) -> bool {
        self.0.lock().is_pending()
    }
}

impl<T> Drop for OneshotSender<T> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Receiving half.
pub struct OneshotReceiver<T>(Arc<OneshotCell<T>>);

impl<T> OneshotReceiver<T> {
    /// Blocks until the value arrives. `None` means the sender went away or the value
    /// was already taken.
    pub fn recv(&self) -> Option<T> {
        let guard = self.0.lock();
        let mut guard = self
            .0
            .condvar
            .wait_while(guard, |state| state.is_pending())
            .unwrap_or_else(PoisonError::into_inner);
        guard.take()
    }

    /// Like [`recv`](Self::recv) but gives up after `timeout`, returning `Err(())`
    /// while the channel is still pending.
    #[allow(clippy::result_unit_err)]
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<T>, ()> {
        let guard = self.0.lock();
        let (mut guard, _) = self
            .0
            .condvar
            .wait_timeout_while(guard, timeout, |state| state.is_pending())
            .unwrap_or_else(PoisonError::into_inner);
        guard.try_take()
    }

    #[allow(clippy::result_unit_err)]
    pub fn try_recv(&self) -> Result<Option<T>, ()> {
        self.0.lock().try_take()
    }

    pub fn is_pending(&self) -> bool {
        self.0.lock().is_pending()
    }
}

struct OneshotCell<T> {
    state: Mutex<State<T>>,
    condvar: Condvar,
}

impl<T> OneshotCell<T> {
    fn new(state: State<T>) -> OneshotCell<T> {
        OneshotCell {
            state: Mutex::new(state),
            condvar: Condvar::new(),
        }
    }

    // A panicking holder cannot leave `State` half-updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, value: T) -> Result<(), T> {
        let res = self.lock().set(value);
        self.condvar.notify_all();
        res
    }

    fn close(&self) {
        self.lock().close();
        self.condvar.notify_all();
    }
}

enum State<T> {
    Pending,
    Ready(T),
    Closed,
}

impl<T> State<T> {
    fn is_pending(&self) -> bool {
        matches!(self, State::Pending)
    }

    fn set(&mut self, value: T) -> Result<(), T> {
        match self {
            State::Pending => {
                *self = State::Ready(value);
                Ok(())
            }
            State::Ready(_) | State::Closed => Err(value),
        }
    }

    fn try_take(&mut self) -> Result<Option<T>, ()> {
        if self.is_pending() {
            Err(())
        } else {
            Ok(self.take())
        }
    }

    /// Takes a ready value. A pending state is left untouched.
    fn take(&mut self) -> Option<T> {
        match std::mem::replace(self, State::Closed) {
            State::Ready(value) => Some(value),
            State::Pending => {
                *self = State::Pending;
                None
            }
            State::Closed => None,
        }
    }

    fn close(&mut self) {
        if self.is_pending() {
            *self = State::Closed;
        }
    }
}
