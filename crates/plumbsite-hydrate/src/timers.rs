//! Recurring timers owned by a page session.
//!
//! Every interval a widget starts is registered here so teardown can cancel
//! all of them at once. Timers run as local tasks and must be created from
//! inside a `tokio::task::LocalSet`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Default)]
struct Timers {
    next_id: u64,
    handles: HashMap<TimerId, JoinHandle<()>>,
}

/// Cloneable handle to a session's timer table.
#[derive(Debug, Clone, Default)]
pub struct TimerRegistry {
    inner: Rc<RefCell<Timers>>,
}

impl TimerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls `tick` every `period`, first after one full period.
    ///
    /// The timer ends when `tick` returns [`ControlFlow::Break`] or when it
    /// is cleared. Ticks delayed by a busy runtime are not bunched up.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `LocalSet`.
    pub fn set_interval(
        &self,
        period: Duration,
        mut tick: impl FnMut() -> ControlFlow<()> + 'static,
    ) -> TimerId {
        let id = {
            let mut timers = self.inner.borrow_mut();
            timers.next_id += 1;
            TimerId(timers.next_id)
        };
        let registry: Weak<RefCell<Timers>> = Rc::downgrade(&self.inner);

        let handle = tokio::task::spawn_local(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tick().is_break() {
                    break;
                }
            }
            if let Some(timers) = registry.upgrade() {
                timers.borrow_mut().handles.remove(&id);
            }
            tracing::trace!(?id, "timer finished");
        });

        self.inner.borrow_mut().handles.insert(id, handle);
        id
    }

    /// Cancels one timer. Returns `false` if it had already ended.
    pub fn clear(&self, id: TimerId) -> bool {
        let handle = self.inner.borrow_mut().handles.remove(&id);
        match handle {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancels every live timer; returns how many were cancelled.
    pub fn clear_all(&self) -> usize {
        let handles: Vec<_> = self.inner.borrow_mut().handles.drain().collect();
        for (_, handle) in &handles {
            handle.abort();
        }
        if !handles.is_empty() {
            tracing::debug!(cleared = handles.len(), "timers cleared");
        }
        handles.len()
    }

    #[must_use]
    pub fn is_live(&self, id: TimerId) -> bool {
        self.inner.borrow().handles.contains_key(&id)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.inner.borrow().handles.len()
    }
}
