use crate::listeners::ListenerSet;
use crate::queue::{Microtask, TaskQueue};
use crate::{Environment, FocusListener, IdleListener};
use std::cell::{Cell, RefCell};
use std::rc::Weak;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub tasks_run: u64,
    pub idle_dispatches: u64,
}

/// Cooperative, single-threaded event loop.
///
/// One `tick` is one turn of the loop: queued microtasks run first (FIFO,
/// including tasks they schedule), then every registered idle listener gets
/// exactly one `idle` call. Listeners stay registered until they remove
/// themselves, so an idle listener that unregisters from inside `idle` is a
/// one-shot callback.
#[derive(Default)]
pub struct LocalEventLoop {
    microtasks: TaskQueue,
    idle_listeners: ListenerSet<dyn IdleListener>,
    focus_listeners: ListenerSet<dyn FocusListener>,
    stats: Cell<LoopStats>,
}

impl LocalEventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_microtask(&self, task: Microtask) {
        self.microtasks.push(task);
    }

    /// Runs one turn of the loop. Returns true if work is still pending.
    pub fn tick(&self) -> bool {
        let mut stats = self.stats.get();
        stats.ticks += 1;
        stats.tasks_run += self.microtasks.drain() as u64;

        for listener in self.idle_listeners.snapshot() {
            match listener.try_borrow_mut() {
                Ok(mut l) => {
                    l.idle();
                    stats.idle_dispatches += 1;
                }
                // Still registered, so it gets the next slot.
                Err(_) => tracing::warn!("idle listener busy, skipping this slot"),
            }
        }

        self.stats.set(stats);
        !self.is_idle()
    }

    /// Ticks until nothing is pending or `max_ticks` turns have run.
    /// Returns the number of turns taken.
    pub fn run_until_idle(&self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && !self.is_idle() {
            self.tick();
            ticks += 1;
        }
        if !self.is_idle() {
            tracing::debug!(max_ticks, "event loop still busy after tick budget");
        }
        ticks
    }

    pub fn is_idle(&self) -> bool {
        self.microtasks.is_empty() && self.idle_listeners.is_empty()
    }

    pub fn idle_listener_count(&self) -> usize {
        self.idle_listeners.len()
    }

    pub fn focus_listener_count(&self) -> usize {
        self.focus_listeners.len()
    }

    pub fn pending_microtasks(&self) -> usize {
        self.microtasks.len()
    }

    pub fn stats(&self) -> LoopStats {
        self.stats.get()
    }

    pub fn dispatch_focus_lost(&self) {
        tracing::debug!("focus lost");
        for listener in self.focus_listeners.snapshot() {
            if let Ok(mut l) = listener.try_borrow_mut() {
                l.focus_lost();
            }
        }
    }

    pub fn dispatch_focus_gained(&self) {
        tracing::debug!("focus gained");
        for listener in self.focus_listeners.snapshot() {
            if let Ok(mut l) = listener.try_borrow_mut() {
                l.focus_gained();
            }
        }
    }
}

impl Environment for LocalEventLoop {
    fn add_idle_listener(&self, listener: Weak<RefCell<dyn IdleListener>>) {
        if self.idle_listeners.add(listener) {
            tracing::trace!("idle listener registered");
        }
    }

    fn remove_idle_listener(&self, listener: &Weak<RefCell<dyn IdleListener>>) {
        self.idle_listeners.remove(listener);
    }

    fn add_focus_listener(&self, listener: Weak<RefCell<dyn FocusListener>>) {
        self.focus_listeners.add(listener);
    }

    fn remove_focus_listener(&self, listener: &Weak<RefCell<dyn FocusListener>>) {
        self.focus_listeners.remove(listener);
    }
}
