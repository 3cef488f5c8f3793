pub mod listeners;
pub mod queue;
pub mod scheduler;

use std::cell::RefCell;
use std::rc::Weak;

/// Receives one callback per event-loop idle slot while registered.
pub trait IdleListener {
    fn idle(&mut self);
}

/// Receives application focus changes from the host.
pub trait FocusListener {
    fn focus_lost(&mut self);
    fn focus_gained(&mut self);
}

/// The host environment as seen by UI code: the registration half of the
/// event loop.
///
/// Listeners are held weakly. Registering a listener that is already
/// registered is a no-op, which is what lets several repaint requests within
/// one turn of the loop collapse into a single idle callback.
pub trait Environment {
    fn add_idle_listener(&self, listener: Weak<RefCell<dyn IdleListener>>);

    fn remove_idle_listener(&self, listener: &Weak<RefCell<dyn IdleListener>>);

    fn add_focus_listener(&self, listener: Weak<RefCell<dyn FocusListener>>);

    fn remove_focus_listener(&self, listener: &Weak<RefCell<dyn FocusListener>>);
}

pub use listeners::ListenerSet;
pub use queue::{Microtask, TaskQueue};
pub use scheduler::{LocalEventLoop, LoopStats};
