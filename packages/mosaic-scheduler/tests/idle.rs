use mosaic_scheduler::{Environment, FocusListener, IdleListener, LocalEventLoop};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Idle listener that unregisters itself after each callback, the way a
/// repaint request behaves.
struct OneShot {
    env: Rc<LocalEventLoop>,
    this: Weak<RefCell<OneShot>>,
    calls: Rc<Cell<u32>>,
}

impl OneShot {
    fn new(env: Rc<LocalEventLoop>, calls: Rc<Cell<u32>>) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                env,
                this: this.clone(),
                calls,
            })
        })
    }

    fn request(&self) {
        let me: Weak<RefCell<dyn IdleListener>> = self.this.clone();
        self.env.add_idle_listener(me);
    }
}

impl IdleListener for OneShot {
    fn idle(&mut self) {
        self.calls.set(self.calls.get() + 1);
        let me: Weak<RefCell<dyn IdleListener>> = self.this.clone();
        self.env.remove_idle_listener(&me);
    }
}

#[test]
fn test_requests_in_one_turn_coalesce() {
    let env = Rc::new(LocalEventLoop::new());
    let calls = Rc::new(Cell::new(0));
    let listener = OneShot::new(env.clone(), calls.clone());

    for _ in 0..5 {
        listener.borrow().request();
    }
    assert_eq!(env.idle_listener_count(), 1);
    assert!(!env.is_idle());

    // The listener removed itself, so nothing is pending afterwards.
    assert!(!env.tick());
    assert_eq!(calls.get(), 1);

    assert!(!env.tick());
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_request_after_idle_schedules_again() {
    let env = Rc::new(LocalEventLoop::new());
    let calls = Rc::new(Cell::new(0));
    let listener = OneShot::new(env.clone(), calls.clone());

    listener.borrow().request();
    env.tick();
    listener.borrow().request();
    env.tick();

    assert_eq!(calls.get(), 2);
    assert_eq!(env.stats().idle_dispatches, 2);
}

#[test]
fn test_dropped_listener_is_never_called() {
    let env = Rc::new(LocalEventLoop::new());
    let calls = Rc::new(Cell::new(0));
    let listener = OneShot::new(env.clone(), calls.clone());

    listener.borrow().request();
    drop(listener);

    assert!(env.is_idle());
    env.tick();
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_busy_listener_keeps_its_slot() {
    let env = Rc::new(LocalEventLoop::new());
    let calls = Rc::new(Cell::new(0));
    let listener = OneShot::new(env.clone(), calls.clone());
    listener.borrow().request();

    {
        let _held = listener.borrow_mut();
        assert!(env.tick());
    }
    assert_eq!(calls.get(), 0);

    assert!(!env.tick());
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_run_until_idle_stops_when_drained() {
    let env = Rc::new(LocalEventLoop::new());
    let calls = Rc::new(Cell::new(0));
    let listener = OneShot::new(env.clone(), calls.clone());
    listener.borrow().request();

    let ticks = env.run_until_idle(10);
    assert_eq!(ticks, 1);
    assert_eq!(calls.get(), 1);
    assert_eq!(env.run_until_idle(10), 0);
}

#[derive(Default)]
struct FocusLog(Vec<&'static str>);

impl FocusListener for FocusLog {
    fn focus_lost(&mut self) {
        self.0.push("lost");
    }

    fn focus_gained(&mut self) {
        self.0.push("gained");
    }
}

#[test]
fn test_focus_fan_out() {
    let env = LocalEventLoop::new();
    let a = Rc::new(RefCell::new(FocusLog::default()));
    let b = Rc::new(RefCell::new(FocusLog::default()));

    let wa: Weak<RefCell<dyn FocusListener>> = Rc::downgrade(&a) as Weak<RefCell<_>>;
    let wb: Weak<RefCell<dyn FocusListener>> = Rc::downgrade(&b) as Weak<RefCell<_>>;
    env.add_focus_listener(wa.clone());
    env.add_focus_listener(wb);
    assert_eq!(env.focus_listener_count(), 2);

    env.dispatch_focus_lost();
    env.remove_focus_listener(&wa);
    env.dispatch_focus_gained();

    assert_eq!(a.borrow().0, vec!["lost"]);
    assert_eq!(b.borrow().0, vec!["lost", "gained"]);
}
