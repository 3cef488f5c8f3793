use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Weakly held, duplicate-free listener registry.
///
/// Dispatch goes through [`ListenerSet::snapshot`], which releases the
/// internal borrow before any listener runs, so listeners may add or remove
/// entries (themselves included) while being notified.
pub struct ListenerSet<T: ?Sized> {
    entries: RefCell<SmallVec<[Weak<RefCell<T>>; 4]>>,
}

impl<T: ?Sized> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(SmallVec::new()),
        }
    }
}

impl<T: ?Sized> ListenerSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the listener was already registered.
    pub fn add(&self, listener: Weak<RefCell<T>>) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|l| l.ptr_eq(&listener)) {
            return false;
        }
        entries.push(listener);
        true
    }

    pub fn remove(&self, listener: &Weak<RefCell<T>>) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|l| !l.ptr_eq(listener));
        entries.len() != before
    }

    pub fn contains(&self, listener: &Weak<RefCell<T>>) -> bool {
        self.entries.borrow().iter().any(|l| l.ptr_eq(listener))
    }

    /// Number of registered listeners that are still alive.
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops dead entries and returns strong handles to the live ones.
    pub fn snapshot(&self) -> SmallVec<[Rc<RefCell<T>>; 4]> {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|l| l.strong_count() > 0);
        entries.iter().filter_map(Weak::upgrade).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration_is_ignored() {
        let set: ListenerSet<u32> = ListenerSet::new();
        let a = Rc::new(RefCell::new(1));
        assert!(set.add(Rc::downgrade(&a)));
        assert!(!set.add(Rc::downgrade(&a)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn dead_entries_are_pruned() {
        let set: ListenerSet<u32> = ListenerSet::new();
        let a = Rc::new(RefCell::new(1));
        let b = Rc::new(RefCell::new(2));
        set.add(Rc::downgrade(&a));
        set.add(Rc::downgrade(&b));
        drop(a);

        assert_eq!(set.len(), 1);
        let live = set.snapshot();
        assert_eq!(live.len(), 1);
        assert_eq!(*live[0].borrow(), 2);
    }

    #[test]
    fn remove_by_identity() {
        let set: ListenerSet<u32> = ListenerSet::new();
        let a = Rc::new(RefCell::new(1));
        let weak = Rc::downgrade(&a);
        set.add(weak.clone());
        assert!(set.contains(&weak));
        assert!(set.remove(&weak));
        assert!(!set.remove(&weak));
        assert!(set.is_empty());
    }
}
