use std::cell::RefCell;
use std::collections::VecDeque;

pub type Microtask = Box<dyn FnOnce()>;

/// FIFO of microtasks, run to completion at the start of every loop turn.
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Microtask>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, task: Microtask) {
        self.tasks.borrow_mut().push_back(task);
    }

    pub fn pop(&self) -> Option<Microtask> {
        self.tasks.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Runs tasks until the queue is empty, including tasks queued by the
    /// tasks themselves. Returns how many ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        // The borrow must not be held while a task runs.
        while let Some(task) = self.pop() {
            task();
            ran += 1;
        }
        ran
    }
}
