//! Per-form single-flight guard.

use core::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use html::NodeId;

/// Forms with an exchange in flight.
#[derive(Clone, Debug, Default)]
pub struct FlightGuard {
    busy: Rc<RefCell<HashSet<NodeId>>>,
}

impl FlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `form` busy. `None` when it already is.
    pub fn try_enter(&self, form: NodeId) -> Option<FlightPermit> {
        self.busy.borrow_mut().insert(form).then(|| FlightPermit {
            guard: self.clone(),
            form,
        })
    }

    pub fn leave(&self, form: NodeId) {
        self.busy.borrow_mut().remove(&form);
    }

    pub fn is_busy(&self, form: NodeId) -> bool {
        self.busy.borrow().contains(&form)
    }
}

/// Clears the busy flag when dropped, on every exit path.
#[derive(Debug)]
pub struct FlightPermit {
    guard: FlightGuard,
    form: NodeId,
}

impl Drop for FlightPermit {
    fn drop(&mut self) {
        self.guard.leave(self.form);
    }
}
