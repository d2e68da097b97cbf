//! Browser timer driver backed by `gloo-timers`.

use crate::timer::{TimerDriver, TimerEvent, TimerId};
use gloo_timers::callback::{Interval, Timeout};
use log::debug;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

enum Handle {
    Timeout(Timeout),
    Interval(Interval),
}

impl Handle {
    /// Stop the browser timer but hand back its closure, which may still be
    /// executing.
    fn cancel(self) -> Box<dyn Any> {
        match self {
            Handle::Timeout(t) => Box::new(t.cancel()),
            Handle::Interval(i) => Box::new(i.cancel()),
        }
    }
}

#[derive(Default)]
struct Registry {
    live: HashMap<TimerId, Handle>,
    // Closures are dropped on the next callback, never from inside their own
    retired: Vec<Box<dyn Any>>,
}

/// [`TimerDriver`] over `setTimeout`/`setInterval`.
///
/// Every firing is forwarded to `dispatch` as `(TimerId, TimerEvent)`.
/// Dropping the driver cancels all live timers.
pub struct GlooTimers {
    next_id: u64,
    registry: Rc<RefCell<Registry>>,
    dispatch: Rc<dyn Fn(TimerId, TimerEvent)>,
}

impl GlooTimers {
    pub fn new<F>(dispatch: F) -> Self
    where
        F: Fn(TimerId, TimerEvent) + 'static,
    {
        Self {
            next_id: 0,
            registry: Rc::new(RefCell::new(Registry::default())),
            dispatch: Rc::new(dispatch),
        }
    }

    /// Timers scheduled and not yet fired or cleared.
    pub fn live_count(&self) -> usize {
        self.registry.borrow().live.len()
    }

    fn allocate(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }

    fn on_fire(&self, id: TimerId, event: TimerEvent, one_shot: bool) -> impl Fn() + 'static {
        let registry = Rc::downgrade(&self.registry);
        let dispatch = Rc::clone(&self.dispatch);
        move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            {
                let mut reg = registry.borrow_mut();
                reg.retired.clear();
                if one_shot {
                    if let Some(handle) = reg.live.remove(&id) {
                        reg.retired.push(Box::new(handle));
                    }
                }
            }
            dispatch(id, event);
        }
    }
}

impl TimerDriver for GlooTimers {
    fn set_timeout(&mut self, delay_ms: u32, event: TimerEvent) -> TimerId {
        let id = self.allocate();
        let handle = Timeout::new(delay_ms, self.on_fire(id, event, true));
        self.registry
            .borrow_mut()
            .live
            .insert(id, Handle::Timeout(handle));
        id
    }

    fn set_interval(&mut self, period_ms: u32, event: TimerEvent) -> TimerId {
        let id = self.allocate();
        let handle = Interval::new(period_ms, self.on_fire(id, event, false));
        self.registry
            .borrow_mut()
            .live
            .insert(id, Handle::Interval(handle));
        id
    }

    fn clear(&mut self, id: TimerId) {
        let mut reg = self.registry.borrow_mut();
        if let Some(handle) = reg.live.remove(&id) {
            debug!("Cancelled timer {:?}", id);
            let closure = handle.cancel();
            reg.retired.push(closure);
        }
    }
}
