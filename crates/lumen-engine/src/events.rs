//! Engine events and the subscriber list they are dispatched to

use crate::stats::PerformanceStats;
use lumen_particles::ParticleId;
use std::ops::ControlFlow;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Simulation advanced by `delta` seconds
    Updated { delta: f32, active: usize },
    Rendered { active: usize },
    ParticleCreated(ParticleId),
    ParticleDestroyed(ParticleId),
    PerformanceUpdated(PerformanceStats),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Return `ControlFlow::Break(())` to ask the engine to stop
pub type Subscriber = Box<dyn FnMut(&EngineEvent) -> ControlFlow<()>>;

/// Queue that the engine pushes to during a frame, plus the subscribers the
/// queue is dispatched to at the frame boundary
pub struct EventBus {
    events: Vec<EngineEvent>,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_id: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn push(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Take pending events without delivering them
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriberId
    where
        F: FnMut(&EngineEvent) -> ControlFlow<()> + 'static,
    {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// False if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }

    /// Deliver every pending event to every subscriber, in registration order.
    /// All events are delivered even after a subscriber breaks; the break is
    /// reported once the queue is empty.
    pub fn dispatch(&mut self) -> ControlFlow<()> {
        let events = self.drain();
        let mut flow = ControlFlow::Continue(());
        for event in &events {
            for (_, subscriber) in &mut self.subscribers {
                if subscriber(event).is_break() {
                    flow = ControlFlow::Break(());
                }
            }
        }
        flow
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_push_and_dispatch() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(move |e| {
            sink.borrow_mut().push(e.clone());
            ControlFlow::Continue(())
        });

        bus.push(EngineEvent::ParticleCreated(ParticleId(0)));
        bus.push(EngineEvent::Rendered { active: 1 });
        assert_eq!(bus.len(), 2);

        assert!(bus.dispatch().is_continue());
        assert!(bus.is_empty());
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[0], EngineEvent::ParticleCreated(ParticleId(0)));
    }

    #[test]
    fn test_every_subscriber_sees_every_event() {
        let mut bus = EventBus::new();
        let counts = Rc::new(RefCell::new([0usize; 2]));
        for slot in 0..2 {
            let counts = Rc::clone(&counts);
            bus.subscribe(move |_| {
                counts.borrow_mut()[slot] += 1;
                ControlFlow::Continue(())
            });
        }
        bus.push(EngineEvent::Rendered { active: 0 });
        bus.push(EngineEvent::Rendered { active: 0 });
        bus.push(EngineEvent::Rendered { active: 0 });
        bus.dispatch();
        assert_eq!(*counts.borrow(), [3, 3]);
    }

    #[test]
    fn test_break_is_reported_after_full_delivery() {
        let mut bus = EventBus::new();
        let later = Rc::new(RefCell::new(0));
        bus.subscribe(|_| ControlFlow::Break(()));
        let sink = Rc::clone(&later);
        bus.subscribe(move |_| {
            *sink.borrow_mut() += 1;
            ControlFlow::Continue(())
        });
        bus.push(EngineEvent::Rendered { active: 0 });
        bus.push(EngineEvent::Rendered { active: 0 });
        assert!(bus.dispatch().is_break());
        assert_eq!(*later.borrow(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let a = bus.subscribe(|_| ControlFlow::Continue(()));
        let b = bus.subscribe(|_| ControlFlow::Break(()));
        assert_ne!(a, b);
        assert!(bus.unsubscribe(b));
        assert!(!bus.unsubscribe(b));
        assert_eq!(bus.subscriber_count(), 1);
        bus.push(EngineEvent::Rendered { active: 0 });
        assert!(bus.dispatch().is_continue());
    }

    #[test]
    fn test_drain_clears() {
        let mut bus = EventBus::new();
        bus.push(EngineEvent::ParticleDestroyed(ParticleId(3)));
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.drain().is_empty());
    }
}
