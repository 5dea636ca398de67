//! Message broker
//!
//! Routes messages from publishers to subscribers. The broker is an
//! explicitly constructed instance scoped to a zone session and shared via
//! `Rc`; it never owns its subscribers - it holds weak references and the
//! subscriber's owner controls its lifetime.
//!
//! Delivery contract:
//! - subscribers of a kind receive messages in registration order
//! - dispatch iterates a snapshot of the list, so handlers may publish,
//!   subscribe, or unsubscribe re-entrantly without corrupting the
//!   in-progress delivery
//! - entries whose subscriber has been dropped are skipped and pruned

use crate::messages::{Message, MessageType};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Receives messages from the broker.
pub trait Subscriber {
    /// Handle a delivered message.
    fn handle_message(&mut self, message: &Message);
}

/// Identifies a registration so it can be removed later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

struct Entry {
    id: SubscriberId,
    subscriber: Weak<RefCell<dyn Subscriber>>,
}

/// The session message bus.
pub struct MessageBroker {
    subscriptions: RefCell<HashMap<MessageType, Vec<Entry>>>,
    next_id: Cell<u64>,
}

impl MessageBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self {
            subscriptions: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    /// Create a publisher handle bound to this broker.
    pub fn publisher(self: &Rc<Self>) -> Publisher {
        Publisher {
            broker: Rc::clone(self),
        }
    }

    fn allocate_id(&self) -> SubscriberId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        SubscriberId(id)
    }

    /// Subscribe to a single message kind.
    ///
    /// Subscribing the same object twice yields double delivery; callers are
    /// expected not to.
    pub fn subscribe(
        &self,
        subscriber: &Rc<RefCell<dyn Subscriber>>,
        message_type: MessageType,
    ) -> SubscriberId {
        let id = self.allocate_id();
        self.subscriptions
            .borrow_mut()
            .entry(message_type)
            .or_default()
            .push(Entry {
                id,
                subscriber: Rc::downgrade(subscriber),
            });
        id
    }

    /// Subscribe to several message kinds under one id.
    pub fn subscribe_all(
        &self,
        subscriber: &Rc<RefCell<dyn Subscriber>>,
        message_types: &[MessageType],
    ) -> SubscriberId {
        let id = self.allocate_id();
        let mut subscriptions = self.subscriptions.borrow_mut();
        for &message_type in message_types {
            subscriptions.entry(message_type).or_default().push(Entry {
                id,
                subscriber: Rc::downgrade(subscriber),
            });
        }
        id
    }

    /// Remove a registration from one message kind. No-op if absent.
    pub fn unsubscribe(&self, id: SubscriberId, message_type: MessageType) {
        if let Some(entries) = self.subscriptions.borrow_mut().get_mut(&message_type) {
            entries.retain(|entry| entry.id != id);
        }
    }

    /// Remove a registration from every message kind.
    pub fn unsubscribe_all(&self, id: SubscriberId) {
        for entries in self.subscriptions.borrow_mut().values_mut() {
            entries.retain(|entry| entry.id != id);
        }
    }

    /// Deliver a message synchronously to the current subscribers of its
    /// kind, in registration order.
    pub fn publish(&self, message: &Message) {
        let kind = message.kind();

        // Snapshot before iterating; handlers may mutate the table.
        let snapshot: Vec<(SubscriberId, Weak<RefCell<dyn Subscriber>>)> = {
            let subscriptions = self.subscriptions.borrow();
            match subscriptions.get(&kind) {
                Some(entries) => entries
                    .iter()
                    .map(|entry| (entry.id, Weak::clone(&entry.subscriber)))
                    .collect(),
                None => return,
            }
        };

        let mut dead = Vec::new();
        for (id, weak) in &snapshot {
            match weak.upgrade() {
                Some(subscriber) => match subscriber.try_borrow_mut() {
                    Ok(mut subscriber) => subscriber.handle_message(message),
                    Err(_) => {
                        // A handler published a kind it is itself subscribed
                        // to; skipping breaks the cycle.
                        log::warn!("skipping re-entrant delivery of {:?}", kind);
                    }
                },
                None => dead.push(*id),
            }
        }

        if !dead.is_empty() {
            if let Some(entries) = self.subscriptions.borrow_mut().get_mut(&kind) {
                entries.retain(|entry| !dead.contains(&entry.id));
            }
        }
    }

    /// Number of live subscribers for a kind.
    pub fn live_count(&self, message_type: MessageType) -> usize {
        self.subscriptions
            .borrow()
            .get(&message_type)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.subscriber.strong_count() > 0)
                    .count()
            })
            .unwrap_or(0)
    }
}

impl Default for MessageBroker {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending half of the bus; held by game objects that emit messages.
#[derive(Clone)]
pub struct Publisher {
    broker: Rc<MessageBroker>,
}

impl Publisher {
    /// Publish a message through the broker.
    pub fn publish(&self, message: Message) {
        self.broker.publish(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Message;
    use std::cell::Cell;

    struct Recorder {
        label: &'static str,
        received: Rc<RefCell<Vec<(&'static str, Message)>>>,
    }

    impl Subscriber for Recorder {
        fn handle_message(&mut self, message: &Message) {
            self.received.borrow_mut().push((self.label, *message));
        }
    }

    fn recorder(
        label: &'static str,
        received: &Rc<RefCell<Vec<(&'static str, Message)>>>,
    ) -> Rc<RefCell<dyn Subscriber>> {
        Rc::new(RefCell::new(Recorder {
            label,
            received: Rc::clone(received),
        }))
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let broker = Rc::new(MessageBroker::new());
        let received = Rc::new(RefCell::new(Vec::new()));

        let a = recorder("a", &received);
        let b = recorder("b", &received);
        let c = recorder("c", &received);
        broker.subscribe(&a, MessageType::EnemyAttack);
        broker.subscribe(&b, MessageType::EnemyAttack);
        broker.subscribe(&c, MessageType::EnemyAttack);

        broker.publish(&Message::EnemyAttack);

        let order: Vec<_> = received.borrow().iter().map(|(l, _)| *l).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn test_no_delivery_for_other_kinds() {
        let broker = Rc::new(MessageBroker::new());
        let received = Rc::new(RefCell::new(Vec::new()));

        let a = recorder("a", &received);
        broker.subscribe(&a, MessageType::EnemyAttack);

        broker.publish(&Message::PlayerDied);
        assert!(received.borrow().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let broker = Rc::new(MessageBroker::new());
        let received = Rc::new(RefCell::new(Vec::new()));

        let a = recorder("a", &received);
        let id = broker.subscribe(&a, MessageType::EnemyAttack);
        broker.unsubscribe(id, MessageType::EnemyAttack);

        broker.publish(&Message::EnemyAttack);
        assert!(received.borrow().is_empty());
    }

    #[test]
    fn test_double_subscribe_double_delivery() {
        let broker = Rc::new(MessageBroker::new());
        let received = Rc::new(RefCell::new(Vec::new()));

        let a = recorder("a", &received);
        broker.subscribe(&a, MessageType::EnemyAttack);
        broker.subscribe(&a, MessageType::EnemyAttack);

        broker.publish(&Message::EnemyAttack);
        assert_eq!(received.borrow().len(), 2);
    }

    #[test]
    fn test_dropped_subscriber_not_invoked() {
        let broker = Rc::new(MessageBroker::new());
        let received = Rc::new(RefCell::new(Vec::new()));

        let a = recorder("a", &received);
        let b = recorder("b", &received);
        broker.subscribe(&a, MessageType::EnemyAttack);
        broker.subscribe(&b, MessageType::EnemyAttack);
        assert_eq!(broker.live_count(MessageType::EnemyAttack), 2);

        drop(a);
        assert_eq!(broker.live_count(MessageType::EnemyAttack), 1);

        broker.publish(&Message::EnemyAttack);
        let order: Vec<_> = received.borrow().iter().map(|(l, _)| *l).collect();
        assert_eq!(order, ["b"]);
    }

    struct UnsubscribesSelf {
        broker: Rc<MessageBroker>,
        id: Option<SubscriberId>,
        calls: Rc<Cell<u32>>,
    }

    impl Subscriber for UnsubscribesSelf {
        fn handle_message(&mut self, _message: &Message) {
            self.calls.set(self.calls.get() + 1);
            if let Some(id) = self.id.take() {
                self.broker.unsubscribe(id, MessageType::EnemyAttack);
            }
        }
    }

    #[test]
    fn test_reentrant_unsubscribe_during_publish() {
        let broker = Rc::new(MessageBroker::new());
        let received = Rc::new(RefCell::new(Vec::new()));
        let calls = Rc::new(Cell::new(0));

        let first: Rc<RefCell<UnsubscribesSelf>> = Rc::new(RefCell::new(UnsubscribesSelf {
            broker: Rc::clone(&broker),
            id: None,
            calls: Rc::clone(&calls),
        }));
        let as_subscriber: Rc<RefCell<dyn Subscriber>> = first.clone();
        let id = broker.subscribe(&as_subscriber, MessageType::EnemyAttack);
        first.borrow_mut().id = Some(id);

        let tail = recorder("tail", &received);
        broker.subscribe(&tail, MessageType::EnemyAttack);

        // First delivery: handler unsubscribes itself mid-publish; the tail
        // subscriber still receives this message.
        broker.publish(&Message::EnemyAttack);
        assert_eq!(calls.get(), 1);
        assert_eq!(received.borrow().len(), 1);

        // Second delivery: only the tail subscriber remains.
        broker.publish(&Message::EnemyAttack);
        assert_eq!(calls.get(), 1);
        assert_eq!(received.borrow().len(), 2);
    }

    struct PublishesOther {
        publisher: Publisher,
    }

    impl Subscriber for PublishesOther {
        fn handle_message(&mut self, message: &Message) {
            if matches!(message, Message::EnemyAttack) {
                self.publisher.publish(Message::PlayerDied);
            }
        }
    }

    #[test]
    fn test_reentrant_publish_during_publish() {
        let broker = Rc::new(MessageBroker::new());
        let received = Rc::new(RefCell::new(Vec::new()));

        let chained: Rc<RefCell<dyn Subscriber>> = Rc::new(RefCell::new(PublishesOther {
            publisher: broker.publisher(),
        }));
        broker.subscribe(&chained, MessageType::EnemyAttack);

        let a = recorder("a", &received);
        broker.subscribe(&a, MessageType::EnemyAttack);
        broker.subscribe(&a, MessageType::PlayerDied);

        broker.publish(&Message::EnemyAttack);

        // The nested PlayerDied publish completes before the outer delivery
        // reaches "a", which then also receives the original EnemyAttack.
        let order: Vec<_> = received.borrow().iter().map(|(_, m)| m.kind()).collect();
        assert_eq!(order, [MessageType::PlayerDied, MessageType::EnemyAttack]);
    }
}
