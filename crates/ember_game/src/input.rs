//! Input handling
//!
//! The platform pump pushes raw [`InputEvent`]s into an [`EventQueue`]; the
//! [`InputHandler`] drains the queue once per frame and republishes each
//! event on the bus so every interested object reacts in the same frame.

use crate::object::{GameObject, UpdateContext};
use ember_event::{ButtonState, InputEvent, Key, Message, Publisher};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Queue between the platform event pump and the input handler.
#[derive(Default)]
pub struct EventQueue {
    events: RefCell<VecDeque<InputEvent>>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a raw event (called by the platform pump).
    pub fn push(&self, event: InputEvent) {
        self.events.borrow_mut().push_back(event);
    }

    /// Pop the oldest pending event.
    pub fn pop(&self) -> Option<InputEvent> {
        self.events.borrow_mut().pop_front()
    }
}

/// Publishes pending input events onto the bus.
pub struct InputHandler {
    events: Rc<EventQueue>,
    publisher: Publisher,
}

impl InputHandler {
    /// Create a handler draining `events`.
    pub fn new(events: Rc<EventQueue>, publisher: Publisher) -> Self {
        Self { events, publisher }
    }
}

impl GameObject for InputHandler {
    fn update(&mut self, _ctx: &mut UpdateContext<'_>) {
        while let Some(event) = self.events.pop() {
            match event {
                InputEvent::CloseRequested => self.publisher.publish(Message::Quit),
                InputEvent::Key(key) => {
                    if key.key == Key::Escape && key.state == ButtonState::Pressed {
                        self.publisher.publish(Message::Quit);
                    } else {
                        self.publisher.publish(Message::KeyPress(key));
                    }
                }
                InputEvent::MouseMove(motion) => {
                    self.publisher.publish(Message::MouseMove(motion));
                }
                InputEvent::MouseButton(button) => {
                    self.publisher.publish(Message::MouseButtonPress(button));
                }
                InputEvent::Scroll(scroll) => {
                    self.publisher.publish(Message::ScrollWheel(scroll));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_event::{KeyboardInput, MessageBroker, MessageType, Subscriber};
    use ember_physics::PhysicsWorld;
    use ember_scene::Scene;
    use std::rc::Rc;
    use std::time::Duration;

    struct Recorder {
        received: Rc<RefCell<Vec<Message>>>,
    }

    impl Subscriber for Recorder {
        fn handle_message(&mut self, message: &Message) {
            self.received.borrow_mut().push(*message);
        }
    }

    #[test]
    fn test_events_republished_in_order() {
        let broker = Rc::new(MessageBroker::new());
        let queue = Rc::new(EventQueue::new());
        let mut handler = InputHandler::new(queue.clone(), broker.publisher());

        let received = Rc::new(RefCell::new(Vec::new()));
        let recorder: Rc<RefCell<dyn Subscriber>> = Rc::new(RefCell::new(Recorder {
            received: Rc::clone(&received),
        }));
        broker.subscribe_all(&recorder, &[MessageType::KeyPress, MessageType::Quit]);

        queue.push(InputEvent::Key(KeyboardInput {
            key: Key::W,
            state: ButtonState::Pressed,
        }));
        queue.push(InputEvent::Key(KeyboardInput {
            key: Key::Escape,
            state: ButtonState::Pressed,
        }));

        let mut physics = PhysicsWorld::with_gravity(glam::Vec3::ZERO);
        let mut scene = Scene::new();
        let mut ctx = UpdateContext {
            physics: &mut physics,
            scene: &mut scene,
            delta: Duration::from_millis(16),
            elapsed: Duration::ZERO,
        };
        handler.update(&mut ctx);

        let kinds: Vec<_> = received.borrow().iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, [MessageType::KeyPress, MessageType::Quit]);
        // Queue fully drained
        assert!(queue.pop().is_none());
    }
}
