//! # ember_event - Message Bus
//!
//! Publish/subscribe bus connecting decoupled gameplay components:
//! - Closed [`Message`] enumeration with a statically typed payload per kind
//! - [`MessageBroker`] with insertion-order delivery and copy-on-iterate
//!   dispatch, safe against re-entrant publishes and subscription changes
//! - [`Publisher`] handle and [`Subscriber`] trait used by game objects
//!   through composition
//!
//! Everything runs on one thread; delivery is synchronous.

mod broker;
mod input;
mod messages;

pub use broker::{MessageBroker, Publisher, Subscriber, SubscriberId};
pub use input::{ButtonState, InputEvent, Key, KeyboardInput, MouseButton, MouseButtonInput,
    MouseMotion, MouseScroll};
pub use messages::{Message, MessageType};
