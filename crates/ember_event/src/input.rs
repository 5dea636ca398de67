//! Input event types carried as message payloads
//!
//! The runtime translates platform window events into these before they
//! reach the bus, so the gameplay crates never see the windowing library.

/// Keys the game reacts to. Anything else maps to [`Key::Other`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    R,
    Space,
    Escape,
    Other,
}

impl Key {
    /// Whether this key contributes to walk movement.
    pub fn is_movement(&self) -> bool {
        matches!(self, Key::W | Key::A | Key::S | Key::D)
    }
}

/// Pressed/released state for keys and mouse buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Mouse buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Key press/release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyboardInput {
    pub key: Key,
    pub state: ButtonState,
}

/// Relative mouse movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseMotion {
    pub delta_x: f32,
    pub delta_y: f32,
}

/// Mouse button press/release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseButtonInput {
    pub button: MouseButton,
    pub state: ButtonState,
}

/// Scroll wheel movement, in lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseScroll {
    pub delta_y: f32,
}

/// Raw event handed from the platform pump to the input handler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    CloseRequested,
    Key(KeyboardInput),
    MouseMove(MouseMotion),
    MouseButton(MouseButtonInput),
    Scroll(MouseScroll),
}
