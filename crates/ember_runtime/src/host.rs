//! winit-backed game host
//!
//! Pumps the platform event loop each frame, translating window events into
//! the game's input queue, and presents through the wgpu presenter. The
//! window is created once, on the event loop's first resume.

use crate::presenter::{backends_from_selector, Presenter};
use crate::RuntimeError;
use ember_event::{ButtonState, InputEvent, Key, KeyboardInput, MouseButtonInput, MouseMotion,
    MouseScroll};
use ember_game::{CameraView, EventQueue, GameConfig, GameHost};
use ember_scene::Scene;
use std::sync::Arc;
use std::time::Duration;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::{Window, WindowId};

/// How long each pump blocks waiting for events; doubles as frame pacing.
const PUMP_TIMEOUT: Duration = Duration::from_millis(8);

struct App {
    title: String,
    width: u32,
    height: u32,
    backends: wgpu::Backends,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    pending: Vec<InputEvent>,
    death_screen: bool,
}

impl App {
    fn translate_key(code: KeyCode) -> Key {
        match code {
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::KeyR => Key::R,
            KeyCode::Space => Key::Space,
            KeyCode::Escape => Key::Escape,
            _ => Key::Other,
        }
    }

    fn translate_state(state: ElementState) -> ButtonState {
        match state {
            ElementState::Pressed => ButtonState::Pressed,
            ElementState::Released => ButtonState::Released,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(self.width, self.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                log::error!("failed to create window: {error}");
                return;
            }
        };

        match Presenter::new(window.clone(), self.width, self.height, self.backends) {
            Ok(presenter) => self.presenter = Some(presenter),
            Err(error) => log::error!("failed to create presenter: {error}"),
        }
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.pending.push(InputEvent::CloseRequested),
            WindowEvent::Resized(size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                // Key repeats would inflate the game's press counting
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.pending.push(InputEvent::Key(KeyboardInput {
                        key: Self::translate_key(code),
                        state: Self::translate_state(event.state),
                    }));
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => ember_event::MouseButton::Left,
                    winit::event::MouseButton::Right => ember_event::MouseButton::Right,
                    winit::event::MouseButton::Middle => ember_event::MouseButton::Middle,
                    _ => return,
                };
                self.pending.push(InputEvent::MouseButton(MouseButtonInput {
                    button,
                    state: Self::translate_state(state),
                }));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / 20.0,
                };
                self.pending
                    .push(InputEvent::Scroll(MouseScroll { delta_y }));
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.pending.push(InputEvent::MouseMove(MouseMotion {
                delta_x: delta.0 as f32,
                delta_y: delta.1 as f32,
            }));
        }
    }
}

/// Platform host backed by winit and wgpu.
pub struct WinitHost {
    event_loop: EventLoop<()>,
    app: App,
}

impl WinitHost {
    /// Create the host; the window appears on the first pump.
    pub fn new(config: &GameConfig) -> Result<Self, RuntimeError> {
        let event_loop = EventLoop::new()?;
        Ok(Self {
            event_loop,
            app: App {
                title: "Emberwood".to_string(),
                width: config.screen_width,
                height: config.screen_height,
                backends: backends_from_selector(&config.graphics_api),
                window: None,
                presenter: None,
                pending: Vec::new(),
                death_screen: false,
            },
        })
    }
}

impl GameHost for WinitHost {
    fn pump(&mut self, events: &EventQueue) {
        let _status = self
            .event_loop
            .pump_app_events(Some(PUMP_TIMEOUT), &mut self.app);
        for event in self.app.pending.drain(..) {
            events.push(event);
        }
    }

    fn begin_zone(&mut self, zone_name: &str) {
        log::debug!("presenting zone '{zone_name}'");
        self.app.death_screen = false;
    }

    fn present(&mut self, scene: &Scene, _view: &CameraView) {
        if let Some(presenter) = &mut self.app.presenter {
            presenter.render(scene, self.app.death_screen);
        }
        if let Some(window) = &self.app.window {
            window.request_redraw();
        }
    }

    fn show_death_screen(&mut self) {
        self.app.death_screen = true;
    }
}
