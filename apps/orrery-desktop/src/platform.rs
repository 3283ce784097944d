use orrery_app::Platform;
use orrery_input::{InputSink, Key, MouseButton};
use std::sync::Arc;
use std::time::Duration;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::error::OsError;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

/// A winit window driven by pumping the event loop once per frame.
pub struct DesktopPlatform {
    event_loop: EventLoop<()>,
    title: String,
    size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    closed: bool,
}

impl DesktopPlatform {
    /// Creates the event loop and pumps it until the window exists.
    pub fn new(title: &str, width: u32, height: u32) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut platform = Self {
            event_loop,
            title: title.to_owned(),
            size: PhysicalSize::new(width, height),
            window: None,
            closed: false,
        };
        if let Some(err) = platform.pump(None) {
            tracing::error!(%err, "could not create window");
        }
        Ok(platform)
    }

    pub fn window(&self) -> Option<Arc<Window>> {
        self.window.clone()
    }

    fn pump<'s>(&mut self, sink: Option<&mut (dyn InputSink + 's)>) -> Option<OsError> {
        let mut handler = Pump {
            title: &self.title,
            size: self.size,
            window: &mut self.window,
            closed: &mut self.closed,
            sink,
            error: None,
        };
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut handler);
        let error = handler.error.take();
        if let PumpStatus::Exit(code) = status {
            tracing::debug!(code, "event loop exited");
            self.closed = true;
        }
        error
    }
}

impl Platform for DesktopPlatform {
    fn is_valid(&self) -> bool {
        self.window.is_some()
    }

    fn poll_events(&mut self, sink: &mut dyn InputSink) -> bool {
        if self.closed {
            return false;
        }
        if let Some(err) = self.pump(Some(sink)) {
            tracing::warn!(%err, "window error");
        }
        !self.closed
    }
}

/// Per-poll handler; forwards window events to the sink.
struct Pump<'a, 's> {
    title: &'a str,
    size: PhysicalSize<u32>,
    window: &'a mut Option<Arc<Window>>,
    closed: &'a mut bool,
    sink: Option<&'a mut (dyn InputSink + 's)>,
    error: Option<OsError>,
}

impl ApplicationHandler for Pump<'_, '_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.title)
            .with_inner_size(self.size)
            .with_resizable(false);
        match event_loop.create_window(attrs) {
            Ok(window) => *self.window = Some(Arc::new(window)),
            Err(err) => self.error = Some(err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                *self.closed = true;
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                if let (Some(key), Some(sink)) = (map_key(code), self.sink.as_mut()) {
                    sink.on_key(key, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(sink) = self.sink.as_mut() {
                    sink.on_mouse(position.x as i32, position.y as i32);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let (Some(button), Some(sink)) = (map_button(button), self.sink.as_mut()) {
                    sink.on_button(button, state == ElementState::Pressed);
                }
            }
            _ => {}
        }
    }
}

fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    use winit::event::MouseButton as W;
    Some(match button {
        W::Left => MouseButton::LEFT,
        W::Right => MouseButton::RIGHT,
        W::Middle => MouseButton::MIDDLE,
        W::Back => MouseButton::BACK,
        W::Forward => MouseButton::FORWARD,
        W::Other(_) => return None,
    })
}

/// Physical winit key to the GLFW-numbered [`Key`]. Unlisted keys are dropped.
fn map_key(code: KeyCode) -> Option<Key> {
    use KeyCode as C;
    let key = match code {
        C::KeyA => Key::A,
        C::KeyB => Key::B,
        C::KeyC => Key::C,
        C::KeyD => Key::D,
        C::KeyE => Key::E,
        C::KeyF => Key::F,
        C::KeyG => Key::G,
        C::KeyH => Key::H,
        C::KeyI => Key::I,
        C::KeyJ => Key::J,
        C::KeyK => Key::K,
        C::KeyL => Key::L,
        C::KeyM => Key::M,
        C::KeyN => Key::N,
        C::KeyO => Key::O,
        C::KeyP => Key::P,
        C::KeyQ => Key::Q,
        C::KeyR => Key::R,
        C::KeyS => Key::S,
        C::KeyT => Key::T,
        C::KeyU => Key::U,
        C::KeyV => Key::V,
        C::KeyW => Key::W,
        C::KeyX => Key::X,
        C::KeyY => Key::Y,
        C::KeyZ => Key::Z,
        C::Digit0 => Key::NUM_0,
        C::Digit1 => Key::NUM_1,
        C::Digit2 => Key::NUM_2,
        C::Digit3 => Key::NUM_3,
        C::Digit4 => Key::NUM_4,
        C::Digit5 => Key::NUM_5,
        C::Digit6 => Key::NUM_6,
        C::Digit7 => Key::NUM_7,
        C::Digit8 => Key::NUM_8,
        C::Digit9 => Key::NUM_9,
        C::Space => Key::SPACE,
        C::Quote => Key::APOSTROPHE,
        C::Comma => Key::COMMA,
        C::Minus => Key::MINUS,
        C::Period => Key::PERIOD,
        C::Slash => Key::SLASH,
        C::Semicolon => Key::SEMICOLON,
        C::Equal => Key::EQUAL,
        C::BracketLeft => Key::LEFT_BRACKET,
        C::Backslash => Key::BACKSLASH,
        C::BracketRight => Key::RIGHT_BRACKET,
        C::Backquote => Key::GRAVE_ACCENT,
        C::Escape => Key::ESCAPE,
        C::Enter => Key::ENTER,
        C::Tab => Key::TAB,
        C::Backspace => Key::BACKSPACE,
        C::Insert => Key::INSERT,
        C::Delete => Key::DELETE,
        C::ArrowRight => Key::RIGHT,
        C::ArrowLeft => Key::LEFT,
        C::ArrowDown => Key::DOWN,
        C::ArrowUp => Key::UP,
        C::PageUp => Key::PAGE_UP,
        C::PageDown => Key::PAGE_DOWN,
        C::Home => Key::HOME,
        C::End => Key::END,
        C::CapsLock => Key::CAPS_LOCK,
        C::F1 => Key::F1,
        C::F2 => Key::F2,
        C::F3 => Key::F3,
        C::F4 => Key::F4,
        C::F5 => Key::F5,
        C::F6 => Key::F6,
        C::F7 => Key::F7,
        C::F8 => Key::F8,
        C::F9 => Key::F9,
        C::F10 => Key::F10,
        C::F11 => Key::F11,
        C::F12 => Key::F12,
        C::ShiftLeft => Key::LEFT_SHIFT,
        C::ControlLeft => Key::LEFT_CONTROL,
        C::AltLeft => Key::LEFT_ALT,
        C::ShiftRight => Key::RIGHT_SHIFT,
        C::ControlRight => Key::RIGHT_CONTROL,
        C::AltRight => Key::RIGHT_ALT,
        _ => return None,
    };
    Some(key)
}
